use anyhow::Result;
use terrageo::format_hectares;

use crate::cli::{Cli, SettlementArgs};
use crate::commands::{dashboard, maybe_render, print_notices};

pub fn run(cli: &Cli, args: &SettlementArgs) -> Result<()> {
    let mut dashboard = dashboard(cli)?;
    let map = dashboard.settlement_map(args.municipality.as_deref(), args.kind)?;
    print_notices(&map.notices);

    let stats = &map.stats;
    println!("Total de assentamentos: {}", stats.total);
    println!("Área total: {} ha", format_hectares(stats.area_total_ha));
    println!("Área média: {} ha", format_hectares(stats.area_mean_ha));

    let title = args.municipality.as_deref().unwrap_or("Ceará");
    maybe_render(args.svg.as_deref(), &map.view.layers, None, title)
}
