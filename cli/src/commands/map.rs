use anyhow::Result;

use crate::cli::{CategoryMapArgs, Cli, MapArgs};
use crate::commands::{dashboard, maybe_render, print_notices, print_summary};

pub fn parcel_map(cli: &Cli, args: &MapArgs) -> Result<()> {
    let mut dashboard = dashboard(cli)?;
    let map = dashboard.parcel_map(&args.region, args.municipality.as_deref())?;
    print_notices(&map.notices);

    let title = args.municipality.as_deref().unwrap_or(&args.region);
    print_summary(&map.summary, &map.totals);
    maybe_render(args.svg.as_deref(), &map.view.layers, map.view.boundary.as_ref(), title)
}

pub fn category_map(cli: &Cli, args: &CategoryMapArgs) -> Result<()> {
    let mut dashboard = dashboard(cli)?;
    let map = dashboard.category_map(args.category, args.region.as_deref())?;
    print_notices(&map.notices);

    println!(
        "{} propriedades '{}' em {}/{} municípios",
        map.parcels.len(), map.category, map.succeeded, map.total,
    );
    maybe_render(args.svg.as_deref(), &map.view.layers, map.view.boundary.as_ref(), map.category.label())
}
