use anyhow::Result;

use crate::cli::{Cli, MunicipalitiesArgs};
use crate::commands::dashboard;

fn print_names(names: &[String]) {
    for name in names {
        println!("{name}");
    }
}

pub fn regions(cli: &Cli) -> Result<()> {
    let mut dashboard = dashboard(cli)?;
    print_names(&dashboard.client().fetch_regions()?);
    Ok(())
}

pub fn municipalities(cli: &Cli, args: &MunicipalitiesArgs) -> Result<()> {
    let mut dashboard = dashboard(cli)?;
    let client = dashboard.client();
    let names = match &args.region {
        Some(region) if !args.all => client.fetch_municipalities(region)?,
        _ => client.fetch_all_municipalities()?,
    };
    print_names(&names);
    Ok(())
}

pub fn settlement_municipalities(cli: &Cli) -> Result<()> {
    let mut dashboard = dashboard(cli)?;
    print_names(&dashboard.client().fetch_settlement_municipalities()?);
    Ok(())
}
