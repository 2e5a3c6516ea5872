mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{export, lists, map, settlements};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install the logger; `RUST_LOG` wins over the `-v` count.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Regions => lists::regions(&cli),
        Commands::Municipalities(args) => lists::municipalities(&cli, args),
        Commands::SettlementMunicipalities => lists::settlement_municipalities(&cli),
        Commands::Map(args) => map::parcel_map(&cli, args),
        Commands::CategoryMap(args) => map::category_map(&cli, args),
        Commands::Export(args) => export::run(&cli, args),
        Commands::Settlements(args) => settlements::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
