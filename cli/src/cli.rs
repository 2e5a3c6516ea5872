use std::path::PathBuf;

use terrageo::{Category, SettlementKind};

/// Ceará land-property and settlement maps (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "terrageo", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Microservice base URL
    #[arg(long, env = "TERRAGEO_URL", global = true)]
    pub base_url: Option<String>,

    /// Simplification tolerance in degrees
    #[arg(long, global = true)]
    pub tolerance: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List administrative regions
    Regions,

    /// List the municipalities of a region
    Municipalities(MunicipalitiesArgs),

    /// List municipalities that have settlements
    SettlementMunicipalities,

    /// Parcels of a region or municipality, summarized by category
    Map(MapArgs),

    /// Parcels of one category across many municipalities
    CategoryMap(CategoryMapArgs),

    /// Export statewide parcels as a shapefile set
    Export(ExportArgs),

    /// Land-reform settlements
    Settlements(SettlementArgs),
}

#[derive(clap::Args, Debug)]
pub struct MunicipalitiesArgs {
    /// Region name, e.g. "Cariri"
    #[arg(required_unless_present = "all")]
    pub region: Option<String>,

    /// List every municipality of the state
    #[arg(long, conflicts_with = "region")]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct MapArgs {
    pub region: String,

    /// Narrow to one municipality of the region
    #[arg(short, long)]
    pub municipality: Option<String>,

    /// Write an SVG preview
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub svg: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CategoryMapArgs {
    /// Category label, e.g. "Grande Propriedade"
    pub category: Category,

    /// Restrict to one region (default: every region)
    #[arg(short, long)]
    pub region: Option<String>,

    /// Write an SVG preview
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub svg: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Category label, or "Todas" for every category
    #[arg(default_value = "Todas")]
    pub category: String,

    /// Output directory, defaults to "output_shapes"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Also bundle the shapefile set into a .zip
    #[arg(long)]
    pub zip: bool,

    /// Also write the full attribute table as CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub csv: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SettlementArgs {
    #[arg(short, long)]
    pub municipality: Option<String>,

    /// estadual or federal
    #[arg(short, long)]
    pub kind: Option<SettlementKind>,

    /// Write an SVG preview
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub svg: Option<PathBuf>,
}
