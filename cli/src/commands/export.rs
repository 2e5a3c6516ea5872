use anyhow::{anyhow, Context, Result};
use terrageo::export::{write_attribute_csv, DEFAULT_OUTPUT_DIR};
use terrageo::{Predicate, ShapefileExporter};

use crate::cli::{Cli, ExportArgs};
use crate::commands::{dashboard, print_notices, print_summary};

pub fn run(cli: &Cli, args: &ExportArgs) -> Result<()> {
    let category = match Predicate::for_selector(&args.category).map_err(|e| anyhow!("[export] {e}"))? {
        Some(Predicate::Category(c)) => Some(c),
        _ => None,
    };

    let mut dashboard = dashboard(cli)?;
    let survey = dashboard.property_survey(category)?;
    print_notices(&survey.notices);
    if survey.parcels.is_empty() {
        return Ok(());
    }
    print_summary(&survey.summary, &survey.totals);

    let output = args.output.clone().unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into());
    let exporter = ShapefileExporter::new(output).with_zip(args.zip);
    let shp = survey.export(&exporter)
        .with_context(|| format!("[export] Failed to write shapefile into {}", exporter.output_dir().display()))?;
    println!("Shapefile gerado em: {}", shp.display());
    if args.zip {
        println!("Pacote: {}", shp.with_extension("zip").display());
    }

    if let Some(csv) = &args.csv {
        write_attribute_csv(&survey.parcels.features, csv)
            .with_context(|| format!("[export] Failed to write attribute table to {}", csv.display()))?;
        println!("Tabela de atributos: {}", csv.display());
    }
    Ok(())
}
