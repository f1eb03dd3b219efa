mod cli;
mod report;

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use clap::Parser;
use cli::{Args, OutputFormat};
use log::info;
use pilecheck::{CheckConfig, ColumnSchema, InputTables, Reconciliation};
use report::{render_assessment, render_listing};
use serde::de::DeserializeOwned;

/// Read and deserialize a JSON file, naming the file in any error.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let file =
        File::open(path).map_err(|err| format!("cannot open {}: {err}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("cannot parse {}: {err}", path.display()))?;
    Ok(value)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // RUST_LOG still wins when set; the flag only changes the default.
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // The four sheets and their header names. Schema overrides are only
    // needed for exports that renamed columns.
    let tables: InputTables = read_json(&args.workbook)?;
    let schema = match &args.schema {
        Some(path) => read_json(path)?,
        None => ColumnSchema::default(),
    };
    let mut config = match &args.config {
        Some(path) => read_json(path)?,
        None => CheckConfig::default(),
    };
    args.apply_overrides(&mut config);

    // Geometry and head forces are resolved once, independent of capacities.
    let reconciliation = Reconciliation::from_tables(&tables, &schema)?;
    info!(
        "{} piles located, {} output cases available",
        reconciliation.piles().len(),
        reconciliation.output_cases().len()
    );

    if args.list {
        let sections: Vec<&str> = reconciliation.sections().into_iter().collect();
        print!(
            "{}",
            render_listing(&sections, &reconciliation.output_cases())
        );
        return Ok(());
    }

    if args.all_cases {
        config.selected_cases = reconciliation
            .output_cases()
            .into_iter()
            .map(str::to_string)
            .collect();
    }

    let assessment = reconciliation.evaluate(&config)?;
    match args.format {
        OutputFormat::Text => print!("{}", render_assessment(&assessment, &config)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
    }

    Ok(())
}
