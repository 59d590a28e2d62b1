mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{Args, OutputFormat};
use sales_explorer::data::loader;
use sales_explorer::{report, EmptyResult};

/// Leading rows shown by `--preview`.
const PREVIEW_ROWS: usize = 20;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let raw = loader::load_file(&args.path)?;
    let table = match sales_explorer::validate(&raw) {
        Ok(table) => table,
        Err(e) => {
            log::error!("Rejected {}: {e}", args.path.display());
            return Err(e.into());
        }
    };

    if args.preview {
        println!("First {} rows of {}", table.head(PREVIEW_ROWS).len(), args.path.display());
        println!("{}", report::render_preview(table.head(PREVIEW_ROWS))?);
    }

    let profile = table.profile();
    let criteria = args.filter_criteria(profile.as_ref())?;
    log::debug!("criteria: {criteria:?}");

    match sales_explorer::run(&table, &criteria, usize::from(args.top_n)) {
        Ok(dashboard) => {
            let out = match args.format {
                OutputFormat::Text => report::render_text(&dashboard, args.detail_rows)?,
                OutputFormat::Json => report::render_json(&dashboard)?,
            };
            println!("{out}");
        }
        Err(EmptyResult) => {
            println!("No data matches the filters. Try relaxing them.");
        }
    }
    Ok(())
}
