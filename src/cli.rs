use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use sales_explorer::data::aggregate::{TOP_N_DEFAULT, TOP_N_MAX, TOP_N_MIN};
use sales_explorer::data::model::{Bounds, DatasetProfile};
use sales_explorer::FilterCriteria;

// ── Args (CLI) ─────────────────────────────────────────────────────────────────

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Filter a vehicle sales dataset and print the dashboard views
#[derive(Parser, Debug, Clone)]
#[command(name = "sales-explorer", version)]
pub struct Args {
    /// Dataset file (.csv, .json, .parquet)
    pub path: PathBuf,

    /// Earliest year to keep (default: dataset minimum)
    #[arg(long)]
    pub year_min: Option<i32>,

    /// Latest year to keep (default: dataset maximum)
    #[arg(long)]
    pub year_max: Option<i32>,

    /// Regions to keep; repeat the flag for several (default: all)
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// Models to keep (default: all)
    #[arg(long = "model")]
    pub models: Vec<String>,

    /// Fuel types to keep (default: all)
    #[arg(long = "fuel")]
    pub fuel_types: Vec<String>,

    /// Transmissions to keep (default: all)
    #[arg(long = "transmission")]
    pub transmissions: Vec<String>,

    /// Colors to keep (default: all)
    #[arg(long = "color")]
    pub colors: Vec<String>,

    /// Lowest price in USD (default: dataset minimum)
    #[arg(long)]
    pub price_min: Option<f64>,

    /// Highest price in USD (default: dataset maximum)
    #[arg(long)]
    pub price_max: Option<f64>,

    /// Lowest mileage in km (default: dataset minimum)
    #[arg(long)]
    pub mileage_min: Option<i64>,

    /// Highest mileage in km (default: dataset maximum)
    #[arg(long)]
    pub mileage_max: Option<i64>,

    /// Read the filter criteria from a JSON file instead of the flags above
    #[arg(long, value_name = "FILE")]
    pub criteria: Option<PathBuf>,

    /// Number of models in the best-seller ranking
    #[arg(
        long,
        default_value_t = TOP_N_DEFAULT as u16,
        value_parser = clap::value_parser!(u16).range(TOP_N_MIN as i64..=TOP_N_MAX as i64)
    )]
    pub top_n: u16,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print the first rows of the dataset before filtering
    #[arg(long)]
    pub preview: bool,

    /// Filtered rows shown in the text detail table
    #[arg(long, default_value_t = 20)]
    pub detail_rows: usize,
}

impl Args {
    /// Build the criteria for this run: the JSON file when given, otherwise
    /// the flags layered over the dataset's full extents.
    pub fn filter_criteria(&self, profile: Option<&DatasetProfile>) -> Result<FilterCriteria> {
        if let Some(path) = &self.criteria {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading criteria file {}", path.display()))?;
            return serde_json::from_str(&text)
                .with_context(|| format!("parsing criteria file {}", path.display()));
        }

        let mut criteria = match profile {
            Some(p) => FilterCriteria::all_inclusive(p),
            None => FilterCriteria::unrestricted(),
        };
        criteria.year_range = override_bounds(criteria.year_range, self.year_min, self.year_max);
        criteria.price_range = override_bounds(criteria.price_range, self.price_min, self.price_max);
        criteria.mileage_range =
            override_bounds(criteria.mileage_range, self.mileage_min, self.mileage_max);

        Ok(criteria
            .with_regions(self.regions.iter().cloned())
            .with_models(self.models.iter().cloned())
            .with_fuel_types(self.fuel_types.iter().cloned())
            .with_transmissions(self.transmissions.iter().cloned())
            .with_colors(self.colors.iter().cloned()))
    }
}

fn override_bounds<T: PartialOrd + Copy>(full: Bounds<T>, min: Option<T>, max: Option<T>) -> Bounds<T> {
    Bounds::new(min.unwrap_or(full.min), max.unwrap_or(full.max))
}
