use std::collections::BTreeMap;

use serde::Serialize;

use super::model::FilteredTable;

/// Smallest ranking size the input collector offers.
pub const TOP_N_MIN: usize = 5;
/// Largest ranking size the input collector offers.
pub const TOP_N_MAX: usize = 20;
pub const TOP_N_DEFAULT: usize = 10;

// ---------------------------------------------------------------------------
// Output rows
// ---------------------------------------------------------------------------

/// Headline numbers for the filtered table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_units: i64,
    pub total_revenue: f64,
    pub row_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearVolume {
    pub year: i32,
    pub sales_volume: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionYearVolume {
    pub year: i32,
    pub region: String,
    pub sales_volume: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelVolume {
    pub model: String,
    pub sales_volume: i64,
}

/// One point of the price/mileage cloud. Size follows `sales_volume`, colour
/// follows `fuel_type`; the rest is hover detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint<'a> {
    pub mileage_km: i64,
    pub price_usd: f64,
    pub fuel_type: &'a str,
    pub sales_volume: i64,
    pub model: &'a str,
    pub region: &'a str,
    pub transmission: &'a str,
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Volume sums saturate at the `i64` bounds instead of overflowing.
fn add_volume(total: &mut i64, volume: i64) {
    *total = total.saturating_add(volume);
}

pub fn summary(table: &FilteredTable<'_>) -> SummaryMetrics {
    table.iter().fold(
        SummaryMetrics {
            total_units: 0,
            total_revenue: 0.0,
            row_count: 0,
        },
        |mut acc, r| {
            add_volume(&mut acc.total_units, r.sales_volume);
            acc.total_revenue += r.revenue_usd;
            acc.row_count += 1;
            acc
        },
    )
}

/// Sales volume per year, ascending by year. Years without rows are absent.
pub fn yearly_trend(table: &FilteredTable<'_>) -> Vec<YearVolume> {
    let mut by_year: BTreeMap<i32, i64> = BTreeMap::new();
    for r in table.iter() {
        add_volume(by_year.entry(r.year).or_default(), r.sales_volume);
    }
    by_year
        .into_iter()
        .map(|(year, sales_volume)| YearVolume { year, sales_volume })
        .collect()
}

/// Sales volume per `(year, region)`, sorted by year then region.
pub fn region_year_breakdown(table: &FilteredTable<'_>) -> Vec<RegionYearVolume> {
    let mut groups: BTreeMap<(i32, &str), i64> = BTreeMap::new();
    for r in table.iter() {
        add_volume(groups.entry((r.year, r.region.as_str())).or_default(), r.sales_volume);
    }
    groups
        .into_iter()
        .map(|((year, region), sales_volume)| RegionYearVolume {
            year,
            region: region.to_string(),
            sales_volume,
        })
        .collect()
}

/// The `n` best-selling models, highest volume first.
///
/// Models with equal volume are ordered by name, ascending, so the cut at
/// `n` is reproducible. Any `n` is honoured here; the `[TOP_N_MIN,
/// TOP_N_MAX]` range is an input-collector concern.
pub fn top_models(table: &FilteredTable<'_>, n: usize) -> Vec<ModelVolume> {
    let mut by_model: BTreeMap<&str, i64> = BTreeMap::new();
    for r in table.iter() {
        add_volume(by_model.entry(r.model.as_str()).or_default(), r.sales_volume);
    }

    // BTreeMap iteration is already name-ascending; the stable sort keeps
    // that order among equal volumes.
    let mut ranked: Vec<(&str, i64)> = by_model.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(model, sales_volume)| ModelVolume {
            model: model.to_string(),
            sales_volume,
        })
        .collect()
}

/// Pass-through view of the filtered rows for the point cloud.
pub fn price_mileage_scatter<'a>(table: &FilteredTable<'a>) -> Vec<ScatterPoint<'a>> {
    table
        .iter()
        .map(|r| ScatterPoint {
            mileage_km: r.mileage_km,
            price_usd: r.price_usd,
            fuel_type: &r.fuel_type,
            sales_volume: r.sales_volume,
            model: &r.model,
            region: &r.region,
            transmission: &r.transmission,
        })
        .collect()
}
