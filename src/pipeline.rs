use serde::Serialize;
use thiserror::Error;

use crate::data::aggregate::{
    self, ModelVolume, RegionYearVolume, ScatterPoint, SummaryMetrics, YearVolume,
};
use crate::data::filter::{self, FilterCriteria};
use crate::data::model::{FilteredTable, ValidatedTable};

// ---------------------------------------------------------------------------
// One filter + aggregate pass
// ---------------------------------------------------------------------------

/// No row survived the filters. Not a fault: the caller should stop this
/// pass and ask the user to relax the criteria.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no rows match the current filters")]
pub struct EmptyResult;

/// Everything the views need for one set of criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard<'a> {
    pub summary: SummaryMetrics,
    pub yearly_trend: Vec<YearVolume>,
    pub region_year: Vec<RegionYearVolume>,
    pub top_models: Vec<ModelVolume>,
    pub scatter: Vec<ScatterPoint<'a>>,
    pub rows: FilteredTable<'a>,
}

impl<'a> Dashboard<'a> {
    /// Aggregate an already filtered, non-empty table.
    pub fn from_filtered(rows: FilteredTable<'a>, top_n: usize) -> Result<Self, EmptyResult> {
        if rows.is_empty() {
            return Err(EmptyResult);
        }
        Ok(Dashboard {
            summary: aggregate::summary(&rows),
            yearly_trend: aggregate::yearly_trend(&rows),
            region_year: aggregate::region_year_breakdown(&rows),
            top_models: aggregate::top_models(&rows, top_n),
            scatter: aggregate::price_mileage_scatter(&rows),
            rows,
        })
    }
}

/// Filter `table` with `criteria` and compute every view.
///
/// Holds no state between calls: the table and criteria are only read, so
/// passes with different criteria can run side by side on one table.
pub fn run<'a>(
    table: &'a ValidatedTable,
    criteria: &FilterCriteria,
    top_n: usize,
) -> Result<Dashboard<'a>, EmptyResult> {
    let rows = filter::apply(table, criteria);
    if rows.is_empty() {
        log::warn!("{} rows loaded but none match the filters", table.len());
    }
    Dashboard::from_filtered(rows, top_n)
}
