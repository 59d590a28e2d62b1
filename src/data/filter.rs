use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{Bounds, DatasetProfile, FilteredTable, SalesRecord, ValidatedTable};

// ---------------------------------------------------------------------------
// FilterCriteria: every active constraint of one query
// ---------------------------------------------------------------------------

/// The user's filter selection, built fresh per interaction and never
/// mutated once handed to [`apply`].
///
/// Ranges are inclusive at both ends. A categorical set that is empty means
/// "no restriction" on that column (every value passes), not "select
/// nothing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub year_range: Bounds<i32>,
    #[serde(default)]
    pub regions: BTreeSet<String>,
    #[serde(default)]
    pub models: BTreeSet<String>,
    #[serde(default)]
    pub fuel_types: BTreeSet<String>,
    #[serde(default)]
    pub transmissions: BTreeSet<String>,
    #[serde(default)]
    pub colors: BTreeSet<String>,
    pub price_range: Bounds<f64>,
    pub mileage_range: Bounds<i64>,
}

impl FilterCriteria {
    /// Criteria that keep every row of the profiled table: full ranges, no
    /// categorical restriction.
    pub fn all_inclusive(profile: &DatasetProfile) -> Self {
        FilterCriteria {
            year_range: profile.years,
            regions: BTreeSet::new(),
            models: BTreeSet::new(),
            fuel_types: BTreeSet::new(),
            transmissions: BTreeSet::new(),
            colors: BTreeSet::new(),
            price_range: profile.prices,
            mileage_range: profile.mileages,
        }
    }

    /// Criteria with no constraint at all, independent of any dataset.
    pub fn unrestricted() -> Self {
        FilterCriteria {
            year_range: Bounds::new(i32::MIN, i32::MAX),
            regions: BTreeSet::new(),
            models: BTreeSet::new(),
            fuel_types: BTreeSet::new(),
            transmissions: BTreeSet::new(),
            colors: BTreeSet::new(),
            price_range: Bounds::new(f64::NEG_INFINITY, f64::INFINITY),
            mileage_range: Bounds::new(i64::MIN, i64::MAX),
        }
    }

    pub fn with_years(mut self, min: i32, max: i32) -> Self {
        self.year_range = Bounds::new(min, max);
        self
    }

    pub fn with_prices(mut self, min: f64, max: f64) -> Self {
        self.price_range = Bounds::new(min, max);
        self
    }

    pub fn with_mileages(mut self, min: i64, max: i64) -> Self {
        self.mileage_range = Bounds::new(min, max);
        self
    }

    pub fn with_regions<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_models<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fuel_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fuel_types = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_transmissions<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transmissions = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_colors<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = values.into_iter().map(Into::into).collect();
        self
    }

    /// Combine two criteria into one that a row passes iff it passes both.
    ///
    /// Ranges intersect and sets narrow. Returns `None` when both sides
    /// restrict the same column to disjoint sets: "empty set" already means
    /// "all", so that conjunction has no representation and matches nothing.
    pub fn and(&self, other: &FilterCriteria) -> Option<FilterCriteria> {
        Some(FilterCriteria {
            year_range: self.year_range.intersect(&other.year_range),
            regions: narrow(&self.regions, &other.regions)?,
            models: narrow(&self.models, &other.models)?,
            fuel_types: narrow(&self.fuel_types, &other.fuel_types)?,
            transmissions: narrow(&self.transmissions, &other.transmissions)?,
            colors: narrow(&self.colors, &other.colors)?,
            price_range: self.price_range.intersect(&other.price_range),
            mileage_range: self.mileage_range.intersect(&other.mileage_range),
        })
    }

    /// Whether a row passes all seven predicates.
    pub fn matches(&self, r: &SalesRecord) -> bool {
        self.year_range.contains(r.year)
            && selected(&self.regions, &r.region)
            && selected(&self.models, &r.model)
            && selected(&self.fuel_types, &r.fuel_type)
            && selected(&self.transmissions, &r.transmission)
            && selected(&self.colors, &r.color)
            && self.price_range.contains(r.price_usd)
            && self.mileage_range.contains(r.mileage_km)
    }
}

/// Empty selection → no constraint.
fn selected(set: &BTreeSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

fn narrow(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Option<BTreeSet<String>> {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => Some(b.clone()),
        (_, true) => Some(a.clone()),
        _ => {
            let both: BTreeSet<String> = a.intersection(b).cloned().collect();
            (!both.is_empty()).then_some(both)
        }
    }
}

// ---------------------------------------------------------------------------
// Filter pass
// ---------------------------------------------------------------------------

/// Return the rows of `table` that pass every predicate of `criteria`, in
/// table order. An empty result is a normal outcome.
pub fn apply<'a>(table: &'a ValidatedTable, criteria: &FilterCriteria) -> FilteredTable<'a> {
    let rows: Vec<&SalesRecord> = table
        .records()
        .iter()
        .filter(|r| criteria.matches(r))
        .collect();

    log::debug!("filter kept {} of {} rows", rows.len(), table.len());
    FilteredTable::new(rows)
}
