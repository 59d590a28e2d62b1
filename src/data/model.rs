use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a raw, not yet validated table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a CSV / JSON / Parquet
/// reader can hand over before the schema is known.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Short dtype name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "text",
            CellValue::Integer(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Bool(_) => "bool",
            CellValue::Null => "null",
        }
    }

    /// Interpret the value as a finite `f64`. Integers widen; text is parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Interpret the value as an `i64`. Floats are accepted only when they
    /// carry no fractional part (Pandas writes `2020.0` for nullable ints).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) => integral(*v),
            CellValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            _ => None,
        }
    }

    /// Interpret the value as categorical text. Text is kept verbatim; typed
    /// scalars (JSON numbers, Parquet ints) are rendered.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64)
        .then_some(v as i64)
}

// ---------------------------------------------------------------------------
// RawTable – what the loader hands to the schema validator
// ---------------------------------------------------------------------------

/// Header plus row-major cells, as read from disk. Columns are arbitrary;
/// nothing is known about the schema yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        RawTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with `Null`, extra cells dropped,
    /// so every row lines up with `columns`.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Null);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SalesRecord – one typed row after validation
// ---------------------------------------------------------------------------

/// One sales observation. Serialized with the dataset's own column names so
/// downstream consumers see the familiar header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Color")]
    pub color: String,
    #[serde(rename = "Fuel_Type")]
    pub fuel_type: String,
    #[serde(rename = "Transmission")]
    pub transmission: String,
    #[serde(rename = "Engine_Size_L")]
    pub engine_size_l: f64,
    #[serde(rename = "Mileage_KM")]
    pub mileage_km: i64,
    #[serde(rename = "Price_USD")]
    pub price_usd: f64,
    #[serde(rename = "Sales_Volume")]
    pub sales_volume: i64,
    #[serde(rename = "Sales_Classification")]
    pub sales_classification: String,
    /// `price_usd * sales_volume`, derived once when the table is built.
    #[serde(rename = "Revenue_USD")]
    pub revenue_usd: f64,
}

impl SalesRecord {
    fn derive_revenue(&mut self) {
        self.revenue_usd = self.price_usd * self.sales_volume as f64;
    }
}

// ---------------------------------------------------------------------------
// Bounds – an inclusive numeric range
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` range. An inverted range (`min > max`) contains
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: T, max: T) -> Self {
        Bounds { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Overlap of two ranges; may come out inverted (i.e. empty).
    pub fn intersect(&self, other: &Bounds<T>) -> Bounds<T> {
        let min = if other.min > self.min { other.min } else { self.min };
        let max = if other.max < self.max { other.max } else { self.max };
        Bounds { min, max }
    }

    fn widen(&mut self, value: T) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }
}

// ---------------------------------------------------------------------------
// ValidatedTable – the immutable, typed dataset handle
// ---------------------------------------------------------------------------

/// The full validated dataset. Cloning shares the rows, so one load can feed
/// any number of concurrent filter passes.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    records: Arc<[SalesRecord]>,
}

impl ValidatedTable {
    /// Freeze typed records into a table, deriving `revenue_usd` for each.
    pub fn from_records(mut records: Vec<SalesRecord>) -> Self {
        for record in &mut records {
            record.derive_revenue();
        }
        ValidatedTable {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// First `n` rows, for a quick look at the raw data.
    pub fn head(&self, n: usize) -> &[SalesRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct categorical values and numeric extents. `None` for an empty
    /// table, which has no extents.
    pub fn profile(&self) -> Option<DatasetProfile> {
        DatasetProfile::from_records(&self.records)
    }
}

// ---------------------------------------------------------------------------
// FilteredTable – the surviving rows of one filter pass
// ---------------------------------------------------------------------------

/// Rows borrowed from a [`ValidatedTable`], in their original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilteredTable<'a> {
    rows: Vec<&'a SalesRecord>,
}

impl<'a> FilteredTable<'a> {
    pub(crate) fn new(rows: Vec<&'a SalesRecord>) -> Self {
        FilteredTable { rows }
    }

    pub fn rows(&self) -> &[&'a SalesRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DatasetProfile – option lists and slider extents
// ---------------------------------------------------------------------------

/// Sorted distinct values per categorical column and min/max per ranged
/// column, computed from a full table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub regions: BTreeSet<String>,
    pub models: BTreeSet<String>,
    pub fuel_types: BTreeSet<String>,
    pub transmissions: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub years: Bounds<i32>,
    pub prices: Bounds<f64>,
    pub mileages: Bounds<i64>,
}

impl DatasetProfile {
    fn from_records(records: &[SalesRecord]) -> Option<Self> {
        let first = records.first()?;
        let mut profile = DatasetProfile {
            regions: BTreeSet::new(),
            models: BTreeSet::new(),
            fuel_types: BTreeSet::new(),
            transmissions: BTreeSet::new(),
            colors: BTreeSet::new(),
            years: Bounds::new(first.year, first.year),
            prices: Bounds::new(first.price_usd, first.price_usd),
            mileages: Bounds::new(first.mileage_km, first.mileage_km),
        };

        for r in records {
            profile.regions.insert(r.region.clone());
            profile.models.insert(r.model.clone());
            profile.fuel_types.insert(r.fuel_type.clone());
            profile.transmissions.insert(r.transmission.clone());
            profile.colors.insert(r.color.clone());
            profile.years.widen(r.year);
            profile.prices.widen(r.price_usd);
            profile.mileages.widen(r.mileage_km);
        }
        Some(profile)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a record with sensible defaults for the fields a test ignores.
    pub(crate) fn record(model: &str, year: i32, region: &str, price: f64, mileage: i64, volume: i64) -> SalesRecord {
        SalesRecord {
            model: model.to_string(),
            year,
            region: region.to_string(),
            color: "Black".to_string(),
            fuel_type: "Petrol".to_string(),
            transmission: "Automatic".to_string(),
            engine_size_l: 3.0,
            mileage_km: mileage,
            price_usd: price,
            sales_volume: volume,
            sales_classification: "Low".to_string(),
            revenue_usd: 0.0,
        }
    }

    #[test]
    fn revenue_is_derived_for_every_row() {
        let table = ValidatedTable::from_records(vec![
            record("X3", 2020, "Europe", 50_000.0, 1_000, 10),
            record("X5", 2020, "Asia", 70_000.5, 500, 5),
        ]);
        for r in table.records() {
            assert_eq!(r.revenue_usd, r.price_usd * r.sales_volume as f64);
        }
        assert_eq!(table.records()[1].revenue_usd, 350_002.5);
    }

    #[test]
    fn head_clamps_to_table_length() {
        let table = ValidatedTable::from_records(vec![record("X1", 2015, "Asia", 1.0, 1, 1)]);
        assert_eq!(table.head(20).len(), 1);
        assert_eq!(table.head(0).len(), 0);
    }

    #[test]
    fn clones_share_rows() {
        let table = ValidatedTable::from_records(vec![record("X1", 2015, "Asia", 1.0, 1, 1)]);
        let other = table.clone();
        assert!(std::ptr::eq(table.records().as_ptr(), other.records().as_ptr()));
    }

    #[test]
    fn profile_collects_sorted_options_and_extents() {
        let table = ValidatedTable::from_records(vec![
            record("X5", 2018, "Europe", 70_000.0, 500, 5),
            record("M3", 2012, "Asia", 45_000.0, 90_000, 3),
            record("X5", 2024, "Asia", 82_500.0, 12, 8),
        ]);
        let profile = table.profile().unwrap();
        assert_eq!(profile.models.iter().collect::<Vec<_>>(), ["M3", "X5"]);
        assert_eq!(profile.regions.iter().collect::<Vec<_>>(), ["Asia", "Europe"]);
        assert_eq!(profile.years, Bounds::new(2012, 2024));
        assert_eq!(profile.prices, Bounds::new(45_000.0, 82_500.0));
        assert_eq!(profile.mileages, Bounds::new(12, 90_000));
    }

    #[test]
    fn empty_table_has_no_profile() {
        assert!(ValidatedTable::from_records(Vec::new()).profile().is_none());
    }

    #[test]
    fn bounds_are_inclusive_and_intersect() {
        let b = Bounds::new(2010, 2015);
        assert!(b.contains(2010));
        assert!(b.contains(2015));
        assert!(!b.contains(2016));

        let overlap = b.intersect(&Bounds::new(2013, 2020));
        assert_eq!(overlap, Bounds::new(2013, 2015));

        let disjoint = b.intersect(&Bounds::new(2020, 2024));
        assert!(!disjoint.contains(2015));
        assert!(!disjoint.contains(2020));
    }

    #[test]
    fn cell_coercions() {
        assert_eq!(CellValue::Float(2020.0).as_i64(), Some(2020));
        assert_eq!(CellValue::Float(2020.5).as_i64(), None);
        assert_eq!(CellValue::Integer(7).as_f64(), Some(7.0));
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::Integer(320).to_text().as_deref(), Some("320"));
        assert_eq!(CellValue::Null.to_text(), None);
        assert_eq!(CellValue::Null.type_name(), "null");

        let text = |s: &str| CellValue::Text(s.into());
        assert_eq!(text("007").to_text().as_deref(), Some("007"));
        assert_eq!(text("007").as_i64(), Some(7));
        assert_eq!(text(" 2019.0 ").as_i64(), Some(2019));
        assert_eq!(text("1.50").as_f64(), Some(1.5));
        assert_eq!(text("Infinity").as_f64(), None);
        assert_eq!(text("9.5").as_i64(), None);
        assert_eq!(text("Hybrid").as_f64(), None);
    }

    #[test]
    fn raw_rows_are_padded_to_header_width() {
        let mut raw = RawTable::new(vec!["a".into(), "b".into()]);
        raw.push_row(vec![CellValue::Integer(1)]);
        assert_eq!(raw.rows[0], vec![CellValue::Integer(1), CellValue::Null]);
        assert_eq!(raw.column_index("b"), Some(1));
    }
}
