use thiserror::Error;

use super::model::{CellValue, RawTable, SalesRecord, ValidatedTable};

/// Columns every dataset must expose, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "Model",
    "Year",
    "Region",
    "Color",
    "Fuel_Type",
    "Transmission",
    "Engine_Size_L",
    "Mileage_KM",
    "Price_USD",
    "Sales_Volume",
    "Sales_Classification",
];

/// Why a raw table was rejected. Terminal for the dataset: nothing is
/// partially processed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// One or more required columns are absent.
    #[error("dataset is missing required columns {missing:?} (columns present: {present:?})")]
    MissingColumns {
        missing: Vec<String>,
        present: Vec<String>,
    },

    /// A required cell cannot be read as the column's type.
    #[error("row {row}, column {column}: expected {expected}, found {found}")]
    InvalidCell {
        row: usize,
        column: String,
        expected: &'static str,
        found: String,
    },
}

/// Required columns absent from `columns`, in canonical order.
pub fn missing_columns(columns: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|req| !columns.iter().any(|c| c == *req))
        .map(|req| req.to_string())
        .collect()
}

/// Check column presence, type every row and derive `Revenue_USD`.
///
/// Extra columns are ignored. Column presence is checked before any cell is
/// looked at, so a missing column is always reported as such.
pub fn validate(table: &RawTable) -> Result<ValidatedTable, SchemaError> {
    let missing = missing_columns(&table.columns);
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns {
            missing,
            present: table.columns.clone(),
        });
    }

    let idx = ColumnIndex::resolve(table);
    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_no, row)| idx.record(row_no, row))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("validated {} rows", records.len());
    Ok(ValidatedTable::from_records(records))
}

// -- Typed row extraction --

/// Position of each required column in the raw header.
struct ColumnIndex([usize; REQUIRED_COLUMNS.len()]);

impl ColumnIndex {
    /// Only called once presence has been checked.
    fn resolve(table: &RawTable) -> Self {
        let mut positions = [0; REQUIRED_COLUMNS.len()];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = table.column_index(name).unwrap_or_default();
        }
        ColumnIndex(positions)
    }

    fn record(&self, row_no: usize, row: &[CellValue]) -> Result<SalesRecord, SchemaError> {
        let cell = |col: usize| Cell {
            row: row_no,
            column: REQUIRED_COLUMNS[col],
            value: &row[self.0[col]],
        };

        let year = cell(1).integer()?;
        let year = i32::try_from(year).map_err(|_| cell(1).invalid("a calendar year"))?;

        Ok(SalesRecord {
            model: cell(0).text()?,
            year,
            region: cell(2).text()?,
            color: cell(3).text()?,
            fuel_type: cell(4).text()?,
            transmission: cell(5).text()?,
            engine_size_l: cell(6).decimal()?,
            mileage_km: cell(7).integer()?,
            price_usd: cell(8).decimal()?,
            sales_volume: cell(9).integer()?,
            sales_classification: cell(10).text()?,
            revenue_usd: 0.0,
        })
    }
}

struct Cell<'a> {
    row: usize,
    column: &'static str,
    value: &'a CellValue,
}

impl Cell<'_> {
    fn invalid(&self, expected: &'static str) -> SchemaError {
        SchemaError::InvalidCell {
            row: self.row,
            column: self.column.to_string(),
            expected,
            found: format!("{} `{}`", self.value.type_name(), self.value),
        }
    }

    fn text(&self) -> Result<String, SchemaError> {
        self.value.to_text().ok_or_else(|| self.invalid("text"))
    }

    fn integer(&self) -> Result<i64, SchemaError> {
        self.value.as_i64().ok_or_else(|| self.invalid("an integer"))
    }

    fn decimal(&self) -> Result<f64, SchemaError> {
        self.value.as_f64().ok_or_else(|| self.invalid("a number"))
    }
}
