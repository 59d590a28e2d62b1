use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::data::model::SalesRecord;
use crate::pipeline::Dashboard;

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Integer with `,` thousands separators: `1234567` → `"1,234,567"`.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// ---------------------------------------------------------------------------
// Arrow tables
// ---------------------------------------------------------------------------

fn text_column(rows: &[&SalesRecord], f: impl Fn(&SalesRecord) -> &str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(rows.iter().map(|&r| f(r))))
}

fn float_column(rows: &[&SalesRecord], f: impl Fn(&SalesRecord) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(rows.iter().map(|&r| f(r))))
}

fn int_column(rows: &[&SalesRecord], f: impl Fn(&SalesRecord) -> i64) -> ArrayRef {
    Arc::new(Int64Array::from_iter_values(rows.iter().map(|&r| f(r))))
}

/// Lay sales rows out as an Arrow batch with the dataset's column names.
pub fn records_batch(rows: &[&SalesRecord]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Model", DataType::Utf8, false),
        Field::new("Year", DataType::Int32, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Color", DataType::Utf8, false),
        Field::new("Fuel_Type", DataType::Utf8, false),
        Field::new("Transmission", DataType::Utf8, false),
        Field::new("Engine_Size_L", DataType::Float64, false),
        Field::new("Mileage_KM", DataType::Int64, false),
        Field::new("Price_USD", DataType::Float64, false),
        Field::new("Sales_Volume", DataType::Int64, false),
        Field::new("Sales_Classification", DataType::Utf8, false),
        Field::new("Revenue_USD", DataType::Float64, false),
    ]));

    let years: ArrayRef = Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year)));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            text_column(rows, |r| &r.model),
            years,
            text_column(rows, |r| &r.region),
            text_column(rows, |r| &r.color),
            text_column(rows, |r| &r.fuel_type),
            text_column(rows, |r| &r.transmission),
            float_column(rows, |r| r.engine_size_l),
            int_column(rows, |r| r.mileage_km),
            float_column(rows, |r| r.price_usd),
            int_column(rows, |r| r.sales_volume),
            text_column(rows, |r| &r.sales_classification),
            float_column(rows, |r| r.revenue_usd),
        ],
    )?;
    Ok(batch)
}

fn pretty(batch: RecordBatch) -> Result<String> {
    Ok(pretty_format_batches(&[batch])?.to_string())
}

fn trend_table(dashboard: &Dashboard<'_>) -> Result<String> {
    let trend = &dashboard.yearly_trend;
    let batch = RecordBatch::try_from_iter(vec![
        (
            "Year",
            Arc::new(Int32Array::from_iter_values(trend.iter().map(|p| p.year))) as ArrayRef,
        ),
        (
            "Sales_Volume",
            Arc::new(Int64Array::from_iter_values(trend.iter().map(|p| p.sales_volume))) as ArrayRef,
        ),
    ])?;
    pretty(batch)
}

fn region_year_table(dashboard: &Dashboard<'_>) -> Result<String> {
    let groups = &dashboard.region_year;
    let batch = RecordBatch::try_from_iter(vec![
        (
            "Year",
            Arc::new(Int32Array::from_iter_values(groups.iter().map(|g| g.year))) as ArrayRef,
        ),
        (
            "Region",
            Arc::new(StringArray::from_iter_values(groups.iter().map(|g| g.region.as_str())))
                as ArrayRef,
        ),
        (
            "Sales_Volume",
            Arc::new(Int64Array::from_iter_values(groups.iter().map(|g| g.sales_volume))) as ArrayRef,
        ),
    ])?;
    pretty(batch)
}

fn top_models_table(dashboard: &Dashboard<'_>) -> Result<String> {
    let ranking = &dashboard.top_models;
    let batch = RecordBatch::try_from_iter(vec![
        (
            "Model",
            Arc::new(StringArray::from_iter_values(ranking.iter().map(|m| m.model.as_str())))
                as ArrayRef,
        ),
        (
            "Sales_Volume",
            Arc::new(Int64Array::from_iter_values(ranking.iter().map(|m| m.sales_volume))) as ArrayRef,
        ),
    ])?;
    pretty(batch)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Plain-text report: headline metrics, the three grouped views and the
/// first `detail_rows` filtered rows.
pub fn render_text(dashboard: &Dashboard<'_>, detail_rows: usize) -> Result<String> {
    let s = &dashboard.summary;
    let mut out = String::new();

    writeln!(out, "Summary (after filters)")?;
    writeln!(out, "  Total units sold:        {}", format_thousands(s.total_units))?;
    writeln!(
        out,
        "  Estimated revenue (USD): {}",
        format_thousands(s.total_revenue as i64)
    )?;
    writeln!(out, "  Rows:                    {}", format_thousands(s.row_count as i64))?;

    writeln!(out, "\nSales volume per year")?;
    writeln!(out, "{}", trend_table(dashboard)?)?;

    writeln!(out, "\nSales volume per region per year")?;
    writeln!(out, "{}", region_year_table(dashboard)?)?;

    writeln!(out, "\nTop {} models", dashboard.top_models.len())?;
    writeln!(out, "{}", top_models_table(dashboard)?)?;

    let shown = detail_rows.min(dashboard.rows.len());
    writeln!(out, "\nDetail ({shown} of {} rows)", dashboard.rows.len())?;
    writeln!(out, "{}", pretty(records_batch(&dashboard.rows.rows()[..shown])?)?)?;

    Ok(out)
}

/// The whole dashboard as pretty-printed JSON for an external renderer.
pub fn render_json(dashboard: &Dashboard<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

/// Leading rows of a table, before any filter is applied.
pub fn render_preview(rows: &[SalesRecord]) -> Result<String> {
    let refs: Vec<&SalesRecord> = rows.iter().collect();
    pretty(records_batch(&refs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FilterCriteria;
    use crate::data::model::tests::record;
    use crate::data::model::ValidatedTable;
    use crate::pipeline::run;

    fn table() -> ValidatedTable {
        ValidatedTable::from_records(vec![
            record("X3", 2020, "Europe", 50_000.0, 1_000, 10),
            record("X5", 2020, "Asia", 70_000.0, 500, 5),
        ])
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(850_000), "850,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-12_345), "-12,345");
    }

    #[test]
    fn records_batch_keeps_dataset_headers() {
        let t = table();
        let rows: Vec<&SalesRecord> = t.records().iter().collect();
        let batch = records_batch(&rows).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 12);
        assert_eq!(batch.schema().field(11).name(), "Revenue_USD");
    }

    #[test]
    fn text_report_has_every_section() {
        let t = table();
        let d = run(&t, &FilterCriteria::unrestricted(), 10).unwrap();
        let text = render_text(&d, 1).unwrap();
        assert!(text.contains("Total units sold:        15"));
        assert!(text.contains("Estimated revenue (USD): 850,000"));
        assert!(text.contains("Sales volume per region per year"));
        assert!(text.contains("Top 2 models"));
        assert!(text.contains("Detail (1 of 2 rows)"));
        assert!(text.contains("Fuel_Type"));
    }

    #[test]
    fn json_report_parses_back() {
        let t = table();
        let d = run(&t, &FilterCriteria::unrestricted(), 10).unwrap();
        let value: serde_json::Value = serde_json::from_str(&render_json(&d).unwrap()).unwrap();
        assert_eq!(value["summary"]["total_revenue"], 850_000.0);
        assert_eq!(value["top_models"][0]["model"], "X3");
        assert_eq!(value["scatter"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn preview_renders_rows() {
        let t = table();
        let text = render_preview(t.head(1)).unwrap();
        assert!(text.contains("X3"));
        assert!(!text.contains("X5"));
    }
}
