use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use sales_explorer::data::aggregate;
use sales_explorer::data::filter;
use sales_explorer::data::loader::load_file;
use sales_explorer::data::model::CellValue;
use sales_explorer::data::schema::REQUIRED_COLUMNS;
use sales_explorer::{run, validate, EmptyResult, FilterCriteria, RawTable, ValidatedTable};

fn raw(rows: &[(&str, i64, &str, f64, i64, i64)]) -> RawTable {
    let mut table = RawTable::new(REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect());
    for &(model, year, region, price, mileage, volume) in rows {
        table.push_row(vec![
            CellValue::Text(model.into()),
            CellValue::Integer(year),
            CellValue::Text(region.into()),
            CellValue::Text("Black".into()),
            CellValue::Text("Petrol".into()),
            CellValue::Text("Automatic".into()),
            CellValue::Float(3.0),
            CellValue::Integer(mileage),
            CellValue::Float(price),
            CellValue::Integer(volume),
            CellValue::Text("Low".into()),
        ]);
    }
    table
}

fn x3_x5() -> ValidatedTable {
    validate(&raw(&[
        ("X3", 2020, "Europe", 50_000.0, 1_000, 10),
        ("X5", 2020, "Asia", 70_000.0, 500, 5),
    ]))
    .unwrap()
}

fn all_inclusive(table: &ValidatedTable) -> FilterCriteria {
    FilterCriteria::all_inclusive(&table.profile().unwrap())
}

#[test]
fn all_inclusive_criteria_summarise_everything() {
    let table = x3_x5();
    let d = run(&table, &all_inclusive(&table), 10).unwrap();
    assert_eq!(d.summary.total_units, 15);
    assert_eq!(d.summary.total_revenue, 850_000.0);
    assert_eq!(d.summary.row_count, 2);
}

#[test]
fn region_filter_narrows_to_one_row() {
    let table = x3_x5();
    let criteria = all_inclusive(&table).with_regions(["Europe"]);
    let d = run(&table, &criteria, 10).unwrap();
    assert_eq!(d.rows.len(), 1);
    assert_eq!(d.rows.rows()[0].model, "X3");
    let trend: Vec<(i32, i64)> = d.yearly_trend.iter().map(|p| (p.year, p.sales_volume)).collect();
    assert_eq!(trend, [(2020, 10)]);
}

#[test]
fn year_range_outside_data_is_empty_result() {
    let table = x3_x5();
    let criteria = all_inclusive(&table).with_years(2021, 2024);
    assert_eq!(run(&table, &criteria, 10), Err(EmptyResult));
}

#[test]
fn top_one_of_a_tie_is_reproducible() {
    let table = validate(&raw(&[
        ("B", 2020, "Asia", 10.0, 1, 100),
        ("A", 2021, "Asia", 10.0, 1, 40),
        ("A", 2022, "Europe", 10.0, 1, 60),
    ]))
    .unwrap();
    let criteria = all_inclusive(&table);
    let winners: Vec<String> = (0..5)
        .map(|_| run(&table, &criteria, 1).unwrap().top_models[0].model.clone())
        .collect();
    assert!(winners.iter().all(|w| w == "A"));
}

#[test]
fn all_inclusive_filter_is_identity_on_a_generated_table() {
    let rows: Vec<(String, i64, &str, f64, i64, i64)> = (0..60)
        .map(|i| {
            let region = ["Asia", "Europe", "Africa"][i % 3];
            (
                format!("M{}", i % 7),
                2010 + (i % 15) as i64,
                region,
                20_000.0 + (i * 977 % 90_000) as f64,
                (i * 3_301 % 200_000) as i64,
                1 + (i * 37 % 500) as i64,
            )
        })
        .collect();
    let borrowed: Vec<(&str, i64, &str, f64, i64, i64)> = rows
        .iter()
        .map(|(m, y, r, p, k, v)| (m.as_str(), *y, *r, *p, *k, *v))
        .collect();
    let table = validate(&raw(&borrowed)).unwrap();

    let filtered = filter::apply(&table, &all_inclusive(&table));
    assert_eq!(filtered.len(), table.len());
    assert!(filtered.iter().zip(table.records()).all(|(a, b)| std::ptr::eq(a, b)));

    let total: i64 = table.records().iter().map(|r| r.sales_volume).sum();
    let trend_total: i64 = aggregate::yearly_trend(&filtered).iter().map(|p| p.sales_volume).sum();
    assert_eq!(trend_total, total);

    let ranking = aggregate::top_models(&filtered, 5);
    assert_eq!(ranking.len(), 5);
    assert!(ranking.windows(2).all(|w| {
        w[0].sales_volume > w[1].sales_volume
            || (w[0].sales_volume == w[1].sales_volume && w[0].model < w[1].model)
    }));
}

#[test]
fn csv_file_goes_through_the_whole_pipeline() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{},Dealer", REQUIRED_COLUMNS.join(",")).unwrap();
    writeln!(file, "X3,2020,Europe,Black,Petrol,Automatic,2.0,1000,50000,10,Low,Munich").unwrap();
    writeln!(file, "X5,2020,Asia,White,Diesel,Automatic,3.0,500,70000,5,Low,Tokyo").unwrap();

    let table = validate(&load_file(file.path()).unwrap()).unwrap();
    let d = run(&table, &all_inclusive(&table), 10).unwrap();
    assert_eq!(d.summary.total_revenue, 850_000.0);
    assert_eq!(d.scatter[1].fuel_type, "Diesel");
}

#[test]
fn parquet_file_goes_through_the_whole_pipeline() {
    let text = |v: [&str; 2]| Arc::new(StringArray::from(v.to_vec())) as ArrayRef;
    let batch = RecordBatch::try_from_iter(vec![
        ("Model", text(["X3", "X5"])),
        ("Year", Arc::new(Int64Array::from(vec![2020, 2020])) as ArrayRef),
        ("Region", text(["Europe", "Asia"])),
        ("Color", text(["Black", "White"])),
        ("Fuel_Type", text(["Petrol", "Diesel"])),
        ("Transmission", text(["Automatic", "Manual"])),
        ("Engine_Size_L", Arc::new(Float64Array::from(vec![2.0, 3.0])) as ArrayRef),
        ("Mileage_KM", Arc::new(Int64Array::from(vec![1_000, 500])) as ArrayRef),
        ("Price_USD", Arc::new(Float64Array::from(vec![50_000.0, 70_000.0])) as ArrayRef),
        ("Sales_Volume", Arc::new(Int64Array::from(vec![10, 5])) as ArrayRef),
        ("Sales_Classification", text(["Low", "Low"])),
    ])
    .unwrap();

    let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
    let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let table = validate(&load_file(file.path()).unwrap()).unwrap();
    assert_eq!(table.len(), 2);
    let criteria = all_inclusive(&table).with_transmissions(["Manual"]);
    let d = run(&table, &criteria, 10).unwrap();
    assert_eq!(d.summary.total_units, 5);
    assert_eq!(d.top_models[0].model, "X5");
}
