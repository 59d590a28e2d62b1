use parquet::arrow::ArrowWriter;

use sales_explorer::data::schema::REQUIRED_COLUMNS;
use sales_explorer::report::records_batch;
use sales_explorer::SalesRecord;

const MODELS: [(&str, f64); 11] = [
    ("3 Series", 45_000.0),
    ("5 Series", 60_000.0),
    ("7 Series", 95_000.0),
    ("i3", 38_000.0),
    ("i8", 120_000.0),
    ("M3", 75_000.0),
    ("M5", 105_000.0),
    ("X1", 40_000.0),
    ("X3", 52_000.0),
    ("X5", 70_000.0),
    ("X6", 80_000.0),
];
const REGIONS: [&str; 6] = ["Africa", "Asia", "Europe", "Middle East", "North America", "South America"];
const COLORS: [&str; 6] = ["Black", "Blue", "Grey", "Red", "Silver", "White"];
const FUELS: [&str; 4] = ["Diesel", "Electric", "Hybrid", "Petrol"];
const TRANSMISSIONS: [&str; 2] = ["Automatic", "Manual"];
const ROWS: usize = 2_000;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

fn generate_record(rng: &mut SimpleRng) -> SalesRecord {
    let (model, base_price) = MODELS[rng.below(MODELS.len())];
    let year = 2010 + rng.below(15) as i32;
    let fuel_type = rng.pick(&FUELS);
    let engine_size_l = if fuel_type == "Electric" {
        0.0
    } else {
        (15.0 + rng.next_f64() * 35.0).round() / 10.0
    };

    // Older cars carry more kilometres and a lower price.
    let age = (2024 - year) as f64;
    let mileage_km = (rng.next_f64() * 20_000.0 * (age + 1.0)) as i64;
    let price_usd = (base_price * (1.0 - 0.03 * age) * (0.85 + rng.next_f64() * 0.3)).round();
    let sales_volume = 100 + (rng.next_f64() * 9_900.0) as i64;

    SalesRecord {
        model: model.to_string(),
        year,
        region: rng.pick(&REGIONS).to_string(),
        color: rng.pick(&COLORS).to_string(),
        fuel_type: fuel_type.to_string(),
        transmission: rng.pick(&TRANSMISSIONS).to_string(),
        engine_size_l,
        mileage_km,
        price_usd,
        sales_volume,
        sales_classification: if sales_volume >= 7_000 { "High" } else { "Low" }.to_string(),
        revenue_usd: 0.0,
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let records: Vec<SalesRecord> = (0..ROWS).map(|_| generate_record(&mut rng)).collect();

    // CSV, the way the dataset is usually distributed: no derived columns.
    let csv_path = "sample_sales.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer.write_record(REQUIRED_COLUMNS).expect("Failed to write CSV header");
    for r in &records {
        writer
            .write_record([
                r.model.clone(),
                r.year.to_string(),
                r.region.clone(),
                r.color.clone(),
                r.fuel_type.clone(),
                r.transmission.clone(),
                r.engine_size_l.to_string(),
                r.mileage_km.to_string(),
                r.price_usd.to_string(),
                r.sales_volume.to_string(),
                r.sales_classification.clone(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Parquet with the same columns (Revenue_USD, the last column, dropped).
    let refs: Vec<&SalesRecord> = records.iter().collect();
    let full = records_batch(&refs).expect("Failed to build record batch");
    let indices: Vec<usize> = (0..REQUIRED_COLUMNS.len()).collect();
    let batch = full.project(&indices).expect("Failed to project record batch");

    let parquet_path = "sample_sales.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {ROWS} sales records to {csv_path} and {parquet_path}");
}
