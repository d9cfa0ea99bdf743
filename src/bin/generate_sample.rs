//! Generate a deterministic sample sales CSV for demos and manual testing.
//!
//! The output deliberately contains the known product misspellings and a
//! handful of invalid rows (bad dates, non-numeric amounts, zero units) so
//! the cleaning pipeline has something to drop.

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

    /// Uniform integer in `[lo, hi)`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo)
    }
}

const REGIONS: [&str; 4] = ["England", "Scotland", "Wales", "Northern Ireland"];

/// Product name with a typical unit price.
const PRODUCTS: [(&str, f64); 6] = [
    ("Chocolate Chunk", 2.40),
    ("Caramel Nut", 2.10),
    ("Fudge", 1.60),
    ("Toffee", 1.35),
    ("Sherbet Lemon", 0.95),
    ("Mint Humbug", 1.10),
];

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "confectionery_sample.csv".to_string());

    let file = std::fs::File::create(&output_path).expect("Failed to create output file");
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record([
            "Date",
            "Country(UK)",
            "Confectionary",
            "Units Sold",
            "Cost(£)",
            "Profit(£)",
            "Revenue(£)",
        ])
        .expect("Failed to write header");

    let n_rows = 1000;
    let mut dirty = 0;

    for row_id in 0..n_rows {
        let year = 2000 + rng.range(0, 6);
        let month = rng.range(1, 13);
        let day = rng.range(1, 29);
        let region = REGIONS[rng.range(0, REGIONS.len() as u64) as usize];
        let (product, unit_price) = PRODUCTS[rng.range(0, PRODUCTS.len() as u64) as usize];

        // Reintroduce the spelling variants the cleaner is expected to fix.
        let product = match product {
            "Chocolate Chunk" if rng.next_f64() < 0.04 => "Choclate Chunk",
            "Caramel Nut" if rng.next_f64() < 0.04 => "Caramel nut",
            other => other,
        };

        let units = rng.range(5, 400);
        let price = unit_price * (0.85 + 0.3 * rng.next_f64());
        let revenue = round2(units as f64 * price);
        // Margins vary by region so the matrix has structure.
        let cost_fraction = 0.55 + 0.08 * (REGIONS.iter().position(|r| *r == region).unwrap() as f64)
            + 0.05 * rng.next_f64();
        let cost = round2(revenue * cost_fraction);
        let profit = round2(revenue - cost);

        let date = format!("{day:02}/{month:02}/{year}");
        let mut record = [
            date,
            region.to_string(),
            product.to_string(),
            units.to_string(),
            cost.to_string(),
            profit.to_string(),
            revenue.to_string(),
        ];

        // A sprinkling of invalid rows for the cleaning pass to drop.
        match row_id % 167 {
            13 => {
                record[0] = "not recorded".to_string();
                dirty += 1;
            }
            77 => {
                record[4] = "n/a".to_string();
                dirty += 1;
            }
            141 => {
                record[3] = "0".to_string();
                dirty += 1;
            }
            _ => {}
        }

        writer.write_record(&record).expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_rows} rows ({dirty} deliberately invalid) to {output_path}");
}
