//! Writes a synthetic monthly taxi / FHV statistics CSV in the shape the
//! explorer expects: padded header labels, comma-grouped counts and `-`
//! where a license class did not report a figure.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Per-class baseline: (name, trips/day, fare per trip, trips per driver,
/// trips per vehicle, reports farebox)
const CLASSES: &[(&str, f64, f64, f64, f64, bool)] = &[
    ("Yellow", 250_000.0, 16.5, 18.0, 20.0, true),
    ("Green", 18_000.0, 14.0, 12.0, 13.0, true),
    ("FHV - High Volume", 650_000.0, 0.0, 9.0, 10.0, false),
    ("FHV - Black Car", 20_000.0, 0.0, 4.0, 4.5, false),
    ("FHV - Livery", 30_000.0, 0.0, 5.0, 6.0, false),
];

const MONTHS: u32 = 48;

/// `1234567` → `"1,234,567"`
fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn main() -> Result<()> {
    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/sample_data.csv"));
    if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;

    writer.write_record([
        "Month/Year",
        " License Class",
        "Trips Per Day ",
        "Farebox Per Day",
        "Unique Drivers",
        "Unique Vehicles",
        " Avg Minutes Per Trip",
    ])?;

    let start = NaiveDate::from_ymd_opt(2019, 1, 1).context("invalid start date")?;
    let mut rows = 0usize;
    for m in 0..MONTHS {
        let month = start
            .checked_add_months(chrono::Months::new(m))
            .context("month out of range")?;
        // Mild seasonality plus a dip in spring 2020.
        let season = 1.0 + 0.08 * ((month.month0() as f64) * std::f64::consts::PI / 6.0).sin();
        let dip = if (15..=20).contains(&m) { 0.35 } else { 1.0 };

        for &(class, base, fare, per_driver, per_vehicle, farebox) in CLASSES {
            let trips = (base * season * dip * rng.gauss(1.0, 0.03)).max(0.0);
            let farebox_cell = if farebox && rng.next_f64() > 0.05 {
                with_thousands((trips * fare * rng.gauss(1.0, 0.02)).round() as u64)
            } else {
                "-".to_string()
            };
            let minutes = if rng.next_f64() > 0.03 {
                format!("{:.1}", rng.gauss(15.0, 2.0).max(3.0))
            } else {
                String::new()
            };

            writer.write_record([
                month.format("%Y-%m").to_string(),
                class.to_string(),
                with_thousands(trips.round() as u64),
                farebox_cell,
                with_thousands((trips / per_driver).round() as u64),
                with_thousands((trips / per_vehicle).round() as u64),
                minutes,
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;

    println!("Wrote {rows} rows to {}", output_path.display());
    Ok(())
}
