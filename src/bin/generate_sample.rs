use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    fn below(&mut self, n: u64) -> i64 {
        (self.next_u64() % n) as i64
    }
}

/// One synthetic patient record.
struct Patient {
    age: i64,
    sex: i64,
    cp: i64,
    trestbps: i64,
    chol: i64,
    thalach: i64,
    oldpeak: f64,
    target: i64,
}

const HEADERS: [&str; 8] = [
    "age", "sex", "cp", "trestbps", "chol", "thalach", "oldpeak", "target",
];

fn generate_patient(rng: &mut SimpleRng) -> Patient {
    let age = rng.gauss(54.0, 9.0).clamp(29.0, 77.0).round() as i64;
    let sex = i64::from(rng.next_f64() < 0.68);
    let cp = rng.below(4);
    let trestbps = rng.gauss(131.0, 17.0).clamp(94.0, 200.0).round() as i64;
    let chol = rng.gauss(246.0, 51.0).clamp(126.0, 564.0).round() as i64;
    let thalach = (rng.gauss(150.0, 22.0) - 0.4 * (age as f64 - 54.0))
        .clamp(71.0, 202.0)
        .round() as i64;
    let oldpeak = (rng.gauss(1.0, 1.1).clamp(0.0, 6.2) * 10.0).round() / 10.0;

    // Risk grows with age, male sex, cholesterol and ST depression, and
    // falls with maximum heart rate.
    let score = 0.05 * (age as f64 - 54.0) + 0.8 * sex as f64 + 0.004 * (chol as f64 - 246.0)
        - 0.03 * (thalach as f64 - 150.0)
        + 0.6 * oldpeak
        - 0.5 * cp as f64;
    let p = 1.0 / (1.0 + (-score).exp());
    let target = i64::from(rng.next_f64() < p);

    Patient {
        age,
        sex,
        cp,
        trestbps,
        chol,
        thalach,
        oldpeak,
        target,
    }
}

fn write_csv(path: &str, patients: &[Patient]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record(HEADERS)?;
    for p in patients {
        writer.write_record([
            p.age.to_string(),
            p.sex.to_string(),
            p.cp.to_string(),
            p.trestbps.to_string(),
            p.chol.to_string(),
            p.thalach.to_string(),
            p.oldpeak.to_string(),
            p.target.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(path: &str, patients: &[Patient]) -> Result<()> {
    let int_column = |f: fn(&Patient) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(patients.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .map(|&name| {
                let dtype = if name == "oldpeak" {
                    DataType::Float64
                } else {
                    DataType::Int64
                };
                Field::new(name, dtype, false)
            })
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            int_column(|p| p.age),
            int_column(|p| p.sex),
            int_column(|p| p.cp),
            int_column(|p| p.trestbps),
            int_column(|p| p.chol),
            int_column(|p| p.thalach),
            Arc::new(Float64Array::from(
                patients.iter().map(|p| p.oldpeak).collect::<Vec<_>>(),
            )),
            int_column(|p| p.target),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let patients: Vec<Patient> = (0..303).map(|_| generate_patient(&mut rng)).collect();

    let csv_path = "sample_heart.csv";
    let parquet_path = "sample_heart.parquet";
    write_csv(csv_path, &patients)?;
    write_parquet(parquet_path, &patients)?;

    let positives = patients.iter().filter(|p| p.target == 1).count();
    println!(
        "Wrote {} patients ({positives} with target = 1) to {csv_path} and {parquet_path}",
        patients.len()
    );
    Ok(())
}
