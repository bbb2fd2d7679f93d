//! Historical trip rows shown alongside the predictor.

use anyhow::{Context, Result};
use rand::{rngs::StdRng, seq::index, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{io::Read, path::Path};

pub const DEFAULT_SAMPLE_SIZE: usize = 5;
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDatasetRow {
    #[serde(default)]
    pub user_type: Option<u8>, // 0 = Subscriber, 1 = Customer
    pub trip_duration: u64, // seconds, as stored
    #[serde(skip_deserializing)]
    pub trip_duration_min: u64,
    pub start_station_id: u32,
    pub end_station_id: u32,
    pub age: u32,
    pub gender: u8,
    pub start_hour: u8,
    pub start_day_of_week: u8,
    pub distance: f64, // meters
}

/// Whole minutes, truncating: 119 s is 1 min.
pub fn seconds_to_minutes(secs: u64) -> u64 {
    secs / 60
}

/// Read every row of the trip CSV and attach the minute duration.
pub fn load_sample(path: &Path) -> Result<Vec<SampleDatasetRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open dataset at {}", path.display()))?;
    from_reader(file).with_context(|| format!("failed to parse dataset {}", path.display()))
}

pub fn from_reader<R: Read>(rdr: R) -> Result<Vec<SampleDatasetRow>> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for (i, rec) in reader.deserialize::<SampleDatasetRow>().enumerate() {
        // +2: header line and 1-based numbering
        let mut row = rec.with_context(|| format!("line {}: malformed row", i + 2))?;
        row.trip_duration_min = seconds_to_minutes(row.trip_duration);
        rows.push(row);
    }
    Ok(rows)
}

/// Pick `n` rows without replacement using a generator seeded from `seed` alone.
///
/// The same rows and seed always give the same selection in the same order.
/// Asking for more rows than exist returns all of them, shuffled.
pub fn sample_rows(rows: &[SampleDatasetRow], n: usize, seed: u64) -> Vec<SampleDatasetRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let amount = n.min(rows.len());
    index::sample(&mut rng, rows.len(), amount)
        .into_iter()
        .map(|i| rows[i].clone())
        .collect()
}
