//! Named mapping from a [`TripFeatureRecord`] to the classifier's input vector.
//!
//! The vector layout is defined once, in [`FEATURES`]. Artifacts
//! declare the order they were trained with and are checked against it on load.

use serde::Deserialize;
use std::str::FromStr;

use crate::error::{PredictorError, Result};
use crate::types::TripFeatureRecord;

pub const FEATURE_COUNT: usize = 8;

/// One slot of the classifier input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    TripDuration,
    StartStationId,
    EndStationId,
    Age,
    Gender,
    StartHour,
    StartDayOfWeek,
    Distance,
}

impl Feature {
    pub const fn name(self) -> &'static str {
        match self {
            Feature::TripDuration => "trip_duration",
            Feature::StartStationId => "start_station_id",
            Feature::EndStationId => "end_station_id",
            Feature::Age => "age",
            Feature::Gender => "gender",
            Feature::StartHour => "start_hour",
            Feature::StartDayOfWeek => "start_day_of_week",
            Feature::Distance => "distance",
        }
    }
}

/// Authoritative input order.
pub const FEATURES: [Feature; FEATURE_COUNT] = [
    Feature::TripDuration,
    Feature::StartStationId,
    Feature::EndStationId,
    Feature::Age,
    Feature::Gender,
    Feature::StartHour,
    Feature::StartDayOfWeek,
    Feature::Distance,
];

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = {
    let mut names = [""; FEATURE_COUNT];
    let mut i = 0;
    while i < FEATURE_COUNT {
        names[i] = FEATURES[i].name();
        i += 1;
    }
    names
};

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Where each vector slot takes its value from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSource {
    /// Every slot reads its own named field.
    #[default]
    Named,
    /// `start_day_of_week` and `distance` slots are filled from `start_hour`,
    /// matching how the deployed model was historically queried.
    HourSubstituted,
}

impl FromStr for FeatureSource {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "named" => Ok(FeatureSource::Named),
            "hour_substituted" => Ok(FeatureSource::HourSubstituted),
            other => Err(PredictorError::Config(format!(
                "unknown feature source {other:?} (expected \"named\" or \"hour_substituted\")"
            ))),
        }
    }
}

fn feature_value(record: &TripFeatureRecord, feature: Feature, source: FeatureSource) -> f64 {
    let hour = f64::from(record.start_hour);
    match feature {
        Feature::TripDuration => f64::from(record.trip_duration),
        Feature::StartStationId => f64::from(record.start_station_id),
        Feature::EndStationId => f64::from(record.end_station_id),
        Feature::Age => f64::from(record.age),
        Feature::Gender => f64::from(record.gender.code()),
        Feature::StartHour => hour,
        Feature::StartDayOfWeek => match source {
            FeatureSource::Named => f64::from(record.start_day_of_week),
            FeatureSource::HourSubstituted => hour,
        },
        Feature::Distance => match source {
            FeatureSource::Named => f64::from(record.distance),
            FeatureSource::HourSubstituted => hour,
        },
    }
}

/// Build the classifier input for one record, slot by slot from [`FEATURES`].
pub fn to_vector(record: &TripFeatureRecord, source: FeatureSource) -> FeatureVector {
    FEATURES.map(|f| feature_value(record, f, source))
}

/// Reject an artifact whose declared feature order differs from ours.
pub fn verify(declared: &[String]) -> Result<()> {
    let matches = declared.len() == FEATURE_COUNT
        && declared.iter().zip(FEATURE_NAMES).all(|(d, e)| d == e);
    if matches {
        Ok(())
    } else {
        Err(PredictorError::SchemaMismatch {
            expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            declared: declared.to_vec(),
        })
    }
}
