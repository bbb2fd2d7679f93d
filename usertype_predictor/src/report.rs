use chrono::{DateTime, Local, TimeZone};

use crate::types::{OutcomeRow, PredictionResult, TripFeatureRecord, TripInput};

/// Assemble the results row for one submission, stamped at `at`.
///
/// Identity fields are copied verbatim; only `prediction` carries the label.
pub fn outcome_row<Tz: TimeZone>(
    input: &TripInput,
    record: &TripFeatureRecord,
    result: &PredictionResult,
    at: &DateTime<Tz>,
) -> OutcomeRow
where
    Tz::Offset: std::fmt::Display,
{
    OutcomeRow {
        name: input.name.clone(),
        surname: input.surname.clone(),
        date: at.format("%Y-%m-%d").to_string(),
        time: at.format("%H:%M:%S").to_string(),
        trip_duration: record.trip_duration,
        start_station_id: record.start_station_id,
        end_station_id: record.end_station_id,
        age: record.age,
        gender: record.gender.code(),
        start_hour: record.start_hour,
        start_day_of_week: record.start_day_of_week,
        distance: record.distance,
        probability: result.probability,
        prediction: result.label,
    }
}

pub fn outcome_row_now(
    input: &TripInput,
    record: &TripFeatureRecord,
    result: &PredictionResult,
) -> OutcomeRow {
    outcome_row(input, record, result, &Local::now())
}
