//! Range checks applied where user input enters the service.

use std::ops::RangeInclusive;

use crate::error::{PredictorError, Result};
use crate::types::{Gender, TripFeatureRecord, TripInput};

pub const TRIP_DURATION_MIN: RangeInclusive<u32> = 1..=5000;
pub const STATION_ID: RangeInclusive<u32> = 3000..=4000;
pub const AGE: RangeInclusive<u8> = 0..=100;
pub const START_HOUR: RangeInclusive<u8> = 0..=23;
pub const START_DAY_OF_WEEK: RangeInclusive<u8> = 0..=6;
pub const DISTANCE: RangeInclusive<u32> = 0..=5000;

fn check<T>(field: &str, value: T, range: &RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(PredictorError::InvalidInput(format!(
            "{field} = {value} outside {}..={}",
            range.start(),
            range.end()
        )))
    }
}

impl TripInput {
    /// Validate every field and convert minutes to seconds.
    pub fn to_record(&self) -> Result<TripFeatureRecord> {
        check("trip_duration_min", self.trip_duration_min, &TRIP_DURATION_MIN)?;
        check("start_station_id", self.start_station_id, &STATION_ID)?;
        check("end_station_id", self.end_station_id, &STATION_ID)?;
        check("age", self.age, &AGE)?;
        check("start_hour", self.start_hour, &START_HOUR)?;
        check("start_day_of_week", self.start_day_of_week, &START_DAY_OF_WEEK)?;
        check("distance", self.distance, &DISTANCE)?;
        let gender = Gender::parse(&self.gender).ok_or_else(|| {
            PredictorError::InvalidInput(format!(
                "gender = {:?}, expected \"Male\" or \"Female\"",
                self.gender
            ))
        })?;

        Ok(TripFeatureRecord {
            trip_duration: self.trip_duration_min * 60,
            start_station_id: self.start_station_id,
            end_station_id: self.end_station_id,
            age: self.age,
            gender,
            start_hour: self.start_hour,
            start_day_of_week: self.start_day_of_week,
            distance: self.distance,
        })
    }
}
