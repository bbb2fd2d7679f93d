use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Numeric code the classifier was trained on (0 = Male, 1 = Female).
    pub fn code(self) -> u8 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// The two target classes. Class index 1 of the classifier output is `Customer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Subscriber,
    Customer,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Subscriber => "Subscriber",
            UserType::Customer => "Customer",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trip, as fed to the classifier. Range checks happen before this is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripFeatureRecord {
    pub trip_duration: u32, // seconds
    pub start_station_id: u32,
    pub end_station_id: u32,
    pub age: u8,
    pub gender: Gender,
    pub start_hour: u8,        // 0..=23
    pub start_day_of_week: u8, // 0..=6, Monday = 0
    pub distance: u32,         // meters
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub probability: f64,
    pub label: UserType,
}

/// Raw submission from the UI. Duration arrives in minutes, gender as its label.
#[derive(Debug, Clone, Deserialize)]
pub struct TripInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub trip_duration_min: u32,
    pub start_station_id: u32,
    pub end_station_id: u32,
    pub age: u8,
    pub gender: String,
    pub start_hour: u8,
    pub start_day_of_week: u8,
    pub distance: u32,
}

/// The single results row shown after a submission.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Surname")]
    pub surname: String,
    #[serde(rename = "Date")]
    pub date: String, // YYYY-MM-DD
    #[serde(rename = "Time")]
    pub time: String, // HH:MM:SS
    pub trip_duration: u32,
    pub start_station_id: u32,
    pub end_station_id: u32,
    pub age: u8,
    pub gender: u8,
    pub start_hour: u8,
    pub start_day_of_week: u8,
    pub distance: u32,
    pub probability: f64,
    #[serde(rename = "Prediction")]
    pub prediction: UserType,
}
