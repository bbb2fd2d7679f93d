//! Rider usertype classification for bike-share trips.
//!
//! A trip's attributes are mapped to a fixed eight-feature vector, scored by a
//! pre-trained classifier, and thresholded into `Subscriber` or `Customer`.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod sample;
pub mod schema;
pub mod server;
pub mod types;

pub use error::{PredictorError, Result};
pub use model::{load_classifier, Classifier, ForestClassifier};
pub use pipeline::{predict, Pipeline};
pub use sample::{load_sample, sample_rows, SampleDatasetRow};
pub use schema::{FeatureSource, FEATURE_NAMES};
pub use types::{Gender, PredictionResult, TripFeatureRecord, TripInput, UserType};
