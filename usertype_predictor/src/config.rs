use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::error::{PredictorError, Result};
use crate::pipeline::DEFAULT_THRESHOLD;
use crate::sample::{DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE};
use crate::schema::FeatureSource;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub port: u16,
    pub threshold: f64,
    pub sample_size: usize,
    pub sample_seed: u64,
    pub feature_source: FeatureSource,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("rf_model.json"),
            dataset_path: PathBuf::from("citibike_tripdata.csv"),
            port: 8080,
            threshold: DEFAULT_THRESHOLD,
            sample_size: DEFAULT_SAMPLE_SIZE,
            sample_seed: DEFAULT_SAMPLE_SEED,
            feature_source: FeatureSource::Named,
        }
    }
}

impl ServiceConfig {
    /// Defaults, then the JSON file named by `CONFIG_PATH`, then individual env vars.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|k| std::env::var(k).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an injectable variable lookup.
    pub fn resolve<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match var("CONFIG_PATH") {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };

        if let Some(v) = var("MODEL_PATH") {
            cfg.model_path = PathBuf::from(v);
        }
        if let Some(v) = var("DATASET_PATH") {
            cfg.dataset_path = PathBuf::from(v);
        }
        if let Some(v) = var("PORT") {
            cfg.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = var("THRESHOLD") {
            cfg.threshold = parse_var("THRESHOLD", &v)?;
        }
        if let Some(v) = var("SAMPLE_SIZE") {
            cfg.sample_size = parse_var("SAMPLE_SIZE", &v)?;
        }
        if let Some(v) = var("SAMPLE_SEED") {
            cfg.sample_seed = parse_var("SAMPLE_SEED", &v)?;
        }
        if let Some(v) = var("FEATURE_SOURCE") {
            cfg.feature_source = v.parse()?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| PredictorError::Config(format!("config file {path}: {e}")))?;
        serde_json::from_str(&data)
            .map_err(|e| PredictorError::Config(format!("invalid config JSON in {path}: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PredictorError::Config(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| PredictorError::Config(format!("{name}={value:?}: {e}")))
}
