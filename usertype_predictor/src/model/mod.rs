//! Classifier artifacts: a trait for `predict_proba`-style models and the
//! backends that load them from disk.

use anyhow::Result;
use std::{path::Path, sync::Arc};

use crate::error;
use crate::schema::{FeatureVector, FEATURE_COUNT};

pub mod forest;
#[cfg(feature = "torchscript")]
pub mod torch;

pub use forest::ForestClassifier;

/// A trained model that returns a class distribution per input row.
///
/// Implementations are read-only after loading so one instance can be shared
/// across concurrent requests.
pub trait Classifier: Send + Sync {
    /// Feature order the model was trained with.
    fn feature_names(&self) -> &[String];

    fn n_classes(&self) -> usize;

    /// One probability distribution (length `n_classes`) per row.
    fn predict_proba(&self, rows: &[FeatureVector]) -> error::Result<Vec<Vec<f64>>>;
}

/// Load the classifier at `path`, picking the backend from the file extension.
///
/// `.pt` / `.ts` are TorchScript modules (requires the `torchscript` feature);
/// everything else is read as a JSON tree ensemble.
pub fn load_classifier(path: &Path) -> Result<Arc<dyn Classifier>> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        "pt" | "ts" => load_torchscript(path),
        _ => Ok(Arc::new(ForestClassifier::load(path)?)),
    }
}

#[cfg(feature = "torchscript")]
fn load_torchscript(path: &Path) -> Result<Arc<dyn Classifier>> {
    Ok(Arc::new(torch::TorchClassifier::load(path)?))
}

#[cfg(not(feature = "torchscript"))]
fn load_torchscript(path: &Path) -> Result<Arc<dyn Classifier>> {
    anyhow::bail!(
        "{} is a TorchScript module; rebuild with `--features torchscript`",
        path.display()
    )
}

/// Run one forward pass on an all-zero row and check the output shape.
pub fn warmup(classifier: &dyn Classifier) -> error::Result<()> {
    let out = classifier.predict_proba(&[[0.0; FEATURE_COUNT]])?;
    match out.first() {
        Some(dist) if dist.len() == classifier.n_classes() => Ok(()),
        other => Err(error::PredictorError::Inference(format!(
            "warmup returned unexpected output: {other:?}"
        ))),
    }
}
