use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};
use tch::{kind::Kind, CModule, Device, Tensor};

use super::Classifier;
use crate::error::{self, PredictorError};
use crate::schema::{self, FeatureVector, FEATURE_COUNT};

#[derive(Deserialize)]
struct MetaJson {
    feat_list: Vec<String>,
}

/// TorchScript module mapping `[B, 8]` float input to `[B, n_classes]` probabilities.
pub struct TorchClassifier {
    model: CModule,
    device: Device,
    feat_list: Vec<String>,
    n_classes: usize,
}

impl TorchClassifier {
    /// Loads `<model>.pt` plus its `<model>.meta.json` companion.
    pub fn load(model_path: &Path) -> Result<Self> {
        let device = Device::Cpu;

        let meta_path = model_path.with_extension("meta.json");
        let meta_txt = fs::read_to_string(&meta_path)
            .with_context(|| format!("failed to read meta at {}", meta_path.display()))?;
        let meta: MetaJson =
            serde_json::from_str(&meta_txt).with_context(|| "failed to parse meta.json")?;
        schema::verify(&meta.feat_list)?;

        let model = CModule::load_on_device(model_path, device)
            .with_context(|| format!("failed to load TorchScript {}", model_path.display()))?;

        // Probe output shape with a dummy forward; expect [B=1, C]
        let dummy = Tensor::zeros([1, FEATURE_COUNT as i64], (Kind::Float, device));
        let t = tch::no_grad(|| model.forward_ts(&[dummy]))?;
        let sz = t.size();
        if sz.len() != 2 || sz[0] != 1 || sz[1] < 2 {
            bail!("unexpected model output size: {:?}", sz);
        }

        Ok(Self {
            model,
            device,
            feat_list: meta.feat_list,
            n_classes: sz[1] as usize,
        })
    }
}

impl Classifier for TorchClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feat_list
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, rows: &[FeatureVector]) -> error::Result<Vec<Vec<f64>>> {
        let flat: Vec<f32> = rows.iter().flatten().map(|v| *v as f32).collect();
        let input = Tensor::from_slice(&flat)
            .reshape([rows.len() as i64, FEATURE_COUNT as i64])
            .to_device(self.device);

        let out = tch::no_grad(|| self.model.forward_ts(&[input]))
            .map_err(|e| PredictorError::Inference(e.to_string()))?
            .to_kind(Kind::Double)
            .reshape([-1i64]);
        let values = Vec::<f64>::try_from(&out)
            .map_err(|e| PredictorError::Inference(e.to_string()))?;

        if values.len() != rows.len() * self.n_classes {
            return Err(PredictorError::Inference(format!(
                "expected {} outputs, got {}",
                rows.len() * self.n_classes,
                values.len()
            )));
        }
        Ok(values.chunks(self.n_classes).map(<[f64]>::to_vec).collect())
    }
}
