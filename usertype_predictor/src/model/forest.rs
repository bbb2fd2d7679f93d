//! Random-forest style tree ensemble read from a JSON artifact.
//!
//! Each leaf stores per-class counts (or fractions). A tree's prediction is its
//! leaf normalised to a distribution; the forest averages its trees.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use super::Classifier;
use crate::error::{self, PredictorError};
use crate::schema::{self, FeatureVector, FEATURE_COUNT};

/// A decision tree node: either a leaf carrying class counts or a split.
///
/// Split fields are all required; a node missing any of them fails to parse.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Node {
    Leaf {
        value: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    feature_names: Vec<String>,
    n_classes: usize,
    trees: Vec<Tree>,
}

#[derive(Debug)]
pub struct ForestClassifier {
    feature_names: Vec<String>,
    n_classes: usize,
    trees: Vec<Tree>,
}

impl ForestClassifier {
    pub fn load(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .with_context(|| format!("failed to read classifier at {}", path.display()))?;
        let forest = Self::from_json(&txt)
            .with_context(|| format!("failed to load classifier {}", path.display()))?;
        tracing::debug!(
            trees = forest.trees.len(),
            n_classes = forest.n_classes,
            "loaded forest classifier"
        );
        Ok(forest)
    }

    pub fn from_json(txt: &str) -> error::Result<Self> {
        let art: ForestArtifact = serde_json::from_str(txt)
            .map_err(|e| PredictorError::InvalidArtifact(e.to_string()))?;
        schema::verify(&art.feature_names)?;
        if art.n_classes < 2 {
            return Err(PredictorError::InvalidArtifact(format!(
                "n_classes must be at least 2, got {}",
                art.n_classes
            )));
        }
        if art.trees.is_empty() {
            return Err(PredictorError::InvalidArtifact("forest has no trees".into()));
        }
        for (i, tree) in art.trees.iter().enumerate() {
            validate_tree(tree, art.n_classes)
                .map_err(|msg| PredictorError::InvalidArtifact(format!("tree {i}: {msg}")))?;
        }
        Ok(Self {
            feature_names: art.feature_names,
            n_classes: art.n_classes,
            trees: art.trees,
        })
    }

    fn predict_row(&self, x: &FeatureVector) -> error::Result<Vec<f64>> {
        let mut acc = vec![0.0; self.n_classes];
        for (i, tree) in self.trees.iter().enumerate() {
            let leaf = eval_tree(tree, x).ok_or_else(|| {
                PredictorError::Inference(format!("tree {i} did not reach a leaf"))
            })?;
            let total: f64 = leaf.iter().sum();
            for (a, v) in acc.iter_mut().zip(leaf) {
                *a += v / total;
            }
        }
        let n = self.trees.len() as f64;
        acc.iter_mut().for_each(|a| *a /= n);
        Ok(acc)
    }
}

impl Classifier for ForestClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, rows: &[FeatureVector]) -> error::Result<Vec<Vec<f64>>> {
        rows.iter().map(|x| self.predict_row(x)).collect()
    }
}

/// Children must sit after their parent, so every walk reaches a leaf.
fn validate_tree(tree: &Tree, n_classes: usize) -> std::result::Result<(), String> {
    if tree.nodes.is_empty() {
        return Err("no nodes".into());
    }
    let len = tree.nodes.len();
    for (idx, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Leaf { value } => {
                if value.len() != n_classes {
                    return Err(format!(
                        "leaf {idx} has {} values, expected {n_classes}",
                        value.len()
                    ));
                }
                if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(format!("leaf {idx} has a negative or non-finite value"));
                }
                if value.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {idx} is empty"));
                }
            }
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= FEATURE_COUNT {
                    return Err(format!("node {idx} splits on feature {feature}"));
                }
                if *left >= len || *right >= len {
                    return Err(format!("node {idx} has a child out of range"));
                }
                if *left <= idx || *right <= idx {
                    return Err(format!("node {idx} points back to itself or an ancestor"));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {idx} has a non-finite threshold"));
                }
            }
        }
    }
    Ok(())
}

/// Walk `tree` for `x`; `x[feature] <= threshold` goes left.
///
/// Returns `None` if the walk leaves the node table.
fn eval_tree<'a>(tree: &'a Tree, x: &FeatureVector) -> Option<&'a [f64]> {
    let mut idx = 0usize;
    loop {
        match tree.nodes.get(idx)? {
            Node::Leaf { value } => return Some(value.as_slice()),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                idx = if *x.get(*feature)? <= *threshold {
                    *left
                } else {
                    *right
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names() -> Vec<&'static str> {
        schema::FEATURE_NAMES.to_vec()
    }

    // Root splits on age (index 3) at 40.
    fn age_tree(young: [f64; 2], old: [f64; 2]) -> serde_json::Value {
        json!({
            "nodes": [
                { "feature": 3, "threshold": 40.0, "left": 1, "right": 2 },
                { "value": young },
                { "value": old }
            ]
        })
    }

    fn row(age: f64) -> FeatureVector {
        [600.0, 3100.0, 3200.0, age, 0.0, 8.0, 1.0, 1200.0]
    }

    #[test]
    fn single_tree_normalises_leaf_counts() {
        let art = json!({
            "feature_names": names(),
            "n_classes": 2,
            "trees": [age_tree([30.0, 10.0], [5.0, 5.0])]
        });
        let forest = ForestClassifier::from_json(&art.to_string()).unwrap();
        let out = forest.predict_proba(&[row(25.0), row(60.0)]).unwrap();
        assert_eq!(out[0], vec![0.75, 0.25]);
        assert_eq!(out[1], vec![0.5, 0.5]);
    }

    #[test]
    fn threshold_boundary_goes_left() {
        let art = json!({
            "feature_names": names(),
            "n_classes": 2,
            "trees": [age_tree([1.0, 0.0], [0.0, 1.0])]
        });
        let forest = ForestClassifier::from_json(&art.to_string()).unwrap();
        let out = forest.predict_proba(&[row(40.0)]).unwrap();
        assert_eq!(out[0], vec![1.0, 0.0]);
    }

    #[test]
    fn forest_averages_tree_distributions() {
        let art = json!({
            "feature_names": names(),
            "n_classes": 2,
            "trees": [
                age_tree([1.0, 0.0], [0.0, 1.0]),
                { "nodes": [ { "value": [1.0, 1.0] } ] }
            ]
        });
        let forest = ForestClassifier::from_json(&art.to_string()).unwrap();
        let out = forest.predict_proba(&[row(60.0)]).unwrap();
        assert_eq!(out[0], vec![0.25, 0.75]);
    }

    #[test]
    fn rejects_artifact_with_different_feature_order() {
        let mut n = names();
        n.swap(0, 1);
        let art = json!({
            "feature_names": n,
            "n_classes": 2,
            "trees": [age_tree([1.0, 0.0], [0.0, 1.0])]
        });
        let err = ForestClassifier::from_json(&art.to_string()).unwrap_err();
        assert!(matches!(err, PredictorError::SchemaMismatch { .. }));
    }

    #[test]
    fn rejects_child_out_of_range() {
        let art = json!({
            "feature_names": names(),
            "n_classes": 2,
            "trees": [{ "nodes": [ { "feature": 0, "threshold": 1.0, "left": 1, "right": 9 },
                                   { "value": [1.0, 0.0] } ] }]
        });
        assert!(matches!(
            ForestClassifier::from_json(&art.to_string()),
            Err(PredictorError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn rejects_leaf_with_wrong_class_count() {
        let art = json!({
            "feature_names": names(),
            "n_classes": 2,
            "trees": [{ "nodes": [ { "value": [1.0, 0.0, 0.0] } ] }]
        });
        assert!(ForestClassifier::from_json(&art.to_string()).is_err());
    }

    #[test]
    fn rejects_empty_forest() {
        let art = json!({ "feature_names": names(), "n_classes": 2, "trees": [] });
        assert!(ForestClassifier::from_json(&art.to_string()).is_err());
    }

    #[test]
    fn rejects_tree_that_loops_back() {
        let art = json!({
            "feature_names": names(),
            "n_classes": 2,
            "trees": [{ "nodes": [
                { "feature": 0, "threshold": 1800.0, "left": 1, "right": 0 },
                { "value": [1.0, 0.0] }
            ] }]
        });
        let err = ForestClassifier::from_json(&art.to_string()).unwrap_err();
        assert!(matches!(err, PredictorError::InvalidArtifact(_)), "{err}");
    }

    #[test]
    fn rejects_split_without_children() {
        let art = json!({
            "feature_names": names(),
            "n_classes": 2,
            "trees": [{ "nodes": [
                { "threshold": 5.0 },
                { "value": [1.0, 0.0] }
            ] }]
        });
        let err = ForestClassifier::from_json(&art.to_string()).unwrap_err();
        assert!(matches!(err, PredictorError::InvalidArtifact(_)), "{err}");
    }
}
