use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

use super::{Classifier, Label};
use crate::prepare::features::FeatureMatrix;

/// Marker in `children_left` / `children_right` for a leaf node.
pub const LEAF: i64 = -1;

// ---------------------------------------------------------------------------
// DecisionTree – flat node arrays
// ---------------------------------------------------------------------------

/// One fitted tree stored as parallel node arrays (node 0 is the root).
///
/// Internal node `i` sends a sample left when
/// `x[feature[i]] <= threshold[i]`.  For a leaf, `value[i]` holds per-class
/// weights (sample counts or fractions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        let n = self.node_count();
        ensure!(n > 0, "tree has no nodes");
        ensure!(
            self.children_right.len() == n
                && self.feature.len() == n
                && self.threshold.len() == n
                && self.value.len() == n,
            "node arrays have mismatched lengths"
        );

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                ensure!(right == LEAF, "node {node}: only one child is a leaf marker");
                ensure!(
                    self.value[node].len() == n_classes,
                    "node {node}: leaf has {} class weights, expected {n_classes}",
                    self.value[node].len()
                );
                continue;
            }
            // Children must point forward so traversal always terminates.
            for child in [left, right] {
                ensure!(
                    child > node as i64 && (child as usize) < n,
                    "node {node}: child index {child} out of range"
                );
            }
            let feature = self.feature[node];
            ensure!(
                feature >= 0 && (feature as usize) < n_features,
                "node {node}: split feature {feature} out of range"
            );
        }
        Ok(())
    }

    /// Class probabilities of the leaf reached by `sample`.
    fn leaf_distribution(&self, sample: &[f64]) -> Vec<f64> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = sample[self.feature[node] as usize];
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let weights = &self.value[node];
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            weights.iter().map(|w| w / total).collect()
        } else {
            vec![0.0; weights.len()]
        }
    }
}

// ---------------------------------------------------------------------------
// RandomForest – averaged tree ensemble
// ---------------------------------------------------------------------------

/// Tree ensemble classifier.  Prediction averages the per-tree class
/// probabilities and picks the most probable class (lowest index on ties).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Load and validate the classifier artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading classifier {}", path.display()))?;
        let forest = Self::from_json(&text)
            .with_context(|| format!("parsing classifier {}", path.display()))?;
        log::info!(
            "Loaded classifier with {} trees over {} features from {}",
            forest.trees.len(),
            forest.n_features,
            path.display()
        );
        Ok(forest)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let forest: RandomForest = serde_json::from_str(text).context("parsing classifier JSON")?;
        forest.validate()?;
        Ok(forest)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            bail!("classifier has no trees");
        }
        ensure!(self.classes.len() >= 2, "classifier needs at least two classes");
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .with_context(|| format!("tree {i}"))?;
        }
        Ok(())
    }

    /// Averaged class probabilities for one sample.
    pub fn predict_proba(&self, sample: &[f64]) -> Vec<f64> {
        let mut acc = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (slot, p) in acc.iter_mut().zip(tree.leaf_distribution(sample)) {
                *slot += p;
            }
        }
        let n = self.trees.len() as f64;
        acc.iter_mut().for_each(|p| *p /= n);
        acc
    }

    fn predict_one(&self, sample: &[f64]) -> Label {
        let proba = self.predict_proba(sample);
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        Label::from_class(self.classes[best])
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureMatrix) -> Vec<Label> {
        features
            .rows()
            .iter()
            .map(|row| self.predict_one(row))
            .collect()
    }
}
