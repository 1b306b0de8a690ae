//! Serialized demand model formats.
//!
//! A model maps one scaled feature row to a raw demand estimate. Both formats
//! are plain JSON so artifacts can be exported from any training stack.

use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// Trained regression model, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemandModel {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl DemandModel {
    /// Check the model against the number of input features.
    pub fn validate(&self, width: usize) -> Result<(), AiError> {
        match self {
            DemandModel::Linear(m) => m.validate(width),
            DemandModel::TreeEnsemble(m) => m.validate(width),
        }
    }

    /// Evaluate on one scaled feature row.
    pub fn evaluate(&self, row: &[f32]) -> f64 {
        match self {
            DemandModel::Linear(m) => m.evaluate(row),
            DemandModel::TreeEnsemble(m) => m.evaluate(row),
        }
    }
}

/// `intercept + Σ coefficient_i · x_i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    fn validate(&self, width: usize) -> Result<(), AiError> {
        if self.coefficients.len() != width {
            return Err(AiError::ArtifactMismatch(format!(
                "linear model has {} coefficient(s) for {} feature(s)",
                self.coefficients.len(),
                width
            )));
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f32]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * f64::from(*x))
                .sum::<f64>()
    }
}

/// Additive ensemble of regression trees:
/// `base_score + learning_rate · Σ tree(x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

fn default_learning_rate() -> f64 {
    1.0
}

impl TreeEnsemble {
    fn validate(&self, width: usize) -> Result<(), AiError> {
        if self.trees.is_empty() {
            return Err(AiError::ArtifactMismatch("tree ensemble has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(width)
                .map_err(|msg| AiError::ArtifactMismatch(format!("tree {i}: {msg}")))?;
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f32]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.evaluate(row)).sum();
        self.base_score + self.learning_rate * sum
    }
}

/// A tree node. `feature == -1` marks a leaf carrying `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub feature: i32,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default = "no_child")]
    pub left: i32,
    #[serde(default = "no_child")]
    pub right: i32,
    #[serde(default)]
    pub value: f64,
}

fn no_child() -> i32 {
    -1
}

impl Node {
    pub fn split(feature: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            feature,
            threshold,
            left,
            right,
            value: 0.0,
        }
    }

    pub fn leaf(value: f64) -> Self {
        Self {
            feature: -1,
            threshold: 0.0,
            left: -1,
            right: -1,
            value,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature < 0
    }
}

/// Nodes in array form, root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<Node>,
}

impl RegressionTree {
    /// Children must point forward in the node array, which rules out cycles.
    fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let len = self.nodes.len() as i64;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                continue;
            }
            if node.feature as usize >= width {
                return Err(format!(
                    "node {i} splits on feature {} but only {width} feature(s) exist",
                    node.feature
                ));
            }
            let i = i as i64;
            for child in [node.left as i64, node.right as i64] {
                if child <= i || child >= len {
                    return Err(format!("node {i} has invalid child index {child}"));
                }
            }
        }
        Ok(())
    }

    /// Go left when `x <= threshold`. Assumes a validated tree.
    fn evaluate(&self, row: &[f32]) -> f64 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node.value;
            }
            let x = f64::from(row[node.feature as usize]);
            idx = if x <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }
}
