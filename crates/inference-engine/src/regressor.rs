//! Opaque Regressor Capability and Tree Ensemble
//!
//! The serving path only needs `predict(matrix) -> vector`. [`TreeEnsemble`]
//! is the serialized gradient-boosted model produced by the external
//! training run.

use crate::InferenceError;
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Capability interface of a trained regressor
pub trait Regressor: Send + Sync {
    /// Number of input columns
    fn n_features(&self) -> usize;

    /// One prediction per input row
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<f64>, InferenceError>;
}

/// Tree node; `x[feature] < threshold` goes left, everything else
/// (including NaN) goes right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Deserialize)]
struct TreeEnsembleParts {
    n_features: usize,
    #[serde(default)]
    base_score: f64,
    trees: Vec<Vec<TreeNode>>,
}

/// Additive ensemble of regression trees: `base_score + Σ leaf(tree, x)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeEnsembleParts")]
pub struct TreeEnsemble {
    n_features: usize,
    base_score: f64,
    trees: Vec<Vec<TreeNode>>,
}

impl TreeEnsemble {
    /// Build and validate an ensemble. Every child index must lie after its
    /// parent, so evaluation always terminates.
    pub fn new(
        n_features: usize,
        base_score: f64,
        trees: Vec<Vec<TreeNode>>,
    ) -> Result<Self, InferenceError> {
        if n_features == 0 {
            return Err(InferenceError::InvalidModel(
                "regressor declares zero features".to_string(),
            ));
        }
        if !base_score.is_finite() {
            return Err(InferenceError::InvalidModel(
                "base score is not finite".to_string(),
            ));
        }

        for (t, tree) in trees.iter().enumerate() {
            if tree.is_empty() {
                return Err(InferenceError::InvalidModel(format!("tree {} has no nodes", t)));
            }
            for (i, node) in tree.iter().enumerate() {
                match *node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if feature >= n_features {
                            return Err(InferenceError::InvalidModel(format!(
                                "tree {} node {} splits on feature {} of {}",
                                t, i, feature, n_features
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(InferenceError::InvalidModel(format!(
                                "tree {} node {} has a non-finite threshold",
                                t, i
                            )));
                        }
                        for child in [left, right] {
                            if child <= i || child >= tree.len() {
                                return Err(InferenceError::InvalidModel(format!(
                                    "tree {} node {} has child {} out of range",
                                    t, i, child
                                )));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if !value.is_finite() {
                            return Err(InferenceError::InvalidModel(format!(
                                "tree {} leaf {} is not finite",
                                t, i
                            )));
                        }
                    }
                }
            }
        }

        Ok(Self {
            n_features,
            base_score,
            trees,
        })
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut total = self.base_score;
        for tree in &self.trees {
            let mut idx = 0;
            loop {
                match tree[idx] {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        idx = if row[feature] < threshold { left } else { right };
                    }
                    TreeNode::Leaf { value } => {
                        total += value;
                        break;
                    }
                }
            }
        }
        total
    }
}

impl TryFrom<TreeEnsembleParts> for TreeEnsemble {
    type Error = InferenceError;

    fn try_from(parts: TreeEnsembleParts) -> Result<Self, Self::Error> {
        Self::new(parts.n_features, parts.base_score, parts.trees)
    }
}

impl Regressor for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<f64>, InferenceError> {
        if features.ncols() != self.n_features {
            return Err(InferenceError::InvalidInputShape {
                expected: self.n_features,
                actual: features.ncols(),
            });
        }

        Ok(features
            .rows()
            .into_iter()
            .map(|row| self.predict_row(row))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Vec<TreeNode> {
        vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: left },
            TreeNode::Leaf { value: right },
        ]
    }

    #[test]
    fn test_predict_sums_trees() {
        let model = TreeEnsemble::new(
            2,
            10.0,
            vec![stump(0, 0.5, -1.0, 1.0), stump(1, 0.0, 0.25, 0.5)],
        )
        .unwrap();

        let predictions = model.predict(array![[0.0, -1.0], [1.0, 1.0]].view()).unwrap();
        assert_eq!(predictions, vec![9.25, 11.5]);
    }

    #[test]
    fn test_threshold_goes_right_and_nan_goes_right() {
        let model = TreeEnsemble::new(1, 0.0, vec![stump(0, 0.5, -1.0, 1.0)]).unwrap();
        let predictions = model.predict(array![[0.5], [f64::NAN]].view()).unwrap();
        assert_eq!(predictions, vec![1.0, 1.0]);
    }

    #[test]
    fn test_width_checked() {
        let model = TreeEnsemble::new(2, 0.0, vec![stump(0, 0.5, -1.0, 1.0)]).unwrap();
        assert!(matches!(
            model.predict(array![[1.0, 2.0, 3.0]].view()),
            Err(InferenceError::InvalidInputShape { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_structure_validated() {
        // Feature out of range
        assert!(TreeEnsemble::new(1, 0.0, vec![stump(3, 0.5, 0.0, 0.0)]).is_err());

        // Child pointing backwards would loop
        let cyclic = vec![
            TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 1,
            },
            TreeNode::Leaf { value: 1.0 },
        ];
        assert!(TreeEnsemble::new(1, 0.0, vec![cyclic]).is_err());

        // Empty tree
        assert!(TreeEnsemble::new(1, 0.0, vec![vec![]]).is_err());
    }

    #[test]
    fn test_json_format() {
        let json = r#"{
            "n_features": 1,
            "base_score": 2.0,
            "trees": [[
                {"type": "split", "feature": 0, "threshold": 10.0, "left": 1, "right": 2},
                {"type": "leaf", "value": 1.0},
                {"type": "leaf", "value": 3.0}
            ]]
        }"#;
        let model: TreeEnsemble = serde_json::from_str(json).unwrap();
        assert_eq!(model.n_trees(), 1);
        assert_eq!(model.predict(array![[20.0]].view()).unwrap(), vec![5.0]);

        let bad = json.replace("\"right\": 2", "\"right\": 9");
        assert!(serde_json::from_str::<TreeEnsemble>(&bad).is_err());
    }
}
