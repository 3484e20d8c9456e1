//! Gradient-boosted tree ensemble (binary logistic objective).

use super::{sigmoid, ModelError};
use crate::features::FEATURE_COUNT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split(Split),
    Leaf(f64),
}

/// Flat node array; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Initial margin (log-odds) before any tree contributes
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl Tree {
    /// Child indices must point forward, which rules out cycles and bounds the walk.
    pub fn validate(&self, tree_idx: usize) -> Result<(), ModelError> {
        let invalid = |msg: String| ModelError::Invalid(format!("tree {tree_idx}: {msg}"));
        if self.nodes.is_empty() {
            return Err(invalid("no nodes".into()));
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf(v) if !v.is_finite() => {
                    return Err(invalid(format!("node {i} has non-finite leaf")));
                }
                Node::Leaf(_) => {}
                Node::Split(s) => {
                    if s.feature >= FEATURE_COUNT {
                        return Err(invalid(format!("node {i} splits on feature {}", s.feature)));
                    }
                    if !s.threshold.is_finite() {
                        return Err(invalid(format!("node {i} has non-finite threshold")));
                    }
                    for child in [s.left, s.right] {
                        if child <= i || child >= len {
                            return Err(invalid(format!("node {i} has bad child {child}")));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk to a leaf. A sample goes left when `x[feature] < threshold`.
    pub fn leaf_value(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf(v) => return *v,
                Node::Split(s) => {
                    i = if x[s.feature] < s.threshold {
                        s.left
                    } else {
                        s.right
                    };
                }
            }
        }
    }
}

impl TreeEnsemble {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.base_score.is_finite() {
            return Err(ModelError::Invalid("non-finite base_score".into()));
        }
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("tree ensemble has no trees".into()));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(idx)?;
        }
        Ok(())
    }

    pub fn margin(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.leaf_value(x))
    }

    pub fn probability(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        sigmoid(self.margin(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
        Tree {
            nodes: vec![
                Node::Split(Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                }),
                Node::Leaf(left),
                Node::Leaf(right),
            ],
        }
    }

    #[test]
    fn split_goes_left_strictly_below_threshold() {
        let t = stump(0, 1.0, -1.0, 1.0);
        assert_eq!(t.leaf_value(&[0.5, 0.0, 0.0, 0.0, 0.0]), -1.0);
        assert_eq!(t.leaf_value(&[1.0, 0.0, 0.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn margin_sums_base_and_leaves() {
        let e = TreeEnsemble {
            base_score: 0.5,
            trees: vec![stump(0, 0.0, -0.25, 0.25), stump(4, 0.0, -0.5, 0.5)],
        };
        let x = [1.0, 0.0, 0.0, 0.0, -1.0];
        assert!((e.margin(&x) - 0.25).abs() < 1e-12);
        assert!((e.probability(&x) - sigmoid(0.25)).abs() < 1e-12);
    }

    #[test]
    fn rejects_backward_child_and_bad_feature() {
        let mut t = stump(0, 0.0, 0.0, 0.0);
        if let Node::Split(s) = &mut t.nodes[0] {
            s.left = 0;
        }
        assert!(t.validate(0).is_err());

        let t = stump(5, 0.0, 0.0, 0.0);
        assert!(t.validate(0).is_err());

        let t = Tree { nodes: vec![] };
        assert!(t.validate(0).is_err());
    }

    #[test]
    fn node_json_shape() {
        let node: Node = serde_json::from_str(r#"{"leaf": 0.25}"#).unwrap();
        assert_eq!(node, Node::Leaf(0.25));
        let node: Node = serde_json::from_str(
            r#"{"split": {"feature": 3, "threshold": 0.5, "left": 1, "right": 2}}"#,
        )
        .unwrap();
        assert!(matches!(node, Node::Split(Split { feature: 3, .. })));
    }
}
