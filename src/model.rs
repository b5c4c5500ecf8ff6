//! Pre-trained classifier loading and inference

use crate::error::{ModelError, Result};
use crate::types::{FEATURE_NAMES, FeatureVector, Label, PredictionResult};
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Location of the classifier artifact, relative to the working directory
pub const MODEL_PATH: &str = "models/phishing_detector_v1.json";

/// Child index marking a leaf node in the exported tree arrays
const LEAF: i64 = -1;

static SHARED_MODEL: OnceLock<Model> = OnceLock::new();

/// Process-wide classifier loaded from [`MODEL_PATH`] on first use
///
/// A failed load is returned to the caller and nothing is cached, so the
/// next call retries.
pub fn shared_model() -> Result<&'static Model> {
    if let Some(model) = SHARED_MODEL.get() {
        return Ok(model);
    }
    let model = Model::load(MODEL_PATH)?;
    Ok(SHARED_MODEL.get_or_init(|| model))
}

/// Binary classifier over a [`FeatureVector`], class 1 meaning phishing
pub trait Classifier {
    /// Class probabilities `[p(safe), p(phishing)]`
    fn predict_proba(&self, features: &FeatureVector) -> [f64; 2];

    /// Most probable class, ties going to [`Label::Safe`]
    fn predict(&self, features: &FeatureVector) -> Label {
        let [safe, phishing] = self.predict_proba(features);
        if phishing > safe {
            Label::Phishing
        } else {
            Label::Safe
        }
    }

    /// Predicted label with the probability of that label as confidence
    fn classify(&self, features: &FeatureVector) -> PredictionResult {
        let label = self.predict(features);
        let proba = self.predict_proba(features);
        PredictionResult::from_proba(label, proba)
    }
}

/// A loaded classifier artifact
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl Model {
    /// Read and validate an artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&json)?;

        info!("Loaded {} classifier from {}", model.kind(), path.display());
        Ok(model)
    }

    /// Parse and validate an artifact from its JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Artifact = serde_json::from_str(json)?;

        match artifact {
            Artifact::RandomForest {
                feature_names,
                trees,
            } => {
                check_feature_names(&feature_names)?;
                let trees = trees
                    .iter()
                    .map(DecisionTree::from_arrays)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::RandomForest(RandomForest::new(trees)?))
            }
            Artifact::LogisticRegression {
                feature_names,
                coefficients,
                intercept,
            } => {
                check_feature_names(&feature_names)?;
                let coefficients: [f64; 5] = coefficients.try_into().map_err(|c: Vec<f64>| {
                    schema(format!("expected 5 coefficients, found {}", c.len()))
                })?;
                Ok(Self::LogisticRegression(LogisticRegression::new(
                    coefficients,
                    intercept,
                )?))
            }
        }
    }

    /// Artifact kind as written in the `kind` field
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RandomForest(_) => "random_forest",
            Self::LogisticRegression(_) => "logistic_regression",
        }
    }
}

impl Classifier for Model {
    fn predict_proba(&self, features: &FeatureVector) -> [f64; 2] {
        match self {
            Self::RandomForest(forest) => forest.predict_proba(features),
            Self::LogisticRegression(logistic) => logistic.predict_proba(features),
        }
    }
}

/// Averaged ensemble of decision trees
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn new(trees: Vec<DecisionTree>) -> Result<Self> {
        if trees.is_empty() {
            return Err(schema("random forest has no trees"));
        }
        Ok(Self { trees })
    }

    #[must_use]
    pub const fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    #[allow(clippy::cast_precision_loss)]
    fn predict_proba(&self, features: &FeatureVector) -> [f64; 2] {
        let x = features.as_model_input();
        let [safe, phishing] = self
            .trees
            .iter()
            .map(|tree| tree.leaf_proba(&x))
            .fold([0.0, 0.0], |acc, p| [acc[0] + p[0], acc[1] + p[1]]);

        let n = self.trees.len() as f64;
        [safe / n, phishing / n]
    }
}

/// Single decision tree with validated node links
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: [f64; 2],
    },
}

impl DecisionTree {
    /// Normalized class weights of the leaf reached by `x`
    ///
    /// Goes left when `x[feature] <= threshold`. Children always have a
    /// higher index than their parent, so the walk terminates.
    fn leaf_proba(&self, x: &[f64; 5]) -> [f64; 2] {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { proba } => return proba,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    fn from_arrays(arrays: &TreeArrays) -> Result<Self> {
        let n = arrays.children_left.len();
        if n == 0 {
            return Err(schema("decision tree has no nodes"));
        }
        let lengths = [
            arrays.children_right.len(),
            arrays.feature.len(),
            arrays.threshold.len(),
            arrays.value.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(schema(format!(
                "decision tree arrays differ in length: {n} nodes vs {lengths:?}"
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        for (i, (&left, &right)) in arrays
            .children_left
            .iter()
            .zip(&arrays.children_right)
            .enumerate()
        {
            let node = if left == LEAF && right == LEAF {
                TreeNode::Leaf {
                    proba: normalize_weights(&arrays.value[i], i)?,
                }
            } else {
                let threshold = arrays.threshold[i];
                if !threshold.is_finite() {
                    return Err(schema(format!("node {i} has a non-finite threshold")));
                }
                TreeNode::Split {
                    feature: feature_index(arrays.feature[i], i)?,
                    threshold,
                    left: child_index(left, i, n)?,
                    right: child_index(right, i, n)?,
                }
            };
            nodes.push(node);
        }

        debug!("Validated decision tree with {n} nodes");
        Ok(Self { nodes })
    }
}

/// Binary logistic regression, `p(phishing) = sigmoid(w . x + b)`
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    coefficients: [f64; 5],
    intercept: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: [f64; 5], intercept: f64) -> Result<Self> {
        if !coefficients.iter().all(|c| c.is_finite()) || !intercept.is_finite() {
            return Err(schema("logistic regression weights must be finite"));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }
}

impl Classifier for LogisticRegression {
    fn predict_proba(&self, features: &FeatureVector) -> [f64; 2] {
        let decision = features
            .as_model_input()
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (x, w)| x.mul_add(*w, acc));

        let phishing = 1.0 / (1.0 + (-decision).exp());
        [1.0 - phishing, phishing]
    }
}

/// On-disk artifact layout
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Artifact {
    RandomForest {
        feature_names: Vec<String>,
        trees: Vec<TreeArrays>,
    },
    LogisticRegression {
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

/// Flat node arrays as exported from a fitted tree
#[derive(Debug, Deserialize)]
struct TreeArrays {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

fn schema(details: impl Into<String>) -> ModelError {
    ModelError::Schema(details.into())
}

fn check_feature_names(names: &[String]) -> Result<()> {
    let matches = names.len() == FEATURE_NAMES.len()
        && names.iter().zip(FEATURE_NAMES).all(|(name, expected)| name == expected);

    if matches {
        Ok(())
    } else {
        Err(schema(format!(
            "feature names {names:?} do not match {FEATURE_NAMES:?}"
        )))
    }
}

fn feature_index(feature: i64, node: usize) -> Result<usize> {
    usize::try_from(feature)
        .ok()
        .filter(|&f| f < FEATURE_NAMES.len())
        .ok_or_else(|| schema(format!("node {node} splits on unknown feature {feature}")))
}

fn child_index(child: i64, node: usize, n_nodes: usize) -> Result<usize> {
    usize::try_from(child)
        .ok()
        .filter(|&c| c > node && c < n_nodes)
        .ok_or_else(|| schema(format!("node {node} has invalid child {child}")))
}

fn normalize_weights(weights: &[f64], node: usize) -> Result<[f64; 2]> {
    let [safe, phishing] = weights else {
        return Err(schema(format!(
            "leaf {node} has {} class weights, expected 2",
            weights.len()
        )));
    };
    let valid = |w: f64| w.is_finite() && w >= 0.0;
    let total = safe + phishing;
    if !valid(*safe) || !valid(*phishing) || total <= 0.0 {
        return Err(schema(format!("leaf {node} has invalid class weights")));
    }
    Ok([safe / total, phishing / total])
}
