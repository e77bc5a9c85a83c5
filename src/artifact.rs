//! Pre-fitted scoring artifacts and the process-wide store that owns them.
//!
//! An artifact bundles the ordered column schema, the standardization
//! parameters, and the classifier that were fitted together offline. Both
//! artifacts are loaded once at startup and never mutated; a mode whose
//! artifact cannot be loaded simply stays unavailable.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Scoring mode, one per fitted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Full,
    Reduced,
}

impl Mode {
    /// Canonical artifact file name for the mode.
    pub fn artifact_file(&self) -> &'static str {
        match self {
            Mode::Full => "exoplanet_or_not.json",
            Mode::Reduced => "simplified_exoplanet_or_not.json",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Full => write!(f, "full"),
            Mode::Reduced => write!(f, "reduced"),
        }
    }
}

/// Per-column affine standardization fitted offline: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect()
    }
}

/// One fitted logistic member of an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl MemberModel {
    fn probability(&self, row: &[f64]) -> f64 {
        sigmoid(dot(&self.coefficients, row) + self.intercept)
    }
}

/// Fitted classifier. Produces a probability vector over its classes for one
/// standardized row; class index 1 is the positive (confirmed) class for the
/// binary shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// Binary logistic regression.
    Logistic { coefficients: Vec<f64>, intercept: f64 },
    /// Soft-voting ensemble of binary logistic members. Member
    /// probabilities are averaged.
    SoftVoting { members: Vec<MemberModel> },
    /// Multinomial logistic regression, one coefficient row per class.
    Multinomial {
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
}

impl Classifier {
    /// Probability vector over the classes, one entry per class.
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        match self {
            Classifier::Logistic {
                coefficients,
                intercept,
            } => {
                let p = sigmoid(dot(coefficients, row) + intercept);
                vec![1.0 - p, p]
            }
            Classifier::SoftVoting { members } => {
                let total: f64 = members.iter().map(|m| m.probability(row)).sum();
                let p = total / members.len() as f64;
                vec![1.0 - p, p]
            }
            Classifier::Multinomial {
                coefficients,
                intercepts,
            } => {
                let scores: Vec<f64> = coefficients
                    .iter()
                    .zip(intercepts.iter())
                    .map(|(w, b)| dot(w, row) + b)
                    .collect();
                softmax(&scores)
            }
        }
    }

    /// Number of feature inputs the classifier was fitted on.
    pub fn input_width(&self) -> usize {
        match self {
            Classifier::Logistic { coefficients, .. } => coefficients.len(),
            Classifier::SoftVoting { members } => {
                members.first().map(|m| m.coefficients.len()).unwrap_or(0)
            }
            Classifier::Multinomial { coefficients, .. } => {
                coefficients.first().map(|w| w.len()).unwrap_or(0)
            }
        }
    }

    /// Number of classes in the probability vector.
    pub fn class_count(&self) -> usize {
        match self {
            Classifier::Logistic { .. } | Classifier::SoftVoting { .. } => 2,
            Classifier::Multinomial { coefficients, .. } => coefficients.len(),
        }
    }

    fn parameters_finite(&self) -> bool {
        match self {
            Classifier::Logistic {
                coefficients,
                intercept,
            } => coefficients.iter().all(|c| c.is_finite()) && intercept.is_finite(),
            Classifier::SoftVoting { members } => members.iter().all(|m| {
                m.coefficients.iter().all(|c| c.is_finite()) && m.intercept.is_finite()
            }),
            Classifier::Multinomial {
                coefficients,
                intercepts,
            } => {
                coefficients
                    .iter()
                    .all(|w| w.iter().all(|c| c.is_finite()))
                    && intercepts.iter().all(|b| b.is_finite())
            }
        }
    }
}

fn dot(w: &[f64], x: &[f64]) -> f64 {
    w.iter().zip(x.iter()).map(|(wi, xi)| wi * xi).sum()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}

/// A named, versioned bundle of column schema, scaler, and classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub version: u32,
    pub columns: Vec<String>,
    pub scaler: StandardScaler,
    pub classifier: Classifier,
}

impl Artifact {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let artifact: Artifact = serde_json::from_str(&raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Internal consistency of the fitted bundle. A failing artifact is
    /// never served; its mode stays unavailable.
    pub fn validate(&self) -> Result<()> {
        let width = self.columns.len();
        if width == 0 {
            return Err(self.defect("no columns declared"));
        }
        if self.scaler.mean.len() != width || self.scaler.scale.len() != width {
            return Err(self.defect(&format!(
                "scaler fitted on {}x{} values, schema has {} columns",
                self.scaler.mean.len(),
                self.scaler.scale.len(),
                width
            )));
        }
        if self.scaler.mean.iter().any(|m| !m.is_finite()) {
            return Err(self.defect("non-finite scaler mean"));
        }
        if self.scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(self.defect("zero or non-finite scaler scale"));
        }
        if let Classifier::SoftVoting { members } = &self.classifier {
            if members.is_empty() {
                return Err(self.defect("voting ensemble has no members"));
            }
            if members.iter().any(|m| m.coefficients.len() != width) {
                return Err(self.defect("ensemble member width differs from schema"));
            }
        }
        if let Classifier::Multinomial {
            coefficients,
            intercepts,
        } = &self.classifier
        {
            if coefficients.len() != intercepts.len() {
                return Err(self.defect("multinomial intercept count differs from class count"));
            }
            if coefficients.iter().any(|w| w.len() != width) {
                return Err(self.defect("multinomial row width differs from schema"));
            }
        }
        if self.classifier.input_width() != width {
            return Err(self.defect(&format!(
                "classifier fitted on {} features, schema has {} columns",
                self.classifier.input_width(),
                width
            )));
        }
        if self.classifier.class_count() < 2 {
            return Err(self.defect("classifier has fewer than two classes"));
        }
        if !self.classifier.parameters_finite() {
            return Err(self.defect("non-finite classifier parameters"));
        }
        Ok(())
    }

    fn defect(&self, detail: &str) -> Error {
        Error::Config(format!("artifact {}: {}", self.name, detail))
    }
}

/// Both artifact slots, loaded once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    full: Option<Arc<Artifact>>,
    reduced: Option<Arc<Artifact>>,
}

impl ArtifactStore {
    /// Loads both modes from the artifact directory. Never fails the
    /// process: a mode whose file is missing or invalid is logged and left
    /// unavailable, and the other mode is unaffected.
    pub fn load(artifact_dir: &Path) -> Self {
        let mut store = Self::default();
        for mode in [Mode::Full, Mode::Reduced] {
            let path = artifact_dir.join(mode.artifact_file());
            match Artifact::from_file(&path) {
                Ok(artifact) => {
                    info!(
                        "Loaded {} artifact '{}' v{} from {} ({} columns)",
                        mode,
                        artifact.name,
                        artifact.version,
                        path.display(),
                        artifact.columns.len()
                    );
                    store.set(mode, Arc::new(artifact));
                }
                Err(e) => {
                    error!(
                        "Failed to load {} artifact from {}: {}",
                        mode,
                        path.display(),
                        e
                    );
                }
            }
        }
        store
    }

    /// Builds a store directly from loaded artifacts.
    pub fn from_parts(full: Option<Artifact>, reduced: Option<Artifact>) -> Self {
        Self {
            full: full.map(Arc::new),
            reduced: reduced.map(Arc::new),
        }
    }

    fn set(&mut self, mode: Mode, artifact: Arc<Artifact>) {
        match mode {
            Mode::Full => self.full = Some(artifact),
            Mode::Reduced => self.reduced = Some(artifact),
        }
    }

    pub fn get(&self, mode: Mode) -> Result<&Artifact> {
        let slot = match mode {
            Mode::Full => &self.full,
            Mode::Reduced => &self.reduced,
        };
        slot.as_deref().ok_or(Error::ArtifactUnavailable { mode })
    }

    pub fn available(&self, mode: Mode) -> bool {
        match mode {
            Mode::Full => self.full.is_some(),
            Mode::Reduced => self.reduced.is_some(),
        }
    }
}
