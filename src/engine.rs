//! The prediction pipeline: verify columns, standardize, classify, and
//! assemble labeled results in input order. Performs no I/O; persistence is
//! the caller's concern.

use crate::artifact::{Artifact, ArtifactStore, Mode};
use crate::error::{Error, Result};
use crate::table::FeatureTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vetting outcome for one candidate. Class index 0 maps to a false
/// positive, 1 to a confirmed planet; no other index is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "False Positive")]
    FalsePositive,
    #[serde(rename = "Confirmed Planet")]
    ConfirmedPlanet,
}

impl Label {
    pub fn from_class_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Label::FalsePositive),
            1 => Ok(Label::ConfirmedPlanet),
            other => Err(Error::ModelContract {
                detail: format!("class index {} outside the binary label set", other),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::FalsePositive => "False Positive",
            Label::ConfirmedPlanet => "Confirmed Planet",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored candidate: the input feature values plus label and confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    values: Vec<f64>,
    label: Label,
    confidence: f64,
}

impl ResultRow {
    pub fn new(values: Vec<f64>, label: Label, confidence: f64) -> Self {
        Self {
            values,
            label,
            confidence,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn label(&self) -> Label {
        self.label
    }

    /// Winning-class probability, in `[0, 1]`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Confidence as a percentage with exactly two decimals, e.g. `97.42%`.
    pub fn confidence_display(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

/// Scored rows under the input column schema, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<ResultRow>) -> Result<Self> {
        for (index, row) in rows.iter().enumerate() {
            if row.values.len() != columns.len() {
                return Err(Error::ModelContract {
                    detail: format!(
                        "result row {} has {} values under {} columns",
                        index,
                        row.values.len(),
                        columns.len()
                    ),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolves the artifact for the mode and scores the table with it.
pub fn classify(store: &ArtifactStore, table: &FeatureTable, mode: Mode) -> Result<ResultSet> {
    let artifact = store.get(mode)?;
    predict(artifact, table)
}

/// Scores every row of the table with one artifact.
///
/// The table's column names and order must match the artifact's schema
/// exactly; each row is standardized, classified into a two-entry
/// probability vector, and labeled by its winning class. Output rows keep
/// the input order and count. Deterministic for identical inputs.
pub fn predict(artifact: &Artifact, table: &FeatureTable) -> Result<ResultSet> {
    if table.columns() != artifact.columns.as_slice() {
        return Err(Error::ColumnMismatch {
            expected: artifact.columns.clone(),
            actual: table.columns().to_vec(),
        });
    }

    let mut rows = Vec::with_capacity(table.len());
    for values in table.rows() {
        let scaled = artifact.scaler.transform(values);
        let probs = artifact.classifier.predict_proba(&scaled);
        rows.push(score_row(values.clone(), &probs)?);
    }
    ResultSet::new(table.columns().to_vec(), rows)
}

/// Turns one probability vector into a labeled row, enforcing the two-class
/// contract. Unreachable for a correctly fitted binary artifact, but
/// checked rather than assumed.
fn score_row(values: Vec<f64>, probs: &[f64]) -> Result<ResultRow> {
    if probs.len() != 2 {
        return Err(Error::ModelContract {
            detail: format!("probability vector has {} entries, expected 2", probs.len()),
        });
    }
    let mut index = 0;
    for (i, p) in probs.iter().enumerate() {
        if *p > probs[index] {
            index = i;
        }
    }
    let confidence = probs[index];
    if !confidence.is_finite() {
        return Err(Error::ModelContract {
            detail: "non-finite probability".to_string(),
        });
    }
    let label = Label::from_class_index(index)?;
    Ok(ResultRow::new(values, label, confidence))
}
