//! Ingestion adapters: uploaded CSV batches and single structured records.

use crate::error::Result;
use crate::schema::{CandidateFeatures, REDUCED_FEATURES};
use crate::store::fresh_id;
use crate::table::FeatureTable;
use std::fs;
use std::path::PathBuf;

/// A staged upload: the audit copy's identifier plus the parsed table.
#[derive(Debug)]
pub struct StagedUpload {
    pub upload_id: String,
    pub table: FeatureTable,
}

/// The uploads area. Every received batch is written to disk under its own
/// identifier before parsing, so an audit copy exists even for uploads that
/// turn out to be malformed.
#[derive(Debug, Clone)]
pub struct TabularAdapter {
    dir: PathBuf,
}

impl TabularAdapter {
    /// Opens the uploads area, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Stages raw CSV bytes and parses them into a feature table.
    pub fn ingest(&self, bytes: &[u8]) -> Result<StagedUpload> {
        let upload_id = fresh_id();
        fs::write(self.dir.join(format!("{}.csv", upload_id)), bytes)?;
        let table = FeatureTable::from_csv(bytes)?;
        Ok(StagedUpload { upload_id, table })
    }
}

/// Converts one validated record into a single-row table in canonical
/// column order.
pub fn record_to_table(record: &CandidateFeatures) -> Result<FeatureTable> {
    let columns = REDUCED_FEATURES.iter().map(|c| c.to_string()).collect();
    FeatureTable::new(columns, vec![record.to_row()])
}
