//! Durable storage of scored result sets, one CSV file per identifier.

use crate::engine::ResultSet;
use crate::error::{Error, Result};
use rand::Rng;
use std::fs;
use std::path::PathBuf;

/// Column holding the winning-class probability rendered as a percentage.
pub const CONFIDENCE_COLUMN: &str = "Confidence_Level";
/// Column holding the display name of the predicted label.
pub const LABEL_COLUMN: &str = "Predicted_Label";

/// Fresh 128-bit identifier as 32 lowercase hex digits. Collisions are
/// negligible at any realistic volume; `save` still refuses to overwrite.
pub fn fresh_id() -> String {
    let raw: u128 = rand::rng().random();
    format!("{:032x}", raw)
}

fn valid_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// The results area. One file per identifier, written once, never mutated.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    /// Opens the results area, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Persists a result set under a fresh identifier and returns it.
    pub fn save(&self, results: &ResultSet) -> Result<String> {
        let id = fresh_id();
        let path = self.dir.join(format!("{}.csv", id));
        if path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("identifier collision: {}", id),
            )));
        }
        fs::write(&path, encode_csv(results)?)?;
        Ok(id)
    }

    /// Raw CSV bytes of a stored result set. Unknown and syntactically
    /// invalid identifiers both report not-found; nothing outside the
    /// results area is ever read.
    pub fn load(&self, id: &str) -> Result<Vec<u8>> {
        if !valid_id(id) {
            return Err(Error::NotFound { id: id.to_string() });
        }
        match fs::read(self.dir.join(format!("{}.csv", id))) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound {
                id: id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serializes a result set: the input columns followed by the confidence
/// and label columns, one record per scored row.
pub fn encode_csv(results: &ResultSet) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    let mut header: Vec<String> = results.columns().to_vec();
    header.push(CONFIDENCE_COLUMN.to_string());
    header.push(LABEL_COLUMN.to_string());
    writer.write_record(&header)?;

    for row in results.rows() {
        let mut record: Vec<String> = row.values().iter().map(|v| v.to_string()).collect();
        record.push(row.confidence_display());
        record.push(row.label().as_str().to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))
    })
}
