//! The vetting service facade. Owns the artifact store, the staging and
//! results areas, and the request counters; every request flows through
//! here regardless of transport.

use crate::artifact::{ArtifactStore, Mode};
use crate::config::ServiceConfig;
use crate::engine::{self, Label, ResultSet};
use crate::error::Result;
use crate::ingest::{self, TabularAdapter};
use crate::schema::CandidateFeatures;
use crate::stats::{ServiceStats, StatsSnapshot};
use crate::store::ResultStore;
use serde::Serialize;
use tracing::info;

/// Summary of one prediction request. The persisted result set is
/// retrievable by the returned identifier.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionSummary {
    pub id: String,
    pub results: Vec<RowSummary>,
}

/// One scored row of the summary, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct RowSummary {
    pub row: usize,
    pub label: Label,
    pub confidence: String,
}

/// Health report: artifact availability per mode plus counters.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub service: &'static str,
    pub artifacts: ModeAvailability,
    pub stats: StatsSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeAvailability {
    pub full: bool,
    pub reduced: bool,
}

pub struct VettingService {
    artifacts: ArtifactStore,
    uploads: TabularAdapter,
    results: ResultStore,
    stats: ServiceStats,
}

impl VettingService {
    /// Opens the service: loads both artifacts (a mode whose artifact fails
    /// to load stays unavailable) and prepares the staging and results
    /// areas.
    pub fn open(config: &ServiceConfig) -> Result<Self> {
        let artifacts = ArtifactStore::load(&config.artifact_dir);
        let uploads = TabularAdapter::open(&config.uploads_dir)?;
        let results = ResultStore::open(&config.results_dir)?;
        Ok(Self {
            artifacts,
            uploads,
            results,
            stats: ServiceStats::new(),
        })
    }

    /// Scores an uploaded CSV batch with the full-feature artifact and
    /// persists the result set.
    pub fn classify_upload(&self, bytes: &[u8]) -> Result<PredictionSummary> {
        self.stats.record_request(Mode::Full);
        self.track(|| {
            let staged = self.uploads.ingest(bytes)?;
            info!(
                "Staged upload {} ({} rows)",
                staged.upload_id,
                staged.table.len()
            );
            let results = engine::classify(&self.artifacts, &staged.table, Mode::Full)?;
            self.persist(Mode::Full, results)
        })
    }

    /// Scores one structured record with the reduced-feature artifact and
    /// persists the single-row result set.
    pub fn classify_record(&self, payload: &serde_json::Value) -> Result<PredictionSummary> {
        self.stats.record_request(Mode::Reduced);
        self.track(|| {
            let record = CandidateFeatures::from_json(payload)?;
            let table = ingest::record_to_table(&record)?;
            let results = engine::classify(&self.artifacts, &table, Mode::Reduced)?;
            self.persist(Mode::Reduced, results)
        })
    }

    /// Raw CSV bytes of a stored result set.
    pub fn download(&self, id: &str) -> Result<Vec<u8>> {
        self.track(|| self.results.load(id))
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            service: "exovet",
            artifacts: ModeAvailability {
                full: self.artifacts.available(Mode::Full),
                reduced: self.artifacts.available(Mode::Reduced),
            },
            stats: self.stats.snapshot(),
        }
    }

    fn persist(&self, mode: Mode, results: ResultSet) -> Result<PredictionSummary> {
        self.stats.record_results(&results);
        let id = self.results.save(&results)?;
        info!("Scored {} rows in {} mode, stored as {}", results.len(), mode, id);

        let rows = results
            .rows()
            .iter()
            .enumerate()
            .map(|(row, r)| RowSummary {
                row,
                label: r.label(),
                confidence: r.confidence_display(),
            })
            .collect();
        Ok(PredictionSummary { id, results: rows })
    }

    fn track<T>(&self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let outcome = op();
        if outcome.is_err() {
            self.stats.record_failure();
        }
        outcome
    }
}
