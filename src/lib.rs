pub mod artifact;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod schema;
pub mod server;
pub mod service;
pub mod stats;
pub mod store;
pub mod table;

pub use artifact::{Artifact, ArtifactStore, Classifier, Mode, StandardScaler};
pub use config::ServiceConfig;
pub use engine::{Label, ResultRow, ResultSet};
pub use error::{Error, Result};
pub use schema::{CandidateFeatures, REDUCED_FEATURES};
pub use service::{PredictionSummary, VettingService};
pub use table::FeatureTable;
