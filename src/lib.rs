// Library interface for WorkloadRS modules
// This allows integration tests and benchmarks to access the core functionality

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod features;
pub mod logging;
pub mod models;
pub mod report;
pub mod risk;
pub mod rolling;
pub mod simulator;
pub mod squad;

// Re-export commonly used types for convenience
pub use dataset::{DatasetSummary, InjuryDataset};
pub use error::{Result, WorkloadError};
pub use export::ml::MlCsvExporter;
pub use features::{build_features, FeatureMatrix, SplitConfig, FEATURE_COLUMNS, LABEL_COLUMN};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::{DayRecord, DerivedRecord, SimulationState, WorkloadRow};
pub use report::{CoachReport, ExpectedRiskPredictor, LoadStatus, RiskPredictor};
pub use risk::InjuryRiskModel;
pub use simulator::{SimulationParams, WorkloadSimulator, DEFAULT_SEED};
