pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod join;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod raw;
pub mod stats;

pub use error::{JoinMissError, MalformedStatError, PipelineError};
pub use metrics::{ExternalTeamMetrics, FeatureRecord, MetricsTable};
pub use pipeline::{FeatureTable, PipelineConfig, PipelineReport, build_feature_table, run_season};
