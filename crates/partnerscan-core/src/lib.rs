pub mod app_config;
pub mod config;
pub mod gazetteer;
pub mod records;
pub mod sources;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use gazetteer::{locate, region_of, UNKNOWN_LOCATION};
pub use records::{NewPartnerRecord, PartnerRecord, PopularityTier, RecordError, RewardType};
pub use sources::{load_sources, FieldSelector, FieldSelectors, SourceConfig, SourcesFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[source] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
