//! Serializable analysis run configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pricelab_core::aggregate::SortOrder;
use pricelab_core::domain::GroupKey;

/// Unique identifier for an analysis run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("delimiter must be a single ASCII character")]
    BadDelimiter,

    #[error("top_n must be >= 1 when set")]
    ZeroTopN,

    #[error("top_n requires group_by = \"product\" (it ranks products before the region breakdown)")]
    TopNWithoutProductGrouping,
}

/// Complete configuration for a single analysis run.
///
/// Captures everything needed to reproduce the run: the input table, the
/// grouping key, the output ordering, and the optional top-N restriction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub input: InputSection,

    #[serde(default)]
    pub analysis: AnalysisSection,
}

/// Where the sales table comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputSection {
    /// Path to the delimited-text sales table (header row required).
    pub path: PathBuf,

    /// Field delimiter. Defaults to a comma.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

/// What to compute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSection {
    /// Grouping key for summaries and demand fits.
    pub group_by: GroupKey,

    /// Output ordering by summed quantity.
    pub order: SortOrder,

    /// Restrict the product×region breakdown to the top N products.
    /// Requires `group_by = "product"`.
    pub top_n: Option<usize>,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            group_by: GroupKey::Product,
            order: SortOrder::Descending,
            top_n: None,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Consistency checks that TOML typing cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input.delimiter.is_ascii() {
            return Err(ConfigError::BadDelimiter);
        }
        match self.analysis.top_n {
            Some(0) => return Err(ConfigError::ZeroTopN),
            Some(_) if self.analysis.group_by != GroupKey::Product => {
                return Err(ConfigError::TopNWithoutProductGrouping)
            }
            _ => {}
        }
        Ok(())
    }

    /// Deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId, so artifact directories
    /// and memoized results can be keyed by it.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("AnalysisConfig must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
