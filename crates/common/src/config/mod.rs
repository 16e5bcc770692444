//! Configuration management for CiteRank
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with CITERANK__)
//! - Configuration files (config/default.toml, config/{env}.toml, config/local.toml)
//! - Default values
//!
//! The loaded value is built once per run and passed down explicitly.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// PageRank solver parameters
    #[serde(default)]
    pub pagerank: PageRankConfig,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Report sizes
    #[serde(default)]
    pub report: ReportConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Parameters of one PageRank computation
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, Validate)]
pub struct PageRankConfig {
    /// Probability of following a citation rather than teleporting
    #[serde(default = "default_damping_factor")]
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub damping_factor: f64,

    /// Hard cap on power iterations
    #[serde(default = "default_max_iterations")]
    #[validate(range(min = 1))]
    pub max_iterations: usize,

    /// Stop once the max per-node score change drops below this
    #[serde(default = "default_tolerance")]
    #[validate(range(exclusive_min = 0.0))]
    pub tolerance: f64,

    /// Redistribute the mass of nodes without outgoing citations
    #[serde(default = "default_handle_dangling")]
    pub handle_dangling: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Parsed papers and citations produced by the ingester
    #[serde(default = "default_parsed_data")]
    pub parsed_data: String,

    /// Where the graph snapshot is written
    #[serde(default = "default_graph_output")]
    pub graph_output: String,

    /// Where the PageRank snapshot is written
    #[serde(default = "default_pagerank_output")]
    pub pagerank_output: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Papers listed by PageRank score
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Papers listed by citation count
    #[serde(default = "default_most_cited_n")]
    pub most_cited_n: usize,

    /// Papers in the PageRank vs citation comparison
    #[serde(default = "default_compare_n")]
    pub compare_n: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Prometheus text file written at the end of a run (unset to disable)
    #[serde(default)]
    pub metrics_path: Option<String>,

    /// Service name attached to log output
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_damping_factor() -> f64 { crate::DEFAULT_DAMPING_FACTOR }
fn default_max_iterations() -> usize { crate::DEFAULT_MAX_ITERATIONS }
fn default_tolerance() -> f64 { crate::DEFAULT_TOLERANCE }
fn default_handle_dangling() -> bool { true }
fn default_parsed_data() -> String { "data/processed/papers.json".to_string() }
fn default_graph_output() -> String { "data/processed/graph.json".to_string() }
fn default_pagerank_output() -> String { "data/processed/pagerank.json".to_string() }
fn default_top_n() -> usize { 10 }
fn default_most_cited_n() -> usize { 5 }
fn default_compare_n() -> usize { 5 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }
fn default_service_name() -> String { "citerank".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        let env = std::env::var("CITERANK_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with CITERANK__ prefix
            // e.g., CITERANK__PAGERANK__DAMPING_FACTOR=0.9
            .add_source(
                Environment::with_prefix("CITERANK")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("CITERANK")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl PageRankConfig {
    /// Reject damping factors outside (0, 1), a zero iteration cap,
    /// non-positive tolerances and non-finite floats
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if !self.damping_factor.is_finite() {
            return Err(AppError::InvalidConfig {
                message: format!("damping factor must be finite, got {}", self.damping_factor),
                field: Some("damping_factor".to_string()),
            });
        }
        if !self.tolerance.is_finite() {
            return Err(AppError::InvalidConfig {
                message: format!("tolerance must be finite, got {}", self.tolerance),
                field: Some("tolerance".to_string()),
            });
        }

        Ok(())
    }
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: default_damping_factor(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            handle_dangling: default_handle_dangling(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            parsed_data: default_parsed_data(),
            graph_output: default_graph_output(),
            pagerank_output: default_pagerank_output(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            most_cited_n: default_most_cited_n(),
            compare_n: default_compare_n(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_path: None,
            service_name: default_service_name(),
        }
    }
}
