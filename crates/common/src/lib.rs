//! CiteRank Common Library
//!
//! Shared code for the CiteRank crates including:
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use crate::config::{AppConfig, PageRankConfig};
pub use crate::errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default damping factor (probability of following a citation)
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.85;

/// Default cap on power iterations
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default convergence threshold on the max per-node score change
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
