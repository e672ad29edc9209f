//! Configuration module for envprobe.
//!
//! This module provides configuration management for the collector, including:
//! - Loading settings from files (TOML/JSON)
//! - Environment variable overrides
//! - CLI argument parsing
//! - Validation and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use envprobe::config::CollectorSettings;
//!
//! // Load from default locations or create with defaults
//! let settings = CollectorSettings::default();
//!
//! // Load from a specific file
//! let settings = CollectorSettings::from_file("config.toml").unwrap();
//!
//! // Override with environment variables
//! let settings = settings.merge_with_env();
//! ```

mod settings;

pub use settings::{BrowserKind, CliArgs, CollectorSettings, ConfigError};
