//! # Envprobe
//!
//! A browser environment collector written in Rust.
//!
//! Envprobe drives a headless Chromium browser, reads its built-in
//! environment objects (navigator, screen, window, document, location,
//! performance, plugins, WebGL, canvas, audio) and serializes the values
//! into a JSON snapshot. A snapshot can optionally be rendered into a
//! JavaScript replay script that re-applies the captured values onto a
//! different browser context.
//!
//! ## Features
//!
//! - **Environment Probing**: Fixed JavaScript probes for ten categories of
//!   host-object state, each degrading to an empty result on failure
//! - **Engine Abstraction**: Trait-based browser engine with a chromiumoxide
//!   implementation and a scriptable mock for tests
//! - **Stable Snapshots**: JSON documents whose top-level fields are always
//!   present, with `null` marking unsupported features
//! - **Replay Scripts**: Deterministic JavaScript generation from snapshots
//! - **Flexible Configuration**: TOML/JSON files, environment variables, CLI
//!   arguments
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use envprobe::{
//!     browser::{BrowserConfig, BrowserEngine, ChromiumEngine},
//!     collector::EnvCollector,
//!     replay::ReplayScript,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Launch a headless browser
//!     let config = BrowserConfig::new().headless(true).window_size(1280, 720);
//!     let engine = ChromiumEngine::new(config).await?;
//!
//!     // Collect a snapshot from a page
//!     let collector = EnvCollector::new(engine);
//!     let snapshot = collector.collect(Some("https://example.com")).await?;
//!     snapshot.save_to_file("templates/env_template.json")?;
//!
//!     // Optionally render the replay script next to it
//!     std::fs::write("templates/env_template.js", ReplayScript::render(&snapshot))?;
//!
//!     collector.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser engine abstraction and the Chromium implementation
//! - [`probe`]: Probe scripts and their degradation rules
//! - [`collector`]: Orchestration of a collection run
//! - [`snapshot`]: Snapshot document model and persistence
//! - [`replay`]: Replay script generation
//! - [`config`]: Configuration loading and management
//!
//! ## Architecture
//!
//! One collection run is a single sequential pipeline over one browser
//! session:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                           Envprobe                             │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐   ┌─────────┐   ┌──────────┐   ┌─────────┐        │
//! │  │ Browser │   │ Probes  │   │ Snapshot │   │ Replay  │        │
//! │  │ Engine  │   │         │   │  Model   │   │ Script  │        │
//! │  └────┬────┘   └────┬────┘   └────┬─────┘   └─────────┘        │
//! │       │             │             │                            │
//! │       └─────────────┴──────┬──────┘                            │
//! │                      ┌─────┴─────┐                             │
//! │                      │ Collector │                             │
//! │                      └───────────┘                             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//!
//! Configuration follows a precedence chain:
//! 1. Default values
//! 2. Configuration file (TOML/JSON)
//! 3. Environment variables (`ENVPROBE_*`)
//! 4. CLI arguments
//!
//! See [`config::CollectorSettings`] for all available options.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Browser engine abstraction and the chromiumoxide-backed implementation.
pub mod browser;

/// Environment probes: fixed JavaScript expressions and fallback rules.
pub mod probe;

/// Collection run orchestration: probes in, snapshot out.
pub mod collector;

/// Snapshot document model and persistence.
pub mod snapshot;

/// Replay script generation from collected snapshots.
pub mod replay;

/// Configuration management for loading settings from files, env, and CLI.
pub mod config;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

// Browser types
pub use browser::{BrowserConfig, BrowserEngine, ChromiumEngine, MockEngine};

// Probe types
pub use probe::{Fallback, Probe};

// Collector types
pub use collector::{detect_browser, BrowserInfo, EnvCollector};

// Snapshot types
pub use snapshot::{
    AudioContextInfo, EnvSnapshot, ObjectSnapshots, PluginDescriptor, WebglInfo,
};

// Replay types
pub use replay::ReplayScript;

// Config types
pub use config::{BrowserKind, CliArgs, CollectorSettings, ConfigError};

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use envprobe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::browser::{BrowserConfig, BrowserEngine, ChromiumEngine, MockEngine};
    pub use crate::collector::EnvCollector;
    pub use crate::config::{CliArgs, CollectorSettings};
    pub use crate::replay::ReplayScript;
    pub use crate::snapshot::EnvSnapshot;
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
