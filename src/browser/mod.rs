//! Browser module providing the engine abstraction and its implementations.
//!
//! # Submodules
//!
//! - [`engine`] - Browser engine abstraction, configuration, and the mock
//!   engine used in tests
//! - [`chromium_engine`] - Chromiumoxide-based engine driving a real browser

pub mod chromium_engine;
pub mod engine;

// Re-export commonly used types for convenience
pub use chromium_engine::ChromiumEngine;
pub use engine::{BrowserConfig, BrowserEngine, MockEngine};
