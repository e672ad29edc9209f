//! Browser engine abstraction layer.
//!
//! This module provides a trait-based abstraction for browser engines,
//! allowing for different implementations (e.g., Chromium, Edge) and
//! mock implementations for testing.
//!
//! # Example
//!
//! ```rust
//! use envprobe::browser::{BrowserConfig, BrowserEngine, MockEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BrowserConfig::default();
//!     let engine = MockEngine::new(config).await?;
//!
//!     let value = engine.evaluate("navigator.userAgent").await?;
//!     println!("Result: {}", value);
//!
//!     engine.shutdown().await?;
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Configuration options for browser engine initialization.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode (no visible window).
    pub headless: bool,

    /// Window dimensions as (width, height) in pixels.
    pub window_size: (u32, u32),

    /// Path to browser executable. If None, uses system default.
    pub executable: Option<PathBuf>,

    /// Additional browser launch arguments.
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1280, 720),
            executable: None,
            args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Creates a new BrowserConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets headless mode.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Sets window size.
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Sets the browser executable path.
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Adds a browser launch argument.
    pub fn add_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Trait defining the browser engine interface.
///
/// This trait provides an abstraction layer for browser automation,
/// allowing different browser implementations to be used interchangeably.
/// The collector only needs three capabilities from a live page: navigate
/// to a URL, evaluate a JavaScript expression, and shut the browser down.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Creates a new browser engine instance with the given configuration.
    ///
    /// For real engines this launches the browser process and opens a
    /// single blank page.
    ///
    /// # Arguments
    ///
    /// * `config` - Browser configuration options
    ///
    /// # Returns
    ///
    /// A Result containing the browser engine instance or an error.
    async fn new(config: BrowserConfig) -> Result<Self>
    where
        Self: Sized;

    /// Navigates the page to the specified URL and waits for the load to
    /// settle.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to navigate to
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Evaluates a JavaScript expression in the page and returns its value
    /// as JSON.
    ///
    /// Expressions that produce no serializable value resolve to
    /// `Value::Null`. Errors cover transport failures and uncaught page
    /// exceptions.
    ///
    /// # Arguments
    ///
    /// * `script` - JavaScript expression to evaluate
    async fn evaluate(&self, script: &str) -> Result<Value>;

    /// Shuts down the browser engine and releases all resources.
    ///
    /// This method should be called when the browser is no longer needed
    /// to ensure proper cleanup of browser processes and resources.
    async fn shutdown(&self) -> Result<()>;

    /// Returns the browser configuration.
    fn config(&self) -> &BrowserConfig;

    /// Checks if the browser engine is running.
    async fn is_running(&self) -> bool;
}

/// Scripted reply for a mock evaluation.
#[derive(Debug, Clone)]
enum MockReply {
    Value(Value),
    Failure(String),
}

/// Mock browser engine implementation for testing purposes.
///
/// This implementation simulates browser behavior without actually
/// launching a browser, making it suitable for unit tests. Evaluation
/// replies are scripted per script fragment: an exact script match wins
/// first, then the first registered fragment contained in the evaluated
/// script, and scripts with no matching fragment evaluate to `Value::Null`.
pub struct MockEngine {
    config: BrowserConfig,
    replies: Arc<RwLock<Vec<(String, MockReply)>>>,
    evaluated: Arc<RwLock<Vec<String>>>,
    navigations: Arc<RwLock<Vec<String>>>,
    navigation_failure: Arc<RwLock<Option<String>>>,
    is_running: Arc<RwLock<bool>>,
}

#[async_trait]
impl BrowserEngine for MockEngine {
    async fn new(config: BrowserConfig) -> Result<Self> {
        Ok(Self {
            config,
            replies: Arc::new(RwLock::new(Vec::new())),
            evaluated: Arc::new(RwLock::new(Vec::new())),
            navigations: Arc::new(RwLock::new(Vec::new())),
            navigation_failure: Arc::new(RwLock::new(None)),
            is_running: Arc::new(RwLock::new(true)),
        })
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let running = self.is_running.read().await;
        if !*running {
            return Err(anyhow!("Browser engine is not running"));
        }
        drop(running);

        if let Some(ref message) = *self.navigation_failure.read().await {
            return Err(anyhow!("Navigation failed: {}", message));
        }

        let mut navigations = self.navigations.write().await;
        navigations.push(url.to_string());

        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let running = self.is_running.read().await;
        if !*running {
            return Err(anyhow!("Browser engine is not running"));
        }
        drop(running);

        let mut evaluated = self.evaluated.write().await;
        evaluated.push(script.to_string());
        drop(evaluated);

        let replies = self.replies.read().await;

        // Exact script matches win over fragment containment
        for (fragment, reply) in replies.iter() {
            if script == fragment.as_str() {
                return Self::reply_to_result(reply);
            }
        }
        for (fragment, reply) in replies.iter() {
            if script.contains(fragment.as_str()) {
                return Self::reply_to_result(reply);
            }
        }

        Ok(Value::Null)
    }

    async fn shutdown(&self) -> Result<()> {
        let mut running = self.is_running.write().await;
        if !*running {
            return Err(anyhow!("Browser engine is not running"));
        }

        *running = false;
        Ok(())
    }

    fn config(&self) -> &BrowserConfig {
        &self.config
    }

    async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }
}

impl MockEngine {
    fn reply_to_result(reply: &MockReply) -> Result<Value> {
        match reply {
            MockReply::Value(value) => Ok(value.clone()),
            MockReply::Failure(message) => Err(anyhow!("{}", message)),
        }
    }

    /// Registers a scripted reply for scripts containing the given fragment.
    ///
    /// An exact script match always wins; among containment matches,
    /// fragments are checked in registration order and the first match wins.
    pub async fn respond_with(&self, fragment: &str, value: Value) {
        let mut replies = self.replies.write().await;
        replies.push((fragment.to_string(), MockReply::Value(value)));
    }

    /// Registers an evaluation failure for scripts containing the given
    /// fragment.
    pub async fn fail_with(&self, fragment: &str, message: &str) {
        let mut replies = self.replies.write().await;
        replies.push((
            fragment.to_string(),
            MockReply::Failure(message.to_string()),
        ));
    }

    /// Makes all subsequent navigations fail with the given message.
    pub async fn fail_navigation(&self, message: &str) {
        let mut failure = self.navigation_failure.write().await;
        *failure = Some(message.to_string());
    }

    /// Returns all scripts evaluated so far, in order.
    pub async fn evaluated_scripts(&self) -> Vec<String> {
        self.evaluated.read().await.clone()
    }

    /// Returns all URLs navigated to so far, in order.
    pub async fn navigations(&self) -> Vec<String> {
        self.navigations.read().await.clone()
    }
}
