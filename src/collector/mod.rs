//! Collection orchestration.
//!
//! [`EnvCollector`] drives a launched browser engine through a full
//! collection run: optional navigation, browser detection, the probe
//! sequence, and snapshot assembly. Probes run sequentially against the
//! single page and their failures degrade to fallback values; only launch
//! and navigation failures abort a run.

use crate::browser::BrowserEngine;
use crate::probe::{self, scripts};
use crate::snapshot::{
    AudioContextInfo, EnvSnapshot, ObjectSnapshots, PluginDescriptor, WebglInfo,
};
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

/// Detected browser family and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserInfo {
    /// Browser family name, "Unknown" when no token matched.
    pub family: String,
    /// Dotted version string, empty when unknown.
    pub version: String,
}

/// Detects the browser family and version from a user agent string.
///
/// Token precedence matters: Chromium-based Edge and Opera keep `Chrome/`
/// in their user agents, so their own tokens are checked first.
pub fn detect_browser(user_agent: &str) -> BrowserInfo {
    const TOKENS: [(&str, &str); 4] = [
        ("Edg/", "Edge"),
        ("OPR/", "Opera"),
        ("Chrome/", "Chrome"),
        ("Firefox/", "Firefox"),
    ];

    for (token, family) in TOKENS {
        if let Some(start) = user_agent.find(token) {
            let rest = &user_agent[start + token.len()..];
            let version: String = rest
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();

            return BrowserInfo {
                family: family.to_string(),
                version,
            };
        }
    }

    BrowserInfo {
        family: "Unknown".to_string(),
        version: String::new(),
    }
}

/// Drives a browser engine through a full collection run.
pub struct EnvCollector<E: BrowserEngine> {
    engine: E,
}

impl<E: BrowserEngine> EnvCollector<E> {
    /// Wraps a launched engine.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Returns a reference to the wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Collects a complete snapshot.
    ///
    /// With a URL the page is navigated there first and a navigation
    /// failure aborts the run; without one the snapshot is taken from the
    /// blank page the engine opened at launch. Individual probe failures
    /// never abort the run.
    pub async fn collect(&self, url: Option<&str>) -> Result<EnvSnapshot> {
        if let Some(url) = url {
            self.engine
                .navigate(url)
                .await
                .with_context(|| format!("Failed to load {}", url))?;
        }

        let source_url = url.unwrap_or("about:blank").to_string();
        info!("Collecting environment snapshot from {}", source_url);

        // Browser detection runs first; an unreadable user agent is not fatal
        let user_agent = match self.engine.evaluate(scripts::USER_AGENT_JS).await {
            Ok(Value::String(ua)) => ua,
            Ok(_) => String::new(),
            Err(error) => {
                warn!("Could not read user agent: {}", error);
                String::new()
            }
        };
        let browser_info = detect_browser(&user_agent);
        info!(
            "Detected browser: {} {}",
            browser_info.family, browser_info.version
        );

        let navigator = probe::NAVIGATOR.run(&self.engine).await;
        let screen = probe::SCREEN.run(&self.engine).await;
        let window = probe::WINDOW.run(&self.engine).await;
        let document = probe::DOCUMENT.run(&self.engine).await;
        let location = probe::LOCATION.run(&self.engine).await;
        let performance = probe::PERFORMANCE.run(&self.engine).await;

        let plugins = PluginDescriptor::list_from_value(probe::PLUGINS.run(&self.engine).await);
        let webgl = WebglInfo::from_value(probe::WEBGL.run(&self.engine).await);
        let canvas = match probe::CANVAS.run(&self.engine).await {
            Value::String(data_url) => Some(data_url),
            Value::Null => None,
            other => {
                warn!("Discarding malformed canvas data: {}", other);
                None
            }
        };
        let audio_context =
            AudioContextInfo::from_value(probe::AUDIO_CONTEXT.run(&self.engine).await);

        Ok(EnvSnapshot {
            browser: browser_info.family,
            version: browser_info.version,
            collected_at: Utc::now(),
            source_url,
            objects: ObjectSnapshots {
                navigator,
                screen,
                window,
                document,
                location,
                performance,
            },
            plugins,
            webgl,
            canvas,
            audio_context,
        })
    }

    /// Shuts the engine down, consuming the collector.
    pub async fn shutdown(self) -> Result<()> {
        self.engine.shutdown().await
    }
}
