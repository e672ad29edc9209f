//! Chromiumoxide-based browser engine implementation.
//!
//! This module provides a real browser engine implementation using chromiumoxide
//! which controls Chrome/Chromium/Edge via the Chrome DevTools Protocol (CDP).

use crate::browser::engine::{BrowserConfig, BrowserEngine};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Chromiumoxide-based browser engine.
///
/// This implementation uses the Chrome DevTools Protocol to control a real
/// browser instance. It drives a single blank page that is opened at launch;
/// the collector never needs more than one.
pub struct ChromiumEngine {
    config: BrowserConfig,
    browser: Arc<Mutex<Browser>>,
    page: Page,
    is_running: Arc<RwLock<bool>>,
    _handler_task: tokio::task::JoinHandle<()>,
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn new(config: BrowserConfig) -> Result<Self> {
        info!("Launching browser engine...");
        debug!("Browser config: {:?}", config);

        // Build chromiumoxide config
        let mut chrome_config = ChromeConfig::builder();

        if config.headless {
            chrome_config = chrome_config.arg("--disable-gpu");
        } else {
            chrome_config = chrome_config.with_head();
        }

        // Set window size
        chrome_config = chrome_config.window_size(config.window_size.0, config.window_size.1);

        // Set explicit executable if provided
        if let Some(ref path) = config.executable {
            chrome_config = chrome_config.chrome_executable(path);
        }

        // Launch args that keep the environment close to a regular browser
        chrome_config = chrome_config
            .no_sandbox()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage");

        // Add custom args
        for arg in &config.args {
            chrome_config = chrome_config.arg(arg);
        }

        let chrome_config = chrome_config
            .build()
            .map_err(|error| anyhow!("Failed to build browser config: {}", error))?;

        // Launch browser
        let (browser, mut handler) = Browser::launch(chrome_config).await?;

        info!("Browser launched successfully");

        // Spawn handler task driving the CDP event loop
        let handler_task = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(())) => {}
                    Some(Err(error)) => {
                        warn!("Browser handler error: {}", error);
                        break;
                    }
                    None => {
                        debug!("Browser handler stream ended");
                        break;
                    }
                }
            }
        });

        // Open the single working page
        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            config,
            browser: Arc::new(Mutex::new(browser)),
            page,
            is_running: Arc::new(RwLock::new(true)),
            _handler_task: handler_task,
        })
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let running = self.is_running.read().await;
        if !*running {
            return Err(anyhow!("Browser engine is not running"));
        }
        drop(running);

        info!("Navigating to {}", url);

        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;

        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let running = self.is_running.read().await;
        if !*running {
            return Err(anyhow!("Browser engine is not running"));
        }
        drop(running);

        // Objects only carry a value over the wire with returnByValue set
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(|error| anyhow!("Failed to build evaluate params: {}", error))?;

        let result = self.page.evaluate(params).await?;

        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down browser engine...");

        let mut running = self.is_running.write().await;
        if !*running {
            return Err(anyhow!("Browser engine is not running"));
        }

        let mut browser = self.browser.lock().await;
        browser.close().await?;
        browser.wait().await?;

        *running = false;

        info!("Browser engine shut down");
        Ok(())
    }

    fn config(&self) -> &BrowserConfig {
        &self.config
    }

    async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }
}
