//! Collector settings and configuration management.
//!
//! This module provides the configuration options for the envprobe collector,
//! supporting multiple configuration sources with proper precedence.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Browser family enumeration.
///
/// Defines which browser binary the collector drives. Both options speak the
/// Chrome DevTools Protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Google Chrome or Chromium.
    Chrome,
    /// Microsoft Edge.
    Edge,
}

impl Default for BrowserKind {
    fn default() -> Self {
        Self::Chrome
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserKind::Chrome => write!(f, "chrome"),
            BrowserKind::Edge => write!(f, "edge"),
        }
    }
}

impl std::str::FromStr for BrowserKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "edge" | "msedge" => Ok(BrowserKind::Edge),
            _ => Err(ConfigError::ValidationError(format!(
                "Unknown browser: {}. Valid browsers are: chrome, edge",
                s
            ))),
        }
    }
}

impl BrowserKind {
    /// Returns the default executable for this browser family, if one has to
    /// be named explicitly.
    ///
    /// Chrome is `None` because the underlying launcher auto-detects Chrome
    /// and Chromium installations on its own. Edge is not auto-detected, so a
    /// platform-specific binary name is returned instead.
    pub fn default_executable(&self) -> Option<&'static str> {
        match self {
            BrowserKind::Chrome => None,
            BrowserKind::Edge => Some(if cfg!(target_os = "windows") {
                "msedge"
            } else if cfg!(target_os = "macos") {
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"
            } else {
                "microsoft-edge"
            }),
        }
    }
}

/// Main collector settings.
///
/// This struct contains all configurable options for a collection run.
/// Settings can be loaded from files, environment variables, or CLI arguments.
///
/// # Configuration Precedence
///
/// Settings are applied in the following order (later sources override earlier):
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
/// 4. CLI arguments
///
/// # Example
///
/// ```rust
/// use envprobe::config::CollectorSettings;
///
/// let settings = CollectorSettings::default()
///     .with_headless(false)
///     .with_window_size(1920, 1080);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorSettings {
    /// Browser family to drive.
    #[serde(default)]
    pub browser: BrowserKind,

    /// Run the browser in headless mode (no visible window).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Browser window width in pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Browser window height in pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Path where the snapshot JSON document is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Also emit a replay script next to the snapshot.
    #[serde(default)]
    pub gen_script: bool,

    /// Explicit path to the browser executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
}

// Default value functions for serde
fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_output() -> PathBuf {
    PathBuf::from("templates/env_template.json")
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            browser: BrowserKind::default(),
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            output: default_output(),
            gen_script: false,
            executable: None,
        }
    }
}

impl CollectorSettings {
    /// Creates a new CollectorSettings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a configuration file.
    ///
    /// Supports both TOML and JSON formats, detected by file extension.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use envprobe::config::CollectorSettings;
    ///
    /// let settings = CollectorSettings::from_file("config.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves settings to a configuration file.
    ///
    /// The format is determined by the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use envprobe::config::CollectorSettings;
    ///
    /// let settings = CollectorSettings::default();
    /// settings.to_file("config.toml").unwrap();
    /// ```
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let content = match extension.as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Loads settings from environment variables.
    ///
    /// Environment variables are prefixed with `ENVPROBE_` and use uppercase
    /// names with underscores. For example:
    /// - `ENVPROBE_BROWSER`
    /// - `ENVPROBE_HEADLESS`
    /// - `ENVPROBE_OUTPUT`
    ///
    /// # Example
    ///
    /// ```rust
    /// use envprobe::config::CollectorSettings;
    ///
    /// // With ENVPROBE_HEADLESS=false set in environment
    /// let settings = CollectorSettings::from_env();
    /// ```
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings
    }

    /// Applies environment variable overrides to current settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("ENVPROBE_BROWSER") {
            if let Ok(kind) = val.parse() {
                self.browser = kind;
            }
        }

        if let Ok(val) = env::var("ENVPROBE_HEADLESS") {
            self.headless = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = env::var("ENVPROBE_WINDOW_WIDTH") {
            if let Ok(width) = val.parse() {
                self.window_width = width;
            }
        }

        if let Ok(val) = env::var("ENVPROBE_WINDOW_HEIGHT") {
            if let Ok(height) = val.parse() {
                self.window_height = height;
            }
        }

        if let Ok(val) = env::var("ENVPROBE_OUTPUT") {
            self.output = PathBuf::from(val);
        }

        if let Ok(val) = env::var("ENVPROBE_GEN_SCRIPT") {
            self.gen_script = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = env::var("ENVPROBE_EXECUTABLE") {
            self.executable = Some(PathBuf::from(val));
        }
    }

    /// Merges current settings with environment variable overrides.
    ///
    /// Returns a new settings instance with environment overrides applied.
    pub fn merge_with_env(mut self) -> Self {
        self.apply_env_overrides();
        self
    }

    /// Merges settings with CLI arguments.
    ///
    /// This method accepts parsed CLI arguments and applies them as overrides.
    ///
    /// # Example
    ///
    /// ```rust
    /// use envprobe::config::{CliArgs, CollectorSettings};
    ///
    /// let args = CliArgs {
    ///     headless: Some(false),
    ///     width: Some(1920),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = CollectorSettings::default().merge_with_args(&args);
    /// ```
    pub fn merge_with_args(mut self, args: &CliArgs) -> Self {
        if let Some(ref browser) = args.browser {
            if let Ok(kind) = browser.parse() {
                self.browser = kind;
            }
        }
        if let Some(headless) = args.headless {
            self.headless = headless;
        }
        if let Some(width) = args.width {
            self.window_width = width;
        }
        if let Some(height) = args.height {
            self.window_height = height;
        }
        if let Some(ref output) = args.output {
            self.output = output.clone();
        }
        if let Some(gen_script) = args.gen_script {
            self.gen_script = gen_script;
        }
        if let Some(ref executable) = args.executable {
            self.executable = Some(executable.clone());
        }

        self
    }

    /// Validates all settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any setting is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use envprobe::config::CollectorSettings;
    ///
    /// let settings = CollectorSettings::default();
    /// assert!(settings.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate window dimensions
        if self.window_width < 100 {
            return Err(ConfigError::ValidationError(
                "Window width must be at least 100 pixels".to_string(),
            ));
        }
        if self.window_width > 7680 {
            return Err(ConfigError::ValidationError(
                "Window width cannot exceed 7680 pixels (8K)".to_string(),
            ));
        }
        if self.window_height < 100 {
            return Err(ConfigError::ValidationError(
                "Window height must be at least 100 pixels".to_string(),
            ));
        }
        if self.window_height > 4320 {
            return Err(ConfigError::ValidationError(
                "Window height cannot exceed 4320 pixels (8K)".to_string(),
            ));
        }

        // Validate output path
        if self.output.file_name().is_none() {
            return Err(ConfigError::ValidationError(
                "Output path must include a file name".to_string(),
            ));
        }

        // Validate executable if it was given as a path rather than a bare
        // command name resolved via PATH
        if let Some(ref path) = self.executable {
            if path.components().count() > 1 && !path.exists() {
                return Err(ConfigError::ValidationError(format!(
                    "Browser executable does not exist: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    // Builder-style methods for convenient configuration

    /// Sets the browser family.
    pub fn with_browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    /// Sets headless mode.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Sets the window size.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Sets the snapshot output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Enables or disables replay script generation.
    pub fn with_gen_script(mut self, gen_script: bool) -> Self {
        self.gen_script = gen_script;
        self
    }

    /// Sets an explicit browser executable path.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }
}

/// CLI argument structure for parsing command line options.
///
/// This struct is designed to work with argument parsing libraries like `clap`.
/// All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    /// Browser family name (chrome, edge).
    pub browser: Option<String>,
    /// Enable or disable headless mode.
    pub headless: Option<bool>,
    /// Browser window width.
    pub width: Option<u32>,
    /// Browser window height.
    pub height: Option<u32>,
    /// Snapshot output path.
    pub output: Option<PathBuf>,
    /// Emit a replay script next to the snapshot.
    pub gen_script: Option<bool>,
    /// Explicit browser executable path.
    pub executable: Option<PathBuf>,
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
}

impl CliArgs {
    /// Creates an empty CliArgs instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the final settings by applying the full configuration chain.
    ///
    /// This method handles the complete configuration precedence:
    /// 1. Default values
    /// 2. Configuration file (if specified)
    /// 3. Environment variables
    /// 4. CLI arguments (self)
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use envprobe::config::CliArgs;
    ///
    /// let args = CliArgs {
    ///     config_file: Some("config.toml".into()),
    ///     headless: Some(false),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = args.load_settings().unwrap();
    /// ```
    pub fn load_settings(&self) -> Result<CollectorSettings, ConfigError> {
        // Start with defaults or file
        let mut settings = if let Some(ref config_file) = self.config_file {
            CollectorSettings::from_file(config_file)?
        } else {
            CollectorSettings::default()
        };

        // Apply environment overrides
        settings = settings.merge_with_env();

        // Apply CLI overrides
        settings = settings.merge_with_args(self);

        // Validate final settings
        settings.validate()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = CollectorSettings::default();
        assert_eq!(settings.browser, BrowserKind::Chrome);
        assert!(settings.headless);
        assert_eq!(settings.window_width, 1280);
        assert_eq!(settings.window_height, 720);
        assert_eq!(settings.output, PathBuf::from("templates/env_template.json"));
        assert!(!settings.gen_script);
        assert!(settings.executable.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let settings = CollectorSettings::default()
            .with_browser(BrowserKind::Edge)
            .with_headless(false)
            .with_window_size(1920, 1080)
            .with_output("out/snapshot.json")
            .with_gen_script(true);

        assert_eq!(settings.browser, BrowserKind::Edge);
        assert!(!settings.headless);
        assert_eq!(settings.window_width, 1920);
        assert_eq!(settings.window_height, 1080);
        assert_eq!(settings.output, PathBuf::from("out/snapshot.json"));
        assert!(settings.gen_script);
    }

    #[test]
    fn test_validation_valid_settings() {
        let settings = CollectorSettings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_width() {
        let settings = CollectorSettings::default().with_window_size(50, 720);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_missing_output_name() {
        let settings = CollectorSettings::default().with_output("");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_missing_executable() {
        let settings =
            CollectorSettings::default().with_executable("/nonexistent/dir/some-browser");
        assert!(settings.validate().is_err());

        // Bare command names are resolved via PATH at launch time and pass
        let settings = CollectorSettings::default().with_executable("microsoft-edge");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_browser_kind_parsing() {
        assert_eq!("chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("chromium".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("edge".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
        assert_eq!("msedge".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
        assert!("safari".parse::<BrowserKind>().is_err());
    }

    #[test]
    fn test_browser_kind_display() {
        assert_eq!(BrowserKind::Chrome.to_string(), "chrome");
        assert_eq!(BrowserKind::Edge.to_string(), "edge");
    }

    #[test]
    fn test_edge_has_default_executable() {
        assert!(BrowserKind::Chrome.default_executable().is_none());
        assert!(BrowserKind::Edge.default_executable().is_some());
    }

    #[test]
    fn test_env_overrides_sit_between_file_and_cli() {
        // No other test in this binary touches ENVPROBE_* variables
        env::set_var("ENVPROBE_HEADLESS", "false");
        env::set_var("ENVPROBE_WINDOW_WIDTH", "1111");

        let settings = CollectorSettings::default().merge_with_env();
        assert!(!settings.headless);
        assert_eq!(settings.window_width, 1111);

        // A CLI argument still wins over the environment
        let args = CliArgs {
            width: Some(2222),
            ..Default::default()
        };
        let settings = CollectorSettings::default()
            .merge_with_env()
            .merge_with_args(&args);
        assert_eq!(settings.window_width, 2222);
        assert!(!settings.headless);

        env::remove_var("ENVPROBE_HEADLESS");
        env::remove_var("ENVPROBE_WINDOW_WIDTH");
    }

    #[test]
    fn test_cli_args_merge() {
        let args = CliArgs {
            browser: Some("edge".to_string()),
            width: Some(1920),
            headless: Some(false),
            ..Default::default()
        };

        let settings = CollectorSettings::default().merge_with_args(&args);

        assert_eq!(settings.browser, BrowserKind::Edge);
        assert_eq!(settings.window_width, 1920);
        assert_eq!(settings.window_height, 720); // Unchanged
        assert!(!settings.headless);
    }

    #[test]
    fn test_toml_serialization() {
        let settings = CollectorSettings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: CollectorSettings = toml::from_str(&toml_str).unwrap();

        assert_eq!(settings.browser, parsed.browser);
        assert_eq!(settings.headless, parsed.headless);
        assert_eq!(settings.output, parsed.output);
    }

    #[test]
    fn test_json_serialization() {
        let settings = CollectorSettings::default();
        let json_str = serde_json::to_string_pretty(&settings).unwrap();
        let parsed: CollectorSettings = serde_json::from_str(&json_str).unwrap();

        assert_eq!(settings.browser, parsed.browser);
        assert_eq!(settings.headless, parsed.headless);
        assert_eq!(settings.output, parsed.output);
    }
}
