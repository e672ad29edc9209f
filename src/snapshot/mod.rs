//! Snapshot document model.
//!
//! An [`EnvSnapshot`] is the JSON document produced by a collection run. Its
//! top-level fields are always present: probes that could not produce data
//! leave an empty object, an empty array, or `null` behind rather than a
//! missing key, so downstream consumers can rely on the document shape.
//!
//! The six host-object snapshots under `objects` are kept as raw JSON
//! values: their exact property sets vary between browsers and probes, and
//! the collector passes them through untouched. The fixed-shape parts
//! (plugins, WebGL, audio) get typed structs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Raw snapshots of the six probed host objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectSnapshots {
    /// The `navigator` object.
    #[serde(default)]
    pub navigator: Value,

    /// The `screen` object.
    #[serde(default)]
    pub screen: Value,

    /// Window geometry and context properties.
    #[serde(default)]
    pub window: Value,

    /// The `document` object.
    #[serde(default)]
    pub document: Value,

    /// The `location` object.
    #[serde(default)]
    pub location: Value,

    /// The `performance` object.
    #[serde(default)]
    pub performance: Value,
}

/// A single plugin descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub description: String,
}

impl PluginDescriptor {
    /// Converts a plugins probe result into typed descriptors.
    ///
    /// Malformed data degrades to an empty list with a warning; a probe
    /// payload that does not parse is treated the same as a failed probe.
    pub fn list_from_value(value: Value) -> Vec<PluginDescriptor> {
        match serde_json::from_value(value) {
            Ok(list) => list,
            Err(error) => {
                warn!("Discarding malformed plugins data: {}", error);
                Vec::new()
            }
        }
    }
}

/// WebGL renderer information.
///
/// All fields are optional: the unmasked strings require the
/// `WEBGL_debug_renderer_info` extension, and probes on restricted pages may
/// deliver partial objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebglInfo {
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub renderer: Option<String>,
    #[serde(default)]
    pub unmasked_vendor: Option<String>,
    #[serde(default)]
    pub unmasked_renderer: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub shading_language_version: Option<String>,
    #[serde(default)]
    pub max_texture_size: Option<i64>,
    #[serde(default)]
    pub max_viewport_dims: Option<Vec<i64>>,
}

impl WebglInfo {
    /// Converts a WebGL probe result into typed form.
    ///
    /// `null` means the browser has no WebGL support and maps to `None`;
    /// malformed data also degrades to `None` with a warning.
    pub fn from_value(value: Value) -> Option<WebglInfo> {
        match serde_json::from_value(value) {
            Ok(info) => info,
            Err(error) => {
                warn!("Discarding malformed WebGL data: {}", error);
                None
            }
        }
    }
}

/// AudioContext information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioContextInfo {
    #[serde(default)]
    pub sample_rate: Option<f64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub base_latency: Option<f64>,
    #[serde(default)]
    pub output_latency: Option<f64>,
}

impl AudioContextInfo {
    /// Converts an audio probe result into typed form.
    pub fn from_value(value: Value) -> Option<AudioContextInfo> {
        match serde_json::from_value(value) {
            Ok(info) => info,
            Err(error) => {
                warn!("Discarding malformed audio context data: {}", error);
                None
            }
        }
    }
}

/// A complete environment snapshot document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvSnapshot {
    /// Detected browser family (e.g. "Chrome").
    pub browser: String,

    /// Detected browser version string, empty when unknown.
    pub version: String,

    /// UTC timestamp of the collection run.
    pub collected_at: DateTime<Utc>,

    /// URL the snapshot was taken from.
    pub source_url: String,

    /// Raw snapshots of the probed host objects.
    pub objects: ObjectSnapshots,

    /// Plugin descriptors.
    #[serde(default)]
    pub plugins: Vec<PluginDescriptor>,

    /// WebGL information, `null` when unsupported.
    #[serde(default)]
    pub webgl: Option<WebglInfo>,

    /// Canvas rendering data URL, `null` when rendering failed.
    #[serde(default)]
    pub canvas: Option<String>,

    /// AudioContext information, `null` when unsupported.
    #[serde(default)]
    pub audio_context: Option<AudioContextInfo>,
}

impl EnvSnapshot {
    /// Serializes the snapshot to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize snapshot")
    }

    /// Loads a snapshot from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot from {}", path.display()))?;
        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot from {}", path.display()))?;
        Ok(snapshot)
    }

    /// Saves the snapshot to a JSON file, creating parent directories as
    /// needed.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }

        let content = self.to_json_pretty()?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;

        Ok(())
    }

    /// Returns the collected user agent, if the navigator probe delivered
    /// one.
    pub fn user_agent(&self) -> Option<&str> {
        self.objects.navigator.get("userAgent").and_then(Value::as_str)
    }

    /// Returns the collected platform string.
    pub fn platform(&self) -> Option<&str> {
        self.objects.navigator.get("platform").and_then(Value::as_str)
    }

    /// Returns the collected screen dimensions as (width, height).
    pub fn screen_size(&self) -> Option<(i64, i64)> {
        let width = self.objects.screen.get("width").and_then(Value::as_i64)?;
        let height = self.objects.screen.get("height").and_then(Value::as_i64)?;
        Some((width, height))
    }

    /// Whether the snapshot carries WebGL information.
    pub fn has_webgl(&self) -> bool {
        self.webgl.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_snapshot() -> EnvSnapshot {
        EnvSnapshot {
            browser: "Chrome".to_string(),
            version: "120.0.6099.109".to_string(),
            collected_at: Utc.with_ymd_and_hms(2024, 5, 5, 12, 0, 0).unwrap(),
            source_url: "about:blank".to_string(),
            objects: ObjectSnapshots {
                navigator: json!({
                    "userAgent": "Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0.6099.109",
                    "platform": "Linux x86_64"
                }),
                screen: json!({ "width": 1920, "height": 1080 }),
                window: json!({ "innerWidth": 1920, "innerHeight": 1040 }),
                document: json!({ "title": "" }),
                location: json!({ "href": "about:blank" }),
                performance: json!({ "timeOrigin": 1714910400000.0 }),
            },
            plugins: vec![PluginDescriptor {
                name: "PDF Viewer".to_string(),
                filename: "internal-pdf-viewer".to_string(),
                description: "Portable Document Format".to_string(),
            }],
            webgl: Some(WebglInfo {
                vendor: Some("WebKit".to_string()),
                renderer: Some("WebKit WebGL".to_string()),
                max_texture_size: Some(16384),
                max_viewport_dims: Some(vec![32767, 32767]),
                ..Default::default()
            }),
            canvas: Some("data:image/png;base64,AAAA".to_string()),
            audio_context: Some(AudioContextInfo {
                sample_rate: Some(44100.0),
                state: Some("suspended".to_string()),
                base_latency: Some(0.01),
                output_latency: Some(0.0),
            }),
        }
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let snapshot = sample_snapshot();
        let json = snapshot.to_json_pretty().unwrap();

        assert!(json.contains("\"collectedAt\""));
        assert!(json.contains("\"sourceUrl\""));
        assert!(json.contains("\"audioContext\""));
        assert!(json.contains("\"maxTextureSize\""));
        assert!(json.contains("\"sampleRate\""));
        assert!(!json.contains("\"collected_at\""));
    }

    #[test]
    fn test_nullable_fields_serialize_as_null() {
        let mut snapshot = sample_snapshot();
        snapshot.webgl = None;
        snapshot.canvas = None;
        snapshot.audio_context = None;

        let value: Value = serde_json::from_str(&snapshot.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["webgl"], Value::Null);
        assert_eq!(value["canvas"], Value::Null);
        assert_eq!(value["audioContext"], Value::Null);
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = sample_snapshot();
        let json = snapshot.to_json_pretty().unwrap();
        let parsed: EnvSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.browser, snapshot.browser);
        assert_eq!(parsed.collected_at, snapshot.collected_at);
        assert_eq!(parsed.plugins, snapshot.plugins);
        assert_eq!(parsed.webgl, snapshot.webgl);
        assert_eq!(parsed.audio_context, snapshot.audio_context);
    }

    #[test]
    fn test_plugins_from_value() {
        let value = json!([
            { "name": "PDF Viewer", "filename": "internal-pdf-viewer", "description": "" }
        ]);
        let plugins = PluginDescriptor::list_from_value(value);
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].name, "PDF Viewer");

        // Malformed payloads degrade to empty
        assert!(PluginDescriptor::list_from_value(json!("nope")).is_empty());
        assert!(PluginDescriptor::list_from_value(json!([{ "name": 42 }])).is_empty());
    }

    #[test]
    fn test_webgl_from_value() {
        let value = json!({
            "vendor": "WebKit",
            "renderer": "WebKit WebGL",
            "unmaskedVendor": "Google Inc. (NVIDIA)",
            "maxTextureSize": 16384,
            "maxViewportDims": [32767, 32767]
        });
        let info = WebglInfo::from_value(value).unwrap();
        assert_eq!(info.vendor.as_deref(), Some("WebKit"));
        assert_eq!(info.unmasked_vendor.as_deref(), Some("Google Inc. (NVIDIA)"));
        assert_eq!(info.max_texture_size, Some(16384));
        assert_eq!(info.max_viewport_dims, Some(vec![32767, 32767]));

        assert!(WebglInfo::from_value(Value::Null).is_none());
        assert!(WebglInfo::from_value(json!({ "vendor": 1 })).is_none());
    }

    #[test]
    fn test_audio_context_from_value() {
        let value = json!({ "sampleRate": 48000.0, "state": "running" });
        let info = AudioContextInfo::from_value(value).unwrap();
        assert_eq!(info.sample_rate, Some(48000.0));
        assert_eq!(info.state.as_deref(), Some("running"));
        assert!(info.base_latency.is_none());

        assert!(AudioContextInfo::from_value(Value::Null).is_none());
    }

    #[test]
    fn test_summary_accessors() {
        let snapshot = sample_snapshot();
        assert_eq!(
            snapshot.user_agent(),
            Some("Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0.6099.109")
        );
        assert_eq!(snapshot.platform(), Some("Linux x86_64"));
        assert_eq!(snapshot.screen_size(), Some((1920, 1080)));
        assert!(snapshot.has_webgl());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/snapshot.json");

        let snapshot = sample_snapshot();
        snapshot.save_to_file(&path).unwrap();

        let loaded = EnvSnapshot::from_file(&path).unwrap();
        assert_eq!(loaded.browser, snapshot.browser);
        assert_eq!(loaded.canvas, snapshot.canvas);
    }
}
