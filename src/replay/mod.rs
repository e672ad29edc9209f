//! Replay script generation.
//!
//! Renders a collected [`EnvSnapshot`] into a standalone JavaScript IIFE
//! that re-applies the captured values onto another browser context. Host
//! object properties are restored through `Object.defineProperty` getters
//! where the originals are read-only accessors, while window metrics are
//! plain assignments. WebGL values are replayed by patching `getParameter`
//! on the rendering context prototypes. Every section is wrapped in
//! try/catch so the script never throws into the page, whatever objects
//! the target context is missing.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::snapshot::{EnvSnapshot, PluginDescriptor, WebglInfo};

/// Keys produced by the navigator probe that are not real navigator
/// properties and must not be replayed.
const NAVIGATOR_HELPER_KEYS: &[&str] = &["__methods__", "connection", "userAgentData"];

/// Renders snapshots into replay scripts.
pub struct ReplayScript;

impl ReplayScript {
    /// Renders `snapshot` as a JavaScript IIFE.
    ///
    /// The output is a single expression statement preceded by a header
    /// comment. Sections without data (empty host objects, no plugins, no
    /// WebGL) are omitted entirely. Identical snapshots render to
    /// byte-identical scripts: JSON objects embed with sorted keys.
    pub fn render(snapshot: &EnvSnapshot) -> String {
        let mut script = String::new();

        script.push_str(&header(snapshot));
        script.push_str("(function() {\n    'use strict';\n");

        if let Some(section) = getter_section(
            "Navigator",
            "window.navigator",
            "navigatorProps",
            &snapshot.objects.navigator,
            NAVIGATOR_HELPER_KEYS,
        ) {
            script.push_str(&section);
        }

        if let Some(section) = getter_section(
            "Screen",
            "window.screen",
            "screenProps",
            &snapshot.objects.screen,
            &[],
        ) {
            script.push_str(&section);
        }

        if let Some(section) = window_section(&snapshot.objects.window) {
            script.push_str(&section);
        }

        if let Some(info) = &snapshot.webgl {
            script.push_str(&webgl_section(info));
        }

        if !snapshot.plugins.is_empty() {
            script.push_str(&plugins_section(&snapshot.plugins));
        }

        script.push_str("})();\n");

        script
    }

    /// Returns the script path that sits next to a snapshot file: same
    /// stem, `.js` extension.
    pub fn path_for(json_path: &Path) -> PathBuf {
        json_path.with_extension("js")
    }
}

fn header(snapshot: &EnvSnapshot) -> String {
    let browser = format!("{} {}", snapshot.browser, snapshot.version);
    format!(
        "/**\n * Generated browser environment replay script.\n * Browser: {}\n * Collected: {}\n * Source: {}\n */\n",
        browser.trim_end(),
        snapshot.collected_at.to_rfc3339(),
        snapshot.source_url,
    )
}

/// Emits a section that installs a getter per collected property.
///
/// Returns `None` when the probe result is not an object or has no
/// replayable keys, so the section disappears from the script.
fn getter_section(
    title: &str,
    target: &str,
    var: &str,
    value: &Value,
    excluded: &[&str],
) -> Option<String> {
    let props = filtered_object(value, excluded)?;
    Some(format!(
        r#"
    // {title}
    try {{
        const {var} = {props};
        Object.keys({var}).forEach(function(key) {{
            try {{
                Object.defineProperty({target}, key, {{
                    get: function() {{ return {var}[key]; }},
                    configurable: true
                }});
            }} catch (e) {{}}
        }});
    }} catch (e) {{}}
"#,
        title = title,
        var = var,
        target = target,
        props = pretty_json(&Value::Object(props), "        "),
    ))
}

// Window metrics are writable on the global object, so plain assignment is
// enough; the per-key try/catch keeps accessor-only properties such as
// `origin` from aborting the rest under strict mode.
fn window_section(value: &Value) -> Option<String> {
    let props = filtered_object(value, &[])?;
    Some(format!(
        r#"
    // Window
    try {{
        const windowProps = {props};
        Object.keys(windowProps).forEach(function(key) {{
            try {{
                window[key] = windowProps[key];
            }} catch (e) {{}}
        }});
    }} catch (e) {{}}
"#,
        props = pretty_json(&Value::Object(props), "        "),
    ))
}

fn webgl_section(info: &WebglInfo) -> String {
    format!(
        r#"
    // WebGL
    try {{
        const webglInfo = {info};
        const patchGetParameter = function(target) {{
            const originalGetParameter = target.prototype.getParameter;
            target.prototype.getParameter = function(parameter) {{
                // VENDOR
                if (parameter === 7936 && webglInfo.vendor !== null) {{
                    return webglInfo.vendor;
                }}
                // RENDERER
                if (parameter === 7937 && webglInfo.renderer !== null) {{
                    return webglInfo.renderer;
                }}
                // UNMASKED_VENDOR_WEBGL
                if (parameter === 37445 && webglInfo.unmaskedVendor !== null) {{
                    return webglInfo.unmaskedVendor;
                }}
                // UNMASKED_RENDERER_WEBGL
                if (parameter === 37446 && webglInfo.unmaskedRenderer !== null) {{
                    return webglInfo.unmaskedRenderer;
                }}
                // VERSION
                if (parameter === 7938 && webglInfo.version !== null) {{
                    return webglInfo.version;
                }}
                // SHADING_LANGUAGE_VERSION
                if (parameter === 35724 && webglInfo.shadingLanguageVersion !== null) {{
                    return webglInfo.shadingLanguageVersion;
                }}
                // MAX_TEXTURE_SIZE
                if (parameter === 3379 && webglInfo.maxTextureSize !== null) {{
                    return webglInfo.maxTextureSize;
                }}
                // MAX_VIEWPORT_DIMS
                if (parameter === 3386 && webglInfo.maxViewportDims !== null) {{
                    return new Int32Array(webglInfo.maxViewportDims);
                }}
                return originalGetParameter.call(this, parameter);
            }};
        }};
        if (typeof WebGLRenderingContext !== 'undefined') {{
            patchGetParameter(WebGLRenderingContext);
        }}
        if (typeof WebGL2RenderingContext !== 'undefined') {{
            patchGetParameter(WebGL2RenderingContext);
        }}
    }} catch (e) {{}}
"#,
        info = pretty_json(info, "        "),
    )
}

fn plugins_section(plugins: &[PluginDescriptor]) -> String {
    format!(
        r#"
    // Plugins
    try {{
        const pluginData = {data};
        const pluginProto = typeof Plugin !== 'undefined' ? Plugin.prototype : Object.prototype;
        const pluginList = [];
        pluginData.forEach(function(data) {{
            const plugin = Object.create(pluginProto);
            Object.defineProperties(plugin, {{
                name: {{ value: data.name, enumerable: true }},
                filename: {{ value: data.filename, enumerable: true }},
                description: {{ value: data.description, enumerable: true }},
                length: {{ value: 0, enumerable: true }}
            }});
            pluginList.push(plugin);
        }});
        const arrayProto = typeof PluginArray !== 'undefined' ? PluginArray.prototype : Object.prototype;
        const pluginArray = Object.create(arrayProto);
        pluginList.forEach(function(plugin, index) {{
            Object.defineProperty(pluginArray, index, {{
                value: plugin,
                enumerable: true
            }});
            Object.defineProperty(pluginArray, plugin.name, {{
                value: plugin,
                enumerable: false
            }});
        }});
        Object.defineProperty(pluginArray, 'length', {{
            value: pluginList.length,
            enumerable: false
        }});
        pluginArray.item = function(index) {{ return this[index] || null; }};
        pluginArray.namedItem = function(name) {{ return this[name] || null; }};
        pluginArray.refresh = function() {{}};
        Object.defineProperty(window.navigator, 'plugins', {{
            get: function() {{ return pluginArray; }},
            configurable: true
        }});
    }} catch (e) {{}}
"#,
        data = pretty_json(plugins, "        "),
    )
}

/// Clones an object value without the excluded keys.
///
/// `serde_json::Map` iterates in sorted key order, which keeps the
/// embedded JSON deterministic.
fn filtered_object(value: &Value, excluded: &[&str]) -> Option<Map<String, Value>> {
    let object = value.as_object()?;
    let filtered: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if filtered.is_empty() {
        None
    } else {
        Some(filtered)
    }
}

/// Pretty-prints a value and re-indents its continuation lines so the
/// embedded JSON lines up with the surrounding script.
fn pretty_json<T>(value: &T, indent: &str) -> String
where
    T: Serialize + ?Sized,
{
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| String::from("null"));
    rendered.replace('\n', &format!("\n{}", indent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{AudioContextInfo, ObjectSnapshots};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample_snapshot() -> EnvSnapshot {
        EnvSnapshot {
            browser: "Chrome".to_string(),
            version: "120.0.6099.109".to_string(),
            collected_at: Utc.with_ymd_and_hms(2024, 5, 5, 12, 0, 0).unwrap(),
            source_url: "https://example.com".to_string(),
            objects: ObjectSnapshots {
                navigator: json!({
                    "userAgent": "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
                    "platform": "Win32",
                    "language": "en-US",
                    "__methods__": ["sendBeacon", "vibrate"],
                    "connection": { "downlink": 10.0, "rtt": 50 },
                    "userAgentData": { "mobile": false, "platform": "Windows" },
                }),
                screen: json!({
                    "width": 2560,
                    "height": 1440,
                    "colorDepth": 24,
                    "orientation": { "angle": 0, "type": "landscape-primary" },
                }),
                window: json!({
                    "innerWidth": 1280,
                    "innerHeight": 720,
                    "devicePixelRatio": 1.5,
                }),
                document: json!({ "characterSet": "UTF-8" }),
                location: json!({ "href": "https://example.com/" }),
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
                unmasked_vendor: Some("Google Inc. (NVIDIA)".to_string()),
                unmasked_renderer: Some("ANGLE (NVIDIA GeForce RTX 3080)".to_string()),
                version: Some("WebGL 1.0 (OpenGL ES 2.0 Chromium)".to_string()),
                shading_language_version: Some("WebGL GLSL ES 1.0".to_string()),
                max_texture_size: Some(16384),
                max_viewport_dims: Some(vec![32767, 32767]),
            }),
            canvas: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            audio_context: Some(AudioContextInfo {
                sample_rate: Some(48000.0),
                state: Some("suspended".to_string()),
                base_latency: Some(0.01),
                output_latency: None,
            }),
        }
    }

    fn empty_snapshot() -> EnvSnapshot {
        EnvSnapshot {
            browser: "Unknown".to_string(),
            version: String::new(),
            collected_at: Utc.with_ymd_and_hms(2024, 5, 5, 12, 0, 0).unwrap(),
            source_url: "about:blank".to_string(),
            objects: ObjectSnapshots::default(),
            plugins: Vec::new(),
            webgl: None,
            canvas: None,
            audio_context: None,
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let snapshot = sample_snapshot();
        assert_eq!(ReplayScript::render(&snapshot), ReplayScript::render(&snapshot));
    }

    #[test]
    fn test_render_is_a_single_iife() {
        let script = ReplayScript::render(&sample_snapshot());
        assert!(script.starts_with("/**"));
        assert!(script.contains("(function() {"));
        assert!(script.contains("'use strict';"));
        assert!(script.ends_with("})();\n"));
    }

    #[test]
    fn test_render_header_describes_snapshot() {
        let script = ReplayScript::render(&sample_snapshot());
        assert!(script.contains("Browser: Chrome 120.0.6099.109"));
        assert!(script.contains("Collected: 2024-05-05T12:00:00+00:00"));
        assert!(script.contains("Source: https://example.com"));
    }

    #[test]
    fn test_render_header_without_version_has_no_trailing_space() {
        let script = ReplayScript::render(&empty_snapshot());
        assert!(script.contains(" * Browser: Unknown\n"));
    }

    #[test]
    fn test_render_excludes_navigator_helper_keys() {
        let script = ReplayScript::render(&sample_snapshot());
        assert!(script.contains("\"userAgent\""));
        assert!(script.contains("\"platform\""));
        assert!(!script.contains("__methods__"));
        assert!(!script.contains("\"connection\""));
        assert!(!script.contains("userAgentData"));
    }

    #[test]
    fn test_render_installs_getters_for_navigator_and_screen() {
        let script = ReplayScript::render(&sample_snapshot());
        assert!(script.contains("Object.defineProperty(window.navigator, key"));
        assert!(script.contains("Object.defineProperty(window.screen, key"));
        assert!(script.contains("\"width\": 2560"));
    }

    #[test]
    fn test_render_assigns_window_metrics() {
        let script = ReplayScript::render(&sample_snapshot());
        assert!(script.contains("window[key] = windowProps[key];"));
        assert!(script.contains("\"innerWidth\": 1280"));
    }

    #[test]
    fn test_render_patches_webgl_only_with_data() {
        let with_webgl = ReplayScript::render(&sample_snapshot());
        assert!(with_webgl.contains("WebGLRenderingContext"));
        assert!(with_webgl.contains("WebGL2RenderingContext"));
        assert!(with_webgl.contains("ANGLE (NVIDIA GeForce RTX 3080)"));
        assert!(with_webgl.contains("37445"));

        let mut snapshot = sample_snapshot();
        snapshot.webgl = None;
        let without_webgl = ReplayScript::render(&snapshot);
        assert!(!without_webgl.contains("WebGLRenderingContext"));
    }

    #[test]
    fn test_render_webgl_serializes_missing_fields_as_null() {
        let mut snapshot = sample_snapshot();
        snapshot.webgl = Some(WebglInfo {
            vendor: Some("WebKit".to_string()),
            ..WebglInfo::default()
        });
        let script = ReplayScript::render(&snapshot);
        assert!(script.contains("\"vendor\": \"WebKit\""));
        assert!(script.contains("\"renderer\": null"));
    }

    #[test]
    fn test_render_rebuilds_plugins_only_when_present() {
        let with_plugins = ReplayScript::render(&sample_snapshot());
        assert!(with_plugins.contains("PluginArray"));
        assert!(with_plugins.contains("PDF Viewer"));
        assert!(with_plugins.contains("Object.defineProperty(window.navigator, 'plugins'"));

        let mut snapshot = sample_snapshot();
        snapshot.plugins.clear();
        let without_plugins = ReplayScript::render(&snapshot);
        assert!(!without_plugins.contains("PluginArray"));
    }

    #[test]
    fn test_render_empty_snapshot_has_no_sections() {
        let script = ReplayScript::render(&empty_snapshot());
        assert!(!script.contains("// Navigator"));
        assert!(!script.contains("// Screen"));
        assert!(!script.contains("// Window"));
        assert!(!script.contains("// WebGL"));
        assert!(!script.contains("// Plugins"));
        assert!(script.ends_with("})();\n"));
    }

    #[test]
    fn test_render_escapes_embedded_strings() {
        let mut snapshot = sample_snapshot();
        snapshot.objects.navigator = json!({
            "userAgent": "Mozilla \"quoted\" \\ backslash",
        });
        let script = ReplayScript::render(&snapshot);
        assert!(script.contains(r#"Mozilla \"quoted\" \\ backslash"#));
    }

    #[test]
    fn test_script_path_sits_next_to_snapshot() {
        assert_eq!(
            ReplayScript::path_for(Path::new("templates/env_template.json")),
            PathBuf::from("templates/env_template.js")
        );
        assert_eq!(
            ReplayScript::path_for(Path::new("snapshot")),
            PathBuf::from("snapshot.js")
        );
    }
}
