//! Environment probes.
//!
//! A probe pairs a JavaScript expression with the fallback value used when
//! the evaluation cannot produce data. Probes only read from the page; they
//! never navigate and never leave state behind beyond throwaway objects
//! created during a single evaluation.
//!
//! Probe failures are contained: a failed or empty evaluation logs a
//! warning and yields the fallback, so a page with a broken feature (no
//! WebGL, no audio stack) still produces a complete snapshot.

pub mod scripts;

use crate::browser::BrowserEngine;
use serde_json::Value;
use tracing::warn;

/// Fallback value used when a probe cannot produce data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Degrade to an empty JSON object.
    EmptyObject,
    /// Degrade to an empty JSON array.
    EmptyArray,
    /// Degrade to JSON null.
    Null,
}

impl Fallback {
    /// Returns the fallback as a JSON value.
    pub fn value(&self) -> Value {
        match self {
            Fallback::EmptyObject => Value::Object(serde_json::Map::new()),
            Fallback::EmptyArray => Value::Array(Vec::new()),
            Fallback::Null => Value::Null,
        }
    }
}

/// A single environment probe.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    /// Name used in logs.
    pub name: &'static str,
    /// JavaScript expression evaluated in the page.
    pub script: &'static str,
    /// Value substituted when the probe fails.
    pub fallback: Fallback,
}

impl Probe {
    /// Runs the probe against the engine.
    ///
    /// A failed evaluation never propagates: the probe logs a warning and
    /// degrades to its fallback value, so one broken probe cannot abort the
    /// remaining ones.
    pub async fn run<E: BrowserEngine + ?Sized>(&self, engine: &E) -> Value {
        match engine.evaluate(self.script).await {
            Ok(Value::Null) if self.fallback != Fallback::Null => {
                warn!("Probe '{}' returned no data, using fallback", self.name);
                self.fallback.value()
            }
            Ok(value) => value,
            Err(error) => {
                warn!("Probe '{}' failed: {}, using fallback", self.name, error);
                self.fallback.value()
            }
        }
    }
}

/// Probes the `navigator` object.
pub const NAVIGATOR: Probe = Probe {
    name: "navigator",
    script: scripts::NAVIGATOR_JS,
    fallback: Fallback::EmptyObject,
};

/// Probes the `screen` object.
pub const SCREEN: Probe = Probe {
    name: "screen",
    script: scripts::SCREEN_JS,
    fallback: Fallback::EmptyObject,
};

/// Probes window geometry and context properties.
pub const WINDOW: Probe = Probe {
    name: "window",
    script: scripts::WINDOW_JS,
    fallback: Fallback::EmptyObject,
};

/// Probes the `document` object.
pub const DOCUMENT: Probe = Probe {
    name: "document",
    script: scripts::DOCUMENT_JS,
    fallback: Fallback::EmptyObject,
};

/// Probes the `location` object.
pub const LOCATION: Probe = Probe {
    name: "location",
    script: scripts::LOCATION_JS,
    fallback: Fallback::EmptyObject,
};

/// Probes `performance` timing and memory figures.
pub const PERFORMANCE: Probe = Probe {
    name: "performance",
    script: scripts::PERFORMANCE_JS,
    fallback: Fallback::EmptyObject,
};

/// Probes the plugin list.
pub const PLUGINS: Probe = Probe {
    name: "plugins",
    script: scripts::PLUGINS_JS,
    fallback: Fallback::EmptyArray,
};

/// Probes WebGL renderer information. `null` means no WebGL support.
pub const WEBGL: Probe = Probe {
    name: "webgl",
    script: scripts::WEBGL_JS,
    fallback: Fallback::Null,
};

/// Probes the canvas rendering stack. `null` means rendering failed.
pub const CANVAS: Probe = Probe {
    name: "canvas",
    script: scripts::CANVAS_JS,
    fallback: Fallback::Null,
};

/// Probes the audio stack. `null` means no AudioContext support.
pub const AUDIO_CONTEXT: Probe = Probe {
    name: "audioContext",
    script: scripts::AUDIO_CONTEXT_JS,
    fallback: Fallback::Null,
};

/// All probes in collection order.
pub const ALL: [Probe; 10] = [
    NAVIGATOR,
    SCREEN,
    WINDOW,
    DOCUMENT,
    LOCATION,
    PERFORMANCE,
    PLUGINS,
    WEBGL,
    CANVAS,
    AUDIO_CONTEXT,
];
