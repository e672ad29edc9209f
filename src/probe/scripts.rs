//! JavaScript sources evaluated in the page by the probes.
//!
//! Every script is a self-contained IIFE expression so it can be passed to
//! `Runtime.evaluate` as-is. List-like host objects are normalized with
//! `Array.from` before they cross the wire, and scripts that inspect
//! optional browser features guard with their own try/catch and resolve to
//! `null` instead of throwing.

/// Reads `navigator.userAgent` for browser detection.
pub const USER_AGENT_JS: &str = "navigator.userAgent";

/// Collects the `navigator` object: scalar properties, method names, and
/// the optional `connection` and `userAgentData` sub-objects.
pub const NAVIGATOR_JS: &str = r#"
(function() {
    const nav = {};
    const props = [
        'userAgent', 'appCodeName', 'appName', 'appVersion',
        'platform', 'product', 'productSub', 'vendor', 'vendorSub',
        'language', 'languages', 'onLine', 'cookieEnabled',
        'doNotTrack', 'hardwareConcurrency', 'maxTouchPoints',
        'deviceMemory', 'webdriver'
    ];

    props.forEach(prop => {
        try {
            const value = navigator[prop];
            if (value !== undefined) {
                if (Array.isArray(value)) {
                    nav[prop] = Array.from(value);
                } else {
                    nav[prop] = value;
                }
            }
        } catch(e) {}
    });

    nav.__methods__ = [];
    for (let key in navigator) {
        if (typeof navigator[key] === 'function') {
            nav.__methods__.push(key);
        }
    }

    if (navigator.connection) {
        nav.connection = {
            downlink: navigator.connection.downlink,
            effectiveType: navigator.connection.effectiveType,
            rtt: navigator.connection.rtt,
            saveData: navigator.connection.saveData
        };
    }

    if (navigator.userAgentData) {
        nav.userAgentData = {
            brands: navigator.userAgentData.brands,
            mobile: navigator.userAgentData.mobile,
            platform: navigator.userAgentData.platform
        };
    }

    return nav;
})()
"#;

/// Collects the `screen` object.
pub const SCREEN_JS: &str = r#"
(function() {
    return {
        width: screen.width,
        height: screen.height,
        availWidth: screen.availWidth,
        availHeight: screen.availHeight,
        availLeft: screen.availLeft || 0,
        availTop: screen.availTop || 0,
        colorDepth: screen.colorDepth,
        pixelDepth: screen.pixelDepth,
        orientation: screen.orientation ? {
            angle: screen.orientation.angle,
            type: screen.orientation.type
        } : null
    };
})()
"#;

/// Collects window geometry and context properties.
pub const WINDOW_JS: &str = r#"
(function() {
    return {
        innerWidth: window.innerWidth,
        innerHeight: window.innerHeight,
        outerWidth: window.outerWidth,
        outerHeight: window.outerHeight,
        screenX: window.screenX,
        screenY: window.screenY,
        screenLeft: window.screenLeft,
        screenTop: window.screenTop,
        pageXOffset: window.pageXOffset,
        pageYOffset: window.pageYOffset,
        devicePixelRatio: window.devicePixelRatio,
        isSecureContext: window.isSecureContext,
        origin: window.origin
    };
})()
"#;

/// Collects the `document` object plus a fixed list of the DOM factory and
/// query methods a replay environment is expected to provide.
pub const DOCUMENT_JS: &str = r#"
(function() {
    return {
        title: document.title,
        domain: document.domain,
        URL: document.URL,
        documentURI: document.documentURI,
        baseURI: document.baseURI,
        referrer: document.referrer,
        characterSet: document.characterSet,
        charset: document.charset,
        inputEncoding: document.inputEncoding,
        contentType: document.contentType,
        readyState: document.readyState,
        hidden: document.hidden,
        visibilityState: document.visibilityState,
        __methods__: ['createElement', 'createTextNode', 'getElementById',
                     'getElementsByClassName', 'getElementsByTagName',
                     'querySelector', 'querySelectorAll']
    };
})()
"#;

/// Collects the `location` object.
pub const LOCATION_JS: &str = r#"
(function() {
    return {
        href: location.href,
        protocol: location.protocol,
        host: location.host,
        hostname: location.hostname,
        port: location.port,
        pathname: location.pathname,
        search: location.search,
        hash: location.hash,
        origin: location.origin
    };
})()
"#;

/// Collects `performance` timing and memory figures where available.
pub const PERFORMANCE_JS: &str = r#"
(function() {
    const timing = performance.timing;
    return {
        timeOrigin: performance.timeOrigin,
        timing: timing ? {
            navigationStart: timing.navigationStart,
            domLoading: timing.domLoading,
            domInteractive: timing.domInteractive,
            domComplete: timing.domComplete,
            loadEventEnd: timing.loadEventEnd
        } : null,
        memory: performance.memory ? {
            jsHeapSizeLimit: performance.memory.jsHeapSizeLimit,
            totalJSHeapSize: performance.memory.totalJSHeapSize,
            usedJSHeapSize: performance.memory.usedJSHeapSize
        } : null
    };
})()
"#;

/// Collects the descriptors of all registered plugins.
pub const PLUGINS_JS: &str = r#"
(function() {
    const plugins = [];
    for (let i = 0; i < navigator.plugins.length; i++) {
        const plugin = navigator.plugins[i];
        plugins.push({
            name: plugin.name,
            filename: plugin.filename,
            description: plugin.description
        });
    }
    return plugins;
})()
"#;

/// Collects WebGL renderer information from a throwaway canvas, including
/// the unmasked strings exposed by `WEBGL_debug_renderer_info`.
///
/// Resolves to `null` when the browser has no WebGL support.
pub const WEBGL_JS: &str = r#"
(function() {
    try {
        const canvas = document.createElement('canvas');
        const gl = canvas.getContext('webgl') || canvas.getContext('experimental-webgl');
        if (!gl) return null;

        const debugInfo = gl.getExtension('WEBGL_debug_renderer_info');
        return {
            vendor: gl.getParameter(gl.VENDOR),
            renderer: gl.getParameter(gl.RENDERER),
            unmaskedVendor: debugInfo ? gl.getParameter(debugInfo.UNMASKED_VENDOR_WEBGL) : null,
            unmaskedRenderer: debugInfo ? gl.getParameter(debugInfo.UNMASKED_RENDERER_WEBGL) : null,
            version: gl.getParameter(gl.VERSION),
            shadingLanguageVersion: gl.getParameter(gl.SHADING_LANGUAGE_VERSION),
            maxTextureSize: gl.getParameter(gl.MAX_TEXTURE_SIZE),
            maxViewportDims: Array.from(gl.getParameter(gl.MAX_VIEWPORT_DIMS))
        };
    } catch(e) {
        return null;
    }
})()
"#;

/// Renders a fixed scene on a throwaway canvas and returns its data URL.
///
/// The drawing commands are deliberately constant so the resulting data URL
/// characterizes the rendering stack, not the input.
pub const CANVAS_JS: &str = r#"
(function() {
    try {
        const canvas = document.createElement('canvas');
        canvas.width = 200;
        canvas.height = 50;
        const ctx = canvas.getContext('2d');

        ctx.textBaseline = 'top';
        ctx.font = '14px Arial';
        ctx.fillStyle = '#f60';
        ctx.fillRect(0, 0, 100, 50);
        ctx.fillStyle = '#069';
        ctx.fillText('Canvas Fingerprint', 2, 15);
        ctx.fillStyle = 'rgba(102, 204, 0, 0.7)';
        ctx.fillText('Canvas Fingerprint', 4, 17);

        return canvas.toDataURL();
    } catch(e) {
        return null;
    }
})()
"#;

/// Collects latency and sample rate figures from a fresh AudioContext.
///
/// Resolves to `null` when neither `AudioContext` nor `webkitAudioContext`
/// exists.
pub const AUDIO_CONTEXT_JS: &str = r#"
(function() {
    try {
        const AudioContext = window.AudioContext || window.webkitAudioContext;
        if (!AudioContext) return null;

        const ctx = new AudioContext();
        return {
            sampleRate: ctx.sampleRate,
            state: ctx.state,
            baseLatency: ctx.baseLatency,
            outputLatency: ctx.outputLatency
        };
    } catch(e) {
        return null;
    }
})()
"#;
