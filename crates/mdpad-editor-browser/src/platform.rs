//! Platform detection for key bindings and browser quirks.

use std::sync::OnceLock;

/// What the editor needs to know about the host browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    /// macOS (not iOS): Cmd is the primary modifier.
    pub mac: bool,
    pub ios: bool,
    pub android: bool,
    pub safari: bool,
    pub gecko: bool,
    pub mobile: bool,
}

impl Platform {
    /// Classify from `navigator.userAgent`, `navigator.platform` and touch support.
    pub fn from_navigator(user_agent: &str, platform: &str, touch: bool) -> Self {
        let ua = user_agent.to_lowercase();
        let platform = platform.to_lowercase();

        let ios = ua.contains("iphone")
            || ua.contains("ipad")
            || ua.contains("ipod")
            || (platform.contains("mac") && touch);
        let android = ua.contains("android");
        Self {
            mac: platform.contains("mac") && !ios,
            ios,
            android,
            safari: ua.contains("safari") && !ua.contains("chrome"),
            gecko: ua.contains("gecko/") && !ua.contains("like gecko"),
            mobile: ios || android || ua.contains("mobile"),
        }
    }

    /// Whether Cmd (rather than Ctrl) is the primary shortcut modifier.
    pub fn primary_is_meta(&self) -> bool {
        self.mac || self.ios
    }
}

static PLATFORM: OnceLock<Platform> = OnceLock::new();

/// Cached platform info. Detection runs once on first call.
pub fn platform() -> &'static Platform {
    PLATFORM.get_or_init(detect_platform)
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn detect_platform() -> Platform {
    let Some(window) = web_sys::window() else {
        return Platform::default();
    };
    let navigator = window.navigator();
    let platform = Platform::from_navigator(
        &navigator.user_agent().unwrap_or_default(),
        &navigator.platform().unwrap_or_default(),
        navigator.max_touch_points() > 0,
    );
    tracing::debug!(target: "mdpad::dom", ?platform, "detected platform");
    platform
}

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
fn detect_platform() -> Platform {
    Platform::default()
}
