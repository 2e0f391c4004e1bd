//! Bridge tuning knobs.

use platform_dom::SanitizeLevel;
use serde::{Deserialize, Serialize};

/// Default global namespace the external widget module installs itself under.
pub const DEFAULT_MODULE_GLOBAL: &str = "VanillaKit";

/// Default dynamic-import specifier for the external widget module.
pub const DEFAULT_MODULE_SPECIFIER: &str = "vanilla-kit";

/// Settings applied per bridge attach point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Global namespace probed for the external module.
    pub module_global: String,
    /// Dynamic-import fallback specifier; `None` disables the import probe.
    pub module_specifier: Option<String>,
    /// Upper bound on module loading before stand-ins stay authoritative.
    pub load_timeout_ms: u64,
    /// Whether the creation cache is consulted before invoking factories.
    pub cache_enabled: bool,
    /// Maximum number of cached creation templates.
    pub cache_capacity: usize,
    /// Sanitization level applied to markup-valued factory results.
    pub markup_level: SanitizeLevel,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            module_global: DEFAULT_MODULE_GLOBAL.to_string(),
            module_specifier: Some(DEFAULT_MODULE_SPECIFIER.to_string()),
            load_timeout_ms: 3_000,
            cache_enabled: true,
            cache_capacity: 32,
            markup_level: SanitizeLevel::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_json() {
        let settings = BridgeSettings::default();
        let raw = serde_json::to_string(&settings).expect("serialize");
        let restored: BridgeSettings = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(settings, restored);
    }
}
