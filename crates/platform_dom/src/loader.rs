//! External widget-module discovery.
//!
//! The vanilla widget library may be installed as a global namespace object or
//! be reachable through a dynamic import. Both probes are bounded and
//! non-fatal: every failure mode reports "no module" and leaves the caller's
//! stand-in factories authoritative.

use crate::interop::RawFactory;

/// One factory discovered on the external module, keyed by its export name.
pub struct DiscoveredFactory {
    /// Stable widget/factory name (the module export key).
    pub name: String,
    /// The factory value, tagged by shape.
    pub factory: RawFactory,
}

/// Probes for the external widget module and enumerates its factories.
///
/// Checks the `global_name` namespace first, then falls back to dynamically
/// importing `specifier` bounded by `timeout_ms`. Returns `Ok(None)` when no
/// module is reachable (missing module, timeout, non-browser context); per the
/// degradation contract this function never fails the load as a whole.
pub async fn load_external_module(
    global_name: &str,
    specifier: Option<&str>,
    timeout_ms: u64,
) -> Result<Option<Vec<DiscoveredFactory>>, String> {
    #[cfg(target_arch = "wasm32")]
    {
        use crate::environment::is_browser_environment;
        use crate::interop::{classify_factory, js};
        use wasm_bindgen::JsValue;

        if !is_browser_environment() {
            return Ok(None);
        }

        let mut module = js::global_namespace(global_name);
        if module.is_null() || module.is_undefined() {
            let Some(specifier) = specifier else {
                return Ok(None);
            };
            let imported =
                wasm_bindgen_futures::JsFuture::from(js::import_module(specifier, timeout_ms as f64))
                    .await
                    .unwrap_or(JsValue::NULL);
            module = imported;
        }
        if module.is_null() || module.is_undefined() {
            return Ok(None);
        }

        let mut discovered = Vec::new();
        for name in js::module_keys(&module)
            .iter()
            .filter_map(|key| key.as_string())
        {
            let Ok(value) = js_sys::Reflect::get(&module, &JsValue::from_str(&name)) else {
                continue;
            };
            if let Some(factory) = classify_factory(&value) {
                discovered.push(DiscoveredFactory { name, factory });
            }
        }
        Ok(Some(discovered))
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (global_name, specifier, timeout_ms);
        Ok(None)
    }
}
