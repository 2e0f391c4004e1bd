//! Widget configuration passed through the bridge into external factories.

use std::collections::BTreeMap;

use platform_dom::{ElementHandle, JsonMap};
use serde_json::{json, Value};

use crate::event::WidgetEventHandler;

/// One configuration entry value.
///
/// Only [`ConfigValue::Json`] entries ever cross the JS boundary into an
/// external factory. Handler and element entries stay inside the bridge (they
/// are wired as listeners or mounted separately) and are replaced by opaque
/// markers in cache fingerprints so they never affect cache identity.
#[derive(Clone)]
pub enum ConfigValue {
    /// Plain JSON-able prop.
    Json(Value),
    /// Caller-supplied event handler.
    Handler(WidgetEventHandler),
    /// Live element reference.
    Element(ElementHandle),
}

/// Ordered widget configuration map.
#[derive(Clone, Default)]
pub struct WidgetConfig {
    entries: BTreeMap<String, ConfigValue>,
}

impl WidgetConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a JSON-valued prop, returning `self` for chaining.
    pub fn with_json(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .insert(key.into(), ConfigValue::Json(value.into()));
        self
    }

    /// Inserts a handler-valued prop, returning `self` for chaining.
    pub fn with_handler(mut self, key: impl Into<String>, handler: WidgetEventHandler) -> Self {
        self.entries
            .insert(key.into(), ConfigValue::Handler(handler));
        self
    }

    /// Inserts an element-valued prop, returning `self` for chaining.
    pub fn with_element(mut self, key: impl Into<String>, element: ElementHandle) -> Self {
        self.entries
            .insert(key.into(), ConfigValue::Element(element));
        self
    }

    /// Returns the entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Returns whether no entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns only the JSON-valued props, in key order.
    ///
    /// This is the payload handed to external factories.
    pub fn json_props(&self) -> JsonMap {
        let mut props = JsonMap::new();
        for (key, value) in &self.entries {
            if let ConfigValue::Json(value) = value {
                props.insert(key.clone(), value.clone());
            }
        }
        props
    }

    /// Deterministic cache fingerprint for `(name, configuration)`.
    ///
    /// Handler- and element-valued entries are replaced by opaque markers so
    /// live values never leak into a persisted key.
    pub fn fingerprint(&self, name: &str) -> String {
        let mut payload = JsonMap::new();
        for (key, value) in &self.entries {
            let serialized = match value {
                ConfigValue::Json(value) => value.clone(),
                ConfigValue::Handler(_) => json!("[handler]"),
                ConfigValue::Element(_) => json!("[element]"),
            };
            payload.insert(key.clone(), serialized);
        }
        format!("{name}:{}", Value::Object(payload))
    }
}

impl std::fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fingerprint_is_deterministic_and_ordered() {
        let first = WidgetConfig::new()
            .with_json("label", "Save")
            .with_json("disabled", false);
        let second = WidgetConfig::new()
            .with_json("disabled", false)
            .with_json("label", "Save");

        assert_eq!(first.fingerprint("Button"), second.fingerprint("Button"));
        assert_eq!(
            first.fingerprint("Button"),
            "Button:{\"disabled\":false,\"label\":\"Save\"}"
        );
    }

    #[test]
    fn live_values_become_opaque_markers() {
        let element = ElementHandle::create("div").expect("element");
        let handler: WidgetEventHandler = std::rc::Rc::new(|_event| {});
        let config = WidgetConfig::new()
            .with_json("label", "Go")
            .with_handler("onActivate", handler)
            .with_element("anchor", element);

        let fingerprint = config.fingerprint("Dialog");
        assert!(fingerprint.contains("\"onActivate\":\"[handler]\""));
        assert!(fingerprint.contains("\"anchor\":\"[element]\""));

        let props = config.json_props();
        assert_eq!(props.len(), 1);
        assert!(props.contains_key("label"));
    }
}
