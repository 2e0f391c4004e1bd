//! Built-in stand-in factories.
//!
//! Installed before any external-module load so every registered widget name
//! resolves to something renderable even when the vanilla library is missing,
//! slow, or broken. Stand-ins are plain callables pushed through the same
//! normalize/enhance pipeline as real external factories.

use platform_dom::{ElementHandle, JsonMap, RawCallable, RawFactory, RawValue};
use serde_json::Value;

use crate::{normalizer, registry};

/// Default widget catalog shipped as stand-ins.
pub const STANDIN_CATALOG: [&str; 9] = [
    "Badge",
    "Button",
    "Card",
    "DataGrid",
    "Dialog",
    "Input",
    "SearchPanel",
    "Toolbar",
    "Tooltip",
];

/// Method-variant families registered alongside the base widgets.
const VARIANT_FAMILIES: [(&str, &str, &str); 3] = [
    ("ButtonPrimary", "Button", "createPrimary"),
    ("ButtonSecondary", "Button", "createSecondary"),
    ("ButtonGhost", "Button", "createGhost"),
];

pub(crate) fn install_all() {
    for name in STANDIN_CATALOG {
        let raw = RawFactory::Callable(standin_callable(name));
        if let Some(descriptor) = normalizer::normalize(raw, name) {
            normalizer::install(normalizer::enhance(descriptor));
            registry::register_create(name);
        }
    }
    for (alias, factory, method) in VARIANT_FAMILIES {
        registry::register_variant(alias, factory, method);
    }
}

fn standin_callable(name: &'static str) -> RawCallable {
    RawCallable::from_fn(move |props| {
        build_standin_element(name, props).map(RawValue::Element)
    })
}

fn build_standin_element(name: &str, props: &JsonMap) -> Result<ElementHandle, String> {
    let tag = match name {
        "Button" => "button",
        "Input" => "input",
        _ => "div",
    };
    let el = ElementHandle::create(tag).map_err(|err| err.to_string())?;
    el.add_class("vk-widget");
    el.add_class(&format!("vk-{}", name.to_ascii_lowercase()));
    el.add_class("vk-standin");
    el.set_attribute("data-widget", name)
        .map_err(|err| err.to_string())?;

    if let Some(variant) = props.get("variant").and_then(Value::as_str) {
        el.set_attribute("data-variant", variant)
            .map_err(|err| err.to_string())?;
    }
    if name == "Dialog" {
        el.set_attribute("role", "dialog")
            .map_err(|err| err.to_string())?;
    }

    let label = props
        .get("label")
        .or_else(|| props.get("text"))
        .and_then(Value::as_str)
        .unwrap_or(name);
    if tag == "input" {
        el.set_attribute("placeholder", label)
            .map_err(|err| err.to_string())?;
    } else {
        el.set_text(label);
    }
    Ok(el)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use widget_contract::WidgetConfig;

    #[test]
    fn every_catalog_entry_resolves_and_creates() {
        crate::reset();
        for name in STANDIN_CATALOG {
            let create = registry::resolve(name).unwrap_or_else(|| panic!("{name} resolves"));
            let value = block_on(create(&WidgetConfig::new())).expect("creates");
            match value {
                RawValue::Element(el) => {
                    assert_eq!(el.attribute("data-widget").as_deref(), Some(name));
                }
                _ => panic!("stand-in `{name}` must yield an element"),
            }
        }
        crate::reset();
    }

    #[test]
    fn button_variant_aliases_resolve_with_variant_attribute() {
        crate::reset();
        let create = registry::resolve("ButtonGhost").expect("alias resolves");
        let value = block_on(create(&WidgetConfig::new())).expect("creates");
        match value {
            RawValue::Element(el) => {
                assert_eq!(el.attribute("data-variant").as_deref(), Some("ghost"));
                assert_eq!(el.tag(), "button");
            }
            _ => panic!("variant must yield an element"),
        }
        crate::reset();
    }

    #[test]
    fn standin_labels_come_from_config() {
        crate::reset();
        let create = registry::resolve("Card").expect("resolves");
        let config = WidgetConfig::new().with_json("label", "Quarterly numbers");
        let value = block_on(create(&config)).expect("creates");
        match value {
            RawValue::Element(el) => assert_eq!(el.text(), "Quarterly numbers"),
            _ => panic!("stand-in must yield an element"),
        }
        crate::reset();
    }
}
