//! Widget-name → creation-function directory.
//!
//! Names resolve through zero-argument resolvers so the underlying descriptor
//! is consulted at resolve time, after any external-module load has replaced
//! the stand-ins. Lookup failures log and resolve to `None`; the bridge
//! component treats `None` as "mount a fallback", never as an error path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use leptos::logging;

use crate::normalizer::{self, CreationFn};

/// Zero-argument resolver installed per widget name.
pub type ResolverFn = Rc<dyn Fn() -> Option<CreationFn>>;

#[derive(Default)]
struct RegistryState {
    order: Vec<String>,
    entries: HashMap<String, ResolverFn>,
}

thread_local! {
    static STATE: RefCell<RegistryState> = RefCell::new(RegistryState::default());
}

/// Installs `resolver` under `name`.
///
/// Re-registration replaces the resolver but keeps the original position in
/// the enumeration order.
pub fn register(name: &str, resolver: ResolverFn) {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        if !state.entries.contains_key(name) {
            state.order.push(name.to_string());
        }
        state.entries.insert(name.to_string(), resolver);
    });
}

/// Registers the default `create` resolver for a normalized factory.
pub fn register_create(name: &str) {
    let factory = name.to_string();
    register(
        name,
        Rc::new(move || {
            let descriptor = normalizer::descriptor(&factory)?;
            if !normalizer::is_valid(&descriptor) {
                logging::warn!("descriptor for `{factory}` failed validation");
                return None;
            }
            descriptor.select_method(None)
        }),
    );
}

/// Registers a method-variant alias resolving `method` off `factory`'s
/// descriptor (e.g. `ButtonPrimary` → `Button::createPrimary`).
pub fn register_variant(name: &str, factory: &str, method: &str) {
    let factory = factory.to_string();
    let method = method.to_string();
    register(
        name,
        Rc::new(move || {
            let descriptor = normalizer::descriptor(&factory)?;
            descriptor.select_method(Some(&method))
        }),
    );
}

/// Resolves a registered widget name to a creation function.
pub fn resolve(name: &str) -> Option<CreationFn> {
    normalizer::ensure_initialized();
    let resolver = STATE.with(|state| state.borrow().entries.get(name).cloned());
    let Some(resolver) = resolver else {
        logging::warn!("widget `{name}` is not registered");
        return None;
    };
    let resolved = resolver();
    if resolved.is_none() {
        logging::warn!("widget `{name}` did not resolve a creation method");
    }
    resolved
}

/// Returns whether `name` is registered.
pub fn has(name: &str) -> bool {
    normalizer::ensure_initialized();
    STATE.with(|state| state.borrow().entries.contains_key(name))
}

/// Registered names in stable registration order (UI enumeration,
/// fallback-element diagnostics).
pub fn list() -> Vec<String> {
    normalizer::ensure_initialized();
    STATE.with(|state| state.borrow().order.clone())
}

/// Clears every registration (test isolation).
pub fn reset() {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.order.clear();
        state.entries.clear();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use platform_dom::{RawCallable, RawFactory, RawValue};
    use pretty_assertions::assert_eq;

    #[test]
    fn standin_catalog_registers_on_first_use() {
        crate::reset();
        assert!(has("Button"));
        assert!(has("ButtonPrimary"));
        let create = resolve("Button").expect("stand-in resolves");
        let value = block_on(create(&crate::WidgetConfig::new())).expect("creates");
        assert!(matches!(value, RawValue::Element(_)));
        crate::reset();
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        crate::reset();
        assert!(resolve("NoSuchWidget").is_none());
        assert!(!has("NoSuchWidget"));
        crate::reset();
    }

    #[test]
    fn list_keeps_registration_order() {
        crate::reset();
        let baseline = list();
        register("Zeta", Rc::new(|| None));
        register("Alpha", Rc::new(|| None));
        let listed = list();
        assert_eq!(listed.len(), baseline.len() + 2);
        let zeta = listed.iter().position(|name| name == "Zeta").unwrap();
        let alpha = listed.iter().position(|name| name == "Alpha").unwrap();
        assert!(zeta < alpha);

        // Re-registration keeps the original position.
        register("Zeta", Rc::new(|| None));
        assert_eq!(list().len(), baseline.len() + 2);
        crate::reset();
    }

    #[test]
    fn variant_alias_fails_closed_when_method_is_missing() {
        crate::reset();
        let raw = RawFactory::Callable(RawCallable::from_fn(|_| Ok(RawValue::Nothing)));
        let descriptor = crate::normalizer::normalize(raw, "Plain").expect("normalizes");
        crate::normalizer::install(descriptor);
        register_create("Plain");
        register_variant("PlainFancy", "Plain", "createFancy");

        assert!(resolve("Plain").is_some());
        assert!(resolve("PlainFancy").is_none());
        crate::reset();
    }
}
