//! Adapter bridge between an external vanilla widget library and a Leptos
//! host tree.
//!
//! The bridge normalizes heterogeneous external factory shapes into one
//! creation contract ([`normalizer`]), resolves stable widget names to
//! creation functions ([`registry`]), owns mounted-element lifetimes with
//! cancellation-safe cleanup ([`controller`], [`component`]), and memoizes
//! creation results behind a clone-on-read template cache ([`optimizer`]).
//! Every failure mode degrades to a visible, logged fallback element; nothing
//! above the attach point ever observes a panic.

pub mod component;
pub mod controller;
pub mod manifest;
pub mod normalizer;
pub mod optimizer;
pub mod registry;
pub mod standins;

pub use component::WidgetBridge;
pub use controller::{BridgeController, CycleToken, MountState};
pub use normalizer::{
    coerce_raw_value, CreationFn, FactoryDescriptor, FactoryShape, MockEmitter, MockSetter,
};
pub use optimizer::CreationMetrics;
pub use widget_contract::{
    BridgeError, BridgeSettings, WidgetConfig, WidgetEvent, WidgetEventHandler,
};

/// Clears every process-wide table: descriptors, registry, cache, metrics.
///
/// Test-isolation hook; production code never calls it.
pub fn reset() {
    normalizer::reset();
    registry::reset();
    optimizer::reset();
}
