//! Platform boundary for the vanilla-widget bridge.
//!
//! This crate isolates everything that touches the browser: the opaque
//! renderable-element handle, the markup sanitizer, the environment probe, and
//! the raw-factory interop primitives used to call into the external widget
//! module. On wasm32 the implementations are backed by `web-sys`/`js-sys`; on
//! every other target an in-memory shim with identical signatures keeps the
//! bridge logic exercisable in native tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod element;
pub mod environment;
pub mod interop;
pub mod loader;
pub mod sanitize;

pub use element::{DestroyHook, DomError, DomEvent, ElementHandle, ListenerHandle};
pub use environment::{is_browser_environment, unix_time_ms_now};
pub use interop::{JsonMap, RawCallable, RawConstructor, RawFactory, RawInstance, RawObject, RawValue};
pub use loader::{load_external_module, DiscoveredFactory};
pub use sanitize::{sanitize, strip_tags, SanitizeLevel};
