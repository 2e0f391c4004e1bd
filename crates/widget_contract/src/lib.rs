//! Shared contract types between the adapter bridge and the widget shims.
//!
//! Everything here is transport: widget configuration and its cache
//! fingerprint rules, the structured event envelope forwarded to callers,
//! bridge settings, and the bridge error taxonomy. The bridge mechanics live
//! in `widget_bridge`; the platform boundary lives in `platform_dom`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod event;
pub mod settings;

pub use config::{ConfigValue, WidgetConfig};
pub use error::BridgeError;
pub use event::{WidgetEvent, WidgetEventHandler, INTERACTION_EVENT_KINDS};
pub use settings::{BridgeSettings, DEFAULT_MODULE_GLOBAL, DEFAULT_MODULE_SPECIFIER};
