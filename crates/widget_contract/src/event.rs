//! Structured event envelope forwarded from mounted widgets to callers.

use std::rc::Rc;

use platform_dom::{unix_time_ms_now, DomEvent};
use serde_json::Value;

/// Interaction event types the bridge listens for on every mounted element.
pub const INTERACTION_EVENT_KINDS: [&str; 6] =
    ["click", "input", "change", "submit", "keydown", "pointerdown"];

/// Caller-supplied handler invoked for every forwarded widget event.
pub type WidgetEventHandler = Rc<dyn Fn(WidgetEvent)>;

/// One forwarded interaction event.
#[derive(Clone)]
pub struct WidgetEvent {
    /// Event type token (`click`, `input`, ...).
    pub kind: String,
    /// Logical name of the widget that produced the event.
    pub source_widget: String,
    /// Unix timestamp in milliseconds at forward time.
    pub timestamp_unix_ms: u64,
    /// The originating element event.
    pub original: DomEvent,
}

impl WidgetEvent {
    /// Builds an envelope around `original`, stamping the current time.
    pub fn new(source_widget: impl Into<String>, original: DomEvent) -> Self {
        Self {
            kind: original.kind(),
            source_widget: source_widget.into(),
            timestamp_unix_ms: unix_time_ms_now(),
            original,
        }
    }

    /// Returns the original event's JSON detail payload when one is known.
    pub fn detail(&self) -> Value {
        self.original.detail()
    }
}

impl std::fmt::Debug for WidgetEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetEvent")
            .field("kind", &self.kind)
            .field("source_widget", &self.source_widget)
            .field("timestamp_unix_ms", &self.timestamp_unix_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn envelope_copies_kind_and_stamps_time() {
        let event = WidgetEvent::new(
            "Button",
            DomEvent::synthetic("click", Value::Null),
        );
        assert_eq!(event.kind, "click");
        assert_eq!(event.source_widget, "Button");
        assert!(event.timestamp_unix_ms > 0);
    }
}
