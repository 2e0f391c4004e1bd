//! Per-container mount lifecycle.
//!
//! A [`BridgeController`] is the only place a resolved creation function is
//! invoked and the only owner of a mounted element's lifetime. Each attach
//! cycle carries one [`CycleToken`]; reconfiguration and unmount cancel the
//! previous cycle before anything new starts, and every asynchronous step
//! re-checks the token before touching the container, so a slow, stale
//! creation can never mount over a newer configuration. Cleanup is a single
//! idempotent routine shared by every exit path and it never panics.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use leptos::logging;
use platform_dom::{DestroyHook, ElementHandle, ListenerHandle};
use widget_contract::{
    BridgeError, BridgeSettings, WidgetConfig, WidgetEvent, WidgetEventHandler,
    INTERACTION_EVENT_KINDS,
};

use crate::normalizer::{self, coerce_raw_value};
use crate::{optimizer, registry};

/// Lifecycle state of one container instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// Attached, nothing mounted yet.
    Idle,
    /// A creation cycle is in flight.
    Creating,
    /// An element (real or fallback) is mounted.
    Mounted,
    /// Tearing down before re-creating with new inputs.
    Reconfiguring,
    /// Terminal; a fresh controller is created for the next attach.
    Unmounted,
}

/// Cancellation token scoped to one attach cycle.
#[derive(Clone, Default)]
pub struct CycleToken {
    cancelled: Rc<Cell<bool>>,
}

impl CycleToken {
    /// Fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation; idempotent.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Returns whether this cycle has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct MountRecord {
    element: ElementHandle,
    listeners: Vec<ListenerHandle>,
    destroy: Option<DestroyHook>,
    widget: String,
}

/// Owns mount/cleanup for one container element.
pub struct BridgeController {
    container: ElementHandle,
    settings: BridgeSettings,
    state: Cell<MountState>,
    record: RefCell<Option<MountRecord>>,
    cycle: RefCell<CycleToken>,
}

impl BridgeController {
    /// Creates a controller owning `container`.
    pub fn new(container: ElementHandle, settings: BridgeSettings) -> Self {
        Self {
            container,
            settings,
            state: Cell::new(MountState::Idle),
            record: RefCell::new(None),
            cycle: RefCell::new(CycleToken::new()),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MountState {
        self.state.get()
    }

    /// Cancels the previous cycle, runs cleanup synchronously, and hands out
    /// the token for the next cycle.
    ///
    /// On an unmounted controller the returned token is already cancelled, so
    /// the caller's `run_cycle` becomes a no-op.
    pub fn begin_cycle(&self) -> CycleToken {
        if self.state.get() == MountState::Unmounted {
            let token = CycleToken::new();
            token.cancel();
            return token;
        }
        if self.state.get() == MountState::Mounted {
            self.state.set(MountState::Reconfiguring);
        }
        self.cleanup();
        let token = CycleToken::new();
        *self.cycle.borrow_mut() = token.clone();
        self.state.set(MountState::Creating);
        token
    }

    /// Resolves, creates, and mounts for `(name, configuration)`.
    ///
    /// Never returns an error; every failure mode mounts a visible fallback
    /// and logs. All externally visible steps are gated on `token`.
    pub async fn run_cycle(
        &self,
        token: CycleToken,
        name: String,
        config: WidgetConfig,
        handler: Option<WidgetEventHandler>,
    ) {
        normalizer::ensure_loaded(&self.settings).await;
        if token.is_cancelled() {
            return;
        }

        let Some(create_fn) = registry::resolve(&name) else {
            let reason = "widget is not registered".to_string();
            logging::warn!(
                "{}",
                BridgeError::Resolution {
                    name: name.clone(),
                    reason: reason.clone(),
                }
            );
            self.mount_fallback(&token, &name, &reason);
            return;
        };

        let level = self.settings.markup_level;
        let config_for_create = config.clone();
        let create = move || {
            let pending = create_fn(&config_for_create);
            async move { coerce_raw_value(pending.await?, level).await }.boxed_local()
        };

        let created = if self.settings.cache_enabled {
            optimizer::get_or_create(&name, &config, self.settings.cache_capacity, create).await
        } else {
            create().await
        };
        if token.is_cancelled() {
            return;
        }

        match created {
            Ok(element) => self.mount(&token, element, &name, handler),
            Err(reason) => {
                logging::error!(
                    "{} (registered: {})",
                    BridgeError::Creation {
                        name: name.clone(),
                        reason: reason.clone(),
                    },
                    registry::list().join(", ")
                );
                self.mount_fallback(&token, &name, &reason);
            }
        }
    }

    /// Idempotent teardown shared by every exit path; never panics.
    ///
    /// Cancels the current cycle, runs the element-supplied destroy hook
    /// (logging its failure without blocking the remaining steps), removes
    /// every tracked listener, and empties the container.
    pub fn cleanup(&self) {
        self.cycle.borrow().cancel();
        let record = self.record.borrow_mut().take();
        if let Some(record) = record {
            if let Some(destroy) = &record.destroy {
                if let Err(reason) = destroy.run() {
                    logging::error!(
                        "{}",
                        BridgeError::Cleanup {
                            name: record.widget.clone(),
                            reason,
                        }
                    );
                }
            }
            for listener in &record.listeners {
                record.element.remove_listener(listener);
            }
        }
        self.container.clear_children();
        if self.state.get() != MountState::Unmounted {
            self.state.set(MountState::Idle);
        }
    }

    /// Cancels and cleans up, then makes this controller terminal.
    pub fn unmount(&self) {
        self.cleanup();
        self.state.set(MountState::Unmounted);
    }

    fn mount(
        &self,
        token: &CycleToken,
        element: ElementHandle,
        name: &str,
        handler: Option<WidgetEventHandler>,
    ) {
        if token.is_cancelled() {
            return;
        }

        // External factories sometimes return already-parented nodes.
        element.detach();

        if let Err(err) = self.container.append_child(&element) {
            logging::error!(
                "{}",
                BridgeError::Mount {
                    name: name.to_string(),
                    reason: err.to_string(),
                }
            );
            let Ok(minimal) = ElementHandle::create("div") else {
                return;
            };
            minimal.add_class("vk-widget");
            minimal.add_class("vk-error");
            minimal.set_text(&format!("widget \"{name}\" failed to mount"));
            if self.container.append_child(&minimal).is_err() {
                return;
            }
            self.record.replace(Some(MountRecord {
                element: minimal,
                listeners: Vec::new(),
                destroy: None,
                widget: name.to_string(),
            }));
            self.state.set(MountState::Mounted);
            return;
        }

        let mut listeners = Vec::new();
        if let Some(handler) = handler {
            for kind in INTERACTION_EVENT_KINDS {
                let handler = handler.clone();
                let token = token.clone();
                let widget = name.to_string();
                match element.add_listener(
                    kind,
                    Rc::new(move |event| {
                        if token.is_cancelled() {
                            return;
                        }
                        handler(WidgetEvent::new(widget.clone(), event));
                    }),
                ) {
                    Ok(listener) => listeners.push(listener),
                    Err(err) => {
                        logging::warn!("listener `{kind}` failed to attach on `{name}`: {err}")
                    }
                }
            }
        }

        let destroy = element.destroy_hook();
        self.record.replace(Some(MountRecord {
            element,
            listeners,
            destroy,
            widget: name.to_string(),
        }));
        self.state.set(MountState::Mounted);
    }

    fn mount_fallback(&self, token: &CycleToken, name: &str, reason: &str) {
        let available = registry::list().join(", ");
        let Ok(element) = ElementHandle::create("div") else {
            return;
        };
        element.add_class("vk-widget");
        element.add_class("vk-fallback");
        let _ = element.set_attribute("data-widget", name);
        element.set_text(&format!(
            "widget \"{name}\" unavailable: {reason} (registered: {available})"
        ));
        self.mount(token, element, name, None);
    }
}
