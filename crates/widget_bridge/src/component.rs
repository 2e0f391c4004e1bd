//! Leptos attach point for bridged widgets.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::*;
use widget_contract::{BridgeSettings, WidgetConfig, WidgetEvent};

use crate::controller::BridgeController;

/// Mounts an external vanilla widget inside the host tree.
///
/// Resolution, creation, mounting, event forwarding, and teardown all run
/// through a per-instance [`BridgeController`]; no failure below this point
/// ever interrupts the owning tree. Reconfiguration (any change to `name` or
/// `configuration`) always tears the previous mount down fully before
/// re-creating — the wrapped factories have no update protocol.
#[component]
pub fn WidgetBridge(
    /// Logical widget name resolved through the registry.
    #[prop(into)]
    name: MaybeSignal<String>,
    /// Configuration forwarded to the widget factory.
    #[prop(optional, into)]
    configuration: MaybeSignal<WidgetConfig>,
    /// Caller handler for forwarded interaction events.
    #[prop(optional_no_strip)]
    on_event: Option<Callback<WidgetEvent>>,
    /// Bridge tuning overrides.
    #[prop(optional)]
    settings: Option<BridgeSettings>,
) -> impl IntoView {
    let settings = settings.unwrap_or_default();
    let container_ref = create_node_ref::<html::Div>();
    let controller: Rc<RefCell<Option<Rc<BridgeController>>>> = Rc::new(RefCell::new(None));

    {
        let controller = controller.clone();
        create_effect(move |_| {
            let widget = name.get();
            let config = configuration.get();
            let Some(node) = container_ref.get() else {
                return;
            };

            #[cfg(target_arch = "wasm32")]
            {
                use platform_dom::ElementHandle;
                use widget_contract::WidgetEventHandler;

                let handle = {
                    let mut slot = controller.borrow_mut();
                    slot.get_or_insert_with(|| {
                        let raw: &web_sys::HtmlElement = &node;
                        let element: web_sys::Element = raw.clone().into();
                        Rc::new(BridgeController::new(
                            ElementHandle::from_web(element),
                            settings.clone(),
                        ))
                    })
                    .clone()
                };
                let handler = on_event.map(|callback| {
                    let forward: WidgetEventHandler = Rc::new(move |event| callback.call(event));
                    forward
                });
                let token = handle.begin_cycle();
                spawn_local(async move {
                    handle.run_cycle(token, widget, config, handler).await;
                });
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                // Outside a browser there is no live container to own; the
                // controller path is exercised directly in native tests.
                let _ = (&controller, &settings, &on_event, widget, config, node);
            }
        });
    }

    on_cleanup(move || {
        if let Some(controller) = controller.borrow().as_ref() {
            controller.unmount();
        }
    });

    view! { <div class="widget-bridge-host" node_ref=container_ref></div> }
}
