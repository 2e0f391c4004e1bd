//! Per-widget shims over the adapter bridge.
//!
//! Each component is a one-line forward into [`WidgetBridge`] under a fixed
//! widget name; all mechanics (normalization, caching, lifecycle, events)
//! live in `widget_bridge`.

use leptos::*;
use widget_bridge::WidgetBridge;
use widget_contract::{WidgetConfig, WidgetEvent};

/// Vanilla `Button` widget.
#[component]
pub fn Button(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="Button".to_string() configuration=configuration on_event=on_event /> }
}

/// Primary-variant `Button`.
#[component]
pub fn PrimaryButton(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="ButtonPrimary".to_string() configuration=configuration on_event=on_event /> }
}

/// Secondary-variant `Button`.
#[component]
pub fn SecondaryButton(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="ButtonSecondary".to_string() configuration=configuration on_event=on_event /> }
}

/// Ghost-variant `Button`.
#[component]
pub fn GhostButton(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="ButtonGhost".to_string() configuration=configuration on_event=on_event /> }
}

/// Vanilla `Card` widget.
#[component]
pub fn Card(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="Card".to_string() configuration=configuration on_event=on_event /> }
}

/// Vanilla `Dialog` widget.
#[component]
pub fn Dialog(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="Dialog".to_string() configuration=configuration on_event=on_event /> }
}

/// Vanilla `Input` widget.
#[component]
pub fn Input(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="Input".to_string() configuration=configuration on_event=on_event /> }
}

/// Vanilla `Badge` widget.
#[component]
pub fn Badge(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="Badge".to_string() configuration=configuration on_event=on_event /> }
}

/// Vanilla `SearchPanel` organism.
#[component]
pub fn SearchPanel(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="SearchPanel".to_string() configuration=configuration on_event=on_event /> }
}

/// Vanilla `DataGrid` widget.
#[component]
pub fn DataGrid(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="DataGrid".to_string() configuration=configuration on_event=on_event /> }
}

/// Vanilla `Toolbar` widget.
#[component]
pub fn Toolbar(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="Toolbar".to_string() configuration=configuration on_event=on_event /> }
}

/// Vanilla `Tooltip` widget.
#[component]
pub fn Tooltip(
    #[prop(optional, into)] configuration: MaybeSignal<WidgetConfig>,
    #[prop(optional_no_strip)] on_event: Option<Callback<WidgetEvent>>,
) -> impl IntoView {
    view! { <WidgetBridge name="Tooltip".to_string() configuration=configuration on_event=on_event /> }
}
