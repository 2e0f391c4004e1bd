//! Factory normalization: one creation contract over heterogeneous shapes.
//!
//! The external widget module hands back factories as plain functions, class
//! constructors, objects with arbitrary creation-method names, or bare config
//! bags. Everything that leaves this module satisfies the same contract: a
//! [`FactoryDescriptor`] whose `create` yields a renderable element and whose
//! failure modes degrade to placeholders instead of propagating. The
//! descriptor table is process-wide, lazily seeded with built-in stand-ins,
//! and refreshed once by a single-flight external-module load.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;
use leptos::logging;
use platform_dom::{
    load_external_module, ElementHandle, JsonMap, RawConstructor, RawFactory, RawObject, RawValue,
    SanitizeLevel,
};
use serde_json::Value;
use widget_contract::{BridgeSettings, WidgetConfig};

use crate::manifest::{self, ExpectedCapability};
use crate::{registry, standins};

/// Creation callable resolved through the registry.
///
/// Descriptor-owned wrappers never return `Err`; raw method variants selected
/// off an instance may, and the bridge component defends against both.
pub type CreationFn =
    Rc<dyn Fn(&WidgetConfig) -> LocalBoxFuture<'static, Result<RawValue, String>>>;

/// Creation-method names recognized on object-shaped factories, most
/// preferred first.
pub const CREATION_METHOD_NAMES: [&str; 5] = ["create", "render", "build", "generate", "make"];

/// Shape a factory arrived in; recorded for method-variant selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryShape {
    /// Object exposing a creation method (possibly under an alternate name).
    CreateObject,
    /// Class-like constructor instantiated per creation call.
    Constructor,
    /// Plain callable.
    Function,
    /// Declarative config bag with no creation method.
    ConfigBag,
}

/// Minimal `on`/`off`/`emit` surface synthesized for widget families whose
/// callers expect a nested emitter the raw factory may not provide.
#[derive(Clone, Default)]
pub struct MockEmitter {
    subscribers: Rc<RefCell<HashMap<String, Vec<(u64, Rc<dyn Fn(&Value)>)>>>>,
    next_id: Rc<Cell<u64>>,
}

impl MockEmitter {
    /// Subscribes `callback` to `topic`; returns a subscription id for `off`.
    pub fn on(&self, topic: &str, callback: Rc<dyn Fn(&Value)>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers
            .borrow_mut()
            .entry(topic.to_string())
            .or_default()
            .push((id, callback));
        id
    }

    /// Removes one subscription by id.
    pub fn off(&self, topic: &str, id: u64) {
        let mut subscribers = self.subscribers.borrow_mut();
        if let Some(entries) = subscribers.get_mut(topic) {
            entries.retain(|(entry_id, _)| *entry_id != id);
            if entries.is_empty() {
                subscribers.remove(topic);
            }
        }
    }

    /// Delivers `payload` to every `topic` subscriber.
    pub fn emit(&self, topic: &str, payload: &Value) {
        let callbacks: Vec<Rc<dyn Fn(&Value)>> = self
            .subscribers
            .borrow()
            .get(topic)
            .map(|entries| entries.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(payload);
        }
    }

    /// Number of live subscriptions for `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .borrow()
            .get(topic)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// Chainable setter mock synthesized for callers that pipe data into a
/// factory method the raw module does not provide.
#[derive(Clone, Default)]
pub struct MockSetter {
    values: Rc<RefCell<Vec<Value>>>,
}

impl MockSetter {
    /// Records `value`; returns `self` so calls chain.
    pub fn call(&self, value: Value) -> &Self {
        self.values.borrow_mut().push(value);
        self
    }

    /// Returns the most recently recorded value.
    pub fn last(&self) -> Option<Value> {
        self.values.borrow().last().cloned()
    }
}

/// The normalized view of one external factory.
#[derive(Clone)]
pub struct FactoryDescriptor {
    name: String,
    create: CreationFn,
    shape: FactoryShape,
    object: Option<RawObject>,
    constructor: Option<RawConstructor>,
    variants: HashMap<String, CreationFn>,
    setters: HashMap<String, MockSetter>,
    emitter: Option<MockEmitter>,
}

impl FactoryDescriptor {
    /// Stable factory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape the raw factory arrived in.
    pub fn shape(&self) -> FactoryShape {
        self.shape
    }

    /// The mandatory creation capability.
    pub fn create_fn(&self) -> CreationFn {
        self.create.clone()
    }

    /// Synthesized event emitter, when the capability manifest declared one.
    pub fn emitter(&self) -> Option<MockEmitter> {
        self.emitter.clone()
    }

    /// Synthesized chainable setter registered under `name`.
    pub fn setter(&self, name: &str) -> Option<MockSetter> {
        self.setters.get(name).cloned()
    }

    /// Selects a creation method off this descriptor.
    ///
    /// Requested-and-present wins; requested-and-absent logs and fails closed;
    /// no request resolves to `create`. Constructor-shaped factories
    /// instantiate first and select the method off the fresh instance.
    pub fn select_method(&self, requested: Option<&str>) -> Option<CreationFn> {
        let Some(method) = requested else {
            return Some(self.create.clone());
        };
        if method == "create" {
            return Some(self.create.clone());
        }
        if let Some(object) = &self.object {
            if let Some(callable) = object.method(method) {
                return Some(wrap_callable(callable));
            }
        }
        if let Some(constructor) = &self.constructor {
            match constructor.construct() {
                Ok(instance) => {
                    if let Some(callable) = instance.method(method) {
                        return Some(wrap_callable(callable));
                    }
                }
                Err(err) => logging::warn!(
                    "factory `{}` failed to instantiate while selecting `{method}`: {err}",
                    self.name
                ),
            }
        }
        if let Some(variant) = self.variants.get(method) {
            return Some(variant.clone());
        }
        logging::warn!("factory `{}` has no creation method `{method}`", self.name);
        None
    }
}

impl std::fmt::Debug for FactoryDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryDescriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("variants", &self.variants.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn wrap_callable(callable: platform_dom::RawCallable) -> CreationFn {
    Rc::new(move |config: &WidgetConfig| callable.invoke(&config.json_props()))
}

/// Synthesizes the visible placeholder used whenever real creation is not
/// possible; fails only when no document exists at all.
pub fn placeholder_element(name: &str, note: Option<&str>) -> Result<ElementHandle, String> {
    let el = ElementHandle::create("div").map_err(|err| err.to_string())?;
    el.add_class("vk-widget");
    el.add_class("vk-standin");
    el.set_attribute("data-widget", name)
        .map_err(|err| err.to_string())?;
    match note {
        Some(note) => el.set_text(&format!("{name} ({note})")),
        None => el.set_text(name),
    }
    Ok(el)
}

fn markup_element(markup: &str, level: SanitizeLevel) -> Result<ElementHandle, String> {
    let el = ElementHandle::create("div").map_err(|err| err.to_string())?;
    el.add_class("vk-widget");
    el.add_class("vk-markup");
    el.set_sanitized_markup(markup, level);
    Ok(el)
}

/// Coerces a classified factory return into a real element.
///
/// Accepts elements directly, unwraps `{ element }` wrappers, sanitizes and
/// wraps markup strings, and follows a `render`-object one level deep.
pub fn coerce_raw_value(
    value: RawValue,
    level: SanitizeLevel,
) -> LocalBoxFuture<'static, Result<ElementHandle, String>> {
    async move {
        match value {
            RawValue::Element(el) | RawValue::ElementWrapper(el) => Ok(el),
            RawValue::Markup(markup) => markup_element(&markup, level),
            RawValue::Renderable(render) => match render.invoke(&JsonMap::new()).await? {
                RawValue::Element(el) | RawValue::ElementWrapper(el) => Ok(el),
                RawValue::Markup(markup) => markup_element(&markup, level),
                _ => Err("render() returned nothing renderable".to_string()),
            },
            RawValue::Nothing => Err("factory returned nothing".to_string()),
            RawValue::Unusable(detail) => {
                Err(format!("factory returned an unusable value: {detail}"))
            }
        }
    }
    .boxed_local()
}

/// Normalizes a raw factory into the uniform creation contract.
///
/// Returns `None` only for shapes nothing can be made of (an empty object
/// with neither methods nor config keys); the caller substitutes a stand-in.
pub fn normalize(raw: RawFactory, name: &str) -> Option<FactoryDescriptor> {
    match raw {
        RawFactory::Object(object) => normalize_object(object, name),
        RawFactory::Constructor(constructor) => Some(normalize_constructor(constructor, name)),
        RawFactory::Callable(callable) => Some(normalize_callable(callable, name)),
    }
}

fn empty_descriptor(name: &str, create: CreationFn, shape: FactoryShape) -> FactoryDescriptor {
    FactoryDescriptor {
        name: name.to_string(),
        create,
        shape,
        object: None,
        constructor: None,
        variants: HashMap::new(),
        setters: HashMap::new(),
        emitter: None,
    }
}

fn normalize_object(object: RawObject, name: &str) -> Option<FactoryDescriptor> {
    for method in CREATION_METHOD_NAMES {
        if let Some(callable) = object.method(method) {
            let mut descriptor = empty_descriptor(
                name,
                wrap_callable(callable),
                FactoryShape::CreateObject,
            );
            descriptor.object = Some(object);
            return Some(descriptor);
        }
    }

    // No creation method at all: treat the object as a declarative config
    // bag, unless it is completely empty (nothing to reflect, not a factory).
    let bag = object.json_snapshot();
    if bag.is_empty() && object.keys().is_empty() {
        return None;
    }
    let mut keys: Vec<String> = bag.keys().cloned().collect();
    if keys.is_empty() {
        keys = object.keys();
    }
    let summary = keys.join(", ");
    let widget = name.to_string();
    let create: CreationFn = Rc::new(move |_config| {
        let widget = widget.clone();
        let summary = summary.clone();
        async move {
            let el = placeholder_element(&widget, Some(&summary))?;
            Ok(RawValue::Element(el))
        }
        .boxed_local()
    });
    let mut descriptor = empty_descriptor(name, create, FactoryShape::ConfigBag);
    descriptor.object = Some(object);
    Some(descriptor)
}

fn normalize_constructor(constructor: RawConstructor, name: &str) -> FactoryDescriptor {
    let widget = name.to_string();
    let ctor = constructor.clone();
    let create: CreationFn = Rc::new(move |config| {
        let constructor = ctor.clone();
        let widget = widget.clone();
        let props = config.json_props();
        async move {
            let instance = match constructor.construct() {
                Ok(instance) => instance,
                Err(err) => {
                    logging::warn!("factory `{widget}` constructor raised: {err}");
                    return Ok(RawValue::Element(placeholder_element(
                        &widget,
                        Some("constructor error"),
                    )?));
                }
            };

            // Preference order: render(), `element` field, initialize(), placeholder.
            if let Some(render) = instance.method("render") {
                if let Ok(value) = render.invoke(&props).await {
                    if let Ok(el) = coerce_raw_value(value, SanitizeLevel::Strict).await {
                        return Ok(RawValue::Element(el));
                    }
                }
            }
            if let Some(el) = instance.element_field() {
                return Ok(RawValue::Element(el));
            }
            if let Some(initialize) = instance.method("initialize") {
                if let Ok(value) = initialize.invoke(&props).await {
                    if let Ok(el) = coerce_raw_value(value, SanitizeLevel::Strict).await {
                        return Ok(RawValue::Element(el));
                    }
                }
            }
            Ok(RawValue::Element(placeholder_element(&widget, None)?))
        }
        .boxed_local()
    });
    let mut descriptor = empty_descriptor(name, create, FactoryShape::Constructor);
    descriptor.constructor = Some(constructor);
    descriptor
}

fn normalize_callable(callable: platform_dom::RawCallable, name: &str) -> FactoryDescriptor {
    let widget = name.to_string();
    let create: CreationFn = Rc::new(move |config| {
        let callable = callable.clone();
        let widget = widget.clone();
        let props = config.json_props();
        async move {
            let value = match callable.invoke(&props).await {
                Ok(value) => value,
                Err(err) => {
                    logging::warn!("factory `{widget}` raised during create: {err}");
                    return Ok(RawValue::Element(placeholder_element(
                        &widget,
                        Some("factory error"),
                    )?));
                }
            };
            match coerce_raw_value(value, SanitizeLevel::Strict).await {
                Ok(el) => Ok(RawValue::Element(el)),
                Err(err) => {
                    logging::warn!("factory `{widget}` returned nothing usable: {err}");
                    Ok(RawValue::Element(placeholder_element(
                        &widget,
                        Some("placeholder"),
                    )?))
                }
            }
        }
        .boxed_local()
    });
    empty_descriptor(name, create, FactoryShape::Function)
}

/// Enhancement pass: synthesizes the capabilities the manifest declares for
/// this widget and the raw factory lacks. Always additive, always succeeds.
pub fn enhance(mut descriptor: FactoryDescriptor) -> FactoryDescriptor {
    for capability in manifest::required_capabilities(&descriptor.name) {
        match capability {
            ExpectedCapability::Emitter => {
                if descriptor.emitter.is_none() {
                    descriptor.emitter = Some(MockEmitter::default());
                }
            }
            ExpectedCapability::ChainableSetter(method) => {
                let raw_has = descriptor
                    .object
                    .as_ref()
                    .and_then(|object| object.method(method))
                    .is_some();
                if !raw_has && !descriptor.setters.contains_key(*method) {
                    descriptor
                        .setters
                        .insert(method.to_string(), MockSetter::default());
                }
            }
            ExpectedCapability::VariantCreator(method) => {
                let raw_has = descriptor
                    .object
                    .as_ref()
                    .and_then(|object| object.method(method))
                    .is_some();
                if !raw_has && !descriptor.variants.contains_key(*method) {
                    let variant = variant_token(method);
                    let base = descriptor.create.clone();
                    descriptor.variants.insert(
                        method.to_string(),
                        Rc::new(move |config: &WidgetConfig| {
                            let config = config.clone().with_json("variant", variant.clone());
                            base(&config)
                        }),
                    );
                }
            }
        }
    }
    descriptor
}

fn variant_token(method: &str) -> String {
    let token = method.strip_prefix("create").unwrap_or(method);
    if token.is_empty() {
        method.to_ascii_lowercase()
    } else {
        token.to_ascii_lowercase()
    }
}

/// Descriptor validity check used by the registry before trusting a lookup.
///
/// The creation capability is guaranteed by construction in this rendition;
/// validity reduces to the presence of a stable key.
pub fn is_valid(descriptor: &FactoryDescriptor) -> bool {
    !descriptor.name.is_empty()
}

enum LoadPhase {
    NotStarted,
    InFlight(Shared<LocalBoxFuture<'static, ()>>),
    Complete,
}

struct NormalizerState {
    descriptors: HashMap<String, Rc<FactoryDescriptor>>,
    load: LoadPhase,
}

thread_local! {
    static STATE: RefCell<NormalizerState> = RefCell::new(NormalizerState {
        descriptors: HashMap::new(),
        load: LoadPhase::NotStarted,
    });
    static INITIALIZED: Cell<bool> = const { Cell::new(false) };
}

/// Seeds the stand-in catalog exactly once per process.
pub(crate) fn ensure_initialized() {
    if INITIALIZED.with(Cell::get) {
        return;
    }
    INITIALIZED.with(|flag| flag.set(true));
    standins::install_all();
}

/// Installs (or replaces) a descriptor in the process-wide table.
pub fn install(descriptor: FactoryDescriptor) {
    ensure_initialized();
    STATE.with(|state| {
        state
            .borrow_mut()
            .descriptors
            .insert(descriptor.name.clone(), Rc::new(descriptor));
    });
}

/// Looks up the normalized descriptor for `name`.
pub fn descriptor(name: &str) -> Option<Rc<FactoryDescriptor>> {
    ensure_initialized();
    STATE.with(|state| state.borrow().descriptors.get(name).cloned())
}

/// Sorted names of all installed descriptors (diagnostics).
pub fn installed_names() -> Vec<String> {
    ensure_initialized();
    STATE.with(|state| {
        let mut names: Vec<String> = state.borrow().descriptors.keys().cloned().collect();
        names.sort();
        names
    })
}

/// Idempotent, single-flight external-module load.
///
/// The first caller starts the bounded probe; concurrent callers share the
/// same in-flight future. Failure, timeout, and non-browser contexts leave
/// the stand-ins authoritative and are reported at warn level only.
pub fn ensure_loaded(settings: &BridgeSettings) -> LocalBoxFuture<'static, ()> {
    ensure_initialized();
    enum Existing {
        Done,
        InFlight(Shared<LocalBoxFuture<'static, ()>>),
        Fresh,
    }
    let existing = STATE.with(|state| match &state.borrow().load {
        LoadPhase::Complete => Existing::Done,
        LoadPhase::InFlight(shared) => Existing::InFlight(shared.clone()),
        LoadPhase::NotStarted => Existing::Fresh,
    });
    match existing {
        Existing::Done => async {}.boxed_local(),
        Existing::InFlight(shared) => shared.boxed_local(),
        Existing::Fresh => {
            let settings = settings.clone();
            let shared = async move { run_load(settings).await }.boxed_local().shared();
            STATE.with(|state| state.borrow_mut().load = LoadPhase::InFlight(shared.clone()));
            shared.boxed_local()
        }
    }
}

async fn run_load(settings: BridgeSettings) {
    match load_external_module(
        &settings.module_global,
        settings.module_specifier.as_deref(),
        settings.load_timeout_ms,
    )
    .await
    {
        Ok(Some(discovered)) => {
            let mut installed = 0usize;
            for entry in discovered {
                match normalize(entry.factory, &entry.name) {
                    Some(descriptor) => {
                        install(enhance(descriptor));
                        registry::register_create(&entry.name);
                        installed += 1;
                    }
                    None => logging::warn!(
                        "external factory `{}` has an unrecognized shape; stand-in remains",
                        entry.name
                    ),
                }
            }
            logging::log!("external widget module loaded ({installed} factories)");
        }
        Ok(None) => {
            logging::warn!("external widget module unavailable; stand-ins remain authoritative")
        }
        Err(err) => logging::warn!(
            "external widget module load failed: {err}; stand-ins remain authoritative"
        ),
    }
    STATE.with(|state| state.borrow_mut().load = LoadPhase::Complete);
}

/// Clears descriptors and load state (test isolation).
pub fn reset() {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.descriptors.clear();
        state.load = LoadPhase::NotStarted;
    });
    INITIALIZED.with(|flag| flag.set(false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use platform_dom::RawCallable;
    use pretty_assertions::assert_eq;

    fn invoke_create(descriptor: &FactoryDescriptor, config: &WidgetConfig) -> ElementHandle {
        let value = block_on((descriptor.create_fn())(config)).expect("create never errs");
        match value {
            RawValue::Element(el) => el,
            _ => panic!("normalized create always yields an element"),
        }
    }

    #[test]
    fn callable_returning_element_passes_through() {
        let raw = RawFactory::Callable(RawCallable::from_fn(|props| {
            let el = ElementHandle::create("button").map_err(|err| err.to_string())?;
            if let Some(label) = props.get("label").and_then(Value::as_str) {
                el.set_text(label);
            }
            Ok(RawValue::Element(el))
        }));
        let descriptor = normalize(raw, "Button").expect("normalizes");
        assert_eq!(descriptor.shape(), FactoryShape::Function);

        let config = WidgetConfig::new().with_json("label", "Go");
        let el = invoke_create(&descriptor, &config);
        assert_eq!(el.tag(), "button");
        assert_eq!(el.text(), "Go");
    }

    #[test]
    fn callable_markup_is_sanitized_into_a_wrapper() {
        let raw = RawFactory::Callable(RawCallable::from_fn(|_| {
            Ok(RawValue::Markup("<div>x</div>".to_string()))
        }));
        let descriptor = normalize(raw, "Card").expect("normalizes");
        let el = invoke_create(&descriptor, &WidgetConfig::new());
        assert!(el.class_name().contains("vk-markup"));
        assert_eq!(el.text(), "x");
    }

    #[test]
    fn callable_that_raises_degrades_to_placeholder() {
        let raw = RawFactory::Callable(RawCallable::from_fn(|_| Err("kaboom".to_string())));
        let descriptor = normalize(raw, "Badge").expect("normalizes");
        let el = invoke_create(&descriptor, &WidgetConfig::new());
        assert!(el.class_name().contains("vk-standin"));
        assert_eq!(el.attribute("data-widget").as_deref(), Some("Badge"));
    }

    #[test]
    fn callable_returning_nothing_degrades_to_placeholder() {
        let raw = RawFactory::Callable(RawCallable::from_fn(|_| Ok(RawValue::Nothing)));
        let descriptor = normalize(raw, "Tooltip").expect("normalizes");
        let el = invoke_create(&descriptor, &WidgetConfig::new());
        assert!(el.class_name().contains("vk-standin"));
    }

    #[test]
    fn constructor_prefers_render_then_element_field() {
        use platform_dom::RawInstance;
        use std::collections::HashMap;

        let rendered = RawFactory::Constructor(RawConstructor::from_fn(|| {
            let mut methods = HashMap::new();
            methods.insert(
                "render".to_string(),
                RawCallable::from_fn(|_| {
                    let el = ElementHandle::create("section").map_err(|err| err.to_string())?;
                    el.set_text("rendered");
                    Ok(RawValue::Element(el))
                }),
            );
            let field = ElementHandle::create("div").map_err(|err| err.to_string())?;
            field.set_text("field");
            Ok(RawInstance::from_parts(methods, Some(field)))
        }));
        let descriptor = normalize(rendered, "Panel").expect("normalizes");
        let el = invoke_create(&descriptor, &WidgetConfig::new());
        assert_eq!(el.text(), "rendered");

        let field_only = RawFactory::Constructor(RawConstructor::from_fn(|| {
            let field = ElementHandle::create("div").map_err(|err| err.to_string())?;
            field.set_text("field");
            Ok(RawInstance::from_parts(HashMap::new(), Some(field)))
        }));
        let descriptor = normalize(field_only, "Panel").expect("normalizes");
        let el = invoke_create(&descriptor, &WidgetConfig::new());
        assert_eq!(el.text(), "field");
    }

    #[test]
    fn constructor_exception_becomes_placeholder() {
        let raw = RawFactory::Constructor(RawConstructor::from_fn(|| {
            Err("constructor exploded".to_string())
        }));
        let descriptor = normalize(raw, "Chart").expect("normalizes");
        let el = invoke_create(&descriptor, &WidgetConfig::new());
        assert!(el.class_name().contains("vk-standin"));
        assert!(el.text().contains("constructor error"));
    }

    #[test]
    fn object_with_alternate_method_name_is_re_exposed_as_create() {
        use std::collections::HashMap;

        let mut methods = HashMap::new();
        methods.insert(
            "build".to_string(),
            RawCallable::from_fn(|_| {
                let el = ElementHandle::create("nav").map_err(|err| err.to_string())?;
                Ok(RawValue::Element(el))
            }),
        );
        let raw = RawFactory::Object(RawObject::from_parts(methods, JsonMap::new()));
        let descriptor = normalize(raw, "Navigation").expect("normalizes");
        assert_eq!(descriptor.shape(), FactoryShape::CreateObject);

        let value =
            block_on((descriptor.create_fn())(&WidgetConfig::new())).expect("build runs");
        assert!(matches!(value, RawValue::Element(el) if el.tag() == "nav"));
    }

    #[test]
    fn config_bag_reflects_its_keys() {
        let mut json = JsonMap::new();
        json.insert("color".to_string(), Value::String("teal".to_string()));
        json.insert("size".to_string(), Value::String("large".to_string()));
        let raw = RawFactory::Object(RawObject::from_parts(Default::default(), json));
        let descriptor = normalize(raw, "Divider").expect("normalizes");
        assert_eq!(descriptor.shape(), FactoryShape::ConfigBag);

        let el = invoke_create(&descriptor, &WidgetConfig::new());
        assert!(el.text().contains("color"));
        assert!(el.text().contains("size"));
    }

    #[test]
    fn empty_object_fails_normalization() {
        let raw = RawFactory::Object(RawObject::from_parts(Default::default(), JsonMap::new()));
        assert!(normalize(raw, "Mystery").is_none());
    }

    #[test]
    fn enhancement_synthesizes_declared_capabilities_only() {
        let raw = RawFactory::Callable(RawCallable::from_fn(|_| Ok(RawValue::Nothing)));
        let descriptor = enhance(normalize(raw, "SearchPanel").expect("normalizes"));
        assert!(descriptor.emitter().is_some());
        assert!(descriptor.setter("setResults").is_some());
        assert!(descriptor.setter("setRows").is_none());

        let raw = RawFactory::Callable(RawCallable::from_fn(|_| Ok(RawValue::Nothing)));
        let unlisted = enhance(normalize(raw, "Card").expect("normalizes"));
        assert!(unlisted.emitter().is_none());
    }

    #[test]
    fn synthesized_variants_inject_a_variant_prop() {
        let raw = RawFactory::Callable(RawCallable::from_fn(|props| {
            let el = ElementHandle::create("button").map_err(|err| err.to_string())?;
            if let Some(variant) = props.get("variant").and_then(Value::as_str) {
                el.set_attribute("data-variant", variant)
                    .map_err(|err| err.to_string())?;
            }
            Ok(RawValue::Element(el))
        }));
        let descriptor = enhance(normalize(raw, "Button").expect("normalizes"));
        let primary = descriptor
            .select_method(Some("createPrimary"))
            .expect("variant resolves");
        let value = block_on(primary(&WidgetConfig::new())).expect("creates");
        let el = block_on(coerce_raw_value(value, SanitizeLevel::Strict)).expect("element");
        assert_eq!(el.attribute("data-variant").as_deref(), Some("primary"));
    }

    #[test]
    fn requested_missing_method_fails_closed() {
        let raw = RawFactory::Callable(RawCallable::from_fn(|_| Ok(RawValue::Nothing)));
        let descriptor = enhance(normalize(raw, "Card").expect("normalizes"));
        assert!(descriptor.select_method(Some("createFancy")).is_none());
        assert!(descriptor.select_method(None).is_some());
    }

    #[test]
    fn mock_emitter_subscribe_emit_unsubscribe() {
        use std::cell::Cell;

        let emitter = MockEmitter::default();
        let seen = Rc::new(Cell::new(0u32));
        let observed = seen.clone();
        let id = emitter.on(
            "results",
            Rc::new(move |_payload| observed.set(observed.get() + 1)),
        );
        emitter.emit("results", &Value::Null);
        assert_eq!(seen.get(), 1);

        emitter.off("results", id);
        emitter.emit("results", &Value::Null);
        assert_eq!(seen.get(), 1);
        assert_eq!(emitter.subscriber_count("results"), 0);
    }

    #[test]
    fn single_flight_load_completes_without_module() {
        crate::reset();
        let settings = BridgeSettings::default();
        block_on(ensure_loaded(&settings));
        block_on(ensure_loaded(&settings));
        assert!(descriptor("Button").is_some());
        crate::reset();
    }
}
