//! Raw-factory interop primitives.
//!
//! The external widget module hands back factories in several incompatible
//! shapes. This module models those shapes as a closed set of tagged variants
//! ([`RawFactory`]) and classifies whatever a factory call returns into a
//! [`RawValue`]. On wasm32 the variants wrap live JS values and classification
//! runs over `js_sys::Reflect`; on other targets they wrap closures so the
//! normalization policy can be tested without a browser.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::element::ElementHandle;

#[cfg(not(target_arch = "wasm32"))]
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::*, JsCast};

/// JSON object map used for factory props and config-bag snapshots.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// One external factory, tagged by the shape it arrived in.
#[derive(Clone)]
pub enum RawFactory {
    /// A directly callable function value.
    Callable(RawCallable),
    /// A class-like constructor that must be instantiated per creation.
    Constructor(RawConstructor),
    /// An object carrying named methods and/or plain data props.
    Object(RawObject),
}

/// Classification of whatever a raw factory call returned.
pub enum RawValue {
    /// A real renderable element.
    Element(ElementHandle),
    /// An `{ element }` wrapper object around a real element.
    ElementWrapper(ElementHandle),
    /// An object exposing a `render` method that must be called again.
    Renderable(RawCallable),
    /// A markup string that must be sanitized before use.
    Markup(String),
    /// Nothing usable (`null`/`undefined`/missing).
    Nothing,
    /// A value no coercion rule recognizes; carries a diagnostic rendering.
    Unusable(String),
}

/// A callable unit of factory code: a live JS function, or a Rust closure
/// backing a built-in stand-in.
#[derive(Clone)]
pub struct RawCallable {
    inner: CallableImpl,
}

type NativeCallable = Rc<dyn Fn(&JsonMap) -> LocalBoxFuture<'static, Result<RawValue, String>>>;

#[derive(Clone)]
enum CallableImpl {
    #[cfg(target_arch = "wasm32")]
    Js { func: js_sys::Function, this: JsValue },
    Native(NativeCallable),
}

impl RawCallable {
    /// Invokes the callable with JSON-valued props.
    ///
    /// A rejected promise or thrown exception surfaces as `Err`; the resolved
    /// value is classified into a [`RawValue`].
    pub fn invoke(&self, props: &JsonMap) -> LocalBoxFuture<'static, Result<RawValue, String>> {
        match &self.inner {
            #[cfg(target_arch = "wasm32")]
            CallableImpl::Js { func, this } => {
                let func = func.clone();
                let this = this.clone();
                let props = serde_json::Value::Object(props.clone());
                async move {
                    let arg =
                        serde_wasm_bindgen::to_value(&props).map_err(|err| err.to_string())?;
                    let returned = func.call1(&this, &arg).map_err(js_error_to_string)?;
                    let resolved = if returned.is_instance_of::<js_sys::Promise>() {
                        wasm_bindgen_futures::JsFuture::from(js_sys::Promise::from(returned))
                            .await
                            .map_err(js_error_to_string)?
                    } else {
                        returned
                    };
                    Ok(classify_value(resolved))
                }
                .boxed_local()
            }
            CallableImpl::Native(func) => func(props),
        }
    }

    /// Wraps a synchronous Rust closure (stand-ins, tests).
    pub fn from_fn(func: impl Fn(&JsonMap) -> Result<RawValue, String> + 'static) -> Self {
        Self {
            inner: CallableImpl::Native(Rc::new(move |props| {
                let out = func(props);
                async move { out }.boxed_local()
            })),
        }
    }

    /// Wraps an asynchronous Rust closure (stand-ins, tests).
    pub fn from_async_fn(
        func: impl Fn(&JsonMap) -> LocalBoxFuture<'static, Result<RawValue, String>> + 'static,
    ) -> Self {
        Self {
            inner: CallableImpl::Native(Rc::new(func)),
        }
    }

    /// Wraps a live JS function bound to `this`.
    #[cfg(target_arch = "wasm32")]
    pub fn from_js(func: js_sys::Function, this: JsValue) -> Self {
        Self {
            inner: CallableImpl::Js { func, this },
        }
    }
}

/// A class-like external constructor.
#[derive(Clone)]
pub struct RawConstructor {
    #[cfg(target_arch = "wasm32")]
    func: js_sys::Function,
    #[cfg(not(target_arch = "wasm32"))]
    func: Rc<dyn Fn() -> Result<RawInstance, String>>,
}

impl RawConstructor {
    /// Instantiates the constructor; a thrown exception surfaces as `Err`.
    pub fn construct(&self) -> Result<RawInstance, String> {
        #[cfg(target_arch = "wasm32")]
        {
            js_sys::Reflect::construct(&self.func, &js_sys::Array::new())
                .map(|instance| RawInstance {
                    obj: instance.into(),
                })
                .map_err(js_error_to_string)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            (self.func)()
        }
    }

    /// Wraps a native instantiation closure (test surface).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_fn(func: impl Fn() -> Result<RawInstance, String> + 'static) -> Self {
        Self {
            func: Rc::new(func),
        }
    }

    /// Wraps a live JS constructor function.
    #[cfg(target_arch = "wasm32")]
    pub fn from_js(func: js_sys::Function) -> Self {
        Self { func }
    }
}

/// One constructed instance of a class-shaped factory.
#[derive(Clone)]
pub struct RawInstance {
    #[cfg(target_arch = "wasm32")]
    obj: JsValue,
    #[cfg(not(target_arch = "wasm32"))]
    methods: HashMap<String, RawCallable>,
    #[cfg(not(target_arch = "wasm32"))]
    element: Option<ElementHandle>,
}

impl RawInstance {
    /// Returns a named instance method when present and callable.
    pub fn method(&self, name: &str) -> Option<RawCallable> {
        #[cfg(target_arch = "wasm32")]
        {
            js_method(&self.obj, name)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.methods.get(name).cloned()
        }
    }

    /// Returns the instance's `element` field when it holds a real element.
    pub fn element_field(&self) -> Option<ElementHandle> {
        #[cfg(target_arch = "wasm32")]
        {
            js_element_field(&self.obj, "element")
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.element.clone()
        }
    }

    /// Builds a native instance from its parts (test surface).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_parts(
        methods: HashMap<String, RawCallable>,
        element: Option<ElementHandle>,
    ) -> Self {
        Self { methods, element }
    }
}

/// An object-shaped factory: named methods plus plain data props.
#[derive(Clone)]
pub struct RawObject {
    #[cfg(target_arch = "wasm32")]
    obj: JsValue,
    #[cfg(not(target_arch = "wasm32"))]
    methods: HashMap<String, RawCallable>,
    #[cfg(not(target_arch = "wasm32"))]
    json: JsonMap,
}

impl RawObject {
    /// Returns a named method when present and callable.
    pub fn method(&self, name: &str) -> Option<RawCallable> {
        #[cfg(target_arch = "wasm32")]
        {
            js_method(&self.obj, name)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.methods.get(name).cloned()
        }
    }

    /// Returns the object's own enumerable key names.
    pub fn keys(&self) -> Vec<String> {
        #[cfg(target_arch = "wasm32")]
        {
            js_sys::Object::keys(&js_sys::Object::from(self.obj.clone()))
                .iter()
                .filter_map(|key| key.as_string())
                .collect()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut keys: Vec<String> = self.methods.keys().cloned().collect();
            keys.extend(self.json.keys().cloned());
            keys.sort();
            keys.dedup();
            keys
        }
    }

    /// Snapshot of the object's plain (JSON-able) own props.
    pub fn json_snapshot(&self) -> JsonMap {
        #[cfg(target_arch = "wasm32")]
        {
            let plain = js::plain_props(&self.obj);
            serde_wasm_bindgen::from_value(plain).unwrap_or_default()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.json.clone()
        }
    }

    /// Builds a native object factory from its parts (test surface).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_parts(methods: HashMap<String, RawCallable>, json: JsonMap) -> Self {
        Self { methods, json }
    }
}

/// Classifies a live JS value into the supported factory shapes.
#[cfg(target_arch = "wasm32")]
pub fn classify_factory(value: &JsValue) -> Option<RawFactory> {
    if let Some(func) = value.dyn_ref::<js_sys::Function>() {
        if js::is_class_like(value) {
            return Some(RawFactory::Constructor(RawConstructor::from_js(
                func.clone(),
            )));
        }
        return Some(RawFactory::Callable(RawCallable::from_js(
            func.clone(),
            JsValue::UNDEFINED,
        )));
    }
    if value.is_object() {
        return Some(RawFactory::Object(RawObject { obj: value.clone() }));
    }
    None
}

/// Classifies a factory return value into a [`RawValue`].
#[cfg(target_arch = "wasm32")]
pub fn classify_value(value: JsValue) -> RawValue {
    if value.is_null() || value.is_undefined() {
        return RawValue::Nothing;
    }
    if let Some(markup) = value.as_string() {
        return RawValue::Markup(markup);
    }
    if let Ok(el) = value.clone().dyn_into::<web_sys::Element>() {
        return RawValue::Element(ElementHandle::from_web(el));
    }
    if value.is_object() {
        if let Some(el) = js_element_field(&value, "element") {
            return RawValue::ElementWrapper(el);
        }
        if let Some(render) = js_method(&value, "render") {
            return RawValue::Renderable(render);
        }
    }
    RawValue::Unusable(format!("{value:?}"))
}

#[cfg(target_arch = "wasm32")]
fn js_method(obj: &JsValue, name: &str) -> Option<RawCallable> {
    let value = js_sys::Reflect::get(obj, &JsValue::from_str(name)).ok()?;
    let func = value.dyn_into::<js_sys::Function>().ok()?;
    Some(RawCallable::from_js(func, obj.clone()))
}

#[cfg(target_arch = "wasm32")]
fn js_element_field(obj: &JsValue, name: &str) -> Option<ElementHandle> {
    let value = js_sys::Reflect::get(obj, &JsValue::from_str(name)).ok()?;
    value
        .dyn_into::<web_sys::Element>()
        .ok()
        .map(ElementHandle::from_web)
}

/// Renders a thrown JS value as a plain message string.
#[cfg(target_arch = "wasm32")]
pub(crate) fn js_error_to_string(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}

#[cfg(target_arch = "wasm32")]
pub(crate) mod js {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(inline_js = r#"
export function vkIsClassLike(value) {
  return typeof value === 'function' && /^\s*class[\s{]/.test(Function.prototype.toString.call(value));
}

export function vkPlainProps(value) {
  const out = {};
  for (const key of Object.keys(value ?? {})) {
    const entry = value[key];
    const kind = typeof entry;
    if (entry === null || kind === 'string' || kind === 'number' || kind === 'boolean') {
      out[key] = entry;
    }
  }
  return out;
}

export function vkGlobalNamespace(name) {
  const value = globalThis[name];
  return value === undefined ? null : value;
}

export function vkImportModule(specifier, timeoutMs) {
  const timeout = new Promise((resolve) => setTimeout(() => resolve(null), timeoutMs));
  return Promise.race([import(specifier), timeout]).catch(() => null);
}

export function vkModuleKeys(module) {
  return module ? Object.keys(module) : [];
}
"#)]
    extern "C" {
        #[wasm_bindgen(js_name = vkIsClassLike)]
        pub fn is_class_like(value: &JsValue) -> bool;
        #[wasm_bindgen(js_name = vkPlainProps)]
        pub fn plain_props(value: &JsValue) -> JsValue;
        #[wasm_bindgen(js_name = vkGlobalNamespace)]
        pub fn global_namespace(name: &str) -> JsValue;
        #[wasm_bindgen(js_name = vkImportModule)]
        pub fn import_module(specifier: &str, timeout_ms: f64) -> js_sys::Promise;
        #[wasm_bindgen(js_name = vkModuleKeys)]
        pub fn module_keys(module: &JsValue) -> js_sys::Array;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn sync_callable_round_trips_props() {
        let callable = RawCallable::from_fn(|props| {
            let label = props
                .get("label")
                .and_then(|value| value.as_str())
                .unwrap_or("none")
                .to_string();
            Ok(RawValue::Markup(label))
        });

        let mut props = JsonMap::new();
        props.insert("label".to_string(), json!("hello"));
        match block_on(callable.invoke(&props)) {
            Ok(RawValue::Markup(text)) => assert_eq!(text, "hello"),
            _ => panic!("expected markup"),
        }
    }

    #[test]
    fn constructor_failure_surfaces_as_err() {
        let constructor = RawConstructor::from_fn(|| Err("ctor exploded".to_string()));
        assert_eq!(
            constructor.construct().err(),
            Some("ctor exploded".to_string())
        );
    }

    #[test]
    fn object_keys_merge_methods_and_json() {
        let mut methods = std::collections::HashMap::new();
        methods.insert(
            "render".to_string(),
            RawCallable::from_fn(|_| Ok(RawValue::Nothing)),
        );
        let mut json = JsonMap::new();
        json.insert("variant".to_string(), json!("ghost"));

        let object = RawObject::from_parts(methods, json);
        assert_eq!(object.keys(), vec!["render".to_string(), "variant".to_string()]);
        assert!(object.method("render").is_some());
        assert!(object.method("create").is_none());
    }
}
