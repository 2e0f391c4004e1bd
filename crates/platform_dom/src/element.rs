//! Opaque renderable-element handle.
//!
//! On wasm32 an [`ElementHandle`] wraps a live `web_sys::Element`. On every
//! other target it wraps an in-memory node record with the same observable
//! surface (attributes, classes, text, children, listeners, destroy hook) so
//! mount/cleanup logic can be exercised without a browser.

use std::rc::Rc;

use crate::sanitize::{self, SanitizeLevel};

#[cfg(not(target_arch = "wasm32"))]
use std::{cell::RefCell, collections::BTreeMap, rc::Weak};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

/// Error raised by element construction or mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// No browser document is available in this execution context.
    DocumentUnavailable,
    /// A browser API call failed.
    Js(String),
}

impl std::fmt::Display for DomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentUnavailable => write!(f, "browser document is unavailable"),
            Self::Js(message) => write!(f, "browser API call failed: {message}"),
        }
    }
}

impl std::error::Error for DomError {}

/// Event observed on a mounted element.
#[derive(Clone)]
pub struct DomEvent {
    #[cfg(target_arch = "wasm32")]
    inner: web_sys::Event,
    #[cfg(not(target_arch = "wasm32"))]
    kind: String,
    #[cfg(not(target_arch = "wasm32"))]
    detail: serde_json::Value,
}

impl DomEvent {
    /// Returns the event type token (`click`, `input`, ...).
    pub fn kind(&self) -> String {
        #[cfg(target_arch = "wasm32")]
        {
            self.inner.type_()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.kind.clone()
        }
    }

    /// Returns a JSON detail payload when one is known.
    pub fn detail(&self) -> serde_json::Value {
        #[cfg(target_arch = "wasm32")]
        {
            serde_json::Value::Null
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.detail.clone()
        }
    }

    /// Wraps a live browser event.
    #[cfg(target_arch = "wasm32")]
    pub fn from_web(inner: web_sys::Event) -> Self {
        Self { inner }
    }

    /// Returns the underlying browser event.
    #[cfg(target_arch = "wasm32")]
    pub fn as_web(&self) -> &web_sys::Event {
        &self.inner
    }

    /// Builds a synthetic event for native dispatch.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn synthetic(kind: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            detail,
        }
    }
}

/// Registration proof for one attached listener; required for removal.
pub struct ListenerHandle {
    kind: String,
    #[cfg(target_arch = "wasm32")]
    closure: Closure<dyn FnMut(web_sys::Event)>,
    #[cfg(not(target_arch = "wasm32"))]
    id: u64,
}

impl ListenerHandle {
    /// Returns the event type this listener was registered for.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// Element-supplied teardown callback discovered at mount time.
pub struct DestroyHook {
    #[cfg(target_arch = "wasm32")]
    func: js_sys::Function,
    #[cfg(target_arch = "wasm32")]
    this: JsValue,
    #[cfg(not(target_arch = "wasm32"))]
    func: Rc<dyn Fn() -> Result<(), String>>,
}

impl DestroyHook {
    /// Runs the hook, reporting a failure message instead of raising.
    pub fn run(&self) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            self.func
                .call0(&self.this)
                .map(|_| ())
                .map_err(crate::interop::js_error_to_string)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            (self.func)()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct ListenerRecord {
    id: u64,
    kind: String,
    callback: Rc<dyn Fn(DomEvent)>,
}

#[cfg(not(target_arch = "wasm32"))]
struct NodeData {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    markup: Option<String>,
    children: Vec<ElementHandle>,
    parent: Option<Weak<RefCell<NodeData>>>,
    listeners: Vec<ListenerRecord>,
    destroy: Option<Rc<dyn Fn() -> Result<(), String>>>,
    next_listener_id: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            text: String::new(),
            markup: None,
            children: Vec::new(),
            parent: None,
            listeners: Vec::new(),
            destroy: None,
            next_listener_id: 0,
        }
    }
}

/// Opaque handle to one renderable element node.
#[derive(Clone)]
pub struct ElementHandle {
    #[cfg(target_arch = "wasm32")]
    el: web_sys::Element,
    #[cfg(not(target_arch = "wasm32"))]
    node: Rc<RefCell<NodeData>>,
}

impl std::fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementHandle")
            .field("tag", &self.tag())
            .finish()
    }
}

impl ElementHandle {
    /// Creates a detached element with the given tag name.
    pub fn create(tag: &str) -> Result<Self, DomError> {
        #[cfg(target_arch = "wasm32")]
        {
            let document = web_sys::window()
                .and_then(|window| window.document())
                .ok_or(DomError::DocumentUnavailable)?;
            let el = document
                .create_element(tag)
                .map_err(|err| DomError::Js(crate::interop::js_error_to_string(err)))?;
            Ok(Self { el })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(Self {
                node: Rc::new(RefCell::new(NodeData::new(tag))),
            })
        }
    }

    /// Returns the lowercase tag name.
    pub fn tag(&self) -> String {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.tag_name().to_ascii_lowercase()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.node.borrow().tag.clone()
        }
    }

    /// Sets an attribute, overwriting any previous value.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
        #[cfg(target_arch = "wasm32")]
        {
            self.el
                .set_attribute(name, value)
                .map_err(|err| DomError::Js(crate::interop::js_error_to_string(err)))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.node
                .borrow_mut()
                .attributes
                .insert(name.to_string(), value.to_string());
            Ok(())
        }
    }

    /// Reads an attribute value.
    pub fn attribute(&self, name: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.get_attribute(name)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.node.borrow().attributes.get(name).cloned()
        }
    }

    /// Adds a CSS class when not already present.
    pub fn add_class(&self, class: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            let _ = self.el.class_list().add_1(class);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut node = self.node.borrow_mut();
            if !node.classes.iter().any(|existing| existing == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    /// Returns the space-joined class list.
    pub fn class_name(&self) -> String {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.class_name()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.node.borrow().classes.join(" ")
        }
    }

    /// Replaces all content with plain text.
    pub fn set_text(&self, text: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.set_text_content(Some(text));
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let children = std::mem::take(&mut self.node.borrow_mut().children);
            for child in &children {
                child.forget_parent();
            }
            let mut node = self.node.borrow_mut();
            node.markup = None;
            node.text = text.to_string();
        }
    }

    /// Returns the combined text content of this element and its children.
    pub fn text(&self) -> String {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.text_content().unwrap_or_default()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let node = self.node.borrow();
            if let Some(markup) = &node.markup {
                return sanitize::strip_tags(markup);
            }
            let mut out = node.text.clone();
            for child in &node.children {
                out.push_str(&child.text());
            }
            out
        }
    }

    /// Sanitizes `markup` at `level` and assigns it as this element's content.
    pub fn set_sanitized_markup(&self, markup: &str, level: SanitizeLevel) {
        let safe = sanitize::sanitize(markup, level);

        #[cfg(target_arch = "wasm32")]
        {
            self.el.set_inner_html(&safe);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let children = std::mem::take(&mut self.node.borrow_mut().children);
            for child in &children {
                child.forget_parent();
            }
            let mut node = self.node.borrow_mut();
            node.text.clear();
            node.markup = Some(safe);
        }
    }

    /// Returns the current inner markup.
    pub fn inner_markup(&self) -> String {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.inner_html()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let node = self.node.borrow();
            node.markup.clone().unwrap_or_else(|| node.text.clone())
        }
    }

    /// Appends `child`, detaching it from any previous parent first.
    pub fn append_child(&self, child: &ElementHandle) -> Result<(), DomError> {
        #[cfg(target_arch = "wasm32")]
        {
            self.el
                .append_child(&child.el)
                .map(|_| ())
                .map_err(|err| DomError::Js(crate::interop::js_error_to_string(err)))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            child.detach();
            child.node.borrow_mut().parent = Some(Rc::downgrade(&self.node));
            self.node.borrow_mut().children.push(child.clone());
            Ok(())
        }
    }

    /// Removes this element from its parent when it has one.
    pub fn detach(&self) {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.remove();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let parent = self.node.borrow().parent.as_ref().and_then(Weak::upgrade);
            if let Some(parent) = parent {
                parent
                    .borrow_mut()
                    .children
                    .retain(|child| !Rc::ptr_eq(&child.node, &self.node));
            }
            self.node.borrow_mut().parent = None;
        }
    }

    /// Returns whether this element currently has a parent.
    pub fn has_parent(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.parent_node().is_some()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.node
                .borrow()
                .parent
                .as_ref()
                .and_then(Weak::upgrade)
                .is_some()
        }
    }

    /// Removes every child node.
    pub fn clear_children(&self) {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.set_inner_html("");
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let children = std::mem::take(&mut self.node.borrow_mut().children);
            for child in &children {
                child.forget_parent();
            }
            let mut node = self.node.borrow_mut();
            node.text.clear();
            node.markup = None;
        }
    }

    /// Returns the number of element children.
    pub fn child_count(&self) -> usize {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.child_element_count() as usize
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.node.borrow().children.len()
        }
    }

    /// Returns the first element child when one exists.
    pub fn first_child(&self) -> Option<ElementHandle> {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.first_element_child().map(|el| Self { el })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.node.borrow().children.first().cloned()
        }
    }

    /// Returns a deep copy with no parent, listeners, or destroy hook.
    pub fn deep_clone(&self) -> ElementHandle {
        #[cfg(target_arch = "wasm32")]
        {
            let el = self
                .el
                .clone_node_with_deep(true)
                .ok()
                .and_then(|node| node.dyn_into::<web_sys::Element>().ok())
                .unwrap_or_else(|| self.el.clone());
            Self { el }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let source = self.node.borrow();
            let clone = ElementHandle {
                node: Rc::new(RefCell::new(NodeData::new(&source.tag))),
            };
            {
                let mut target = clone.node.borrow_mut();
                target.attributes = source.attributes.clone();
                target.classes = source.classes.clone();
                target.text = source.text.clone();
                target.markup = source.markup.clone();
            }
            for child in &source.children {
                let child_clone = child.deep_clone();
                child_clone.node.borrow_mut().parent = Some(Rc::downgrade(&clone.node));
                clone.node.borrow_mut().children.push(child_clone);
            }
            clone
        }
    }

    /// Returns whether both handles refer to the same underlying node.
    pub fn is_same(&self, other: &ElementHandle) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            self.el.is_same_node(Some(&other.el))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Rc::ptr_eq(&self.node, &other.node)
        }
    }

    /// Attaches a listener for `kind` events.
    pub fn add_listener(
        &self,
        kind: &str,
        callback: Rc<dyn Fn(DomEvent)>,
    ) -> Result<ListenerHandle, DomError> {
        #[cfg(target_arch = "wasm32")]
        {
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                callback(DomEvent::from_web(event));
            }) as Box<dyn FnMut(web_sys::Event)>);
            self.el
                .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
                .map_err(|err| DomError::Js(crate::interop::js_error_to_string(err)))?;
            Ok(ListenerHandle {
                kind: kind.to_string(),
                closure,
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut node = self.node.borrow_mut();
            let id = node.next_listener_id;
            node.next_listener_id += 1;
            node.listeners.push(ListenerRecord {
                id,
                kind: kind.to_string(),
                callback,
            });
            Ok(ListenerHandle {
                kind: kind.to_string(),
                id,
            })
        }
    }

    /// Detaches a previously registered listener.
    pub fn remove_listener(&self, handle: &ListenerHandle) {
        #[cfg(target_arch = "wasm32")]
        {
            let _ = self.el.remove_event_listener_with_callback(
                &handle.kind,
                handle.closure.as_ref().unchecked_ref(),
            );
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.node
                .borrow_mut()
                .listeners
                .retain(|record| record.id != handle.id);
        }
    }

    /// Returns the element-supplied `destroy` hook when one exists.
    pub fn destroy_hook(&self) -> Option<DestroyHook> {
        #[cfg(target_arch = "wasm32")]
        {
            let value = js_sys::Reflect::get(&self.el, &JsValue::from_str("destroy")).ok()?;
            let func = value.dyn_into::<js_sys::Function>().ok()?;
            Some(DestroyHook {
                func,
                this: self.el.clone().into(),
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.node.borrow().destroy.clone().map(|func| DestroyHook { func })
        }
    }

    /// Wraps an existing browser element.
    #[cfg(target_arch = "wasm32")]
    pub fn from_web(el: web_sys::Element) -> Self {
        Self { el }
    }

    /// Returns the underlying browser element.
    #[cfg(target_arch = "wasm32")]
    pub fn as_web(&self) -> &web_sys::Element {
        &self.el
    }

    /// Installs a `destroy` hook on this node (native test surface).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn set_destroy_hook(&self, hook: Rc<dyn Fn() -> Result<(), String>>) {
        self.node.borrow_mut().destroy = Some(hook);
    }

    /// Fires every listener registered for `kind` (native test surface).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn dispatch(&self, kind: &str, detail: serde_json::Value) {
        let callbacks: Vec<Rc<dyn Fn(DomEvent)>> = self
            .node
            .borrow()
            .listeners
            .iter()
            .filter(|record| record.kind == kind)
            .map(|record| record.callback.clone())
            .collect();
        for callback in callbacks {
            callback(DomEvent::synthetic(kind, detail.clone()));
        }
    }

    /// Returns how many listeners are registered for `kind` (native test surface).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn listener_count(&self, kind: &str) -> usize {
        self.node
            .borrow()
            .listeners
            .iter()
            .filter(|record| record.kind == kind)
            .count()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn forget_parent(&self) {
        self.node.borrow_mut().parent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_detach_round_trip() {
        let parent = ElementHandle::create("div").expect("parent");
        let child = ElementHandle::create("span").expect("child");
        parent.append_child(&child).expect("append");
        assert_eq!(parent.child_count(), 1);
        assert!(child.has_parent());

        child.detach();
        assert_eq!(parent.child_count(), 0);
        assert!(!child.has_parent());
    }

    #[test]
    fn append_moves_between_parents() {
        let first = ElementHandle::create("div").expect("first");
        let second = ElementHandle::create("div").expect("second");
        let child = ElementHandle::create("span").expect("child");

        first.append_child(&child).expect("append");
        second.append_child(&child).expect("move");
        assert_eq!(first.child_count(), 0);
        assert_eq!(second.child_count(), 1);
    }

    #[test]
    fn deep_clone_is_independent() {
        let original = ElementHandle::create("div").expect("original");
        original.set_text("hello");
        original.add_class("vk-card");
        let inner = ElementHandle::create("span").expect("inner");
        original.append_child(&inner).expect("append");

        let clone = original.deep_clone();
        assert!(!clone.is_same(&original));
        assert_eq!(clone.child_count(), 1);

        clone.set_text("changed");
        assert_eq!(original.text(), "hello");
        assert_eq!(original.child_count(), 1);
    }

    #[test]
    fn listeners_fire_and_remove() {
        use std::cell::Cell;

        let element = ElementHandle::create("button").expect("button");
        let hits = Rc::new(Cell::new(0u32));
        let observed = hits.clone();
        let handle = element
            .add_listener(
                "click",
                Rc::new(move |event| {
                    assert_eq!(event.kind(), "click");
                    observed.set(observed.get() + 1);
                }),
            )
            .expect("listener");

        element.dispatch("click", serde_json::Value::Null);
        element.dispatch("input", serde_json::Value::Null);
        assert_eq!(hits.get(), 1);

        element.remove_listener(&handle);
        element.dispatch("click", serde_json::Value::Null);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn sanitized_markup_strips_tags() {
        let element = ElementHandle::create("div").expect("div");
        element.set_sanitized_markup("<div>x</div>", SanitizeLevel::Strict);
        assert_eq!(element.text(), "x");
    }

    #[test]
    fn destroy_hook_runs_once_installed() {
        let element = ElementHandle::create("div").expect("div");
        assert!(element.destroy_hook().is_none());

        element.set_destroy_hook(Rc::new(|| Err("boom".to_string())));
        let hook = element.destroy_hook().expect("hook");
        assert_eq!(hook.run(), Err("boom".to_string()));
    }
}
