//! Creation cache and metrics.
//!
//! Memoizes creation results by a fingerprint of `(name, configuration)`.
//! The cache is a template store, not an instance store: stored elements are
//! never handed out or mounted; every hit returns a deep clone and the
//! original miss result goes to exactly one owner. Bounded capacity, oldest
//! entries evicted first. Failed creations are never cached.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use futures::future::LocalBoxFuture;
use platform_dom::{unix_time_ms_now, ElementHandle};
use serde::Serialize;
use widget_contract::WidgetConfig;

/// Running cache/latency counters for one widget name (or aggregated).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreationMetrics {
    /// Lookups served as template clones.
    pub cache_hits: u64,
    /// Lookups that invoked the factory.
    pub cache_misses: u64,
    /// Timed factory invocations backing the running average.
    pub creations: u64,
    /// Running average creation latency in milliseconds.
    pub creation_time_ms: f64,
}

struct TemplateEntry {
    template: ElementHandle,
}

#[derive(Default)]
struct OptimizerState {
    templates: HashMap<String, TemplateEntry>,
    order: VecDeque<String>,
    metrics: HashMap<String, CreationMetrics>,
}

thread_local! {
    static STATE: RefCell<OptimizerState> = RefCell::new(OptimizerState::default());
}

/// Returns a cached clone for `(name, configuration)` or invokes `create`,
/// memoizing a clone of its result.
pub async fn get_or_create(
    name: &str,
    config: &WidgetConfig,
    capacity: usize,
    create: impl FnOnce() -> LocalBoxFuture<'static, Result<ElementHandle, String>>,
) -> Result<ElementHandle, String> {
    let fingerprint = config.fingerprint(name);

    let hit = STATE.with(|state| {
        state
            .borrow()
            .templates
            .get(&fingerprint)
            .map(|entry| entry.template.deep_clone())
    });
    if let Some(clone) = hit {
        record(name, |metrics| metrics.cache_hits += 1);
        return Ok(clone);
    }

    let started = unix_time_ms_now();
    let element = create().await?;
    let elapsed = unix_time_ms_now().saturating_sub(started) as f64;
    record(name, |metrics| {
        metrics.cache_misses += 1;
        metrics.creations += 1;
        let count = metrics.creations as f64;
        metrics.creation_time_ms += (elapsed - metrics.creation_time_ms) / count;
    });

    STATE.with(|state| {
        let mut state = state.borrow_mut();
        if !state.templates.contains_key(&fingerprint) {
            state.order.push_back(fingerprint.clone());
        }
        state.templates.insert(
            fingerprint,
            TemplateEntry {
                template: element.deep_clone(),
            },
        );
        while state.order.len() > capacity.max(1) {
            if let Some(oldest) = state.order.pop_front() {
                state.templates.remove(&oldest);
            }
        }
    });

    Ok(element)
}

fn record(name: &str, update: impl FnOnce(&mut CreationMetrics)) {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        update(state.metrics.entry(name.to_string()).or_default());
    });
}

/// Metrics for one widget, or aggregated across all when `name` is `None`.
pub fn metrics(name: Option<&str>) -> CreationMetrics {
    STATE.with(|state| {
        let state = state.borrow();
        match name {
            Some(name) => state.metrics.get(name).cloned().unwrap_or_default(),
            None => {
                let mut total = CreationMetrics::default();
                let mut weighted = 0.0;
                for entry in state.metrics.values() {
                    total.cache_hits += entry.cache_hits;
                    total.cache_misses += entry.cache_misses;
                    total.creations += entry.creations;
                    weighted += entry.creation_time_ms * entry.creations as f64;
                }
                if total.creations > 0 {
                    total.creation_time_ms = weighted / total.creations as f64;
                }
                total
            }
        }
    })
}

/// Number of cached templates (diagnostics).
pub fn template_count() -> usize {
    STATE.with(|state| state.borrow().templates.len())
}

/// Drops every cached template (memory pressure); metrics are retained.
pub fn clear() {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.templates.clear();
        state.order.clear();
    });
}

/// Drops templates and metrics (test isolation).
pub fn reset() {
    STATE.with(|state| *state.borrow_mut() = OptimizerState::default());
}
