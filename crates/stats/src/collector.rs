//! Counter and gauge collection
//!
//! [`StatsCollector`] is the narrow interface the server pushes metrics
//! through. It is inert until a backend is installed: every operation on a
//! collector without a backend is a no-op, so instrumented code never has to
//! check whether metrics were requested.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tracing::info;

/// Label mapping attached to a single series within a metric family.
pub type Labels = HashMap<String, String>;

/// Destination for metric values; the concrete exporter lives outside this
/// crate.
///
/// Implementations must tolerate mutations of names that were never
/// registered (the collector already filters most of these, but backends are
/// the final arbiter).
pub trait MetricsBackend: Send + Sync {
    fn counter_create(&self, name: &str, description: &str);
    fn counter_increment_by(&self, name: &str, value: f64, labels: &Labels);
    fn gauge_create(&self, name: &str, description: &str);
    fn gauge_add(&self, name: &str, delta: f64, labels: &Labels);
    fn gauge_set(&self, name: &str, value: f64, labels: &Labels);
}

/// Create/mutate interface for named counters and gauges.
///
/// Activated only when the caller supplies an explicit endpoint by building
/// a backend for it; the configuration document never enables metrics.
#[derive(Default)]
pub struct StatsCollector {
    backend: Option<Box<dyn MetricsBackend>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        StatsCollector { backend: None }
    }

    /// Install a backend. Enabling twice is a programming error.
    pub fn enable(&mut self, backend: Box<dyn MetricsBackend>) {
        debug_assert!(self.backend.is_none(), "metrics backend installed twice");
        self.backend = Some(backend);
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn counter_create(&self, name: &str, description: &str) {
        if let Some(backend) = &self.backend {
            backend.counter_create(name, description);
        }
    }

    pub fn counter_increment(&self, name: &str, labels: &Labels) {
        self.counter_increment_by(name, 1.0, labels);
    }

    pub fn counter_increment_by(&self, name: &str, value: f64, labels: &Labels) {
        if let Some(backend) = &self.backend {
            backend.counter_increment_by(name, value, labels);
        }
    }

    pub fn gauge_create(&self, name: &str, description: &str) {
        if let Some(backend) = &self.backend {
            backend.gauge_create(name, description);
        }
    }

    pub fn gauge_increment(&self, name: &str, labels: &Labels) {
        self.gauge_increment_by(name, 1.0, labels);
    }

    pub fn gauge_increment_by(&self, name: &str, delta: f64, labels: &Labels) {
        if let Some(backend) = &self.backend {
            backend.gauge_add(name, delta, labels);
        }
    }

    pub fn gauge_decrement(&self, name: &str, labels: &Labels) {
        self.gauge_decrement_by(name, 1.0, labels);
    }

    pub fn gauge_decrement_by(&self, name: &str, delta: f64, labels: &Labels) {
        if let Some(backend) = &self.backend {
            backend.gauge_add(name, -delta, labels);
        }
    }

    pub fn gauge_set(&self, name: &str, value: f64, labels: &Labels) {
        if let Some(backend) = &self.backend {
            backend.gauge_set(name, value, labels);
        }
    }

    /// Set a gauge to the current unix time, in seconds.
    pub fn gauge_set_to_current_time(&self, name: &str, labels: &Labels) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0);
        self.gauge_set(name, now, labels);
    }
}

struct Family {
    #[allow(dead_code)]
    description: String,
    series: DashMap<String, f64>,
}

impl Family {
    fn new(description: &str) -> Self {
        Family {
            description: description.to_string(),
            series: DashMap::new(),
        }
    }
}

/// In-process backend holding metric families in concurrent maps.
///
/// Used by tests and by embedders that scrape values directly; `endpoint`
/// records the host:port the caller asked metrics to be served on.
pub struct MemoryBackend {
    endpoint: String,
    counters: DashMap<String, Family>,
    gauges: DashMap<String, Family>,
}

impl MemoryBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        info!(endpoint = %endpoint, "metrics collection enabled");
        MemoryBackend {
            endpoint,
            counters: DashMap::new(),
            gauges: DashMap::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current value of a counter series, if the family and series exist
    pub fn counter_value(&self, name: &str, labels: &Labels) -> Option<f64> {
        let family = self.counters.get(name)?;
        let value = family.series.get(&label_key(labels))?;
        Some(*value)
    }

    /// Current value of a gauge series, if the family and series exist
    pub fn gauge_value(&self, name: &str, labels: &Labels) -> Option<f64> {
        let family = self.gauges.get(name)?;
        let value = family.series.get(&label_key(labels))?;
        Some(*value)
    }
}

impl MetricsBackend for MemoryBackend {
    fn counter_create(&self, name: &str, description: &str) {
        self.counters
            .entry(name.to_string())
            .or_insert_with(|| Family::new(description));
    }

    fn counter_increment_by(&self, name: &str, value: f64, labels: &Labels) {
        // mutating an unregistered name is a silent no-op
        if let Some(family) = self.counters.get(name) {
            *family.series.entry(label_key(labels)).or_insert(0.0) += value;
        }
    }

    fn gauge_create(&self, name: &str, description: &str) {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(|| Family::new(description));
    }

    fn gauge_add(&self, name: &str, delta: f64, labels: &Labels) {
        if let Some(family) = self.gauges.get(name) {
            *family.series.entry(label_key(labels)).or_insert(0.0) += delta;
        }
    }

    fn gauge_set(&self, name: &str, value: f64, labels: &Labels) {
        if let Some(family) = self.gauges.get(name) {
            family.series.insert(label_key(labels), value);
        }
    }
}

impl<T: MetricsBackend + ?Sized> MetricsBackend for std::sync::Arc<T> {
    fn counter_create(&self, name: &str, description: &str) {
        (**self).counter_create(name, description);
    }

    fn counter_increment_by(&self, name: &str, value: f64, labels: &Labels) {
        (**self).counter_increment_by(name, value, labels);
    }

    fn gauge_create(&self, name: &str, description: &str) {
        (**self).gauge_create(name, description);
    }

    fn gauge_add(&self, name: &str, delta: f64, labels: &Labels) {
        (**self).gauge_add(name, delta, labels);
    }

    fn gauge_set(&self, name: &str, value: f64, labels: &Labels) {
        (**self).gauge_set(name, value, labels);
    }
}

/// Canonical series key: label pairs sorted by name.
fn label_key(labels: &Labels) -> String {
    let mut pairs: Vec<(&str, &str)> = labels
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    pairs.sort();
    let mut key = String::new();
    for (name, value) in pairs {
        if !key.is_empty() {
            key.push(',');
        }
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}
