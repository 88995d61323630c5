//! Metrics collection interface for the drachtio SIP server
//!
//! The server reports named counters and gauges, each keyed by a label
//! mapping, through a [`StatsCollector`]. Collection is off by default:
//! until the caller supplies an explicit metrics endpoint and installs a
//! backend for it, every operation is a no-op. The configuration document
//! never enables metrics; only the hosting process does.
//!
//! The concrete exporter lives behind [`MetricsBackend`]; a
//! [`MemoryBackend`] is provided for tests and for embedders that scrape
//! values in-process.

pub mod collector;

pub use collector::{Labels, MemoryBackend, MetricsBackend, StatsCollector};
