//! # metricsd
//!
//! A fire-and-forget StatsD client for Rust.
//!
//! ## Features
//!
//! - **Plain StatsD wire format**: counters (`c`), gauges (`g`) and timers (`ms`)
//! - **Sampling**: `|@rate` lines sent with the configured probability
//! - **Per-thread sockets**: each thread owns its UDP socket, created on first send
//! - **Scoped batching**: multiple stat lines coalesced into `\n`-joined datagrams
//! - **Error containment**: network failures are logged through `tracing`, never returned
//!
//! ## Quick Start
//!
//! ```no_run
//! use metricsd::{Client, ClientOptions, Metrics};
//!
//! let client = Client::new(ClientOptions {
//!     host: "127.0.0.1".to_string(),
//!     port: 8125,
//!     namespace: Some("myapp".to_string()),
//!     ..ClientOptions::default()
//! });
//!
//! client.increment("request.count");
//! client.decrement_sampled("queue.depth", 0.5);
//! client.gauge("connections.active", 100);
//! client.timer("request.latency", 42);
//!
//! let body = client.timed("render", || "<html/>");
//!
//! client.batch(|batch| {
//!     batch.set_batch_size(3);
//!     for _ in 0..5 {
//!         batch.increment("jobs.done");
//!     }
//! });
//! ```

// #![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

// https://github.com/statsd/statsd/blob/master/docs/metric_types.md
mod error;
mod statsd;

pub use error::MetricsError;
pub use statsd::batch::Batch;
pub use statsd::client::{
    Client, ClientOptions, Metrics, DEFAULT_BATCH_SIZE, DEFAULT_HOST, DEFAULT_PORT,
};
pub use statsd::sampling::{RandomSource, ThreadRandom, FULL_SAMPLE_RATE};
pub use statsd::transport::{Transport, TransportFactory, UdpTransport, UdpTransportFactory};
pub use statsd::value::IntoStatValue;
pub use statsd::{Delivery, MetricType};

/// Result type for metric operations.
///
/// Only argument validation surfaces as an error; network failures are
/// contained inside the client.
pub type MetricResult<T> = Result<T, MetricsError>;
