//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (host, product, route, stage) rather than formatted strings
//! - Request ID comes from the HTTP layer and rides on the trace span
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
