//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging through the tracing crate; every subsystem logs
//!   with field syntax so events are machine-parseable
//! - Log level configurable via config and the `RUST_LOG` environment
//!   variable

pub mod logging;
