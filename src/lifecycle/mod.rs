//! Lifecycle management subsystem.
//!
//! The only long-running task in this crate is the transaction polling
//! loop; `shutdown.rs` provides the stop signal it selects on.

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownListener};
