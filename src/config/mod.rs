//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → WalletLinkConfig (validated, immutable)
//!     → shared via Arc / cloned sections to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::LoginConfig;
pub use schema::NetworkConfig;
pub use schema::TrackerConfig;
pub use schema::WalletLinkConfig;
