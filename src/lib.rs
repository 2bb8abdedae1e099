//! Wallet authentication and transaction tracking for dapp hosts.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                  WALLET LINK                    │
//!                    │                                                 │
//!   extension wallet │  ┌───────────┐      ┌─────────┐                │
//!   ─────────────────┼─▶│ login::   │─────▶│ login:: │   ┌──────────┐ │
//!                    │  │ extension │      │ commit  │──▶│ provider │ │
//!   paired wallet    │  ├───────────┤      │         │   │ registry │ │
//!   ─────────────────┼─▶│ login::   │─────▶│ verify, │   └──────────┘ │
//!   (pairing channel)│  │ remote    │      │ event,  │                │
//!                    │  └───────────┘      │ redirect│                │
//!                    │        ▲            └─────────┘                │
//!                    │        │ one attempt at a time                 │
//!                    │  ┌───────────┐                                 │
//!                    │  │ login::   │                                 │
//!                    │  │ guard     │                                 │
//!                    │  └───────────┘                                 │
//!                    │                                                 │
//!   chain gateway    │  ┌─────────┐    ┌──────────┐    ┌───────────┐  │
//!   ─────────────────┼─▶│ chain   │◀───│ tracker  │───▶│ session   │  │
//!                    │  │ gateway │    │ (poll)   │    │ store     │  │
//!                    │  └─────────┘    └──────────┘    └───────────┘  │
//!                    │                                                 │
//!                    │  cross-cutting: config · observability ·        │
//!                    │                 lifecycle                       │
//!                    └────────────────────────────────────────────────┘
//! ```
//!
//! Login flows resolve an authenticated address (and optionally a signed
//! login token), install the provider in the registry, and emit a login
//! event. Independently, the tracker polls submitted transaction batches
//! until each settles, times out, or fails.

// Core subsystems
pub mod chain;
pub mod config;
pub mod login;
pub mod provider;
pub mod session;
pub mod tracker;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::WalletLinkConfig;
pub use lifecycle::Shutdown;
pub use login::{ExtensionLoginFlow, LoginContext, RemoteLoginFlow};
pub use provider::ProviderRegistry;
pub use session::SessionStore;
pub use tracker::BatchTracker;
