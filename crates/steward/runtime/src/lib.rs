//! # steward-runtime
//!
//! Host-side wiring around the pure ledger crates.
//!
//! ## Core Components
//!
//! - **StewardConfig**: TOML configuration for the charter, execution
//!   policy and telemetry
//! - **telemetry**: `tracing-subscriber` setup honouring `RUST_LOG`
//! - **LedgerHandle**: serializes appends to a shared ledger state and
//!   hands out snapshots for concurrent readers
//! - **EvaluationCache**: memoizes governance evaluation per state
//! - **LedgerSnapshot**: the JSON serialize/restore boundary
//! - **Steward**: facade over both ledgers built from a config

#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod handle;
pub mod snapshot;
pub mod steward;
pub mod telemetry;

pub use cache::EvaluationCache;
pub use config::{CharterConfig, ExecutionConfig, StewardConfig, TelemetryConfig, CONFIG_ENV};
pub use error::{RuntimeError, RuntimeResult};
pub use handle::LedgerHandle;
pub use snapshot::LedgerSnapshot;
pub use steward::Steward;
pub use telemetry::init_tracing;
