//! # steward-types
//!
//! Primitives shared by the governance ledger and the execution ledger.
//!
//! Both ledgers are append-only and totally ordered by a logical clock
//! rather than wall-clock time. Keeping the clock, the `g<N>` token and the
//! chronological read view in one place means the two ledgers cannot drift
//! apart in how they order entries.
//!
//! - [`LogicalTime`]: a generation number, rendered as `g<N>` at the
//!   interchange boundary
//! - [`LogicalClock`]: the monotonic counter a ledger state carries
//! - [`Timestamped`] / [`chronological`]: the canonical read ordering
//! - [`TerminalOutcome`]: `executed` / `halted`, shared by both evaluators
//! - [`normalize_token`]: lenient parsing of enumeration tokens

#![deny(unsafe_code)]

pub mod error;
pub mod ordering;
pub mod outcome;
pub mod time;
pub mod token;

pub use error::{TokenError, TokenResult};
pub use ordering::{chronological, is_chronological, Timestamped};
pub use outcome::TerminalOutcome;
pub use time::{LogicalClock, LogicalTime};
pub use token::normalize_token;
