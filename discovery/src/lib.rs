//! Exploratory testing of a third-party voice agent.
//!
//! Places calls seeded with prompts, waits for the call system to report a
//! recording, transcribes and analyzes it, then follows the analysis's
//! suggested prompts to grow the test corpus. The crate is split like this:
//!
//! - **[`core`]**: Pure, deterministic logic (types, run ledger, budgets).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (call system HTTP API, OpenAI,
//!   config and result files). Behind traits so tests can script them.
//!
//! [`explore`] runs the recursive exploration over those traits and
//! [`session`] wires it to real clients and the notification receiver.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod explore;
pub mod io;
pub mod logging;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
