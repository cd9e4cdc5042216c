//! Tracing setup for the discovery binary.
//!
//! Stderr is the only place lifecycle failures surface: a prompt that fails is
//! logged with its stage and left out of the results file, so the log is how
//! a run is audited afterwards.
//!
//! At the default level each prompt produces one `testing ... scenario` line
//! once it is claimed, then either `scenario discovered` or
//! `abandoning scenario` with `stage` and `error` fields. Limit hits show up
//! as `skipping scenario`. `debug` adds poll progress, dedup hits and request
//! spans from the HTTP clients; `tower_http=debug` traces each inbound
//! notification.

use tracing_subscriber::EnvFilter;

/// Crates logged at `info` when `RUST_LOG` is unset. Everything else stays at
/// the subscriber's default of `error`.
const DEFAULT_FILTER: &str = "voice_discovery=info,webhook=info";

/// Install the global subscriber. Call once, before the first event.
///
/// ```bash
/// RUST_LOG=voice_discovery=debug,tower_http=debug voice-discovery run
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
