//! Stable exit codes for the discovery CLI.

/// Command succeeded. Individual scenario failures do not change this.
pub const OK: i32 = 0;
/// Invalid configuration, missing credentials, or results could not be written.
pub const INVALID: i32 = 1;
