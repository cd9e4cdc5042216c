//! Notification receiver for call-state webhooks.
//!
//! The remote call system pushes `{id, status, recording_available}` payloads
//! whenever a call changes state. This crate keeps the latest payload per call
//! in a [`store::NotificationStore`] and serves the endpoint that fills it:
//!
//! - **[`store`]**: Last-write-wins map from call id to status. Shared between
//!   the HTTP handlers (writers) and whoever waits on a recording (reader).
//! - **[`routes`]**: Axum router with the `/webhook` and `/health` endpoints.
//! - **[`server`]**: Bind, serve, and shut the receiver down.

pub mod routes;
pub mod server;
pub mod state;
pub mod store;
