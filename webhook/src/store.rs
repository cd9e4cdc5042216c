//! Last-write-wins call status storage.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier assigned by the remote call system when a call starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read an id as the call system sends it on the wire.
    ///
    /// Strings are taken as is and numbers in their decimal form, so a call
    /// started as `4001` and notified as `"4001"` map to the same id. Empty
    /// strings and any other JSON type yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(id) if !id.is_empty() => Some(Self(id.clone())),
            Value::Number(id) => Some(Self(id.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CallId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CallId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Status carried by the most recent notification for a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStatus {
    /// Remote call state as reported (e.g. `ringing`, `completed`).
    pub status: Option<String>,
    pub recording_available: bool,
}

impl CallStatus {
    pub fn new(status: impl Into<String>, recording_available: bool) -> Self {
        Self {
            status: Some(status.into()),
            recording_available,
        }
    }
}

/// Thread-safe map from [`CallId`] to the last received [`CallStatus`].
///
/// Every `record` replaces the previous entry wholesale; notifications are not
/// merged and arrival order is the only ordering. Entries live as long as the
/// store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    inner: Arc<Mutex<HashMap<CallId, CallStatus>>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the status for `call_id`.
    pub fn record(&self, call_id: CallId, status: CallStatus) {
        self.lock().insert(call_id, status);
    }

    /// Snapshot of the current status, or `None` if no notification arrived yet.
    pub fn read(&self, call_id: &CallId) -> Option<CallStatus> {
        self.lock().get(call_id).cloned()
    }

    /// True once a notification for `call_id` reported an available recording.
    pub fn recording_available(&self, call_id: &CallId) -> bool {
        self.lock()
            .get(call_id)
            .is_some_and(|status| status.recording_available)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock can only interrupt a single insert, so
    // the map is still consistent and the poison flag is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<CallId, CallStatus>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
