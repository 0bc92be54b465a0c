//! Per-key coalescing of concurrent identical requests.
//!
//! Without this, two requests with the same cache key that both miss the
//! cache each run a full generation. The first request for a key is
//! admitted as the leader; followers await the leader's payload instead of
//! regenerating. A leader that fails (or is dropped mid-flight) publishes a
//! failure so followers fall back to generating on their own.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Clone, Debug)]
enum InFlightState {
    Pending,
    Done(Value),
    Failed,
}

pub enum Admission {
    Leader(InFlightGuard),
    Follower(FollowerHandle),
}

#[derive(Default)]
pub struct InFlightRegistry {
    inner: Mutex<HashMap<String, watch::Receiver<InFlightState>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a request for a key: the first caller becomes the leader,
    /// everyone else a follower of that leader's result.
    pub fn admit(self: &Arc<Self>, key: &str) -> Admission {
        let mut map = match self.inner.lock() {
            Ok(map) => map,
            // A poisoned registry just means no coalescing
            Err(_) => {
                let (_, rx) = watch::channel(InFlightState::Failed);
                return Admission::Follower(FollowerHandle { rx });
            }
        };

        if let Some(rx) = map.get(key) {
            return Admission::Follower(FollowerHandle { rx: rx.clone() });
        }

        let (tx, rx) = watch::channel(InFlightState::Pending);
        map.insert(key.to_string(), rx);
        Admission::Leader(InFlightGuard {
            key: key.to_string(),
            registry: Arc::clone(self),
            tx: Some(tx),
        })
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(key);
        }
    }
}

/// Held by the leader for the duration of generation.
pub struct InFlightGuard {
    key: String,
    registry: Arc<InFlightRegistry>,
    tx: Option<watch::Sender<InFlightState>>,
}

impl InFlightGuard {
    /// Publish the generated payload to all followers and release the key.
    pub fn complete(mut self, payload: Value) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(InFlightState::Done(payload));
        }
        self.registry.remove(&self.key);
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(InFlightState::Failed);
            self.registry.remove(&self.key);
        }
    }
}

pub struct FollowerHandle {
    rx: watch::Receiver<InFlightState>,
}

impl FollowerHandle {
    /// Wait for the leader's payload. `None` means the leader failed and
    /// the follower should generate on its own.
    pub async fn wait(mut self) -> Option<Value> {
        loop {
            match self.rx.borrow().clone() {
                InFlightState::Done(payload) => return Some(payload),
                InFlightState::Failed => return None,
                InFlightState::Pending => {}
            }
            if self.rx.changed().await.is_err() {
                return match self.rx.borrow().clone() {
                    InFlightState::Done(payload) => Some(payload),
                    _ => None,
                };
            }
        }
    }
}
