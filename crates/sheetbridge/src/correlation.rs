//! Request/reply correlation.
//!
//! Every outbound request gets a fresh id and an entry in the table. A reply
//! settles the entry with the same id, a timer settles it with
//! [`Error::Timeout`] otherwise. Whichever comes first removes the entry, so
//! late replies and late timers find nothing and are dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use serde_json::Value;
use sheetbridge_protocol::ContextHandle;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::deferred::Deferred;
use crate::error::{Error, Result};

/// What a pending request was sent as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Command,
    Render,
    Invoke,
    Service,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestKind::Command => "command",
            RequestKind::Render => "render",
            RequestKind::Invoke => "invoke",
            RequestKind::Service => "service",
        })
    }
}

/// Runs with the outcome just before the caller sees it
pub type SettleHook = Box<dyn FnOnce(&Result<Value>) + Send>;

struct PendingRequest {
    context: ContextHandle,
    kind: RequestKind,
    label: String,
    created_at: Instant,
    reply: oneshot::Sender<Result<Value>>,
    timer: Option<JoinHandle<()>>,
    hook: Option<SettleHook>,
}

impl PendingRequest {
    fn settle(self, id: u64, result: Result<Value>) {
        if let Some(timer) = self.timer {
            timer.abort();
        }
        debug!(
            id,
            kind = %self.kind,
            label = %self.label,
            ok = result.is_ok(),
            elapsed_ms = self.created_at.elapsed().as_millis() as u64,
            "request settled"
        );
        if let Some(hook) = self.hook {
            hook(&result);
        }
        // The caller may have dropped its Deferred
        let _ = self.reply.send(result);
    }
}

struct CorrelationTable {
    next_id: u64,
    pending: HashMap<u64, PendingRequest>,
}

/// Shared table of in-flight requests.
#[derive(Clone)]
pub struct Correlator {
    table: Arc<Mutex<CorrelationTable>>,
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(CorrelationTable {
                next_id: 1,
                pending: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CorrelationTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a request bound for `context` and arm its timer.
    ///
    /// The entry exists before this returns, so the message carrying the id
    /// may be posted right after.
    pub fn register(
        &self,
        context: ContextHandle,
        kind: RequestKind,
        label: impl Into<String>,
        timeout: Option<Duration>,
        hook: Option<SettleHook>,
    ) -> Result<(u64, Deferred)> {
        let runtime = match timeout {
            Some(_) => Some(Handle::try_current().map_err(|_| Error::NoRuntime)?),
            None => None,
        };

        let (tx, rx) = oneshot::channel();
        let label = label.into();
        let id = {
            let mut table = self.lock();
            let id = table.next_id;
            table.next_id += 1;
            table.pending.insert(
                id,
                PendingRequest {
                    context,
                    kind,
                    label: label.clone(),
                    created_at: Instant::now(),
                    reply: tx,
                    timer: None,
                    hook,
                },
            );
            id
        };

        if let (Some(timeout), Some(runtime)) = (timeout, runtime) {
            let weak = Arc::downgrade(&self.table);
            let timer = runtime.spawn(expire(weak, id, label, timeout));
            let mut table = self.lock();
            match table.pending.get_mut(&id) {
                Some(entry) => entry.timer = Some(timer),
                None => timer.abort(),
            }
        }

        Ok((id, Deferred::pending(rx)))
    }

    /// Settle request `id` with a reply from `from`.
    ///
    /// Returns false when no such request is pending or the reply came from
    /// a context other than the one the request was sent to.
    pub fn settle(&self, id: u64, from: &ContextHandle, result: Result<Value>) -> bool {
        let entry = {
            let mut table = self.lock();
            match table.pending.get(&id) {
                None => {
                    debug!(id, %from, "dropping reply for unknown request");
                    return false;
                }
                Some(entry) => {
                    if &entry.context != from {
                        debug!(id, %from, expected = %entry.context, "dropping reply from wrong context");
                        return false;
                    }
                }
            }
            table.pending.remove(&id)
        };
        match entry {
            Some(entry) => {
                entry.settle(id, result);
                true
            }
            None => false,
        }
    }

    /// Reject request `id` locally, e.g. when its message could not be posted
    pub fn fail(&self, id: u64, error: Error) -> bool {
        let entry = self.lock().pending.remove(&id);
        match entry {
            Some(entry) => {
                entry.settle(id, Err(error));
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: u64) -> bool {
        self.lock().pending.contains_key(&id)
    }
}

async fn expire(table: Weak<Mutex<CorrelationTable>>, id: u64, action: String, timeout: Duration) {
    tokio::time::sleep(timeout).await;
    let Some(table) = table.upgrade() else {
        return;
    };
    let entry = table
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pending
        .remove(&id);
    if let Some(mut entry) = entry {
        warn!(id, %action, ?timeout, "request timed out");
        // this task is the timer; nothing to abort
        entry.timer = None;
        entry.settle(id, Err(Error::Timeout { action, timeout }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn exec() -> ContextHandle {
        ContextHandle::new("exec")
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let correlator = Correlator::new();
        let (a, _da) = correlator
            .register(exec(), RequestKind::Command, "a", None, None)
            .unwrap();
        let (b, _db) = correlator
            .register(exec(), RequestKind::Command, "b", None, None)
            .unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(correlator.len(), 2);
    }

    #[tokio::test]
    async fn test_settle_resolves_once() {
        let correlator = Correlator::new();
        let (id, deferred) = correlator
            .register(exec(), RequestKind::Command, "cmd", None, None)
            .unwrap();

        assert!(correlator.settle(id, &exec(), Ok(json!(["Sheet1"]))));
        assert!(!correlator.settle(id, &exec(), Ok(json!("again"))));
        assert_eq!(deferred.await.unwrap(), json!(["Sheet1"]));
        assert!(correlator.is_empty());
    }

    #[tokio::test]
    async fn test_reply_from_wrong_context_is_dropped() {
        let correlator = Correlator::new();
        let (id, _deferred) = correlator
            .register(exec(), RequestKind::Command, "cmd", None, None)
            .unwrap();
        assert!(!correlator.settle(id, &ContextHandle::new("view"), Ok(Value::Null)));
        assert!(correlator.contains(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_rejects_and_removes_entry() {
        let correlator = Correlator::new();
        let (id, deferred) = correlator
            .register(
                exec(),
                RequestKind::Command,
                "slow",
                Some(Duration::from_millis(500)),
                None,
            )
            .unwrap();

        let err = deferred.await.unwrap_err();
        assert!(err.is_timeout());
        assert!(!correlator.contains(id));
        // late reply has nothing to settle
        assert!(!correlator.settle(id, &exec(), Ok(Value::Null)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_disarms_timer() {
        let correlator = Correlator::new();
        let (id, deferred) = correlator
            .register(
                exec(),
                RequestKind::Command,
                "fast",
                Some(Duration::from_millis(500)),
                None,
            )
            .unwrap();
        correlator.settle(id, &exec(), Ok(json!(1)));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(deferred.await.unwrap(), json!(1));
    }

    #[tokio::test]
    async fn test_hook_sees_outcome() {
        let correlator = Correlator::new();
        let seen = Arc::new(AtomicBool::new(false));
        let flag = seen.clone();
        let (id, deferred) = correlator
            .register(
                exec(),
                RequestKind::Render,
                "render",
                None,
                Some(Box::new(move |result: &Result<Value>| {
                    flag.store(result.is_err(), Ordering::SeqCst)
                })),
            )
            .unwrap();
        correlator.fail(id, Error::Transport("gone".into()));
        assert!(deferred.await.is_err());
        assert!(seen.load(Ordering::SeqCst));
    }

    #[test]
    fn test_timeout_requires_runtime() {
        let correlator = Correlator::new();
        let err = correlator
            .register(
                exec(),
                RequestKind::Command,
                "cmd",
                Some(Duration::from_secs(1)),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, Error::NoRuntime));
        assert!(correlator.is_empty());
    }
}
