//! Deferred, one-shot host shutdown.
//!
//! Scheduling a [`DeferredAction`] broadcasts its warning to every active
//! region right away, then arms a tokio timer. When the timer elapses the
//! host is told to shut down. The caller is never told about the outcome.
//!
//! ```text
//! Idle ──schedule──▶ Scheduled ──delay elapsed──▶ Fired ──▶ host shutdown
//! ```
//!
//! Concurrent schedules are governed by [`ShutdownPolicy`]. Under `Stack`
//! every request arms its own timer and each eventually fires; under
//! `Replace` only the most recent request stays armed.

use crate::host::{broadcast_to_all, HostControl, HostServices, RegionDirectory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How a new shutdown request interacts with one that is still pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPolicy {
    /// Every request arms an independent timer.
    #[default]
    Stack,
    /// A new request aborts the pending one and takes its place.
    Replace,
}

impl FromStr for ShutdownPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stack" => Ok(ShutdownPolicy::Stack),
            "replace" => Ok(ShutdownPolicy::Replace),
            other => Err(format!(
                "Invalid shutdown policy: {other}. Must be one of: [\"stack\", \"replace\"]"
            )),
        }
    }
}

impl fmt::Display for ShutdownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownPolicy::Stack => f.write_str("stack"),
            ShutdownPolicy::Replace => f.write_str("replace"),
        }
    }
}

/// A warning broadcast now, followed by a shutdown after `delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredAction {
    pub delay: Duration,
    pub warning: String,
}

/// Observable state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scheduled,
    Fired,
}

/// Decrements the pending counter when the timer task finishes or is aborted.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Clone)]
pub struct DeferredActionScheduler {
    regions: Arc<dyn RegionDirectory>,
    control: Arc<dyn HostControl>,
    policy: ShutdownPolicy,
    pending: Arc<AtomicUsize>,
    fired: Arc<AtomicBool>,
    slot: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl DeferredActionScheduler {
    pub fn new(services: &HostServices, policy: ShutdownPolicy) -> Self {
        Self {
            regions: services.regions.clone(),
            control: services.control.clone(),
            policy,
            pending: Arc::new(AtomicUsize::new(0)),
            fired: Arc::new(AtomicBool::new(false)),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn policy(&self) -> ShutdownPolicy {
        self.policy
    }

    /// Number of armed timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SchedulerState {
        if self.pending() > 0 {
            SchedulerState::Scheduled
        } else if self.fired.load(Ordering::Acquire) {
            SchedulerState::Fired
        } else {
            SchedulerState::Idle
        }
    }

    /// Broadcasts the warning and arms the timer. Returns without waiting for the delay.
    pub async fn schedule(&self, action: DeferredAction) {
        let reached = broadcast_to_all(self.regions.as_ref(), &action.warning).await;
        debug!("📢 Shutdown warning delivered to {} region(s)", reached);

        let previous = self.pending.fetch_add(1, Ordering::AcqRel);
        let guard = PendingGuard(self.pending.clone());
        let control = self.control.clone();
        let fired = self.fired.clone();
        let delay = action.delay;

        let task = async move {
            let _guard = guard;
            tokio::time::sleep(delay).await;
            info!("🛑 Deferred shutdown timer elapsed after {:?}, shutting down host", delay);
            fired.store(true, Ordering::Release);
            control.shutdown().await;
        };

        match self.policy {
            ShutdownPolicy::Stack => {
                if previous > 0 {
                    warn!(
                        "⚠️ Shutdown scheduled while {} other shutdown(s) are pending; each will fire",
                        previous
                    );
                }
                tokio::spawn(task);
            }
            ShutdownPolicy::Replace => {
                let handle = tokio::spawn(task);
                let replaced = match self.slot.lock() {
                    Ok(mut slot) => slot.replace(handle),
                    Err(poisoned) => poisoned.into_inner().replace(handle),
                };
                if let Some(old) = replaced {
                    if !old.is_finished() {
                        warn!("⚠️ Replacing pending shutdown with a new one firing in {:?}", delay);
                        old.abort();
                    }
                }
            }
        }

        info!("⏳ Host shutdown scheduled in {:?}", delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("stack".parse::<ShutdownPolicy>().unwrap(), ShutdownPolicy::Stack);
        assert_eq!("replace".parse::<ShutdownPolicy>().unwrap(), ShutdownPolicy::Replace);
        assert!("queue".parse::<ShutdownPolicy>().is_err());
        assert_eq!(ShutdownPolicy::default(), ShutdownPolicy::Stack);
        assert_eq!(ShutdownPolicy::Replace.to_string(), "replace");
    }
}
