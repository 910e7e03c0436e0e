//! Poll-to-active state machine for a single droplet.
//!
//! ```text
//!   Unknown ──poll──► Pending ──poll──► Active   (return droplet)
//!                       │  ▲
//!                       └──┘ sleep interval
//!                       │
//!                       ├──poll──► Error     (DropletFailed, no further polls)
//!                       └─budget─► TimedOut  (Timeout)
//! ```
//!
//! Time is read and slept through a [`Clock`] so tests can drive the loop
//! without real delays.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::providers::{DoError, DropletApi};

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default overall wait budget.
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 300;

/// Source of time for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Block the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio's timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Observed lifecycle state of a droplet being waited on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Not polled yet.
    Unknown,
    /// Any remote status other than `active` or `error`.
    Pending(String),
    /// Remote status `active`.
    Active,
    /// Remote status `error`.
    Error,
    /// Budget exhausted while pending. Never reported by the API.
    TimedOut,
}

impl PollState {
    /// Classify a remote status string.
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status {
            "active" => Self::Active,
            "error" => Self::Error,
            other => Self::Pending(other.to_string()),
        }
    }

    /// Whether polling stops in this state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Active | Self::Error | Self::TimedOut)
    }
}

/// Poll timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Pause between polls.
    pub interval: Duration,
    /// Overall budget measured from the first poll.
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
        }
    }
}

/// Wait for a droplet to become `active`.
///
/// Polls [`DropletApi::get_droplet`] while the elapsed time is under
/// `options.timeout`, sleeping `options.interval` between polls.
///
/// # Errors
/// - [`DoError::DropletFailed`] as soon as the droplet reports `error`
/// - [`DoError::Timeout`] when the budget runs out while still pending
/// - any error from the underlying fetch, unchanged
pub async fn wait_for_active(
    api: &dyn DropletApi,
    clock: &dyn Clock,
    droplet_id: u64,
    options: WaitOptions,
) -> Result<Value, DoError> {
    info!(
        droplet_id,
        timeout_secs = options.timeout.as_secs(),
        "Waiting for droplet to become active"
    );

    let start = clock.now();
    let mut state = PollState::Unknown;

    while clock.now().duration_since(start) < options.timeout {
        let droplet = api.get_droplet(droplet_id).await?;
        let status = droplet
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default();
        state = PollState::from_status(status);

        debug!(
            droplet_id,
            status = %status,
            elapsed_secs = clock.now().duration_since(start).as_secs(),
            "Polling droplet status"
        );

        match state {
            PollState::Active => {
                info!(droplet_id, "Droplet is active");
                return Ok(droplet);
            }
            PollState::Error => {
                warn!(droplet_id, "Droplet entered error state");
                return Err(DoError::DropletFailed { droplet_id });
            }
            _ => clock.sleep(options.interval).await,
        }
    }

    debug!(droplet_id, last_state = ?state, "Wait budget exhausted");
    Err(DoError::Timeout {
        droplet_id,
        seconds: options.timeout.as_secs(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted fakes shared by the workflow tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::providers::digitalocean::CreateDropletRequest;

    /// Clock that only advances when slept on.
    pub struct ManualClock {
        start: Instant,
        elapsed: Mutex<Duration>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                start: Instant::now(),
                elapsed: Mutex::new(Duration::ZERO),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + *self.elapsed.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            *self.elapsed.lock().unwrap() += duration;
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    /// Provider whose droplet status follows a script.
    ///
    /// Once the script runs dry the last status repeats.
    pub struct ScriptedApi {
        statuses: Mutex<VecDeque<String>>,
        last: Mutex<String>,
        polls: Mutex<usize>,
        pub snapshot: Option<Value>,
        pub sizes: Vec<Value>,
        pub sizes_unavailable: bool,
        pub created: Mutex<Vec<CreateDropletRequest>>,
    }

    impl ScriptedApi {
        pub fn new(statuses: &[&str]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().map(|s| (*s).to_string()).collect()),
                last: Mutex::new("new".to_string()),
                polls: Mutex::new(0),
                snapshot: Some(serde_json::json!({"id": 42, "name": "gpu-base"})),
                sizes: Vec::new(),
                sizes_unavailable: false,
                created: Mutex::new(Vec::new()),
            }
        }

        pub fn polls(&self) -> usize {
            *self.polls.lock().unwrap()
        }
    }

    #[async_trait]
    impl DropletApi for ScriptedApi {
        async fn list_regions(&self) -> Result<Vec<Value>, DoError> {
            Ok(Vec::new())
        }

        async fn list_sizes(&self) -> Result<Vec<Value>, DoError> {
            if self.sizes_unavailable {
                return Err(DoError::Api {
                    status: 503,
                    message: "sizes unavailable".to_string(),
                });
            }
            Ok(self.sizes.clone())
        }

        async fn list_images(&self) -> Result<Vec<Value>, DoError> {
            Ok(Vec::new())
        }

        async fn get_snapshot(&self, snapshot_id: &str) -> Result<Value, DoError> {
            self.snapshot.clone().ok_or_else(|| DoError::Api {
                status: 404,
                message: format!("snapshot {snapshot_id} not found"),
            })
        }

        async fn list_droplets(&self) -> Result<Vec<Value>, DoError> {
            Ok(Vec::new())
        }

        async fn get_droplet(&self, droplet_id: u64) -> Result<Value, DoError> {
            *self.polls.lock().unwrap() += 1;
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.statuses.lock().unwrap().pop_front() {
                *last = next;
            }
            Ok(serde_json::json!({"id": droplet_id, "status": last.clone()}))
        }

        async fn create_droplet(&self, req: &CreateDropletRequest) -> Result<Value, DoError> {
            self.created.lock().unwrap().push(req.clone());
            Ok(serde_json::json!({"id": 777, "name": req.name, "status": "new"}))
        }

        async fn delete_droplet(&self, _droplet_id: u64) -> Result<Value, DoError> {
            Ok(serde_json::json!({}))
        }

        async fn list_ssh_keys(&self) -> Result<Vec<Value>, DoError> {
            Ok(Vec::new())
        }

        async fn get_account(&self) -> Result<Value, DoError> {
            Ok(serde_json::json!({}))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ManualClock, ScriptedApi};
    use super::*;

    #[test]
    fn test_state_from_status() {
        assert_eq!(PollState::from_status("active"), PollState::Active);
        assert_eq!(PollState::from_status("error"), PollState::Error);
        assert_eq!(
            PollState::from_status("new"),
            PollState::Pending("new".to_string())
        );
        assert!(!PollState::Unknown.is_terminal());
        assert!(!PollState::from_status("off").is_terminal());
        assert!(PollState::TimedOut.is_terminal());
    }

    #[tokio::test]
    async fn test_becomes_active_on_third_poll() {
        let api = ScriptedApi::new(&["new", "new", "active"]);
        let clock = ManualClock::new();

        let droplet = wait_for_active(&api, &clock, 7, WaitOptions::default())
            .await
            .unwrap();

        assert_eq!(droplet["status"], "active");
        assert_eq!(api.polls(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 2]);
    }

    #[tokio::test]
    async fn test_error_status_stops_polling() {
        let api = ScriptedApi::new(&["new", "error", "active"]);
        let clock = ManualClock::new();

        let err = wait_for_active(&api, &clock, 7, WaitOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DoError::DropletFailed { droplet_id: 7 }));
        assert_eq!(api.polls(), 2);
    }

    #[tokio::test]
    async fn test_times_out_while_pending() {
        let api = ScriptedApi::new(&["new"]);
        let clock = ManualClock::new();
        let options = WaitOptions {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(20),
        };

        let err = wait_for_active(&api, &clock, 7, options).await.unwrap_err();

        assert!(matches!(
            err,
            DoError::Timeout {
                droplet_id: 7,
                seconds: 20
            }
        ));
        assert_eq!(api.polls(), 4);
        assert_eq!(
            err.to_string(),
            "Droplet 7 did not become active within 20 seconds"
        );
    }

    #[test]
    fn test_timeout_and_failure_messages_differ() {
        let failed = DoError::DropletFailed { droplet_id: 1 }.to_string();
        let timed_out = DoError::Timeout {
            droplet_id: 1,
            seconds: 300,
        }
        .to_string();
        assert_ne!(failed, timed_out);
        assert_eq!(failed, "Droplet 1 entered error state");
    }
}
