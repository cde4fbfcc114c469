//! Backend health monitor
//!
//! Probes `/api/health` on a fixed interval and publishes the result on a
//! watch channel. Independent of other traffic; each probe is bounded by
//! its own timeout.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dailytrack_domain::HealthConfig;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::commands::TrackerApi;

type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Last observed backend state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Connected,
    Error,
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendStatus::Unknown => "unknown",
            BackendStatus::Connected => "connected",
            BackendStatus::Error => "error",
        })
    }
}

/// Configuration for the health monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthMonitorConfig {
    pub interval: Duration,
    pub probe_timeout: Duration,
}

impl From<&HealthConfig> for HealthMonitorConfig {
    fn from(config: &HealthConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_seconds.max(1)),
            probe_timeout: Duration::from_secs(config.timeout_seconds.max(1)),
        }
    }
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self::from(&HealthConfig::default())
    }
}

/// Periodic backend probe with start/stop lifecycle
pub struct HealthMonitor {
    api: Arc<TrackerApi>,
    config: HealthMonitorConfig,
    status: Arc<watch::Sender<BackendStatus>>,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl HealthMonitor {
    pub fn new(api: Arc<TrackerApi>, config: HealthMonitorConfig) -> Self {
        let (status, _) = watch::channel(BackendStatus::Unknown);
        Self {
            api,
            config,
            status: Arc::new(status),
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Current status without waiting for the next probe.
    pub fn status(&self) -> BackendStatus {
        *self.status.borrow()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<BackendStatus> {
        self.status.subscribe()
    }

    /// Run one probe now and publish its result.
    pub async fn probe(&self) -> BackendStatus {
        Self::probe_once(&self.api, self.config.probe_timeout, &self.status).await
    }

    /// Start polling: one probe immediately, then one per interval.
    ///
    /// # Errors
    ///
    /// Returns error if the monitor is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), String> {
        if self.is_running().await {
            return Err("Health monitor already running".to_string());
        }

        // fresh token so a stopped monitor can be restarted
        self.cancellation_token = CancellationToken::new();

        let api = Arc::clone(&self.api);
        let status = Arc::clone(&self.status);
        let config = self.config;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::poll_loop(api, config, status, cancel).await;
        });
        *self.task_handle.lock().await = Some(handle);

        info!(interval = ?self.config.interval, "Health monitor started");
        Ok(())
    }

    /// Stop polling and wait for the task to finish.
    ///
    /// # Errors
    ///
    /// Returns error if the monitor is not running or the task does not
    /// finish within five seconds
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), String> {
        if !self.is_running().await {
            return Err("Health monitor not running".to_string());
        }

        self.cancellation_token.cancel();

        let Some(handle) = self.task_handle.lock().await.take() else {
            return Ok(());
        };
        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "Health poll task panicked");
                return Err(format!("Health poll task panicked: {e}"));
            }
            Err(_) => {
                warn!(timeout = ?STOP_TIMEOUT, "Health poll task did not finish in time");
                return Err("Health poll task did not finish in time".to_string());
            }
        }

        info!("Health monitor stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.task_handle.lock().await.is_some()
    }

    async fn poll_loop(
        api: Arc<TrackerApi>,
        config: HealthMonitorConfig,
        status: Arc<watch::Sender<BackendStatus>>,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // first tick fires immediately
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = Self::probe_once(&api, config.probe_timeout, &status) => {}
                    }
                }
            }
        }
        debug!("Health poll loop exited");
    }

    async fn probe_once(
        api: &TrackerApi,
        timeout: Duration,
        status: &watch::Sender<BackendStatus>,
    ) -> BackendStatus {
        let next = match tokio::time::timeout(timeout, api.health()).await {
            Ok(Ok(true)) => BackendStatus::Connected,
            Ok(Ok(false)) => BackendStatus::Error,
            Ok(Err(e)) => {
                debug!(error = %e, "Health probe failed");
                BackendStatus::Error
            }
            Err(_) => {
                debug!(?timeout, "Health probe timed out");
                BackendStatus::Error
            }
        };

        let previous = status.send_replace(next);
        if previous != next {
            info!(%previous, current = %next, "Backend status changed");
        }
        next
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            self.cancellation_token.cancel();
        }
    }
}
