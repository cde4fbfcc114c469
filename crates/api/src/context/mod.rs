//! Application context - dependency injection container

use std::path::PathBuf;
use std::sync::Arc;

use dailytrack_core::{InMemorySessionStorage, SessionStorage, SessionStore};
use dailytrack_domain::{Config, OrgChart, Result, TrackerError};
use dailytrack_infra::{
    ApiClient, ApiClientConfig, BackendStatus, FileSessionStorage, HealthMonitor,
    HealthMonitorConfig, TrackerApi,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::controller::ViewController;
use crate::utils::health::{ComponentHealth, StatusReport};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api_client: Arc<ApiClient>,
    pub api: Arc<TrackerApi>,
    pub org_chart: Arc<OrgChart>,
    pub controller: Arc<ViewController>,
    health_monitor: Mutex<HealthMonitor>,
}

impl AppContext {
    /// Create a context from the probed config file and environment.
    pub async fn new() -> Result<Self> {
        let config = dailytrack_infra::config::load()?;
        Self::new_with_config(config).await
    }

    /// Create a context with custom configuration
    pub async fn new_with_config(config: Config) -> Result<Self> {
        Self::new_with_launch_url(config, None).await
    }

    /// Create a context, opening the reset screen when `launch_url` carries
    /// a reset token and nobody is signed in.
    pub async fn new_with_launch_url(config: Config, launch_url: Option<&str>) -> Result<Self> {
        let storage = session_storage(&config);
        let session = Arc::new(SessionStore::new(storage));
        session.restore().await;

        let client_config = ApiClientConfig::from_api_config(&config.api);
        if client_config.base_url.is_empty() {
            return Err(TrackerError::Config(format!(
                "cannot derive an API base from origin {:?}",
                config.api.origin
            )));
        }
        let api_client = Arc::new(
            ApiClient::new(client_config, Arc::clone(&session)).map_err(TrackerError::from)?,
        );
        let api = Arc::new(TrackerApi::new(Arc::clone(&api_client)));
        let org_chart = Arc::new(OrgChart::builtin().clone());

        let controller = Arc::new(ViewController::new(
            Arc::clone(&session),
            Arc::clone(&api),
            Arc::clone(&org_chart),
            launch_url,
        ));
        let health_monitor =
            HealthMonitor::new(Arc::clone(&api), HealthMonitorConfig::from(&config.health));

        info!(
            api_base = %api_client.base_url(),
            signed_in = session.is_authenticated(),
            "App context ready"
        );

        Ok(Self {
            config,
            session,
            api_client,
            api,
            org_chart,
            controller,
            health_monitor: Mutex::new(health_monitor),
        })
    }

    /// Start background polling when enabled in config.
    ///
    /// # Errors
    ///
    /// Returns error if the health monitor is already running
    pub async fn start_background(&self) -> Result<()> {
        if !self.config.health.enabled {
            info!("Health monitor disabled");
            return Ok(());
        }
        self.health_monitor.lock().await.start().await.map_err(TrackerError::Internal)
    }

    pub async fn backend_status(&self) -> BackendStatus {
        self.health_monitor.lock().await.status()
    }

    /// Probe the backend once, outside the polling schedule.
    pub async fn probe_backend(&self) -> BackendStatus {
        self.health_monitor.lock().await.probe().await
    }

    pub async fn status_report(&self) -> StatusReport {
        let backend = self.backend_status().await;
        let mut report = StatusReport::new(self.api_client.base_url(), backend.to_string());

        report = report.with_component(match backend {
            BackendStatus::Connected => ComponentHealth::healthy("backend"),
            BackendStatus::Unknown => ComponentHealth::unhealthy("backend", "not probed yet"),
            BackendStatus::Error => ComponentHealth::unhealthy("backend", "unreachable"),
        });

        match self.session.current_user() {
            Some(user) => {
                report.signed_in_as = Some(user.email.clone());
                report.role = Some(user.role.to_string());
                report = report.with_component(ComponentHealth::healthy("session"));
            }
            None => {
                report = report.with_component(ComponentHealth::unhealthy("session", "signed out"));
            }
        }
        report
    }

    /// Stop background work.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");
        let mut monitor = self.health_monitor.lock().await;
        if monitor.is_running().await {
            if let Err(e) = monitor.stop().await {
                warn!(error = %e, "Health monitor did not stop cleanly");
                return Err(TrackerError::Internal(e));
            }
        }
        Ok(())
    }
}

fn session_storage(config: &Config) -> Arc<dyn SessionStorage> {
    match config.session.storage_path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => {
            info!(path, "Persisting session to file");
            Arc::new(FileSessionStorage::new(PathBuf::from(path)))
        }
        None => {
            info!("Session kept in memory");
            Arc::new(InMemorySessionStorage::new())
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("api_base", &self.api_client.base_url())
            .finish_non_exhaustive()
    }
}
