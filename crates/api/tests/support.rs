//! Shared helpers for `dailytrack-app` integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use dailytrack_core::{InMemorySessionStorage, LoginGrant, SessionStorage, SessionStore};
use dailytrack_domain::{Identity, OrgChart, Role};
use dailytrack_infra::{ApiClient, ApiClientConfig, TrackerApi};
use dailytrack_lib::ViewController;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Mock backend plus a controller wired to it.
pub struct Harness {
    pub server: MockServer,
    pub session: Arc<SessionStore>,
    pub storage: Arc<InMemorySessionStorage>,
    pub controller: ViewController,
}

impl Harness {
    /// Nobody signed in; `launch_url` picks the login screen.
    pub async fn signed_out(launch_url: Option<&str>) -> Self {
        Self::build(None, launch_url).await
    }

    /// `user` signed in with tokens `"access"` and `"refresh"`.
    pub async fn signed_in(user: Identity) -> Self {
        Self::build(Some(user), None).await
    }

    async fn build(user: Option<Identity>, launch_url: Option<&str>) -> Self {
        let server = MockServer::start().await;
        let storage = Arc::new(InMemorySessionStorage::new());
        let session = Arc::new(SessionStore::new(storage.clone() as Arc<dyn SessionStorage>));
        if let Some(user) = user {
            session
                .start(LoginGrant {
                    access_token: "access".to_string(),
                    refresh_token: Some("refresh".to_string()),
                    user,
                })
                .await
                .expect("session should start");
        }

        let config = ApiClientConfig { base_url: server.uri(), ..Default::default() };
        let client =
            Arc::new(ApiClient::new(config, Arc::clone(&session)).expect("api client"));
        let api = Arc::new(TrackerApi::new(client));
        let chart = Arc::new(OrgChart::builtin().clone());
        let controller = ViewController::new(Arc::clone(&session), api, chart, launch_url);

        Self { server, session, storage, controller }
    }

    pub async fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).await.expect("in-memory storage never fails")
    }
}

pub fn identity(email: &str, role: Role) -> Identity {
    Identity { id: "7".to_string(), email: email.to_string(), name: None, role }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Activity row as the backend sends it.
pub fn row(email: &str, pod: &str, submitted_at: &str, hours: f64) -> Value {
    json!({
        "id": format!("{email}-{submitted_at}"),
        "email": email,
        "podName": pod,
        "product": "aims",
        "projectName": "Grid",
        "natureOfWork": "Production",
        "task": "Digitising",
        "dedicatedHours": hours,
        "submittedAt": submitted_at,
    })
}

pub fn data(rows: Vec<Value>) -> Value {
    json!({ "data": rows })
}
