//! Shared helpers for `dailytrack-infra` integration tests.

use std::sync::Arc;

use dailytrack_core::{InMemorySessionStorage, LoginGrant, SessionStorage, SessionStore};
use dailytrack_domain::{Identity, Role};
use dailytrack_infra::api::{ApiClient, ApiClientConfig, TrackerApi};
use wiremock::MockServer;

/// Session store over in-memory storage, with the storage handle kept so
/// tests can inspect what was persisted.
pub struct TestSession {
    pub store: Arc<SessionStore>,
    pub storage: Arc<InMemorySessionStorage>,
}

impl TestSession {
    pub fn empty() -> Self {
        let storage = Arc::new(InMemorySessionStorage::new());
        let store = Arc::new(SessionStore::new(storage.clone() as Arc<dyn SessionStorage>));
        Self { store, storage }
    }

    /// Signed-in session with the given tokens.
    pub async fn signed_in(access: &str, refresh: Option<&str>) -> Self {
        let session = Self::empty();
        session
            .store
            .start(LoginGrant {
                access_token: access.to_string(),
                refresh_token: refresh.map(str::to_string),
                user: identity("a@corp.io", Role::User),
            })
            .await
            .expect("session should start");
        session
    }

    pub async fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).await.expect("in-memory storage never fails")
    }
}

pub fn identity(email: &str, role: Role) -> Identity {
    Identity { id: "7".to_string(), email: email.to_string(), name: None, role }
}

pub fn client_for(server: &MockServer, session: &TestSession) -> Arc<ApiClient> {
    let config = ApiClientConfig { base_url: server.uri(), ..Default::default() };
    Arc::new(ApiClient::new(config, Arc::clone(&session.store)).expect("api client"))
}

pub fn api_for(server: &MockServer, session: &TestSession) -> TrackerApi {
    TrackerApi::new(client_for(server, session))
}
