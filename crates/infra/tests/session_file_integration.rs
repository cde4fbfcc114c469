//! Session store persisted through the JSON-file storage

use std::sync::Arc;

use dailytrack_core::{LoginGrant, SessionStore};
use dailytrack_domain::{Identity, Role};
use dailytrack_infra::storage::FileSessionStorage;

fn user() -> Identity {
    Identity {
        id: "42".to_string(),
        email: "manager1@corp.io".to_string(),
        name: Some("Manager One".to_string()),
        role: Role::Manager,
    }
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = SessionStore::new(Arc::new(FileSessionStorage::new(&path)));
    first
        .start(LoginGrant {
            access_token: "acc".into(),
            refresh_token: Some("ref".into()),
            user: user(),
        })
        .await
        .unwrap();

    let second = SessionStore::new(Arc::new(FileSessionStorage::new(&path)));
    let restored = second.restore().await;

    assert_eq!(restored.access_token.as_deref(), Some("acc"));
    assert_eq!(restored.refresh_token.as_deref(), Some("ref"));
    assert_eq!(restored.user, Some(user()));
    assert!(second.is_authenticated());
}

#[tokio::test]
async fn test_sign_out_empties_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = SessionStore::new(Arc::new(FileSessionStorage::new(&path)));
    store
        .start(LoginGrant { access_token: "acc".into(), refresh_token: None, user: user() })
        .await
        .unwrap();
    store.sign_out().await;

    let contents: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(contents, serde_json::json!({}));
}

#[tokio::test]
async fn test_malformed_user_restores_without_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(
        &path,
        serde_json::json!({"access_token": "acc", "current_user": "{not json"}).to_string(),
    )
    .unwrap();

    let store = SessionStore::new(Arc::new(FileSessionStorage::new(&path)));
    let restored = store.restore().await;

    assert_eq!(restored.access_token.as_deref(), Some("acc"));
    assert_eq!(restored.user, None);
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_unreadable_file_restores_empty_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json at all").unwrap();

    let store = SessionStore::new(Arc::new(FileSessionStorage::new(&path)));
    let restored = store.restore().await;
    assert!(restored.is_empty());
}

#[tokio::test]
async fn test_sign_in_recovers_from_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{truncated").unwrap();

    let store = SessionStore::new(Arc::new(FileSessionStorage::new(&path)));
    assert!(store.restore().await.is_empty());
    store
        .start(LoginGrant { access_token: "acc".into(), refresh_token: None, user: user() })
        .await
        .expect("sign-in must overwrite an unreadable session file");

    let reopened = SessionStore::new(Arc::new(FileSessionStorage::new(&path)));
    let restored = reopened.restore().await;
    assert_eq!(restored.access_token.as_deref(), Some("acc"));
    assert_eq!(restored.user, Some(user()));
}
