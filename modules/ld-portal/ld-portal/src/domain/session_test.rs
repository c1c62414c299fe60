use std::sync::Arc;

use ld_portal_sdk::{Role, Secret, UserIdentity};

use super::session::{
    FileSessionStore, MemorySessionStore, PersistedSession, SESSION_FILE, SessionContext,
    SessionError, SessionStore,
};

fn intern() -> UserIdentity {
    UserIdentity {
        id: "7".to_owned(),
        name: "Grace".to_owned(),
        role: Role::Intern,
    }
}

#[test]
fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(&dir.path().join("nested"));
    assert!(store.load().unwrap().is_none());

    store
        .save(&PersistedSession {
            token: Some(Secret::from("tok-1")),
            user: intern(),
        })
        .unwrap();
    assert!(dir.path().join("nested").join(SESSION_FILE).is_file());

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.user, intern());
    assert_eq!(loaded.token.as_ref().map(Secret::expose), Some("tok-1"));

    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
    store.clear().unwrap();
}

#[test]
fn corrupt_file_is_reported_and_ignored_on_init() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(SESSION_FILE), b"{not json").unwrap();
    let store = FileSessionStore::new(dir.path());

    assert!(matches!(store.load(), Err(SessionError::Corrupt { .. })));

    let session = SessionContext::init(Arc::new(store));
    assert!(!session.is_authenticated());
}

#[test]
fn context_restores_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionContext::init(Arc::new(FileSessionStore::new(dir.path())));
    assert!(session.identity().is_none());

    session
        .set(Some(Secret::from("tok-2")), intern())
        .unwrap();

    let restored = SessionContext::init(Arc::new(FileSessionStore::new(dir.path())));
    assert_eq!(restored.identity(), Some(intern()));
    assert_eq!(
        restored.token().as_ref().map(Secret::expose),
        Some("tok-2")
    );
}

#[test]
fn clear_drops_memory_and_store() {
    let store = Arc::new(MemorySessionStore::with_session(PersistedSession {
        token: None,
        user: intern(),
    }));
    let session = SessionContext::init(store.clone());
    assert!(session.is_authenticated());
    assert!(session.token().is_none());

    session.clear().unwrap();
    assert!(!session.is_authenticated());
    assert!(store.load().unwrap().is_none());
}

#[test]
fn debug_output_hides_the_token() {
    let session = SessionContext::in_memory();
    session
        .set(Some(Secret::from("very-secret")), intern())
        .unwrap();
    let rendered = format!("{session:?}");
    assert!(!rendered.contains("very-secret"));
    assert!(rendered.contains("Grace"));
}
