use folio_core::{EditorSession, SectionKind, SectionTemplate};
use folio_storage::Storage;

async fn create_test_storage() -> (Storage, std::path::PathBuf) {
    let temp_dir = std::env::temp_dir().join(format!("folio-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&temp_dir).unwrap();
    let storage = Storage::new(Some(temp_dir.join("test.db"))).await.unwrap();
    (storage, temp_dir)
}

#[tokio::test]
async fn test_edit_save_restore_lifecycle() {
    let (storage, temp_dir) = create_test_storage().await;

    // Build a first draft in an editor session
    let current = storage.get_current_configuration("alice").await.unwrap();
    let mut session = EditorSession::new(current.config);
    let hero = session.add_section(&SectionTemplate::for_kind(SectionKind::Hero));
    session.add_section(&SectionTemplate::for_kind(SectionKind::About));
    assert!(session.is_dirty());

    let saved = session.config().clone();
    let v1 = storage
        .save_configuration("alice", &saved, Some("draft".to_string()))
        .await
        .unwrap();
    assert!(session.mark_saved(v1.id.clone(), &saved));
    assert!(!session.is_dirty());

    // Second revision
    session.toggle_section_visibility(&hero).unwrap();
    session.reorder_sections(0, 1).unwrap();
    let saved = session.config().clone();
    let v2 = storage.save_configuration("alice", &saved, None).await.unwrap();
    session.mark_saved(v2.id.clone(), &saved);

    let versions = storage.list_versions("alice").await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].id, v2.id);

    // Restore the draft and reload it into a fresh session
    let restored = storage.restore_version("alice", &v1.id).await.unwrap();
    let mut reloaded = EditorSession::default();
    reloaded.load_version(restored, v1.id.clone());
    assert_eq!(reloaded.saved_version_id(), Some(v1.id.as_str()));
    assert!(!reloaded.is_dirty());
    assert!(reloaded.config().sections.iter().all(|s| s.visible));
    assert_eq!(reloaded.config().sections[0].id, hero);

    // Publishing pins the restored configuration
    storage.publish("alice").await.unwrap();
    let public = storage.get_published_configuration("alice").await.unwrap();
    assert_eq!(&public, reloaded.config());

    std::fs::remove_dir_all(&temp_dir).unwrap();
}

#[tokio::test]
async fn test_storage_reopens_existing_database() {
    let (storage, temp_dir) = create_test_storage().await;

    let mut session = EditorSession::default();
    session.add_section(&SectionTemplate::for_kind(SectionKind::Contact));
    let saved = storage
        .save_configuration("alice", session.config(), None)
        .await
        .unwrap();
    drop(storage);

    let reopened = Storage::new(Some(temp_dir.join("test.db"))).await.unwrap();
    let current = reopened.get_current_configuration("alice").await.unwrap();
    assert_eq!(current.version_id.as_deref(), Some(saved.id.as_str()));
    assert_eq!(&current.config, session.config());

    std::fs::remove_dir_all(&temp_dir).unwrap();
}
