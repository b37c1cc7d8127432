//! Integration tests for FilesystemLoader

use tempfile::TempDir;
use tokio::fs;
use verdict_repository::{
    BlockingDecisionLoader, DecisionLoader, FilesystemLoader, RepositoryError,
};

const DOCUMENT: &str = r#"{"nodes": [], "edges": []}"#;

async fn create_test_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("pricing")).await.unwrap();
    fs::write(root.join("pricing/discount.json"), DOCUMENT)
        .await
        .unwrap();
    fs::write(root.join("plain.json"), DOCUMENT).await.unwrap();

    temp_dir
}

// ========== Lookup Tests ==========

#[tokio::test]
async fn test_load_with_explicit_extension() {
    let dir = create_test_dir().await;
    let loader = FilesystemLoader::new(dir.path()).unwrap();

    let document = loader.load("pricing/discount.json").await.unwrap();
    assert_eq!(document, DOCUMENT.as_bytes());
}

#[tokio::test]
async fn test_load_falls_back_to_json_extension() {
    let dir = create_test_dir().await;
    let loader = FilesystemLoader::new(dir.path()).unwrap();

    assert_eq!(loader.load("pricing/discount").await.unwrap(), DOCUMENT.as_bytes());
    assert_eq!(loader.load("./plain").await.unwrap(), DOCUMENT.as_bytes());
}

#[tokio::test]
async fn test_missing_document_is_not_found() {
    let dir = create_test_dir().await;
    let loader = FilesystemLoader::new(dir.path()).unwrap();

    let err = loader.load("pricing/absent").await.unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_blocking_load() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("limits.json"), DOCUMENT).unwrap();
    let loader = FilesystemLoader::new(dir.path()).unwrap();

    assert_eq!(loader.load_blocking("limits").unwrap(), DOCUMENT.as_bytes());
    assert!(loader.load_blocking("other").unwrap_err().is_not_found());
}

// ========== Key Validation Tests ==========

#[tokio::test]
async fn test_keys_cannot_leave_root() {
    let dir = create_test_dir().await;
    let loader = FilesystemLoader::new(dir.path().join("pricing")).unwrap();

    for key in ["../plain", "/etc/passwd", "", "  "] {
        let err = loader.load(key).await.unwrap_err();
        assert!(
            matches!(err, RepositoryError::InvalidKey(_)),
            "key {key:?} gave {err:?}"
        );
    }
}

#[test]
fn test_missing_root_is_invalid_path() {
    let dir = TempDir::new().unwrap();
    let err = FilesystemLoader::new(dir.path().join("nowhere")).unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidPath { .. }));
}

#[test]
fn test_root_is_absolute() {
    let dir = TempDir::new().unwrap();
    let loader = FilesystemLoader::new(dir.path()).unwrap();
    assert!(loader.root().is_absolute());
}

// ========== Memory Tests ==========

#[tokio::test]
async fn test_keep_in_memory_serves_after_delete() {
    let dir = create_test_dir().await;
    let loader = FilesystemLoader::new(dir.path())
        .unwrap()
        .keep_in_memory(true);

    loader.load("plain").await.unwrap();
    fs::remove_file(dir.path().join("plain.json")).await.unwrap();

    assert_eq!(loader.load("plain").await.unwrap(), DOCUMENT.as_bytes());
}

#[tokio::test]
async fn test_without_memory_rereads_disk() {
    let dir = create_test_dir().await;
    let loader = FilesystemLoader::new(dir.path()).unwrap();

    loader.load("plain").await.unwrap();
    fs::write(dir.path().join("plain.json"), "{}").await.unwrap();

    assert_eq!(loader.load("plain").await.unwrap(), b"{}");
}
