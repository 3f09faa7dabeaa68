//! Basic Blob adapter operation tests
//!
//! Tests store, read and delete of configuration files

use sebrule_blob_adapter_fs::BlobAdapterFs;
use sebrule_types::blob_adapter::BlobAdapter;
use sebrule_types::types::CmId;
use tempfile::TempDir;

async fn create_test_adapter() -> (BlobAdapterFs, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = BlobAdapterFs::new(temp_dir.path().into())
		.await
		.expect("Failed to create adapter");
	(adapter, temp_dir)
}

#[tokio::test]
async fn test_store_and_read_config_file() {
	let (adapter, _temp) = create_test_adapter().await;
	let cm_id = CmId(12);
	let data = b"<?xml version=\"1.0\"?><plist version=\"1.0\"><dict/></plist>";

	adapter.store_config_file(cm_id, data).await.expect("Failed to store file");

	let read = adapter.read_config_file(cm_id).await.expect("Failed to read file");
	assert_eq!(read.as_deref(), Some(data.as_slice()));
}

#[tokio::test]
async fn test_read_missing_config_file() {
	let (adapter, _temp) = create_test_adapter().await;

	let read = adapter.read_config_file(CmId(1)).await.expect("Failed to read file");
	assert!(read.is_none());
}

#[tokio::test]
async fn test_store_replaces_file() {
	let (adapter, temp) = create_test_adapter().await;
	let cm_id = CmId(3);

	adapter.store_config_file(cm_id, b"first").await.expect("Failed to store file");
	adapter.store_config_file(cm_id, b"second").await.expect("Failed to store file");

	let read = adapter.read_config_file(cm_id).await.expect("Failed to read file");
	assert_eq!(read.as_deref(), Some(b"second".as_slice()));

	// no temporary files are left behind
	let entries = std::fs::read_dir(temp.path().join("3")).expect("Failed to list dir").count();
	assert_eq!(entries, 1);
}

#[tokio::test]
async fn test_per_course_module_isolation() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter.store_config_file(CmId(1), b"one").await.expect("Failed to store file");
	adapter.store_config_file(CmId(2), b"two").await.expect("Failed to store file");

	let one = adapter.read_config_file(CmId(1)).await.expect("Failed to read file");
	let two = adapter.read_config_file(CmId(2)).await.expect("Failed to read file");
	assert_eq!(one.as_deref(), Some(b"one".as_slice()));
	assert_eq!(two.as_deref(), Some(b"two".as_slice()));
}

#[tokio::test]
async fn test_delete_config_file() {
	let (adapter, _temp) = create_test_adapter().await;
	let cm_id = CmId(5);

	assert!(!adapter.delete_config_file(cm_id).await.expect("Failed to delete"));

	adapter.store_config_file(cm_id, b"data").await.expect("Failed to store file");
	assert!(adapter.delete_config_file(cm_id).await.expect("Failed to delete"));
	assert!(adapter.read_config_file(cm_id).await.expect("Failed to read file").is_none());
}

// vim: ts=4
