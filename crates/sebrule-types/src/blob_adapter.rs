//! Adapter that stores uploaded configuration files, one per course module.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait BlobAdapter: Debug + Send + Sync {
	/// Stores (or replaces) the configuration file of a course module
	async fn store_config_file(&self, cm_id: CmId, data: &[u8]) -> ClResult<()>;

	/// Reads the configuration file of a course module
	async fn read_config_file(&self, cm_id: CmId) -> ClResult<Option<Box<[u8]>>>;

	/// Deletes the configuration file of a course module, returns whether it existed
	async fn delete_config_file(&self, cm_id: CmId) -> ClResult<bool>;
}

// vim: ts=4
