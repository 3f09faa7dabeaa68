//! Filesystem storage of uploaded configuration files.
//!
//! Files are stored as `{base_dir}/{cm_id}/config.seb`. Writes go to a
//! temporary file in the same directory which is then renamed over the
//! final path, so readers never see a partially written file.

#![forbid(unsafe_code)]

use std::{
	fmt::Debug,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use async_trait::async_trait;
use rand::RngExt;
use tokio::{
	fs::{File, create_dir_all, read, remove_file, rename},
	io::AsyncWriteExt,
};

use sebrule_types::{blob_adapter, prelude::*};

const CONFIG_FILE_NAME: &str = "config.seb";

/// Directory of the files of a course module
fn obj_dir(base_dir: &Path, cm_id: CmId) -> PathBuf {
	PathBuf::from(base_dir).join(cm_id.to_string())
}

fn obj_file_path(base_dir: &Path, cm_id: CmId) -> PathBuf {
	obj_dir(base_dir, cm_id).join(CONFIG_FILE_NAME)
}

fn obj_tmp_file_path(base_dir: &Path, cm_id: CmId) -> PathBuf {
	let tmp_id: u64 = rand::rng().random();
	obj_dir(base_dir, cm_id).join(format!("tmp-{:016x}", tmp_id))
}

#[derive(Debug)]
pub struct BlobAdapterFs {
	base_dir: Box<Path>,
}

impl BlobAdapterFs {
	pub async fn new(base_dir: Box<Path>) -> Result<Self, Error> {
		create_dir_all(&base_dir).await?;
		Ok(Self { base_dir })
	}
}

#[async_trait]
impl blob_adapter::BlobAdapter for BlobAdapterFs {
	async fn store_config_file(&self, cm_id: CmId, data: &[u8]) -> ClResult<()> {
		create_dir_all(obj_dir(&self.base_dir, cm_id)).await?;

		let tmp_path = obj_tmp_file_path(&self.base_dir, cm_id);
		let res = async {
			let mut file = File::create(&tmp_path).await?;
			file.write_all(data).await?;
			file.sync_all().await?;
			rename(&tmp_path, obj_file_path(&self.base_dir, cm_id)).await?;
			Ok::<(), Error>(())
		}
		.await;
		if let Err(err) = res {
			warn!("store config file failed, removing tmpfile: {:?}", &tmp_path);
			let _ignore_err = remove_file(&tmp_path).await;
			return Err(err);
		}

		info!("Config file stored for course module {} ({} bytes)", cm_id, data.len());
		Ok(())
	}

	async fn read_config_file(&self, cm_id: CmId) -> ClResult<Option<Box<[u8]>>> {
		match read(obj_file_path(&self.base_dir, cm_id)).await {
			Ok(buf) => Ok(Some(buf.into_boxed_slice())),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err.into()),
		}
	}

	async fn delete_config_file(&self, cm_id: CmId) -> ClResult<bool> {
		match remove_file(obj_file_path(&self.base_dir, cm_id)).await {
			Ok(()) => {
				info!("Config file deleted for course module {}", cm_id);
				Ok(true)
			}
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
			Err(err) => Err(err.into()),
		}
	}
}

// vim: ts=4
