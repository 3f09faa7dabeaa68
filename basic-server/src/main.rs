use std::sync::Arc;
use std::{env, path};

use sebrule::AppBuilder;
use sebrule::error::Error;
use sebrule_blob_adapter_fs::BlobAdapterFs;
use sebrule_meta_adapter_sqlite::MetaAdapterSqlite;

pub struct Config {
	pub listen: String,
	pub www_root: String,
	pub db_dir: path::PathBuf,
	pub data_dir: path::PathBuf,
}

fn env_or(name: &str, default: &str) -> String {
	env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
	let config = Config {
		listen: env_or("LISTEN", "127.0.0.1:8080"),
		www_root: env_or("WWW_ROOT", "http://localhost:8080"),
		db_dir: path::PathBuf::from(env_or("DB_DIR", "./data")),
		data_dir: path::PathBuf::from(env_or("DATA_DIR", "./data/files")),
	};

	// installs the log subscriber
	let mut builder = AppBuilder::new();

	let meta_adapter = Arc::new(MetaAdapterSqlite::new(config.db_dir.join("meta.db")).await?);
	let blob_adapter = Arc::new(BlobAdapterFs::new(config.data_dir.into()).await?);

	builder
		.listen(config.listen)
		.www_root(config.www_root)
		.meta_adapter(meta_adapter)
		.blob_adapter(blob_adapter);
	builder.run().await
}

// vim: ts=4
