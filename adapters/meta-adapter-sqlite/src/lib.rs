//! SQLite implementation of the sebrule metadata adapter.
//!
//! Stores the per-quiz settings records and the configuration templates.

#![forbid(unsafe_code)]

mod quiz_settings;
mod schema;
mod template;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use sebrule_types::meta_adapter::{
	self, CreateTemplate, ListTemplateOptions, Template, UpdateTemplate,
};
use sebrule_types::prelude::*;
use sebrule_types::settings::QuizSettings;

use crate::schema::init_db;

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	/// Opens (or creates) the database file at `path`
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		if let Some(dir) = path.as_ref().parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		info!("Meta database opened: {}", path.as_ref().display());
		Ok(Self { db })
	}
}

#[async_trait]
impl meta_adapter::MetaAdapter for MetaAdapterSqlite {
	// Quiz settings
	//***************
	async fn read_quiz_settings(&self, quiz_id: QuizId) -> ClResult<Option<QuizSettings>> {
		quiz_settings::read(&self.db, quiz_id).await
	}

	async fn read_quiz_settings_by_cm(&self, cm_id: CmId) -> ClResult<Option<QuizSettings>> {
		quiz_settings::read_by_cm(&self.db, cm_id).await
	}

	async fn list_quiz_settings_by_template(
		&self,
		template_id: TemplateId,
	) -> ClResult<Vec<QuizSettings>> {
		quiz_settings::list_by_template(&self.db, template_id).await
	}

	async fn upsert_quiz_settings(&self, settings: &QuizSettings) -> ClResult<()> {
		quiz_settings::upsert(&self.db, settings).await
	}

	async fn delete_quiz_settings(&self, quiz_id: QuizId) -> ClResult<bool> {
		quiz_settings::delete(&self.db, quiz_id).await
	}

	// Templates
	//***********
	async fn list_templates(&self, opts: &ListTemplateOptions) -> ClResult<Vec<Template>> {
		template::list(&self.db, opts).await
	}

	async fn read_template(&self, template_id: TemplateId) -> ClResult<Option<Template>> {
		template::read(&self.db, template_id).await
	}

	async fn create_template(&self, template: &CreateTemplate) -> ClResult<TemplateId> {
		template::create(&self.db, template).await
	}

	async fn update_template(
		&self,
		template_id: TemplateId,
		template: &UpdateTemplate,
	) -> ClResult<()> {
		template::update(&self.db, template_id, template).await
	}

	async fn delete_template(&self, template_id: TemplateId) -> ClResult<bool> {
		template::delete(&self.db, template_id).await
	}

	async fn count_template_usage(&self, template_id: TemplateId) -> ClResult<u32> {
		template::count_usage(&self.db, template_id).await
	}
}

// vim: ts=4
