//! Configuration templates

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use sebrule_types::meta_adapter::{CreateTemplate, ListTemplateOptions, Template, UpdateTemplate};
use sebrule_types::prelude::*;
use sebrule_types::types::now;

fn from_row(row: &SqliteRow) -> Result<Template, sqlx::Error> {
	Ok(Template {
		template_id: TemplateId(row.try_get("template_id")?),
		name: row.try_get::<String, _>("name")?.into(),
		description: row.try_get::<String, _>("description")?.into(),
		content: row.try_get::<String, _>("content")?.into(),
		enabled: row.try_get("enabled")?,
		created_at: Timestamp(row.try_get("created_at")?),
		updated_at: Timestamp(row.try_get("updated_at")?),
	})
}

/// List templates, optionally filtered by their enabled flag
pub(crate) async fn list(db: &SqlitePool, opts: &ListTemplateOptions) -> ClResult<Vec<Template>> {
	let mut query = sqlx::QueryBuilder::new(
		"SELECT template_id, name, description, content, enabled, created_at, updated_at
		FROM templates",
	);
	if let Some(enabled) = opts.enabled {
		query.push(" WHERE enabled = ").push_bind(enabled);
	}
	query.push(" ORDER BY name, template_id");

	let rows = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	rows.iter()
		.map(from_row)
		.collect::<Result<Vec<_>, _>>()
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)
}

pub(crate) async fn read(db: &SqlitePool, template_id: TemplateId) -> ClResult<Option<Template>> {
	let row = sqlx::query(
		"SELECT template_id, name, description, content, enabled, created_at, updated_at
		FROM templates WHERE template_id = ?",
	)
	.bind(template_id.0)
	.fetch_optional(db)
	.await
	.inspect_err(|err| warn!("DB: {:#?}", err))
	.map_err(|_| Error::DbError)?;

	row.as_ref()
		.map(from_row)
		.transpose()
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)
}

pub(crate) async fn create(db: &SqlitePool, template: &CreateTemplate) -> ClResult<TemplateId> {
	let now = now();
	let row = sqlx::query(
		"INSERT INTO templates (name, description, content, enabled, created_at, updated_at)
		VALUES (?, ?, ?, ?, ?, ?) RETURNING template_id",
	)
	.bind(template.name.as_ref())
	.bind(template.description.as_ref())
	.bind(template.content.as_ref())
	.bind(template.enabled)
	.bind(now.0)
	.bind(now.0)
	.fetch_one(db)
	.await
	.inspect_err(|err| warn!("DB: {:#?}", err))
	.map_err(|_| Error::DbError)?;

	let template_id: i64 = row
		.try_get("template_id")
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;
	Ok(TemplateId(template_id))
}

/// Update the given fields of a template. Fails with `NotFound` if it does not exist.
pub(crate) async fn update(
	db: &SqlitePool,
	template_id: TemplateId,
	template: &UpdateTemplate,
) -> ClResult<()> {
	let res = sqlx::query(
		"UPDATE templates SET
			name = coalesce(?, name),
			description = coalesce(?, description),
			content = coalesce(?, content),
			enabled = coalesce(?, enabled),
			updated_at = ?
		WHERE template_id = ?",
	)
	.bind(template.name.as_deref())
	.bind(template.description.as_deref())
	.bind(template.content.as_deref())
	.bind(template.enabled)
	.bind(now().0)
	.bind(template_id.0)
	.execute(db)
	.await
	.inspect_err(|err| warn!("DB: {:#?}", err))
	.map_err(|_| Error::DbError)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

pub(crate) async fn delete(db: &SqlitePool, template_id: TemplateId) -> ClResult<bool> {
	let res = sqlx::query("DELETE FROM templates WHERE template_id = ?")
		.bind(template_id.0)
		.execute(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	Ok(res.rows_affected() > 0)
}

/// Number of quizzes referencing a template
pub(crate) async fn count_usage(db: &SqlitePool, template_id: TemplateId) -> ClResult<u32> {
	let row = sqlx::query("SELECT count(*) AS cnt FROM quiz_settings WHERE template_id = ?")
		.bind(template_id.0)
		.fetch_one(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	let count: i64 = row
		.try_get("cnt")
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;
	Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

// vim: ts=4
