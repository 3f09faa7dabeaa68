//! Quiz settings records
//!
//! One row per quiz. The row is always written as a whole, with a single
//! `INSERT ... ON CONFLICT DO UPDATE` statement.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use sebrule_types::prelude::*;
use sebrule_types::settings::{QuizSettings, SebMode};

const COLUMNS: &str = "quiz_id, cm_id, template_id, mode,
	show_seb_taskbar, show_wifi_control, show_reload_button, show_time, show_keyboard_layout,
	allow_user_quit_seb, quit_password, link_quit_seb, user_confirm_quit,
	enable_audio_control, mute_on_startup, allow_spell_checking, allow_reload_in_exam,
	activate_url_filtering, filter_embedded_content,
	expressions_allowed, regex_allowed, expressions_blocked, regex_blocked,
	suppress_seb_download_link, allowed_browser_exam_keys, config, config_key, updated_at";

fn from_row(row: &SqliteRow) -> Result<QuizSettings, sqlx::Error> {
	Ok(QuizSettings {
		quiz_id: QuizId(row.try_get("quiz_id")?),
		cm_id: CmId(row.try_get("cm_id")?),
		template_id: row.try_get::<Option<i64>, _>("template_id")?.map(TemplateId),
		mode: SebMode::from_code(row.try_get("mode")?),
		show_seb_taskbar: row.try_get("show_seb_taskbar")?,
		show_wifi_control: row.try_get("show_wifi_control")?,
		show_reload_button: row.try_get("show_reload_button")?,
		show_time: row.try_get("show_time")?,
		show_keyboard_layout: row.try_get("show_keyboard_layout")?,
		allow_user_quit_seb: row.try_get("allow_user_quit_seb")?,
		quit_password: row.try_get("quit_password")?,
		link_quit_seb: row.try_get("link_quit_seb")?,
		user_confirm_quit: row.try_get("user_confirm_quit")?,
		enable_audio_control: row.try_get("enable_audio_control")?,
		mute_on_startup: row.try_get("mute_on_startup")?,
		allow_spell_checking: row.try_get("allow_spell_checking")?,
		allow_reload_in_exam: row.try_get("allow_reload_in_exam")?,
		activate_url_filtering: row.try_get("activate_url_filtering")?,
		filter_embedded_content: row.try_get("filter_embedded_content")?,
		expressions_allowed: row.try_get("expressions_allowed")?,
		regex_allowed: row.try_get("regex_allowed")?,
		expressions_blocked: row.try_get("expressions_blocked")?,
		regex_blocked: row.try_get("regex_blocked")?,
		suppress_seb_download_link: row.try_get("suppress_seb_download_link")?,
		allowed_browser_exam_keys: row.try_get("allowed_browser_exam_keys")?,
		config: row.try_get("config")?,
		config_key: row.try_get("config_key")?,
		updated_at: Timestamp(row.try_get("updated_at")?),
	})
}

fn map_row(row: Option<SqliteRow>) -> ClResult<Option<QuizSettings>> {
	row.as_ref()
		.map(from_row)
		.transpose()
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)
}

/// Read the settings of a quiz
pub(crate) async fn read(db: &SqlitePool, quiz_id: QuizId) -> ClResult<Option<QuizSettings>> {
	let row = sqlx::query(&format!("SELECT {} FROM quiz_settings WHERE quiz_id = ?", COLUMNS))
		.bind(quiz_id.0)
		.fetch_optional(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	map_row(row)
}

/// Read the settings of a quiz by its course module id
pub(crate) async fn read_by_cm(db: &SqlitePool, cm_id: CmId) -> ClResult<Option<QuizSettings>> {
	let row = sqlx::query(&format!("SELECT {} FROM quiz_settings WHERE cm_id = ?", COLUMNS))
		.bind(cm_id.0)
		.fetch_optional(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	map_row(row)
}

/// List the settings that reference a template
pub(crate) async fn list_by_template(
	db: &SqlitePool,
	template_id: TemplateId,
) -> ClResult<Vec<QuizSettings>> {
	let rows = sqlx::query(&format!(
		"SELECT {} FROM quiz_settings WHERE template_id = ? ORDER BY quiz_id",
		COLUMNS
	))
	.bind(template_id.0)
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

/// Create or replace the settings of a quiz
pub(crate) async fn upsert(db: &SqlitePool, settings: &QuizSettings) -> ClResult<()> {
	let query = format!(
		"INSERT INTO quiz_settings ({}) VALUES
		(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
		ON CONFLICT(quiz_id) DO UPDATE SET
			cm_id = excluded.cm_id,
			template_id = excluded.template_id,
			mode = excluded.mode,
			show_seb_taskbar = excluded.show_seb_taskbar,
			show_wifi_control = excluded.show_wifi_control,
			show_reload_button = excluded.show_reload_button,
			show_time = excluded.show_time,
			show_keyboard_layout = excluded.show_keyboard_layout,
			allow_user_quit_seb = excluded.allow_user_quit_seb,
			quit_password = excluded.quit_password,
			link_quit_seb = excluded.link_quit_seb,
			user_confirm_quit = excluded.user_confirm_quit,
			enable_audio_control = excluded.enable_audio_control,
			mute_on_startup = excluded.mute_on_startup,
			allow_spell_checking = excluded.allow_spell_checking,
			allow_reload_in_exam = excluded.allow_reload_in_exam,
			activate_url_filtering = excluded.activate_url_filtering,
			filter_embedded_content = excluded.filter_embedded_content,
			expressions_allowed = excluded.expressions_allowed,
			regex_allowed = excluded.regex_allowed,
			expressions_blocked = excluded.expressions_blocked,
			regex_blocked = excluded.regex_blocked,
			suppress_seb_download_link = excluded.suppress_seb_download_link,
			allowed_browser_exam_keys = excluded.allowed_browser_exam_keys,
			config = excluded.config,
			config_key = excluded.config_key,
			updated_at = excluded.updated_at",
		COLUMNS
	);

	let res = sqlx::query(&query)
		.bind(settings.quiz_id.0)
		.bind(settings.cm_id.0)
		.bind(settings.template_id.map(|id| id.0))
		.bind(settings.mode.code())
		.bind(settings.show_seb_taskbar)
		.bind(settings.show_wifi_control)
		.bind(settings.show_reload_button)
		.bind(settings.show_time)
		.bind(settings.show_keyboard_layout)
		.bind(settings.allow_user_quit_seb)
		.bind(&settings.quit_password)
		.bind(&settings.link_quit_seb)
		.bind(settings.user_confirm_quit)
		.bind(settings.enable_audio_control)
		.bind(settings.mute_on_startup)
		.bind(settings.allow_spell_checking)
		.bind(settings.allow_reload_in_exam)
		.bind(settings.activate_url_filtering)
		.bind(settings.filter_embedded_content)
		.bind(&settings.expressions_allowed)
		.bind(&settings.regex_allowed)
		.bind(&settings.expressions_blocked)
		.bind(&settings.regex_blocked)
		.bind(settings.suppress_seb_download_link)
		.bind(&settings.allowed_browser_exam_keys)
		.bind(&settings.config)
		.bind(&settings.config_key)
		.bind(settings.updated_at.0)
		.execute(db)
		.await;

	match res {
		Ok(_) => Ok(()),
		// another quiz already uses this course module
		Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
			Err(Error::Conflict(format!("course module {} already has settings", settings.cm_id)))
		}
		Err(err) => {
			warn!("DB: {:#?}", err);
			Err(Error::DbError)
		}
	}
}

/// Delete the settings of a quiz
pub(crate) async fn delete(db: &SqlitePool, quiz_id: QuizId) -> ClResult<bool> {
	let res = sqlx::query("DELETE FROM quiz_settings WHERE quiz_id = ?")
		.bind(quiz_id.0)
		.execute(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	Ok(res.rows_affected() > 0)
}

// vim: ts=4
