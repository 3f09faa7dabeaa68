//! Database schema initialization
//!
//! Creates the tables and indexes if they do not exist yet.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS globals (
			key text NOT NULL,
			value text,
			PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Templates
	//***********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS templates (
		template_id integer NOT NULL,
		name text NOT NULL,
		description text NOT NULL DEFAULT '',
		content text NOT NULL,
		enabled boolean NOT NULL DEFAULT 1,
		created_at datetime DEFAULT (unixepoch()),
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(template_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Quiz settings
	//***************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS quiz_settings (
		quiz_id integer NOT NULL,
		cm_id integer NOT NULL,
		template_id integer,
		mode integer NOT NULL DEFAULT 0,
		show_seb_taskbar boolean NOT NULL,
		show_wifi_control boolean NOT NULL,
		show_reload_button boolean NOT NULL,
		show_time boolean NOT NULL,
		show_keyboard_layout boolean NOT NULL,
		allow_user_quit_seb boolean NOT NULL,
		quit_password text NOT NULL DEFAULT '',
		link_quit_seb text NOT NULL DEFAULT '',
		user_confirm_quit boolean NOT NULL,
		enable_audio_control boolean NOT NULL,
		mute_on_startup boolean NOT NULL,
		allow_spell_checking boolean NOT NULL,
		allow_reload_in_exam boolean NOT NULL,
		activate_url_filtering boolean NOT NULL,
		filter_embedded_content boolean NOT NULL,
		expressions_allowed text NOT NULL DEFAULT '',
		regex_allowed text NOT NULL DEFAULT '',
		expressions_blocked text NOT NULL DEFAULT '',
		regex_blocked text NOT NULL DEFAULT '',
		suppress_seb_download_link boolean NOT NULL,
		allowed_browser_exam_keys text NOT NULL DEFAULT '',
		config text NOT NULL DEFAULT '',
		config_key text NOT NULL DEFAULT '',
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(quiz_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_quiz_settings_cmid ON quiz_settings(cm_id)")
		.execute(&mut *tx)
		.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_quiz_settings_template ON quiz_settings(template_id)
		WHERE template_id IS NOT NULL",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query("INSERT OR IGNORE INTO globals (key, value) VALUES ('schema_version', '1')")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
