//! Settings save pathway
//!
//! Every change of a settings record goes through [`save_settings`]: the
//! documents the compilation depends on are fetched, the record is
//! recompiled and then persisted in one statement. A failed compilation
//! leaves the stored record untouched.

use sebrule_core::browser_keys::validate_keys;
use sebrule_core::cipher::validate_upload;
use sebrule_core::compile::{CompileOpts, CompileSources, recompile};
use sebrule_types::settings::{QuizSettings, SebMode};

use crate::prelude::*;

/// Sources of a compilation that are not stored yet. They take the place of
/// the stored template and configuration file.
#[derive(Debug, Default)]
pub struct PendingSources<'a> {
	pub template: Option<&'a str>,
	pub config_file: Option<&'a [u8]>,
}

/// Validates and compiles a settings record without persisting anything
pub async fn compile_settings(
	app: &App,
	settings: &QuizSettings,
	pending: &PendingSources<'_>,
) -> ClResult<QuizSettings> {
	validate_keys(&settings.allowed_browser_exam_keys)?;

	let cached = match (settings.mode, settings.template_id, pending.template) {
		(SebMode::UseTemplate, Some(template_id), None) => {
			app.templates.get(app.meta_adapter.as_ref(), template_id).await?
		}
		_ => None,
	};
	let stored = match (settings.mode, pending.config_file) {
		(SebMode::UploadedConfig, None) => app.blob_adapter.read_config_file(settings.cm_id).await?,
		_ => None,
	};

	let sources = CompileSources {
		template: match settings.mode {
			SebMode::UseTemplate => pending.template.or(cached.as_deref()).map(str::as_bytes),
			_ => None,
		},
		config_file: match settings.mode {
			SebMode::UploadedConfig => pending.config_file.or(stored.as_deref()),
			_ => None,
		},
	};
	recompile(settings, &sources, &CompileOpts { www_root: &app.opts.www_root })
		.inspect_err(|err| warn!("Compiling settings of quiz {} failed: {}", settings.quiz_id, err))
}

/// Compiles and persists a settings record, returns the stored record
pub async fn save_settings(app: &App, settings: &QuizSettings) -> ClResult<QuizSettings> {
	let compiled = compile_settings(app, settings, &PendingSources::default()).await?;

	app.meta_adapter.upsert_quiz_settings(&compiled).await?;
	info!("Settings of quiz {} saved (mode: {:?})", compiled.quiz_id, compiled.mode);

	Ok(compiled)
}

/// Recompiles every quiz based on a template, returns the number of quizzes
pub async fn recompile_template_users(app: &App, template_id: TemplateId) -> ClResult<usize> {
	let users = app.meta_adapter.list_quiz_settings_by_template(template_id).await?;

	let mut count = 0;
	for settings in users.iter().filter(|s| s.mode == SebMode::UseTemplate) {
		save_settings(app, settings).await?;
		count += 1;
	}
	if count > 0 {
		info!("Recompiled {} quizzes using template {}", count, template_id);
	}
	Ok(count)
}

/// Deletes the settings of a quiz and its uploaded configuration file
pub async fn delete_settings(app: &App, quiz_id: QuizId) -> ClResult<bool> {
	let Some(settings) = app.meta_adapter.read_quiz_settings(quiz_id).await? else {
		return Ok(false);
	};

	app.meta_adapter.delete_quiz_settings(quiz_id).await?;
	app.blob_adapter.delete_config_file(settings.cm_id).await?;
	info!("Settings of quiz {} deleted", quiz_id);

	Ok(true)
}

/// Validates and stores an uploaded configuration file. If the quiz of the
/// course module is configured with an uploaded file, it is recompiled.
pub async fn store_config_file(
	app: &App,
	cm_id: CmId,
	data: &[u8],
	password: &str,
) -> ClResult<Option<QuizSettings>> {
	let document = validate_upload(data, password)?;
	app.blob_adapter.store_config_file(cm_id, &document).await?;

	match app.meta_adapter.read_quiz_settings_by_cm(cm_id).await? {
		Some(settings) if settings.mode == SebMode::UploadedConfig => {
			Ok(Some(save_settings(app, &settings).await?))
		}
		_ => Ok(None),
	}
}

// vim: ts=4
