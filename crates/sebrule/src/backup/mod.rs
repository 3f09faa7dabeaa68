//! Backup and restore of the settings of a quiz
//!
//! A backup carries the settings without the quiz and course module ids, the
//! referenced template and the uploaded configuration file. Restoring into a
//! quiz recompiles the settings, so the derived config and config key are
//! reproduced from the restored sources.

pub mod handler;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use sebrule_core::cipher::validate_upload;
use sebrule_types::meta_adapter::{CreateTemplate, Template};
use sebrule_types::settings::{QuizSettings, SebMode};

use crate::prelude::*;
use crate::settings::service::{PendingSources, compile_settings};

// SettingsBackup //
//****************//
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsBackup {
	pub template_id: Option<TemplateId>,
	pub mode: SebMode,
	pub show_seb_taskbar: bool,
	pub show_wifi_control: bool,
	pub show_reload_button: bool,
	pub show_time: bool,
	pub show_keyboard_layout: bool,
	pub allow_user_quit_seb: bool,
	pub quit_password: String,
	pub link_quit_seb: String,
	pub user_confirm_quit: bool,
	pub enable_audio_control: bool,
	pub mute_on_startup: bool,
	pub allow_spell_checking: bool,
	pub allow_reload_in_exam: bool,
	pub activate_url_filtering: bool,
	pub filter_embedded_content: bool,
	pub expressions_allowed: String,
	pub regex_allowed: String,
	pub expressions_blocked: String,
	pub regex_blocked: String,
	pub suppress_seb_download_link: bool,
	pub allowed_browser_exam_keys: String,
	pub config: String,
	pub config_key: String,
}

impl From<&QuizSettings> for SettingsBackup {
	fn from(s: &QuizSettings) -> Self {
		Self {
			template_id: s.template_id,
			mode: s.mode,
			show_seb_taskbar: s.show_seb_taskbar,
			show_wifi_control: s.show_wifi_control,
			show_reload_button: s.show_reload_button,
			show_time: s.show_time,
			show_keyboard_layout: s.show_keyboard_layout,
			allow_user_quit_seb: s.allow_user_quit_seb,
			quit_password: s.quit_password.clone(),
			link_quit_seb: s.link_quit_seb.clone(),
			user_confirm_quit: s.user_confirm_quit,
			enable_audio_control: s.enable_audio_control,
			mute_on_startup: s.mute_on_startup,
			allow_spell_checking: s.allow_spell_checking,
			allow_reload_in_exam: s.allow_reload_in_exam,
			activate_url_filtering: s.activate_url_filtering,
			filter_embedded_content: s.filter_embedded_content,
			expressions_allowed: s.expressions_allowed.clone(),
			regex_allowed: s.regex_allowed.clone(),
			expressions_blocked: s.expressions_blocked.clone(),
			regex_blocked: s.regex_blocked.clone(),
			suppress_seb_download_link: s.suppress_seb_download_link,
			allowed_browser_exam_keys: s.allowed_browser_exam_keys.clone(),
			config: s.config.clone(),
			config_key: s.config_key.clone(),
		}
	}
}

impl SettingsBackup {
	/// Settings record of the restored quiz. The derived fields are kept
	/// until the record is recompiled.
	pub fn into_settings(self, quiz_id: QuizId, cm_id: CmId) -> QuizSettings {
		QuizSettings {
			template_id: self.template_id,
			mode: self.mode,
			show_seb_taskbar: self.show_seb_taskbar,
			show_wifi_control: self.show_wifi_control,
			show_reload_button: self.show_reload_button,
			show_time: self.show_time,
			show_keyboard_layout: self.show_keyboard_layout,
			allow_user_quit_seb: self.allow_user_quit_seb,
			quit_password: self.quit_password,
			link_quit_seb: self.link_quit_seb,
			user_confirm_quit: self.user_confirm_quit,
			enable_audio_control: self.enable_audio_control,
			mute_on_startup: self.mute_on_startup,
			allow_spell_checking: self.allow_spell_checking,
			allow_reload_in_exam: self.allow_reload_in_exam,
			activate_url_filtering: self.activate_url_filtering,
			filter_embedded_content: self.filter_embedded_content,
			expressions_allowed: self.expressions_allowed,
			regex_allowed: self.regex_allowed,
			expressions_blocked: self.expressions_blocked,
			regex_blocked: self.regex_blocked,
			suppress_seb_download_link: self.suppress_seb_download_link,
			allowed_browser_exam_keys: self.allowed_browser_exam_keys,
			config: self.config,
			config_key: self.config_key,
			..QuizSettings::new(quiz_id, cm_id)
		}
	}
}

// TemplateBackup //
//****************//
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBackup {
	pub template_id: TemplateId,
	pub name: Box<str>,
	#[serde(default)]
	pub description: Box<str>,
	pub content: Box<str>,
	pub enabled: bool,
}

impl From<Template> for TemplateBackup {
	fn from(t: Template) -> Self {
		Self {
			template_id: t.template_id,
			name: t.name,
			description: t.description,
			content: t.content,
			enabled: t.enabled,
		}
	}
}

// QuizSettingsBackup //
//********************//
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettingsBackup {
	pub settings: SettingsBackup,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub template: Option<TemplateBackup>,
	/// Uploaded configuration file, base64 encoded
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub config_file: Option<String>,
}

/// Collects the backup of a quiz
pub async fn export(app: &App, quiz_id: QuizId) -> ClResult<QuizSettingsBackup> {
	let settings = app.meta_adapter.read_quiz_settings(quiz_id).await?.ok_or(Error::NotFound)?;

	let template = match settings.template_id {
		Some(template_id) => app.meta_adapter.read_template(template_id).await?.map(Into::into),
		None => None,
	};
	let config_file =
		app.blob_adapter.read_config_file(settings.cm_id).await?.map(|data| STANDARD.encode(data));

	Ok(QuizSettingsBackup { settings: (&settings).into(), template, config_file })
}

/// Existing template identical to a backed up one
async fn reusable_template(app: &App, backup: &TemplateBackup) -> ClResult<Option<TemplateId>> {
	let existing = app.meta_adapter.read_template(backup.template_id).await?;
	Ok(existing.filter(|t| t.content == backup.content).map(|t| t.template_id))
}

/// Restores a backup into a quiz and its course module
///
/// The record is compiled against the backed up template and file before
/// anything is written, so a rejected backup leaves the quiz as it was.
pub async fn restore(
	app: &App,
	quiz_id: QuizId,
	cm_id: CmId,
	backup: QuizSettingsBackup,
) -> ClResult<QuizSettings> {
	let mut settings = backup.settings.into_settings(quiz_id, cm_id);

	let mut new_template = None;
	settings.template_id = match backup.template {
		Some(template) => match reusable_template(app, &template).await? {
			Some(template_id) => Some(template_id),
			None => {
				validate_upload(template.content.as_bytes(), "")?;
				let template_id = template.template_id;
				new_template = Some(template);
				Some(template_id)
			}
		},
		None => None,
	};

	let document = match backup.config_file {
		Some(encoded) => {
			let data = STANDARD
				.decode(encoded.as_bytes())
				.map_err(|_| Error::ValidationError("config file is not valid base64".into()))?;
			Some(validate_upload(&data, "")?)
		}
		None => None,
	};

	let pending = PendingSources {
		template: new_template.as_ref().map(|t| &*t.content),
		config_file: document.as_deref(),
	};
	let mut compiled = compile_settings(app, &settings, &pending).await?;

	if let Some(template) = new_template {
		let template_id = app
			.meta_adapter
			.create_template(&CreateTemplate {
				name: template.name,
				description: template.description,
				content: template.content,
				enabled: template.enabled,
			})
			.await?;
		info!("Restored template {} as {}", template.template_id, template_id);
		if compiled.template_id.is_some() {
			compiled.template_id = Some(template_id);
		}
	}
	if let Some(document) = document {
		app.blob_adapter.store_config_file(cm_id, &document).await?;
	}

	app.meta_adapter.upsert_quiz_settings(&compiled).await?;
	info!("Settings of quiz {} restored", quiz_id);
	Ok(compiled)
}


// vim: ts=4
