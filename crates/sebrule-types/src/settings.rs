//! Per-quiz Safe Exam Browser settings record

use serde::{Deserialize, Serialize};

use crate::types::{CmId, QuizId, TemplateId, Timestamp, now};

// SebMode //
//*********//
/// Source of the client configuration a quiz requires
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SebMode {
	/// No Safe Exam Browser requirement
	#[default]
	Disabled,
	/// Configuration compiled from the individual settings fields
	ManualConfig,
	/// Configuration based on a shared template
	UseTemplate,
	/// Configuration based on an uploaded file
	UploadedConfig,
	/// Client keeps its own configuration, only the browser is checked
	ClientManagedConfig,
}

impl SebMode {
	/// Storage code of the mode
	pub fn code(self) -> i64 {
		match self {
			SebMode::Disabled => 0,
			SebMode::ManualConfig => 1,
			SebMode::UseTemplate => 2,
			SebMode::UploadedConfig => 3,
			SebMode::ClientManagedConfig => 4,
		}
	}

	/// Decodes a stored mode. Unknown codes are treated as client managed configuration.
	pub fn from_code(code: i64) -> Self {
		match code {
			0 => SebMode::Disabled,
			1 => SebMode::ManualConfig,
			2 => SebMode::UseTemplate,
			3 => SebMode::UploadedConfig,
			_ => SebMode::ClientManagedConfig,
		}
	}
}

// QuizSettings //
//**************//
/// Settings record of one protected quiz.
///
/// `config` and `config_key` are derived fields: they are recompiled from the
/// other fields on every save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
	pub quiz_id: QuizId,
	pub cm_id: CmId,
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
	pub updated_at: Timestamp,
}

impl QuizSettings {
	pub fn new(quiz_id: QuizId, cm_id: CmId) -> Self {
		Self {
			quiz_id,
			cm_id,
			template_id: None,
			mode: SebMode::Disabled,
			show_seb_taskbar: true,
			show_wifi_control: false,
			show_reload_button: true,
			show_time: true,
			show_keyboard_layout: true,
			allow_user_quit_seb: true,
			quit_password: String::new(),
			link_quit_seb: String::new(),
			user_confirm_quit: true,
			enable_audio_control: false,
			mute_on_startup: false,
			allow_spell_checking: false,
			allow_reload_in_exam: true,
			activate_url_filtering: false,
			filter_embedded_content: false,
			expressions_allowed: String::new(),
			regex_allowed: String::new(),
			expressions_blocked: String::new(),
			regex_blocked: String::new(),
			suppress_seb_download_link: false,
			allowed_browser_exam_keys: String::new(),
			config: String::new(),
			config_key: String::new(),
			updated_at: now(),
		}
	}

	/// Record used when adopting a quiz that only required the safe browser
	/// before per-quiz settings existed.
	pub fn migrated(quiz_id: QuizId, cm_id: CmId) -> Self {
		Self {
			mode: SebMode::ClientManagedConfig,
			user_confirm_quit: false,
			..Self::new(quiz_id, cm_id)
		}
	}

	/// Boolean settings and the client configuration keys they are written to,
	/// in the order they appear in a compiled document.
	pub fn bool_config_entries(&self) -> [(&'static str, bool); 13] {
		[
			("showTaskBar", self.show_seb_taskbar),
			("allowWlan", self.show_wifi_control),
			("showReloadButton", self.show_reload_button),
			("showTime", self.show_time),
			("showInputLanguage", self.show_keyboard_layout),
			("allowQuit", self.allow_user_quit_seb),
			("quitURLConfirm", self.user_confirm_quit),
			("audioControlEnabled", self.enable_audio_control),
			("audioMute", self.mute_on_startup),
			("allowSpellCheck", self.allow_spell_checking),
			("browserWindowAllowReload", self.allow_reload_in_exam),
			("URLFilterEnable", self.activate_url_filtering),
			("URLFilterEnableContentFilter", self.filter_embedded_content),
		]
	}
}

// SettingsUpdate //
//****************//
/// Editable part of the settings record, as submitted by the management API.
///
/// Missing fields keep their current value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
	pub cm_id: Option<CmId>,
	/// `null` clears the template reference
	#[serde(default, with = "::serde_with::rust::double_option")]
	pub template_id: Option<Option<TemplateId>>,
	pub mode: Option<SebMode>,
	pub show_seb_taskbar: Option<bool>,
	pub show_wifi_control: Option<bool>,
	pub show_reload_button: Option<bool>,
	pub show_time: Option<bool>,
	pub show_keyboard_layout: Option<bool>,
	pub allow_user_quit_seb: Option<bool>,
	pub quit_password: Option<String>,
	pub link_quit_seb: Option<String>,
	pub user_confirm_quit: Option<bool>,
	pub enable_audio_control: Option<bool>,
	pub mute_on_startup: Option<bool>,
	pub allow_spell_checking: Option<bool>,
	pub allow_reload_in_exam: Option<bool>,
	pub activate_url_filtering: Option<bool>,
	pub filter_embedded_content: Option<bool>,
	pub expressions_allowed: Option<String>,
	pub regex_allowed: Option<String>,
	pub expressions_blocked: Option<String>,
	pub regex_blocked: Option<String>,
	pub suppress_seb_download_link: Option<bool>,
	pub allowed_browser_exam_keys: Option<String>,
}

impl SettingsUpdate {
	pub fn apply_to(self, settings: &mut QuizSettings) {
		macro_rules! apply {
			($($field:ident),* $(,)?) => {
				$(if let Some(value) = self.$field {
					settings.$field = value;
				})*
			};
		}
		apply!(
			cm_id,
			template_id,
			mode,
			show_seb_taskbar,
			show_wifi_control,
			show_reload_button,
			show_time,
			show_keyboard_layout,
			allow_user_quit_seb,
			quit_password,
			link_quit_seb,
			user_confirm_quit,
			enable_audio_control,
			mute_on_startup,
			allow_spell_checking,
			allow_reload_in_exam,
			activate_url_filtering,
			filter_embedded_content,
			expressions_allowed,
			regex_allowed,
			expressions_blocked,
			regex_blocked,
			suppress_seb_download_link,
			allowed_browser_exam_keys,
		);
	}
}


// vim: ts=4
