//! Compiles quiz settings into the client configuration document and its config key.
//!
//! [`recompile`] is pure: collaborator data (template content, uploaded file)
//! is fetched by the caller and passed in [`CompileSources`]. The input
//! record is never modified, so a failed compilation leaves nothing half done.

use url::Url;

use sebrule_types::settings::{QuizSettings, SebMode};

use crate::config_key;
use crate::filter_rule::build_rules;
use crate::plist::{Document, Value};
use crate::prelude::*;

/// Documents the compilation may be based on
#[derive(Clone, Copy, Debug, Default)]
pub struct CompileSources<'a> {
	/// Content of the template referenced by the record
	pub template: Option<&'a [u8]>,
	/// Uploaded configuration file of the course module (plaintext)
	pub config_file: Option<&'a [u8]>,
}

#[derive(Clone, Copy, Debug)]
pub struct CompileOpts<'a> {
	/// Public base URL of the site
	pub www_root: &'a Url,
}

/// URL the client opens when starting the exam
pub fn start_url(www_root: &Url, cm_id: CmId) -> String {
	format!("{}/mod/quiz/view.php?id={}", www_root.as_str().trim_end_matches('/'), cm_id)
}

fn hash_password(password: &str) -> String {
	config_key::derive(password.as_bytes())
}

fn apply_quit_password(settings: &QuizSettings, doc: &mut Document) {
	if !settings.quit_password.is_empty() {
		doc.append_to_root("hashedQuitPassword", hash_password(&settings.quit_password));
	}
}

/// Copies a quit URL found in a template or uploaded file back to the record
fn copy_quit_url_from_document(settings: &mut QuizSettings, doc: &Document) {
	if let Some(quit_url) = doc.get_str("quitURL").filter(|url| !url.is_empty()) {
		settings.link_quit_seb = quit_url.to_string();
	}
}

fn apply_enforced_settings(settings: &QuizSettings, doc: &mut Document, opts: &CompileOpts<'_>) {
	doc.set("startURL", start_url(opts.www_root, settings.cm_id));
	doc.set("sendBrowserExamKey", true);
}

fn manual_document(settings: &QuizSettings, opts: &CompileOpts<'_>) -> Document {
	let mut doc = Document::new();

	for (key, enabled) in settings.bool_config_entries() {
		doc.append_to_root(key, enabled);
	}
	apply_quit_password(settings, &mut doc);
	if !settings.link_quit_seb.is_empty() {
		doc.set("quitURL", settings.link_quit_seb.as_str());
	}

	let rules = build_rules(
		&settings.expressions_allowed,
		&settings.expressions_blocked,
		&settings.regex_allowed,
		&settings.regex_blocked,
	);
	doc.append_to_root(
		"URLFilterRules",
		rules.iter().map(|rule| rule.to_value()).collect::<Vec<Value>>(),
	);
	doc.set("examSessionClearCookiesOnStart", false);

	apply_enforced_settings(settings, &mut doc, opts);
	doc
}

/// Document of a template or uploaded file with the quiz specific settings applied
fn based_document(
	settings: &mut QuizSettings,
	base: &[u8],
	opts: &CompileOpts<'_>,
) -> ClResult<Document> {
	let mut doc = Document::parse(base)?;
	apply_quit_password(settings, &mut doc);
	copy_quit_url_from_document(settings, &doc);
	apply_enforced_settings(settings, &mut doc, opts);
	Ok(doc)
}

/// Recomputes the derived `config` and `config_key` fields of a record.
///
/// Returns the updated record; `settings` is left untouched.
pub fn recompile(
	settings: &QuizSettings,
	sources: &CompileSources<'_>,
	opts: &CompileOpts<'_>,
) -> ClResult<QuizSettings> {
	let mut compiled = settings.clone();

	let doc = match settings.mode {
		SebMode::Disabled | SebMode::ClientManagedConfig => {
			compiled.template_id = None;
			Document::new()
		}
		SebMode::ManualConfig => {
			compiled.template_id = None;
			manual_document(&compiled, opts)
		}
		SebMode::UseTemplate => {
			let Some(template_id) = settings.template_id else {
				return Err(Error::MissingTemplate(None));
			};
			let template = sources.template.ok_or(Error::MissingTemplate(Some(template_id)))?;
			based_document(&mut compiled, template, opts)?
		}
		SebMode::UploadedConfig => {
			compiled.template_id = None;
			let file = sources.config_file.ok_or(Error::NoConfigFileFound(settings.cm_id))?;
			based_document(&mut compiled, file, opts)?
		}
	};

	let bytes = doc.serialize();
	compiled.config_key = config_key::derive(&bytes);
	compiled.config = String::from_utf8(bytes)
		.map_err(|_| Error::Internal("serialized document is not UTF-8".into()))?;
	compiled.updated_at = sebrule_types::types::now();

	debug!(
		"Compiled config for quiz {} (mode {:?}): key {}",
		compiled.quiz_id, compiled.mode, compiled.config_key
	);
	Ok(compiled)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn www_root() -> Url {
		Url::parse("https://example.com/moodle").unwrap()
	}

	fn settings(mode: SebMode) -> QuizSettings {
		let mut s = QuizSettings::new(QuizId(10), CmId(20));
		s.mode = mode;
		s
	}

	fn compile(s: &QuizSettings, sources: &CompileSources<'_>) -> ClResult<QuizSettings> {
		let root = www_root();
		recompile(s, sources, &CompileOpts { www_root: &root })
	}

	fn parsed(s: &QuizSettings) -> Document {
		Document::parse(s.config.as_bytes()).unwrap()
	}

	fn template_content() -> Vec<u8> {
		let mut doc = Document::new();
		doc.set("allowQuit", false);
		doc.set("quitURL", "https://example.com/quit");
		doc.set("startURL", "https://other.example.com/");
		doc.serialize()
	}

	#[test]
	fn test_start_url() {
		assert_eq!(start_url(&www_root(), CmId(5)), "https://example.com/moodle/mod/quiz/view.php?id=5");
		let root = Url::parse("https://example.com/").unwrap();
		assert_eq!(start_url(&root, CmId(5)), "https://example.com/mod/quiz/view.php?id=5");
	}

	#[test]
	fn test_disabled_and_client_managed_are_empty() {
		for mode in [SebMode::Disabled, SebMode::ClientManagedConfig] {
			let mut s = settings(mode);
			s.template_id = Some(TemplateId(3));
			let c = compile(&s, &CompileSources::default()).unwrap();
			assert_eq!(c.template_id, None);
			assert_eq!(parsed(&c), Document::new());
			assert_eq!(c.config_key, config_key::derive(Document::new().serialize().as_slice()));
		}
	}

	#[test]
	fn test_manual_single_toggle() {
		let mut s = settings(SebMode::ManualConfig);
		s.show_seb_taskbar = true;
		s.show_wifi_control = false;
		s.show_reload_button = false;
		s.show_time = false;
		s.show_keyboard_layout = false;
		s.allow_user_quit_seb = false;
		s.user_confirm_quit = false;
		s.enable_audio_control = false;
		s.mute_on_startup = false;
		s.allow_spell_checking = false;
		s.allow_reload_in_exam = false;
		s.activate_url_filtering = false;
		s.filter_embedded_content = false;

		let doc = parsed(&compile(&s, &CompileSources::default()).unwrap());
		for (key, _) in s.bool_config_entries() {
			let expected = key == "showTaskBar";
			assert_eq!(doc.get(key), Some(&Value::Bool(expected)), "key {}", key);
		}
	}

	#[test]
	fn test_manual_document_layout() {
		let mut s = settings(SebMode::ManualConfig);
		s.template_id = Some(TemplateId(3));
		s.quit_password = "test".into();
		s.link_quit_seb = "https://example.com/quit".into();
		s.expressions_allowed = "a.com\nb.com".into();
		s.regex_blocked = ".*c.com".into();

		let c = compile(&s, &CompileSources::default()).unwrap();
		assert_eq!(c.template_id, None);
		let doc = parsed(&c);

		assert_eq!(
			doc.get_str("hashedQuitPassword"),
			Some("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")
		);
		assert_eq!(doc.get_str("quitURL"), Some("https://example.com/quit"));
		assert_eq!(doc.get("examSessionClearCookiesOnStart"), Some(&Value::Bool(false)));
		assert_eq!(doc.get_str("startURL"), Some("https://example.com/moodle/mod/quiz/view.php?id=20"));
		assert_eq!(doc.get("sendBrowserExamKey"), Some(&Value::Bool(true)));

		let rules = doc.get("URLFilterRules").and_then(Value::as_array).unwrap();
		let expressions: Vec<_> = rules
			.iter()
			.map(|r| r.as_dict().and_then(|d| d.get("expression")).and_then(Value::as_str).unwrap())
			.collect();
		assert_eq!(expressions, ["a.com", "b.com", ".*c.com"]);

		let keys: Vec<&str> = doc.root().iter().map(|(k, _)| k).collect();
		assert_eq!(keys[0], "showTaskBar");
		assert_eq!(
			&keys[13..],
			[
				"hashedQuitPassword",
				"quitURL",
				"URLFilterRules",
				"examSessionClearCookiesOnStart",
				"startURL",
				"sendBrowserExamKey"
			]
		);
	}

	#[test]
	fn test_manual_without_rules_has_empty_array() {
		let c = compile(&settings(SebMode::ManualConfig), &CompileSources::default()).unwrap();
		assert!(c.config.contains("<key>URLFilterRules</key><array/>"));
		let doc = parsed(&c);
		assert!(doc.get("hashedQuitPassword").is_none());
		assert!(doc.get("quitURL").is_none());
		assert_eq!(doc.get("quitURLConfirm"), Some(&Value::Bool(true)));
	}

	#[test]
	fn test_compile_is_deterministic() {
		let mut s = settings(SebMode::ManualConfig);
		s.expressions_blocked = "x.org".into();
		let a = compile(&s, &CompileSources::default()).unwrap();
		let b = compile(&a, &CompileSources::default()).unwrap();
		assert_eq!(a.config, b.config);
		assert_eq!(a.config_key, b.config_key);
		assert_eq!(a.config_key, config_key::derive(a.config.as_bytes()));
	}

	#[test]
	fn test_template_mode() {
		let mut s = settings(SebMode::UseTemplate);
		s.template_id = Some(TemplateId(3));
		s.quit_password = "test".into();
		let content = template_content();

		let c = compile(&s, &CompileSources { template: Some(content.as_slice()), config_file: None }).unwrap();
		assert_eq!(c.template_id, Some(TemplateId(3)));
		assert_eq!(c.link_quit_seb, "https://example.com/quit");

		let doc = parsed(&c);
		assert_eq!(doc.get("allowQuit"), Some(&Value::Bool(false)));
		assert_eq!(doc.get_str("startURL"), Some("https://example.com/moodle/mod/quiz/view.php?id=20"));
		assert_eq!(doc.get("sendBrowserExamKey"), Some(&Value::Bool(true)));
		assert!(doc.get("hashedQuitPassword").is_some());
		// settings fields are not applied on top of a template
		assert!(doc.get("showTaskBar").is_none());
	}

	#[test]
	fn test_template_mode_missing_template() {
		let s = settings(SebMode::UseTemplate);
		assert!(matches!(compile(&s, &CompileSources::default()), Err(Error::MissingTemplate(None))));

		let mut s = settings(SebMode::UseTemplate);
		s.template_id = Some(TemplateId(9));
		assert!(matches!(
			compile(&s, &CompileSources::default()),
			Err(Error::MissingTemplate(Some(TemplateId(9))))
		));
	}

	#[test]
	fn test_uploaded_mode() {
		let mut s = settings(SebMode::UploadedConfig);
		s.template_id = Some(TemplateId(3));
		s.link_quit_seb = "https://keep.example.com".into();
		let mut file = Document::new();
		file.set("allowWlan", true);
		let bytes = file.serialize();

		let c = compile(&s, &CompileSources { template: None, config_file: Some(bytes.as_slice()) }).unwrap();
		assert_eq!(c.template_id, None);
		assert_eq!(c.link_quit_seb, "https://keep.example.com");
		let doc = parsed(&c);
		assert_eq!(doc.get("allowWlan"), Some(&Value::Bool(true)));
		assert_eq!(doc.get("sendBrowserExamKey"), Some(&Value::Bool(true)));
	}

	#[test]
	fn test_uploaded_mode_without_file() {
		let s = settings(SebMode::UploadedConfig);
		let res = compile(&s, &CompileSources::default());
		assert!(matches!(res, Err(Error::NoConfigFileFound(CmId(20)))));
	}

	#[test]
	fn test_malformed_base_document() {
		let s = settings(SebMode::UploadedConfig);
		let junk: &[u8] = b"<?xml?>junk";
		let res = compile(&s, &CompileSources { template: None, config_file: Some(junk) });
		assert!(matches!(res, Err(Error::MalformedDocument(_))));
	}
}

// vim: ts=4
