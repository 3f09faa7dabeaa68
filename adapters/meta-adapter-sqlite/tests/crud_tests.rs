//! Meta adapter CRUD operation tests
//!
//! Tests Create, Read, Update, Delete operations for quiz settings and templates

use sebrule_meta_adapter_sqlite::MetaAdapterSqlite;
use sebrule_types::error::Error;
use sebrule_types::meta_adapter::{CreateTemplate, ListTemplateOptions, MetaAdapter, UpdateTemplate};
use sebrule_types::settings::{QuizSettings, SebMode};
use sebrule_types::types::{CmId, QuizId, TemplateId};
use tempfile::TempDir;

async fn create_test_adapter() -> (MetaAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");

	let adapter = MetaAdapterSqlite::new(temp_dir.path().join("meta.db"))
		.await
		.expect("Failed to create adapter");

	(adapter, temp_dir)
}

fn template(name: &str, content: &str) -> CreateTemplate {
	CreateTemplate {
		name: name.into(),
		description: "".into(),
		content: content.into(),
		enabled: true,
	}
}

#[tokio::test]
async fn test_read_missing_settings() {
	let (adapter, _temp) = create_test_adapter().await;

	let res = adapter.read_quiz_settings(QuizId(1)).await.expect("Should query settings");
	assert!(res.is_none());
	let res = adapter.read_quiz_settings_by_cm(CmId(1)).await.expect("Should query settings");
	assert!(res.is_none());
}

#[tokio::test]
async fn test_upsert_and_read_settings() {
	let (adapter, _temp) = create_test_adapter().await;

	let mut settings = QuizSettings::new(QuizId(1), CmId(10));
	settings.mode = SebMode::ManualConfig;
	settings.quit_password = "secret".into();
	settings.expressions_allowed = "a.com\nb.com".into();
	settings.show_wifi_control = true;
	settings.config = "<plist/>".into();
	settings.config_key = "abc".into();

	adapter.upsert_quiz_settings(&settings).await.expect("Should insert settings");

	let read = adapter.read_quiz_settings(QuizId(1)).await.expect("Should read").expect("Exists");
	assert_eq!(read, settings);
	let by_cm = adapter.read_quiz_settings_by_cm(CmId(10)).await.expect("Should read").expect("Exists");
	assert_eq!(by_cm, settings);
}

#[tokio::test]
async fn test_upsert_replaces_whole_record() {
	let (adapter, _temp) = create_test_adapter().await;

	let mut settings = QuizSettings::new(QuizId(1), CmId(10));
	settings.mode = SebMode::ManualConfig;
	adapter.upsert_quiz_settings(&settings).await.expect("Should insert settings");

	settings.mode = SebMode::ClientManagedConfig;
	settings.allowed_browser_exam_keys = "k".into();
	settings.show_time = false;
	adapter.upsert_quiz_settings(&settings).await.expect("Should update settings");

	let read = adapter.read_quiz_settings(QuizId(1)).await.expect("Should read").expect("Exists");
	assert_eq!(read.mode, SebMode::ClientManagedConfig);
	assert_eq!(read.allowed_browser_exam_keys, "k");
	assert!(!read.show_time);
}

#[tokio::test]
async fn test_course_module_is_unique() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter
		.upsert_quiz_settings(&QuizSettings::new(QuizId(1), CmId(10)))
		.await
		.expect("Should insert settings");
	let res = adapter.upsert_quiz_settings(&QuizSettings::new(QuizId(2), CmId(10))).await;
	assert!(matches!(res, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn test_delete_settings() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter
		.upsert_quiz_settings(&QuizSettings::new(QuizId(1), CmId(10)))
		.await
		.expect("Should insert settings");

	assert!(adapter.delete_quiz_settings(QuizId(1)).await.expect("Should delete"));
	assert!(!adapter.delete_quiz_settings(QuizId(1)).await.expect("Should delete"));
	assert!(adapter.read_quiz_settings(QuizId(1)).await.expect("Should read").is_none());
}

#[tokio::test]
async fn test_template_crud() {
	let (adapter, _temp) = create_test_adapter().await;

	let id = adapter
		.create_template(&template("Exam", "<plist/>"))
		.await
		.expect("Should create template");

	let tpl = adapter.read_template(id).await.expect("Should read").expect("Exists");
	assert_eq!(&*tpl.name, "Exam");
	assert_eq!(&*tpl.content, "<plist/>");
	assert!(tpl.enabled);
	assert!(tpl.created_at.0 > 0);
	let created_at = tpl.created_at;

	let update = UpdateTemplate {
		content: Some("<plist version=\"1.0\"/>".into()),
		enabled: Some(false),
		..Default::default()
	};
	adapter.update_template(id, &update).await.expect("Should update template");

	let tpl = adapter.read_template(id).await.expect("Should read").expect("Exists");
	assert_eq!(&*tpl.name, "Exam");
	assert_eq!(&*tpl.content, "<plist version=\"1.0\"/>");
	assert!(!tpl.enabled);
	assert_eq!(tpl.created_at, created_at);
	assert!(tpl.updated_at >= created_at);

	assert!(adapter.delete_template(id).await.expect("Should delete"));
	assert!(adapter.read_template(id).await.expect("Should read").is_none());
}

#[tokio::test]
async fn test_update_missing_template() {
	let (adapter, _temp) = create_test_adapter().await;

	let res = adapter.update_template(TemplateId(99), &UpdateTemplate::default()).await;
	assert!(matches!(res, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_list_templates() {
	let (adapter, _temp) = create_test_adapter().await;

	let a = adapter.create_template(&template("B", "<plist/>")).await.expect("create");
	let b = adapter.create_template(&template("A", "<plist/>")).await.expect("create");
	adapter
		.update_template(a, &UpdateTemplate { enabled: Some(false), ..Default::default() })
		.await
		.expect("update");

	let all = adapter.list_templates(&ListTemplateOptions::default()).await.expect("list");
	let names: Vec<&str> = all.iter().map(|t| &*t.name).collect();
	assert_eq!(names, ["A", "B"]);

	let enabled =
		adapter.list_templates(&ListTemplateOptions { enabled: Some(true) }).await.expect("list");
	assert_eq!(enabled.len(), 1);
	assert_eq!(enabled[0].template_id, b);
}

#[tokio::test]
async fn test_template_usage() {
	let (adapter, _temp) = create_test_adapter().await;

	let id = adapter.create_template(&template("Exam", "<plist/>")).await.expect("create");
	assert_eq!(adapter.count_template_usage(id).await.expect("count"), 0);

	for i in 1..=2 {
		let mut settings = QuizSettings::new(QuizId(i), CmId(i + 100));
		settings.mode = SebMode::UseTemplate;
		settings.template_id = Some(id);
		adapter.upsert_quiz_settings(&settings).await.expect("Should insert settings");
	}
	adapter
		.upsert_quiz_settings(&QuizSettings::new(QuizId(3), CmId(103)))
		.await
		.expect("Should insert settings");

	assert_eq!(adapter.count_template_usage(id).await.expect("count"), 2);
	let users = adapter.list_quiz_settings_by_template(id).await.expect("list");
	let quizzes: Vec<QuizId> = users.iter().map(|s| s.quiz_id).collect();
	assert_eq!(quizzes, [QuizId(1), QuizId(2)]);
}

// vim: ts=4
