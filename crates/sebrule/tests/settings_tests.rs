//! Settings, config file and download API tests

mod common;

use axum::body::Body;
use axum::http::{Method, StatusCode, header};
use serde_json::json;

use common::*;
use sebrule::blob_adapter::BlobAdapter;
use sebrule_core::cipher;
use sebrule::types::CmId;

#[tokio::test]
async fn test_get_defaults_without_settings() {
	let ctx = setup(None).await;

	let res = call(&ctx, Method::GET, "/api/quizzes/1/seb?cmId=5", None, StatusCode::OK).await;
	assert_eq!(res["data"]["quizId"], 1);
	assert_eq!(res["data"]["cmId"], 5);
	assert_eq!(res["data"]["mode"], "disabled");
	assert_eq!(res["data"]["showSebTaskbar"], true);
	assert_eq!(res["data"]["config"], "");
}

#[tokio::test]
async fn test_management_requires_role() {
	let ctx = setup(None).await;

	let response = send(&ctx, json_request(Method::GET, "/api/quizzes/1/seb", None, None)).await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let student = Some(user(&["student"]));
	let response = send(&ctx, json_request(Method::GET, "/api/quizzes/1/seb", student, None)).await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	let res = read_json(response).await;
	assert_eq!(res["error"]["code"], "E-PERMISSION-DENIED");

	let admin = Some(user(&["SADM"]));
	let response = send(&ctx, json_request(Method::GET, "/api/quizzes/1/seb", admin, None)).await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_save_manual_settings() {
	let ctx = setup(None).await;

	let body = json!({ "cmId": 10, "mode": "manualConfig", "showWifiControl": true });
	let res = call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;
	let config = res["data"]["config"].as_str().expect("config");
	let config_key = res["data"]["configKey"].as_str().expect("config key");
	assert!(config.contains("<key>allowWlan</key><true/>"));
	assert!(config.contains("https://example.com/moodle/mod/quiz/view.php?id=10"));
	assert_eq!(config_key.len(), 64);

	let read = call(&ctx, Method::GET, "/api/quizzes/1/seb", None, StatusCode::OK).await;
	assert_eq!(read["data"]["mode"], "manualConfig");
	assert_eq!(read["data"]["configKey"], config_key);

	// missing fields keep their value
	let body = json!({ "showTime": false });
	let res = call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;
	assert_eq!(res["data"]["showWifiControl"], true);
	assert_eq!(res["data"]["showTime"], false);
	assert_ne!(res["data"]["configKey"], config_key);
}

#[tokio::test]
async fn test_new_settings_need_course_module() {
	let ctx = setup(None).await;

	let body = json!({ "mode": "manualConfig" });
	call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::UNPROCESSABLE_ENTITY).await;
}

#[tokio::test]
async fn test_course_module_conflict() {
	let ctx = setup(None).await;

	let body = json!({ "cmId": 10, "mode": "manualConfig" });
	call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body.clone()), StatusCode::OK).await;
	call(&ctx, Method::PUT, "/api/quizzes/2/seb", Some(body), StatusCode::CONFLICT).await;
}

#[tokio::test]
async fn test_uploaded_mode_without_file_keeps_record() {
	let ctx = setup(None).await;

	let body = json!({ "cmId": 10, "mode": "manualConfig" });
	let saved = call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;

	let body = json!({ "mode": "uploadedConfig" });
	let res =
		call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::UNPROCESSABLE_ENTITY)
			.await;
	assert_eq!(res["error"]["code"], "E-SEB-NO-CONFIG-FILE");

	let read = call(&ctx, Method::GET, "/api/quizzes/1/seb", None, StatusCode::OK).await;
	assert_eq!(read["data"]["mode"], "manualConfig");
	assert_eq!(read["data"]["configKey"], saved["data"]["configKey"]);
}

#[tokio::test]
async fn test_invalid_browser_exam_keys() {
	let ctx = setup(None).await;

	let key = "a".repeat(64);
	let body = json!({
		"cmId": 10,
		"mode": "clientManagedConfig",
		"allowedBrowserExamKeys": format!("{}\n{}", key, key.to_uppercase()),
	});
	call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::UNPROCESSABLE_ENTITY).await;

	let body = json!({ "cmId": 10, "mode": "clientManagedConfig", "allowedBrowserExamKeys": "xyz" });
	call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::UNPROCESSABLE_ENTITY).await;

	let body = json!({ "cmId": 10, "mode": "clientManagedConfig", "allowedBrowserExamKeys": key });
	call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;
}

#[tokio::test]
async fn test_upload_and_use_config_file() {
	let ctx = setup(None).await;

	let file = document(&[("allowWlan", true), ("showTime", false)]);
	let req = request(
		Method::POST,
		"/api/quizzes/1/seb/config-file?cmId=10",
		manager(),
		Body::from(file.clone()),
	);
	let response = send(&ctx, req).await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let res = read_json(response).await;
	assert_eq!(res["data"]["cmId"], 10);
	assert_eq!(res["data"]["size"], file.len());

	let body = json!({ "cmId": 10, "mode": "uploadedConfig" });
	let res = call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;
	let config = res["data"]["config"].as_str().expect("config");
	assert!(config.contains("<key>allowWlan</key><true/>"));
	assert!(config.contains("<key>sendBrowserExamKey</key><true/>"));

	// the file in use cannot be deleted
	call(&ctx, Method::DELETE, "/api/quizzes/1/seb/config-file", None, StatusCode::CONFLICT).await;

	// replacing the file recompiles the quiz
	let file = document(&[("allowWlan", false)]);
	let req =
		request(Method::POST, "/api/quizzes/1/seb/config-file", manager(), Body::from(file));
	let res = read_json(send(&ctx, req).await).await;
	let config = res["data"]["settings"]["config"].as_str().expect("recompiled config");
	assert!(config.contains("<key>allowWlan</key><false/>"));

	let body = json!({ "mode": "manualConfig" });
	call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;
	call(&ctx, Method::DELETE, "/api/quizzes/1/seb/config-file", None, StatusCode::OK).await;
	call(&ctx, Method::DELETE, "/api/quizzes/1/seb/config-file", None, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn test_upload_encrypted_config_file() {
	let ctx = setup(None).await;
	let file = cipher::encrypt(&document(&[("allowQuit", false)]), "exam").expect("encrypt");

	let uri = "/api/quizzes/1/seb/config-file?cmId=10";
	let response = send(&ctx, request(Method::POST, uri, manager(), Body::from(file.clone()))).await;
	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
	let res = read_json(response).await;
	assert_eq!(res["error"]["message"], "validation error: not a valid configuration file");

	let mut req = request(Method::POST, uri, manager(), Body::from(file.clone()));
	req.headers_mut().insert("x-seb-password", "wrong".parse().expect("header"));
	assert_eq!(send(&ctx, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let mut req = request(Method::POST, uri, manager(), Body::from(file));
	req.headers_mut().insert("x-seb-password", "exam".parse().expect("header"));
	assert_eq!(send(&ctx, req).await.status(), StatusCode::CREATED);

	let body = json!({ "cmId": 10, "mode": "uploadedConfig" });
	let res = call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;
	assert!(res["data"]["config"].as_str().expect("config").contains("<key>allowQuit</key><false/>"));
}

#[tokio::test]
async fn test_upload_rejects_garbage() {
	let ctx = setup(None).await;

	let req = request(
		Method::POST,
		"/api/quizzes/1/seb/config-file?cmId=10",
		manager(),
		Body::from("hello world"),
	);
	assert_eq!(send(&ctx, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

	// quizzes without settings need the course module
	let req = request(
		Method::POST,
		"/api/quizzes/1/seb/config-file",
		manager(),
		Body::from(document(&[])),
	);
	assert_eq!(send(&ctx, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_download_config() {
	let ctx = setup(None).await;

	let body = json!({ "cmId": 10, "mode": "disabled" });
	call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;
	let response = send(&ctx, request(Method::GET, "/api/quizzes/1/seb/config", manager(), Body::empty())).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);

	let body = json!({ "mode": "manualConfig", "quitPassword": "secret" });
	let res = call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;
	let config = res["data"]["config"].as_str().expect("config").to_string();

	// any signed in user may download
	let student = Some(user(&["student"]));
	let response = send(&ctx, request(Method::GET, "/api/quizzes/1/seb/config", student, Body::empty())).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.headers()[header::CONTENT_TYPE], "application/seb");
	assert!(
		response.headers()[header::CONTENT_DISPOSITION]
			.to_str()
			.expect("header")
			.contains("config.seb")
	);
	assert_eq!(read_bytes(response).await, config.as_bytes());

	let mut req = request(Method::GET, "/api/quizzes/1/seb/config", manager(), Body::empty());
	req.headers_mut().insert("x-seb-password", "pw".parse().expect("header"));
	let response = send(&ctx, req).await;
	assert_eq!(response.status(), StatusCode::OK);
	let encrypted = read_bytes(response).await;
	assert_ne!(encrypted, config.as_bytes());
	assert_eq!(cipher::decrypt(&encrypted, "pw").expect("decrypt"), config.as_bytes());
}

#[tokio::test]
async fn test_delete_settings() {
	let ctx = setup(None).await;

	let req = request(
		Method::POST,
		"/api/quizzes/1/seb/config-file?cmId=10",
		manager(),
		Body::from(document(&[])),
	);
	assert_eq!(send(&ctx, req).await.status(), StatusCode::CREATED);
	let body = json!({ "cmId": 10, "mode": "uploadedConfig" });
	call(&ctx, Method::PUT, "/api/quizzes/1/seb", Some(body), StatusCode::OK).await;

	call(&ctx, Method::DELETE, "/api/quizzes/1/seb", None, StatusCode::OK).await;
	call(&ctx, Method::DELETE, "/api/quizzes/1/seb", None, StatusCode::NOT_FOUND).await;

	// the uploaded file went with the settings
	let file = ctx.app.blob_adapter.read_config_file(CmId(10)).await.expect("read");
	assert!(file.is_none());
}

// vim: ts=4
