//! Shared setup of the service integration tests

#![allow(dead_code)]

use axum::{
	Router,
	body::Body,
	http::{Method, Request, Response, StatusCode, header},
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use sebrule_core::plist::Document;
use sebrule::extract::{Auth, AuthCtx, ROLE_BYPASS, ROLE_MANAGE};
use sebrule::{App, AppBuilder};
use sebrule_blob_adapter_fs::BlobAdapterFs;
use sebrule_meta_adapter_sqlite::MetaAdapterSqlite;

pub const WWW_ROOT: &str = "https://example.com/moodle";

pub struct TestContext {
	pub app: App,
	pub router: Router,
	_temp: TempDir,
}

pub async fn setup(protected: Option<Router>) -> TestContext {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let meta = MetaAdapterSqlite::new(temp_dir.path().join("db").join("meta.db"))
		.await
		.expect("Failed to create meta adapter");
	let blob = BlobAdapterFs::new(temp_dir.path().join("data").into())
		.await
		.expect("Failed to create blob adapter");

	let mut builder = AppBuilder::new();
	builder.www_root(WWW_ROOT).meta_adapter(Arc::new(meta)).blob_adapter(Arc::new(blob));
	if let Some(protected) = protected {
		builder.protected_router(protected);
	}
	let (app, router) = builder.build().expect("Failed to build app");

	TestContext { app, router, _temp: temp_dir }
}

/// User as inserted by the host's authentication layer
pub fn user(roles: &[&str]) -> Auth {
	Auth(AuthCtx {
		id_tag: "instructor".into(),
		roles: roles.iter().map(|r| Box::<str>::from(*r)).collect(),
	})
}

pub fn manager() -> Option<Auth> {
	Some(user(&[ROLE_MANAGE]))
}

pub fn bypasser() -> Option<Auth> {
	Some(user(&[ROLE_BYPASS]))
}

pub fn request(method: Method, uri: &str, auth: Option<Auth>, body: Body) -> Request<Body> {
	let mut req = Request::builder().method(method).uri(uri).body(body).expect("request");
	if let Some(auth) = auth {
		req.extensions_mut().insert(auth);
	}
	req
}

pub fn json_request(method: Method, uri: &str, auth: Option<Auth>, body: Option<Value>) -> Request<Body> {
	let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
	let mut req = request(method, uri, auth, body);
	req.headers_mut().insert(header::CONTENT_TYPE, "application/json".parse().expect("header"));
	req
}

pub async fn send(ctx: &TestContext, req: Request<Body>) -> Response<Body> {
	ctx.router.clone().oneshot(req).await.expect("request failed")
}

pub async fn read_bytes(response: Response<Body>) -> Vec<u8> {
	axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body").to_vec()
}

pub async fn read_json(response: Response<Body>) -> Value {
	let bytes = read_bytes(response).await;
	serde_json::from_slice(&bytes).expect("JSON body")
}

/// Sends a JSON request, asserts the status and returns the body
pub async fn call(
	ctx: &TestContext,
	method: Method,
	uri: &str,
	body: Option<Value>,
	status: StatusCode,
) -> Value {
	let response = send(ctx, json_request(method, uri, manager(), body)).await;
	let got = response.status();
	let json = read_json(response).await;
	assert_eq!(got, status, "{} response: {}", uri, json);
	json
}

/// Plaintext configuration document with the given boolean keys
pub fn document(entries: &[(&str, bool)]) -> Vec<u8> {
	let mut doc = Document::new();
	for (key, value) in entries {
		doc.set(*key, *value);
	}
	doc.serialize()
}

pub fn document_text(entries: &[(&str, bool)]) -> String {
	String::from_utf8(document(entries)).expect("UTF-8 document")
}

// vim: ts=4
