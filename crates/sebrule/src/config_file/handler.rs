//! Config file upload handlers

use axum::{
	Json,
	body::Bytes,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode},
};
use serde::Serialize;

use sebrule_types::extract::{Auth, OptionalRequestId};
use sebrule_types::settings::{QuizSettings, SebMode};
use sebrule_types::types::ApiResponse;

use crate::check_manage;
use crate::prelude::*;
use crate::settings::handler::CmQuery;
use crate::settings::service;

/// Header carrying the password of an encrypted upload
pub const PASSWORD_HEADER: &str = "x-seb-password";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
	pub cm_id: CmId,
	pub size: usize,
	/// Recompiled settings, if the quiz is configured with the uploaded file
	#[serde(skip_serializing_if = "Option::is_none")]
	pub settings: Option<QuizSettings>,
}

/// Course module of a quiz: from its settings, or from the query for new quizzes
pub(crate) async fn resolve_cm(
	app: &App,
	quiz_id: QuizId,
	query: &CmQuery,
) -> ClResult<(CmId, Option<QuizSettings>)> {
	match app.meta_adapter.read_quiz_settings(quiz_id).await? {
		Some(settings) => Ok((settings.cm_id, Some(settings))),
		None => {
			let cm_id = query.cm_id.ok_or_else(|| {
				Error::ValidationError("cmId is required for quizzes without settings".into())
			})?;
			Ok((cm_id, None))
		}
	}
}

/// POST /api/quizzes/{quiz_id}/seb/config-file - Upload a configuration file
///
/// The body is the raw file. Encrypted files need the password in the
/// `X-Seb-Password` header; the decrypted document is stored.
pub async fn post_config_file(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(quiz_id): Path<QuizId>,
	Query(query): Query<CmQuery>,
	OptionalRequestId(req_id): OptionalRequestId,
	headers: HeaderMap,
	body: Bytes,
) -> ClResult<(StatusCode, Json<ApiResponse<UploadResponse>>)> {
	check_manage(&auth, "upload a config file")?;

	let (cm_id, _) = resolve_cm(&app, quiz_id, &query).await?;
	let password = headers.get(PASSWORD_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default();

	let settings = service::store_config_file(&app, cm_id, &body, password).await?;
	info!("User {} uploaded a config file for course module {}", auth.id_tag, cm_id);

	let response = ApiResponse::new(UploadResponse { cm_id, size: body.len(), settings })
		.with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/quizzes/{quiz_id}/seb/config-file - Delete the uploaded file
///
/// Refused while the quiz is configured with the uploaded file.
pub async fn delete_config_file(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(quiz_id): Path<QuizId>,
	Query(query): Query<CmQuery>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<bool>>)> {
	check_manage(&auth, "delete a config file")?;

	let (cm_id, settings) = resolve_cm(&app, quiz_id, &query).await?;
	if settings.is_some_and(|s| s.mode == SebMode::UploadedConfig) {
		return Err(Error::Conflict("the config file is in use by the quiz".into()));
	}
	if !app.blob_adapter.delete_config_file(cm_id).await? {
		return Err(Error::NotFound);
	}
	info!("User {} deleted the config file of course module {}", auth.id_tag, cm_id);

	let response = ApiResponse::new(true).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
