//! Settings management handlers

use axum::{
	Json,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode, header},
	response::{IntoResponse, Response},
};
use serde::Deserialize;

use sebrule_core::cipher;
use sebrule_types::extract::{Auth, OptionalRequestId};
use sebrule_types::settings::{QuizSettings, SebMode, SettingsUpdate};
use sebrule_types::types::ApiResponse;

use super::service;
use crate::check_manage;
use crate::config_file::handler::PASSWORD_HEADER;
use crate::prelude::*;

const CONFIG_CONTENT_TYPE: &str = "application/seb";
const CONFIG_FILE_DISPOSITION: &str = "attachment; filename=\"config.seb\"";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmQuery {
	pub cm_id: Option<CmId>,
}

/// GET /api/quizzes/{quiz_id}/seb - Settings of a quiz, defaults if it has none
pub async fn get_settings(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(quiz_id): Path<QuizId>,
	Query(query): Query<CmQuery>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<QuizSettings>>)> {
	check_manage(&auth, "read settings")?;

	let settings = match app.meta_adapter.read_quiz_settings(quiz_id).await? {
		Some(settings) => settings,
		None => QuizSettings::new(quiz_id, query.cm_id.unwrap_or(CmId(0))),
	};

	let response = ApiResponse::new(settings).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/quizzes/{quiz_id}/seb - Update settings, recompile and store them
pub async fn put_settings(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(quiz_id): Path<QuizId>,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(update): Json<SettingsUpdate>,
) -> ClResult<(StatusCode, Json<ApiResponse<QuizSettings>>)> {
	check_manage(&auth, "update settings")?;

	let existing = app.meta_adapter.read_quiz_settings(quiz_id).await?;
	let prev_template_id = existing.as_ref().and_then(|s| s.template_id);
	let mut settings = match existing {
		Some(settings) => settings,
		None => {
			let Some(cm_id) = update.cm_id else {
				return Err(Error::ValidationError("cmId is required for new settings".into()));
			};
			QuizSettings::new(quiz_id, cm_id)
		}
	};
	update.apply_to(&mut settings);

	// only enabled templates may be newly selected
	if let (SebMode::UseTemplate, Some(template_id)) = (settings.mode, settings.template_id) {
		let template = app
			.meta_adapter
			.read_template(template_id)
			.await?
			.ok_or(Error::MissingTemplate(Some(template_id)))?;
		if !template.enabled && prev_template_id != Some(template_id) {
			return Err(Error::ValidationError(format!("template {} is disabled", template_id)));
		}
	}

	let settings = service::save_settings(&app, &settings).await?;
	info!("User {} updated settings of quiz {}", auth.id_tag, quiz_id);

	let response = ApiResponse::new(settings).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/quizzes/{quiz_id}/seb - Delete settings and the uploaded file
pub async fn delete_settings(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(quiz_id): Path<QuizId>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<bool>>)> {
	check_manage(&auth, "delete settings")?;

	if !service::delete_settings(&app, quiz_id).await? {
		return Err(Error::NotFound);
	}
	info!("User {} deleted settings of quiz {}", auth.id_tag, quiz_id);

	let response = ApiResponse::new(true).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/quizzes/{quiz_id}/seb/config - Download the compiled configuration
///
/// With a password in the `X-Seb-Password` header the file is served as an
/// encrypted container.
pub async fn get_config(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(quiz_id): Path<QuizId>,
	headers: HeaderMap,
) -> ClResult<Response> {
	let settings = app.meta_adapter.read_quiz_settings(quiz_id).await?.ok_or(Error::NotFound)?;
	if matches!(settings.mode, SebMode::Disabled | SebMode::ClientManagedConfig)
		|| settings.config.is_empty()
	{
		return Err(Error::NotFound);
	}

	let password = headers.get(PASSWORD_HEADER).and_then(|v| v.to_str().ok());
	let body = match password.filter(|p| !p.is_empty()) {
		Some(password) => cipher::encrypt(settings.config.as_bytes(), password)?,
		None => settings.config.into_bytes(),
	};
	debug!("User {} downloaded config of quiz {}", auth.id_tag, quiz_id);

	Ok((
		StatusCode::OK,
		[(header::CONTENT_TYPE, CONFIG_CONTENT_TYPE), (header::CONTENT_DISPOSITION, CONFIG_FILE_DISPOSITION)],
		body,
	)
		.into_response())
}

// vim: ts=4
