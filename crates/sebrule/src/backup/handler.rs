//! Backup and restore handlers

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};

use sebrule_types::extract::{Auth, OptionalRequestId};
use sebrule_types::settings::QuizSettings;
use sebrule_types::types::ApiResponse;

use super::QuizSettingsBackup;
use crate::check_manage;
use crate::config_file::handler::resolve_cm;
use crate::prelude::*;
use crate::settings::handler::CmQuery;

/// GET /api/quizzes/{quiz_id}/seb/backup - Export the settings of a quiz
pub async fn get_backup(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(quiz_id): Path<QuizId>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<QuizSettingsBackup>>)> {
	check_manage(&auth, "back up settings")?;

	let backup = super::export(&app, quiz_id).await?;
	info!("User {} exported settings of quiz {}", auth.id_tag, quiz_id);

	let response = ApiResponse::new(backup).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/quizzes/{quiz_id}/seb/restore - Restore a backup into a quiz
///
/// Quizzes without settings need the target course module in `cmId`.
pub async fn post_restore(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(quiz_id): Path<QuizId>,
	Query(query): Query<CmQuery>,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(backup): Json<QuizSettingsBackup>,
) -> ClResult<(StatusCode, Json<ApiResponse<QuizSettings>>)> {
	check_manage(&auth, "restore settings")?;

	let (cm_id, _) = resolve_cm(&app, quiz_id, &query).await?;
	let settings = super::restore(&app, quiz_id, cm_id, backup).await?;
	info!("User {} restored settings of quiz {}", auth.id_tag, quiz_id);

	let response = ApiResponse::new(settings).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
