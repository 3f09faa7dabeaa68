//! Access middleware for the exam routes of the host application
//!
//! The quiz is looked up by the `{cm_id}` path parameter of the route. Users
//! with the bypass role and quizzes without a Safe Exam Browser requirement
//! pass unchecked, every other request must present valid keys.

use axum::{
	body::Body,
	extract::{OriginalUri, Path, Request, State},
	http::Response,
	middleware::Next,
	response::IntoResponse,
};
use std::collections::HashMap;

use sebrule_core::access::{AccessValidator, can_bypass, request_url};
use sebrule_types::extract::OptionalAuth;

use crate::prelude::*;

/// Path parameter naming the course module of the protected quiz
pub const CM_PARAM: &str = "cm_id";

pub async fn require_seb_access(
	State(app): State<App>,
	Path(params): Path<HashMap<String, String>>,
	OptionalAuth(auth): OptionalAuth,
	OriginalUri(uri): OriginalUri,
	req: Request,
	next: Next,
) -> ClResult<Response<Body>> {
	let Some(cm_param) = params.get(CM_PARAM) else {
		error!("Protected route {} has no {{{}}} parameter", uri.path(), CM_PARAM);
		return Err(Error::ConfigError(format!("protected route without {} parameter", CM_PARAM)));
	};
	let cm_id = CmId(cm_param.parse().map_err(|_| Error::NotFound)?);

	let settings = app.meta_adapter.read_quiz_settings_by_cm(cm_id).await?;
	let validator = AccessValidator::new(settings.as_ref());
	if !validator.is_protected_resource() {
		return Ok(next.run(req).await);
	}

	if let Some(auth) = auth.as_ref().filter(|a| can_bypass(&a.roles)) {
		debug!("User {} bypasses the browser check of course module {}", auth.id_tag, cm_id);
		return Ok(next.run(req).await);
	}

	let path_and_query = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());
	let url = request_url(&app.opts.www_root, path_and_query);
	if let Err(failure) = validator.check(&url, req.headers()) {
		let user = auth.as_ref().map_or("-", |a| a.id_tag.as_ref());
		info!(
			"Access to course module {} denied for {} ({:?}): {}",
			cm_id,
			user,
			validator.mode(),
			failure.code()
		);
		return Ok(failure.into_response());
	}

	Ok(next.run(req).await)
}

// vim: ts=4
