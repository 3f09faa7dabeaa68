//! Template management handlers

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};

use sebrule_core::cipher::validate_upload;
use sebrule_types::extract::{Auth, OptionalRequestId};
use sebrule_types::meta_adapter::{CreateTemplate, ListTemplateOptions, Template, UpdateTemplate};
use sebrule_types::types::ApiResponse;

use crate::check_manage;
use crate::prelude::*;
use crate::settings::service::recompile_template_users;

/// Template content must be a plaintext configuration document
fn validate_content(content: &str) -> ClResult<()> {
	validate_upload(content.as_bytes(), "").map(|_| ())
}

fn validate_name(name: &str) -> ClResult<()> {
	if name.trim().is_empty() {
		return Err(Error::ValidationError("template name is required".into()));
	}
	Ok(())
}

/// GET /api/seb/templates - List templates
pub async fn list_templates(
	State(app): State<App>,
	Auth(auth): Auth,
	Query(opts): Query<ListTemplateOptions>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<Template>>>)> {
	check_manage(&auth, "list templates")?;

	let templates = app.meta_adapter.list_templates(&opts).await?;

	let response = ApiResponse::new(templates).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/seb/templates - Create a template
pub async fn post_template(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(create): Json<CreateTemplate>,
) -> ClResult<(StatusCode, Json<ApiResponse<Template>>)> {
	check_manage(&auth, "create a template")?;
	validate_name(&create.name)?;
	validate_content(&create.content)?;

	let template_id = app.meta_adapter.create_template(&create).await?;
	let template = app.meta_adapter.read_template(template_id).await?.ok_or(Error::NotFound)?;
	info!("User {} created template {} ({})", auth.id_tag, template_id, template.name);

	let response = ApiResponse::new(template).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/seb/templates/{template_id} - Read a template
pub async fn get_template(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(template_id): Path<TemplateId>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Template>>)> {
	check_manage(&auth, "read a template")?;

	let template = app.meta_adapter.read_template(template_id).await?.ok_or(Error::NotFound)?;

	let response = ApiResponse::new(template).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/seb/templates/{template_id} - Update a template
///
/// A content change recompiles every quiz based on the template.
pub async fn put_template(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(template_id): Path<TemplateId>,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(update): Json<UpdateTemplate>,
) -> ClResult<(StatusCode, Json<ApiResponse<Template>>)> {
	check_manage(&auth, "update a template")?;
	if let Some(name) = &update.name {
		validate_name(name)?;
	}
	if let Some(content) = &update.content {
		validate_content(content)?;
	}

	let prev = app.meta_adapter.read_template(template_id).await?.ok_or(Error::NotFound)?;
	app.meta_adapter.update_template(template_id, &update).await?;
	app.templates.invalidate(template_id);
	info!("User {} updated template {}", auth.id_tag, template_id);

	if update.content.as_ref().is_some_and(|content| *content != prev.content) {
		recompile_template_users(&app, template_id).await?;
	}

	let template = app.meta_adapter.read_template(template_id).await?.ok_or(Error::NotFound)?;
	let response = ApiResponse::new(template).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/seb/templates/{template_id} - Delete an unused template
pub async fn delete_template(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(template_id): Path<TemplateId>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<bool>>)> {
	check_manage(&auth, "delete a template")?;

	let usage = app.meta_adapter.count_template_usage(template_id).await?;
	if usage > 0 {
		return Err(Error::Conflict(format!("template {} is used by {} quizzes", template_id, usage)));
	}
	if !app.meta_adapter.delete_template(template_id).await? {
		return Err(Error::NotFound);
	}
	app.templates.invalidate(template_id);
	info!("User {} deleted template {}", auth.id_tag, template_id);

	let response = ApiResponse::new(true).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
