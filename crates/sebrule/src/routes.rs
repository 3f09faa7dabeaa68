//! API routes

use axum::{
	Router,
	extract::DefaultBodyLimit,
	middleware,
	routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::access;
use crate::backup;
use crate::config_file;
use crate::prelude::*;
use crate::settings;
use crate::template;

fn init_api(app: App) -> Router {
	Router::new()
		// --- Settings ---
		.route(
			"/api/quizzes/{quiz_id}/seb",
			get(settings::handler::get_settings)
				.put(settings::handler::put_settings)
				.delete(settings::handler::delete_settings),
		)
		.route("/api/quizzes/{quiz_id}/seb/config", get(settings::handler::get_config))
		// --- Uploaded config files ---
		.route(
			"/api/quizzes/{quiz_id}/seb/config-file",
			post(config_file::handler::post_config_file)
				.delete(config_file::handler::delete_config_file),
		)
		// --- Backup ---
		.route("/api/quizzes/{quiz_id}/seb/backup", get(backup::handler::get_backup))
		.route("/api/quizzes/{quiz_id}/seb/restore", post(backup::handler::post_restore))
		// --- Templates ---
		.route(
			"/api/seb/templates",
			get(template::handler::list_templates).post(template::handler::post_template),
		)
		.route(
			"/api/seb/templates/{template_id}",
			get(template::handler::get_template)
				.put(template::handler::put_template)
				.delete(template::handler::delete_template),
		)
		.layer(DefaultBodyLimit::max(app.opts.max_upload_size))
		.with_state(app)
}

/// Builds the router of the service. The exam routes of the host, if any,
/// are merged behind the access middleware.
pub fn init(app: App, protected: Option<Router>) -> Router {
	let mut router = init_api(app.clone());

	if let Some(protected) = protected {
		router = router.merge(
			protected
				.route_layer(middleware::from_fn_with_state(app, access::require_seb_access)),
		);
	}

	router.layer(TraceLayer::new_for_http())
}

// vim: ts=4
