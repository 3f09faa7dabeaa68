//! Safe Exam Browser access rule service.
//!
//! Manages the per-quiz Safe Exam Browser settings, compiles them into client
//! configuration documents and guards the exam routes of the host
//! application.
//!
//! # Features
//!
//! - Settings per quiz with five configuration modes
//! - Shared configuration templates
//! - Uploaded (optionally encrypted) configuration files
//! - Request validation by config key and browser exam keys
//! - Backup and restore of the settings of a quiz

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from sebrule-types
pub use sebrule_types::blob_adapter;
pub use sebrule_types::error;
pub use sebrule_types::extract;
pub use sebrule_types::meta_adapter;
pub use sebrule_types::types;

// Local modules
pub mod access;
pub mod app;
pub mod backup;
pub mod config_file;
pub mod prelude;
pub mod routes;
pub mod settings;
pub mod template;

pub use crate::app::{App, AppBuilder, AppBuilderOpts, AppState};

use sebrule_types::extract::AuthCtx;
use sebrule_types::prelude::*;

/// Fails with `PermissionDenied` unless the user may manage settings
pub(crate) fn check_manage(auth: &AuthCtx, what: &str) -> ClResult<()> {
	if !auth.can_manage() {
		warn!("User {} attempted to {} without permission", auth.id_tag, what);
		return Err(Error::PermissionDenied);
	}
	Ok(())
}

// vim: ts=4
