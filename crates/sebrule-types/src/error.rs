//! Error type shared by the sebrule crates and adapters.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};

use crate::types::{CmId, TemplateId};

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	DbError,
	Parse,
	Conflict(String),
	ValidationError(String),
	ConfigError(String),
	Internal(String),

	// configuration documents
	/// The document is not a well-formed property list
	MalformedDocument(String),
	/// An encrypted upload could not be decrypted
	DecryptionFailed,
	/// Uploaded configuration mode without an uploaded document
	NoConfigFileFound(CmId),
	/// Template mode without a resolvable template
	MissingTemplate(Option<TemplateId>),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::warn!("JSON: {}", err);
		Self::Parse
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::Conflict(msg) => write!(f, "conflict: {}", msg),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::MalformedDocument(msg) => write!(f, "malformed configuration document: {}", msg),
			Error::DecryptionFailed => write!(f, "configuration file could not be decrypted"),
			Error::NoConfigFileFound(cm_id) => {
				write!(f, "no configuration file found for course module {}", cm_id)
			}
			Error::MissingTemplate(Some(id)) => write!(f, "template {} not found", id),
			Error::MissingTemplate(None) => write!(f, "no template selected"),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl Error {
	/// Stable error code used in API responses
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "E-NOT-FOUND",
			Error::PermissionDenied => "E-PERMISSION-DENIED",
			Error::Conflict(_) => "E-CONFLICT",
			Error::ValidationError(_) => "E-VALIDATION",
			Error::MalformedDocument(_) => "E-SEB-MALFORMED",
			Error::DecryptionFailed => "E-SEB-DECRYPT",
			Error::NoConfigFileFound(_) => "E-SEB-NO-CONFIG-FILE",
			Error::MissingTemplate(_) => "E-SEB-MISSING-TEMPLATE",
			Error::Parse => "E-PARSE",
			Error::DbError
			| Error::ConfigError(_)
			| Error::Internal(_)
			| Error::Io(_) => "E-INTERNAL",
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::Conflict(_) => StatusCode::CONFLICT,
			Error::Parse => StatusCode::BAD_REQUEST,
			Error::ValidationError(_)
			| Error::MalformedDocument(_)
			| Error::DecryptionFailed
			| Error::NoConfigFileFound(_)
			| Error::MissingTemplate(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Error::DbError | Error::ConfigError(_) | Error::Internal(_) | Error::Io(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
			tracing::error!("Internal error: {}", self);
			"Internal server error".to_string()
		} else {
			self.to_string()
		};
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": message,
			}
		});
		(status, Json(body)).into_response()
	}
}


// vim: ts=4
