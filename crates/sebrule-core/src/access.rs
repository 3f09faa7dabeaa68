//! Request validation for Safe Exam Browser protected quizzes
//!
//! A validator is built over a read-only snapshot of the stored settings of
//! one quiz. Which checks run depends on the mode:
//!
//! | Mode                  | basic header | config key | browser exam key |
//! |-----------------------|--------------|------------|------------------|
//! | Disabled              |              |            |                  |
//! | ManualConfig          |              | x          |                  |
//! | UseTemplate           |              | x          |                  |
//! | UploadedConfig        |              | x          | x                |
//! | ClientManagedConfig   | x            |            | x                |
//!
//! Checks never fail with an error, they answer with a boolean.

use axum::{
	Json,
	http::{HeaderMap, StatusCode, header},
	response::{IntoResponse, Response},
};
use url::Url;

use sebrule_types::extract::{ROLE_ADMIN, ROLE_BYPASS};
use sebrule_types::settings::{QuizSettings, SebMode};

use crate::browser_keys::split_keys;
use crate::config_key::{hashes_equal, request_hash};

/// Header carrying the hash of the request URL and the config key
pub const CONFIG_KEY_HEADER: &str = "x-safeexambrowser-configkeyhash";
/// Header carrying the hash of the request URL and the browser exam key
pub const BROWSER_EXAM_KEY_HEADER: &str = "x-safeexambrowser-requesthash";

const CLIENT_USER_AGENT_MARKER: &str = "SEB";

// AccessFailure //
//***************//
/// The first check a request failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessFailure {
	/// The user agent does not identify as the exam client
	ClientRequired,
	/// Missing or wrong config key hash
	InvalidConfigKey,
	/// Missing or wrong browser exam key hash
	InvalidBrowserExamKey,
}

impl AccessFailure {
	pub fn code(self) -> &'static str {
		match self {
			AccessFailure::ClientRequired => "E-SEB-CLIENT-REQUIRED",
			AccessFailure::InvalidConfigKey => "E-SEB-CONFIG-KEY",
			AccessFailure::InvalidBrowserExamKey => "E-SEB-BROWSER-KEY",
		}
	}
}

impl std::fmt::Display for AccessFailure {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AccessFailure::ClientRequired => {
				write!(f, "This quiz has been configured so that it may only be attempted using the Safe Exam Browser")
			}
			AccessFailure::InvalidConfigKey => {
				write!(f, "The config key could not be validated. Please ensure you are using the Safe Exam Browser with correct configuration file")
			}
			AccessFailure::InvalidBrowserExamKey => {
				write!(f, "The browser exam key could not be validated. Please ensure you are using the Safe Exam Browser with correct configuration file")
			}
		}
	}
}

impl std::error::Error for AccessFailure {}

impl IntoResponse for AccessFailure {
	fn into_response(self) -> Response {
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": self.to_string(),
			}
		});
		(StatusCode::FORBIDDEN, Json(body)).into_response()
	}
}

// AccessValidator //
//*****************//
pub struct AccessValidator<'a> {
	settings: Option<&'a QuizSettings>,
}

impl<'a> AccessValidator<'a> {
	/// A quiz without stored settings is treated as disabled
	pub fn new(settings: Option<&'a QuizSettings>) -> Self {
		Self { settings }
	}

	pub fn mode(&self) -> SebMode {
		self.settings.map_or(SebMode::Disabled, |s| s.mode)
	}

	pub fn is_protected_resource(&self) -> bool {
		self.mode() != SebMode::Disabled
	}

	pub fn should_validate_basic_header(&self) -> bool {
		self.mode() == SebMode::ClientManagedConfig
	}

	pub fn should_validate_config_key(&self) -> bool {
		matches!(self.mode(), SebMode::ManualConfig | SebMode::UseTemplate | SebMode::UploadedConfig)
	}

	pub fn should_validate_identity_keys(&self) -> bool {
		matches!(self.mode(), SebMode::UploadedConfig | SebMode::ClientManagedConfig)
	}

	/// Weak check: the user agent mentions the exam client
	pub fn user_agent_claims_client(headers: &HeaderMap) -> bool {
		header_str(headers, header::USER_AGENT.as_str())
			.is_some_and(|ua| ua.contains(CLIENT_USER_AGENT_MARKER))
	}

	pub fn received_config_key(headers: &HeaderMap) -> Option<&str> {
		header_str(headers, CONFIG_KEY_HEADER)
	}

	pub fn received_browser_exam_key(headers: &HeaderMap) -> Option<&str> {
		header_str(headers, BROWSER_EXAM_KEY_HEADER)
	}

	pub fn validate_basic_header(&self, headers: &HeaderMap) -> bool {
		!self.should_validate_basic_header() || Self::user_agent_claims_client(headers)
	}

	/// `url` must be the absolute URL of the request as the client sees it
	pub fn validate_config_key(&self, url: &str, headers: &HeaderMap) -> bool {
		if !self.should_validate_config_key() {
			return true;
		}
		let (Some(settings), Some(received)) = (self.settings, Self::received_config_key(headers))
		else {
			return false;
		};
		hashes_equal(&request_hash(url, &settings.config_key), received)
	}

	/// Passes if the request hash matches any of the allowed browser exam
	/// keys. An empty allowed list skips the check.
	pub fn validate_identity_keys(&self, url: &str, headers: &HeaderMap) -> bool {
		if !self.should_validate_identity_keys() {
			return true;
		}
		let allowed = self.settings.map(|s| split_keys(&s.allowed_browser_exam_keys)).unwrap_or_default();
		if allowed.is_empty() {
			return true;
		}
		let Some(received) = Self::received_browser_exam_key(headers) else {
			return false;
		};
		// no early exit, every key is compared
		allowed
			.iter()
			.fold(false, |found, key| hashes_equal(&request_hash(url, key), received) | found)
	}

	/// Runs the checks in order and reports the first one that failed
	pub fn check(&self, url: &str, headers: &HeaderMap) -> Result<(), AccessFailure> {
		if !self.validate_basic_header(headers) {
			return Err(AccessFailure::ClientRequired);
		}
		if !self.validate_config_key(url, headers) {
			return Err(AccessFailure::InvalidConfigKey);
		}
		if !self.validate_identity_keys(url, headers) {
			return Err(AccessFailure::InvalidBrowserExamKey);
		}
		Ok(())
	}
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
	headers.get(name).and_then(|v| v.to_str().ok())
}

/// Whether an actor with these roles skips the checks
pub fn can_bypass<S: AsRef<str>>(roles: &[S]) -> bool {
	roles.iter().any(|r| matches!(r.as_ref(), ROLE_BYPASS | ROLE_ADMIN))
}

/// Absolute URL of a request: the origin of the site followed by the
/// request path and query
pub fn request_url(www_root: &Url, path_and_query: &str) -> String {
	format!("{}{}", www_root.origin().ascii_serialization(), path_and_query)
}


// vim: ts=4
