//! Custom Axum extractors for request context set up by the host application.
//!
//! The host's authentication layer inserts an [`Auth`] into the request
//! extensions. A request id, when present, is carried the same way.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::Error;

/// Role allowing to manage Safe Exam Browser settings and templates
pub const ROLE_MANAGE: &str = "seb:manage";
/// Role allowing to skip the Safe Exam Browser checks
pub const ROLE_BYPASS: &str = "seb:bypass";
/// Site administrator
pub const ROLE_ADMIN: &str = "SADM";

// AuthCtx //
//*********//
#[derive(Clone, Debug)]
pub struct AuthCtx {
	pub id_tag: Box<str>,
	pub roles: Box<[Box<str>]>,
}

impl AuthCtx {
	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r.as_ref() == role)
	}

	pub fn can_manage(&self) -> bool {
		self.has_role(ROLE_MANAGE) || self.has_role(ROLE_ADMIN)
	}
}

// Auth //
//******//
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::PermissionDenied)
		}
	}
}

// OptionalAuth //
//**************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthCtx>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().cloned().map(|a| a.0);
		Ok(OptionalAuth(auth))
	}
}

// RequestId //
//***********//
/// Request ID for tracing and debugging
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Optional Request ID extractor - always succeeds, returns None if not available
#[derive(Clone, Debug)]
pub struct OptionalRequestId(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalRequestId
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let req_id = parts.extensions.get::<RequestId>().map(|r| r.0.clone());
		Ok(OptionalRequestId(req_id))
	}
}

// vim: ts=4
