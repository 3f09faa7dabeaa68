//! Common types used throughout sebrule.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

macro_rules! id_type {
	($name:ident) => {
		#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
		pub struct $name(pub i64);

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl Serialize for $name {
			fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
			where
				S: serde::Serializer,
			{
				serializer.serialize_i64(self.0)
			}
		}

		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
			where
				D: serde::Deserializer<'de>,
			{
				Ok($name(i64::deserialize(deserializer)?))
			}
		}
	};
}

// QuizId //
//********//
id_type!(QuizId);

// CmId //
//******//
// Course module id of a quiz. Part of the start URL and the key of the uploaded file.
id_type!(CmId);

// TemplateId //
//************//
id_type!(TemplateId);

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub i64);

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

pub fn now() -> Timestamp {
	let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
	Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
}

// ApiResponse //
//*************//
/// Envelope of every successful API response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
	pub data: T,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub req_id: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, req_id: None }
	}

	pub fn with_req_id(mut self, req_id: String) -> Self {
		if !req_id.is_empty() {
			self.req_id = Some(req_id);
		}
		self
	}
}


// vim: ts=4
