//! Adapter that manages metadata: quiz settings records and configuration templates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;
use crate::settings::QuizSettings;

// Templates
//***********
/// Named, reusable configuration document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
	pub template_id: TemplateId,
	pub name: Box<str>,
	pub description: Box<str>,
	pub content: Box<str>,
	pub enabled: bool,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplate {
	pub name: Box<str>,
	#[serde(default)]
	pub description: Box<str>,
	pub content: Box<str>,
	#[serde(default = "default_enabled")]
	pub enabled: bool,
}

fn default_enabled() -> bool {
	true
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplate {
	pub name: Option<Box<str>>,
	pub description: Option<Box<str>>,
	pub content: Option<Box<str>>,
	pub enabled: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTemplateOptions {
	pub enabled: Option<bool>,
}

#[async_trait]
pub trait MetaAdapter: Debug + Send + Sync {
	// Quiz settings
	//***************
	/// Reads the settings record of a quiz
	async fn read_quiz_settings(&self, quiz_id: QuizId) -> ClResult<Option<QuizSettings>>;

	/// Reads the settings record of a quiz by its course module id
	async fn read_quiz_settings_by_cm(&self, cm_id: CmId) -> ClResult<Option<QuizSettings>>;

	/// Lists the settings records that reference a template
	async fn list_quiz_settings_by_template(
		&self,
		template_id: TemplateId,
	) -> ClResult<Vec<QuizSettings>>;

	/// Creates or replaces the settings record of a quiz in one statement
	async fn upsert_quiz_settings(&self, settings: &QuizSettings) -> ClResult<()>;

	/// Deletes the settings record of a quiz, returns whether it existed
	async fn delete_quiz_settings(&self, quiz_id: QuizId) -> ClResult<bool>;

	// Templates
	//***********
	async fn list_templates(&self, opts: &ListTemplateOptions) -> ClResult<Vec<Template>>;
	async fn read_template(&self, template_id: TemplateId) -> ClResult<Option<Template>>;
	async fn create_template(&self, template: &CreateTemplate) -> ClResult<TemplateId>;
	async fn update_template(
		&self,
		template_id: TemplateId,
		template: &UpdateTemplate,
	) -> ClResult<()>;
	async fn delete_template(&self, template_id: TemplateId) -> ClResult<bool>;

	/// Number of settings records referencing a template
	async fn count_template_usage(&self, template_id: TemplateId) -> ClResult<u32>;
}


// vim: ts=4
