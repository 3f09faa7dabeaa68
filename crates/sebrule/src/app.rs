//! App builder - constructs and runs the sebrule application

use axum::Router;
use std::sync::Arc;
use url::Url;

use sebrule_types::blob_adapter::BlobAdapter;
use sebrule_types::meta_adapter::MetaAdapter;
use sebrule_types::prelude::*;

use crate::routes;
use crate::template::cache::TemplateCache;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_MAX_UPLOAD_SIZE: usize = 2 * 1024 * 1024;
const DEFAULT_TEMPLATE_CACHE_SIZE: usize = 100;

pub struct AppState {
	pub opts: AppBuilderOpts,

	pub meta_adapter: Arc<dyn MetaAdapter>,
	pub blob_adapter: Arc<dyn BlobAdapter>,

	/// Raw template contents, by template id
	pub templates: TemplateCache,
}

pub type App = Arc<AppState>;

pub struct Adapters {
	pub meta_adapter: Option<Arc<dyn MetaAdapter>>,
	pub blob_adapter: Option<Arc<dyn BlobAdapter>>,
}

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Public base URL of the site. Start URLs and request URLs are built from it.
	pub www_root: Url,
	pub max_upload_size: usize,
	pub template_cache_size: usize,
}

pub struct AppBuilder {
	listen: Box<str>,
	www_root: Box<str>,
	max_upload_size: usize,
	template_cache_size: usize,
	adapters: Adapters,
	protected_router: Option<Router>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// Several apps may be built in one process (tests), only the first installs the subscriber
		let _ignore_err = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			listen: "127.0.0.1:8080".into(),
			www_root: "http://localhost:8080".into(),
			max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
			template_cache_size: DEFAULT_TEMPLATE_CACHE_SIZE,
			adapters: Adapters { meta_adapter: None, blob_adapter: None },
			protected_router: None,
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.listen = listen.into();
		self
	}
	pub fn www_root(&mut self, www_root: impl Into<Box<str>>) -> &mut Self {
		self.www_root = www_root.into();
		self
	}
	pub fn max_upload_size(&mut self, max_upload_size: usize) -> &mut Self {
		self.max_upload_size = max_upload_size;
		self
	}
	pub fn template_cache_size(&mut self, template_cache_size: usize) -> &mut Self {
		self.template_cache_size = template_cache_size;
		self
	}

	/// Exam routes of the host application. Every route must carry a
	/// `{cm_id}` path parameter, requests are checked with the quiz settings
	/// of that course module.
	pub fn protected_router(&mut self, router: Router) -> &mut Self {
		self.protected_router = Some(router);
		self
	}

	// Adapters
	pub fn meta_adapter(&mut self, meta_adapter: Arc<dyn MetaAdapter>) -> &mut Self {
		self.adapters.meta_adapter = Some(meta_adapter);
		self
	}
	pub fn blob_adapter(&mut self, blob_adapter: Arc<dyn BlobAdapter>) -> &mut Self {
		self.adapters.blob_adapter = Some(blob_adapter);
		self
	}

	/// Builds the application state and its router without starting a listener
	pub fn build(self) -> ClResult<(App, Router)> {
		let www_root = Url::parse(&self.www_root).map_err(|e| {
			error!("FATAL: Invalid www_root '{}': {}", self.www_root, e);
			Error::ConfigError(format!("invalid www_root: {}", e))
		})?;
		if !matches!(www_root.scheme(), "http" | "https") {
			error!("FATAL: www_root must be an http or https URL");
			return Err(Error::ConfigError("www_root must be an http or https URL".into()));
		}

		let Some(meta_adapter) = self.adapters.meta_adapter else {
			error!("FATAL: No meta adapter configured");
			return Err(Error::Internal("No meta adapter configured".to_string()));
		};
		let Some(blob_adapter) = self.adapters.blob_adapter else {
			error!("FATAL: No blob adapter configured");
			return Err(Error::Internal("No blob adapter configured".to_string()));
		};

		let opts = AppBuilderOpts {
			listen: self.listen,
			www_root,
			max_upload_size: self.max_upload_size,
			template_cache_size: self.template_cache_size,
		};
		let app: App = Arc::new(AppState {
			templates: TemplateCache::new(opts.template_cache_size),
			opts,
			meta_adapter,
			blob_adapter,
		});

		let router = routes::init(app.clone(), self.protected_router);
		Ok((app, router))
	}

	pub async fn run(self) -> ClResult<()> {
		info!("sebrule V{}", VERSION);

		let (app, router) = self.build()?;
		info!("Site root: {}", app.opts.www_root);

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
			Error::from(e)
		})?;
		info!("Listening on HTTP {}", app.opts.listen);

		axum::serve(listener, router).await?;
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
