//! LRU cache of template contents
//!
//! Templates are read on every save of a quiz that uses one, and every
//! dependent quiz is recompiled when a template changes. Entries are
//! invalidated on template update and delete.
//!
//! Every invalidation bumps a generation counter. A read that started before
//! an invalidation returns what it read but does not insert it, so content
//! replaced while the read was in flight never lands in the cache.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sebrule_types::meta_adapter::MetaAdapter;
use sebrule_types::prelude::*;

pub struct TemplateCache {
	cache: parking_lot::RwLock<LruCache<TemplateId, Arc<str>>>,
	generation: AtomicU64,
}

impl TemplateCache {
	pub fn new(capacity: usize) -> Self {
		let non_zero = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
		Self {
			cache: parking_lot::RwLock::new(LruCache::new(non_zero)),
			generation: AtomicU64::new(0),
		}
	}

	/// Content of a template, from the cache or the meta adapter
	pub async fn get(
		&self,
		meta: &dyn MetaAdapter,
		template_id: TemplateId,
	) -> ClResult<Option<Arc<str>>> {
		let cached = self.cache.write().get(&template_id).cloned();
		if let Some(content) = cached {
			debug!("Template cache hit: {}", template_id);
			return Ok(Some(content));
		}

		let generation = self.generation.load(Ordering::Acquire);
		let Some(template) = meta.read_template(template_id).await? else {
			return Ok(None);
		};
		let content: Arc<str> = template.content.into();
		self.insert(template_id, content.clone(), generation);
		Ok(Some(content))
	}

	/// Inserts content read at `generation`, unless an invalidation happened since
	fn insert(&self, template_id: TemplateId, content: Arc<str>, generation: u64) {
		let mut cache = self.cache.write();
		if self.generation.load(Ordering::Acquire) == generation {
			cache.put(template_id, content);
		} else {
			debug!("Template {} changed while reading, not cached", template_id);
		}
	}

	pub fn invalidate(&self, template_id: TemplateId) {
		let mut cache = self.cache.write();
		cache.pop(&template_id);
		self.generation.fetch_add(1, Ordering::AcqRel);
	}
}


// vim: ts=4
