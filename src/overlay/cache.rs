use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::debug;

use crate::{
    area::AreaDefinition,
    foundation::error::SwathResult,
    overlay::{Overlay, OverlayRenderer},
};

/// Topic to rendered overlay. Entries are written once and never evicted.
#[derive(Debug, Default)]
pub struct OverlayCache {
    entries: Mutex<HashMap<String, Arc<Overlay>>>,
}

impl OverlayCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached overlay for `topic`.
    pub fn get(&self, topic: &str) -> Option<Arc<Overlay>> {
        self.lock().get(topic).cloned()
    }

    /// Whether `topic` has an entry.
    pub fn contains(&self, topic: &str) -> bool {
        self.lock().contains_key(topic)
    }

    /// Number of cached overlays.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Return the entry for `topic`, running `render` only when there is none.
    ///
    /// A failed render stores nothing, so the next call tries again.
    pub fn populate_once(
        &self,
        topic: &str,
        render: impl FnOnce() -> SwathResult<Overlay>,
    ) -> SwathResult<Arc<Overlay>> {
        let mut entries = self.lock();
        if let Some(hit) = entries.get(topic) {
            debug!(topic, "using overlay from cache");
            return Ok(Arc::clone(hit));
        }
        debug!(topic, "adding overlay to cache");
        let overlay = Arc::new(render()?);
        entries.insert(topic.to_string(), Arc::clone(&overlay));
        Ok(overlay)
    }

    /// Fetch-or-render keyed by topic. Later calls return the stored overlay whatever the
    /// arguments.
    pub fn get_or_render(
        &self,
        topic: &str,
        overlay_config: &str,
        area: &AreaDefinition,
        renderer: &dyn OverlayRenderer,
    ) -> SwathResult<Arc<Overlay>> {
        self.populate_once(topic, || renderer.render(overlay_config, area))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Overlay>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/cache.rs"]
mod tests;
