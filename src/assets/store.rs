use std::collections::HashMap;
use std::path::Path;

use crate::{
    assets::PreparedImage,
    foundation::error::{MockupError, MockupResult},
};

/// Identity of a decoded pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(usize);

impl TextureId {
    pub fn of(image: &PreparedImage) -> Self {
        Self(image.buffer_id())
    }
}

/// One counted reference to a cached texture.
///
/// Not `Clone`: every handle is given back through
/// [`TextureCache::release`], and additional holders go through [`TextureCache::share`].
#[derive(Debug)]
pub struct TextureHandle {
    id: TextureId,
    image: PreparedImage,
}

impl TextureHandle {
    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn image(&self) -> &PreparedImage {
        &self.image
    }
}

/// Outcome of giving a handle back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// Last reference dropped; the cache no longer holds the buffer.
    Freed,
    /// Other holders (typically the live preview) still reference the buffer.
    Retained { remaining: u32 },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextureCacheStats {
    pub decoded: u64,
    pub shared_hits: u64,
    pub freed: u64,
    pub live_textures: usize,
    pub live_bytes: usize,
}

struct Entry {
    image: PreparedImage,
    source_key: Option<String>,
    refs: u32,
}

/// Reference-counted texture arena keyed by decoded-buffer identity.
///
/// The preview and an in-flight export can hold the same design texture at once; a texture
/// is dropped only when its last holder releases it.
#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<TextureId, Entry>,
    id_by_source: HashMap<String, TextureId>,
    stats: TextureCacheStats,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> TextureCacheStats {
        self.stats.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: TextureId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn ref_count(&self, id: TextureId) -> u32 {
        self.entries.get(&id).map_or(0, |e| e.refs)
    }

    /// Return the texture already loaded for `source_key`, or decode it with `load`.
    pub fn acquire<F>(&mut self, source_key: &str, load: F) -> MockupResult<TextureHandle>
    where
        F: FnOnce() -> MockupResult<PreparedImage>,
    {
        if let Some(&id) = self.id_by_source.get(source_key)
            && let Some(entry) = self.entries.get_mut(&id)
        {
            entry.refs += 1;
            self.stats.shared_hits += 1;
            tracing::debug!(source_key, refs = entry.refs, "texture cache hit");
            return Ok(TextureHandle {
                id,
                image: entry.image.clone(),
            });
        }

        let image = load()?;
        if self.entries.contains_key(&TextureId::of(&image)) {
            // loader handed back a buffer that is already cached under another key
            return Ok(self.adopt(image));
        }
        self.stats.decoded += 1;
        Ok(self.insert(Some(source_key.to_owned()), image))
    }

    /// Register an already decoded image (no source key, so never shared by lookup).
    pub fn adopt(&mut self, image: PreparedImage) -> TextureHandle {
        let id = TextureId::of(&image);
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.refs += 1;
            return TextureHandle {
                id,
                image: entry.image.clone(),
            };
        }
        self.insert(None, image)
    }

    /// Take an extra reference on a texture somebody already holds.
    pub fn share(&mut self, handle: &TextureHandle) -> MockupResult<TextureHandle> {
        let entry = self
            .entries
            .get_mut(&handle.id)
            .ok_or_else(|| MockupError::render("share of a texture that is not cached"))?;
        entry.refs += 1;
        self.stats.shared_hits += 1;
        Ok(TextureHandle {
            id: handle.id,
            image: entry.image.clone(),
        })
    }

    pub fn release(&mut self, handle: TextureHandle) -> Release {
        let Some(entry) = self.entries.get_mut(&handle.id) else {
            return Release::Freed;
        };
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs > 0 {
            return Release::Retained {
                remaining: entry.refs,
            };
        }

        if let Some(entry) = self.entries.remove(&handle.id) {
            if let Some(key) = entry.source_key {
                self.id_by_source.remove(&key);
            }
            self.stats.freed += 1;
            self.stats.live_textures = self.entries.len();
            self.stats.live_bytes = self
                .stats
                .live_bytes
                .saturating_sub(entry.image.rgba8_premul.len());
        }
        Release::Freed
    }

    fn insert(&mut self, source_key: Option<String>, image: PreparedImage) -> TextureHandle {
        let id = TextureId::of(&image);
        if let Some(key) = &source_key {
            self.id_by_source.insert(key.clone(), id);
        }
        self.stats.live_bytes = self
            .stats
            .live_bytes
            .saturating_add(image.rgba8_premul.len());
        self.entries.insert(
            id,
            Entry {
                image: image.clone(),
                source_key,
                refs: 1,
            },
        );
        self.stats.live_textures = self.entries.len();
        TextureHandle { id, image }
    }
}

/// Normalized cache key for a file-backed texture.
pub fn source_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
