use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use super::{gif_size_bytes, webm_size_bytes};
use crate::format::OutputFormat;
use crate::metadata::VideoMetadata;

/// Entries kept before the cache starts over.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Every metadata field the advisory formulas read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    format: OutputFormat,
    duration_bits: u64,
    width: u32,
    height: u32,
    fps: u32,
    size: u64,
}

impl CacheKey {
    fn new(format: OutputFormat, meta: &VideoMetadata) -> Self {
        Self {
            format,
            duration_bits: meta.duration.to_bits(),
            width: meta.width,
            height: meta.height,
            fps: meta.fps,
            size: meta.size,
        }
    }
}

/// Memoizes advisory size estimates.
///
/// Owned explicitly by its users; nothing is shared process-wide. Keys come
/// from client-supplied metadata, so the map is emptied whenever it reaches
/// `capacity`.
#[derive(Debug)]
pub struct EstimateCache {
    entries: Mutex<HashMap<CacheKey, f64>>,
    capacity: usize,
}

impl Default for EstimateCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl EstimateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn gif_size(&self, meta: &VideoMetadata) -> f64 {
        self.get_or_compute(OutputFormat::Gif, meta, gif_size_bytes)
    }

    pub fn webm_size(&self, meta: &VideoMetadata) -> f64 {
        self.get_or_compute(OutputFormat::WebM, meta, webm_size_bytes)
    }

    pub fn size(&self, format: OutputFormat, meta: &VideoMetadata) -> f64 {
        match format {
            OutputFormat::Gif => self.gif_size(meta),
            OutputFormat::WebM => self.webm_size(meta),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached estimate.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn get_or_compute(
        &self,
        format: OutputFormat,
        meta: &VideoMetadata,
        compute: fn(&VideoMetadata) -> f64,
    ) -> f64 {
        let key = CacheKey::new(format, meta);
        let mut entries = self.lock();
        if let Some(value) = entries.get(&key) {
            return *value;
        }
        if entries.len() >= self.capacity {
            debug!(capacity = self.capacity, "Estimate cache full, clearing");
            entries.clear();
        }
        *entries.entry(key).or_insert_with(|| compute(meta))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, f64>> {
        // Entries are plain numbers, so a poisoned map is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
