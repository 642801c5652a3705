use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use image::{Rgba, RgbaImage};

/// Default bound on cached gradient overlays.
const GRADIENT_CACHE_CAPACITY: usize = 16;

/// Axis along which a gradient overlay ramps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GradientDirection {
    /// Ramp from the top row to the bottom row.
    Vertical,
    /// Ramp from the left column to the right column.
    Horizontal,
}

/// Cache key for one precomputed gradient overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GradientKey {
    /// Overlay width in pixels.
    pub width: u32,
    /// Overlay height in pixels.
    pub height: u32,
    /// Ramp axis.
    pub direction: GradientDirection,
    /// RGBA at the ramp start (top or left).
    pub start: [u8; 4],
    /// RGBA at the ramp end (bottom or right).
    pub end: [u8; 4],
}

/// Bounded memoization of gradient overlay bitmaps.
///
/// Keyed by (size, direction, colors); least-recently-used entries are
/// evicted once the bound is exceeded. Hits return the shared bitmap
/// without recomputation, observable through [`GradientCache::built_count`].
#[derive(Debug)]
pub struct GradientCache {
    map: HashMap<GradientKey, Arc<RgbaImage>>,
    lru: VecDeque<GradientKey>,
    capacity: usize,
    built: u64,
}

impl Default for GradientCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GradientCache {
    /// Create a cache with the default 16-entry bound.
    pub fn new() -> Self {
        Self::with_capacity(GRADIENT_CACHE_CAPACITY)
    }

    /// Create a cache with an explicit bound (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
            built: 0,
        }
    }

    /// Fetch the overlay for `key`, computing and caching it on a miss.
    pub fn get_or_build(&mut self, key: GradientKey) -> Arc<RgbaImage> {
        if let Some(overlay) = self.map.get(&key).cloned() {
            self.touch(key);
            return overlay;
        }
        let overlay = Arc::new(build_gradient(key));
        self.built += 1;
        self.map.insert(key, Arc::clone(&overlay));
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.map.remove(&old);
            }
        }
        overlay
    }

    /// Number of overlays computed so far (misses).
    pub fn built_count(&self) -> u64 {
        self.built
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn touch(&mut self, key: GradientKey) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

fn build_gradient(key: GradientKey) -> RgbaImage {
    let span = match key.direction {
        GradientDirection::Vertical => key.height,
        GradientDirection::Horizontal => key.width,
    };
    RgbaImage::from_fn(key.width, key.height, |x, y| {
        let along = match key.direction {
            GradientDirection::Vertical => y,
            GradientDirection::Horizontal => x,
        };
        let t = if span > 1 {
            along as f32 / (span - 1) as f32
        } else {
            0.0
        };
        let mut px = [0u8; 4];
        for c in 0..4 {
            let v = key.start[c] as f32 + (key.end[c] as f32 - key.start[c] as f32) * t;
            px[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        Rgba(px)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/cache/gradient.rs"]
mod tests;
