//! Cross-frame pooling of transient attachment images.
//!
//! Keyed by `(name, format, extent)`: the same key reuses the same handle
//! across frames instead of reallocating every frame a pass runs. A handle
//! not reacquired for [`EVICTION_FRAMES`] consecutive frames is dropped,
//! which lets a handle (e.g. a shadow-map sized for a light that left the
//! scene) eventually be reclaimed without pinning every size ever seen.
//!
//! Generic over the handle type `H` so this crate stays free of a concrete
//! GPU backend dependency; `ember_render` supplies `create` closures that
//! return real `wgpu` texture handles.

use rustc_hash::FxHashMap;

const EVICTION_FRAMES: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TransientKey {
    name: String,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

struct Entry<H> {
    handle: H,
    touched_this_frame: bool,
    frames_unused: u32,
}

pub struct TransientPool<H> {
    entries: FxHashMap<TransientKey, Entry<H>>,
}

impl<H> TransientPool<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Returns the pooled handle for `(name, format, width, height)`,
    /// creating one via `create` on first use or after eviction.
    pub fn acquire(
        &mut self,
        name: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        create: impl FnOnce() -> H,
    ) -> &mut H {
        let key = TransientKey {
            name: name.to_string(),
            format,
            width,
            height,
        };
        let entry = self.entries.entry(key).or_insert_with(|| Entry {
            handle: create(),
            touched_this_frame: true,
            frames_unused: 0,
        });
        entry.touched_this_frame = true;
        &mut entry.handle
    }

    /// Call once per frame after every pass has run its `acquire` calls:
    /// ages entries untouched this frame and evicts ones stale too long.
    pub fn end_frame(&mut self) {
        self.entries.retain(|_, entry| {
            if entry.touched_this_frame {
                entry.frames_unused = 0;
            } else {
                entry.frames_unused += 1;
            }
            entry.touched_this_frame = false;
            entry.frames_unused <= EVICTION_FRAMES
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H> Default for TransientPool<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_entry_is_evicted_after_the_grace_period() {
        let mut pool: TransientPool<u32> = TransientPool::new();
        pool.acquire("shadow", wgpu::TextureFormat::Depth32Float, 512, 512, || 1);
        assert_eq!(pool.len(), 1);

        for _ in 0..EVICTION_FRAMES {
            pool.end_frame();
            assert_eq!(pool.len(), 1, "must survive within the grace period");
        }
        pool.end_frame();
        assert_eq!(pool.len(), 0, "must be evicted once the grace period elapses");
    }

    #[test]
    fn reacquiring_each_frame_keeps_the_entry_alive_indefinitely() {
        let mut pool: TransientPool<u32> = TransientPool::new();
        for _ in 0..(EVICTION_FRAMES * 3) {
            pool.acquire("gbuffer", wgpu::TextureFormat::Rgba8Unorm, 1920, 1080, || 1);
            pool.end_frame();
        }
        assert_eq!(pool.len(), 1);
    }
}
