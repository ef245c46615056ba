// Backend context shared between the subsystem and every playable it issued

use crate::streamed::StreamSlot;
use parking_lot::Mutex;
use playdeck_core::{AudioBackend, SamplePool, SoundStats};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

pub(crate) struct SoundContext {
    backend: Arc<dyn AudioBackend>,
    /// None when degraded or after close
    pool: Mutex<Option<Box<dyn SamplePool>>>,
    streams: Mutex<Vec<Weak<Mutex<StreamSlot>>>>,
    degraded: bool,
    closed: AtomicBool,
}

impl SoundContext {
    pub(crate) fn new(backend: Arc<dyn AudioBackend>, pool: Option<Box<dyn SamplePool>>) -> Self {
        let degraded = pool.is_none();
        Self {
            backend,
            pool: Mutex::new(pool),
            streams: Mutex::new(Vec::new()),
            degraded,
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn backend(&self) -> &dyn AudioBackend {
        self.backend.as_ref()
    }

    /// Whether new handles can still be backed by real resources
    pub(crate) fn is_live(&self) -> bool {
        !self.degraded && !self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Run `f` against the pool, or return None once it is gone
    pub(crate) fn with_pool<R>(&self, f: impl FnOnce(&mut dyn SamplePool) -> R) -> Option<R> {
        let mut pool = self.pool.lock();
        pool.as_mut().map(|pool| f(pool.as_mut()))
    }

    pub(crate) fn track_stream(&self, slot: &Arc<Mutex<StreamSlot>>) {
        self.streams.lock().push(Arc::downgrade(slot));
    }

    /// Reap finished pool voices and forget dropped streams
    pub(crate) fn update(&self) {
        self.with_pool(|pool| pool.update());
        self.streams.lock().retain(|weak| weak.strong_count() > 0);
    }

    pub(crate) fn stats(&self) -> SoundStats {
        let mut stats = SoundStats::default();

        if let Some((loaded, active)) = self.with_pool(|pool| (pool.loaded_count(), pool.active_voices())) {
            stats.sample_count = loaded as u32;
            stats.playing_samples = active as u32;
        }

        for slot in self.streams.lock().iter().filter_map(Weak::upgrade) {
            let slot = slot.lock();
            if let Some(player) = slot.player.as_ref() {
                stats.stream_count += 1;
                if player.is_playing() {
                    stats.playing_streams += 1;
                }
            }
        }

        stats
    }

    /// Release the pool and every open stream pipeline
    pub(crate) fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(mut pool) = self.pool.lock().take() {
            pool.release();
        }

        let streams = std::mem::take(&mut *self.streams.lock());
        let mut released = 0;
        for slot in streams.iter().filter_map(Weak::upgrade) {
            if slot.lock().release() {
                released += 1;
            }
        }

        self.backend.shutdown();

        log::info!(
            "[sound] {} backend closed, {} streams released",
            self.backend.name(),
            released
        );
    }
}
