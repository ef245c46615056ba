// Sound subsystem: owns the backend context and issues playables

use crate::context::SoundContext;
use crate::sampled::SampledSound;
use crate::mixer::MixerBackend;
use crate::streamed::StreamedSound;
use playdeck_core::{AudioBackend, SoundConfig, SoundStats};
use std::sync::Arc;

/// Entry point for sound playback
///
/// Never fails: when the host's audio services cannot be brought up the
/// subsystem comes up degraded and every handle it issues is a no-op.
pub struct SoundSystem {
    config: SoundConfig,
    context: Arc<SoundContext>,
}

impl SoundSystem {
    /// Initialize with the in-process mixer backend
    pub fn init(config: SoundConfig) -> Self {
        Self::with_backend(config, Arc::new(MixerBackend::new()))
    }

    pub fn with_backend(config: SoundConfig, backend: Arc<dyn AudioBackend>) -> Self {
        let pool = if !config.is_usable() {
            log::warn!("[sound] unusable config {:?}, running without audio", config);
            None
        } else if !backend.is_available(&config) {
            log::warn!("[sound] {} backend unavailable, running without audio", backend.name());
            None
        } else {
            match backend.create_pool(&config) {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("[sound] failed to create sample pool: {}", e);
                    None
                }
            }
        };

        if pool.is_some() {
            log::info!(
                "[sound] initialized {} backend ({} voices, {} samples)",
                backend.name(),
                config.max_voices,
                config.max_samples
            );
        }

        Self {
            config,
            context: Arc::new(SoundContext::new(backend, pool)),
        }
    }

    pub fn config(&self) -> &SoundConfig {
        &self.config
    }

    pub fn is_degraded(&self) -> bool {
        self.context.is_degraded()
    }

    /// Release the pool and every open stream. Handles issued earlier keep
    /// working as no-ops.
    pub fn close(&mut self) {
        self.context.close();
    }

    /// Per-frame hook: reaps finished pooled instances
    pub fn update(&mut self) {
        self.context.update();
    }

    /// Decode `path` into the pool. On any failure the returned handle is
    /// unloaded and ignores every call.
    pub fn load_sample(&self, path: &str) -> SampledSound {
        if !self.context.is_live() {
            return SampledSound::new(self.context.clone(), None);
        }

        let sample = match self.context.with_pool(|pool| pool.load(path)) {
            Some(Ok(id)) => Some(id),
            Some(Err(e)) => {
                log::warn!("[sound] failed to load sample {}: {}", path, e);
                None
            }
            None => None,
        };

        SampledSound::new(self.context.clone(), sample)
    }

    /// Open a stream pipeline for `path`. On failure the returned handle has
    /// no pipeline and ignores every call.
    pub fn load_stream(&self, path: &str) -> StreamedSound {
        if !self.context.is_live() {
            return StreamedSound::new(None);
        }

        let player = match self.context.backend().open_stream(path) {
            Ok(player) => Some(player),
            Err(e) => {
                log::warn!("[sound] failed to open stream {}: {}", path, e);
                None
            }
        };

        let stream = StreamedSound::new(player);
        if stream.is_loaded() {
            self.context.track_stream(stream.slot());
        }
        stream
    }

    pub fn stats(&self) -> SoundStats {
        self.context.stats()
    }
}

impl Drop for SoundSystem {
    fn drop(&mut self) {
        self.context.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_assets::{path_str, write_wav};
    use playdeck_core::{AudioError, Playable, Result, SamplePool, Source, StreamPlayer};

    fn config() -> SoundConfig {
        SoundConfig::new().with_device_probe(false)
    }

    struct UnavailableBackend;

    impl AudioBackend for UnavailableBackend {
        fn is_available(&self, _config: &SoundConfig) -> bool {
            false
        }

        fn create_pool(&self, _config: &SoundConfig) -> Result<Box<dyn SamplePool>> {
            Err(AudioError::Device("no audio".into()))
        }

        fn open_stream(&self, _path: &str) -> Result<Box<dyn StreamPlayer>> {
            Err(AudioError::Device("no audio".into()))
        }

        fn name(&self) -> &'static str {
            "unavailable"
        }
    }

    #[test]
    fn test_degraded_system_issues_noop_handles() {
        let dir = tempfile::tempdir().unwrap();
        let blip = write_wav(dir.path(), "blip.wav", 1.0);
        let system = SoundSystem::with_backend(config(), Arc::new(UnavailableBackend));
        assert!(system.is_degraded());

        let mut sample = system.load_sample(path_str(&blip));
        assert!(!sample.is_loaded());
        sample.play();
        sample.stop();

        let mut stream = system.load_stream(path_str(&blip));
        assert!(!stream.is_loaded());
        stream.play();
        assert_eq!(stream.length(), 0.0);

        assert_eq!(system.stats(), SoundStats::default());
    }

    #[test]
    fn test_zero_capacity_degrades() {
        let system = SoundSystem::init(config().with_max_voices(0));
        assert!(system.is_degraded());
    }

    #[test]
    fn test_invalid_paths_give_degraded_handles() {
        let system = SoundSystem::init(config());
        assert!(!system.is_degraded());

        let mut sample = system.load_sample("/nonexistent/blip.wav");
        let mut stream = system.load_stream("/nonexistent/music.ogg");

        sample.play();
        sample.free();
        assert_eq!(sample.length(), 0.0);
        assert!(stream.play_ex(true).is_none());
        assert_eq!(stream.length(), 0.0);
        assert_eq!(stream.pos(), 0.0);
        assert_eq!(system.stats(), SoundStats::default());
    }

    #[test]
    fn test_exhausted_pool_yields_unloaded_sample() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_wav(dir.path(), "a.wav", 0.5);
        let b = write_wav(dir.path(), "b.wav", 0.5);
        let system = SoundSystem::init(config().with_max_samples(1));

        let first = system.load_sample(path_str(&a));
        let second = system.load_sample(path_str(&b));
        assert!(first.is_loaded());
        assert!(!second.is_loaded());
    }

    #[test]
    fn test_close_invalidates_outstanding_handles() {
        let dir = tempfile::tempdir().unwrap();
        let blip = write_wav(dir.path(), "blip.wav", 2.0);
        let music = write_wav(dir.path(), "music.wav", 5.0);
        let mut system = SoundSystem::init(config());

        let mut sample = system.load_sample(path_str(&blip));
        let mut stream = system.load_stream(path_str(&music));
        sample.play();
        let mut source = stream.play_ex(true).unwrap();

        let stats = system.stats();
        assert_eq!(stats.sample_count, 1);
        assert_eq!(stats.stream_count, 1);
        assert_eq!(stats.playing_samples, 1);
        assert_eq!(stats.playing_streams, 1);

        system.close();
        assert_eq!(system.stats(), SoundStats::default());

        // Everything after close is absorbed
        sample.play();
        sample.stop();
        sample.free();
        source.pause();
        source.set_pos(2.0);
        assert_eq!(source.pos(), 0.0);
        assert!(!stream.is_loaded());

        let late = system.load_sample(path_str(&blip));
        assert!(!late.is_loaded());

        // Closing twice is harmless
        system.close();
    }

    #[test]
    fn test_update_reaps_finished_voices() {
        let dir = tempfile::tempdir().unwrap();
        let blip = write_wav(dir.path(), "blip.wav", 0.05);
        let mut system = SoundSystem::init(config());

        let mut sample = system.load_sample(path_str(&blip));
        sample.play();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while system.stats().playing_samples > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(10));
            system.update();
        }
        assert_eq!(system.stats().playing_samples, 0);
        assert_eq!(system.stats().sample_count, 1);
    }

    #[test]
    fn test_load_then_release_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let blip = write_wav(dir.path(), "blip.wav", 1.0);
        let system = SoundSystem::init(config());

        let mut sample = system.load_sample(path_str(&blip));
        sample.free();
        sample.play();
        assert!(!sample.is_loaded());

        let mut stream = system.load_stream(path_str(&blip));
        Playable::stop(&mut stream);
        stream.free();
        stream.play();
        assert!(!stream.is_loaded());
        assert_eq!(system.stats(), SoundStats::default());
    }
}
