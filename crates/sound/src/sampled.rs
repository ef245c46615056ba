// Pooled short sounds: fire-and-forget playback, no seeking

use crate::context::SoundContext;
use playdeck_core::{clamp_volume, PlayParams, Playable, SampleId, Source, VoiceId};
use std::sync::Arc;

/// Short sound backed by the sample pool
///
/// Holds a reference (the pool id) to the decoded sample, never the sample
/// itself. A handle whose load failed, or that was freed, does nothing.
pub struct SampledSound {
    context: Arc<SoundContext>,
    sample: Option<SampleId>,
    volume: f32,
    last_voice: Option<VoiceId>,
}

impl SampledSound {
    pub(crate) fn new(context: Arc<SoundContext>, sample: Option<SampleId>) -> Self {
        Self {
            context,
            sample,
            volume: 1.0,
            last_voice: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.sample.is_some()
    }

    /// The most recently issued instance, if it has not been stopped
    pub fn last_voice(&self) -> Option<VoiceId> {
        self.last_voice
    }

    fn start_voice(&mut self) -> Option<VoiceId> {
        let sample = self.sample?;
        let params = PlayParams::once(self.volume);
        self.context
            .with_pool(|pool| pool.play(sample, params))
            .flatten()
    }

    /// Play once and hand back control over that one instance
    pub fn play_source(&mut self) -> Option<SampleSource> {
        self.play();
        self.last_voice
            .map(|voice| SampleSource::new(self.context.clone(), voice, self.volume))
    }
}

impl Playable for SampledSound {
    type Source = SampleSource;

    fn free(&mut self) {
        if let Some(sample) = self.sample.take() {
            self.context.with_pool(|pool| pool.unload(sample));
            self.last_voice = None;
        }
    }

    fn set_volume(&mut self, volume: f32) {
        // Takes effect on the next play
        self.volume = clamp_volume(volume);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn length(&self) -> f32 {
        0.0
    }

    fn play(&mut self) {
        if self.sample.is_none() {
            return;
        }
        // Earlier instances are abandoned, not stopped
        self.last_voice = self.start_voice();
    }

    fn play_ex(&mut self, _looping: bool) -> Option<SampleSource> {
        None
    }

    fn stop(&mut self) {
        if let Some(voice) = self.last_voice.take() {
            self.context.with_pool(|pool| pool.stop(voice));
        }
    }
}

/// Control over one pooled instance
pub struct SampleSource {
    context: Arc<SoundContext>,
    voice: Option<VoiceId>,
    volume: f32,
}

impl SampleSource {
    pub(crate) fn new(context: Arc<SoundContext>, voice: VoiceId, volume: f32) -> Self {
        if volume != 1.0 {
            context.with_pool(|pool| pool.set_volume(voice, volume));
        }
        Self {
            context,
            voice: Some(voice),
            volume,
        }
    }

    pub fn voice(&self) -> Option<VoiceId> {
        self.voice
    }

    /// False once the instance was stopped, stolen or ran to its end
    pub fn is_active(&self) -> bool {
        match self.voice {
            Some(voice) => self
                .context
                .with_pool(|pool| pool.is_active(voice))
                .unwrap_or(false),
            None => false,
        }
    }
}

impl Source for SampleSource {
    fn pause(&mut self) {
        if let Some(voice) = self.voice {
            self.context.with_pool(|pool| pool.pause(voice));
        }
    }

    fn resume(&mut self) {
        if let Some(voice) = self.voice {
            self.context.with_pool(|pool| pool.resume(voice));
        }
    }

    fn stop(&mut self) {
        if let Some(voice) = self.voice.take() {
            self.context.with_pool(|pool| pool.stop(voice));
        }
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(voice) = self.voice {
            let volume = clamp_volume(volume);
            self.context.with_pool(|pool| pool.set_volume(voice, volume));
            self.volume = volume;
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_pos(&mut self, _seconds: f32) {}

    fn pos(&self) -> f32 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_assets::{path_str, write_wav};
    use crate::SoundSystem;
    use playdeck_core::SoundConfig;

    fn system() -> SoundSystem {
        SoundSystem::init(SoundConfig::new().with_device_probe(false))
    }

    #[test]
    fn test_play_tracks_last_voice() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "blip.wav", 2.0);
        let system = system();

        let mut sound = system.load_sample(path_str(&path));
        assert!(sound.is_loaded());

        sound.play();
        let first = sound.last_voice().unwrap();
        sound.play();
        let second = sound.last_voice().unwrap();
        assert_ne!(first, second);

        // Only the latest instance is stopped; the first keeps sounding
        sound.stop();
        assert_eq!(sound.last_voice(), None);
        assert_eq!(system.stats().playing_samples, 1);

        // Second stop is a no-op
        sound.stop();
        assert_eq!(system.stats().playing_samples, 1);
    }

    #[test]
    fn test_play_ex_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "blip.wav", 1.0);
        let system = system();

        let mut sound = system.load_sample(path_str(&path));
        assert!(sound.play_ex(true).is_none());
        assert!(sound.play_ex(false).is_none());
        assert_eq!(sound.length(), 0.0);
    }

    #[test]
    fn test_volume_is_cached_until_next_play() {
        let system = system();
        let mut sound = system.load_sample("/nonexistent/blip.wav");
        sound.set_volume(0.5);
        assert_eq!(sound.volume(), 0.5);
    }

    #[test]
    fn test_free_leaves_handle_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "blip.wav", 1.0);
        let system = system();

        let mut sound = system.load_sample(path_str(&path));
        assert_eq!(system.stats().sample_count, 1);

        sound.free();
        assert!(!sound.is_loaded());
        assert_eq!(system.stats().sample_count, 0);

        sound.free();
        sound.play();
        assert_eq!(sound.last_voice(), None);
        assert_eq!(system.stats().playing_samples, 0);
    }

    #[test]
    fn test_sample_source_controls_one_voice() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "blip.wav", 2.0);
        let system = system();

        let mut sound = system.load_sample(path_str(&path));
        sound.set_volume(0.3);
        let mut source = sound.play_source().unwrap();
        assert_eq!(source.volume(), 0.3);
        assert!(source.voice().is_some());

        source.set_pos(1.0);
        assert_eq!(source.pos(), 0.0);

        source.pause();
        source.resume();
        source.set_volume(0.8);
        assert_eq!(source.volume(), 0.8);

        assert!(source.is_active());
        source.stop();
        assert!(!source.is_active());
        assert_eq!(source.voice(), None);
        assert_eq!(system.stats().playing_samples, 0);

        // Stopped sources ignore further control
        source.stop();
        source.set_volume(0.1);
        assert_eq!(source.volume(), 0.8);
    }

    #[test]
    fn test_source_goes_inactive_when_sample_ends() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "blip.wav", 0.05);
        let system = system();

        let mut sound = system.load_sample(path_str(&path));
        let source = sound.play_source().unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while source.is_active() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(!source.is_active());
    }
}
