// Tagged handles over both playable variants, for callers that store them
// side by side

use crate::sampled::{SampleSource, SampledSound};
use crate::streamed::StreamedSound;
use playdeck_core::{Playable, Source};

/// Either kind of playable
pub enum Sound {
    Sampled(SampledSound),
    Streamed(StreamedSound),
}

/// Either kind of source
pub enum SourceRef {
    Sample(SampleSource),
    Stream(StreamedSound),
}

impl Sound {
    pub fn is_loaded(&self) -> bool {
        match self {
            Sound::Sampled(s) => s.is_loaded(),
            Sound::Streamed(s) => s.is_loaded(),
        }
    }
}

impl SourceRef {
    /// Whether the source still controls something: a sounding or paused
    /// pooled instance, or a stream that still has its pipeline
    pub fn is_active(&self) -> bool {
        match self {
            SourceRef::Sample(s) => s.is_active(),
            SourceRef::Stream(s) => s.is_loaded(),
        }
    }
}

impl From<SampledSound> for Sound {
    fn from(sound: SampledSound) -> Self {
        Sound::Sampled(sound)
    }
}

impl From<StreamedSound> for Sound {
    fn from(sound: StreamedSound) -> Self {
        Sound::Streamed(sound)
    }
}

impl Playable for Sound {
    type Source = SourceRef;

    fn free(&mut self) {
        match self {
            Sound::Sampled(s) => s.free(),
            Sound::Streamed(s) => s.free(),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        match self {
            Sound::Sampled(s) => Playable::set_volume(s, volume),
            Sound::Streamed(s) => Playable::set_volume(s, volume),
        }
    }

    fn volume(&self) -> f32 {
        match self {
            Sound::Sampled(s) => Playable::volume(s),
            Sound::Streamed(s) => Playable::volume(s),
        }
    }

    fn length(&self) -> f32 {
        match self {
            Sound::Sampled(s) => s.length(),
            Sound::Streamed(s) => s.length(),
        }
    }

    fn play(&mut self) {
        match self {
            Sound::Sampled(s) => s.play(),
            Sound::Streamed(s) => s.play(),
        }
    }

    fn play_ex(&mut self, looping: bool) -> Option<SourceRef> {
        match self {
            Sound::Sampled(s) => s.play_ex(looping).map(SourceRef::Sample),
            Sound::Streamed(s) => s.play_ex(looping).map(SourceRef::Stream),
        }
    }

    fn stop(&mut self) {
        match self {
            Sound::Sampled(s) => Playable::stop(s),
            Sound::Streamed(s) => Playable::stop(s),
        }
    }
}

impl Source for SourceRef {
    fn pause(&mut self) {
        match self {
            SourceRef::Sample(s) => s.pause(),
            SourceRef::Stream(s) => s.pause(),
        }
    }

    fn resume(&mut self) {
        match self {
            SourceRef::Sample(s) => s.resume(),
            SourceRef::Stream(s) => s.resume(),
        }
    }

    fn stop(&mut self) {
        match self {
            SourceRef::Sample(s) => Source::stop(s),
            SourceRef::Stream(s) => Source::stop(s),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        match self {
            SourceRef::Sample(s) => Source::set_volume(s, volume),
            SourceRef::Stream(s) => Source::set_volume(s, volume),
        }
    }

    fn volume(&self) -> f32 {
        match self {
            SourceRef::Sample(s) => Source::volume(s),
            SourceRef::Stream(s) => Source::volume(s),
        }
    }

    fn set_pos(&mut self, seconds: f32) {
        match self {
            SourceRef::Sample(s) => s.set_pos(seconds),
            SourceRef::Stream(s) => s.set_pos(seconds),
        }
    }

    fn pos(&self) -> f32 {
        match self {
            SourceRef::Sample(s) => s.pos(),
            SourceRef::Stream(s) => s.pos(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_assets::{path_str, write_wav};
    use crate::SoundSystem;
    use playdeck_core::SoundConfig;

    #[test]
    fn test_dispatch_play_ex_per_variant() {
        let dir = tempfile::tempdir().unwrap();
        let blip = write_wav(dir.path(), "blip.wav", 1.0);
        let music = write_wav(dir.path(), "music.wav", 3.0);
        let system = SoundSystem::init(SoundConfig::new().with_device_probe(false));

        let mut sample: Sound = system.load_sample(path_str(&blip)).into();
        assert!(sample.play_ex(true).is_none());

        let mut stream: Sound = system.load_stream(path_str(&music)).into();
        match stream.play_ex(true) {
            Some(SourceRef::Stream(source)) => match &stream {
                Sound::Streamed(inner) => assert!(source.ptr_eq(inner)),
                Sound::Sampled(_) => unreachable!(),
            },
            _ => panic!("streamed play_ex must hand back a stream source"),
        }
    }

    #[test]
    fn test_stop_twice_matches_stop_once() {
        let dir = tempfile::tempdir().unwrap();
        let music = write_wav(dir.path(), "music.wav", 3.0);
        let system = SoundSystem::init(SoundConfig::new().with_device_probe(false));

        let mut stream: Sound = system.load_stream(path_str(&music)).into();
        let mut source = stream.play_ex(false).unwrap();
        source.set_pos(1.0);
        source.stop();
        let once = (source.pos(), system.stats());
        source.stop();
        assert_eq!((source.pos(), system.stats()), once);
    }

    #[test]
    fn test_volume_round_trip_both_variants() {
        let dir = tempfile::tempdir().unwrap();
        let blip = write_wav(dir.path(), "blip.wav", 1.0);
        let music = write_wav(dir.path(), "music.wav", 1.0);
        let system = SoundSystem::init(SoundConfig::new().with_device_probe(false));

        let mut sounds: Vec<Sound> = vec![
            system.load_sample(path_str(&blip)).into(),
            system.load_stream(path_str(&music)).into(),
        ];
        for sound in sounds.iter_mut() {
            sound.set_volume(0.5);
            assert_eq!(sound.volume(), 0.5);
        }
    }
}
