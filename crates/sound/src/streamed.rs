// Streamed sounds: one decode/play pipeline, seekable, acts as its own source

use parking_lot::Mutex;
use playdeck_core::{clamp_volume, Playable, Source, StreamPlayer, StreamState};
use std::sync::Arc;

pub(crate) struct StreamSlot {
    pub(crate) player: Option<Box<dyn StreamPlayer>>,
    volume: f32,
    looping: bool,
    state: StreamState,
}

impl StreamSlot {
    /// Reset and drop the pipeline; returns whether there was one
    pub(crate) fn release(&mut self) -> bool {
        match self.player.take() {
            Some(mut player) => {
                player.reset();
                self.state.advance(StreamState::Uninitialized);
                true
            }
            None => false,
        }
    }

    /// Notice streams that ran to their end on their own
    fn sync_state(&mut self) {
        if self.state == StreamState::Playing {
            if let Some(player) = self.player.as_ref() {
                if !player.is_playing() {
                    self.state.advance(StreamState::Stopped);
                }
            }
        }
    }
}

/// Music-style sound backed by a single stream pipeline
///
/// Clones share the same pipeline, which is how the playable hands itself out
/// as its own [`Source`].
#[derive(Clone)]
pub struct StreamedSound {
    slot: Arc<Mutex<StreamSlot>>,
}

impl StreamedSound {
    pub(crate) fn new(mut player: Option<Box<dyn StreamPlayer>>) -> Self {
        let state = if player.is_some() {
            StreamState::Ready
        } else {
            StreamState::Uninitialized
        };
        let looping = true;
        if let Some(player) = player.as_mut() {
            player.set_looping(looping);
        }

        Self {
            slot: Arc::new(Mutex::new(StreamSlot {
                player,
                volume: 1.0,
                looping,
                state,
            })),
        }
    }

    pub(crate) fn slot(&self) -> &Arc<Mutex<StreamSlot>> {
        &self.slot
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.lock().player.is_some()
    }

    pub fn state(&self) -> StreamState {
        let mut guard = self.slot.lock();
        let slot = &mut *guard;
        slot.sync_state();
        slot.state
    }

    pub fn is_looping(&self) -> bool {
        self.slot.lock().looping
    }

    /// Whether both handles drive the same pipeline
    pub fn ptr_eq(&self, other: &StreamedSound) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    fn start(slot: &mut StreamSlot) {
        if let Some(player) = slot.player.as_mut() {
            if !player.is_playing() {
                player.start();
                slot.state.advance(StreamState::Playing);
            }
        }
    }
}

impl Playable for StreamedSound {
    type Source = StreamedSound;

    fn free(&mut self) {
        self.slot.lock().release();
    }

    fn set_volume(&mut self, volume: f32) {
        Source::set_volume(self, volume);
    }

    fn volume(&self) -> f32 {
        self.slot.lock().volume
    }

    fn length(&self) -> f32 {
        match self.slot.lock().player.as_ref() {
            Some(player) => player.duration_ms() as f32 / 1000.0,
            None => 0.0,
        }
    }

    fn play(&mut self) {
        Self::start(&mut self.slot.lock());
    }

    fn play_ex(&mut self, looping: bool) -> Option<StreamedSound> {
        {
            let mut guard = self.slot.lock();
            let slot = &mut *guard;
            let player = slot.player.as_mut()?;
            player.set_looping(looping);
            slot.looping = looping;
            Self::start(slot);
        }
        Some(self.clone())
    }

    fn stop(&mut self) {
        Source::stop(self);
    }
}

impl Source for StreamedSound {
    fn pause(&mut self) {
        let mut guard = self.slot.lock();
        let slot = &mut *guard;
        slot.sync_state();
        if let Some(player) = slot.player.as_mut() {
            player.pause();
            if slot.state == StreamState::Playing {
                slot.state.advance(StreamState::Paused);
            }
        }
    }

    fn resume(&mut self) {
        let mut guard = self.slot.lock();
        let slot = &mut *guard;
        if let Some(player) = slot.player.as_mut() {
            player.start();
            slot.state.advance(StreamState::Playing);
        }
    }

    fn stop(&mut self) {
        let mut guard = self.slot.lock();
        let slot = &mut *guard;
        if let Some(player) = slot.player.as_mut() {
            if player.is_playing() {
                player.stop();
                slot.state.advance(StreamState::Stopped);
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        let mut guard = self.slot.lock();
        let slot = &mut *guard;
        if let Some(player) = slot.player.as_mut() {
            let volume = clamp_volume(volume);
            player.set_volume(volume);
            slot.volume = volume;
        }
    }

    fn volume(&self) -> f32 {
        self.slot.lock().volume
    }

    fn set_pos(&mut self, seconds: f32) {
        if !seconds.is_finite() {
            log::debug!("[stream] ignoring seek to {}", seconds);
            return;
        }
        if let Some(player) = self.slot.lock().player.as_mut() {
            // Truncates toward zero; negative positions land on 0
            player.seek_to((seconds * 1000.0) as u64);
        }
    }

    fn pos(&self) -> f32 {
        match self.slot.lock().player.as_ref() {
            Some(player) => player.position_ms() as f32 / 1000.0,
            None => 0.0,
        }
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
    fn test_play_ex_returns_itself() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "music.wav", 3.0);
        let system = system();

        let mut music = system.load_stream(path_str(&path));
        let source = music.play_ex(true).unwrap();
        assert!(source.ptr_eq(&music));
        assert!(music.is_looping());
        assert_eq!(music.state(), StreamState::Playing);
        assert_eq!(system.stats().playing_streams, 1);
    }

    #[test]
    fn test_state_machine() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "music.wav", 3.0);
        let system = system();

        let mut music = system.load_stream(path_str(&path));
        assert_eq!(music.state(), StreamState::Ready);

        music.play();
        assert_eq!(music.state(), StreamState::Playing);
        // Already playing: no-op
        music.play();
        assert_eq!(music.state(), StreamState::Playing);

        Source::pause(&mut music);
        assert_eq!(music.state(), StreamState::Paused);
        // Double pause must be harmless
        Source::pause(&mut music);
        assert_eq!(music.state(), StreamState::Paused);

        music.resume();
        assert_eq!(music.state(), StreamState::Playing);

        Playable::stop(&mut music);
        assert_eq!(music.state(), StreamState::Stopped);
        Playable::stop(&mut music);
        assert_eq!(music.state(), StreamState::Stopped);
    }

    #[test]
    fn test_seek_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "music.wav", 20.0);
        let system = system();

        let mut music = system.load_stream(path_str(&path));
        assert!((music.length() - 20.0).abs() < 0.001);

        music.set_pos(12.5);
        assert!((music.pos() - 12.5).abs() < 0.05);

        music.set_pos(-3.0);
        assert_eq!(music.pos(), 0.0);
    }

    #[test]
    fn test_out_of_range_seek_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "music.wav", 2.0);
        let system = system();

        let mut music = system.load_stream(path_str(&path));
        music.play();
        music.set_pos(1.0);
        let before = music.pos();

        music.set_pos(f32::INFINITY);
        music.set_pos(f32::NAN);
        assert!((music.pos() - before).abs() < 0.5);

        music.set_pos(1.0e30);
        assert!(music.pos().is_finite());
        assert!(music.pos() <= 2.0);
        assert!(music.is_loaded());
    }

    #[test]
    fn test_volume_applies_to_live_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "music.wav", 1.0);
        let system = system();

        let mut music = system.load_stream(path_str(&path));
        Playable::set_volume(&mut music, 0.5);
        assert_eq!(Playable::volume(&music), 0.5);
        assert_eq!(Source::volume(&music), 0.5);
    }

    #[test]
    fn test_missing_stream_degrades() {
        let system = system();
        let mut music = system.load_stream("/nonexistent/music.ogg");

        assert!(!music.is_loaded());
        assert_eq!(music.state(), StreamState::Uninitialized);
        assert_eq!(music.length(), 0.0);
        assert_eq!(music.pos(), 0.0);
        assert!(music.play_ex(true).is_none());

        music.play();
        music.set_pos(4.0);
        Source::pause(&mut music);
        music.resume();
        Playable::stop(&mut music);
        music.free();
        assert_eq!(music.pos(), 0.0);
        assert_eq!(system.stats().stream_count, 0);
    }

    #[test]
    fn test_free_is_permanent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "music.wav", 2.0);
        let system = system();

        let mut music = system.load_stream(path_str(&path));
        music.play();
        music.free();

        assert!(!music.is_loaded());
        music.play();
        assert_eq!(music.state(), StreamState::Uninitialized);
        assert_eq!(system.stats().playing_streams, 0);
    }
}
