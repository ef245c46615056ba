// Sound entry points. Handles are non-zero u32 values that are never reused;
// 0 stands for "no handle".

use crate::{c_str, init_logging, to_code};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use playdeck_core::{AudioError, Playable, Result, Source};
use playdeck_sound::{Sound, SoundConfig, SoundStats, SoundSystem, SourceRef};
use std::collections::HashMap;
use std::os::raw::c_char;

struct HandleTable<T> {
    next: u32,
    entries: HashMap<u32, T>,
}

impl<T> HandleTable<T> {
    fn new() -> Self {
        Self {
            next: 1,
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, value: T) -> u32 {
        let handle = self.next;
        self.next = self.next.checked_add(1).unwrap_or(1);
        self.entries.insert(handle, value);
        handle
    }

    fn get_mut(&mut self, handle: u32, kind: &str) -> Result<&mut T> {
        self.entries
            .get_mut(&handle)
            .ok_or_else(|| AudioError::InvalidState(format!("unknown {} handle {}", kind, handle)))
    }

    fn remove(&mut self, handle: u32, kind: &str) -> Result<T> {
        self.entries
            .remove(&handle)
            .ok_or_else(|| AudioError::InvalidState(format!("unknown {} handle {}", kind, handle)))
    }

    fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, value)| pred(value))
            .map(|(handle, _)| *handle)
    }

    fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, value| keep(value));
        before - self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

struct SoundState {
    system: Option<SoundSystem>,
    sounds: HandleTable<Sound>,
    sources: HandleTable<SourceRef>,
}

impl SoundState {
    fn shutdown(&mut self) {
        self.sources.clear();
        self.sounds.clear();
        if let Some(mut system) = self.system.take() {
            system.close();
        }
    }
}

static SOUND_STATE: Lazy<Mutex<SoundState>> = Lazy::new(|| {
    Mutex::new(SoundState {
        system: None,
        sounds: HandleTable::new(),
        sources: HandleTable::new(),
    })
});

fn with_sound<R>(handle: u32, f: impl FnOnce(&mut Sound) -> R) -> Result<R> {
    let mut state = SOUND_STATE.lock();
    let sound = state.sounds.get_mut(handle, "sound")?;
    Ok(f(sound))
}

fn with_source<R>(handle: u32, f: impl FnOnce(&mut SourceRef) -> R) -> Result<R> {
    let mut state = SOUND_STATE.lock();
    let source = state.sources.get_mut(handle, "source")?;
    Ok(f(source))
}

/// Hand out a source handle. A stream is its own source, so replaying it
/// returns the handle it already has.
fn register_source(source: Option<SourceRef>) -> u32 {
    let Some(source) = source else {
        return 0;
    };
    let mut state = SOUND_STATE.lock();
    if let SourceRef::Stream(stream) = &source {
        let existing = state.sources.find(|known| match known {
            SourceRef::Stream(known) => known.ptr_eq(stream),
            SourceRef::Sample(_) => false,
        });
        if let Some(handle) = existing {
            return handle;
        }
    }
    state.sources.insert(source)
}

/// Bring up sound with default limits.
/// Returns 0 when audio is live, 1 when running without audio.
#[no_mangle]
pub extern "C" fn playdeck_sound_init() -> i32 {
    start(SoundConfig::default())
}

/// Bring up sound with explicit limits; see [`playdeck_sound_init`]
#[no_mangle]
pub extern "C" fn playdeck_sound_init_with(max_voices: u32, max_samples: u32) -> i32 {
    start(
        SoundConfig::new()
            .with_max_voices(max_voices as usize)
            .with_max_samples(max_samples as usize),
    )
}

fn start(config: SoundConfig) -> i32 {
    init_logging();
    let mut state = SOUND_STATE.lock();
    if state.system.is_some() {
        log::info!("[ffi] reinitializing sound, dropping previous handles");
        state.shutdown();
    }

    let system = SoundSystem::init(config);
    let code = if system.is_degraded() { 1 } else { 0 };
    state.system = Some(system);
    code
}

/// Release every sound and source; all handles become unknown
#[no_mangle]
pub extern "C" fn playdeck_sound_close() {
    SOUND_STATE.lock().shutdown();
    log::info!("[ffi] sound closed");
}

/// Per-frame hook: reaps finished instances and forgets source handles that
/// no longer control anything
#[no_mangle]
pub extern "C" fn playdeck_sound_update() {
    let mut guard = SOUND_STATE.lock();
    let state = &mut *guard;
    if let Some(system) = state.system.as_mut() {
        system.update();
        let reaped = state.sources.retain(SourceRef::is_active);
        if reaped > 0 {
            log::debug!("[ffi] forgot {} finished sources", reaped);
        }
    }
}

fn load(path: *const c_char, streamed: bool) -> u32 {
    let Some(path) = c_str(path) else {
        log::warn!("[ffi] load with a null or non UTF-8 path");
        return 0;
    };

    let mut guard = SOUND_STATE.lock();
    let state = &mut *guard;
    let Some(system) = state.system.as_ref() else {
        log::warn!("[ffi] load of {} before sound init", path);
        return 0;
    };

    let sound = if streamed {
        Sound::from(system.load_stream(path))
    } else {
        Sound::from(system.load_sample(path))
    };
    state.sounds.insert(sound)
}

/// Load a pooled short sound. A file that fails to load still gets a handle
/// that ignores every call; 0 only for a bad path or missing init.
#[no_mangle]
pub extern "C" fn playdeck_sound_load_sample(path: *const c_char) -> u32 {
    load(path, false)
}

/// Open a streamed sound; failures behave as in
/// [`playdeck_sound_load_sample`]
#[no_mangle]
pub extern "C" fn playdeck_sound_load_stream(path: *const c_char) -> u32 {
    load(path, true)
}

#[no_mangle]
pub extern "C" fn playdeck_sound_free(handle: u32) -> i32 {
    let removed = SOUND_STATE.lock().sounds.remove(handle, "sound");
    to_code(removed.map(|mut sound| sound.free()))
}

#[no_mangle]
pub extern "C" fn playdeck_sound_play(handle: u32) -> i32 {
    to_code(with_sound(handle, |s| s.play()))
}

#[no_mangle]
pub extern "C" fn playdeck_sound_stop(handle: u32) -> i32 {
    to_code(with_sound(handle, |s| s.stop()))
}

#[no_mangle]
pub extern "C" fn playdeck_sound_set_volume(handle: u32, volume: f32) -> i32 {
    to_code(with_sound(handle, |s| s.set_volume(volume)))
}

#[no_mangle]
pub extern "C" fn playdeck_sound_get_volume(handle: u32) -> f32 {
    with_sound(handle, |s| s.volume()).unwrap_or(0.0)
}

#[no_mangle]
pub extern "C" fn playdeck_sound_get_length(handle: u32) -> f32 {
    with_sound(handle, |s| s.length()).unwrap_or(0.0)
}

/// Play with loop control. Returns a source handle, or 0 for sampled sounds
/// and sounds that failed to load.
#[no_mangle]
pub extern "C" fn playdeck_sound_play_ex(handle: u32, looping: bool) -> u32 {
    match with_sound(handle, |s| s.play_ex(looping)) {
        Ok(source) => register_source(source),
        Err(e) => {
            log::warn!("[ffi] {}", e);
            0
        }
    }
}

/// Play a sampled sound once and return a source over that instance
#[no_mangle]
pub extern "C" fn playdeck_sound_play_source(handle: u32) -> u32 {
    let source = with_sound(handle, |s| match s {
        Sound::Sampled(sample) => sample.play_source().map(SourceRef::Sample),
        Sound::Streamed(stream) => {
            let looping = stream.is_looping();
            stream.play_ex(looping).map(SourceRef::Stream)
        }
    });
    match source {
        Ok(source) => register_source(source),
        Err(e) => {
            log::warn!("[ffi] {}", e);
            0
        }
    }
}

#[no_mangle]
pub extern "C" fn playdeck_sound_pause_ex(source: u32) -> i32 {
    to_code(with_source(source, |s| s.pause()))
}

#[no_mangle]
pub extern "C" fn playdeck_sound_resume_ex(source: u32) -> i32 {
    to_code(with_source(source, |s| s.resume()))
}

/// Stop the source; the handle is invalid afterwards
#[no_mangle]
pub extern "C" fn playdeck_sound_stop_ex(source: u32) -> i32 {
    let removed = SOUND_STATE.lock().sources.remove(source, "source");
    to_code(removed.map(|mut source| source.stop()))
}

#[no_mangle]
pub extern "C" fn playdeck_sound_set_volume_ex(source: u32, volume: f32) -> i32 {
    to_code(with_source(source, |s| s.set_volume(volume)))
}

#[no_mangle]
pub extern "C" fn playdeck_sound_get_volume_ex(source: u32) -> f32 {
    with_source(source, |s| s.volume()).unwrap_or(0.0)
}

#[no_mangle]
pub extern "C" fn playdeck_sound_set_pos_ex(source: u32, seconds: f32) -> i32 {
    to_code(with_source(source, |s| s.set_pos(seconds)))
}

#[no_mangle]
pub extern "C" fn playdeck_sound_get_pos_ex(source: u32) -> f32 {
    with_source(source, |s| s.pos()).unwrap_or(0.0)
}

/// Counters for developer overlays; all zero before init or after close
#[no_mangle]
pub extern "C" fn playdeck_sound_stats() -> SoundStats {
    SOUND_STATE
        .lock()
        .system
        .as_ref()
        .map(|system| system.stats())
        .unwrap_or_default()
}
