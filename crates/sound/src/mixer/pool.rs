// Fixed-capacity sample pool with voice stealing, rendered by the mixer

use super::mix::{Mixer, Voice};
use parking_lot::Mutex;
use playdeck_core::{clamp_volume, AudioError, PlayParams, Result, SampleId, SamplePool, VoiceId};
use playdeck_decode_symphonia::{decode_file, DecodedClip};
use std::collections::HashMap;
use std::sync::Arc;

struct Slot {
    path: String,
    clip: Arc<DecodedClip>,
}

/// Samples are decoded up front; live instances are voices in the shared
/// mixer
pub struct MixerPool {
    mixer: Arc<Mutex<Mixer>>,
    max_samples: usize,
    max_voices: usize,
    samples: HashMap<SampleId, Slot>,
    next_sample: u32,
    next_voice: u32,
    sequence: u64,
}

impl MixerPool {
    pub fn new(mixer: Arc<Mutex<Mixer>>, max_samples: usize, max_voices: usize) -> Self {
        log::info!(
            "[pool] created with {} sample slots, {} voices",
            max_samples,
            max_voices
        );
        Self {
            mixer,
            max_samples,
            max_voices,
            samples: HashMap::new(),
            next_sample: 1,
            next_voice: 1,
            sequence: 0,
        }
    }

    pub fn voice_volume(&self, voice: VoiceId) -> Option<f32> {
        self.mixer
            .lock()
            .voices
            .iter()
            .find(|v| v.id == voice)
            .map(|v| v.volume)
    }

    pub fn is_paused(&self, voice: VoiceId) -> bool {
        self.mixer
            .lock()
            .voices
            .iter()
            .any(|v| v.id == voice && v.paused)
    }

    fn with_voice(&self, voice: VoiceId, f: impl FnOnce(&mut Voice)) {
        if let Some(v) = self.mixer.lock().voices.iter_mut().find(|v| v.id == voice) {
            f(v);
        }
    }

    /// Make room for a voice of `priority`, stealing the weakest one.
    /// Returns false when every live voice outranks the request.
    fn make_room(mixer: &mut Mixer, max_voices: usize, priority: i32) -> bool {
        if mixer.voices.len() < max_voices {
            return true;
        }

        let victim = mixer
            .voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| (v.priority, v.sequence))
            .map(|(idx, v)| (idx, v.priority));

        match victim {
            Some((idx, victim_priority)) if victim_priority <= priority => {
                let stolen = mixer.voices.remove(idx);
                log::debug!("[pool] stole {} for new voice", stolen.id);
                true
            }
            _ => false,
        }
    }
}

impl SamplePool for MixerPool {
    fn load(&mut self, path: &str) -> Result<SampleId> {
        if self.samples.len() >= self.max_samples {
            return Err(AudioError::PoolExhausted(self.max_samples));
        }

        let clip = decode_file(path)?;
        let id = SampleId(self.next_sample);
        self.next_sample += 1;

        log::info!(
            "[pool] loaded {} as {} ({} ms)",
            path,
            id,
            clip.duration_ms()
        );
        self.samples.insert(
            id,
            Slot {
                path: path.to_string(),
                clip: Arc::new(clip),
            },
        );
        Ok(id)
    }

    fn unload(&mut self, id: SampleId) {
        if let Some(slot) = self.samples.remove(&id) {
            self.mixer.lock().voices.retain(|v| v.sample != id);
            log::info!("[pool] unloaded {} ({})", id, slot.path);
        }
    }

    fn play(&mut self, id: SampleId, params: PlayParams) -> Option<VoiceId> {
        if params.rate <= 0.0 {
            log::warn!("[pool] refusing to play {} at rate {}", id, params.rate);
            return None;
        }

        let clip = self.samples.get(&id)?.clip.clone();

        let mut mixer = self.mixer.lock();
        mixer.reap();
        if !Self::make_room(&mut mixer, self.max_voices, params.priority) {
            log::debug!("[pool] all voices outrank request for {}", id);
            return None;
        }

        let voice = VoiceId(self.next_voice);
        self.next_voice += 1;
        self.sequence += 1;

        let params = PlayParams {
            volume: clamp_volume(params.volume),
            ..params
        };
        mixer
            .voices
            .push(Voice::new(voice, id, clip, params, self.sequence));

        Some(voice)
    }

    fn stop(&mut self, voice: VoiceId) {
        self.mixer.lock().voices.retain(|v| v.id != voice);
    }

    fn pause(&mut self, voice: VoiceId) {
        self.with_voice(voice, |v| v.paused = true);
    }

    fn resume(&mut self, voice: VoiceId) {
        self.with_voice(voice, |v| v.paused = false);
    }

    fn set_volume(&mut self, voice: VoiceId, volume: f32) {
        self.with_voice(voice, |v| v.volume = clamp_volume(volume));
    }

    fn is_active(&self, voice: VoiceId) -> bool {
        self.mixer
            .lock()
            .voices
            .iter()
            .any(|v| v.id == voice && !v.is_finished())
    }

    fn update(&mut self) {
        let reaped = self.mixer.lock().reap();
        if reaped > 0 {
            log::debug!("[pool] reaped {} finished voices", reaped);
        }
    }

    fn loaded_count(&self) -> usize {
        self.samples.len()
    }

    fn active_voices(&self) -> usize {
        self.mixer
            .lock()
            .voices
            .iter()
            .filter(|v| !v.is_finished())
            .count()
    }

    fn release(&mut self) {
        let mut mixer = self.mixer.lock();
        log::info!(
            "[pool] releasing {} samples, {} voices",
            self.samples.len(),
            mixer.voices.len()
        );
        mixer.voices.clear();
        self.samples.clear();
    }
}
