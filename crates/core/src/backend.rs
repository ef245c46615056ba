// Host backend seams
// A backend provides the pooled sampler for short sounds and the single-stream
// player for music. Playables only ever talk to these traits.

use crate::config::SoundConfig;
use crate::error::Result;
use std::fmt;

/// Pool-assigned id of a decoded sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleId(pub u32);

/// Pool-assigned id of one sounding instance of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub u32);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sample#{}", self.0)
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

/// Parameters fixed when a pooled instance is started
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayParams {
    pub volume: f32,
    pub priority: i32,
    /// 0 plays once, -1 loops forever, n repeats n more times
    pub loop_count: i32,
    pub rate: f32,
}

impl PlayParams {
    /// Play once at normal rate, lowest priority
    pub fn once(volume: f32) -> Self {
        Self {
            volume,
            priority: 0,
            loop_count: 0,
            rate: 1.0,
        }
    }
}

impl Default for PlayParams {
    fn default() -> Self {
        Self::once(1.0)
    }
}

/// Fixed-capacity registry of decoded short sounds and their live instances
pub trait SamplePool: Send {
    /// Decode and register a sample
    fn load(&mut self, path: &str) -> Result<SampleId>;

    /// Release a sample's decoded memory
    fn unload(&mut self, id: SampleId);

    /// Start a new instance; `None` when the pool rejects it
    fn play(&mut self, id: SampleId, params: PlayParams) -> Option<VoiceId>;

    fn stop(&mut self, voice: VoiceId);

    fn pause(&mut self, voice: VoiceId);

    fn resume(&mut self, voice: VoiceId);

    fn set_volume(&mut self, voice: VoiceId, volume: f32);

    /// Whether the instance is still sounding or paused
    fn is_active(&self, voice: VoiceId) -> bool;

    /// Reap instances that finished on their own
    fn update(&mut self);

    fn loaded_count(&self) -> usize;

    fn active_voices(&self) -> usize;

    /// Drop every sample and instance
    fn release(&mut self);
}

/// Single decode/play pipeline with a millisecond clock
pub trait StreamPlayer: Send {
    fn is_playing(&self) -> bool;

    fn start(&mut self);

    fn pause(&mut self);

    /// Stop and rewind
    fn stop(&mut self);

    fn seek_to(&mut self, position_ms: u64);

    fn position_ms(&self) -> u64;

    fn duration_ms(&self) -> u64;

    fn set_volume(&mut self, volume: f32);

    fn set_looping(&mut self, looping: bool);

    /// Return the pipeline to its unprepared state; nothing plays afterwards
    fn reset(&mut self);
}

/// Factory for the two playback pipelines
pub trait AudioBackend: Send + Sync {
    /// Whether the host's audio services can be used at all
    fn is_available(&self, config: &SoundConfig) -> bool;

    fn create_pool(&self, config: &SoundConfig) -> Result<Box<dyn SamplePool>>;

    fn open_stream(&self, path: &str) -> Result<Box<dyn StreamPlayer>>;

    /// Stop the output once the pool and streams have been released
    fn shutdown(&self) {}

    fn name(&self) -> &'static str;
}
