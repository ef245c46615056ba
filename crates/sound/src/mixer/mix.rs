// Summing mixer: pooled voices and open streams rendered into one buffer

use super::stream::StreamChannel;
use parking_lot::Mutex;
use playdeck_core::{PlayParams, SampleId, VoiceId};
use playdeck_decode_symphonia::DecodedClip;
use std::sync::{Arc, Weak};

/// Layout of the interleaved buffers the mixer renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
        }
    }
}

/// Source channel feeding output channel `out` of `out_channels`
pub(crate) fn source_channel(out: usize, src_channels: usize) -> usize {
    if src_channels <= 1 {
        0
    } else {
        out.min(src_channels - 1)
    }
}

pub(crate) struct Voice {
    pub(crate) id: VoiceId,
    pub(crate) sample: SampleId,
    clip: Arc<DecodedClip>,
    /// Read position in source frames
    cursor: f64,
    rate: f32,
    pub(crate) volume: f32,
    pub(crate) priority: i32,
    /// Issue order, used to pick the oldest voice when stealing
    pub(crate) sequence: u64,
    /// Repeats still to play; negative loops forever
    loops_left: i32,
    pub(crate) paused: bool,
    finished: bool,
}

impl Voice {
    pub(crate) fn new(
        id: VoiceId,
        sample: SampleId,
        clip: Arc<DecodedClip>,
        params: PlayParams,
        sequence: u64,
    ) -> Self {
        Self {
            id,
            sample,
            clip,
            cursor: 0.0,
            rate: params.rate,
            volume: params.volume,
            priority: params.priority,
            sequence,
            loops_left: params.loop_count,
            paused: false,
            finished: false,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    fn render(&mut self, out: &mut [f32], format: OutputFormat) {
        let frames = self.clip.frames();
        let src_channels = self.clip.channels.max(1) as usize;
        let out_channels = format.channels.max(1) as usize;
        if frames == 0 || self.clip.sample_rate == 0 {
            self.finished = true;
            return;
        }
        let step = self.clip.sample_rate as f64 / format.sample_rate.max(1) as f64 * self.rate as f64;

        for frame in out.chunks_exact_mut(out_channels) {
            if self.cursor >= frames as f64 {
                if self.loops_left == 0 {
                    self.finished = true;
                    return;
                }
                if self.loops_left > 0 {
                    self.loops_left -= 1;
                }
                self.cursor %= frames as f64;
            }

            let base = self.cursor as usize * src_channels;
            for (ch, sample) in frame.iter_mut().enumerate() {
                *sample += self.clip.samples[base + source_channel(ch, src_channels)] * self.volume;
            }
            self.cursor += step;
        }
    }
}

/// Shared mixing state; the output thread renders it, the pool and stream
/// players mutate it
#[derive(Default)]
pub struct Mixer {
    pub(crate) voices: Vec<Voice>,
    streams: Vec<Weak<Mutex<StreamChannel>>>,
    frames_rendered: u64,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach_stream(&mut self, channel: &Arc<Mutex<StreamChannel>>) {
        self.streams.push(Arc::downgrade(channel));
    }

    pub(crate) fn reap(&mut self) -> usize {
        let before = self.voices.len();
        self.voices.retain(|v| !v.is_finished());
        before - self.voices.len()
    }

    /// Output frames rendered so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Mix every live voice and stream into `out`, which is interleaved in
    /// `format` and is overwritten
    pub fn render(&mut self, out: &mut [f32], format: OutputFormat) {
        out.fill(0.0);

        for voice in self.voices.iter_mut().filter(|v| !v.paused && !v.finished) {
            voice.render(out, format);
        }
        self.reap();

        self.streams.retain(|weak| weak.strong_count() > 0);
        for channel in self.streams.iter().filter_map(Weak::upgrade) {
            channel.lock().render(out, format);
        }

        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
        self.frames_rendered += (out.len() / format.channels.max(1) as usize) as u64;
    }
}
