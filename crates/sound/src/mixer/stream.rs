// Streamed channel: decodes packets on demand while the output renders it

use super::mix::{source_channel, OutputFormat};
use parking_lot::Mutex;
use playdeck_core::{clamp_volume, Result, StreamPlayer};
use playdeck_decode_symphonia::{StreamDecoder, TrackInfo};
use std::sync::Arc;

/// Upper bound for seeks into streams of unknown length (about 49 days)
const MAX_SEEK_MS: u64 = u32::MAX as u64;

pub(crate) struct StreamChannel {
    path: String,
    /// None once reset
    decoder: Option<StreamDecoder>,
    info: TrackInfo,
    /// Interleaved samples of the chunk being played
    pending: Vec<f32>,
    /// Read position in `pending`, in source frames
    cursor: f64,
    /// Frames of earlier chunks played since `base_ms`
    consumed: u64,
    base_ms: u64,
    playing: bool,
    looping: bool,
    /// The decoder has nothing left until the next rewind
    exhausted: bool,
    ended: bool,
    volume: f32,
}

impl StreamChannel {
    pub(crate) fn open(path: &str) -> Result<Self> {
        let decoder = StreamDecoder::open(path)?;
        let info = decoder.info();
        log::info!("[stream] opened {} ({} ms)", path, info.duration_ms);

        Ok(Self {
            path: path.to_string(),
            decoder: Some(decoder),
            info,
            pending: Vec::new(),
            cursor: 0.0,
            consumed: 0,
            base_ms: 0,
            playing: false,
            looping: true,
            exhausted: false,
            ended: false,
            volume: 1.0,
        })
    }

    fn channels(&self) -> usize {
        self.info.channels.max(1) as usize
    }

    fn clear_pending(&mut self, base_ms: u64) {
        self.pending.clear();
        self.cursor = 0.0;
        self.consumed = 0;
        self.base_ms = base_ms;
    }

    fn rewind(&mut self) -> Result<()> {
        self.clear_pending(0);
        self.exhausted = false;
        self.ended = false;
        match self.decoder.as_mut() {
            Some(decoder) => decoder.seek(0),
            None => Ok(()),
        }
    }

    fn finish(&mut self) {
        self.playing = false;
        self.ended = true;
        log::debug!("[stream] {} reached its end", self.path);
    }

    /// Make sure `cursor` points into decoded data, pulling packets and
    /// wrapping around as needed. False when playback ended.
    fn ensure_frame(&mut self) -> bool {
        let mut rewound = false;
        loop {
            let frames = self.pending.len() / self.channels();
            if (self.cursor as usize) < frames {
                return true;
            }

            self.consumed += frames as u64;
            self.cursor -= frames as f64;
            self.pending.clear();

            let Some(decoder) = self.decoder.as_mut() else {
                return false;
            };
            let more = if self.exhausted {
                Ok(false)
            } else {
                decoder.next_chunk(&mut self.pending)
            };

            match more {
                Ok(true) => self.info = decoder.info(),
                // An empty file must not spin forever
                Ok(false) if self.looping && !rewound => {
                    rewound = true;
                    if let Err(e) = self.rewind() {
                        log::warn!("[stream] cannot loop {}: {}", self.path, e);
                        self.finish();
                        return false;
                    }
                }
                Ok(false) => {
                    self.exhausted = true;
                    self.finish();
                    return false;
                }
                Err(e) => {
                    log::warn!("[stream] {}", e);
                    self.exhausted = true;
                    self.finish();
                    return false;
                }
            }
        }
    }

    /// Add this stream's next frames into `out`
    pub(crate) fn render(&mut self, out: &mut [f32], format: OutputFormat) {
        if !self.playing || self.decoder.is_none() {
            return;
        }

        let out_channels = format.channels.max(1) as usize;
        for frame in out.chunks_exact_mut(out_channels) {
            if !self.ensure_frame() {
                return;
            }
            let src_channels = self.channels();
            let base = self.cursor as usize * src_channels;
            for (ch, sample) in frame.iter_mut().enumerate() {
                *sample += self.pending[base + source_channel(ch, src_channels)] * self.volume;
            }
            self.cursor += self.info.sample_rate.max(1) as f64 / format.sample_rate.max(1) as f64;
        }
    }

    pub(crate) fn volume(&self) -> f32 {
        self.volume
    }

    pub(crate) fn is_looping(&self) -> bool {
        self.looping
    }
}

impl StreamPlayer for StreamChannel {
    fn is_playing(&self) -> bool {
        self.playing && self.decoder.is_some()
    }

    fn start(&mut self) {
        if self.decoder.is_none() || self.playing {
            return;
        }
        if self.ended {
            // Completed streams start over
            if let Err(e) = self.rewind() {
                log::warn!("[stream] cannot restart {}: {}", self.path, e);
                return;
            }
        }
        self.playing = true;
        log::debug!("[stream] {} started at {} ms", self.path, self.position_ms());
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        if self.decoder.is_some() {
            if let Err(e) = self.rewind() {
                log::warn!("[stream] cannot rewind {}: {}", self.path, e);
            }
        }
    }

    fn seek_to(&mut self, position_ms: u64) {
        if self.decoder.is_none() {
            return;
        }
        let target = match self.info.duration_ms {
            0 => position_ms.min(MAX_SEEK_MS),
            duration => position_ms.min(duration),
        };

        self.clear_pending(target);
        self.ended = false;
        if let Some(decoder) = self.decoder.as_mut() {
            // Seeking at or past the end leaves nothing to play
            self.exhausted = match decoder.seek(target) {
                Ok(()) => false,
                Err(e) => {
                    log::debug!("[stream] {}", e);
                    true
                }
            };
        }
    }

    fn position_ms(&self) -> u64 {
        if self.decoder.is_none() {
            return 0;
        }
        let played_frames = self.consumed.saturating_add(self.cursor as u64);
        let played_ms = match self.info.sample_rate {
            0 => 0,
            rate => played_frames.saturating_mul(1000) / rate as u64,
        };
        let raw = self.base_ms.saturating_add(played_ms);
        match self.info.duration_ms {
            0 => raw,
            duration => raw.min(duration),
        }
    }

    fn duration_ms(&self) -> u64 {
        match self.decoder {
            Some(_) => self.info.duration_ms,
            None => 0,
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn reset(&mut self) {
        log::debug!("[stream] reset {}", self.path);
        self.decoder = None;
        self.playing = false;
        self.clear_pending(0);
    }
}

/// Handle the stream playable drives; the mixer only holds it weakly, so
/// dropping the player takes the channel off the output
pub struct MixerStreamPlayer {
    channel: Arc<Mutex<StreamChannel>>,
}

impl MixerStreamPlayer {
    pub(crate) fn new(channel: Arc<Mutex<StreamChannel>>) -> Self {
        Self { channel }
    }

    pub fn volume(&self) -> f32 {
        self.channel.lock().volume()
    }

    pub fn is_looping(&self) -> bool {
        self.channel.lock().is_looping()
    }
}

impl StreamPlayer for MixerStreamPlayer {
    fn is_playing(&self) -> bool {
        self.channel.lock().is_playing()
    }

    fn start(&mut self) {
        self.channel.lock().start();
    }

    fn pause(&mut self) {
        self.channel.lock().pause();
    }

    fn stop(&mut self) {
        self.channel.lock().stop();
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.channel.lock().seek_to(position_ms);
    }

    fn position_ms(&self) -> u64 {
        self.channel.lock().position_ms()
    }

    fn duration_ms(&self) -> u64 {
        self.channel.lock().duration_ms()
    }

    fn set_volume(&mut self, volume: f32) {
        self.channel.lock().set_volume(volume);
    }

    fn set_looping(&mut self, looping: bool) {
        self.channel.lock().set_looping(looping);
    }

    fn reset(&mut self) {
        self.channel.lock().reset();
    }
}
