// Incremental decoding: one packet at a time, with seeking

use crate::probe::{open_format, TrackInfo};
use playdeck_core::{AudioError, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatReader, SeekMode, SeekTo};
use symphonia::core::units::Time;

/// Packet-by-packet decoder over a file's audio track
pub struct StreamDecoder {
    path: String,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    info: TrackInfo,
    /// Frames to drop after an accurate seek landed early
    skip_frames: u64,
}

impl StreamDecoder {
    pub fn open(path: &str) -> Result<Self> {
        let (format, info) = open_format(path)?;

        let params = format
            .tracks()
            .iter()
            .find(|t| t.id == info.track_id)
            .map(|t| t.codec_params.clone())
            .ok_or_else(|| AudioError::Decoding(format!("track vanished in {}", path)))?;

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| AudioError::Decoding(format!("no decoder for {}: {}", path, e)))?;

        Ok(Self {
            path: path.to_string(),
            format,
            decoder,
            info,
            skip_frames: 0,
        })
    }

    pub fn info(&self) -> TrackInfo {
        self.info
    }

    /// Decode the next packet and append its interleaved samples to `out`.
    /// Returns false at the end of the stream.
    pub fn next_chunk(&mut self, out: &mut Vec<f32>) -> Result<bool> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(false)
                }
                Err(SymphoniaError::ResetRequired) => return Ok(false),
                Err(e) => {
                    return Err(AudioError::Decoding(format!("read {}: {}", self.path, e)));
                }
            };

            if packet.track_id() != self.info.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(buffer) => {
                    let spec = *buffer.spec();
                    let channels = spec.channels.count().max(1);
                    if self.info.sample_rate == 0 {
                        self.info.sample_rate = spec.rate;
                    }
                    if self.info.channels == 0 {
                        self.info.channels = channels as u16;
                    }

                    let mut pcm = SampleBuffer::<f32>::new(buffer.capacity() as u64, spec);
                    pcm.copy_interleaved_ref(buffer);
                    let samples = pcm.samples();

                    let frames = (samples.len() / channels) as u64;
                    let skip = self.skip_frames.min(frames);
                    self.skip_frames -= skip;
                    out.extend_from_slice(&samples[skip as usize * channels..]);
                    return Ok(true);
                }
                // Corrupt packets are skipped
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("[decode] skipping bad packet in {}: {}", self.path, e);
                }
                Err(e) => {
                    return Err(AudioError::Decoding(format!("decode {}: {}", self.path, e)));
                }
            }
        }
    }

    /// Move to `position_ms`; the next chunk starts there
    pub fn seek(&mut self, position_ms: u64) -> Result<()> {
        let time = Time::new(position_ms / 1000, (position_ms % 1000) as f64 / 1000.0);
        let seeked = self
            .format
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time,
                    track_id: Some(self.info.track_id),
                },
            )
            .map_err(|e| AudioError::Decoding(format!("seek {} to {} ms: {}", self.path, position_ms, e)))?;

        self.decoder.reset();
        self.skip_frames = seeked.required_ts.saturating_sub(seeked.actual_ts);
        Ok(())
    }
}
