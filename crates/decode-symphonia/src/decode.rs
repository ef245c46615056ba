// Full decode of short sounds into interleaved f32 PCM

use crate::stream::StreamDecoder;
use playdeck_core::{AudioError, Result};

/// A fully decoded sample held in memory
#[derive(Debug, Clone)]
pub struct DecodedClip {
    /// Interleaved samples
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedClip {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }
}

/// Decode every packet of the file's audio track
pub fn decode_file(path: &str) -> Result<DecodedClip> {
    let mut decoder = StreamDecoder::open(path)?;

    let mut samples = Vec::new();
    while decoder.next_chunk(&mut samples)? {}

    if samples.is_empty() {
        return Err(AudioError::Decoding(format!("{} holds no audio", path)));
    }

    let info = decoder.info();
    log::debug!(
        "[decode] {}: {} samples, {} Hz, {} ch",
        path,
        samples.len(),
        info.sample_rate,
        info.channels
    );

    Ok(DecodedClip {
        samples,
        sample_rate: info.sample_rate,
        channels: info.channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_assets::write_wav;

    #[test]
    fn test_decode_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "blip.wav", 8000, 0.5);

        let clip = decode_file(path.to_str().unwrap()).unwrap();
        assert_eq!(clip.sample_rate, 8000);
        assert_eq!(clip.channels, 1);
        assert_eq!(clip.frames(), 4000);
        assert_eq!(clip.duration_ms(), 500);
        assert!(clip.samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_decode_missing_file() {
        assert!(decode_file("/nonexistent/blip.wav").is_err());
    }

    #[test]
    fn test_empty_clip_has_no_duration() {
        let clip = DecodedClip {
            samples: Vec::new(),
            sample_rate: 0,
            channels: 0,
        };
        assert_eq!(clip.frames(), 0);
        assert_eq!(clip.duration_ms(), 0);
    }
}
