// Sound subsystem: handle-based playback over a pooled sampler and a
// single-stream player

mod context;
pub mod mixer;
pub mod sampled;
pub mod sound;
pub mod streamed;
pub mod system;

pub use mixer::MixerBackend;
pub use playdeck_core::{Playable, Source, SoundConfig, SoundStats, StreamState};
pub use sampled::{SampleSource, SampledSound};
pub use sound::{Sound, SourceRef};
pub use streamed::StreamedSound;
pub use system::SoundSystem;

#[cfg(test)]
pub(crate) mod test_assets {
    use std::path::{Path, PathBuf};

    /// Write a mono 16-bit square-ish tone of `seconds` length at 8 kHz
    pub fn write_wav(dir: &Path, name: &str, seconds: f32) -> PathBuf {
        let path = dir.join(name);
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        let frames = (8000.0 * seconds) as u32;
        for i in 0..frames {
            let sample: i16 = if (i / 20) % 2 == 0 { 4000 } else { -4000 };
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    pub fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }
}
