// In-process backend: decoded samples and streams summed by one mixer and
// pushed to the output device

mod mix;
mod output;
mod pool;
mod stream;

pub use mix::{Mixer, OutputFormat};
pub use pool::MixerPool;
pub use stream::MixerStreamPlayer;

use output::Output;
use parking_lot::Mutex;
use playdeck_core::{AudioBackend, Result, SamplePool, SoundConfig, StreamPlayer};
use std::sync::Arc;
use stream::StreamChannel;

/// Default backend used by [`crate::SoundSystem::init`]
///
/// The output is opened lazily by the first pool or stream and runs until
/// [`AudioBackend::shutdown`].
pub struct MixerBackend {
    mixer: Arc<Mutex<Mixer>>,
    output: Mutex<Option<Output>>,
}

impl MixerBackend {
    pub fn new() -> Self {
        Self {
            mixer: Arc::new(Mutex::new(Mixer::new())),
            output: Mutex::new(None),
        }
    }

    /// Format of the running output, if any
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output.lock().as_ref().map(Output::format)
    }

    fn ensure_output(&self) -> Result<()> {
        let mut output = self.output.lock();
        if output.is_none() {
            *output = Some(Output::open(self.mixer.clone())?);
        }
        Ok(())
    }
}

impl Default for MixerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for MixerBackend {
    fn is_available(&self, config: &SoundConfig) -> bool {
        if !config.probe_output_device {
            return true;
        }
        has_output_device()
    }

    fn create_pool(&self, config: &SoundConfig) -> Result<Box<dyn SamplePool>> {
        self.ensure_output()?;
        Ok(Box::new(MixerPool::new(
            self.mixer.clone(),
            config.max_samples,
            config.max_voices,
        )))
    }

    fn open_stream(&self, path: &str) -> Result<Box<dyn StreamPlayer>> {
        let channel = Arc::new(Mutex::new(StreamChannel::open(path)?));
        self.ensure_output()?;
        self.mixer.lock().attach_stream(&channel);
        Ok(Box::new(MixerStreamPlayer::new(channel)))
    }

    fn shutdown(&self) {
        if let Some(output) = self.output.lock().take() {
            log::info!(
                "[backend] stopping {} output after {} frames",
                output.kind(),
                self.mixer.lock().frames_rendered()
            );
        }
    }

    fn name(&self) -> &'static str {
        "mixer"
    }
}

#[cfg(feature = "cpal")]
fn has_output_device() -> bool {
    use cpal::traits::HostTrait;

    let host = cpal::default_host();
    match host.default_output_device() {
        Some(_) => true,
        None => {
            log::warn!("[backend] host {:?} has no default output device", host.id());
            false
        }
    }
}

#[cfg(not(feature = "cpal"))]
fn has_output_device() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_assets::{path_str, write_wav};
    use std::time::{Duration, Instant};

    #[test]
    fn test_available_without_device_check() {
        let backend = MixerBackend::new();
        let config = SoundConfig::new().with_device_probe(false);
        assert!(backend.is_available(&config));
    }

    #[test]
    fn test_open_missing_stream_fails() {
        let backend = MixerBackend::new();
        assert!(backend.open_stream("/nonexistent/music.ogg").is_err());
        assert_eq!(backend.output_format(), None);
    }

    #[test]
    fn test_pool_uses_config_capacity() {
        let backend = MixerBackend::new();
        let config = SoundConfig::new().with_max_samples(2).with_max_voices(1);
        let pool = backend.create_pool(&config).unwrap();
        assert_eq!(pool.loaded_count(), 0);
        assert_eq!(pool.active_voices(), 0);
        assert!(backend.output_format().is_some());

        backend.shutdown();
        assert_eq!(backend.output_format(), None);
    }

    #[test]
    fn test_stream_position_advances_with_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "music.wav", 5.0);
        let backend = MixerBackend::new();

        let mut player = backend.open_stream(path_str(&path)).unwrap();
        player.start();

        let deadline = Instant::now() + Duration::from_secs(5);
        while player.position_ms() < 100 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(player.position_ms() >= 100);

        // Without an output nothing is rendered
        backend.shutdown();
        let frozen = player.position_ms();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(player.position_ms(), frozen);
    }
}
