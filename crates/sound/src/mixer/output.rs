// Output side of the mixer: a cpal device stream, or a paced null sink when
// there is no device

use super::mix::{Mixer, OutputFormat};
use parking_lot::Mutex;
use playdeck_core::{AudioError, Result};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const NULL_PERIOD: Duration = Duration::from_millis(10);

/// Running output; dropping it stops rendering and joins its thread
pub(crate) struct Output {
    stop: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
    format: OutputFormat,
    kind: &'static str,
}

impl Output {
    /// Open the default output device when built with `cpal`, falling back
    /// to the null sink
    pub(crate) fn open(mixer: Arc<Mutex<Mixer>>) -> Result<Self> {
        #[cfg(feature = "cpal")]
        {
            match device::spawn(mixer.clone()) {
                Ok(output) => return Ok(output),
                Err(e) => log::warn!("[output] {}, rendering to the null sink", e),
            }
        }
        Self::null(mixer, OutputFormat::default())
    }

    /// Render in real time into a scratch buffer that is thrown away
    pub(crate) fn null(mixer: Arc<Mutex<Mixer>>, format: OutputFormat) -> Result<Self> {
        let (stop, rx) = mpsc::channel::<()>();
        let thread = thread::Builder::new()
            .name("playdeck-null-output".into())
            .spawn(move || run_null_sink(mixer, format, rx))
            .map_err(|e| AudioError::Initialization(format!("spawn null output: {}", e)))?;

        log::info!(
            "[output] null sink at {} Hz, {} channels",
            format.sample_rate,
            format.channels
        );
        Ok(Self {
            stop: Some(stop),
            thread: Some(thread),
            format,
            kind: "null",
        })
    }

    pub(crate) fn format(&self) -> OutputFormat {
        self.format
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.kind
    }
}

impl Drop for Output {
    fn drop(&mut self) {
        // Closing the channel wakes the thread
        self.stop.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("[output] {} output thread panicked", self.kind);
            }
        }
        log::info!("[output] {} output closed", self.kind);
    }
}

fn run_null_sink(mixer: Arc<Mutex<Mixer>>, format: OutputFormat, rx: mpsc::Receiver<()>) {
    let channels = format.channels.max(1) as usize;
    let chunk_frames = (format.sample_rate as usize / 100).max(1);
    let mut scratch = vec![0.0f32; chunk_frames * channels];
    let started = Instant::now();
    let mut rendered: u64 = 0;

    // Anything but a timeout means the owner is gone
    while let Err(mpsc::RecvTimeoutError::Timeout) = rx.recv_timeout(NULL_PERIOD) {
        // Catch up with the wall clock so late wakeups do not slow playback
        let due = started.elapsed().as_micros() as u64 * format.sample_rate as u64 / 1_000_000;
        while rendered < due {
            let frames = ((due - rendered) as usize).min(chunk_frames);
            mixer.lock().render(&mut scratch[..frames * channels], format);
            rendered += frames as u64;
        }
    }
}

#[cfg(feature = "cpal")]
mod device {
    use super::*;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    /// Build and play the device stream on its own thread; the stream is not
    /// Send on every host, so it never leaves that thread
    pub(super) fn spawn(mixer: Arc<Mutex<Mixer>>) -> Result<Output> {
        let (stop, rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<OutputFormat>>(1);

        let thread = thread::Builder::new()
            .name("playdeck-output".into())
            .spawn(move || {
                let stream = match build_stream(mixer) {
                    Ok((stream, format)) => {
                        let _ = ready_tx.send(Ok(format));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                // Park until the owner drops the sender
                let _ = rx.recv();
                drop(stream);
            })
            .map_err(|e| AudioError::Initialization(format!("spawn output: {}", e)))?;

        let format = match ready_rx.recv() {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(AudioError::Device("output thread exited early".into()));
            }
        };

        Ok(Output {
            stop: Some(stop),
            thread: Some(thread),
            format,
            kind: "device",
        })
    }

    fn build_stream(mixer: Arc<Mutex<Mixer>>) -> Result<(cpal::Stream, OutputFormat)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Device("no default output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Device(format!("output config failed: {}", e)))?;

        let format = OutputFormat {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        };

        let err_fn = |err| log::error!("[output] output stream error: {}", err);
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device
                .build_output_stream(
                    &config.config(),
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        mixer.lock().render(data, format);
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| AudioError::Device(format!("build stream: {}", e)))?,
            other => {
                return Err(AudioError::Device(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        };
        stream
            .play()
            .map_err(|e| AudioError::Device(format!("stream play: {}", e)))?;

        log::info!(
            "[output] device {} Hz, {} channels",
            format.sample_rate,
            format.channels
        );
        Ok((stream, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::mix::Voice;
    use playdeck_core::{PlayParams, SampleId, VoiceId};
    use playdeck_decode_symphonia::DecodedClip;

    #[test]
    fn test_null_sink_advances_mixer() {
        let mixer = Arc::new(Mutex::new(Mixer::new()));
        let format = OutputFormat {
            sample_rate: 8000,
            channels: 1,
        };
        let clip = Arc::new(DecodedClip {
            samples: vec![0.5; 400],
            sample_rate: 8000,
            channels: 1,
        });
        mixer.lock().voices.push(Voice::new(
            VoiceId(1),
            SampleId(1),
            clip,
            PlayParams::default(),
            1,
        ));

        let output = Output::null(mixer.clone(), format).unwrap();
        assert_eq!(output.format(), format);
        assert_eq!(output.kind(), "null");

        // The 50 ms voice is consumed in real time
        let deadline = Instant::now() + Duration::from_secs(5);
        while !mixer.lock().voices.is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(mixer.lock().voices.is_empty());

        drop(output);
        let frozen = mixer.lock().frames_rendered();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(mixer.lock().frames_rendered(), frozen);
    }
}
