// Sound subsystem configuration

/// Default number of concurrently sounding pool instances
pub const DEFAULT_MAX_VOICES: usize = 4;

/// Default number of decoded sample slots
pub const DEFAULT_MAX_SAMPLES: usize = 64;

/// Settings applied when the sound subsystem is initialized
#[derive(Debug, Clone, PartialEq)]
pub struct SoundConfig {
    /// Ceiling on concurrently sounding pooled instances; the pool steals
    /// voices beyond it
    pub max_voices: usize,
    /// Number of decoded resource slots in the pool
    pub max_samples: usize,
    /// Ask the backend to verify an output device exists before coming up
    pub probe_output_device: bool,
}

impl SoundConfig {
    pub fn new() -> Self {
        Self {
            max_voices: DEFAULT_MAX_VOICES,
            max_samples: DEFAULT_MAX_SAMPLES,
            probe_output_device: true,
        }
    }

    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn with_device_probe(mut self, probe: bool) -> Self {
        self.probe_output_device = probe;
        self
    }

    /// A pool with no voices or no slots can never play anything
    pub fn is_usable(&self) -> bool {
        self.max_voices > 0 && self.max_samples > 0
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SoundConfig::default();
        assert_eq!(config.max_voices, 4);
        assert_eq!(config.max_samples, 64);
        assert!(config.probe_output_device);
        assert!(config.is_usable());
    }

    #[test]
    fn test_zero_capacity_is_unusable() {
        assert!(!SoundConfig::new().with_max_voices(0).is_usable());
        assert!(!SoundConfig::new().with_max_samples(0).is_usable());
    }
}
