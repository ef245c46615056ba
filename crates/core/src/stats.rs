// Developer-facing counters for the sound subsystem

/// Snapshot of what the sound subsystem currently holds
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoundStats {
    /// Decoded samples registered in the pool
    pub sample_count: u32,
    /// Streams with an open pipeline
    pub stream_count: u32,
    /// Pooled instances still sounding
    pub playing_samples: u32,
    /// Streams currently playing
    pub playing_streams: u32,
}

impl SoundStats {
    pub fn is_idle(&self) -> bool {
        self.playing_samples == 0 && self.playing_streams == 0
    }
}
