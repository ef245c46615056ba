// Core types and traits for the playdeck sound and request layer

pub mod backend;
pub mod config;
pub mod error;
pub mod playable;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use backend::{AudioBackend, PlayParams, SampleId, SamplePool, StreamPlayer, VoiceId};
pub use config::SoundConfig;
pub use error::{AudioError, Result};
pub use playable::{clamp_volume, Playable, Source};
pub use state::StreamState;
pub use stats::SoundStats;
