// Error handling shared by the sound backends

use std::fmt;

/// Errors raised by backends and decoders.
///
/// These never cross the public Playable / Source surface: handles absorb them
/// into their degraded state and log instead.
#[derive(Debug, Clone)]
pub enum AudioError {
    /// Backend could not be brought up
    Initialization(String),

    /// Asset could not be opened or registered
    Load(String),

    /// Asset was opened but could not be decoded
    Decoding(String),

    /// Output device missing or unusable
    Device(String),

    /// Operation does not apply to the current state
    InvalidState(String),

    /// Resource slots are all taken
    PoolExhausted(usize),

    /// Network error
    Network(String),

    /// IO error
    Io(String),

    /// Generic error
    Other(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AudioError::Initialization(msg) => write!(f, "Initialization error: {}", msg),
            AudioError::Load(msg) => write!(f, "Load error: {}", msg),
            AudioError::Decoding(msg) => write!(f, "Decoding error: {}", msg),
            AudioError::Device(msg) => write!(f, "Device error: {}", msg),
            AudioError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            AudioError::PoolExhausted(cap) => write!(f, "Sample pool exhausted ({} slots)", cap),
            AudioError::Network(msg) => write!(f, "Network error: {}", msg),
            AudioError::Io(msg) => write!(f, "IO error: {}", msg),
            AudioError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {}

/// Result type alias for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = AudioError::Load("missing.wav".to_string());
        assert_eq!(err.to_string(), "Load error: missing.wav");

        let err = AudioError::PoolExhausted(64);
        assert_eq!(err.to_string(), "Sample pool exhausted (64 slots)");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AudioError = io.into();
        assert!(matches!(err, AudioError::Io(ref msg) if msg == "gone"));
    }
}
