// Errors raised while running one request

use std::fmt;

/// Why a request produced no usable response. Every variant is reported to
/// the caller as status 0.
#[derive(Debug)]
pub enum TransportError {
    /// Connection, DNS, TLS or timeout failure
    Transport(String),

    /// The server answered outside 2xx
    Status(u16),

    /// The body could not be read as UTF-8 text
    Body(std::io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransportError::Transport(msg) => write!(f, "Transport error: {}", msg),
            TransportError::Status(code) => write!(f, "HTTP status {}", code),
            TransportError::Body(e) => write!(f, "Unreadable body: {}", e),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Body(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
