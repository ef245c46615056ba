// Streamed playback state machine

/// Lifecycle of a streamed playable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// The pipeline could not be opened, or was freed
    Uninitialized,
    /// Opened and ready to start
    Ready,
    /// Audio is currently playing
    Playing,
    /// Audio is paused
    Paused,
    /// Playback was stopped or ran to its end
    Stopped,
}

impl StreamState {
    pub fn is_valid_transition(from: StreamState, to: StreamState) -> bool {
        use StreamState::*;

        match (from, to) {
            // Freeing is always allowed
            (_, Uninitialized) => true,

            (Ready, Playing) => true,

            (Playing, Paused) => true,
            (Playing, Stopped) => true,

            (Paused, Playing) => true,
            (Paused, Stopped) => true,

            (Stopped, Playing) => true,

            // Re-pausing or re-stopping leaves the state untouched
            (a, b) if a == b => a != Uninitialized,

            _ => false,
        }
    }

    /// Move to `to`, logging transitions the machine does not expect
    pub fn advance(&mut self, to: StreamState) {
        if !Self::is_valid_transition(*self, to) {
            log::debug!("[stream] unexpected transition {:?} -> {:?}", self, to);
        }
        *self = to;
    }

    pub fn is_loaded(self) -> bool {
        self != StreamState::Uninitialized
    }
}

impl Default for StreamState {
    fn default() -> Self {
        StreamState::Uninitialized
    }
}
