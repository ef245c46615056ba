// Uniform handle interfaces over the pooled and streamed pipelines

/// A logical sound asset that playback sessions are started from
///
/// Every operation is infallible: a handle whose resource failed to load or
/// was freed silently does nothing and reports degraded values.
pub trait Playable {
    /// The source handle returned by [`Playable::play_ex`]
    type Source: Source;

    /// Release the underlying resource; the handle stays unloaded afterwards
    fn free(&mut self);

    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    /// Length in seconds, 0 when unknown
    fn length(&self) -> f32;

    fn play(&mut self);

    /// Play with explicit loop control, returning a source when the variant
    /// supports one
    fn play_ex(&mut self, looping: bool) -> Option<Self::Source>;

    fn stop(&mut self);
}

/// Live control over one playback session
pub trait Source {
    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);

    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    /// Seek in seconds; ignored when the session cannot seek
    fn set_pos(&mut self, seconds: f32);

    /// Play cursor in seconds, 0 when unknown
    fn pos(&self) -> f32;
}

/// Clamp a caller-supplied volume into [0.0, 1.0]; NaN becomes silence
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
