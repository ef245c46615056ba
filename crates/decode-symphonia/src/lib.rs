// Asset probing and decoding using Symphonia

mod decode;
mod probe;
mod stream;

pub use decode::{decode_file, DecodedClip};
pub use probe::{open_format, probe_file, TrackInfo};
pub use stream::StreamDecoder;

use symphonia::core::probe::Hint;

/// Create a hint from the file extension
pub fn hint_from_path(path: &str) -> Hint {
    let mut hint = Hint::new();
    if let Some(extension) = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
    {
        hint.with_extension(extension);
    }
    hint
}
