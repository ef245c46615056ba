// C ABI for playdeck
// Integer handles over sounds and sources, plus the callback-id HTTP bridge.

use playdeck_core::Result;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::Once;

pub mod http;
pub mod sound;

pub use http::HttpCompletionFn;

static INIT_LOGGER: Once = Once::new();

pub(crate) fn init_logging() {
    INIT_LOGGER.call_once(install_logger);
}

#[cfg(target_os = "android")]
fn install_logger() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("playdeck"),
    );
}

#[cfg(not(target_os = "android"))]
fn install_logger() {
    let _ = env_logger::builder()
        .is_test(cfg!(test))
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Borrow a NUL-terminated UTF-8 string from the caller
pub(crate) fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    let c_str = unsafe { CStr::from_ptr(ptr) };
    c_str.to_str().ok()
}

pub(crate) fn to_code(result: Result<()>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => {
            log::warn!("[ffi] {}", err);
            -1
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use once_cell::sync::Lazy;
    use parking_lot::Mutex;
    use std::ffi::CString;
    use std::path::{Path, PathBuf};

    /// Serializes tests that touch the global sound state
    pub static GLOBAL_STATE: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    pub fn write_wav(dir: &Path, name: &str, seconds: f32) -> PathBuf {
        let path = dir.join(name);
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..(8000.0 * seconds) as u32 {
            writer.write_sample(((i % 40) as i16 - 20) * 200).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    pub fn c_path(path: &Path) -> CString {
        CString::new(path.to_str().unwrap()).unwrap()
    }
}
