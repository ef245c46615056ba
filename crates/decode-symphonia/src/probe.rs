// Container probing: find the audio track and read its duration

use crate::hint_from_path;
use playdeck_core::{AudioError, Result};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use std::fs::File;

/// Basic facts about the first decodable track of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackInfo {
    pub track_id: u32,
    pub sample_rate: u32,
    pub channels: u16,
    /// 0 when the container does not say
    pub duration_ms: u64,
}

/// Open `path` and return its format reader together with the chosen track
pub fn open_format(path: &str) -> Result<(Box<dyn FormatReader>, TrackInfo)> {
    let file = File::open(path).map_err(|e| AudioError::Load(format!("open {}: {}", path, e)))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &hint_from_path(path),
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decoding(format!("probe {}: {}", path, e)))?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decoding(format!("no audio track in {}", path)))?;

    let params = &track.codec_params;
    let sample_rate = params.sample_rate.unwrap_or(0);
    let channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);

    let duration_ms = match (params.n_frames, params.time_base) {
        (Some(frames), Some(tb)) => {
            let time = tb.calc_time(frames);
            time.seconds * 1000 + (time.frac * 1000.0) as u64
        }
        (Some(frames), None) if sample_rate > 0 => frames * 1000 / sample_rate as u64,
        _ => 0,
    };

    let info = TrackInfo {
        track_id: track.id,
        sample_rate,
        channels,
        duration_ms,
    };
    log::debug!("[probe] {} -> {:?}", path, info);

    Ok((format, info))
}

/// Probe a file without decoding it
pub fn probe_file(path: &str) -> Result<TrackInfo> {
    open_format(path).map(|(_, info)| info)
}
