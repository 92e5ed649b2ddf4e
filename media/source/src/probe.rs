/*!
    Container inspection without decoding.
*/

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{ffi, format::context::Input as InputContext, media::Type};

use media_types::{
    AudioParams, ChannelLayout, CodecParams, Error, MediaInfo, Par, Rational, Result, StreamInfo,
    VideoParams,
};

use crate::convert::{
    codec_id_from_ffmpeg, pixel_format_from_ffmpeg, rational_from_ffmpeg,
    sample_format_from_ffmpeg,
};

/**
    List the streams and duration of a media file without reading packets.

    Every stream of the container is listed, including subtitle and data
    streams.

    # Example

    ```ignore
    let info = probe("video.mp4")?;
    for stream in &info.streams {
        println!("#{}: {}", stream.index, stream.kind());
    }
    ```
*/
pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaInfo> {
    let input_ctx = open_input(path.as_ref())?;
    Ok(extract_media_info(&input_ctx))
}

/**
    Initialise FFmpeg and open a container, mapping missing files to I/O
    errors.
*/
pub(crate) fn open_input(path: &Path) -> Result<InputContext> {
    ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

    ffmpeg_next::format::input(&path).map_err(|e| {
        if e.to_string().contains("No such file") {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: {}", path.display(), e),
            ))
        } else {
            Error::codec(format!("{}: {}", path.display(), e))
        }
    })
}

/**
    Extract MediaInfo from an already-opened input context.
*/
pub(crate) fn extract_media_info(input_ctx: &InputContext) -> MediaInfo {
    let container_duration = if input_ctx.duration() > 0 {
        Some(Duration::from_micros(input_ctx.duration() as u64))
    } else {
        None
    };

    let streams: Vec<StreamInfo> = input_ctx
        .streams()
        .map(|stream| extract_stream_info(&stream, container_duration))
        .collect();

    let duration = container_duration.or_else(|| streams.iter().find_map(|s| s.duration));

    MediaInfo { duration, streams }
}

fn extract_stream_info(
    stream: &ffmpeg_next::format::stream::Stream<'_>,
    container_duration: Option<Duration>,
) -> StreamInfo {
    let time_base = rational_from_ffmpeg(stream.time_base());

    let duration = if stream.duration() > 0 && time_base.is_valid() {
        let seconds = stream.duration() as f64 * time_base.to_f64();
        Some(Duration::from_secs_f64(seconds))
    } else {
        container_duration
    };

    let params = stream.parameters();
    let codec = extract_codec_params(&params);

    let par = match params.medium() {
        Type::Video => video_par(stream, time_base),
        Type::Audio => audio_par(stream, time_base),
        Type::Subtitle => Some(Par::subtitle(time_base)),
        _ => Some(Par::data(time_base)),
    };

    let par = par.unwrap_or_else(|| {
        tracing::warn!(
            stream = stream.index(),
            codec = ?params.id(),
            "stream layout not representable, exposing it as data"
        );
        Par::data(time_base)
    });

    StreamInfo {
        index: stream.index(),
        par: par.with_codec(codec),
        duration,
    }
}

fn video_par(stream: &ffmpeg_next::format::stream::Stream<'_>, time_base: Rational) -> Option<Par> {
    let context = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).ok()?;
    let decoder = context.decoder().video().ok()?;

    let pixel_format = pixel_format_from_ffmpeg(decoder.format())?;

    let frame_rate = if stream.avg_frame_rate().numerator() != 0 {
        Some(rational_from_ffmpeg(stream.avg_frame_rate()))
    } else if stream.rate().numerator() != 0 {
        Some(rational_from_ffmpeg(stream.rate()))
    } else {
        None
    };

    let aspect = rational_from_ffmpeg(decoder.aspect_ratio());

    let mut params = VideoParams::new(pixel_format, decoder.width(), decoder.height());
    params.frame_rate = frame_rate;
    if aspect.is_valid() && aspect.num != 0 {
        params.sample_aspect_ratio = aspect;
    }

    Some(Par::video(params, time_base))
}

fn audio_par(stream: &ffmpeg_next::format::stream::Stream<'_>, time_base: Rational) -> Option<Par> {
    let context = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).ok()?;
    let decoder = context.decoder().audio().ok()?;

    let sample_format = sample_format_from_ffmpeg(decoder.format())?;
    let channel_layout = ChannelLayout::from_count(decoder.channels() as u16);

    let mut params = AudioParams::new(sample_format, channel_layout, decoder.rate());
    params.frame_size = decoder.frame_size() as usize;

    Some(Par::audio(params, time_base))
}

fn extract_codec_params(params: &ffmpeg_next::codec::Parameters) -> CodecParams {
    let mut codec = CodecParams::new(codec_id_from_ffmpeg(params.id()));

    // SAFETY: We're reading from a valid AVCodecParameters pointer that FFmpeg owns
    unsafe {
        let ptr = params.as_ptr();

        // SPS/PPS for H.264, AudioSpecificConfig for AAC, etc.
        if (*ptr).extradata_size > 0 && !(*ptr).extradata.is_null() {
            let slice =
                std::slice::from_raw_parts((*ptr).extradata, (*ptr).extradata_size as usize);
            codec.extradata = Some(slice.to_vec().into());
        }

        if (*ptr).bit_rate > 0 {
            codec.bit_rate = Some((*ptr).bit_rate as u64);
        }

        if (*ptr).profile != ffi::FF_PROFILE_UNKNOWN {
            codec.profile = Some((*ptr).profile);
        }

        if (*ptr).level != ffi::AV_LEVEL_UNKNOWN {
            codec.level = Some((*ptr).level);
        }
    }

    codec
}
