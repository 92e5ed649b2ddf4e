/*!
    Conversion utilities between ffmpeg-next types and media-types.

    Shared by the FFmpeg-backed decoders and converters in the sibling
    crates.
*/

use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::{Pixel, Sample};

use media_types::{
    ChannelLayout, CodecId, Error, MediaDuration, PixelFormat, Pts, Rational, Result,
    SampleFormat,
};

pub fn rational_from_ffmpeg(r: ffmpeg_next::Rational) -> Rational {
    Rational::new(r.numerator(), r.denominator())
}

pub fn rational_to_ffmpeg(r: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(r.num, r.den)
}

/**
    `None` for pixel formats [`PixelFormat`] has no variant for.
*/
pub fn pixel_format_from_ffmpeg(format: Pixel) -> Option<PixelFormat> {
    match format {
        Pixel::YUV420P => Some(PixelFormat::Yuv420p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::BGRA => Some(PixelFormat::Bgra),
        Pixel::RGBA => Some(PixelFormat::Rgba),
        Pixel::RGB24 => Some(PixelFormat::Rgb24),
        Pixel::BGR24 => Some(PixelFormat::Bgr24),
        Pixel::YUV422P => Some(PixelFormat::Yuv422p),
        Pixel::YUV444P => Some(PixelFormat::Yuv444p),
        Pixel::YUV420P10LE => Some(PixelFormat::Yuv420p10),
        Pixel::P010LE => Some(PixelFormat::P010le),
        Pixel::GRAY8 => Some(PixelFormat::Gray8),
        _ => None,
    }
}

/**
    Fails with [`Error::UnsupportedFormat`] for formats without an FFmpeg
    counterpart.
*/
pub fn pixel_format_to_ffmpeg(format: PixelFormat) -> Result<Pixel> {
    match format {
        PixelFormat::Yuv420p => Ok(Pixel::YUV420P),
        PixelFormat::Nv12 => Ok(Pixel::NV12),
        PixelFormat::Bgra => Ok(Pixel::BGRA),
        PixelFormat::Rgba => Ok(Pixel::RGBA),
        PixelFormat::Rgb24 => Ok(Pixel::RGB24),
        PixelFormat::Bgr24 => Ok(Pixel::BGR24),
        PixelFormat::Yuv422p => Ok(Pixel::YUV422P),
        PixelFormat::Yuv444p => Ok(Pixel::YUV444P),
        PixelFormat::Yuv420p10 => Ok(Pixel::YUV420P10LE),
        PixelFormat::P010le => Ok(Pixel::P010LE),
        PixelFormat::Gray8 => Ok(Pixel::GRAY8),
        _ => Err(Error::unsupported_format(format!(
            "pixel format {:?} not supported",
            format
        ))),
    }
}

/**
    Keeps planarity. `None` for FFmpeg's unset format.
*/
pub fn sample_format_from_ffmpeg(format: Sample) -> Option<SampleFormat> {
    let packed = match format {
        Sample::F32(_) => SampleFormat::F32,
        Sample::F64(_) => SampleFormat::F64,
        Sample::I16(_) => SampleFormat::S16,
        Sample::I32(_) => SampleFormat::S32,
        Sample::U8(_) => SampleFormat::U8,
        _ => return None,
    };
    Some(if format.is_planar() {
        packed.planar()
    } else {
        packed
    })
}

/**
    Inverse of [`sample_format_from_ffmpeg`].
*/
pub fn sample_format_to_ffmpeg(format: SampleFormat) -> Result<Sample> {
    let layout = if format.is_planar() {
        SampleType::Planar
    } else {
        SampleType::Packed
    };
    match format.packed() {
        SampleFormat::F32 => Ok(Sample::F32(layout)),
        SampleFormat::F64 => Ok(Sample::F64(layout)),
        SampleFormat::S16 => Ok(Sample::I16(layout)),
        SampleFormat::S32 => Ok(Sample::I32(layout)),
        SampleFormat::U8 => Ok(Sample::U8(layout)),
        _ => Err(Error::unsupported_format(format!(
            "sample format {:?} not supported",
            format
        ))),
    }
}

pub fn channel_layout_to_ffmpeg(layout: ChannelLayout) -> ffmpeg_next::ChannelLayout {
    match layout {
        ChannelLayout::Mono => ffmpeg_next::ChannelLayout::MONO,
        ChannelLayout::Stereo => ffmpeg_next::ChannelLayout::STEREO,
        ChannelLayout::Surround5_1 => ffmpeg_next::ChannelLayout::_5POINT1,
        ChannelLayout::Surround7_1 => ffmpeg_next::ChannelLayout::_7POINT1,
        other => ffmpeg_next::ChannelLayout::default(other.channels() as i32),
    }
}

pub fn codec_id_from_ffmpeg(id: ffmpeg_next::codec::Id) -> CodecId {
    use ffmpeg_next::codec::Id;

    match id {
        // Video
        Id::H264 => CodecId::H264,
        Id::HEVC => CodecId::H265,
        Id::VP8 => CodecId::Vp8,
        Id::VP9 => CodecId::Vp9,
        Id::AV1 => CodecId::Av1,
        Id::MPEG4 => CodecId::Mpeg4,
        Id::MPEG2VIDEO => CodecId::Mpeg2Video,
        Id::RAWVIDEO => CodecId::RawVideo,
        // Audio
        Id::AAC => CodecId::Aac,
        Id::OPUS => CodecId::Opus,
        Id::MP3 => CodecId::Mp3,
        Id::VORBIS => CodecId::Vorbis,
        Id::FLAC => CodecId::Flac,
        Id::PCM_S16LE => CodecId::PcmS16Le,
        Id::PCM_S16BE => CodecId::PcmS16Be,
        Id::PCM_F32LE => CodecId::PcmF32Le,
        Id::AC3 => CodecId::Ac3,
        // Subtitle
        Id::SUBRIP => CodecId::Subrip,
        Id::WEBVTT => CodecId::WebVtt,
        _ => CodecId::Unknown,
    }
}

pub fn codec_id_to_ffmpeg(id: CodecId) -> Result<ffmpeg_next::codec::Id> {
    use ffmpeg_next::codec::Id;

    match id {
        CodecId::H264 => Ok(Id::H264),
        CodecId::H265 => Ok(Id::HEVC),
        CodecId::Vp8 => Ok(Id::VP8),
        CodecId::Vp9 => Ok(Id::VP9),
        CodecId::Av1 => Ok(Id::AV1),
        CodecId::Mpeg4 => Ok(Id::MPEG4),
        CodecId::Mpeg2Video => Ok(Id::MPEG2VIDEO),
        CodecId::RawVideo => Ok(Id::RAWVIDEO),
        CodecId::Aac => Ok(Id::AAC),
        CodecId::Opus => Ok(Id::OPUS),
        CodecId::Mp3 => Ok(Id::MP3),
        CodecId::Vorbis => Ok(Id::VORBIS),
        CodecId::Flac => Ok(Id::FLAC),
        CodecId::PcmS16Le => Ok(Id::PCM_S16LE),
        CodecId::PcmS16Be => Ok(Id::PCM_S16BE),
        CodecId::PcmF32Le => Ok(Id::PCM_F32LE),
        CodecId::Ac3 => Ok(Id::AC3),
        CodecId::Subrip => Ok(Id::SUBRIP),
        CodecId::WebVtt => Ok(Id::WEBVTT),
        other => Err(Error::unsupported_codec(format!("{:?}", other))),
    }
}

pub fn pts_from_ffmpeg(pts: Option<i64>) -> Option<Pts> {
    pts.map(Pts)
}

pub fn duration_from_ffmpeg(duration: i64) -> MediaDuration {
    MediaDuration(duration)
}

/**
    Map an FFmpeg error into the pipeline's codec error.
*/
pub fn codec_error(error: ffmpeg_next::Error) -> Error {
    Error::codec(error.to_string())
}
