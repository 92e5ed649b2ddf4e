/*!
    Stream format descriptors.

    A [`Par`] describes how a stream is encoded: the media kind, the
    parameters a decoder needs (sample or pixel layout), codec parameters,
    and the time base used to interpret timestamps. Descriptors are plain
    values; decoders, converters and frames all carry their own copy.
*/

use bytes::Bytes;

use crate::{ChannelLayout, CodecId, MediaKind, PixelFormat, Rational, SampleFormat};

/**
    Audio parameters of a stream or frame.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioParams {
    pub sample_format: SampleFormat,
    pub channel_layout: ChannelLayout,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per frame implied by the codec, zero if variable or unknown.
    pub frame_size: usize,
}

impl AudioParams {
    pub fn new(sample_format: SampleFormat, channel_layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            sample_format,
            channel_layout,
            sample_rate,
            frame_size: 0,
        }
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_layout.channels()
    }
}

/**
    Video parameters of a stream or frame.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoParams {
    pub pixel_format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub sample_aspect_ratio: Rational,
    /// Frame rate, if the container declares one.
    pub frame_rate: Option<Rational>,
}

impl VideoParams {
    pub fn new(pixel_format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            pixel_format,
            width,
            height,
            sample_aspect_ratio: Rational::new(1, 1),
            frame_rate: None,
        }
    }

    /**
        Returns the time base of one frame (the inverse of the frame rate).
    */
    pub fn frame_time_base(&self) -> Option<Rational> {
        self.frame_rate.filter(|r| r.is_valid()).map(Rational::invert)
    }
}

/**
    Kind-specific parameters. Exactly one set is meaningful per descriptor.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Params {
    Audio(AudioParams),
    Video(VideoParams),
    Subtitle,
    Data,
}

/**
    Codec parameters carried alongside the decode parameters.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecParams {
    pub id: CodecId,
    /// Codec extradata (SPS/PPS for H.264, AudioSpecificConfig for AAC, etc.).
    pub extradata: Option<Bytes>,
    /// Bitrate in bits per second (if known).
    pub bit_rate: Option<u64>,
    pub profile: Option<i32>,
    pub level: Option<i32>,
}

impl CodecParams {
    pub fn new(id: CodecId) -> Self {
        Self {
            id,
            extradata: None,
            bit_rate: None,
            profile: None,
            level: None,
        }
    }
}

impl Default for CodecParams {
    fn default() -> Self {
        Self::new(CodecId::Unknown)
    }
}

/**
    Format descriptor of a stream or frame.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Par {
    pub params: Params,
    pub codec: CodecParams,
    pub time_base: Rational,
}

impl Par {
    pub fn audio(params: AudioParams, time_base: Rational) -> Self {
        Self {
            params: Params::Audio(params),
            codec: CodecParams::default(),
            time_base,
        }
    }

    pub fn video(params: VideoParams, time_base: Rational) -> Self {
        Self {
            params: Params::Video(params),
            codec: CodecParams::default(),
            time_base,
        }
    }

    pub fn subtitle(time_base: Rational) -> Self {
        Self {
            params: Params::Subtitle,
            codec: CodecParams::default(),
            time_base,
        }
    }

    pub fn data(time_base: Rational) -> Self {
        Self {
            params: Params::Data,
            codec: CodecParams::default(),
            time_base,
        }
    }

    /**
        Builder: set the codec parameters.
    */
    pub fn with_codec(mut self, codec: CodecParams) -> Self {
        self.codec = codec;
        self
    }

    pub fn kind(&self) -> MediaKind {
        match self.params {
            Params::Audio(_) => MediaKind::Audio,
            Params::Video(_) => MediaKind::Video,
            Params::Subtitle => MediaKind::Subtitle,
            Params::Data => MediaKind::Data,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioParams> {
        match &self.params {
            Params::Audio(audio) => Some(audio),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoParams> {
        match &self.params {
            Params::Video(video) => Some(video),
            _ => None,
        }
    }

    /**
        Returns true if both descriptors describe the same decoded layout.

        Audio compares sample format, channel layout and sample rate. Video
        compares pixel format, width and height. Codec parameters, time base,
        aspect ratio and frame rate do not take part, so a converter is only
        needed when this returns false.
    */
    pub fn matches_format(&self, other: &Par) -> bool {
        match (&self.params, &other.params) {
            (Params::Audio(a), Params::Audio(b)) => {
                a.sample_format == b.sample_format
                    && a.channel_layout == b.channel_layout
                    && a.sample_rate == b.sample_rate
            }
            (Params::Video(a), Params::Video(b)) => {
                a.pixel_format == b.pixel_format && a.width == b.width && a.height == b.height
            }
            (Params::Subtitle, Params::Subtitle) | (Params::Data, Params::Data) => true,
            _ => false,
        }
    }
}

/**
    Format match over optional descriptors. A missing side never matches.
*/
pub fn matches_format(a: Option<&Par>, b: Option<&Par>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.matches_format(b),
        _ => false,
    }
}
