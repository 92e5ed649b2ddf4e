/*!
    Pixel, sample and codec format types.
*/

/**
    Kind of media carried by an elementary stream.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
    Subtitle,
    Data,
}

impl MediaKind {
    /**
        Returns true for kinds that decode into sample or pixel frames.
    */
    pub const fn is_decodable(self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Subtitle => "subtitle",
            Self::Data => "data",
        };
        f.write_str(name)
    }
}

/**
    Pixel layouts a frame can carry. Decoded streams in any other layout
    are not exposed as video.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 8-bit 4:2:0 with separate Y, U and V planes.
    Yuv420p,
    /// 8-bit 4:2:0, Y plane plus interleaved UV plane.
    Nv12,
    Bgra,
    Rgba,
    Rgb24,
    Bgr24,
    Yuv422p,
    Yuv444p,
    /// 10-bit 4:2:0 planar, two bytes per sample.
    Yuv420p10,
    /// 10-bit Nv12 variant, two bytes per sample.
    P010le,
    Gray8,
}

impl PixelFormat {
    /**
        Returns the number of separate data planes.
    */
    pub const fn plane_count(self) -> usize {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p | Self::Yuv420p10 => 3,
            Self::Nv12 | Self::P010le => 2,
            Self::Bgra | Self::Rgba | Self::Rgb24 | Self::Bgr24 | Self::Gray8 => 1,
        }
    }

    /**
        Returns `(row_bytes, rows)` for every plane of a `width` x `height` image.

        Chroma planes round odd dimensions up.
    */
    pub fn plane_layout(self, width: u32, height: u32) -> Vec<(usize, usize)> {
        let w = width as usize;
        let h = height as usize;
        let half_w = w.div_ceil(2);
        let half_h = h.div_ceil(2);

        match self {
            Self::Yuv420p => vec![(w, h), (half_w, half_h), (half_w, half_h)],
            Self::Yuv420p10 => vec![(w * 2, h), (half_w * 2, half_h), (half_w * 2, half_h)],
            Self::Yuv422p => vec![(w, h), (half_w, h), (half_w, h)],
            Self::Yuv444p => vec![(w, h), (w, h), (w, h)],
            Self::Nv12 => vec![(w, h), (half_w * 2, half_h)],
            Self::P010le => vec![(w * 2, h), (half_w * 4, half_h)],
            Self::Bgra | Self::Rgba => vec![(w * 4, h)],
            Self::Rgb24 | Self::Bgr24 => vec![(w * 3, h)],
            Self::Gray8 => vec![(w, h)],
        }
    }
}

/**
    Audio sample formats.

    The `p` suffixed variants store each channel in its own plane.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleFormat {
    /// Interleaved 32-bit float.
    F32,
    F64,
    S16,
    S32,
    U8,
    F32p,
    F64p,
    S16p,
    S32p,
    U8p,
}

impl SampleFormat {
    /**
        Bytes one sample of one channel occupies.
    */
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 | Self::U8p => 1,
            Self::S16 | Self::S16p => 2,
            Self::S32 | Self::F32 | Self::S32p | Self::F32p => 4,
            Self::F64 | Self::F64p => 8,
        }
    }

    /**
        Returns true if each channel lives in its own plane.
    */
    pub const fn is_planar(self) -> bool {
        matches!(
            self,
            Self::F32p | Self::F64p | Self::S16p | Self::S32p | Self::U8p
        )
    }

    /**
        Returns the interleaved variant of this format.
    */
    pub const fn packed(self) -> Self {
        match self {
            Self::F32p => Self::F32,
            Self::F64p => Self::F64,
            Self::S16p => Self::S16,
            Self::S32p => Self::S32,
            Self::U8p => Self::U8,
            other => other,
        }
    }

    /**
        Returns the planar variant of this format.
    */
    pub const fn planar(self) -> Self {
        match self {
            Self::F32 => Self::F32p,
            Self::F64 => Self::F64p,
            Self::S16 => Self::S16p,
            Self::S32 => Self::S32p,
            Self::U8 => Self::U8p,
            other => other,
        }
    }
}

/**
    Audio channel layout.

    Layouts are compared by value. Channel counts without a named layout
    are carried as [`ChannelLayout::Unspecified`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ChannelLayout {
    Mono,
    Stereo,
    /// FL FR FC LFE BL BR
    Surround5_1,
    /// FL FR FC LFE BL BR SL SR
    Surround7_1,
    /// Channel count with no known speaker assignment
    Unspecified(u16),
}

impl ChannelLayout {
    pub const fn channels(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::Surround5_1 => 6,
            Self::Surround7_1 => 8,
            Self::Unspecified(count) => count,
        }
    }

    /**
        The conventional layout for `count` channels.
    */
    pub const fn from_count(count: u16) -> Self {
        match count {
            1 => Self::Mono,
            2 => Self::Stereo,
            6 => Self::Surround5_1,
            8 => Self::Surround7_1,
            other => Self::Unspecified(other),
        }
    }
}

/**
    Codec identifiers known to the pipeline.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    // Video
    H264,
    H265,
    Vp8,
    Vp9,
    Av1,
    Mpeg4,
    Mpeg2Video,
    RawVideo,
    // Audio
    Aac,
    Opus,
    Mp3,
    Vorbis,
    Flac,
    PcmS16Le,
    PcmS16Be,
    PcmF32Le,
    Ac3,
    // Subtitle
    Subrip,
    WebVtt,
    /// Codec the pipeline has no name for
    Unknown,
}

impl CodecId {
    /**
        Returns the media kind this codec produces, if known.
    */
    pub const fn kind(self) -> Option<MediaKind> {
        match self {
            Self::H264
            | Self::H265
            | Self::Vp8
            | Self::Vp9
            | Self::Av1
            | Self::Mpeg4
            | Self::Mpeg2Video
            | Self::RawVideo => Some(MediaKind::Video),
            Self::Aac
            | Self::Opus
            | Self::Mp3
            | Self::Vorbis
            | Self::Flac
            | Self::PcmS16Le
            | Self::PcmS16Be
            | Self::PcmF32Le
            | Self::Ac3 => Some(MediaKind::Audio),
            Self::Subrip | Self::WebVtt => Some(MediaKind::Subtitle),
            Self::Unknown => None,
        }
    }
}
