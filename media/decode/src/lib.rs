/*!
    Per-stream decoding for the media reader crates.

    A [`DecodingUnit`] owns one stream's [`Decoder`] and, when the caller
    asks for a different layout, a converter. It turns packets into frames,
    including the frames released when the stream is flushed at its end.

    With the `ffmpeg` feature, [`FfmpegDecoders`] builds libavcodec
    decoders ([`AudioDecoder`], [`VideoDecoder`]).
*/

mod decoder;
mod unit;

#[cfg(feature = "ffmpeg")]
mod audio;
#[cfg(feature = "ffmpeg")]
mod factory;
#[cfg(feature = "ffmpeg")]
mod packet;
#[cfg(feature = "ffmpeg")]
mod video;

pub use decoder::{Decoder, DecoderFactory, Drain, Submit};
pub use unit::DecodingUnit;

#[cfg(feature = "ffmpeg")]
pub use audio::AudioDecoder;
#[cfg(feature = "ffmpeg")]
pub use factory::FfmpegDecoders;
#[cfg(feature = "ffmpeg")]
pub use video::VideoDecoder;

// Re-export types for convenience
pub use media_types::{Error, Flow, Frame, Packet, Par, Result, StreamInfo};
