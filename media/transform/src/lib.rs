/*!
    Frame format conversion for the media reader crates.

    A [`Converter`] turns decoded frames of one layout into another: for
    video, scaling and pixel format conversion; for audio, resampling,
    channel layout and sample format conversion. Decoding units build one
    converter per stream through a [`ConverterFactory`].

    [`IdentityConverters`] only copies frames. With the `ffmpeg` feature,
    [`FfmpegConverters`] builds [`AudioTransform`] (libswresample) and
    [`VideoTransform`] (libswscale) converters.
*/

mod converter;
mod identity;

#[cfg(feature = "ffmpeg")]
mod audio;
#[cfg(feature = "ffmpeg")]
mod factory;
#[cfg(feature = "ffmpeg")]
pub mod frame_copy;
#[cfg(feature = "ffmpeg")]
mod video;

pub use converter::{Converter, ConverterFactory};
pub use identity::{IdentityConverter, IdentityConverters};

#[cfg(feature = "ffmpeg")]
pub use audio::AudioTransform;
#[cfg(feature = "ffmpeg")]
pub use factory::FfmpegConverters;
#[cfg(feature = "ffmpeg")]
pub use video::{ScalingAlgorithm, VideoTransform, VideoTransformConfig};

// Re-export types for convenience
pub use media_types::{Error, Frame, Par, Result};
