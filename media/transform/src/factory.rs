/*!
    FFmpeg-backed converter factory.
*/

use media_source::convert::{pixel_format_to_ffmpeg, sample_format_to_ffmpeg};
use media_types::{Error, MediaKind, Par, Result};

use crate::audio::AudioTransform;
use crate::converter::{Converter, ConverterFactory};
use crate::video::{VideoTransform, VideoTransformConfig};

/**
    Builds swresample converters for audio and swscale converters for
    video.

    The desired layout is checked when the converter is built, so an
    unrepresentable target fails before any frame flows.
*/
#[derive(Clone, Debug, Default)]
pub struct FfmpegConverters {
    video: VideoTransformConfig,
}

impl FfmpegConverters {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Builder: configure the scaler used for video conversions.
    */
    pub fn with_video_config(mut self, config: VideoTransformConfig) -> Self {
        self.video = config;
        self
    }
}

impl ConverterFactory for FfmpegConverters {
    fn make_converter(&self, native: &Par, desired: &Par) -> Result<Box<dyn Converter>> {
        match (native.kind(), desired.kind()) {
            (MediaKind::Audio, MediaKind::Audio) => {
                if let Some(audio) = desired.as_audio() {
                    sample_format_to_ffmpeg(audio.sample_format)?;
                }
                Ok(Box::new(AudioTransform::new(desired.clone())?))
            }
            (MediaKind::Video, MediaKind::Video) => {
                if let Some(video) = desired.as_video() {
                    pixel_format_to_ffmpeg(video.pixel_format)?;
                }
                Ok(Box::new(VideoTransform::new(desired.clone(), self.video)?))
            }
            (from, to) if from != to => Err(Error::invalid_parameters(format!(
                "cannot convert {from} frames into {to} frames"
            ))),
            (kind, _) => Err(Error::unsupported_format(format!(
                "{kind} frames cannot be converted"
            ))),
        }
    }
}
