/*!
    Pixel format conversion and resizing through swscale.
*/

use ffmpeg_next::software::scaling::{context::Context as SwsContext, flag::Flags as SwsFlags};
use ffmpeg_next::util::frame::video::Video as AvVideoFrame;

use media_source::convert::pixel_format_to_ffmpeg;
use media_types::{Error, Frame, Par, Result, VideoParams};

use crate::converter::Converter;
use crate::frame_copy::{video_from_ffmpeg, video_to_ffmpeg};

/**
    Interpolation used when a frame is resized.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingAlgorithm {
    /// Point sampling; blocky but cheapest.
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    /// Sharpest result at the highest cost.
    Lanczos,
}

impl ScalingAlgorithm {
    fn sws_flags(self) -> SwsFlags {
        match self {
            Self::Nearest => SwsFlags::POINT,
            Self::Bilinear => SwsFlags::BILINEAR,
            Self::Bicubic => SwsFlags::BICUBIC,
            Self::Lanczos => SwsFlags::LANCZOS,
        }
    }
}

/**
    Options for [`VideoTransform`].
*/
#[derive(Clone, Copy, Debug, Default)]
pub struct VideoTransformConfig {
    pub algorithm: ScalingAlgorithm,
}

impl VideoTransformConfig {
    pub fn with_algorithm(mut self, algorithm: ScalingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/**
    Converts decoded video frames to a fixed pixel format and size.

    The swscale context is built from the first frame and rebuilt whenever
    the incoming size or pixel format changes. Output frames keep the time
    base and timestamp of their input.
*/
pub struct VideoTransform {
    output: Par,
    config: VideoTransformConfig,
    scaler: Option<Scaler>,
}

struct Scaler {
    context: SwsContext,
    input: VideoParams,
}

impl Scaler {
    fn accepts(&self, input: &VideoParams) -> bool {
        self.input.pixel_format == input.pixel_format
            && self.input.width == input.width
            && self.input.height == input.height
    }
}

impl VideoTransform {
    /**
        Create a transform producing frames in the `output` layout, which
        must be a video layout with non-zero dimensions.
    */
    pub fn new(output: Par, config: VideoTransformConfig) -> Result<Self> {
        match output.as_video() {
            Some(video) if video.width > 0 && video.height > 0 => {}
            Some(_) => {
                return Err(Error::invalid_parameters(
                    "video transform target has zero dimensions",
                ));
            }
            None => {
                return Err(Error::invalid_parameters(format!(
                    "video transform needs a video layout, got {}",
                    output.kind()
                )));
            }
        }
        Ok(Self {
            output,
            config,
            scaler: None,
        })
    }

    pub fn config(&self) -> &VideoTransformConfig {
        &self.config
    }

    fn target(&self) -> Result<&VideoParams> {
        self.output
            .as_video()
            .ok_or_else(|| Error::invalid_parameters("video transform lost its layout"))
    }

    /**
        The scaler for `input`, rebuilt if the last one was made for a
        different size or pixel format.
    */
    fn scaler_for(&mut self, input: &VideoParams) -> Result<&mut SwsContext> {
        if !self.scaler.as_ref().is_some_and(|s| s.accepts(input)) {
            let target = self.target()?;
            let context = SwsContext::get(
                pixel_format_to_ffmpeg(input.pixel_format)?,
                input.width,
                input.height,
                pixel_format_to_ffmpeg(target.pixel_format)?,
                target.width,
                target.height,
                self.config.algorithm.sws_flags(),
            )
            .map_err(|e| Error::codec(format!("cannot build scaler: {e}")))?;

            tracing::debug!(
                from = %format_args!("{:?} {}x{}", input.pixel_format, input.width, input.height),
                to = %format_args!("{:?} {}x{}", target.pixel_format, target.width, target.height),
                algorithm = ?self.config.algorithm,
                "initialised scaler"
            );

            self.scaler = Some(Scaler {
                context,
                input: input.clone(),
            });
        }

        self.scaler
            .as_mut()
            .map(|s| &mut s.context)
            .ok_or_else(|| Error::codec("scaler unavailable"))
    }
}

impl Converter for VideoTransform {
    fn output(&self) -> &Par {
        &self.output
    }

    fn convert(&mut self, frame: &Frame) -> Result<Option<Frame>> {
        let input = frame
            .par()
            .as_video()
            .ok_or_else(|| Error::invalid_data(format!("expected video frame, got {}", frame.kind())))?
            .clone();
        if input.width == 0 || input.height == 0 {
            return Err(Error::invalid_data("video frame has zero dimensions"));
        }

        let source = video_to_ffmpeg(frame)?;
        let target = self.target()?;
        let mut scaled = AvVideoFrame::new(
            pixel_format_to_ffmpeg(target.pixel_format)?,
            target.width,
            target.height,
        );

        self.scaler_for(&input)?
            .run(&source, &mut scaled)
            .map_err(|e| Error::codec(format!("swscale failed: {e}")))?;

        let mut par = self.output.clone();
        par.time_base = frame.par().time_base;
        Ok(Some(video_from_ffmpeg(&scaled, par)?.with_pts(frame.pts())))
    }
}

// SAFETY: the swscale context is owned by this transform alone and only
// touched through &mut self.
unsafe impl Send for VideoTransform {}

impl std::fmt::Debug for VideoTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoTransform")
            .field("output", &self.output.as_video())
            .field("algorithm", &self.config.algorithm)
            .field("scaler_ready", &self.scaler.is_some())
            .finish()
    }
}
