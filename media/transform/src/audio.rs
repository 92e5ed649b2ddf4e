/*!
    Sample format, channel layout and rate conversion through swresample.
*/

use ffmpeg_next::software::resampling::context::Context as SwrContext;
use ffmpeg_next::util::frame::audio::Audio as AvAudioFrame;

use media_source::convert::{channel_layout_to_ffmpeg, codec_error, sample_format_to_ffmpeg};
use media_types::{AudioParams, Error, Frame, Par, Pts, Result};

use crate::converter::Converter;
use crate::frame_copy::{audio_from_ffmpeg, audio_to_ffmpeg};

/**
    Converts decoded audio frames to a fixed sample format, channel layout
    and sample rate.

    The swresample context is built from the first frame and rebuilt when
    the incoming layout changes. Resampling buffers samples across calls,
    so frames must arrive in order and [`Converter::flush`] releases the
    tail at the end of the stream.

    Output timestamps are expressed in the output time base. Frames whose
    input has no timestamp continue from the end of the previous output.
*/
pub struct AudioTransform {
    output: Par,
    resampler: Option<Resampler>,
    // Output time base.
    next_pts: Option<i64>,
}

struct Resampler {
    context: SwrContext,
    input: AudioParams,
}

impl AudioTransform {
    /**
        Create a transform producing frames in the `output` layout, which
        must be an audio layout.
    */
    pub fn new(output: Par) -> Result<Self> {
        if output.as_audio().is_none() {
            return Err(Error::invalid_parameters(format!(
                "audio transform needs an audio layout, got {}",
                output.kind()
            )));
        }
        Ok(Self {
            output,
            resampler: None,
            next_pts: None,
        })
    }

    fn target(&self) -> Result<&AudioParams> {
        self.output
            .as_audio()
            .ok_or_else(|| Error::invalid_parameters("audio transform lost its layout"))
    }

    fn resampler_for(&mut self, input: &AudioParams) -> Result<&mut SwrContext> {
        if !self.resampler.as_ref().is_some_and(|r| r.input == *input) {
            let target = self.target()?;
            let context = SwrContext::get(
                sample_format_to_ffmpeg(input.sample_format)?,
                channel_layout_to_ffmpeg(input.channel_layout),
                input.sample_rate,
                sample_format_to_ffmpeg(target.sample_format)?,
                channel_layout_to_ffmpeg(target.channel_layout),
                target.sample_rate,
            )
            .map_err(|e| Error::codec(format!("cannot build resampler: {e}")))?;

            tracing::debug!(
                from = ?input.sample_format,
                to = ?target.sample_format,
                from_rate = input.sample_rate,
                to_rate = target.sample_rate,
                "initialised resampler"
            );

            self.resampler = Some(Resampler {
                context,
                input: input.clone(),
            });
        }

        self.resampler
            .as_mut()
            .map(|r| &mut r.context)
            .ok_or_else(|| Error::codec("resampler unavailable"))
    }

    /**
        An empty swresample frame in the target layout with room for
        `samples` samples per channel.
    */
    fn output_frame(&self, samples: usize) -> Result<AvAudioFrame> {
        let target = self.target()?;
        let mut frame = AvAudioFrame::new(
            sample_format_to_ffmpeg(target.sample_format)?,
            samples,
            channel_layout_to_ffmpeg(target.channel_layout),
        );
        frame.set_rate(target.sample_rate);
        Ok(frame)
    }

    fn rescale_pts(&self, frame: &Frame) -> Option<i64> {
        let pts = frame.pts()?;
        let to = self.output.time_base;
        let from = frame.par().time_base;
        if !to.is_valid() || !from.is_valid() {
            return Some(pts.0);
        }
        let scaled =
            i128::from(pts.0) * i128::from(from.num) * i128::from(to.den)
                / (i128::from(from.den) * i128::from(to.num));
        Some(scaled as i64)
    }

    fn emit(&mut self, converted: &AvAudioFrame, pts: Option<i64>) -> Result<Option<Frame>> {
        let samples = converted.samples();
        if samples == 0 {
            return Ok(None);
        }
        let frame = audio_from_ffmpeg(converted, self.output.clone())?;

        let pts = pts.or(self.next_pts);
        let time_base = self.output.time_base;
        let rate = i64::from(self.target()?.sample_rate);
        self.next_pts = pts.map(|p| {
            if time_base.is_valid() && rate > 0 {
                p + samples as i64 * i64::from(time_base.den) / (rate * i64::from(time_base.num))
            } else {
                p
            }
        });

        Ok(Some(frame.with_pts(pts.map(Pts))))
    }
}

impl Converter for AudioTransform {
    fn output(&self) -> &Par {
        &self.output
    }

    fn convert(&mut self, frame: &Frame) -> Result<Option<Frame>> {
        let input = frame
            .par()
            .as_audio()
            .ok_or_else(|| Error::invalid_data(format!("expected audio frame, got {}", frame.kind())))?
            .clone();
        if frame.samples() == 0 {
            return Err(Error::invalid_data("audio frame has no samples"));
        }
        if input.sample_rate == 0 {
            return Err(Error::invalid_data("audio frame has a zero sample rate"));
        }

        let source = audio_to_ffmpeg(frame)?;
        let out_rate = self.target()?.sample_rate;
        // Rate changes can release slightly more than the proportional count.
        let capacity = if input.sample_rate == out_rate {
            frame.samples()
        } else {
            (frame.samples() as u64 * u64::from(out_rate) / u64::from(input.sample_rate)) as usize
                + 64
        };
        let mut converted = self.output_frame(capacity)?;
        let pts = self.rescale_pts(frame);

        self.resampler_for(&input)?
            .run(&source, &mut converted)
            .map_err(|e| Error::codec(format!("swresample failed: {e}")))?;

        self.emit(&converted, pts)
    }

    fn flush(&mut self) -> Result<Option<Frame>> {
        let buffered = match &self.resampler {
            Some(resampler) => resampler.context.delay().map_or(0, |d| d.output as usize),
            None => return Ok(None),
        };
        if buffered == 0 {
            return Ok(None);
        }

        let mut tail = self.output_frame(buffered)?;
        if let Some(resampler) = self.resampler.as_mut() {
            if let Err(e) = resampler.context.flush(&mut tail) {
                if tail.samples() == 0 {
                    return Ok(None);
                }
                return Err(codec_error(e));
            }
        }

        self.emit(&tail, None)
    }
}

// SAFETY: the swresample context is owned by this transform alone and only
// touched through &mut self.
unsafe impl Send for AudioTransform {}

impl std::fmt::Debug for AudioTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioTransform")
            .field("output", &self.output.as_audio())
            .field("resampler_ready", &self.resampler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::{ChannelLayout, Rational, SampleFormat};

    fn stereo(sample_format: SampleFormat, rate: u32) -> Par {
        Par::audio(
            AudioParams::new(sample_format, ChannelLayout::Stereo, rate),
            Rational::new(1, 48000),
        )
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let mut transform = AudioTransform::new(stereo(SampleFormat::F32, 48000)).unwrap();
        let mut frame = Frame::new(stereo(SampleFormat::S16, 0));
        frame.alloc(64).unwrap();

        let err = transform.convert(&frame).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn video_layout_is_rejected() {
        let par = Par::video(
            media_types::VideoParams::new(media_types::PixelFormat::Yuv420p, 16, 16),
            Rational::new(1, 90000),
        );
        assert!(AudioTransform::new(par).is_err());
    }
}
