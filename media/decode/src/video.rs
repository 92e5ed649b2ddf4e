/*!
    libavcodec video decoding.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as AvVideoDecoder},
    util::frame::video::Video as AvVideoFrame,
};

use media_source::CodecConfig;
use media_source::convert::{codec_error, pixel_format_from_ffmpeg, rational_from_ffmpeg};
use media_transform::frame_copy::video_from_ffmpeg;
use media_types::{Error, Packet, Par, Pts, Result, VideoParams};

use crate::decoder::{Decoder, Drain, Submit};
use crate::packet::{Receive, packet_to_ffmpeg, receive_status, submit_status};

/**
    Decodes one video stream. With B-frames the codec holds frames back:
    a packet may yield nothing, and the last frames only come out after
    end-of-stream is submitted.
*/
pub struct VideoDecoder {
    decoder: AvVideoDecoder,
    /// Native layout of the stream, for time base and frame rate.
    native: Par,
    decoded: AvVideoFrame,
}

impl VideoDecoder {
    /**
        Open a decoder for a stream described by `codec_config`, whose
        native layout is `native`.

        Fails with [`Error::UnsupportedCodec`] when this FFmpeg build has no
        decoder for the codec.
    */
    pub fn new(codec_config: CodecConfig, native: Par) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let context = codec::context::Context::from_parameters(codec_config.into_parameters())
            .map_err(codec_error)?;

        let decoder = context.decoder().video().map_err(|e| match e {
            ffmpeg_next::Error::DecoderNotFound => {
                Error::unsupported_codec(format!("no video decoder for {:?}", native.codec.id))
            }
            other => codec_error(other),
        })?;

        Ok(Self {
            decoder,
            native,
            decoded: AvVideoFrame::empty(),
        })
    }

    /**
        Describe the layout of the frame just received.
    */
    fn frame_par(&self) -> Result<Par> {
        let width = self.decoded.width();
        let height = self.decoded.height();
        if width == 0 || height == 0 {
            return Err(Error::invalid_data("frame has zero dimensions"));
        }

        let av_format = self.decoded.format();
        let pixel_format = pixel_format_from_ffmpeg(av_format).ok_or_else(|| {
            Error::unsupported_format(format!("unsupported pixel format: {:?}", av_format))
        })?;

        let mut params = VideoParams::new(pixel_format, width, height);
        let aspect = rational_from_ffmpeg(self.decoded.aspect_ratio());
        if aspect.is_valid() {
            params.sample_aspect_ratio = aspect;
        }
        params.frame_rate = self.native.as_video().and_then(|v| v.frame_rate);

        Ok(Par::video(params, self.native.time_base))
    }
}

impl Decoder for VideoDecoder {
    fn submit(&mut self, packet: Option<&Packet>) -> Result<Submit> {
        match packet {
            Some(packet) => submit_status(self.decoder.send_packet(&packet_to_ffmpeg(packet))),
            None => submit_status(self.decoder.send_eof()),
        }
    }

    fn drain(&mut self) -> Result<Drain> {
        match receive_status(self.decoder.receive_frame(&mut self.decoded))? {
            Receive::Frame => {
                let par = self.frame_par()?;
                let pts = self.decoded.timestamp().or(self.decoded.pts());
                let frame = video_from_ffmpeg(&self.decoded, par)?.with_pts(pts.map(Pts));
                Ok(Drain::Frame(frame))
            }
            Receive::NeedMoreInput => Ok(Drain::NeedMoreInput),
            Receive::EndOfStream => Ok(Drain::EndOfStream),
        }
    }
}

// SAFETY: the codec context is owned exclusively by this decoder and only
// used through &mut self.
unsafe impl Send for VideoDecoder {}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("time_base", &self.native.time_base)
            .field("width", &self.decoder.width())
            .field("height", &self.decoder.height())
            .finish_non_exhaustive()
    }
}
