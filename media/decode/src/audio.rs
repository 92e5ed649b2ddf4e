/*!
    libavcodec audio decoding.
*/

use ffmpeg_next::{
    codec::{self, decoder::Audio as AvAudioDecoder},
    util::frame::audio::Audio as AvAudioFrame,
};

use media_source::CodecConfig;
use media_source::convert::{codec_error, sample_format_from_ffmpeg};
use media_transform::frame_copy::audio_from_ffmpeg;
use media_types::{AudioParams, ChannelLayout, Error, Packet, Par, Pts, Result};

use crate::decoder::{Decoder, Drain, Submit};
use crate::packet::{Receive, packet_to_ffmpeg, receive_status, submit_status};

/**
    Decodes one audio stream into frames in the codec's own sample layout.
    Planar output stays planar; converting it is left to a converter.
*/
pub struct AudioDecoder {
    decoder: AvAudioDecoder,
    // Time base source for delivered frames.
    native: Par,
    decoded: AvAudioFrame,
}

impl AudioDecoder {
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

        let decoder = context.decoder().audio().map_err(|e| match e {
            ffmpeg_next::Error::DecoderNotFound => {
                Error::unsupported_codec(format!("no audio decoder for {:?}", native.codec.id))
            }
            other => codec_error(other),
        })?;

        Ok(Self {
            decoder,
            native,
            decoded: AvAudioFrame::empty(),
        })
    }

    /**
        Describe the layout of the frame just received.
    */
    fn frame_par(&self) -> Result<Par> {
        let av_format = self.decoded.format();
        let sample_format = sample_format_from_ffmpeg(av_format).ok_or_else(|| {
            Error::unsupported_format(format!("unsupported sample format: {:?}", av_format))
        })?;
        let channel_layout = ChannelLayout::from_count(self.decoded.channels() as u16);

        let params = AudioParams::new(sample_format, channel_layout, self.decoded.rate());
        Ok(Par::audio(params, self.native.time_base))
    }
}

impl Decoder for AudioDecoder {
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
                let frame = audio_from_ffmpeg(&self.decoded, par)?.with_pts(pts.map(Pts));
                Ok(Drain::Frame(frame))
            }
            Receive::NeedMoreInput => Ok(Drain::NeedMoreInput),
            Receive::EndOfStream => Ok(Drain::EndOfStream),
        }
    }
}

// SAFETY: the codec context is owned exclusively by this decoder and only
// used through &mut self.
unsafe impl Send for AudioDecoder {}

impl std::fmt::Debug for AudioDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDecoder")
            .field("time_base", &self.native.time_base)
            .field("sample_rate", &self.decoder.rate())
            .field("channels", &self.decoder.channels())
            .finish_non_exhaustive()
    }
}
