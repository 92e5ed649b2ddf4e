/*!
    FFmpeg-backed decoder factory.
*/

use std::collections::HashMap;

use media_source::{CodecConfig, FfmpegSource};
use media_types::{Error, MediaKind, Result, StreamInfo};

use crate::audio::AudioDecoder;
use crate::decoder::{Decoder, DecoderFactory};
use crate::video::VideoDecoder;

/**
    Builds libavcodec decoders for audio and video streams.

    Codec configurations registered per stream (usually taken from the
    [`FfmpegSource`] the packets come from) are used as-is. Streams without
    one get a configuration rebuilt from their native layout.
*/
#[derive(Clone, Debug, Default)]
pub struct FfmpegDecoders {
    configs: HashMap<usize, CodecConfig>,
}

impl FfmpegDecoders {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Register the demuxer's codec configuration for every stream of
        `source`.
    */
    pub fn from_source(source: &FfmpegSource) -> Self {
        let configs = source
            .codec_configs()
            .iter()
            .cloned()
            .enumerate()
            .collect();
        Self { configs }
    }

    /**
        Builder: use `config` for the stream at `stream_index`.
    */
    pub fn with_codec_config(mut self, stream_index: usize, config: CodecConfig) -> Self {
        self.configs.insert(stream_index, config);
        self
    }
}

impl DecoderFactory for FfmpegDecoders {
    fn make_decoder(&self, stream: &StreamInfo) -> Result<Box<dyn Decoder>> {
        let config = match self.configs.get(&stream.index) {
            Some(config) => config.clone(),
            None => CodecConfig::from_par(&stream.par)?,
        };

        match stream.kind() {
            MediaKind::Audio => Ok(Box::new(AudioDecoder::new(config, stream.par.clone())?)),
            MediaKind::Video => Ok(Box::new(VideoDecoder::new(config, stream.par.clone())?)),
            kind => Err(Error::unsupported_format(format!(
                "{kind} streams are not decoded"
            ))),
        }
    }
}
