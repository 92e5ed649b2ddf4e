/*!
    Opaque codec configuration for passing to decoders.
*/

use ffmpeg_next::{codec, ffi};

use media_types::{Par, Params, Result};

use crate::convert::{
    codec_id_to_ffmpeg, pixel_format_to_ffmpeg, rational_to_ffmpeg, sample_format_to_ffmpeg,
};

/**
    Opaque codec configuration for one stream.

    Holds the FFmpeg codec parameters needed to open a decoder. Configs
    taken from an opened container carry everything the demuxer found;
    configs rebuilt with [`CodecConfig::from_par`] carry only what a
    [`Par`] describes.
*/
pub struct CodecConfig {
    parameters: codec::Parameters,
}

impl CodecConfig {
    pub(crate) fn new(parameters: codec::Parameters) -> Self {
        Self { parameters }
    }

    /**
        Rebuild codec parameters from a format descriptor.

        Used when a stream did not come from an FFmpeg container, e.g. when
        replaying captured packets.
    */
    pub fn from_par(par: &Par) -> Result<Self> {
        let id = codec_id_to_ffmpeg(par.codec.id)?;
        let mut parameters = codec::Parameters::new();

        // SAFETY: `parameters` owns a freshly allocated AVCodecParameters.
        // Extradata is allocated with av_mallocz so avcodec_parameters_free
        // can release it.
        unsafe {
            let ptr = parameters.as_mut_ptr();
            (*ptr).codec_id = id.into();

            match &par.params {
                Params::Audio(audio) => {
                    (*ptr).codec_type = ffi::AVMediaType::AVMEDIA_TYPE_AUDIO;
                    (*ptr).format =
                        ffi::AVSampleFormat::from(sample_format_to_ffmpeg(audio.sample_format)?)
                            as i32;
                    (*ptr).sample_rate = audio.sample_rate as i32;
                    (*ptr).frame_size = audio.frame_size as i32;
                    ffi::av_channel_layout_default(
                        &mut (*ptr).ch_layout,
                        i32::from(audio.channel_count()),
                    );
                }
                Params::Video(video) => {
                    (*ptr).codec_type = ffi::AVMediaType::AVMEDIA_TYPE_VIDEO;
                    (*ptr).format =
                        ffi::AVPixelFormat::from(pixel_format_to_ffmpeg(video.pixel_format)?)
                            as i32;
                    (*ptr).width = video.width as i32;
                    (*ptr).height = video.height as i32;
                    (*ptr).sample_aspect_ratio = rational_to_ffmpeg(video.sample_aspect_ratio).into();
                    if let Some(rate) = video.frame_rate {
                        (*ptr).framerate = rational_to_ffmpeg(rate).into();
                    }
                }
                Params::Subtitle => {
                    (*ptr).codec_type = ffi::AVMediaType::AVMEDIA_TYPE_SUBTITLE;
                }
                Params::Data => {
                    (*ptr).codec_type = ffi::AVMediaType::AVMEDIA_TYPE_DATA;
                }
            }

            if let Some(extradata) = par.codec.extradata.as_ref().filter(|e| !e.is_empty()) {
                let padded = extradata.len() + ffi::AV_INPUT_BUFFER_PADDING_SIZE as usize;
                let buffer = ffi::av_mallocz(padded) as *mut u8;
                if !buffer.is_null() {
                    std::ptr::copy_nonoverlapping(extradata.as_ptr(), buffer, extradata.len());
                    (*ptr).extradata = buffer;
                    (*ptr).extradata_size = extradata.len() as i32;
                }
            }
            if let Some(bit_rate) = par.codec.bit_rate {
                (*ptr).bit_rate = bit_rate as i64;
            }
            if let Some(profile) = par.codec.profile {
                (*ptr).profile = profile;
            }
            if let Some(level) = par.codec.level {
                (*ptr).level = level;
            }
        }

        Ok(Self { parameters })
    }

    pub fn parameters(&self) -> &codec::Parameters {
        &self.parameters
    }

    pub fn into_parameters(self) -> codec::Parameters {
        self.parameters
    }
}

impl Clone for CodecConfig {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
        }
    }
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("codec_id", &self.parameters.id())
            .field("medium", &self.parameters.medium())
            .finish_non_exhaustive()
    }
}

// SAFETY: the parameters are exclusively owned and only touched through
// &self/&mut self, so moving them to another thread is sound.
unsafe impl Send for CodecConfig {}
