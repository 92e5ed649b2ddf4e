/*!
    Copy-only converters.
*/

use media_types::{Error, Frame, Par, Result};

use crate::converter::{Converter, ConverterFactory};

/**
    Factory for converters that copy frames without changing their layout.

    Only builds converters whose native and desired layouts already match;
    any real format change is rejected with
    [`Error::UnsupportedFormat`]. Useful when conversion is forced for
    frames that must be detached from the decoder's buffers.
*/
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityConverters;

impl ConverterFactory for IdentityConverters {
    fn make_converter(&self, native: &Par, desired: &Par) -> Result<Box<dyn Converter>> {
        if !native.matches_format(desired) {
            return Err(Error::unsupported_format(format!(
                "identity converter cannot turn {} into {}",
                describe(native),
                describe(desired)
            )));
        }
        Ok(Box::new(IdentityConverter::new(native.clone())))
    }
}

/**
    Deep-copies each frame, preserving timestamps and sample counts.
*/
#[derive(Debug)]
pub struct IdentityConverter {
    output: Par,
}

impl IdentityConverter {
    pub fn new(output: Par) -> Self {
        Self { output }
    }
}

impl Converter for IdentityConverter {
    fn output(&self) -> &Par {
        &self.output
    }

    fn convert(&mut self, frame: &Frame) -> Result<Option<Frame>> {
        if !frame.is_allocated() {
            return Err(Error::NotAllocated);
        }
        if !frame.par().matches_format(&self.output) {
            return Err(Error::invalid_data(format!(
                "frame layout {} does not match converter layout {}",
                describe(frame.par()),
                describe(&self.output)
            )));
        }
        Ok(Some(frame.clone()))
    }
}

fn describe(par: &Par) -> String {
    if let Some(audio) = par.as_audio() {
        format!(
            "{:?}/{:?}/{}Hz",
            audio.sample_format, audio.channel_layout, audio.sample_rate
        )
    } else if let Some(video) = par.as_video() {
        format!("{:?} {}x{}", video.pixel_format, video.width, video.height)
    } else {
        par.kind().to_string()
    }
}
