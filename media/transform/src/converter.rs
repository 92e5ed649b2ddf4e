/*!
    The converter abstraction used by decoding units.
*/

use media_types::{Frame, Par, Result};

/**
    Converts decoded frames from one layout to another.

    Converters may be stateful: audio resampling buffers samples across
    calls, so frames must be passed in order and [`Converter::flush`]
    called once the input is exhausted.
*/
pub trait Converter: Send {
    /**
        The layout produced by this converter.
    */
    fn output(&self) -> &Par;

    /**
        Convert one frame.

        Returns `Ok(None)` when the converter buffered the input without
        producing output yet.
    */
    fn convert(&mut self, frame: &Frame) -> Result<Option<Frame>>;

    /**
        Emit any buffered output after the last input frame.
    */
    fn flush(&mut self) -> Result<Option<Frame>> {
        Ok(None)
    }
}

impl<C: Converter + ?Sized> Converter for Box<C> {
    fn output(&self) -> &Par {
        (**self).output()
    }

    fn convert(&mut self, frame: &Frame) -> Result<Option<Frame>> {
        (**self).convert(frame)
    }

    fn flush(&mut self) -> Result<Option<Frame>> {
        (**self).flush()
    }
}

/**
    Builds converters between two layouts of the same media kind.
*/
pub trait ConverterFactory: Send {
    fn make_converter(&self, native: &Par, desired: &Par) -> Result<Box<dyn Converter>>;
}

impl<F: ConverterFactory + ?Sized> ConverterFactory for Box<F> {
    fn make_converter(&self, native: &Par, desired: &Par) -> Result<Box<dyn Converter>> {
        (**self).make_converter(native, desired)
    }
}
