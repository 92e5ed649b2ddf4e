/*!
    Per-stream decoding units.
*/

use media_transform::{Converter, ConverterFactory};
use media_types::{Error, Flow, Frame, Packet, Par, Result, StreamInfo};

use crate::decoder::{Decoder, DecoderFactory, Drain, Submit};

/**
    Decoder and optional converter for one stream.

    A unit turns packets into frames in the layout requested for its
    stream. It owns a converter only when that layout differs from the
    stream's native one, or when conversion is forced.

    Feeding `None` flushes the unit: the decoder releases every buffered
    frame, then the converter releases any buffered output. A flushed unit
    ignores further input.

    Decoder and converter errors come back as [`Error::Stream`] naming the
    stream. Errors returned by the sink pass through unchanged.
*/
pub struct DecodingUnit {
    stream_index: usize,
    // Field order is drop order: the decoder is released before the converter.
    decoder: Box<dyn Decoder>,
    converter: Option<Box<dyn Converter>>,
    output: Par,
    drained: bool,
    frames: u64,
}

impl DecodingUnit {
    /**
        Build the unit for `stream`, producing frames in the `desired` layout.

        Fails with [`Error::Setup`] if the layouts are of different media
        kinds or if a decoder or converter cannot be built.
    */
    pub fn new(
        stream: &StreamInfo,
        desired: Par,
        decoders: &dyn DecoderFactory,
        converters: &dyn ConverterFactory,
        force_conversion: bool,
    ) -> Result<Self> {
        let stream_index = stream.index;
        let native = &stream.par;

        if native.kind() != desired.kind() {
            return Err(Error::setup(
                stream_index,
                Error::invalid_parameters(format!(
                    "{} stream cannot produce {} frames",
                    native.kind(),
                    desired.kind()
                )),
            ));
        }
        if !native.kind().is_decodable() {
            return Err(Error::setup(
                stream_index,
                Error::unsupported_format(format!("{} streams are not decoded", native.kind())),
            ));
        }

        let decoder = decoders
            .make_decoder(stream)
            .map_err(|e| Error::setup(stream_index, e))?;

        let converter = if force_conversion || !native.matches_format(&desired) {
            let converter = converters
                .make_converter(native, &desired)
                .map_err(|e| Error::setup(stream_index, e))?;
            Some(converter)
        } else {
            None
        };

        tracing::debug!(
            stream = stream_index,
            kind = %native.kind(),
            convert = converter.is_some(),
            forced = force_conversion,
            "created decoding unit"
        );

        Ok(Self {
            stream_index,
            decoder,
            converter,
            output: desired,
            drained: false,
            frames: 0,
        })
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /**
        The layout of frames handed to the sink.
    */
    pub fn output(&self) -> &Par {
        &self.output
    }

    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }

    /**
        Returns true once a flush has released every buffered frame.
    */
    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /**
        Number of frames handed to the sink so far.
    */
    pub fn frames_delivered(&self) -> u64 {
        self.frames
    }

    /**
        Decode one packet, or flush with `None`, handing each resulting
        frame to `sink`.

        Returns the first non-[`Flow::Continue`] flow from the sink, which
        stops draining; frames still buffered stay in the decoder.
    */
    pub fn feed<F>(&mut self, packet: Option<&Packet>, sink: &mut F) -> Result<Flow>
    where
        F: FnMut(&Frame) -> Result<Flow>,
    {
        if self.drained {
            return Ok(Flow::Continue);
        }
        let flushing = packet.is_none();

        if self.submit(packet)? == Submit::Full {
            let flow = self.drain(sink, flushing)?;
            if !flow.is_continue() {
                return Ok(flow);
            }
            if self.submit(packet)? == Submit::Full {
                return Err(Error::in_stream(
                    self.stream_index,
                    Error::codec("decoder refused input after draining"),
                ));
            }
        }

        let flow = self.drain(sink, flushing)?;
        if !flow.is_continue() || !flushing {
            return Ok(flow);
        }

        self.drained = true;
        self.flush_converter(sink)
    }

    fn submit(&mut self, packet: Option<&Packet>) -> Result<Submit> {
        self.decoder
            .submit(packet)
            .map_err(|e| Error::in_stream(self.stream_index, e))
    }

    /**
        Pull frames until the decoder wants input or ends.

        While flushing, a decoder asking for more input has nothing left.
    */
    fn drain<F>(&mut self, sink: &mut F, flushing: bool) -> Result<Flow>
    where
        F: FnMut(&Frame) -> Result<Flow>,
    {
        loop {
            let drained = self
                .decoder
                .drain()
                .map_err(|e| Error::in_stream(self.stream_index, e))?;

            match drained {
                Drain::Frame(frame) => {
                    let flow = self.deliver(&frame, sink)?;
                    if !flow.is_continue() {
                        return Ok(flow);
                    }
                }
                Drain::NeedMoreInput if !flushing => return Ok(Flow::Continue),
                Drain::NeedMoreInput | Drain::EndOfStream => {
                    if !flushing {
                        tracing::trace!(stream = self.stream_index, "decoder ended early");
                    }
                    return Ok(Flow::Continue);
                }
            }
        }
    }

    fn deliver<F>(&mut self, frame: &Frame, sink: &mut F) -> Result<Flow>
    where
        F: FnMut(&Frame) -> Result<Flow>,
    {
        match self.converter.as_mut() {
            None => {
                self.frames += 1;
                sink(frame)
            }
            Some(converter) => {
                let converted = converter
                    .convert(frame)
                    .map_err(|e| Error::in_stream(self.stream_index, e))?;
                match converted {
                    Some(converted) => {
                        self.frames += 1;
                        sink(&converted)
                    }
                    None => Ok(Flow::Continue),
                }
            }
        }
    }

    fn flush_converter<F>(&mut self, sink: &mut F) -> Result<Flow>
    where
        F: FnMut(&Frame) -> Result<Flow>,
    {
        let buffered = match self.converter.as_mut() {
            Some(converter) => converter
                .flush()
                .map_err(|e| Error::in_stream(self.stream_index, e))?,
            None => None,
        };

        tracing::debug!(
            stream = self.stream_index,
            frames = self.frames,
            converter_tail = buffered.is_some(),
            "flushed decoding unit"
        );

        match buffered {
            Some(frame) => {
                self.frames += 1;
                sink(&frame)
            }
            None => Ok(Flow::Continue),
        }
    }
}

impl std::fmt::Debug for DecodingUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodingUnit")
            .field("stream_index", &self.stream_index)
            .field("converter", &self.converter.is_some())
            .field("drained", &self.drained)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
