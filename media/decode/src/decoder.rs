/*!
    The decoder abstraction used by decoding units.
*/

use media_types::{Frame, Packet, Result, StreamInfo};

/**
    Outcome of handing a packet to a decoder.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submit {
    /// The packet (or end-of-stream marker) was taken.
    Accepted,
    /// The decoder's input queue is full; drain frames, then submit again.
    Full,
}

/**
    Outcome of asking a decoder for its next frame.
*/
#[derive(Debug)]
pub enum Drain {
    Frame(Frame),
    /// No frame is ready until more input is submitted.
    NeedMoreInput,
    /// The decoder was flushed and has no frames left.
    EndOfStream,
}

/**
    A send/receive decoder for one stream.

    Decoders may buffer and reorder: one packet can yield zero or more
    frames, and frames still held when the input ends are only released
    after the end-of-stream marker is submitted.
*/
pub trait Decoder: Send {
    /**
        Submit the next packet, or `None` to mark the end of the stream.
    */
    fn submit(&mut self, packet: Option<&Packet>) -> Result<Submit>;

    /**
        Take the next decoded frame, if any.
    */
    fn drain(&mut self) -> Result<Drain>;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn submit(&mut self, packet: Option<&Packet>) -> Result<Submit> {
        (**self).submit(packet)
    }

    fn drain(&mut self) -> Result<Drain> {
        (**self).drain()
    }
}

/**
    Builds a decoder for a stream's native layout.
*/
pub trait DecoderFactory: Send {
    fn make_decoder(&self, stream: &StreamInfo) -> Result<Box<dyn Decoder>>;
}

impl<F: DecoderFactory + ?Sized> DecoderFactory for Box<F> {
    fn make_decoder(&self, stream: &StreamInfo) -> Result<Box<dyn Decoder>> {
        (**self).make_decoder(stream)
    }
}
