/*!
    Shared types for the media reader crates.

    This crate defines the vocabulary of the workspace: the types that cross
    crate boundaries. It has no dependency on FFmpeg, so sources, decoders
    and converters can be implemented and tested without native libraries.
*/

mod error;
mod flow;
mod format;
mod frame;
mod packet;
mod par;
mod stream;
mod time;

pub use error::{Error, Result};
pub use flow::{Flow, SeekTarget};
pub use format::{ChannelLayout, CodecId, MediaKind, PixelFormat, SampleFormat};
pub use frame::{Frame, Plane};
pub use packet::Packet;
pub use par::{AudioParams, CodecParams, Par, Params, VideoParams, matches_format};
pub use stream::{MediaInfo, StreamInfo};
pub use time::{MediaDuration, Pts, Rational};

pub use bytes::Bytes;
