/*!
    Compressed packets.
*/

use bytes::Bytes;

use crate::{MediaDuration, Pts, Rational};

/**
    A compressed unit of data belonging to one stream.

    The payload is reference counted. Cloning a packet shares the payload
    instead of copying it, which is the re-reference step required before a
    packet leaves the callback it was lent to (for example to be queued for
    another thread).
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Index of the stream this packet belongs to.
    pub stream_index: usize,
    /// Compressed payload.
    pub data: Bytes,
    pub pts: Option<Pts>,
    pub dts: Option<Pts>,
    pub duration: MediaDuration,
    /// Time base of `pts`, `dts` and `duration`.
    pub time_base: Rational,
    pub is_keyframe: bool,
}

impl Packet {
    pub fn new(stream_index: usize, data: impl Into<Bytes>, time_base: Rational) -> Self {
        Self {
            stream_index,
            data: data.into(),
            pts: None,
            dts: None,
            duration: MediaDuration::default(),
            time_base,
            is_keyframe: false,
        }
    }

    /**
        Builder: set presentation and decode timestamps.
    */
    pub fn with_timestamps(mut self, pts: Option<Pts>, dts: Option<Pts>) -> Self {
        self.pts = pts;
        self.dts = dts;
        self
    }

    pub fn with_duration(mut self, duration: MediaDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_keyframe(mut self, is_keyframe: bool) -> Self {
        self.is_keyframe = is_keyframe;
        self
    }

    /**
        Payload size in bytes.
    */
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
