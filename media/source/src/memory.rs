/*!
    In-memory source replaying a fixed list of packets.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use media_types::{Error, Packet, Result, StreamInfo};

use crate::Source;

/**
    Counters shared between a [`MemorySource`] and whoever created it.

    The reader takes ownership of its source, so this handle is how callers
    observe what happened to it afterwards.
*/
#[derive(Clone, Debug, Default)]
pub struct SourceActivity {
    reads: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    seeks: Arc<Mutex<Vec<(usize, i64)>>>,
}

impl SourceActivity {
    /**
        Number of `read_packet` calls, including the one that hit the end.
    */
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /**
        Number of times native resources were released (0 or 1).
    */
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /**
        Every `(stream_index, timestamp)` passed to `seek`, in call order.
    */
    pub fn seeks(&self) -> Vec<(usize, i64)> {
        self.seeks.lock().clone()
    }
}

/**
    A source backed by packets held in memory.

    Useful for replaying captured packets and for driving the reader
    without a container on disk. A read failure can be scheduled at a
    packet position to exercise error paths.
*/
#[derive(Debug)]
pub struct MemorySource {
    streams: Vec<StreamInfo>,
    packets: Vec<Packet>,
    position: usize,
    fail_at: Option<(usize, String)>,
    closed: bool,
    activity: SourceActivity,
}

impl MemorySource {
    /**
        Create a source from streams and packets in container order.

        Every packet must reference one of the given streams.
    */
    pub fn new(streams: Vec<StreamInfo>, packets: Vec<Packet>) -> Result<Self> {
        for (position, stream) in streams.iter().enumerate() {
            if stream.index != position {
                return Err(Error::invalid_parameters(format!(
                    "stream at position {position} has index {}",
                    stream.index
                )));
            }
        }
        if let Some(packet) = packets.iter().find(|p| p.stream_index >= streams.len()) {
            return Err(Error::StreamNotFound(packet.stream_index));
        }

        Ok(Self {
            streams,
            packets,
            position: 0,
            fail_at: None,
            closed: false,
            activity: SourceActivity::default(),
        })
    }

    /**
        Builder: make the read of packet `position` fail with a codec error.
    */
    pub fn with_read_error(mut self, position: usize, message: impl Into<String>) -> Self {
        self.fail_at = Some((position, message.into()));
        self
    }

    /**
        Handle for observing reads, seeks and closes.
    */
    pub fn activity(&self) -> SourceActivity {
        self.activity.clone()
    }

    /**
        Index of the next packet to be read.
    */
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Source for MemorySource {
    fn streams(&self) -> &[StreamInfo] {
        if self.closed {
            return &[];
        }
        &self.streams
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.activity.reads.fetch_add(1, Ordering::SeqCst);

        if let Some((position, message)) = &self.fail_at {
            if *position == self.position {
                let message = message.clone();
                self.fail_at = None;
                return Err(Error::codec(message));
            }
        }

        let packet = self.packets.get(self.position).cloned();
        if packet.is_some() {
            self.position += 1;
        }
        Ok(packet)
    }

    /**
        Moves to the last keyframe of the stream at or before `timestamp`.

        Falls back to the last packet at or before `timestamp` when the
        stream has no keyframes there, and to the start when nothing
        qualifies.
    */
    fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        if stream_index >= self.streams.len() {
            return Err(Error::StreamNotFound(stream_index));
        }
        self.activity.seeks.lock().push((stream_index, timestamp));

        let candidates = || {
            self.packets.iter().enumerate().filter(|(_, p)| {
                p.stream_index == stream_index && p.pts.is_some_and(|pts| pts.0 <= timestamp)
            })
        };
        let keyframe = candidates().filter(|(_, p)| p.is_keyframe).last();
        let any = candidates().last();

        self.position = keyframe.or(any).map_or(0, |(position, _)| position);
        tracing::trace!(stream = stream_index, timestamp, position = self.position, "memory source seek");
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.packets.clear();
        self.activity.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
