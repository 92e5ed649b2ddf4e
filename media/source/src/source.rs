/*!
    The source abstraction consumed by the reader.
*/

use media_types::{Packet, Result, StreamInfo};

/**
    An opened, readable media container.

    A source yields compressed packets in container order, interleaved
    across streams. The stream list is fixed once the source is open.

    Implementations must make [`Source::close`] idempotent: the first call
    releases native resources, later calls do nothing. Reads and seeks after
    close return [`Error::Closed`](media_types::Error::Closed).
*/
pub trait Source: Send {
    /**
        Streams in this source, indexed by [`StreamInfo::index`].

        Returns an empty slice once the source is closed.
    */
    fn streams(&self) -> &[StreamInfo];

    /**
        Read the next packet.

        Returns `Ok(Some(packet))` for each packet, `Ok(None)` at end of
        source. May block on I/O.
    */
    fn read_packet(&mut self) -> Result<Option<Packet>>;

    /**
        Reposition the source so the next read returns packets at or before
        `timestamp`, expressed in the time base of `stream_index`.
    */
    fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<()>;

    /**
        Release the container. Safe to call more than once.
    */
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn streams(&self) -> &[StreamInfo] {
        (**self).streams()
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        (**self).read_packet()
    }

    fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<()> {
        (**self).seek(stream_index, timestamp)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}
