/*!
    Bounded queues for handing packets and frames to another thread.

    A reader runs on one thread and lends each packet or frame to its
    callback. To consume them elsewhere, clone them into a
    [`HandoffQueue`]; [`forward_packets`] and [`forward_frames`] do that
    for a whole call.
*/

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};
use tokio_util::sync::CancellationToken;

use media_types::{Flow, Frame, Packet, Par, Result};

use crate::Reader;

struct QueueInner<T> {
    items: VecDeque<T>,
    capacity: usize,
    closed: bool,
}

/**
    A bounded blocking queue that can be closed from either side.

    `push` blocks while the queue is full and `pop` blocks while it is
    empty. Closing wakes both sides: pushes fail from then on, pops drain
    what is left and then return `None`.
*/
pub struct HandoffQueue<T> {
    inner: Mutex<QueueInner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

/// Packets handed off by [`forward_packets`].
pub type PacketQueue = HandoffQueue<Packet>;

/// Frames handed off by [`forward_frames`], tagged with their stream index.
pub type FrameQueue = HandoffQueue<(usize, Frame)>;

impl<T> HandoffQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::with_capacity(capacity),
                capacity,
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /**
        Add an item, waiting for room. Returns false if the queue is closed.
    */
    pub fn push(&self, item: T) -> bool {
        let mut inner = self.inner.lock();

        while inner.items.len() >= inner.capacity && !inner.closed {
            self.not_full.wait(&mut inner);
        }

        if inner.closed {
            return false;
        }

        inner.items.push_back(item);
        self.not_empty.notify_one();
        true
    }

    /**
        Take the oldest item, waiting for one. Returns `None` once the queue
        is closed and empty.
    */
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();

        while inner.items.is_empty() && !inner.closed {
            self.not_empty.wait(&mut inner);
        }

        let item = inner.items.pop_front();

        if item.is_some() {
            self.not_full.notify_one();
        }

        item
    }

    pub fn try_pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        let item = inner.items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }
}

/**
    Run [`Reader::decode`] and push a clone of every packet into `queue`.

    Stops early when the consumer closes the queue. The queue is closed
    when the call returns, whatever the outcome.
*/
pub fn forward_packets(
    reader: &mut Reader,
    cancel: &CancellationToken,
    queue: &PacketQueue,
) -> Result<()> {
    let result = reader.decode(cancel, |_, packet| {
        if queue.push(packet.clone()) {
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Stop)
        }
    });
    queue.close();
    result
}

/**
    Run [`Reader::demux`] and push a clone of every frame into `queue`.

    Stops early when the consumer closes the queue. The queue is closed
    when the call returns, whatever the outcome.
*/
pub fn forward_frames<M>(
    reader: &mut Reader,
    cancel: &CancellationToken,
    map: M,
    queue: &FrameQueue,
) -> Result<()>
where
    M: FnMut(usize, &Par) -> Result<Option<Par>>,
{
    let result = reader.demux(cancel, map, |stream_index, frame| {
        if queue.push((stream_index, frame.clone())) {
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Stop)
        }
    });
    queue.close();
    result
}
