mod common;

use std::sync::Arc;
use std::thread;

use common::{CountingConverters, FakeDecoders, av_source, init_tracing};
use media_reader::{
    CancellationToken, FrameQueue, PacketQueue, Reader, forward_frames, forward_packets,
    native_format,
};

#[test]
fn packets_reach_consumer_thread_in_order() {
    init_tracing();
    let queue = Arc::new(PacketQueue::new(2));
    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut seen = Vec::new();
            while let Some(packet) = queue.pop() {
                seen.push((packet.stream_index, packet.pts.map(|p| p.0)));
            }
            seen
        })
    };

    let mut reader = Reader::new(av_source(6), FakeDecoders::default(), CountingConverters::default());
    forward_packets(&mut reader, &CancellationToken::new(), &queue).unwrap();
    assert!(queue.is_closed());

    let seen = consumer.join().unwrap();
    let expected: Vec<_> = (0..6i64)
        .flat_map(|i| [(0, Some(i * 3000)), (1, Some(i * 1024))])
        .collect();
    assert_eq!(seen, expected);
}

#[test]
fn frames_reach_consumer_thread() {
    let queue = Arc::new(FrameQueue::new(4));
    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut per_stream = [0usize; 2];
            while let Some((stream, frame)) = queue.pop() {
                assert!(frame.is_allocated());
                per_stream[stream] += 1;
            }
            per_stream
        })
    };

    let mut reader = Reader::new(av_source(5), FakeDecoders::with_delay(2), CountingConverters::default());
    forward_frames(&mut reader, &CancellationToken::new(), native_format, &queue).unwrap();

    assert_eq!(consumer.join().unwrap(), [5, 5]);
}

#[test]
fn consumer_closing_queue_stops_reader() {
    let source = av_source(50);
    let activity = source.activity();
    let queue = Arc::new(PacketQueue::new(1));
    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for _ in 0..3 {
                queue.pop();
            }
            queue.close();
        })
    };

    let mut reader = Reader::new(source, FakeDecoders::default(), CountingConverters::default());
    forward_packets(&mut reader, &CancellationToken::new(), &queue).unwrap();
    consumer.join().unwrap();

    assert!(activity.reads() < 100);
    assert!(!reader.is_closed());
}

#[test]
fn queue_is_closed_after_failure() {
    let queue = PacketQueue::new(8);
    let mut reader = Reader::new(
        av_source(2).with_read_error(1, "bad sector"),
        FakeDecoders::default(),
        CountingConverters::default(),
    );
    assert!(forward_packets(&mut reader, &CancellationToken::new(), &queue).is_err());
    assert!(queue.is_closed());
    assert_eq!(queue.len(), 1);
}
