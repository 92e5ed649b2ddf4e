mod common;

use common::{
    CORRUPT, CountingConverters, FakeDecoders, audio_par, av_source, init_tracing, packet, source,
    video_par,
};
use media_reader::{
    CancellationToken, Error, ErrorPolicy, Flow, IdentityConverters, MediaKind, MemorySource, Par,
    Packet, PixelFormat, Rational, Reader, ReaderConfig, Result, Source, StreamFilter, StreamInfo,
    VideoParams, native_format,
};

fn small_video(par: &Par) -> Par {
    let mut params = VideoParams::new(PixelFormat::Yuv420p, 320, 240);
    params.frame_rate = par.as_video().and_then(|v| v.frame_rate);
    Par::video(params, par.time_base)
}

#[test]
fn native_map_builds_no_converter() {
    init_tracing();
    let converters = CountingConverters::default();
    let mut reader = Reader::new(av_source(5), FakeDecoders::default(), converters.clone());

    let mut frames = Vec::new();
    reader
        .demux_native(&CancellationToken::new(), |stream, frame| {
            frames.push((stream, frame.par().clone(), frame.pts().map(|p| p.0)));
            Ok(Flow::Continue)
        })
        .unwrap();

    assert_eq!(frames.len(), 10);
    assert_eq!(converters.built(), 0);
    assert_eq!(converters.calls(), 0);
    for (stream, par, _) in &frames {
        let native = if *stream == 0 { video_par(1920, 1080) } else { audio_par() };
        assert!(par.matches_format(&native));
    }
}

#[test]
fn forced_conversion_converts_every_frame() {
    let decoders = FakeDecoders::default();
    let converters = CountingConverters::default();
    let mut reader = Reader::new(av_source(5), decoders.clone(), converters.clone())
        .with_config(ReaderConfig::default().with_force_conversion(true));

    let mut delivered = 0;
    reader
        .demux_native(&CancellationToken::new(), |_, _| {
            delivered += 1;
            Ok(Flow::Continue)
        })
        .unwrap();

    assert_eq!(delivered, 10);
    assert_eq!(decoders.built(), 2);
    assert_eq!(converters.built(), 2);
    assert_eq!(converters.calls(), 10);
}

#[test]
fn downscales_video_and_keeps_audio_native() {
    let converters = CountingConverters::default();
    let mut reader = Reader::new(av_source(8), FakeDecoders::default(), converters.clone());

    let mut video = Vec::new();
    let mut audio = 0;
    reader
        .demux(
            &CancellationToken::new(),
            |_, par| {
                Ok(match par.kind() {
                    MediaKind::Video => Some(small_video(par)),
                    _ => native_format(0, par)?,
                })
            },
            |stream, frame| {
                match stream {
                    0 => video.push((frame.width(), frame.height(), frame.pts().map(|p| p.0))),
                    _ => {
                        assert!(frame.par().matches_format(&audio_par()));
                        audio += 1;
                    }
                }
                Ok(Flow::Continue)
            },
        )
        .unwrap();

    let expected: Vec<_> = (0..8i64).map(|i| (320, 240, Some(i * 3000))).collect();
    assert_eq!(video, expected);
    assert_eq!(audio, 8);
    assert_eq!(converters.built(), 1);
    assert_eq!(converters.calls(), 8);
}

#[test]
fn map_is_asked_once_per_stream() {
    let mut asked = Vec::new();
    let mut reader = Reader::new(av_source(6), FakeDecoders::default(), CountingConverters::default());
    reader
        .demux(
            &CancellationToken::new(),
            |index, par| {
                asked.push(index);
                native_format(index, par)
            },
            |_, _| Ok(Flow::Continue),
        )
        .unwrap();
    assert_eq!(asked, vec![0, 1]);
}

#[test]
fn stream_filter_skips_map_for_excluded_streams() {
    let mut asked = Vec::new();
    let mut streams = Vec::new();
    let mut reader = Reader::new(av_source(3), FakeDecoders::default(), CountingConverters::default())
        .with_config(
            ReaderConfig::default().with_stream_filter(StreamFilter::Kinds(vec![MediaKind::Video])),
        );
    reader
        .demux(
            &CancellationToken::new(),
            |index, par| {
                asked.push(index);
                native_format(index, par)
            },
            |stream, _| {
                streams.push(stream);
                Ok(Flow::Continue)
            },
        )
        .unwrap();
    assert_eq!(asked, vec![0]);
    assert_eq!(streams, vec![0; 3]);
}

#[test]
fn flush_releases_every_buffered_frame() {
    let mut reader = Reader::new(av_source(10), FakeDecoders::with_delay(3), CountingConverters::default());

    let mut per_stream = [0usize; 2];
    reader
        .demux_native(&CancellationToken::new(), |stream, _| {
            per_stream[stream] += 1;
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(per_stream, [10, 10]);
}

#[test]
fn flush_runs_in_stream_index_order() {
    // Every frame stays buffered until the end of the source.
    let mut reader = Reader::new(av_source(2), FakeDecoders::with_delay(5), CountingConverters::default());

    let mut order = Vec::new();
    reader
        .demux_native(&CancellationToken::new(), |stream, _| {
            order.push(stream);
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(order, vec![0, 0, 1, 1]);
}

#[test]
fn reordering_decoder_delivers_presentation_order() {
    let pts = [0, 6000, 3000, 12000, 9000];
    let packets: Vec<_> = pts.iter().map(|&p| (0, p)).collect();
    let source = source(vec![video_par(640, 480)], &packets);
    let mut reader = Reader::new(source, FakeDecoders::with_delay(2), CountingConverters::default());

    let mut seen = Vec::new();
    reader
        .demux_native(&CancellationToken::new(), |_, frame| {
            seen.push(frame.pts().map(|p| p.0));
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(
        seen,
        vec![Some(0), Some(3000), Some(6000), Some(9000), Some(12000)]
    );
}

#[test]
fn stop_after_k_frames() {
    let mut reader = Reader::new(av_source(10), FakeDecoders::default(), CountingConverters::default());
    let mut delivered = 0;
    let result = reader.demux_native(&CancellationToken::new(), |_, _| {
        delivered += 1;
        if delivered == 7 {
            Ok(Flow::Stop)
        } else {
            Ok(Flow::Continue)
        }
    });
    assert!(result.is_ok());
    assert_eq!(delivered, 7);
}

#[test]
fn cancel_before_first_read() {
    let source = av_source(4);
    let activity = source.activity();
    let decoders = FakeDecoders::default();
    let mut reader = Reader::new(source, decoders.clone(), CountingConverters::default());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut delivered = 0;
    let err = reader
        .demux_native(&cancel, |_, _| {
            delivered += 1;
            Ok(Flow::Continue)
        })
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(delivered, 0);
    assert_eq!(activity.reads(), 0);
    assert_eq!(decoders.built(), 0);
}

#[test]
fn cancel_after_n_frames() {
    let mut reader = Reader::new(av_source(10), FakeDecoders::default(), CountingConverters::default());
    let cancel = CancellationToken::new();

    let mut delivered = 0;
    let err = reader
        .demux_native(&cancel, |_, _| {
            delivered += 1;
            if delivered == 5 {
                cancel.cancel();
            }
            Ok(Flow::Continue)
        })
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(delivered <= 5);
}

#[test]
fn ignoring_every_stream_fails_before_source_ends() {
    let source = av_source(10);
    let activity = source.activity();
    let decoders = FakeDecoders::default();
    let mut reader = Reader::new(source, decoders.clone(), CountingConverters::default());

    let err = reader
        .demux(&CancellationToken::new(), |_, _| Ok(None), |_, _| Ok(Flow::Continue))
        .unwrap_err();

    assert!(matches!(err, Error::NoStreams));
    // One packet per stream was enough to decide.
    assert_eq!(activity.reads(), 2);
    assert_eq!(decoders.built(), 0);
}

#[test]
fn no_decodable_stream_fails_at_end_of_source() {
    // The audio stream never shows a packet, so it is never decided.
    let source = source(vec![video_par(640, 480), audio_par()], &[(0, 0), (0, 3000), (0, 6000)]);
    let activity = source.activity();
    let mut reader = Reader::new(source, FakeDecoders::default(), CountingConverters::default());

    let err = reader
        .demux(
            &CancellationToken::new(),
            |_, par| Ok((par.kind() == MediaKind::Audio).then(|| par.clone())),
            |_, _| Ok(Flow::Continue),
        )
        .unwrap_err();

    assert!(matches!(err, Error::NoStreams));
    assert_eq!(activity.reads(), 4);
}

#[test]
fn subtitle_only_source_has_nothing_to_decode() {
    let source = source(
        vec![Par::subtitle(media_reader::Rational::new(1, 1000))],
        &[(0, 0), (0, 1000), (0, 2000)],
    );
    let mut reader = Reader::new(source, FakeDecoders::default(), CountingConverters::default());
    let err = reader
        .demux_native(&CancellationToken::new(), |_, _| Ok(Flow::Continue))
        .unwrap_err();
    assert!(matches!(err, Error::NoStreams));
}

#[test]
fn kind_mismatch_fails_setup_before_delivery() {
    let mut reader = Reader::new(av_source(3), FakeDecoders::default(), CountingConverters::default());
    let mut delivered = 0;
    let err = reader
        .demux(
            &CancellationToken::new(),
            |_, par| {
                Ok(Some(match par.kind() {
                    MediaKind::Video => audio_par(),
                    _ => par.clone(),
                }))
            },
            |_, _| {
                delivered += 1;
                Ok(Flow::Continue)
            },
        )
        .unwrap_err();

    assert!(err.is_setup());
    assert_eq!(err.stream_index(), Some(0));
    assert_eq!(delivered, 0);
}

#[test]
fn map_error_aborts() {
    let mut reader = Reader::new(av_source(3), FakeDecoders::default(), CountingConverters::default());
    let err = reader
        .demux(
            &CancellationToken::new(),
            |_, _| Err(Error::callback("no layout for you")),
            |_, _| Ok(Flow::Continue),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Callback(_)));
}

fn corrupt_source() -> MemorySource {
    let stream = StreamInfo::new(0, video_par(640, 480));
    let packets = (0..5i64)
        .map(|i| {
            let data = if i == 2 { vec![CORRUPT; 8] } else { vec![0; 8] };
            packet(&stream, i * 3000, data)
        })
        .collect();
    MemorySource::new(vec![stream], packets).unwrap()
}

#[test]
fn corrupt_packet_aborts_by_default() {
    let mut reader = Reader::new(corrupt_source(), FakeDecoders::default(), CountingConverters::default());
    let mut delivered = 0;
    let err = reader
        .demux_native(&CancellationToken::new(), |_, _| {
            delivered += 1;
            Ok(Flow::Continue)
        })
        .unwrap_err();

    assert!(matches!(err, Error::Stream { stream_index: 0, .. }));
    assert_eq!(delivered, 2);
}

#[test]
fn corrupt_packet_is_skipped_under_skip_policy() {
    init_tracing();
    let mut reader = Reader::new(corrupt_source(), FakeDecoders::default(), CountingConverters::default())
        .with_config(ReaderConfig::default().with_error_policy(ErrorPolicy::Skip));

    let mut seen = Vec::new();
    reader
        .demux_native(&CancellationToken::new(), |_, frame| {
            seen.push(frame.pts().map(|p| p.0));
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(seen, vec![Some(0), Some(3000), Some(9000), Some(12000)]);
}

#[test]
fn source_error_aborts_even_under_skip_policy() {
    let source = av_source(4).with_read_error(3, "disk went away");
    let mut reader = Reader::new(source, FakeDecoders::default(), CountingConverters::default())
        .with_config(ReaderConfig::default().with_error_policy(ErrorPolicy::Skip));

    let err = reader
        .demux_native(&CancellationToken::new(), |_, _| Ok(Flow::Continue))
        .unwrap_err();
    assert!(matches!(err, Error::Codec(_)));
}

#[test]
fn callback_error_ends_call_under_skip_policy() {
    let mut reader = Reader::new(av_source(4), FakeDecoders::default(), CountingConverters::default())
        .with_config(ReaderConfig::default().with_error_policy(ErrorPolicy::Skip));

    let mut calls = 0;
    let err = reader
        .demux_native(&CancellationToken::new(), |stream, _| {
            calls += 1;
            Err(Error::in_stream(stream, Error::codec("consumer failed")))
        })
        .unwrap_err();
    assert!(matches!(err, Error::Stream { stream_index: 0, .. }));
    assert_eq!(calls, 1);
}

#[test]
fn callback_error_during_flush_ends_call_under_skip_policy() {
    let mut reader = Reader::new(av_source(2), FakeDecoders::with_delay(5), CountingConverters::default())
        .with_config(ReaderConfig::default().with_error_policy(ErrorPolicy::Skip));

    let mut calls = 0;
    let err = reader
        .demux_native(&CancellationToken::new(), |stream, _| {
            calls += 1;
            Err(Error::in_stream(stream, Error::codec("consumer failed")))
        })
        .unwrap_err();
    assert!(matches!(err, Error::Stream { stream_index: 0, .. }));
    assert_eq!(calls, 1);
}

/// Wraps a source and yields one packet for a stream it does not have.
struct StrayPacket {
    inner: MemorySource,
    stray: Option<Packet>,
}

impl Source for StrayPacket {
    fn streams(&self) -> &[StreamInfo] {
        self.inner.streams()
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        match self.stray.take() {
            Some(packet) => Ok(Some(packet)),
            None => self.inner.read_packet(),
        }
    }

    fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<()> {
        self.inner.seek(stream_index, timestamp)
    }

    fn close(&mut self) {
        self.inner.close()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

fn stray_source() -> StrayPacket {
    StrayPacket {
        inner: av_source(3),
        stray: Some(Packet::new(9, vec![0u8; 4], Rational::new(1, 1000))),
    }
}

#[test]
fn packet_for_unknown_stream_is_dropped() {
    let mut reader = Reader::new(stray_source(), FakeDecoders::default(), CountingConverters::default());
    let mut delivered = 0;
    reader
        .demux_native(&CancellationToken::new(), |_, _| {
            delivered += 1;
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(delivered, 6);

    let mut reader = Reader::new(stray_source(), FakeDecoders::default(), CountingConverters::default());
    let mut packets = 0;
    reader
        .decode(&CancellationToken::new(), |_, _| {
            packets += 1;
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(packets, 6);
}

#[test]
fn seek_from_frame_callback_keeps_units() {
    let source = av_source(10);
    let activity = source.activity();
    let decoders = FakeDecoders::default();
    let mut reader = Reader::new(source, decoders.clone(), CountingConverters::default());

    let mut delivered = 0;
    let mut seeked = false;
    reader
        .demux_native(&CancellationToken::new(), |stream, frame| {
            delivered += 1;
            if !seeked && stream == 0 && frame.pts().map(|p| p.0) == Some(6 * 3000) {
                seeked = true;
                return Ok(Flow::seek(0, 3000));
            }
            Ok(Flow::Continue)
        })
        .unwrap();

    assert_eq!(activity.seeks(), vec![(0, 3000)]);
    assert_eq!(decoders.built(), 2);
    // 13 packets before the seek, then everything from video packet 1 on.
    assert_eq!(delivered, 13 + 18);
}

#[test]
fn seek_during_flush_applies_to_next_call() {
    let source = av_source(2);
    let activity = source.activity();
    let mut reader = Reader::new(source, FakeDecoders::with_delay(5), CountingConverters::default());

    let mut delivered = 0;
    reader
        .demux_native(&CancellationToken::new(), |_, _| {
            delivered += 1;
            Ok(Flow::seek(0, 0))
        })
        .unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(activity.seeks(), vec![(0, 0)]);

    let mut again = 0;
    reader
        .demux_native(&CancellationToken::new(), |_, _| {
            again += 1;
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(again, 4);
}

#[test]
fn units_are_rebuilt_per_call() {
    let decoders = FakeDecoders::default();
    let mut reader = Reader::new(av_source(4), decoders.clone(), CountingConverters::default());

    reader
        .demux_native(&CancellationToken::new(), |_, _| Ok(Flow::Stop))
        .unwrap();
    reader
        .demux_native(&CancellationToken::new(), |_, _| Ok(Flow::Continue))
        .unwrap();
    assert_eq!(decoders.built(), 3);
}

#[test]
fn decoder_is_released_before_converter() {
    let decoders = FakeDecoders::default();
    let converters = CountingConverters {
        events: decoders.events.clone(),
        ..CountingConverters::default()
    };
    let source = source(vec![video_par(1920, 1080)], &[(0, 0), (0, 3000)]);
    let mut reader = Reader::new(source, decoders.clone(), converters);

    reader
        .demux(
            &CancellationToken::new(),
            |_, par| Ok(Some(small_video(par))),
            |_, _| Ok(Flow::Continue),
        )
        .unwrap();

    assert_eq!(
        decoders.events.all(),
        vec!["make decoder 0", "drop decoder 0", "drop converter video"]
    );
}

#[test]
fn forced_identity_conversion_preserves_frames() {
    let mut reader = Reader::new(av_source(4), FakeDecoders::default(), IdentityConverters)
        .with_config(ReaderConfig::default().with_force_conversion(true));

    let mut frames = Vec::new();
    reader
        .demux_native(&CancellationToken::new(), |stream, frame| {
            frames.push((stream, frame.samples(), frame.width(), frame.pts().map(|p| p.0)));
            Ok(Flow::Continue)
        })
        .unwrap();

    let expected: Vec<_> = (0..4i64)
        .flat_map(|i| [(0, 0, 1920, Some(i * 3000)), (1, common::SAMPLES, 0, Some(i * 1024))])
        .collect();
    assert_eq!(frames, expected);
}
