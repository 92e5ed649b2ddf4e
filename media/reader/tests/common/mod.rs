//! Fakes shared by the reader integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use media_reader::{
    AudioParams, ChannelLayout, Converter, ConverterFactory, Decoder, DecoderFactory, Drain,
    Error, Frame, MemorySource, Packet, Par, PixelFormat, Pts, Rational, Result, SampleFormat,
    StreamInfo, Submit, VideoParams,
};

pub const CORRUPT: u8 = 0xff;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn audio_par() -> Par {
    Par::audio(
        AudioParams::new(SampleFormat::S16, ChannelLayout::Stereo, 44100),
        Rational::new(1, 44100),
    )
}

pub fn video_par(width: u32, height: u32) -> Par {
    let mut params = VideoParams::new(PixelFormat::Yuv420p, width, height);
    params.frame_rate = Some(Rational::new(30, 1));
    Par::video(params, Rational::new(1, 90000))
}

/// Audio samples per packet in the fake streams.
pub const SAMPLES: usize = 1024;

/**
    Build a source with the given streams and `(stream_index, pts)` packets.
*/
pub fn source(streams: Vec<Par>, packets: &[(usize, i64)]) -> MemorySource {
    let streams: Vec<StreamInfo> = streams
        .into_iter()
        .enumerate()
        .map(|(index, par)| StreamInfo::new(index, par))
        .collect();
    let packets = packets
        .iter()
        .map(|&(stream_index, pts)| packet(&streams[stream_index], pts, vec![stream_index as u8; 16]))
        .collect();
    MemorySource::new(streams, packets).unwrap()
}

pub fn packet(stream: &StreamInfo, pts: i64, data: Vec<u8>) -> Packet {
    Packet::new(stream.index, data, stream.time_base())
        .with_timestamps(Some(Pts(pts)), Some(Pts(pts)))
        .with_keyframe(true)
}

/**
    Video on stream 0 (1920x1080) and audio on stream 1, alternating,
    `count` packets each.
*/
pub fn av_source(count: usize) -> MemorySource {
    let mut packets = Vec::new();
    for i in 0..count as i64 {
        packets.push((0, i * 3000));
        packets.push((1, i * SAMPLES as i64));
    }
    source(vec![video_par(1920, 1080), audio_par()], &packets)
}

/**
    Shared log of construction and drop events, for ordering checks.
*/
#[derive(Clone, Default)]
pub struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/**
    Decoder that holds `delay` frames back and releases the lowest pts
    first, like a codec with B-frame reordering. Packets starting with
    [`CORRUPT`] fail to decode.
*/
pub struct ReorderDecoder {
    stream_index: usize,
    par: Par,
    delay: usize,
    held: Vec<Frame>,
    ready: VecDeque<Frame>,
    eof: bool,
    events: Events,
}

impl ReorderDecoder {
    fn release_lowest(&mut self) {
        if let Some(position) = self
            .held
            .iter()
            .enumerate()
            .min_by_key(|(_, f)| f.pts().map_or(i64::MIN, |p| p.0))
            .map(|(position, _)| position)
        {
            let frame = self.held.remove(position);
            self.ready.push_back(frame);
        }
    }
}

impl Decoder for ReorderDecoder {
    fn submit(&mut self, packet: Option<&Packet>) -> Result<Submit> {
        let Some(packet) = packet else {
            while !self.held.is_empty() {
                self.release_lowest();
            }
            self.eof = true;
            return Ok(Submit::Accepted);
        };

        if packet.data.first() == Some(&CORRUPT) {
            return Err(Error::invalid_data("corrupt packet"));
        }

        let mut frame = Frame::new(self.par.clone()).with_pts(packet.pts);
        frame.alloc(SAMPLES)?;
        self.held.push(frame);
        if self.held.len() > self.delay {
            self.release_lowest();
        }
        Ok(Submit::Accepted)
    }

    fn drain(&mut self) -> Result<Drain> {
        match self.ready.pop_front() {
            Some(frame) => Ok(Drain::Frame(frame)),
            None if self.eof => Ok(Drain::EndOfStream),
            None => Ok(Drain::NeedMoreInput),
        }
    }
}

impl Drop for ReorderDecoder {
    fn drop(&mut self) {
        self.events.push(format!("drop decoder {}", self.stream_index));
    }
}

/**
    Factory for [`ReorderDecoder`]s that counts how many it built.
*/
#[derive(Clone, Default)]
pub struct FakeDecoders {
    pub delay: usize,
    pub built: Arc<AtomicUsize>,
    pub events: Events,
}

impl FakeDecoders {
    pub fn with_delay(delay: usize) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }
}

impl DecoderFactory for FakeDecoders {
    fn make_decoder(&self, stream: &StreamInfo) -> Result<Box<dyn Decoder>> {
        self.built.fetch_add(1, Ordering::SeqCst);
        self.events.push(format!("make decoder {}", stream.index));
        Ok(Box::new(ReorderDecoder {
            stream_index: stream.index,
            par: stream.par.clone(),
            delay: self.delay,
            held: Vec::new(),
            ready: VecDeque::new(),
            eof: false,
            events: self.events.clone(),
        }))
    }
}

/**
    Converter producing blank frames in the target layout, keeping the
    timestamp and, for audio, the sample count.
*/
pub struct FakeConverter {
    stream_kind: String,
    output: Par,
    calls: Arc<AtomicUsize>,
    events: Events,
}

impl Converter for FakeConverter {
    fn output(&self) -> &Par {
        &self.output
    }

    fn convert(&mut self, frame: &Frame) -> Result<Option<Frame>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut converted = Frame::new(self.output.clone()).with_pts(frame.pts());
        converted.alloc(frame.samples().max(1))?;
        Ok(Some(converted))
    }
}

impl Drop for FakeConverter {
    fn drop(&mut self) {
        self.events.push(format!("drop converter {}", self.stream_kind));
    }
}

/**
    Factory for [`FakeConverter`]s that counts builds and conversions.
*/
#[derive(Clone, Default)]
pub struct CountingConverters {
    pub built: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
    pub events: Events,
}

impl CountingConverters {
    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConverterFactory for CountingConverters {
    fn make_converter(&self, native: &Par, desired: &Par) -> Result<Box<dyn Converter>> {
        if native.kind() != desired.kind() {
            return Err(Error::invalid_parameters("kind change"));
        }
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConverter {
            stream_kind: native.kind().to_string(),
            output: desired.clone(),
            calls: Arc::clone(&self.calls),
            events: self.events.clone(),
        }))
    }
}
