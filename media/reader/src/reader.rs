/*!
    The read/dispatch loop.
*/

use std::collections::BTreeMap;

use tokio_util::sync::CancellationToken;

use media_decode::{DecoderFactory, DecodingUnit};
use media_source::Source;
use media_transform::ConverterFactory;
use media_types::{Error, Flow, Frame, MediaKind, Packet, Par, Result, SeekTarget, StreamInfo};

use crate::config::{ErrorPolicy, ReaderConfig};

/**
    Default stream policy for [`Reader::demux`]: decode every audio and
    video stream in its native layout and ignore everything else.
*/
pub fn native_format(_stream_index: usize, par: &Par) -> Result<Option<Par>> {
    Ok(par.kind().is_decodable().then(|| par.clone()))
}

/**
    Reads a source and delivers its packets or decoded frames.

    A reader owns its source and the factories used to build a decoder and
    converter for each stream. Each [`decode`](Reader::decode) or
    [`demux`](Reader::demux) call runs synchronously until the source ends,
    a callback stops it, the token is cancelled, or an error occurs.
    Decoding units live for one call only.

    Closing is idempotent and also happens on drop. Every call on a closed
    reader fails with [`Error::Closed`].

    # Example

    ```ignore
    let mut reader = Reader::open("movie.mkv")?;
    let cancel = CancellationToken::new();
    reader.demux_native(&cancel, |stream, frame| {
        println!("stream {stream}: {:?}", frame.pts());
        Ok(Flow::Continue)
    })?;
    ```
*/
pub struct Reader {
    source: Box<dyn Source>,
    decoders: Box<dyn DecoderFactory>,
    converters: Box<dyn ConverterFactory>,
    config: ReaderConfig,
}

impl Reader {
    pub fn new(
        source: impl Source + 'static,
        decoders: impl DecoderFactory + 'static,
        converters: impl ConverterFactory + 'static,
    ) -> Self {
        Self {
            source: Box::new(source),
            decoders: Box::new(decoders),
            converters: Box::new(converters),
            config: ReaderConfig::default(),
        }
    }

    /**
        Open a media file with FFmpeg-backed source, decoders and converters.
    */
    #[cfg(feature = "ffmpeg")]
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let source =
            media_source::FfmpegSource::open(path, media_source::SourceConfig::default())?;
        let decoders = media_decode::FfmpegDecoders::from_source(&source);
        Ok(Self::new(
            source,
            decoders,
            media_transform::FfmpegConverters::new(),
        ))
    }

    /**
        Builder: replace the configuration.
    */
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /**
        Streams of the source. Empty once the reader is closed.
    */
    pub fn streams(&self) -> &[StreamInfo] {
        self.source.streams()
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_closed()
    }

    /**
        Release the source. Safe to call more than once.
    */
    pub fn close(&mut self) {
        if !self.source.is_closed() {
            tracing::debug!("closing reader");
            self.source.close();
        }
    }

    /**
        Reposition the source so the next call starts at or before
        `timestamp`, in the time base of `stream_index`.
    */
    pub fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<()> {
        self.ensure_open()?;
        self.seek_source(SeekTarget {
            stream_index,
            timestamp,
        })
    }

    /**
        Deliver every packet, undecoded, in container order.

        Packets of streams excluded by the configured stream filter are
        dropped. The packet is only lent to the callback; clone it to keep
        it past the call.
    */
    pub fn decode<F>(&mut self, cancel: &CancellationToken, mut on_packet: F) -> Result<()>
    where
        F: FnMut(usize, &Packet) -> Result<Flow>,
    {
        self.ensure_open()?;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!("decode cancelled");
                return Err(Error::Cancelled);
            }

            let Some(packet) = self.source.read_packet()? else {
                tracing::debug!("end of source");
                return Ok(());
            };

            let stream_index = packet.stream_index;
            let Some(kind) = self.stream_kind(stream_index) else {
                tracing::trace!(stream = stream_index, "packet for unknown stream dropped");
                continue;
            };
            if !self.config.stream_filter.accepts(stream_index, kind) {
                continue;
            }

            match on_packet(stream_index, &packet)? {
                Flow::Continue => {}
                Flow::Stop => return Ok(()),
                Flow::Seek(target) => self.seek_source(target)?,
            }
        }
    }

    /**
        Decode the streams chosen by `map` and deliver their frames.

        `map` is asked once per stream, at that stream's first packet, for
        the layout it wants: `None` ignores the stream, a layout equal to
        the native one decodes without conversion, anything else decodes
        and converts. Frames are lent to `on_frame` in read order.

        At the end of the source every decoding unit is flushed in stream
        index order. Fails with [`Error::NoStreams`] as soon as every stream
        has been ignored, or at the end of the source if no stream was
        decoded.
    */
    pub fn demux<M, F>(
        &mut self,
        cancel: &CancellationToken,
        mut map: M,
        mut on_frame: F,
    ) -> Result<()>
    where
        M: FnMut(usize, &Par) -> Result<Option<Par>>,
        F: FnMut(usize, &Frame) -> Result<Flow>,
    {
        self.ensure_open()?;

        let mut session = Session::new(self.source.streams().len());
        let result = self.run_demux(cancel, &mut map, &mut on_frame, &mut session);

        tracing::debug!(units = session.units.len(), ok = result.is_ok(), "demux finished");
        result
    }

    /**
        [`demux`](Reader::demux) with [`native_format`] as the map.
    */
    pub fn demux_native<F>(&mut self, cancel: &CancellationToken, on_frame: F) -> Result<()>
    where
        F: FnMut(usize, &Frame) -> Result<Flow>,
    {
        self.demux(cancel, native_format, on_frame)
    }

    fn run_demux<M, F>(
        &mut self,
        cancel: &CancellationToken,
        map: &mut M,
        on_frame: &mut F,
        session: &mut Session,
    ) -> Result<()>
    where
        M: FnMut(usize, &Par) -> Result<Option<Par>>,
        F: FnMut(usize, &Frame) -> Result<Flow>,
    {
        loop {
            if cancel.is_cancelled() {
                tracing::debug!("demux cancelled");
                return Err(Error::Cancelled);
            }

            let Some(packet) = self.source.read_packet()? else {
                break;
            };
            let stream_index = packet.stream_index;
            if self.stream_kind(stream_index).is_none() {
                tracing::trace!(stream = stream_index, "packet for unknown stream dropped");
                continue;
            }

            if !session.is_decided(stream_index) {
                self.decide(stream_index, map, session)?;
                if session.all_decided() && session.units.is_empty() {
                    return Err(Error::NoStreams);
                }
            }

            let Some(unit) = session.units.get_mut(&stream_index) else {
                continue;
            };

            let mut failed = None;
            let fed = {
                let mut sink =
                    |frame: &Frame| hold_error(on_frame(stream_index, frame), &mut failed);
                unit.feed(Some(&packet), &mut sink)
            };
            match self.settle(fed, failed)? {
                Flow::Continue => {}
                Flow::Stop => return Ok(()),
                Flow::Seek(target) => self.seek_source(target)?,
            }
        }

        tracing::debug!(units = session.units.len(), "end of source");
        if session.units.is_empty() {
            return Err(Error::NoStreams);
        }

        for (&stream_index, unit) in session.units.iter_mut() {
            if cancel.is_cancelled() {
                tracing::debug!("demux cancelled before flush");
                return Err(Error::Cancelled);
            }

            let mut failed = None;
            let fed = {
                let mut sink =
                    |frame: &Frame| hold_error(on_frame(stream_index, frame), &mut failed);
                unit.feed(None, &mut sink)
            };
            match self.settle(fed, failed)? {
                Flow::Continue => {}
                Flow::Stop => return Ok(()),
                Flow::Seek(target) => {
                    // Flushed units cannot take more input; the new position
                    // applies to the next call.
                    self.seek_source(target)?;
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    /**
        Ask the map about a stream and build its decoding unit.
    */
    fn decide<M>(&mut self, stream_index: usize, map: &mut M, session: &mut Session) -> Result<()>
    where
        M: FnMut(usize, &Par) -> Result<Option<Par>>,
    {
        let stream = self
            .source
            .streams()
            .get(stream_index)
            .cloned()
            .ok_or(Error::StreamNotFound(stream_index))?;
        session.mark_decided(stream_index);

        if !self.config.stream_filter.accepts(stream_index, stream.kind()) {
            tracing::debug!(stream = stream_index, "stream excluded by filter");
            return Ok(());
        }

        let Some(desired) = map(stream_index, &stream.par)? else {
            tracing::debug!(stream = stream_index, kind = %stream.kind(), "stream ignored");
            return Ok(());
        };

        let unit = DecodingUnit::new(
            &stream,
            desired,
            &*self.decoders,
            &*self.converters,
            self.config.force_conversion,
        )?;
        session.units.insert(stream_index, unit);
        Ok(())
    }

    /**
        Apply the error policy to the outcome of feeding a unit.

        A callback failure always ends the call. Only decoder and converter
        failures are subject to the skip policy.
    */
    fn settle(&self, fed: Result<Flow>, callback_error: Option<Error>) -> Result<Flow> {
        if let Some(error) = callback_error {
            return Err(error);
        }
        match fed {
            Err(error @ Error::Stream { .. }) if self.config.error_policy == ErrorPolicy::Skip => {
                tracing::warn!(
                    stream = error.stream_index(),
                    error = %error,
                    "skipping packet after decode failure"
                );
                Ok(Flow::Continue)
            }
            other => other,
        }
    }

    fn seek_source(&mut self, target: SeekTarget) -> Result<()> {
        if target.stream_index >= self.source.streams().len() {
            return Err(Error::StreamNotFound(target.stream_index));
        }
        self.source.seek(target.stream_index, target.timestamp)?;
        tracing::debug!(
            stream = target.stream_index,
            timestamp = target.timestamp,
            "seeked source"
        );
        Ok(())
    }

    fn stream_kind(&self, stream_index: usize) -> Option<MediaKind> {
        self.source.streams().get(stream_index).map(StreamInfo::kind)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.source.is_closed() {
            return Err(Error::Closed);
        }
        Ok(())
    }
}

/**
    Keep a frame callback's error out of the unit's result, stopping the
    unit so the reader can return it untouched.
*/
fn hold_error(result: Result<Flow>, failed: &mut Option<Error>) -> Result<Flow> {
    result.or_else(|error| {
        *failed = Some(error);
        Ok(Flow::Stop)
    })
}

impl Drop for Reader {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("streams", &self.source.streams().len())
            .field("closed", &self.source.is_closed())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/**
    Per-call state of a demux: which streams were decided and their units.
*/
struct Session {
    decided: Vec<bool>,
    // Ascending stream index is the flush order.
    units: BTreeMap<usize, DecodingUnit>,
}

impl Session {
    fn new(stream_count: usize) -> Self {
        Self {
            decided: vec![false; stream_count],
            units: BTreeMap::new(),
        }
    }

    fn is_decided(&self, stream_index: usize) -> bool {
        self.decided.get(stream_index).copied().unwrap_or(false)
    }

    fn mark_decided(&mut self, stream_index: usize) {
        if let Some(decided) = self.decided.get_mut(stream_index) {
            *decided = true;
        }
    }

    fn all_decided(&self) -> bool {
        self.decided.iter().all(|d| *d)
    }
}
