/*!
    FFmpeg-backed container source.
*/

use std::path::Path;

use ffmpeg_next::{ffi, format::context::Input as InputContext};

use media_types::{Error, MediaInfo, Packet, Result, StreamInfo};

use crate::Source;
use crate::codec_config::CodecConfig;
use crate::convert::{codec_error, duration_from_ffmpeg, pts_from_ffmpeg};
use crate::probe::{extract_media_info, open_input};

/**
    Configuration for opening a media source.
*/
#[derive(Clone, Debug, Default)]
pub struct SourceConfig {
    /// Ask the demuxer to generate missing presentation timestamps.
    pub generate_pts: bool,
    /// Drop packets that carry no payload instead of passing them on.
    pub skip_empty_packets: bool,
}

impl SourceConfig {
    pub fn with_generate_pts(mut self, generate_pts: bool) -> Self {
        self.generate_pts = generate_pts;
        self
    }

    pub fn with_skip_empty_packets(mut self, skip: bool) -> Self {
        self.skip_empty_packets = skip;
        self
    }
}

/**
    A media container opened through libavformat.

    Exposes every stream of the container and yields their packets
    interleaved in file order.
*/
pub struct FfmpegSource {
    /// The FFmpeg input context, `None` once closed.
    input: Option<InputContext>,
    media_info: MediaInfo,
    codec_configs: Vec<CodecConfig>,
    config: SourceConfig,
}

impl FfmpegSource {
    /**
        Open a media file.

        # Example

        ```ignore
        let source = FfmpegSource::open("video.mp4", SourceConfig::default())?;
        println!("Duration: {:?}", source.media_info().duration);
        ```
    */
    pub fn open<P: AsRef<Path>>(path: P, config: SourceConfig) -> Result<Self> {
        let path = path.as_ref();
        let mut input = open_input(path)?;

        if config.generate_pts {
            // SAFETY: the context is open and owned by `input`.
            unsafe {
                (*input.as_mut_ptr()).flags |= ffi::AVFMT_FLAG_GENPTS as i32;
            }
        }

        let media_info = extract_media_info(&input);
        let codec_configs = input
            .streams()
            .map(|stream| CodecConfig::new(stream.parameters()))
            .collect();

        tracing::debug!(
            path = %path.display(),
            streams = media_info.streams.len(),
            duration = ?media_info.duration,
            "opened container"
        );

        Ok(Self {
            input: Some(input),
            media_info,
            codec_configs,
            config,
        })
    }

    /**
        Get the media info for this source.
    */
    pub fn media_info(&self) -> &MediaInfo {
        &self.media_info
    }

    /**
        Codec configuration of one stream, as found by the demuxer.
    */
    pub fn codec_config(&self, stream_index: usize) -> Option<&CodecConfig> {
        self.codec_configs.get(stream_index)
    }

    /**
        Codec configurations of every stream, indexed like [`Source::streams`].
    */
    pub fn codec_configs(&self) -> &[CodecConfig] {
        &self.codec_configs
    }

    fn input_mut(&mut self) -> Result<&mut InputContext> {
        self.input.as_mut().ok_or(Error::Closed)
    }
}

impl Source for FfmpegSource {
    fn streams(&self) -> &[StreamInfo] {
        if self.input.is_none() {
            return &[];
        }
        &self.media_info.streams
    }

    /**
        Read the next packet from the container.

        Packets are returned in file order, interleaved between streams.
    */
    fn read_packet(&mut self) -> Result<Option<Packet>> {
        let skip_empty = self.config.skip_empty_packets;
        let input = self.input.as_mut().ok_or(Error::Closed)?;

        loop {
            let mut ffmpeg_packet = ffmpeg_next::Packet::empty();
            match ffmpeg_packet.read(input) {
                Ok(()) => {}
                Err(ffmpeg_next::Error::Eof) => return Ok(None),
                Err(e) => return Err(codec_error(e)),
            }

            let stream_index = ffmpeg_packet.stream();
            let Some(stream) = self.media_info.streams.get(stream_index) else {
                // Streams added after open are not part of the stream list.
                continue;
            };

            let data = ffmpeg_packet.data().map(|d| d.to_vec()).unwrap_or_default();
            if skip_empty && data.is_empty() {
                continue;
            }

            let packet = Packet::new(stream_index, data, stream.time_base())
                .with_timestamps(
                    pts_from_ffmpeg(ffmpeg_packet.pts()),
                    pts_from_ffmpeg(ffmpeg_packet.dts()),
                )
                .with_duration(duration_from_ffmpeg(ffmpeg_packet.duration()))
                .with_keyframe(ffmpeg_packet.is_key());

            return Ok(Some(packet));
        }
    }

    /**
        Seek to the nearest keyframe at or before `timestamp`.

        `timestamp` is in the time base of `stream_index`. The actual
        position after seeking may be before the target due to keyframe
        alignment.
    */
    fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<()> {
        if stream_index >= self.media_info.streams.len() {
            return Err(Error::StreamNotFound(stream_index));
        }
        let input = self.input_mut()?;

        // SAFETY: the context is open and owned by `input`.
        let ret = unsafe {
            ffi::avformat_seek_file(
                input.as_mut_ptr(),
                stream_index as i32,
                i64::MIN,
                timestamp,
                timestamp,
                0,
            )
        };
        if ret < 0 {
            return Err(Error::codec(format!(
                "seek failed: {}",
                ffmpeg_next::Error::from(ret)
            )));
        }

        tracing::debug!(stream = stream_index, timestamp, "seeked container");
        Ok(())
    }

    fn close(&mut self) {
        if self.input.take().is_some() {
            tracing::debug!("closed container");
        }
    }

    fn is_closed(&self) -> bool {
        self.input.is_none()
    }
}

impl std::fmt::Debug for FfmpegSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSource")
            .field("streams", &self.media_info.streams.len())
            .field("closed", &self.input.is_none())
            .finish_non_exhaustive()
    }
}

/**
    Open a media file with default configuration.
*/
pub fn open<P: AsRef<Path>>(path: P) -> Result<FfmpegSource> {
    FfmpegSource::open(path, SourceConfig::default())
}
