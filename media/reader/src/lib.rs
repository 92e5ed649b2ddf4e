/*!
    Demux, decode and convert media streams into packets or frames.

    A [`Reader`] owns an opened [`Source`] and drives it in one of two
    modes:

    - [`Reader::decode`] delivers compressed packets unchanged.
    - [`Reader::demux`] decodes the streams a map function selects, converts
      them to the requested layout, and delivers frames.

    Callbacks steer the loop with [`Flow`]: continue, stop, or seek. Calls
    are synchronous; a [`CancellationToken`] fired from another thread ends
    a call before its next read. [`HandoffQueue`] moves cloned packets or
    frames to consumer threads.

    With the `ffmpeg` feature, [`Reader::open`] wires FFmpeg-backed
    sources, decoders and converters together.

    # Example

    ```ignore
    let mut reader = Reader::open("movie.mkv")?;
    let cancel = CancellationToken::new();
    reader.demux(
        &cancel,
        |_, par| Ok(par.as_video().map(|_| small_yuv(par))),
        |stream, frame| {
            show(stream, frame);
            Ok(Flow::Continue)
        },
    )?;
    ```
*/

mod config;
mod handoff;
mod reader;

pub use config::{ErrorPolicy, ReaderConfig, StreamFilter};
pub use handoff::{FrameQueue, HandoffQueue, PacketQueue, forward_frames, forward_packets};
pub use reader::{Reader, native_format};

pub use tokio_util::sync::CancellationToken;

pub use media_decode::{Decoder, DecoderFactory, DecodingUnit, Drain, Submit};
pub use media_source::{MemorySource, Source, SourceActivity};
pub use media_transform::{Converter, ConverterFactory, IdentityConverter, IdentityConverters};
pub use media_types::*;

#[cfg(feature = "ffmpeg")]
pub use media_decode::{AudioDecoder, FfmpegDecoders, VideoDecoder};
#[cfg(feature = "ffmpeg")]
pub use media_source::{FfmpegSource, SourceConfig, probe};
#[cfg(feature = "ffmpeg")]
pub use media_transform::{
    AudioTransform, FfmpegConverters, ScalingAlgorithm, VideoTransform, VideoTransformConfig,
};
