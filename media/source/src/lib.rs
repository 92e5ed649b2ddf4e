/*!
    Media sources for the reader.

    This crate handles the input side of the pipeline. A [`Source`] is an
    opened container that lists its streams and yields compressed packets
    in container order. [`MemorySource`] replays packets held in memory.

    With the `ffmpeg` feature enabled, [`FfmpegSource`] opens files through
    libavformat and [`probe`] reads stream metadata without demuxing. The
    [`convert`] module holds the mappings between FFmpeg and media-types
    values shared by the decoder and converter crates.
*/

mod memory;
mod source;

#[cfg(feature = "ffmpeg")]
mod codec_config;
#[cfg(feature = "ffmpeg")]
pub mod convert;
#[cfg(feature = "ffmpeg")]
mod input;
#[cfg(feature = "ffmpeg")]
mod probe;

pub use memory::{MemorySource, SourceActivity};
pub use source::Source;

#[cfg(feature = "ffmpeg")]
pub use codec_config::CodecConfig;
#[cfg(feature = "ffmpeg")]
pub use input::{FfmpegSource, SourceConfig, open};
#[cfg(feature = "ffmpeg")]
pub use probe::probe;

// Re-export types for convenience
pub use media_types::{Error, MediaInfo, Packet, Result, StreamInfo};
