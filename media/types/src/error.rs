use thiserror::Error;

/**
    Errors produced anywhere in the media pipeline.

    Variants fall into a few groups: setup failures that stop a call before
    any delivery for a stream, per-stream decode failures, cancellation, and
    use of a closed reader. Early stop requested by a callback is not an
    error.
*/
#[derive(Debug, Error)]
pub enum Error {
    // ── Setup ─────────────────────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("setting up stream {stream_index} failed: {source}")]
    Setup {
        stream_index: usize,
        #[source]
        source: Box<Error>,
    },

    // ── Per-unit ──────────────────────────────────────────────────────
    #[error("codec error: {0}")]
    Codec(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("stream {stream_index}: {source}")]
    Stream {
        stream_index: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("frame is not allocated")]
    NotAllocated,

    // ── Orchestration ─────────────────────────────────────────────────
    #[error("operation cancelled")]
    Cancelled,
    #[error("reader is closed")]
    Closed,
    #[error("no streams to decode")]
    NoStreams,
    #[error("stream {0} not found")]
    StreamNotFound(usize),
    #[error("callback failed: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat(message.into())
    }

    pub fn unsupported_codec(message: impl Into<String>) -> Self {
        Self::UnsupportedCodec(message.into())
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /**
        Wrap an arbitrary caller error so it can be returned from a callback.
    */
    pub fn callback(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Callback(error.into())
    }

    /**
        Attach a stream index to a setup failure.
    */
    pub fn setup(stream_index: usize, source: Error) -> Self {
        match source {
            already @ Self::Setup { .. } => already,
            other => Self::Setup {
                stream_index,
                source: Box::new(other),
            },
        }
    }

    /**
        Attach a stream index to a decode or convert failure.

        Cancellation and closed errors pass through unchanged so they stay
        checkable.
    */
    pub fn in_stream(stream_index: usize, source: Error) -> Self {
        match source {
            passthrough @ (Self::Stream { .. }
            | Self::Cancelled
            | Self::Closed
            | Self::Callback(_)) => passthrough,
            other => Self::Stream {
                stream_index,
                source: Box::new(other),
            },
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::Setup { .. }
                | Self::UnsupportedCodec(_)
                | Self::UnsupportedFormat(_)
                | Self::InvalidParameters(_)
        )
    }

    /**
        Returns the stream index attached to this error, if any.
    */
    pub fn stream_index(&self) -> Option<usize> {
        match self {
            Self::Setup { stream_index, .. } | Self::Stream { stream_index, .. } => {
                Some(*stream_index)
            }
            Self::StreamNotFound(index) => Some(*index),
            _ => None,
        }
    }
}

/**
    Type alias for results that may return an [`Error`].
*/
pub type Result<T> = std::result::Result<T, Error>;
