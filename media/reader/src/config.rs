/*!
    Reader configuration.
*/

use media_types::MediaKind;

/**
    What a call does when decoding or converting one packet fails.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop the call with the error.
    #[default]
    Abort,
    /// Log the error and continue with the next packet.
    Skip,
}

/**
    Which streams a call looks at.

    In `decode` calls, packets of excluded streams are dropped. In `demux`
    calls, excluded streams are ignored without consulting the map.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StreamFilter {
    #[default]
    All,
    /// Only the streams with these indices.
    Only(Vec<usize>),
    /// Only streams of these media kinds.
    Kinds(Vec<MediaKind>),
}

impl StreamFilter {
    pub fn accepts(&self, stream_index: usize, kind: MediaKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(indices) => indices.contains(&stream_index),
            Self::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

/**
    Configuration for a [`Reader`](crate::Reader).
*/
#[derive(Clone, Debug, Default)]
pub struct ReaderConfig {
    pub error_policy: ErrorPolicy,
    /// Build a converter for every decoded stream, even when the requested
    /// layout matches the native one.
    pub force_conversion: bool,
    pub stream_filter: StreamFilter,
}

impl ReaderConfig {
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_force_conversion(mut self, force: bool) -> Self {
        self.force_conversion = force;
        self
    }

    pub fn with_stream_filter(mut self, filter: StreamFilter) -> Self {
        self.stream_filter = filter;
        self
    }
}
