/*!
    Stream descriptions exposed by sources.
*/

use std::time::Duration;

use crate::{MediaKind, Par, Rational};

/**
    Read-only view of one elementary stream inside an opened source.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    /// Index of the stream, stable for the lifetime of the source.
    pub index: usize,
    /// Native format as stored in the container.
    pub par: Par,
    /// Known only when the container records it.
    pub duration: Option<Duration>,
}

impl StreamInfo {
    pub fn new(index: usize, par: Par) -> Self {
        Self {
            index,
            par,
            duration: None,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.par.kind()
    }

    pub fn time_base(&self) -> Rational {
        self.par.time_base
    }
}

/**
    Streams and duration of a whole file, as reported by probing.
*/
#[derive(Clone, Debug, Default)]
pub struct MediaInfo {
    pub duration: Option<Duration>,
    /// Every stream in container order.
    pub streams: Vec<StreamInfo>,
}

impl MediaInfo {
    pub fn first(&self, kind: MediaKind) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.kind() == kind)
    }

    pub fn has_video(&self) -> bool {
        self.first(MediaKind::Video).is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.first(MediaKind::Audio).is_some()
    }
}
