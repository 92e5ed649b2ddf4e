/*!
    Control flow returned by pipeline callbacks.
*/

/**
    What the pipeline should do after a callback returns.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    #[default]
    Continue,
    /// End the call successfully without reading further.
    Stop,
    /// Reposition the source, then keep reading.
    Seek(SeekTarget),
}

impl Flow {
    pub fn seek(stream_index: usize, timestamp: i64) -> Self {
        Self::Seek(SeekTarget {
            stream_index,
            timestamp,
        })
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

/**
    A seek position, in the time base of the named stream.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeekTarget {
    pub stream_index: usize,
    pub timestamp: i64,
}
