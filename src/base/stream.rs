use super::dict::Dict;
use super::types::*;

/// A PDF stream object.
#[derive(Debug, PartialEq, Clone)]
pub struct Stream {
    /// The stream dictionary.
    pub dict: Dict,
    /// The stream data, or its offset in the file (relative to `%PDF`).
    pub data: Data
}

/// The payload of a [`Stream`]: either owned bytes, or a file offset awaiting lazy load.
#[derive(Debug, PartialEq, Clone)]
pub enum Data {
    Val(Vec<u8>),
    Ref(Offset)
}

impl Stream {
    /// Creates a stream with owned (detached) data.
    pub fn new(dict: Dict, data: Vec<u8>) -> Stream {
        Stream { dict, data: Data::Val(data) }
    }
}
