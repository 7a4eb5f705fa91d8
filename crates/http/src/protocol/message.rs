use bytes::{Buf, Bytes};

/// Represents one signal of an inbound body transport.
///
/// A transport is a stream of `Result<PayloadItem<Data>, E>`: every `Chunk` is a
/// readable piece of the body, `Eof` marks the end of the stream, and an `Err`
/// item is a transport failure. `Data` may be any [`Buf`], the accumulator copies
/// whatever representation the transport hands out into its own byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns the number of bytes left in the chunk, 0 for EOF
    #[inline]
    pub fn remaining(&self) -> usize {
        match self {
            PayloadItem::Chunk(data) => data.remaining(),
            PayloadItem::Eof => 0,
        }
    }
}

impl PayloadItem {
    /// Returns a reference to the contained bytes if this is a Chunk
    ///
    /// Returns None if this is an EOF marker
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the PayloadItem and returns the contained bytes if this is a Chunk
    ///
    /// Returns None if this is an EOF marker
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}

impl From<Bytes> for PayloadItem {
    fn from(bytes: Bytes) -> Self {
        Self::Chunk(bytes)
    }
}

impl From<&'static str> for PayloadItem {
    fn from(value: &'static str) -> Self {
        Self::Chunk(Bytes::from_static(value.as_bytes()))
    }
}

impl From<String> for PayloadItem {
    fn from(value: String) -> Self {
        Self::Chunk(Bytes::from(value))
    }
}
