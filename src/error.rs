//! Error type raised while extracting metadata from an image file.

use thiserror::Error;

/// Failure to extract IPTC or XMP metadata from a file.
///
/// The projectors never propagate this: it is turned into a single
/// placeholder entry carrying the `Display` text of the error.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    /// The file could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The file is not a container we know how to read metadata from.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The container or IIM data is corrupt.
    #[error("malformed metadata: {0}")]
    Malformed(String),

    /// The XMP packet is not well-formed XML.
    #[error("invalid XMP packet: {0}")]
    Xml(String),

    /// Free-form failure reported by a metadata source.
    #[error("{0}")]
    Message(String),
}

impl ExtractionFailure {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }
}
