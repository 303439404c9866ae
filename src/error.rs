//! Error types for session operations.

use thiserror::Error;

use crate::format::FormatError;

/// Errors returned by [`Session`](crate::Session) operations.
///
/// None of these are fatal: a failing operation leaves the session exactly as
/// it was before the call.
#[derive(Error, Debug)]
pub enum SessionError {
    /// An operation referenced an annotation that does not exist
    #[error("Annotation index {index} out of range (have {len})")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of annotations at the time of the call
        len: usize,
    },

    /// The image has a zero dimension, so no display scale can be derived
    #[error("Degenerate image: {width}x{height}")]
    DegenerateImage {
        /// Natural width in pixels
        width: u32,
        /// Natural height in pixels
        height: u32,
    },

    /// Image bytes could not be decoded
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// I/O error while sniffing image bytes
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Annotation import or export failed
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl SessionError {
    /// Create an index error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}
