//! Remote content API: object metadata and ranged media retrieval.
//!
//! `ObjectSource` is the seam between the pipeline and the transport.
//! `DriveClient` implements it over libcurl; `MediaDownload` drives it one
//! chunk at a time and reports per-call progress and completion.

mod drive;
mod error;
mod media;
mod parse;

#[cfg(test)]
pub(crate) mod memory;

pub use drive::DriveClient;
pub use error::ApiError;
pub use media::{ChunkStatus, MediaDownload};

use std::io::Write;

/// Object metadata as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Display name of the remote object.
    pub name: String,
    /// Size in bytes; the source of truth for progress accounting.
    pub size: u64,
}

/// Result of one ranged request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeResponse {
    /// Bytes appended to the sink by this call.
    pub received: u64,
    /// Full object size as reported with the response.
    pub total: u64,
}

/// A remote store that can describe an object and serve byte ranges of it.
pub trait ObjectSource {
    fn metadata(&self, object_id: &str) -> Result<ObjectMetadata, ApiError>;

    /// Fetch bytes `start..=end` of the object and append them to `sink`.
    /// The response may be shorter than requested at the end of the object.
    fn fetch_range(
        &self,
        object_id: &str,
        start: u64,
        end: u64,
        sink: &mut dyn Write,
    ) -> Result<RangeResponse, ApiError>;
}

impl<T: ObjectSource + ?Sized> ObjectSource for &T {
    fn metadata(&self, object_id: &str) -> Result<ObjectMetadata, ApiError> {
        (**self).metadata(object_id)
    }

    fn fetch_range(
        &self,
        object_id: &str,
        start: u64,
        end: u64,
        sink: &mut dyn Write,
    ) -> Result<RangeResponse, ApiError> {
        (**self).fetch_range(object_id, start, end, sink)
    }
}
