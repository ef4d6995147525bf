//! Chunked media download over an `ObjectSource`.

use std::io::Write;

use super::{ApiError, ObjectSource};

/// Per-call status: how far the download is and how big the object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkStatus {
    pub resumable_progress: u64,
    pub total_size: Option<u64>,
}

impl ChunkStatus {
    /// Fraction complete in [0.0, 1.0] (1.0 for an empty object).
    pub fn progress(&self) -> f64 {
        match self.total_size {
            Some(0) => 1.0,
            Some(total) => (self.resumable_progress as f64 / total as f64).min(1.0),
            None => 0.0,
        }
    }
}

/// Downloads an object one chunk per call.
pub struct MediaDownload<'a, S: ObjectSource + ?Sized> {
    source: &'a S,
    object_id: &'a str,
    chunk_size: u64,
    progress: u64,
    total: Option<u64>,
    done: bool,
}

impl<'a, S: ObjectSource + ?Sized> MediaDownload<'a, S> {
    pub fn new(source: &'a S, object_id: &'a str, chunk_size: u64) -> Self {
        Self {
            source,
            object_id,
            chunk_size: chunk_size.max(1),
            progress: 0,
            total: None,
            done: false,
        }
    }

    /// Fetch the next chunk into `sink`. Returns the status and whether the
    /// object is now complete.
    pub fn next_chunk(&mut self, sink: &mut dyn Write) -> Result<(ChunkStatus, bool), ApiError> {
        if self.done {
            return Ok((self.status(), true));
        }
        let start = self.progress;
        let end = start + self.chunk_size - 1;
        let resp = self.source.fetch_range(self.object_id, start, end, sink)?;

        self.progress += resp.received;
        self.total = Some(resp.total);
        if resp.received == 0 && self.progress < resp.total {
            return Err(ApiError::Range(format!(
                "empty body at offset {} of {}",
                self.progress, resp.total
            )));
        }
        self.done = self.progress >= resp.total;
        Ok((self.status(), self.done))
    }

    fn status(&self) -> ChunkStatus {
        ChunkStatus {
            resumable_progress: self.progress,
            total_size: self.total,
        }
    }
}
