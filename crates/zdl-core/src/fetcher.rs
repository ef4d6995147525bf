//! Chunked fetch of one remote object into a local sink.
//!
//! Metadata is read first; its size drives the byte counter. After every
//! chunk one `Progress` event is emitted whose percent is the remote side's
//! own completion fraction, rounded down.

use std::io::Write;

use crate::job::ChunkSize;
use crate::pipeline::{PipelineState, ProgressEvent, ProgressObserver};
use crate::progress::{fraction_percent, ChunkCounter, TransferProgress};
use crate::remote::{ApiError, MediaDownload, ObjectMetadata, ObjectSource};

/// What the fetch stage produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub metadata: ObjectMetadata,
    /// Number of chunk requests made.
    pub chunks: u64,
}

pub struct ChunkedFetcher<'a, S: ObjectSource + ?Sized> {
    source: &'a S,
    chunk_size: ChunkSize,
}

impl<'a, S: ObjectSource + ?Sized> ChunkedFetcher<'a, S> {
    pub fn new(source: &'a S, chunk_size: ChunkSize) -> Self {
        Self { source, chunk_size }
    }

    /// Stream `object_id` into `sink` until the remote side reports completion.
    pub fn fetch(
        &self,
        object_id: &str,
        sink: &mut dyn Write,
        observer: &dyn ProgressObserver,
    ) -> Result<FetchReport, ApiError> {
        let metadata = self.source.metadata(object_id)?;
        tracing::info!(name = %metadata.name, size = metadata.size, chunk = %self.chunk_size, "fetching");
        observer.on_event(ProgressEvent::SizeKnown(metadata.size));

        let chunk = self.chunk_size.bytes();
        let mut download = MediaDownload::new(self.source, object_id, chunk);
        let mut counter = ChunkCounter::new(metadata.size, chunk);
        let mut chunks = 0u64;

        loop {
            let (status, done) = download.next_chunk(sink)?;
            chunks += 1;
            let transferred = counter.advance();
            let percent = fraction_percent(status.progress());
            tracing::debug!(transferred, total = metadata.size, percent, "chunk fetched");
            observer.on_event(ProgressEvent::Progress(TransferProgress {
                stage: PipelineState::Fetching,
                bytes_transferred: transferred,
                total_bytes: metadata.size,
                percent,
            }));
            if done {
                break;
            }
        }
        sink.flush().map_err(ApiError::Sink)?;

        Ok(FetchReport { metadata, chunks })
    }
}
