//! Integrity check of the fetched file against an expected digest.
//!
//! The file is re-read in the fetch chunk size and hashed as a stream.
//! Progress mirrors the fetch accounting, but the percent is computed from
//! the local byte counter and forced to 100 on the final chunk.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::job::{ChunkSize, ExpectedDigest};
use crate::pipeline::{PipelineState, ProgressEvent, ProgressObserver};
use crate::progress::{ratio_percent, ChunkCounter, TransferProgress};

/// Result of a completed comparison. A mismatch is a normal outcome here;
/// the caller decides what it means for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Match { digest: String },
    Mismatch { expected: String, actual: String },
}

pub struct IntegrityVerifier<'a> {
    expected: &'a ExpectedDigest,
    chunk_size: ChunkSize,
}

impl<'a> IntegrityVerifier<'a> {
    pub fn new(expected: &'a ExpectedDigest, chunk_size: ChunkSize) -> Self {
        Self {
            expected,
            chunk_size,
        }
    }

    /// Hash `path` chunk by chunk; `total` is the remote-reported size used for accounting.
    pub fn verify(
        &self,
        path: &Path,
        total: u64,
        observer: &dyn ProgressObserver,
    ) -> io::Result<Verification> {
        let chunk = self.chunk_size.bytes();
        let mut file = File::open(path)?;
        let mut hasher = self.expected.algorithm().hasher();
        let mut counter = ChunkCounter::new(total, chunk);
        let mut buf = Vec::with_capacity(chunk as usize);

        loop {
            buf.clear();
            let n = (&mut file).take(chunk).read_to_end(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf);

            let transferred = counter.advance();
            let percent = if counter.is_complete() {
                100
            } else {
                ratio_percent(transferred, total)
            };
            observer.on_event(ProgressEvent::Progress(TransferProgress {
                stage: PipelineState::Verifying,
                bytes_transferred: transferred,
                total_bytes: total,
                percent,
            }));
        }

        let actual = hasher.finalize_hex();
        let expected = self.expected.as_hex();
        if actual == expected {
            tracing::info!(algorithm = %self.expected.algorithm(), "digest verified");
            Ok(Verification::Match { digest: actual })
        } else {
            tracing::warn!(expected, actual = %actual, "digest mismatch");
            Ok(Verification::Mismatch {
                expected: expected.to_string(),
                actual,
            })
        }
    }
}
