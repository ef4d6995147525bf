//! Byte accounting and percent computation shared by the fetch and verify stages.

use crate::pipeline::PipelineState;

/// Snapshot of a running stage, delivered with every `Progress` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub stage: PipelineState,
    /// Bytes accounted so far (see `ChunkCounter`).
    pub bytes_transferred: u64,
    /// Remote-reported object size; fixed for the whole run.
    pub total_bytes: u64,
    /// 0..=100.
    pub percent: u8,
}

/// Running byte counter that advances one chunk at a time.
///
/// Each step adds exactly one chunk, except when one chunk or less remains:
/// then the counter snaps to the total, so the sum of advances always ends
/// exactly at `total` regardless of divisibility.
#[derive(Debug, Clone)]
pub struct ChunkCounter {
    transferred: u64,
    total: u64,
    chunk: u64,
}

impl ChunkCounter {
    pub fn new(total: u64, chunk: u64) -> Self {
        Self {
            transferred: 0,
            total,
            chunk,
        }
    }

    /// Account for one completed chunk and return the new running total.
    pub fn advance(&mut self) -> u64 {
        if self.total.saturating_sub(self.transferred) <= self.chunk {
            self.transferred = self.total;
        } else {
            self.transferred += self.chunk;
        }
        self.transferred
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.transferred >= self.total
    }
}

/// Percent from a fraction in [0, 1], rounded down.
pub fn fraction_percent(fraction: f64) -> u8 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction * 100.0).floor().clamp(0.0, 100.0) as u8
}

/// Percent of `done` over `total`, rounded down (100 for an empty total).
pub fn ratio_percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = u128::from(done) * 100 / u128::from(total);
    pct.min(100) as u8
}
