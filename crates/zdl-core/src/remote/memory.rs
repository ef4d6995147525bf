//! In-memory `ObjectSource` for unit tests.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ApiError, ObjectMetadata, ObjectSource, RangeResponse};

pub(crate) struct MemorySource {
    id: String,
    name: String,
    data: Vec<u8>,
    /// Fail every range request after this many have succeeded.
    fail_after: Option<usize>,
    calls: AtomicUsize,
}

impl MemorySource {
    pub(crate) fn new(id: &str, name: &str, data: Vec<u8>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            data,
            fail_after: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    fn check_id(&self, object_id: &str) -> Result<(), ApiError> {
        if object_id == self.id {
            Ok(())
        } else {
            Err(ApiError::Http {
                code: 404,
                message: Some(format!("File not found: {}", object_id)),
            })
        }
    }
}

impl ObjectSource for MemorySource {
    fn metadata(&self, object_id: &str) -> Result<ObjectMetadata, ApiError> {
        self.check_id(object_id)?;
        Ok(ObjectMetadata {
            name: self.name.clone(),
            size: self.data.len() as u64,
        })
    }

    fn fetch_range(
        &self,
        object_id: &str,
        start: u64,
        end: u64,
        sink: &mut dyn Write,
    ) -> Result<RangeResponse, ApiError> {
        self.check_id(object_id)?;
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|n| call >= n) {
            return Err(ApiError::Http {
                code: 500,
                message: Some("backend error".to_string()),
            });
        }
        let total = self.data.len() as u64;
        let start = start.min(total) as usize;
        let end_excl = end.saturating_add(1).min(total) as usize;
        let slice = &self.data[start..end_excl.max(start)];
        sink.write_all(slice).map_err(ApiError::Sink)?;
        Ok(RangeResponse {
            received: slice.len() as u64,
            total,
        })
    }
}
