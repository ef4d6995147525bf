//! Terminal pipeline failures.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::archive::ExtractError;
use crate::checksum::DigestAlgorithm;
use crate::remote::ApiError;

/// Coarse failure category reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkUnavailable,
    Transfer,
    IntegrityMismatch,
    Extraction,
    Filesystem,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NetworkUnavailable => "network unavailable",
            ErrorKind::Transfer => "transfer error",
            ErrorKind::IntegrityMismatch => "integrity mismatch",
            ErrorKind::Extraction => "extraction error",
            ErrorKind::Filesystem => "filesystem error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// At least one connectivity probe failed. Expected, not a fault.
    #[error("no internet connection")]
    NetworkUnavailable,
    #[error("download failed: {0}")]
    Transfer(#[from] ApiError),
    /// The fetched file does not match the expected digest. Never retried.
    #[error("security error: {algorithm} digest mismatch (expected {expected}, got {actual})")]
    IntegrityMismatch {
        algorithm: DigestAlgorithm,
        expected: String,
        actual: String,
    },
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    #[error("{action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NetworkUnavailable => ErrorKind::NetworkUnavailable,
            PipelineError::Transfer(_) => ErrorKind::Transfer,
            PipelineError::IntegrityMismatch { .. } => ErrorKind::IntegrityMismatch,
            PipelineError::Extraction(_) => ErrorKind::Extraction,
            PipelineError::Filesystem { .. } => ErrorKind::Filesystem,
        }
    }

    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}
