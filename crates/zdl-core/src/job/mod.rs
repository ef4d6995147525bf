//! Download job description: what to fetch, where to put it, how to check it.
//!
//! A `DownloadJob` is built once per run (from CLI flags or a job file) and is
//! immutable afterwards; every pipeline stage reads its parameters from it.

mod file;

pub use file::JobFile;

use std::fmt;
use std::path::{Component, Path};

use crate::checksum::DigestAlgorithm;

/// One megabyte as used by the remote API's chunked download (decimal).
pub const MEGABYTE: u64 = 1_000_000;

/// Smallest and largest accepted chunk size, in megabytes.
pub const MIN_CHUNK_MB: u32 = 1;
pub const MAX_CHUNK_MB: u32 = 10;

/// Errors raised while assembling a job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("chunk size must be between {min} and {max} MB, got {0}", min = MIN_CHUNK_MB, max = MAX_CHUNK_MB)]
    ChunkSize(u32),
    #[error("digest must be 32 (MD5) or 64 (SHA-256) hex characters, got {0:?}")]
    Digest(String),
    #[error("missing required field `{0}`")]
    Missing(&'static str),
    #[error("`{field}` must be a plain file or folder name, got {value:?}")]
    InvalidName { field: &'static str, value: String },
}

/// Chunk size used for both fetching and verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSize(u32);

impl ChunkSize {
    pub fn from_megabytes(mb: u32) -> Result<Self, JobError> {
        if (MIN_CHUNK_MB..=MAX_CHUNK_MB).contains(&mb) {
            Ok(Self(mb))
        } else {
            Err(JobError::ChunkSize(mb))
        }
    }

    pub fn megabytes(self) -> u32 {
        self.0
    }

    pub fn bytes(self) -> u64 {
        u64::from(self.0) * MEGABYTE
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self(MIN_CHUNK_MB)
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MB", self.0)
    }
}

/// Expected digest of the fetched file, lower-case hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedDigest {
    algorithm: DigestAlgorithm,
    hex: String,
}

impl ExpectedDigest {
    /// Parse a hex digest; the algorithm is inferred from its length.
    pub fn parse(value: &str) -> Result<Self, JobError> {
        let hex = value.trim().to_ascii_lowercase();
        let algorithm = DigestAlgorithm::from_hex_len(hex.len())
            .filter(|_| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| JobError::Digest(value.to_string()))?;
        Ok(Self { algorithm, hex })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn as_hex(&self) -> &str {
        &self.hex
    }
}

/// Immutable description of a single run.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    object_id: String,
    file_out: String,
    folder_out: String,
    digest: Option<ExpectedDigest>,
    password: Option<String>,
    chunk_size: ChunkSize,
}

impl DownloadJob {
    pub fn builder(object_id: impl Into<String>) -> DownloadJobBuilder {
        DownloadJobBuilder {
            object_id: object_id.into(),
            file_out: None,
            folder_out: None,
            digest: None,
            password: None,
            chunk_size: ChunkSize::default(),
        }
    }

    /// Remote object identifier.
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Name of the archive file written inside the destination folder.
    pub fn file_out(&self) -> &str {
        &self.file_out
    }

    /// Destination folder name; must not exist when the run starts.
    pub fn folder_out(&self) -> &str {
        &self.folder_out
    }

    /// Expected digest; `None` skips verification.
    pub fn digest(&self) -> Option<&ExpectedDigest> {
        self.digest.as_ref()
    }

    /// Archive password; `None` opens the archive without one.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }
}

pub struct DownloadJobBuilder {
    object_id: String,
    file_out: Option<String>,
    folder_out: Option<String>,
    digest: Option<String>,
    password: Option<String>,
    chunk_size: ChunkSize,
}

impl DownloadJobBuilder {
    pub fn file_out(mut self, name: impl Into<String>) -> Self {
        self.file_out = Some(name.into());
        self
    }

    pub fn folder_out(mut self, name: impl Into<String>) -> Self {
        self.folder_out = Some(name.into());
        self
    }

    /// Expected digest; an empty string means "do not verify".
    pub fn digest(mut self, hex: impl Into<String>) -> Self {
        self.digest = Some(hex.into());
        self
    }

    /// Archive password; an empty string means "no password".
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn chunk_size(mut self, chunk_size: ChunkSize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn build(self) -> Result<DownloadJob, JobError> {
        let object_id = self.object_id.trim().to_string();
        if object_id.is_empty() {
            return Err(JobError::Missing("id"));
        }
        let file_out = required_name("file_out", self.file_out)?;
        let folder_out = required_name("folder_out", self.folder_out)?;
        let digest = match self.digest.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(hex) => Some(ExpectedDigest::parse(hex)?),
        };
        let password = self.password.filter(|p| !p.is_empty());

        Ok(DownloadJob {
            object_id,
            file_out,
            folder_out,
            digest,
            password,
            chunk_size: self.chunk_size,
        })
    }
}

fn required_name(field: &'static str, value: Option<String>) -> Result<String, JobError> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(JobError::Missing(field));
    }
    let mut components = Path::new(&value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(value),
        _ => Err(JobError::InvalidName { field, value }),
    }
}
