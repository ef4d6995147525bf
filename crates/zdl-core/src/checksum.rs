//! Streaming file digests (MD5 or SHA-256), lower-case hex.

use anyhow::{Context, Result};
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithms accepted for integrity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// What the remote API publishes as `md5Checksum`.
    Md5,
    Sha256,
}

impl DigestAlgorithm {
    /// Infer the algorithm from a hex digest length.
    pub fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(DigestAlgorithm::Md5),
            64 => Some(DigestAlgorithm::Sha256),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }

    pub(crate) fn hasher(self) -> StreamDigest {
        match self {
            DigestAlgorithm::Md5 => StreamDigest::Md5(Md5::new()),
            DigestAlgorithm::Sha256 => StreamDigest::Sha256(Sha256::new()),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cumulative digest fed chunk by chunk.
pub(crate) enum StreamDigest {
    Md5(Md5),
    Sha256(Sha256),
}

impl StreamDigest {
    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            StreamDigest::Md5(h) => h.update(data),
            StreamDigest::Sha256(h) => h.update(data),
        }
    }

    pub(crate) fn finalize_hex(self) -> String {
        match self {
            StreamDigest::Md5(h) => hex::encode(h.finalize()),
            StreamDigest::Sha256(h) => hex::encode(h.finalize()),
        }
    }
}

/// Compute the digest of a file and return it as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large files.
pub fn digest_path(path: &Path, algorithm: DigestAlgorithm) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = algorithm.hasher();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize_hex())
}
