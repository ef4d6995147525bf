//! Checksum command: stream a file's SHA-256 or MD5.

use anyhow::Result;
use std::path::Path;
use zdl_core::checksum::{self, DigestAlgorithm};

/// Compute and print the digest of the given file.
pub async fn run_checksum(path: &Path, md5: bool) -> Result<()> {
    let algorithm = if md5 {
        DigestAlgorithm::Md5
    } else {
        DigestAlgorithm::Sha256
    };
    let owned = path.to_path_buf();
    let digest =
        tokio::task::spawn_blocking(move || checksum::digest_path(&owned, algorithm)).await??;
    println!("{}  {}", digest, path.display());
    Ok(())
}
