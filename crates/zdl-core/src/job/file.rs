//! JSON job files (`{"id": ..., "md5": ..., "file_out": ..., "folder_out": ..., "password": ...}`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{ChunkSize, DownloadJob, JobError};

/// Raw job file contents. Empty or null `md5`/`password` mean "absent".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFile {
    pub id: Option<String>,
    pub md5: Option<String>,
    pub file_out: Option<String>,
    pub folder_out: Option<String>,
    pub password: Option<String>,
    /// Chunk size in megabytes; falls back to the caller's default.
    pub chunk_size: Option<u32>,
}

impl JobFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("read job file {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parse job file {}", path.display()))
    }

    pub fn into_job(self, default_chunk: ChunkSize) -> Result<DownloadJob, JobError> {
        let chunk_size = match self.chunk_size {
            Some(mb) => ChunkSize::from_megabytes(mb)?,
            None => default_chunk,
        };
        let mut builder = DownloadJob::builder(self.id.unwrap_or_default()).chunk_size(chunk_size);
        if let Some(name) = self.file_out {
            builder = builder.file_out(name);
        }
        if let Some(name) = self.folder_out {
            builder = builder.folder_out(name);
        }
        if let Some(md5) = self.md5 {
            builder = builder.digest(md5);
        }
        if let Some(password) = self.password {
            builder = builder.password(password);
        }
        builder.build()
    }
}
