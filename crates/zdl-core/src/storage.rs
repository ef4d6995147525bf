//! Destination folder and archive file lifecycle.
//!
//! The workspace owns exactly what the run created: the destination folder
//! (which must not exist beforehand) and the archive file inside it.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::job::DownloadJob;

#[derive(Debug)]
pub struct JobWorkspace {
    folder: PathBuf,
    archive: PathBuf,
}

impl JobWorkspace {
    /// Create `base/folder_out` and an empty `file_out` inside it.
    /// Fails if the folder already exists; if the file cannot be created the
    /// fresh folder is removed again before returning the error.
    pub fn create(base: &Path, job: &DownloadJob) -> io::Result<(Self, File)> {
        let folder = base.join(job.folder_out());
        let archive = folder.join(job.file_out());

        fs::create_dir(&folder)?;
        let file = match File::options()
            .write(true)
            .create_new(true)
            .open(&archive)
        {
            Ok(f) => f,
            Err(e) => {
                let _ = fs::remove_dir(&folder);
                return Err(e);
            }
        };
        tracing::debug!(folder = %folder.display(), "created destination folder");
        Ok((Self { folder, archive }, file))
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    /// Remove the archive file once its entries have been extracted.
    pub fn remove_archive(&self) -> io::Result<()> {
        fs::remove_file(&self.archive)
    }

    /// Best-effort removal of a partial archive; errors are logged, never returned.
    /// Already extracted entries are left in place.
    pub fn discard_partial(&self) {
        if let Err(e) = fs::remove_file(&self.archive) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.archive.display(), error = %e, "could not remove partial download");
            }
        }
    }

    /// Best-effort removal of everything the run created (archive and the
    /// then-empty folder). Used when the run stops before fetching.
    pub fn discard_all(self) {
        self.discard_partial();
        if let Err(e) = fs::remove_dir(&self.folder) {
            tracing::warn!(path = %self.folder.display(), error = %e, "could not remove destination folder");
        }
    }
}
