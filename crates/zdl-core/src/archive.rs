//! Archive extraction (7z container, optionally AES-256 encrypted).
//!
//! Entry-level progress is not reported; callers should treat extraction as
//! a single busy step.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use sevenz_rust::{Password, SevenZArchiveEntry, SevenZReader};

/// Windows attribute bit telling that the high 16 bits hold a unix mode.
#[cfg(unix)]
const UNIX_EXTENSION: u32 = 0x8000;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Corrupt container, unsupported method, or wrong/missing password.
    #[error("{0}")]
    Archive(#[from] sevenz_rust::Error),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("entry {0:?} would be written outside the destination folder")]
    UnsafePath(String),
}

impl ExtractError {
    fn io(path: &Path, source: io::Error) -> Self {
        ExtractError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What an extraction produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub files: usize,
    pub dirs: usize,
    pub bytes: u64,
}

pub struct ArchiveExtractor<'a> {
    password: Option<&'a str>,
}

impl<'a> ArchiveExtractor<'a> {
    /// `None` opens the archive without a password.
    pub fn new(password: Option<&'a str>) -> Self {
        Self { password }
    }

    /// Extract every entry of `archive_path` under `dest`.
    pub fn extract_all(&self, archive_path: &Path, dest: &Path) -> Result<ExtractReport, ExtractError> {
        let password = self.password.map(Password::from).unwrap_or_else(Password::empty);
        let mut reader = SevenZReader::open(archive_path, password)?;
        let mut report = ExtractReport::default();
        let mut failure: Option<ExtractError> = None;

        let walked = reader.for_each_entries(|entry, data| {
            match write_entry(entry, data, dest, &mut report) {
                Ok(()) => Ok(true),
                Err(e) => {
                    let message = e.to_string();
                    failure = Some(e);
                    // Returning false only ends the current block; an error ends the walk.
                    Err(sevenz_rust::Error::other(message))
                }
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        walked?;

        tracing::debug!(files = report.files, dirs = report.dirs, bytes = report.bytes, "extracted archive");
        Ok(report)
    }
}

fn write_entry(
    entry: &SevenZArchiveEntry,
    data: &mut dyn Read,
    dest: &Path,
    report: &mut ExtractReport,
) -> Result<(), ExtractError> {
    let relative = enclosed_name(entry.name())
        .ok_or_else(|| ExtractError::UnsafePath(entry.name().to_string()))?;
    let out_path = dest.join(relative);

    if entry.is_directory() {
        fs::create_dir_all(&out_path).map_err(|e| ExtractError::io(&out_path, e))?;
        report.dirs += 1;
        return Ok(());
    }
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| ExtractError::io(parent, e))?;
    }
    let mut out = File::create(&out_path).map_err(|e| ExtractError::io(&out_path, e))?;
    report.bytes += io::copy(data, &mut out).map_err(|e| ExtractError::io(&out_path, e))?;
    report.files += 1;

    #[cfg(unix)]
    if entry.has_windows_attributes && entry.windows_attributes & UNIX_EXTENSION != 0 {
        use std::os::unix::fs::PermissionsExt;
        let mode = (entry.windows_attributes >> 16) & 0o777;
        if mode != 0 {
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                .map_err(|e| ExtractError::io(&out_path, e))?;
        }
    }
    Ok(())
}

/// Entry name as a relative path that stays under the destination.
/// Backslashes count as separators; absolute paths and `..` are refused.
fn enclosed_name(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    let mut out = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}
