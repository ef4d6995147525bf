//! Integration test: local Drive-like server, real curl client, full pipeline run.
//!
//! Serves a password-protected 7z archive, runs the controller against it with
//! the connectivity check pointed at the same server, and checks the extracted tree.

mod common;

use std::fs;
use std::io::Cursor;
use std::sync::mpsc;
use std::time::Duration;

use common::drive_server::{self, DriveObject, DriveServerOptions};
use sevenz_rust::{AesEncoderOptions, SevenZArchiveEntry, SevenZMethod, SevenZWriter};
use sha2::{Digest, Sha256};
use tempfile::tempdir;
use zdl_core::connectivity::ConnectivityProbe;
use zdl_core::job::{ChunkSize, DownloadJob};
use zdl_core::pipeline::{
    ErrorKind, PipelineController, PipelineState, ProgressEvent, RunOutcome, VERIFIED_MESSAGE,
};
use zdl_core::remote::{DriveClient, ObjectSource};

const ARCHIVE_SIZE: usize = 2_500_000;

/// Encrypted 7z archive zero-padded to `ARCHIVE_SIZE` bytes, so a 1 MB
/// chunk size always takes three requests.
fn fixture_archive(password: &str) -> Vec<u8> {
    let filler: Vec<u8> = (0u8..=250).cycle().take(200_000).collect();
    let mut w = SevenZWriter::new(Cursor::new(Vec::new())).unwrap();
    w.set_content_methods(vec![
        AesEncoderOptions::new(password.into()).into(),
        SevenZMethod::LZMA2.into(),
    ]);

    let mut dir = SevenZArchiveEntry::new();
    dir.name = "assets".to_string();
    dir.is_directory = true;
    w.push_archive_entry(dir, None::<&[u8]>).unwrap();
    for (name, data) in [
        ("assets/notes.txt", &b"first line\nsecond line\n"[..]),
        ("data.bin", &filler[..]),
    ] {
        let mut entry = SevenZArchiveEntry::new();
        entry.name = name.to_string();
        entry.has_stream = true;
        w.push_archive_entry(entry, Some(data)).unwrap();
    }

    let mut archive = w.finish().unwrap().into_inner();
    assert!(archive.len() < ARCHIVE_SIZE);
    archive.resize(ARCHIVE_SIZE, 0);
    archive
}

fn probe_for(addr: &str) -> ConnectivityProbe {
    ConnectivityProbe::new(vec![addr.to_string()], Duration::from_secs(2))
}

fn object(body: Vec<u8>) -> DriveObject {
    DriveObject {
        id: "abc123".to_string(),
        name: "bundle.7z".to_string(),
        body,
    }
}

fn job_for(id: &str) -> DownloadJob {
    DownloadJob::builder(id)
        .file_out("bundle.7z")
        .folder_out("bundle")
        .chunk_size(ChunkSize::from_megabytes(1).unwrap())
        .build()
        .unwrap()
}

fn fetch_progress(events: &[ProgressEvent]) -> Vec<(u64, u8)> {
    events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress(p) if p.stage == PipelineState::Fetching => {
                Some((p.bytes_transferred, p.percent))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn downloads_verifies_and_extracts_over_http() {
    let archive = fixture_archive("hunter2");
    let digest = hex::encode(Sha256::digest(&archive));
    let (base_url, addr) = drive_server::start_with_options(
        object(archive.clone()),
        DriveServerOptions {
            bearer: Some("token-1".to_string()),
        },
    );

    let client = DriveClient::new(&base_url)
        .unwrap()
        .with_access_token("token-1");
    let meta = client.metadata("abc123").unwrap();
    assert_eq!(meta.name, "bundle.7z");
    assert_eq!(meta.size, ARCHIVE_SIZE as u64);

    let job = DownloadJob::builder("abc123")
        .file_out("bundle.7z")
        .folder_out("bundle")
        .digest(digest.to_uppercase())
        .password("hunter2")
        .chunk_size(ChunkSize::from_megabytes(1).unwrap())
        .build()
        .unwrap();

    let base = tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let outcome = PipelineController::new(job, base.path(), client, probe_for(&addr)).run(&tx);
    drop(tx);
    let events: Vec<ProgressEvent> = rx.into_iter().collect();

    let summary = match outcome {
        RunOutcome::Finished(s) => s,
        RunOutcome::Failed(e) => panic!("pipeline failed: {e}"),
    };
    assert!(summary.verified);
    assert_eq!(summary.message, VERIFIED_MESSAGE);
    assert_eq!(summary.extracted.files, 2);
    assert_eq!(summary.extracted.dirs, 1);

    let folder = base.path().join("bundle");
    assert!(!folder.join("bundle.7z").exists());
    assert_eq!(
        fs::read_to_string(folder.join("assets/notes.txt")).unwrap(),
        "first line\nsecond line\n"
    );
    assert_eq!(fs::metadata(folder.join("data.bin")).unwrap().len(), 200_000);

    assert_eq!(
        fetch_progress(&events),
        vec![(1_000_000, 40), (2_000_000, 80), (2_500_000, 100)]
    );
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::StateChanged {
            state: PipelineState::Finished,
            ..
        })
    ));
}

#[test]
fn missing_object_is_a_transfer_failure() {
    let (base_url, addr) = drive_server::start(object(fixture_archive("pw")));
    let client = DriveClient::new(&base_url).unwrap();

    let base = tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let outcome =
        PipelineController::new(job_for("nope"), base.path(), client, probe_for(&addr)).run(&tx);
    drop(tx);

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Transfer));
    assert!(!base.path().join("bundle/bundle.7z").exists());
    let failed = rx
        .into_iter()
        .find_map(|e| match e {
            ProgressEvent::Failed { message, .. } => Some(message),
            _ => None,
        })
        .unwrap();
    assert!(failed.contains("404"), "{failed}");
}

#[test]
fn unsatisfiable_range_writes_nothing() {
    let (base_url, _addr) = drive_server::start(object(Vec::new()));
    let client = DriveClient::new(&base_url).unwrap();

    let mut sink = Vec::<u8>::new();
    let resp = client.fetch_range("abc123", 0, 999_999, &mut sink).unwrap();
    assert_eq!((resp.received, resp.total), (0, 0));
    assert!(sink.is_empty(), "error body leaked into the sink");
}

#[test]
fn empty_object_downloads_then_fails_extraction() {
    let (base_url, addr) = drive_server::start(object(Vec::new()));
    let client = DriveClient::new(&base_url).unwrap();

    let base = tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let outcome =
        PipelineController::new(job_for("abc123"), base.path(), client, probe_for(&addr)).run(&tx);
    drop(tx);
    let events: Vec<ProgressEvent> = rx.into_iter().collect();

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Extraction));
    assert!(events.contains(&ProgressEvent::SizeKnown(0)));
    assert_eq!(fetch_progress(&events), vec![(0, 100)]);
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::StateChanged { state: PipelineState::Extracting, .. })));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Failed {
            kind: ErrorKind::Extraction,
            ..
        })
    ));
    assert!(!base.path().join("bundle/bundle.7z").exists());
}

#[test]
fn rejected_credentials_surface_the_api_message() {
    let (base_url, _addr) = drive_server::start_with_options(
        object(vec![1, 2, 3]),
        DriveServerOptions {
            bearer: Some("right".to_string()),
        },
    );
    let client = DriveClient::new(&base_url)
        .unwrap()
        .with_access_token("wrong");
    let err = client.metadata("abc123").unwrap_err().to_string();
    assert!(err.contains("401"), "{err}");
    assert!(err.contains("invalid authentication credentials"), "{err}");
}

#[test]
fn request_without_credentials_is_rejected() {
    let (base_url, addr) = drive_server::start_with_options(
        object(vec![1, 2, 3]),
        DriveServerOptions {
            bearer: Some("right".to_string()),
        },
    );
    let client = DriveClient::new(&base_url).unwrap();

    let base = tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let outcome =
        PipelineController::new(job_for("abc123"), base.path(), client, probe_for(&addr)).run(&tx);
    drop(tx);

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Transfer));
    let failed = rx
        .into_iter()
        .find_map(|e| match e {
            ProgressEvent::Failed { message, .. } => Some(message),
            _ => None,
        })
        .unwrap();
    assert!(failed.contains("401"), "{failed}");
}
