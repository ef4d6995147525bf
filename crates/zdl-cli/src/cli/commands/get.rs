//! `zdl get`: assemble a job, run the pipeline on a blocking worker, render its events.

use anyhow::{Context, Result};
use std::path::PathBuf;
use zdl_core::config::ZdlConfig;
use zdl_core::connectivity::ConnectivityProbe;
use zdl_core::job::{ChunkSize, DownloadJob, JobFile};
use zdl_core::pipeline::{ErrorKind, PipelineController, ProgressEvent, RunOutcome};
use zdl_core::remote::DriveClient;

use crate::cli::render::Renderer;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NO_CONNECTIVITY: i32 = 2;
pub const EXIT_INTEGRITY: i32 = 3;

/// Flags of `zdl get`, as parsed.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub id: Option<String>,
    pub folder_out: Option<String>,
    pub file_out: Option<String>,
    pub digest: Option<String>,
    pub password: Option<String>,
    pub chunk_size: Option<u32>,
    pub job: Option<PathBuf>,
    pub dir: Option<PathBuf>,
}

pub async fn run_get(cfg: &ZdlConfig, opts: GetOptions) -> Result<i32> {
    let default_chunk = ChunkSize::from_megabytes(cfg.default_chunk_size_mb)
        .context("invalid default_chunk_size_mb in config")?;
    let job = build_job(&opts, default_chunk)?;
    let base_dir = match opts.dir.clone().or_else(|| cfg.download_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let client = DriveClient::from_config(&cfg.api).context("configure API client")?;
    let probe = ConnectivityProbe::from_config(&cfg.connectivity);
    tracing::info!(
        object = job.object_id(),
        folder = job.folder_out(),
        base = %base_dir.display(),
        chunk = %job.chunk_size(),
        "starting job"
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
    let render_handle = tokio::spawn(async move {
        let mut renderer = Renderer::new();
        while let Some(event) = rx.recv().await {
            renderer.handle(&event);
        }
        renderer.finish();
    });

    let controller = PipelineController::new(job, base_dir, client, probe);
    let outcome = tokio::task::spawn_blocking(move || controller.run(&tx))
        .await
        .context("pipeline worker stopped unexpectedly")?;
    let _ = render_handle.await;

    if let RunOutcome::Finished(summary) = &outcome {
        println!(
            "{} ({}, {} files) -> {}",
            summary.object.name,
            summary.object.size,
            summary.extracted.files,
            summary.folder.display()
        );
    }
    Ok(exit_code(&outcome))
}

/// A job file, when given, takes precedence over every job flag.
fn build_job(opts: &GetOptions, default_chunk: ChunkSize) -> Result<DownloadJob> {
    if let Some(path) = &opts.job {
        tracing::info!(path = %path.display(), "using job file, job flags ignored");
        let job = JobFile::from_path(path)?
            .into_job(default_chunk)
            .with_context(|| format!("invalid job file {}", path.display()))?;
        return Ok(job);
    }

    let chunk_size = match opts.chunk_size {
        Some(mb) => ChunkSize::from_megabytes(mb)?,
        None => default_chunk,
    };
    let mut builder = DownloadJob::builder(opts.id.clone().unwrap_or_default()).chunk_size(chunk_size);
    if let Some(name) = &opts.file_out {
        builder = builder.file_out(name);
    }
    if let Some(name) = &opts.folder_out {
        builder = builder.folder_out(name);
    }
    if let Some(hex) = &opts.digest {
        builder = builder.digest(hex);
    }
    if let Some(password) = &opts.password {
        builder = builder.password(password);
    }
    Ok(builder.build()?)
}

fn exit_code(outcome: &RunOutcome) -> i32 {
    match outcome.error_kind() {
        None => 0,
        Some(ErrorKind::NetworkUnavailable) => EXIT_NO_CONNECTIVITY,
        Some(ErrorKind::IntegrityMismatch) => EXIT_INTEGRITY,
        Some(_) => EXIT_FAILURE,
    }
}
