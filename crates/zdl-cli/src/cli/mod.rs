//! CLI for the zdl fetch-verify-extract tool.

mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use zdl_core::config;

use commands::{run_check, run_checksum, run_get, GetOptions};

/// Top-level CLI for zdl.
#[derive(Debug, Parser)]
#[command(name = "zdl")]
#[command(about = "zdl: fetch a remote archive in chunks, verify it, extract it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download, verify and extract one remote archive.
    Get {
        /// Remote object identifier.
        #[arg(short = 'I', long)]
        id: Option<String>,

        /// Destination folder to create and extract into.
        #[arg(short = 'F', long)]
        folder_out: Option<String>,

        /// Name of the downloaded archive inside the destination folder.
        #[arg(short = 'f', long)]
        file_out: Option<String>,

        /// Expected hex digest of the archive (32 chars = MD5, 64 = SHA-256).
        #[arg(short = 'C', long = "md5", visible_alias = "digest", value_name = "HEX")]
        digest: Option<String>,

        /// Archive password.
        #[arg(short = 'P', long = "pkey", value_name = "PASSWORD")]
        password: Option<String>,

        /// Chunk size in megabytes (1-10).
        #[arg(short = 'S', long, value_name = "MB", value_parser = clap::value_parser!(u32).range(1..=10))]
        chunk_size: Option<u32>,

        /// JSON job file; when given, the job flags above are ignored.
        #[arg(long, value_name = "PATH")]
        job: Option<PathBuf>,

        /// Base directory for the destination folder (default: config, then current dir).
        #[arg(long, value_name = "PATH")]
        dir: Option<PathBuf>,
    },

    /// Check connectivity to the configured endpoints.
    Check,

    /// Compute SHA-256 (or MD5) of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,

        /// Use MD5 instead of SHA-256.
        #[arg(long)]
        md5: bool,
    },
}

impl CliCommand {
    /// Parse arguments, run the command, and return the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                id,
                folder_out,
                file_out,
                digest,
                password,
                chunk_size,
                job,
                dir,
            } => {
                let opts = GetOptions {
                    id,
                    folder_out,
                    file_out,
                    digest,
                    password,
                    chunk_size,
                    job,
                    dir,
                };
                run_get(&cfg, opts).await
            }
            CliCommand::Check => run_check(&cfg).await,
            CliCommand::Checksum { path, md5 } => {
                run_checksum(&path, md5).await?;
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
