//! Terminal rendering of pipeline events: one line per state, one
//! self-overwriting progress line per stage.

use std::io::{self, Write};
use zdl_core::pipeline::{PipelineState, ProgressEvent};
use zdl_core::progress::TransferProgress;

const MEGABYTE: f64 = 1_000_000.0;

/// "Downloading file 1.0 / 2.5 MB  40%"
pub fn format_progress(p: &TransferProgress) -> String {
    format!(
        "{} {:.1} / {:.1} MB  {}%",
        p.stage.label(),
        p.bytes_transferred as f64 / MEGABYTE,
        p.total_bytes as f64 / MEGABYTE,
        p.percent
    )
}

#[derive(Debug, Default)]
pub struct Renderer {
    /// A progress line is open and needs a newline before the next state line.
    open_line: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::StateChanged { state, message } => {
                self.close_line();
                match state {
                    // No byte accounting while extracting; show it as busy.
                    PipelineState::Extracting => println!("{}...", message),
                    _ => println!("{}", message),
                }
            }
            ProgressEvent::Progress(p) => {
                print!("\r{}", format_progress(p));
                let _ = io::stdout().flush();
                self.open_line = true;
            }
            ProgressEvent::SizeKnown(size) => {
                tracing::debug!(size, "remote size known");
            }
            ProgressEvent::ConnectivityResult(online) => {
                if !online {
                    self.close_line();
                    println!("No connection to the remote service.");
                }
            }
            ProgressEvent::Failed { kind, message } => {
                self.close_line();
                eprintln!("zdl: {} ({})", message, kind);
            }
        }
    }

    pub fn finish(&mut self) {
        self.close_line();
    }

    fn close_line(&mut self) {
        if self.open_line {
            println!();
            self.open_line = false;
        }
    }
}
