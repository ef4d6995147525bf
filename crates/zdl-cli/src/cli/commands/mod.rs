//! CLI command handlers, one file per command.

mod check;
mod checksum;
mod get;

pub use check::run_check;
pub use checksum::run_checksum;
pub use get::{run_get, GetOptions};
