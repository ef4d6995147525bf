pub mod config;
pub mod logging;

pub mod archive;
pub mod checksum;
pub mod connectivity;
pub mod fetcher;
pub mod job;
pub mod pipeline;
pub mod progress;
pub mod remote;
pub mod storage;
pub mod verify;
