//! `zdl check`: run the connectivity probe on its own.

use anyhow::Result;
use zdl_core::config::ZdlConfig;
use zdl_core::connectivity::ConnectivityProbe;

use super::get::EXIT_NO_CONNECTIVITY;

pub async fn run_check(cfg: &ZdlConfig) -> Result<i32> {
    let probe = ConnectivityProbe::from_config(&cfg.connectivity);
    let endpoints = probe.endpoints().join(", ");
    let online = tokio::task::spawn_blocking(move || probe.check()).await?;
    if online {
        println!("online: {}", endpoints);
        Ok(0)
    } else {
        println!("offline: one or more of {} unreachable", endpoints);
        Ok(EXIT_NO_CONNECTIVITY)
    }
}
