//! Connectivity preflight: TCP reachability of a fixed set of endpoints.
//!
//! The check passes only if every endpoint accepts a connection within the
//! timeout. There are no retries; a negative answer is final for the run.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ConnectivityConfig;

/// Two public resolvers plus the API host.
pub const DEFAULT_ENDPOINTS: [&str; 3] = ["1.1.1.1:53", "8.8.8.8:53", "www.googleapis.com:443"];

#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    endpoints: Vec<String>,
    timeout: Duration,
}

impl ConnectivityProbe {
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> Self {
        Self { endpoints, timeout }
    }

    pub fn from_config(cfg: &ConnectivityConfig) -> Self {
        Self::new(cfg.endpoints.clone(), Duration::from_secs(cfg.timeout_secs))
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// True only if all endpoints are reachable.
    pub fn check(&self) -> bool {
        self.endpoints.iter().all(|endpoint| self.probe(endpoint))
    }

    /// One probe: resolve `host:port` and connect to any of its addresses.
    fn probe(&self, endpoint: &str) -> bool {
        let addrs: Vec<SocketAddr> = match endpoint.to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                tracing::debug!(endpoint, error = %e, "probe: resolve failed");
                return false;
            }
        };
        for addr in &addrs {
            match TcpStream::connect_timeout(addr, self.timeout) {
                Ok(stream) => {
                    drop(stream);
                    tracing::debug!(endpoint, %addr, "probe: reachable");
                    return true;
                }
                Err(e) => tracing::debug!(endpoint, %addr, error = %e, "probe: connect failed"),
            }
        }
        tracing::info!(endpoint, "probe: unreachable");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn listening() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (listener, addr)
    }

    /// An address nothing listens on: bind, read the port, close.
    fn closed_port() -> String {
        let (listener, addr) = listening();
        drop(listener);
        addr
    }

    fn probe(endpoints: Vec<String>) -> ConnectivityProbe {
        ConnectivityProbe::new(endpoints, Duration::from_secs(2))
    }

    #[test]
    fn all_reachable() {
        let (_a, addr_a) = listening();
        let (_b, addr_b) = listening();
        assert!(probe(vec![addr_a, addr_b]).check());
    }

    #[test]
    fn one_unreachable_fails_whole_check() {
        let (_a, addr_a) = listening();
        let (_b, addr_b) = listening();
        let dead = closed_port();
        assert!(!probe(vec![addr_a.clone(), dead.clone(), addr_b.clone()]).check());
        assert!(!probe(vec![addr_a, addr_b, dead]).check());
    }

    #[test]
    fn unresolvable_host_fails() {
        let (_a, addr_a) = listening();
        assert!(!probe(vec![addr_a, "no-such-host.invalid:80".to_string()]).check());
    }

    #[test]
    fn from_config_uses_defaults() {
        let p = ConnectivityProbe::from_config(&ConnectivityConfig::default());
        assert_eq!(p.endpoints().len(), DEFAULT_ENDPOINTS.len());
        assert_eq!(p.timeout, Duration::from_secs(5));
    }
}
