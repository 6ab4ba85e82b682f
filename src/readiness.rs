use reqwest::Url;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::config::{FleetCfg, HealthCfg};

pub struct Readiness {
    pub upstream_ok: AtomicBool,
    pub draining: AtomicBool,
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness {
    pub fn new() -> Self {
        Self {
            upstream_ok: AtomicBool::new(false),
            draining: AtomicBool::new(false),
        }
    }

    /// Upstream reachability only gates readiness when the config asks for it.
    pub fn is_ready(&self, cfg: &HealthCfg) -> bool {
        if self.draining.load(Ordering::Relaxed) {
            return false;
        }
        !cfg.require_upstream || self.upstream_ok.load(Ordering::Relaxed)
    }

    pub fn start_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }
}

/// Host and port a TCP check should dial for the upstream base url.
fn check_target(base_url: &str) -> Option<(String, u16)> {
    let url = Url::parse(base_url).ok()?;
    let host = url.host_str()?.to_string();
    let port = url.port_or_known_default()?;
    Some((host, port))
}

pub fn start_readiness_checks(cfg: Arc<FleetCfg>, ready: Arc<Readiness>) {
    let interval = cfg.health.check_interval();
    let Some((host, port)) = check_target(&cfg.upstream.base_url) else {
        warn!(url = %cfg.upstream.base_url, "cannot derive upstream check target");
        return;
    };

    tokio::spawn(async move {
        loop {
            let ok: bool = match tokio::time::timeout(
                interval,
                TcpStream::connect((host.as_str(), port)),
            )
            .await
            {
                Ok(Ok(mut stream)) => {
                    let _ = stream.shutdown().await;
                    true
                }
                _ => false,
            };
            if ok != ready.upstream_ok.swap(ok, Ordering::Relaxed) {
                debug!(host = %host, port, ok, "upstream reachability changed");
            }
            tokio::time::sleep(interval).await;
        }
    });
}
