use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

pub const DEFAULT_UPSTREAM_URL: &str = "https://s3vbl2my95.execute-api.us-east-1.amazonaws.com/prod";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FleetCfg {
    #[serde(default)]
    pub http: HttpCfg,
    #[serde(default)]
    pub upstream: UpstreamCfg,
    #[serde(default)]
    pub health: HealthCfg,
    #[serde(default)]
    pub dashboard: DashboardCfg,
    #[serde(default)]
    pub log: LogCfg,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct HttpCfg {
    pub host: IpAddr,
    pub port: u16,
}
impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
        }
    }
}
impl HttpCfg {
    pub fn bind(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn set_bind(&mut self, addr: SocketAddr) {
        self.host = addr.ip();
        self.port = addr.port();
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct UpstreamCfg {
    pub base_url: String,
    pub timeout_ms: u64,
}
impl Default for UpstreamCfg {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.into(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HealthCfg {
    pub require_upstream: bool,
    pub check_interval_ms: u64,
    pub drain_ms: u64,
}
impl Default for HealthCfg {
    fn default() -> Self {
        Self {
            require_upstream: false,
            check_interval_ms: 5000,
            drain_ms: 500,
        }
    }
}
impl HealthCfg {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn drain(&self) -> Duration {
        Duration::from_millis(self.drain_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardCfg {
    pub refresh_secs: u64,
}
impl Default for DashboardCfg {
    fn default() -> Self {
        Self { refresh_secs: 30 }
    }
}
impl DashboardCfg {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogCfg {
    pub level: String,
}
impl Default for LogCfg {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl FleetCfg {
    pub fn load(path: Option<String>) -> anyhow::Result<Self> {
        Self::from_builder(build_config(path)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = self.upstream.base_url.trim();
        anyhow::ensure!(!url.is_empty(), "upstream.base_url cannot be empty");
        anyhow::ensure!(
            url.starts_with("http://") || url.starts_with("https://"),
            "upstream.base_url must be an http(s) url, got {url}"
        );
        anyhow::ensure!(self.upstream.timeout_ms > 0, "upstream.timeout_ms must be positive");
        anyhow::ensure!(
            self.health.check_interval_ms > 0,
            "health.check_interval_ms must be positive"
        );
        anyhow::ensure!(
            self.dashboard.refresh_secs > 0,
            "dashboard.refresh_secs must be positive"
        );
        Ok(())
    }

    fn from_builder(cfg: config::Config) -> anyhow::Result<Self> {
        Ok(cfg.try_deserialize()?)
    }
}

/// Defaults, then `fleetwatch.toml` (or `path`), then `FLEETWATCH__*`
/// variables, then the bare `PORT` and `API_GATEWAY_URL` variables the
/// deployment scripts set.
fn build_config(path: Option<String>) -> anyhow::Result<config::Config> {
    use config::{Config, Environment, File};
    let mut builder = Config::builder();
    builder = match path {
        Some(path) => builder.add_source(File::with_name(&path)),
        None => builder.add_source(File::with_name("fleetwatch").required(false)),
    };
    builder = builder
        .add_source(Environment::with_prefix("FLEETWATCH").separator("__"))
        .set_override_option("http.port", std::env::var("PORT").ok())?
        .set_override_option("upstream.base_url", std::env::var("API_GATEWAY_URL").ok())?;
    Ok(builder.build()?)
}
