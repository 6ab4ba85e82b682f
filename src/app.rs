use std::sync::Arc;
use tokio::sync::watch;

use crate::config::FleetCfg;
use crate::dashboard::DashboardSnapshot;
use crate::feed::DeviceFeed;
use crate::readiness::Readiness;
use crate::service::DeviceService;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<FleetCfg>,
    pub ready: Arc<Readiness>,
    pub feed: Arc<dyn DeviceFeed>,
    pub service: DeviceService,
    pub dashboard: watch::Receiver<Arc<DashboardSnapshot>>,
}

impl AppState {
    pub fn new(
        cfg: Arc<FleetCfg>,
        feed: Arc<dyn DeviceFeed>,
        dashboard: watch::Receiver<Arc<DashboardSnapshot>>,
    ) -> Self {
        Self {
            cfg,
            ready: Arc::new(Readiness::new()),
            service: DeviceService::new(feed.clone()),
            feed,
            dashboard,
        }
    }
}
