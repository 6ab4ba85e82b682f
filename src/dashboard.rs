//! Periodically refreshed dashboard snapshot.
//!
//! Every figure is fetched on its own, concurrently with the others. A fetch
//! that fails is logged and replaced by that figure's zero value, so one bad
//! read never blanks the whole dashboard.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::aggregate::{
    alerts, battery_stats, device_stats, downtime, equipment_breakdown, fleet_health,
    fuel_efficiency, recent_activity, revenue_stats, ActivityEntry, Alert, BatteryStats,
    DeviceStats, Downtime, EquipmentBreakdown, FleetHealth, FuelEfficiency, RevenueStats,
};
use crate::error::FleetError;
use crate::metrics::DASHBOARD_GENERATION;
use crate::service::DeviceService;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// 0 until the first refresh completes.
    pub generation: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub refreshed_at: Option<OffsetDateTime>,
    pub stats: DeviceStats,
    pub fuel_efficiency: FuelEfficiency,
    pub fleet_health: FleetHealth,
    pub downtime: Downtime,
    pub equipment_breakdown: EquipmentBreakdown,
    pub battery_stats: BatteryStats,
    pub revenue: RevenueStats,
    pub alerts: Vec<Alert>,
    pub recent_activity: Vec<ActivityEntry>,
}

async fn or_default<T, F>(figure: &'static str, fetch: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, FleetError>>,
{
    match fetch.await {
        Ok(value) => value,
        Err(e) => {
            warn!(figure, error = %e, "dashboard fetch failed, showing defaults");
            T::default()
        }
    }
}

/// One refresh cycle.
pub async fn collect(
    service: &DeviceService,
    generation: u64,
    now: OffsetDateTime,
) -> DashboardSnapshot {
    let (
        stats,
        fuel_efficiency,
        fleet_health,
        downtime,
        equipment_breakdown,
        battery_stats,
        revenue,
        alerts,
        recent_activity,
    ) = tokio::join!(
        or_default("stats", service.with_devices(|d| device_stats(d, now))),
        or_default("fuel_efficiency", service.with_devices(fuel_efficiency)),
        or_default("fleet_health", service.with_devices(fleet_health)),
        or_default("downtime", service.with_devices(downtime)),
        or_default("equipment_breakdown", service.with_devices(equipment_breakdown)),
        or_default("battery_stats", service.with_devices(battery_stats)),
        or_default("revenue", service.with_devices(revenue_stats)),
        or_default("alerts", service.with_devices(alerts)),
        or_default("recent_activity", service.with_devices(recent_activity)),
    );

    DashboardSnapshot {
        generation,
        refreshed_at: Some(now),
        stats,
        fuel_efficiency,
        fleet_health,
        downtime,
        equipment_breakdown,
        battery_stats,
        revenue,
        alerts,
        recent_activity,
    }
}

/// Background task re-collecting the dashboard on a fixed interval.
///
/// Cycles run one after another inside the task, so a published snapshot is
/// always newer than the one before it. The task is aborted when the handle
/// is dropped.
pub struct Refresher {
    rx: watch::Receiver<Arc<DashboardSnapshot>>,
    task: JoinHandle<()>,
}

impl Refresher {
    pub fn spawn(service: DeviceService, every: Duration) -> Self {
        let (tx, rx) = watch::channel(Arc::new(DashboardSnapshot::default()));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut generation = 0u64;

            loop {
                ticker.tick().await;
                generation += 1;
                let snapshot = collect(&service, generation, OffsetDateTime::now_utc()).await;
                DASHBOARD_GENERATION.set(generation as i64);
                debug!(generation, devices = snapshot.stats.total_devices, "dashboard refreshed");
                if tx.send(Arc::new(snapshot)).is_err() {
                    break;
                }
            }
        });
        info!(every_secs = every.as_secs(), "dashboard refresher started");

        Self { rx, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.rx.clone()
    }

    pub fn latest(&self) -> Arc<DashboardSnapshot> {
        self.rx.borrow().clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
