use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::aggregate::{activity, battery_capacity, health_score, Activity, HealthScore};
use crate::domain::{describe, Category, DeviceInfo, DeviceRecord, RecordTime};

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct FleetQuery {
    /// `mewp`, `tower-light` or `battery-pack`.
    #[serde(default)]
    pub category: Option<String>,
    /// MEWP variant code such as `DB`.
    #[serde(default)]
    pub variant: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A resolved device as the fleet views return it. The feed record is
/// nested under `record` so its keys never shadow the derived ones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetDevice {
    pub info: DeviceInfo,
    pub last_seen: RecordTime,
    pub activity: Activity,
    pub health: HealthScore,
    /// Battery packs only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_percent: Option<f64>,
    pub record: DeviceRecord,
}

impl FleetDevice {
    pub fn new(record: DeviceRecord, now: OffsetDateTime) -> Self {
        let last_seen = RecordTime::resolve(&record);
        let info = describe(record.device_id().unwrap_or_default());
        let capacity_percent = (info.category == Category::BatteryPack)
            .then(|| battery_capacity(record.battery_monitor.unwrap_or(0.0)));
        Self {
            info,
            last_seen,
            activity: activity(&last_seen, now),
            health: health_score(&record),
            capacity_percent,
            record,
        }
    }
}
