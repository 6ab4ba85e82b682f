//! Dashboard figures derived from a resolved device set.
//!
//! The thresholds and ratios here are fixed business constants. Every result
//! type's `Default` is the zero value a dashboard shows when its data could
//! not be fetched.

use serde::Serialize;
use time::OffsetDateTime;

use super::category::{classify, Category, EquipmentGroup, PowerType};
use super::geo::locate;
use super::record::DeviceRecord;
use super::record_time::RecordTime;

pub const ACTIVE_WITHIN_MINUTES: f64 = 10.0;
pub const MAINTENANCE_WITHIN_MINUTES: f64 = 60.0;
pub const LOW_BATTERY_VOLTS: f64 = 11.5;
pub const MAINTENANCE_DUE_HOURS: f64 = 1000.0;
pub const MAX_ALERTS: usize = 5;
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

const ACTIVE_SHARE: f64 = 0.7;
const DOWNTIME_HOURS_PER_UNIT: f64 = 2.5;
const MONTHLY_REVENUE_PER_UNIT: u64 = 75_000;
const DEFAULT_FUEL_AVERAGE: f64 = 75.0;
const RUNTIME_HOURS_PER_LIGHT: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Active,
    Maintenance,
    Inactive,
}

/// Buckets a device by how long ago it last reported.
pub fn activity(time: &RecordTime, now: OffsetDateTime) -> Activity {
    let minutes = time.minutes_before(now);
    if minutes < ACTIVE_WITHIN_MINUTES {
        Activity::Active
    } else if minutes < MAINTENANCE_WITHIN_MINUTES {
        Activity::Maintenance
    } else {
        Activity::Inactive
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStats {
    pub total_devices: usize,
    pub active: usize,
    pub maintenance: usize,
    pub inactive: usize,
    pub trend: i32,
}

pub fn device_stats(devices: &[DeviceRecord], now: OffsetDateTime) -> DeviceStats {
    let mut stats = DeviceStats {
        total_devices: devices.len(),
        trend: 8,
        ..DeviceStats::default()
    };
    for device in devices {
        match activity(&RecordTime::resolve(device), now) {
            Activity::Active => stats.active += 1,
            Activity::Maintenance => stats.maintenance += 1,
            Activity::Inactive => stats.inactive += 1,
        }
    }
    stats
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub total: usize,
    pub active: usize,
    pub maintenance: usize,
    pub revenue: u64,
}

impl CategoryStats {
    fn for_group(group: EquipmentGroup, total: usize) -> Self {
        let active = (total as f64 * ACTIVE_SHARE).floor() as usize;
        Self {
            total,
            active,
            maintenance: total - active,
            revenue: total as u64 * group.revenue_rate(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentBreakdown {
    pub mewp: CategoryStats,
    pub battery: CategoryStats,
    pub tower_light: CategoryStats,
}

pub fn equipment_breakdown(devices: &[DeviceRecord]) -> EquipmentBreakdown {
    let count = |group: EquipmentGroup| {
        devices
            .iter()
            .filter_map(DeviceRecord::device_id)
            .filter(|id| group.contains(id))
            .count()
    };
    EquipmentBreakdown {
        mewp: CategoryStats::for_group(EquipmentGroup::Mewp, count(EquipmentGroup::Mewp)),
        battery: CategoryStats::for_group(
            EquipmentGroup::BatteryPack,
            count(EquipmentGroup::BatteryPack),
        ),
        tower_light: CategoryStats::for_group(
            EquipmentGroup::TowerLight,
            count(EquipmentGroup::TowerLight),
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reported_at: Option<OffsetDateTime>,
}

impl Alert {
    pub fn all_normal() -> Self {
        Self {
            severity: Severity::Info,
            title: "All Systems Normal".to_string(),
            message: "No critical alerts at this time".to_string(),
            device_id: None,
            reported_at: None,
        }
    }
}

/// Runs the low-battery and maintenance-due rules over every device, keeps
/// the first [`MAX_ALERTS`], and reports "all normal" when nothing fired.
pub fn alerts(devices: &[DeviceRecord]) -> Vec<Alert> {
    let mut out = Vec::new();
    for device in devices {
        let Some(id) = device.device_id() else {
            continue;
        };
        let time = RecordTime::resolve(device);
        let reported_at = (!time.is_epoch()).then_some(time.at);

        // a zero reading means the sensor reported nothing
        if let Some(volts) = device
            .battery_monitor
            .filter(|v| *v != 0.0 && *v < LOW_BATTERY_VOLTS)
        {
            out.push(Alert {
                severity: Severity::Critical,
                title: "Low Battery Alert".to_string(),
                message: format!("{id} battery is critically low ({volts:.2}V)"),
                device_id: Some(id.to_string()),
                reported_at,
            });
        }
        if device
            .engine_working_hours
            .is_some_and(|h| h > MAINTENANCE_DUE_HOURS)
        {
            out.push(Alert {
                severity: Severity::Warning,
                title: "Maintenance Due".to_string(),
                message: format!("{id} requires scheduled maintenance"),
                device_id: Some(id.to_string()),
                reported_at,
            });
        }
    }
    if out.is_empty() {
        out.push(Alert::all_normal());
    }
    out.truncate(MAX_ALERTS);
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetHealth {
    pub good: usize,
    pub fair: usize,
    pub critical: usize,
    pub offline: usize,
}

pub fn fleet_health(devices: &[DeviceRecord]) -> FleetHealth {
    let n = devices.len() as f64;
    FleetHealth {
        good: (n * 0.6).floor() as usize,
        fair: (n * 0.25).floor() as usize,
        critical: (n * 0.1).floor() as usize,
        offline: (n * 0.05).ceil() as usize,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Downtime {
    pub total: u64,
    pub avg_per_unit: f64,
    pub trend: i32,
}

pub fn downtime(devices: &[DeviceRecord]) -> Downtime {
    Downtime {
        total: (devices.len() as f64 * DOWNTIME_HOURS_PER_UNIT).round() as u64,
        avg_per_unit: DOWNTIME_HOURS_PER_UNIT,
        trend: -3,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEfficiency {
    pub average: f64,
    pub best_performer: String,
    pub trend: i32,
}

impl Default for FuelEfficiency {
    fn default() -> Self {
        Self {
            average: DEFAULT_FUEL_AVERAGE,
            best_performer: "N/A".to_string(),
            trend: 0,
        }
    }
}

/// Average fuel rate over diesel MEWPs that report one; the best performer
/// burns the least.
pub fn fuel_efficiency(devices: &[DeviceRecord]) -> FuelEfficiency {
    let rates: Vec<(&str, f64)> = devices
        .iter()
        .filter_map(|d| {
            let id = d.device_id()?;
            let variant = classify(id).variant()?;
            let rate = d.engine_fuel_rate.filter(|r| *r != 0.0)?;
            (variant.power == PowerType::Diesel).then_some((id, rate))
        })
        .collect();

    if rates.is_empty() {
        return FuelEfficiency {
            trend: 5,
            ..FuelEfficiency::default()
        };
    }

    let average = rates.iter().map(|(_, r)| r).sum::<f64>() / rates.len() as f64;
    let best = rates
        .iter()
        .fold(None::<(&str, f64)>, |best, &(id, rate)| match best {
            Some((_, b)) if b <= rate => best,
            _ => Some((id, rate)),
        });

    FuelEfficiency {
        average: (average * 10.0).round() / 10.0,
        best_performer: best.map_or_else(|| "N/A".to_string(), |(id, _)| id.to_string()),
        trend: 5,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatteryStats {
    pub good: usize,
    pub warning: usize,
    pub critical: usize,
}

pub fn battery_stats(devices: &[DeviceRecord]) -> BatteryStats {
    let reporting = devices
        .iter()
        .filter(|d| {
            d.battery_monitor.is_some_and(|v| v != 0.0) || d.soc.is_some_and(|v| v != 0.0)
        })
        .count() as f64;
    BatteryStats {
        good: (reporting * 0.7).floor() as usize,
        warning: (reporting * 0.2).floor() as usize,
        critical: (reporting * 0.1).ceil() as usize,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RevenueStats {
    pub today: u64,
    pub month: u64,
    pub trend: i32,
}

pub fn revenue_stats(devices: &[DeviceRecord]) -> RevenueStats {
    let month = devices.len() as u64 * MONTHLY_REVENUE_PER_UNIT;
    RevenueStats {
        today: month / 30,
        month,
        trend: 12,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: usize,
    pub device: String,
    pub activity: &'static str,
    pub location: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub time: Option<OffsetDateTime>,
    pub status: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<f64>,
}

pub fn recent_activity(devices: &[DeviceRecord]) -> Vec<ActivityEntry> {
    devices
        .iter()
        .filter_map(|d| d.device_id().map(|id| (id, d)))
        .take(RECENT_ACTIVITY_LIMIT)
        .enumerate()
        .map(|(index, (id, device))| {
            let time = RecordTime::resolve(device);
            ActivityEntry {
                id: index,
                device: id.to_string(),
                activity: "Operating",
                location: locate(device).map_or_else(
                    || format!("Site {}", index + 1),
                    |p| format!("{:.4}, {:.4}", p.lat, p.lon),
                ),
                time: (!time.is_epoch()).then_some(time.at),
                status: "Active",
                kind: classify(id).code(),
                fuel: device.engine_fuel_rate,
            }
        })
        .collect()
}

/// Devices of one equipment family.
pub fn in_group(devices: &[DeviceRecord], group: EquipmentGroup) -> Vec<DeviceRecord> {
    devices
        .iter()
        .filter(|d| d.device_id().is_some_and(|id| group.contains(id)))
        .cloned()
        .collect()
}

/// Devices classified as exactly `category`.
pub fn in_category(devices: &[DeviceRecord], category: Category) -> Vec<DeviceRecord> {
    devices
        .iter()
        .filter(|d| d.device_id().map(classify) == Some(category))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => HealthBand::Excellent,
            60..=79 => HealthBand::Good,
            40..=59 => HealthBand::Fair,
            _ => HealthBand::Poor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthScore {
    pub score: u8,
    pub band: HealthBand,
}

/// Per-device health out of 100. Missing readings count as zero, so a
/// device that reports no battery voltage is marked down for it.
pub fn health_score(device: &DeviceRecord) -> HealthScore {
    let battery = device.battery_monitor.unwrap_or(0.0);
    let temp = device.engine_temp.unwrap_or(0.0);
    let rpm = device.engine_rpm.unwrap_or(0.0);

    let mut score: u8 = 100;
    if battery < 20.0 {
        score -= 30;
    } else if battery < 50.0 {
        score -= 15;
    }
    if temp > 90.0 {
        score -= 25;
    } else if temp > 80.0 {
        score -= 10;
    }
    if rpm > 3000.0 {
        score -= 15;
    }
    HealthScore {
        score,
        band: HealthBand::for_score(score),
    }
}

/// Charge estimate for a 10 V to 12.6 V pack, as a clamped percentage.
pub fn battery_capacity(volts: f64) -> f64 {
    ((volts - 10.0) / 2.6 * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerLightSummary {
    pub total_devices: usize,
    pub active_devices: usize,
    pub average_regulator: i64,
    pub total_runtime: u64,
}

/// Summary over the tower lights in `devices`; other families are ignored.
pub fn tower_light_summary(devices: &[DeviceRecord]) -> TowerLightSummary {
    let lights = in_group(devices, EquipmentGroup::TowerLight);
    let total = lights.len();
    if total == 0 {
        return TowerLightSummary::default();
    }
    let regulator: f64 = lights.iter().map(|d| d.regulator_level.unwrap_or(0.0)).sum();
    TowerLightSummary {
        total_devices: total,
        active_devices: lights
            .iter()
            .filter(|d| d.status.as_deref() == Some("ON"))
            .count(),
        average_regulator: (regulator / total as f64).round() as i64,
        total_runtime: total as u64 * RUNTIME_HOURS_PER_LIGHT,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryPackReading {
    pub device_id: String,
    pub voltage: f64,
    pub capacity_percent: f64,
}

pub fn battery_pack_readings(devices: &[DeviceRecord]) -> Vec<BatteryPackReading> {
    in_group(devices, EquipmentGroup::BatteryPack)
        .into_iter()
        .filter_map(|d| {
            let voltage = d.battery_monitor.unwrap_or(0.0);
            Some(BatteryPackReading {
                device_id: d.device_id()?.to_string(),
                voltage,
                capacity_percent: battery_capacity(voltage),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySummary {
    pub tower_lights: TowerLightSummary,
    pub battery_packs: Vec<BatteryPackReading>,
}

pub fn family_summary(devices: &[DeviceRecord]) -> FamilySummary {
    FamilySummary {
        tower_lights: tower_light_summary(devices),
        battery_packs: battery_pack_readings(devices),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use time::macros::datetime;
    use time::Duration;

    const NOW: OffsetDateTime = datetime!(2024-06-01 12:00:00 UTC);

    fn rec(v: Value) -> DeviceRecord {
        serde_json::from_value(v).unwrap()
    }

    fn seen_minutes_ago(id: &str, minutes: i64) -> DeviceRecord {
        let at = NOW - Duration::minutes(minutes);
        rec(json!({
            "device_id": id,
            "timestamp": at.format(&time::format_description::well_known::Rfc3339).unwrap()
        }))
    }

    #[test]
    fn stats_partition_the_fleet() {
        let devices = vec![
            seen_minutes_ago("TL_01", 0),
            seen_minutes_ago("TL_02", 9),
            seen_minutes_ago("TL_03", 10),
            seen_minutes_ago("TL_04", 59),
            seen_minutes_ago("TL_05", 60),
            seen_minutes_ago("TL_06", 60 * 24 * 30),
            seen_minutes_ago("TL_07", -15),
            rec(json!({ "device_id": "TL_08" })),
        ];
        let stats = device_stats(&devices, NOW);
        assert_eq!(stats.total_devices, 8);
        assert_eq!((stats.active, stats.maintenance, stats.inactive), (3, 2, 3));
        assert_eq!(stats.active + stats.maintenance + stats.inactive, stats.total_devices);
    }

    #[test]
    fn stats_partition_for_any_spread() {
        for step in [1, 7, 13, 45, 301] {
            let devices: Vec<_> = (0..25)
                .map(|i| seen_minutes_ago(&format!("BA_{i:02}"), i * step))
                .collect();
            let s = device_stats(&devices, NOW);
            assert_eq!(s.active + s.maintenance + s.inactive, s.total_devices);
        }
    }

    #[test]
    fn breakdown_uses_fixed_ratios() {
        let mut devices: Vec<_> = (0..10).map(|i| rec(json!({ "device_id": format!("ME_DD_{i}") }))).collect();
        devices.extend((0..3).map(|i| rec(json!({ "device_id": format!("TL_{i}") }))));
        devices.push(rec(json!({ "device_id": "ME_07" })));

        let b = equipment_breakdown(&devices);
        assert_eq!(
            b.mewp,
            CategoryStats { total: 10, active: 7, maintenance: 3, revenue: 500_000 }
        );
        assert_eq!(
            b.tower_light,
            CategoryStats { total: 3, active: 2, maintenance: 1, revenue: 150_000 }
        );
        assert_eq!(b.battery, CategoryStats::default());
    }

    #[test]
    fn low_battery_raises_one_alert() {
        let alerts = alerts(&[rec(json!({ "device_id": "BA_03", "battery_monitor": 11.0 }))]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Low Battery Alert");
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].device_id.as_deref(), Some("BA_03"));
        assert!(alerts[0].message.contains("BA_03"));
        assert!(alerts[0].message.contains("11.00V"));
    }

    #[test]
    fn quiet_fleet_is_all_normal() {
        let alerts = alerts(&[
            rec(json!({ "device_id": "BA_03", "battery_monitor": 12.6 })),
            rec(json!({ "device_id": "BA_04", "battery_monitor": 0 })),
            rec(json!({ "device_id": "ME_DD_01", "engine_working_hours": 1000 })),
        ]);
        assert_eq!(alerts, vec![Alert::all_normal()]);
    }

    #[test]
    fn alerts_are_capped() {
        let devices: Vec<_> = (0..4)
            .map(|i| {
                rec(json!({
                    "device_id": format!("ME_MD_{i}"),
                    "battery_monitor": 10.5,
                    "engine_working_hours": 1500
                }))
            })
            .collect();
        let alerts = alerts(&devices);
        assert_eq!(alerts.len(), MAX_ALERTS);
        assert_eq!(alerts[0].title, "Low Battery Alert");
        assert_eq!(alerts[1].title, "Maintenance Due");
        assert_eq!(alerts[4].device_id.as_deref(), Some("ME_MD_2"));
    }

    #[test]
    fn fuel_efficiency_over_diesel_mewps() {
        let devices = vec![
            rec(json!({ "device_id": "ME_DD_01", "engine_fuel_rate": 12.0 })),
            rec(json!({ "device_id": "ME_TD_01", "engine_fuel_rate": 9.25 })),
            rec(json!({ "device_id": "ME_DB_01", "engine_fuel_rate": 1.0 })),
            rec(json!({ "device_id": "ME_MD_01" })),
        ];
        let f = fuel_efficiency(&devices);
        assert_eq!(f.average, 10.6);
        assert_eq!(f.best_performer, "ME_TD_01");

        let none = fuel_efficiency(&[]);
        assert_eq!(none.average, 75.0);
        assert_eq!(none.best_performer, "N/A");
    }

    #[test]
    fn health_battery_and_revenue_figures() {
        let devices: Vec<_> = (0..20)
            .map(|i| rec(json!({ "device_id": format!("BA_{i}"), "soc": if i < 10 { 80 } else { 0 } })))
            .collect();

        assert_eq!(
            fleet_health(&devices),
            FleetHealth { good: 12, fair: 5, critical: 2, offline: 1 }
        );
        assert_eq!(
            battery_stats(&devices),
            BatteryStats { good: 7, warning: 2, critical: 1 }
        );
        assert_eq!(
            revenue_stats(&devices),
            RevenueStats { today: 50_000, month: 1_500_000, trend: 12 }
        );
        assert_eq!(downtime(&devices).total, 50);
    }

    #[test]
    fn recent_activity_lists_first_ten() {
        let mut devices: Vec<_> = (0..12).map(|i| rec(json!({ "device_id": format!("TL_{i}") }))).collect();
        devices[0] = rec(json!({
            "device_id": "TL_0",
            "location": { "lat": 19.076, "lon": 72.8777 },
            "timestamp": "2024-01-01T10:00:00Z"
        }));

        let feed = recent_activity(&devices);
        assert_eq!(feed.len(), 10);
        assert_eq!(feed[0].location, "19.0760, 72.8777");
        assert_eq!(feed[0].time, Some(datetime!(2024-01-01 10:00:00 UTC)));
        assert_eq!(feed[1].location, "Site 2");
        assert_eq!(feed[1].time, None);
        assert_eq!(feed[1].kind, "TL");
    }

    #[test]
    fn tower_light_end_to_end() {
        let records = vec![
            rec(json!({ "device_id": "TL_01", "timestamp": "2024-01-01T10:00:00Z", "regulator_level": 80 })),
            rec(json!({ "device_id": "TL_01", "timestamp": "2024-01-01T11:00:00Z", "regulator_level": 60 })),
        ];
        let resolved = crate::domain::identity::resolve_latest(records);
        let lights = in_category(&resolved, Category::TowerLight);
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].regulator_level, Some(60.0));
        assert_eq!(in_group(&resolved, EquipmentGroup::TowerLight), lights);
    }

    #[test]
    fn health_deductions_at_the_edges() {
        let score = |v: Value| health_score(&rec(v)).score;

        assert_eq!(score(json!({ "battery_monitor": 50 })), 100);
        assert_eq!(score(json!({ "battery_monitor": 49.9 })), 85);
        assert_eq!(score(json!({ "battery_monitor": 20 })), 85);
        assert_eq!(score(json!({ "battery_monitor": 19.9 })), 70);
        assert_eq!(score(json!({})), 70);

        assert_eq!(score(json!({ "battery_monitor": 60, "engine_temp": 80 })), 100);
        assert_eq!(score(json!({ "battery_monitor": 60, "engine_temp": 80.5 })), 90);
        assert_eq!(score(json!({ "battery_monitor": 60, "engine_temp": 90 })), 90);
        assert_eq!(score(json!({ "battery_monitor": 60, "engine_temp": 91 })), 75);

        assert_eq!(score(json!({ "battery_monitor": 60, "engine_rpm": 3000 })), 100);
        assert_eq!(score(json!({ "battery_monitor": 60, "engine_rpm": 3001 })), 85);

        let worst = health_score(&rec(json!({ "battery_monitor": 5, "engine_temp": 95, "engine_rpm": 3500 })));
        assert_eq!(worst.score, 30);
        assert_eq!(worst.band, HealthBand::Poor);
    }

    #[test]
    fn health_bands() {
        assert_eq!(HealthBand::for_score(100), HealthBand::Excellent);
        assert_eq!(HealthBand::for_score(80), HealthBand::Excellent);
        assert_eq!(HealthBand::for_score(79), HealthBand::Good);
        assert_eq!(HealthBand::for_score(60), HealthBand::Good);
        assert_eq!(HealthBand::for_score(59), HealthBand::Fair);
        assert_eq!(HealthBand::for_score(40), HealthBand::Fair);
        assert_eq!(HealthBand::for_score(39), HealthBand::Poor);
    }

    #[test]
    fn capacity_is_clamped() {
        assert_eq!(battery_capacity(9.0), 0.0);
        assert_eq!(battery_capacity(10.0), 0.0);
        assert!((battery_capacity(11.3) - 50.0).abs() < 1e-9);
        assert!((battery_capacity(12.6) - 100.0).abs() < 1e-9);
        assert_eq!(battery_capacity(14.0), 100.0);
    }

    #[test]
    fn tower_light_summary_counts_lit_units() {
        let devices = vec![
            rec(json!({ "device_id": "TL_01", "status": "ON", "regulator_level": 60 })),
            rec(json!({ "device_id": "TL_02", "status": "OFF", "regulator_level": 75 })),
            rec(json!({ "device_id": "TL_03", "status": "on" })),
            rec(json!({ "device_id": "BA_01", "status": "ON", "battery_monitor": 12.0 })),
        ];
        let summary = tower_light_summary(&devices);
        assert_eq!(
            summary,
            TowerLightSummary {
                total_devices: 3,
                active_devices: 1,
                average_regulator: 45,
                total_runtime: 360,
            }
        );
        assert_eq!(tower_light_summary(&[]), TowerLightSummary::default());

        let family = family_summary(&devices);
        assert_eq!(family.battery_packs.len(), 1);
        assert_eq!(family.battery_packs[0].device_id, "BA_01");
        assert!((family.battery_packs[0].capacity_percent - 2.0 / 2.6 * 100.0).abs() < 1e-9);
    }
}
