use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use super::category::{classify, Category};
use super::record::{number_of, DeviceRecord};
use super::record_time::RecordTime;

pub const WORK_ZONE_RADIUS_M: f64 = 2000.0;
const LOW_HEALTH_BELOW: f64 = 20.0;
const LOW_BATTERY_BELOW: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Finds a position in whichever encoding the record uses: top-level
/// `latitude`/`longitude` or `lat`/`lng`, or a `location` object holding
/// `lat` with `lng` or `lon`.
pub fn locate(record: &DeviceRecord) -> Option<GeoPoint> {
    let pair = |lat: Option<&Value>, lon: Option<&Value>| -> Option<GeoPoint> {
        Some(GeoPoint {
            lat: number_of(lat?)?,
            lon: number_of(lon?)?,
        })
    };

    if let Some(p) = pair(record.field("latitude"), record.field("longitude")) {
        return Some(p);
    }
    if let Some(p) = pair(record.field("lat"), record.field("lng")) {
        return Some(p);
    }
    let location = record.field("location")?.as_object()?;
    pair(location.get("lat"), location.get("lng"))
        .or_else(|| pair(location.get("lat"), location.get("lon")))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub device_id: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub status: String,
    pub position: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regulator_level: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    pub id: String,
    pub name: String,
    pub center: GeoPoint,
    pub radius_m: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCounts {
    pub total: usize,
    pub mewp: usize,
    pub tower_light: usize,
    pub battery: usize,
    pub low_health: usize,
    pub low_battery: usize,
    pub maintenance: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetMap {
    pub markers: Vec<MapMarker>,
    pub zones: Vec<Geofence>,
    pub counts: MapCounts,
}

/// Builds the map overlay for a resolved device set. Devices without a
/// usable position are left off the map.
pub fn fleet_map(devices: &[DeviceRecord]) -> FleetMap {
    let markers: Vec<MapMarker> = devices
        .iter()
        .filter_map(|record| {
            let device_id = record.device_id()?;
            let position = locate(record)?;
            let time = RecordTime::resolve(record);
            Some(MapMarker {
                device_id: device_id.to_string(),
                category: classify(device_id),
                status: record.status.clone().unwrap_or_else(|| "active".to_string()),
                position,
                regulator_level: record.regulator_level,
                last_update: (!time.is_epoch()).then_some(time.at),
            })
        })
        .collect();

    let zones = markers
        .first()
        .map(|first| Geofence {
            id: "1".to_string(),
            name: "Work Zone".to_string(),
            center: first.position,
            radius_m: WORK_ZONE_RADIUS_M,
            color: "#4caf50",
        })
        .into_iter()
        .collect();

    let mut counts = MapCounts {
        total: markers.len(),
        ..MapCounts::default()
    };
    for marker in &markers {
        match marker.category {
            Category::Mewp(_) => counts.mewp += 1,
            Category::TowerLight => counts.tower_light += 1,
            Category::BatteryPack => counts.battery += 1,
            Category::Unknown => {}
        }
        let level = marker.regulator_level.unwrap_or(0.0);
        if level < LOW_HEALTH_BELOW {
            counts.low_health += 1;
        } else if level < LOW_BATTERY_BELOW {
            counts.low_battery += 1;
        }
        if marker.status == "maintenance" {
            counts.maintenance += 1;
        }
    }

    FleetMap {
        markers,
        zones,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> DeviceRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn locates_every_encoding() {
        let p = GeoPoint { lat: 19.07, lon: 72.87 };
        for v in [
            json!({ "latitude": 19.07, "longitude": 72.87 }),
            json!({ "lat": "19.07", "lng": "72.87" }),
            json!({ "location": { "lat": 19.07, "lng": 72.87 } }),
            json!({ "location": { "lat": 19.07, "lon": 72.87 } }),
        ] {
            assert_eq!(locate(&rec(v)), Some(p));
        }
    }

    #[test]
    fn rejects_partial_or_garbage_positions() {
        assert_eq!(locate(&rec(json!({ "latitude": 19.07 }))), None);
        assert_eq!(locate(&rec(json!({ "lat": "north", "lng": 1 }))), None);
        assert_eq!(locate(&rec(json!({ "location": "Mumbai" }))), None);
        assert_eq!(locate(&rec(json!({ "location": {} }))), None);
    }

    #[test]
    fn builds_markers_zone_and_counts() {
        let devices = vec![
            rec(json!({ "device_id": "TL_01", "lat": 19.0, "lng": 72.0, "regulator_level": 10 })),
            rec(json!({ "device_id": "TL_02", "lat": 19.1, "lng": 72.1, "regulator_level": 35 })),
            rec(json!({ "device_id": "ME_DD_01", "location": { "lat": 19.2, "lon": 72.2 }, "regulator_level": 90, "status": "maintenance" })),
            rec(json!({ "device_id": "BA_01" })),
        ];

        let map = fleet_map(&devices);
        assert_eq!(map.markers.len(), 3);
        assert_eq!(map.markers[0].status, "active");
        assert_eq!(map.zones.len(), 1);
        assert_eq!(map.zones[0].center, GeoPoint { lat: 19.0, lon: 72.0 });
        assert_eq!(map.zones[0].radius_m, 2000.0);
        assert_eq!(
            map.counts,
            MapCounts {
                total: 3,
                mewp: 1,
                tower_light: 2,
                battery: 0,
                low_health: 1,
                low_battery: 1,
                maintenance: 1,
            }
        );
    }

    #[test]
    fn no_positions_means_no_zone() {
        let map = fleet_map(&[rec(json!({ "device_id": "BA_01" }))]);
        assert!(map.markers.is_empty());
        assert!(map.zones.is_empty());
    }
}
