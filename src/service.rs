use std::sync::Arc;

use crate::domain::aggregate::{in_category, in_group};
use crate::domain::identity::{history, latest_for};
use crate::domain::{resolve_latest, Category, DeviceRecord, EquipmentGroup, MewpVariant, Snapshot};
use crate::error::FleetError;
use crate::feed::DeviceFeed;

/// Reads the feed and applies identity resolution and classification.
///
/// Holds no cache: every call fetches a fresh snapshot from the feed.
#[derive(Clone)]
pub struct DeviceService {
    feed: Arc<dyn DeviceFeed>,
}

impl DeviceService {
    pub fn new(feed: Arc<dyn DeviceFeed>) -> Self {
        Self { feed }
    }

    pub async fn snapshot(&self) -> Result<Snapshot, FleetError> {
        Ok(self.feed.snapshot().await?)
    }

    /// One current record per device.
    pub async fn unique_devices(&self) -> Result<Vec<DeviceRecord>, FleetError> {
        Ok(resolve_latest(self.snapshot().await?.records))
    }

    pub async fn devices_in_group(
        &self,
        group: EquipmentGroup,
    ) -> Result<Vec<DeviceRecord>, FleetError> {
        Ok(in_group(&self.unique_devices().await?, group))
    }

    pub async fn devices_of_variant(
        &self,
        variant: MewpVariant,
    ) -> Result<Vec<DeviceRecord>, FleetError> {
        Ok(in_category(
            &self.unique_devices().await?,
            Category::Mewp(Some(variant)),
        ))
    }

    pub async fn device(&self, device_id: &str) -> Result<DeviceRecord, FleetError> {
        let snapshot = self.snapshot().await?;
        latest_for(&snapshot.records, device_id)
            .cloned()
            .ok_or_else(|| FleetError::DeviceNotFound(device_id.to_string()))
    }

    pub async fn history(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<DeviceRecord>, FleetError> {
        let snapshot = self.snapshot().await?;
        Ok(history(&snapshot.records, device_id, limit))
    }

    /// Runs `f` over the resolved device set of a fresh snapshot.
    pub async fn with_devices<T>(
        &self,
        f: impl FnOnce(&[DeviceRecord]) -> T,
    ) -> Result<T, FleetError> {
        let devices = self.unique_devices().await?;
        Ok(f(&devices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::{PowerType, Series};
    use crate::feed::fake::FakeFeed;
    use serde_json::json;

    fn service(feed: FakeFeed) -> (DeviceService, Arc<FakeFeed>) {
        let feed = Arc::new(feed);
        (DeviceService::new(feed.clone()), feed)
    }

    fn fleet() -> serde_json::Value {
        json!({ "items": [
            { "device_id": "TL_01", "timestamp": "2024-01-01T10:00:00Z", "regulator_level": 80 },
            { "device_id": "TL_01", "timestamp": "2024-01-01T11:00:00Z", "regulator_level": 60 },
            { "device_id": "ME_DB_07", "timestamp": "2024-01-01T09:00:00Z", "battery_monitor": 12.4 },
            { "device_id": "ME_TD_02", "timestamp": "2024-01-01T09:30:00Z" },
            { "device_id": "BA_04" },
            { "timestamp": "2024-01-01T08:00:00Z" }
        ]})
    }

    #[tokio::test]
    async fn unique_devices_keeps_the_latest_per_identity() {
        let (svc, _) = service(FakeFeed::serving(fleet()));
        let devices = svc.unique_devices().await.unwrap();

        assert_eq!(devices.len(), 4);
        let tl = devices
            .iter()
            .find(|d| d.device_id() == Some("TL_01"))
            .unwrap();
        assert_eq!(tl.regulator_level, Some(60.0));
    }

    #[tokio::test]
    async fn every_call_reads_the_feed_again() {
        let (svc, feed) = service(FakeFeed::serving(fleet()));
        svc.unique_devices().await.unwrap();
        svc.unique_devices().await.unwrap();
        assert_eq!(feed.calls(), 2);

        *feed.body.lock().unwrap() = json!([{ "device_id": "TL_02" }]);
        let devices = svc.unique_devices().await.unwrap();
        assert_eq!(devices.len(), 1);
    }

    #[tokio::test]
    async fn filters_by_group_and_variant() {
        let (svc, _) = service(FakeFeed::serving(fleet()));

        let mewp = svc.devices_in_group(EquipmentGroup::Mewp).await.unwrap();
        assert_eq!(mewp.len(), 2);

        let towers = svc.devices_in_group(EquipmentGroup::TowerLight).await.unwrap();
        assert_eq!(towers.len(), 1);

        let db = svc
            .devices_of_variant(MewpVariant::new(Series::D, PowerType::Battery))
            .await
            .unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db[0].device_id(), Some("ME_DB_07"));
    }

    #[tokio::test]
    async fn device_lookup_and_history() {
        let (svc, _) = service(FakeFeed::serving(fleet()));

        let tl = svc.device("TL_01").await.unwrap();
        assert_eq!(tl.regulator_level, Some(60.0));

        let err = svc.device("TL_99").await.unwrap_err();
        assert!(matches!(err, FleetError::DeviceNotFound(id) if id == "TL_99"));

        let hist = svc.history("TL_01", 10).await.unwrap();
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[0].regulator_level, Some(60.0));

        let capped = svc.history("TL_01", 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn upstream_failures_surface_as_errors() {
        let (svc, _) = service(FakeFeed::failing(503));
        let err = svc.unique_devices().await.unwrap_err();
        assert!(matches!(err, FleetError::Upstream(_)));
    }

    #[tokio::test]
    async fn with_devices_applies_the_closure_to_resolved_records() {
        let (svc, _) = service(FakeFeed::serving(fleet()));
        let count = svc.with_devices(|d| d.len()).await.unwrap();
        assert_eq!(count, 4);
    }
}
