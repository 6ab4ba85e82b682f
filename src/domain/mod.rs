pub mod aggregate;
pub mod category;
pub mod geo;
pub mod identity;
pub mod record;
pub mod snapshot;
pub mod record_time;

pub use category::{classify, describe, Category, DeviceInfo, EquipmentGroup, MewpVariant};
pub use identity::{resolve_latest, Identity};
pub use record::DeviceRecord;
pub use snapshot::Snapshot;
pub use record_time::{RecordTime, TimeSource};
