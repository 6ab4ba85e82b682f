use serde_json::Value;
use tracing::{debug, warn};

use super::record::DeviceRecord;

/// One complete read of the device feed.
///
/// The upstream has answered with several envelope shapes over time; they
/// are all flattened here so nothing downstream has to know about them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub records: Vec<DeviceRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<DeviceRecord>) -> Self {
        Self { records }
    }

    /// Accepts `{"items": [...]}`, `{"devices": [...]}`,
    /// `{"devices_by_type": {"<type>": [...], ...}}` or a bare array.
    /// Anything else is an empty snapshot. Entries that are not objects are
    /// skipped.
    pub fn from_value(value: Value) -> Self {
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut envelope) => {
                if let Some(Value::Array(items)) = envelope.remove("items") {
                    items
                } else if let Some(Value::Array(devices)) = envelope.remove("devices") {
                    devices
                } else if let Some(Value::Object(by_type)) = envelope.remove("devices_by_type") {
                    by_type
                        .into_iter()
                        .flat_map(|(_, group)| match group {
                            Value::Array(devices) => devices,
                            _ => Vec::new(),
                        })
                        .collect()
                } else {
                    let keys: Vec<_> = envelope.keys().cloned().collect();
                    warn!(?keys, "unrecognised device feed envelope");
                    Vec::new()
                }
            }
            other => {
                warn!(kind = value_kind(&other), "device feed body is not a list");
                Vec::new()
            }
        };

        let total = entries.len();
        let records: Vec<DeviceRecord> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(error = %e, "skipping malformed feed entry");
                    None
                }
            })
            .collect();
        debug!(total, kept = records.len(), "normalised device feed");

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
