use std::collections::HashMap;
use tracing::debug;

use super::record::DeviceRecord;
use super::record_time::RecordTime;

const UNKNOWN_SENTINEL: &str = "unknown";

/// How a record's identity takes part in deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity<'a> {
    Device(&'a str),
    /// The feed's placeholder for readings it could not attribute. Never merged.
    Unknown,
}

impl<'a> Identity<'a> {
    /// `None` when the record has no usable identity and must be dropped.
    pub fn of(record: &'a DeviceRecord) -> Option<Self> {
        let id = record.device_id()?;
        if id.eq_ignore_ascii_case(UNKNOWN_SENTINEL) {
            Some(Identity::Unknown)
        } else {
            Some(Identity::Device(id))
        }
    }
}

/// Keeps the current record for every device.
///
/// For each identity the record with the greatest [`RecordTime`] wins; on
/// equal times the first one seen is kept. Records without an identity are
/// dropped and `unknown` records are each kept on their own. Output follows
/// the order in which identities first appear.
pub fn resolve_latest<I>(records: I) -> Vec<DeviceRecord>
where
    I: IntoIterator<Item = DeviceRecord>,
{
    let mut kept: Vec<(DeviceRecord, RecordTime)> = Vec::new();
    let mut slot_of: HashMap<String, usize> = HashMap::new();
    let mut dropped = 0usize;

    for record in records {
        let time = RecordTime::resolve(&record);
        let key = match Identity::of(&record) {
            None => {
                dropped += 1;
                continue;
            }
            Some(Identity::Unknown) => {
                kept.push((record, time));
                continue;
            }
            Some(Identity::Device(id)) => id.to_string(),
        };

        match slot_of.get(&key) {
            Some(&slot) => {
                if time.at > kept[slot].1.at {
                    kept[slot] = (record, time);
                }
            }
            None => {
                slot_of.insert(key, kept.len());
                kept.push((record, time));
            }
        }
    }

    if dropped > 0 {
        debug!(dropped, "dropped feed records without a device id");
    }
    kept.into_iter().map(|(record, _)| record).collect()
}

/// The current record for one device, if the snapshot has any.
pub fn latest_for<'a>(records: &'a [DeviceRecord], device_id: &str) -> Option<&'a DeviceRecord> {
    let mut best: Option<(&DeviceRecord, RecordTime)> = None;
    for record in records.iter().filter(|r| r.device_id() == Some(device_id)) {
        let time = RecordTime::resolve(record);
        match best {
            Some((_, current)) if time.at <= current.at => {}
            _ => best = Some((record, time)),
        }
    }
    best.map(|(record, _)| record)
}

/// All readings for one device, newest first, at most `limit` of them.
pub fn history(records: &[DeviceRecord], device_id: &str, limit: usize) -> Vec<DeviceRecord> {
    let mut matching: Vec<(RecordTime, &DeviceRecord)> = records
        .iter()
        .filter(|r| r.device_id() == Some(device_id))
        .map(|r| (RecordTime::resolve(r), r))
        .collect();
    // stable, so equal times keep feed order
    matching.sort_by(|a, b| b.0.at.cmp(&a.0.at));
    matching
        .into_iter()
        .take(limit)
        .map(|(_, r)| r.clone())
        .collect()
}
