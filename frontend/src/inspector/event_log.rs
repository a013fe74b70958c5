use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalogue::CatalogueEntry;
use crate::analytics::record::{iso_timestamp, serialize_iso, Parameters};
use crate::analytics::sink::{Sink, SinkCommand, SinkError};

/// Rows kept on screen; older rows are dropped silently.
pub const LOG_CAPACITY: usize = 10;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Error,
}

impl DeliveryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Sent => "SENT",
            DeliveryStatus::Error => "ERROR",
        }
    }
}

/// One manual trigger and its outcome. "Sent" only means the local sink call
/// succeeded, not that the vendor received anything.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
    #[serde(serialize_with = "serialize_iso")]
    pub timestamp: DateTime<Utc>,
    pub test_mode: bool,
    pub status: DeliveryStatus,
}

/// Most-recent-first log of manually fired events.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InspectorLog {
    entries: Vec<LogEntry>,
}

impl InspectorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn trigger(&mut self, entry: &CatalogueEntry, sink: Option<&dyn Sink>, test_mode: bool) -> DeliveryStatus {
        self.trigger_at(entry, sink, test_mode, Utc::now())
    }

    pub fn trigger_at(
        &mut self,
        entry: &CatalogueEntry,
        sink: Option<&dyn Sink>,
        test_mode: bool,
        now: DateTime<Utc>,
    ) -> DeliveryStatus {
        self.entries.insert(
            0,
            LogEntry {
                id: entry.id.to_string(),
                name: entry.name.to_string(),
                category: entry.category.to_string(),
                parameters: entry.parameters.clone(),
                timestamp: now,
                test_mode,
                status: DeliveryStatus::Pending,
            },
        );
        self.entries.truncate(LOG_CAPACITY);

        let status = match deliver(entry, sink, now) {
            Ok(()) => DeliveryStatus::Sent,
            Err(e) => {
                log::error!("Failed to send analytics event {}: {}", entry.id, e);
                DeliveryStatus::Error
            }
        };
        self.set_status(entry.id, now, status);
        status
    }

    // Rows are addressed by (id, timestamp); two triggers of the same entry in
    // the same millisecond share a key and are updated together.
    fn set_status(&mut self, id: &str, timestamp: DateTime<Utc>, status: DeliveryStatus) {
        for row in self
            .entries
            .iter_mut()
            .filter(|row| row.id == id && row.timestamp == timestamp)
        {
            row.status = status;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pretty-printed JSON array of the rows, in display order.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("analytics-test-{}.json", date.format("%Y-%m-%d"))
}

fn deliver(entry: &CatalogueEntry, sink: Option<&dyn Sink>, now: DateTime<Utc>) -> Result<(), SinkError> {
    let sink = sink.filter(|s| s.is_available()).ok_or(SinkError::Unavailable)?;
    let mut payload = entry.parameters.clone().unwrap_or_default();
    payload.insert("test_event".into(), Value::from(true));
    payload.insert("test_timestamp".into(), Value::from(iso_timestamp(&now)));
    sink.publish(SinkCommand::Event {
        name: entry.id.to_string(),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::analytics::sink::MemorySink;
    use crate::inspector::catalogue::catalogue;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    struct ThrowingSink;

    impl Sink for ThrowingSink {
        fn publish(&self, _command: SinkCommand) -> Result<(), SinkError> {
            Err(SinkError::Rejected("TypeError: gtag is not a function".into()))
        }
    }

    struct UnloadedSink;

    impl Sink for UnloadedSink {
        fn publish(&self, _command: SinkCommand) -> Result<(), SinkError> {
            Ok(())
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    #[test]
    fn trigger_marks_row_sent_and_publishes_test_payload() {
        let sink = MemorySink::new();
        let entries = catalogue();
        let cta = entries.iter().find(|e| e.id == "cta_click").unwrap();
        let mut log = InspectorLog::new();

        let status = log.trigger_at(cta, Some(&sink), true, base_time());

        assert_eq!(status, DeliveryStatus::Sent);
        assert_eq!(log.entries()[0].status, DeliveryStatus::Sent);
        assert!(log.entries()[0].test_mode);

        let published = sink.events_named("cta_click");
        assert_eq!(published.len(), 1);
        assert_eq!(published[0]["cta_type"], "hero_cta");
        assert_eq!(published[0]["test_event"], true);
        assert_eq!(published[0]["test_timestamp"], "2024-05-01T09:00:00.000Z");
    }

    #[test]
    fn missing_sink_yields_error_rows() {
        let mut log = InspectorLog::new();
        for entry in catalogue() {
            assert_eq!(log.trigger(&entry, None, true), DeliveryStatus::Error);
        }
        assert!(log.entries().iter().all(|row| row.status == DeliveryStatus::Error));
    }

    #[test]
    fn unloaded_or_throwing_sink_yields_error() {
        let entries = catalogue();
        let mut log = InspectorLog::new();
        assert_eq!(
            log.trigger_at(&entries[0], Some(&UnloadedSink), false, base_time()),
            DeliveryStatus::Error
        );
        assert_eq!(
            log.trigger_at(&entries[1], Some(&ThrowingSink), false, base_time()),
            DeliveryStatus::Error
        );
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn log_keeps_ten_most_recent_first() {
        let sink = MemorySink::new();
        let entries = catalogue();
        let mut log = InspectorLog::new();
        for i in 0..12 {
            let entry = &entries[i % entries.len()];
            log.trigger_at(entry, Some(&sink), true, base_time() + Duration::milliseconds(i as i64));
        }

        assert_eq!(log.len(), LOG_CAPACITY);
        let expected: Vec<DateTime<Utc>> = (2..12)
            .rev()
            .map(|i| base_time() + Duration::milliseconds(i))
            .collect();
        let actual: Vec<DateTime<Utc>> = log.entries().iter().map(|row| row.timestamp).collect();
        assert_eq!(actual, expected);
        assert_eq!(sink.events().len(), 12);
    }

    #[test]
    fn same_millisecond_triggers_share_status() {
        let entries = catalogue();
        let mut log = InspectorLog::new();
        log.trigger_at(&entries[0], None, true, base_time());
        log.trigger_at(&entries[0], Some(&MemorySink::new()), true, base_time());

        // The second outcome overwrites both rows with the colliding key.
        assert!(log.entries().iter().all(|row| row.status == DeliveryStatus::Sent));
    }

    #[test]
    fn clear_empties_log() {
        let mut log = InspectorLog::new();
        log.trigger(&catalogue()[0], None, false);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn export_matches_rows_in_order() {
        let sink = MemorySink::new();
        let entries = catalogue();
        let mut log = InspectorLog::new();
        log.trigger_at(&entries[0], Some(&sink), true, base_time());
        log.trigger_at(&entries[4], None, false, base_time() + Duration::seconds(1));

        let exported = log.export_json().unwrap();
        let parsed: Vec<LogEntry> = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed, log.entries());

        let raw: Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(raw[0]["id"], "purchase");
        assert_eq!(raw[0]["status"], "error");
        assert_eq!(raw[1]["id"], "page_view");
        assert_eq!(raw[1]["status"], "sent");
        assert!(raw[1].get("parameters").is_none());
        assert_eq!(raw[1]["timestamp"], "2024-05-01T09:00:00.000Z");
    }

    #[test]
    fn export_filename_uses_calendar_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(export_filename(date), "analytics-test-2024-05-01.json");
    }
}
