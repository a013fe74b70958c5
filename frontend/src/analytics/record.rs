use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Free-form event parameters. Shape depends on the event name.
pub type Parameters = Map<String, Value>;

/// A normalized, timestamped analytics event.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub name: String,
    pub parameters: Parameters,
    #[serde(serialize_with = "serialize_iso")]
    pub timestamp: DateTime<Utc>,
    pub test_mode: bool,
}

impl EventRecord {
    pub fn new(name: impl Into<String>, parameters: Parameters, test_mode: bool) -> Self {
        Self::at(name, parameters, test_mode, Utc::now())
    }

    pub fn at(
        name: impl Into<String>,
        parameters: Parameters,
        test_mode: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            timestamp,
            test_mode,
        }
    }

    /// Flattened payload handed to the sink:
    /// `{event_name, ...parameters, timestamp, test_mode}`.
    pub fn payload(&self) -> Parameters {
        let mut payload = Parameters::new();
        payload.insert("event_name".to_string(), Value::from(self.name.clone()));
        for (key, value) in &self.parameters {
            payload.insert(key.clone(), value.clone());
        }
        payload.insert("timestamp".to_string(), Value::from(iso_timestamp(&self.timestamp)));
        payload.insert("test_mode".to_string(), Value::from(self.test_mode));
        payload
    }
}

/// Millisecond-precision UTC timestamp, e.g. `2024-05-01T12:00:00.000Z`.
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize_iso<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&iso_timestamp(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn payload_flattens_parameters_between_name_and_metadata() {
        let mut params = Parameters::new();
        params.insert("form_name".into(), "contact_form".into());
        let record = EventRecord::at("form_submit", params, true, fixed());

        let payload = record.payload();
        assert_eq!(payload["event_name"], "form_submit");
        assert_eq!(payload["form_name"], "contact_form");
        assert_eq!(payload["timestamp"], "2024-05-01T12:30:00.000Z");
        assert_eq!(payload["test_mode"], true);
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn reserved_keys_win_over_parameters() {
        let mut params = Parameters::new();
        params.insert("test_mode".into(), "spoofed".into());
        let record = EventRecord::at("cta_click", params, false, fixed());

        assert_eq!(record.payload()["test_mode"], false);
    }

    #[test]
    fn serializes_timestamp_with_millis() {
        let record = EventRecord::at("page_view", Parameters::new(), false, fixed());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T12:30:00.000Z");

        let back: EventRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
