use chrono::Utc;
use serde_json::Value;

use super::record::{iso_timestamp, EventRecord, Parameters};
use super::scroll::{observe_page_depth, ScrollMetrics};
use super::sink::{SharedSink, SinkCommand};
use crate::config::AnalyticsConfig;

pub const DEFAULT_FORM_NAME: &str = "contact_form";
pub const UNKNOWN: &str = "unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
}

/// Transient on-screen message shown instead of a suppressed side effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Acknowledgment {
    pub message: String,
    pub tone: Tone,
}

/// What the DOM layer should do with the event that triggered tracking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Disposition {
    pub prevent_default: bool,
    pub acknowledgment: Option<Acknowledgment>,
}

/// Turns page interactions into event records and pushes them to the sink.
/// Never reports failure to its caller.
pub struct Tracker {
    sink: SharedSink,
    measurement_id: String,
    debug: bool,
    test_mode: bool,
}

impl Tracker {
    pub fn new(config: &AnalyticsConfig, sink: SharedSink) -> Self {
        Self {
            sink,
            measurement_id: config.measurement_id.clone(),
            debug: config.debug,
            test_mode: config.test_mode,
        }
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// Sends the `js` and `config` commands that open a tag session.
    pub fn configure(&self) {
        self.push(SinkCommand::Js(Utc::now()));
        self.push(SinkCommand::Config {
            destination: self.measurement_id.clone(),
            debug_mode: self.debug,
            send_page_view: !self.test_mode,
        });
    }

    pub fn track_event(&self, name: &str, parameters: Parameters) {
        let record = EventRecord::new(name, parameters, self.test_mode);
        self.push(SinkCommand::Event {
            name: record.name.clone(),
            payload: record.payload(),
        });
        if self.debug {
            log::info!(
                "📊 Tracked Event: {}",
                serde_json::to_string(&record.payload()).unwrap_or_else(|_| record.name.clone())
            );
        }
    }

    /// Page views are not reported at all in test mode.
    pub fn page_view(&self, title: &str, url: &str) {
        if self.test_mode {
            return;
        }
        let mut params = Parameters::new();
        params.insert("page_title".into(), Value::from(title));
        params.insert("page_url".into(), Value::from(url));
        self.track_event("page_view", params);
    }

    /// Instrumented forms never submit on their own, in either mode.
    pub fn form_submitted(&self, form_name: Option<String>, action: Option<String>) -> Disposition {
        let mut params = Parameters::new();
        params.insert(
            "form_name".into(),
            Value::from(non_empty(form_name).unwrap_or_else(|| DEFAULT_FORM_NAME.to_string())),
        );
        params.insert(
            "form_action".into(),
            Value::from(non_empty(action).unwrap_or_else(|| UNKNOWN.to_string())),
        );
        self.track_event("form_submit", params);

        let acknowledgment = self.test_mode.then(|| {
            log::info!("🧪 Test Mode: Form submission prevented");
            Acknowledgment {
                message: "✅ Form submitted (test mode)".to_string(),
                tone: Tone::Success,
            }
        });
        Disposition {
            prevent_default: true,
            acknowledgment,
        }
    }

    /// CTAs keep their normal behavior unless test mode is on.
    pub fn cta_activated(&self, marker: &str, text: Option<String>, href: Option<String>) -> Disposition {
        if self.test_mode {
            log::info!("🧪 Test Mode: CTA click prevented");
        }
        let mut params = Parameters::new();
        params.insert("cta_type".into(), Value::from(marker));
        params.insert(
            "cta_text".into(),
            Value::from(text.map(|t| t.trim().to_string()).unwrap_or_default()),
        );
        params.insert(
            "cta_href".into(),
            Value::from(non_empty(href).unwrap_or_else(|| UNKNOWN.to_string())),
        );
        self.track_event("cta_click", params);

        Disposition {
            prevent_default: self.test_mode,
            acknowledgment: self.test_mode.then(|| Acknowledgment {
                message: format!("✅ CTA clicked: {} (test mode)", marker),
                tone: Tone::Info,
            }),
        }
    }

    pub fn scrolled(&self, metrics: ScrollMetrics) {
        let Some(percent) = metrics.percent() else {
            return;
        };
        if let Some(depth) = observe_page_depth(percent) {
            let mut params = Parameters::new();
            params.insert("scroll_percentage".into(), Value::from(depth));
            self.track_event("scroll_depth", params);
        }
    }

    /// Backs the debug-only `testAnalytics(name)` console hook.
    pub fn test_event(&self, name: &str) {
        let mut params = Parameters::new();
        params.insert("test_event".into(), Value::from(true));
        params.insert("test_timestamp".into(), Value::from(iso_timestamp(&Utc::now())));
        self.track_event(name, params);
    }

    fn push(&self, command: SinkCommand) {
        if let Err(e) = self.sink.publish(command) {
            log::debug!("Dropped analytics command: {}", e);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::analytics::sink::{MemorySink, Sink, SinkError};

    fn setup(test_mode: bool) -> (Tracker, Rc<MemorySink>) {
        let sink = Rc::new(MemorySink::new());
        let config = AnalyticsConfig {
            measurement_id: "G-TEST".into(),
            debug: false,
            test_mode,
            show_inspector: false,
        };
        (Tracker::new(&config, sink.clone()), sink)
    }

    fn metrics(scroll_y: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_y,
            document_height: 1100.0,
            viewport_height: 100.0,
        }
    }

    #[test]
    fn configure_sends_js_then_config() {
        let (tracker, sink) = setup(true);
        tracker.configure();

        let commands = sink.commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], SinkCommand::Js(_)));
        assert_eq!(
            commands[1],
            SinkCommand::Config {
                destination: "G-TEST".into(),
                debug_mode: false,
                send_page_view: false,
            }
        );
    }

    #[test]
    fn page_view_is_suppressed_in_test_mode() {
        let (tracker, sink) = setup(true);
        tracker.page_view("Home", "https://example.com/");
        tracker.form_submitted(None, None);
        assert!(sink.events_named("page_view").is_empty());
    }

    #[test]
    fn page_view_fires_once_in_production() {
        let (tracker, sink) = setup(false);
        tracker.page_view("Home", "https://example.com/");
        tracker.cta_activated("hero-cta", Some("Go".into()), None);
        tracker.scrolled(metrics(500.0));

        let views = sink.events_named("page_view");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0]["page_title"], "Home");
        assert_eq!(views[0]["page_url"], "https://example.com/");
        assert_eq!(views[0]["test_mode"], false);
    }

    #[test]
    fn form_submission_is_always_prevented() {
        for test_mode in [true, false] {
            let (tracker, _) = setup(test_mode);
            let disposition = tracker.form_submitted(Some("newsletter".into()), Some("/subscribe".into()));
            assert!(disposition.prevent_default);
            assert_eq!(disposition.acknowledgment.is_some(), test_mode);
        }
    }

    #[test]
    fn form_attributes_fall_back() {
        let (tracker, sink) = setup(true);
        let disposition = tracker.form_submitted(Some(String::new()), None);

        let submits = sink.events_named("form_submit");
        assert_eq!(submits.len(), 1);
        assert_eq!(submits[0]["form_name"], "contact_form");
        assert_eq!(submits[0]["form_action"], "unknown");
        assert_eq!(submits[0]["test_mode"], true);
        assert_eq!(
            disposition.acknowledgment,
            Some(Acknowledgment {
                message: "✅ Form submitted (test mode)".into(),
                tone: Tone::Success,
            })
        );
    }

    #[test]
    fn cta_prevents_navigation_only_in_test_mode() {
        let mut recorded = Vec::new();
        for test_mode in [true, false] {
            let (tracker, sink) = setup(test_mode);
            let disposition = tracker.cta_activated(
                "hero-cta",
                Some("  Start Free Trial \n".into()),
                Some("/signup".into()),
            );
            assert_eq!(disposition.prevent_default, test_mode);

            let clicks = sink.events_named("cta_click");
            assert_eq!(clicks.len(), 1);
            assert_eq!(clicks[0]["cta_type"], "hero-cta");
            assert_eq!(clicks[0]["cta_text"], "Start Free Trial");
            assert_eq!(clicks[0]["cta_href"], "/signup");
            recorded.push(disposition);
        }
        assert_eq!(
            recorded[0].acknowledgment.as_ref().map(|a| a.message.as_str()),
            Some("✅ CTA clicked: hero-cta (test mode)")
        );
        assert_eq!(recorded[1].acknowledgment, None);
    }

    #[test]
    fn cta_without_href_reports_unknown() {
        let (tracker, sink) = setup(false);
        tracker.cta_activated("pricing-cta", None, None);
        let clicks = sink.events_named("cta_click");
        assert_eq!(clicks[0]["cta_href"], "unknown");
        assert_eq!(clicks[0]["cta_text"], "");
    }

    #[test]
    fn scroll_reports_quarter_thresholds_once() {
        let (tracker, sink) = setup(false);
        // Scrollable range is 1000px, so pixels map to tenths of a percent.
        for y in [100.0, 260.0, 500.0, 510.0, 750.0, 1000.0, 400.0, 1000.0] {
            tracker.scrolled(metrics(y));
        }
        let depths: Vec<Value> = sink
            .events_named("scroll_depth")
            .into_iter()
            .map(|p| p["scroll_percentage"].clone())
            .collect();
        assert_eq!(depths, vec![Value::from(50), Value::from(75), Value::from(100)]);
    }

    #[test]
    fn remounted_tracker_keeps_page_scroll_depth() {
        let (first, first_sink) = setup(false);
        first.scrolled(metrics(500.0));
        drop(first);

        let (second, second_sink) = setup(false);
        second.scrolled(metrics(500.0));
        second.scrolled(metrics(750.0));

        assert_eq!(first_sink.events_named("scroll_depth").len(), 1);
        let depths: Vec<Value> = second_sink
            .events_named("scroll_depth")
            .into_iter()
            .map(|p| p["scroll_percentage"].clone())
            .collect();
        assert_eq!(depths, vec![Value::from(75)]);
    }

    #[test]
    fn short_page_never_reports_depth() {
        let (tracker, sink) = setup(false);
        tracker.scrolled(ScrollMetrics {
            scroll_y: 0.0,
            document_height: 500.0,
            viewport_height: 900.0,
        });
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_event_marks_payload() {
        let (tracker, sink) = setup(false);
        tracker.test_event("sign_up");
        let events = sink.events_named("sign_up");
        assert_eq!(events[0]["test_event"], true);
        assert!(events[0]["test_timestamp"].is_string());
    }

    struct BrokenSink;

    impl Sink for BrokenSink {
        fn publish(&self, _command: SinkCommand) -> Result<(), SinkError> {
            Err(SinkError::Unavailable)
        }
    }

    #[test]
    fn sink_failures_are_swallowed() {
        let tracker = Tracker::new(&AnalyticsConfig::default(), Rc::new(BrokenSink));
        tracker.configure();
        tracker.page_view("Home", "/");
        let disposition = tracker.form_submitted(None, None);
        assert!(disposition.prevent_default);
    }
}
