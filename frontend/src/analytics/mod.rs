pub mod gtag;
pub mod listeners;
pub mod mount;
pub mod record;
pub mod scroll;
pub mod sink;
pub mod toast;
pub mod tracker;

use std::rc::Rc;

use crate::config::AnalyticsConfig;
use sink::SharedSink;

/// Shared by the bootstrapper and the inspector. `sink` is `None` when the
/// page has no analytics tag to talk to.
#[derive(Clone)]
pub struct AnalyticsContext {
    pub config: AnalyticsConfig,
    pub sink: Option<SharedSink>,
}

impl PartialEq for AnalyticsContext {
    fn eq(&self, other: &Self) -> bool {
        let same_sink = match (&self.sink, &other.sink) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_sink && self.config == other.config
    }
}

impl AnalyticsContext {
    /// Sink the bootstrapper pushes to. Falls back to one that drops every
    /// command, so page interception works with or without a tag.
    pub fn delivery_sink(&self) -> SharedSink {
        self.sink
            .clone()
            .unwrap_or_else(|| Rc::new(sink::DetachedSink) as SharedSink)
    }
}
