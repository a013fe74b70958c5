use std::cell::Cell;
use std::rc::Rc;

use super::sink::SharedSink;
use super::tracker::Tracker;
use crate::config::AnalyticsConfig;

thread_local! {
    static ACTIVE: Cell<bool> = Cell::new(false);
}

/// Held for as long as one mount owns the page's instrumentation.
pub struct MountGuard {
    _private: (),
}

impl MountGuard {
    /// `None` while another guard is still alive.
    pub fn acquire() -> Option<Self> {
        if ACTIVE.with(|active| active.replace(true)) {
            return None;
        }
        Some(Self { _private: () })
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| active.set(false));
    }
}

/// Claims the page, then opens the tag session and reports the page view.
/// Nothing is sent when another mount already owns the page.
pub fn open_session(
    config: &AnalyticsConfig,
    sink: SharedSink,
    title: &str,
    url: &str,
) -> Option<(MountGuard, Rc<Tracker>)> {
    let Some(guard) = MountGuard::acquire() else {
        log::warn!("Analytics already initialized for this page, skipping");
        return None;
    };
    let tracker = Rc::new(Tracker::new(config, sink));
    tracker.configure();
    tracker.page_view(title, url);
    Some((guard, tracker))
}
