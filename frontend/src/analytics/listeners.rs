use std::rc::Rc;

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Reflect;
use web_sys::{Document, Element, Event, EventTarget, Window};

use super::gtag::inject_tag_script;
use super::mount::{open_session, MountGuard};
use super::scroll::ScrollMetrics;
use super::sink::SharedSink;
use super::toast::Toasts;
use super::tracker::{Disposition, Tracker};
use crate::config::AnalyticsConfig;

/// Elements carrying this attribute are tracked as calls to action.
pub const CTA_ATTR: &str = "data-cta";
/// Optional form name reported with `form_submit`.
pub const FORM_NAME_ATTR: &str = "data-form-name";
const TEST_HOOK: &str = "testAnalytics";

/// A DOM listener that is removed again when dropped.
struct Subscription {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Subscription {
    fn attach(target: &EventTarget, event: &'static str, callback: Closure<dyn FnMut(Event)>) -> Option<Self> {
        match target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
            Ok(()) => Some(Self {
                target: target.clone(),
                event,
                callback,
            }),
            Err(e) => {
                log::warn!("Failed to attach {} listener: {:?}", event, e);
                None
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            log::warn!("Failed to detach {} listener: {:?}", self.event, e);
        }
    }
}

/// Page instrumentation for one mount. Everything it attached is released on drop.
pub struct Instrumentation {
    window: Window,
    subscriptions: Vec<Subscription>,
    test_hook: Option<Closure<dyn Fn(JsValue)>>,
    toasts: Toasts,
    _guard: MountGuard,
}

impl Instrumentation {
    /// Wires forms, CTAs and scroll tracking present on the page right now.
    /// Returns `None` while another mount is still active.
    pub fn start(config: &AnalyticsConfig, sink: SharedSink) -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;

        inject_tag_script(&config.measurement_id);
        let href = window.location().href().unwrap_or_default();
        let (guard, tracker) = open_session(config, sink, &document.title(), &href)?;

        let toasts = Toasts::default();
        let mut subscriptions = Vec::new();
        subscriptions.extend(watch_forms(&document, &tracker, &toasts));
        subscriptions.extend(watch_ctas(&document, &tracker, &toasts));
        subscriptions.extend(watch_scroll(&window, &tracker));

        let test_hook = if config.debug {
            install_test_hook(&window, &tracker)
        } else {
            None
        };

        log::debug!(
            "Analytics initialized with {} listeners (test mode: {})",
            subscriptions.len(),
            tracker.test_mode()
        );
        Some(Self {
            window,
            subscriptions,
            test_hook,
            toasts,
            _guard: guard,
        })
    }
}

impl Drop for Instrumentation {
    fn drop(&mut self) {
        self.subscriptions.clear();
        if self.test_hook.take().is_some() {
            if let Err(e) = Reflect::delete_property(&self.window, &JsValue::from_str(TEST_HOOK)) {
                log::warn!("Failed to remove {} hook: {:?}", TEST_HOOK, e);
            }
        }
        self.toasts.cancel_all();
    }
}

fn settle(event: &Event, disposition: &Disposition, toasts: &Toasts) {
    if disposition.prevent_default {
        event.prevent_default();
    }
    if let Some(ack) = &disposition.acknowledgment {
        toasts.show(ack);
    }
}

fn elements(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        log::warn!("Invalid analytics selector {}", selector);
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn watch_forms(document: &Document, tracker: &Rc<Tracker>, toasts: &Toasts) -> Vec<Subscription> {
    elements(document, "form")
        .into_iter()
        .filter_map(|form| {
            let callback = {
                let form = form.clone();
                let tracker = tracker.clone();
                let toasts = toasts.clone();
                Closure::<dyn FnMut(Event)>::new(move |e: Event| {
                    let disposition =
                        tracker.form_submitted(form.get_attribute(FORM_NAME_ATTR), form.get_attribute("action"));
                    settle(&e, &disposition, &toasts);
                })
            };
            Subscription::attach(&form, "submit", callback)
        })
        .collect()
}

fn watch_ctas(document: &Document, tracker: &Rc<Tracker>, toasts: &Toasts) -> Vec<Subscription> {
    elements(document, &format!("[{}]", CTA_ATTR))
        .into_iter()
        .filter_map(|cta| {
            let callback = {
                let cta = cta.clone();
                let tracker = tracker.clone();
                let toasts = toasts.clone();
                Closure::<dyn FnMut(Event)>::new(move |e: Event| {
                    let marker = cta.get_attribute(CTA_ATTR).unwrap_or_default();
                    let disposition =
                        tracker.cta_activated(&marker, cta.text_content(), cta.get_attribute("href"));
                    settle(&e, &disposition, &toasts);
                })
            };
            Subscription::attach(&cta, "click", callback)
        })
        .collect()
}

fn watch_scroll(window: &Window, tracker: &Rc<Tracker>) -> Option<Subscription> {
    let callback = {
        let window = window.clone();
        let tracker = tracker.clone();
        Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            if let Some(metrics) = scroll_metrics(&window) {
                tracker.scrolled(metrics);
            }
        })
    };
    Subscription::attach(window, "scroll", callback)
}

fn scroll_metrics(window: &Window) -> Option<ScrollMetrics> {
    let scroll_y = window.scroll_y().ok()?;
    let viewport_height = window.inner_height().ok()?.as_f64()?;
    let document_height = window.document()?.body()?.scroll_height() as f64;
    Some(ScrollMetrics {
        scroll_y,
        document_height,
        viewport_height,
    })
}

fn install_test_hook(window: &Window, tracker: &Rc<Tracker>) -> Option<Closure<dyn Fn(JsValue)>> {
    let hook = {
        let tracker = tracker.clone();
        Closure::<dyn Fn(JsValue)>::new(move |name: JsValue| match name.as_string() {
            Some(name) => tracker.test_event(&name),
            None => log::warn!("{} expects an event name", TEST_HOOK),
        })
    };
    match Reflect::set(window, &JsValue::from_str(TEST_HOOK), hook.as_ref()) {
        Ok(_) => Some(hook),
        Err(e) => {
            log::warn!("Failed to install {} hook: {:?}", TEST_HOOK, e);
            None
        }
    }
}
