use serde_json::{json, Value};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{self, Array, Function, Reflect};
use web_sys::HtmlScriptElement;

use super::sink::{Sink, SinkCommand, SinkError};

const TAG_SCRIPT_ID: &str = "analytics-tag-loader";
const TAG_URL: &str = "https://www.googletagmanager.com/gtag/js";
// gtag.js only drains `arguments` objects from the queue, never plain arrays.
const GTAG_SHIM: &str = "window.dataLayer = window.dataLayer || []; window.dataLayer.push(arguments);";

/// Sink backed by the page's `window.gtag` function and its `dataLayer` queue.
pub struct GtagSink {
    gtag: Function,
    debug: bool,
}

impl GtagSink {
    /// Creates `window.dataLayer` and `window.gtag` when missing and binds to them.
    /// Commands pushed before the tag script loads stay queued in `dataLayer`.
    pub fn install(debug: bool) -> Option<Self> {
        let window = web_sys::window()?;
        let has_queue = Reflect::get(&window, &JsValue::from_str("dataLayer"))
            .map(|queue| Array::is_array(&queue))
            .unwrap_or(false);
        if !has_queue {
            Reflect::set(&window, &JsValue::from_str("dataLayer"), &Array::new()).ok()?;
        }

        let gtag = match window_gtag() {
            Some(gtag) => gtag,
            None => {
                let shim = Function::new_no_args(GTAG_SHIM);
                Reflect::set(&window, &JsValue::from_str("gtag"), &shim).ok()?;
                shim
            }
        };
        Some(Self { gtag, debug })
    }
}

impl Sink for GtagSink {
    fn publish(&self, command: SinkCommand) -> Result<(), SinkError> {
        let args = arguments(&command)?;
        if self.debug {
            gloo_console::log!("🔍 Analytics Event:", args.clone());
        }
        self.gtag
            .apply(&JsValue::NULL, &args)
            .map(|_| ())
            .map_err(|e| SinkError::Rejected(describe(&e)))
    }

    fn is_available(&self) -> bool {
        window_gtag().is_some()
    }
}

/// Appends the async tag loader script once. Load failures are not observed;
/// queued commands simply never leave the page.
pub fn inject_tag_script(measurement_id: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if document.get_element_by_id(TAG_SCRIPT_ID).is_some() {
        return;
    }
    let script = match document
        .create_element("script")
        .map(|el| el.dyn_into::<HtmlScriptElement>())
    {
        Ok(Ok(script)) => script,
        _ => {
            log::warn!("Could not create analytics tag script element");
            return;
        }
    };
    script.set_id(TAG_SCRIPT_ID);
    script.set_async(true);
    script.set_src(&format!("{}?id={}", TAG_URL, measurement_id));

    if let Some(head) = document.head() {
        if let Err(e) = head.append_child(&script) {
            log::warn!("Failed to append analytics tag script: {:?}", e);
        }
    }
}

fn window_gtag() -> Option<Function> {
    let window = web_sys::window()?;
    Reflect::get(&window, &JsValue::from_str("gtag"))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn arguments(command: &SinkCommand) -> Result<Array, SinkError> {
    let args = Array::new();
    match command {
        SinkCommand::Js(at) => {
            args.push(&JsValue::from_str("js"));
            args.push(&js_sys::Date::new(&JsValue::from_f64(at.timestamp_millis() as f64)));
        }
        SinkCommand::Config {
            destination,
            debug_mode,
            send_page_view,
        } => {
            args.push(&JsValue::from_str("config"));
            args.push(&JsValue::from_str(destination));
            args.push(&to_js(&json!({
                "debug_mode": debug_mode,
                "send_page_view": send_page_view,
            }))?);
        }
        SinkCommand::Event { name, payload } => {
            args.push(&JsValue::from_str("event"));
            args.push(&JsValue::from_str(name));
            args.push(&to_js(&Value::Object(payload.clone()))?);
        }
    }
    Ok(args)
}

fn to_js(value: &Value) -> Result<JsValue, SinkError> {
    let text = serde_json::to_string(value)?;
    js_sys::JSON::parse(&text).map_err(|e| SinkError::Rejected(describe(&e)))
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}
