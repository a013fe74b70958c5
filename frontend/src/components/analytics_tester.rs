use std::rc::Rc;

use chrono::{Local, Utc};
use web_sys::{Event, HtmlInputElement};
use yew::prelude::*;

use crate::analytics::record::iso_timestamp;
use crate::analytics::sink::SharedSink;
use crate::analytics::AnalyticsContext;
use crate::inspector::catalogue::{catalogue, categories, CatalogueEntry};
use crate::inspector::event_log::{export_filename, DeliveryStatus, InspectorLog};
use crate::utils::download::download_json;

pub enum LogAction {
    Trigger {
        entry: CatalogueEntry,
        sink: Option<SharedSink>,
        test_mode: bool,
    },
    Clear,
}

impl Reducible for InspectorLog {
    type Action = LogAction;

    fn reduce(self: Rc<Self>, action: LogAction) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            LogAction::Trigger { entry, sink, test_mode } => {
                next.trigger(&entry, sink.as_deref(), test_mode);
            }
            LogAction::Clear => next.clear(),
        }
        Rc::new(next)
    }
}

fn status_class(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Pending => "status-pending",
        DeliveryStatus::Sent => "status-sent",
        DeliveryStatus::Error => "status-error",
    }
}

const TESTER_CSS: &str = r#"
    .tester-toggle {
        position: fixed;
        bottom: 20px;
        right: 20px;
        width: 60px;
        height: 60px;
        border: none;
        border-radius: 50%;
        background: #007bff;
        color: white;
        font-size: 24px;
        cursor: pointer;
        z-index: 1000;
        box-shadow: 0 4px 12px rgba(0,0,0,0.15);
    }
    .tester-panel {
        position: fixed;
        top: 20px;
        right: 20px;
        width: 400px;
        max-height: 80vh;
        background: #1a1a1a;
        color: white;
        border-radius: 12px;
        padding: 20px;
        z-index: 1001;
        box-shadow: 0 8px 32px rgba(0,0,0,0.3);
        font-family: monospace;
        font-size: 14px;
        overflow: hidden;
        display: flex;
        flex-direction: column;
    }
    .tester-header {
        display: flex;
        justify-content: space-between;
        align-items: center;
        margin-bottom: 20px;
    }
    .tester-header h3 { margin: 0; color: #00ff88; }
    .tester-close {
        background: none;
        border: none;
        color: #ff6b6b;
        font-size: 20px;
        cursor: pointer;
    }
    .tester-panel h4 { margin: 0 0 10px 0; color: #ffd93d; }
    .tester-category {
        color: #888;
        font-size: 12px;
        text-transform: uppercase;
        margin-bottom: 5px;
    }
    .tester-buttons { display: flex; flex-wrap: wrap; gap: 5px; margin-bottom: 8px; }
    .tester-event {
        background: #333;
        color: white;
        border: 1px solid #555;
        border-radius: 4px;
        padding: 4px 8px;
        font-size: 11px;
        cursor: pointer;
    }
    .tester-event:hover { background: #444; }
    .tester-log-header {
        display: flex;
        justify-content: space-between;
        align-items: center;
        margin-bottom: 10px;
    }
    .tester-log-actions button {
        color: white;
        border: none;
        border-radius: 3px;
        padding: 3px 8px;
        font-size: 11px;
        cursor: pointer;
        margin-left: 5px;
    }
    .tester-clear { background: #ff6b6b; }
    .tester-export { background: #28a745; }
    .tester-log {
        flex: 1;
        overflow: auto;
        background: #000;
        border-radius: 4px;
        padding: 10px;
        font-size: 11px;
    }
    .tester-empty { color: #666; text-align: center; padding: 20px; }
    .tester-row { margin-bottom: 10px; }
    .tester-row-header { display: flex; justify-content: space-between; margin-bottom: 5px; }
    .tester-row-name { color: #00ff88; font-weight: bold; }
    .tester-row-time { color: #888; font-size: 10px; }
    .tester-row pre {
        background: #111;
        padding: 5px;
        border-radius: 3px;
        margin: 5px 0 0 0;
        font-size: 10px;
        color: #ccc;
        white-space: pre-wrap;
    }
    .status-pending { color: #ffd93d; font-size: 10px; }
    .status-sent { color: #00ff88; font-size: 10px; }
    .status-error { color: #ff6b6b; font-size: 10px; }
    .tester-status-bar {
        margin-top: 15px;
        padding: 10px;
        background: #333;
        border-radius: 4px;
        font-size: 11px;
    }
    .flag-on { color: #00ff88; }
    .flag-off { color: #ff6b6b; }
    .flag-test { color: #ffd93d; }
"#;

/// Developer overlay for firing catalogue events by hand.
#[function_component(AnalyticsTester)]
pub fn analytics_tester() -> Html {
    let context = use_context::<AnalyticsContext>();
    let sink = context.and_then(|ctx| ctx.sink);
    let entries = use_memo(|_| catalogue(), ());
    let event_log = use_reducer(InspectorLog::new);
    let is_visible = use_state(|| false);
    let test_mode = use_state(|| true);

    let open = {
        let is_visible = is_visible.clone();
        Callback::from(move |_: MouseEvent| is_visible.set(true))
    };
    let close = {
        let is_visible = is_visible.clone();
        Callback::from(move |_: MouseEvent| is_visible.set(false))
    };

    if !*is_visible {
        return html! {
            <>
                <style>{TESTER_CSS}</style>
                <button class="tester-toggle" title="Open Analytics Tester" onclick={open}>{"📊"}</button>
            </>
        };
    }

    let trigger = {
        let event_log = event_log.clone();
        let sink = sink.clone();
        let test_mode = test_mode.clone();
        Callback::from(move |entry: CatalogueEntry| {
            event_log.dispatch(LogAction::Trigger {
                entry,
                sink: sink.clone(),
                test_mode: *test_mode,
            });
        })
    };
    let clear = {
        let event_log = event_log.clone();
        Callback::from(move |_: MouseEvent| event_log.dispatch(LogAction::Clear))
    };
    let export = {
        let event_log = event_log.clone();
        Callback::from(move |_: MouseEvent| {
            let filename = export_filename(Utc::now().date_naive());
            match event_log.export_json() {
                Ok(json) => {
                    if let Err(e) = download_json(&filename, &json) {
                        log::error!("Failed to export analytics log: {:?}", e);
                    }
                }
                Err(e) => log::error!("Failed to serialize analytics log: {}", e),
            }
        })
    };
    let on_test_mode = {
        let test_mode = test_mode.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            test_mode.set(input.checked());
        })
    };

    let sink_loaded = sink.as_ref().map(|s| s.is_available()).unwrap_or(false);

    let rows = if event_log.is_empty() {
        html! { <div class="tester-empty">{"No events triggered yet"}</div> }
    } else {
        event_log
            .entries()
            .iter()
            .map(|row| {
                let params = match &row.parameters {
                    Some(params) => html! {
                        <pre>{serde_json::to_string_pretty(params).unwrap_or_default()}</pre>
                    },
                    None => html! {},
                };
                html! {
                    <div key={format!("{}-{}", row.id, iso_timestamp(&row.timestamp))} class="tester-row">
                        <div class="tester-row-header">
                            <span class="tester-row-name">{&row.name}</span>
                            <span class={status_class(row.status)}>{row.status.label()}</span>
                        </div>
                        <div class="tester-row-time">
                            {row.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()}
                        </div>
                        {params}
                    </div>
                }
            })
            .collect::<Html>()
    };

    html! {
        <div class="tester-panel">
            <style>{TESTER_CSS}</style>
            <div class="tester-header">
                <h3>{"🧪 Analytics Tester"}</h3>
                <button class="tester-close" onclick={close}>{"×"}</button>
            </div>

            <div style="margin-bottom: 15px;">
                <label style="display: flex; align-items: center; gap: 8px;">
                    <input type="checkbox" checked={*test_mode} onchange={on_test_mode} />
                    {"Test Mode (prevents actual actions)"}
                </label>
            </div>

            <div style="margin-bottom: 20px;">
                <h4>{"Test Events"}</h4>
                {
                    categories(&entries).into_iter().map(|category| {
                        let buttons = entries
                            .iter()
                            .filter(|entry| entry.category == category)
                            .map(|entry| {
                                let onclick = {
                                    let trigger = trigger.clone();
                                    let entry = entry.clone();
                                    Callback::from(move |_: MouseEvent| trigger.emit(entry.clone()))
                                };
                                html! {
                                    <button key={entry.id} class="tester-event" {onclick}>{entry.name}</button>
                                }
                            })
                            .collect::<Html>();
                        html! {
                            <div key={category}>
                                <div class="tester-category">{category}</div>
                                <div class="tester-buttons">{buttons}</div>
                            </div>
                        }
                    }).collect::<Html>()
                }
            </div>

            <div class="tester-log-header">
                <h4 style="margin: 0;">{"Event Log"}</h4>
                <div class="tester-log-actions">
                    <button class="tester-clear" onclick={clear}>{"Clear"}</button>
                    <button class="tester-export" onclick={export}>{"Export"}</button>
                </div>
            </div>
            <div class="tester-log">{rows}</div>

            <div class="tester-status-bar">
                <div>{"Mode: "}
                    <span class={if *test_mode { "flag-test" } else { "flag-on" }}>
                        {if *test_mode { "TEST" } else { "PRODUCTION" }}
                    </span>
                </div>
                <div>{"Events: "}<span class="flag-on">{event_log.len()}</span></div>
                <div>{"Sink Loaded: "}
                    <span class={if sink_loaded { "flag-on" } else { "flag-off" }}>
                        {if sink_loaded { "YES" } else { "NO" }}
                    </span>
                </div>
            </div>
        </div>
    }
}
