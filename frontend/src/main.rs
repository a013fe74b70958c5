use yew::prelude::*;

mod analytics;
mod config;
mod components {
    pub mod analytics;
    pub mod analytics_tester;
}
mod inspector {
    pub mod catalogue;
    pub mod event_log;
}
mod pages {
    pub mod landing;
}
mod utils {
    pub mod download;
}

use analytics::gtag::GtagSink;
use analytics::sink::SharedSink;
use analytics::AnalyticsContext;
use components::analytics::Analytics;
use components::analytics_tester::AnalyticsTester;
use config::AnalyticsConfig;
use pages::landing::Landing;

#[function_component(App)]
pub fn app() -> Html {
    let context = use_memo(
        |_| {
            let config = AnalyticsConfig::from_build_env();
            let sink = GtagSink::install(config.debug).map(|sink| std::rc::Rc::new(sink) as SharedSink);
            if sink.is_none() {
                log::error!("Could not install analytics tag on window");
            }
            AnalyticsContext { config, sink }
        },
        (),
    );
    let show_inspector = context.config.show_inspector;

    html! {
        <ContextProvider<AnalyticsContext> context={(*context).clone()}>
            <Landing />
            <Analytics />
            if show_inspector {
                <AnalyticsTester />
            }
        </ContextProvider<AnalyticsContext>>
    }
}

fn main() {
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    wasm_logger::init(wasm_logger::Config::new(level));
    yew::Renderer::<App>::new().render();
}
