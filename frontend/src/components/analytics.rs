use yew::prelude::*;

use crate::analytics::listeners::Instrumentation;
use crate::analytics::AnalyticsContext;
use crate::config::AnalyticsConfig;

/// Renders nothing; instruments the page that is already on screen.
#[function_component(Analytics)]
pub fn analytics() -> Html {
    let context = use_context::<AnalyticsContext>();

    {
        use_effect_with_deps(
            move |context: &Option<AnalyticsContext>| {
                let context = context.clone().unwrap_or_else(|| AnalyticsContext {
                    config: AnalyticsConfig::from_build_env(),
                    sink: None,
                });
                if context.sink.is_none() {
                    log::warn!("No analytics sink on this page, events will be dropped");
                }
                // Forms and CTAs are intercepted even when nothing can be delivered.
                let instrumentation = Instrumentation::start(&context.config, context.delivery_sink());
                // Detaches every listener and the test hook on unmount.
                move || drop(instrumentation)
            },
            context,
        );
    }

    html! {}
}
