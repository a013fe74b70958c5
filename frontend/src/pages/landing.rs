use yew::prelude::*;

const LANDING_CSS: &str = r#"
    .landing-page {
        font-family: system-ui, sans-serif;
        color: #1f2937;
    }
    .hero {
        min-height: 90vh;
        display: flex;
        flex-direction: column;
        align-items: center;
        justify-content: center;
        text-align: center;
        padding: 0 2rem;
        background: linear-gradient(135deg, #eff6ff, #dbeafe);
    }
    .hero h1 { font-size: 3rem; margin-bottom: 1rem; }
    .hero p { font-size: 1.25rem; max-width: 640px; color: #4b5563; }
    .cta-button {
        display: inline-block;
        margin-top: 2rem;
        padding: 1rem 2rem;
        border-radius: 8px;
        background: #3b82f6;
        color: white;
        text-decoration: none;
        font-weight: 600;
    }
    .landing-section {
        min-height: 60vh;
        padding: 4rem 2rem;
        max-width: 800px;
        margin: 0 auto;
    }
    .contact-form { display: flex; flex-direction: column; gap: 1rem; }
    .contact-form input, .contact-form textarea {
        padding: 0.75rem;
        border: 1px solid #d1d5db;
        border-radius: 6px;
    }
"#;

#[function_component(Landing)]
pub fn landing() -> Html {
    html! {
        <div class="landing-page">
            <style>{LANDING_CSS}</style>
            <header class="hero">
                <h1>{"Transform Your Data Analytics"}</h1>
                <p>{"AI-powered insights, real-time dashboards and recommendations you can act on."}</p>
                <a class="cta-button" href="/signup" data-cta="hero-cta">{"Start Free Trial"}</a>
            </header>

            <section class="landing-section">
                <h2>{"Simple pricing"}</h2>
                <p>{"Start free, upgrade when your team is ready."}</p>
                <a class="cta-button" href="/signup?plan=pro" data-cta="pricing-pro">{"Choose Pro"}</a>
            </section>

            <section class="landing-section">
                <h2>{"Talk to us"}</h2>
                <form class="contact-form" action="/api/contact" data-form-name="contact_form">
                    <input type="text" name="name" placeholder="Name" />
                    <input type="email" name="email" placeholder="Email" />
                    <textarea name="message" placeholder="How can we help?"></textarea>
                    <button class="cta-button" type="submit">{"Send"}</button>
                </form>
            </section>
        </div>
    }
}
