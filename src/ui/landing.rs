//! Landing page.

use std::fmt::Write;

use super::{BRAND, html_shell};

/// Feature cards: (title, description).
const FEATURES: [(&str, &str); 3] = [
    (
        "Natural conversation",
        "An advanced language model keeps track of context and answers fluently and coherently.",
    ),
    (
        "Broad knowledge",
        "Expertise across many fields, from academic research to everyday life, with accurate answers.",
    ),
    (
        "Always available",
        "Ready around the clock to respond quickly and help you solve problems.",
    ),
];

/// Use cases shown in the grid.
const SCENARIOS: [&str; 8] = [
    "Study help",
    "Programming",
    "Creative writing",
    "Data analysis",
    "Translation",
    "Career planning",
    "Everyday advice",
    "Knowledge Q&A",
];

/// Render the landing page.
pub fn render() -> String {
    let mut features = String::new();
    for (title, description) in FEATURES {
        let _ = write!(
            features,
            r#"
                <div class="feature-card">
                    <h3>{title}</h3>
                    <p>{description}</p>
                </div>"#
        );
    }

    let mut scenarios = String::new();
    for scene in SCENARIOS {
        let _ = write!(
            scenarios,
            r#"
                <div class="scenario"><span>{scene}</span></div>"#
        );
    }

    let content = format!(
        r#"<main class="landing">
    <nav class="topbar">
        <div class="topbar-inner">
            <span class="brand">{BRAND}</span>
            <div class="topbar-links">
                <a href="/login" class="link-muted">Log in</a>
                <a href="/signup" class="btn btn-primary">Sign up</a>
            </div>
        </div>
    </nav>

    <section class="hero">
        <h1>Talk with AI,<br>explore what is possible</h1>
        <p>A new generation of AI assistant that answers your questions, sparks ideas and lends a hand.</p>
        <a href="/chat" class="btn btn-primary btn-lg">Start chatting &rarr;</a>
    </section>

    <section class="features">{features}
    </section>

    <section class="scenarios">
        <h2>Made for every situation</h2>
        <div class="scenario-grid">{scenarios}
        </div>
    </section>

    <footer class="site-footer">&copy; 2024 {BRAND}. All rights reserved.</footer>
</main>"#
    );

    html_shell(BRAND, "page-landing", &content)
}
