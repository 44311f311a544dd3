// 📄 Pages - the container ids each module writes to, and full HTML pages
//
// The container list is the contract between the modules' fragments and
// their timelines on one side and the page markup on the other.

use crate::markup::{escape, Fragment};
use crate::navigation::{dashboard_cards, render_nav, Module};
use crate::surface::{MemorySurface, Surface};

/// Every element id a module's fragments and animations address
pub fn containers(module: Module) -> &'static [&'static str] {
    match module {
        Module::Dashboard => &["module-cards"],
        Module::CostTicker => &[
            "api-model-select",
            "slm-model-select",
            "api-response",
            "api-cost",
            "slm-response",
            "slm-cost",
            "api-monthly-cost",
            "slm-monthly-cost",
            "monthly-savings",
            "savings-percent",
            "annual-savings",
            "volume-display",
            "api-total-cost",
            "slm-total-cost",
            "query-count",
        ],
        Module::RagCitations => &["documents-list", "rag-messages", "sources-list"],
        Module::Guardrails => &[
            "industry-selector",
            "industry-description",
            "guardrails-grid",
            "test-prompts",
            "test-result",
            "config-preview",
        ],
        Module::ModelArena => &[
            "industry-selector",
            "industry-description",
            "model-selector",
            "prompt-selector",
            "arena-results",
        ],
        Module::FineTuning => &[
            "industry-selector",
            "finetune-query-select",
            "before-response",
            "after-response",
            "before-issues",
            "after-improvements",
            "before-accuracy",
            "after-accuracy",
            "accuracy-improvement",
            "training-examples",
            "training-time",
            "training-cost",
        ],
        Module::ModelLab => &[
            "technique-cards",
            "technique-details",
            "training-loader",
            "progress-bar",
            "progress-percent",
            "status-icon",
            "status-text",
            "epoch-value",
            "loss-value",
            "gpu-value",
            "elapsed-time",
            "training-log",
            "comparison-section",
            "base-model-name",
            "before-output",
            "before-accuracy",
            "before-accuracy-value",
            "finetuned-model-name",
            "after-output",
            "after-accuracy",
            "after-accuracy-value",
            "accuracy-improvement",
            "training-examples",
            "training-time",
            "adapter-size",
        ],
        Module::InfraRecommender => &[
            "industry-options",
            "useCase-options",
            "volume-options",
            "latency-options",
            "compliance-options",
            "budget-options",
            "form-progress",
            "recommendation-result",
        ],
        Module::DataSovereignty => &[
            "architecture-selector",
            "compliance-frameworks",
            "compliance-status",
            "data-flow-diagram",
            "flow-step-0",
            "flow-step-1",
            "flow-step-2",
            "flow-step-3",
            "sovereignty-comparison",
            "security-controls",
        ],
    }
}

/// Ids that live inside another container's markup rather than on the page
fn is_nested(id: &str) -> bool {
    id.starts_with("flow-step-")
}

pub fn dashboard_fragments() -> Vec<Fragment> {
    let cards: String = dashboard_cards()
        .iter()
        .map(|card| {
            format!(
                r#"<a class="module-card" data-module="{}" href="{}"><div class="module-icon">{}</div><h3 class="module-title">{}</h3><p class="module-description">{}</p></a>"#,
                card.module.key(),
                card.href,
                card.icon,
                card.title,
                escape(card.description)
            )
        })
        .collect();
    vec![Fragment::new("module-cards", cards)]
}

/// A surface holding every container of `module`, filled with `fragments`
pub fn page_surface(module: Module, fragments: &[Fragment]) -> MemorySurface {
    let mut surface = MemorySurface::with_targets(containers(module).iter().copied());
    for fragment in fragments {
        surface.write_fragment(fragment);
    }
    surface
}

/// Full HTML document for a module page in its current state
pub fn render_page(module: Module, surface: &MemorySurface) -> String {
    let in_pages_dir = module != Module::Dashboard;
    let stylesheet = if in_pages_dir { "../css/styles.css" } else { "css/styles.css" };

    let body: String = containers(module)
        .iter()
        .filter(|id| !is_nested(id))
        .map(|id| {
            let html = surface.html(id).unwrap_or_default();
            let class = surface.class(id).unwrap_or_default();
            if id.ends_with("-select") {
                format!(r#"<select id="{}" class="{}">{}</select>"#, id, class, html)
            } else {
                format!(r#"<div id="{}" class="{}">{}</div>"#, id, class, html)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - SLM Command Center</title>
<link rel="stylesheet" href="{stylesheet}">
</head>
<body data-module="{key}">
<aside class="sidebar">{nav}</aside>
<main class="main-content">
<header class="page-header"><h1>{icon} {title}</h1><p class="page-description">{description}</p></header>
<div id="toast-container"></div>
{body}
</main>
</body>
</html>
"#,
        title = module.title(),
        stylesheet = stylesheet,
        key = module.key(),
        nav = render_nav(module, in_pages_dir),
        icon = module.icon(),
        description = escape(module.description()),
        body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::Session;

    #[test]
    fn test_fragments_land_in_declared_containers() {
        let session = Session::with_seed(Config::default(), 3);
        for module in Module::ALL {
            let ids = containers(module);
            for fragment in session.render(module) {
                assert!(
                    ids.contains(&fragment.target.as_str()),
                    "{} renders into undeclared '{}'",
                    module.key(),
                    fragment.target
                );
            }
        }
    }

    #[test]
    fn test_dashboard_page() {
        let surface = page_surface(Module::Dashboard, &dashboard_fragments());
        let html = render_page(Module::Dashboard, &surface);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"href="css/styles.css""#));
        assert_eq!(html.matches(r#"class="module-card""#).count(), 8);
        assert!(html.contains(r#"href="pages/cost-ticker.html""#));
    }

    #[test]
    fn test_module_page_links_up() {
        let session = Session::with_seed(Config::default(), 3);
        let surface = page_surface(Module::CostTicker, &session.render(Module::CostTicker));
        let html = render_page(Module::CostTicker, &surface);
        assert!(html.contains(r#"href="../css/styles.css""#));
        assert!(html.contains(r#"<select id="api-model-select" class="">"#));
        assert!(html.contains(r#"<div id="api-response" class=""></div>"#));
        assert!(html.contains(r#"<a class="nav-item active" data-module="cost-ticker""#));
    }

    #[test]
    fn test_nested_ids_stay_inside_diagram() {
        let session = Session::with_seed(Config::default(), 3);
        let surface = page_surface(Module::DataSovereignty, &session.render(Module::DataSovereignty));
        let html = render_page(Module::DataSovereignty, &surface);
        assert_eq!(html.matches(r#"id="flow-step-0""#).count(), 1);
    }
}
