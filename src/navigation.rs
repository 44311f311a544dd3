// 🧭 Navigation - the module list, page paths and dashboard cards

use crate::error::{CommandCenterError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Module {
    Dashboard,
    CostTicker,
    RagCitations,
    Guardrails,
    ModelArena,
    FineTuning,
    ModelLab,
    InfraRecommender,
    DataSovereignty,
}

impl Module {
    pub const ALL: [Module; 9] = [
        Module::Dashboard,
        Module::CostTicker,
        Module::RagCitations,
        Module::Guardrails,
        Module::ModelArena,
        Module::FineTuning,
        Module::ModelLab,
        Module::InfraRecommender,
        Module::DataSovereignty,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Module::Dashboard => "dashboard",
            Module::CostTicker => "cost-ticker",
            Module::RagCitations => "rag-citations",
            Module::Guardrails => "guardrails",
            Module::ModelArena => "model-arena",
            Module::FineTuning => "fine-tuning",
            Module::ModelLab => "model-lab",
            Module::InfraRecommender => "infra-recommender",
            Module::DataSovereignty => "data-sovereignty",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Module::Dashboard => "Dashboard",
            Module::CostTicker => "Cost Ticker",
            Module::RagCitations => "RAG Citations",
            Module::Guardrails => "Guardrails",
            Module::ModelArena => "Model Arena",
            Module::FineTuning => "Fine-Tuning",
            Module::ModelLab => "Model Lab",
            Module::InfraRecommender => "Infra Recommender",
            Module::DataSovereignty => "Data Sovereignty",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Module::Dashboard => "🏠",
            Module::CostTicker => "💰",
            Module::RagCitations => "📚",
            Module::Guardrails => "🛡️",
            Module::ModelArena => "⚔️",
            Module::FineTuning => "🎯",
            Module::ModelLab => "🧪",
            Module::InfraRecommender => "🖥️",
            Module::DataSovereignty => "🔒",
        }
    }

    /// One-line pitch shown on the dashboard card
    pub fn description(&self) -> &'static str {
        match self {
            Module::Dashboard => "Overview of every demo module",
            Module::CostTicker => "Watch per-query costs accumulate side by side: hosted API vs self-hosted SLM",
            Module::RagCitations => "Answers grounded in company documents with clickable source citations",
            Module::Guardrails => "Industry-specific safety rules you can toggle and test live",
            Module::ModelArena => "Run one prompt against several models and compare quality, speed and cost",
            Module::FineTuning => "Before and after: a base model vs a domain fine-tuned model",
            Module::ModelLab => "Simulate a fine-tuning run from technique choice to final report",
            Module::InfraRecommender => "Answer five questions and get a model, GPU and platform recommendation",
            Module::DataSovereignty => "Deployment architectures that keep data inside your boundary",
        }
    }

    pub fn from_key(key: &str) -> Result<Module> {
        Module::ALL
            .iter()
            .copied()
            .find(|m| m.key() == key)
            .ok_or_else(|| CommandCenterError::unknown("module", key))
    }

    fn index(&self) -> usize {
        Module::ALL.iter().position(|m| m == self).unwrap_or(0)
    }

    pub fn next(&self) -> Module {
        Module::ALL[(self.index() + 1) % Module::ALL.len()]
    }

    pub fn previous(&self) -> Module {
        let len = Module::ALL.len();
        Module::ALL[(self.index() + len - 1) % len]
    }

    /// Relative link to this module's page. Pages under `pages/` link
    /// back up with `../`.
    pub fn page_path(&self, in_pages_dir: bool) -> String {
        let base = if in_pages_dir { "../" } else { "" };
        match self {
            Module::Dashboard => format!("{}index.html", base),
            other => format!("{}pages/{}.html", base, other.key()),
        }
    }
}

/// Dashboard card for one module
#[derive(Debug, Clone, Serialize)]
pub struct ModuleCard {
    pub module: Module,
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub href: String,
}

pub fn dashboard_cards() -> Vec<ModuleCard> {
    Module::ALL
        .iter()
        .filter(|m| **m != Module::Dashboard)
        .map(|m| ModuleCard {
            module: *m,
            icon: m.icon(),
            title: m.title(),
            description: m.description(),
            href: m.page_path(false),
        })
        .collect()
}

/// Sidebar links with the current module marked active
pub fn render_nav(current: Module, in_pages_dir: bool) -> String {
    let mut html = String::from(r#"<nav class="sidebar-nav">"#);
    for module in Module::ALL.iter() {
        html.push_str(&format!(
            r#"<a class="nav-item {}" data-module="{}" href="{}"><span class="nav-icon">{}</span>{}</a>"#,
            crate::markup::class_if(*module == current, "active"),
            module.key(),
            module.page_path(in_pages_dir),
            module.icon(),
            module.title()
        ));
    }
    html.push_str("</nav>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for module in Module::ALL.iter() {
            assert_eq!(Module::from_key(module.key()).unwrap(), *module);
        }
        assert!(Module::from_key("settings").is_err());
    }

    #[test]
    fn test_page_paths() {
        assert_eq!(Module::Dashboard.page_path(false), "index.html");
        assert_eq!(Module::Dashboard.page_path(true), "../index.html");
        assert_eq!(Module::CostTicker.page_path(false), "pages/cost-ticker.html");
        assert_eq!(
            Module::ModelLab.page_path(true),
            "../pages/model-lab.html"
        );
    }

    #[test]
    fn test_next_previous_cycle() {
        assert_eq!(Module::Dashboard.next(), Module::CostTicker);
        assert_eq!(Module::DataSovereignty.next(), Module::Dashboard);
        assert_eq!(Module::Dashboard.previous(), Module::DataSovereignty);
    }

    #[test]
    fn test_dashboard_cards_skip_dashboard() {
        let cards = dashboard_cards();
        assert_eq!(cards.len(), 8);
        assert_eq!(cards[0].module, Module::CostTicker);
        assert_eq!(cards[0].href, "pages/cost-ticker.html");
    }

    #[test]
    fn test_render_nav_marks_active() {
        let html = render_nav(Module::Guardrails, true);
        assert!(html.contains(r#"class="nav-item active" data-module="guardrails""#));
        assert!(html.contains(r#"href="../index.html""#));
    }
}
