// ⚔️ Model Arena - one prompt, several models, side-by-side scores
//
// Responses come from an industry × model template table. Metrics are
// randomized within fixed bands, with fine-tuned models scoring higher.

use crate::config::AnimationConfig;
use crate::error::{CommandCenterError, Result};
use crate::export::{date_stamp, ExportDocument, Exportable};
use crate::markup::{class_if, escape, loader, Fragment};
use crate::modules::Run;
use crate::state::{Catalog, RunGuard, Selection};
use crate::typing::{loader_delay, Keyframe, Timeline};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

pub const MODULE: &str = "model-arena";

pub const MAX_MODELS: usize = 4;
pub const MIN_MODELS: usize = 2;

pub const QUANTIZATIONS: [&str; 3] = ["FP16", "INT8", "INT4"];

/// Per-model settle time after the shared loader delay
const MODEL_DELAY: Duration = Duration::from_millis(100);

const DEFAULT_COST_PER_1K: f64 = 0.0004;

// ============================================================================
// CATALOGS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ArenaPrompt {
    pub label: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArenaIndustry {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub prompts: Vec<ArenaPrompt>,
    pub evaluation_criteria: [&'static str; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Domain fine-tuned model with a benchmark improvement label
    FineTuned {
        domain: &'static str,
        improvement: &'static str,
    },
    Base,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArenaModel {
    pub name: &'static str,
    pub params: &'static str,
    pub quantization: &'static str,
    pub vram: &'static str,
    pub speed: &'static str,
    pub kind: ModelKind,
}

impl ArenaModel {
    pub fn is_fine_tuned(&self) -> bool {
        matches!(self.kind, ModelKind::FineTuned { .. })
    }
}

fn arena_prompt(label: &'static str, text: &'static str) -> ArenaPrompt {
    ArenaPrompt { label, text }
}

pub fn industry_catalog() -> Catalog<ArenaIndustry> {
    Catalog::new("industry")
        .with("general", ArenaIndustry {
            name: "General",
            icon: "🔷",
            description: "General purpose comparison",
            prompts: vec![
                arena_prompt("Summarization", "Summarize the key points of this quarterly business report in 3 bullet points."),
                arena_prompt("Code Generation", "Write a Python function to validate email addresses using regex."),
                arena_prompt("Analysis", "Analyze the pros and cons of remote work policies for enterprise companies."),
            ],
            evaluation_criteria: ["Accuracy", "Coherence", "Completeness", "Relevance"],
        })
        .with("healthcare", ArenaIndustry {
            name: "Healthcare",
            icon: "🏥",
            description: "Clinical accuracy comparison",
            prompts: vec![
                arena_prompt("Clinical Summary", "Summarize this patient presentation: 65yo M with HTN, presenting with substernal chest pain radiating to left arm, diaphoresis, and shortness of breath x 2 hours."),
                arena_prompt("ICD-10 Coding", "Suggest appropriate ICD-10 codes for: Type 2 diabetes with diabetic chronic kidney disease, stage 4."),
                arena_prompt("Drug Interaction", "Identify potential interactions between warfarin, aspirin, and omeprazole."),
            ],
            evaluation_criteria: ["Medical Accuracy", "Terminology", "Safety Awareness", "HIPAA Compliance"],
        })
        .with("financial", ArenaIndustry {
            name: "Financial Services",
            icon: "🏦",
            description: "Financial accuracy comparison",
            prompts: vec![
                arena_prompt("Risk Analysis", "Analyze the risk factors from this SEC 10-K excerpt regarding market concentration in APAC region with 40% revenue exposure."),
                arena_prompt("Earnings Summary", "Summarize key metrics from Q3 earnings: Revenue $2.4B (+15% YoY), EPS $1.23 vs $1.18 expected, gross margin 42.3%."),
                arena_prompt("Compliance Check", "Review this client communication for potential compliance issues: \"This investment is guaranteed to double your money within 6 months.\""),
            ],
            evaluation_criteria: ["Numerical Accuracy", "Regulatory Awareness", "Risk Identification", "Disclaimer Usage"],
        })
        .with("retail", ArenaIndustry {
            name: "Retail & E-commerce",
            icon: "🛒",
            description: "Product content comparison",
            prompts: vec![
                arena_prompt("Product Description", "Write an SEO-optimized product description for wireless noise-canceling headphones with 30-hour battery life."),
                arena_prompt("Review Analysis", "Analyze sentiment from these reviews: \"Great sound but uncomfortable after 2 hours\", \"Best headphones ever, worth every penny\", \"Good but not worth $300\""),
                arena_prompt("Translation", "Translate this product title and description to Spanish: \"Premium Wireless Earbuds - Crystal clear sound with active noise cancellation\""),
            ],
            evaluation_criteria: ["Brand Voice", "SEO Quality", "Accuracy", "Engagement"],
        })
        .with("customer_service", ArenaIndustry {
            name: "Customer Service",
            icon: "💬",
            description: "Support response comparison",
            prompts: vec![
                arena_prompt("Ticket Response", "Draft a response to: \"I was charged twice for my subscription this month and I want a refund immediately!\""),
                arena_prompt("Knowledge Search", "Find relevant KB articles for: Customer unable to reset password, email not receiving reset link"),
                arena_prompt("Escalation Decision", "Determine if this requires escalation: \"This is the third time calling about the same issue. If not resolved today, I will cancel and post negative reviews everywhere.\""),
            ],
            evaluation_criteria: ["Empathy", "Resolution Quality", "Policy Adherence", "Escalation Accuracy"],
        })
}

fn fine_tuned(name: &'static str, params: &'static str, vram: &'static str, speed: &'static str, domain: &'static str, improvement: &'static str) -> ArenaModel {
    ArenaModel {
        name,
        params,
        quantization: "FP16",
        vram,
        speed,
        kind: ModelKind::FineTuned { domain, improvement },
    }
}

fn base(name: &'static str, params: &'static str, quantization: &'static str, vram: &'static str, speed: &'static str) -> ArenaModel {
    ArenaModel {
        name,
        params,
        quantization,
        vram,
        speed,
        kind: ModelKind::Base,
    }
}

pub fn model_catalog() -> Catalog<ArenaModel> {
    Catalog::new("model")
        .with("sk-clinical-7b", fine_tuned("SK-Clinical-7B", "7B", "14GB", "Fast", "healthcare", "+35%"))
        .with("sk-finance-7b", fine_tuned("SK-Finance-7B", "7B", "14GB", "Fast", "financial", "+28%"))
        .with("sk-legal-3b", fine_tuned("SK-Legal-3B", "3.8B", "8GB", "Very Fast", "legal", "+41%"))
        .with("sk-commerce-3b", fine_tuned("SK-Commerce-3B", "3B", "6GB", "Very Fast", "retail", "+38%"))
        .with("mistral-7b", base("Mistral 7B", "7B", "FP16", "14GB", "Fast"))
        .with("phi-3.5", base("Phi-3.5 Mini", "3.8B", "FP16", "8GB", "Very Fast"))
        .with("llama-3.2-3b", base("Llama 3.2 3B", "3B", "FP16", "6GB", "Very Fast"))
        .with("qwen-2.5-7b", base("Qwen 2.5 7B", "7B", "FP16", "14GB", "Fast"))
        .with("gemma-2-9b", base("Gemma 2 9B", "9B", "INT8", "10GB", "Medium"))
}

/// Canned answer for `model` in `industry`: the model's own template, the
/// industry default, or a generic sentence.
pub fn response_for(industry_key: &str, industry: &ArenaIndustry, model_key: &str, model: &ArenaModel) -> String {
    let templates: &[(&str, &str)] = match industry_key {
        "healthcare" => &[
            ("mistral-7b", "Based on the clinical presentation, this patient presents with classic symptoms of acute coronary syndrome (ACS). Immediate ECG and troponin levels are indicated. Key differentials include STEMI, NSTEMI, and unstable angina. [Clinical assessment generated with medical terminology alignment]"),
            ("phi-3.5", "Patient symptoms suggest cardiac etiology. Recommend: 1) Stat ECG 2) Troponin x2 3) Cardiology consult. Risk stratification using HEART score advised. [Compact clinical summary]"),
            ("default", "Clinical assessment indicates cardiac workup is warranted. Standard ACS protocol should be initiated with appropriate monitoring."),
        ],
        "financial" => &[
            ("mistral-7b", "Risk Analysis: The 40% APAC revenue concentration represents significant geographic risk. Key concerns: 1) Currency exposure 2) Regulatory changes 3) Economic slowdown impact. Recommend diversification strategy. [Comprehensive financial analysis]"),
            ("qwen-2.5-7b", "Geographic concentration risk identified. APAC 40% exposure creates vulnerability to regional economic cycles. Mitigation strategies should include market diversification and hedging instruments. [Detailed risk assessment with quantitative focus]"),
            ("default", "Significant concentration risk identified in APAC region. Further diversification analysis recommended."),
        ],
        "retail" => &[
            ("mistral-7b", "Premium Wireless Headphones: Immerse yourself in studio-quality sound with advanced noise cancellation. 30 hours of uninterrupted playback. Comfortable over-ear design. Perfect for travel, work, and everything in between. [SEO Score: 92/100]"),
            ("phi-3.5", "Experience Superior Sound | 30hr Battery | Active Noise Cancellation | Wireless Freedom. Premium audio meets all-day comfort. Shop now! [Optimized for conversion]"),
            ("default", "High-quality wireless headphones with excellent battery life and noise cancellation features."),
        ],
        "customer_service" => &[
            ("mistral-7b", "I sincerely apologize for the double charge on your account. I can see both transactions and will process an immediate refund for the duplicate charge. The refund will appear within 3-5 business days. Is there anything else I can help you with today? [Empathy + Resolution]"),
            ("phi-3.5", "Sorry for the billing error! I've initiated a refund for the duplicate charge - you'll see it in 3-5 days. Reference #RF-12345 for your records. Anything else? [Efficient + Friendly]"),
            ("default", "I apologize for the inconvenience. A refund has been initiated for the duplicate charge."),
        ],
        _ => &[],
    };

    let lookup = |key: &str| templates.iter().find(|(k, _)| *k == key).map(|(_, t)| t.to_string());

    lookup(model_key).or_else(|| lookup("default")).unwrap_or_else(|| {
        format!(
            "Response generated by {} for the given prompt. This model demonstrates strong performance on {} tasks.",
            model.name, industry.name
        )
    })
}

pub fn cost_per_1k(model_key: &str) -> f64 {
    match model_key {
        "mistral-7b" => 0.0004,
        "phi-3.5" => 0.0003,
        "llama-3.2-3b" => 0.0003,
        "qwen-2.5-7b" => 0.0004,
        "gemma-2-9b" => 0.0005,
        _ => DEFAULT_COST_PER_1K,
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub latency: u32,
    pub tokens_per_sec: u32,
    pub cost_per_1k: f64,
    pub quality: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResult {
    pub model_id: String,
    pub model_name: &'static str,
    pub params: &'static str,
    pub response: String,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArenaOutcome {
    pub industry: String,
    pub prompt: String,
    pub results: Vec<ModelResult>,
    pub winner: String,
}

/// Highest quality wins; on a tie the later model wins
pub fn winner(results: &[ModelResult]) -> Option<&ModelResult> {
    results
        .iter()
        .reduce(|a, b| if a.metrics.quality > b.metrics.quality { a } else { b })
}

// ============================================================================
// STATE
// ============================================================================

pub struct ModelArena {
    industries: Catalog<ArenaIndustry>,
    models: Catalog<ArenaModel>,
    industry: Selection,
    selected: Vec<String>,
    quantization: &'static str,
    results: Option<ArenaOutcome>,
    guard: RunGuard,
}

impl ModelArena {
    pub fn new() -> Self {
        let industries = industry_catalog();
        let industry = Selection::or_first(&industries, "general");
        ModelArena {
            industries,
            models: model_catalog(),
            industry,
            selected: vec!["sk-clinical-7b".to_string(), "mistral-7b".to_string()],
            quantization: "FP16",
            results: None,
            guard: RunGuard::default(),
        }
    }

    pub fn industries(&self) -> &Catalog<ArenaIndustry> {
        &self.industries
    }

    pub fn models(&self) -> &Catalog<ArenaModel> {
        &self.models
    }

    pub fn industry_key(&self) -> &str {
        self.industry.key()
    }

    pub fn industry(&self) -> &ArenaIndustry {
        self.industry.resolve(&self.industries)
    }

    pub fn selected_models(&self) -> &[String] {
        &self.selected
    }

    pub fn quantization(&self) -> &str {
        self.quantization
    }

    pub fn results(&self) -> Option<&ArenaOutcome> {
        self.results.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    pub fn set_industry(&mut self, key: &str) -> Result<()> {
        self.industry.set(&self.industries, key)?;
        self.results = None;
        tracing::debug!("arena: industry -> {}", key);
        Ok(())
    }

    /// Check or uncheck a model. At most four can be compared.
    pub fn toggle_model(&mut self, key: &str, checked: bool) -> Result<()> {
        self.models.require(key)?;
        let present = self.selected.iter().any(|m| m == key);

        if checked && !present {
            if self.selected.len() >= MAX_MODELS {
                return Err(CommandCenterError::SelectionLimit { max: MAX_MODELS });
            }
            self.selected.push(key.to_string());
        } else if !checked {
            self.selected.retain(|m| m != key);
        }
        Ok(())
    }

    pub fn set_quantization(&mut self, value: &str) -> Result<()> {
        self.quantization = QUANTIZATIONS
            .iter()
            .copied()
            .find(|q| *q == value)
            .ok_or_else(|| CommandCenterError::unknown("quantization", value))?;
        Ok(())
    }

    /// Sample prompt text for the prompt buttons
    pub fn prompt_text(&self, index: usize) -> Result<&'static str> {
        self.industry()
            .prompts
            .get(index)
            .map(|p| p.text)
            .ok_or_else(|| CommandCenterError::unknown("prompt", index.to_string()))
    }

    pub fn run_comparison<R: Rng + ?Sized>(
        &mut self,
        prompt: &str,
        rng: &mut R,
        animation: &AnimationConfig,
    ) -> Result<Run<ArenaOutcome>> {
        if self.selected.len() < MIN_MODELS {
            return Err(CommandCenterError::invalid("Select at least 2 models to compare"));
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(CommandCenterError::invalid("Enter a prompt to compare"));
        }
        let ticket = self.guard.start(MODULE)?;

        let industry_key = self.industry.key().to_string();
        let industry = self.industry.resolve(&self.industries);

        let mut results = Vec::with_capacity(self.selected.len());
        for key in &self.selected {
            let model = self.models.require(key)?;
            let base_quality = if model.is_fine_tuned() { 88.0 } else { 75.0 };
            results.push(ModelResult {
                model_id: key.clone(),
                model_name: model.name,
                params: model.params,
                response: response_for(&industry_key, industry, key, model),
                metrics: Metrics {
                    latency: (80.0 + rng.gen::<f64>() * 60.0).round() as u32,
                    tokens_per_sec: (80.0 + rng.gen::<f64>() * 120.0).round() as u32,
                    cost_per_1k: cost_per_1k(key),
                    quality: (base_quality + rng.gen::<f64>() * 10.0).round() as u32,
                },
            });
        }

        let winner_id = winner(&results).map(|r| r.model_id.clone()).unwrap_or_default();
        let outcome = ArenaOutcome {
            industry: industry_key,
            prompt: prompt.to_string(),
            results,
            winner: winner_id,
        };

        let subtitle = format!(
            "Comparing {} models on {} benchmark",
            self.selected.len(),
            industry.name
        );
        let delay = loader_delay(rng, animation) + animation.scale(MODEL_DELAY);
        let timeline = Timeline::new()
            .with(std::iter::once(Keyframe::html(
                Duration::ZERO,
                "arena-results",
                loader("comparison", "Running Model Comparison", &subtitle, 5),
            )))
            .with(std::iter::once(Keyframe::html(
                delay,
                "arena-results",
                self.render_results(&outcome),
            )));

        tracing::info!("arena: {} models, winner {}", outcome.results.len(), outcome.winner);
        self.results = Some(outcome.clone());
        Ok(Run::new(outcome, timeline, ticket))
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    pub fn render_industry_tabs(&self) -> String {
        let tabs: String = self
            .industries
            .iter()
            .map(|(key, industry)| {
                format!(
                    r#"<button class="industry-tab {}" data-industry="{}"><span class="industry-icon">{}</span><span class="industry-name">{}</span></button>"#,
                    class_if(self.industry.is(key), "active"),
                    key,
                    industry.icon,
                    industry.name
                )
            })
            .collect();
        format!(r#"<div class="industry-tabs">{}</div>"#, tabs)
    }

    pub fn render_model_selector(&self) -> String {
        let checked = |key: &str| class_if(self.selected.iter().any(|m| m == key), "checked");

        let mut fine = String::new();
        let mut base = String::new();
        for (key, model) in self.models.iter() {
            match model.kind {
                ModelKind::FineTuned { improvement, .. } => fine.push_str(&format!(
                    r#"<label class="model-checkbox shellkode"><input type="checkbox" value="{}" {}><span class="model-info"><span class="model-name">{} <span class="sk-badge">SK</span></span><span class="model-meta">{} • {} • <span class="improvement">{}</span></span></span></label>"#,
                    key, checked(key), model.name, model.params, model.vram, improvement
                )),
                ModelKind::Base => base.push_str(&format!(
                    r#"<label class="model-checkbox"><input type="checkbox" value="{}" {}><span class="model-info"><span class="model-name">{}</span><span class="model-meta">{} • {}</span></span></label>"#,
                    key, checked(key), model.name, model.params, model.vram
                )),
            }
        }

        format!(
            r#"<div class="model-section-label fine-tuned">🏆 ShellKode Fine-Tuned Models</div><div class="model-checkboxes">{}</div><div class="model-section-label">Base Models</div><div class="model-checkboxes">{}</div>"#,
            fine, base
        )
    }

    pub fn render_prompts(&self) -> String {
        let buttons: String = self
            .industry()
            .prompts
            .iter()
            .enumerate()
            .map(|(i, p)| format!(r#"<button class="prompt-btn" data-index="{}">{}</button>"#, i, p.label))
            .collect();
        format!(r#"<div class="prompt-buttons">{}</div>"#, buttons)
    }

    pub fn render_results(&self, outcome: &ArenaOutcome) -> String {
        let industry = self
            .industries
            .get(&outcome.industry)
            .unwrap_or_else(|| self.industry());

        let cards: String = outcome
            .results
            .iter()
            .map(|r| {
                let is_winner = r.model_id == outcome.winner;
                format!(
                    r#"<div class="result-card {}">{}<div class="result-header"><span class="model-name">{}</span><span class="model-params">{}</span></div><div class="result-response">{}</div><div class="result-metrics"><div class="metric"><span class="metric-label">Latency</span><span class="metric-value">{}ms</span></div><div class="metric"><span class="metric-label">Tokens/sec</span><span class="metric-value">{}</span></div><div class="metric"><span class="metric-label">Cost/1K</span><span class="metric-value">${}</span></div><div class="metric"><span class="metric-label">Quality</span><span class="metric-value quality-score">{}%</span></div></div></div>"#,
                    class_if(is_winner, "winner"),
                    if is_winner { r#"<span class="winner-badge">🏆 Best</span>"# } else { "" },
                    r.model_name,
                    r.params,
                    escape(&r.response),
                    r.metrics.latency,
                    r.metrics.tokens_per_sec,
                    r.metrics.cost_per_1k,
                    r.metrics.quality
                )
            })
            .collect();

        let criteria: String = industry
            .evaluation_criteria
            .iter()
            .map(|c| format!(r#"<span class="criterion">{}</span>"#, c))
            .collect();

        format!(
            r#"<div class="results-header"><h4>Comparison Results</h4><span class="industry-badge">{} {}</span></div><div class="results-grid">{}</div><div class="evaluation-criteria"><h5>Evaluation Criteria ({})</h5><div class="criteria-list">{}</div></div>"#,
            industry.icon, industry.name, cards, industry.name, criteria
        )
    }

    pub fn render_empty_results() -> Fragment {
        Fragment::new("arena-results", r#"<div class="no-results">Select models and run comparison</div>"#)
    }

    pub fn render(&self) -> Vec<Fragment> {
        let results = match &self.results {
            Some(outcome) => Fragment::new("arena-results", self.render_results(outcome)),
            None => ModelArena::render_empty_results(),
        };
        vec![
            Fragment::new("industry-selector", self.render_industry_tabs()),
            Fragment::new("industry-description", self.industry().description),
            Fragment::new("model-selector", self.render_model_selector()),
            Fragment::new("prompt-selector", self.render_prompts()),
            results,
        ]
    }
}

impl Default for ModelArena {
    fn default() -> Self {
        ModelArena::new()
    }
}

impl Exportable for ModelArena {
    fn export(&self, now: DateTime<Utc>) -> Result<ExportDocument> {
        let body = json!({
            "exportDate": now.to_rfc3339(),
            "industry": self.industry.key(),
            "industryName": self.industry().name,
            "quantization": self.quantization,
            "selectedModels": self.selected,
            "evaluationCriteria": self.industry().evaluation_criteria,
            "comparison": self.results,
        });
        ExportDocument::new(format!("model-arena-results-{}.json", date_stamp(now)), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn result(id: &str, quality: u32) -> ModelResult {
        ModelResult {
            model_id: id.to_string(),
            model_name: "x",
            params: "7B",
            response: String::new(),
            metrics: Metrics {
                latency: 100,
                tokens_per_sec: 100,
                cost_per_1k: 0.0004,
                quality,
            },
        }
    }

    #[test]
    fn test_winner_ties_go_to_later_model() {
        let results = vec![result("a", 90), result("b", 95), result("c", 95)];
        assert_eq!(winner(&results).unwrap().model_id, "c");
        assert!(winner(&[]).is_none());
    }

    #[test]
    fn test_toggle_model_limits() {
        let mut arena = ModelArena::new();
        arena.toggle_model("phi-3.5", true).unwrap();
        arena.toggle_model("gemma-2-9b", true).unwrap();
        assert!(matches!(
            arena.toggle_model("qwen-2.5-7b", true),
            Err(CommandCenterError::SelectionLimit { max: 4 })
        ));
        // re-checking an already selected model is not an error
        arena.toggle_model("phi-3.5", true).unwrap();
        assert_eq!(arena.selected_models().len(), 4);

        arena.toggle_model("phi-3.5", false).unwrap();
        assert_eq!(arena.selected_models().len(), 3);
        assert!(arena.toggle_model("gpt-9", true).is_err());
    }

    #[test]
    fn test_run_requires_two_models_and_prompt() {
        let mut arena = ModelArena::new();
        let mut rng = StdRng::seed_from_u64(3);
        let animation = AnimationConfig::default();

        assert!(matches!(
            arena.run_comparison("  ", &mut rng, &animation),
            Err(CommandCenterError::InvalidInput(_))
        ));

        arena.toggle_model("mistral-7b", false).unwrap();
        assert!(arena.run_comparison("hi", &mut rng, &animation).is_err());
    }

    #[test]
    fn test_results_show_at_once_without_animation() {
        let mut arena = ModelArena::new();
        let mut rng = StdRng::seed_from_u64(3);
        let animation = AnimationConfig {
            enabled: false,
            ..AnimationConfig::default()
        };
        let (outcome, script, _ticket) = arena.run_comparison("hi", &mut rng, &animation).unwrap().into_script();
        assert_eq!(script.len(), 2);
        assert!(script.iter().all(|f| f.at.is_zero()));
        assert!(!outcome.winner.is_empty());
    }

    #[test]
    fn test_metrics_in_bands() {
        let mut arena = ModelArena::new();
        arena.set_industry("healthcare").unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let run = arena.run_comparison("chest pain", &mut rng, &AnimationConfig::default()).unwrap();
            let fine = &run.outcome.results[0];
            let base = &run.outcome.results[1];
            assert!((88..=98).contains(&fine.metrics.quality));
            assert!((75..=85).contains(&base.metrics.quality));
            assert!((80..=140).contains(&fine.metrics.latency));
            assert!((80..=200).contains(&base.metrics.tokens_per_sec));
            assert_eq!(base.metrics.cost_per_1k, 0.0004);
            assert_eq!(run.outcome.winner, winner(&run.outcome.results).unwrap().model_id);
        }
    }

    #[test]
    fn test_response_templates() {
        let industries = industry_catalog();
        let models = model_catalog();
        let health = industries.get("healthcare").unwrap();
        let general = industries.get("general").unwrap();

        let phi = models.get("phi-3.5").unwrap();
        assert!(response_for("healthcare", health, "phi-3.5", phi).starts_with("Patient symptoms suggest"));

        let sk = models.get("sk-clinical-7b").unwrap();
        assert!(response_for("healthcare", health, "sk-clinical-7b", sk).starts_with("Clinical assessment indicates"));

        assert_eq!(
            response_for("general", general, "phi-3.5", phi),
            "Response generated by Phi-3.5 Mini for the given prompt. This model demonstrates strong performance on General tasks."
        );
    }

    #[test]
    fn test_cost_table() {
        assert_eq!(cost_per_1k("gemma-2-9b"), 0.0005);
        assert_eq!(cost_per_1k("sk-legal-3b"), 0.0004);
    }

    #[test]
    fn test_set_industry_clears_results() {
        let mut arena = ModelArena::new();
        let run = arena
            .run_comparison("x", &mut StdRng::seed_from_u64(1), &AnimationConfig::default())
            .unwrap();
        drop(run);
        assert!(arena.results().is_some());

        arena.set_industry("retail").unwrap();
        assert!(arena.results().is_none());
        assert!(arena.render()[4].html.contains("Select models and run comparison"));
    }

    #[test]
    fn test_render_results_marks_winner() {
        let arena = ModelArena::new();
        let outcome = ArenaOutcome {
            industry: "general".into(),
            prompt: "p".into(),
            results: vec![result("a", 80), result("b", 90)],
            winner: "b".into(),
        };
        let html = arena.render_results(&outcome);
        assert_eq!(html.matches("🏆 Best").count(), 1);
        assert!(html.contains(r#"<span class="metric-value">$0.0004</span>"#));
        assert!(html.contains("Evaluation Criteria (General)"));
        assert!(html.contains(r#"<span class="criterion">Coherence</span>"#));
    }

    #[test]
    fn test_render_model_selector() {
        let arena = ModelArena::new();
        let html = arena.render_model_selector();
        assert!(html.contains(r#"<input type="checkbox" value="sk-clinical-7b" checked>"#));
        assert!(html.contains(r#"<input type="checkbox" value="phi-3.5" >"#));
        assert!(html.contains("+41%"));
    }

    #[test]
    fn test_quantization() {
        let mut arena = ModelArena::new();
        arena.set_quantization("INT8").unwrap();
        assert_eq!(arena.quantization(), "INT8");
        assert!(arena.set_quantization("FP8").is_err());
        assert_eq!(arena.quantization(), "INT8");
    }
}
