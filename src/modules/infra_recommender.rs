// 🏗️ Infrastructure Recommender - model + GPU + platform from a short form
//
// Six questions, five of them required. The recommendation is a fixed
// scoring pass over three small tables; the "thinking" is animation.

use crate::config::AnimationConfig;
use crate::error::{CommandCenterError, Result};
use crate::export::{date_stamp, ExportDocument, Exportable};
use crate::format::plural;
use crate::markup::{class_if, escape, Fragment};
use crate::modules::Run;
use crate::notice::Notice;
use crate::state::{Catalog, RunGuard, Selection};
use crate::typing::{Keyframe, Timeline};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

pub const MODULE: &str = "infra-recommender";

const THINKING_STEP: Duration = Duration::from_millis(500);
const STEP_HIGHLIGHT: Duration = Duration::from_millis(200);
const THINKING_SETTLE: Duration = Duration::from_millis(300);
const HOURS_PER_MONTH: f64 = 730.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Per-query price of the hosted model the savings are measured against
pub const HOSTED_COST_PER_QUERY: f64 = 0.03;

pub const THINKING_STEPS: [&str; 6] = [
    "Analyzing requirements",
    "Evaluating models",
    "Calculating costs",
    "Optimizing latency",
    "Checking compliance",
    "Finalizing",
];

// ============================================================================
// FORM OPTIONS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub name: &'static str,
    pub icon: Option<&'static str>,
    /// Queries/day for volumes, milliseconds for latency, monthly max for budgets
    pub value: u64,
}

const fn choice(name: &'static str, icon: Option<&'static str>, value: u64) -> Choice {
    Choice { name, icon, value }
}

/// The single-choice questions on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Industry,
    UseCase,
    Volume,
    Latency,
    Budget,
}

impl Field {
    pub const REQUIRED: [Field; 5] = [
        Field::Industry,
        Field::UseCase,
        Field::Volume,
        Field::Latency,
        Field::Budget,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Field::Industry => "industry",
            Field::UseCase => "useCase",
            Field::Volume => "volume",
            Field::Latency => "latency",
            Field::Budget => "budget",
        }
    }

    pub fn from_key(key: &str) -> Result<Field> {
        Field::REQUIRED
            .into_iter()
            .find(|f| f.key() == key)
            .ok_or_else(|| CommandCenterError::unknown("field", key))
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

fn field_catalogs() -> [Catalog<Choice>; 5] {
    [
        Catalog::new("industry")
            .with("healthcare", choice("Healthcare", Some("🏥"), 0))
            .with("financial", choice("Financial Services", Some("💰"), 0))
            .with("retail", choice("Retail/E-commerce", Some("🛒"), 0))
            .with("legal", choice("Legal", Some("⚖️"), 0))
            .with("customer-service", choice("Customer Service", Some("💬"), 0))
            .with("general", choice("General Purpose", Some("🎯"), 0)),
        Catalog::new("use case")
            .with("chatbot", choice("Chatbot/Assistant", Some("💬"), 0))
            .with("rag", choice("RAG/Document Q&A", Some("📄"), 0))
            .with("code", choice("Code Generation", Some("💻"), 0))
            .with("summarization", choice("Summarization", Some("📝"), 0))
            .with("classification", choice("Classification", Some("🏷️"), 0))
            .with("extraction", choice("Data Extraction", Some("🔍"), 0)),
        Catalog::new("volume")
            .with("low", choice("< 10K/day", None, 5_000))
            .with("medium", choice("10K-100K/day", None, 50_000))
            .with("high", choice("100K-1M/day", None, 500_000))
            .with("enterprise", choice("1M+/day", None, 2_000_000)),
        Catalog::new("latency")
            .with("realtime", choice("< 100ms", None, 100))
            .with("interactive", choice("< 500ms", None, 500))
            .with("standard", choice("< 2s", None, 2_000))
            .with("batch", choice("Batch OK", None, 30_000)),
        Catalog::new("budget")
            .with("startup", choice("< $2K/mo", None, 2_000))
            .with("growth", choice("$2K-10K/mo", None, 10_000))
            .with("enterprise", choice("$10K-50K/mo", None, 50_000))
            .with("unlimited", choice("$50K+/mo", None, 100_000)),
    ]
}

pub fn compliance_catalog() -> Catalog<&'static str> {
    Catalog::new("compliance")
        .with("hipaa", "HIPAA")
        .with("soc2", "SOC 2")
        .with("gdpr", "GDPR")
        .with("pci", "PCI-DSS")
        .with("none", "None Required")
}

// ============================================================================
// HARDWARE TABLES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub params: &'static str,
    pub vram: u32,
    pub strengths: &'static [&'static str],
    pub quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gpu {
    pub id: &'static str,
    pub name: &'static str,
    pub vram: u32,
    pub cost_hr: f64,
    pub instance: &'static str,
    pub provider: &'static str,
    /// Queries per second per instance
    pub throughput: u32,
}

impl Gpu {
    fn monthly_cost(&self) -> f64 {
        self.cost_hr * HOURS_PER_MONTH
    }

    fn value(&self) -> f64 {
        self.throughput as f64 / self.cost_hr
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: &'static str,
    pub name: &'static str,
    pub complexity: &'static str,
    pub scaling: &'static str,
    pub best_for: &'static str,
}

pub static MODELS: [ModelSpec; 6] = [
    ModelSpec { id: "mistral-7b", name: "Mistral 7B", params: "7B", vram: 14, strengths: &["rag", "chatbot", "general"], quality: 8.5 },
    ModelSpec { id: "phi-3-mini", name: "Phi-3.5 Mini", params: "3.8B", vram: 8, strengths: &["code", "extraction", "classification"], quality: 8.2 },
    ModelSpec { id: "llama-3.2-3b", name: "Llama 3.2 3B", params: "3B", vram: 6, strengths: &["chatbot", "summarization", "classification"], quality: 7.8 },
    ModelSpec { id: "llama-3.2-1b", name: "Llama 3.2 1B", params: "1B", vram: 2, strengths: &["classification", "extraction"], quality: 7.0 },
    ModelSpec { id: "qwen-2.5-7b", name: "Qwen 2.5 7B", params: "7B", vram: 14, strengths: &["code", "rag", "summarization"], quality: 8.4 },
    ModelSpec { id: "gemma-2-9b", name: "Gemma 2 9B", params: "9B", vram: 18, strengths: &["chatbot", "rag", "general"], quality: 8.3 },
];

pub static GPUS: [Gpu; 6] = [
    Gpu { id: "a10g", name: "NVIDIA A10G", vram: 24, cost_hr: 1.21, instance: "g5.2xlarge", provider: "AWS", throughput: 50 },
    Gpu { id: "a10g-xl", name: "NVIDIA A10G", vram: 24, cost_hr: 1.01, instance: "g5.xlarge", provider: "AWS", throughput: 40 },
    Gpu { id: "t4", name: "NVIDIA T4", vram: 16, cost_hr: 0.53, instance: "g4dn.xlarge", provider: "AWS", throughput: 25 },
    Gpu { id: "l4", name: "NVIDIA L4", vram: 24, cost_hr: 0.84, instance: "g2-standard-4", provider: "GCP", throughput: 55 },
    Gpu { id: "a100-40", name: "NVIDIA A100 40GB", vram: 40, cost_hr: 3.67, instance: "p4d.24xlarge", provider: "AWS", throughput: 120 },
    Gpu { id: "inf2", name: "AWS Inferentia2", vram: 32, cost_hr: 0.76, instance: "inf2.xlarge", provider: "AWS", throughput: 60 },
];

pub static PLATFORMS: [Platform; 4] = [
    Platform { id: "ec2", name: "Amazon EC2", complexity: "low", scaling: "manual", best_for: "Simple deployments" },
    Platform { id: "sagemaker", name: "Amazon SageMaker", complexity: "low", scaling: "auto", best_for: "Managed MLOps" },
    Platform { id: "eks", name: "Amazon EKS", complexity: "high", scaling: "advanced", best_for: "Multi-model, microservices" },
    Platform { id: "gke", name: "Google GKE", complexity: "high", scaling: "advanced", best_for: "Multi-cloud, GPU sharing" },
];

// ============================================================================
// SCORING
// ============================================================================

/// A completed form, resolved to catalog keys and values
#[derive(Debug, Clone, PartialEq)]
pub struct Requirements<'a> {
    pub use_case: &'a str,
    pub volume: &'a str,
    pub queries_per_day: u64,
    pub latency: &'a str,
    pub budget_max: u64,
    pub compliance: &'a [String],
}

pub fn model_score(model: &ModelSpec, use_case: &str, latency: &str) -> f64 {
    let mut score = model.quality * 10.0;
    if model.strengths.iter().any(|s| *s == use_case) {
        score += 20.0;
    }
    if latency == "realtime" && model.vram <= 8 {
        score += 15.0;
    }
    score
}

/// Models ordered best first; equal scores keep table order
pub fn rank_models(use_case: &str, latency: &str) -> Vec<(f64, &'static ModelSpec)> {
    let mut ranked: Vec<_> = MODELS
        .iter()
        .map(|m| (model_score(m, use_case, latency), m))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked
}

/// Cheapest-per-query GPU that holds the model within budget, else the first GPU
pub fn select_gpu(model: &ModelSpec, budget_max: u64) -> &'static Gpu {
    GPUS.iter()
        .filter(|g| g.vram >= model.vram && g.monthly_cost() <= budget_max as f64)
        .fold(None::<&Gpu>, |best, g| match best {
            Some(b) if b.value() >= g.value() => Some(b),
            _ => Some(g),
        })
        .unwrap_or(&GPUS[0])
}

pub fn select_platform(volume: &str, compliance: &[String]) -> &'static Platform {
    let needs = |key: &str| compliance.iter().any(|c| c == key);
    let id = if volume == "enterprise" || needs("hipaa") || needs("pci") {
        "eks"
    } else if volume == "high" {
        "sagemaker"
    } else {
        "ec2"
    };
    PLATFORMS.iter().find(|p| p.id == id).unwrap_or(&PLATFORMS[0])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub model: ModelSpec,
    pub score: f64,
    pub gpu: Gpu,
    pub platform: Platform,
    pub instances: u64,
    pub monthly_cost: f64,
    pub cost_per_query: f64,
    pub savings_percent: i64,
    pub estimated_latency_ms: u64,
    /// Total queries/second across instances
    pub throughput: u64,
}

pub fn calculate(req: &Requirements<'_>) -> Recommendation {
    let (score, model) = rank_models(req.use_case, req.latency)[0];
    let gpu = select_gpu(model, req.budget_max);
    let platform = select_platform(req.volume, req.compliance);

    let per_instance_daily = gpu.throughput as f64 * SECONDS_PER_DAY;
    let instances = ((req.queries_per_day as f64 / per_instance_daily).ceil() as u64).max(1);
    let monthly_cost = gpu.monthly_cost() * instances as f64;
    let monthly_queries = (req.queries_per_day * 30) as f64;
    let cost_per_query = if monthly_queries > 0.0 { monthly_cost / monthly_queries } else { 0.0 };
    let savings_percent =
        ((HOSTED_COST_PER_QUERY - cost_per_query) / HOSTED_COST_PER_QUERY * 100.0).round() as i64;

    Recommendation {
        model: model.clone(),
        score,
        gpu: gpu.clone(),
        platform: platform.clone(),
        instances,
        monthly_cost,
        cost_per_query,
        savings_percent,
        estimated_latency_ms: (1000.0 / gpu.throughput as f64).round() as u64,
        throughput: gpu.throughput as u64 * instances,
    }
}

// ============================================================================
// STATE
// ============================================================================

pub struct InfraRecommender {
    catalogs: [Catalog<Choice>; 5],
    compliance_options: Catalog<&'static str>,
    selections: [Option<Selection>; 5],
    compliance: Vec<String>,
    recommendation: Option<Recommendation>,
    guard: RunGuard,
}

impl InfraRecommender {
    pub fn new() -> Self {
        InfraRecommender {
            catalogs: field_catalogs(),
            compliance_options: compliance_catalog(),
            selections: Default::default(),
            compliance: Vec::new(),
            recommendation: None,
            guard: RunGuard::default(),
        }
    }

    pub fn options(&self, field: Field) -> &Catalog<Choice> {
        &self.catalogs[field.index()]
    }

    pub fn selected(&self, field: Field) -> Option<&str> {
        self.selections[field.index()].as_ref().map(Selection::key)
    }

    pub fn compliance(&self) -> &[String] {
        &self.compliance
    }

    pub fn recommendation(&self) -> Option<&Recommendation> {
        self.recommendation.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    pub fn select(&mut self, field: Field, value: &str) -> Result<()> {
        let selection = Selection::new(self.options(field), value)?;
        tracing::debug!("infra {} = {}", field.key(), value);
        self.selections[field.index()] = Some(selection);
        Ok(())
    }

    /// `none` clears every other framework; any other framework clears `none`
    pub fn toggle_compliance(&mut self, key: &str) -> Result<()> {
        self.compliance_options.require(key)?;
        if key == "none" {
            self.compliance = vec!["none".to_string()];
            return Ok(());
        }
        self.compliance.retain(|c| c != "none");
        if let Some(pos) = self.compliance.iter().position(|c| c == key) {
            self.compliance.remove(pos);
        } else {
            self.compliance.push(key.to_string());
        }
        Ok(())
    }

    /// Completed required questions, in percent
    pub fn progress(&self) -> u32 {
        let done = self.selections.iter().filter(|s| s.is_some()).count() as u32;
        done * 100 / Field::REQUIRED.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.selections.iter().all(Option::is_some)
    }

    fn value_of(&self, field: Field) -> Option<u64> {
        self.selections[field.index()]
            .as_ref()
            .map(|s| s.resolve(self.options(field)).value)
    }

    fn requirements(&self) -> Result<Requirements<'_>> {
        let missing: Vec<&str> = Field::REQUIRED
            .iter()
            .filter(|f| self.selected(**f).is_none())
            .map(|f| f.key())
            .collect();
        let (Some(use_case), Some(volume), Some(latency), Some(queries_per_day), Some(budget_max)) = (
            self.selected(Field::UseCase),
            self.selected(Field::Volume),
            self.selected(Field::Latency),
            self.value_of(Field::Volume),
            self.value_of(Field::Budget),
        ) else {
            return Err(CommandCenterError::Incomplete(missing.join(", ")));
        };
        if !missing.is_empty() {
            return Err(CommandCenterError::Incomplete(missing.join(", ")));
        }
        Ok(Requirements {
            use_case,
            volume,
            queries_per_day,
            latency,
            budget_max,
            compliance: &self.compliance,
        })
    }

    /// Score the form and animate the "thinking" panel before the card
    pub fn recommend(&mut self, animation: &AnimationConfig) -> Result<Run<Recommendation>> {
        let recommendation = calculate(&self.requirements()?);
        let ticket = self.guard.start(MODULE)?;

        let mut timeline = Timeline::new();
        timeline.push_frame(Keyframe::html(Duration::ZERO, "recommendation-result", render_thinking("Analyzing requirements", 0, 0)));
        let step = animation.scale(THINKING_STEP);
        let highlight = animation.scale(STEP_HIGHLIGHT);
        let mut at = Duration::ZERO;
        for (i, label) in THINKING_STEPS.iter().enumerate() {
            at += step;
            timeline.push_frame(Keyframe::html(at, "recommendation-result", render_thinking(label, i + 1, i)));
            timeline.push_frame(Keyframe::html(
                at + highlight,
                "recommendation-result",
                render_thinking(label, i + 1, i + 1),
            ));
        }
        at += animation.scale(THINKING_SETTLE);
        timeline.push_frame(Keyframe::html(at, "recommendation-result", self.render_recommendation(&recommendation)));

        tracing::info!(
            "infra recommendation: {} on {} via {} x{}",
            recommendation.model.name,
            recommendation.gpu.instance,
            recommendation.platform.name,
            recommendation.instances
        );
        self.recommendation = Some(recommendation.clone());
        Ok(Run::new(recommendation, timeline, ticket))
    }

    pub fn generated_notice() -> Notice {
        Notice::success("Recommendation generated!")
    }

    pub fn schedule_demo(&self) -> Notice {
        Notice::info("Contact sales@shellkode.com to schedule a demo")
    }

    pub fn reset(&mut self) {
        self.selections = Default::default();
        self.compliance.clear();
        self.recommendation = None;
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    pub fn render_option_group(&self, field: Field) -> String {
        self.options(field)
            .iter()
            .map(|(key, opt)| {
                let icon = opt
                    .icon
                    .map(|i| format!(r#"<span class="option-icon">{}</span>"#, i))
                    .unwrap_or_default();
                format!(
                    r#"<button class="option-btn {}" data-selection="{}" data-value="{}">{}<span class="option-name">{}</span></button>"#,
                    class_if(self.selected(field) == Some(key), "selected"),
                    field.key(),
                    key,
                    icon,
                    escape(opt.name)
                )
            })
            .collect()
    }

    pub fn render_compliance_options(&self) -> String {
        self.compliance_options
            .iter()
            .map(|(key, name)| {
                format!(
                    r#"<button class="option-btn {}" data-selection="compliance" data-value="{}"><span class="option-name">{}</span></button>"#,
                    class_if(self.compliance.iter().any(|c| c == key), "selected"),
                    key,
                    name
                )
            })
            .collect()
    }

    pub fn render_recommendation(&self, rec: &Recommendation) -> String {
        let name = |field: Field| {
            self.selections[field.index()]
                .as_ref()
                .map(|s| s.resolve(self.options(field)).name)
                .unwrap_or_default()
        };
        format!(
            r#"<div class="recommendation-card animate-fade-in"><div class="recommendation-header"><h3 class="recommendation-title">🎯 Recommended Configuration</h3><p class="recommendation-subtitle">Optimized for your {industry} {use_case} workload</p></div><div class="recommendation-body"><div class="rec-item"><div class="rec-item-icon">🤖</div><div class="rec-item-content"><div class="rec-item-label">Recommended Model</div><div class="rec-item-value">{model}</div><div class="rec-item-detail">{params} parameters • Quality Score: {quality}/10</div></div></div><div class="rec-item"><div class="rec-item-icon">⚡</div><div class="rec-item-content"><div class="rec-item-label">GPU / Instance</div><div class="rec-item-value">{gpu}</div><div class="rec-item-detail">{instance} • {vram}GB VRAM • ${cost_hr}/hr</div></div></div><div class="rec-item"><div class="rec-item-icon">☁️</div><div class="rec-item-content"><div class="rec-item-label">Deployment Platform</div><div class="rec-item-value">{platform}</div><div class="rec-item-detail">{best_for} • {scaling} scaling</div></div></div><div class="rec-item"><div class="rec-item-icon">📊</div><div class="rec-item-content"><div class="rec-item-label">Recommended Scale</div><div class="rec-item-value">{instances} Instance{s}</div><div class="rec-item-detail">{throughput} queries/sec capacity</div></div></div></div><div class="cost-comparison-row"><div><div class="cost-label">Estimated Monthly Cost</div><div class="cost-monthly">${monthly:.0}/mo</div></div><div class="text-right"><div class="cost-label">vs GPT-4 API</div><div class="cost-savings">Save {savings}%</div></div></div><div class="live-metrics"><div class="live-metric"><div class="live-metric-value">{latency}ms</div><div class="live-metric-label">Est. Latency</div></div><div class="live-metric"><div class="live-metric-value">{throughput}</div><div class="live-metric-label">Queries/sec</div></div><div class="live-metric"><div class="live-metric-value">${per_1k:.4}</div><div class="live-metric-label">Cost/1K Queries</div></div></div></div>"#,
            industry = escape(name(Field::Industry)),
            use_case = escape(name(Field::UseCase)),
            model = rec.model.name,
            params = rec.model.params,
            quality = rec.model.quality,
            gpu = rec.gpu.name,
            instance = rec.gpu.instance,
            vram = rec.gpu.vram,
            cost_hr = rec.gpu.cost_hr,
            platform = rec.platform.name,
            best_for = rec.platform.best_for,
            scaling = rec.platform.scaling,
            instances = rec.instances,
            s = plural(rec.instances as usize),
            throughput = rec.throughput,
            monthly = rec.monthly_cost,
            savings = rec.savings_percent,
            latency = rec.estimated_latency_ms,
            per_1k = rec.cost_per_query * 1000.0,
        )
    }

    pub fn render_placeholder() -> &'static str {
        r#"<div class="recommendation-placeholder"><div class="placeholder-icon">🎯</div><p>Complete the form to get your personalized infrastructure recommendation</p></div>"#
    }

    pub fn render(&self) -> Vec<Fragment> {
        let mut fragments: Vec<Fragment> = Field::REQUIRED
            .iter()
            .map(|f| Fragment::new(format!("{}-options", f.key()), self.render_option_group(*f)))
            .collect();
        fragments.push(Fragment::new("compliance-options", self.render_compliance_options()));
        fragments.push(Fragment::new(
            "form-progress",
            format!(r#"<div class="progress-fill" style="width: {}%"></div>"#, self.progress()),
        ));
        let result = match &self.recommendation {
            Some(rec) => self.render_recommendation(rec),
            None => Self::render_placeholder().to_string(),
        };
        fragments.push(Fragment::new("recommendation-result", result));
        fragments
    }
}

impl Default for InfraRecommender {
    fn default() -> Self {
        InfraRecommender::new()
    }
}

fn render_thinking(label: &str, shown: usize, active: usize) -> String {
    let steps: String = THINKING_STEPS[..shown]
        .iter()
        .enumerate()
        .map(|(i, step)| {
            format!(
                r#"<span class="thinking-step {}">{}</span>"#,
                class_if(i < active, "active"),
                step
            )
        })
        .collect();
    format!(
        r#"<div class="thinking-animation"><div class="spinner"></div><p class="thinking-text">{}...</p><div class="thinking-steps">{}</div></div>"#,
        label, steps
    )
}

impl Exportable for InfraRecommender {
    fn export(&self, now: DateTime<Utc>) -> Result<ExportDocument> {
        let rec = self
            .recommendation
            .as_ref()
            .ok_or_else(|| CommandCenterError::Incomplete("no recommendation to export".into()))?;
        let body = json!({
            "generated_at": now.to_rfc3339(),
            "inputs": {
                "industry": self.selected(Field::Industry),
                "useCase": self.selected(Field::UseCase),
                "volume": self.selected(Field::Volume),
                "latency": self.selected(Field::Latency),
                "compliance": self.compliance,
                "budget": self.selected(Field::Budget),
            },
            "recommendation": {
                "model": rec.model.name,
                "model_params": rec.model.params,
                "gpu": rec.gpu.name,
                "instance_type": rec.gpu.instance,
                "platform": rec.platform.name,
                "instance_count": rec.instances,
                "estimated_monthly_cost": rec.monthly_cost,
                "estimated_latency_ms": rec.estimated_latency_ms,
                "throughput_qps": rec.throughput,
            },
        });
        ExportDocument::new(format!("slm-config-{}.json", date_stamp(now)), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use crate::typing::{play, InstantClock};
    use chrono::TimeZone;

    fn filled(use_case: &str, volume: &str, latency: &str, budget: &str) -> InfraRecommender {
        let mut infra = InfraRecommender::new();
        infra.select(Field::Industry, "healthcare").unwrap();
        infra.select(Field::UseCase, use_case).unwrap();
        infra.select(Field::Volume, volume).unwrap();
        infra.select(Field::Latency, latency).unwrap();
        infra.select(Field::Budget, budget).unwrap();
        infra
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(Field::from_key("useCase").unwrap(), Field::UseCase);
        assert!(Field::from_key("color").is_err());
    }

    #[test]
    fn test_progress_and_validation() {
        let mut infra = InfraRecommender::new();
        assert_eq!(infra.progress(), 0);
        infra.select(Field::Industry, "legal").unwrap();
        infra.select(Field::Volume, "low").unwrap();
        assert_eq!(infra.progress(), 40);
        assert!(infra.select(Field::Budget, "infinite").is_err());
        assert_eq!(infra.progress(), 40);

        match infra.recommend(&AnimationConfig::default()) {
            Err(CommandCenterError::Incomplete(missing)) => assert_eq!(missing, "useCase, latency, budget"),
            other => panic!("expected Incomplete, got {:?}", other.map(|r| r.outcome)),
        }
        assert!(!infra.is_running());
    }

    #[test]
    fn test_compliance_none_is_exclusive() {
        let mut infra = InfraRecommender::new();
        infra.toggle_compliance("hipaa").unwrap();
        infra.toggle_compliance("gdpr").unwrap();
        assert_eq!(infra.compliance(), ["hipaa", "gdpr"]);

        infra.toggle_compliance("none").unwrap();
        assert_eq!(infra.compliance(), ["none"]);

        infra.toggle_compliance("soc2").unwrap();
        assert_eq!(infra.compliance(), ["soc2"]);
        infra.toggle_compliance("soc2").unwrap();
        assert!(infra.compliance().is_empty());

        assert!(infra.toggle_compliance("iso").is_err());
    }

    #[test]
    fn test_model_scoring() {
        let ranked = rank_models("rag", "interactive");
        assert_eq!(ranked[0].1.id, "mistral-7b");
        assert_eq!(ranked[0].0, 105.0);

        let ranked = rank_models("classification", "realtime");
        assert_eq!(ranked[0].1.id, "phi-3-mini");
        assert_eq!(ranked[1].1.id, "llama-3.2-3b");
    }

    #[test]
    fn test_rag_recommendation() {
        let mut infra = filled("rag", "medium", "interactive", "growth");
        let run = infra.recommend(&AnimationConfig::default()).unwrap();
        let rec = &run.outcome;

        assert_eq!(rec.model.name, "Mistral 7B");
        assert_eq!(rec.gpu.id, "inf2");
        assert_eq!(rec.platform.id, "ec2");
        assert_eq!(rec.instances, 1);
        assert!((rec.monthly_cost - 554.8).abs() < 1e-9);
        assert_eq!(rec.savings_percent, 99);
        assert_eq!(rec.estimated_latency_ms, 17);
        assert_eq!(rec.throughput, 60);
    }

    #[test]
    fn test_platform_rules() {
        assert_eq!(select_platform("enterprise", &[]).id, "eks");
        assert_eq!(select_platform("low", &["pci".to_string()]).id, "eks");
        assert_eq!(select_platform("high", &["gdpr".to_string()]).id, "sagemaker");
        assert_eq!(select_platform("medium", &[]).id, "ec2");
    }

    #[test]
    fn test_gpu_budget_filter() {
        let gemma = &MODELS[5];
        // every GPU with 18GB+ fits the largest budget; Inferentia2 wins on value
        assert_eq!(select_gpu(gemma, 100_000).id, "inf2");

        let huge = ModelSpec { vram: 80, ..MODELS[0].clone() };
        assert_eq!(select_gpu(&huge, 100_000).id, "a10g");
    }

    #[test]
    fn test_thinking_timeline() {
        let mut infra = filled("code", "high", "standard", "enterprise");
        let run = infra.recommend(&AnimationConfig::default()).unwrap();
        assert!(infra.recommend(&AnimationConfig::default()).is_err());

        let (rec, script, _ticket) = run.into_script();
        let last = script.last().unwrap();
        assert_eq!(last.at, Duration::from_millis(3300));
        assert_eq!(rec.platform.id, "sagemaker");

        let mut surface = MemorySurface::with_targets(["recommendation-result"]);
        play(script, &mut surface, &mut InstantClock::default());
        let html = surface.html("recommendation-result").unwrap();
        assert!(html.contains("Optimized for your Healthcare Code Generation workload"));
        assert!(html.contains("Amazon SageMaker"));
    }

    #[test]
    fn test_recommendation_is_immediate_without_animation() {
        let mut infra = filled("rag", "medium", "interactive", "growth");
        let animation = AnimationConfig {
            enabled: false,
            ..AnimationConfig::default()
        };
        let (_, script, _ticket) = infra.recommend(&animation).unwrap().into_script();
        assert!(crate::typing::script_duration(&script).is_zero());
        assert!(matches!(
            &script.last().unwrap().update,
            crate::surface::Update::Html(h) if h.contains("Optimized for your Healthcare")
        ));
        assert_eq!(script.len(), 2 * THINKING_STEPS.len() + 2);
    }

    #[test]
    fn test_thinking_panel() {
        let html = render_thinking("Calculating costs", 3, 2);
        assert_eq!(html.matches("thinking-step active").count(), 2);
        assert!(html.contains("Calculating costs..."));
    }

    #[test]
    fn test_reset_and_export() {
        let mut infra = filled("chatbot", "low", "batch", "startup");
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        assert!(infra.export(now).is_err());

        drop(infra.recommend(&AnimationConfig::default()).unwrap());
        let doc = infra.export(now).unwrap();
        assert_eq!(doc.file_name, "slm-config-2024-03-15.json");
        assert_eq!(doc.body["inputs"]["useCase"], "chatbot");
        assert_eq!(doc.body["recommendation"]["instance_count"], 1);

        infra.reset();
        assert_eq!(infra.progress(), 0);
        assert!(infra.recommendation().is_none());
        assert!(infra.render().last().unwrap().html.contains("Complete the form"));
    }
}
