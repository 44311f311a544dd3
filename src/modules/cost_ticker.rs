// 💰 Cost Ticker - hosted API vs self-hosted SLM, query by query
//
// One canned answer per side is typed out while a cost counter climbs to
// the precomputed per-query cost. Projections scale the same formulas to
// a daily volume.

use crate::config::{AnimationConfig, CostDefaults};
use crate::error::Result;
use crate::export::{date_stamp, ExportDocument, Exportable};
use crate::format::{format_currency, format_number};
use crate::markup::{class_if, Fragment, TYPING_CURSOR};
use crate::modules::Run;
use crate::state::{Catalog, RunGuard, Selection};
use crate::typing::{Counter, Easing, Keyframe, Timeline, Typewriter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

pub const MODULE: &str = "cost-ticker";

pub const DEFAULT_QUERY: &str =
    "What are the key benefits of using Small Language Models for enterprise applications?";

pub const API_RESPONSE: &str = "Based on my analysis, Small Language Models offer several compelling advantages for enterprise deployments. First, they provide significantly reduced operational costs, often 3-23x lower than frontier models. Second, they enable complete data sovereignty, keeping sensitive information within your infrastructure. Third, they offer faster inference times with lower latency, typically under 100ms. Fourth, they're highly customizable through fine-tuning on domain-specific data. Finally, they reduce dependency on external API providers, eliminating concerns about rate limits and service disruptions.";

pub const SLM_RESPONSE: &str = "Small Language Models provide enterprise-ready advantages: 1) Cost efficiency - 3-23x lower costs than GPT-4/Claude; 2) Data sovereignty - your data stays on your infrastructure, meeting HIPAA/SOC2/GDPR requirements; 3) Low latency - sub-100ms response times for real-time applications; 4) Customization - fine-tune on your domain data for 20-30% accuracy improvements; 5) Predictable costs - no surprise API bills, fixed infrastructure spend. Our Mistral 7B deployment on AWS g5.2xlarge handles 50+ requests/second at $0.0004 per query.";

/// Queries per hour assumed when pricing a single live query's infra share
pub const LIVE_QUERIES_PER_HOUR: f64 = 100.0;

const SAVINGS_COUNTER: Duration = Duration::from_millis(1000);

// ============================================================================
// PRICING CATALOG
// ============================================================================

/// Prices per 1M tokens; self-hosted models add an hourly instance cost.
#[derive(Debug, Clone, Serialize)]
pub struct ModelPricing {
    pub name: &'static str,
    pub input: f64,
    pub output: f64,
    pub infrastructure: Option<f64>,
}

impl ModelPricing {
    fn api(name: &'static str, input: f64, output: f64) -> Self {
        ModelPricing {
            name,
            input,
            output,
            infrastructure: None,
        }
    }

    fn self_hosted(name: &'static str, price: f64, infrastructure: f64) -> Self {
        ModelPricing {
            name,
            input: price,
            output: price,
            infrastructure: Some(infrastructure),
        }
    }

    pub fn is_self_hosted(&self) -> bool {
        self.infrastructure.is_some()
    }
}

pub fn pricing_catalog() -> Catalog<ModelPricing> {
    Catalog::new("model")
        .with("gpt-4", ModelPricing::api("GPT-4 API", 30.00, 60.00))
        .with("gpt-4o", ModelPricing::api("GPT-4o API", 5.00, 15.00))
        // g5.2xlarge per hour
        .with("mistral-7b", ModelPricing::self_hosted("Mistral 7B (Self-hosted)", 0.20, 1.21))
        .with("phi-3", ModelPricing::self_hosted("Phi-3.5 Mini (Self-hosted)", 0.15, 1.01))
        .with("llama-3.2", ModelPricing::self_hosted("Llama 3.2 3B (Self-hosted)", 0.18, 1.01))
}

// ============================================================================
// COST FORMULAS
// ============================================================================

/// Rough token estimate: one token per four characters, rounded up
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64 + 3) / 4
}

/// Token cost of one query; an unknown model costs nothing
pub fn query_cost(catalog: &Catalog<ModelPricing>, model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    match catalog.get(model) {
        Some(p) => {
            (input_tokens as f64 / 1_000_000.0) * p.input
                + (output_tokens as f64 / 1_000_000.0) * p.output
        }
        None => 0.0,
    }
}

/// Share of the hourly instance cost carried by one query
pub fn infra_cost_per_query(catalog: &Catalog<ModelPricing>, model: &str, queries_per_hour: f64) -> f64 {
    match catalog.get(model).and_then(|p| p.infrastructure) {
        Some(infra) if queries_per_hour > 0.0 => infra / queries_per_hour,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub daily_volume: u64,
    pub api_daily: f64,
    pub slm_daily: f64,
    pub api_monthly: f64,
    pub slm_monthly: f64,
    pub monthly_savings: f64,
    pub savings_percent: i64,
    pub annual_savings: f64,
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonOutcome {
    pub query: String,
    pub input_tokens: u64,
    pub api_output_tokens: u64,
    pub slm_output_tokens: u64,
    pub api_cost: f64,
    pub slm_cost: f64,
    pub query_count: u32,
}

pub struct CostTicker {
    pricing: Catalog<ModelPricing>,
    api_model: Selection,
    slm_model: Selection,
    daily_volume: u64,
    avg_input_tokens: u64,
    avg_output_tokens: u64,
    api_cost_total: f64,
    slm_cost_total: f64,
    query_count: u32,
    guard: RunGuard,
}

impl CostTicker {
    /// Build with configured defaults. Unknown default models fall back to
    /// gpt-4 / mistral-7b.
    pub fn new(defaults: &CostDefaults) -> Self {
        let pricing = pricing_catalog();
        let api_model = Selection::new(&pricing, &defaults.api_model).unwrap_or_else(|_| {
            tracing::warn!("unknown api model '{}', using gpt-4", defaults.api_model);
            Selection::or_first(&pricing, "gpt-4")
        });
        let slm_model = Selection::new(&pricing, &defaults.slm_model).unwrap_or_else(|_| {
            tracing::warn!("unknown slm model '{}', using mistral-7b", defaults.slm_model);
            Selection::or_first(&pricing, "mistral-7b")
        });

        CostTicker {
            pricing,
            api_model,
            slm_model,
            daily_volume: defaults.daily_volume,
            avg_input_tokens: defaults.avg_input_tokens,
            avg_output_tokens: defaults.avg_output_tokens,
            api_cost_total: 0.0,
            slm_cost_total: 0.0,
            query_count: 0,
            guard: RunGuard::default(),
        }
    }

    pub fn pricing(&self) -> &Catalog<ModelPricing> {
        &self.pricing
    }

    pub fn api_model(&self) -> &str {
        self.api_model.key()
    }

    pub fn slm_model(&self) -> &str {
        self.slm_model.key()
    }

    pub fn daily_volume(&self) -> u64 {
        self.daily_volume
    }

    pub fn query_count(&self) -> u32 {
        self.query_count
    }

    pub fn totals(&self) -> (f64, f64) {
        (self.api_cost_total, self.slm_cost_total)
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    pub fn select_api_model(&mut self, key: &str) -> Result<()> {
        self.api_model.set(&self.pricing, key)?;
        tracing::debug!("cost ticker: api model -> {}", key);
        Ok(())
    }

    pub fn select_slm_model(&mut self, key: &str) -> Result<()> {
        self.slm_model.set(&self.pricing, key)?;
        tracing::debug!("cost ticker: slm model -> {}", key);
        Ok(())
    }

    pub fn set_daily_volume(&mut self, volume: u64) {
        self.daily_volume = volume;
    }

    // ========================================================================
    // PROJECTIONS
    // ========================================================================

    pub fn projection(&self) -> Projection {
        let volume = self.daily_volume as f64;
        let api = self.api_model.key();
        let slm = self.slm_model.key();

        let api_daily = query_cost(&self.pricing, api, self.avg_input_tokens, self.avg_output_tokens) * volume;
        let slm_daily = (query_cost(&self.pricing, slm, self.avg_input_tokens, self.avg_output_tokens)
            + infra_cost_per_query(&self.pricing, slm, volume / 24.0))
            * volume;

        let infra_hourly = self.slm_model.resolve(&self.pricing).infrastructure.unwrap_or(0.0);

        let api_monthly = api_daily * 30.0;
        let slm_monthly = slm_daily * 30.0 + infra_hourly * 24.0 * 30.0;
        let monthly_savings = api_monthly - slm_monthly;
        let savings_percent = if api_monthly > 0.0 {
            (monthly_savings / api_monthly * 100.0).round() as i64
        } else {
            0
        };

        Projection {
            daily_volume: self.daily_volume,
            api_daily,
            slm_daily,
            api_monthly,
            slm_monthly,
            monthly_savings,
            savings_percent,
            annual_savings: monthly_savings * 12.0,
        }
    }

    // ========================================================================
    // LIVE COMPARISON
    // ========================================================================

    /// Type both canned answers side by side while the cost counters climb.
    ///
    /// An empty query uses the default question.
    pub fn run_comparison(&mut self, query: &str, animation: &AnimationConfig) -> Result<Run<ComparisonOutcome>> {
        let ticket = self.guard.start(MODULE)?;

        let query = match query.trim() {
            "" => DEFAULT_QUERY,
            q => q,
        };

        self.query_count += 1;

        let input_tokens = estimate_tokens(query);
        let api_output_tokens = estimate_tokens(API_RESPONSE);
        let slm_output_tokens = estimate_tokens(SLM_RESPONSE);

        let api = self.api_model.key().to_string();
        let slm = self.slm_model.key().to_string();

        let api_cost = query_cost(&self.pricing, &api, input_tokens, api_output_tokens);
        let slm_cost = query_cost(&self.pricing, &slm, input_tokens, slm_output_tokens)
            + infra_cost_per_query(&self.pricing, &slm, LIVE_QUERIES_PER_HOUR);

        self.api_cost_total += api_cost;
        self.slm_cost_total += slm_cost;

        let api_writer = Typewriter::new("api-response", API_RESPONSE, animation.api_char_delay()).with_cursor();
        let slm_writer = Typewriter::new("slm-response", SLM_RESPONSE, animation.slm_char_delay()).with_cursor();
        let api_duration = api_writer.duration();
        let slm_duration = slm_writer.duration();

        let mut timeline = Timeline::new();
        for frame in reset_cost_displays() {
            timeline.push_frame(frame);
        }
        timeline.push_frame(Keyframe::html(Duration::ZERO, "api-response", TYPING_CURSOR));
        timeline.push_frame(Keyframe::html(Duration::ZERO, "slm-response", TYPING_CURSOR));
        timeline.push(api_writer);
        timeline.push(slm_writer);
        timeline.push(
            Counter::new("api-cost", 0.0, api_cost, api_duration)
                .tick(animation.counter_tick())
                .prefix("$")
                .decimals(4),
        );
        timeline.push(
            Counter::new("slm-cost", 0.0, slm_cost, slm_duration)
                .tick(animation.counter_tick())
                .prefix("$")
                .decimals(6),
        );

        tracing::info!(
            "cost ticker run #{}: {} ${:.4} vs {} ${:.6}",
            self.query_count,
            api,
            api_cost,
            slm,
            slm_cost
        );

        let outcome = ComparisonOutcome {
            query: query.to_string(),
            input_tokens,
            api_output_tokens,
            slm_output_tokens,
            api_cost,
            slm_cost,
            query_count: self.query_count,
        };

        Ok(Run::new(outcome, timeline, ticket))
    }

    /// Savings counter animation shown after projections change
    pub fn savings_animation(&self, animation: &AnimationConfig) -> Timeline {
        let projection = self.projection();
        Timeline::new().with(
            Counter::new("monthly-savings", 0.0, projection.monthly_savings, animation.scale(SAVINGS_COUNTER))
                .tick(animation.counter_tick())
                .easing(Easing::EaseOutCubic)
                .prefix("$")
                .decimals(4),
        )
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    pub fn render_api_options(&self) -> String {
        render_options(&self.pricing, &self.api_model, false)
    }

    pub fn render_slm_options(&self) -> String {
        render_options(&self.pricing, &self.slm_model, true)
    }

    pub fn render_projection(&self) -> Vec<Fragment> {
        let p = self.projection();
        vec![
            Fragment::new("api-monthly-cost", format_currency(p.api_monthly, 2)),
            Fragment::new("slm-monthly-cost", format_currency(p.slm_monthly, 2)),
            Fragment::new("monthly-savings", format_currency(p.monthly_savings, 4)),
            Fragment::new("savings-percent", format!("{}%", p.savings_percent)),
            Fragment::new("annual-savings", format_currency(p.annual_savings, 0)),
            Fragment::new("volume-display", format_number(p.daily_volume)),
        ]
    }

    pub fn render_totals(&self) -> Vec<Fragment> {
        vec![
            Fragment::new("api-total-cost", format_currency(self.api_cost_total, 4)),
            Fragment::new("slm-total-cost", format_currency(self.slm_cost_total, 6)),
            Fragment::new("query-count", self.query_count.to_string()),
        ]
    }

    pub fn render(&self) -> Vec<Fragment> {
        let mut fragments = vec![
            Fragment::new("api-model-select", self.render_api_options()),
            Fragment::new("slm-model-select", self.render_slm_options()),
        ];
        fragments.extend(self.render_projection());
        fragments.extend(self.render_totals());
        fragments
    }
}

/// `$0.0000` / `$0.000000` at the start of every run
pub fn reset_cost_displays() -> Vec<Keyframe> {
    vec![
        Keyframe::new(Duration::ZERO, "api-cost", crate::surface::Update::Text("$0.0000".into())),
        Keyframe::new(Duration::ZERO, "slm-cost", crate::surface::Update::Text("$0.000000".into())),
    ]
}

fn render_options(catalog: &Catalog<ModelPricing>, selected: &Selection, self_hosted: bool) -> String {
    catalog
        .iter()
        .filter(|(_, p)| p.is_self_hosted() == self_hosted)
        .map(|(key, p)| {
            let attr = class_if(selected.is(key), " selected");
            format!(r#"<option value="{}"{}>{}</option>"#, key, attr, p.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl Exportable for CostTicker {
    fn export(&self, now: DateTime<Utc>) -> Result<ExportDocument> {
        let body = json!({
            "exportDate": now.to_rfc3339(),
            "apiModel": self.api_model.key(),
            "slmModel": self.slm_model.key(),
            "dailyVolume": self.daily_volume,
            "avgInputTokens": self.avg_input_tokens,
            "avgOutputTokens": self.avg_output_tokens,
            "projection": self.projection(),
            "cumulative": {
                "apiCost": self.api_cost_total,
                "slmCost": self.slm_cost_total,
                "queryCount": self.query_count,
            },
        });
        ExportDocument::new(format!("cost-projection-{}.json", date_stamp(now)), &body)
    }
}

impl Default for CostTicker {
    fn default() -> Self {
        CostTicker::new(&CostDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandCenterError;
    use crate::surface::{MemorySurface, Surface};
    use crate::typing::{play, InstantClock};
    use chrono::TimeZone;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_query_cost() {
        let catalog = pricing_catalog();
        assert!(close(query_cost(&catalog, "gpt-4", 500, 200), 0.027));
        assert!(close(query_cost(&catalog, "mistral-7b", 500, 200), 0.00014));
        assert_eq!(query_cost(&catalog, "claude", 500, 200), 0.0);
    }

    #[test]
    fn test_infra_cost_per_query() {
        let catalog = pricing_catalog();
        assert!(close(infra_cost_per_query(&catalog, "mistral-7b", 100.0), 0.0121));
        assert_eq!(infra_cost_per_query(&catalog, "gpt-4", 100.0), 0.0);
        assert_eq!(infra_cost_per_query(&catalog, "mistral-7b", 0.0), 0.0);
    }

    #[test]
    fn test_default_projection() {
        let ticker = CostTicker::default();
        let p = ticker.projection();

        assert!(close(p.api_daily, 270.0));
        assert!(close(p.api_monthly, 8100.0));
        // (0.00014 + 1.21 / (10000/24)) * 10000 = 30.44
        assert!((p.slm_daily - 30.44).abs() < 1e-6);
        assert!((p.slm_monthly - (30.44 * 30.0 + 1.21 * 720.0)).abs() < 1e-6);
        assert_eq!(p.savings_percent, 78);
        assert!(close(p.annual_savings, p.monthly_savings * 12.0));
    }

    #[test]
    fn test_zero_volume_projection() {
        let mut ticker = CostTicker::default();
        ticker.set_daily_volume(0);
        let p = ticker.projection();
        assert_eq!(p.api_monthly, 0.0);
        assert!(close(p.slm_monthly, 871.2));
        assert_eq!(p.savings_percent, 0);
    }

    #[test]
    fn test_select_unknown_model_keeps_state() {
        let mut ticker = CostTicker::default();
        assert!(ticker.select_api_model("gpt-5").is_err());
        assert_eq!(ticker.api_model(), "gpt-4");

        ticker.select_slm_model("phi-3").unwrap();
        assert_eq!(ticker.slm_model(), "phi-3");
    }

    #[test]
    fn test_unknown_configured_default_falls_back() {
        let defaults = CostDefaults {
            api_model: "nope".into(),
            ..CostDefaults::default()
        };
        let ticker = CostTicker::new(&defaults);
        assert_eq!(ticker.api_model(), "gpt-4");
    }

    #[test]
    fn test_run_comparison_accumulates_and_guards() {
        let mut ticker = CostTicker::default();
        let animation = AnimationConfig::default();

        let run = ticker.run_comparison("", &animation).unwrap();
        assert_eq!(run.outcome.query, DEFAULT_QUERY);
        assert_eq!(run.outcome.query_count, 1);

        // still animating: a second click is dropped
        assert!(matches!(
            ticker.run_comparison("again", &animation),
            Err(CommandCenterError::Busy(MODULE))
        ));
        assert_eq!(ticker.query_count(), 1);

        let expected_slm = query_cost(ticker.pricing(), "mistral-7b", run.outcome.input_tokens, run.outcome.slm_output_tokens)
            + 0.0121;
        assert!(close(run.outcome.slm_cost, expected_slm));

        drop(run);
        assert!(!ticker.is_running());
        ticker.run_comparison("again", &animation).unwrap();
        assert_eq!(ticker.query_count(), 2);
    }

    #[test]
    fn test_run_timeline_ends_with_full_text_and_exact_costs() {
        let mut ticker = CostTicker::default();
        let run = ticker.run_comparison("hi", &AnimationConfig::default()).unwrap();
        let outcome = run.outcome.clone();

        let mut surface =
            MemorySurface::with_targets(["api-response", "slm-response", "api-cost", "slm-cost"]);
        let mut clock = InstantClock::default();
        let stats = play(run.timeline, &mut surface, &mut clock);

        assert_eq!(stats.skipped, 0);
        assert_eq!(surface.html("api-response"), Some(API_RESPONSE));
        assert_eq!(surface.html("slm-response"), Some(SLM_RESPONSE));
        assert_eq!(surface.html("api-cost"), Some(format_currency(outcome.api_cost, 4).as_str()));
        assert_eq!(surface.html("slm-cost"), Some(format_currency(outcome.slm_cost, 6).as_str()));
        // the slower API panel sets the total duration; its counter rounds
        // up to the next 50 ms tick
        let api_typing = 15 * API_RESPONSE.chars().count() as u64;
        let expected = (api_typing + 49) / 50 * 50;
        assert_eq!(clock.slept, Duration::from_millis(expected));
        assert!(surface.has_target("api-cost"));
    }

    #[test]
    fn test_run_without_animation_lands_on_final_frame() {
        let mut ticker = CostTicker::default();
        let animation = AnimationConfig {
            enabled: false,
            ..AnimationConfig::default()
        };
        let run = ticker.run_comparison("", &animation).unwrap();
        let outcome = run.outcome.clone();

        let mut surface = MemorySurface::with_targets(["api-response", "slm-cost"]);
        let mut clock = InstantClock::default();
        play(run.timeline, &mut surface, &mut clock);

        assert!(clock.slept.is_zero());
        assert_eq!(surface.html("api-response"), Some(API_RESPONSE));
        assert_eq!(surface.html("slm-cost"), Some(format_currency(outcome.slm_cost, 6).as_str()));
        assert!(ticker.savings_animation(&animation).all(|f| f.at.is_zero()));
    }

    #[test]
    fn test_render_options_and_projection() {
        let ticker = CostTicker::default();
        let api = ticker.render_api_options();
        assert!(api.contains(r#"<option value="gpt-4" selected>GPT-4 API</option>"#));
        assert!(!api.contains("mistral-7b"));

        let slm = ticker.render_slm_options();
        assert!(slm.contains(r#"<option value="phi-3">Phi-3.5 Mini (Self-hosted)</option>"#));

        let fragments = ticker.render_projection();
        let by_id = |id: &str| fragments.iter().find(|f| f.target == id).map(|f| f.html.clone());
        assert_eq!(by_id("api-monthly-cost"), Some("$8100.00".to_string()));
        assert_eq!(by_id("savings-percent"), Some("78%".to_string()));
        assert_eq!(by_id("volume-display"), Some("10.0K".to_string()));
    }

    #[test]
    fn test_export_document() {
        let mut ticker = CostTicker::default();
        drop(ticker.run_comparison("", &AnimationConfig::default()).unwrap());

        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let doc = ticker.export(now).unwrap();
        assert_eq!(doc.file_name, "cost-projection-2024-03-15.json");
        assert_eq!(doc.body["apiModel"], "gpt-4");
        assert_eq!(doc.body["cumulative"]["queryCount"], 1);
        assert_eq!(doc.body["projection"]["savings_percent"], 78);
    }
}
