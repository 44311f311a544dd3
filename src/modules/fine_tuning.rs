// 🎯 Fine-Tuning - the same question, base model vs domain-tuned model
//
// Both answers are canned. The base model "thinks" longer and types
// slower; the tuned one starts later but finishes first.

use crate::config::AnimationConfig;
use crate::error::{CommandCenterError, Result};
use crate::export::{date_stamp, ExportDocument, Exportable};
use crate::format::preview;
use crate::markup::{class_if, escape, Fragment, SPINNER};
use crate::modules::Run;
use crate::notice::Notice;
use crate::state::{Catalog, RunGuard, Selection};
use crate::typing::{Keyframe, Timeline, Typewriter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

pub const MODULE: &str = "fine-tuning";

const BEFORE_START: Duration = Duration::from_millis(1500);
const AFTER_START: Duration = Duration::from_millis(2000);
const BEFORE_CHAR_DELAY: Duration = Duration::from_millis(12);
const AFTER_CHAR_DELAY: Duration = Duration::from_millis(8);

pub const TRAINING_EXAMPLES: u32 = 500;
pub const TRAINING_TIME: &str = "4 hours";
pub const TRAINING_COST: &str = "$12";

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub name: &'static str,
    pub icon: &'static str,
    pub terminology: [&'static str; 5],
    pub base_accuracy: u32,
    pub tuned_accuracy: u32,
    pub sample_queries: [&'static str; 3],
    pub before: BeforeResponse,
    pub after: AfterResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct BeforeResponse {
    pub text: &'static str,
    pub issues: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct AfterResponse {
    pub text: &'static str,
    pub improvements: &'static [&'static str],
}

pub fn domain_catalog() -> Catalog<Domain> {
    Catalog::new("industry")
        .with("healthcare", Domain {
            name: "Healthcare",
            icon: "🏥",
            terminology: ["ICD-10", "CPT codes", "HIPAA", "EHR", "clinical notes"],
            base_accuracy: 62,
            tuned_accuracy: 89,
            sample_queries: [
                "What ICD-10 code should I use for type 2 diabetes with peripheral neuropathy?",
                "Summarize this clinical note and extract relevant diagnoses.",
                "What are the HIPAA requirements for sharing patient data with research institutions?",
            ],
            before: BeforeResponse {
                text: r#"For diabetes with neuropathy, you might want to look at the diabetes codes in the ICD-10 manual. There are several codes related to diabetes complications. I'd recommend consulting with a coding specialist for the most accurate code selection. The combination of diabetes and neuropathy can be complex to code properly.

<span class="highlight-bad">Note: I'm not entirely certain about specific ICD-10 codes, as medical coding requires specialized knowledge.</span>"#,
                issues: &["Vague response", "No specific codes provided", "Lacks confidence", "Unhelpful for workflow"],
            },
            after: AfterResponse {
                text: r#"For Type 2 diabetes mellitus with diabetic peripheral neuropathy, use <span class="highlight-good">E11.42</span> (Type 2 diabetes mellitus with diabetic polyneuropathy).

<span class="highlight-good">Key coding guidance:</span>
• If patient also has chronic kidney disease, add E11.22 for diabetic CKD
• For bilateral involvement, this code covers both sides
• Document severity in clinical notes for accurate risk adjustment

<span class="highlight-good">Related codes to consider:</span>
• E11.40 - Type 2 DM with diabetic neuropathy, unspecified
• E11.41 - Type 2 DM with diabetic mononeuropathy
• G63 - Polyneuropathy in diseases classified elsewhere (optional secondary)

<span class="highlight-good">⚠️ Compliance note:</span> Ensure documentation supports medical necessity for all coded conditions per CMS guidelines."#,
                improvements: &["Specific ICD-10 code", "Detailed guidance", "Related codes", "Compliance awareness"],
            },
        })
        .with("financial", Domain {
            name: "Financial Services",
            icon: "💰",
            terminology: ["SEC filings", "GAAP", "risk metrics", "derivatives", "regulatory compliance"],
            base_accuracy: 65,
            tuned_accuracy: 91,
            sample_queries: [
                "Extract key financial metrics from this 10-K filing.",
                "What are the Basel III capital requirements for this exposure?",
                "Analyze the risk factors in this quarterly earnings report.",
            ],
            before: BeforeResponse {
                text: r#"Basel III requirements involve capital ratios that banks need to maintain. These typically include common equity tier 1, tier 1 capital, and total capital ratios. The specific requirements can vary based on the type of exposure and risk weighting.

<span class="highlight-bad">I'd recommend checking with your compliance team for the exact calculations applicable to your situation.</span>"#,
                issues: &["Generic response", "No specific calculations", "Defers to others", "Missing current requirements"],
            },
            after: AfterResponse {
                text: r#"<span class="highlight-good">Basel III Capital Requirements Analysis:</span>

For credit risk exposures under the standardized approach:

<span class="highlight-good">Minimum Capital Ratios (as of 2024):</span>
• CET1: 4.5% + 2.5% conservation buffer = <span class="highlight-good">7.0%</span>
• Tier 1: 6.0% + 2.5% buffer = <span class="highlight-good">8.5%</span>
• Total Capital: 8.0% + 2.5% buffer = <span class="highlight-good">10.5%</span>

<span class="highlight-good">Risk Weight Calculation:</span>
RWA = Exposure × Risk Weight
Capital Requirement = RWA × 10.5%

<span class="highlight-good">For your corporate exposure:</span>
• Investment grade: 65% risk weight
• Non-investment grade: 100% risk weight
• Defaulted: 150% risk weight

G-SIB surcharge may apply (1-3.5% additional CET1) based on systemic importance score."#,
                improvements: &["Specific ratios", "Current requirements", "Calculation methodology", "Regulatory context"],
            },
        })
        .with("legal", Domain {
            name: "Legal",
            icon: "⚖️",
            terminology: ["contract clauses", "precedent", "jurisdiction", "liability", "indemnification"],
            base_accuracy: 58,
            tuned_accuracy: 87,
            sample_queries: [
                "Identify potential liability issues in this service agreement.",
                "Compare the indemnification clauses in these two contracts.",
                "What are the notice requirements under this NDA?",
            ],
            before: BeforeResponse {
                text: r#"Indemnification clauses are important parts of contracts that deal with liability. They typically specify who is responsible for certain types of losses or damages. When comparing contracts, you should look at the scope of indemnification, any limitations, and trigger events.

<span class="highlight-bad">Legal analysis should be performed by qualified legal counsel familiar with applicable jurisdiction.</span>"#,
                issues: &["Too general", "No specific analysis", "Avoids substantive comparison", "Lacks legal precision"],
            },
            after: AfterResponse {
                text: r#"<span class="highlight-good">Indemnification Clause Comparison Analysis:</span>

<span class="highlight-good">Contract A - Broad Indemnification:</span>
• Scope: "Any and all claims, losses, damages"
• Standard: Negligence-based trigger
• Carve-outs: Gross negligence, willful misconduct
• Cap: None specified (unlimited exposure)
• ⚠️ <span class="highlight-bad">Risk: Indemnitor bears significant uncapped liability</span>

<span class="highlight-good">Contract B - Limited Indemnification:</span>
• Scope: "Third-party IP claims only"
• Standard: Strict liability for IP matters
• Carve-outs: Modifications by indemnitee
• Cap: Limited to fees paid in prior 12 months
• ✓ <span class="highlight-good">Favorable: Predictable maximum exposure</span>

<span class="highlight-good">Key Differences:</span>
1. Contract A lacks monetary cap - recommend negotiating
2. Contract B's IP-only scope may leave gaps for data breach liability
3. Neither addresses attorney's fee recovery

<span class="highlight-good">Recommendation:</span> Negotiate Contract A's structure with Contract B's cap mechanism."#,
                improvements: &["Structured analysis", "Risk identification", "Specific clause review", "Actionable recommendations"],
            },
        })
        .with("retail", Domain {
            name: "Retail/E-commerce",
            icon: "🛒",
            terminology: ["SKU", "inventory", "conversion", "cart abandonment", "customer journey"],
            base_accuracy: 70,
            tuned_accuracy: 92,
            sample_queries: [
                "Generate SEO-optimized product descriptions for these items.",
                "Analyze customer review sentiment and extract product improvement suggestions.",
                "Create personalized email copy for cart abandonment recovery.",
            ],
            before: BeforeResponse {
                text: r#"Here's a product description for the wireless earbuds:

These wireless earbuds offer good sound quality and comfortable fit. They feature Bluetooth connectivity and come with a charging case. The earbuds have decent battery life and are suitable for everyday use.

<span class="highlight-bad">This description could be improved with more specific features and benefits.</span>"#,
                issues: &["Generic copy", "No SEO optimization", "Lacks persuasive elements", "Missing specifications"],
            },
            after: AfterResponse {
                text: r#"<span class="highlight-good">🎧 ProSound Elite Wireless Earbuds - Premium Audio Meets All-Day Comfort</span>

Experience <span class="highlight-good">crystal-clear 40mm driver sound</span> with active noise cancellation that blocks 95% of ambient noise. Perfect for commutes, workouts, and focused work sessions.

<span class="highlight-good">✨ Key Features:</span>
• <span class="highlight-good">48-hour total battery</span> (8hrs buds + 40hrs case)
• IPX5 water resistance - sweat-proof for intense workouts
• Bluetooth 5.3 with &lt;10ms latency for gaming
• Touch controls + voice assistant integration
• Memory foam tips in 3 sizes for custom fit

<span class="highlight-good">🏆 Why Customers Love Them:</span>
"Best earbuds under $100" - 4.8★ (2,847 reviews)

<span class="highlight-good">SEO Keywords:</span> wireless earbuds, noise cancelling earbuds, bluetooth earbuds, workout earbuds, long battery earbuds

<span class="highlight-good">📦 Includes:</span> Earbuds, charging case, USB-C cable, 3 ear tip sizes, quick start guide

💰 <span class="highlight-good">Limited Time: $79.99</span> (Save 20%)"#,
                improvements: &["SEO-optimized", "Benefit-focused", "Social proof", "Clear specifications", "Call to action"],
            },
        })
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainMetrics {
    pub base_accuracy: u32,
    pub tuned_accuracy: u32,
    pub improvement: String,
    pub training_examples: u32,
    pub training_time: &'static str,
    pub training_cost: &'static str,
}

pub struct FineTuning {
    domains: Catalog<Domain>,
    domain: Selection,
    query: usize,
    guard: RunGuard,
}

impl FineTuning {
    pub fn new() -> Self {
        let domains = domain_catalog();
        let domain = Selection::or_first(&domains, "healthcare");
        FineTuning {
            domains,
            domain,
            query: 0,
            guard: RunGuard::default(),
        }
    }

    pub fn domains(&self) -> &Catalog<Domain> {
        &self.domains
    }

    pub fn domain_key(&self) -> &str {
        self.domain.key()
    }

    pub fn domain(&self) -> &Domain {
        self.domain.resolve(&self.domains)
    }

    pub fn selected_query(&self) -> &'static str {
        self.domain().sample_queries[self.query]
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    pub fn select_industry(&mut self, key: &str) -> Result<Notice> {
        self.domain.set(&self.domains, key)?;
        self.query = 0;
        Ok(Notice::info(format!("Switched to {} domain", self.domain().name)))
    }

    pub fn select_query(&mut self, index: usize) -> Result<()> {
        if index >= self.domain().sample_queries.len() {
            return Err(CommandCenterError::unknown("query", index.to_string()));
        }
        self.query = index;
        Ok(())
    }

    pub fn metrics(&self) -> DomainMetrics {
        let d = self.domain();
        DomainMetrics {
            base_accuracy: d.base_accuracy,
            tuned_accuracy: d.tuned_accuracy,
            improvement: format!("+{}%", d.tuned_accuracy.saturating_sub(d.base_accuracy)),
            training_examples: TRAINING_EXAMPLES,
            training_time: TRAINING_TIME,
            training_cost: TRAINING_COST,
        }
    }

    /// Spinners in both panels, then each answer types out tag by tag
    pub fn run_comparison(&mut self, animation: &AnimationConfig) -> Result<Run<DomainMetrics>> {
        let ticket = self.guard.start(MODULE)?;
        let domain = self.domain();

        let timeline = Timeline::new()
            .with(std::iter::once(Keyframe::html(Duration::ZERO, "before-response", SPINNER)))
            .with(std::iter::once(Keyframe::html(Duration::ZERO, "after-response", SPINNER)))
            .with(
                Typewriter::new("before-response", domain.before.text, animation.scale(BEFORE_CHAR_DELAY))
                    .tag_aware()
                    .starting_at(animation.scale(BEFORE_START)),
            )
            .with(
                Typewriter::new("after-response", domain.after.text, animation.scale(AFTER_CHAR_DELAY))
                    .tag_aware()
                    .starting_at(animation.scale(AFTER_START)),
            );

        tracing::info!("fine-tuning comparison: {}", self.domain.key());
        Ok(Run::new(self.metrics(), timeline, ticket))
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    pub fn render_industry_buttons(&self) -> String {
        self.domains
            .iter()
            .map(|(key, d)| {
                format!(
                    r#"<button class="industry-btn {}" data-industry="{}"><span class="industry-icon">{}</span><span class="industry-name">{}</span></button>"#,
                    class_if(self.domain.is(key), "active"),
                    key,
                    d.icon,
                    d.name
                )
            })
            .collect()
    }

    pub fn render_query_options(&self) -> String {
        self.domain()
            .sample_queries
            .iter()
            .enumerate()
            .map(|(i, q)| {
                format!(
                    r#"<option value="{}"{}>{}</option>"#,
                    i,
                    class_if(i == self.query, " selected"),
                    escape(&preview(q, 60))
                )
            })
            .collect()
    }

    pub fn render_issues(&self) -> String {
        self.domain()
            .before
            .issues
            .iter()
            .map(|issue| format!(r#"<li class="issue-item"><span class="issue-icon">⚠️</span> {}</li>"#, issue))
            .collect()
    }

    pub fn render_improvements(&self) -> String {
        self.domain()
            .after
            .improvements
            .iter()
            .map(|imp| format!(r#"<li class="improvement-item"><span class="improvement-icon">✓</span> {}</li>"#, imp))
            .collect()
    }

    pub fn render(&self) -> Vec<Fragment> {
        let d = self.domain();
        let m = self.metrics();
        vec![
            Fragment::new("industry-selector", self.render_industry_buttons()),
            Fragment::new("finetune-query-select", self.render_query_options()),
            Fragment::new("before-response", d.before.text),
            Fragment::new("after-response", d.after.text),
            Fragment::new("before-issues", self.render_issues()),
            Fragment::new("after-improvements", self.render_improvements()),
            Fragment::new("before-accuracy", format!("{}%", m.base_accuracy)),
            Fragment::new("after-accuracy", format!("{}%", m.tuned_accuracy)),
            Fragment::new("accuracy-improvement", m.improvement),
            Fragment::new("training-examples", m.training_examples.to_string()),
            Fragment::new("training-time", m.training_time),
            Fragment::new("training-cost", m.training_cost),
        ]
    }
}

impl Default for FineTuning {
    fn default() -> Self {
        FineTuning::new()
    }
}

impl Exportable for FineTuning {
    fn export(&self, now: DateTime<Utc>) -> Result<ExportDocument> {
        let d = self.domain();
        let body = json!({
            "exportDate": now.to_rfc3339(),
            "industry": self.domain.key(),
            "industryName": d.name,
            "terminology": d.terminology,
            "query": self.selected_query(),
            "metrics": self.metrics(),
            "issues": d.before.issues,
            "improvements": d.after.improvements,
        });
        ExportDocument::new(format!("fine-tuning-{}-{}.json", self.domain.key(), date_stamp(now)), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MemorySurface, Update};
    use crate::typing::{play, InstantClock};

    #[test]
    fn test_metrics_per_domain() {
        let mut ft = FineTuning::new();
        assert_eq!(ft.metrics().improvement, "+27%");

        ft.select_industry("legal").unwrap();
        let m = ft.metrics();
        assert_eq!((m.base_accuracy, m.tuned_accuracy), (58, 87));
        assert_eq!(m.improvement, "+29%");
        assert_eq!(m.training_cost, "$12");
    }

    #[test]
    fn test_select_industry_notice() {
        let mut ft = FineTuning::new();
        let notice = ft.select_industry("financial").unwrap();
        assert_eq!(notice.to_string(), "ℹ Switched to Financial Services domain");
        assert!(ft.select_industry("aerospace").is_err());
        assert_eq!(ft.domain_key(), "financial");
    }

    #[test]
    fn test_run_comparison_timing() {
        let mut ft = FineTuning::new();
        let run = ft.run_comparison(&AnimationConfig::default()).unwrap();
        assert!(ft.run_comparison(&AnimationConfig::default()).is_err());

        let (_, script, _ticket) = run.into_script();
        assert!(matches!(&script[0].update, Update::Html(h) if h == SPINNER));
        assert!(matches!(&script[1].update, Update::Html(h) if h == SPINNER));

        let first_before = script.iter().find(|f| f.target == "before-response" && f.at > Duration::ZERO).unwrap();
        assert_eq!(first_before.at, BEFORE_START);
        let first_after = script.iter().find(|f| f.target == "after-response" && f.at > Duration::ZERO).unwrap();
        assert_eq!(first_after.at, AFTER_START);
    }

    #[test]
    fn test_typed_markup_is_never_half_written() {
        let mut ft = FineTuning::new();
        let run = ft.run_comparison(&AnimationConfig::default()).unwrap();
        let (_, script, _ticket) = run.into_script();

        for frame in &script {
            if let Update::Html(html) = &frame.update {
                assert_eq!(
                    html.matches('<').count(),
                    html.matches('>').count(),
                    "partial tag in {:?}",
                    html
                );
            }
        }
    }

    #[test]
    fn test_panels_end_with_full_text() {
        let mut ft = FineTuning::new();
        ft.select_industry("retail").unwrap();
        let run = ft.run_comparison(&AnimationConfig::default()).unwrap();

        let mut surface = MemorySurface::with_targets(["before-response", "after-response"]);
        play(run.timeline, &mut surface, &mut InstantClock::default());

        assert_eq!(surface.html("before-response"), Some(ft.domain().before.text));
        assert_eq!(surface.html("after-response"), Some(ft.domain().after.text));
    }

    #[test]
    fn test_disabled_animation_plays_instantly() {
        let mut ft = FineTuning::new();
        let animation = AnimationConfig {
            enabled: false,
            ..AnimationConfig::default()
        };
        let run = ft.run_comparison(&animation).unwrap();
        let (_, script, _ticket) = run.into_script();
        assert!(script.iter().all(|f| f.at.is_zero()));
    }

    #[test]
    fn test_render_queries_and_lists() {
        let mut ft = FineTuning::new();
        ft.select_query(1).unwrap();
        let options = ft.render_query_options();
        assert!(options.contains(r#"<option value="1" selected>Summarize this clinical note and extract relevant diagnoses....</option>"#));
        assert!(ft.select_query(3).is_err());

        assert_eq!(ft.render_issues().matches("issue-item").count(), 4);
        assert!(ft.render_improvements().contains("✓</span> Compliance awareness"));
    }

    #[test]
    fn test_export() {
        use chrono::TimeZone;
        let ft = FineTuning::new();
        let doc = ft.export(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()).unwrap();
        assert_eq!(doc.file_name, "fine-tuning-healthcare-2024-03-15.json");
        assert_eq!(doc.body["metrics"]["improvement"], "+27%");
    }
}
