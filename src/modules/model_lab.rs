// 🧪 Model Development Lab - technique explorer and a simulated training run
//
// Nothing trains. The run is a fixed script: four preparation steps under
// a loader overlay, fifteen training stages 800 ms apart, then the
// before/after comparison for the chosen domain.

use crate::config::AnimationConfig;
use crate::error::{CommandCenterError, Result};
use crate::export::{date_stamp, ExportDocument, Exportable};
use crate::format::{format_elapsed, format_thousands};
use crate::markup::{class_if, escape, Fragment};
use crate::modules::Run;
use crate::state::{Catalog, RunGuard, Selection};
use crate::surface::Update;
use crate::typing::{loader_delay, Keyframe, Timeline};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

pub const MODULE: &str = "model-lab";

pub const STAGE_INTERVAL: Duration = Duration::from_millis(800);
const PREP_STEPS: u32 = 4;
const PREP_SETTLE: Duration = Duration::from_millis(300);
const OVERLAY_FADE: Duration = Duration::from_millis(500);
const TIMER_TICK: Duration = Duration::from_secs(1);

pub const ADAPTER_SIZE: &str = "18 MB";
pub const EXAMPLE_COUNTS: [u32; 4] = [1_000, 5_000, 10_000, 50_000];
const EPOCHS: u32 = 3;

// ============================================================================
// CATALOGS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Technique {
    pub title: &'static str,
    pub description: &'static str,
    pub benefits: [&'static str; 4],
    pub use_cases: [&'static str; 4],
    /// Ordered label/value pairs
    pub specs: [(&'static str, &'static str); 5],
}

pub fn technique_catalog() -> Catalog<Technique> {
    Catalog::new("technique")
        .with("lora", Technique {
            title: "LoRA Fine-Tuning (Low-Rank Adaptation)",
            description: "LoRA injects trainable low-rank matrices into transformer layers, enabling efficient fine-tuning with minimal additional parameters.",
            benefits: [
                "Only 0.1-1% of parameters trained (vs 100% for full fine-tuning)",
                "Preserves base model capabilities while adding domain knowledge",
                "Multiple LoRA adapters can be hot-swapped at inference time",
                "Training on single GPU (24GB VRAM) for 7B models",
            ],
            use_cases: [
                "Domain adaptation (medical, legal, financial terminology)",
                "Task-specific fine-tuning (summarization, extraction, classification)",
                "Style and tone customization",
                "Multi-tenant deployments with different adapters",
            ],
            specs: [
                ("Typical Rank", "r=8 to r=64"),
                ("Alpha", "Usually 2x rank"),
                ("Target Modules", "q_proj, v_proj, k_proj, o_proj"),
                ("Training Time", "2-8 hours for 10K examples"),
                ("VRAM Required", "16-24GB for 7B model"),
            ],
        })
        .with("qlora", Technique {
            title: "QLoRA (Quantized LoRA)",
            description: "QLoRA combines 4-bit quantization with LoRA, enabling fine-tuning of large models on consumer hardware.",
            benefits: [
                "Fine-tune 7B models on 8GB VRAM GPUs",
                "Near-identical quality to full LoRA",
                "4-bit NormalFloat quantization preserves information",
                "Paged optimizers prevent OOM errors",
            ],
            use_cases: [
                "Resource-constrained environments",
                "Rapid prototyping and experimentation",
                "Edge deployment preparation",
                "Cost-effective training on smaller GPUs",
            ],
            specs: [
                ("Quantization", "4-bit NormalFloat (NF4)"),
                ("Compute Type", "bfloat16 / float16"),
                ("VRAM Required", "6-12GB for 7B model"),
                ("Training Time", "3-10 hours for 10K examples"),
                ("Quality Loss", "<1% vs full precision"),
            ],
        })
        .with("distillation", Technique {
            title: "Knowledge Distillation",
            description: "Transfer knowledge from a large \"teacher\" model to a smaller \"student\" model, maintaining capability while reducing size.",
            benefits: [
                "Compress 70B model knowledge into 7B model",
                "10-100x inference speedup",
                "Deploy on edge devices and mobile",
                "Reduce serving costs dramatically",
            ],
            use_cases: [
                "Edge deployment for offline inference",
                "Mobile and embedded applications",
                "High-throughput, low-latency APIs",
                "Cost optimization for production",
            ],
            specs: [
                ("Teacher Model", "GPT-4, Claude, Llama 70B"),
                ("Student Model", "1B-7B parameters"),
                ("Data Required", "100K-1M examples"),
                ("Training Time", "1-7 days"),
                ("Size Reduction", "10-70x smaller"),
            ],
        })
        .with("rlhf", Technique {
            title: "RLHF (Reinforcement Learning from Human Feedback)",
            description: "Align model outputs with human preferences using reward models and PPO/DPO training.",
            benefits: [
                "Improved safety and helpfulness",
                "Reduced harmful/toxic outputs",
                "Better instruction following",
                "Aligned with organizational values",
            ],
            use_cases: [
                "Customer-facing chatbots",
                "Content moderation systems",
                "Enterprise assistants with brand voice",
                "Compliance-critical applications",
            ],
            specs: [
                ("Method", "DPO (Direct Preference Optimization)"),
                ("Data Required", "5K-50K preference pairs"),
                ("Training Stages", "SFT → Reward Model → PPO/DPO"),
                ("Compute", "Multi-GPU recommended"),
                ("Human Labeling", "Required for preference data"),
            ],
        })
        .with("continued", Technique {
            title: "Continued Pre-training",
            description: "Extend base model training on domain-specific corpora to inject deep specialized knowledge.",
            benefits: [
                "Deepest domain knowledge integration",
                "Model \"speaks\" domain language natively",
                "Better than fine-tuning for specialized domains",
                "Improved few-shot performance",
            ],
            use_cases: [
                "Highly specialized domains (biomedical, legal, scientific)",
                "Proprietary knowledge bases",
                "Non-English language adaptation",
                "Industry-specific terminology",
            ],
            specs: [
                ("Data Required", "1B-100B tokens"),
                ("Compute", "Multi-GPU / TPU cluster"),
                ("Training Time", "Days to weeks"),
                ("Cost", "$10K-$100K+ in compute"),
                ("Best For", "Large organizations with unique data"),
            ],
        })
        .with("merging", Technique {
            title: "Model Merging",
            description: "Combine multiple fine-tuned models into a single model that inherits capabilities from all sources.",
            benefits: [
                "No additional training required",
                "Combine specialists into generalist",
                "Preserve best aspects of each model",
                "Fast experimentation",
            ],
            use_cases: [
                "Multi-task models from single-task specialists",
                "Combining domain adapters",
                "A/B testing model combinations",
                "Ensemble-like performance without ensemble cost",
            ],
            specs: [
                ("Methods", "SLERP, TIES, DARE, Linear"),
                ("Compute", "CPU sufficient"),
                ("Time", "Minutes"),
                ("Models Required", "2-5 fine-tuned variants"),
                ("Risk", "Quality degradation possible"),
            ],
        })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainOutput {
    pub query: &'static str,
    pub before_output: &'static str,
    pub before_accuracy: u32,
    pub after_output: &'static str,
    pub after_accuracy: u32,
    pub model_name: &'static str,
}

pub fn domain_catalog() -> Catalog<DomainOutput> {
    Catalog::new("domain")
        .with("healthcare", DomainOutput {
            query: "Summarize this patient encounter and suggest ICD-10 codes.",
            before_output: "The patient came in with chest pain. They might have heart problems. The doctor did some tests. I would suggest looking up heart-related codes.",
            before_accuracy: 67,
            after_output: "<strong>Clinical Summary:</strong> 58 y/o male presenting with acute substernal chest pain radiating to left arm, onset 2 hours prior. Troponin elevated at 0.8 ng/mL. ECG shows ST elevation in leads V1-V4. Impression: STEMI, anterior wall.\n\n<strong>ICD-10 Codes:</strong>\n• I21.0 - ST elevation myocardial infarction of anterior wall\n• R07.9 - Chest pain, unspecified\n• I25.10 - Atherosclerotic heart disease",
            after_accuracy: 94,
            model_name: "SK-Clinical-7B",
        })
        .with("finance", DomainOutput {
            query: "Analyze the risk factors in this SEC 10-K filing excerpt.",
            before_output: "This company has some risks. They mention competition and market conditions. There might be issues with their business. You should be careful about investing.",
            before_accuracy: 62,
            after_output: "<strong>Risk Analysis Summary:</strong>\n\n<strong>1. Market Risk (High):</strong> 47% revenue concentration in APAC region exposes company to currency fluctuation and geopolitical tensions.\n\n<strong>2. Operational Risk (Medium):</strong> Single-source supplier dependency for critical components (Note 12, pg. 84).\n\n<strong>3. Regulatory Risk (High):</strong> Pending SEC investigation (Item 3, Legal Proceedings) could result in material fines.\n\n<strong>Quantified Exposure:</strong> Estimated $45-60M contingent liability based on comparable settlements.",
            after_accuracy: 91,
            model_name: "SK-Finance-7B",
        })
        .with("legal", DomainOutput {
            query: "Extract key obligations from this contract clause.",
            before_output: "This contract says you have to do some things. There are deadlines mentioned. Both parties need to follow the agreement. Check with a lawyer for details.",
            before_accuracy: 58,
            after_output: "<strong>Extracted Obligations:</strong>\n\n<strong>Party A (Licensor):</strong>\n• Deliver source code within 30 days of execution (§3.1)\n• Provide 24/7 technical support during implementation (§5.2)\n• Maintain SOC2 Type II compliance throughout term (§7.4)\n\n<strong>Party B (Licensee):</strong>\n• Payment of $450,000 in 3 tranches per Schedule B\n• Annual audit certification by independent auditor (§8.1)\n• 90-day notice for termination (§12.3)\n\n<strong>Mutual:</strong> Confidentiality survives 5 years post-termination (§9.5)",
            after_accuracy: 96,
            model_name: "SK-Legal-3B",
        })
        .with("retail", DomainOutput {
            query: "Write an SEO-optimized product description for this wireless headphone.",
            before_output: "These are nice headphones. They are wireless and have good sound. You can use them for music. They are comfortable to wear. Buy them today!",
            before_accuracy: 55,
            after_output: "<strong>ProSound Elite Wireless Headphones</strong>\n\nExperience studio-quality audio without the wires. Our ProSound Elite headphones deliver 40mm driver precision with Active Noise Cancellation that blocks 95% of ambient noise.\n\n<strong>Key Features:</strong>\n✓ 45-hour battery life with quick charge (10 min = 3 hrs)\n✓ Bluetooth 5.3 with multipoint connection\n✓ Memory foam ear cushions for all-day comfort\n✓ Premium aluminum construction, just 8.6 oz\n\n★★★★★ \"Best headphones under $200\" - TechRadar\n\n<strong>Perfect for:</strong> Remote work, commuting, workouts, gaming\n<strong>Free shipping</strong> on orders over $50 | <strong>30-day returns</strong>",
            after_accuracy: 93,
            model_name: "SK-Commerce-3B",
        })
}

pub fn base_model_catalog() -> Catalog<&'static str> {
    Catalog::new("base model")
        .with("mistral-7b", "Mistral 7B")
        .with("llama-3.2-3b", "Llama 3.2 3B")
        .with("phi-3.5", "Phi-3.5 Mini")
        .with("qwen-2.5-7b", "Qwen 2.5 7B")
}

// ============================================================================
// TRAINING SCRIPT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingStage {
    pub progress: u32,
    pub status: &'static str,
    pub icon: &'static str,
    pub epoch: Option<u32>,
    pub loss: Option<f64>,
}

const fn stage(progress: u32, status: &'static str, icon: &'static str) -> TrainingStage {
    TrainingStage {
        progress,
        status,
        icon,
        epoch: None,
        loss: None,
    }
}

pub const STAGES: [TrainingStage; 15] = [
    stage(0, "Initializing training environment...", "⏳"),
    stage(5, "Loading base model weights...", "📥"),
    stage(10, "Preparing dataset...", "📊"),
    stage(15, "Tokenizing training examples...", "🔤"),
    stage(20, "Injecting LoRA adapters...", "🔧"),
    TrainingStage { epoch: Some(1), ..stage(25, "Starting Epoch 1/3...", "🚀") },
    TrainingStage { loss: Some(2.341), ..stage(40, "Epoch 1 complete. Loss: 2.341", "✓") },
    TrainingStage { epoch: Some(2), ..stage(45, "Starting Epoch 2/3...", "🚀") },
    TrainingStage { loss: Some(1.124), ..stage(65, "Epoch 2 complete. Loss: 1.124", "✓") },
    TrainingStage { epoch: Some(3), ..stage(70, "Starting Epoch 3/3...", "🚀") },
    TrainingStage { loss: Some(0.487), ..stage(90, "Epoch 3 complete. Loss: 0.487", "✓") },
    stage(92, "Saving adapter weights...", "💾"),
    stage(95, "Running evaluation benchmarks...", "📈"),
    stage(98, "Optimizing for inference...", "⚡"),
    stage(100, "Training complete!", "🎉"),
];

const PREP_LABELS: [&str; 4] = [
    "Checking GPU availability...",
    "Loading base model...",
    "Preparing dataset...",
    "Configuring optimizer...",
];

/// Simulated GPU memory usage for a progress percentage
pub fn gpu_usage(progress: u32) -> u32 {
    (50.0 + progress as f64 * 0.4).min(95.0).round() as u32
}

/// Simulated wall time for a dataset size, one decimal, halves rounded up
pub fn training_hours(examples: u32) -> String {
    let tenths = (examples as f64 / 5000.0 * 1.25 * 10.0).round();
    format!("{:.1}", tenths / 10.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingConfig {
    pub base_model: String,
    pub domain: String,
    pub technique: String,
    pub examples: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            base_model: "mistral-7b".to_string(),
            domain: "healthcare".to_string(),
            technique: "lora".to_string(),
            examples: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
    pub success: bool,
}

impl LogEntry {
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="log-entry {}">[{}] {}</div>"#,
            class_if(self.success, "success"),
            self.timestamp,
            escape(&self.message)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub base_model: String,
    pub base_model_name: String,
    pub domain: String,
    pub technique: String,
    pub query: &'static str,
    pub before_output: &'static str,
    pub before_accuracy: u32,
    pub after_output: &'static str,
    pub after_accuracy: u32,
    pub finetuned_model_name: &'static str,
    pub improvement: String,
    pub training_examples: String,
    pub training_time: String,
    pub adapter_size: &'static str,
}

/// Everything a training run will show, known before the first frame
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRun {
    pub config: TrainingConfig,
    pub log: Vec<LogEntry>,
    pub report: TrainingReport,
    #[serde(skip)]
    pub training_starts_at: Duration,
    #[serde(skip)]
    pub completes_at: Duration,
}

// ============================================================================
// STATE
// ============================================================================

pub struct ModelLab {
    techniques: Catalog<Technique>,
    domains: Catalog<DomainOutput>,
    base_models: Catalog<&'static str>,
    technique: Selection,
    last_run: Option<TrainingRun>,
    guard: RunGuard,
}

impl ModelLab {
    pub fn new() -> Self {
        let techniques = technique_catalog();
        let technique = Selection::or_first(&techniques, "lora");
        ModelLab {
            techniques,
            domains: domain_catalog(),
            base_models: base_model_catalog(),
            technique,
            last_run: None,
            guard: RunGuard::default(),
        }
    }

    pub fn techniques(&self) -> &Catalog<Technique> {
        &self.techniques
    }

    pub fn domains(&self) -> &Catalog<DomainOutput> {
        &self.domains
    }

    pub fn base_models(&self) -> &Catalog<&'static str> {
        &self.base_models
    }

    pub fn technique_key(&self) -> &str {
        self.technique.key()
    }

    pub fn technique(&self) -> &Technique {
        self.technique.resolve(&self.techniques)
    }

    pub fn last_run(&self) -> Option<&TrainingRun> {
        self.last_run.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    pub fn show_technique(&mut self, key: &str) -> Result<&Technique> {
        self.technique.set(&self.techniques, key)?;
        tracing::debug!("model lab technique: {}", key);
        Ok(self.technique())
    }

    /// Display name for a base model id; unknown ids show as themselves
    pub fn model_display_name<'a>(&self, key: &'a str) -> &'a str {
        self.base_models.get(key).copied().unwrap_or(key)
    }

    fn validate(&self, config: &TrainingConfig) -> Result<&DomainOutput> {
        self.base_models.require(&config.base_model)?;
        self.techniques.require(&config.technique)?;
        if config.examples == 0 {
            return Err(CommandCenterError::invalid("training needs at least one example"));
        }
        self.domains.require(&config.domain)
    }

    fn report(&self, config: &TrainingConfig, output: &DomainOutput) -> TrainingReport {
        TrainingReport {
            base_model: config.base_model.clone(),
            base_model_name: self.model_display_name(&config.base_model).to_string(),
            domain: config.domain.clone(),
            technique: config.technique.clone(),
            query: output.query,
            before_output: output.before_output,
            before_accuracy: output.before_accuracy,
            after_output: output.after_output,
            after_accuracy: output.after_accuracy,
            finetuned_model_name: output.model_name,
            improvement: format!("+{}%", output.after_accuracy.saturating_sub(output.before_accuracy)),
            training_examples: format_thousands(config.examples as u64),
            training_time: format!("{} hrs", training_hours(config.examples)),
            adapter_size: ADAPTER_SIZE,
        }
    }

    /// Start the simulated training run.
    ///
    /// `now` stamps the log lines; each line carries the wall time at which
    /// its stage will be shown.
    pub fn start_training<R: Rng + ?Sized>(
        &mut self,
        config: TrainingConfig,
        rng: &mut R,
        animation: &AnimationConfig,
        now: DateTime<Utc>,
    ) -> Result<Run<TrainingRun>> {
        let output = self.validate(&config)?;
        let ticket = self.guard.start(MODULE)?;
        let report = self.report(&config, output);

        let mut timeline = Timeline::new();

        // Preparation overlay
        let step_delay = loader_delay(rng, animation) / PREP_STEPS;
        timeline.push_frame(Keyframe::new(Duration::ZERO, "comparison-section", Update::Class("hidden".into())));
        timeline.push_frame(Keyframe::html(Duration::ZERO, "training-log", ""));
        timeline.push_frame(Keyframe::html(Duration::ZERO, "training-loader", render_prep_overlay(0, 0)));
        let mut at = Duration::ZERO;
        for step in 1..=PREP_STEPS {
            at += step_delay;
            timeline.push_frame(Keyframe::html(at, "training-loader", render_prep_overlay(step, step - 1)));
        }
        at += animation.scale(PREP_SETTLE);
        timeline.push_frame(Keyframe::html(at, "training-loader", render_prep_overlay(0, PREP_STEPS)));
        at += animation.scale(OVERLAY_FADE);
        timeline.push_frame(Keyframe::html(at, "training-loader", ""));
        let training_starts_at = at;

        // Training stages, one per tick; the first tick fires one interval in
        let interval = animation.scale(STAGE_INTERVAL);
        let mut log = Vec::with_capacity(STAGES.len());
        for (i, stage) in STAGES.iter().enumerate() {
            let at = training_starts_at + interval * (i as u32 + 1);
            let stamp = now + chrono::Duration::from_std(at).unwrap_or_else(|_| chrono::Duration::zero());
            log.push(LogEntry {
                timestamp: stamp.format("%H:%M:%S").to_string(),
                message: stage.status.to_string(),
                success: stage.progress == 100,
            });

            let text = |target: &str, value: String| Keyframe::new(at, target, Update::Text(value));
            timeline.push_frame(Keyframe::html(at, "progress-bar", render_progress_fill(stage.progress)));
            timeline.push_frame(text("progress-percent", format!("{}%", stage.progress)));
            timeline.push_frame(text("status-icon", stage.icon.to_string()));
            timeline.push_frame(text("status-text", stage.status.to_string()));
            if let Some(epoch) = stage.epoch {
                timeline.push_frame(text("epoch-value", format!("{} / {}", epoch, EPOCHS)));
            }
            if let Some(loss) = stage.loss {
                timeline.push_frame(text("loss-value", format!("{:.3}", loss)));
            }
            timeline.push_frame(text("gpu-value", format!("{}%", gpu_usage(stage.progress))));
            timeline.push_frame(Keyframe::html(at, "training-log", render_log(&log)));
        }
        let completes_at = training_starts_at + interval * (STAGES.len() as u32 + 1);

        // Elapsed clock, stopped with the last tick
        if animation.enabled {
            let mut second = 1u64;
            while training_starts_at + TIMER_TICK * second as u32 <= completes_at {
                timeline.push_frame(Keyframe::new(
                    training_starts_at + TIMER_TICK * second as u32,
                    "elapsed-time",
                    Update::Text(format_elapsed(second)),
                ));
                second += 1;
            }
        }

        for fragment in render_comparison(&report) {
            timeline.push_frame(Keyframe::html(completes_at, fragment.target, fragment.html));
        }
        timeline.push_frame(Keyframe::new(completes_at, "comparison-section", Update::Class(String::new())));

        tracing::info!(
            "model lab training: {} on {} ({}, {} examples)",
            config.base_model,
            config.domain,
            config.technique,
            config.examples
        );

        let run = TrainingRun {
            config,
            log,
            report,
            training_starts_at,
            completes_at,
        };
        self.last_run = Some(run.clone());
        Ok(Run::new(run, timeline, ticket))
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    pub fn render_technique_cards(&self) -> String {
        self.techniques
            .iter()
            .map(|(key, t)| {
                format!(
                    r#"<div class="technique-card {}" data-technique="{}"><h4>{}</h4></div>"#,
                    class_if(self.technique.is(key), "active"),
                    key,
                    t.title
                )
            })
            .collect()
    }

    pub fn render_technique_details(&self) -> String {
        let t = self.technique();
        let items = |list: &[&str]| -> String {
            list.iter().map(|item| format!(r#"<li>• {}</li>"#, escape(item))).collect()
        };
        let specs: String = t
            .specs
            .iter()
            .map(|(k, v)| {
                format!(
                    r#"<div class="spec-row"><span class="spec-label">{}:</span><span class="spec-value">{}</span></div>"#,
                    k,
                    escape(v)
                )
            })
            .collect();

        format!(
            r#"<h3>{}</h3><p class="technique-description">{}</p><div class="technique-columns"><div><h4>✓ Benefits</h4><ul>{}</ul></div><div><h4>🎯 Use Cases</h4><ul>{}</ul></div><div><h4>📊 Specifications</h4><div class="spec-table">{}</div></div></div>"#,
            t.title,
            escape(t.description),
            items(&t.benefits),
            items(&t.use_cases),
            specs
        )
    }

    pub fn render(&self) -> Vec<Fragment> {
        let mut fragments = vec![
            Fragment::new("technique-cards", self.render_technique_cards()),
            Fragment::new("technique-details", self.render_technique_details()),
        ];
        if let Some(run) = &self.last_run {
            fragments.push(Fragment::new("training-log", render_log(&run.log)));
            fragments.extend(render_comparison(&run.report));
        }
        fragments
    }
}

impl Default for ModelLab {
    fn default() -> Self {
        ModelLab::new()
    }
}

fn render_prep_overlay(active: u32, completed: u32) -> String {
    let steps: String = PREP_LABELS
        .iter()
        .zip(1..)
        .map(|(label, n)| {
            let (class, icon) = if n <= completed {
                ("complete", "✓")
            } else if n == active {
                ("active", "●")
            } else {
                ("", "●")
            };
            format!(
                r#"<div class="sk-loader-step {}" id="prep-step-{}"><span class="sk-loader-step-icon">{}</span><span>{}</span></div>"#,
                class, n, icon, label
            )
        })
        .collect();
    format!(
        r#"<div class="sk-section-loader"><div class="sk-loader-text">Preparing Training Environment</div><div class="sk-loader-subtext">Allocating GPU resources and loading model weights...</div><div class="sk-loader-steps">{}</div></div>"#,
        steps
    )
}

fn render_progress_fill(progress: u32) -> String {
    format!(r#"<div class="progress-fill" style="width: {}%"></div>"#, progress)
}

pub fn render_log(log: &[LogEntry]) -> String {
    log.iter().map(LogEntry::to_html).collect()
}

pub fn render_comparison(report: &TrainingReport) -> Vec<Fragment> {
    let panel = |output: &str| {
        format!(
            r#"<div class="output-query"><strong>Query:</strong> {}</div><div>{}</div>"#,
            report.query, output
        )
    };
    vec![
        Fragment::new("base-model-name", escape(&report.base_model_name)),
        Fragment::new("before-output", panel(report.before_output)),
        Fragment::new("before-accuracy", render_progress_fill(report.before_accuracy)),
        Fragment::new("before-accuracy-value", format!("{}%", report.before_accuracy)),
        Fragment::new("finetuned-model-name", report.finetuned_model_name),
        Fragment::new("after-output", panel(report.after_output)),
        Fragment::new("after-accuracy", render_progress_fill(report.after_accuracy)),
        Fragment::new("after-accuracy-value", format!("{}%", report.after_accuracy)),
        Fragment::new("accuracy-improvement", report.improvement.clone()),
        Fragment::new("training-examples", report.training_examples.clone()),
        Fragment::new("training-time", report.training_time.clone()),
        Fragment::new("adapter-size", report.adapter_size),
    ]
}

impl Exportable for ModelLab {
    fn export(&self, now: DateTime<Utc>) -> Result<ExportDocument> {
        let run = self
            .last_run
            .as_ref()
            .ok_or_else(|| CommandCenterError::Incomplete("no training run to export".into()))?;
        let body = json!({
            "exportDate": now.to_rfc3339(),
            "config": run.config,
            "technique": self.techniques.get(&run.config.technique).map(|t| t.title),
            "log": run.log,
            "report": run.report,
        });
        ExportDocument::new(
            format!("model-lab-training-{}-{}.json", run.config.domain, date_stamp(now)),
            &body,
        )
    }
}
