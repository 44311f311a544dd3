// 🔒 Data Sovereignty - deployment architectures and compliance coverage
//
// Static reference material plus one animation: the request path of the
// selected architecture lighting up hop by hop.

use crate::config::AnimationConfig;
use crate::error::Result;
use crate::export::{millis_stamp, ExportDocument, Exportable};
use crate::format::plural;
use crate::markup::{class_if, Fragment};
use crate::modules::Run;
use crate::notice::Notice;
use crate::state::{Catalog, RunGuard, Selection};
use crate::surface::Update;
use crate::typing::{Keyframe, Timeline};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

pub const MODULE: &str = "data-sovereignty";

pub const FLOW_STEP: Duration = Duration::from_millis(600);
const FLOW_CLEAR: Duration = Duration::from_millis(500);

pub const LEAK_CONCERN_PERCENT: u32 = 69;

pub const SOVEREIGNTY_GUARANTEES: [&str; 4] = [
    "Data never leaves your infrastructure",
    "No third-party data processing",
    "Full audit trail maintained",
    "Customer-controlled encryption keys",
];

// ============================================================================
// CATALOGS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Framework {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub requirements: [&'static str; 4],
    pub industries: [&'static str; 3],
}

pub fn framework_catalog() -> Catalog<Framework> {
    Catalog::new("framework")
        .with("hipaa", Framework {
            name: "HIPAA",
            icon: "🏥",
            description: "Health Insurance Portability and Accountability Act",
            requirements: [
                "PHI encryption at rest and in transit",
                "Access control and audit logging",
                "Business Associate Agreements",
                "Data breach notification protocols",
            ],
            industries: ["Healthcare", "Health Insurance", "Medical Research"],
        })
        .with("soc2", Framework {
            name: "SOC 2 Type II",
            icon: "🔒",
            description: "Service Organization Control 2",
            requirements: [
                "Security monitoring and alerting",
                "Change management procedures",
                "Risk assessment processes",
                "Vendor management controls",
            ],
            industries: ["SaaS", "Cloud Services", "Technology"],
        })
        .with("gdpr", Framework {
            name: "GDPR",
            icon: "🇪🇺",
            description: "General Data Protection Regulation",
            requirements: [
                "Data subject rights (access, erasure)",
                "Data Processing Agreements",
                "Privacy by design",
                "Cross-border transfer controls",
            ],
            industries: ["EU Operations", "Consumer Data", "Marketing"],
        })
        .with("pci", Framework {
            name: "PCI DSS",
            icon: "💳",
            description: "Payment Card Industry Data Security Standard",
            requirements: [
                "Cardholder data encryption",
                "Network segmentation",
                "Access restrictions",
                "Regular security testing",
            ],
            industries: ["Financial Services", "E-commerce", "Retail"],
        })
        .with("fedramp", Framework {
            name: "FedRAMP",
            icon: "🏛️",
            description: "Federal Risk and Authorization Management Program",
            requirements: [
                "Continuous monitoring",
                "Incident response plans",
                "Configuration management",
                "Personnel security",
            ],
            industries: ["Government", "Defense", "Federal Contractors"],
        })
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FlowHop {
    pub from: &'static str,
    pub to: &'static str,
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityControls {
    pub encryption: &'static str,
    pub access: &'static str,
    pub logging: &'static str,
    pub monitoring: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Architecture {
    pub name: &'static str,
    pub description: &'static str,
    pub data_flow: &'static [FlowHop],
    pub features: [&'static str; 4],
    pub security_controls: SecurityControls,
}

pub fn architecture_catalog() -> Catalog<Architecture> {
    Catalog::new("architecture")
        .with("vpc", Architecture {
            name: "Private VPC",
            description: "Model runs entirely within your AWS/GCP VPC",
            data_flow: &[
                FlowHop { from: "User Request", to: "API Gateway", secure: true },
                FlowHop { from: "API Gateway", to: "Private Subnet", secure: true },
                FlowHop { from: "Private Subnet", to: "SLM Instance", secure: true },
                FlowHop { from: "SLM Instance", to: "Response", secure: true },
            ],
            features: [
                "Zero data egress to public internet",
                "VPC peering for internal services",
                "Private endpoints for AWS services",
                "Network ACLs and security groups",
            ],
            security_controls: SecurityControls {
                encryption: "AES-256 at rest, TLS 1.3 in transit",
                access: "IAM roles, MFA required",
                logging: "CloudTrail, VPC Flow Logs",
                monitoring: "CloudWatch, GuardDuty",
            },
        })
        .with("onprem", Architecture {
            name: "On-Premises",
            description: "Air-gapped deployment in your data center",
            data_flow: &[
                FlowHop { from: "Internal Network", to: "Load Balancer", secure: true },
                FlowHop { from: "Load Balancer", to: "GPU Cluster", secure: true },
                FlowHop { from: "GPU Cluster", to: "Response", secure: true },
            ],
            features: [
                "Complete air-gap capability",
                "No cloud dependencies",
                "Full hardware control",
                "Custom security policies",
            ],
            security_controls: SecurityControls {
                encryption: "Customer-managed keys",
                access: "Active Directory integration",
                logging: "SIEM integration",
                monitoring: "On-prem monitoring stack",
            },
        })
        .with("hybrid", Architecture {
            name: "Hybrid Cloud",
            description: "Sensitive data on-prem, compute in cloud",
            data_flow: &[
                FlowHop { from: "On-Prem Data", to: "Secure Gateway", secure: true },
                FlowHop { from: "Secure Gateway", to: "Cloud VPC", secure: true },
                FlowHop { from: "Cloud VPC", to: "Processing", secure: true },
                FlowHop { from: "Processing", to: "Results Only", secure: true },
            ],
            features: [
                "Data never leaves your premises",
                "Cloud scalability for compute",
                "Encrypted tunnels only",
                "Result-only data transfer",
            ],
            security_controls: SecurityControls {
                encryption: "End-to-end encryption",
                access: "Federated identity",
                logging: "Unified audit trail",
                monitoring: "Hybrid monitoring",
            },
        })
}

/// One row of the public-API vs self-hosted comparison
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Contrast {
    pub category: &'static str,
    /// critical, high, medium, or positive
    pub severity: &'static str,
    pub description: &'static str,
}

pub const PUBLIC_API_NAME: &str = "Public LLM APIs";
pub const PUBLIC_API_PATH: &str = "Your Data → Internet → Third-Party Cloud → Unknown Processing → Response";
pub const PUBLIC_API_RISKS: [Contrast; 5] = [
    Contrast { category: "Data Exposure", severity: "critical", description: "Prompts sent to third-party servers" },
    Contrast { category: "Training Data", severity: "high", description: "Your data may train future models" },
    Contrast { category: "Vendor Lock-in", severity: "medium", description: "Dependent on provider roadmap" },
    Contrast { category: "Compliance", severity: "critical", description: "May violate data residency requirements" },
    Contrast { category: "Cost Control", severity: "medium", description: "Unpredictable API costs at scale" },
];

pub const SELF_HOSTED_NAME: &str = "Self-Hosted SLM";
pub const SELF_HOSTED_PATH: &str =
    "Your Data → Your Network → Your VPC → Your GPU → Response (Never Leaves Your Control)";
pub const SELF_HOSTED_BENEFITS: [Contrast; 5] = [
    Contrast { category: "Data Sovereignty", severity: "positive", description: "Data never leaves your infrastructure" },
    Contrast { category: "Training Control", severity: "positive", description: "Your data is never used for training" },
    Contrast { category: "Vendor Freedom", severity: "positive", description: "No lock-in, full model portability" },
    Contrast { category: "Compliance Ready", severity: "positive", description: "Meet any data residency requirement" },
    Contrast { category: "Cost Predictable", severity: "positive", description: "Fixed infrastructure costs" },
];

// ============================================================================
// STATE
// ============================================================================

pub struct DataSovereignty {
    architectures: Catalog<Architecture>,
    frameworks: Catalog<Framework>,
    architecture: Selection,
    /// Selected framework keys, in selection order
    selected: Vec<String>,
    guard: RunGuard,
}

impl DataSovereignty {
    pub fn new() -> Self {
        let architectures = architecture_catalog();
        let architecture = Selection::or_first(&architectures, "vpc");
        DataSovereignty {
            architectures,
            frameworks: framework_catalog(),
            architecture,
            selected: vec!["soc2".to_string()],
            guard: RunGuard::default(),
        }
    }

    pub fn architectures(&self) -> &Catalog<Architecture> {
        &self.architectures
    }

    pub fn frameworks(&self) -> &Catalog<Framework> {
        &self.frameworks
    }

    pub fn architecture_key(&self) -> &str {
        self.architecture.key()
    }

    pub fn architecture(&self) -> &Architecture {
        self.architecture.resolve(&self.architectures)
    }

    pub fn selected_frameworks(&self) -> &[String] {
        &self.selected
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    pub fn set_architecture(&mut self, key: &str) -> Result<()> {
        self.architecture.set(&self.architectures, key)?;
        tracing::debug!("architecture: {}", key);
        Ok(())
    }

    /// Returns whether the framework is selected afterwards
    pub fn toggle_framework(&mut self, key: &str) -> Result<bool> {
        self.frameworks.require(key)?;
        if let Some(pos) = self.selected.iter().position(|k| k == key) {
            self.selected.remove(pos);
            Ok(false)
        } else {
            self.selected.push(key.to_string());
            Ok(true)
        }
    }

    /// Step `i` is active from `i·600` ms, complete from `(i+1)·600` ms;
    /// every step is cleared 500 ms after the last one completes.
    pub fn animate_flow(&mut self, animation: &AnimationConfig) -> Result<Run<usize>> {
        let ticket = self.guard.start(MODULE)?;
        let steps = self.architecture().data_flow.len();
        let step = animation.scale(FLOW_STEP);
        let class = |at: Duration, i: usize, state: &str| {
            Keyframe::new(at, format!("flow-step-{}", i), Update::Class(state.to_string()))
        };

        let mut timeline = Timeline::new();
        for i in 0..steps {
            timeline.push_frame(class(Duration::ZERO, i, ""));
        }
        for i in 0..steps {
            timeline.push_frame(class(step * i as u32, i, "active"));
            timeline.push_frame(class(step * (i as u32 + 1), i, "complete"));
        }
        let cleared = step * steps as u32 + animation.scale(FLOW_CLEAR);
        for i in 0..steps {
            timeline.push_frame(class(cleared, i, ""));
        }

        tracing::info!("animating {} data flow ({} steps)", self.architecture.key(), steps);
        Ok(Run::new(steps, timeline, ticket))
    }

    pub fn exported_notice() -> Notice {
        Notice::success("Architecture specification exported")
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    pub fn render_architecture_selector(&self) -> String {
        let buttons: String = self
            .architectures
            .iter()
            .map(|(key, arch)| {
                format!(
                    r#"<button class="architecture-btn {}" data-arch="{}"><span class="arch-name">{}</span><span class="arch-desc">{}</span></button>"#,
                    class_if(self.architecture.is(key), "active"),
                    key,
                    arch.name,
                    arch.description
                )
            })
            .collect();
        format!(r#"<div class="architecture-options">{}</div>"#, buttons)
    }

    pub fn render_frameworks(&self) -> String {
        let cards: String = self
            .frameworks
            .iter()
            .map(|(key, fw)| {
                let requirements: String = fw.requirements[..2]
                    .iter()
                    .map(|r| format!(r#"<span class="requirement">✓ {}</span>"#, r))
                    .collect();
                let industries: String = fw
                    .industries
                    .iter()
                    .map(|i| format!(r#"<span class="industry-tag">{}</span>"#, i))
                    .collect();
                format!(
                    r#"<div class="framework-card {}" data-framework="{}"><div class="framework-header"><span class="framework-icon">{}</span><span class="framework-name">{}</span></div><p class="framework-desc">{}</p><div class="framework-requirements">{}</div><div class="framework-industries">{}</div></div>"#,
                    class_if(self.selected.iter().any(|k| k == key), "selected"),
                    key,
                    fw.icon,
                    fw.name,
                    fw.description,
                    requirements,
                    industries
                )
            })
            .collect();
        format!(r#"<div class="frameworks-grid">{}</div>"#, cards)
    }

    pub fn render_compliance_status(&self) -> String {
        if self.selected.is_empty() {
            return r#"<div class="status-empty">Select compliance frameworks to see requirements</div>"#.to_string();
        }
        let badges: String = self
            .selected
            .iter()
            .filter_map(|key| self.frameworks.get(key))
            .map(|fw| format!(r#"<span class="compliance-badge">{} {}</span>"#, fw.icon, fw.name))
            .collect();
        format!(
            r#"<div class="compliance-summary"><div class="summary-header"><span class="check-icon">✓</span><span>Ready for {} compliance framework{}</span></div><div class="framework-badges">{}</div></div>"#,
            self.selected.len(),
            plural(self.selected.len()),
            badges
        )
    }

    pub fn render_flow_diagram(&self) -> String {
        let arch = self.architecture();
        let last = arch.data_flow.len().saturating_sub(1);
        let nodes: String = arch
            .data_flow
            .iter()
            .enumerate()
            .map(|(i, hop)| {
                let arrow = if i < last { r#"<div class="flow-arrow secure-arrow">→</div>"# } else { "" };
                format!(
                    r#"<div class="flow-step" id="flow-step-{i}" data-step="{i}"><div class="flow-node {}"><span class="node-label">{}</span></div>{}</div>"#,
                    if hop.secure { "secure" } else { "insecure" },
                    hop.from,
                    arrow,
                    i = i
                )
            })
            .collect();
        let features: String = arch.features.iter().map(|f| format!("<li>✓ {}</li>", f)).collect();

        format!(
            r#"<div class="flow-diagram"><div class="diagram-header"><h4>{} Data Flow</h4><button class="animate-btn" id="animate-flow-btn">▶ Animate Flow</button></div><div class="flow-visualization"><div class="flow-nodes">{}</div><div class="security-boundary"><span class="boundary-label">🔒 Your Security Boundary - Data Never Leaves</span></div></div><div class="arch-features"><h5>Security Features</h5><ul>{}</ul></div></div>"#,
            arch.name, nodes, features
        )
    }

    pub fn render_comparison(&self) -> String {
        let rows = |items: &[Contrast], item: &str| -> String {
            items
                .iter()
                .map(|c| {
                    let extra = if c.severity == "positive" { String::new() } else { format!(" {}", c.severity) };
                    format!(
                        r#"<div class="{item}-item{extra}"><span class="{item}-category">{}</span><span class="{item}-desc">{}</span></div>"#,
                        c.category,
                        c.description,
                        item = item,
                        extra = extra
                    )
                })
                .collect()
        };

        format!(
            r#"<div class="comparison-container"><div class="comparison-side public-side"><div class="side-header danger"><span class="side-icon">⚠️</span><span class="side-title">{}</span></div><div class="data-path danger-path"><span class="path-label">Data Path:</span><span class="path-flow">{}</span></div><div class="risk-list">{}</div></div><div class="comparison-side self-side"><div class="side-header success"><span class="side-icon">✅</span><span class="side-title">{}</span></div><div class="data-path success-path"><span class="path-label">Data Path:</span><span class="path-flow">{}</span></div><div class="benefit-list">{}</div></div></div><div class="sovereignty-stat"><div class="stat-number">{}%</div><div class="stat-label">of enterprises cite AI data leaks as their top security concern</div><div class="stat-source">Source: Enterprise AI Security Survey 2024</div></div>"#,
            PUBLIC_API_NAME,
            PUBLIC_API_PATH,
            rows(&PUBLIC_API_RISKS, "risk"),
            SELF_HOSTED_NAME,
            SELF_HOSTED_PATH,
            rows(&SELF_HOSTED_BENEFITS, "benefit"),
            LEAK_CONCERN_PERCENT
        )
    }

    pub fn render_security_controls(&self) -> String {
        let c = &self.architecture().security_controls;
        let cards: String = [
            ("🔐", "Encryption", c.encryption),
            ("👤", "Access Control", c.access),
            ("📋", "Audit Logging", c.logging),
            ("📊", "Monitoring", c.monitoring),
        ]
        .iter()
        .map(|(icon, title, value)| {
            format!(
                r#"<div class="control-card"><div class="control-icon">{}</div><div class="control-title">{}</div><div class="control-value">{}</div></div>"#,
                icon, title, value
            )
        })
        .collect();
        format!(r#"<div class="controls-grid">{}</div>"#, cards)
    }

    pub fn render(&self) -> Vec<Fragment> {
        vec![
            Fragment::new("architecture-selector", self.render_architecture_selector()),
            Fragment::new("compliance-frameworks", self.render_frameworks()),
            Fragment::new("compliance-status", self.render_compliance_status()),
            Fragment::new("data-flow-diagram", self.render_flow_diagram()),
            Fragment::new("sovereignty-comparison", self.render_comparison()),
            Fragment::new("security-controls", self.render_security_controls()),
        ]
    }
}

impl Default for DataSovereignty {
    fn default() -> Self {
        DataSovereignty::new()
    }
}

impl Exportable for DataSovereignty {
    fn export(&self, now: DateTime<Utc>) -> Result<ExportDocument> {
        let arch = self.architecture();
        let frameworks: Vec<&Framework> = self
            .selected
            .iter()
            .filter_map(|key| self.frameworks.get(key))
            .collect();
        let body = json!({
            "exportDate": now.to_rfc3339(),
            "architecture": {
                "type": self.architecture.key(),
                "name": arch.name,
                "description": arch.description,
                "features": arch.features,
                "securityControls": arch.security_controls,
            },
            "complianceFrameworks": frameworks,
            "dataFlowSteps": arch.data_flow,
            "sovereigntyGuarantees": SOVEREIGNTY_GUARANTEES,
        });
        ExportDocument::new(
            format!("data-sovereignty-architecture-{}.json", millis_stamp(now)),
            &body,
        )
    }
}
