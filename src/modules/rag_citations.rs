// 📚 RAG Citations - document Q&A with clickable sources
//
// "Retrieval" is a keyword lookup into five prepared answers. Each answer
// cites section ids of the sample documents; the sources panel resolves
// them back to document, page and excerpt.

use crate::config::AnimationConfig;
use crate::error::{CommandCenterError, Result};
use crate::export::{date_stamp, ExportDocument, Exportable};
use crate::markup::{class_if, escape, Fragment};
use crate::matcher::KeywordMatcher;
use crate::modules::Run;
use crate::state::RunGuard;
use crate::typing::{Keyframe, Timeline};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

pub const MODULE: &str = "rag-citations";

/// Simulated retrieval time before the answer appears
pub const RETRIEVAL_DELAY: Duration = Duration::from_millis(1500);

pub const WELCOME: &str = "Hello! I can answer questions about your uploaded documents with precise source citations. Try asking about remote work policies, PTO, security requirements, or API specifications.";

/// One question per document topic, for one-click demos
pub const SAMPLE_QUESTIONS: [&str; 5] = [
    "What is our remote work policy?",
    "How much PTO do I get?",
    "What are the password requirements?",
    "What is the API rate limit?",
    "When is benefits enrollment?",
];

const TYPING_INDICATOR: &str = r#"<div class="message message-assistant typing-indicator"><div class="message-content"><div class="typing-dots"><span></span><span></span><span></span></div></div></div>"#;

// ============================================================================
// DOCUMENTS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: &'static str,
    pub section: &'static str,
    pub page: u32,
    pub content: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: u32,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub doc_type: &'static str,
    pub updated_at: &'static str,
    pub sections: Vec<Section>,
}

pub fn documents() -> Vec<Document> {
    vec![
        Document {
            id: 1,
            title: "Employee Handbook 2024",
            doc_type: "Policy Document",
            updated_at: "March 2024",
            sections: vec![
                Section {
                    id: "1.1",
                    section: "Section 4.2 - Remote Work Policy",
                    page: 47,
                    content: "Employees may work remotely up to 3 days per week with manager approval. Remote work arrangements must be documented and reviewed quarterly. All remote workers must maintain a secure home office environment and use company-approved VPN connections.",
                },
                Section {
                    id: "1.2",
                    section: "Section 5.1 - PTO Policy",
                    page: 52,
                    content: "Full-time employees accrue 15 days of paid time off annually during their first 3 years. After 3 years, accrual increases to 20 days. PTO requests must be submitted at least 2 weeks in advance for periods exceeding 3 consecutive days.",
                },
                Section {
                    id: "1.3",
                    section: "Section 6.3 - Benefits Enrollment",
                    page: 68,
                    content: "Open enrollment occurs annually in November. New hires have 30 days from start date to enroll. Changes outside enrollment periods require a qualifying life event such as marriage, birth of child, or loss of other coverage.",
                },
            ],
        },
        Document {
            id: 2,
            title: "IT Security Guidelines",
            doc_type: "Technical Documentation",
            updated_at: "January 2024",
            sections: vec![
                Section {
                    id: "2.1",
                    section: "Section 2.1 - Password Requirements",
                    page: 12,
                    content: "All passwords must be minimum 12 characters with at least one uppercase, lowercase, number, and special character. Passwords expire every 90 days and cannot repeat the last 10 passwords used. Multi-factor authentication is required for all systems.",
                },
                Section {
                    id: "2.2",
                    section: "Section 3.4 - Data Classification",
                    page: 28,
                    content: "Data is classified into four tiers: Public, Internal, Confidential, and Restricted. Restricted data includes PII, financial records, and trade secrets. Restricted data must be encrypted at rest and in transit using AES-256 encryption.",
                },
            ],
        },
        Document {
            id: 3,
            title: "Product Specifications Q4",
            doc_type: "Product Manual",
            updated_at: "October 2024",
            sections: vec![
                Section {
                    id: "3.1",
                    section: "Chapter 3 - API Rate Limits",
                    page: 34,
                    content: "Standard tier allows 1,000 requests per minute with burst capacity of 2,000. Enterprise tier provides 10,000 requests per minute with dedicated infrastructure. Rate limit headers are included in all responses.",
                },
                Section {
                    id: "3.2",
                    section: "Chapter 5 - SLA Commitments",
                    page: 56,
                    content: "We guarantee 99.9% uptime for production APIs. Scheduled maintenance windows occur monthly on the first Sunday, 2-4 AM UTC. Emergency maintenance may occur with 4-hour notice. SLA credits apply for downtime exceeding commitments.",
                },
            ],
        },
    ]
}

// ============================================================================
// CANNED ANSWERS
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Answer {
    pub content: &'static str,
    pub citations: &'static [&'static str],
}

pub fn answer_matcher() -> KeywordMatcher<Answer> {
    KeywordMatcher::new(Answer {
        content: "I searched through the available documents but couldn't find specific information matching your query. The documents I have access to include the Employee Handbook (policies on remote work, PTO, benefits), IT Security Guidelines (password requirements, data classification), and Product Specifications (API limits, SLA commitments). Could you rephrase your question or ask about one of these topics?",
        citations: &[],
    })
    .keywords(&["remote", "work from home"], Answer {
        content: r#"Based on the Employee Handbook, employees may work remotely up to 3 days per week with manager approval <span class="citation-link" data-source="1.1">1</span>. All remote work arrangements must be documented and reviewed quarterly. Additionally, remote workers must maintain a secure home office environment and use company-approved VPN connections <span class="citation-link" data-source="1.1">1</span>. For security requirements, please refer to the IT Security Guidelines which mandate multi-factor authentication for all systems <span class="citation-link" data-source="2.1">2</span>."#,
        citations: &["1.1", "2.1"],
    })
    .keywords(&["pto", "vacation", "time off"], Answer {
        content: r#"According to Section 5.1 of the Employee Handbook, full-time employees accrue 15 days of paid time off annually during their first 3 years of employment <span class="citation-link" data-source="1.2">1</span>. After completing 3 years of service, PTO accrual increases to 20 days per year <span class="citation-link" data-source="1.2">1</span>. Important note: PTO requests must be submitted at least 2 weeks in advance for periods exceeding 3 consecutive days <span class="citation-link" data-source="1.2">1</span>."#,
        citations: &["1.2"],
    })
    .keywords(&["password", "security", "mfa"], Answer {
        content: r#"The IT Security Guidelines specify strict password requirements <span class="citation-link" data-source="2.1">1</span>. All passwords must be a minimum of 12 characters and include at least one uppercase letter, one lowercase letter, one number, and one special character. Passwords expire every 90 days and cannot repeat the last 10 passwords used <span class="citation-link" data-source="2.1">1</span>. Additionally, multi-factor authentication (MFA) is required for all company systems <span class="citation-link" data-source="2.1">1</span>. For data handling, refer to the data classification guidelines which require AES-256 encryption for restricted data <span class="citation-link" data-source="2.2">2</span>."#,
        citations: &["2.1", "2.2"],
    })
    .keywords(&["api", "rate limit"], Answer {
        content: r#"According to the Product Specifications, the standard tier allows 1,000 requests per minute with burst capacity of 2,000 requests <span class="citation-link" data-source="3.1">1</span>. Enterprise tier customers receive 10,000 requests per minute with dedicated infrastructure <span class="citation-link" data-source="3.1">1</span>. Rate limit information is included in response headers for monitoring purposes. Regarding uptime, the SLA guarantees 99.9% availability for production APIs <span class="citation-link" data-source="3.2">2</span>."#,
        citations: &["3.1", "3.2"],
    })
    .keywords(&["benefits", "enrollment", "insurance"], Answer {
        content: r#"Benefits enrollment information is covered in Section 6.3 of the Employee Handbook <span class="citation-link" data-source="1.3">1</span>. Open enrollment occurs annually in November. New hires have a 30-day window from their start date to complete enrollment <span class="citation-link" data-source="1.3">1</span>. Changes outside the standard enrollment period require a qualifying life event, such as marriage, birth of a child, or loss of other coverage <span class="citation-link" data-source="1.3">1</span>."#,
        citations: &["1.3"],
    })
}

// ============================================================================
// CONVERSATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    /// User text is stored raw and escaped when rendered; assistant
    /// content is trusted markup
    pub content: String,
    pub citations: Vec<&'static str>,
}

impl Message {
    fn user(content: &str) -> Self {
        Message {
            role: Role::User,
            content: content.to_string(),
            citations: Vec::new(),
        }
    }

    fn assistant(content: &str, citations: &[&'static str]) -> Self {
        Message {
            role: Role::Assistant,
            content: content.to_string(),
            citations: citations.to_vec(),
        }
    }

    pub fn to_html(&self) -> String {
        let (class, content) = match self.role {
            Role::User => ("user", escape(&self.content)),
            Role::Assistant => ("assistant", self.content.clone()),
        };
        format!(
            r#"<div class="message message-{}"><div class="message-content">{}</div></div>"#,
            class, content
        )
    }
}

pub struct RagCitations {
    documents: Vec<Document>,
    answers: KeywordMatcher<Answer>,
    messages: Vec<Message>,
    sources: Vec<&'static str>,
    active_source: Option<String>,
    guard: RunGuard,
}

impl RagCitations {
    /// Starts with the assistant's welcome message
    pub fn new() -> Self {
        RagCitations {
            documents: documents(),
            answers: answer_matcher(),
            messages: vec![Message::assistant(WELCOME, &[])],
            sources: Vec::new(),
            active_source: None,
            guard: RunGuard::default(),
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn active_source(&self) -> Option<&str> {
        self.active_source.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Resolve a citation id (`"<doc>.<section>"`) to its document and section
    pub fn section(&self, citation_id: &str) -> Option<(&Document, &Section)> {
        let doc_id: u32 = citation_id.split('.').next()?.parse().ok()?;
        let doc = self.documents.iter().find(|d| d.id == doc_id)?;
        let section = doc.sections.iter().find(|s| s.id == citation_id)?;
        Some((doc, section))
    }

    pub fn highlight_source(&mut self, citation_id: &str) -> Result<()> {
        if self.section(citation_id).is_none() {
            return Err(CommandCenterError::unknown("source", citation_id));
        }
        self.active_source = Some(citation_id.to_string());
        Ok(())
    }

    /// Ask a question; the answer appears after the retrieval delay.
    pub fn send_query(&mut self, query: &str, animation: &AnimationConfig) -> Result<Run<Message>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CommandCenterError::invalid("query is empty"));
        }
        let ticket = self.guard.start(MODULE)?;

        self.messages.push(Message::user(query));
        let waiting = format!("{}{}", self.render_messages(), TYPING_INDICATOR);

        let answer = *self.answers.find(query);
        let reply = Message::assistant(answer.content, answer.citations);
        self.messages.push(reply.clone());
        if !reply.citations.is_empty() {
            self.sources = reply.citations.clone();
            self.active_source = None;
        }

        tracing::info!("rag query answered with {} citation(s)", reply.citations.len());

        let delay = animation.scale(RETRIEVAL_DELAY);
        let timeline = Timeline::new()
            .with(std::iter::once(Keyframe::html(Duration::ZERO, "rag-messages", waiting)))
            .with(std::iter::once(Keyframe::html(delay, "rag-messages", self.render_messages())))
            .with(std::iter::once(Keyframe::html(delay, "sources-list", self.render_sources())));

        Ok(Run::new(reply, timeline, ticket))
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    pub fn render_documents(&self) -> String {
        self.documents
            .iter()
            .map(|doc| {
                format!(
                    r#"<div class="document-item" data-doc-id="{}"><div class="document-icon">📄</div><div class="document-info"><div class="document-title">{}</div><div class="document-meta">{} • Updated {}</div></div></div>"#,
                    doc.id, doc.title, doc.doc_type, doc.updated_at
                )
            })
            .collect()
    }

    pub fn render_messages(&self) -> String {
        self.messages.iter().map(Message::to_html).collect()
    }

    /// Source cards for the latest cited answer, numbered in citation order
    pub fn render_sources(&self) -> String {
        self.sources
            .iter()
            .enumerate()
            .filter_map(|(i, id)| {
                let (doc, section) = self.section(id)?;
                let active = class_if(self.active_source.as_deref() == Some(*id), " active");
                Some(format!(
                    r#"<div class="source-card{}" data-source-id="{}"><div class="source-header"><span class="source-number">{}</span><span class="source-title">{}</span></div><div class="source-meta">{} • Page {} • {}</div><div class="source-excerpt">"{}"</div></div>"#,
                    active,
                    id,
                    i + 1,
                    section.section,
                    doc.title,
                    section.page,
                    doc.updated_at,
                    section.content
                ))
            })
            .collect()
    }

    pub fn render(&self) -> Vec<Fragment> {
        vec![
            Fragment::new("documents-list", self.render_documents()),
            Fragment::new("rag-messages", self.render_messages()),
            Fragment::new("sources-list", self.render_sources()),
        ]
    }
}

impl Default for RagCitations {
    fn default() -> Self {
        RagCitations::new()
    }
}

impl Exportable for RagCitations {
    fn export(&self, now: DateTime<Utc>) -> Result<ExportDocument> {
        let queries: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect();

        let mut citations: Vec<&str> = Vec::new();
        for id in self.messages.iter().flat_map(|m| m.citations.iter()) {
            if !citations.contains(id) {
                citations.push(id);
            }
        }

        let docs: Vec<serde_json::Value> = self
            .documents
            .iter()
            .map(|d| json!({ "id": d.id, "title": d.title }))
            .collect();

        let body = json!({
            "timestamp": now.to_rfc3339(),
            "session_id": Uuid::new_v4().to_string(),
            "queries": queries,
            "citations_used": citations,
            "documents_accessed": docs,
        });
        ExportDocument::new(format!("rag-audit-log-{}.json", date_stamp(now)), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_message() {
        let rag = RagCitations::new();
        assert_eq!(rag.messages().len(), 1);
        assert_eq!(rag.messages()[0].role, Role::Assistant);
        assert!(rag.render_sources().is_empty());
    }

    #[test]
    fn test_topics_pick_documented_answers() {
        let matcher = answer_matcher();
        assert_eq!(matcher.find("Can I work from home on Fridays?").citations, &["1.1", "2.1"]);
        assert_eq!(matcher.find("How much VACATION do I get").citations, &["1.2"]);
        assert_eq!(matcher.find("MFA setup").citations, &["2.1", "2.2"]);
        assert_eq!(matcher.find("what is the rate limit").citations, &["3.1", "3.2"]);
        assert_eq!(matcher.find("insurance options").citations, &["1.3"]);
        assert!(matcher.find("tell me a joke").citations.is_empty());
    }

    #[test]
    fn test_sample_questions_each_hit_a_topic() {
        let matcher = answer_matcher();
        let firsts: Vec<&str> = SAMPLE_QUESTIONS
            .iter()
            .map(|q| matcher.find(q).citations[0])
            .collect();
        assert_eq!(firsts, vec!["1.1", "1.2", "2.1", "3.1", "1.3"]);
    }

    #[test]
    fn test_send_query_appends_and_guards() {
        let mut rag = RagCitations::new();
        assert!(rag.send_query("   ", &AnimationConfig::default()).is_err());

        let run = rag.send_query("What is the PTO policy?", &AnimationConfig::default()).unwrap();
        assert_eq!(run.outcome.citations, vec!["1.2"]);
        assert_eq!(rag.messages().len(), 3);
        assert!(matches!(rag.send_query("again", &AnimationConfig::default()), Err(CommandCenterError::Busy(_))));

        let (_, script, ticket) = run.into_script();
        assert_eq!(script.len(), 3);
        assert!(script[0].at.is_zero());
        assert!(matches!(&script[0].update, crate::surface::Update::Html(h) if h.contains("typing-dots")));
        assert_eq!(script[2].at, RETRIEVAL_DELAY);
        drop(ticket);
        assert!(!rag.is_running());
    }

    #[test]
    fn test_answer_is_immediate_without_animation() {
        let mut rag = RagCitations::new();
        let animation = AnimationConfig {
            enabled: false,
            ..AnimationConfig::default()
        };
        let (_, script, _) = rag.send_query("password", &animation).unwrap().into_script();
        assert!(script.iter().all(|f| f.at.is_zero()));
        assert!(matches!(&script[2].update, crate::surface::Update::Html(h) if h.contains("source-card")));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut rag = RagCitations::new();
        drop(rag.send_query("<script>x</script>", &AnimationConfig::default()).unwrap());
        let html = rag.render_messages();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_sources_and_highlight() {
        let mut rag = RagCitations::new();
        drop(rag.send_query("password rules", &AnimationConfig::default()).unwrap());

        let html = rag.render_sources();
        assert!(html.contains(r#"<span class="source-number">2</span><span class="source-title">Section 3.4 - Data Classification</span>"#));
        assert!(html.contains("IT Security Guidelines • Page 12 • January 2024"));

        rag.highlight_source("2.2").unwrap();
        assert!(rag.render_sources().contains(r#"<div class="source-card active" data-source-id="2.2">"#));
        assert!(rag.highlight_source("9.9").is_err());
        assert_eq!(rag.active_source(), Some("2.2"));
    }

    #[test]
    fn test_default_answer_keeps_previous_sources() {
        let mut rag = RagCitations::new();
        drop(rag.send_query("api limits", &AnimationConfig::default()).unwrap());
        drop(rag.send_query("weather?", &AnimationConfig::default()).unwrap());
        assert!(rag.render_sources().contains(r#"data-source-id="3.1""#));
    }

    #[test]
    fn test_section_lookup() {
        let rag = RagCitations::new();
        let (doc, section) = rag.section("3.2").unwrap();
        assert_eq!(doc.title, "Product Specifications Q4");
        assert_eq!(section.page, 56);
        assert!(rag.section("1.9").is_none());
        assert!(rag.section("x").is_none());
    }

    #[test]
    fn test_export_audit_log() {
        use chrono::TimeZone;
        let mut rag = RagCitations::new();
        drop(rag.send_query("remote work", &AnimationConfig::default()).unwrap());
        drop(rag.send_query("password", &AnimationConfig::default()).unwrap());

        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let doc = rag.export(now).unwrap();
        assert_eq!(doc.file_name, "rag-audit-log-2024-03-15.json");
        assert_eq!(doc.body["queries"], json!(["remote work", "password"]));
        // first-seen order, no duplicates
        assert_eq!(doc.body["citations_used"], json!(["1.1", "2.1", "2.2"]));
        assert_eq!(doc.body["documents_accessed"].as_array().unwrap().len(), 3);
        assert!(Uuid::parse_str(doc.body["session_id"].as_str().unwrap()).is_ok());
    }
}
