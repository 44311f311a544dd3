// 🔔 Notices - short status messages shown after user actions

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl NoticeLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "✓",
            NoticeLevel::Error => "✕",
            NoticeLevel::Warning => "⚠",
            NoticeLevel::Info => "ℹ",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Notice {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Info, message)
    }

    /// Toast markup as the pages render it
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="toast {}"><span class="toast-icon">{}</span><span class="toast-message">{}</span></div>"#,
            self.level.as_str(),
            self.level.icon(),
            crate::markup::escape(&self.message)
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level.icon(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_display() {
        assert_eq!(Notice::success("Exported").to_string(), "✓ Exported");
        assert_eq!(Notice::error("Nope").to_string(), "✕ Nope");
        assert_eq!(Notice::warning("Careful").to_string(), "⚠ Careful");
        assert_eq!(Notice::info("FYI").to_string(), "ℹ FYI");
    }

    #[test]
    fn test_notice_html_escapes_message() {
        let html = Notice::info("<b>").to_html();
        assert!(html.contains(r#"class="toast info""#));
        assert!(html.contains("&lt;b&gt;"));
    }
}
