// 🖼️ Display surfaces - where keyframes and fragments land
//
// A surface is anything with addressable containers: the browser page
// (via the server), the terminal UI, or an in-memory map in tests.
// Writing to a container that does not exist is skipped, not an error.

use crate::markup::Fragment;
use serde::Serialize;
use std::collections::HashMap;

/// One change to a container.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Update {
    /// Replace the container's inner markup
    Html(String),
    /// Replace the container's text content
    Text(String),
    /// Replace the container's state class ("active", "complete", "")
    Class(String),
}

pub trait Surface {
    fn has_target(&self, id: &str) -> bool;

    /// Apply an update to an existing container
    fn apply(&mut self, id: &str, update: &Update);

    /// Write `update` if the container exists. Returns whether it was written.
    fn write(&mut self, id: &str, update: &Update) -> bool {
        if self.has_target(id) {
            self.apply(id, update);
            true
        } else {
            tracing::trace!("surface has no '{}', update skipped", id);
            false
        }
    }

    fn write_fragment(&mut self, fragment: &Fragment) -> bool {
        self.write(&fragment.target, &Update::Html(fragment.html.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub html: String,
    pub class: String,
}

/// Surface backed by a map of declared container ids
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    nodes: HashMap<String, Node>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targets<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut surface = Self::new();
        for id in ids {
            surface.declare(id);
        }
        surface
    }

    /// Create an empty container (a no-op if it already exists)
    pub fn declare(&mut self, id: &str) {
        self.nodes.entry(id.to_string()).or_default();
    }

    pub fn remove(&mut self, id: &str) {
        self.nodes.remove(id);
    }

    pub fn html(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).map(|n| n.html.as_str())
    }

    pub fn class(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).map(|n| n.class.as_str())
    }

    pub fn clear(&mut self) {
        for node in self.nodes.values_mut() {
            *node = Node::default();
        }
    }
}

impl Surface for MemorySurface {
    fn has_target(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn apply(&mut self, id: &str, update: &Update) {
        if let Some(node) = self.nodes.get_mut(id) {
            match update {
                Update::Html(html) => node.html = html.clone(),
                Update::Text(text) => node.html = crate::markup::escape(text),
                Update::Class(class) => node.class = class.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_existing_target() {
        let mut surface = MemorySurface::with_targets(["api-response"]);

        assert!(surface.write("api-response", &Update::Html("<b>hi</b>".into())));
        assert_eq!(surface.html("api-response"), Some("<b>hi</b>"));
    }

    #[test]
    fn test_missing_target_is_skipped() {
        let mut surface = MemorySurface::with_targets(["api-response"]);

        assert!(!surface.write("slm-response", &Update::Html("x".into())));
        assert_eq!(surface.html("slm-response"), None);
    }

    #[test]
    fn test_text_update_is_escaped() {
        let mut surface = MemorySurface::with_targets(["cost"]);
        surface.write("cost", &Update::Text("<$0.01>".into()));
        assert_eq!(surface.html("cost"), Some("&lt;$0.01&gt;"));
    }

    #[test]
    fn test_class_update() {
        let mut surface = MemorySurface::with_targets(["flow-step-0"]);
        surface.write("flow-step-0", &Update::Class("active".into()));
        assert_eq!(surface.class("flow-step-0"), Some("active"));
        assert_eq!(surface.html("flow-step-0"), Some(""));
    }

    #[test]
    fn test_write_fragment() {
        let mut surface = MemorySurface::with_targets(["test-result"]);
        let fragment = Fragment::new("test-result", "<div>ok</div>");
        assert!(surface.write_fragment(&fragment));
        assert_eq!(surface.html("test-result"), Some("<div>ok</div>"));
    }
}
