use std::collections::HashMap;

use taffy::NodeId;

use crate::selector::Subject;

/// Page node context stored in layout tree, contains markup data and resolved geometry.
#[derive(Debug, Clone)]
pub struct Element {
    pub node: NodeId,
    pub tag: String,
    pub text: Option<String>,
    pub attrs: HashMap<String, String>,
    /// Absolute position of border box from document top left corner.
    pub position: [f32; 2],
    pub size: [f32; 2],
}

impl Element {
    pub fn new(node: NodeId, tag: &str) -> Self {
        Self {
            node,
            tag: tag.to_string(),
            text: None,
            attrs: HashMap::new(),
            position: [0.0, 0.0],
            size: [0.0, 0.0],
        }
    }

    pub fn text(node: NodeId, text: &str) -> Self {
        let mut element = Self::new(node, "");
        element.text = Some(text.to_string());
        element
    }

    #[inline(always)]
    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attrs
            .get("class")
            .map(|classes| classes.split_whitespace().any(|name| name == class))
            .unwrap_or(false)
    }

    /// Returns true if class list changed.
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        let classes = self.attrs.entry("class".to_string()).or_default();
        if !classes.trim().is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        true
    }

    /// Returns true if class list changed, drops the attribute when no classes left.
    pub fn remove_class(&mut self, class: &str) -> bool {
        if !self.has_class(class) {
            return false;
        }
        let remaining: Vec<String> = self
            .attrs
            .get("class")
            .map(|classes| {
                classes
                    .split_whitespace()
                    .filter(|name| *name != class)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if remaining.is_empty() {
            self.attrs.remove("class");
        } else {
            self.attrs.insert("class".to_string(), remaining.join(" "));
        }
        true
    }

    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }
}

impl Subject for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_add_class_once() {
        let mut element = element("aos-init");
        assert!(element.add_class("aos-animate"));
        assert!(!element.add_class("aos-animate"));
        assert_eq!(element.attrs["class"], "aos-init aos-animate");
    }

    #[test]
    pub fn test_remove_last_class_drops_attribute() {
        let mut element = element("active");
        assert!(element.remove_class("active"));
        assert!(!element.attrs.contains_key("class"));
        assert!(!element.remove_class("active"));
    }

    #[test]
    pub fn test_toggle_class() {
        let mut element = element("");
        assert!(element.toggle_class("active"));
        assert!(element.has_class("active"));
        assert!(!element.toggle_class("active"));
        assert!(!element.has_class("active"));
    }

    fn element(classes: &str) -> Element {
        let mut element = Element::new(NodeId::from(1u64), "div");
        if !classes.is_empty() {
            element.attrs.insert("class".to_string(), classes.to_string());
        }
        element
    }
}
