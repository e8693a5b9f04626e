use std::collections::HashMap;

use taffy::NodeId;

use crate::selector::Subject;
use crate::Element;

/// Mirrors `document.readyState` of the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// Everything the animation engine needs from a page.
///
/// Geometry reads (`offset_top`, `offset_height`, `viewport_height`) may force layout
/// in a real browser, so only position preparation calls them. Scroll handling reads
/// `scroll_y` only.
pub trait Document {
    /// Elements matching selector in document order, invalid selectors match nothing.
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .map(|classes| classes.split_whitespace().any(|name| name == class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    fn toggle_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            self.remove_class(node, class)
        } else {
            self.add_class(node, class)
        }
    }

    /// Whether `node` is `ancestor` itself or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Distance from document top to the element's border box top, in pixels.
    fn offset_top(&self, node: NodeId) -> f32;

    fn offset_height(&self, node: NodeId) -> f32;

    fn viewport_height(&self) -> f32;

    fn scroll_y(&self) -> f32;

    /// Element receiving global configuration attributes (`body`).
    fn root(&self) -> Option<NodeId>;

    fn ready_state(&self) -> ReadyState;

    fn user_agent(&self) -> &str;

    /// Fires custom event on element.
    fn dispatch(&mut self, node: NodeId, event: &str);

    /// Drains records of DOM changes accumulated since last call.
    fn take_mutations(&mut self) -> Vec<MutationRecord>;
}

/// Detached copy of element markup taken at the moment of mutation,
/// removed nodes no longer exist in document to be inspected later.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub node: NodeId,
    pub tag: String,
    pub attrs: HashMap<String, String>,
}

impl Snapshot {
    /// Copy of snapshot with attribute set to value or removed.
    pub fn with_attribute(&self, name: &str, value: Option<&str>) -> Self {
        let mut snapshot = self.clone();
        match value {
            Some(value) => snapshot.attrs.insert(name.to_string(), value.to_string()),
            None => snapshot.attrs.remove(name),
        };
        snapshot
    }
}

impl From<&Element> for Snapshot {
    fn from(element: &Element) -> Self {
        Self {
            node: element.node,
            tag: element.tag.clone(),
            attrs: element.attrs.clone(),
        }
    }
}

impl Subject for Snapshot {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationRecord {
    /// Nodes inserted or removed, each list contains every element of affected subtrees.
    ChildList {
        target: NodeId,
        added: Vec<Snapshot>,
        removed: Vec<Snapshot>,
    },
    Attributes {
        target: Snapshot,
        name: String,
        old_value: Option<String>,
    },
}
