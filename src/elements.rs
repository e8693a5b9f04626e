use taffy::NodeId;

use crate::attributes::{ElementOptions, MARKER_SELECTOR};
use crate::document::Document;
use crate::options::{Easing, Options};

/// Scroll offsets at which element visibility flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Element is revealed when document scrolled to this offset or further.
    pub enter: i32,
    /// Element is hidden again when scrolled back above this offset.
    pub leave: i32,
}

/// Transient view of marked element, recreated on every full collection.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedElement {
    pub node: NodeId,
    pub position: Position,
    pub options: ElementOptions,
    pub animated: bool,
}

impl AnimatedElement {
    pub fn new(node: NodeId, options: ElementOptions) -> Self {
        Self {
            node,
            position: Position::default(),
            options,
            animated: false,
        }
    }

    /// Resolves whether element stays revealed forever once shown.
    pub fn is_once(&self, once: bool) -> bool {
        self.options.once.unwrap_or(once)
    }

    /// Resolves whether element may be hidden again, per element flags take precedence.
    pub fn is_reversible(&self, once: bool) -> bool {
        !self.is_once(once) && self.options.mirror.unwrap_or(true)
    }

    pub fn timing(&self, options: &Options) -> Timing {
        Timing {
            easing: self.options.easing.unwrap_or(options.easing),
            duration: self.options.duration.unwrap_or(options.duration),
            delay: self.options.delay.unwrap_or(options.delay),
        }
    }
}

/// Effective transition parameters of element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub easing: Easing,
    pub duration: u32,
    pub delay: u32,
}

/// Finds every marked element in document order, never mutates document.
pub fn collect(document: &impl Document) -> Vec<AnimatedElement> {
    document
        .query_all(MARKER_SELECTOR)
        .into_iter()
        .map(|node| AnimatedElement::new(node, ElementOptions::read(document, node)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Page;

    #[test]
    pub fn test_collect_in_document_order() {
        let page = page(
            r#"<div data-aos="a" id="a"><p data-aos="b" id="b"></p></div>
               <span id="c"></span><div data-aos="c" id="d"></div>"#,
        );
        let elements = collect(&page);
        let ids: Vec<&str> = elements
            .iter()
            .map(|element| page.attribute(element.node, "id").unwrap_or_default())
            .collect();
        assert_eq!(ids, ["a", "b", "d"]);
        assert!(elements.iter().all(|element| !element.animated));
        assert!(elements
            .iter()
            .all(|element| element.position == Position::default()));
    }

    #[test]
    pub fn test_collect_does_not_mutate() {
        let mut page = page(r#"<div data-aos="fade"></div>"#);
        page.take_mutations();
        let _ = collect(&page);
        assert!(page.take_mutations().is_empty());
        let node = page.query("div").expect("div");
        assert_eq!(page.attribute(node, "class"), None);
    }

    #[test]
    pub fn test_per_element_flags_win() {
        let mut element = AnimatedElement::new(NodeId::from(1u64), ElementOptions::default());
        assert!(element.is_reversible(false));
        assert!(!element.is_reversible(true));
        element.options.once = Some(false);
        assert!(element.is_reversible(true));
        element.options.once = Some(true);
        assert!(!element.is_reversible(false));
        element.options.once = None;
        element.options.mirror = Some(false);
        assert!(!element.is_reversible(false));
    }

    #[test]
    pub fn test_timing_falls_back_to_global() {
        let mut element = AnimatedElement::new(NodeId::from(1u64), ElementOptions::default());
        element.options.duration = Some(1000);
        let timing = element.timing(&Options::default().delay(100));
        assert_eq!(timing.duration, 1000);
        assert_eq!(timing.delay, 100);
        assert_eq!(timing.easing, Easing::Ease);
    }

    fn page(body: &str) -> Page {
        Page::compile(body, [1000.0, 800.0]).expect("page compiled")
    }
}
