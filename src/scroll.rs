use taffy::NodeId;

use crate::attributes::ANIMATE_CLASS;
use crate::document::Document;
use crate::elements::AnimatedElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    In(NodeId),
    Out(NodeId),
}

impl Reveal {
    pub fn event(&self) -> &'static str {
        match self {
            Reveal::In(_) => "aos:in",
            Reveal::Out(_) => "aos:out",
        }
    }
}

/// Shows or hides elements according to current scroll offset.
///
/// Reads scroll offset only, positions must be prepared beforehand, so it is safe
/// to call on every scroll event.
pub fn handle_scroll(
    elements: &mut [AnimatedElement],
    once: bool,
    document: &mut impl Document,
) -> Vec<Reveal> {
    let y = document.scroll_y();
    let mut reveals = vec![];
    for element in elements.iter_mut() {
        let reveal = if y >= element.position.enter as f32 {
            if element.animated {
                continue;
            }
            element.animated = true;
            document.add_class(element.node, ANIMATE_CLASS);
            Reveal::In(element.node)
        } else if element.animated
            && y < element.position.leave as f32
            && element.is_reversible(once)
        {
            element.animated = false;
            document.remove_class(element.node, ANIMATE_CLASS);
            Reveal::Out(element.node)
        } else {
            continue;
        };
        document.dispatch(element.node, reveal.event());
        if let Some(id) = element.options.id.as_ref() {
            document.dispatch(element.node, &format!("{}:{id}", reveal.event()));
        }
        reveals.push(reveal);
    }
    reveals
}
