use log::error;
use taffy::NodeId;

use crate::document::Document;

pub const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Click { target: NodeId },
    TouchStart { target: NodeId },
}

/// Mobile navigation: button toggles menu, click anywhere outside closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavMenu {
    button: NodeId,
    nav: NodeId,
}

impl NavMenu {
    pub fn bind(document: &impl Document, button: &str, nav: &str) -> Option<Self> {
        let button = match document.query(button) {
            Some(node) => node,
            None => {
                error!("unable to bind menu, button {button} not found");
                return None;
            }
        };
        let nav = match document.query(nav) {
            Some(node) => node,
            None => {
                error!("unable to bind menu, navigation {nav} not found");
                return None;
            }
        };
        Some(Self { button, nav })
    }

    pub fn is_open(&self, document: &impl Document) -> bool {
        document.has_class(self.nav, ACTIVE_CLASS)
    }

    /// Returns true if default action of event must be prevented.
    pub fn handle(&self, document: &mut impl Document, event: PointerEvent) -> bool {
        match event {
            PointerEvent::TouchStart { target } => {
                if document.contains(self.button, target) {
                    document.toggle_class(self.nav, ACTIVE_CLASS);
                    // synthesized click must not toggle menu back
                    return true;
                }
                false
            }
            PointerEvent::Click { target } => {
                if document.contains(self.button, target) {
                    document.toggle_class(self.nav, ACTIVE_CLASS);
                } else if !document.contains(self.nav, target) {
                    document.remove_class(self.nav, ACTIVE_CLASS);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Page;

    const HTML: &str = r##"
        <header>
            <nav id="nav"><button id="btn-mobile"><span class="hamburger"></span></button>
                <ul id="menu"><li><a href="#about">About</a></li></ul>
            </nav>
        </header>
        <main id="content"></main>
    "##;

    #[test]
    pub fn test_button_click_toggles() {
        let (mut page, menu) = setup();
        let hamburger = node(&page, ".hamburger");
        menu.handle(&mut page, PointerEvent::Click { target: hamburger });
        assert!(menu.is_open(&page));
        menu.handle(&mut page, PointerEvent::Click { target: hamburger });
        assert!(!menu.is_open(&page));
    }

    #[test]
    pub fn test_touch_toggles_and_prevents_default() {
        let (mut page, menu) = setup();
        let button = node(&page, "#btn-mobile");
        assert!(menu.handle(&mut page, PointerEvent::TouchStart { target: button }));
        assert!(menu.is_open(&page));
        let content = node(&page, "#content");
        assert!(!menu.handle(&mut page, PointerEvent::TouchStart { target: content }));
        assert!(menu.is_open(&page));
    }

    #[test]
    pub fn test_click_outside_closes() {
        let (mut page, menu) = setup();
        let button = node(&page, "#btn-mobile");
        menu.handle(&mut page, PointerEvent::Click { target: button });
        let link = node(&page, "#menu a");
        menu.handle(&mut page, PointerEvent::Click { target: link });
        assert!(menu.is_open(&page));
        let content = node(&page, "#content");
        menu.handle(&mut page, PointerEvent::Click { target: content });
        assert!(!menu.is_open(&page));
    }

    #[test]
    pub fn test_bind_missing_elements() {
        let page = Page::compile(HTML, [400.0, 800.0]).expect("page compiled");
        assert!(NavMenu::bind(&page, "#btn-desktop", "#nav").is_none());
        assert!(NavMenu::bind(&page, "#btn-mobile", "#sidebar").is_none());
    }

    fn node(page: &Page, selector: &str) -> NodeId {
        page.query(selector).expect("node exists")
    }

    fn setup() -> (Page, NavMenu) {
        let page = Page::compile(HTML, [400.0, 800.0]).expect("page compiled");
        let menu = NavMenu::bind(&page, "#btn-mobile", "#nav").expect("menu bound");
        (page, menu)
    }
}
