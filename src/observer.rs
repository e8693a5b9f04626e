use log::error;

use crate::document::MutationRecord;
use crate::selector::Selector;

/// Watches batches of document mutations for elements matching selector.
pub struct MutationObserver {
    selector: Selector,
    /// Attribute names whose changes are relevant, empty means attributes are ignored.
    attribute_filter: Vec<String>,
}

impl MutationObserver {
    pub fn observe(selector: &str) -> Option<Self> {
        match Selector::parse(selector) {
            Ok(selector) => Some(Self {
                selector,
                attribute_filter: vec![],
            }),
            Err(error) => {
                error!("unable to observe {selector}, {error:?}");
                None
            }
        }
    }

    pub fn attributes(mut self, names: &[&str]) -> Self {
        self.attribute_filter = names.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Invokes callback at most once for the whole batch.
    pub fn deliver(&self, records: &[MutationRecord], callback: impl FnOnce()) {
        if records.iter().any(|record| self.is_relevant(record)) {
            callback();
        }
    }

    fn is_relevant(&self, record: &MutationRecord) -> bool {
        match record {
            MutationRecord::ChildList { added, removed, .. } => added
                .iter()
                .chain(removed.iter())
                .any(|node| self.selector.matches_subject(node)),
            MutationRecord::Attributes {
                target,
                name,
                old_value,
            } => {
                let previous = target.with_attribute(name, old_value.as_deref());
                self.attribute_filter.iter().any(|filter| filter == name)
                    && (self.selector.matches_subject(target)
                        || self.selector.matches_subject(&previous))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::Page;

    #[test]
    pub fn test_added_marked_descendant_delivers_once() {
        let mut page = page();
        let body = page.body();
        page.append_html(body, r#"<div><p data-aos></p><p data-aos></p></div>"#)
            .expect("appended");
        page.append_html(body, r#"<p data-aos></p>"#).expect("appended");
        assert_eq!(deliveries(&mut page), 1);
    }

    #[test]
    pub fn test_unmarked_changes_ignored() {
        let mut page = page();
        let body = page.body();
        page.append_html(body, r#"<div><p></p></div>"#).expect("appended");
        page.set_attribute(body, "data-theme", "dark");
        assert_eq!(deliveries(&mut page), 0);
    }

    #[test]
    pub fn test_removed_marked_node() {
        let mut page = page();
        let node = page.query("[data-aos]").expect("marked");
        page.remove(node).expect("removed");
        assert_eq!(deliveries(&mut page), 1);
    }

    #[test]
    pub fn test_filtered_attributes() {
        let mut page = page();
        let node = page.query("[data-aos]").expect("marked");
        page.set_attribute(node, "title", "hello");
        assert_eq!(deliveries(&mut page), 0);
        page.set_attribute(node, "data-aos-offset", "10");
        assert_eq!(deliveries(&mut page), 1);
        page.remove_attribute(node, "data-aos");
        assert_eq!(deliveries(&mut page), 1);
    }

    #[test]
    pub fn test_invalid_selector() {
        assert!(MutationObserver::observe("[").is_none());
    }

    fn deliveries(page: &mut Page) -> usize {
        let observer = MutationObserver::observe("[data-aos]")
            .expect("observer")
            .attributes(&["data-aos", "data-aos-offset"]);
        let mut count = 0;
        observer.deliver(&page.take_mutations(), || count += 1);
        count
    }

    fn page() -> Page {
        let mut page = Page::compile(r#"<div data-aos></div>"#, [1000.0, 800.0])
            .expect("page compiled");
        page.take_mutations();
        page
    }
}
