use log::warn;

use crate::document::Document;
use crate::elements::{AnimatedElement, Position};
use crate::options::Options;

/// Computes trigger positions of elements from current document geometry.
///
/// ```text
/// enter = top - viewport + height * element ratio + viewport * viewport ratio + offset
/// leave = enter - mirror offset
/// ```
///
/// When element declares an anchor, geometry of the first element matching the anchor
/// selector is used instead. Elements without layout produce whatever the formula
/// gives, it is not an error.
pub fn prepare(
    elements: &[AnimatedElement],
    options: &Options,
    document: &impl Document,
) -> Vec<AnimatedElement> {
    let viewport = document.viewport_height();
    elements
        .iter()
        .map(|element| {
            let target = match element.options.anchor.as_ref() {
                None => element.node,
                Some(anchor) => document.query(anchor).unwrap_or_else(|| {
                    warn!("anchor {anchor} not found, element {:?}", element.node);
                    element.node
                }),
            };
            let top = document.offset_top(target);
            let height = document.offset_height(target);
            let placement = element.options.anchor_placement;
            let offset = element.options.offset.unwrap_or(options.offset);
            let enter = top - viewport
                + height * placement.element_ratio()
                + viewport * placement.viewport_ratio()
                + offset as f32;
            let enter = enter.round() as i32;
            let mut element = element.clone();
            element.position = Position {
                enter,
                leave: enter - element.options.mirror_offset,
            };
            element
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::collect;
    use crate::Page;

    #[test]
    pub fn test_default_placement_and_offset() {
        let positions = positions(
            r#"<div style="height: 1000px"></div><div data-aos style="height: 50px"></div>"#,
            Options::default(),
        );
        assert_eq!(positions, [enter(1000 - 800 + 120)]);
    }

    #[test]
    pub fn test_offset_override_with_bottom_bottom_placement() {
        let positions = positions(
            r#"<div style="height: 1000px"></div>
               <div data-aos data-aos-offset="200" data-aos-anchor-placement="bottom-bottom"
                    style="height: 50px"></div>"#,
            Options::default(),
        );
        assert_eq!(positions, [enter(450)]);
    }

    #[test]
    pub fn test_all_placements() {
        let cases = [
            ("top-bottom", 200),
            ("center-bottom", 250),
            ("bottom-bottom", 300),
            ("top-center", 600),
            ("center-center", 650),
            ("bottom-center", 700),
            ("top-top", 1000),
            ("center-top", 1050),
            ("bottom-top", 1100),
        ];
        for (placement, expected) in cases {
            let html = format!(
                r#"<div style="height: 1000px"></div>
                   <div data-aos data-aos-anchor-placement="{placement}" style="height: 100px"></div>"#
            );
            let positions = positions(&html, Options::default().offset(0));
            assert_eq!(positions, [enter(expected)], "{placement}");
        }
    }

    #[test]
    pub fn test_anchor_geometry() {
        let positions = positions(
            r##"<div id="hero" style="height: 300px"></div>
               <div style="height: 2000px"></div>
               <div data-aos data-aos-anchor="#hero" data-aos-offset="0" style="height: 10px"></div>
               <div data-aos data-aos-anchor="#missing" data-aos-offset="0" style="height: 10px"></div>"##,
            Options::default(),
        );
        assert_eq!(positions, [enter(-800), enter(2300 - 800)]);
    }

    #[test]
    pub fn test_mirror_offset() {
        let positions = positions(
            r#"<div style="height: 1000px"></div>
               <div data-aos data-aos-mirror-offset="100" style="height: 50px"></div>"#,
            Options::default().offset(0),
        );
        assert_eq!(
            positions,
            [Position {
                enter: 200,
                leave: 100
            }]
        );
    }

    #[test]
    pub fn test_hidden_element_is_degenerate_not_error() {
        let positions = positions(
            r#"<div data-aos style="display: none"></div>"#,
            Options::default().offset(0),
        );
        assert_eq!(positions, [enter(-800)]);
    }

    #[test]
    pub fn test_prepare_keeps_animated_state() {
        let page = page(r#"<div data-aos style="height: 10px"></div>"#);
        let mut elements = collect(&page);
        elements[0].animated = true;
        let prepared = prepare(&elements, &Options::default(), &page);
        assert!(prepared[0].animated);
    }

    fn enter(enter: i32) -> Position {
        Position {
            enter,
            leave: enter,
        }
    }

    fn positions(html: &str, options: Options) -> Vec<Position> {
        let page = page(html);
        let elements = collect(&page);
        prepare(&elements, &options, &page)
            .into_iter()
            .map(|element| element.position)
            .collect()
    }

    fn page(html: &str) -> Page {
        Page::compile(html, [1000.0, 800.0]).expect("page compiled")
    }
}
