use std::str::FromStr;

use log::warn;
use taffy::NodeId;

use crate::document::Document;
use crate::options::Easing;

pub const MARKER: &str = "data-aos";
pub const MARKER_SELECTOR: &str = "[data-aos]";
pub const EASING: &str = "data-aos-easing";
pub const DURATION: &str = "data-aos-duration";
pub const DELAY: &str = "data-aos-delay";
pub const OFFSET: &str = "data-aos-offset";
pub const ANCHOR: &str = "data-aos-anchor";
pub const ANCHOR_PLACEMENT: &str = "data-aos-anchor-placement";
pub const ONCE: &str = "data-aos-once";
pub const MIRROR: &str = "data-aos-mirror";
pub const MIRROR_OFFSET: &str = "data-aos-mirror-offset";
pub const ID: &str = "data-aos-id";

/// Applied to every element once its position is prepared.
pub const INIT_CLASS: &str = "aos-init";
/// Applied while element is revealed, stylesheet renders transition on it.
pub const ANIMATE_CLASS: &str = "aos-animate";

/// Attributes removed when animations are disabled.
pub const PRESENTATION: [&str; 4] = [MARKER, EASING, DURATION, DELAY];

/// Attributes affecting which elements are animated and where they trigger.
pub const OBSERVED: [&str; 8] = [
    MARKER,
    OFFSET,
    ANCHOR,
    ANCHOR_PLACEMENT,
    ONCE,
    MIRROR,
    MIRROR_OFFSET,
    "style",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Center,
    Bottom,
}

impl FromStr for Edge {
    type Err = ();

    fn from_str(keyword: &str) -> Result<Self, Self::Err> {
        match keyword {
            "top" => Ok(Edge::Top),
            "center" => Ok(Edge::Center),
            "bottom" => Ok(Edge::Bottom),
            _ => Err(()),
        }
    }
}

/// Which edge of element must cross which edge of viewport to trigger animation,
/// written as `<element>-<viewport>`, for example `center-bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorPlacement {
    pub element: Edge,
    pub viewport: Edge,
}

impl Default for AnchorPlacement {
    fn default() -> Self {
        Self {
            element: Edge::Top,
            viewport: Edge::Bottom,
        }
    }
}

impl AnchorPlacement {
    pub fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Share of element height from its top to the triggering edge.
    pub fn element_ratio(&self) -> f32 {
        match self.element {
            Edge::Top => 0.0,
            Edge::Center => 0.5,
            Edge::Bottom => 1.0,
        }
    }

    /// Share of viewport height from its bottom to the triggering edge.
    pub fn viewport_ratio(&self) -> f32 {
        match self.viewport {
            Edge::Bottom => 0.0,
            Edge::Center => 0.5,
            Edge::Top => 1.0,
        }
    }
}

impl FromStr for AnchorPlacement {
    type Err = ();

    fn from_str(keyword: &str) -> Result<Self, Self::Err> {
        let (element, viewport) = keyword.trim().split_once('-').ok_or(())?;
        Ok(Self {
            element: element.parse()?,
            viewport: viewport.parse()?,
        })
    }
}

/// Per element overrides of global options, read once when element is collected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementOptions {
    /// Animation name, value of marker attribute.
    pub animation: String,
    pub easing: Option<Easing>,
    pub duration: Option<u32>,
    pub delay: Option<u32>,
    pub offset: Option<i32>,
    pub anchor: Option<String>,
    pub anchor_placement: AnchorPlacement,
    pub once: Option<bool>,
    pub mirror: Option<bool>,
    /// Pixels below trigger position element must scroll back to be hidden again.
    pub mirror_offset: i32,
    /// Suffix of custom events fired on reveal and hide.
    pub id: Option<String>,
}

impl ElementOptions {
    pub fn read(document: &impl Document, node: NodeId) -> Self {
        let attr = |name: &str| document.attribute(node, name);
        let easing = attr(EASING).and_then(|keyword| {
            let easing = Easing::parse(keyword);
            if easing.is_none() {
                warn!("easing {keyword} not supported, element {node:?}");
            }
            easing
        });
        let anchor_placement = match attr(ANCHOR_PLACEMENT) {
            None => AnchorPlacement::default(),
            Some(keyword) => keyword.parse().unwrap_or_else(|_| {
                warn!("anchor placement {keyword} not supported, element {node:?}");
                AnchorPlacement::default()
            }),
        };
        Self {
            animation: attr(MARKER).unwrap_or_default().to_string(),
            easing,
            duration: read_number(attr(DURATION), DURATION, node),
            delay: read_number(attr(DELAY), DELAY, node),
            offset: read_number(attr(OFFSET), OFFSET, node),
            anchor: attr(ANCHOR)
                .map(str::trim)
                .filter(|selector| !selector.is_empty())
                .map(str::to_string),
            anchor_placement,
            once: read_flag(attr(ONCE), ONCE, node),
            mirror: read_flag(attr(MIRROR), MIRROR, node),
            mirror_offset: read_number(attr(MIRROR_OFFSET), MIRROR_OFFSET, node).unwrap_or(0),
            id: attr(ID).map(str::to_string),
        }
    }
}

fn read_number<T: FromStr>(value: Option<&str>, name: &str, node: NodeId) -> Option<T> {
    let value = value?.trim();
    match value.parse::<T>() {
        Ok(number) => Some(number),
        Err(_) => {
            warn!("unable to parse {name}={value} of element {node:?}");
            None
        }
    }
}

fn read_flag(value: Option<&str>, name: &str, node: NodeId) -> Option<bool> {
    match value?.trim() {
        "" | "true" => Some(true),
        "false" => Some(false),
        value => {
            warn!("unable to parse {name}={value} of element {node:?}");
            None
        }
    }
}
