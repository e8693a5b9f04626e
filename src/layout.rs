use lightningcss::properties::display::{Display, DisplayInside, DisplayKeyword};
use lightningcss::properties::size::Size;
use lightningcss::properties::Property;
use lightningcss::stylesheet::{ParserOptions, StyleAttribute};
use lightningcss::values::length::{LengthPercentage, LengthPercentageOrAuto, LengthValue};
use lightningcss::values::percentage::DimensionPercentage;
use log::warn;
use taffy::prelude::length;
use taffy::{Dimension, LengthPercentageAuto, Style};

/// Viewport dependent units resolution context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizes {
    pub root_font_size: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Sizes {
    pub fn new(viewport: [f32; 2]) -> Self {
        let [viewport_width, viewport_height] = viewport;
        Self {
            root_font_size: 16.0,
            viewport_width,
            viewport_height,
        }
    }
}

pub fn default_layout() -> Style {
    Style {
        display: taffy::Display::Block,
        ..Default::default()
    }
}

/// Applies declarations of element inline `style` attribute to layout.
///
/// Only box geometry is supported here: display, width, height, min sizes,
/// margin and padding. Everything else has no effect on scroll positions.
/// Invalid declarations are skipped the way browsers do.
pub fn apply_inline_style(declarations: &str, sizes: Sizes, layout: &mut Style) {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let attribute = match StyleAttribute::parse(declarations, options) {
        Ok(attribute) => attribute,
        Err(error) => {
            warn!("unable to parse style {declarations}, {error}");
            return;
        }
    };
    let block = &attribute.declarations;
    for property in block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
    {
        apply(property, sizes, layout);
    }
}

fn apply(property: &Property, sizes: Sizes, layout: &mut Style) {
    match property {
        Property::Display(display) => layout.display = resolve_display(display),
        Property::Width(size) => with(dimension(size, sizes), |value| layout.size.width = value),
        Property::Height(size) => with(dimension(size, sizes), |value| layout.size.height = value),
        Property::MinWidth(size) => {
            with(dimension(size, sizes), |value| layout.min_size.width = value)
        }
        Property::MinHeight(size) => {
            with(dimension(size, sizes), |value| layout.min_size.height = value)
        }
        Property::Margin(margin) => {
            with(margin.top.edge(sizes), |value| layout.margin.top = value);
            with(margin.right.edge(sizes), |value| layout.margin.right = value);
            with(margin.bottom.edge(sizes), |value| layout.margin.bottom = value);
            with(margin.left.edge(sizes), |value| layout.margin.left = value);
        }
        Property::MarginTop(edge) => with(edge.edge(sizes), |value| layout.margin.top = value),
        Property::MarginRight(edge) => with(edge.edge(sizes), |value| layout.margin.right = value),
        Property::MarginBottom(edge) => {
            with(edge.edge(sizes), |value| layout.margin.bottom = value)
        }
        Property::MarginLeft(edge) => with(edge.edge(sizes), |value| layout.margin.left = value),
        Property::Padding(padding) => {
            with(padding.top.edge(sizes), |value| layout.padding.top = padded(value));
            with(padding.right.edge(sizes), |value| layout.padding.right = padded(value));
            with(padding.bottom.edge(sizes), |value| layout.padding.bottom = padded(value));
            with(padding.left.edge(sizes), |value| layout.padding.left = padded(value));
        }
        Property::PaddingTop(edge) => {
            with(edge.edge(sizes), |value| layout.padding.top = padded(value))
        }
        Property::PaddingRight(edge) => {
            with(edge.edge(sizes), |value| layout.padding.right = padded(value))
        }
        Property::PaddingBottom(edge) => {
            with(edge.edge(sizes), |value| layout.padding.bottom = padded(value))
        }
        Property::PaddingLeft(edge) => {
            with(edge.edge(sizes), |value| layout.padding.left = padded(value))
        }
        _ => {}
    }
}

fn with<T>(value: Option<T>, apply: impl FnOnce(T)) {
    if let Some(value) = value {
        apply(value)
    }
}

fn resolve_display(display: &Display) -> taffy::Display {
    match display {
        Display::Keyword(DisplayKeyword::None) => taffy::Display::None,
        Display::Pair(pair) => match pair.inside {
            DisplayInside::Flex(_) => taffy::Display::Flex,
            DisplayInside::Grid => taffy::Display::Grid,
            _ => taffy::Display::Block,
        },
        _ => taffy::Display::Block,
    }
}

fn dimension(size: &Size, sizes: Sizes) -> Option<Dimension> {
    match size {
        Size::Auto => Some(Dimension::Auto),
        Size::LengthPercentage(value) => match resolve(value, sizes)? {
            Resolved::Pixels(pixels) => Some(length(pixels)),
            Resolved::Percent(percent) => Some(Dimension::Percent(percent)),
        },
        size => {
            warn!("size {size:?} not supported");
            None
        }
    }
}

enum Resolved {
    Pixels(f32),
    Percent(f32),
}

fn resolve(value: &LengthPercentage, sizes: Sizes) -> Option<Resolved> {
    match value {
        DimensionPercentage::Dimension(value) => resolve_length(value, sizes).map(Resolved::Pixels),
        DimensionPercentage::Percentage(percent) => Some(Resolved::Percent(percent.0)),
        DimensionPercentage::Calc(calc) => {
            warn!("unresolved calc {calc:?} not supported");
            None
        }
    }
}

fn resolve_length(value: &LengthValue, sizes: Sizes) -> Option<f32> {
    let pixels = match value {
        LengthValue::Vh(value) => value * sizes.viewport_height / 100.0,
        LengthValue::Vw(value) => value * sizes.viewport_width / 100.0,
        LengthValue::Em(value) | LengthValue::Rem(value) => value * sizes.root_font_size,
        value => match value.to_px() {
            Some(pixels) => pixels,
            None => {
                warn!("length {value:?} not supported");
                return None;
            }
        },
    };
    Some(pixels)
}

/// Box edge value of margin or padding.
trait Edge {
    fn edge(&self, sizes: Sizes) -> Option<LengthPercentageAuto>;
}

impl Edge for LengthPercentage {
    fn edge(&self, sizes: Sizes) -> Option<LengthPercentageAuto> {
        let edge = match resolve(self, sizes)? {
            Resolved::Pixels(pixels) => LengthPercentageAuto::Length(pixels),
            Resolved::Percent(percent) => LengthPercentageAuto::Percent(percent),
        };
        Some(edge)
    }
}

impl Edge for LengthPercentageOrAuto {
    fn edge(&self, sizes: Sizes) -> Option<LengthPercentageAuto> {
        match self {
            LengthPercentageOrAuto::Auto => Some(LengthPercentageAuto::Auto),
            LengthPercentageOrAuto::LengthPercentage(value) => value.edge(sizes),
        }
    }
}

fn padded(edge: LengthPercentageAuto) -> taffy::LengthPercentage {
    match edge {
        LengthPercentageAuto::Length(pixels) => taffy::LengthPercentage::Length(pixels),
        LengthPercentageAuto::Percent(percent) => taffy::LengthPercentage::Percent(percent),
        LengthPercentageAuto::Auto => taffy::LengthPercentage::Length(0.0),
    }
}

/// NOTE: approximately calculates the text size, the page model has no fonts
pub fn measure_text(text: &str, font_size: f32, max_width: Option<f32>) -> [f32; 2] {
    let width = text.chars().count() as f32 * font_size * 0.5;
    match max_width {
        None => [width, font_size],
        Some(max_width) => {
            if max_width <= 0.0 {
                [0.0, 0.0]
            } else {
                let lines = (width / max_width).ceil().max(1.0);
                [width.min(max_width), lines * font_size]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_height_in_pixels() {
        let layout = style("height: 50px");
        assert_eq!(layout.size.height, length(50.0));
    }

    #[test]
    pub fn test_height_in_viewport_units() {
        let layout = style("height: 50vh; width: 10%");
        assert_eq!(layout.size.height, length(400.0));
        assert_eq!(layout.size.width, Dimension::Percent(0.1));
    }

    #[test]
    pub fn test_margin_shorthand() {
        let layout = style("margin: 10px auto");
        assert_eq!(layout.margin.top, LengthPercentageAuto::Length(10.0));
        assert_eq!(layout.margin.right, LengthPercentageAuto::Auto);
        assert_eq!(layout.margin.bottom, LengthPercentageAuto::Length(10.0));
    }

    #[test]
    pub fn test_padding_shorthand_and_longhand() {
        let layout = style("padding: 2px 4px 0 1em; padding-top: 8px");
        assert_eq!(layout.padding.top, taffy::LengthPercentage::Length(8.0));
        assert_eq!(layout.padding.right, taffy::LengthPercentage::Length(4.0));
        assert_eq!(layout.padding.left, taffy::LengthPercentage::Length(16.0));
    }

    #[test]
    pub fn test_calc_resolved() {
        let layout = style("height: calc(10px + 5px)");
        assert_eq!(layout.size.height, length(15.0));
    }

    #[test]
    pub fn test_display_flex() {
        let layout = style("display: flex");
        assert_eq!(layout.display, taffy::Display::Flex);
    }

    #[test]
    pub fn test_display_none() {
        let layout = style("display: none; color: red");
        assert_eq!(layout.display, taffy::Display::None);
    }

    #[test]
    pub fn test_invalid_values_keep_defaults() {
        let layout = style("height: tall; margin-top: 3furlongs; width: 20px");
        assert_eq!(layout.size.height, Dimension::Auto);
        assert_eq!(layout.size.width, length(20.0));
        assert_eq!(layout.margin.top, LengthPercentageAuto::Length(0.0));
    }

    #[test]
    pub fn test_measure_text_wraps() {
        assert_eq!(measure_text("abcd", 16.0, None), [32.0, 16.0]);
        assert_eq!(measure_text("abcd", 16.0, Some(20.0)), [20.0, 32.0]);
    }

    fn style(declarations: &str) -> Style {
        let mut layout = default_layout();
        apply_inline_style(declarations, Sizes::new([1000.0, 800.0]), &mut layout);
        layout
    }
}
