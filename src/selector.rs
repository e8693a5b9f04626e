use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use cssparser::{serialize_identifier, CssStringWriter, Parser as CssParser, ParserInput, ToCss};
use log::error;
use precomputed_hash::PrecomputedHash;
use selectors::attr::AttrSelectorOperator;
use selectors::parser::{
    Combinator, Component, ParseRelative, Parser, SelectorImpl, SelectorList,
    SelectorParseErrorKind,
};
use taffy::{NodeId, TaffyTree};

use crate::Element;

/// Anything a compound selector can be tested against: a live element of the page
/// or a detached snapshot of a removed one.
pub trait Subject {
    fn tag(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorError {
    Empty,
    Invalid { selector: String, reason: String },
}

/// Selector list parsed by `selectors` crate, matched against page tree.
///
/// Supported components: type, universal, id, class and attribute selectors joined
/// by descendant or child combinators. Anything else never matches.
#[derive(Debug, Clone)]
pub struct Selector {
    list: SelectorList<Markup>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        if source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut input = ParserInput::new(source);
        let mut parser = CssParser::new(&mut input);
        match SelectorList::parse(&MarkupParser, &mut parser, ParseRelative::No) {
            Ok(list) => Ok(Self { list }),
            Err(error) => Err(SelectorError::Invalid {
                selector: source.to_string(),
                reason: format!("{:?}", error.kind),
            }),
        }
    }

    pub fn matches(&self, node: NodeId, tree: &TaffyTree<Element>) -> bool {
        self.list.0.iter().any(|selector| {
            let components = selector.iter_raw_match_order().as_slice();
            match_complex(components, node, tree)
        })
    }

    /// Matches only the rightmost compound of every selector, ancestors are not
    /// available for detached subjects.
    pub fn matches_subject(&self, subject: &impl Subject) -> bool {
        self.list.0.iter().any(|selector| {
            selector
                .iter_raw_match_order()
                .take_while(|component| !matches!(component, Component::Combinator(_)))
                .all(|component| match_simple(component, subject))
        })
    }
}

/// Components come in match order: rightmost compound first, then combinator,
/// then compound to the left of it and so on.
fn match_complex(
    components: &[Component<Markup>],
    node: NodeId,
    tree: &TaffyTree<Element>,
) -> bool {
    let element = match tree.get_node_context(node) {
        Some(element) => element,
        None => return false,
    };
    let split = components
        .iter()
        .position(|component| matches!(component, Component::Combinator(_)));
    let (compound, rest) = match split {
        Some(index) => components.split_at(index),
        None => (components, &components[components.len()..]),
    };
    if !compound.iter().all(|component| match_simple(component, element)) {
        return false;
    }
    let (combinator, rest) = match rest.split_first() {
        None => return true,
        Some((Component::Combinator(combinator), rest)) => (*combinator, rest),
        Some(_) => return false,
    };
    match combinator {
        Combinator::Child => tree
            .parent(node)
            .map(|parent| match_complex(rest, parent, tree))
            .unwrap_or(false),
        Combinator::Descendant => {
            let mut ancestor = tree.parent(node);
            while let Some(current) = ancestor {
                if match_complex(rest, current, tree) {
                    return true;
                }
                ancestor = tree.parent(current);
            }
            false
        }
        combinator => {
            error!("combinator {combinator:?} not supported");
            false
        }
    }
}

fn match_simple(component: &Component<Markup>, subject: &impl Subject) -> bool {
    match component {
        Component::ExplicitUniversalType | Component::ExplicitAnyNamespace => true,
        Component::LocalName(local) => subject.tag().eq_ignore_ascii_case(&local.name.0),
        Component::ID(id) => subject.attr("id") == Some(id.0.as_str()),
        Component::Class(class) => subject
            .attr("class")
            .map(|classes| classes.split_whitespace().any(|name| name == class.0))
            .unwrap_or(false),
        Component::AttributeInNoNamespaceExists { local_name, .. } => {
            subject.attr(&local_name.0).is_some()
        }
        Component::AttributeInNoNamespace {
            local_name,
            operator,
            value,
            ..
        } => {
            let value = value.0.as_str();
            subject
                .attr(&local_name.0)
                .map(|attr| match operator {
                    AttrSelectorOperator::Equal => attr == value,
                    AttrSelectorOperator::Includes => {
                        attr.split_whitespace().any(|word| word == value)
                    }
                    AttrSelectorOperator::DashMatch => {
                        attr == value || attr.starts_with(&format!("{value}-"))
                    }
                    AttrSelectorOperator::Prefix => attr.starts_with(value),
                    AttrSelectorOperator::Substring => attr.contains(value),
                    AttrSelectorOperator::Suffix => attr.ends_with(value),
                })
                .unwrap_or(false)
        }
        _ => {
            error!("selector {component:?} not supported");
            false
        }
    }
}

#[derive(Debug, Clone)]
pub enum Markup {}

impl SelectorImpl for Markup {
    type ExtraMatchingData<'a> = ();
    type AttrValue = Value;
    type Identifier = Name;
    type LocalName = Name;
    type NamespaceUrl = Name;
    type NamespacePrefix = Name;
    type BorrowedNamespaceUrl = str;
    type BorrowedLocalName = str;
    type NonTSPseudoClass = Unsupported;
    type PseudoElement = Unsupported;
}

struct MarkupParser;

impl<'i> Parser<'i> for MarkupParser {
    type Impl = Markup;
    type Error = SelectorParseErrorKind<'i>;
}

/// Identifier of tag, id, class or attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Name(String);

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl ToCss for Name {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for Name {
    fn precomputed_hash(&self) -> u32 {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish() as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value(String);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl ToCss for Value {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        use fmt::Write;
        write!(CssStringWriter::new(dest), "{}", self.0)
    }
}

/// Pseudo classes and elements have no meaning for a page without interaction state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unsupported {}

impl ToCss for Unsupported {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::NonTSPseudoClass for Unsupported {
    type Impl = Markup;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for Unsupported {
    type Impl = Markup;

    fn accepts_state_pseudo_classes(&self) -> bool {
        match *self {}
    }

    fn valid_after_slotted(&self) -> bool {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fake {
        tag: &'static str,
        attrs: HashMap<&'static str, &'static str>,
    }

    impl Subject for Fake {
        fn tag(&self) -> &str {
            self.tag
        }

        fn attr(&self, name: &str) -> Option<&str> {
            self.attrs.get(name).copied()
        }
    }

    #[test]
    pub fn test_attribute_presence() {
        let selector = parse("[data-aos]");
        assert!(selector.matches_subject(&fake("div", &[("data-aos", "fade-up")])));
        assert!(!selector.matches_subject(&fake("div", &[("data-aos-once", "true")])));
    }

    #[test]
    pub fn test_attribute_value() {
        let selector = parse("[data-aos=\"fade\"]");
        assert!(selector.matches_subject(&fake("div", &[("data-aos", "fade")])));
        assert!(!selector.matches_subject(&fake("div", &[("data-aos", "zoom")])));
    }

    #[test]
    pub fn test_attribute_value_with_bracket() {
        let selector = parse("[title=\"x]y\"]");
        assert!(selector.matches_subject(&fake("a", &[("title", "x]y")])));
        assert!(!selector.matches_subject(&fake("a", &[("title", "x")])));
    }

    #[test]
    pub fn test_attribute_operators() {
        let subject = fake("div", &[("data-aos", "fade-up"), ("rel", "nav main")]);
        assert!(parse("[data-aos^=fade]").matches_subject(&subject));
        assert!(parse("[data-aos$=up]").matches_subject(&subject));
        assert!(parse("[data-aos|=fade]").matches_subject(&subject));
        assert!(parse("[rel~=main]").matches_subject(&subject));
        assert!(!parse("[rel~=ma]").matches_subject(&subject));
    }

    #[test]
    pub fn test_compound_tag_id_class() {
        let selector = parse("section#intro.hero.dark");
        let subject = fake("section", &[("id", "intro"), ("class", "dark hero")]);
        assert!(selector.matches_subject(&subject));
        let subject = fake("div", &[("id", "intro"), ("class", "dark hero")]);
        assert!(!selector.matches_subject(&subject));
    }

    #[test]
    pub fn test_group_matches_any() {
        let selector = parse(".a, #b");
        assert!(selector.matches_subject(&fake("p", &[("id", "b")])));
        assert!(selector.matches_subject(&fake("p", &[("class", "a")])));
        assert!(!selector.matches_subject(&fake("p", &[])));
    }

    #[test]
    pub fn test_subject_checks_rightmost_compound() {
        let selector = parse("main > .list li");
        assert!(selector.matches_subject(&fake("li", &[])));
        assert!(!selector.matches_subject(&fake("main", &[])));
    }

    #[test]
    pub fn test_invalid_selectors() {
        assert_eq!(Selector::parse("  ").err(), Some(SelectorError::Empty));
        assert!(Selector::parse("div >").is_err());
        assert!(Selector::parse("a > > b").is_err());
        assert!(Selector::parse("> div").is_err());
        assert!(Selector::parse("div!").is_err());
    }

    fn parse(source: &str) -> Selector {
        Selector::parse(source).expect("selector valid")
    }

    fn fake(tag: &'static str, attrs: &[(&'static str, &'static str)]) -> Fake {
        Fake {
            tag,
            attrs: attrs.iter().cloned().collect(),
        }
    }
}
