use std::mem::take;

use ego_tree::NodeRef;
use log::{debug, error};
use scraper::{Html, Node};
use taffy::{AvailableSpace, Display, NodeId, Point, Size, Style, TaffyTree};

use crate::document::{Document, MutationRecord, ReadyState, Snapshot};
use crate::layout::{apply_inline_style, default_layout, measure_text, Sizes};
use crate::selector::Selector;
use crate::{Element, PageError};

/// Elements of document metadata, never rendered.
const HIDDEN_TAGS: [&str; 8] = [
    "head", "script", "style", "template", "title", "meta", "link", "noscript",
];

const FONT_SIZE: f32 = 16.0;

/// Headless page: markup tree with block layout, viewport and scroll state.
///
/// Geometry is recomputed eagerly after every change that may affect it (markup
/// insertion or removal, `style` attribute change, viewport resize), so reads are
/// always consistent with current markup.
pub struct Page {
    tree: TaffyTree<Element>,
    root: NodeId,
    body: NodeId,
    viewport: [f32; 2],
    scroll: f32,
    ready_state: ReadyState,
    user_agent: String,
    mutations: Vec<MutationRecord>,
    events: Vec<(NodeId, String)>,
}

impl Page {
    pub fn compile(html: &str, viewport: [f32; 2]) -> Result<Self, PageError> {
        let document = Html::parse_document(html);
        let mut tree = TaffyTree::new();
        let sizes = Sizes::new(viewport);
        let root = render_node(*document.root_element(), &mut tree, sizes)?
            .ok_or(PageError::BodyNotFound)?;
        let body = tree
            .children(root)?
            .into_iter()
            .find(|child| {
                tree.get_node_context(*child)
                    .map(|element| element.tag == "body")
                    .unwrap_or(false)
            })
            .ok_or(PageError::BodyNotFound)?;
        let mut page = Self {
            tree,
            root,
            body,
            viewport,
            scroll: 0.0,
            ready_state: ReadyState::Complete,
            user_agent: String::new(),
            mutations: vec![],
            events: vec![],
        };
        page.compute_layout()?;
        Ok(page)
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_ready_state(mut self, ready_state: ReadyState) -> Self {
        self.ready_state = ready_state;
        self
    }

    pub fn set_ready_state(&mut self, ready_state: ReadyState) {
        self.ready_state = ready_state;
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.tree.get_node_context(node)
    }

    pub fn viewport(&self) -> [f32; 2] {
        self.viewport
    }

    pub fn document_height(&self) -> f32 {
        self.element(self.root)
            .map(|element| element.size[1])
            .unwrap_or(0.0)
    }

    /// Scrolls document to vertical offset, negative offsets are clamped to top.
    pub fn scroll_to(&mut self, y: f32) {
        self.scroll = y.max(0.0);
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.scroll + delta);
    }

    pub fn resize(&mut self, viewport: [f32; 2]) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        for node in self.descendants(self.root) {
            self.restyle(node);
        }
        self.reflow();
    }

    /// Parses markup fragment and appends its top level nodes to parent.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, PageError> {
        if self.element(parent).is_none() {
            return Err(PageError::ElementNotFound);
        }
        let fragment = Html::parse_fragment(html);
        let sizes = Sizes::new(self.viewport);
        let mut nodes = vec![];
        let mut added = vec![];
        for child in fragment.root_element().children() {
            if let Some(node) = render_node(child, &mut self.tree, sizes)? {
                self.tree.add_child(parent, node)?;
                added.extend(self.snapshot(node));
                nodes.push(node);
            }
        }
        if !nodes.is_empty() {
            self.mutations.push(MutationRecord::ChildList {
                target: parent,
                added,
                removed: vec![],
            });
        }
        self.compute_layout()?;
        Ok(nodes)
    }

    /// Detaches node with its subtree from document.
    pub fn remove(&mut self, node: NodeId) -> Result<(), PageError> {
        if node == self.root || node == self.body {
            return Err(PageError::ElementNotFound);
        }
        let parent = self.tree.parent(node).ok_or(PageError::ElementNotFound)?;
        let removed = self.snapshot(node);
        let subtree = self.descendants(node);
        self.tree.remove_child(parent, node)?;
        for node in subtree {
            self.tree.remove(node)?;
        }
        self.mutations.push(MutationRecord::ChildList {
            target: parent,
            added: vec![],
            removed,
        });
        self.compute_layout()
    }

    /// Drains custom events fired on elements.
    pub fn take_events(&mut self) -> Vec<(NodeId, String)> {
        take(&mut self.events)
    }

    fn compute_layout(&mut self) -> Result<(), PageError> {
        let [width, _] = self.viewport;
        let space = Size {
            width: AvailableSpace::Definite(width),
            height: AvailableSpace::MaxContent,
        };
        self.tree
            .compute_layout_with_measure(self.root, space, |size, space, _, element, _| {
                measure(size, space, element)
            })?;
        self.compute_positions(self.root, Point::ZERO)
    }

    fn compute_positions(&mut self, node: NodeId, parent: Point<f32>) -> Result<(), PageError> {
        let layout = *self.tree.layout(node)?;
        let position = Point {
            x: parent.x + layout.location.x,
            y: parent.y + layout.location.y,
        };
        let element = self
            .tree
            .get_node_context_mut(node)
            .ok_or(PageError::ContextNotFound)?;
        element.position = [position.x, position.y];
        element.size = [layout.size.width, layout.size.height];
        for child in self.tree.children(node)? {
            self.compute_positions(child, position)?;
        }
        Ok(())
    }

    fn reflow(&mut self) {
        if let Err(error) = self.compute_layout() {
            error!("unable to layout page, {error:?}");
        }
    }

    fn restyle(&mut self, node: NodeId) {
        let layout = match self.tree.get_node_context(node) {
            Some(element) if !element.is_text() => {
                create_layout(&element.tag, element.attrs.get("style"), self.sizes())
            }
            _ => return,
        };
        if let Err(error) = self.tree.set_style(node, layout) {
            error!("unable to restyle node {node:?}, {error:?}");
        }
    }

    fn sizes(&self) -> Sizes {
        Sizes::new(self.viewport)
    }

    /// Node itself and all its descendants in document order.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = vec![];
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            result.push(current);
            match self.tree.children(current) {
                Ok(children) => stack.extend(children.into_iter().rev()),
                Err(error) => error!("unable to traverse node {current:?}, {error:?}"),
            }
        }
        result
    }

    fn snapshot(&self, node: NodeId) -> Vec<Snapshot> {
        self.descendants(node)
            .into_iter()
            .filter_map(|node| self.element(node))
            .filter(|element| !element.is_text())
            .map(Snapshot::from)
            .collect()
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        let element = self.tree.get_node_context_mut(node);
        if element.is_none() {
            error!("unable to access element {node:?}, not found");
        }
        element
    }

    fn record_attribute(&mut self, node: NodeId, name: &str, old_value: Option<String>) {
        // class list is presentation state only, animations toggle it on every scroll
        if name == "class" {
            return;
        }
        if let Some(target) = self.element(node).map(Snapshot::from) {
            self.mutations.push(MutationRecord::Attributes {
                target,
                name: name.to_string(),
                old_value,
            });
        }
        if name == "style" {
            self.restyle(node);
            self.reflow();
        }
    }
}

impl Document for Page {
    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(error) => {
                error!("unable to query elements by {selector}, {error:?}");
                return vec![];
            }
        };
        self.descendants(self.root)
            .into_iter()
            .filter(|node| {
                self.element(*node)
                    .map(|element| !element.is_text())
                    .unwrap_or(false)
            })
            .filter(|node| selector.matches(*node, &self.tree))
            .collect()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|element| element.attrs.get(name))
            .map(String::as_str)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            let old_value = element.attrs.insert(name.to_string(), value.to_string());
            self.record_attribute(node, name, old_value);
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element_mut(node) {
            if let Some(old_value) = element.attrs.remove(name) {
                self.record_attribute(node, name, Some(old_value));
            }
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(node) {
            element.add_class(class);
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(node) {
            element.remove_class(class);
        }
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(next) = current {
            if next == ancestor {
                return true;
            }
            current = self.tree.parent(next);
        }
        false
    }

    fn offset_top(&self, node: NodeId) -> f32 {
        self.element(node)
            .map(|element| element.position[1])
            .unwrap_or(0.0)
    }

    fn offset_height(&self, node: NodeId) -> f32 {
        self.element(node)
            .map(|element| element.size[1])
            .unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f32 {
        self.viewport[1]
    }

    fn scroll_y(&self) -> f32 {
        self.scroll
    }

    fn root(&self) -> Option<NodeId> {
        Some(self.body)
    }

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn dispatch(&mut self, node: NodeId, event: &str) {
        debug!("dispatch {event} on {node:?}");
        self.events.push((node, event.to_string()));
    }

    fn take_mutations(&mut self) -> Vec<MutationRecord> {
        take(&mut self.mutations)
    }
}

fn create_layout(tag: &str, style: Option<&String>, sizes: Sizes) -> Style {
    let mut layout = default_layout();
    if let Some(style) = style {
        apply_inline_style(style, sizes, &mut layout);
    }
    if HIDDEN_TAGS.contains(&tag) {
        layout.display = Display::None;
    }
    layout
}

fn render_node(
    node: NodeRef<Node>,
    tree: &mut TaffyTree<Element>,
    sizes: Sizes,
) -> Result<Option<NodeId>, PageError> {
    match node.value() {
        Node::Element(html) => {
            let tag = html.name().to_ascii_lowercase();
            let mut element = Element::new(NodeId::from(0u64), &tag);
            for (key, value) in html.attrs() {
                element.attrs.insert(key.to_string(), value.to_string());
            }
            let layout = create_layout(&tag, element.attrs.get("style"), sizes);
            let id = tree.new_leaf(layout)?;
            for child in node.children() {
                if let Some(child) = render_node(child, tree, sizes)? {
                    tree.add_child(id, child)?;
                }
            }
            element.node = id;
            tree.set_node_context(id, Some(element))?;
            Ok(Some(id))
        }
        Node::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            let id = tree.new_leaf(default_layout())?;
            tree.set_node_context(id, Some(Element::text(id, text)))?;
            Ok(Some(id))
        }
        _ => Ok(None),
    }
}

fn measure(
    size: Size<Option<f32>>,
    space: Size<AvailableSpace>,
    element: Option<&mut Element>,
) -> Size<f32> {
    if let Size {
        width: Some(width),
        height: Some(height),
    } = size
    {
        return Size { width, height };
    }
    let text = match element.and_then(|element| element.text.as_ref()) {
        Some(text) => text,
        None => return Size::ZERO,
    };
    let max_width = size.width.map(Some).unwrap_or_else(|| match space.width {
        AvailableSpace::MinContent => Some(0.0),
        AvailableSpace::MaxContent => None,
        AvailableSpace::Definite(width) => Some(width),
    });
    let [width, height] = measure_text(text, FONT_SIZE, max_width);
    Size { width, height }
}
