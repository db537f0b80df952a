//! Minimal namespaced element tree for the SVG board.
//!
//! The tree is an arena: every element lives in [`Document`] and is addressed
//! by a [`NodeId`]. Elements start detached after
//! [`Document::create_element_ns`] and only become part of the rendered tree
//! once appended under the root (directly or through other attached
//! elements).
//!
//! The document stores what it is given. In particular it does not enforce
//! unique `id` attributes; [`Document::get_element_by_id`] returns the first
//! match in tree order.

use std::fmt::Write as _;

use crate::error::CoreError;

/// Handle of an element inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One element of the tree.
#[derive(Debug, Clone)]
pub struct Element {
    namespace: String,
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in the order they were first set.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }
}

/// An element tree with a single root element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
}

impl Document {
    /// Create a document whose root is a `root_tag` element in `root_ns`.
    pub fn new(root_ns: &str, root_tag: &str) -> Self {
        let root = Element {
            namespace: root_ns.to_string(),
            tag: root_tag.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element. It is not reachable from the root until
    /// passed to [`Document::append_child`].
    pub fn create_element_ns(&mut self, namespace: &str, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            namespace: namespace.to_string(),
            tag: tag.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
        });
        id
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    /// Set an attribute, replacing the value in place if it already exists.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.element_mut(node)?.set_attribute(name, value.into());
        Ok(())
    }

    /// Set an attribute on the root element. The root is never removed, so
    /// this cannot fail.
    pub fn set_root_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.nodes[self.root.0].set_attribute(name, value.into());
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attribute(name))
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.element(node).map(Element::children).unwrap_or(&[])
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).and_then(Element::parent)
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// Fails if either handle is unknown, if `child` already has a parent or
    /// is the root, or if `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), CoreError> {
        self.element_mut(parent)?;
        let attached = self.element_mut(child)?.parent.is_some();
        if attached || child == self.root {
            return Err(CoreError::Conflict(format!(
                "element {} is already attached",
                child.0
            )));
        }

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(CoreError::Validation(format!(
                    "appending element {} under {} would create a cycle",
                    child.0, parent.0
                )));
            }
            cursor = self.parent(current);
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// First attached element in tree order whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let element = &self.nodes[node.0];
            if element.attribute("id") == Some(id) {
                return Some(node);
            }
            stack.extend(element.children.iter().rev().copied());
        }
        None
    }

    /// Serialize the attached tree as XML.
    ///
    /// The root declares its namespace unless it has none; descendants only
    /// declare one when it differs from their parent's, with `xmlns=""`
    /// leaving an inherited namespace.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        self.write_element(&mut out, self.root, None);
        out
    }

    fn write_element(&self, out: &mut String, node: NodeId, parent_ns: Option<&str>) {
        let element = &self.nodes[node.0];
        let _ = write!(out, "<{}", element.tag);
        if element.namespace != parent_ns.unwrap_or_default() {
            let _ = write!(out, " xmlns=\"{}\"", escape(&element.namespace));
        }
        for (name, value) in &element.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if element.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &element.children {
            self.write_element(out, *child, Some(&element.namespace));
        }
        let _ = write!(out, "</{}>", element.tag);
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, CoreError> {
        self.nodes.get_mut(node.0).ok_or(CoreError::NotFound {
            entity: "element",
            id: node.0.to_string(),
        })
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
