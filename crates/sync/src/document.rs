//! Read-only view of the host document.
//!
//! The engine never owns the host tree; it only needs a pre-order walk that
//! reports each node's kind, its `language` and `id` attributes, its text
//! content, and its position. [`Document`] is a small owned tree that
//! implements [`DocumentTree`] for hosts without a model of their own.
//!
//! Positions follow a token-counting scheme: a text node is as long as its
//! character count, a leaf element counts as one position, and an element
//! with content counts its opening and closing boundary plus its content.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Attribute holding a block's declared language.
pub const LANGUAGE_ATTR: &str = "language";

/// Attribute holding a block's stable identifier.
pub const ID_ATTR: &str = "id";

/// Node kind reported for text nodes.
pub const TEXT_KIND: &str = "text";

/// One node as seen during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView<'a> {
	pub kind: &'a str,
	pub language: Option<&'a str>,
	pub identifier: Option<&'a str>,
	/// Concatenated text of every text descendant.
	pub text: Cow<'a, str>,
	/// Position of the node's opening boundary.
	pub offset: usize,
	pub size: usize,
}

impl NodeView<'_> {
	/// Position just inside the node's closing boundary.
	pub fn trailing_edge(&self) -> usize {
		(self.offset + self.size).saturating_sub(1)
	}
}

/// Immutable snapshot of a host document.
pub trait DocumentTree {
	/// Total content size of the document.
	fn size(&self) -> usize;

	/// Visits every node below the root in document order (pre-order, depth-first).
	fn walk(&self, visit: &mut dyn FnMut(NodeView<'_>));
}

/// Element node: a kind, string attributes, and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	kind: String,
	attrs: BTreeMap<String, String>,
	children: Vec<Node>,
	leaf: bool,
}

impl Element {
	/// Creates an element that may hold content.
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			attrs: BTreeMap::new(),
			children: Vec::new(),
			leaf: false,
		}
	}

	/// Creates an atomic element with no content (e.g. a horizontal rule).
	pub fn leaf(kind: impl Into<String>) -> Self {
		Self {
			leaf: true,
			..Self::new(kind)
		}
	}

	pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}

	/// Appends a child. Ignored for leaf elements.
	pub fn child(mut self, node: impl Into<Node>) -> Self {
		if !self.leaf {
			self.children.push(node.into());
		}
		self
	}

	/// Appends a text child.
	pub fn text(self, text: impl Into<String>) -> Self {
		self.child(Node::Text(text.into()))
	}

	pub fn kind(&self) -> &str {
		&self.kind
	}

	pub fn get_attr(&self, key: &str) -> Option<&str> {
		self.attrs.get(key).map(String::as_str)
	}

	pub fn children(&self) -> &[Node] {
		&self.children
	}
}

/// A node in a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Text(String),
	Element(Element),
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Self::Element(element)
	}
}

impl Node {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	/// Number of positions this node occupies.
	pub fn size(&self) -> usize {
		match self {
			Self::Text(text) => text.chars().count(),
			Self::Element(element) if element.leaf => 1,
			Self::Element(element) => 2 + content_size(&element.children),
		}
	}

	/// Concatenated text of every text descendant.
	pub fn text_content(&self) -> Cow<'_, str> {
		match self {
			Self::Text(text) => Cow::Borrowed(text),
			Self::Element(element) => match element.children.as_slice() {
				[] => Cow::Borrowed(""),
				[only] => only.text_content(),
				children => {
					let mut text = String::new();
					for child in children {
						text.push_str(&child.text_content());
					}
					Cow::Owned(text)
				}
			},
		}
	}

	fn view(&self, offset: usize) -> NodeView<'_> {
		let (kind, language, identifier) = match self {
			Self::Text(_) => (TEXT_KIND, None, None),
			Self::Element(element) => (element.kind.as_str(), element.get_attr(LANGUAGE_ATTR), element.get_attr(ID_ATTR)),
		};
		NodeView {
			kind,
			language,
			identifier,
			text: self.text_content(),
			offset,
			size: self.size(),
		}
	}
}

fn content_size(children: &[Node]) -> usize {
	children.iter().map(Node::size).sum()
}

/// Owned document snapshot: a root holding top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
	children: Vec<Node>,
}

impl Document {
	pub fn new<I, N>(children: I) -> Self
	where
		I: IntoIterator<Item = N>,
		N: Into<Node>,
	{
		Self {
			children: children.into_iter().map(Into::into).collect(),
		}
	}

	pub fn children(&self) -> &[Node] {
		&self.children
	}
}

impl DocumentTree for Document {
	fn size(&self) -> usize {
		content_size(&self.children)
	}

	fn walk(&self, visit: &mut dyn FnMut(NodeView<'_>)) {
		walk_children(&self.children, 0, visit);
	}
}

fn walk_children(children: &[Node], mut offset: usize, visit: &mut dyn FnMut(NodeView<'_>)) {
	for child in children {
		visit(child.view(offset));
		if let Node::Element(element) = child {
			walk_children(&element.children, offset + 1, visit);
		}
		offset += child.size();
	}
}
