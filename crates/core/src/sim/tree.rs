//! Rendered accessibility tree.
//!
//! Nodes live in an arena and are pushed in document order, so a node's id is
//! also its pre-order position. Resolution relies on that to keep matches in
//! document order without sorting by path.

use crate::locator::Role;

pub(crate) type NodeId = usize;

/// What clicking a node does to the app state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
	OpenLogin,
	Logout,
	English,
	Japanese,
	SelectCategory(usize),
	AddToCart(&'static str),
	RemoveFromCart(&'static str),
	Checkout,
	OpenOrderHistory,
	CloseDialog,
	SubmitLogin,
	SubmitRegister,
	OpenRegister,
	SwitchToLogin,
}

/// Inputs whose value lives in the app state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
	Search,
	Sort,
	LoginUsername,
	LoginPassword,
	RegisterUsername,
	RegisterEmail,
	RegisterPassword,
	RegisterConfirm,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
	pub role: Option<Role>,
	/// Accessible name.
	pub name: String,
	/// Text of this node alone; containers leave it empty.
	pub text: String,
	pub classes: String,
	pub disabled: bool,
	pub label: Option<String>,
	pub placeholder: Option<String>,
	pub alt: Option<String>,
	pub value: Option<String>,
	/// Option labels of a combobox.
	pub options: Vec<String>,
	pub action: Option<Action>,
	pub field: Option<Field>,
	pub parent: Option<NodeId>,
	pub children: Vec<NodeId>,
}

impl Node {
	pub fn div(classes: &str) -> Self {
		Self {
			classes: classes.to_string(),
			..Self::default()
		}
	}

	pub fn landmark(role: Role, classes: &str) -> Self {
		Self {
			role: Some(role),
			classes: classes.to_string(),
			..Self::default()
		}
	}

	pub fn span(classes: &str, text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			classes: classes.to_string(),
			..Self::default()
		}
	}

	pub fn heading(text: impl Into<String>) -> Self {
		let text = text.into();
		Self {
			role: Some(Role::Heading),
			name: text.clone(),
			text,
			..Self::default()
		}
	}

	pub fn button(text: impl Into<String>, action: Action) -> Self {
		let text = text.into();
		Self {
			role: Some(Role::Button),
			name: text.clone(),
			text,
			action: Some(action),
			..Self::default()
		}
	}

	pub fn link(text: impl Into<String>, action: Action) -> Self {
		Self {
			role: Some(Role::Link),
			..Self::button(text, action)
		}
	}

	pub fn img(alt: &str) -> Self {
		Self {
			role: Some(Role::Img),
			name: alt.to_string(),
			alt: Some(alt.to_string()),
			..Self::default()
		}
	}

	/// Text input labelled by `label`, or named by its placeholder when unlabelled.
	pub fn textbox(field: Field, label: Option<&str>, placeholder: Option<&str>, value: &str) -> Self {
		Self {
			role: Some(Role::Textbox),
			name: label.or(placeholder).unwrap_or_default().to_string(),
			label: label.map(str::to_string),
			placeholder: placeholder.map(str::to_string),
			value: Some(value.to_string()),
			field: Some(field),
			..Self::default()
		}
	}

	pub fn named(mut self, role: Role, name: impl Into<String>) -> Self {
		self.role = Some(role);
		self.name = name.into();
		self
	}

	pub fn disabled(mut self, disabled: bool) -> Self {
		self.disabled = disabled;
		self
	}
}

#[derive(Debug, Clone)]
pub(crate) struct Tree {
	nodes: Vec<Node>,
}

impl Tree {
	pub const ROOT: NodeId = 0;

	pub fn new() -> Self {
		Self { nodes: vec![Node::div("")] }
	}

	pub fn push(&mut self, parent: NodeId, mut node: Node) -> NodeId {
		let id = self.nodes.len();
		node.parent = Some(parent);
		self.nodes.push(node);
		self.nodes[parent].children.push(id);
		id
	}

	/// Pushes a leaf under `parent`.
	pub fn leaf(&mut self, parent: NodeId, node: Node) {
		self.push(parent, node);
	}

	pub fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id]
	}

	/// All strict descendants of `id`, in document order.
	pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
		while let Some(next) = stack.pop() {
			out.push(next);
			stack.extend(self.nodes[next].children.iter().rev());
		}
		out
	}

	/// Strict ancestors of `id`, nearest first.
	pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		std::iter::successors(self.nodes[id].parent, |&n| self.nodes[n].parent)
	}

	/// Concatenated text of the node and its subtree.
	pub fn text_content(&self, id: NodeId) -> String {
		let mut out = self.nodes[id].text.clone();
		for child in self.descendants(id) {
			out.push_str(&self.nodes[child].text);
		}
		out
	}

	pub fn has_button_below(&self, id: NodeId) -> bool {
		self.descendants(id).into_iter().any(|n| self.nodes[n].role == Some(Role::Button))
	}
}
