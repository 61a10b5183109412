//! Locator evaluation against a rendered [`Tree`].

use super::tree::{NodeId, Tree};
use crate::locator::{Locator, Role, Step, TextMatch};

/// Every node `locator` matches, in document order.
pub(crate) fn resolve(tree: &Tree, locator: &Locator) -> Vec<NodeId> {
	let mut current = vec![Tree::ROOT];
	for step in locator.steps() {
		current = apply(tree, &current, step);
		if current.is_empty() {
			break;
		}
	}
	current
}

fn apply(tree: &Tree, from: &[NodeId], step: &Step) -> Vec<NodeId> {
	let mut out: Vec<NodeId> = match step {
		Step::Role { role, name } => search(tree, from, |id| {
			let node = tree.node(id);
			node.role == Some(*role) && name.as_ref().is_none_or(|m| m.matches(&node.name))
		}),
		Step::Text(text) => from.iter().flat_map(|&id| innermost_text(tree, id, text)).collect(),
		Step::Label(text) => search(tree, from, |id| tree.node(id).label.as_deref().is_some_and(|l| text.matches(l))),
		Step::Placeholder(text) => search(tree, from, |id| tree.node(id).placeholder.as_deref().is_some_and(|p| text.matches(p))),
		Step::ClassContains(class) => search(tree, from, |id| tree.node(id).classes.contains(class.as_str())),
		Step::Parent => from.iter().filter_map(|&id| tree.node(id).parent).collect(),
		Step::ClosestWithButton => from
			.iter()
			.filter_map(|&id| tree.ancestors(id).find(|&a| tree.has_button_below(a)))
			.collect(),
		Step::Nth(index) => return from.get(*index).copied().into_iter().collect(),
	};
	out.sort_unstable();
	out.dedup();
	out
}

fn search(tree: &Tree, from: &[NodeId], mut keep: impl FnMut(NodeId) -> bool) -> Vec<NodeId> {
	from.iter().flat_map(|&id| tree.descendants(id)).filter(|&id| keep(id)).collect()
}

/// Deepest descendants of `scope` whose text matches: an element matches only
/// when none of its children does. Buttons and links match on their label.
fn innermost_text(tree: &Tree, scope: NodeId, text: &TextMatch) -> Vec<NodeId> {
	tree.descendants(scope)
		.into_iter()
		.filter(|&id| {
			text.matches(&tree.text_content(id)) && !tree.node(id).children.iter().any(|&c| text.matches(&tree.text_content(c)))
		})
		.filter(|&id| !matches!(tree.node(id).role, Some(Role::Textbox | Role::Combobox)))
		.collect()
}
