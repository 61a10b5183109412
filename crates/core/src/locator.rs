//! Declarative element queries.
//!
//! A [`Locator`] is a chain of [`Step`]s evaluated left to right, each step
//! narrowing or moving the current match set. Nothing is resolved at
//! construction: every page operation renders the chain again, so a re-rendered
//! page never leaves a stale node behind.
//!
//! ```text
//! Locator::role(Role::Button, TextMatch::contains("カートに追加"))
//!     .nth(2)
//!     .parent()
//!     .get_by_role_only(Role::Img)
//!
//! internal:role=button[name="カートに追加"i] >> nth=2 >> xpath=.. >> internal:role=img
//! ```

use std::fmt;

use regex::Regex;

/// How an accessible name or text is compared.
#[derive(Debug, Clone)]
pub enum TextMatch {
	/// Case-sensitive, whole string (after whitespace normalization).
	Exact(String),
	/// Case-insensitive substring.
	Contains(String),
	Pattern(Regex),
}

impl TextMatch {
	pub fn exact(text: impl Into<String>) -> Self {
		Self::Exact(text.into())
	}

	pub fn contains(text: impl Into<String>) -> Self {
		Self::Contains(text.into())
	}

	pub fn pattern(regex: Regex) -> Self {
		Self::Pattern(regex)
	}

	pub fn matches(&self, candidate: &str) -> bool {
		let normalized = normalize_whitespace(candidate);
		match self {
			Self::Exact(text) => normalized == normalize_whitespace(text),
			Self::Contains(text) => normalized.to_lowercase().contains(&normalize_whitespace(text).to_lowercase()),
			Self::Pattern(regex) => regex.is_match(&normalized),
		}
	}

	/// Selector-engine form: `"text"s`, `"text"i` or `/regex/`.
	fn render(&self) -> String {
		match self {
			Self::Exact(text) => format!("{}s", quote(text)),
			Self::Contains(text) => format!("{}i", quote(text)),
			Self::Pattern(regex) => format!("/{}/", regex.as_str().replace('/', "\\/")),
		}
	}
}

impl fmt::Display for TextMatch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.render())
	}
}

/// ARIA roles used by the storefront's page objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
	Banner,
	Button,
	Combobox,
	Complementary,
	Dialog,
	Heading,
	Img,
	Link,
	List,
	Listitem,
	Main,
	Option,
	Status,
	Tab,
	Tablist,
	Textbox,
}

impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Banner => "banner",
			Self::Button => "button",
			Self::Combobox => "combobox",
			Self::Complementary => "complementary",
			Self::Dialog => "dialog",
			Self::Heading => "heading",
			Self::Img => "img",
			Self::Link => "link",
			Self::List => "list",
			Self::Listitem => "listitem",
			Self::Main => "main",
			Self::Option => "option",
			Self::Status => "status",
			Self::Tab => "tab",
			Self::Tablist => "tablist",
			Self::Textbox => "textbox",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One link of a locator chain.
#[derive(Debug, Clone)]
pub enum Step {
	Role { role: Role, name: Option<TextMatch> },
	Text(TextMatch),
	Label(TextMatch),
	Placeholder(TextMatch),
	/// `[class*="..."]`. Only for elements with no accessible handle.
	ClassContains(String),
	Parent,
	/// Nearest ancestor that contains a button.
	ClosestWithButton,
	Nth(usize),
}

impl Step {
	fn render(&self) -> String {
		match self {
			Step::Role { role, name: None } => format!("internal:role={role}"),
			Step::Role { role, name: Some(name) } => format!("internal:role={role}[name={}]", name.render()),
			Step::Text(text) => format!("internal:text={}", text.render()),
			Step::Label(text) => format!("internal:label={}", text.render()),
			Step::Placeholder(text) => format!("internal:attr=[placeholder={}]", text.render()),
			Step::ClassContains(class) => format!("[class*={}]", quote(class)),
			Step::Parent => "xpath=..".to_string(),
			Step::ClosestWithButton => "xpath=ancestor::*[.//button][1]".to_string(),
			Step::Nth(index) => format!("nth={index}"),
		}
	}
}

/// A lazily evaluated element query.
#[derive(Debug, Clone)]
pub struct Locator {
	steps: Vec<Step>,
}

impl Locator {
	fn start(step: Step) -> Self {
		Self { steps: vec![step] }
	}

	fn then(mut self, step: Step) -> Self {
		self.steps.push(step);
		self
	}

	pub fn role(role: Role, name: TextMatch) -> Self {
		Self::start(Step::Role { role, name: Some(name) })
	}

	/// Any element with `role`, whatever its name.
	pub fn role_only(role: Role) -> Self {
		Self::start(Step::Role { role, name: None })
	}

	pub fn text(text: TextMatch) -> Self {
		Self::start(Step::Text(text))
	}

	pub fn label(text: TextMatch) -> Self {
		Self::start(Step::Label(text))
	}

	pub fn placeholder(text: TextMatch) -> Self {
		Self::start(Step::Placeholder(text))
	}

	pub fn class_contains(class: impl Into<String>) -> Self {
		Self::start(Step::ClassContains(class.into()))
	}

	pub fn get_by_role(self, role: Role, name: TextMatch) -> Self {
		self.then(Step::Role { role, name: Some(name) })
	}

	pub fn get_by_role_only(self, role: Role) -> Self {
		self.then(Step::Role { role, name: None })
	}

	pub fn get_by_text(self, text: TextMatch) -> Self {
		self.then(Step::Text(text))
	}

	pub fn get_by_label(self, text: TextMatch) -> Self {
		self.then(Step::Label(text))
	}

	pub fn get_by_class_contains(self, class: impl Into<String>) -> Self {
		self.then(Step::ClassContains(class.into()))
	}

	pub fn parent(self) -> Self {
		self.then(Step::Parent)
	}

	pub fn closest_with_button(self) -> Self {
		self.then(Step::ClosestWithButton)
	}

	pub fn nth(self, index: usize) -> Self {
		self.then(Step::Nth(index))
	}

	pub fn first(self) -> Self {
		self.nth(0)
	}

	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	/// Playwright selector string for this chain.
	pub fn selector(&self) -> String {
		self.steps.iter().map(Step::render).collect::<Vec<_>>().join(" >> ")
	}
}

impl fmt::Display for Locator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "locator({})", self.selector())
	}
}

fn quote(text: &str) -> String {
	serde_json::Value::String(text.to_string()).to_string()
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}
