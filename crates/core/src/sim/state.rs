//! Application state of the simulated storefront and its rendering.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::tree::{Action, Field, Node, NodeId, Tree};
use crate::currency::format_yen;
use crate::data::{Category, PRODUCTS, Product, SortOption, VALID_USER};
use crate::locator::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Language {
	#[default]
	Japanese,
	English,
}

/// UI strings per language.
struct Strings {
	login: &'static str,
	logout: &'static str,
	catalog: &'static str,
	search_placeholder: &'static str,
	sort_label: &'static str,
	categories_label: &'static str,
	add_to_cart: &'static str,
	out_of_stock: &'static str,
	no_results: &'static str,
	cart: &'static str,
	cart_empty: &'static str,
	quantity: &'static str,
	total: &'static str,
	checkout: &'static str,
	order_placed: &'static str,
	order_history: &'static str,
	order_history_title: &'static str,
	no_orders: &'static str,
	order: &'static str,
	close: &'static str,
	username: &'static str,
	password: &'static str,
	email: &'static str,
	confirm: &'static str,
	register: &'static str,
	invalid_login: &'static str,
	missing_username: &'static str,
	invalid_email: &'static str,
	short_password: &'static str,
	password_mismatch: &'static str,
	username_taken: &'static str,
}

const JA: Strings = Strings {
	login: "ログイン",
	logout: "ログアウト",
	catalog: "商品カタログ",
	search_placeholder: "商品を検索...",
	sort_label: "並び替え",
	categories_label: "商品カテゴリ",
	add_to_cart: "カートに追加",
	out_of_stock: "在庫切れ",
	no_results: "商品が見つかりません",
	cart: "カート",
	cart_empty: "カートは空です",
	quantity: "数量",
	total: "合計",
	checkout: "チェックアウト",
	order_placed: "ご注文ありがとうございました",
	order_history: "注文履歴を見る",
	order_history_title: "注文履歴",
	no_orders: "注文履歴はありません",
	order: "注文",
	close: "閉じる",
	username: "ユーザー名:",
	password: "パスワード:",
	email: "メールアドレス",
	confirm: "パスワード確認:",
	register: "新規登録",
	invalid_login: "ユーザー名またはパスワードが正しくありません",
	missing_username: "ユーザー名を入力してください",
	invalid_email: "有効なメールアドレスを入力してください",
	short_password: "パスワードは8文字以上で入力してください",
	password_mismatch: "パスワードが一致しません",
	username_taken: "このユーザー名は既に使用されています",
};

const EN: Strings = Strings {
	login: "Login",
	logout: "Logout",
	catalog: "Product Catalog",
	search_placeholder: "Search products...",
	sort_label: "Sort by",
	categories_label: "Product categories",
	add_to_cart: "Add to Cart",
	out_of_stock: "Out of stock",
	no_results: "No products found",
	cart: "Cart",
	cart_empty: "Your cart is empty",
	quantity: "Qty",
	total: "Total",
	checkout: "Checkout",
	order_placed: "Thank you for your order",
	order_history: "View Order History",
	order_history_title: "Order History",
	no_orders: "No orders yet",
	order: "Order",
	close: "Close",
	username: "Username:",
	password: "Password:",
	email: "Email",
	confirm: "Confirm Password:",
	register: "Register",
	invalid_login: "Invalid username or password",
	missing_username: "Please enter a username",
	invalid_email: "Please enter a valid email address",
	short_password: "Password must be at least 8 characters",
	password_mismatch: "Passwords do not match",
	username_taken: "This username is already taken",
};

impl Language {
	fn strings(self) -> &'static Strings {
		match self {
			Language::Japanese => &JA,
			Language::English => &EN,
		}
	}

	fn category(self, category: Category) -> &'static str {
		match self {
			Language::Japanese => category.label(),
			Language::English => category.label_en(),
		}
	}

	fn sort(self, option: SortOption) -> &'static str {
		match self {
			Language::Japanese => option.label(),
			Language::English => option.label_en(),
		}
	}
}

#[derive(Debug, Clone)]
struct Account {
	username: String,
	password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegisterError {
	MissingUsername,
	InvalidEmail,
	ShortPassword,
	PasswordMismatch,
	UsernameTaken,
}

impl RegisterError {
	fn message(self, strings: &Strings) -> &'static str {
		match self {
			Self::MissingUsername => strings.missing_username,
			Self::InvalidEmail => strings.invalid_email,
			Self::ShortPassword => strings.short_password,
			Self::PasswordMismatch => strings.password_mismatch,
			Self::UsernameTaken => strings.username_taken,
		}
	}
}

#[derive(Debug, Clone, Default)]
struct LoginForm {
	username: String,
	password: String,
	failed: bool,
}

#[derive(Debug, Clone, Default)]
struct RegisterForm {
	username: String,
	email: String,
	password: String,
	confirm: String,
	error: Option<RegisterError>,
}

#[derive(Debug, Clone, Default)]
enum Dialog {
	#[default]
	Closed,
	Login(LoginForm),
	Register(RegisterForm),
	OrderHistory,
}

#[derive(Debug, Clone)]
struct CartLine {
	product: &'static Product,
	quantity: u32,
}

#[derive(Debug, Clone)]
struct Order {
	total: u64,
	units: u32,
}

/// Search text as typed and as applied; the filter catches up after the debounce.
#[derive(Debug, Clone, Default)]
struct Search {
	typed: String,
	applied: String,
	typed_at: Option<Instant>,
}

#[derive(Debug, Default)]
pub(crate) struct AppState {
	loaded: bool,
	closed: bool,
	language: Language,
	accounts: Vec<Account>,
	session: Option<String>,
	search: Search,
	category: Category,
	sort: Option<SortOption>,
	cart: Vec<CartLine>,
	orders: Vec<Order>,
	order_placed: bool,
	dialog: Dialog,
}

impl AppState {
	pub fn new() -> Self {
		Self {
			accounts: vec![Account {
				username: VALID_USER.username.to_string(),
				password: VALID_USER.password.to_string(),
			}],
			..Self::default()
		}
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}

	pub fn close(&mut self) {
		self.closed = true;
	}

	/// Fresh page load. Registered accounts survive, as they would in the
	/// app's storage; everything else starts over.
	pub fn load(&mut self) {
		let accounts = std::mem::take(&mut self.accounts);
		*self = Self {
			loaded: true,
			accounts,
			..Self::default()
		};
	}

	/// Applies a typed search once it has been idle for `debounce`.
	pub fn settle(&mut self, debounce: Duration) {
		let due = self.search.typed_at.is_some_and(|at| at.elapsed() >= debounce);
		if due {
			self.search.applied = self.search.typed.clone();
			self.search.typed_at = None;
			debug!(target = "shoptodo.sim", search = %self.search.applied, "search applied");
		}
	}

	pub fn click(&mut self, action: &Action) {
		debug!(target = "shoptodo.sim", ?action, "click");
		match action {
			Action::OpenLogin | Action::SwitchToLogin => self.dialog = Dialog::Login(LoginForm::default()),
			Action::OpenRegister => self.dialog = Dialog::Register(RegisterForm::default()),
			Action::OpenOrderHistory => self.dialog = Dialog::OrderHistory,
			Action::CloseDialog => self.dialog = Dialog::Closed,
			Action::Logout => self.session = None,
			Action::English => self.language = Language::English,
			Action::Japanese => self.language = Language::Japanese,
			Action::SelectCategory(index) => {
				if let Some(category) = Category::ALL.get(*index) {
					self.category = *category;
				}
			}
			Action::AddToCart(key) => self.add_to_cart(key),
			Action::RemoveFromCart(key) => {
				self.cart.retain(|line| line.product.key != *key);
				self.order_placed = false;
			}
			Action::Checkout => self.checkout(),
			Action::SubmitLogin => self.submit_login(),
			Action::SubmitRegister => self.submit_register(),
		}
	}

	fn add_to_cart(&mut self, key: &str) {
		if self.session.is_none() {
			self.dialog = Dialog::Login(LoginForm::default());
			return;
		}
		let Some(product) = PRODUCTS.iter().find(|p| p.key == key) else {
			return;
		};
		if !product.in_stock {
			return;
		}
		match self.cart.iter_mut().find(|line| line.product.key == key) {
			Some(line) => line.quantity += 1,
			None => self.cart.push(CartLine { product, quantity: 1 }),
		}
		self.order_placed = false;
	}

	fn checkout(&mut self) {
		if self.cart.is_empty() {
			return;
		}
		let order = Order {
			total: self.cart_total(),
			units: self.cart.iter().map(|line| line.quantity).sum(),
		};
		debug!(target = "shoptodo.sim", total = order.total, units = order.units, "order placed");
		self.orders.push(order);
		self.cart.clear();
		self.order_placed = true;
	}

	fn submit_login(&mut self) {
		let Dialog::Login(form) = &mut self.dialog else {
			return;
		};
		let known = self
			.accounts
			.iter()
			.any(|a| a.username == form.username && a.password == form.password);
		if known {
			self.session = Some(form.username.clone());
			self.dialog = Dialog::Closed;
		} else {
			form.failed = true;
		}
	}

	fn submit_register(&mut self) {
		let Dialog::Register(form) = &mut self.dialog else {
			return;
		};
		let error = if form.username.trim().is_empty() {
			Some(RegisterError::MissingUsername)
		} else if !form.email.contains('@') {
			Some(RegisterError::InvalidEmail)
		} else if form.password.chars().count() < 8 {
			Some(RegisterError::ShortPassword)
		} else if form.password != form.confirm {
			Some(RegisterError::PasswordMismatch)
		} else if self.accounts.iter().any(|a| a.username == form.username) {
			Some(RegisterError::UsernameTaken)
		} else {
			None
		};
		match error {
			Some(error) => form.error = Some(error),
			None => {
				self.accounts.push(Account {
					username: form.username.clone(),
					password: form.password.clone(),
				});
				self.dialog = Dialog::Closed;
			}
		}
	}

	/// Sets an input's value. `false` when the input takes no free text.
	pub fn fill(&mut self, field: Field, value: &str) -> bool {
		let value = value.to_string();
		match (field, &mut self.dialog) {
			(Field::Search, _) => {
				self.search.typed = value;
				self.search.typed_at = Some(Instant::now());
			}
			(Field::LoginUsername, Dialog::Login(form)) => form.username = value,
			(Field::LoginPassword, Dialog::Login(form)) => form.password = value,
			(Field::RegisterUsername, Dialog::Register(form)) => form.username = value,
			(Field::RegisterEmail, Dialog::Register(form)) => form.email = value,
			(Field::RegisterPassword, Dialog::Register(form)) => form.password = value,
			(Field::RegisterConfirm, Dialog::Register(form)) => form.confirm = value,
			_ => return false,
		}
		true
	}

	/// Picks a sort option by its visible label. `false` when no option has it.
	pub fn select_sort(&mut self, label: &str) -> bool {
		let language = self.language;
		match SortOption::ALL.into_iter().find(|o| language.sort(*o) == label.trim()) {
			Some(option) => {
				self.sort = Some(option);
				true
			}
			None => false,
		}
	}

	fn cart_total(&self) -> u64 {
		self.cart.iter().map(|line| line.product.price * u64::from(line.quantity)).sum()
	}

	fn visible_products(&self) -> Vec<&'static Product> {
		let keyword = self.search.applied.trim().to_lowercase();
		let mut products: Vec<&'static Product> = PRODUCTS
			.iter()
			.filter(|p| self.category == Category::All || p.category == self.category)
			.filter(|p| keyword.is_empty() || p.name.to_lowercase().contains(&keyword))
			.collect();
		match self.sort {
			Some(SortOption::Name) => products.sort_by(|a, b| a.name.cmp(b.name)),
			Some(SortOption::PriceAsc) => products.sort_by_key(|p| p.price),
			Some(SortOption::PriceDesc) => products.sort_by_key(|p| std::cmp::Reverse(p.price)),
			None => {}
		}
		products
	}

	pub fn render(&self) -> Tree {
		let mut tree = Tree::new();
		if !self.loaded {
			return tree;
		}
		let strings = self.language.strings();
		self.render_header(&mut tree, strings);
		self.render_catalog(&mut tree, strings);
		self.render_cart(&mut tree, strings);
		self.render_dialog(&mut tree, strings);
		tree
	}

	fn render_header(&self, tree: &mut Tree, s: &Strings) {
		let header = tree.push(Tree::ROOT, Node::landmark(Role::Banner, "header"));
		tree.leaf(header, Node::heading("ShopTodo"));
		let nav = tree.push(header, Node::div("header-actions"));
		match &self.session {
			Some(user) => {
				tree.leaf(nav, Node::span("user-name", user.as_str()));
				tree.leaf(nav, Node::button(s.logout, Action::Logout));
			}
			None => tree.leaf(nav, Node::button(s.login, Action::OpenLogin)),
		}
		let languages = tree.push(nav, Node::div("language-switcher"));
		tree.leaf(languages, Node::button("EN", Action::English));
		tree.leaf(languages, Node::button("JP", Action::Japanese));
	}

	fn render_catalog(&self, tree: &mut Tree, s: &Strings) {
		let main = tree.push(Tree::ROOT, Node::landmark(Role::Main, "catalog"));
		tree.leaf(main, Node::heading(s.catalog));

		let controls = tree.push(main, Node::div("catalog-controls"));
		tree.leaf(controls, Node::textbox(Field::Search, None, Some(s.search_placeholder), &self.search.typed));
		let selected = self.language.sort(self.sort.unwrap_or(SortOption::Name));
		tree.leaf(
			controls,
			Node {
				value: Some(selected.to_string()),
				options: SortOption::ALL.iter().map(|o| self.language.sort(*o).to_string()).collect(),
				field: Some(Field::Sort),
				..Node::div("sort-select")
			}
			.named(Role::Combobox, s.sort_label),
		);

		let tabs = tree.push(main, Node::div("category-tabs").named(Role::Tablist, s.categories_label));
		for (index, category) in Category::ALL.into_iter().enumerate() {
			let classes = if category == self.category { "category-tab active" } else { "category-tab" };
			let label = self.language.category(category);
			tree.leaf(
				tabs,
				Node {
					classes: classes.to_string(),
					..Node::button(label, Action::SelectCategory(index))
				}
				.named(Role::Tab, label),
			);
		}

		let grid = tree.push(main, Node::div("product-grid"));
		let products = self.visible_products();
		if products.is_empty() {
			tree.leaf(grid, Node::span("no-results", s.no_results));
		}
		for product in products {
			let card = tree.push(grid, Node::div("product-card"));
			tree.leaf(card, Node::img(product.name));
			tree.leaf(card, Node::heading(product.name));
			tree.leaf(card, Node::span("product-category", self.language.category(product.category)));
			tree.leaf(card, Node::span("product-price", format_yen(product.price)));
			if !product.in_stock {
				tree.leaf(card, Node::span("out-of-stock", s.out_of_stock));
			}
			tree.leaf(card, Node::button(s.add_to_cart, Action::AddToCart(product.key)).disabled(!product.in_stock));
		}
	}

	fn render_cart(&self, tree: &mut Tree, s: &Strings) {
		let aside = tree.push(Tree::ROOT, Node::landmark(Role::Complementary, "cart"));
		tree.leaf(aside, Node::heading(s.cart));
		if self.order_placed {
			tree.leaf(aside, Node::span("order-complete", s.order_placed).named(Role::Status, s.order_placed));
		}
		if self.cart.is_empty() {
			tree.leaf(aside, Node::span("cart-empty", s.cart_empty));
		} else {
			let items = tree.push(aside, Node::div("cart-items"));
			for line in &self.cart {
				let item = tree.push(items, Node::div("cart-item"));
				tree.leaf(item, Node::span("cart-item-name", line.product.name));
				tree.leaf(item, Node::span("cart-item-price", format_yen(line.product.price)));
				tree.leaf(item, Node::span("cart-item-quantity", format!("{}: {}", s.quantity, line.quantity)));
				tree.leaf(item, Node::button("🗑️", Action::RemoveFromCart(line.product.key)));
			}
		}
		tree.leaf(aside, Node::span("cart-total", format!("{}: {}", s.total, format_yen(self.cart_total()))));
		tree.leaf(aside, Node::button(s.checkout, Action::Checkout).disabled(self.cart.is_empty()));
		if self.session.is_some() {
			tree.leaf(aside, Node::button(s.order_history, Action::OpenOrderHistory));
		}
	}

	fn render_dialog(&self, tree: &mut Tree, s: &Strings) {
		match &self.dialog {
			Dialog::Closed => {}
			Dialog::Login(form) => {
				let dialog = dialog(tree, s.login);
				tree.leaf(dialog, Node::textbox(Field::LoginUsername, Some(s.username), None, &form.username));
				tree.leaf(dialog, Node::textbox(Field::LoginPassword, Some(s.password), None, &form.password));
				if form.failed {
					tree.leaf(dialog, Node::span("error-message", s.invalid_login));
				}
				let actions = tree.push(dialog, Node::div("dialog-actions"));
				tree.leaf(actions, Node::button(s.login, Action::SubmitLogin));
				tree.leaf(actions, Node::button(s.close, Action::CloseDialog));
				tree.leaf(dialog, Node::link(s.register, Action::OpenRegister));
			}
			Dialog::Register(form) => {
				let dialog = dialog(tree, s.register);
				tree.leaf(dialog, Node::textbox(Field::RegisterUsername, Some(s.username), None, &form.username));
				tree.leaf(dialog, Node::textbox(Field::RegisterEmail, Some(s.email), None, &form.email));
				tree.leaf(dialog, Node::textbox(Field::RegisterPassword, Some(s.password), None, &form.password));
				tree.leaf(dialog, Node::textbox(Field::RegisterConfirm, Some(s.confirm), None, &form.confirm));
				if let Some(error) = form.error {
					tree.leaf(dialog, Node::span("error-message", error.message(s)));
				}
				let actions = tree.push(dialog, Node::div("dialog-actions"));
				tree.leaf(actions, Node::button(s.register, Action::SubmitRegister));
				tree.leaf(actions, Node::button(s.close, Action::CloseDialog));
				tree.leaf(dialog, Node::link(s.login, Action::SwitchToLogin));
			}
			Dialog::OrderHistory => {
				let dialog = dialog(tree, s.order_history_title);
				if self.orders.is_empty() {
					tree.leaf(dialog, Node::span("no-orders", s.no_orders));
				} else {
					let list = tree.push(dialog, Node::landmark(Role::List, "order-list"));
					for (index, order) in self.orders.iter().enumerate() {
						let text = format!("{} #{} {} ({})", s.order, index + 1, format_yen(order.total), order.units);
						tree.leaf(list, Node::span("order", text).named(Role::Listitem, ""));
					}
				}
				tree.leaf(dialog, Node::button(s.close, Action::CloseDialog));
			}
		}
	}
}

fn dialog(tree: &mut Tree, title: &str) -> NodeId {
	let dialog = tree.push(Tree::ROOT, Node::div("modal").named(Role::Dialog, title));
	tree.leaf(dialog, Node::heading(title));
	dialog
}
