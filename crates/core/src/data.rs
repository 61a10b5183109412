//! Static test data: the product oracle, demo users and catalog vocabulary.
//!
//! Product display names are unique and serve as lookup keys. Prices are the
//! listed yen amounts the UI is compared against.

use std::fmt;

use crate::error::{Result, ShopError};

/// Product category, as shown on the catalog tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Category {
	#[default]
	All,
	Electronics,
	Clothing,
	Books,
	Home,
}

impl Category {
	pub const ALL: [Category; 5] = [Self::All, Self::Electronics, Self::Clothing, Self::Books, Self::Home];

	pub fn label(self) -> &'static str {
		match self {
			Self::All => "すべての商品",
			Self::Electronics => "電子機器",
			Self::Clothing => "衣類",
			Self::Books => "書籍",
			Self::Home => "ホーム",
		}
	}

	pub fn label_en(self) -> &'static str {
		match self {
			Self::All => "All Products",
			Self::Electronics => "Electronics",
			Self::Clothing => "Clothing",
			Self::Books => "Books",
			Self::Home => "Home",
		}
	}

	/// Parses a Japanese tab label.
	pub fn from_label(label: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|c| c.label() == label.trim())
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Entries of the sort combobox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOption {
	Name,
	PriceAsc,
	PriceDesc,
}

impl SortOption {
	pub const ALL: [SortOption; 3] = [Self::Name, Self::PriceAsc, Self::PriceDesc];

	pub fn label(self) -> &'static str {
		match self {
			Self::Name => "名前順",
			Self::PriceAsc => "価格（安い順）",
			Self::PriceDesc => "価格（高い順）",
		}
	}

	pub fn label_en(self) -> &'static str {
		match self {
			Self::Name => "Name",
			Self::PriceAsc => "Price (Low to High)",
			Self::PriceDesc => "Price (High to Low)",
		}
	}

	pub fn from_label(label: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|s| s.label() == label.trim())
	}
}

impl fmt::Display for SortOption {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
	/// Stable identifier used by code (`smartphone`, `laptop`, ...).
	pub key: &'static str,
	pub name: &'static str,
	/// Listed price in yen.
	pub price: u64,
	pub category: Category,
	/// Sold-out products render a disabled add-to-cart button.
	pub in_stock: bool,
}

pub static PRODUCTS: [Product; 7] = [
	Product {
		key: "smartphone",
		name: "スマートフォン",
		price: 89_800,
		category: Category::Electronics,
		in_stock: true,
	},
	Product {
		key: "laptop",
		name: "ノートパソコン",
		price: 128_000,
		category: Category::Electronics,
		in_stock: true,
	},
	Product {
		key: "tshirt",
		name: "Tシャツ",
		price: 2_980,
		category: Category::Clothing,
		in_stock: true,
	},
	Product {
		key: "jeans",
		name: "ジーンズ",
		price: 7_980,
		category: Category::Clothing,
		in_stock: true,
	},
	Product {
		key: "programming_book",
		name: "プログラミング入門書",
		price: 3_200,
		category: Category::Books,
		in_stock: true,
	},
	Product {
		key: "coffee_maker",
		name: "コーヒーメーカー",
		price: 12_800,
		category: Category::Home,
		in_stock: true,
	},
	Product {
		key: "smartwatch",
		name: "スマートウォッチ",
		price: 39_800,
		category: Category::Electronics,
		in_stock: false,
	},
];

/// Read-only view over [`PRODUCTS`].
#[derive(Debug, Clone, Copy)]
pub struct ProductTable {
	products: &'static [Product],
}

impl Default for ProductTable {
	fn default() -> Self {
		Self::standard()
	}
}

impl ProductTable {
	pub fn standard() -> Self {
		Self { products: &PRODUCTS }
	}

	pub fn all(&self) -> &'static [Product] {
		self.products
	}

	/// Looks a product up by display name.
	///
	/// # Errors
	///
	/// [`ShopError::MissingProduct`] naming the product, so the table can be extended.
	pub fn by_name(&self, name: &str) -> Result<&'static Product> {
		self.products
			.iter()
			.find(|p| p.name == name)
			.ok_or_else(|| ShopError::MissingProduct(name.to_string()))
	}

	pub fn by_key(&self, key: &str) -> Result<&'static Product> {
		self.products
			.iter()
			.find(|p| p.key == key)
			.ok_or_else(|| ShopError::MissingProduct(key.to_string()))
	}

	pub fn price_of(&self, name: &str) -> Result<u64> {
		Ok(self.by_name(name)?.price)
	}

	pub fn in_category(&self, category: Category) -> Vec<&'static Product> {
		self.products
			.iter()
			.filter(|p| category == Category::All || p.category == category)
			.collect()
	}

	/// Products whose name contains `keyword`, as the catalog search filters them.
	pub fn matching(&self, keyword: &str) -> Vec<&'static Product> {
		let keyword = keyword.trim().to_lowercase();
		self.products
			.iter()
			.filter(|p| p.name.to_lowercase().contains(&keyword))
			.collect()
	}

	pub fn total_of<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<u64> {
		names.into_iter().map(|name| self.price_of(name)).sum()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
	pub username: &'static str,
	pub password: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewUser {
	pub username: &'static str,
	pub email: &'static str,
	pub password: &'static str,
}

/// Users and vocabulary shared by the scenarios.
#[derive(Debug, Clone, Copy)]
pub struct TestData {
	pub valid_user: Credentials,
	pub invalid_user: Credentials,
	pub new_user: NewUser,
	pub products: ProductTable,
}

pub const VALID_USER: Credentials = Credentials {
	username: "demo",
	password: "Demo@2025!",
};

pub const INVALID_USER: Credentials = Credentials {
	username: "invaliduser",
	password: "wrongpassword",
};

pub const NEW_USER: NewUser = NewUser {
	username: "testuser",
	email: "test@example.com",
	password: "Test@2025!",
};

impl Default for TestData {
	fn default() -> Self {
		Self {
			valid_user: VALID_USER,
			invalid_user: INVALID_USER,
			new_user: NEW_USER,
			products: ProductTable::standard(),
		}
	}
}
