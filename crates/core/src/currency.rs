//! Yen amounts as the storefront prints them (`¥12,800`).

use std::sync::LazyLock;

use regex::Regex;

static YEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[¥￥]\s*([0-9][0-9,]*)").unwrap());

/// First `¥` amount in `text`, thousands separators stripped.
///
/// Returns `None` when there is no amount (or it overflows), so callers can
/// tell "no price on screen" apart from a zero price.
pub fn find_yen(text: &str) -> Option<u64> {
	let digits = YEN_RE.captures(text)?.get(1)?.as_str().replace(',', "");
	digits.parse().ok()
}

/// Lenient form of [`find_yen`]: a missing amount reads as 0.
///
/// Page objects report prices this way. A regression that removes a price
/// from the screen therefore shows up as a 0, not as an error.
pub fn parse_yen(text: &str) -> u64 {
	find_yen(text).unwrap_or(0)
}

/// `12800` → `¥12,800`.
pub fn format_yen(amount: u64) -> String {
	let digits = amount.to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
	out.push('¥');
	for (i, ch) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			out.push(',');
		}
		out.push(ch);
	}
	out
}
