//! Text Parsing for Scraped Values
//!
//! Marketplace cells arrive as display text ("Rp 150.000.000", "10.000 km",
//! "Tahun 2020") or, once written back out, as plain numbers. Each helper
//! accepts both forms and returns `None` when no number can be recovered.

/// Parse a plain integer, optionally written back out as `"<n>.0"`.
///
/// Anything else (notably `"10.000"`, where the dot groups thousands) is
/// left to the digit-stripping path.
fn parse_plain_number(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Keep only ASCII digits and parse the result
fn parse_digits(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse a price such as `"Rp 150.000.000"` into whole currency units
pub fn parse_price(text: &str) -> Option<u64> {
    parse_plain_number(text).or_else(|| parse_digits(text))
}

/// Parse a mileage such as `"10.000 km"` into kilometres
pub fn parse_mileage(text: &str) -> Option<u64> {
    parse_plain_number(text).or_else(|| parse_digits(&text.to_lowercase().replace("km", "")))
}

/// Parse a manufacture year: a plain integer, or the first standalone
/// four-digit number in the text ("Tahun 2020")
pub fn parse_year(text: &str) -> Option<i32> {
    let trimmed = text.trim();
    if let Some(year) = parse_plain_number(trimmed) {
        return i32::try_from(year).ok();
    }

    trimmed
        .split(|c: char| !c.is_ascii_digit())
        .find(|token| token.len() == 4)
        .and_then(|token| token.parse().ok())
}
