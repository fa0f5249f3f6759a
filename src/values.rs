//! Best-effort parsing and formatting of cell values

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::str::FromStr;

const BOOLEAN_WORDS: [&str; 8] = ["true", "false", "yes", "no", "y", "n", "1", "0"];

const DATETIME_FORMATS: [&str; 8] = [
	"%Y-%m-%dT%H:%M:%S%.f",
	"%Y-%m-%d %H:%M:%S%.f",
	"%Y-%m-%dT%H:%M",
	"%Y-%m-%d %H:%M",
	"%Y/%m/%d %H:%M:%S",
	"%m/%d/%Y %H:%M:%S",
	"%m/%d/%Y %H:%M",
	"%d.%m.%Y %H:%M",
];

const DATE_FORMATS: [&str; 10] = [
	"%Y-%m-%d",
	"%Y/%m/%d",
	"%Y.%m.%d",
	"%m/%d/%Y",
	"%m-%d-%Y",
	"%d.%m.%Y",
	"%b %d, %Y",
	"%B %d, %Y",
	"%d %b %Y",
	"%d %B %Y",
];

/// Fraction digits kept by [`format_number`]
const MAX_FRACTION_DIGITS: i64 = 3;

pub fn is_boolean(value: &str) -> bool {
	let value = value.trim().to_lowercase();
	BOOLEAN_WORDS.contains(&value.as_str())
}

/// A finite number, or `None`
pub fn parse_number(value: &str) -> Option<f64> {
	let value = value.trim();
	if value.is_empty() {
		return None;
	}
	value.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// A calendar date (with optional time of day), or `None`
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
	let value = value.trim();
	if value.is_empty() {
		return None;
	}
	if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
		return Some(datetime.naive_utc());
	}
	if let Ok(datetime) = DateTime::parse_from_rfc2822(value) {
		return Some(datetime.naive_utc());
	}
	DATETIME_FORMATS
		.iter()
		.find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
		.or_else(|| {
			DATE_FORMATS.iter().find_map(|format| {
				NaiveDate::parse_from_str(value, format)
					.ok()
					.and_then(|date| date.and_hms_opt(0, 0, 0))
			})
		})
}

/// Short US-style date, like `1/15/2024`
pub fn format_date(value: &str) -> Option<String> {
	parse_date(value).map(|datetime| datetime.format("%-m/%-d/%Y").to_string())
}

/// Number with thousands separators and at most three fraction digits, like `1,234.568`
pub fn format_number(value: &str) -> Option<String> {
	let number = parse_number(value)?;
	let decimal = BigDecimal::from_str(value.trim())
		.or_else(|_| BigDecimal::try_from(number))
		.ok()?;
	let rounded = decimal.with_scale_round(MAX_FRACTION_DIGITS, RoundingMode::HalfUp);
	let (digits, _) = rounded.as_bigint_and_exponent();
	let digits = digits.to_string();
	let (negative, digits) = match digits.strip_prefix('-') {
		Some(digits) => (true, digits),
		None => (false, digits.as_str()),
	};

	let fraction_len = MAX_FRACTION_DIGITS as usize;
	let digits = format!("{:0>width$}", digits, width = fraction_len + 1);
	let (integer, fraction) = digits.split_at(digits.len() - fraction_len);
	let fraction = fraction.trim_end_matches('0');

	let mut formatted = String::new();
	if negative {
		formatted.push('-');
	}
	formatted.push_str(&group_thousands(integer));
	if !fraction.is_empty() {
		formatted.push('.');
		formatted.push_str(fraction);
	}
	Some(formatted)
}

fn group_thousands(integer: &str) -> String {
	let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
	for (i, c) in integer.chars().enumerate() {
		if i > 0 && (integer.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(c);
	}
	grouped
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn booleans() {
		for value in ["TRUE", "no", "Y", "0", " yes "] {
			assert!(is_boolean(value), "{}", value);
		}
		assert!(!is_boolean("2"));
		assert!(!is_boolean("truthy"));
	}

	#[test]
	fn numbers() {
		assert_eq!(parse_number("3.5"), Some(3.5));
		assert_eq!(parse_number(" -1e3 "), Some(-1000.0));
		assert_eq!(parse_number(""), None);
		assert_eq!(parse_number("NaN"), None);
		assert_eq!(parse_number("inf"), None);
		assert_eq!(parse_number("12abc"), None);
	}

	#[test]
	fn dates() {
		let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
			.unwrap()
			.and_hms_opt(0, 0, 0)
			.unwrap();
		for value in ["2024-01-15", "2024/1/15", "01/15/2024", "Jan 15, 2024", "15 January 2024"] {
			assert_eq!(parse_date(value), Some(expected), "{}", value);
		}
		assert_eq!(parse_date("2024-02-30"), None);
		assert_eq!(parse_date("42"), None);
		assert!(parse_date("2024-01-15T10:30:00Z").is_some());
	}

	#[test]
	fn formats_dates() {
		assert_eq!(format_date("2024-03-05").as_deref(), Some("3/5/2024"));
		assert_eq!(format_date("soon"), None);
	}

	#[test]
	fn formats_numbers() {
		assert_eq!(format_number("1234567").as_deref(), Some("1,234,567"));
		assert_eq!(format_number("1234.5").as_deref(), Some("1,234.5"));
		assert_eq!(format_number("1234.56789").as_deref(), Some("1,234.568"));
		assert_eq!(format_number("-1000.10").as_deref(), Some("-1,000.1"));
		assert_eq!(format_number("0.0004").as_deref(), Some("0"));
		assert_eq!(format_number("999").as_deref(), Some("999"));
		assert_eq!(format_number("n/a"), None);
	}
}
