use crate::pipeline_iterators::SourcedRow;
use crate::values::{parse_date, parse_number};
use crate::{DataType, Row};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
	#[default]
	Asc,
	Desc,
}

/// Sort rows by one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSort {
	pub column_index: usize,
	#[serde(default)]
	pub direction: SortDirection,
}

#[derive(Debug)]
enum Key {
	Number(f64),
	Timestamp(i64),
	/// Lowercased, then as written
	Text(String, String),
}

impl ColumnSort {
	pub fn new(column_index: usize, direction: SortDirection) -> Self {
		ColumnSort {
			column_index,
			direction,
		}
	}

	/// Stable sort that compares cells as the column's inferred type.
	///
	/// Numbers and dates that don't parse always go last, in both directions.
	pub fn apply(&self, rows: Vec<Row>, data_type: DataType) -> Vec<Row> {
		let rows = rows.into_iter().enumerate().collect();
		self.apply_sourced(rows, data_type)
			.into_iter()
			.map(|(_, row)| row)
			.collect()
	}

	pub(crate) fn apply_sourced(&self, rows: Vec<SourcedRow>, data_type: DataType) -> Vec<SourcedRow> {
		let mut keyed: Vec<(Option<Key>, SourcedRow)> = rows
			.into_iter()
			.map(|item| {
				let cell = item.1.get(self.column_index).map(String::as_str).unwrap_or("");
				(key(cell, data_type), item)
			})
			.collect();
		keyed.sort_by(|(a, _), (b, _)| match (a, b) {
			(Some(a), Some(b)) => {
				let ordering = compare(a, b);
				match self.direction {
					SortDirection::Asc => ordering,
					SortDirection::Desc => ordering.reverse(),
				}
			}
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => Ordering::Equal,
		});
		keyed.into_iter().map(|(_, item)| item).collect()
	}
}

/// `None` for numbers and dates that don't parse
fn key(cell: &str, data_type: DataType) -> Option<Key> {
	match data_type {
		DataType::Number => parse_number(cell).map(Key::Number),
		DataType::Date => parse_date(cell).map(|datetime| Key::Timestamp(datetime.and_utc().timestamp_millis())),
		DataType::Text | DataType::Boolean => Some(Key::Text(cell.to_lowercase(), cell.to_string())),
	}
}

fn compare(a: &Key, b: &Key) -> Ordering {
	match (a, b) {
		(Key::Number(a), Key::Number(b)) => a.total_cmp(b),
		(Key::Timestamp(a), Key::Timestamp(b)) => a.cmp(b),
		(Key::Text(a, a_raw), Key::Text(b, b_raw)) => a.cmp(b).then_with(|| a_raw.cmp(b_raw)),
		// A column is keyed with a single variant
		_ => Ordering::Equal,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rows(rows: &[&[&str]]) -> Vec<Row> {
		rows.iter()
			.map(|row| row.iter().map(|cell| cell.to_string()).collect())
			.collect()
	}

	#[test]
	fn text_sort_is_stable() {
		let sorted = ColumnSort::new(0, SortDirection::Asc)
			.apply(rows(&[&["b", "2"], &["a", "1"], &["a", "3"]]), DataType::Text);
		assert_eq!(sorted, rows(&[&["a", "1"], &["a", "3"], &["b", "2"]]));
	}

	#[test]
	fn text_sort_ignores_case() {
		let sorted = ColumnSort::new(0, SortDirection::Asc)
			.apply(rows(&[&["banana"], &["Apple"], &["cherry"]]), DataType::Text);
		assert_eq!(sorted, rows(&[&["Apple"], &["banana"], &["cherry"]]));
	}

	#[test]
	fn text_case_ties_are_ordered() {
		let input = rows(&[&["b", "1"], &["A", "2"], &["a", "3"], &["B", "4"]]);
		let asc = ColumnSort::new(0, SortDirection::Asc).apply(input.clone(), DataType::Text);
		assert_eq!(asc, rows(&[&["A", "2"], &["a", "3"], &["B", "4"], &["b", "1"]]));
		let desc = ColumnSort::new(0, SortDirection::Desc).apply(input, DataType::Text);
		assert_eq!(desc, rows(&[&["b", "1"], &["B", "4"], &["a", "3"], &["A", "2"]]));
	}

	#[test]
	fn numeric_desc_keeps_invalid_last() {
		let sorted = ColumnSort::new(0, SortDirection::Desc)
			.apply(rows(&[&["2"], &["n/a"], &["10"], &["-1"], &[""]]), DataType::Number);
		assert_eq!(sorted, rows(&[&["10"], &["2"], &["-1"], &["n/a"], &[""]]));
	}

	#[test]
	fn numeric_asc_compares_values_not_text() {
		let sorted = ColumnSort::new(0, SortDirection::Asc)
			.apply(rows(&[&["10"], &["9"], &["bad"], &["100"]]), DataType::Number);
		assert_eq!(sorted, rows(&[&["9"], &["10"], &["100"], &["bad"]]));
	}

	#[test]
	fn dates_sort_chronologically() {
		let sorted = ColumnSort::new(1, SortDirection::Asc).apply(
			rows(&[&["x", "2024-03-01"], &["y", "Jan 5, 2024"], &["z", "2023-12-31"]]),
			DataType::Date,
		);
		assert_eq!(sorted, rows(&[&["z", "2023-12-31"], &["y", "Jan 5, 2024"], &["x", "2024-03-01"]]));
	}

	#[test]
	fn short_rows_sort_as_empty() {
		let sorted = ColumnSort::new(1, SortDirection::Asc).apply(rows(&[&["a", "b"], &["c"]]), DataType::Text);
		assert_eq!(sorted, rows(&[&["c"], &["a", "b"]]));
	}
}
