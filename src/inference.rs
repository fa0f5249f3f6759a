use crate::values::{is_boolean, parse_date, parse_number};
use crate::Table;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading rows sampled per column by [`infer`]
pub const DEFAULT_SAMPLE_ROWS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
	Text,
	Number,
	Date,
	Boolean,
}

impl fmt::Display for DataType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			DataType::Text => "text",
			DataType::Number => "number",
			DataType::Date => "date",
			DataType::Boolean => "boolean",
		};
		f.write_str(name)
	}
}

/// The inferred type of a column, with a confidence between 0 and 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnDataType {
	#[serde(rename = "type")]
	pub data_type: DataType,
	pub confidence: f64,
}

impl ColumnDataType {
	pub fn text(confidence: f64) -> Self {
		ColumnDataType {
			data_type: DataType::Text,
			confidence,
		}
	}
}

/// Infer the type of every column from its first [`DEFAULT_SAMPLE_ROWS`] rows.
///
/// ## Example
///
/// ```
/// use csv_shaper::{infer, parse, DataType};
///
/// let table = parse("qty,active\n1,true\n2,false\n3.5,yes").unwrap();
/// let types = infer(&table);
///
/// assert_eq!(types[0].data_type, DataType::Number);
/// assert_eq!(types[1].data_type, DataType::Boolean);
/// ```
pub fn infer(table: &Table) -> Vec<ColumnDataType> {
	infer_with_sample(table, DEFAULT_SAMPLE_ROWS)
}

/// Infer column types from the first `sample_rows` rows. Blank cells are not counted.
pub fn infer_with_sample(table: &Table, sample_rows: usize) -> Vec<ColumnDataType> {
	(0..table.column_count())
		.map(|col| {
			let samples: Vec<&str> = table
				.column(col)
				.take(sample_rows)
				.map(str::trim)
				.filter(|value| !value.is_empty())
				.collect();
			classify(&samples)
		})
		.collect()
}

fn classify(samples: &[&str]) -> ColumnDataType {
	if samples.is_empty() {
		return ColumnDataType::text(0.0);
	}
	let total = samples.len() as f64;
	let ratio = |matches: fn(&str) -> bool| {
		samples.iter().filter(|value| matches(value)).count() as f64 / total
	};
	let boolean_ratio = ratio(is_boolean);
	let number_ratio = ratio(|value| parse_number(value).is_some());
	// Short values like "12" would otherwise pass as dates
	let date_ratio = ratio(|value| value.chars().count() > 5 && parse_date(value).is_some());

	let (data_type, confidence) = if boolean_ratio > 0.8 {
		(DataType::Boolean, boolean_ratio)
	} else if number_ratio > 0.7 {
		(DataType::Number, number_ratio)
	} else if date_ratio > 0.6 {
		(DataType::Date, date_ratio)
	} else {
		let best = number_ratio.max(date_ratio).max(boolean_ratio);
		(DataType::Text, 1.0 - best)
	};
	ColumnDataType {
		data_type,
		confidence,
	}
}
