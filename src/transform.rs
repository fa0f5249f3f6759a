use crate::values::{format_date, format_number};
use crate::Result;
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformKind {
	Uppercase,
	Lowercase,
	/// Uppercase the first letter of every word
	Capitalize,
	/// Reformat dates as `M/D/YYYY`
	FormatDate,
	/// Reformat numbers with thousands separators
	FormatNumber,
}

/// A transformation of every cell in one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
	pub column_index: usize,
	pub kind: TransformKind,
}

impl Transformation {
	pub fn new(column_index: usize, kind: TransformKind) -> Self {
		Transformation { column_index, kind }
	}

	/// Cells that don't parse as a date or number are returned unchanged by the formatting kinds
	pub fn apply(&self, cell: &str) -> String {
		match self.kind {
			TransformKind::Uppercase => cell.to_uppercase(),
			TransformKind::Lowercase => cell.to_lowercase(),
			TransformKind::Capitalize => capitalize(cell),
			TransformKind::FormatDate => format_date(cell).unwrap_or_else(|| cell.to_string()),
			TransformKind::FormatNumber => format_number(cell).unwrap_or_else(|| cell.to_string()),
		}
	}
}

fn capitalize(cell: &str) -> String {
	static WORD: OnceLock<Regex> = OnceLock::new();
	let word = WORD.get_or_init(|| Regex::new(r"\w+").expect("valid word pattern"));
	word.replace_all(cell, |caps: &regex::Captures| {
		let mut chars = caps[0].chars();
		match chars.next() {
			Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
			None => String::new(),
		}
	})
	.into_owned()
}

/// Which cells a find/replace touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnScope {
	All,
	Column(usize),
}

impl ColumnScope {
	pub fn includes(&self, col: usize) -> bool {
		match self {
			ColumnScope::All => true,
			ColumnScope::Column(index) => *index == col,
		}
	}
}

/// Replace every literal occurrence of `find` with `replace`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindReplace {
	pub find: String,
	pub replace: String,
	pub scope: ColumnScope,
	#[serde(default)]
	pub case_sensitive: bool,
}

impl FindReplace {
	/// Case-insensitive, across all columns
	pub fn new(find: &str, replace: &str) -> Self {
		FindReplace {
			find: find.to_string(),
			replace: replace.to_string(),
			scope: ColumnScope::All,
			case_sensitive: false,
		}
	}

	pub fn in_column(mut self, col: usize) -> Self {
		self.scope = ColumnScope::Column(col);
		self
	}

	pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
		self.case_sensitive = case_sensitive;
		self
	}

	/// An empty `find` replaces nothing
	pub fn is_active(&self) -> bool {
		!self.find.is_empty()
	}

	pub(crate) fn compile(&self) -> Result<Replacer> {
		let pattern = RegexBuilder::new(&regex::escape(&self.find))
			.case_insensitive(!self.case_sensitive)
			.build()?;
		Ok(Replacer {
			pattern,
			replace: self.replace.clone(),
			scope: self.scope,
		})
	}
}

/// A compiled [`FindReplace`]
pub struct Replacer {
	pattern: Regex,
	replace: String,
	scope: ColumnScope,
}

impl Replacer {
	pub fn apply(&self, col: usize, cell: &str) -> String {
		if !self.scope.includes(col) {
			return cell.to_string();
		}
		self.pattern
			.replace_all(cell, NoExpand(&self.replace))
			.into_owned()
	}
}
