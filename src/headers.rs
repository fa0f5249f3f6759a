use crate::Row;
use std::collections::BTreeMap;
use std::ops::Index;
use std::slice;

/// The header row of a table. Names don't have to be unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers {
	/// First position of every name
	indexes: BTreeMap<String, usize>,
	row: Row,
}

impl Headers {
	pub fn new() -> Self {
		Headers {
			indexes: BTreeMap::new(),
			row: Row::new(),
		}
	}

	/// Returns false if the name already existed at an earlier position
	pub fn push_field(&mut self, name: &str) -> bool {
		self.row.push(name.to_string());
		if self.indexes.contains_key(name) {
			return false;
		}
		self.indexes.insert(name.to_string(), self.row.len() - 1);
		true
	}

	pub fn contains(&self, name: &str) -> bool {
		self.indexes.contains_key(name)
	}

	/// Position of the first column with this name
	pub fn get_index(&self, name: &str) -> Option<usize> {
		self.indexes.get(name).copied()
	}

	pub fn get(&self, index: usize) -> Option<&str> {
		self.row.get(index).map(String::as_str)
	}

	/// Cell of the first column named `name`. Short rows read as missing.
	pub fn get_field<'a>(&self, row: &'a [String], name: &str) -> Option<&'a str> {
		self.indexes
			.get(name)
			.and_then(|index| row.get(*index))
			.map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.row.len()
	}

	pub fn is_empty(&self) -> bool {
		self.row.is_empty()
	}

	pub fn get_row(&self) -> &Row {
		&self.row
	}

	/// Moves the column at `from` so it ends up at `to`, shifting the ones in between
	pub(crate) fn move_field(&mut self, from: usize, to: usize) {
		let name = self.row.remove(from);
		self.row.insert(to, name);
		self.reindex();
	}

	fn reindex(&mut self) {
		self.indexes.clear();
		for (index, name) in self.row.iter().enumerate() {
			self.indexes.entry(name.clone()).or_insert(index);
		}
	}

	pub fn iter(&self) -> slice::Iter<'_, String> {
		self.row.iter()
	}
}

impl From<Row> for Headers {
	fn from(row: Row) -> Self {
		let mut headers = Headers::new();
		for name in &row {
			headers.push_field(name);
		}
		headers
	}
}

impl From<Vec<&str>> for Headers {
	fn from(row: Vec<&str>) -> Self {
		row.into_iter().map(String::from).collect::<Row>().into()
	}
}

impl From<Headers> for Row {
	fn from(headers: Headers) -> Row {
		headers.row
	}
}

impl Index<usize> for Headers {
	type Output = str;

	fn index(&self, index: usize) -> &str {
		&self.row[index]
	}
}

impl<'a> IntoIterator for &'a Headers {
	type Item = &'a String;
	type IntoIter = slice::Iter<'a, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.row.iter()
	}
}
