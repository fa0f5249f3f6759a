use crate::{check_column, Error, Headers, Result, Row};
use tracing::warn;

/// An in-memory table: a header row and data rows of string cells.
///
/// Rows are allowed to be shorter or longer than the header row. Missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
	pub headers: Headers,
	pub rows: Vec<Row>,
}

impl Table {
	pub fn new(headers: impl Into<Headers>, rows: Vec<Row>) -> Self {
		Table {
			headers: headers.into(),
			rows,
		}
	}

	/// Build a table from records where the first non-blank one is the header row.
	///
	/// Records whose cells are all blank are dropped. Fails with [`Error::EmptyInput`] if
	/// nothing is left, and [`Error::HeaderOnly`] if only the header row is left.
	pub fn from_records<I>(records: I) -> Result<Self>
	where
		I: IntoIterator<Item = Row>,
	{
		let mut records = records.into_iter().filter(|record| {
			let blank = record.iter().all(|cell| cell.trim().is_empty());
			if blank {
				warn!("dropping blank record");
			}
			!blank
		});
		let headers = records.next().ok_or(Error::EmptyInput)?;
		let rows: Vec<Row> = records.collect();
		if rows.is_empty() {
			return Err(Error::HeaderOnly);
		}
		Ok(Table::new(headers, rows))
	}

	/// Cell at `row`/`col`, or `""` if either is out of range
	pub fn cell(&self, row: usize, col: usize) -> &str {
		self.rows
			.get(row)
			.and_then(|row| row.get(col))
			.map(String::as_str)
			.unwrap_or("")
	}

	/// All cells of a column, top to bottom, with missing cells as `""`
	pub fn column(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
		self.rows
			.iter()
			.map(move |row| row.get(col).map(String::as_str).unwrap_or(""))
	}

	pub fn column_count(&self) -> usize {
		self.headers.len()
	}

	pub fn row_count(&self) -> usize {
		self.rows.len()
	}

	/// Move a column so it ends up at position `to`, in the headers and in every row.
	///
	/// ## Example
	///
	/// ```
	/// use csv_shaper::Table;
	///
	/// let mut table = Table::new(vec!["a", "b", "c"], vec![vec!["1".into(), "2".into(), "3".into()]]);
	/// table.move_column(2, 0).unwrap();
	///
	/// assert_eq!(table.headers.get_row(), &vec!["c", "a", "b"]);
	/// assert_eq!(table.rows[0], vec!["3", "1", "2"]);
	/// ```
	pub fn move_column(&mut self, from: usize, to: usize) -> Result<()> {
		let count = self.column_count();
		check_column(from, count)?;
		check_column(to, count)?;
		self.headers.move_field(from, to);
		for row in &mut self.rows {
			if from < row.len() {
				let cell = row.remove(from);
				let to = to.min(row.len());
				row.insert(to, cell);
			}
		}
		Ok(())
	}

	/// Move a data row so it ends up at position `to`
	pub fn move_row(&mut self, from: usize, to: usize) -> Result<()> {
		let count = self.row_count();
		if from >= count || to >= count {
			return Err(Error::InvalidRowIndex {
				index: from.max(to),
				row_count: count,
			});
		}
		let row = self.rows.remove(from);
		self.rows.insert(to, row);
		Ok(())
	}
}
