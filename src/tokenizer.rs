use crate::{Error, Headers, Result, Row, Table};
use tracing::debug;

/// Options for the line tokenizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseOptions {
	/// Trim surrounding whitespace from every field. Padded values don't survive a round trip
	/// when this is on.
	pub trim_fields: bool,
	/// Number of data lines tokenized per [`Tokenizer::next_batch`] call
	pub batch_size: usize,
}

impl Default for ParseOptions {
	fn default() -> Self {
		ParseOptions {
			trim_fields: true,
			batch_size: 1000,
		}
	}
}

/// Parse CSV text into a table with the default options.
///
/// The first non-blank line is the header row. Quoted fields can contain commas and `""`
/// escaped quotes, but not line breaks.
///
/// ## Example
///
/// ```
/// use csv_shaper::parse;
///
/// let table = parse("id,name\r\n\r\n1, \"Doe, Jane\" \n").unwrap();
///
/// assert_eq!(table.headers.get_row(), &vec!["id", "name"]);
/// assert_eq!(table.rows, vec![vec!["1", "Doe, Jane"]]);
/// ```
pub fn parse(text: &str) -> Result<Table> {
	parse_with(text, ParseOptions::default())
}

pub fn parse_with(text: &str, options: ParseOptions) -> Result<Table> {
	Tokenizer::new(text, options)?.finish()
}

/// Split one line into fields
pub fn parse_line(line: &str, trim_fields: bool) -> Row {
	let mut fields = Row::new();
	let mut field = String::new();
	let mut in_quotes = false;
	let mut chars = line.chars().peekable();

	let end_field = |field: &mut String, fields: &mut Row| {
		let value = std::mem::take(field);
		fields.push(if trim_fields {
			value.trim().to_string()
		} else {
			value
		});
	};

	while let Some(c) = chars.next() {
		match c {
			'"' if in_quotes && chars.peek() == Some(&'"') => {
				field.push('"');
				chars.next();
			}
			'"' => in_quotes = !in_quotes,
			',' if !in_quotes => end_field(&mut field, &mut fields),
			c => field.push(c),
		}
	}
	end_field(&mut field, &mut fields);
	fields
}

/// Progress after a batch of lines was tokenized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
	pub parsed_lines: usize,
	pub total_lines: usize,
}

impl BatchProgress {
	pub fn percent(&self) -> usize {
		match self.total_lines {
			0 => 100,
			total => self.parsed_lines * 100 / total,
		}
	}
}

/// Tokenizes data lines a batch at a time so callers can report progress between batches.
///
/// Batches always hold whole lines, so the resulting table is the same as one [`parse`] call.
///
/// ## Example
///
/// ```
/// use csv_shaper::{ParseOptions, Tokenizer};
///
/// let options = ParseOptions { batch_size: 2, ..Default::default() };
/// let mut tokenizer = Tokenizer::new("n\n1\n2\n3", options).unwrap();
///
/// assert_eq!(tokenizer.next_batch().unwrap().parsed_lines, 2);
/// assert_eq!(tokenizer.next_batch().unwrap().percent(), 100);
/// assert_eq!(tokenizer.next_batch(), None);
/// assert_eq!(tokenizer.finish().unwrap().rows.len(), 3);
/// ```
pub struct Tokenizer<'a> {
	lines: Vec<&'a str>,
	options: ParseOptions,
	headers: Headers,
	rows: Vec<Row>,
	/// Index into `lines` of the next line to tokenize
	position: usize,
}

impl<'a> Tokenizer<'a> {
	/// Splits the text into lines and tokenizes the header line right away
	pub fn new(text: &'a str, options: ParseOptions) -> Result<Self> {
		let lines: Vec<&str> = text
			.split('\n')
			.map(|line| line.strip_suffix('\r').unwrap_or(line))
			.filter(|line| !line.trim().is_empty())
			.collect();
		let header_line = lines.first().ok_or(Error::EmptyInput)?;
		if lines.len() == 1 {
			return Err(Error::HeaderOnly);
		}
		let headers = Headers::from(parse_line(header_line, options.trim_fields));
		Ok(Tokenizer {
			rows: Vec::with_capacity(lines.len() - 1),
			lines,
			options,
			headers,
			position: 1,
		})
	}

	pub fn headers(&self) -> &Headers {
		&self.headers
	}

	/// Tokenize the next batch of lines. Returns `None` once every line has been tokenized.
	pub fn next_batch(&mut self) -> Option<BatchProgress> {
		if self.position >= self.lines.len() {
			return None;
		}
		let end = (self.position + self.options.batch_size.max(1)).min(self.lines.len());
		let trim = self.options.trim_fields;
		self.rows.extend(
			self.lines[self.position..end]
				.iter()
				.map(|line| parse_line(line, trim)),
		);
		self.position = end;

		let progress = BatchProgress {
			parsed_lines: self.rows.len(),
			total_lines: self.lines.len() - 1,
		};
		debug!(
			parsed = progress.parsed_lines,
			total = progress.total_lines,
			"tokenized CSV batch ({}%)",
			progress.percent()
		);
		Some(progress)
	}

	/// Tokenizes whatever is left and returns the table
	pub fn finish(mut self) -> Result<Table> {
		while self.next_batch().is_some() {}
		Ok(Table {
			headers: self.headers,
			rows: self.rows,
		})
	}
}
