use crate::{Headers, Table};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Quote a cell if it contains a comma, quote or line break, or has surrounding whitespace
pub fn escape_cell(cell: &str) -> Cow<'_, str> {
	let needs_quotes = cell.contains([',', '"', '\r', '\n']) || cell != cell.trim();
	if needs_quotes {
		Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
	} else {
		Cow::Borrowed(cell)
	}
}

fn encode_row<S: AsRef<str>>(row: &[S]) -> String {
	row.iter()
		.map(|cell| escape_cell(cell.as_ref()))
		.collect::<Vec<_>>()
		.join(",")
}

/// Render headers and rows as CSV. Rows are separated by `\n`, with no trailing newline.
///
/// ## Example
///
/// ```
/// use csv_shaper::{serialize, Headers};
///
/// let headers = Headers::from(vec!["name", "note"]);
/// let rows = vec![vec!["Jane".to_string(), "says \"hi\", twice".to_string()]];
///
/// assert_eq!(
///   serialize(&headers, &rows),
///   "name,note\nJane,\"says \"\"hi\"\", twice\""
/// );
/// ```
pub fn serialize<S: AsRef<str>>(headers: &Headers, rows: &[Vec<S>]) -> String {
	let mut csv = String::new();
	let mut target = StringTarget::new(&mut csv);
	// Writing to a String can't fail
	let _ = write_rows(&mut target, headers, rows);
	csv
}

fn write_rows<S: AsRef<str>>(
	target: &mut impl Target,
	headers: &Headers,
	rows: &[Vec<S>],
) -> io::Result<()> {
	target.write_headers(headers)?;
	for row in rows {
		target.write_row(row)?;
	}
	Ok(())
}

/// Somewhere to write CSV to
pub trait Target {
	/// Useful for initializations
	fn write_headers(&mut self, headers: &Headers) -> io::Result<()>;
	fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> io::Result<()>;

	/// Push buffered output through
	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}

	/// Write headers and rows, then flush
	fn write_table(&mut self, table: &Table) -> io::Result<()>
	where
		Self: Sized,
	{
		write_rows(self, &table.headers, &table.rows)?;
		self.flush()
	}
}

pub struct StringTarget<'a> {
	s: &'a mut String,
}
impl<'a> StringTarget<'a> {
	pub fn new(s: &'a mut String) -> Self {
		Self { s }
	}
}
impl<'a> Target for StringTarget<'a> {
	fn write_headers(&mut self, headers: &Headers) -> io::Result<()> {
		self.s.push_str(&encode_row(headers.get_row()));
		Ok(())
	}
	fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> io::Result<()> {
		self.s.push('\n');
		self.s.push_str(&encode_row(row));
		Ok(())
	}
}

/// Writes to any [`io::Write`]
pub struct WriterTarget<W: Write> {
	writer: W,
}
impl<W: Write> WriterTarget<W> {
	pub fn new(writer: W) -> Self {
		Self { writer }
	}
	pub fn into_inner(self) -> W {
		self.writer
	}
}
impl<W: Write> Target for WriterTarget<W> {
	fn write_headers(&mut self, headers: &Headers) -> io::Result<()> {
		self.writer.write_all(encode_row(headers.get_row()).as_bytes())
	}
	fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> io::Result<()> {
		self.writer.write_all(b"\n")?;
		self.writer.write_all(encode_row(row).as_bytes())
	}
	fn flush(&mut self) -> io::Result<()> {
		self.writer.flush()
	}
}

/// Creates the file, and its parent directories, when the headers are written
pub struct PathTarget {
	path: PathBuf,
	writer: Option<WriterTarget<BufWriter<File>>>,
}
impl PathTarget {
	pub fn new<P: Into<PathBuf>>(path: P) -> Self {
		Self {
			path: path.into(),
			writer: None,
		}
	}

	fn writer(&mut self) -> io::Result<&mut WriterTarget<BufWriter<File>>> {
		self.writer.as_mut().ok_or_else(|| {
			io::Error::new(io::ErrorKind::Other, "headers must be written before rows")
		})
	}
}
impl Target for PathTarget {
	fn write_headers(&mut self, headers: &Headers) -> io::Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)?;
		}
		let file = File::create(&self.path)?;
		self.writer = Some(WriterTarget::new(BufWriter::new(file)));
		self.writer()?.write_headers(headers)
	}
	fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> io::Result<()> {
		self.writer()?.write_row(row)
	}
	fn flush(&mut self) -> io::Result<()> {
		match self.writer.as_mut() {
			Some(writer) => writer.flush(),
			None => Ok(()),
		}
	}
}
/// Errors from this last flush are lost. Use [`Target::write_table`] or [`Target::flush`] to see them.
impl Drop for PathTarget {
	fn drop(&mut self) {
		let _ = self.flush();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{parse, Row};

	#[test]
	fn escaping() {
		assert_eq!(escape_cell("plain"), "plain");
		assert_eq!(escape_cell(""), "");
		assert_eq!(escape_cell("a,b"), "\"a,b\"");
		assert_eq!(escape_cell("line\nbreak"), "\"line\nbreak\"");
		assert_eq!(escape_cell("cr\r"), "\"cr\r\"");
		assert_eq!(escape_cell("say \"x\""), "\"say \"\"x\"\"\"");
		assert_eq!(escape_cell(" padded"), "\" padded\"");
		assert_eq!(escape_cell("tab\t"), "\"tab\t\"");
	}

	#[test]
	fn round_trip_modulo_trimming() {
		let headers = Headers::from(vec!["id", "text"]);
		let rows: Vec<Row> = vec![
			vec!["1".into(), "a,b".into()],
			vec!["2".into(), "quote \"here\"".into()],
			vec!["3".into(), "  padded  ".into()],
			vec!["4".into(), "".into()],
		];
		let parsed = parse(&serialize(&headers, &rows)).unwrap();
		assert_eq!(parsed.headers, headers);
		let expected: Vec<Row> = rows
			.iter()
			.map(|row| row.iter().map(|cell| cell.trim().to_string()).collect())
			.collect();
		assert_eq!(parsed.rows, expected);
	}

	#[test]
	fn writer_matches_serialize() {
		let table = parse("a,b\n1,\"x,y\"\n2,z").unwrap();
		let mut target = WriterTarget::new(Vec::new());
		target.write_table(&table).unwrap();
		let written = String::from_utf8(target.into_inner()).unwrap();
		assert_eq!(written, serialize(&table.headers, &table.rows));
	}

	#[test]
	fn path_target() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out").join("processed.csv");
		let table = parse("a\n1\n2").unwrap();
		{
			let mut target = PathTarget::new(&path);
			target.write_table(&table).unwrap();
		}
		assert_eq!(fs::read_to_string(&path).unwrap(), "a\n1\n2");
	}

	#[test]
	fn write_table_flushes() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("flushed.csv");
		let table = parse("a,b\n1,2").unwrap();
		let mut target = PathTarget::new(&path);
		target.write_table(&table).unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1,2");
		drop(target);
	}

	#[test]
	fn rows_before_headers_fail() {
		let dir = tempfile::tempdir().unwrap();
		let mut target = PathTarget::new(dir.path().join("x.csv"));
		assert!(target.write_row(&["1"]).is_err());
	}
}
