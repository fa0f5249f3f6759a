use crate::{Error, Result, Row, Table};
use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, Trim};
use std::io;
use std::path::Path;
use tracing::info;

/// Read CSV with full RFC 4180 quoting, including line breaks inside quoted fields.
///
/// Rows may have different lengths. Every field is trimmed.
///
/// ## Example
///
/// ```
/// use csv_shaper::read_csv;
///
/// let table = read_csv("name,bio\nAda,\"wrote the\nfirst program\"\n".as_bytes()).unwrap();
///
/// assert_eq!(table.rows, vec![vec!["Ada", "wrote the\nfirst program"]]);
/// ```
pub fn read_csv<R: io::Read>(reader: R) -> Result<Table> {
	let mut reader = ReaderBuilder::new()
		.has_headers(false)
		.flexible(true)
		.trim(Trim::All)
		.from_reader(reader);
	let records = reader
		.records()
		.map(|record| record.map(|record| record.iter().map(String::from).collect::<Row>()))
		.collect::<Result<Vec<Row>, csv::Error>>()?;
	let table = Table::from_records(records)?;
	info!(rows = table.row_count(), columns = table.column_count(), "read CSV");
	Ok(table)
}

/// Read the first worksheet of an xlsx, xlsm, xlsb, xls or ods workbook.
///
/// Other worksheets are ignored. Blank rows are dropped and the first remaining row is the header row.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Table> {
	let path = path.as_ref();
	let mut workbook = open_workbook_auto(path)?;
	let range = workbook.worksheet_range_at(0).ok_or(Error::NoWorksheet)??;
	let records = range
		.rows()
		.map(|row| row.iter().map(cell_to_string).collect::<Row>());
	let table = Table::from_records(records)?;
	info!(
		path = %path.display(),
		rows = table.row_count(),
		columns = table.column_count(),
		"read first worksheet"
	);
	Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
	match cell {
		Data::Empty => String::new(),
		Data::String(s) => s.trim().to_string(),
		cell => cell.to_string(),
	}
}
