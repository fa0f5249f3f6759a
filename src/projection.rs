use crate::{check_column, Headers, Result, Row, Table};
use serde::{Deserialize, Serialize};

/// Georgian for "barcode"
pub const DEFAULT_IDENTIFIER_HEADER: &str = "შტრიხკოდი";

const BARCODE_HEADER: &str = "Barcode";
const SKU_HEADER: &str = "SKU";
const MEASURE_UNIT_HEADER: &str = "Product main measure unit";
const MEASURE_VALUE_HEADER: &str = "Product main measure value";
const IS_MEASURED_HEADER: &str = "Is measured";
const IMAGE_URL_HEADER: &str = "External image URL";
const IMAGE_LINK_HEADER: &str = "Image Link";

/// Barcodes up to this many characters are weighed products
const MAX_MEASURED_BARCODE_LEN: usize = 10;

/// Source column indices, in output order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSelection(Vec<usize>);

impl ColumnSelection {
	pub fn new(indices: Vec<usize>) -> Self {
		ColumnSelection(indices)
	}

	/// Checking appends the column at the end, unchecking removes it
	pub fn toggle(&mut self, index: usize, checked: bool) {
		if checked {
			self.0.push(index);
		} else {
			self.0.retain(|selected| *selected != index);
		}
	}

	/// Move the entry at position `from` so it ends up at position `to`
	pub fn move_item(&mut self, from: usize, to: usize) {
		if from < self.0.len() && to < self.0.len() {
			let index = self.0.remove(from);
			self.0.insert(to, index);
		}
	}

	pub fn contains(&self, index: usize) -> bool {
		self.0.contains(&index)
	}

	pub fn indices(&self) -> &[usize] {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<usize>> for ColumnSelection {
	fn from(indices: Vec<usize>) -> Self {
		ColumnSelection(indices)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionOptions {
	/// Append measure unit, measure value and "is measured" columns based on the barcode length
	pub validate_barcodes: bool,
	/// Append the URL of the image assigned to each row
	pub attach_images: bool,
	/// Header of the column that expands into Barcode and SKU columns
	pub identifier_header: String,
}

impl Default for ProjectionOptions {
	fn default() -> Self {
		ProjectionOptions {
			validate_barcodes: false,
			attach_images: false,
			identifier_header: DEFAULT_IDENTIFIER_HEADER.to_string(),
		}
	}
}

/// Looks up the image assigned to a row
pub trait RowImages {
	fn image_url(&self, row: usize) -> Option<&str>;
}

/// No row has an image
pub struct NoImages;

impl RowImages for NoImages {
	fn image_url(&self, _row: usize) -> Option<&str> {
		None
	}
}

/// Pick and reorder columns.
///
/// The identifier column becomes two columns, Barcode and SKU, holding the same value.
///
/// ## Example
///
/// ```
/// use csv_shaper::{parse, project, ColumnSelection, NoImages, ProjectionOptions};
///
/// let table = parse("id,name,price\n4860001,Tea,3").unwrap();
/// let options = ProjectionOptions {
///   validate_barcodes: true,
///   identifier_header: "id".to_string(),
///   ..Default::default()
/// };
/// let out = project(&table, &ColumnSelection::new(vec![1, 0]), &options, &NoImages).unwrap();
///
/// assert_eq!(
///   out.headers.get_row(),
///   &vec![
///     "name",
///     "Barcode",
///     "SKU",
///     "Product main measure unit",
///     "Product main measure value",
///     "Is measured",
///   ]
/// );
/// assert_eq!(out.rows[0], vec!["Tea", "4860001", "4860001", "kg", "0,1", "True"]);
/// ```
pub fn project(
	table: &Table,
	selection: &ColumnSelection,
	options: &ProjectionOptions,
	images: &impl RowImages,
) -> Result<Table> {
	let column_count = table.column_count();
	for index in selection.indices() {
		check_column(*index, column_count)?;
	}
	let is_identifier = |index: usize| table.headers[index] == *options.identifier_header;
	let barcode_column = table
		.headers
		.get_index(&options.identifier_header)
		.filter(|index| selection.contains(*index));
	let validate = options.validate_barcodes && barcode_column.is_some();

	let mut headers = Headers::new();
	for &index in selection.indices() {
		if is_identifier(index) {
			headers.push_field(BARCODE_HEADER);
			headers.push_field(SKU_HEADER);
		} else {
			headers.push_field(&table.headers[index]);
		}
	}
	if validate {
		headers.push_field(MEASURE_UNIT_HEADER);
		headers.push_field(MEASURE_VALUE_HEADER);
		headers.push_field(IS_MEASURED_HEADER);
	}
	if options.attach_images {
		headers.push_field(IMAGE_URL_HEADER);
	}

	let rows = table
		.rows
		.iter()
		.enumerate()
		.map(|(row_index, row)| {
			let cell = |index: usize| row.get(index).cloned().unwrap_or_default();
			let mut out = Row::with_capacity(headers.len());
			for &index in selection.indices() {
				let value = cell(index);
				if is_identifier(index) {
					out.push(value.clone());
				}
				out.push(value);
			}
			if let (true, Some(barcode_column)) = (validate, barcode_column) {
				out.extend(measure_columns(&cell(barcode_column)));
			}
			if options.attach_images {
				out.push(images.image_url(row_index).unwrap_or_default().to_string());
			}
			out
		})
		.collect();

	Ok(Table { headers, rows })
}

fn measure_columns(barcode: &str) -> [String; 3] {
	let [unit, value, measured] = if barcode.chars().count() <= MAX_MEASURED_BARCODE_LEN {
		["kg", "0,1", "True"]
	} else {
		["", "", "False"]
	};
	[unit.to_string(), value.to_string(), measured.to_string()]
}

/// Every column plus an "Image Link" column with each row's image URL
pub fn provider_table(table: &Table, images: &impl RowImages) -> Table {
	let mut headers = table.headers.clone();
	headers.push_field(IMAGE_LINK_HEADER);
	let rows = table
		.rows
		.iter()
		.enumerate()
		.map(|(row_index, row)| {
			let mut row = row.clone();
			row.push(images.image_url(row_index).unwrap_or_default().to_string());
			row
		})
		.collect();
	Table { headers, rows }
}
