//! Turn an uploaded CSV or spreadsheet into a cleaned, column-selected table and back into CSV.
//!
//! ```
//! use csv_shaper::{infer, parse, serialize, ColumnFilter, FilterOperator, Pipeline};
//!
//! let table = parse("name,qty\napple,3\npear,\nplum,1").unwrap();
//! let types = infer(&table);
//! let processed = Pipeline::new()
//!   .filter(ColumnFilter::new(1, FilterOperator::NotEmpty, ""))
//!   .run(&table, &types)
//!   .unwrap();
//!
//! assert_eq!(
//!   serialize(&processed.headers, &processed.rows),
//!   "name,qty\napple,3\nplum,1"
//! );
//! ```

mod config;
mod headers;
mod images;
mod inference;
mod pipeline;
mod pipeline_iterators;
mod projection;
mod session;
mod sort;
mod source;
mod table;
mod target;
mod tokenizer;
mod transform;
mod values;

pub use config::ShaperConfig;
pub use headers::Headers;
pub use images::{ImageInfo, ImageLibrary, MatchReport, RowImage, RowImageMap};
pub use inference::{infer, infer_with_sample, ColumnDataType, DataType};
pub use pipeline::{CleaningOptions, ColumnFilter, FilterOperator, Pipeline, Preview};
pub use projection::{
	project, provider_table, ColumnSelection, NoImages, ProjectionOptions, RowImages,
	DEFAULT_IDENTIFIER_HEADER,
};
pub use session::{Composition, Mode, Processed, Session};
pub use sort::{ColumnSort, SortDirection};
pub use source::{read_csv, read_workbook};
pub use table::Table;
pub use target::{escape_cell, serialize, PathTarget, StringTarget, Target, WriterTarget};
pub use tokenizer::{parse, parse_line, parse_with, BatchProgress, ParseOptions, Tokenizer};
pub use transform::{ColumnScope, FindReplace, TransformKind, Transformation};

/// A single table row. Cells are plain strings.
pub type Row = Vec<String>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Input has no non-blank lines")]
	EmptyInput,
	#[error("Input only has a header line and no data rows")]
	HeaderOnly,
	#[error("Column index {index} is out of range for {column_count} columns")]
	InvalidColumnIndex { index: usize, column_count: usize },
	#[error("Row index {index} is out of range for {row_count} rows")]
	InvalidRowIndex { index: usize, row_count: usize },
	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),
	#[error("Workbook error: {0}")]
	Workbook(#[from] calamine::Error),
	#[error("Workbook has no worksheet")]
	NoWorksheet,
	#[error("Invalid find pattern: {0}")]
	Pattern(#[from] regex::Error),
	#[error("{0}")]
	Io(#[from] std::io::Error),
	#[error("Invalid config: {0}")]
	Config(#[from] serde_yaml::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Error::InvalidColumnIndex` unless `index < column_count`
pub(crate) fn check_column(index: usize, column_count: usize) -> Result<()> {
	if index < column_count {
		Ok(())
	} else {
		Err(Error::InvalidColumnIndex {
			index,
			column_count,
		})
	}
}
