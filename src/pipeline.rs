use crate::pipeline_iterators::{Dedup, Filter, MapCol, Replace, SourcedRow, Trim};
use crate::sort::ColumnSort;
use crate::transform::{ColumnScope, FindReplace, Transformation};
use crate::{check_column, ColumnDataType, DataType, Headers, Result, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Number of rows kept by [`Pipeline::preview`]
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleaningOptions {
	pub trim_whitespace: bool,
	pub remove_duplicates: bool,
}

impl CleaningOptions {
	pub fn is_active(&self) -> bool {
		self.trim_whitespace || self.remove_duplicates
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
	Contains,
	Equals,
	StartsWith,
	EndsWith,
	NotEmpty,
	IsEmpty,
}

/// Keep only rows whose cell in `column_index` passes the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
	pub column_index: usize,
	pub operator: FilterOperator,
	#[serde(default)]
	pub value: String,
}

impl ColumnFilter {
	pub fn new(column_index: usize, operator: FilterOperator, value: &str) -> Self {
		ColumnFilter {
			column_index,
			operator,
			value: value.to_string(),
		}
	}

	/// `contains`, `startsWith` and `endsWith` ignore case, `equals` doesn't
	pub fn matches(&self, row: &[String]) -> bool {
		let cell = row.get(self.column_index).map(String::as_str).unwrap_or("");
		match self.operator {
			FilterOperator::Contains => cell.to_lowercase().contains(&self.value.to_lowercase()),
			FilterOperator::Equals => cell == self.value,
			FilterOperator::StartsWith => cell.to_lowercase().starts_with(&self.value.to_lowercase()),
			FilterOperator::EndsWith => cell.to_lowercase().ends_with(&self.value.to_lowercase()),
			FilterOperator::NotEmpty => !cell.trim().is_empty(),
			FilterOperator::IsEmpty => cell.trim().is_empty(),
		}
	}
}

/// The first rows of a pipeline's output, plus how many rows the full output has
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
	pub headers: Headers,
	pub rows: Vec<Row>,
	pub total_rows: usize,
}

impl Preview {
	pub fn from_table(table: Table, limit: usize) -> Self {
		let total_rows = table.rows.len();
		let mut rows = table.rows;
		rows.truncate(limit);
		Preview {
			headers: table.headers,
			rows,
			total_rows,
		}
	}
}

/// The operations applied to a table, always in this order:
///
/// 1. transformations, in the order they were added
/// 2. the pending find/replace
/// 3. cleaning
/// 4. filters, in the order they were added
/// 5. sort
///
/// Every stage works on the output of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pipeline {
	pub transformations: Vec<Transformation>,
	pub find_replace: Option<FindReplace>,
	pub cleaning: CleaningOptions,
	pub filters: Vec<ColumnFilter>,
	pub sort: Option<ColumnSort>,
}

impl Pipeline {
	pub fn new() -> Self {
		Pipeline::default()
	}

	/// Append a transformation. Several transformations on the same column run one after another.
	///
	/// ## Example
	///
	/// ```
	/// use csv_shaper::{parse, Pipeline, TransformKind, Transformation};
	///
	/// let table = parse("name\nada lovelace").unwrap();
	/// let processed = Pipeline::new()
	///   .transform(Transformation::new(0, TransformKind::Uppercase))
	///   .transform(Transformation::new(0, TransformKind::Lowercase))
	///   .transform(Transformation::new(0, TransformKind::Capitalize))
	///   .run(&table, &[])
	///   .unwrap();
	///
	/// assert_eq!(processed.rows, vec![vec!["Ada Lovelace"]]);
	/// ```
	pub fn transform(mut self, transformation: Transformation) -> Self {
		self.transformations.push(transformation);
		self
	}

	/// Set the pending find/replace. There is only ever one.
	pub fn find_replace(mut self, find_replace: FindReplace) -> Self {
		self.find_replace = Some(find_replace);
		self
	}

	/// Take the pending find/replace out, resetting it
	pub fn take_find_replace(&mut self) -> Option<FindReplace> {
		self.find_replace.take()
	}

	pub fn cleaning(mut self, cleaning: CleaningOptions) -> Self {
		self.cleaning = cleaning;
		self
	}

	/// Add a filter. A filter already on the same column is replaced.
	///
	/// ## Example
	///
	/// ```
	/// use csv_shaper::{parse, ColumnFilter, FilterOperator, Pipeline};
	///
	/// let table = parse("city\nOslo\nBergen\noslo").unwrap();
	/// let pipeline = Pipeline::new()
	///   .filter(ColumnFilter::new(0, FilterOperator::Equals, "Bergen"))
	///   .filter(ColumnFilter::new(0, FilterOperator::StartsWith, "OS"));
	///
	/// assert_eq!(pipeline.filters.len(), 1);
	/// assert_eq!(pipeline.run(&table, &[]).unwrap().rows, vec![vec!["Oslo"], vec!["oslo"]]);
	/// ```
	pub fn filter(mut self, filter: ColumnFilter) -> Self {
		match self
			.filters
			.iter_mut()
			.find(|existing| existing.column_index == filter.column_index)
		{
			Some(existing) => *existing = filter,
			None => self.filters.push(filter),
		}
		self
	}

	pub fn remove_filter(mut self, column_index: usize) -> Self {
		self.filters.retain(|filter| filter.column_index != column_index);
		self
	}

	pub fn sort(mut self, sort: ColumnSort) -> Self {
		self.sort = Some(sort);
		self
	}

	pub fn clear_sort(mut self) -> Self {
		self.sort = None;
		self
	}

	/// Check every column index against a table with `column_count` columns
	pub fn validate(&self, column_count: usize) -> Result<()> {
		for transformation in &self.transformations {
			check_column(transformation.column_index, column_count)?;
		}
		if let Some(FindReplace {
			scope: ColumnScope::Column(col),
			..
		}) = &self.find_replace
		{
			check_column(*col, column_count)?;
		}
		for filter in &self.filters {
			check_column(filter.column_index, column_count)?;
		}
		if let Some(sort) = &self.sort {
			check_column(sort.column_index, column_count)?;
		}
		Ok(())
	}

	/// Run every stage over the whole table.
	///
	/// `column_types` decides how the sort column is compared. Columns without a type sort as text.
	pub fn run(&self, table: &Table, column_types: &[ColumnDataType]) -> Result<Table> {
		Ok(self.run_with_sources(table, column_types)?.0)
	}

	/// Like [`Pipeline::run`], also returning, for every output row, the index of the input row it
	/// came from.
	///
	/// ## Example
	///
	/// ```
	/// use csv_shaper::{parse, ColumnFilter, ColumnSort, FilterOperator, Pipeline, SortDirection};
	///
	/// let table = parse("fruit\npear\nfig\napple\nplum").unwrap();
	/// let (processed, sources) = Pipeline::new()
	///   .filter(ColumnFilter::new(0, FilterOperator::Contains, "p"))
	///   .sort(ColumnSort::new(0, SortDirection::Asc))
	///   .run_with_sources(&table, &[])
	///   .unwrap();
	///
	/// assert_eq!(processed.rows, vec![vec!["apple"], vec!["pear"], vec!["plum"]]);
	/// assert_eq!(sources, vec![2, 0, 3]);
	/// ```
	pub fn run_with_sources(
		&self,
		table: &Table,
		column_types: &[ColumnDataType],
	) -> Result<(Table, Vec<usize>)> {
		self.validate(table.column_count())?;

		let mut iterator: Box<dyn Iterator<Item = SourcedRow> + '_> =
			Box::new(table.rows.iter().cloned().enumerate());
		for transformation in &self.transformations {
			debug!(col = transformation.column_index, kind = ?transformation.kind, "transform");
			iterator = Box::new(MapCol {
				iterator,
				transformation,
			});
		}
		if let Some(find_replace) = self.find_replace.as_ref().filter(|fr| fr.is_active()) {
			debug!(find = %find_replace.find, scope = ?find_replace.scope, "find/replace");
			iterator = Box::new(Replace {
				iterator,
				replacer: find_replace.compile()?,
			});
		}
		if self.cleaning.trim_whitespace {
			debug!("trim whitespace");
			iterator = Box::new(Trim { iterator });
		}
		if self.cleaning.remove_duplicates {
			debug!("remove duplicates");
			iterator = Box::new(Dedup {
				iterator,
				seen: HashSet::new(),
			});
		}
		for filter in &self.filters {
			debug!(col = filter.column_index, operator = ?filter.operator, "filter");
			iterator = Box::new(Filter { iterator, filter });
		}
		let mut sourced: Vec<SourcedRow> = iterator.collect();

		if let Some(sort) = &self.sort {
			let data_type = column_types
				.get(sort.column_index)
				.map(|column_type| column_type.data_type)
				.unwrap_or(DataType::Text);
			debug!(col = sort.column_index, direction = ?sort.direction, %data_type, "sort");
			sourced = sort.apply_sourced(sourced, data_type);
		}

		debug!(rows_in = table.rows.len(), rows_out = sourced.len(), "pipeline done");
		let (sources, rows): (Vec<usize>, Vec<Row>) = sourced.into_iter().unzip();
		let processed = Table {
			headers: table.headers.clone(),
			rows,
		};
		Ok((processed, sources))
	}

	/// Run the pipeline over the whole table and keep the first [`DEFAULT_PREVIEW_ROWS`] rows
	pub fn preview(&self, table: &Table, column_types: &[ColumnDataType]) -> Result<Preview> {
		self.preview_with_limit(table, column_types, DEFAULT_PREVIEW_ROWS)
	}

	pub fn preview_with_limit(
		&self,
		table: &Table,
		column_types: &[ColumnDataType],
		limit: usize,
	) -> Result<Preview> {
		Ok(Preview::from_table(self.run(table, column_types)?, limit))
	}
}
