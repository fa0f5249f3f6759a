use crate::pipeline::Preview;
use crate::projection::{project, provider_table, ColumnSelection, ProjectionOptions, RowImages};
use crate::{
	infer_with_sample, parse_with, read_workbook, serialize, ColumnDataType, Pipeline, Result,
	RowImageMap, ShaperConfig, Table,
};
use std::path::Path;
use tracing::info;

/// What the processed table is for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
	/// Selected columns only, with barcode expansion and optional extra columns
	#[default]
	ThirdParty,
	/// Every column plus an "Image Link" column
	Provider,
}

/// Order of projection and pipeline in [`Mode::ThirdParty`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Composition {
	/// Project first. Pipeline column indices refer to the projected columns.
	#[default]
	SelectionFirst,
	/// Run the pipeline on the raw table first. Pipeline column indices refer to the raw columns.
	PipelineFirst,
}

/// Output of [`Session::recompute`]
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
	pub table: Table,
	pub preview: Preview,
}

/// Row images looked up through the raw row each pipeline output row came from
struct SourcedImages<'a> {
	images: &'a RowImageMap,
	sources: &'a [usize],
}

impl RowImages for SourcedImages<'_> {
	fn image_url(&self, row: usize) -> Option<&str> {
		let source = *self.sources.get(row)?;
		self.images.image_url(source)
	}
}

/// Everything that decides the processed table.
///
/// A session is a plain value: `with_*` methods return an updated copy and nothing is
/// recomputed until [`Session::recompute`] is called.
///
/// ## Example
///
/// ```
/// use csv_shaper::{ColumnSelection, Session, ShaperConfig};
///
/// let config = ShaperConfig { identifier_header: "code".to_string(), ..Default::default() };
/// let session = Session::from_csv("code,name,stock\n123,Tea,4\n12345678901,Jam,0", config)
///   .unwrap()
///   .with_selection(ColumnSelection::new(vec![1, 0]))
///   .with_validate_barcodes(true);
///
/// assert_eq!(
///   session.export_csv().unwrap(),
///   "name,Barcode,SKU,Product main measure unit,Product main measure value,Is measured\n\
///    Tea,123,123,kg,\"0,1\",True\n\
///    Jam,12345678901,12345678901,,,False"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Session {
	config: ShaperConfig,
	raw: Table,
	column_types: Vec<ColumnDataType>,
	mode: Mode,
	composition: Composition,
	selection: ColumnSelection,
	validate_barcodes: bool,
	attach_images: bool,
	pipeline: Pipeline,
	row_images: RowImageMap,
}

impl Session {
	pub fn new(raw: Table, config: ShaperConfig) -> Self {
		let column_types = infer_with_sample(&raw, config.inference_sample_rows);
		Session {
			config,
			raw,
			column_types,
			mode: Mode::default(),
			composition: Composition::default(),
			selection: ColumnSelection::default(),
			validate_barcodes: false,
			attach_images: false,
			pipeline: Pipeline::new(),
			row_images: RowImageMap::new(),
		}
	}

	pub fn from_csv(text: &str, config: ShaperConfig) -> Result<Self> {
		let raw = parse_with(text, config.parse_options())?;
		info!(rows = raw.row_count(), columns = raw.column_count(), "loaded CSV");
		Ok(Session::new(raw, config))
	}

	pub fn from_workbook<P: AsRef<Path>>(path: P, config: ShaperConfig) -> Result<Self> {
		Ok(Session::new(read_workbook(path)?, config))
	}

	/// Replace the raw table. Column types are inferred again and everything that refers to
	/// columns or rows of the old table is reset.
	pub fn with_table(self, raw: Table) -> Self {
		Session {
			mode: self.mode,
			composition: self.composition,
			..Session::new(raw, self.config)
		}
	}

	pub fn with_mode(mut self, mode: Mode) -> Self {
		self.mode = mode;
		self
	}

	pub fn with_composition(mut self, composition: Composition) -> Self {
		self.composition = composition;
		self
	}

	pub fn with_selection(mut self, selection: ColumnSelection) -> Self {
		self.selection = selection;
		self
	}

	pub fn with_validate_barcodes(mut self, validate_barcodes: bool) -> Self {
		self.validate_barcodes = validate_barcodes;
		self
	}

	pub fn with_attach_images(mut self, attach_images: bool) -> Self {
		self.attach_images = attach_images;
		self
	}

	pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
		self.pipeline = pipeline;
		self
	}

	pub fn with_row_images(mut self, row_images: RowImageMap) -> Self {
		self.row_images = row_images;
		self
	}

	/// Move a column of the raw table. The selection keeps pointing at the same positions.
	pub fn move_column(mut self, from: usize, to: usize) -> Result<Self> {
		self.raw.move_column(from, to)?;
		self.column_types = infer_with_sample(&self.raw, self.config.inference_sample_rows);
		Ok(self)
	}

	/// Apply the pending find/replace to the raw table for good, and clear it
	pub fn apply_find_replace(mut self) -> Result<Self> {
		let Some(find_replace) = self.pipeline.take_find_replace() else {
			return Ok(self);
		};
		let raw = Pipeline::new()
			.find_replace(find_replace)
			.run(&self.raw, &self.column_types)?;
		self.column_types = infer_with_sample(&raw, self.config.inference_sample_rows);
		self.raw = raw;
		Ok(self)
	}

	pub fn config(&self) -> &ShaperConfig {
		&self.config
	}

	pub fn raw(&self) -> &Table {
		&self.raw
	}

	/// Inferred types of the raw table's columns
	pub fn column_types(&self) -> &[ColumnDataType] {
		&self.column_types
	}

	pub fn mode(&self) -> Mode {
		self.mode
	}

	pub fn selection(&self) -> &ColumnSelection {
		&self.selection
	}

	pub fn pipeline(&self) -> &Pipeline {
		&self.pipeline
	}

	pub fn row_images(&self) -> &RowImageMap {
		&self.row_images
	}

	pub fn projection_options(&self) -> ProjectionOptions {
		ProjectionOptions {
			validate_barcodes: self.validate_barcodes,
			attach_images: self.attach_images,
			identifier_header: self.config.identifier_header.clone(),
		}
	}

	/// Build the processed table from scratch, along with its preview.
	///
	/// The preview is cut from the same full table that [`Session::export_csv`] writes.
	pub fn recompute(&self) -> Result<Processed> {
		let table = match self.mode {
			Mode::Provider => {
				let (piped, sources) = self.pipeline.run_with_sources(&self.raw, &self.column_types)?;
				provider_table(&piped, &self.sourced_images(&sources))
			}
			Mode::ThirdParty if self.selection.is_empty() => Table::default(),
			Mode::ThirdParty => {
				let options = self.projection_options();
				match self.composition {
					Composition::SelectionFirst => {
						let projected = project(&self.raw, &self.selection, &options, &self.row_images)?;
						let types = infer_with_sample(&projected, self.config.inference_sample_rows);
						self.pipeline.run(&projected, &types)?
					}
					Composition::PipelineFirst => {
						let (piped, sources) = self.pipeline.run_with_sources(&self.raw, &self.column_types)?;
						project(&piped, &self.selection, &options, &self.sourced_images(&sources))?
					}
				}
			}
		};
		info!(
			mode = ?self.mode,
			rows = table.row_count(),
			columns = table.column_count(),
			"recomputed processed table"
		);
		let preview = Preview::from_table(table.clone(), self.config.preview_rows);
		Ok(Processed { table, preview })
	}

	fn sourced_images<'a>(&'a self, sources: &'a [usize]) -> SourcedImages<'a> {
		SourcedImages {
			images: &self.row_images,
			sources,
		}
	}

	/// The full processed table as CSV
	pub fn export_csv(&self) -> Result<String> {
		let processed = self.recompute()?;
		Ok(serialize(&processed.table.headers, &processed.table.rows))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		ColumnFilter, ColumnSort, DataType, Error, FilterOperator, FindReplace, ImageInfo,
		SortDirection,
	};

	const CSV: &str = "code,name,price\n\
		4860001,tea,3\n\
		4860002,jam,12\n\
		4860001,tea,3\n\
		4860003,honey,7";

	fn session() -> Session {
		let config = ShaperConfig {
			identifier_header: "code".to_string(),
			preview_rows: 2,
			..Default::default()
		};
		Session::from_csv(CSV, config).unwrap()
	}

	#[test]
	fn types_are_inferred_on_load() {
		let types: Vec<DataType> = session().column_types().iter().map(|t| t.data_type).collect();
		assert_eq!(types, vec![DataType::Number, DataType::Text, DataType::Number]);
	}

	#[test]
	fn empty_selection_gives_empty_table() {
		let processed = session().recompute().unwrap();
		assert_eq!(processed.table, Table::default());
		assert_eq!(processed.preview.total_rows, 0);
	}

	#[test]
	fn selection_first_pipeline_uses_projected_indices() {
		let pipeline = Pipeline::new()
			.cleaning(crate::CleaningOptions {
				remove_duplicates: true,
				..Default::default()
			})
			// name, Barcode, SKU, price
			.sort(ColumnSort::new(3, SortDirection::Desc));
		let processed = session()
			.with_selection(ColumnSelection::new(vec![1, 0, 2]))
			.with_pipeline(pipeline)
			.recompute()
			.unwrap();

		assert_eq!(processed.table.column(0).collect::<Vec<_>>(), vec!["jam", "honey", "tea"]);
		assert_eq!(processed.preview.rows.len(), 2);
		assert_eq!(processed.preview.total_rows, 3);
		assert_eq!(processed.preview.rows, processed.table.rows[..2].to_vec());
	}

	#[test]
	fn pipeline_first_uses_raw_indices() {
		let pipeline = Pipeline::new().filter(ColumnFilter::new(1, FilterOperator::Contains, "E"));
		let processed = session()
			.with_composition(Composition::PipelineFirst)
			.with_selection(ColumnSelection::new(vec![1]))
			.with_pipeline(pipeline)
			.recompute()
			.unwrap();
		assert_eq!(processed.table.headers.get_row(), &vec!["name"]);
		assert_eq!(processed.table.rows, vec![vec!["tea"], vec!["tea"], vec!["honey"]]);
	}

	#[test]
	fn provider_mode_appends_image_links() {
		let mut row_images = RowImageMap::new();
		row_images.assign(1, &ImageInfo::new(5, "jam.png", "https://img/jam.png", ""));
		let processed = session()
			.with_mode(Mode::Provider)
			.with_row_images(row_images)
			.recompute()
			.unwrap();
		assert_eq!(processed.table.headers.get_row(), &vec!["code", "name", "price", "Image Link"]);
		assert_eq!(processed.table.rows[0][3], "");
		assert_eq!(processed.table.rows[1][3], "https://img/jam.png");
	}

	fn images_session(text: &str, file_name: &str) -> Session {
		let session = Session::from_csv(text, ShaperConfig::default()).unwrap();
		let mut library = crate::ImageLibrary::new();
		library.add(ImageInfo::new(1, file_name, &format!("https://img/{}", file_name), ""));
		let mut row_images = RowImageMap::new();
		row_images.match_column(session.raw(), 0, &library).unwrap();
		session.with_row_images(row_images)
	}

	#[test]
	fn provider_images_follow_sorted_rows() {
		let processed = images_session("sku,name\nb,Beta\na,Alpha", "b.png")
			.with_mode(Mode::Provider)
			.with_pipeline(Pipeline::new().sort(ColumnSort::new(0, SortDirection::Asc)))
			.recompute()
			.unwrap();
		assert_eq!(
			processed.table.rows,
			vec![vec!["a", "Alpha", ""], vec!["b", "Beta", "https://img/b.png"]]
		);
	}

	#[test]
	fn pipeline_first_images_follow_filtered_rows() {
		let processed = images_session("sku,name\nb,Beta\na,Alpha", "a.png")
			.with_composition(Composition::PipelineFirst)
			.with_selection(ColumnSelection::new(vec![0]))
			.with_attach_images(true)
			.with_pipeline(Pipeline::new().filter(ColumnFilter::new(0, FilterOperator::Equals, "a")))
			.recompute()
			.unwrap();
		assert_eq!(processed.table.headers.get_row(), &vec!["sku", "External image URL"]);
		assert_eq!(processed.table.rows, vec![vec!["a", "https://img/a.png"]]);
	}

	#[test]
	fn find_replace_is_applied_once() {
		let session = session()
			.with_pipeline(Pipeline::new().find_replace(FindReplace::new("TEA", "green tea").in_column(1)))
			.apply_find_replace()
			.unwrap();
		assert_eq!(session.pipeline().find_replace, None);
		assert_eq!(session.raw().cell(0, 1), "green tea");
		assert_eq!(session.raw().cell(1, 1), "jam");
	}

	#[test]
	fn new_table_resets_column_state() {
		let session = session()
			.with_mode(Mode::Provider)
			.with_selection(ColumnSelection::new(vec![2]))
			.with_table(Table::new(vec!["flag"], vec![vec!["yes".into()], vec!["no".into()]]));
		assert!(session.selection().is_empty());
		assert_eq!(session.mode(), Mode::Provider);
		assert_eq!(session.column_types()[0].data_type, DataType::Boolean);
	}

	#[test]
	fn move_column_reinfers_types() {
		let session = session().move_column(1, 0).unwrap();
		assert_eq!(session.raw().headers.get_row(), &vec!["name", "code", "price"]);
		assert_eq!(session.column_types()[0].data_type, DataType::Text);
		assert!(matches!(
			session.move_column(0, 3),
			Err(Error::InvalidColumnIndex { index: 3, .. })
		));
	}

	#[test]
	fn products_fixture_export() {
		let text = std::fs::read_to_string("test/products.csv").unwrap();
		let session = Session::from_csv(&text, ShaperConfig::default()).unwrap();
		let types: Vec<DataType> = session.column_types().iter().map(|t| t.data_type).collect();
		assert_eq!(
			types,
			vec![DataType::Number, DataType::Text, DataType::Number, DataType::Date, DataType::Boolean]
		);

		let pipeline = Pipeline::new()
			.cleaning(crate::CleaningOptions {
				remove_duplicates: true,
				..Default::default()
			})
			.sort(ColumnSort::new(3, SortDirection::Asc));
		let csv = session
			.with_selection(ColumnSelection::new(vec![1, 0, 2]))
			.with_validate_barcodes(true)
			.with_pipeline(pipeline)
			.export_csv()
			.unwrap();
		assert_eq!(
			csv,
			"Name,Barcode,SKU,Price,Product main measure unit,Product main measure value,Is measured\n\
			 green tea,4860001234,4860001234,3.5,kg,\"0,1\",True\n\
			 honey,4860005678,4860005678,7.25,kg,\"0,1\",True\n\
			 \"Jam, strawberry\",48600012345678,48600012345678,12,,,False"
		);
	}

	#[test]
	fn workbook_session() {
		let session = Session::from_workbook("test/products.xlsx", ShaperConfig::default()).unwrap();
		let types: Vec<DataType> = session.column_types().iter().map(|t| t.data_type).collect();
		assert_eq!(types, vec![DataType::Number, DataType::Text, DataType::Number]);
		let csv = session
			.with_selection(ColumnSelection::new(vec![1, 2]))
			.export_csv()
			.unwrap();
		assert_eq!(csv, "Name,Stock\nTea,150\nJam,2.5");
	}

	#[test]
	fn invalid_selection_is_an_error() {
		let err = session()
			.with_selection(ColumnSelection::new(vec![7]))
			.export_csv()
			.unwrap_err();
		assert!(matches!(err, Error::InvalidColumnIndex { index: 7, column_count: 3 }));
	}
}
