use crate::inference::DEFAULT_SAMPLE_ROWS;
use crate::pipeline::DEFAULT_PREVIEW_ROWS;
use crate::projection::DEFAULT_IDENTIFIER_HEADER;
use crate::{ParseOptions, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings shared by parsing, inference, preview and projection. Every field is optional in YAML.
///
/// ## Example
///
/// ```
/// use csv_shaper::ShaperConfig;
///
/// let config = ShaperConfig::from_yaml_str("identifier_header: Barcode\npreview_rows: 5").unwrap();
///
/// assert_eq!(config.identifier_header, "Barcode");
/// assert_eq!(config.preview_rows, 5);
/// assert_eq!(config.inference_sample_rows, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaperConfig {
	/// Header of the column that expands into Barcode and SKU columns
	pub identifier_header: String,
	pub preview_rows: usize,
	pub inference_sample_rows: usize,
	/// Lines tokenized per batch
	pub batch_size: usize,
	pub trim_fields: bool,
}

impl Default for ShaperConfig {
	fn default() -> Self {
		let parse = ParseOptions::default();
		ShaperConfig {
			identifier_header: DEFAULT_IDENTIFIER_HEADER.to_string(),
			preview_rows: DEFAULT_PREVIEW_ROWS,
			inference_sample_rows: DEFAULT_SAMPLE_ROWS,
			batch_size: parse.batch_size,
			trim_fields: parse.trim_fields,
		}
	}
}

impl ShaperConfig {
	pub fn from_yaml_str(yaml: &str) -> Result<Self> {
		Ok(serde_yaml::from_str(yaml)?)
	}

	pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
		let yaml = fs::read_to_string(path)?;
		Self::from_yaml_str(&yaml)
	}

	pub fn parse_options(&self) -> ParseOptions {
		ParseOptions {
			trim_fields: self.trim_fields,
			batch_size: self.batch_size,
		}
	}
}
