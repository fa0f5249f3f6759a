use crate::projection::RowImages;
use crate::target::serialize;
use crate::{check_column, Result, Row, Table};
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

const DEFAULT_CATEGORY: &str = "Uncategorized";

/// An uploaded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
	pub id: u64,
	pub file_name: String,
	pub url: String,
	pub thumb_url: String,
	pub category: String,
}

impl ImageInfo {
	pub fn new(id: u64, file_name: &str, url: &str, thumb_url: &str) -> Self {
		ImageInfo {
			id,
			file_name: file_name.to_string(),
			url: url.to_string(),
			thumb_url: thumb_url.to_string(),
			category: DEFAULT_CATEGORY.to_string(),
		}
	}

	/// Lowercased file name without its extension
	pub fn stem(&self) -> String {
		let stem = match self.file_name.rsplit_once('.') {
			Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem,
			_ => self.file_name.as_str(),
		};
		stem.to_lowercase()
	}
}

/// Images in upload order
#[derive(Debug, Clone, Default)]
pub struct ImageLibrary {
	images: LinkedHashMap<u64, ImageInfo>,
}

impl ImageLibrary {
	pub fn new() -> Self {
		ImageLibrary {
			images: LinkedHashMap::new(),
		}
	}

	/// Adds an image at the end. An image with the same id is replaced in place.
	pub fn add(&mut self, image: ImageInfo) {
		match self.images.get_mut(&image.id) {
			Some(existing) => *existing = image,
			None => {
				self.images.insert(image.id, image);
			}
		}
	}

	pub fn remove(&mut self, id: u64) -> Option<ImageInfo> {
		self.images.remove(&id)
	}

	pub fn get(&self, id: u64) -> Option<&ImageInfo> {
		self.images.get(&id)
	}

	/// Returns false if there is no image with this id
	pub fn set_category(&mut self, id: u64, category: &str) -> bool {
		match self.images.get_mut(&id) {
			Some(image) => {
				image.category = category.to_string();
				true
			}
			None => false,
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = &ImageInfo> {
		self.images.values()
	}

	pub fn len(&self) -> usize {
		self.images.len()
	}

	pub fn is_empty(&self) -> bool {
		self.images.is_empty()
	}

	/// Images whose file name contains `query`, ignoring case
	pub fn search(&self, query: &str) -> impl Iterator<Item = &ImageInfo> + '_ {
		let query = query.to_lowercase();
		self.iter()
			.filter(move |image| image.file_name.to_lowercase().contains(&query))
	}

	/// The first image whose file name without extension equals `value`, ignoring case
	pub fn find_by_stem(&self, value: &str) -> Option<&ImageInfo> {
		let value = value.trim().to_lowercase();
		if value.is_empty() {
			return None;
		}
		self.iter().find(|image| image.stem() == value)
	}

	/// A table with ID, File Name, Category and URL columns
	pub fn to_table(&self) -> Table {
		let rows: Vec<Row> = self
			.iter()
			.map(|image| {
				vec![
					image.id.to_string(),
					image.file_name.clone(),
					image.category.clone(),
					image.url.clone(),
				]
			})
			.collect();
		Table::new(vec!["ID", "File Name", "Category", "URL"], rows)
	}

	pub fn to_csv(&self) -> String {
		let table = self.to_table();
		serialize(&table.headers, &table.rows)
	}

	pub fn to_json(&self) -> Result<String> {
		let images: Vec<&ImageInfo> = self.iter().collect();
		Ok(serde_json::to_string_pretty(&images)?)
	}
}

/// The image assigned to a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowImage {
	pub id: u64,
	pub file_name: String,
	pub url: String,
	pub thumb_url: String,
}

impl From<&ImageInfo> for RowImage {
	fn from(image: &ImageInfo) -> Self {
		RowImage {
			id: image.id,
			file_name: image.file_name.clone(),
			url: image.url.clone(),
			thumb_url: image.thumb_url.clone(),
		}
	}
}

/// Result of [`RowImageMap::match_column`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchReport {
	pub matched: usize,
	pub total: usize,
}

impl fmt::Display for MatchReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Matching completed: {} out of {} rows matched with images.",
			self.matched, self.total
		)
	}
}

/// Image assignments by row position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowImageMap {
	rows: BTreeMap<usize, RowImage>,
}

impl RowImageMap {
	pub fn new() -> Self {
		RowImageMap {
			rows: BTreeMap::new(),
		}
	}

	pub fn assign(&mut self, row: usize, image: &ImageInfo) {
		self.rows.insert(row, image.into());
	}

	pub fn unassign(&mut self, row: usize) -> Option<RowImage> {
		self.rows.remove(&row)
	}

	pub fn get(&self, row: usize) -> Option<&RowImage> {
		self.rows.get(&row)
	}

	/// Drop every assignment of an image, for when it's removed from the library
	pub fn forget_image(&mut self, id: u64) {
		self.rows.retain(|_, image| image.id != id);
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Assign images to rows whose cell in `column` equals an image's file name without
	/// extension, ignoring case and surrounding whitespace.
	///
	/// Rows without a match keep their current assignment.
	///
	/// ## Example
	///
	/// ```
	/// use csv_shaper::{parse, ImageInfo, ImageLibrary, RowImageMap};
	///
	/// let table = parse("sku,name\nA-1,Tea\nB-2,Jam").unwrap();
	/// let mut library = ImageLibrary::new();
	/// library.add(ImageInfo::new(1, "b-2.JPG", "https://i.ibb.co/b2.jpg", "https://i.ibb.co/t/b2.jpg"));
	///
	/// let mut images = RowImageMap::new();
	/// let report = images.match_column(&table, 0, &library).unwrap();
	///
	/// assert_eq!(report.to_string(), "Matching completed: 1 out of 2 rows matched with images.");
	/// assert_eq!(images.get(1).unwrap().url, "https://i.ibb.co/b2.jpg");
	/// ```
	pub fn match_column(
		&mut self,
		table: &Table,
		column: usize,
		library: &ImageLibrary,
	) -> Result<MatchReport> {
		check_column(column, table.column_count())?;
		let mut matched = 0;
		for (row, value) in table.column(column).enumerate() {
			if let Some(image) = library.find_by_stem(value) {
				debug!(row, file_name = %image.file_name, "matched image");
				self.assign(row, image);
				matched += 1;
			}
		}
		let report = MatchReport {
			matched,
			total: table.row_count(),
		};
		if matched == 0 && !library.is_empty() {
			warn!(column, "no row matched an image");
		}
		info!("{}", report);
		Ok(report)
	}
}

impl RowImages for RowImageMap {
	fn image_url(&self, row: usize) -> Option<&str> {
		self.rows.get(&row).map(|image| image.url.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parse;

	fn image(id: u64, file_name: &str) -> ImageInfo {
		ImageInfo::new(id, file_name, &format!("https://img/{}", id), &format!("https://img/t/{}", id))
	}

	#[test]
	fn stems() {
		assert_eq!(image(1, "Photo.PNG").stem(), "photo");
		assert_eq!(image(1, "a.b.jpg").stem(), "a.b");
		assert_eq!(image(1, "noext").stem(), "noext");
		assert_eq!(image(1, "trailing.").stem(), "trailing.");
	}

	#[test]
	fn first_library_image_wins() {
		let mut library = ImageLibrary::new();
		library.add(image(7, "tea.png"));
		library.add(image(3, "TEA.jpg"));
		assert_eq!(library.find_by_stem(" Tea ").unwrap().id, 7);
		assert!(library.find_by_stem("").is_none());
	}

	#[test]
	fn matching_keeps_existing_assignments() {
		let table = parse("code\ntea\ncoffee\n\njam").unwrap();
		let mut library = ImageLibrary::new();
		library.add(image(1, "tea.png"));
		library.add(image(2, "jam.png"));

		let mut images = RowImageMap::new();
		images.assign(1, &image(9, "manual.png"));
		let report = images.match_column(&table, 0, &library).unwrap();

		assert_eq!(report, MatchReport { matched: 2, total: 3 });
		assert_eq!(images.image_url(0), Some("https://img/1"));
		assert_eq!(images.image_url(1), Some("https://img/9"));
		assert_eq!(images.image_url(2), Some("https://img/2"));
		assert!(images.match_column(&table, 1, &library).is_err());
	}

	#[test]
	fn removing_an_image_drops_its_rows() {
		let mut library = ImageLibrary::new();
		library.add(image(1, "a.png"));
		let mut images = RowImageMap::new();
		images.assign(0, library.get(1).unwrap());
		images.assign(4, library.get(1).unwrap());

		assert!(library.remove(1).is_some());
		images.forget_image(1);
		assert!(images.is_empty());
		assert!(library.is_empty());
	}

	#[test]
	fn categories_and_search() {
		let mut library = ImageLibrary::new();
		library.add(image(1, "Red-Shirt.png"));
		library.add(image(2, "blue.png"));
		assert!(library.set_category(2, "Clothing"));
		assert!(!library.set_category(5, "Clothing"));
		assert_eq!(library.get(2).unwrap().category, "Clothing");
		let found: Vec<u64> = library.search("shirt").map(|image| image.id).collect();
		assert_eq!(found, vec![1]);
	}

	#[test]
	fn exports() {
		let mut library = ImageLibrary::new();
		library.add(image(1, "a, b.png"));
		assert_eq!(
			library.to_csv(),
			"ID,File Name,Category,URL\n1,\"a, b.png\",Uncategorized,https://img/1"
		);
		let json: serde_json::Value = serde_json::from_str(&library.to_json().unwrap()).unwrap();
		assert_eq!(json[0]["fileName"], "a, b.png");
		assert_eq!(json[0]["thumbUrl"], "https://img/t/1");
	}
}
