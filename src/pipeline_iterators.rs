use crate::pipeline::ColumnFilter;
use crate::transform::{Replacer, Transformation};
use crate::Row;
use std::collections::HashSet;

/// A row along with its position in the source table
pub type SourcedRow = (usize, Row);

pub struct MapCol<'a, I> {
	pub iterator: I,
	pub transformation: &'a Transformation,
}
impl<'a, I> Iterator for MapCol<'a, I>
where
	I: Iterator<Item = SourcedRow>,
{
	type Item = SourcedRow;

	fn next(&mut self) -> Option<Self::Item> {
		let (source, mut row) = self.iterator.next()?;
		if let Some(field) = row.get_mut(self.transformation.column_index) {
			*field = self.transformation.apply(field);
		}
		Some((source, row))
	}
}

pub struct Replace<I> {
	pub iterator: I,
	pub replacer: Replacer,
}
impl<I> Iterator for Replace<I>
where
	I: Iterator<Item = SourcedRow>,
{
	type Item = SourcedRow;

	fn next(&mut self) -> Option<Self::Item> {
		let (source, row) = self.iterator.next()?;
		let row = row
			.into_iter()
			.enumerate()
			.map(|(col, field)| self.replacer.apply(col, &field))
			.collect();
		Some((source, row))
	}
}

pub struct Trim<I> {
	pub iterator: I,
}
impl<I> Iterator for Trim<I>
where
	I: Iterator<Item = SourcedRow>,
{
	type Item = SourcedRow;

	fn next(&mut self) -> Option<Self::Item> {
		let (source, row) = self.iterator.next()?;
		Some((source, row.iter().map(|field| field.trim().to_string()).collect()))
	}
}

/// Keeps the first of every set of identical rows
pub struct Dedup<I> {
	pub iterator: I,
	pub seen: HashSet<Row>,
}
impl<I> Iterator for Dedup<I>
where
	I: Iterator<Item = SourcedRow>,
{
	type Item = SourcedRow;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let (source, row) = self.iterator.next()?;
			if self.seen.insert(row.clone()) {
				return Some((source, row));
			}
		}
	}
}

pub struct Filter<'a, I> {
	pub iterator: I,
	pub filter: &'a ColumnFilter,
}
impl<'a, I> Iterator for Filter<'a, I>
where
	I: Iterator<Item = SourcedRow>,
{
	type Item = SourcedRow;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let item = self.iterator.next()?;
			if self.filter.matches(&item.1) {
				return Some(item);
			}
		}
	}
}
