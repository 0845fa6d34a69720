//! Indices over the classes of a [`ClassifiedMappings`][crate::tree::collection::ClassifiedMappings].
//!
//! The per class part of each index is computed in parallel, then merged in class order. Two classes claiming the
//! same key never overwrite each other, the first conflict in class order is reported as
//! [`MappingError::DuplicateSymbol`].

use anyhow::{bail, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use rayon::prelude::*;
use crate::MappingError;
use crate::tree::class_mapping::ClassMapping;
use crate::tree::entity::MappingEntity;

fn merge_in_order<'a, V>(scope: &'static str, partials: Vec<Result<(&'a str, V)>>) -> Result<IndexMap<&'a str, V>> {
	let mut map = IndexMap::with_capacity(partials.len());
	for partial in partials {
		let (key, value) = partial?;
		match map.entry(key) {
			Entry::Occupied(e) => bail!(MappingError::duplicate(scope, *e.key())),
			Entry::Vacant(e) => {
				e.insert(value);
			},
		}
	}
	Ok(map)
}

/// Indexes the fields of each class: class unmapped name, then field unmapped name.
pub fn gen_fields_by_unmapped_name_map(classes: &[ClassMapping]) -> Result<IndexMap<&str, IndexMap<&str, &MappingEntity>>> {
	let partials = classes.par_iter()
		.map(|class| Ok((class.unmapped_name()?, class.fields_by_unmapped_name()?)))
		.collect::<Vec<Result<_>>>();

	merge_in_order("class", partials)
}

pub fn gen_mappings_by_unmapped_name_map(classes: &[ClassMapping]) -> Result<IndexMap<&str, &ClassMapping>> {
	let partials = classes.par_iter()
		.map(|class| Ok((class.unmapped_name()?, class)))
		.collect::<Vec<Result<_>>>();

	merge_in_order("class", partials)
}

/// Like [`gen_mappings_by_unmapped_name_map`], but keyed by the mapped name.
///
/// Only works for paired collections, namespaced classes have no single mapped name.
pub fn gen_mappings_by_mapped_name_map(classes: &[ClassMapping]) -> Result<IndexMap<&str, &ClassMapping>> {
	let partials = classes.par_iter()
		.map(|class| Ok((class.mapped_name()?, class)))
		.collect::<Vec<Result<_>>>();

	merge_in_order("class", partials)
}
