use anyhow::{bail, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use log::debug;
use duke::tree::names::split_package;
use crate::MappingError;
use crate::remapper::ClassRemapper;
use crate::tree::collection::ClassifiedMappings;

/// Class and package renames of a paired collection, in both directions.
///
/// Implements [`ClassRemapper`] on its own, which is all that's needed for class names and descriptors.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
	to_mapped: IndexMap<String, String>,
	to_unmapped: IndexMap<String, String>,
	packages_to_mapped: IndexMap<String, String>,
	packages_to_unmapped: IndexMap<String, String>,
}

fn insert_unique(map: &mut IndexMap<String, String>, scope: &'static str, key: &str, value: &str) -> Result<()> {
	match map.entry(key.to_owned()) {
		Entry::Occupied(e) => bail!(MappingError::duplicate(scope, e.key().clone())),
		Entry::Vacant(e) => {
			e.insert(value.to_owned());
		},
	}
	Ok(())
}

impl ClassTable {
	/// Builds the table from the classes and packages of a paired collection.
	///
	/// Fails with [`MappingError::DuplicateSymbol`] if two classes share an unmapped name or a mapped name (and the
	/// same for packages).
	pub fn new(mappings: &ClassifiedMappings) -> Result<ClassTable> {
		if !mappings.is_paired() {
			bail!(MappingError::malformed("a class table needs paired mappings, project namespaced ones first"));
		}

		let mut table = ClassTable::default();
		for class in mappings.classes() {
			let unmapped = class.unmapped_name()?;
			let mapped = class.mapped_name()?;
			insert_unique(&mut table.to_mapped, "class", unmapped, mapped)?;
			insert_unique(&mut table.to_unmapped, "mapped class", mapped, unmapped)?;
		}
		for package in mappings.packages() {
			let unmapped = package.unmapped_name()?;
			let mapped = package.mapped_name()?;
			insert_unique(&mut table.packages_to_mapped, "package", unmapped, mapped)?;
			insert_unique(&mut table.packages_to_unmapped, "mapped package", mapped, unmapped)?;
		}

		debug!("built class table with {} classes and {} packages", table.to_mapped.len(), table.packages_to_mapped.len());
		Ok(table)
	}

	pub fn len(&self) -> usize {
		self.to_mapped.len()
	}

	pub fn is_empty(&self) -> bool {
		self.to_mapped.is_empty()
	}
}

fn lookup(classes: &IndexMap<String, String>, packages: &IndexMap<String, String>, class: &str) -> Option<String> {
	if let Some(name) = classes.get(class) {
		return Some(name.clone());
	}
	match split_package(class) {
		(Some(package), simple) => packages.get(package).map(|package| format!("{package}/{simple}")),
		(None, _) => None,
	}
}

impl ClassRemapper for ClassTable {
	fn map_class_fail(&self, class: &str) -> Result<Option<String>> {
		Ok(lookup(&self.to_mapped, &self.packages_to_mapped, class))
	}

	fn unmap_class_fail(&self, class: &str) -> Result<Option<String>> {
		Ok(lookup(&self.to_unmapped, &self.packages_to_unmapped, class))
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::Result;
	use crate::MappingError;
	use crate::remapper::{ClassRemapper, ClassTable};
	use crate::tree::class_mapping::ClassMapping;
	use crate::tree::collection::ClassifiedMappings;
	use crate::tree::entity::MappingEntity;

	fn table(classes: &[(&str, &str)], packages: &[(&str, &str)]) -> Result<ClassTable> {
		let mut mappings = ClassifiedMappings::paired();
		for &(unmapped, mapped) in classes {
			mappings.add_class(ClassMapping::new(MappingEntity::paired(unmapped, mapped)));
		}
		for &(unmapped, mapped) in packages {
			mappings.add_package(MappingEntity::paired(unmapped, mapped));
		}
		ClassTable::new(&mappings)
	}

	#[test]
	fn classes_and_packages() -> Result<()> {
		let table = table(&[("pkg/A", "pkg/A2"), ("pkg/B", "other/B2")], &[("pkg", "net/example")])?;
		assert_eq!(table.len(), 2);

		assert_eq!(table.map_class_name("pkg/A")?, "pkg/A2");
		assert_eq!(table.map_class_name("pkg/C")?, "net/example/C");
		assert_eq!(table.map_class_name("pkg/inner/C")?, "pkg/inner/C");
		assert_eq!(table.map_class_name("C")?, "C");
		assert_eq!(table.map_class_name("[[Lpkg/B;")?, "[[Lother/B2;");

		assert_eq!(table.unmap_class_name("other/B2")?, "pkg/B");
		assert_eq!(table.unmap_class_name("net/example/D")?, "pkg/D");
		assert_eq!(table.unmap_class_name("pkg/A")?, "pkg/A");
		Ok(())
	}

	#[test]
	fn duplicate_names() {
		let err = table(&[("pkg/X", "a/One"), ("pkg/X", "a/Two")], &[]).unwrap_err();
		assert_eq!(MappingError::find(&err), Some(&MappingError::duplicate("class", "pkg/X")));

		let err = table(&[("pkg/X", "a/Same"), ("pkg/Y", "a/Same")], &[]).unwrap_err();
		assert_eq!(MappingError::find(&err), Some(&MappingError::duplicate("mapped class", "a/Same")));

		let err = table(&[], &[("a", "b"), ("c", "b")]).unwrap_err();
		assert_eq!(MappingError::find(&err), Some(&MappingError::duplicate("mapped package", "b")));
	}

	#[test]
	fn namespaced_mappings() -> Result<()> {
		let mappings = ClassifiedMappings::namespaced(["a", "b"].try_into()?);
		let err = ClassTable::new(&mappings).unwrap_err();
		assert!(matches!(MappingError::find(&err), Some(MappingError::MalformedMapping(_))));
		Ok(())
	}
}
