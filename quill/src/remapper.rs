//! Remappers for remapping class names, descriptors, fields and methods.
//!
//! For remapping just classes and descriptors, you're interested in [`ClassRemapper`]. If you also want to remap
//! field names, method names and local variable names, use the [`MemberRemapper`].
//!
//! The usual implementor of both is [`Remapper`], built from a [`ClassifiedMappings`]. It resolves members that are
//! referenced on a subclass of the class declaring them with the help of a [`SuperClassProvider`].
//!
//! # What is a "remapper"?
//! A remapper answers the question for you "what is the name of X in the mapped namespace?". If there's no mapping
//! for X, the answer is X itself.

mod class_table;
mod resolve;

use std::collections::BTreeMap;
use anyhow::{bail, Context, Result};
use indexmap::{IndexMap, IndexSet};
use indexmap::map::Entry;
use log::debug;
use rayon::prelude::*;
use duke::tree::descriptor::{map_descriptor_class_names, parse_field_descriptor};
use crate::MappingError;
use crate::hierarchy::{MemberKind, SuperClassProvider};
use crate::tree::class_mapping::ClassMapping;
use crate::tree::collection::ClassifiedMappings;
use crate::tree::component::LocalVariableTable;
use crate::tree::entity::MappingEntity;

pub use class_table::ClassTable;
pub use resolve::MemberTarget;

/// A remapper supporting remapping of class names and descriptors.
pub trait ClassRemapper {
	/// Maps a class name to a new one, if the mapping exists.
	///
	/// If the mapping doesn't exist, returns `Ok(None)`.
	fn map_class_fail(&self, class: &str) -> Result<Option<String>>;

	/// The inverse of [`ClassRemapper::map_class_fail`].
	fn unmap_class_fail(&self, class: &str) -> Result<Option<String>>;

	/// Maps a class name to a new one, if the mapping doesn't exist, return the old one.
	///
	/// Array class names like `[Lpkg/A;` are mapped like field descriptors.
	///
	/// Do not implement this yourself.
	fn map_class_name(&self, class: &str) -> Result<String> {
		if class.starts_with('[') {
			return self.map_to_mapped(class);
		}
		Ok(self.map_class_fail(class)?.unwrap_or_else(|| class.to_owned()))
	}

	/// The inverse of [`ClassRemapper::map_class_name`].
	///
	/// Do not implement this yourself.
	fn unmap_class_name(&self, class: &str) -> Result<String> {
		if class.starts_with('[') {
			return self.map_to_unmapped(class);
		}
		Ok(self.unmap_class_fail(class)?.unwrap_or_else(|| class.to_owned()))
	}

	/// Maps a field descriptor (a single type) to the mapped namespace.
	///
	/// Do not implement this yourself.
	fn map_to_mapped(&self, desc: &str) -> Result<String> {
		parse_field_descriptor(desc)
			.and_then(|field_type| field_type.map_class_name(|class| self.map_class_name(class)))
			.map(|field_type| field_type.write())
			.with_context(|| MappingError::malformed(format!("can't map field descriptor {desc:?}")))
	}

	/// Maps a field descriptor (a single type) to the unmapped namespace.
	///
	/// Do not implement this yourself.
	fn map_to_unmapped(&self, desc: &str) -> Result<String> {
		parse_field_descriptor(desc)
			.and_then(|field_type| field_type.map_class_name(|class| self.unmap_class_name(class)))
			.map(|field_type| field_type.write())
			.with_context(|| MappingError::malformed(format!("can't unmap field descriptor {desc:?}")))
	}

	/// Maps a field or method descriptor to the mapped namespace.
	///
	/// Note that this relies on the fact that for non-existing class mappings class names are just copied over.
	///
	/// Do not implement this yourself.
	fn get_mapped_desc_by_unmapped_desc(&self, desc: &str) -> Result<String> {
		map_descriptor_class_names(desc, |class| self.map_class_name(class))
			.with_context(|| MappingError::malformed(format!("can't map descriptor {desc:?}")))
	}

	/// Maps a field or method descriptor to the unmapped namespace.
	///
	/// Do not implement this yourself.
	fn get_unmapped_desc_by_mapped_desc(&self, desc: &str) -> Result<String> {
		map_descriptor_class_names(desc, |class| self.unmap_class_name(class))
			.with_context(|| MappingError::malformed(format!("can't unmap descriptor {desc:?}")))
	}
}

/// A mapped member name, together with the mapped descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameAndDesc {
	pub name: String,
	pub desc: String,
}

/// A remapper supporting remapping fields, methods and local variables, as well as class names and descriptors.
///
/// If you only want to remap class names and descriptors, consider using [`ClassRemapper`] instead.
pub trait MemberRemapper: ClassRemapper {
	/// Maps a field name and field descriptor to new ones, if the mapping exists.
	///
	/// If the mapping doesn't exist, returns `Ok(None)`.
	///
	/// Note that in the `None` case you must map the field descriptor manually. See [`MemberRemapper::map_field`] for
	/// a method that just takes the old name if no mapping exist (but yet maps the field descriptor).
	fn map_field_fail(&self, owner: &str, name: &str, desc: &str) -> Result<Option<NameAndDesc>>;

	/// Maps a method name and method descriptor to new ones, if the mapping exists.
	///
	/// If the mapping doesn't exist, returns `Ok(None)`.
	fn map_method_fail(&self, owner: &str, name: &str, desc: &str) -> Result<Option<NameAndDesc>>;

	/// Maps the name of the local variable at `index` of a method. Returns `name` if there's no mapping.
	fn map_local_variable_name(&self, owner: &str, method_name: &str, method_desc: &str, index: usize, name: &str) -> Result<String>;

	/// Maps a field name and field descriptor to new ones, if the mapping doesn't exist returns the old name with a
	/// mapped descriptor.
	///
	/// Do not implement this yourself.
	fn map_field(&self, owner: &str, name: &str, desc: &str) -> Result<NameAndDesc> {
		match self.map_field_fail(owner, name, desc)? {
			Some(mapped) => Ok(mapped),
			None => Ok(NameAndDesc {
				name: name.to_owned(),
				desc: self.get_mapped_desc_by_unmapped_desc(desc)?,
			}),
		}
	}

	/// Maps a method name and method descriptor to new ones, if the mapping doesn't exist returns the old name with a
	/// mapped descriptor.
	///
	/// Do not implement this yourself.
	fn map_method(&self, owner: &str, name: &str, desc: &str) -> Result<NameAndDesc> {
		match self.map_method_fail(owner, name, desc)? {
			Some(mapped) => Ok(mapped),
			None => Ok(NameAndDesc {
				name: name.to_owned(),
				desc: self.get_mapped_desc_by_unmapped_desc(desc)?,
			}),
		}
	}

	/// Do not implement this yourself.
	fn map_field_name(&self, owner: &str, name: &str, desc: &str) -> Result<String> {
		Ok(self.map_field_fail(owner, name, desc)?.map_or_else(|| name.to_owned(), |mapped| mapped.name))
	}

	/// Do not implement this yourself.
	fn map_method_name(&self, owner: &str, name: &str, desc: &str) -> Result<String> {
		Ok(self.map_method_fail(owner, name, desc)?.map_or_else(|| name.to_owned(), |mapped| mapped.name))
	}
}

/// A member entry of a class, keyed by the unmapped name and descriptor.
#[derive(Debug, Clone)]
struct MemberEntry {
	target: MemberTarget,
	/// Index to mapped name.
	locals: BTreeMap<usize, String>,
}

/// Name, then descriptor. Entries without a descriptor use the `None` key.
type MemberTable = IndexMap<String, IndexMap<Option<String>, MemberEntry>>;

#[derive(Debug, Clone, Default)]
struct ClassMembers {
	fields: MemberTable,
	methods: MemberTable,
}

impl ClassMembers {
	fn table(&self, kind: MemberKind) -> &MemberTable {
		match kind {
			MemberKind::Field => &self.fields,
			MemberKind::Method => &self.methods,
		}
	}

	fn build(class: &ClassMapping, classes: &ClassTable) -> Result<ClassMembers> {
		let owner = class.unmapped_name()?;
		let mut members = ClassMembers::default();
		for field in class.fields() {
			insert_member(&mut members.fields, "field", owner, field, classes)?;
		}
		for method in class.methods() {
			insert_member(&mut members.methods, "method", owner, method, classes)?;
		}
		Ok(members)
	}
}

fn insert_member(table: &mut MemberTable, scope: &'static str, owner: &str, member: &MappingEntity, classes: &ClassTable) -> Result<()> {
	let name = member.unmapped_name()?;

	let (key, mapped_desc) = match (member.unmapped_descriptor(), member.mapped_descriptor()) {
		(Some(unmapped), Some(mapped)) => (Some(unmapped.to_owned()), Some(mapped.to_owned())),
		(Some(unmapped), None) => (Some(unmapped.to_owned()), Some(classes.get_mapped_desc_by_unmapped_desc(unmapped)?)),
		(None, Some(mapped)) => (Some(classes.get_unmapped_desc_by_mapped_desc(mapped)?), Some(mapped.to_owned())),
		(None, None) => (None, None),
	};

	let locals = match member.component::<LocalVariableTable>() {
		Some(LocalVariableTable(locals)) => locals.iter()
			.map(|(&index, local)| Ok((index, local.mapped_name()?.to_owned())))
			.collect::<Result<_>>()?,
		None => BTreeMap::new(),
	};

	let entry = MemberEntry {
		target: MemberTarget { name: member.mapped_name()?.to_owned(), desc: mapped_desc },
		locals,
	};

	match table.entry(name.to_owned()).or_default().entry(key) {
		Entry::Occupied(e) => {
			bail!(MappingError::duplicate(scope, format!("{owner}.{name}{}", e.key().as_deref().unwrap_or(""))));
		},
		Entry::Vacant(e) => {
			e.insert(entry);
		},
	}
	Ok(())
}

/// The symbol resolution engine: answers class, descriptor, field, method and local variable queries.
///
/// All tables are built once in [`Remapper::new`], after that the remapper is immutable and can be queried from any
/// number of threads at the same time.
///
/// Members that aren't found on the class they're referenced on are looked up in the super types, using the
/// [`SuperClassProvider`] given with [`Remapper::with_hierarchy`]. If more than one super type declares a matching
/// member, the one declared with the higher visibility (`public` or `protected`, over package private or `private`)
/// is taken. Distinct matches of the same visibility fail with [`MappingError::AmbiguousInheritance`].
pub struct Remapper<'h> {
	classes: ClassTable,
	members: IndexMap<String, ClassMembers>,
	/// The unmapped names any class maps a field with.
	field_names: IndexSet<String>,
	/// The unmapped names any class maps a method with.
	method_names: IndexSet<String>,
	hierarchy: Option<&'h (dyn SuperClassProvider + Sync)>,
}

impl std::fmt::Debug for Remapper<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Remapper")
			.field("classes", &self.classes)
			.field("members", &self.members)
			.field("hierarchy", &self.hierarchy.is_some())
			.finish_non_exhaustive()
	}
}

impl<'h> Remapper<'h> {
	/// Builds a remapper from the unmapped to the mapped names of a paired collection.
	///
	/// Fails with [`MappingError::DuplicateSymbol`] if two classes share a name, or if a class has two members with
	/// the same name and descriptor.
	pub fn new(mappings: &ClassifiedMappings) -> Result<Remapper<'h>> {
		let classes = ClassTable::new(mappings)?;

		let partials = mappings.classes().par_iter()
			.map(|class| Ok((class.unmapped_name()?, ClassMembers::build(class, &classes)?)))
			.collect::<Vec<Result<_>>>();

		let mut members = IndexMap::with_capacity(partials.len());
		let mut field_names = IndexSet::new();
		let mut method_names = IndexSet::new();
		for partial in partials {
			let (class, class_members) = partial?;
			field_names.extend(class_members.fields.keys().cloned());
			method_names.extend(class_members.methods.keys().cloned());
			members.insert(class.to_owned(), class_members);
		}

		debug!(
			"built remapper for {} classes, with {} distinct field names and {} distinct method names",
			members.len(), field_names.len(), method_names.len()
		);

		Ok(Remapper { classes, members, field_names, method_names, hierarchy: None })
	}

	/// Builds a remapper from namespace `source` to namespace `target` of a namespaced collection.
	///
	/// Descriptors are first moved into `source` with [`ClassifiedMappings::with_descriptors_in`], so they may be
	/// written in any namespace of the collection.
	pub fn from_namespaced(mappings: &ClassifiedMappings, source: &str, target: &str) -> Result<Remapper<'h>> {
		let projected = mappings.with_descriptors_in(source)?
			.project(source, target)?;
		Remapper::new(&projected)
	}

	/// Sets the provider used for looking up members in super types.
	pub fn with_hierarchy(mut self, hierarchy: &'h (dyn SuperClassProvider + Sync)) -> Remapper<'h> {
		self.set_hierarchy(hierarchy);
		self
	}

	pub fn set_hierarchy(&mut self, hierarchy: &'h (dyn SuperClassProvider + Sync)) {
		self.hierarchy = Some(hierarchy);
	}

	pub fn class_table(&self) -> &ClassTable {
		&self.classes
	}

	fn is_mapped_anywhere(&self, kind: MemberKind, name: &str) -> bool {
		match kind {
			MemberKind::Field => self.field_names.contains(name),
			MemberKind::Method => self.method_names.contains(name),
		}
	}

	fn to_name_and_desc(&self, target: MemberTarget, desc: &str) -> Result<NameAndDesc> {
		let desc = match target.desc {
			Some(desc) => desc,
			None => self.get_mapped_desc_by_unmapped_desc(desc)?,
		};
		Ok(NameAndDesc { name: target.name, desc })
	}
}

impl ClassRemapper for Remapper<'_> {
	fn map_class_fail(&self, class: &str) -> Result<Option<String>> {
		self.classes.map_class_fail(class)
	}

	fn unmap_class_fail(&self, class: &str) -> Result<Option<String>> {
		self.classes.unmap_class_fail(class)
	}
}

impl MemberRemapper for Remapper<'_> {
	fn map_field_fail(&self, owner: &str, name: &str, desc: &str) -> Result<Option<NameAndDesc>> {
		self.resolve(MemberKind::Field, owner, name, desc)?
			.map(|target| self.to_name_and_desc(target, desc))
			.transpose()
	}

	fn map_method_fail(&self, owner: &str, name: &str, desc: &str) -> Result<Option<NameAndDesc>> {
		self.resolve(MemberKind::Method, owner, name, desc)?
			.map(|target| self.to_name_and_desc(target, desc))
			.transpose()
	}

	fn map_local_variable_name(&self, owner: &str, method_name: &str, method_desc: &str, index: usize, name: &str) -> Result<String> {
		let local = match self.lookup_entry(MemberKind::Method, owner, method_name, method_desc)? {
			Some(entry) => entry.locals.get(&index),
			None => None,
		};
		Ok(local.map_or_else(|| name.to_owned(), String::clone))
	}
}
