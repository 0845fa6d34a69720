use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use duke::tree::descriptor::map_descriptor_class_names;
use duke::tree::names::{is_valid_class_name, is_valid_method_name, is_valid_unqualified_name};
use crate::MappingError;
use crate::tree::class_mapping::{ClassId, ClassMapping};
use crate::tree::component::{LocalVariableTable, MappedDescriptor, Owned, UnmappedDescriptor};
use crate::tree::entity::{EntityNames, MappingEntity};
use crate::tree::index::gen_mappings_by_unmapped_name_map;
use crate::tree::names::Namespaces;

/// All the mappings read from some mapping format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingCollection {
	/// For formats that group members by class, and may rename packages.
	Classified(ClassifiedMappings),
	/// For formats that just list entities with globally unique names.
	Unique(UniqueMappings),
}

impl MappingCollection {
	pub fn validate(&self) -> Result<()> {
		match self {
			MappingCollection::Classified(classified) => classified.validate(),
			MappingCollection::Unique(unique) => unique.validate(),
		}
	}

	pub fn namespaces(&self) -> Option<&Namespaces> {
		match self {
			MappingCollection::Classified(classified) => classified.namespaces(),
			MappingCollection::Unique(unique) => unique.namespaces(),
		}
	}
}

/// Checks that the entity has the names the collection expects, paired or with one name per namespace.
fn check_name_shape(namespaces: Option<&Namespaces>, entity: &MappingEntity) -> Result<()> {
	match (namespaces, entity.names()) {
		(None, EntityNames::Paired { .. }) => Ok(()),
		(Some(namespaces), EntityNames::Namespaced(names)) if names.len() == namespaces.len() => Ok(()),
		(namespaces, names) => {
			bail!(MappingError::malformed(format!("entity names {names:?} don't fit the namespaces {namespaces:?} of the collection")))
		},
	}
}

/// Mappings grouped by class.
///
/// Without [`Namespaces`] the collection is paired (every entity has an unmapped and a mapped name), otherwise each
/// entity has one name per namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedMappings {
	namespaces: Option<Namespaces>,
	classes: Vec<ClassMapping>,
	packages: Vec<MappingEntity>,
}

impl ClassifiedMappings {
	pub fn paired() -> ClassifiedMappings {
		ClassifiedMappings {
			namespaces: None,
			classes: Vec::new(),
			packages: Vec::new(),
		}
	}

	pub fn namespaced(namespaces: Namespaces) -> ClassifiedMappings {
		ClassifiedMappings {
			namespaces: Some(namespaces),
			classes: Vec::new(),
			packages: Vec::new(),
		}
	}

	pub fn namespaces(&self) -> Option<&Namespaces> {
		self.namespaces.as_ref()
	}

	pub fn is_paired(&self) -> bool {
		self.namespaces.is_none()
	}

	/// Adds a class, returning the id it's known under from now on.
	///
	/// The [`Owned`] components of the members of the class are updated to that id.
	pub fn add_class(&mut self, mut class: ClassMapping) -> ClassId {
		let id = ClassId(self.classes.len());
		class.set_id(id);
		self.classes.push(class);
		id
	}

	/// Adds a package rename. Packages are written with `/`, like `net/example`.
	pub fn add_package(&mut self, package: MappingEntity) {
		self.packages.push(package);
	}

	pub fn classes(&self) -> &[ClassMapping] {
		&self.classes
	}

	pub fn packages(&self) -> &[MappingEntity] {
		&self.packages
	}

	pub fn class(&self, id: ClassId) -> Option<&ClassMapping> {
		self.classes.get(id.0)
	}

	/// Returns the class declaring the given field or method.
	pub fn owner_of(&self, member: &MappingEntity) -> Result<&ClassMapping> {
		let &Owned(id) = member.get_component::<Owned>()?;
		match self.class(id) {
			Some(class) => Ok(class),
			None => bail!(MappingError::malformed(format!("owner {id:?} of {:?} isn't part of this collection", member.names()))),
		}
	}

	/// Checks every entity, that each class sits at the position its id says, and that no two classes share an
	/// unmapped name.
	pub fn validate(&self) -> Result<()> {
		for (index, class) in self.classes.iter().enumerate() {
			if class.id() != ClassId(index) {
				bail!(MappingError::malformed(format!("class {:?} at position {index} has id {:?}", class.info.names(), class.id())));
			}

			for entity in std::iter::once(&class.info).chain(class.fields()).chain(class.methods()) {
				check_name_shape(self.namespaces.as_ref(), entity)?;
			}
			class.validate()?;
		}

		for package in &self.packages {
			check_name_shape(self.namespaces.as_ref(), package)?;
			package.validate()
				.and_then(|()| package.check_names("package", is_valid_class_name))
				.context("in package mapping")?;
		}

		gen_mappings_by_unmapped_name_map(&self.classes)?;

		Ok(())
	}

	/// Swaps the unmapped and mapped names (and descriptors) of every entity of a paired collection.
	///
	/// A [`Remapper`][crate::remapper::Remapper] built from the result maps in the other direction.
	pub fn reversed(&self) -> Result<ClassifiedMappings> {
		if !self.is_paired() {
			bail!(MappingError::malformed("can only reverse paired mappings, project namespaced ones first"));
		}

		let mut reversed = ClassifiedMappings::paired();
		for class in &self.classes {
			let reversed_class = class.clone()
				.map_info(reverse_entity)?
				.map_members(|member| reverse_entity(member).map(Some))?;
			reversed.add_class(reversed_class);
		}
		for package in &self.packages {
			reversed.add_package(reverse_entity(package.clone())?);
		}
		Ok(reversed)
	}

	/// Renames classes, fields and methods using mappings with globally unique names.
	///
	/// Each entity whose mapped name is the unmapped name of an entry in `unique` gets that entry's mapped name, and
	/// mapped descriptors follow the new class names. This is what's needed to go from intermediary names to readable
	/// ones, when the readable names are given without class context. Package renames are kept as they are.
	pub fn chain(&self, unique: &UniqueMappings) -> Result<ClassifiedMappings> {
		if !self.is_paired() || unique.namespaces().is_some() {
			bail!(MappingError::malformed("can only chain paired mappings"));
		}

		let classes = unique.classes_by_unmapped_name()?;
		let fields = unique.fields_by_unmapped_name()?;
		let methods = unique.methods_by_unmapped_name()?;

		let mut chained = ClassifiedMappings::paired();
		for class in &self.classes {
			let mut chained_class = ClassMapping::new(rename_mapped(&class.info, &classes)?);
			for field in class.fields() {
				chained_class.add_field(chain_member(field, &fields, &classes)?);
			}
			for method in class.methods() {
				chained_class.add_method(chain_member(method, &methods, &classes)?);
			}
			chained.add_class(chained_class);
		}
		chained.packages = self.packages.clone();
		Ok(chained)
	}
}

fn rename_mapped(entity: &MappingEntity, by_unmapped: &IndexMap<&str, &MappingEntity>) -> Result<MappingEntity> {
	let mut entity = entity.clone();
	if let EntityNames::Paired { mapped, .. } = entity.names_mut() {
		if let Some(unique) = by_unmapped.get(mapped.as_str()) {
			*mapped = unique.mapped_name()?.to_owned();
		}
	}
	Ok(entity)
}

fn chain_member(member: &MappingEntity, by_unmapped: &IndexMap<&str, &MappingEntity>, classes: &IndexMap<&str, &MappingEntity>) -> Result<MappingEntity> {
	let mut member = rename_mapped(member, by_unmapped)?;
	if let Some(MappedDescriptor(desc)) = member.remove_component::<MappedDescriptor>() {
		let desc = map_descriptor_class_names(&desc, |class| match classes.get(class) {
			Some(unique) => Ok(unique.mapped_name()?.to_owned()),
			None => Ok(class.to_owned()),
		})?;
		member.add_component(MappedDescriptor(desc));
	}
	Ok(member)
}

fn reverse_entity(mut entity: MappingEntity) -> Result<MappingEntity> {
	let EntityNames::Paired { unmapped, mapped } = entity.names().clone() else {
		bail!(MappingError::malformed(format!("can't reverse namespaced entity {:?}", entity.names())));
	};
	*entity.names_mut() = EntityNames::Paired { unmapped: mapped, mapped: unmapped };

	let unmapped_desc = entity.remove_component::<UnmappedDescriptor>();
	let mapped_desc = entity.remove_component::<MappedDescriptor>();
	if let Some(UnmappedDescriptor(desc)) = unmapped_desc {
		entity.add_component(MappedDescriptor(desc));
	}
	if let Some(MappedDescriptor(desc)) = mapped_desc {
		entity.add_component(UnmappedDescriptor(desc));
	}
	if let Some(LocalVariableTable(locals)) = entity.remove_component::<LocalVariableTable>() {
		let locals = locals.into_iter()
			.map(|(index, local)| Ok((index, reverse_entity(local)?)))
			.collect::<Result<_>>()?;
		entity.add_component(LocalVariableTable(locals));
	}

	Ok(entity)
}

/// Mappings without class grouping, where each name is unique on its own (like `field_1234_a` style names).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueMappings {
	namespaces: Option<Namespaces>,
	pub classes: Vec<MappingEntity>,
	pub fields: Vec<MappingEntity>,
	pub methods: Vec<MappingEntity>,
}

impl UniqueMappings {
	pub fn paired() -> UniqueMappings {
		UniqueMappings::default()
	}

	pub fn namespaced(namespaces: Namespaces) -> UniqueMappings {
		UniqueMappings {
			namespaces: Some(namespaces),
			..UniqueMappings::default()
		}
	}

	pub fn namespaces(&self) -> Option<&Namespaces> {
		self.namespaces.as_ref()
	}

	pub fn validate(&self) -> Result<()> {
		for entity in self.classes.iter().chain(&self.fields).chain(&self.methods) {
			check_name_shape(self.namespaces.as_ref(), entity)?;
			entity.validate()?;
		}
		for class in &self.classes {
			class.check_names("class", is_valid_class_name)?;
		}
		for field in &self.fields {
			field.check_names("field", is_valid_unqualified_name)?;
		}
		for method in &self.methods {
			method.check_names("method", is_valid_method_name)?;
		}
		self.classes_by_unmapped_name()?;
		self.fields_by_unmapped_name()?;
		self.methods_by_unmapped_name()?;
		Ok(())
	}

	pub fn classes_by_unmapped_name(&self) -> Result<IndexMap<&str, &MappingEntity>> {
		unique_by_unmapped_name("class", &self.classes)
	}

	pub fn fields_by_unmapped_name(&self) -> Result<IndexMap<&str, &MappingEntity>> {
		unique_by_unmapped_name("field", &self.fields)
	}

	pub fn methods_by_unmapped_name(&self) -> Result<IndexMap<&str, &MappingEntity>> {
		unique_by_unmapped_name("method", &self.methods)
	}
}

fn unique_by_unmapped_name<'a>(scope: &'static str, entities: &'a [MappingEntity]) -> Result<IndexMap<&'a str, &'a MappingEntity>> {
	let mut map = IndexMap::with_capacity(entities.len());
	for entity in entities {
		match map.entry(entity.unmapped_name()?) {
			Entry::Occupied(e) => bail!(MappingError::duplicate(scope, *e.key())),
			Entry::Vacant(e) => {
				e.insert(entity);
			},
		}
	}
	Ok(map)
}
