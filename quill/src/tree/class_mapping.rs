use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use duke::tree::names::{is_valid_class_name, is_valid_method_name, is_valid_unqualified_name};
use crate::MappingError;
use crate::tree::component::Owned;
use crate::tree::entity::MappingEntity;

/// The position of a [`ClassMapping`] in its [collection][crate::tree::collection::ClassifiedMappings].
///
/// Members refer to their class with this id (in the [`Owned`] component) instead of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) usize);

impl ClassId {
	pub fn index(self) -> usize {
		self.0
	}
}

/// A class, along with the fields and methods it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapping {
	id: ClassId,
	pub info: MappingEntity,
	fields: Vec<MappingEntity>,
	methods: Vec<MappingEntity>,
}

impl ClassMapping {
	/// Creates a class mapping that isn't part of a collection yet.
	///
	/// Adding it to a collection assigns it the real id, see
	/// [`ClassifiedMappings::add_class`][crate::tree::collection::ClassifiedMappings::add_class].
	pub fn new(info: MappingEntity) -> ClassMapping {
		ClassMapping {
			id: ClassId(0),
			info,
			fields: Vec::new(),
			methods: Vec::new(),
		}
	}

	pub fn id(&self) -> ClassId {
		self.id
	}

	/// Moves the class to another id, updating the [`Owned`] component of all members.
	pub(crate) fn set_id(&mut self, id: ClassId) {
		self.id = id;
		for member in self.fields.iter_mut().chain(self.methods.iter_mut()) {
			member.add_component(Owned(id));
		}
	}

	pub fn unmapped_name(&self) -> Result<&str> {
		self.info.unmapped_name()
	}

	pub fn mapped_name(&self) -> Result<&str> {
		self.info.mapped_name()
	}

	pub fn fields(&self) -> &[MappingEntity] {
		&self.fields
	}

	pub fn methods(&self) -> &[MappingEntity] {
		&self.methods
	}

	/// Appends a field, marking this class as its owner.
	pub fn add_field(&mut self, mut field: MappingEntity) -> &mut MappingEntity {
		field.add_component(Owned(self.id));
		self.fields.push(field);
		let last = self.fields.len() - 1;
		&mut self.fields[last]
	}

	/// Appends a method, marking this class as its owner.
	pub fn add_method(&mut self, mut method: MappingEntity) -> &mut MappingEntity {
		method.add_component(Owned(self.id));
		self.methods.push(method);
		let last = self.methods.len() - 1;
		&mut self.methods[last]
	}

	pub(crate) fn map_info(self, f: impl FnOnce(MappingEntity) -> Result<MappingEntity>) -> Result<ClassMapping> {
		Ok(ClassMapping { info: f(self.info)?, ..self })
	}

	pub(crate) fn map_members(self, mut f: impl FnMut(MappingEntity) -> Result<Option<MappingEntity>>) -> Result<ClassMapping> {
		let fields = self.fields.into_iter()
			.map(&mut f)
			.filter_map(Result::transpose)
			.collect::<Result<_>>()?;
		let methods = self.methods.into_iter()
			.map(&mut f)
			.filter_map(Result::transpose)
			.collect::<Result<_>>()?;

		Ok(ClassMapping { id: self.id, info: self.info, fields, methods })
	}

	/// Builds an index from the unmapped name of each field to the field.
	///
	/// Fails with [`MappingError::DuplicateSymbol`] if two fields share an unmapped name.
	pub fn fields_by_unmapped_name(&self) -> Result<IndexMap<&str, &MappingEntity>> {
		let mut map = IndexMap::with_capacity(self.fields.len());
		for field in &self.fields {
			match map.entry(field.unmapped_name()?) {
				Entry::Occupied(e) => {
					bail!(MappingError::duplicate("field", format!("{}.{}", self.unmapped_name()?, e.key())));
				},
				Entry::Vacant(e) => {
					e.insert(field);
				},
			}
		}
		Ok(map)
	}

	/// Checks the class entity, each member, and that each member is [owned][Owned] by this class.
	///
	/// Class names must be valid binary names, field names unqualified names, and method names valid method names
	/// (see JVMS 4.2).
	pub fn validate(&self) -> Result<()> {
		self.info.validate()?;
		self.info.check_names("class", is_valid_class_name)?;
		for field in &self.fields {
			field.check_names("field", is_valid_unqualified_name)
				.with_context(|| format!("in class {:?}", self.info.names()))?;
		}
		for method in &self.methods {
			method.check_names("method", is_valid_method_name)
				.with_context(|| format!("in class {:?}", self.info.names()))?;
		}

		for member in self.fields.iter().chain(self.methods.iter()) {
			member.validate()
				.with_context(|| format!("in class {:?}", self.info.names()))?;

			match member.component::<Owned>() {
				None => bail!(MappingError::malformed(format!("member {:?} of class {:?} has no owner", member.names(), self.info.names()))),
				Some(&Owned(owner)) if owner != self.id => {
					bail!(MappingError::malformed(format!(
						"member {:?} of class {:?} (id {:?}) claims to be owned by {owner:?}", member.names(), self.info.names(), self.id
					)));
				},
				Some(_) => {},
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::Result;
	use crate::MappingError;
	use crate::tree::class_mapping::{ClassId, ClassMapping};
	use crate::tree::component::{Owned, UnmappedDescriptor};
	use crate::tree::entity::MappingEntity;

	#[test]
	fn add_members_sets_owner() -> Result<()> {
		let mut class = ClassMapping::new(MappingEntity::paired("a", "Apple"));
		class.add_field(MappingEntity::paired("b", "seeds"));
		class.add_method(MappingEntity::paired("c", "eat"))
			.add_component(UnmappedDescriptor("()V".to_owned()));

		assert_eq!(class.fields()[0].get_component::<Owned>()?, &Owned(class.id()));
		assert_eq!(class.methods()[0].get_component::<Owned>()?, &Owned(class.id()));
		class.validate()?;

		class.set_id(ClassId(3));
		assert_eq!(class.methods()[0].get_component::<Owned>()?, &Owned(ClassId(3)));
		class.validate()?;
		Ok(())
	}

	#[test]
	fn validate_foreign_owner() {
		let mut class = ClassMapping::new(MappingEntity::paired("a", "Apple"));
		class.add_field(MappingEntity::paired("b", "seeds"))
			.add_component(Owned(ClassId(1)));

		let err = class.validate().unwrap_err();
		assert!(matches!(MappingError::find(&err), Some(MappingError::MalformedMapping(_))));
	}

	#[test]
	fn validate_missing_owner() {
		let mut class = ClassMapping::new(MappingEntity::paired("a", "Apple"));
		class.add_field(MappingEntity::paired("b", "seeds"))
			.remove_component::<Owned>();

		assert!(class.validate().is_err());
	}

	#[test]
	fn validate_names() -> Result<()> {
		let mut class = ClassMapping::new(MappingEntity::paired("a", "net/example/Apple"));
		class.add_field(MappingEntity::paired("b", "seeds"));
		class.add_method(MappingEntity::paired("<init>", "<init>"));
		class.validate()?;

		let class = ClassMapping::new(MappingEntity::paired("a", "net.example.Apple"));
		assert!(class.validate().is_err());

		let mut class = ClassMapping::new(MappingEntity::paired("a", "Apple"));
		class.add_field(MappingEntity::paired("b", "see;ds"));
		let err = class.validate().unwrap_err();
		assert!(matches!(MappingError::find(&err), Some(MappingError::MalformedMapping(_))));

		let mut class = ClassMapping::new(MappingEntity::paired("a", "Apple"));
		class.add_method(MappingEntity::paired("c", "<eat>"));
		let err = class.validate().unwrap_err();
		assert!(matches!(MappingError::find(&err), Some(MappingError::MalformedMapping(_))));
		Ok(())
	}

	#[test]
	fn fields_by_unmapped_name() -> Result<()> {
		let mut class = ClassMapping::new(MappingEntity::paired("a", "Apple"));
		class.add_field(MappingEntity::paired("b", "seeds"));
		class.add_field(MappingEntity::paired("c", "core"));

		let map = class.fields_by_unmapped_name()?;
		assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["b", "c"]);
		assert_eq!(map["c"].mapped_name()?, "core");

		class.add_field(MappingEntity::paired("b", "stem"));
		let err = class.fields_by_unmapped_name().unwrap_err();
		assert_eq!(MappingError::find(&err), Some(&MappingError::duplicate("field", "a.b")));
		Ok(())
	}
}
