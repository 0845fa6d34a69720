//! Turning mapping collections into remappers, and applying them to scanned classes.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use quill::MappingError;
use quill::hierarchy::SuperClassProvider;
use quill::remapper::{MemberRemapper, NameAndDesc, Remapper};
use quill::tree::collection::MappingCollection;
use crate::hierarchy::{ScannedClass, ScannedMember};

/// Which way to apply a mapping collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	UnmappedToMapped,
	MappedToUnmapped,
}

/// Validates the collection and builds a remapper applying it in the given direction.
///
/// A namespaced collection maps from its first to its last namespace. [`MappingCollection::Unique`] has no class
/// context to resolve members with, [chain][quill::tree::collection::ClassifiedMappings::chain] it onto a classified collection first.
pub fn build_remapper<'h>(
	mappings: &MappingCollection,
	direction: Direction,
	hierarchy: Option<&'h (dyn SuperClassProvider + Sync)>,
) -> Result<Remapper<'h>> {
	let MappingCollection::Classified(classified) = mappings else {
		bail!(MappingError::MalformedMapping("unique mappings can't be used on their own, chain them onto classified mappings".to_owned()));
	};
	classified.validate()
		.context("invalid mappings")?;

	let paired = match classified.namespaces() {
		None => classified.clone(),
		Some(namespaces) => {
			let names = namespaces.names();
			let (source, target) = (&names[0], &names[names.len() - 1]);
			debug!("projecting mappings from {source:?} to {target:?}");
			classified.with_descriptors_in(source)?
				.project(source, target)?
		},
	};
	let paired = match direction {
		Direction::UnmappedToMapped => paired,
		Direction::MappedToUnmapped => paired.reversed()?,
	};

	let mut remapper = Remapper::new(&paired)?;
	if let Some(hierarchy) = hierarchy {
		remapper.set_hierarchy(hierarchy);
	}

	info!("built remapper ({direction:?}) for {} classes", paired.classes().len());
	Ok(remapper)
}

fn relink_member(member: &ScannedMember, mapped: NameAndDesc) -> ScannedMember {
	ScannedMember { access: member.access, name: mapped.name, desc: mapped.desc }
}

/// Renames a class, its super types and its members.
pub fn relink_class(class: &ScannedClass, remapper: &impl MemberRemapper) -> Result<ScannedClass> {
	let owner = class.name.as_str();

	let fields = class.fields.iter()
		.map(|field| {
			let mapped = remapper.map_field(owner, &field.name, &field.desc)
				.with_context(|| format!("failed to relink field {owner}.{}:{}", field.name, field.desc))?;
			Ok(relink_member(field, mapped))
		})
		.collect::<Result<_>>()?;
	let methods = class.methods.iter()
		.map(|method| {
			let mapped = remapper.map_method(owner, &method.name, &method.desc)
				.with_context(|| format!("failed to relink method {owner}.{}{}", method.name, method.desc))?;
			Ok(relink_member(method, mapped))
		})
		.collect::<Result<_>>()?;

	Ok(ScannedClass {
		name: remapper.map_class_name(owner)?,
		super_class: class.super_class.as_deref().map(|super_class| remapper.map_class_name(super_class)).transpose()?,
		interfaces: class.interfaces.iter()
			.map(|interface| remapper.map_class_name(interface))
			.collect::<Result<_>>()?,
		fields,
		methods,
	})
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::Result;
	use duke::tree::access::AccessFlags;
	use quill::MappingError;
	use quill::remapper::ClassRemapper;
	use quill::tree::class_mapping::ClassMapping;
	use quill::tree::collection::{ClassifiedMappings, MappingCollection, UniqueMappings};
	use quill::tree::component::{NamespacedDescriptor, UnmappedDescriptor};
	use quill::tree::entity::MappingEntity;
	use quill::tree::names::{Namespace, Namespaces};
	use crate::hierarchy::{ScannedClass, ScannedMember};
	use crate::relinker::{build_remapper, relink_class, Direction};

	fn paired() -> MappingCollection {
		let mut mappings = ClassifiedMappings::paired();
		let mut a = ClassMapping::new(MappingEntity::paired("a", "pkg/Apple"));
		a.add_method(MappingEntity::paired("b", "eat").with_component(UnmappedDescriptor("(La;)V".to_owned())));
		mappings.add_class(a);
		MappingCollection::Classified(mappings)
	}

	#[test]
	fn directions() -> Result<()> {
		let remapper = build_remapper(&paired(), Direction::UnmappedToMapped, None)?;
		assert_eq!(remapper.map_class_name("a")?, "pkg/Apple");

		let remapper = build_remapper(&paired(), Direction::MappedToUnmapped, None)?;
		assert_eq!(remapper.map_class_name("pkg/Apple")?, "a");
		Ok(())
	}

	#[test]
	fn namespaced() -> Result<()> {
		let mut mappings = ClassifiedMappings::namespaced(Namespaces::try_from(["official", "intermediary", "named"])?);
		let mut a = ClassMapping::new(MappingEntity::namespaced(["a", "class_1", "pkg/Apple"]));
		a.add_field(MappingEntity::namespaced(["b", "field_1", "seeds"])
			.with_component(NamespacedDescriptor { namespace: Namespace::new(0), desc: "La;".to_owned() }));
		mappings.add_class(a);

		let remapper = build_remapper(&MappingCollection::Classified(mappings), Direction::UnmappedToMapped, None)?;
		let relinked = relink_class(&ScannedClass::new("a", Some("java/lang/Object"), &[])
			.with_field(ScannedMember::new(AccessFlags::PRIVATE, "b", "La;")), &remapper)?;

		assert_eq!(relinked, ScannedClass::new("pkg/Apple", Some("java/lang/Object"), &[])
			.with_field(ScannedMember::new(AccessFlags::PRIVATE, "seeds", "Lpkg/Apple;")));
		Ok(())
	}

	#[test]
	fn unique_and_invalid() {
		let err = build_remapper(&MappingCollection::Unique(UniqueMappings::paired()), Direction::UnmappedToMapped, None).unwrap_err();
		assert!(matches!(MappingError::find(&err), Some(MappingError::MalformedMapping(_))));

		let mut mappings = ClassifiedMappings::paired();
		mappings.add_class(ClassMapping::new(MappingEntity::paired("a", "One")));
		mappings.add_class(ClassMapping::new(MappingEntity::paired("a", "Two")));
		let err = build_remapper(&MappingCollection::Classified(mappings), Direction::UnmappedToMapped, None).unwrap_err();
		assert!(matches!(MappingError::find(&err), Some(MappingError::DuplicateSymbol { .. })));
	}
}
