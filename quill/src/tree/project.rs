use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use duke::tree::descriptor::map_descriptor_class_names;
use crate::MappingError;
use crate::tree::class_mapping::ClassMapping;
use crate::tree::collection::ClassifiedMappings;
use crate::tree::component::{AnyComponent, LocalVariableTable, MappedDescriptor, NamespacedDescriptor, UnmappedDescriptor};
use crate::tree::entity::{EntityNames, MappingEntity};
use crate::tree::names::{Namespace, Namespaces};

impl ClassifiedMappings {
	/// Turns a namespaced collection into a paired one, mapping from the namespace `source` to `target`.
	///
	/// Entities without a name in `source` are left out (for classes, together with their members). If an entity has
	/// no name in `target`, it keeps the one from `source`. Descriptors must be written in `source` or `target`, see
	/// [`ClassifiedMappings::with_descriptors_in`] for getting them there.
	pub fn project(&self, source: &str, target: &str) -> Result<ClassifiedMappings> {
		let Some(namespaces) = self.namespaces() else {
			bail!(MappingError::malformed("can only project namespaced mappings"));
		};
		let source = namespaces.get_namespace(source)?;
		let target = namespaces.get_namespace(target)?;

		let mut projected = ClassifiedMappings::paired();
		for class in self.classes() {
			let Some(info) = project_entity(&class.info, source, target)? else {
				continue;
			};

			let mut projected_class = ClassMapping::new(info);
			for field in class.fields() {
				if let Some(field) = project_entity(field, source, target)? {
					projected_class.add_field(field);
				}
			}
			for method in class.methods() {
				if let Some(method) = project_entity(method, source, target)? {
					projected_class.add_method(method);
				}
			}
			projected.add_class(projected_class);
		}
		for package in self.packages() {
			if let Some(package) = project_entity(package, source, target)? {
				projected.add_package(package);
			}
		}

		Ok(projected)
	}

	/// Rewrites all descriptors of a namespaced collection into the given namespace.
	///
	/// Class names are translated with the classes of this collection. A class without a name in the namespace
	/// keeps its old one.
	pub fn with_descriptors_in(&self, namespace: &str) -> Result<ClassifiedMappings> {
		let Some(namespaces) = self.namespaces() else {
			bail!(MappingError::malformed("can only move descriptors of namespaced mappings"));
		};
		let to = namespaces.get_namespace(namespace)?;

		let tables = (0..namespaces.len())
			.map(|from| class_names_between(self.classes(), Namespace::new(from), to))
			.collect::<Result<Vec<_>>>()?;

		let translate = |entity: MappingEntity| -> Result<Option<MappingEntity>> {
			Ok(Some(translate_descriptor(entity, namespaces, to, &tables)?))
		};

		let mut moved = ClassifiedMappings::namespaced(namespaces.clone());
		for class in self.classes() {
			moved.add_class(class.clone().map_members(translate)?);
		}
		for package in self.packages() {
			moved.add_package(package.clone());
		}
		Ok(moved)
	}
}

fn project_entity(entity: &MappingEntity, source: Namespace, target: Namespace) -> Result<Option<MappingEntity>> {
	let EntityNames::Namespaced(names) = entity.names() else {
		bail!(MappingError::malformed(format!("can't project paired entity {:?}", entity.names())));
	};
	let Some(unmapped) = names.get(source) else {
		return Ok(None);
	};
	let mapped = names.get(target).unwrap_or(unmapped);

	let mut projected = MappingEntity::paired(unmapped, mapped);
	for component in entity.components() {
		match component {
			AnyComponent::NamespacedDescriptor(NamespacedDescriptor { namespace, desc }) => {
				if *namespace == source {
					projected.add_component(UnmappedDescriptor(desc.clone()));
				} else if *namespace == target {
					projected.add_component(MappedDescriptor(desc.clone()));
				} else {
					bail!(MappingError::malformed(format!(
						"descriptor {desc:?} of {:?} is written in namespace {namespace:?}, not in {source:?} or {target:?}", entity.names()
					)));
				}
			},
			AnyComponent::LocalVariableTable(LocalVariableTable(locals)) => {
				let mut projected_locals = LocalVariableTable::default();
				for (&index, local) in locals {
					if let Some(local) = project_entity(local, source, target)? {
						projected_locals.insert(index, local);
					}
				}
				projected.add_component(projected_locals);
			},
			AnyComponent::Owned(_) => {},
			other => projected.add_any_component(other.clone()),
		}
	}

	Ok(Some(projected))
}

/// Maps the class names in namespace `from` to the ones in `to`.
fn class_names_between(classes: &[ClassMapping], from: Namespace, to: Namespace) -> Result<IndexMap<&str, &str>> {
	let mut map = IndexMap::with_capacity(classes.len());
	for class in classes {
		let (Some(from_name), Some(to_name)) = (class.info.name(from), class.info.name(to)) else {
			continue;
		};
		match map.entry(from_name) {
			Entry::Occupied(e) => bail!(MappingError::duplicate("class", *e.key())),
			Entry::Vacant(e) => {
				e.insert(to_name);
			},
		}
	}
	Ok(map)
}

fn translate_descriptor(mut entity: MappingEntity, namespaces: &Namespaces, to: Namespace, tables: &[IndexMap<&str, &str>]) -> Result<MappingEntity> {
	let Some(NamespacedDescriptor { namespace, desc }) = entity.remove_component::<NamespacedDescriptor>() else {
		return Ok(entity);
	};
	namespaces.check_namespace(namespace)?;

	let desc = if namespace == to {
		desc
	} else {
		let table = &tables[namespace.id()];
		map_descriptor_class_names(&desc, |class| Ok(table.get(class).copied().unwrap_or(class).to_owned()))
			.with_context(|| MappingError::malformed(format!("invalid descriptor {desc:?} on {:?}", entity.names())))?
	};

	entity.add_component(NamespacedDescriptor { namespace: to, desc });
	Ok(entity)
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::Result;
	use crate::MappingError;
	use crate::tree::class_mapping::ClassMapping;
	use crate::tree::collection::ClassifiedMappings;
	use crate::tree::component::{Documented, LocalVariableTable, NamespacedDescriptor};
	use crate::tree::entity::MappingEntity;
	use crate::tree::names::{Namespace, Namespaces};

	fn sample() -> Result<ClassifiedMappings> {
		let mut mappings = ClassifiedMappings::namespaced(Namespaces::try_from(["official", "intermediary", "named"])?);

		let mut a = ClassMapping::new(MappingEntity::namespaced(["a", "class_1", "net/example/Apple"])
			.with_component(Documented("An apple.".to_owned())));
		a.add_field(MappingEntity::namespaced(["a", "field_1", "seeds"])
			.with_component(NamespacedDescriptor { namespace: Namespace::new(0), desc: "[Lb;".to_owned() }));
		let mut locals = LocalVariableTable::default();
		locals.insert(1, MappingEntity::namespaced(["", "", "banana"]));
		locals.insert(2, MappingEntity::namespaced(["x", "", "amount"]));
		a.add_method(MappingEntity::namespaced(["b", "method_2", ""])
			.with_component(NamespacedDescriptor { namespace: Namespace::new(0), desc: "(Lb;I)La;".to_owned() })
			.with_component(locals));
		mappings.add_class(a);

		mappings.add_class(ClassMapping::new(MappingEntity::namespaced(["b", "class_2", "net/example/Banana"])));
		mappings.add_class(ClassMapping::new(MappingEntity::namespaced(["", "class_3", "net/example/Cherry"])));
		mappings.add_package(MappingEntity::namespaced(["", "", "net/example"]));

		// entities without an official name don't validate, but can still be projected from another namespace
		Ok(mappings)
	}

	#[test]
	fn project() -> Result<()> {
		let projected = sample()?.project("official", "named")?;
		projected.validate()?;

		assert_eq!(projected.classes().len(), 2);
		let apple = &projected.classes()[0];
		assert_eq!(apple.unmapped_name()?, "a");
		assert_eq!(apple.mapped_name()?, "net/example/Apple");
		assert_eq!(apple.info.get_component::<Documented>()?.0, "An apple.");

		let field = &apple.fields()[0];
		assert_eq!(field.mapped_name()?, "seeds");
		assert_eq!(field.unmapped_descriptor(), Some("[Lb;"));
		assert_eq!(field.mapped_descriptor(), None);

		// no named name, so it keeps the official one
		let method = &apple.methods()[0];
		assert_eq!(method.mapped_name()?, "b");
		let locals = method.get_component::<LocalVariableTable>()?;
		assert_eq!(locals.0.len(), 1);
		assert_eq!(locals.get(2).map(|local| local.mapped_name()).transpose()?, Some("amount"));

		assert!(projected.packages().is_empty());
		Ok(())
	}

	#[test]
	fn project_descriptor_in_other_namespace() -> Result<()> {
		let err = sample()?.project("intermediary", "named").unwrap_err();
		assert!(matches!(MappingError::find(&err), Some(MappingError::MalformedMapping(_))));
		Ok(())
	}

	#[test]
	fn project_paired() {
		let err = ClassifiedMappings::paired().project("a", "b").unwrap_err();
		assert!(matches!(MappingError::find(&err), Some(MappingError::MalformedMapping(_))));
	}

	#[test]
	fn with_descriptors_in() -> Result<()> {
		let moved = sample()?.with_descriptors_in("intermediary")?;

		let apple = &moved.classes()[0];
		assert_eq!(
			apple.methods()[0].get_component::<NamespacedDescriptor>()?,
			&NamespacedDescriptor { namespace: Namespace::new(1), desc: "(Lclass_2;I)Lclass_1;".to_owned() }
		);

		let projected = moved.project("intermediary", "named")?;
		projected.validate()?;
		assert_eq!(projected.classes()[2].mapped_name()?, "net/example/Cherry");
		let field = &projected.classes()[0].fields()[0];
		assert_eq!(field.unmapped_name()?, "field_1");
		assert_eq!(field.unmapped_descriptor(), Some("[Lclass_2;"));
		Ok(())
	}
}
