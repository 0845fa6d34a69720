use anyhow::{bail, Context, Result};
use duke::tree::descriptor::check_descriptor;
use duke::tree::names::is_valid_unqualified_name;
use crate::MappingError;
use crate::tree::component::{AnyComponent, Component, ComponentKind, LocalVariableTable, MappedDescriptor, NamespacedDescriptor, UnmappedDescriptor};
use crate::tree::names::{Names, Namespace};

/// The names of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityNames {
	/// An unmapped and a mapped name, for formats with just two namespaces.
	Paired {
		unmapped: String,
		mapped: String,
	},
	/// A name for each namespace of the collection.
	Namespaced(Names),
}

/// A renamed symbol: a class, field, method, local variable or package, along with its components.
///
/// Equality and hashing take both the names and all components into account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingEntity {
	names: EntityNames,
	components: [Option<AnyComponent>; ComponentKind::COUNT],
}

impl MappingEntity {
	pub fn new(names: EntityNames) -> MappingEntity {
		MappingEntity {
			names,
			components: std::array::from_fn(|_| None),
		}
	}

	pub fn paired(unmapped: impl Into<String>, mapped: impl Into<String>) -> MappingEntity {
		MappingEntity::new(EntityNames::Paired { unmapped: unmapped.into(), mapped: mapped.into() })
	}

	pub fn namespaced(names: impl Into<Names>) -> MappingEntity {
		MappingEntity::new(EntityNames::Namespaced(names.into()))
	}

	pub fn names(&self) -> &EntityNames {
		&self.names
	}

	pub fn names_mut(&mut self) -> &mut EntityNames {
		&mut self.names
	}

	pub fn is_paired(&self) -> bool {
		matches!(self.names, EntityNames::Paired { .. })
	}

	/// The unmapped name. For namespaced entities this is the name in the first namespace.
	pub fn unmapped_name(&self) -> Result<&str> {
		match &self.names {
			EntityNames::Paired { unmapped, .. } => Ok(unmapped),
			EntityNames::Namespaced(names) => names.first_name(),
		}
	}

	/// The mapped name. Namespaced entities don't have one, [project][crate::tree::collection::ClassifiedMappings::project]
	/// them first.
	pub fn mapped_name(&self) -> Result<&str> {
		match &self.names {
			EntityNames::Paired { mapped, .. } => Ok(mapped),
			EntityNames::Namespaced(names) => {
				bail!(MappingError::malformed(format!("namespaced entity {names:?} has no single mapped name")))
			},
		}
	}

	/// The name in a namespace of a namespaced entity.
	pub fn name(&self, namespace: Namespace) -> Option<&str> {
		match &self.names {
			EntityNames::Paired { .. } => None,
			EntityNames::Namespaced(names) => names.get(namespace),
		}
	}

	/// Stores a component, replacing the one of the same kind if there's one.
	pub fn add_component<C: Component>(&mut self, component: C) {
		self.components[C::KIND.index()] = Some(component.into());
	}

	/// Like [`MappingEntity::add_component`], for a component whose type isn't known statically.
	pub fn add_any_component(&mut self, component: AnyComponent) {
		let index = component.kind().index();
		self.components[index] = Some(component);
	}

	/// Like [`MappingEntity::add_component`], but by value.
	pub fn with_component<C: Component>(mut self, component: C) -> MappingEntity {
		self.add_component(component);
		self
	}

	pub fn has_component<C: Component>(&self) -> bool {
		self.components[C::KIND.index()].is_some()
	}

	/// Returns the component of type `C`, if there's one.
	pub fn component<C: Component>(&self) -> Option<&C> {
		self.components[C::KIND.index()].as_ref().and_then(C::from_any)
	}

	/// Returns the component of type `C`.
	///
	/// Fails with [`MappingError::MalformedMapping`] if the entity doesn't have one.
	pub fn get_component<C: Component>(&self) -> Result<&C> {
		match self.component::<C>() {
			Some(component) => Ok(component),
			None => bail!(MappingError::malformed(format!("missing {:?} component on {:?}", C::KIND, self.names))),
		}
	}

	pub fn remove_component<C: Component>(&mut self) -> Option<C> {
		self.components[C::KIND.index()].take().and_then(C::from_any_owned)
	}

	/// Iterates over all components, in [`ComponentKind`] order.
	pub fn components(&self) -> impl Iterator<Item=&AnyComponent> {
		self.components.iter().flatten()
	}

	pub fn unmapped_descriptor(&self) -> Option<&str> {
		self.component::<UnmappedDescriptor>().map(|desc| desc.0.as_str())
	}

	pub fn mapped_descriptor(&self) -> Option<&str> {
		self.component::<MappedDescriptor>().map(|desc| desc.0.as_str())
	}

	/// Checks that each name the entity has is accepted by `is_valid`.
	///
	/// Fails with [`MappingError::MalformedMapping`] naming the first rejected name.
	pub fn check_names(&self, what: &str, is_valid: fn(&str) -> bool) -> Result<()> {
		let invalid = match &self.names {
			EntityNames::Paired { unmapped, mapped } => [unmapped, mapped].into_iter()
				.find(|name| !is_valid(name.as_str())),
			EntityNames::Namespaced(names) => names.names().iter()
				.flatten()
				.find(|name| !is_valid(name.as_str())),
		};
		if let Some(name) = invalid {
			bail!(MappingError::malformed(format!("invalid {what} name {name:?} in {:?}", self.names)));
		}
		Ok(())
	}

	/// Checks the entity and everything nested in it.
	///
	/// Names must be non-empty, namespaced entities need a name in the first namespace, descriptors must be
	/// well formed, and local variable indices must be within `0..=255`. Local variables must have valid names, the
	/// names of the entity itself are checked by its container (see [`MappingEntity::check_names`]).
	pub fn validate(&self) -> Result<()> {
		match &self.names {
			EntityNames::Paired { unmapped, mapped } => {
				if unmapped.is_empty() || mapped.is_empty() {
					bail!(MappingError::malformed(format!("empty name in {:?}", self.names)));
				}
			},
			EntityNames::Namespaced(names) => {
				if names.len() < 2 {
					bail!(MappingError::malformed(format!("namespaced entity needs at least two namespaces: {names:?}")));
				}
				names.first_name()?;
			},
		}

		for component in self.components() {
			match component {
				AnyComponent::UnmappedDescriptor(UnmappedDescriptor(desc)) |
				AnyComponent::MappedDescriptor(MappedDescriptor(desc)) |
				AnyComponent::NamespacedDescriptor(NamespacedDescriptor { desc, .. }) => {
					check_descriptor(desc)
						.map_err(|e| MappingError::malformed(format!("invalid descriptor {desc:?} on {:?}: {e:#}", self.names)))?;
				},
				AnyComponent::LocalVariableTable(LocalVariableTable(locals)) => {
					for (&index, local) in locals {
						if index > LocalVariableTable::MAX_INDEX {
							bail!(MappingError::malformed(format!(
								"local variable index {index} of {:?} is outside of 0..={}", self.names, LocalVariableTable::MAX_INDEX
							)));
						}
						local.validate()
							.and_then(|()| local.check_names("local variable", is_valid_unqualified_name))
							.with_context(|| format!("in local variable {index} of {:?}", self.names))?;
					}
				},
				_ => {},
			}
		}

		Ok(())
	}
}
