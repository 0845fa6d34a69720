//! The metadata that can be attached to a [`MappingEntity`].
//!
//! Each component type has one [`ComponentKind`], and an entity stores at most one component of each kind. The set of
//! components is closed: [`AnyComponent`] lists all of them.

use std::collections::BTreeMap;
use crate::tree::class_mapping::ClassId;
use crate::tree::entity::MappingEntity;
use crate::tree::names::Namespace;

/// A typed piece of metadata of a [`MappingEntity`].
///
/// This is implemented for every component type by the `components!` macro below. Don't implement it yourself.
pub trait Component: Sized + Into<AnyComponent> {
	const KIND: ComponentKind;

	fn from_any(any: &AnyComponent) -> Option<&Self>;

	fn from_any_owned(any: AnyComponent) -> Option<Self>;
}

macro_rules! components {
	(
		$(
			$( #[$doc:meta] )*
			$kind:ident
		),* $(,)?
	) => {
		/// The kinds of components, one for each component type.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
		pub enum ComponentKind {
			$( $kind, )*
		}

		impl ComponentKind {
			pub const ALL: &'static [ComponentKind] = &[ $( ComponentKind::$kind, )* ];
			pub const COUNT: usize = ComponentKind::ALL.len();

			pub(crate) fn index(self) -> usize {
				self as usize
			}
		}

		/// Any component.
		#[derive(Debug, Clone, PartialEq, Eq, Hash)]
		pub enum AnyComponent {
			$(
				$( #[$doc] )*
				$kind($kind),
			)*
		}

		impl AnyComponent {
			pub fn kind(&self) -> ComponentKind {
				match self {
					$( AnyComponent::$kind(_) => ComponentKind::$kind, )*
				}
			}
		}

		$(
			impl From<$kind> for AnyComponent {
				fn from(value: $kind) -> AnyComponent {
					AnyComponent::$kind(value)
				}
			}

			impl Component for $kind {
				const KIND: ComponentKind = ComponentKind::$kind;

				fn from_any(any: &AnyComponent) -> Option<&$kind> {
					match any {
						AnyComponent::$kind(component) => Some(component),
						#[allow(unreachable_patterns)]
						_ => None,
					}
				}

				fn from_any_owned(any: AnyComponent) -> Option<$kind> {
					match any {
						AnyComponent::$kind(component) => Some(component),
						#[allow(unreachable_patterns)]
						_ => None,
					}
				}
			}
		)*
	}
}

components! {
	/// The descriptor of a field or method, in the unmapped namespace.
	UnmappedDescriptor,
	/// The descriptor of a field or method, in the mapped namespace.
	MappedDescriptor,
	/// The descriptor of a field or method of a namespaced entity, and the namespace it's written in.
	NamespacedDescriptor,
	/// Documentation.
	Documented,
	/// The class that declares a field or method.
	Owned,
	/// Whether a method is static.
	StaticIdentifiable,
	/// The local variables (including parameters) of a method.
	LocalVariableTable,
	/// Which side a mapping applies to.
	SideSpecific,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnmappedDescriptor(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappedDescriptor(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespacedDescriptor {
	pub namespace: Namespace,
	pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Documented(pub String);

/// Points at the [`ClassMapping`][crate::tree::class_mapping::ClassMapping] declaring the member, by its position
/// in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Owned(pub ClassId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticIdentifiable(pub bool);

/// Maps local variable indices to the entities naming them.
///
/// Valid indices are `0..=255`, see [`LocalVariableTable::MAX_INDEX`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocalVariableTable(pub BTreeMap<usize, MappingEntity>);

impl LocalVariableTable {
	pub const MAX_INDEX: usize = 255;

	pub fn insert(&mut self, index: usize, entity: MappingEntity) -> Option<MappingEntity> {
		self.0.insert(index, entity)
	}

	pub fn get(&self, index: usize) -> Option<&MappingEntity> {
		self.0.get(&index)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
	Client,
	Server,
	Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SideSpecific(pub Side);
