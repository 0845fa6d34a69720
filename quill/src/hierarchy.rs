//! The contract for looking up super classes and member access flags.
//!
//! A [`Remapper`][crate::remapper::Remapper] needs this for resolving members that are declared in a super class or
//! interface of the class they're referenced on.

use anyhow::Result;
use indexmap::IndexSet;
use duke::tree::access::AccessFlags;

/// Whether a member is a field or a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberKind {
	Field,
	Method,
}

/// A member of a class, identified by name and descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberRef<'a> {
	pub kind: MemberKind,
	pub name: &'a str,
	pub desc: &'a str,
}

pub trait SuperClassProvider {
	/// Returns the direct super types of a class: the super class first, then the interfaces in declaration order.
	///
	/// Classes of the Java platform aren't included. Returns `Ok(None)` if the class is unknown.
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>>;

	/// Returns the access flags the class declares the member with.
	///
	/// If the class is unknown, this returns [`AccessFlags::PUBLIC`]. If the class is known but doesn't declare the
	/// member, implementations may return an error.
	fn get_member_access(&self, class: &str, member: MemberRef<'_>) -> Result<AccessFlags>;

	/// Returns `true` if the class is known to this provider.
	fn knows_class(&self, class: &str) -> Result<bool> {
		Ok(self.get_super_classes(class)?.is_some())
	}
}

impl<S: SuperClassProvider> SuperClassProvider for Vec<S> {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>> {
		for i in self {
			if let Some(x) = i.get_super_classes(class)? {
				return Ok(Some(x));
			}
		}
		Ok(None)
	}

	fn get_member_access(&self, class: &str, member: MemberRef<'_>) -> Result<AccessFlags> {
		for i in self {
			if i.knows_class(class)? {
				return i.get_member_access(class, member);
			}
		}
		Ok(AccessFlags::PUBLIC)
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use anyhow::{bail, Result};
	use indexmap::{IndexMap, IndexSet};
	use duke::tree::access::AccessFlags;
	use crate::hierarchy::{MemberKind, MemberRef, SuperClassProvider};

	struct Fixed {
		super_classes: IndexMap<String, IndexSet<String>>,
		access: AccessFlags,
	}

	impl Fixed {
		fn new(class: &str, supers: &[&str], access: AccessFlags) -> Fixed {
			let supers = supers.iter().map(|&s| s.to_owned()).collect();
			Fixed { super_classes: IndexMap::from([(class.to_owned(), supers)]), access }
		}
	}

	impl SuperClassProvider for Fixed {
		fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>> {
			Ok(self.super_classes.get(class))
		}

		fn get_member_access(&self, class: &str, _member: MemberRef<'_>) -> Result<AccessFlags> {
			if !self.super_classes.contains_key(class) {
				bail!("asked the wrong provider about {class}");
			}
			Ok(self.access)
		}
	}

	#[test]
	fn chained_providers() -> Result<()> {
		let chain = vec![
			Fixed::new("a/B", &["a/A"], AccessFlags::PRIVATE),
			Fixed::new("a/C", &["a/B", "a/I"], AccessFlags::PROTECTED),
		];
		let field = MemberRef { kind: MemberKind::Field, name: "f", desc: "I" };

		let supers = chain.get_super_classes("a/C")?.map(|s| s.iter().map(String::as_str).collect::<Vec<_>>());
		assert_eq!(supers, Some(vec!["a/B", "a/I"]));
		assert_eq!(chain.get_super_classes("a/D")?, None);

		assert_eq!(chain.get_member_access("a/B", field)?, AccessFlags::PRIVATE);
		assert_eq!(chain.get_member_access("a/C", field)?, AccessFlags::PROTECTED);
		assert_eq!(chain.get_member_access("a/D", field)?, AccessFlags::PUBLIC);
		Ok(())
	}
}
