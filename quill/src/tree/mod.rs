pub mod component;
pub mod entity;
pub mod class_mapping;
pub mod collection;
pub mod index;
mod project;

pub mod names {
	use std::fmt::{Debug, Formatter};
	use std::ops::Index;
	use anyhow::{bail, Error, Result};
	use crate::MappingError;

	/// Describes a given namespace of a namespaced mapping collection.
	///
	/// Obtained from [`Namespaces::get_namespace`], or created with [`Namespace::new`].
	#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
	pub struct Namespace(pub(crate) usize);

	impl Namespace {
		pub fn new(id: usize) -> Namespace {
			Namespace(id)
		}

		pub fn id(self) -> usize {
			self.0
		}
	}

	/// A struct storing the names of the namespaces.
	///
	/// Invariants:
	/// there are at least two namespaces, and no name is empty or repeated.
	///
	/// Implements the [Index] trait for [Namespace].
	#[derive(Clone, PartialEq, Eq, Hash)]
	pub struct Namespaces {
		names: Vec<String>,
	}

	impl Index<Namespace> for Namespaces {
		type Output = String;

		fn index(&self, index: Namespace) -> &Self::Output {
			&self.names[index.0]
		}
	}

	impl Namespaces {
		pub fn len(&self) -> usize {
			self.names.len()
		}

		pub fn names(&self) -> &[String] {
			&self.names
		}

		/// Returns the [`Namespace`] with the given name.
		pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
			for (id, namespace) in self.names.iter().enumerate() {
				if namespace == name {
					return Ok(Namespace(id))
				}
			}
			bail!(MappingError::malformed(format!("cannot find namespace with name {name:?}, only got {self:?}")));
		}

		/// Returns an error if `namespace` doesn't belong to these namespaces.
		pub fn check_namespace(&self, namespace: Namespace) -> Result<()> {
			if namespace.0 >= self.names.len() {
				bail!(MappingError::malformed(format!("namespace id {} out of range for {self:?}", namespace.0)));
			}
			Ok(())
		}

		/// Returns an error if the names of `self` aren't the names given in the argument.
		/// This can be used to check that after building mappings, you have the correct namespaces in them.
		pub fn check_that(&self, names: &[&str]) -> Result<()> {
			if self.names != names {
				bail!("expected namespaces {names:?}, got {self:?}");
			}
			Ok(())
		}
	}

	impl Debug for Namespaces {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

	impl TryFrom<Vec<String>> for Namespaces {
		type Error = Error;

		fn try_from(value: Vec<String>) -> Result<Self> {
			if value.len() < 2 {
				bail!(MappingError::malformed(format!("need at least two namespaces, got {value:?}")));
			}
			if value.iter().any(|i| i.is_empty()) {
				bail!(MappingError::malformed(format!("found empty namespace name in {value:?}, every namespace name must be non-empty")));
			}
			for (i, name) in value.iter().enumerate() {
				if value[..i].contains(name) {
					bail!(MappingError::duplicate("namespace", name.clone()));
				}
			}

			Ok(Namespaces { names: value })
		}
	}

	impl<const N: usize> TryFrom<[&str; N]> for Namespaces {
		type Error = Error;

		fn try_from(value: [&str; N]) -> Result<Self> {
			Namespaces::try_from(value.map(String::from).to_vec())
		}
	}

	/// A struct storing one optional name per namespace.
	///
	/// Implements the [Index] trait for [Namespace], indexing out of range gives `None`.
	#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
	pub struct Names {
		names: Vec<Option<String>>,
	}

	impl Index<Namespace> for Names {
		type Output = Option<String>;

		fn index(&self, index: Namespace) -> &Self::Output {
			static NO_NAME: Option<String> = None;
			self.names.get(index.0).unwrap_or(&NO_NAME)
		}
	}

	impl Names {
		pub fn len(&self) -> usize {
			self.names.len()
		}

		pub fn names(&self) -> &[Option<String>] {
			&self.names
		}

		/// Returns the name in the first namespace, which every entity must have.
		pub fn first_name(&self) -> Result<&str> {
			match self.names.first() {
				Some(Some(name)) => Ok(name),
				_ => bail!(MappingError::malformed(format!("no name for the first namespace: {self:?}"))),
			}
		}

		pub fn get(&self, namespace: Namespace) -> Option<&str> {
			self[namespace].as_deref()
		}
	}

	impl Debug for Names {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

	/// Note that empty inputs are converted into `None`.
	impl<T: Into<String>, const N: usize> From<[T; N]> for Names {
		fn from(value: [T; N]) -> Self {
			let names = value.into_iter()
				.map(Into::into)
				.map(|x: String| if x.is_empty() { None } else { Some(x) })
				.collect();

			Names { names }
		}
	}

	impl TryFrom<Vec<Option<String>>> for Names {
		type Error = Error;

		fn try_from(value: Vec<Option<String>>) -> Result<Self> {
			if value.iter().any(|i| i.as_ref().is_some_and(|i| i.is_empty())) {
				bail!(MappingError::malformed(format!("cannot create names where an existing name is an empty string: {value:?}")));
			}

			Ok(Names { names: value })
		}
	}

}
