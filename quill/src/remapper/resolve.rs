//! Resolving members through the super types of a class.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use anyhow::{bail, Result};
use log::trace;
use rayon::prelude::*;
use duke::tree::access::VisibilityRank;
use duke::tree::names::{is_initializer, is_platform_class};
use crate::MappingError;
use crate::hierarchy::{MemberKind, MemberRef, SuperClassProvider};
use crate::remapper::{MemberEntry, NameAndDesc, Remapper};

/// What a member is mapped to: the mapped name, and the mapped descriptor if the mappings give one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberTarget {
	pub name: String,
	pub desc: Option<String>,
}

/// The mappings found in the super types of a class, for one member.
///
/// Only the candidates of the highest visibility are kept. Merging is commutative and associative, so the order the
/// super types are searched in doesn't change the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Candidates {
	/// `None` if there are no candidates.
	rank: Option<VisibilityRank>,
	/// Each target, with the classes declaring it.
	targets: BTreeMap<MemberTarget, BTreeSet<String>>,
}

impl Candidates {
	pub(crate) fn single(rank: VisibilityRank, target: MemberTarget, declaring_class: &str) -> Candidates {
		Candidates {
			rank: Some(rank),
			targets: BTreeMap::from([(target, BTreeSet::from([declaring_class.to_owned()]))]),
		}
	}

	pub(crate) fn merge(mut self, other: Candidates) -> Candidates {
		match self.rank.cmp(&other.rank) {
			Ordering::Greater => self,
			Ordering::Less => other,
			Ordering::Equal => {
				for (target, classes) in other.targets {
					self.targets.entry(target).or_default().extend(classes);
				}
				self
			},
		}
	}

	/// Picks the one remaining target, failing if there's more than one.
	fn into_target(self, owner: &str, name: &str, desc: &str) -> Result<Option<MemberTarget>> {
		if self.targets.len() > 1 {
			let candidates = self.targets.iter()
				.map(|(target, classes)| {
					let classes: Vec<&str> = classes.iter().map(String::as_str).collect();
					format!("{}{} from {}", target.name, target.desc.as_deref().unwrap_or(""), classes.join(", "))
				})
				.collect();
			bail!(MappingError::AmbiguousInheritance {
				owner: owner.to_owned(),
				name: name.to_owned(),
				desc: desc.to_owned(),
				candidates,
			});
		}
		Ok(self.targets.into_keys().next())
	}
}

impl Remapper<'_> {
	/// Looks up the member in the mappings of exactly the given class.
	///
	/// Fields without a descriptor match any descriptor. A method without a descriptor can't be told apart from its
	/// overloads, so running into one is an error.
	pub(super) fn lookup_entry(&self, kind: MemberKind, class: &str, name: &str, desc: &str) -> Result<Option<&MemberEntry>> {
		let Some(by_desc) = self.members.get(class).and_then(|members| members.table(kind).get(name)) else {
			return Ok(None);
		};

		if let Some(entry) = by_desc.get(&Some(desc.to_owned())) {
			return Ok(Some(entry));
		}
		match (kind, by_desc.get(&None)) {
			(MemberKind::Field, entry) => Ok(entry),
			(MemberKind::Method, Some(_)) => {
				bail!(MappingError::malformed(format!("method {class}.{name} is mapped without a descriptor, can't match it against {desc:?}")))
			},
			(MemberKind::Method, None) => Ok(None),
		}
	}

	/// Finds the target of a member referenced on `owner`, either declared there or inherited.
	pub(super) fn resolve(&self, kind: MemberKind, owner: &str, name: &str, desc: &str) -> Result<Option<MemberTarget>> {
		if is_initializer(name) {
			return Ok(None);
		}
		if let Some(entry) = self.lookup_entry(kind, owner, name, desc)? {
			return Ok(Some(entry.target.clone()));
		}
		if !self.is_mapped_anywhere(kind, name) {
			return Ok(None);
		}

		let Some(hierarchy) = self.hierarchy else {
			bail!(MappingError::MissingCollaborator {
				owner: owner.to_owned(),
				name: name.to_owned(),
				desc: desc.to_owned(),
			});
		};

		trace!("searching super types of {owner} for {kind:?} {name}{desc}");
		let member = MemberRef { kind, name, desc };
		self.search_super_types(hierarchy, owner, member, &[owner])?
			.into_target(owner, name, desc)
	}

	/// Searches the direct super types of `class` in parallel, merging what they find.
	///
	/// `path` holds the classes between the queried class and `class`, including both. Super types already on it are
	/// skipped, which cuts cycles.
	fn search_super_types(&self, hierarchy: &(dyn SuperClassProvider + Sync), class: &str, member: MemberRef<'_>, path: &[&str]) -> Result<Candidates> {
		let Some(super_types) = hierarchy.get_super_classes(class)? else {
			return Ok(Candidates::default());
		};

		let partials = super_types.par_iter()
			.filter(|super_type| !is_platform_class(super_type) && !path.contains(&super_type.as_str()))
			.map(|super_type| self.search_super_type(hierarchy, super_type, member, path))
			.collect::<Vec<Result<_>>>();

		partials.into_iter()
			.try_fold(Candidates::default(), |candidates, partial| Ok(candidates.merge(partial?)))
	}

	/// Fills in the mapped descriptor of a target mapped without one, so that equal results compare equal.
	fn with_mapped_desc(&self, target: MemberTarget, desc: &str) -> Result<MemberTarget> {
		let NameAndDesc { name, desc } = self.to_name_and_desc(target, desc)?;
		Ok(MemberTarget { name, desc: Some(desc) })
	}

	fn search_super_type(&self, hierarchy: &(dyn SuperClassProvider + Sync), super_type: &str, member: MemberRef<'_>, path: &[&str]) -> Result<Candidates> {
		match self.lookup_entry(member.kind, super_type, member.name, member.desc)? {
			Some(entry) => {
				let target = self.with_mapped_desc(entry.target.clone(), member.desc)?;
				let access = hierarchy.get_member_access(super_type, member)?;
				trace!("found {:?} {}{} in {super_type} as {target:?}, declared {access:?}", member.kind, member.name, member.desc);
				Ok(Candidates::single(access.visibility_rank(), target, super_type))
			},
			None => {
				let mut path = path.to_vec();
				path.push(super_type);
				self.search_super_types(hierarchy, super_type, member, &path)
			},
		}
	}
}
