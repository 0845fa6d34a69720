//! A [`SuperClassProvider`] built from the classes of a program.

use anyhow::{bail, Result};
use indexmap::{IndexMap, IndexSet};
use indexmap::map::Entry;
use log::{debug, trace};
use petgraph::Graph;
use petgraph::graph::NodeIndex;
use duke::tree::access::AccessFlags;
use duke::tree::names::is_platform_class;
use quill::MappingError;
use quill::hierarchy::{MemberKind, MemberRef, SuperClassProvider};
use quill::remapper::MemberRemapper;
use crate::relinker::relink_class;

/// A field or method as declared in a class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedMember {
	pub access: AccessFlags,
	pub name: String,
	pub desc: String,
}

impl ScannedMember {
	pub fn new(access: AccessFlags, name: impl Into<String>, desc: impl Into<String>) -> ScannedMember {
		ScannedMember { access, name: name.into(), desc: desc.into() }
	}
}

/// The parts of a class file that matter for resolving inherited members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedClass {
	pub name: String,
	/// `None` only for `java/lang/Object`.
	pub super_class: Option<String>,
	pub interfaces: Vec<String>,
	pub fields: Vec<ScannedMember>,
	pub methods: Vec<ScannedMember>,
}

impl ScannedClass {
	pub fn new(name: impl Into<String>, super_class: Option<&str>, interfaces: &[&str]) -> ScannedClass {
		ScannedClass {
			name: name.into(),
			super_class: super_class.map(str::to_owned),
			interfaces: interfaces.iter().map(|&i| i.to_owned()).collect(),
			fields: Vec::new(),
			methods: Vec::new(),
		}
	}

	pub fn with_field(mut self, field: ScannedMember) -> ScannedClass {
		self.fields.push(field);
		self
	}

	pub fn with_method(mut self, method: ScannedMember) -> ScannedClass {
		self.methods.push(method);
		self
	}

	fn members(&self, kind: MemberKind) -> &[ScannedMember] {
		match kind {
			MemberKind::Field => &self.fields,
			MemberKind::Method => &self.methods,
		}
	}
}

/// The super types and member access flags of all scanned classes.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
	classes: IndexMap<String, ScannedClass>,
	/// Super class first, then interfaces, without classes of the Java platform.
	super_classes: IndexMap<String, IndexSet<String>>,
}

impl ClassHierarchy {
	/// Fails with [`MappingError::DuplicateSymbol`] if a class is given twice.
	pub fn new(classes: impl IntoIterator<Item=ScannedClass>) -> Result<ClassHierarchy> {
		let mut hierarchy = ClassHierarchy::default();
		for class in classes {
			hierarchy.add(class)?;
		}
		debug!("scanned {} classes", hierarchy.classes.len());
		Ok(hierarchy)
	}

	pub fn add(&mut self, class: ScannedClass) -> Result<()> {
		let super_types = class.super_class.iter()
			.chain(&class.interfaces)
			.filter(|super_type| !is_platform_class(super_type))
			.cloned()
			.collect();

		match self.classes.entry(class.name.clone()) {
			Entry::Occupied(e) => bail!(MappingError::DuplicateSymbol { scope: "scanned class", key: e.key().clone() }),
			Entry::Vacant(e) => {
				self.super_classes.insert(class.name.clone(), super_types);
				e.insert(class);
			},
		}
		Ok(())
	}

	pub fn classes(&self) -> impl Iterator<Item=&ScannedClass> {
		self.classes.values()
	}

	pub fn get(&self, class: &str) -> Option<&ScannedClass> {
		self.classes.get(class)
	}

	/// Checks that no class is its own super type.
	pub fn validate(&self) -> Result<()> {
		let mut graph: Graph<&str, ()> = Graph::new();
		let mut nodes: IndexMap<&str, NodeIndex> = IndexMap::new();

		for (class, super_types) in &self.super_classes {
			let c = *nodes.entry(class.as_str())
				.or_insert_with_key(|k| graph.add_node(*k));
			for super_type in super_types {
				let s = *nodes.entry(super_type.as_str())
					.or_insert_with_key(|k| graph.add_node(*k));
				graph.add_edge(c, s, ());
			}
		}

		if let Err(cycle) = petgraph::algo::toposort(&graph, None) {
			bail!("found a loop in the class hierarchy, involving {:?}", graph[cycle.node_id()]);
		}
		Ok(())
	}

	/// Translates every class of this hierarchy with the remapper, giving the hierarchy of the remapped program.
	pub fn remap(&self, remapper: &impl MemberRemapper) -> Result<ClassHierarchy> {
		ClassHierarchy::new(
			self.classes.values()
				.map(|class| relink_class(class, remapper))
				.collect::<Result<Vec<_>>>()?
		)
	}
}

impl SuperClassProvider for ClassHierarchy {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>> {
		Ok(self.super_classes.get(class))
	}

	/// Members not declared in the class report [`AccessFlags::PUBLIC`], just like classes that weren't scanned.
	fn get_member_access(&self, class: &str, member: MemberRef<'_>) -> Result<AccessFlags> {
		let Some(scanned) = self.classes.get(class) else {
			return Ok(AccessFlags::PUBLIC);
		};

		let declared = scanned.members(member.kind).iter()
			.find(|m| m.name == member.name && m.desc == member.desc);
		match declared {
			Some(declared) => Ok(declared.access),
			None => {
				trace!("{class} doesn't declare {:?} {}{}, assuming public", member.kind, member.name, member.desc);
				Ok(AccessFlags::PUBLIC)
			},
		}
	}
}
