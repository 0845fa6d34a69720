use std::collections::HashMap;
use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use pretty_assertions::assert_eq;
use duke::tree::access::AccessFlags;
use quill::MappingError;
use quill::hierarchy::{MemberKind, MemberRef, SuperClassProvider};
use quill::remapper::{ClassRemapper, MemberRemapper, NameAndDesc, Remapper};
use quill::tree::class_mapping::ClassMapping;
use quill::tree::collection::ClassifiedMappings;
use quill::tree::component::UnmappedDescriptor;
use quill::tree::entity::MappingEntity;

/// Super types, and the access of the members declared in each class.
#[derive(Default)]
struct Hierarchy {
	super_classes: IndexMap<String, IndexSet<String>>,
	access: HashMap<(String, MemberKind, String), AccessFlags>,
}

impl Hierarchy {
	fn class(mut self, name: &str, super_types: &[&str]) -> Hierarchy {
		let super_types = super_types.iter().map(|&s| s.to_owned()).collect();
		self.super_classes.insert(name.to_owned(), super_types);
		self
	}

	fn member(mut self, class: &str, kind: MemberKind, name: &str, access: AccessFlags) -> Hierarchy {
		self.access.insert((class.to_owned(), kind, name.to_owned()), access);
		self
	}
}

impl SuperClassProvider for Hierarchy {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>> {
		Ok(self.super_classes.get(class))
	}

	fn get_member_access(&self, class: &str, member: MemberRef<'_>) -> Result<AccessFlags> {
		let key = (class.to_owned(), member.kind, member.name.to_owned());
		Ok(self.access.get(&key).copied().unwrap_or(AccessFlags::PUBLIC))
	}
}

fn class(unmapped: &str, mapped: &str) -> ClassMapping {
	ClassMapping::new(MappingEntity::paired(unmapped, mapped))
}

fn member(unmapped: &str, mapped: &str, desc: &str) -> MappingEntity {
	MappingEntity::paired(unmapped, mapped)
		.with_component(UnmappedDescriptor(desc.to_owned()))
}

#[test]
fn inherited_field() -> Result<()> {
	let mut mappings = ClassifiedMappings::paired();
	let mut a = class("A", "A2");
	a.add_field(member("x", "y", "I"));
	mappings.add_class(a);
	mappings.validate()?;

	let hierarchy = Hierarchy::default()
		.class("A", &["java/lang/Object"])
		.class("B", &["A"]);
	let remapper = Remapper::new(&mappings)?.with_hierarchy(&hierarchy);

	assert_eq!(remapper.map_field_name("B", "x", "I")?, "y");
	assert_eq!(remapper.map_field_name("A", "x", "I")?, "y");
	// B itself isn't renamed
	assert_eq!(remapper.map_class_name("B")?, "B");
	Ok(())
}

#[test]
fn visibility_tie_break() -> Result<()> {
	let mut mappings = ClassifiedMappings::paired();
	let mut s = class("S", "S2");
	s.add_field(member("f", "hidden", "I"));
	mappings.add_class(s);
	let mut i = class("I", "I2");
	i.add_field(member("f", "g", "I"));
	mappings.add_class(i);

	let hierarchy = Hierarchy::default()
		.class("S", &[])
		.class("I", &[])
		.class("C", &["S", "I"])
		.class("D", &["I", "S"])
		.member("S", MemberKind::Field, "f", AccessFlags::PRIVATE)
		.member("I", MemberKind::Field, "f", AccessFlags::PUBLIC | AccessFlags::STATIC);
	let remapper = Remapper::new(&mappings)?.with_hierarchy(&hierarchy);

	assert_eq!(remapper.map_field_name("C", "f", "I")?, "g");
	assert_eq!(remapper.map_field_name("D", "f", "I")?, "g");
	Ok(())
}

#[test]
fn ambiguous_inheritance() -> Result<()> {
	let mut mappings = ClassifiedMappings::paired();
	let mut i1 = class("I1", "I1");
	i1.add_method(member("m", "first", "()V"));
	mappings.add_class(i1);
	let mut i2 = class("I2", "I2");
	i2.add_method(member("m", "second", "()V"));
	mappings.add_class(i2);

	let hierarchy = Hierarchy::default()
		.class("C", &["java/lang/Object", "I1", "I2"]);
	let remapper = Remapper::new(&mappings)?.with_hierarchy(&hierarchy);

	let err = remapper.map_method_name("C", "m", "()V").unwrap_err();
	assert_eq!(MappingError::find(&err), Some(&MappingError::AmbiguousInheritance {
		owner: "C".to_owned(),
		name: "m".to_owned(),
		desc: "()V".to_owned(),
		candidates: vec!["first()V from I1".to_owned(), "second()V from I2".to_owned()],
	}));

	// the same answer from both sides isn't ambiguous
	let mut mappings = ClassifiedMappings::paired();
	let mut i1 = class("I1", "I1");
	i1.add_method(member("m", "same", "()V"));
	mappings.add_class(i1);
	let mut i2 = class("I2", "I2");
	i2.add_method(member("m", "same", "()V"));
	mappings.add_class(i2);
	let remapper = Remapper::new(&mappings)?.with_hierarchy(&hierarchy);

	assert_eq!(remapper.map_method_name("C", "m", "()V")?, "same");
	Ok(())
}

#[test]
fn equal_results_collapse() -> Result<()> {
	let mut mappings = ClassifiedMappings::paired();
	let mut i1 = class("I1", "I1");
	// no descriptor, so it matches any
	i1.add_field(MappingEntity::paired("f", "g"));
	mappings.add_class(i1);
	let mut i2 = class("I2", "I2");
	i2.add_field(member("f", "g", "I"));
	mappings.add_class(i2);

	let hierarchy = Hierarchy::default()
		.class("C", &["java/lang/Object", "I1", "I2"]);
	let remapper = Remapper::new(&mappings)?.with_hierarchy(&hierarchy);

	assert_eq!(remapper.map_field("C", "f", "I")?, NameAndDesc { name: "g".to_owned(), desc: "I".to_owned() });
	// only I1 matches this one
	assert_eq!(remapper.map_field_name("C", "f", "J")?, "g");
	Ok(())
}

#[test]
fn diamond_and_cycles() -> Result<()> {
	let mut mappings = ClassifiedMappings::paired();
	let mut top = class("Top", "Top2");
	top.add_method(member("m", "run", "(LTop;)V"));
	mappings.add_class(top);

	// Left and Right both extend Top, Bottom extends both, and Loop points back at Bottom
	let hierarchy = Hierarchy::default()
		.class("Top", &[])
		.class("Left", &["Top"])
		.class("Right", &["Top", "Loop"])
		.class("Loop", &["Bottom"])
		.class("Bottom", &["Left", "Right"]);
	let remapper = Remapper::new(&mappings)?.with_hierarchy(&hierarchy);

	let mapped = remapper.map_method("Bottom", "m", "(LTop;)V")?;
	assert_eq!(mapped.name, "run");
	assert_eq!(mapped.desc, "(LTop2;)V");
	assert_eq!(remapper.map_method_name("Loop", "m", "(LTop;)V")?, "run");
	Ok(())
}

#[test]
fn descriptor_translation() -> Result<()> {
	let mut mappings = ClassifiedMappings::paired();
	mappings.add_class(class("pkg/A", "pkg/A2"));
	mappings.add_class(class("pkg/B", "pkg/B2"));
	let remapper = Remapper::new(&mappings)?;

	assert_eq!(remapper.get_mapped_desc_by_unmapped_desc("(Lpkg/A;)Lpkg/B;")?, "(Lpkg/A2;)Lpkg/B2;");

	for desc in ["(Lpkg/A;)Lpkg/B;", "([[Lpkg/A;IJLpkg/C;)[Lpkg/B;", "Lpkg/A;", "[[[Lpkg/B;", "()V", "(Ljava/lang/String;)Z"] {
		let mapped = remapper.get_mapped_desc_by_unmapped_desc(desc)?;
		assert_eq!(remapper.get_unmapped_desc_by_mapped_desc(&mapped)?, desc);
	}
	// nothing to rename
	assert_eq!(remapper.get_mapped_desc_by_unmapped_desc("(ILpkg/C;)[J")?, "(ILpkg/C;)[J");
	Ok(())
}

#[test]
fn duplicate_key() {
	let mut mappings = ClassifiedMappings::paired();
	mappings.add_class(class("pkg/X", "pkg/First"));
	mappings.add_class(class("pkg/X", "pkg/Second"));

	let err = Remapper::new(&mappings).unwrap_err();
	assert!(matches!(MappingError::find(&err), Some(MappingError::DuplicateSymbol { key, .. }) if key == "pkg/X"));
}

#[test]
fn unknown_symbols() -> Result<()> {
	let mut mappings = ClassifiedMappings::paired();
	let mut a = class("A", "A2");
	a.add_field(member("x", "y", "I"));
	a.add_method(member("m", "n", "()V"));
	mappings.add_class(a);

	let hierarchy = Hierarchy::default()
		.class("A", &[])
		.class("B", &["A"]);
	let remapper = Remapper::new(&mappings)?.with_hierarchy(&hierarchy);

	assert_eq!(remapper.map_field_name("B", "x", "J")?, "x");
	assert_eq!(remapper.map_field_name("B", "z", "I")?, "z");
	assert_eq!(remapper.map_method_name("B", "m", "(I)V")?, "m");
	assert_eq!(remapper.map_method_name("Unscanned", "m", "()V")?, "m");
	assert_eq!(remapper.map_method_name("B", "<init>", "()V")?, "<init>");
	Ok(())
}

#[test]
fn queries_from_many_threads() -> Result<()> {
	let mut mappings = ClassifiedMappings::paired();
	let mut expected = Vec::new();
	for i in 0..50 {
		let mut class = class(&format!("pkg/C{i}"), &format!("pkg/Mapped{i}"));
		for j in 0..20 {
			class.add_method(member(&format!("m{j}"), &format!("method_{i}_{j}"), "(I)V"));
			expected.push((format!("pkg/C{i}"), format!("m{j}"), format!("method_{i}_{j}")));
		}
		mappings.add_class(class);
	}

	let hierarchy = Hierarchy::default();
	let remapper = Remapper::new(&mappings)?.with_hierarchy(&hierarchy);

	std::thread::scope(|scope| {
		let handles: Vec<_> = (0..8)
			.map(|_| scope.spawn(|| -> Result<()> {
				for _ in 0..3 {
					for (owner, name, mapped) in &expected {
						assert_eq!(&remapper.map_method_name(owner, name, "(I)V")?, mapped);
					}
				}
				Ok(())
			}))
			.collect();

		for handle in handles {
			match handle.join() {
				Ok(result) => result?,
				Err(panic) => std::panic::resume_unwind(panic),
			}
		}
		Ok(())
	})
}
