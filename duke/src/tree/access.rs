use std::fmt::{Debug, Formatter};

/// The access flags of a field or method, as stored in the class file.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
	pub const PUBLIC: AccessFlags       = AccessFlags(0x0001);
	pub const PRIVATE: AccessFlags      = AccessFlags(0x0002);
	pub const PROTECTED: AccessFlags    = AccessFlags(0x0004);
	pub const STATIC: AccessFlags       = AccessFlags(0x0008);
	pub const FINAL: AccessFlags        = AccessFlags(0x0010);
	pub const SYNCHRONISED: AccessFlags = AccessFlags(0x0020);
	pub const VOLATILE: AccessFlags     = AccessFlags(0x0040);
	pub const BRIDGE: AccessFlags       = AccessFlags(0x0040);
	pub const TRANSIENT: AccessFlags    = AccessFlags(0x0080);
	pub const VARARGS: AccessFlags      = AccessFlags(0x0080);
	pub const NATIVE: AccessFlags       = AccessFlags(0x0100);
	pub const ABSTRACT: AccessFlags     = AccessFlags(0x0400);
	pub const STRICT: AccessFlags       = AccessFlags(0x0800);
	pub const SYNTHETIC: AccessFlags    = AccessFlags(0x1000);
	pub const ENUM: AccessFlags         = AccessFlags(0x4000);

	/// Access flags with no bit set, i.e. a package private member.
	pub const PACKAGE_PRIVATE: AccessFlags = AccessFlags(0);

	pub fn contains(self, other: AccessFlags) -> bool {
		self.0 & other.0 == other.0
	}

	pub fn is_public(self) -> bool { self.contains(AccessFlags::PUBLIC) }
	pub fn is_private(self) -> bool { self.contains(AccessFlags::PRIVATE) }
	pub fn is_protected(self) -> bool { self.contains(AccessFlags::PROTECTED) }
	pub fn is_static(self) -> bool { self.contains(AccessFlags::STATIC) }
	pub fn is_synthetic(self) -> bool { self.contains(AccessFlags::SYNTHETIC) }

	/// Orders the visibility of a member for picking between inherited members.
	///
	/// `public` and `protected` members are visible to every subclass, while package private and `private` ones
	/// may not be.
	pub fn visibility_rank(self) -> VisibilityRank {
		if self.is_public() || self.is_protected() {
			VisibilityRank::Inheritable
		} else {
			VisibilityRank::Restricted
		}
	}
}

impl std::ops::BitOr for AccessFlags {
	type Output = AccessFlags;

	fn bitor(self, rhs: AccessFlags) -> AccessFlags {
		AccessFlags(self.0 | rhs.0)
	}
}

impl From<u16> for AccessFlags {
	fn from(access_flags: u16) -> Self {
		AccessFlags(access_flags)
	}
}

impl Debug for AccessFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("AccessFlags { ")?;
		if self.is_public()                         { f.write_str("public ")?; }
		if self.is_private()                        { f.write_str("private ")?; }
		if self.is_protected()                      { f.write_str("protected ")?; }
		if self.is_static()                         { f.write_str("static ")?; }
		if self.contains(AccessFlags::FINAL)        { f.write_str("final ")?; }
		if self.contains(AccessFlags::SYNCHRONISED) { f.write_str("synchronised ")?; }
		if self.contains(AccessFlags::VOLATILE)     { f.write_str("volatile/bridge ")?; }
		if self.contains(AccessFlags::TRANSIENT)    { f.write_str("transient/varargs ")?; }
		if self.contains(AccessFlags::NATIVE)       { f.write_str("native ")?; }
		if self.contains(AccessFlags::ABSTRACT)     { f.write_str("abstract ")?; }
		if self.contains(AccessFlags::STRICT)       { f.write_str("strict ")?; }
		if self.is_synthetic()                      { f.write_str("synthetic ")?; }
		if self.contains(AccessFlags::ENUM)         { f.write_str("enum ")?; }
		f.write_str("}")
	}
}

/// How far a member is visible in subclasses. Higher is more visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisibilityRank {
	/// `private` or package private.
	Restricted,
	/// `public` or `protected`.
	Inheritable,
}
