//! Validity checks and well known names, see JVMS 4.2.

/// The name of instance initialization methods.
pub const INIT: &str = "<init>";
/// The name of the class initialization method.
pub const CLINIT: &str = "<clinit>";
/// The internal name of `java.lang.Object`.
pub const JAVA_LANG_OBJECT: &str = "java/lang/Object";

/// Packages whose classes belong to the platform, and are never part of a mapping set.
const PLATFORM_PACKAGES: [&str; 3] = ["java/", "javax/", "jdk/"];

/// Checks if a class name is valid according to JVMS 4.2.1 (also accepting array class names).
pub fn is_valid_class_name(x: &str) -> bool {
	if x.starts_with('[') {
		// an array class name is a field descriptor
		crate::tree::descriptor::parse_field_descriptor(x).is_ok()
	} else {
		// a list of identifiers split by /
		// each identifier must be an unqualified name
		x.split('/').all(is_valid_unqualified_name)
	}
}

/// Checks if a name is an unqualified name according to JVMS 4.2.2
///
/// This is used for field names, formal parameter names, local variable names.
pub fn is_valid_unqualified_name(x: &str) -> bool {
	// must contain at least one unicode codepoint
	!x.is_empty() &&
		// must not contain any of . ; [ /
		x.chars().all(|c| !matches!(c, '.' | ';' | '[' | '/'))
}

/// Checks if a method name is valid according to JVMS 4.2.2
pub fn is_valid_method_name(x: &str) -> bool {
	// either one of the special names or an unqualified name with special < > restriction
	is_initializer(x) || (
		!x.is_empty() &&
			x.chars().all(|c| !matches!(c, '.' | ';' | '[' | '/' | '<' | '>'))
	)
}

/// Returns `true` for `<init>` and `<clinit>`. These names are fixed by the JVM and never get renamed.
pub fn is_initializer(x: &str) -> bool {
	x == INIT || x == CLINIT
}

/// Returns `true` if the class is part of the Java platform (`java/`, `javax/`, `jdk/`).
pub fn is_platform_class(x: &str) -> bool {
	PLATFORM_PACKAGES.iter().any(|package| x.starts_with(package))
}

/// Splits a class name into package and simple name.
///
/// ```
/// use duke::tree::names::split_package;
/// assert_eq!(split_package("java/lang/Object"), (Some("java/lang"), "Object"));
/// assert_eq!(split_package("Main"), (None, "Main"));
/// ```
pub fn split_package(x: &str) -> (Option<&str>, &str) {
	match x.rsplit_once('/') {
		Some((package, simple)) => (Some(package), simple),
		None => (None, x),
	}
}
