use std::iter::Peekable;
use std::str::Chars;
use anyhow::{anyhow, bail, Context, Result};

/// Represents a type.
///
/// In case of an array, use the [`Type::Array`] variant.
///
/// ```
/// use duke::tree::descriptor::{ArrayType, Type};
///
/// // the type of a java `int`
/// let int_type = Type::I;
///
/// // the type of a java `int[][]`
/// let int_array_type = Type::Array(2, ArrayType::I);
///
/// assert_ne!(int_type, int_array_type);
/// ```
///
/// Note: you should never construct the [`Type::Array`] variant with a dimension
/// of zero, as the [`Eq`] and [`PartialEq`] implementations don't respect that.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Type {
	/// A `byte`. In rust, this is a `i8`.
	B,
	/// A `char`.
	C,
	/// A `double`. In rust, this is a `f64`.
	D,
	/// A `float`. In rust, this is a `f32`.
	F,
	/// An `int`. In rust, this is a `i32`.
	I,
	/// A `long`. In rust, this is a `i64`.
	J,
	/// A `short`. In rust, this is a `i16`.
	S,
	/// A `boolean`. In rust, this is a `bool`.
	Z,
	/// An instance of the class with the given internal name.
	Object(String),
	/// An array type, represented by the dimension and the inner [`ArrayType`].
	Array(u8, ArrayType),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ArrayType {
	B,
	C,
	D,
	F,
	I,
	J,
	S,
	Z,
	Object(String),
}

impl Type {
	/// Returns the class name this type refers to, if it's an object or an array of objects.
	pub fn class_name(&self) -> Option<&str> {
		match self {
			Type::Object(class_name) | Type::Array(_, ArrayType::Object(class_name)) => Some(class_name),
			_ => None,
		}
	}

	/// Replaces the class name of an object or object array type using `f`.
	///
	/// Primitive types and the array dimension are kept as they are.
	pub fn map_class_name(self, f: impl FnOnce(&str) -> Result<String>) -> Result<Type> {
		Ok(match self {
			Type::Object(class_name) => Type::Object(f(&class_name)?),
			Type::Array(dimension, ArrayType::Object(class_name)) => Type::Array(dimension, ArrayType::Object(f(&class_name)?)),
			primitive => primitive,
		})
	}

	/// Writes this type as a field descriptor.
	///
	/// The inverse of this function is [`parse_field_descriptor`].
	///
	/// ```
	/// use duke::tree::descriptor::{ArrayType, Type};
	/// assert_eq!(Type::Array(3, ArrayType::D).write(), "[[[D");
	/// assert_eq!(Type::Object("java/lang/Object".to_owned()).write(), "Ljava/lang/Object;");
	/// ```
	pub fn write(&self) -> String {
		let mut s = String::new();
		write_field_type(self, &mut s);
		s
	}
}

// The grammar for descriptors is:
//   FieldDescriptor:
//     FieldType
//
//   MethodDescriptor:
//     "(" FieldType* ")" ReturnDescriptor
//
//   ReturnDescriptor:
//     FieldType | "V"
//
//   FieldType:
//     "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" |
//     "L" ClassName ";" |
//     "[" FieldType
fn read_field_type(chars: &mut Peekable<Chars>) -> Result<Type> {
	let mut array_dimension: u8 = 0;
	while chars.next_if_eq(&'[').is_some() {
		array_dimension = array_dimension.checked_add(1)
			.context("array descriptor with more than 255 dimensions")?;
	}

	let char = chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of descriptor"))?;
	let array_type = match char {
		'B' => ArrayType::B,
		'C' => ArrayType::C,
		'D' => ArrayType::D,
		'F' => ArrayType::F,
		'I' => ArrayType::I,
		'J' => ArrayType::J,
		'S' => ArrayType::S,
		'Z' => ArrayType::Z,
		'L' => {
			let mut s = String::new();

			let mut char = chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of descriptor"))?;
			while char != ';' {
				s.push(char);

				char = chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of descriptor"))?;
			}
			if s.is_empty() {
				bail!("empty class name in descriptor");
			}

			ArrayType::Object(s)
		},
		x => {
			bail!("unexpected char {x:?} in descriptor");
		},
	};

	if array_dimension == 0 {
		Ok(match array_type {
			ArrayType::B => Type::B,
			ArrayType::C => Type::C,
			ArrayType::D => Type::D,
			ArrayType::F => Type::F,
			ArrayType::I => Type::I,
			ArrayType::J => Type::J,
			ArrayType::S => Type::S,
			ArrayType::Z => Type::Z,
			ArrayType::Object(class_name) => Type::Object(class_name),
		})
	} else {
		Ok(Type::Array(array_dimension, array_type))
	}
}

fn write_array_type(t: &ArrayType, string: &mut String) {
	match t {
		ArrayType::B => string.push('B'),
		ArrayType::C => string.push('C'),
		ArrayType::D => string.push('D'),
		ArrayType::F => string.push('F'),
		ArrayType::I => string.push('I'),
		ArrayType::J => string.push('J'),
		ArrayType::S => string.push('S'),
		ArrayType::Z => string.push('Z'),
		ArrayType::Object(class_name) => {
			string.push('L');
			string.push_str(class_name);
			string.push(';');
		},
	}
}

fn write_field_type(t: &Type, string: &mut String) {
	match t {
		Type::B => string.push('B'),
		Type::C => string.push('C'),
		Type::D => string.push('D'),
		Type::F => string.push('F'),
		Type::I => string.push('I'),
		Type::J => string.push('J'),
		Type::S => string.push('S'),
		Type::Z => string.push('Z'),
		Type::Object(class_name) => {
			string.push('L');
			string.push_str(class_name);
			string.push(';');
		},
		Type::Array(array_dimension, array_type) => {
			for _ in 0..*array_dimension {
				string.push('[');
			}
			write_array_type(array_type, string);
		},
	}
}

/// Attempts to parse a field descriptor.
///
/// A field descriptor is defined by the [grammar](https://docs.oracle.com/javase/specs/jvms/se22/html/jvms-4.html#jvms-4.3.2) in the
/// Java Virtual Machine Specification.
///
/// The inverse of this function is [`Type::write`].
///
/// # Examples
/// ```
/// use duke::tree::descriptor::{parse_field_descriptor, ArrayType, Type};
///
/// assert_eq!(parse_field_descriptor("I").unwrap(), Type::I);
/// assert_eq!(parse_field_descriptor("Ljava/lang/Object;").unwrap(), Type::Object("java/lang/Object".to_owned()));
/// assert_eq!(parse_field_descriptor("[[[D").unwrap(), Type::Array(3, ArrayType::D));
/// ```
pub fn parse_field_descriptor(desc: &str) -> Result<Type> {
	let mut chars = desc.chars().peekable();

	let descriptor = read_field_type(&mut chars)
		.with_context(|| anyhow!("failed to read field descriptor {desc:?}"))?;

	if chars.peek().is_some() {
		bail!("expected end of field descriptor {desc:?}, got {:?} remaining", String::from_iter(chars));
	}

	Ok(descriptor)
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParsedMethodDescriptor {
	pub parameter_descriptors: Vec<Type>,
	/// `None` stands for `void`.
	pub return_descriptor: Option<Type>,
}

/// Attempts to parse a method descriptor, see [`parse_field_descriptor`] for the grammar.
///
/// The inverse of this function is [`ParsedMethodDescriptor::write`].
pub fn parse_method_descriptor(desc: &str) -> Result<ParsedMethodDescriptor> {
	let mut chars = desc.chars().peekable();

	if chars.next_if_eq(&'(').is_none() {
		bail!("method descriptor {desc:?} doesn't start with '('");
	}

	let mut parameter_descriptors = Vec::new();
	loop {
		if chars.next_if_eq(&')').is_some() {
			break;
		}

		let descriptor = read_field_type(&mut chars)
			.with_context(|| anyhow!("failed to read parameter descriptor of {desc:?}"))?;
		parameter_descriptors.push(descriptor);
	}

	let return_descriptor = if chars.next_if_eq(&'V').is_some() {
		None
	} else {
		let descriptor = read_field_type(&mut chars)
			.with_context(|| anyhow!("failed to read return descriptor of {desc:?}"))?;

		Some(descriptor)
	};

	if chars.peek().is_some() {
		bail!("expected end of method descriptor {desc:?}, got {} remaining", String::from_iter(chars));
	}

	Ok(ParsedMethodDescriptor {
		parameter_descriptors,
		return_descriptor,
	})
}

impl ParsedMethodDescriptor {
	pub fn write(&self) -> String {
		let mut s = String::new();
		s.push('(');
		for parameter_descriptor in &self.parameter_descriptors {
			write_field_type(parameter_descriptor, &mut s);
		}
		s.push(')');
		if let Some(return_descriptor) = &self.return_descriptor {
			write_field_type(return_descriptor, &mut s);
		} else {
			s.push('V');
		}
		s
	}

	/// Replaces the class names of all parameters and the return type using `f`, keeping their order.
	pub fn map_class_names(self, mut f: impl FnMut(&str) -> Result<String>) -> Result<ParsedMethodDescriptor> {
		let parameter_descriptors = self.parameter_descriptors.into_iter()
			.map(|parameter| parameter.map_class_name(&mut f))
			.collect::<Result<_>>()?;
		let return_descriptor = self.return_descriptor
			.map(|return_descriptor| return_descriptor.map_class_name(&mut f))
			.transpose()?;

		Ok(ParsedMethodDescriptor { parameter_descriptors, return_descriptor })
	}
}

/// Returns `true` if the descriptor has no parameters and doesn't return an object or array, like `()V` or `()I`.
///
/// Such descriptors don't contain any class name.
pub fn is_trivial_method_descriptor(desc: &str) -> bool {
	desc.strip_prefix("()")
		.is_some_and(|ret| ret.len() == 1 && matches!(ret, "V" | "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z"))
}

/// Replaces every class name in a field or method descriptor using `f`.
///
/// Descriptors without any class name in them (`()V`, `I`, ...) are returned without calling `f`.
///
/// ```
/// use duke::tree::descriptor::map_descriptor_class_names;
/// let desc = map_descriptor_class_names("(I[La;)Lb;", |name| Ok(name.to_uppercase())).unwrap();
/// assert_eq!(desc, "(I[LA;)LB;");
/// ```
pub fn map_descriptor_class_names(desc: &str, mut f: impl FnMut(&str) -> Result<String>) -> Result<String> {
	if is_trivial_method_descriptor(desc) {
		return Ok(desc.to_owned());
	}
	if desc.starts_with('(') {
		Ok(parse_method_descriptor(desc)?.map_class_names(&mut f)?.write())
	} else {
		Ok(parse_field_descriptor(desc)?.map_class_name(&mut f)?.write())
	}
}

/// Parses any descriptor (field or method) and checks that it's well formed.
pub fn check_descriptor(desc: &str) -> Result<()> {
	if desc.starts_with('(') {
		parse_method_descriptor(desc).map(|_| ())
	} else {
		parse_field_descriptor(desc).map(|_| ())
	}
}
