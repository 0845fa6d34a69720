use thiserror::Error;

/// The ways a mapping set can be defective.
///
/// These are raised inside [`anyhow::Error`]s; use [`MappingError::find`] to get them back out. A missing mapping is
/// never an error, the name is kept in that case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
	/// An entity lacks information needed to answer a query, or is otherwise invalid.
	#[error("malformed mapping: {0}")]
	MalformedMapping(String),
	/// Two entities claim the same key.
	#[error("duplicate {scope} {key:?}")]
	DuplicateSymbol {
		scope: &'static str,
		key: String,
	},
	/// More than one distinct, equally visible mapping is inherited.
	#[error("ambiguous inherited mapping for {owner}.{name}{desc}, candidates: {candidates:?}")]
	AmbiguousInheritance {
		owner: String,
		name: String,
		desc: String,
		candidates: Vec<String>,
	},
	/// A query needed to look at super classes, but no provider for them was given.
	#[error("no super class provider given, but needed one for resolving {owner}.{name}{desc}")]
	MissingCollaborator {
		owner: String,
		name: String,
		desc: String,
	},
}

impl MappingError {
	/// Finds the outermost [`MappingError`] of `error`, be it its context or one of its causes.
	pub fn find(error: &anyhow::Error) -> Option<&MappingError> {
		error.downcast_ref::<MappingError>()
			.or_else(|| error.chain().find_map(|cause| cause.downcast_ref::<MappingError>()))
	}

	pub(crate) fn malformed(message: impl Into<String>) -> MappingError {
		MappingError::MalformedMapping(message.into())
	}

	pub(crate) fn duplicate(scope: &'static str, key: impl Into<String>) -> MappingError {
		MappingError::DuplicateSymbol { scope, key: key.into() }
	}
}
