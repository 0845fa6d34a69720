//! Crate for representing mappings and answering renaming questions with them.
//!
//! Mappings are stored as [entities][tree::entity::MappingEntity] (a name pair, or a name per namespace) with
//! [components][tree::component] attached to them, grouped into [class mappings][tree::class_mapping::ClassMapping]
//! inside a [collection][tree::collection::MappingCollection].
//!
//! A collection is turned into a [`Remapper`][remapper::Remapper], which answers "what's the new name of this class,
//! field, method or descriptor", also for members inherited from other classes. For the latter it consults a
//! [`SuperClassProvider`][hierarchy::SuperClassProvider].

mod error;

pub mod tree;
pub mod hierarchy;
pub mod remapper;

pub use error::MappingError;
