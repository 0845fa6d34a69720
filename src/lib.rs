//! Relinking programs from one set of names to another.
//!
//! The [`hierarchy`] module holds a [`SuperClassProvider`][quill::hierarchy::SuperClassProvider] built from the
//! classes of a program, while [`relinker`] builds [remappers][quill::remapper::Remapper] from mapping collections
//! and applies them to classes.

pub mod hierarchy;
pub mod relinker;
