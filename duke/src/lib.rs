//! JVM level primitives shared by the mapping crates.
//!
//! This crate knows what a valid class, field or method name looks like, how to read and write
//! [field and method descriptors][tree::descriptor], and how to interpret [access flags][tree::access].
//! It doesn't know anything about mappings.

pub mod tree;
