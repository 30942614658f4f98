//! shapegraph - dependency analysis for API shape documents
//!
//! An API document names "shapes" (structures, lists, maps, primitives) and
//! "operations" that consume and produce them. shapegraph prints the shape
//! tree an operation depends on, lists operations, and finds shapes that no
//! operation or other shape references so they can be pruned.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{ApiSpec, GraphError, Operation, ReferenceGraph, Shape};
pub use storage::SpecFile;
