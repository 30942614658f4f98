//! Domain models for shapegraph
//!
//! Contains the document model and the graph analyses, without any I/O.

mod document;
mod refs;
mod graph;
mod prune;

pub use document::{
    ApiSpec, MemberRef, Operation, OperationFlags, OperationIndex, Shape, ShapeKind, ShapeRef,
};
pub use refs::{operation_refs, shape_refs, RefPolicy};
pub use graph::{dependency_tree, render_tree, CyclePolicy, GraphError, ReferenceGraph, TreeNode};
pub use prune::{count_references, RefCountReport, ShapeRefCount};
