//! Reference counting for shapes
//!
//! For every shape, finds all shapes and operations that depend on it
//! directly or transitively. Shapes with neither are unreferenced and can be
//! pruned. Counting is conservative: support flags are ignored.
//!
//! Pruning is a single pass. A shape that only becomes unreferenced once
//! another unreferenced shape is removed is reported on the next run.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use super::document::ApiSpec;
use super::graph::ReferenceGraph;
use super::refs::operation_refs;

/// Reference counts for one shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeRefCount {
    pub name: String,

    /// Shapes that reference this one, directly or transitively
    pub shape_refs: usize,

    /// Operations that reference this shape or any of its ancestors
    pub op_refs: usize,
}

impl ShapeRefCount {
    pub fn is_unreferenced(&self) -> bool {
        self.shape_refs == 0 && self.op_refs == 0
    }
}

/// Reference counts for every shape, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefCountReport {
    pub entries: Vec<ShapeRefCount>,
}

impl RefCountReport {
    /// Names of unreferenced shapes, in document order
    pub fn unreferenced(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_unreferenced())
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ShapeRefCount> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// Counts shape and operation references for every shape in `spec`
pub fn count_references(spec: &ApiSpec) -> RefCountReport {
    let graph = ReferenceGraph::for_shapes(spec);
    let op_refs: Vec<BTreeSet<&str>> = spec.operations.values().map(operation_refs).collect();

    let entries: Vec<ShapeRefCount> = spec
        .shapes
        .keys()
        .map(|name| {
            let visited = graph.ancestors(name);
            let op_count = op_refs
                .iter()
                .filter(|refs| refs.iter().any(|r| visited.contains(r)))
                .count();

            ShapeRefCount {
                name: name.clone(),
                shape_refs: visited.len() - 1,
                op_refs: op_count,
            }
        })
        .collect();

    let report = RefCountReport { entries };
    debug!(
        shapes = report.entries.len(),
        unreferenced = report.unreferenced().len(),
        "Counted shape references"
    );
    report
}
