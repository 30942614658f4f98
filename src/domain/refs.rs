//! Direct reference extraction
//!
//! Computes the set of shape names a shape or operation names directly.
//! Results are sets: multiplicity does not matter, only reachability.

use std::collections::BTreeSet;

use super::document::{Operation, Shape, ShapeKind};

/// Which edges participate in extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefPolicy {
    /// Skip structure members flagged unsupported, and lists/maps that are
    /// themselves flagged unsupported
    #[default]
    Supported,
    /// Follow every edge regardless of `isNtnxSupported`
    All,
}

impl RefPolicy {
    fn follows(&self, supported: bool) -> bool {
        match self {
            RefPolicy::Supported => supported,
            RefPolicy::All => true,
        }
    }
}

/// Returns the shapes a shape references directly
pub fn shape_refs(shape: &Shape, policy: RefPolicy) -> BTreeSet<&str> {
    let mut refs = BTreeSet::new();

    if !shape.kind.is_aggregate() {
        return refs;
    }

    match shape.kind {
        ShapeKind::Structure => {
            for member in shape.members.values() {
                if !policy.follows(member.supported) {
                    continue;
                }
                if let Some(name) = member.shape.as_deref() {
                    refs.insert(name);
                }
            }
        }
        ShapeKind::List => {
            if policy.follows(shape.supported) {
                refs.extend(shape.member.as_ref().and_then(|m| m.target()));
            }
        }
        ShapeKind::Map => {
            if policy.follows(shape.supported) {
                refs.extend(shape.key.as_ref().and_then(|m| m.target()));
                refs.extend(shape.value.as_ref().and_then(|m| m.target()));
            }
        }
        ShapeKind::Other => {}
    }

    refs
}

/// Returns the shapes an operation references directly (input, output, errors)
///
/// No support filtering applies here.
pub fn operation_refs(op: &Operation) -> BTreeSet<&str> {
    op.input
        .iter()
        .chain(op.output.iter())
        .chain(op.errors.iter())
        .filter_map(|r| r.shape.as_deref())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::MemberRef;

    fn names<'a>(refs: &BTreeSet<&'a str>) -> Vec<&'a str> {
        refs.iter().copied().collect()
    }

    #[test]
    fn structure_members() {
        let shape = Shape::structure([
            ("b", MemberRef::new("B")),
            ("a", MemberRef::new("A")),
            ("dup", MemberRef::new("A")),
        ]);

        assert_eq!(names(&shape_refs(&shape, RefPolicy::Supported)), vec!["A", "B"]);
    }

    #[test]
    fn structure_skips_unsupported_member() {
        let shape = Shape::structure([
            ("a", MemberRef::new("A")),
            ("hidden", MemberRef::new("H").unsupported()),
        ]);

        assert_eq!(names(&shape_refs(&shape, RefPolicy::Supported)), vec!["A"]);
        assert_eq!(names(&shape_refs(&shape, RefPolicy::All)), vec!["A", "H"]);
    }

    #[test]
    fn unsupported_shape_flag_does_not_gate_structure() {
        let shape = Shape::structure([("a", MemberRef::new("A"))]).unsupported();

        assert_eq!(names(&shape_refs(&shape, RefPolicy::Supported)), vec!["A"]);
    }

    #[test]
    fn list_member() {
        let shape = Shape::list(MemberRef::new("Item"));
        assert_eq!(names(&shape_refs(&shape, RefPolicy::Supported)), vec!["Item"]);
    }

    #[test]
    fn unsupported_list_emits_nothing() {
        let shape = Shape::list(MemberRef::new("Item")).unsupported();

        assert!(shape_refs(&shape, RefPolicy::Supported).is_empty());
        assert_eq!(names(&shape_refs(&shape, RefPolicy::All)), vec!["Item"]);
    }

    #[test]
    fn list_member_flag_is_ignored() {
        // Only the list's own flag gates the edge
        let shape = Shape::list(MemberRef::new("Item").unsupported());
        assert_eq!(names(&shape_refs(&shape, RefPolicy::Supported)), vec!["Item"]);
    }

    #[test]
    fn map_key_and_value() {
        let shape = Shape::map(MemberRef::new("K"), MemberRef::new("V"));
        assert_eq!(names(&shape_refs(&shape, RefPolicy::Supported)), vec!["K", "V"]);

        let mut partial = Shape::map(MemberRef::new("K"), MemberRef::new("V"));
        partial.key = None;
        assert_eq!(names(&shape_refs(&partial, RefPolicy::Supported)), vec!["V"]);
    }

    #[test]
    fn unsupported_map_emits_nothing() {
        let shape = Shape::map(MemberRef::new("K"), MemberRef::new("V")).unsupported();

        assert!(shape_refs(&shape, RefPolicy::Supported).is_empty());
        assert_eq!(names(&shape_refs(&shape, RefPolicy::All)), vec!["K", "V"]);
    }

    #[test]
    fn list_without_member_shape() {
        let mut shape = Shape::list(MemberRef::new(""));
        assert!(shape_refs(&shape, RefPolicy::All).is_empty());

        shape.member = None;
        assert!(shape_refs(&shape, RefPolicy::All).is_empty());
    }

    #[test]
    fn primitive_has_no_refs() {
        assert!(shape_refs(&Shape::primitive(), RefPolicy::All).is_empty());
    }

    #[test]
    fn operation_input_output_errors() {
        let op = Operation::default()
            .with_input("In")
            .with_output("Out")
            .with_error("NotFound")
            .with_error("Conflict")
            .unsupported();

        assert_eq!(
            names(&operation_refs(&op)),
            vec!["Conflict", "In", "NotFound", "Out"]
        );
    }

    #[test]
    fn operation_without_refs() {
        assert!(operation_refs(&Operation::default()).is_empty());
    }
}
