//! API document model
//!
//! A typed, read-only view over an API definition: named shapes (structures,
//! lists, maps, primitives) and named operations that consume and produce
//! them. Absent optional fields mean "no reference" rather than an error.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

fn default_supported() -> bool {
    true
}

/// `isNtnxSupported`: only a literal `false` disables; `null` means supported
fn supported_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// A `null` list is an empty list
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The `type` tag of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Structure,
    List,
    Map,
    /// Primitives (string, integer, boolean, blob, ...) and unknown tags
    #[default]
    #[serde(other)]
    Other,
}

impl ShapeKind {
    /// Returns true if shapes of this kind can reference other shapes
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, ShapeKind::Other)
    }
}

/// A reference from a member slot to a named shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    /// Name of the referenced shape
    #[serde(default)]
    pub shape: Option<String>,

    #[serde(
        rename = "isNtnxSupported",
        default = "default_supported",
        deserialize_with = "supported_flag"
    )]
    pub supported: bool,
}

impl MemberRef {
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: Some(shape.into()),
            supported: true,
        }
    }

    /// Marks the reference as unsupported
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// Returns the referenced shape name, treating an empty name as absent
    pub fn target(&self) -> Option<&str> {
        self.shape.as_deref().filter(|s| !s.is_empty())
    }
}

/// A named type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type", default)]
    pub kind: ShapeKind,

    #[serde(
        rename = "isNtnxSupported",
        default = "default_supported",
        deserialize_with = "supported_flag"
    )]
    pub supported: bool,

    /// Structure members, keyed by member name
    #[serde(default)]
    pub members: IndexMap<String, MemberRef>,

    /// List element
    #[serde(default)]
    pub member: Option<MemberRef>,

    /// Map key
    #[serde(default)]
    pub key: Option<MemberRef>,

    /// Map value
    #[serde(default)]
    pub value: Option<MemberRef>,
}

impl Shape {
    fn of_kind(kind: ShapeKind) -> Self {
        Self {
            kind,
            supported: true,
            members: IndexMap::new(),
            member: None,
            key: None,
            value: None,
        }
    }

    /// Creates a primitive shape (string, integer, ...)
    pub fn primitive() -> Self {
        Self::of_kind(ShapeKind::Other)
    }

    /// Creates a structure with the given `(member name, member ref)` pairs
    pub fn structure<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, MemberRef)>,
        K: Into<String>,
    {
        let mut shape = Self::of_kind(ShapeKind::Structure);
        shape.members = members.into_iter().map(|(k, v)| (k.into(), v)).collect();
        shape
    }

    /// Creates a list of `member`
    pub fn list(member: MemberRef) -> Self {
        let mut shape = Self::of_kind(ShapeKind::List);
        shape.member = Some(member);
        shape
    }

    /// Creates a map from `key` to `value`
    pub fn map(key: MemberRef, value: MemberRef) -> Self {
        let mut shape = Self::of_kind(ShapeKind::Map);
        shape.key = Some(key);
        shape.value = Some(value);
        shape
    }

    /// Marks the shape as unsupported
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }
}

/// A `{"shape": name}` slot on an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShapeRef {
    #[serde(default)]
    pub shape: Option<String>,
}

impl ShapeRef {
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: Some(shape.into()),
        }
    }
}

/// A named API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(
        rename = "isNtnxSupported",
        default = "default_supported",
        deserialize_with = "supported_flag"
    )]
    pub supported: bool,

    #[serde(default)]
    pub input: Option<ShapeRef>,

    #[serde(default)]
    pub output: Option<ShapeRef>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<ShapeRef>,
}

impl Default for Operation {
    fn default() -> Self {
        Self {
            supported: true,
            input: None,
            output: None,
            errors: Vec::new(),
        }
    }
}

impl Operation {
    pub fn with_input(mut self, shape: impl Into<String>) -> Self {
        self.input = Some(ShapeRef::new(shape));
        self
    }

    pub fn with_output(mut self, shape: impl Into<String>) -> Self {
        self.output = Some(ShapeRef::new(shape));
        self
    }

    pub fn with_error(mut self, shape: impl Into<String>) -> Self {
        self.errors.push(ShapeRef::new(shape));
        self
    }

    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }
}

/// An API definition document
///
/// Only `shapes` and `operations` are modelled; any other top-level keys are
/// kept by [`crate::storage::SpecFile`] in the raw document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSpec {
    #[serde(default)]
    pub shapes: IndexMap<String, Shape>,

    #[serde(default)]
    pub operations: IndexMap<String, Operation>,
}

impl ApiSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a shape
    pub fn with_shape(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.shapes.insert(name.into(), shape);
        self
    }

    /// Adds (or replaces) an operation
    pub fn with_operation(mut self, name: impl Into<String>, op: Operation) -> Self {
        self.operations.insert(name.into(), op);
        self
    }

    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.shapes.get(name)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// Returns true unless the named shape exists and is explicitly unsupported
    pub fn is_shape_supported(&self, name: &str) -> bool {
        self.shape(name).map(|s| s.supported).unwrap_or(true)
    }
}

/// The support flag of one operation, ignoring everything else about it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OperationFlags {
    #[serde(
        rename = "isNtnxSupported",
        default = "default_supported",
        deserialize_with = "supported_flag"
    )]
    pub supported: bool,
}

impl Default for OperationFlags {
    fn default() -> Self {
        Self { supported: true }
    }
}

/// Operations-only view of a document, used for listing
///
/// Shapes are never parsed, so a document whose shapes the typed model
/// rejects can still be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OperationIndex {
    #[serde(default)]
    pub operations: IndexMap<String, OperationFlags>,
}

impl OperationIndex {
    /// Iterates over supported operation names in document order
    pub fn supported(&self) -> impl Iterator<Item = &str> {
        self.operations
            .iter()
            .filter(|(_, op)| op.supported)
            .map(|(name, _)| name.as_str())
    }

    /// Supported operations numbered contiguously from 1, in document order
    pub fn numbered(&self) -> Vec<(usize, &str)> {
        self.supported()
            .enumerate()
            .map(|(i, name)| (i + 1, name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flags_default_to_supported() {
        let json = r#"{
            "shapes": {
                "A": {"type": "structure", "members": {"m": {"shape": "B"}}},
                "B": {"type": "string"}
            },
            "operations": {"Op1": {"input": {"shape": "A"}}}
        }"#;

        let spec: ApiSpec = serde_json::from_str(json).unwrap();
        let a = spec.shape("A").unwrap();
        assert!(a.supported);
        assert_eq!(a.kind, ShapeKind::Structure);
        assert!(a.members["m"].supported);
        assert!(spec.operation("Op1").unwrap().supported);
        assert!(spec.operation("Op1").unwrap().errors.is_empty());
    }

    #[test]
    fn unknown_type_is_primitive() {
        let json = r#"{"shapes": {"T": {"type": "timestamp"}, "U": {}}}"#;

        let spec: ApiSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.shape("T").unwrap().kind, ShapeKind::Other);
        assert_eq!(spec.shape("U").unwrap().kind, ShapeKind::Other);
        assert!(spec.operations.is_empty());
    }

    #[test]
    fn unsupported_flag_parsed() {
        let json = r#"{
            "shapes": {
                "L": {"type": "list", "isNtnxSupported": false, "member": {"shape": "X"}},
                "S": {"type": "structure", "members": {"a": {"shape": "X", "isNtnxSupported": false}}}
            },
            "operations": {"Hidden": {"isNtnxSupported": false}}
        }"#;

        let spec: ApiSpec = serde_json::from_str(json).unwrap();
        assert!(!spec.shape("L").unwrap().supported);
        assert!(!spec.shape("S").unwrap().members["a"].supported);
        assert!(!spec.operation("Hidden").unwrap().supported);
    }

    #[test]
    fn keeps_document_order() {
        let json = r#"{"operations": {"Zeta": {}, "Alpha": {}, "Mid": {}}}"#;

        let spec: ApiSpec = serde_json::from_str(json).unwrap();
        let names: Vec<_> = spec.operations.keys().cloned().collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn null_flags_mean_supported() {
        let json = r#"{
            "shapes": {
                "S": {"type": "string", "isNtnxSupported": null},
                "L": {"type": "list", "member": {"shape": "S", "isNtnxSupported": null}}
            },
            "operations": {"Op": {"isNtnxSupported": null, "input": {"shape": "S"}, "errors": null}}
        }"#;

        let spec: ApiSpec = serde_json::from_str(json).unwrap();
        assert!(spec.shape("S").unwrap().supported);
        assert!(spec.shape("L").unwrap().member.as_ref().unwrap().supported);

        let op = spec.operation("Op").unwrap();
        assert!(op.supported);
        assert!(op.errors.is_empty());
        assert_eq!(op.input, Some(ShapeRef::new("S")));
    }

    #[test]
    fn index_skips_flagged_operations() {
        let json = r#"{"operations": {
            "ListVms": {},
            "Internal": {"isNtnxSupported": false},
            "GetVm": {"isNtnxSupported": null}
        }}"#;

        let index: OperationIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.supported().collect::<Vec<_>>(), vec!["ListVms", "GetVm"]);
        assert_eq!(index.numbered(), vec![(1, "ListVms"), (2, "GetVm")]);
    }

    #[test]
    fn index_ignores_shapes_and_operation_details() {
        let json = r#"{
            "shapes": {"S": {"type": "string", "member": "oops"}},
            "operations": {"Op": {"input": "not-a-ref", "errors": 7}}
        }"#;

        let index: OperationIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.numbered(), vec![(1, "Op")]);
        assert!(serde_json::from_str::<ApiSpec>(json).is_err());
    }

    proptest! {
        #[test]
        fn numbering_is_contiguous(flags in proptest::collection::vec(any::<bool>(), 0..40)) {
            let mut index = OperationIndex::default();
            for (i, supported) in flags.iter().enumerate() {
                index.operations.insert(format!("Op{}", i), OperationFlags { supported: *supported });
            }

            let numbered = index.numbered();
            prop_assert_eq!(numbered.len(), flags.iter().filter(|f| **f).count());
            for (pos, (number, name)) in numbered.iter().enumerate() {
                prop_assert_eq!(*number, pos + 1);
                prop_assert!(index.operations[*name].supported);
            }
        }
    }

    #[test]
    fn empty_member_name_has_no_target() {
        let member = MemberRef {
            shape: Some(String::new()),
            supported: true,
        };
        assert_eq!(member.target(), None);
        assert_eq!(MemberRef::new("X").target(), Some("X"));
    }

    #[test]
    fn missing_shape_is_supported() {
        let spec = ApiSpec::new().with_shape("Off", Shape::primitive().unsupported());
        assert!(spec.is_shape_supported("Missing"));
        assert!(!spec.is_shape_supported("Off"));
    }
}
