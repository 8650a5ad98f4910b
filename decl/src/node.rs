//! The resolved type model.
//!
//! A [`TypeNode`] tree is what the builder produces from a front-end type
//! expression and what the validator and the generators consume. Trees are
//! acyclic as data: recursion in the source declarations is cut into an
//! [`TypeNode::Unsupported`] marker at the point of revisit, so consumers
//! can walk a tree without cycle bookkeeping.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Boundary behavior class of a primitive type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Bool,
    /// Arch-width `int`, extracted with the integer accessor.
    Int,
    Int8,
    Int16,
    Int32,
    /// Extracted through the float accessor; precision is capped at the
    /// boundary's 53-bit mantissa.
    Int64,
    /// Arch-width `uint`.
    Uint,
    Uint8,
    Uint16,
    Uint32,
    /// Same precision cap as [`PrimitiveKind::Int64`].
    Uint64,
    Float32,
    Float64,
    /// An identifier that resolved to nothing; assumed to behave like a
    /// number so that the rest of the module still generates.
    Assumed,
}

lazy_static! {
    static ref PRIMITIVE_NAMES: HashMap<&'static str, PrimitiveKind> = {
        use PrimitiveKind::*;
        let mut m = HashMap::new();
        m.insert("string", String);
        m.insert("bool", Bool);
        m.insert("int", Int);
        m.insert("int8", Int8);
        m.insert("int16", Int16);
        m.insert("int32", Int32);
        m.insert("int64", Int64);
        m.insert("uint", Uint);
        m.insert("uint8", Uint8);
        m.insert("uint16", Uint16);
        m.insert("uint32", Uint32);
        m.insert("uint64", Uint64);
        m.insert("uintptr", Uint);
        m.insert("byte", Uint8);
        m.insert("rune", Int32);
        m.insert("float32", Float32);
        m.insert("float64", Float64);
        m
    };
}

impl PrimitiveKind {
    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        PRIMITIVE_NAMES.get(name).copied()
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::String | PrimitiveKind::Bool)
    }
}

/// A primitive type together with its Go spelling. The spelling is kept so
/// generated glue can cast accessor results back to the declared type,
/// which also covers named primitives (`type Celsius float64`).
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Empty for anonymous/embedded members. The builder tolerates those;
    /// only the validator rejects them.
    pub name: String,
    pub ty: TypeNode,
    /// Wire name from the `json:"..."` tag, when one was declared.
    pub alias: Option<String>,
}

/// Resolved form of a declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeNode {
    Primitive(Primitive),
    Sequence(Box<TypeNode>),
    Map {
        key: Box<TypeNode>,
        value: Box<TypeNode>,
    },
    Struct {
        /// Declared name when the struct came out of the registry; glue
        /// code needs it to spell composite literals.
        name: Option<String>,
        fields: Vec<Field>,
    },
    Pointer(Box<TypeNode>),
    ErrorSentinel,
    Callback {
        params: Vec<TypeNode>,
        is_void: bool,
    },
    Unsupported(String),
}

impl TypeNode {
    pub fn primitive(kind: PrimitiveKind, name: &str) -> TypeNode {
        TypeNode::Primitive(Primitive {
            kind,
            name: name.to_string(),
        })
    }

    pub fn assumed(name: &str) -> TypeNode {
        TypeNode::primitive(PrimitiveKind::Assumed, name)
    }

    /// True for `[]byte` (and `[]uint8`), the bulk-copy fast path.
    pub fn is_byte_sequence(&self) -> bool {
        match self {
            TypeNode::Sequence(elem) => {
                matches!(&**elem, TypeNode::Primitive(p) if p.kind == PrimitiveKind::Uint8)
            }
            _ => false,
        }
    }

    /// Go-syntax spelling, used in diagnostics and in generated glue.
    pub fn spelling(&self) -> String {
        match self {
            TypeNode::Primitive(p) => p.name.clone(),
            TypeNode::Sequence(elem) => format!("[]{}", elem.spelling()),
            TypeNode::Map { key, value } => {
                format!("map[{}]{}", key.spelling(), value.spelling())
            }
            TypeNode::Struct {
                name: Some(name), ..
            } => name.clone(),
            TypeNode::Struct { name: None, fields } => {
                let fields = fields
                    .iter()
                    .map(|f| format!("{} {}", f.name, f.ty.spelling()))
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("struct{{ {fields} }}")
            }
            TypeNode::Pointer(elem) => format!("*{}", elem.spelling()),
            TypeNode::ErrorSentinel => "error".to_string(),
            TypeNode::Callback { params, is_void } => {
                let params = params
                    .iter()
                    .map(TypeNode::spelling)
                    .collect::<Vec<_>>()
                    .join(", ");
                if *is_void {
                    format!("func({params})")
                } else {
                    format!("func({params}) ...")
                }
            }
            TypeNode::Unsupported(name) => name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeNode,
}

/// One exported free function. Built once by the builder, immutable
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: Vec<TypeNode>,
    /// Doc comment with markers stripped and lines joined.
    pub doc: Option<String>,
}

impl Signature {
    /// The returns split into value results and the trailing error
    /// sentinel, if any. Only meaningful on validated signatures.
    pub fn split_returns(&self) -> (&[TypeNode], bool) {
        match self.returns.last() {
            Some(TypeNode::ErrorSentinel) => {
                (&self.returns[..self.returns.len() - 1], true)
            }
            _ => (&self.returns[..], false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_sequence_detection() {
        let bytes = TypeNode::Sequence(Box::new(TypeNode::primitive(
            PrimitiveKind::Uint8,
            "byte",
        )));
        assert!(bytes.is_byte_sequence());

        let ints = TypeNode::Sequence(Box::new(TypeNode::primitive(
            PrimitiveKind::Int32,
            "int32",
        )));
        assert!(!ints.is_byte_sequence());
    }

    #[test]
    fn spelling_roundtrips_common_shapes() {
        let m = TypeNode::Map {
            key: Box::new(TypeNode::primitive(PrimitiveKind::String, "string")),
            value: Box::new(TypeNode::Sequence(Box::new(TypeNode::primitive(
                PrimitiveKind::Float64,
                "float64",
            )))),
        };
        assert_eq!(m.spelling(), "map[string][]float64");
    }

    #[test]
    fn alias_names_resolve_to_base_kind() {
        assert_eq!(
            PrimitiveKind::from_name("byte"),
            Some(PrimitiveKind::Uint8)
        );
        assert_eq!(
            PrimitiveKind::from_name("rune"),
            Some(PrimitiveKind::Int32)
        );
        assert_eq!(PrimitiveKind::from_name("Celsius"), None);
    }
}
