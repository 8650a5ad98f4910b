use gowasm_decl::{Field, PrimitiveKind, Signature, TypeNode};

use crate::naming;
use crate::CallingConvention;

pub(super) struct GeneratorContext<'a> {
    pub(super) signatures: &'a [Signature],
    pub(super) convention: CallingConvention,
    pub(super) type_name: &'a str,
}

pub(super) const EXPORTS_GLOBAL: &str = "__gowasm_exports";
pub(super) const DISPATCH_GLOBAL: &str = "__gowasm_dispatch";

pub(super) const ERROR_KEY: &str = "error";

pub(super) fn field_key(field: &Field) -> String {
    field
        .alias
        .clone()
        .unwrap_or_else(|| naming::default_alias(&field.name))
}

// 64-bit and arch-width integers ride the float representation; no integer
// array on the boundary is wide enough.
pub(super) fn typed_array(kind: PrimitiveKind) -> &'static str {
    use PrimitiveKind::*;
    match kind {
        Int8 => "Int8Array",
        Int16 => "Int16Array",
        Int32 => "Int32Array",
        Uint8 => "Uint8Array",
        Uint16 => "Uint16Array",
        Uint32 => "Uint32Array",
        Float32 => "Float32Array",
        Int | Uint | Int64 | Uint64 | Float64 | Assumed => "Float64Array",
        String | Bool => unreachable!("typed_array called for a non-numeric kind"),
    }
}

pub(super) fn base_go_type(kind: PrimitiveKind) -> &'static str {
    use PrimitiveKind::*;
    match kind {
        String => "string",
        Bool => "bool",
        Int => "int",
        Int8 => "int8",
        Int16 => "int16",
        Int32 => "int32",
        Int64 => "int64",
        Uint => "uint",
        Uint8 => "uint8",
        Uint16 => "uint16",
        Uint32 => "uint32",
        Uint64 => "uint64",
        Float32 => "float32",
        Float64 => "float64",
        Assumed => "float64",
    }
}

pub(super) fn jsdoc_type(node: &TypeNode) -> String {
    match node {
        TypeNode::Primitive(p) => match p.kind {
            PrimitiveKind::String => "string".to_string(),
            PrimitiveKind::Bool => "boolean".to_string(),
            _ => "number".to_string(),
        },
        TypeNode::Sequence(elem) => match &**elem {
            TypeNode::Primitive(p) if p.kind.is_numeric() => typed_array(p.kind).to_string(),
            other => format!("Array<{}>", jsdoc_type(other)),
        },
        TypeNode::Map { value, .. } => {
            format!("Object<string, {}>", jsdoc_type(value))
        }
        TypeNode::Struct { fields, .. } => {
            let fields = fields
                .iter()
                .map(|field| format!("{}: {}", field_key(field), jsdoc_type(&field.ty)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{fields}}}")
        }
        TypeNode::Pointer(elem) => format!("?{}", jsdoc_type(elem)),
        TypeNode::Callback { params, .. } => {
            let params = params
                .iter()
                .map(jsdoc_type)
                .collect::<Vec<_>>()
                .join(", ");
            format!("function({params}): void")
        }
        TypeNode::ErrorSentinel => "Error".to_string(),
        TypeNode::Unsupported(_) => "*".to_string(),
    }
}
