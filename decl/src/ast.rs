//! Declaration shapes handed over by the front end.
//!
//! The front end walks the Go source of the module and produces one
//! [`Module`] per package directory. The shapes below are the contract
//! between the two sides; they derive serde so a front end running as a
//! separate process can emit them as JSON.

use serde::{Deserialize, Serialize};

/// All declarations of one source module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Name of the source directory, used to derive the client module name.
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub funcs: Vec<FuncDecl>,
}

/// A named type declaration, `type Name = expr` or `type Name expr`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub expr: TypeExpr,
}

/// A function declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    /// Raw doc comment lines, markers still attached.
    #[serde(default)]
    pub doc: Vec<String>,
    /// Receiver type name for methods; `None` for free functions.
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub results: Vec<TypeExpr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

/// A struct field as declared, including its raw tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// `None` for anonymous/embedded members.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    /// The raw struct tag, e.g. `json:"age,omitempty"`.
    #[serde(default)]
    pub tag: Option<String>,
}

/// A type expression, one variant per `go/ast` shape the front end forwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    /// A plain identifier: `int`, `error`, `Person`.
    Ident { name: String },
    /// A qualified name: `time.Time`.
    Selector { package: String, name: String },
    /// `[]T` or `[N]T`.
    Array {
        elem: Box<TypeExpr>,
        #[serde(default)]
        len: Option<u64>,
    },
    /// `map[K]V`.
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// An inline struct type.
    Struct { fields: Vec<FieldDecl> },
    /// `*T`.
    Pointer { elem: Box<TypeExpr> },
    /// `func(...)`. Only the parameter types and the presence of a result
    /// list are recorded; result types never cross the boundary.
    Func {
        params: Vec<TypeExpr>,
        #[serde(default)]
        has_results: bool,
    },
    /// `chan T`, in any direction.
    Chan { elem: Box<TypeExpr> },
    /// `interface{}` or `any`.
    Interface,
}

impl TypeExpr {
    /// Go-syntax spelling of the expression, used in diagnostics.
    pub fn spelling(&self) -> String {
        match self {
            TypeExpr::Ident { name } => name.clone(),
            TypeExpr::Selector { package, name } => format!("{package}.{name}"),
            TypeExpr::Array { elem, len: None } => format!("[]{}", elem.spelling()),
            TypeExpr::Array {
                elem,
                len: Some(len),
            } => format!("[{len}]{}", elem.spelling()),
            TypeExpr::Map { key, value } => {
                format!("map[{}]{}", key.spelling(), value.spelling())
            }
            TypeExpr::Struct { .. } => "struct{...}".to_string(),
            TypeExpr::Pointer { elem } => format!("*{}", elem.spelling()),
            TypeExpr::Func { .. } => "func(...)".to_string(),
            TypeExpr::Chan { elem } => format!("chan {}", elem.spelling()),
            TypeExpr::Interface => "interface{}".to_string(),
        }
    }
}
