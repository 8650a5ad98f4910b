//! Declaration model for Go modules compiled to wasm.
//!
//! The crate takes the declarations an external front end extracted from a
//! module ([`ast::Module`]), resolves them into [`TypeNode`] trees and
//! [`Signature`]s, and validates the result against the subset the binding
//! generators can marshal across the `syscall/js` boundary.
//!
//! Building is lenient and total: anything the resolver cannot place
//! degrades to a data value. Rejection happens in exactly one place, the
//! [`validate`] pass, so capability decisions are never scattered across
//! construction code.

pub mod ast;
pub mod error;
pub mod node;
pub mod registry;
pub mod resolve;
pub mod validation;

pub use ast::{FieldDecl, FuncDecl, Module, ParamDecl, TypeDecl, TypeExpr};
pub use error::{Problem, ValidationError, ValidationErrors};
pub use node::{Field, Parameter, Primitive, PrimitiveKind, Signature, TypeNode};
pub use registry::TypeRegistry;
pub use resolve::{build_module, resolve};
pub use validation::validate;
