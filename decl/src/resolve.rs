//! The type model builder.
//!
//! Resolution is total: any input shape produces a [`TypeNode`], never an
//! error. Identifiers that resolve to nothing degrade to an
//! assumed-primitive node, unsupported shapes (channels, qualified names,
//! interfaces) become [`TypeNode::Unsupported`] markers, and capability
//! decisions are left entirely to the validator.

use std::collections::HashMap;

use log::{debug, warn};

use crate::ast::{FuncDecl, Module, TypeExpr};
use crate::node::{Field, Parameter, Primitive, PrimitiveKind, Signature, TypeNode};
use crate::registry::TypeRegistry;

/// Resolve a single type expression against a fully built registry.
pub fn resolve(expr: &TypeExpr, registry: &TypeRegistry) -> TypeNode {
    let mut state = ResolveState {
        pending: HashMap::new(),
        registry: registry.clone(),
        path: Vec::new(),
    };
    state.resolve_expr(expr)
}

/// Build the signature list and the type registry for one module.
///
/// Named types are registered in two phases: all names are declared first,
/// then bodies are resolved in file order, on demand for forward
/// references. Receiver-bound and unexported functions are skipped; only
/// exported free functions produce signatures.
pub fn build_module(module: &Module) -> (Vec<Signature>, TypeRegistry) {
    let mut state = ResolveState {
        pending: HashMap::new(),
        registry: TypeRegistry::new(),
        path: Vec::new(),
    };

    for decl in &module.types {
        state.registry.declare(&decl.name);
        state.pending.insert(decl.name.clone(), &decl.expr);
    }
    for decl in &module.types {
        state.resolve_named(&decl.name);
    }

    let mut signatures = Vec::new();
    for func in &module.funcs {
        if func.receiver.is_some() {
            debug!("skipping method {}", func.name);
            continue;
        }
        if !is_exported(&func.name) {
            debug!("skipping unexported function {}", func.name);
            continue;
        }
        signatures.push(build_signature(func, &mut state));
    }

    (signatures, state.registry)
}

struct ResolveState<'a> {
    /// Declared bodies not yet resolved, drained during phase two.
    pending: HashMap<String, &'a TypeExpr>,
    registry: TypeRegistry,
    /// Named types currently being descended into. Tracking the path, not
    /// a set, keeps a type referenced from two sibling branches from being
    /// misread as a cycle.
    path: Vec<String>,
}

impl<'a> ResolveState<'a> {
    fn resolve_named(&mut self, name: &str) -> TypeNode {
        if let Some(node) = self.registry.get(name) {
            return node.clone();
        }
        if self.path.iter().any(|entry| entry == name) {
            return TypeNode::Unsupported(name.to_string());
        }
        let Some(expr) = self.pending.get(name).copied() else {
            return TypeNode::assumed(name);
        };
        self.path.push(name.to_string());
        let node = self.resolve_expr(expr);
        self.path.pop();
        let node = rename_for_decl(name, node);
        self.registry.define(name, node.clone());
        node
    }

    fn resolve_expr(&mut self, expr: &TypeExpr) -> TypeNode {
        match expr {
            TypeExpr::Ident { name } => {
                if name == "error" {
                    TypeNode::ErrorSentinel
                } else if let Some(kind) = PrimitiveKind::from_name(name) {
                    TypeNode::primitive(kind, name)
                } else if self.registry.is_declared(name) {
                    self.resolve_named(name)
                } else {
                    warn!("unresolved identifier {name}, assuming a primitive");
                    TypeNode::assumed(name)
                }
            }
            TypeExpr::Array { elem, .. } => {
                TypeNode::Sequence(Box::new(self.resolve_expr(elem)))
            }
            TypeExpr::Map { key, value } => TypeNode::Map {
                key: Box::new(self.resolve_expr(key)),
                value: Box::new(self.resolve_expr(value)),
            },
            TypeExpr::Struct { fields } => TypeNode::Struct {
                name: None,
                fields: fields
                    .iter()
                    .map(|field| Field {
                        name: field.name.clone().unwrap_or_default(),
                        ty: self.resolve_expr(&field.ty),
                        alias: field.tag.as_deref().and_then(json_alias),
                    })
                    .collect(),
            },
            TypeExpr::Pointer { elem } => {
                TypeNode::Pointer(Box::new(self.resolve_expr(elem)))
            }
            TypeExpr::Func {
                params,
                has_results,
            } => TypeNode::Callback {
                params: params.iter().map(|p| self.resolve_expr(p)).collect(),
                is_void: !has_results,
            },
            TypeExpr::Selector { .. } | TypeExpr::Chan { .. } | TypeExpr::Interface => {
                TypeNode::Unsupported(expr.spelling())
            }
        }
    }
}

fn build_signature(func: &FuncDecl, state: &mut ResolveState<'_>) -> Signature {
    Signature {
        name: func.name.clone(),
        params: func
            .params
            .iter()
            .map(|param| Parameter {
                name: param.name.clone(),
                ty: state.resolve_expr(&param.ty),
            })
            .collect(),
        returns: func
            .results
            .iter()
            .map(|result| state.resolve_expr(result))
            .collect(),
        doc: strip_doc(&func.doc),
    }
}

/// Transfer the declared name onto the resolved body where the generators
/// need it: named primitives keep their declared spelling so casts still
/// name the declared type, and named structs keep the name for composite
/// literals.
fn rename_for_decl(name: &str, node: TypeNode) -> TypeNode {
    match node {
        TypeNode::Primitive(p) => TypeNode::Primitive(Primitive {
            kind: p.kind,
            name: name.to_string(),
        }),
        TypeNode::Struct { name: None, fields } => TypeNode::Struct {
            name: Some(name.to_string()),
            fields,
        },
        other => other,
    }
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Wire name from a raw struct tag, e.g. `json:"age,omitempty"` -> `age`.
fn json_alias(tag: &str) -> Option<String> {
    let tag = tag.trim_matches('`');
    for part in tag.split_whitespace() {
        let Some(rest) = part.strip_prefix("json:\"") else {
            continue;
        };
        let value = rest.strip_suffix('"').unwrap_or(rest);
        let name = value.split(',').next().unwrap_or("");
        if name.is_empty() || name == "-" {
            return None;
        }
        return Some(name.to_string());
    }
    None
}

/// Strip comment markers and join the doc lines.
fn strip_doc(lines: &[String]) -> Option<String> {
    let mut out: Vec<String> = lines
        .iter()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix("//").unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).to_string()
        })
        .collect();
    while out.first().is_some_and(|line| line.is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }
    if out.is_empty() {
        None
    } else {
        Some(out.join("\n"))
    }
}
