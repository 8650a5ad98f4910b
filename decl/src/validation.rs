//! Capability validation of resolved signatures.
//!
//! The builder is total, so this pass is the single place where the
//! supported subset is enforced. Every function and every violation is
//! checked; the result is one aggregate report.

use crate::error::{Problem, ValidationError, ValidationErrors};
use crate::node::{PrimitiveKind, Signature, TypeNode};

pub fn validate(signatures: &[Signature]) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    for signature in signatures {
        let mut checker = Checker {
            function: &signature.name,
            errors: &mut errors,
        };
        for (index, param) in signature.params.iter().enumerate() {
            checker.check_parameter(index, &param.name, &param.ty);
        }
        for (index, ret) in signature.returns.iter().enumerate() {
            checker.check_return(index, ret, index + 1 == signature.returns.len());
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

struct Checker<'a> {
    function: &'a str,
    errors: &'a mut Vec<ValidationError>,
}

impl Checker<'_> {
    fn reject(&mut self, position: &str, problem: Problem) {
        self.errors.push(ValidationError {
            function: self.function.to_string(),
            position: position.to_string(),
            problem,
        });
    }

    fn check_parameter(&mut self, index: usize, name: &str, ty: &TypeNode) {
        let position = format!("parameter {index} ({name})");
        if let TypeNode::Callback { params, is_void } = ty {
            self.check_callback(&position, params, *is_void);
        } else {
            self.check_node(ty, &position, false);
        }
    }

    fn check_return(&mut self, index: usize, ty: &TypeNode, is_last: bool) {
        let position = format!("return {index}");
        match ty {
            TypeNode::ErrorSentinel if is_last => {}
            TypeNode::Callback { params, is_void } => {
                self.reject(&position, Problem::CallbackAsReturn);
                // Still walk the parameter list so every problem in it
                // surfaces in the same report.
                self.check_callback(&position, params, *is_void);
            }
            other => self.check_node(other, &position, false),
        }
    }

    /// A callback in direct-parameter position. Anywhere else callbacks
    /// are rejected by `check_node`.
    fn check_callback(&mut self, position: &str, params: &[TypeNode], is_void: bool) {
        if !is_void {
            self.reject(position, Problem::CallbackWithResults);
        }
        for (index, param) in params.iter().enumerate() {
            let position = format!("{position}, callback parameter {index}");
            if matches!(param, TypeNode::Callback { .. }) {
                self.reject(&position, Problem::NestedCallback);
            } else {
                self.check_node(param, &position, true);
            }
        }
    }

    fn check_node(&mut self, ty: &TypeNode, position: &str, in_callback: bool) {
        match ty {
            TypeNode::Primitive(_) => {}
            TypeNode::Sequence(elem) => {
                let position = format!("{position}, element");
                self.check_node(elem, &position, in_callback);
            }
            TypeNode::Map { key, value } => {
                let string_key = matches!(
                    &**key,
                    TypeNode::Primitive(p) if p.kind == PrimitiveKind::String
                );
                if !string_key {
                    self.reject(position, Problem::NonStringMapKey(ty.spelling()));
                }
                let position = format!("{position}, map value");
                self.check_node(value, &position, in_callback);
            }
            TypeNode::Struct { fields, .. } => {
                for field in fields {
                    if field.name.is_empty() {
                        self.reject(position, Problem::AnonymousField);
                        continue;
                    }
                    let position = format!("{position}, field {}", field.name);
                    self.check_node(&field.ty, &position, in_callback);
                }
            }
            TypeNode::Pointer(elem) => self.check_node(elem, position, in_callback),
            TypeNode::ErrorSentinel => self.reject(position, Problem::ErrorNotLast),
            TypeNode::Callback { .. } => {
                if in_callback {
                    self.reject(position, Problem::NestedCallback);
                } else {
                    self.reject(position, Problem::CallbackNotParameter);
                }
            }
            TypeNode::Unsupported(name) => {
                self.reject(position, Problem::Unsupported(name.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Field, Parameter, Primitive};

    fn primitive(kind: PrimitiveKind, name: &str) -> TypeNode {
        TypeNode::Primitive(Primitive {
            kind,
            name: name.to_string(),
        })
    }

    fn func(name: &str, params: Vec<TypeNode>, returns: Vec<TypeNode>) -> Signature {
        Signature {
            name: name.to_string(),
            params: params
                .into_iter()
                .enumerate()
                .map(|(index, ty)| Parameter {
                    name: format!("p{index}"),
                    ty,
                })
                .collect(),
            returns,
            doc: None,
        }
    }

    fn first_message(signatures: &[Signature]) -> String {
        validate(signatures).unwrap_err().0[0].to_string()
    }

    #[test]
    fn accepts_every_primitive_kind() {
        let kinds = [
            (PrimitiveKind::String, "string"),
            (PrimitiveKind::Bool, "bool"),
            (PrimitiveKind::Int, "int"),
            (PrimitiveKind::Int8, "int8"),
            (PrimitiveKind::Int16, "int16"),
            (PrimitiveKind::Int32, "int32"),
            (PrimitiveKind::Int64, "int64"),
            (PrimitiveKind::Uint, "uint"),
            (PrimitiveKind::Uint8, "uint8"),
            (PrimitiveKind::Uint16, "uint16"),
            (PrimitiveKind::Uint32, "uint32"),
            (PrimitiveKind::Uint64, "uint64"),
            (PrimitiveKind::Float32, "float32"),
            (PrimitiveKind::Float64, "float64"),
            (PrimitiveKind::Assumed, "Celsius"),
        ];
        let signatures: Vec<_> = kinds
            .iter()
            .map(|(kind, name)| {
                func(
                    &format!("Take{name}"),
                    vec![primitive(*kind, name)],
                    vec![primitive(*kind, name)],
                )
            })
            .collect();
        assert!(validate(&signatures).is_ok());
    }

    #[test]
    fn accepts_supported_compound_shapes() {
        let person = TypeNode::Struct {
            name: Some("Person".to_string()),
            fields: vec![
                Field {
                    name: "Name".to_string(),
                    ty: primitive(PrimitiveKind::String, "string"),
                    alias: None,
                },
                Field {
                    name: "Age".to_string(),
                    ty: primitive(PrimitiveKind::Int, "int"),
                    alias: Some("age".to_string()),
                },
            ],
        };
        let signatures = vec![
            func(
                "Hash",
                vec![TypeNode::Sequence(Box::new(primitive(
                    PrimitiveKind::Uint8,
                    "byte",
                )))],
                vec![TypeNode::Sequence(Box::new(primitive(
                    PrimitiveKind::Uint8,
                    "byte",
                )))],
            ),
            func(
                "Count",
                vec![TypeNode::Map {
                    key: Box::new(primitive(PrimitiveKind::String, "string")),
                    value: Box::new(primitive(PrimitiveKind::Int, "int")),
                }],
                vec![],
            ),
            func("Save", vec![person], vec![TypeNode::ErrorSentinel]),
            func(
                "Watch",
                vec![TypeNode::Callback {
                    params: vec![
                        primitive(PrimitiveKind::Int, "int"),
                        primitive(PrimitiveKind::String, "string"),
                    ],
                    is_void: true,
                }],
                vec![],
            ),
        ];
        assert!(validate(&signatures).is_ok());
    }

    #[test]
    fn rejects_non_string_map_key() {
        let signatures = vec![func(
            "Lookup",
            vec![TypeNode::Map {
                key: Box::new(primitive(PrimitiveKind::Int, "int")),
                value: Box::new(primitive(PrimitiveKind::String, "string")),
            }],
            vec![],
        )];
        let message = first_message(&signatures);
        assert!(message.contains("unsupported map type map[int]string"), "{message}");
    }

    #[test]
    fn rejects_anonymous_field() {
        let signatures = vec![func(
            "Save",
            vec![TypeNode::Struct {
                name: None,
                fields: vec![Field {
                    name: String::new(),
                    ty: TypeNode::assumed("Base"),
                    alias: None,
                }],
            }],
            vec![],
        )];
        let message = first_message(&signatures);
        assert!(
            message.contains("anonymous/embedded field not supported"),
            "{message}"
        );
    }

    #[test]
    fn rejects_non_void_callback() {
        let signatures = vec![func(
            "Watch",
            vec![TypeNode::Callback {
                params: vec![],
                is_void: false,
            }],
            vec![],
        )];
        let message = first_message(&signatures);
        assert!(
            message.contains("only void callbacks are supported"),
            "{message}"
        );
    }

    #[test]
    fn rejects_nested_callback() {
        let signatures = vec![func(
            "Watch",
            vec![TypeNode::Callback {
                params: vec![TypeNode::Callback {
                    params: vec![],
                    is_void: true,
                }],
                is_void: true,
            }],
            vec![],
        )];
        let message = first_message(&signatures);
        assert!(message.contains("nested callback"), "{message}");
    }

    #[test]
    fn rejects_callback_as_return_type() {
        let signatures = vec![func(
            "Subscribe",
            vec![],
            vec![TypeNode::Callback {
                params: vec![],
                is_void: true,
            }],
        )];
        let message = first_message(&signatures);
        assert!(
            message.contains("callback not supported as a return type"),
            "{message}"
        );
    }

    #[test]
    fn rejects_callback_buried_in_a_struct() {
        let signatures = vec![func(
            "Configure",
            vec![TypeNode::Struct {
                name: None,
                fields: vec![Field {
                    name: "OnDone".to_string(),
                    ty: TypeNode::Callback {
                        params: vec![],
                        is_void: true,
                    },
                    alias: None,
                }],
            }],
            vec![],
        )];
        let message = first_message(&signatures);
        assert!(
            message.contains("callback only supported as a direct function parameter"),
            "{message}"
        );
    }

    #[test]
    fn rejects_out_of_position_error() {
        let signatures = vec![func(
            "Divide",
            vec![],
            vec![
                TypeNode::ErrorSentinel,
                primitive(PrimitiveKind::Int, "int"),
            ],
        )];
        let message = first_message(&signatures);
        assert!(
            message.contains("error return type must be last"),
            "{message}"
        );
    }

    #[test]
    fn rejects_unsupported_marker() {
        let signatures = vec![func(
            "Recv",
            vec![TypeNode::Unsupported("chan int".to_string())],
            vec![],
        )];
        let message = first_message(&signatures);
        assert!(message.contains("chan int is not supported"), "{message}");
    }

    #[test]
    fn collects_every_violation_before_reporting() {
        let signatures = vec![
            func(
                "First",
                vec![TypeNode::Unsupported("chan int".to_string())],
                vec![],
            ),
            func(
                "Second",
                vec![
                    TypeNode::Unsupported("interface{}".to_string()),
                    TypeNode::Callback {
                        params: vec![],
                        is_void: false,
                    },
                ],
                vec![TypeNode::ErrorSentinel, primitive(PrimitiveKind::Int, "int")],
            ),
        ];
        let errors = validate(&signatures).unwrap_err();
        assert_eq!(errors.0.len(), 4);
        let report = errors.to_string();
        assert!(report.contains("First"), "{report}");
        assert!(report.contains("Second"), "{report}");
    }
}
