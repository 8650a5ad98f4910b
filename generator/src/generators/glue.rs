use gowasm_decl::{Primitive, PrimitiveKind, Signature, TypeNode};

use super::common::{self, GeneratorContext, DISPATCH_GLOBAL, ERROR_KEY, EXPORTS_GLOBAL};
use crate::emit::SourceWriter;
use crate::naming;
use crate::CallingConvention;

pub(super) fn generate(ctx: &GeneratorContext) -> String {
    let mut glue = Glue {
        w: SourceWriter::new(),
        convention: ctx.convention,
        tmp: 0,
    };
    glue.w.line("// Code generated by gowasm-generator. DO NOT EDIT.");
    glue.w.blank();
    glue.w.line("//go:build js && wasm");
    glue.w.blank();
    glue.w.line("package main");
    glue.w.blank();
    if ctx.signatures.is_empty() {
        glue.w.line("import \"syscall/js\"");
    } else {
        glue.w.open("import (");
        glue.w.line("\"fmt\"");
        glue.w.line("\"syscall/js\"");
        glue.w.close(")");
    }
    glue.w.blank();

    for signature in ctx.signatures {
        glue.write_wrapper(signature);
        glue.w.blank();
    }

    glue.w.open("func gowasmRegister() {");
    glue.w.line("exports := js.Global().Get(\"Object\").New()");
    for signature in ctx.signatures {
        glue.w.line(&format!(
            "exports.Set(\"{}\", js.FuncOf({}))",
            naming::method_name(&signature.name),
            naming::wrapper_name(&signature.name)
        ));
    }
    glue.w
        .line(&format!("js.Global().Set(\"{EXPORTS_GLOBAL}\", exports)"));
    glue.w.close("}");
    glue.w.blank();

    // The runtime must stay alive for as long as the host side may call
    // into the module.
    glue.w.open("func main() {");
    glue.w.line("gowasmRegister()");
    glue.w.line("select {}");
    glue.w.close("}");
    glue.w.finish()
}

struct Glue {
    w: SourceWriter,
    convention: CallingConvention,
    tmp: usize,
}

impl Glue {
    fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}{}", self.tmp);
        self.tmp += 1;
        name
    }

    fn write_wrapper(&mut self, signature: &Signature) {
        self.tmp = 0;
        if let Some(doc) = &signature.doc {
            for line in doc.lines() {
                if line.is_empty() {
                    self.w.line("//");
                } else {
                    self.w.line(&format!("// {line}"));
                }
            }
        }
        self.w.open(&format!(
            "func {}(this js.Value, args []js.Value) (result interface{{}}) {{",
            naming::wrapper_name(&signature.name)
        ));
        self.w.open("defer func() {");
        self.w.open("if r := recover(); r != nil {");
        self.w.line(&format!(
            "result = map[string]interface{{}}{{\"{ERROR_KEY}\": fmt.Sprint(r)}}"
        ));
        self.w.close("}");
        self.w.close("}()");
        self.w.open(&format!("if len(args) != {} {{", signature.params.len()));
        self.w.line(&format!(
            "panic(fmt.Sprintf(\"{}: expected {} argument(s), got %d\", len(args)))",
            signature.name,
            signature.params.len()
        ));
        self.w.close("}");

        for (index, param) in signature.params.iter().enumerate() {
            if let TypeNode::Callback { params, .. } = &param.ty {
                match self.convention {
                    CallingConvention::Sync => self.write_sync_adapter(index, params),
                    CallingConvention::Worker => self.write_worker_adapter(index, params),
                }
            } else {
                self.extract_into(&param.ty, &format!("args[{index}]"), &format!("arg{index}"));
            }
        }

        let call_args = (0..signature.params.len())
            .map(|index| format!("arg{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        if signature.returns.is_empty() {
            self.w.line(&format!("{}({call_args})", signature.name));
            self.w.line("return nil");
        } else {
            let ret_names = (0..signature.returns.len())
                .map(|index| format!("res{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            self.w
                .line(&format!("{ret_names} := {}({call_args})", signature.name));
            let (values, has_error) = signature.split_returns();
            if has_error {
                let err = format!("res{}", signature.returns.len() - 1);
                self.w.open(&format!("if {err} != nil {{"));
                self.w.line(&format!(
                    "return map[string]interface{{}}{{\"{ERROR_KEY}\": {err}.Error()}}"
                ));
                self.w.close("}");
            }
            match values.len() {
                0 => self.w.line("return nil"),
                1 => {
                    self.to_js_into(&values[0], "res0", "out0");
                    self.w.line("return out0");
                }
                _ => {
                    self.w.line("ret := js.Global().Get(\"Array\").New()");
                    for (index, value) in values.iter().enumerate() {
                        self.to_js_into(value, &format!("res{index}"), &format!("out{index}"));
                        self.w.line(&format!("ret.Call(\"push\", out{index})"));
                    }
                    self.w.line("return ret");
                }
            }
        }
        self.w.close("}");
    }

    fn write_sync_adapter(&mut self, index: usize, params: &[TypeNode]) {
        let cb = format!("cb{index}");
        self.w.line(&format!("{cb} := args[{index}]"));
        self.w.open(&format!(
            "arg{index} := func({}) {{",
            go_param_list(params)
        ));
        let mut invoke_args = Vec::new();
        for (j, param) in params.iter().enumerate() {
            invoke_args.push(self.converted_callback_arg(param, &format!("p{j}")));
        }
        self.w
            .line(&format!("{cb}.Invoke({})", invoke_args.join(", ")));
        self.w.close("}");
    }

    // The handle is only valid while the enclosing call is in flight.
    fn write_worker_adapter(&mut self, index: usize, params: &[TypeNode]) {
        let handle = format!("handle{index}");
        self.w.line(&format!("{handle} := args[{index}].Int()"));
        self.w.open(&format!(
            "arg{index} := func({}) {{",
            go_param_list(params)
        ));
        let array = self.fresh("cbArgs");
        self.w
            .line(&format!("{array} := js.Global().Get(\"Array\").New()"));
        for (j, param) in params.iter().enumerate() {
            let arg = self.converted_callback_arg(param, &format!("p{j}"));
            self.w.line(&format!("{array}.Call(\"push\", {arg})"));
        }
        self.w.line(&format!(
            "js.Global().Call(\"{DISPATCH_GLOBAL}\", {handle}, {array})"
        ));
        self.w.close("}");
    }

    fn converted_callback_arg(&mut self, param: &TypeNode, src: &str) -> String {
        if let TypeNode::Primitive(p) = param {
            primitive_to_js(p, src)
        } else {
            let tmp = self.fresh("t");
            self.to_js_into(param, src, &tmp);
            tmp
        }
    }

    fn extract_into(&mut self, node: &TypeNode, src: &str, dst: &str) {
        match node {
            TypeNode::Primitive(p) => {
                self.w
                    .line(&format!("{dst} := {}", primitive_extract(p, src)));
            }
            TypeNode::Sequence(elem) if node.is_byte_sequence() => {
                self.w.line(&format!(
                    "{dst} := make([]{}, {src}.Length())",
                    elem.spelling()
                ));
                self.w.line(&format!("js.CopyBytesToGo({dst}, {src})"));
            }
            TypeNode::Sequence(elem) => {
                let i = self.fresh("i");
                self.w.line(&format!(
                    "{dst} := make([]{}, {src}.Length())",
                    elem.spelling()
                ));
                self.w
                    .open(&format!("for {i} := 0; {i} < len({dst}); {i}++ {{"));
                let item = format!("{src}.Index({i})");
                if let TypeNode::Primitive(p) = &**elem {
                    self.w
                        .line(&format!("{dst}[{i}] = {}", primitive_extract(p, &item)));
                } else {
                    let tmp = self.fresh("t");
                    self.extract_into(elem, &item, &tmp);
                    self.w.line(&format!("{dst}[{i}] = {tmp}"));
                }
                self.w.close("}");
            }
            TypeNode::Map { key, value } => {
                let keys = self.fresh("keys");
                let i = self.fresh("i");
                let k = self.fresh("k");
                self.w.line(&format!(
                    "{keys} := js.Global().Get(\"Object\").Call(\"keys\", {src})"
                ));
                self.w.line(&format!(
                    "{dst} := make({}, {keys}.Length())",
                    node.spelling()
                ));
                self.w
                    .open(&format!("for {i} := 0; {i} < {keys}.Length(); {i}++ {{"));
                self.w
                    .line(&format!("{k} := {keys}.Index({i}).String()"));
                let key_expr = match &**key {
                    TypeNode::Primitive(p) if p.name != "string" => format!("{}({k})", p.name),
                    _ => k.clone(),
                };
                let entry = format!("{src}.Get({k})");
                if let TypeNode::Primitive(p) = &**value {
                    self.w.line(&format!(
                        "{dst}[{key_expr}] = {}",
                        primitive_extract(p, &entry)
                    ));
                } else {
                    let tmp = self.fresh("t");
                    self.extract_into(value, &entry, &tmp);
                    self.w.line(&format!("{dst}[{key_expr}] = {tmp}"));
                }
                self.w.close("}");
            }
            TypeNode::Struct { fields, .. } => {
                let mut inits = Vec::new();
                for field in fields {
                    let member = format!("{src}.Get(\"{}\")", common::field_key(field));
                    let value = if let TypeNode::Primitive(p) = &field.ty {
                        primitive_extract(p, &member)
                    } else {
                        let tmp = self.fresh("t");
                        self.extract_into(&field.ty, &member, &tmp);
                        tmp
                    };
                    inits.push(format!("{}: {value}", field.name));
                }
                self.w.line(&format!(
                    "{dst} := {}{{{}}}",
                    node.spelling(),
                    inits.join(", ")
                ));
            }
            TypeNode::Pointer(elem) => {
                self.w.line(&format!("var {dst} {}", node.spelling()));
                self.w.open(&format!(
                    "if !{src}.IsNull() && !{src}.IsUndefined() {{"
                ));
                let tmp = self.fresh("t");
                self.extract_into(elem, src, &tmp);
                self.w.line(&format!("{dst} = &{tmp}"));
                self.w.close("}");
            }
            TypeNode::ErrorSentinel | TypeNode::Callback { .. } | TypeNode::Unsupported(_) => {
                panic!(
                    "no extraction rule for {}, the validator let it through",
                    node.spelling()
                );
            }
        }
    }

    fn to_js_into(&mut self, node: &TypeNode, src: &str, dst: &str) {
        match node {
            TypeNode::Primitive(p) => {
                self.w
                    .line(&format!("{dst} := {}", primitive_to_js(p, src)));
            }
            TypeNode::Sequence(_) if node.is_byte_sequence() => {
                self.w.line(&format!(
                    "{dst} := js.Global().Get(\"Uint8Array\").New(len({src}))"
                ));
                self.w.line(&format!("js.CopyBytesToJS({dst}, {src})"));
            }
            TypeNode::Sequence(elem) => match &**elem {
                TypeNode::Primitive(p) if p.kind.is_numeric() => {
                    let i = self.fresh("i");
                    self.w.line(&format!(
                        "{dst} := js.Global().Get(\"{}\").New(len({src}))",
                        common::typed_array(p.kind)
                    ));
                    self.w
                        .open(&format!("for {i} := 0; {i} < len({src}); {i}++ {{"));
                    self.w.line(&format!(
                        "{dst}.SetIndex({i}, {})",
                        primitive_to_js(p, &format!("{src}[{i}]"))
                    ));
                    self.w.close("}");
                }
                elem => {
                    let i = self.fresh("i");
                    self.w
                        .line(&format!("{dst} := js.Global().Get(\"Array\").New()"));
                    self.w
                        .open(&format!("for {i} := 0; {i} < len({src}); {i}++ {{"));
                    let item = format!("{src}[{i}]");
                    if let TypeNode::Primitive(p) = elem {
                        self.w.line(&format!(
                            "{dst}.Call(\"push\", {})",
                            primitive_to_js(p, &item)
                        ));
                    } else {
                        let tmp = self.fresh("t");
                        self.to_js_into(elem, &item, &tmp);
                        self.w.line(&format!("{dst}.Call(\"push\", {tmp})"));
                    }
                    self.w.close("}");
                }
            },
            TypeNode::Map { value, .. } => {
                let k = self.fresh("k");
                let v = self.fresh("v");
                self.w.line(&format!(
                    "{dst} := make(map[string]interface{{}}, len({src}))"
                ));
                self.w
                    .open(&format!("for {k}, {v} := range {src} {{"));
                if let TypeNode::Primitive(p) = &**value {
                    self.w.line(&format!(
                        "{dst}[string({k})] = {}",
                        primitive_to_js(p, &v)
                    ));
                } else {
                    let tmp = self.fresh("t");
                    self.to_js_into(value, &v, &tmp);
                    self.w.line(&format!("{dst}[string({k})] = {tmp}"));
                }
                self.w.close("}");
            }
            TypeNode::Struct { fields, .. } => {
                let mut inits = Vec::new();
                for field in fields {
                    let member = format!("{src}.{}", field.name);
                    let value = if let TypeNode::Primitive(p) = &field.ty {
                        primitive_to_js(p, &member)
                    } else {
                        let tmp = self.fresh("t");
                        self.to_js_into(&field.ty, &member, &tmp);
                        tmp
                    };
                    inits.push(format!("\"{}\": {value}", common::field_key(field)));
                }
                self.w.line(&format!(
                    "{dst} := map[string]interface{{}}{{{}}}",
                    inits.join(", ")
                ));
            }
            TypeNode::Pointer(elem) => {
                self.w
                    .line(&format!("var {dst} interface{{}} = js.Null()"));
                self.w.open(&format!("if {src} != nil {{"));
                let tmp = self.fresh("t");
                self.to_js_into(elem, &format!("(*{src})"), &tmp);
                self.w.line(&format!("{dst} = {tmp}"));
                self.w.close("}");
            }
            TypeNode::ErrorSentinel | TypeNode::Callback { .. } | TypeNode::Unsupported(_) => {
                panic!(
                    "no return rule for {}, the validator let it through",
                    node.spelling()
                );
            }
        }
    }
}

fn go_param_list(params: &[TypeNode]) -> String {
    params
        .iter()
        .enumerate()
        .map(|(index, param)| format!("p{index} {}", param.spelling()))
        .collect::<Vec<_>>()
        .join(", ")
}

// 64-bit integers ride the float accessor; values beyond the boundary's
// 53-bit mantissa lose precision.
fn primitive_extract(p: &Primitive, src: &str) -> String {
    use PrimitiveKind::*;
    let (accessor, native) = match p.kind {
        String => ("String", "string"),
        Bool => ("Bool", "bool"),
        Int | Int8 | Int16 | Int32 | Uint | Uint8 | Uint16 | Uint32 => ("Int", "int"),
        Int64 | Uint64 | Float32 | Float64 | Assumed => ("Float", "float64"),
    };
    let call = format!("{src}.{accessor}()");
    if p.name == native {
        call
    } else {
        format!("{}({call})", p.name)
    }
}

// Cast to a base type so named types still hit js.ValueOf's supported set.
fn primitive_to_js(p: &Primitive, src: &str) -> String {
    format!("{}({src})", common::base_go_type(p.kind))
}
