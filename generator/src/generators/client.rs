use gowasm_decl::{Signature, TypeNode};

use super::common::{jsdoc_type, GeneratorContext, EXPORTS_GLOBAL};
use crate::emit::SourceWriter;
use crate::naming;
use crate::CallingConvention;

pub(super) fn generate(ctx: &GeneratorContext) -> String {
    match ctx.convention {
        CallingConvention::Sync => sync_client(ctx),
        CallingConvention::Worker => worker_client(ctx),
    }
}

fn sync_client(ctx: &GeneratorContext) -> String {
    let mut w = SourceWriter::new();
    w.line("// Code generated by gowasm-generator. DO NOT EDIT.");
    w.blank();
    w.line("/**");
    w.line(&format!(
        " * Blocking client for the {} wasm module.",
        ctx.type_name
    ));
    w.line(" *");
    w.line(" * The Go runtime support script (wasm_exec.js) must be loaded first,");
    w.line(" * and init() must resolve before any method is called. Methods block");
    w.line(" * the calling thread until the module returns.");
    w.line(" */");
    w.open(&format!("export class {} {{", ctx.type_name));
    w.open("constructor() {");
    w.line("this._exports = null;");
    w.close("}");
    w.blank();
    w.line("/**");
    w.line(" * Instantiates the wasm module and waits for it to register its");
    w.line(" * exports.");
    w.line(" * @param {string} wasmUrl");
    w.line(" */");
    w.open("async init(wasmUrl) {");
    w.line("const go = new Go();");
    w.line(
        "const { instance } = await WebAssembly.instantiateStreaming(fetch(wasmUrl), go.importObject);",
    );
    w.line("go.run(instance);");
    w.line(&format!("this._exports = globalThis.{EXPORTS_GLOBAL};"));
    w.close("}");

    for signature in ctx.signatures {
        w.blank();
        let params = param_names(signature);
        write_jsdoc(&mut w, signature, false);
        w.open(&format!(
            "{}({}) {{",
            naming::method_name(&signature.name),
            params.join(", ")
        ));
        w.line(&format!(
            "return unwrap(this._exports.{}({}));",
            naming::method_name(&signature.name),
            params.join(", ")
        ));
        w.close("}");
    }
    w.close("}");
    w.blank();
    w.open("function unwrap(result) {");
    w.open("if (result !== null && typeof result === \"object\" && \"error\" in result) {");
    w.line("throw new Error(result.error);");
    w.close("}");
    w.line("return result;");
    w.close("}");
    w.finish()
}

fn worker_client(ctx: &GeneratorContext) -> String {
    let mut w = SourceWriter::new();
    w.line("// Code generated by gowasm-generator. DO NOT EDIT.");
    w.blank();
    w.line("/**");
    w.line(&format!(
        " * Asynchronous client for the {} wasm module.",
        ctx.type_name
    ));
    w.line(" *");
    w.line(" * Calls are relayed to a dedicated worker over a message channel and");
    w.line(" * correlated by request id, never by arrival order. Callback");
    w.line(" * arguments are registered in a dispatch table for the duration of");
    w.line(" * their originating call and become invalid once it settles.");
    w.line(" */");
    w.open(&format!("export class {} {{", ctx.type_name));
    w.open("constructor() {");
    w.line("this._worker = null;");
    w.line("this._pending = new Map();");
    w.line("this._callbacks = new Map();");
    w.line("this._nextRequest = 1;");
    w.line("this._nextHandle = 1;");
    w.close("}");
    w.blank();
    w.line("/**");
    w.line(" * Spawns the bridge worker and waits for the wasm module to come up");
    w.line(" * inside it.");
    w.line(" * @param {string} bridgeUrl");
    w.line(" * @param {string} wasmUrl");
    w.line(" */");
    w.open("async init(bridgeUrl, wasmUrl) {");
    w.line("this._worker = new Worker(bridgeUrl);");
    w.open("const ready = new Promise((resolve, reject) => {");
    w.open("this._worker.onmessage = (event) => {");
    w.open("if (event.data.type === \"ready\") {");
    w.line("resolve();");
    w.chain("} else {");
    w.line("reject(new Error(\"unexpected message before ready\"));");
    w.close("}");
    w.close("};");
    w.close("});");
    w.line("this._worker.postMessage({ type: \"init\", wasm: wasmUrl });");
    w.line("await ready;");
    w.line("this._worker.onmessage = (event) => this._onMessage(event.data);");
    w.close("}");
    w.blank();
    w.line("/**");
    w.line(" * Tears the worker down. All in-flight calls reject and every live");
    w.line(" * callback handle is invalidated.");
    w.line(" */");
    w.open("terminate() {");
    w.line("this._worker.terminate();");
    w.open("for (const pending of this._pending.values()) {");
    w.line("pending.reject(new Error(\"worker terminated\"));");
    w.close("}");
    w.line("this._pending.clear();");
    w.line("this._callbacks.clear();");
    w.close("}");

    for signature in ctx.signatures {
        w.blank();
        let params = param_names(signature);
        let callback_indices = signature
            .params
            .iter()
            .enumerate()
            .filter(|(_, param)| matches!(param.ty, TypeNode::Callback { .. }))
            .map(|(index, _)| index.to_string())
            .collect::<Vec<_>>();
        write_jsdoc(&mut w, signature, true);
        w.open(&format!(
            "{}({}) {{",
            naming::method_name(&signature.name),
            params.join(", ")
        ));
        w.line(&format!(
            "return this._call(\"{}\", [{}], [{}]);",
            naming::method_name(&signature.name),
            params.join(", "),
            callback_indices.join(", ")
        ));
        w.close("}");
    }

    w.blank();
    w.open("_onMessage(message) {");
    w.open("if (message.type === \"callback\") {");
    w.line("const callback = this._callbacks.get(message.handle);");
    w.open("if (callback) {");
    w.line("callback(...message.args);");
    w.close("}");
    w.line("return;");
    w.close("}");
    w.open("if (message.type !== \"result\") {");
    w.line("return;");
    w.close("}");
    w.line("const pending = this._pending.get(message.id);");
    w.open("if (!pending) {");
    w.line("return;");
    w.close("}");
    w.line("this._pending.delete(message.id);");
    w.open("for (const handle of pending.handles) {");
    w.line("this._callbacks.delete(handle);");
    w.close("}");
    w.open("if (message.error !== undefined) {");
    w.line("pending.reject(new Error(message.error));");
    w.chain("} else {");
    w.line("pending.resolve(message.value);");
    w.close("}");
    w.close("}");
    w.blank();
    w.open("_call(method, args, callbackIndices) {");
    w.line("const id = this._nextRequest++;");
    w.line("const handles = [];");
    w.open("for (const index of callbackIndices) {");
    w.line("const handle = this._nextHandle++;");
    w.line("this._callbacks.set(handle, args[index]);");
    w.line("args[index] = handle;");
    w.line("handles.push(handle);");
    w.close("}");
    w.open("return new Promise((resolve, reject) => {");
    w.line("this._pending.set(id, { resolve, reject, handles });");
    w.line("this._worker.postMessage({ type: \"call\", id, method, args });");
    w.close("});");
    w.close("}");
    w.close("}");
    w.finish()
}

fn param_names(signature: &Signature) -> Vec<String> {
    signature
        .params
        .iter()
        .map(|param| naming::js_ident(&param.name))
        .collect()
}

fn write_jsdoc(w: &mut SourceWriter, signature: &Signature, promised: bool) {
    w.line("/**");
    if let Some(doc) = &signature.doc {
        for line in doc.lines() {
            if line.is_empty() {
                w.line(" *");
            } else {
                w.line(&format!(" * {line}"));
            }
        }
        w.line(" *");
    }
    for param in &signature.params {
        w.line(&format!(
            " * @param {{{}}} {}",
            jsdoc_type(&param.ty),
            naming::js_ident(&param.name)
        ));
    }
    let (values, _) = signature.split_returns();
    let returns = match values.len() {
        0 => None,
        1 => Some(jsdoc_type(&values[0])),
        _ => Some("Array".to_string()),
    };
    match (returns, promised) {
        (Some(ty), true) => w.line(&format!(" * @returns {{Promise<{ty}>}}")),
        (Some(ty), false) => w.line(&format!(" * @returns {{{ty}}}")),
        (None, true) => w.line(" * @returns {Promise<void>}"),
        (None, false) => {}
    }
    w.line(" */");
}
