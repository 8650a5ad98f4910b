use super::common::{GeneratorContext, DISPATCH_GLOBAL, ERROR_KEY, EXPORTS_GLOBAL};
use crate::emit::SourceWriter;

pub(super) fn generate(ctx: &GeneratorContext) -> String {
    let mut w = SourceWriter::new();
    w.line("// Code generated by gowasm-generator. DO NOT EDIT.");
    w.line(&format!(
        "// Bridge worker for the {} wasm module.",
        ctx.type_name
    ));
    w.blank();
    w.line("importScripts(\"wasm_exec.js\");");
    w.blank();
    w.line("let exports = null;");
    w.blank();
    w.line("// Invoked by the glue adapters with a handle and an array of");
    w.line("// already-converted arguments; the matching function lives in the");
    w.line("// client's dispatch table on the other side of the channel.");
    w.open(&format!("globalThis.{DISPATCH_GLOBAL} = (handle, args) => {{"));
    w.line("const plain = [];");
    w.open("for (let i = 0; i < args.length; i++) {");
    w.line("plain.push(args[i]);");
    w.close("}");
    w.line("postMessage({ type: \"callback\", handle, args: plain });");
    w.close("};");
    w.blank();
    w.open("onmessage = async (event) => {");
    w.line("const message = event.data;");
    w.open("if (message.type === \"init\") {");
    w.line("const go = new Go();");
    w.line("const response = await fetch(message.wasm);");
    w.line(
        "const { instance } = await WebAssembly.instantiate(await response.arrayBuffer(), go.importObject);",
    );
    w.line("go.run(instance);");
    w.line(&format!("exports = globalThis.{EXPORTS_GLOBAL};"));
    w.line("postMessage({ type: \"ready\" });");
    w.line("return;");
    w.close("}");
    w.open("if (message.type !== \"call\") {");
    w.line("return;");
    w.close("}");
    w.line("let result;");
    w.open("try {");
    w.line("result = exports[message.method](...message.args);");
    w.chain("} catch (err) {");
    w.line("postMessage({ type: \"result\", id: message.id, error: String(err) });");
    w.line("return;");
    w.close("}");
    w.open(&format!(
        "if (result !== null && typeof result === \"object\" && \"{ERROR_KEY}\" in result) {{"
    ));
    w.line(&format!(
        "postMessage({{ type: \"result\", id: message.id, error: result.{ERROR_KEY} }});"
    ));
    w.chain("} else {");
    w.line("postMessage({ type: \"result\", id: message.id, value: result });");
    w.close("}");
    w.close("};");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CallingConvention;

    fn bridge() -> String {
        let ctx = GeneratorContext {
            signatures: &[],
            convention: CallingConvention::Worker,
            type_name: "GoDemo",
        };
        generate(&ctx)
    }

    #[test]
    fn defines_the_dispatch_global() {
        let bridge = bridge();
        assert!(
            bridge.contains("globalThis.__gowasm_dispatch = (handle, args) => {"),
            "{bridge}"
        );
        assert!(
            bridge.contains("postMessage({ type: \"callback\", handle, args: plain });"),
            "{bridge}"
        );
    }

    #[test]
    fn relays_results_with_their_request_id() {
        let bridge = bridge();
        assert!(
            bridge.contains("postMessage({ type: \"result\", id: message.id, value: result });"),
            "{bridge}"
        );
        assert!(
            bridge.contains("postMessage({ type: \"result\", id: message.id, error: result.error });"),
            "{bridge}"
        );
    }

    #[test]
    fn failed_calls_are_reported_not_thrown() {
        let bridge = bridge();
        assert!(bridge.contains("} catch (err) {"), "{bridge}");
        assert!(
            bridge.contains("postMessage({ type: \"result\", id: message.id, error: String(err) });"),
            "{bridge}"
        );
    }

    #[test]
    fn loads_the_module_before_reporting_ready() {
        let bridge = bridge();
        assert!(bridge.contains("importScripts(\"wasm_exec.js\");"), "{bridge}");
        assert!(bridge.contains("exports = globalThis.__gowasm_exports;"), "{bridge}");
        assert!(bridge.contains("postMessage({ type: \"ready\" });"), "{bridge}");
    }
}
