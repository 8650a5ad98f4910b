mod bridge;
mod client;
mod common;
mod glue;

use gowasm_decl::Signature;

use crate::naming;
use crate::{Artifacts, CallingConvention, Config};

pub(crate) fn generate(
    source_name: &str,
    signatures: &[Signature],
    config: &Config,
) -> Artifacts {
    let type_name = config
        .module_name
        .clone()
        .unwrap_or_else(|| naming::module_type_name(source_name));
    let ctx = common::GeneratorContext {
        signatures,
        convention: config.convention,
        type_name: &type_name,
    };
    let glue = glue::generate(&ctx);
    let client = client::generate(&ctx);
    let bridge = match config.convention {
        CallingConvention::Worker => Some(bridge::generate(&ctx)),
        CallingConvention::Sync => None,
    };
    Artifacts {
        type_name,
        glue,
        client,
        bridge,
    }
}
