mod cli;

use clap::Parser;

use gowasm_decl as decl;
use gowasm_generator::{generate, CallingConvention, Config};

fn main() {
    env_logger::init();
    let cli = cli::Cli::parse();

    let source = std::fs::read_to_string(&cli.decls).expect("failed to read declarations file");
    let module: decl::Module =
        serde_json::from_str(&source).expect("malformed declarations file");

    let (signatures, _registry) = decl::build_module(&module);
    log::info!(
        "resolved {} exported function(s) from {}",
        signatures.len(),
        module.name
    );

    if let Err(errors) = decl::validate(&signatures) {
        eprint!("{errors}");
        std::process::exit(1);
    }

    let config = Config {
        convention: match cli.mode {
            cli::Mode::Sync => CallingConvention::Sync,
            cli::Mode::Worker => CallingConvention::Worker,
        },
        module_name: cli.name,
    };
    let artifacts = generate(&module.name, &signatures, &config);
    artifacts
        .write_to(&cli.output)
        .expect("failed to write artifacts");
}
