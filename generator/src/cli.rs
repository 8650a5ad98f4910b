use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Mode {
    Sync,
    Worker,
}

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(value_parser, help = "Module declarations file produced by the front end")]
    pub decls: PathBuf,

    #[clap(
        long,
        value_enum,
        default_value = "sync",
        help = "Calling convention of the generated client"
    )]
    pub mode: Mode,

    #[clap(long, help = "Override the derived client module name")]
    pub name: Option<String>,

    #[clap(long, default_value = ".", help = "Directory the artifacts are written to")]
    pub output: PathBuf,
}
