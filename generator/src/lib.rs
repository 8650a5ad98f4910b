mod generators;

pub mod emit;
pub mod naming;

use std::fs;
use std::io;
use std::path::Path;

use gowasm_decl::Signature;
use log::info;

// Chosen once per run and applied to every signature; only the callback
// protocol and the artifact set differ between the two conventions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallingConvention {
    Sync,
    Worker,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub convention: CallingConvention,
    pub module_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Artifacts {
    pub type_name: String,
    pub glue: String,
    pub client: String,
    // worker convention only
    pub bridge: Option<String>,
}

impl Artifacts {
    pub fn glue_file_name(&self) -> String {
        "gowasm_bindings.go".to_string()
    }

    pub fn client_file_name(&self) -> String {
        format!("{}.js", naming::file_stem(&self.type_name))
    }

    pub fn bridge_file_name(&self) -> String {
        format!("{}-bridge.js", naming::file_stem(&self.type_name))
    }

    pub fn write_to(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(self.glue_file_name()), &self.glue)?;
        info!("wrote {}", self.glue_file_name());
        fs::write(dir.join(self.client_file_name()), &self.client)?;
        info!("wrote {}", self.client_file_name());
        if let Some(bridge) = &self.bridge {
            fs::write(dir.join(self.bridge_file_name()), bridge)?;
            info!("wrote {}", self.bridge_file_name());
        }
        Ok(())
    }
}

pub fn generate(source_name: &str, signatures: &[Signature], config: &Config) -> Artifacts {
    generators::generate(source_name, signatures, config)
}
