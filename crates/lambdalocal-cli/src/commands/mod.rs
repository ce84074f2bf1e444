mod apigw;
mod deploy;
mod doctor;
mod forward;

use lambdalocal_core::ResourceDescriptor;
use std::path::{Path, PathBuf};

pub use apigw::{RouteOverrides, apigw};
pub use deploy::deploy;
pub use doctor::doctor;
pub use forward::forward;

/// Where the function descriptor comes from.
pub enum FunctionSource {
    Template(PathBuf),
    /// Legacy `--name/--handler/--runtime` flags
    Flags {
        name: String,
        handler: String,
        runtime: String,
    },
}

impl FunctionSource {
    pub fn resolve(&self) -> anyhow::Result<ResourceDescriptor> {
        match self {
            Self::Template(path) => load_template(path),
            Self::Flags {
                name,
                handler,
                runtime,
            } => Ok(ResourceDescriptor::new(name, handler, runtime)),
        }
    }
}

/// Load the template, logging where the descriptor came from.
pub(crate) fn load_template(path: &Path) -> anyhow::Result<ResourceDescriptor> {
    let descriptor = ResourceDescriptor::load(path)?;
    tracing::debug!(template = %path.display(), name = %descriptor.name, "loaded template");
    Ok(descriptor)
}
