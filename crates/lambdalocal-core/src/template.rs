//! Function template loading.
//!
//! A template is a YAML (or JSON) document describing the function to deploy:
//!
//! ```yaml
//! Resources:
//!   HelloFunction:
//!     Name: hello
//!     Handler: app.handler
//!     Runtime: python3.9
//!     Environment:
//!       STAGE: local
//! ```
//!
//! The logical id (`HelloFunction`) is free-form. Exactly one entry under
//! `Resources` is accepted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Runtime used when neither the template nor the command line names one.
pub const DEFAULT_RUNTIME: &str = "python3.9";

/// In-memory description of the function a command operates on.
///
/// The descriptor's `name` doubles as the gateway name: one function is
/// bound to one gateway by convention.
///
/// # Examples
///
/// ```
/// use lambdalocal_core::ResourceDescriptor;
/// use std::path::Path;
///
/// let doc = r#"{"Resources": {"x": {"Name": "f", "Handler": "h", "Runtime": "python3.9"}}}"#;
/// let descriptor = ResourceDescriptor::parse(doc, Path::new("template.json")).unwrap();
/// assert_eq!(descriptor.name, "f");
/// assert!(descriptor.environment.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub name: String,
    pub handler: String,
    pub runtime: String,
    pub environment: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct TemplateDocument {
    #[serde(rename = "Resources")]
    resources: BTreeMap<String, ResourceEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResourceEntry {
    name: String,
    handler: String,
    #[serde(default = "default_runtime")]
    runtime: String,
    #[serde(default)]
    environment: BTreeMap<String, String>,
}

impl ResourceDescriptor {
    /// Build a descriptor from individual values (legacy `--name/--handler` flags).
    pub fn new(
        name: impl Into<String>,
        handler: impl Into<String>,
        runtime: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            handler: handler.into(),
            runtime: runtime.into(),
            environment: BTreeMap::new(),
        }
    }

    /// Read and parse the template at `path`.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::TemplateRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Parse template `content`; `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> crate::Result<Self> {
        let document: TemplateDocument =
            serde_yaml::from_str(content).map_err(|e| crate::Error::TemplateParse {
                path: origin.to_path_buf(),
                source: e,
            })?;

        let mut resources = document.resources.into_iter();
        let Some((logical_id, entry)) = resources.next() else {
            return Err(crate::Error::NoResources {
                path: origin.to_path_buf(),
            });
        };

        let extra: Vec<String> = resources.map(|(id, _)| id).collect();
        if !extra.is_empty() {
            let mut ids = vec![logical_id];
            ids.extend(extra);
            return Err(crate::Error::MultipleResources {
                path: PathBuf::from(origin),
                ids,
            });
        }

        tracing::debug!(%logical_id, name = %entry.name, "parsed template resource");

        Ok(Self {
            name: entry.name,
            handler: entry.handler,
            runtime: entry.runtime,
            environment: entry.environment,
        })
    }
}

fn default_runtime() -> String {
    DEFAULT_RUNTIME.to_owned()
}
