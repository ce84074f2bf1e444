use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Function templates ──
    #[error("failed to read template {path}")]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse template {path}")]
    TemplateParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("template {path} has no entries under `Resources`")]
    NoResources { path: PathBuf },

    #[error(
        "template {path} defines {} resources ({}); exactly one is supported",
        ids.len(),
        ids.join(", ")
    )]
    MultipleResources { path: PathBuf, ids: Vec<String> },
}
