use std::path::Path;

use serde::{Deserialize, Serialize};

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "lambdalocal.toml";

/// lambdalocal.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LambdaLocalConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Connection settings for the local emulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Emulator base address
    #[serde(default = "default_endpoint_url")]
    pub url: String,
    /// Placeholder access key accepted by the emulator
    #[serde(default = "default_access_key_id")]
    pub access_key_id: String,
    /// Placeholder secret key accepted by the emulator
    #[serde(default = "default_secret_access_key")]
    pub secret_access_key: String,
    /// Execution role attached to newly created functions
    #[serde(default = "default_role")]
    pub default_role: String,
    /// Stage every gateway deployment is published to
    #[serde(default = "default_stage")]
    pub stage: String,
}

/// Method/path shape wired under the gateway root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP method of the wired route (`ANY` matches every verb)
    #[serde(default = "default_http_method")]
    pub http_method: String,
    /// Path part created under `/`, e.g. `{proxy+}` or `{somethingId}`
    #[serde(default = "default_path_part")]
    pub path_part: String,
}

/// Reverse-proxy container settings used by `forward`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Container image providing `mitmweb`
    #[serde(default = "default_proxy_image")]
    pub image: String,
    /// Port receiving proxied traffic
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Port serving the management web UI
    #[serde(default = "default_web_port")]
    pub web_port: u16,
    /// Externally visible path prefix remapped onto the gateway
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Emulator address as seen from inside the proxy container
    #[serde(default = "default_upstream")]
    pub upstream: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            access_key_id: default_access_key_id(),
            secret_access_key: default_secret_access_key(),
            default_role: default_role(),
            stage: default_stage(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_method: default_http_method(),
            path_part: default_path_part(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            image: default_proxy_image(),
            listen_port: default_listen_port(),
            web_port: default_web_port(),
            path_prefix: default_path_prefix(),
            upstream: default_upstream(),
        }
    }
}

impl LambdaLocalConfig {
    /// Load from lambdalocal.toml in the given directory, or return defaults if not found.
    pub fn load(dir: &Path) -> crate::Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

impl EndpointConfig {
    /// Path under the emulator that serves requests for a deployed gateway stage.
    ///
    /// ```
    /// use lambdalocal_core::EndpointConfig;
    ///
    /// let endpoint = EndpointConfig::default();
    /// assert_eq!(
    ///     endpoint.invocation_base_path("abc123"),
    ///     "/restapis/abc123/local/_user_request_/"
    /// );
    /// ```
    pub fn invocation_base_path(&self, gateway_id: &str) -> String {
        format!(
            "/restapis/{gateway_id}/{stage}/_user_request_/",
            stage = self.stage
        )
    }

    /// Full URL for `path` on a deployed gateway stage.
    pub fn invocation_url(&self, gateway_id: &str, path: &str) -> String {
        format!(
            "{base}{prefix}{path}",
            base = self.url.trim_end_matches('/'),
            prefix = self.invocation_base_path(gateway_id),
            path = path.trim_start_matches('/'),
        )
    }
}

fn default_endpoint_url() -> String {
    "http://localhost:4566".to_owned()
}

fn default_access_key_id() -> String {
    "asdf".to_owned()
}

fn default_secret_access_key() -> String {
    "1234".to_owned()
}

fn default_role() -> String {
    "arn:aws:iam::000000000000:role/lambda-role".to_owned()
}

fn default_stage() -> String {
    "local".to_owned()
}

fn default_http_method() -> String {
    "ANY".to_owned()
}

fn default_path_part() -> String {
    "{proxy+}".to_owned()
}

fn default_proxy_image() -> String {
    "mitmproxy/mitmproxy".to_owned()
}

fn default_listen_port() -> u16 {
    8080
}

fn default_web_port() -> u16 {
    8081
}

fn default_path_prefix() -> String {
    "/".to_owned()
}

fn default_upstream() -> String {
    "http://host.docker.internal:4566".to_owned()
}
