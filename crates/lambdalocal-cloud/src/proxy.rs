use lambdalocal_core::{EndpointConfig, ProxyConfig};

use crate::apigateway::{ApiGatewayApi, GatewayClient, GatewayError};
use crate::executor::{ContainerExecutor, DockerCli, DockerError};

/// What to forward: the gateway's invocation path and where the container runs.
#[derive(Debug, Clone)]
pub struct ProxySpec {
    /// Function/gateway name, used to name the container
    pub name: String,
    /// Invocation path of the deployed stage, e.g. `/restapis/<id>/local/_user_request_/`
    pub invocation_path: String,
    /// Docker network to attach the container to
    pub network: Option<String>,
}

/// A started proxy container. Nothing supervises it after launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedProxy {
    pub container_id: String,
    pub container_name: String,
    pub invocation_path: String,
    pub listen_url: String,
    pub web_ui_url: String,
}

/// Launches a detached mitmproxy container in reverse-proxy mode.
pub struct ProxyLauncher<E: ContainerExecutor = DockerCli> {
    executor: E,
    config: ProxyConfig,
}

impl ProxyLauncher<DockerCli> {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            executor: DockerCli,
            config,
        }
    }
}

impl<E: ContainerExecutor> ProxyLauncher<E> {
    pub fn with_executor(executor: E, config: ProxyConfig) -> Self {
        Self { executor, config }
    }

    pub fn container_name(name: &str) -> String {
        format!("lambdalocal-{name}-proxy")
    }

    /// mitmproxy `--map-remote` rule rewriting the configured prefix onto
    /// `invocation_path`, keeping scheme and host.
    ///
    /// A non-root prefix matches with or without its trailing slash, so both
    /// `/api` and `/api/orders` are rewritten.
    pub fn map_remote_rule(&self, invocation_path: &str) -> String {
        let prefix = self.config.path_prefix.trim_matches('/');
        let pattern = if prefix.is_empty() {
            "^(https?://[^/]+)/".to_owned()
        } else {
            format!("^(https?://[^/]+)/{}(?:/|$)", escape_regex(prefix))
        };
        format!(r"|{pattern}|\1{invocation_path}")
    }

    /// Arguments passed to `docker` to start the proxy.
    pub fn run_args(&self, spec: &ProxySpec) -> Vec<String> {
        let listen = self.config.listen_port.to_string();
        let web = self.config.web_port.to_string();

        let mut args: Vec<String> = [
            "run",
            "--detach",
            "--rm",
            "--name",
            &Self::container_name(&spec.name),
            "--add-host",
            "host.docker.internal:host-gateway",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();

        if let Some(network) = &spec.network {
            args.push("--network".to_owned());
            args.push(network.clone());
        }

        args.extend(
            [
                "--publish",
                &format!("{listen}:{listen}"),
                "--publish",
                &format!("{web}:{web}"),
                &self.config.image,
                "mitmweb",
                "--web-host",
                "0.0.0.0",
                "--web-port",
                &web,
                "--listen-port",
                &listen,
                "--mode",
                &format!("reverse:{}", self.config.upstream),
                "--ssl-insecure",
                "--map-remote",
                &self.map_remote_rule(&spec.invocation_path),
            ]
            .iter()
            .map(|s| (*s).to_owned()),
        );

        args
    }

    /// Start the container detached and return as soon as docker reports its id.
    pub async fn launch(&self, spec: &ProxySpec) -> Result<LaunchedProxy, ProxyError> {
        let args = self.run_args(spec);
        tracing::info!(
            name = %spec.name,
            image = %self.config.image,
            "starting proxy container"
        );

        let output = self
            .executor
            .exec(&args)
            .await
            .map_err(|e| ProxyError::Launch { source: e })?;

        let container_id = output.trim().to_owned();
        if container_id.is_empty() {
            return Err(ProxyError::MissingContainerId);
        }

        Ok(LaunchedProxy {
            container_id,
            container_name: Self::container_name(&spec.name),
            invocation_path: spec.invocation_path.clone(),
            listen_url: format!("http://localhost:{}", self.config.listen_port),
            web_ui_url: format!("http://localhost:{}", self.config.web_port),
        })
    }

    /// Look up the gateway named `name` and forward to its published stage.
    ///
    /// Docker is not touched unless the gateway exists.
    pub async fn forward<A: ApiGatewayApi>(
        &self,
        gateways: &GatewayClient<A>,
        name: &str,
        endpoint: &EndpointConfig,
        network: Option<&str>,
    ) -> Result<LaunchedProxy, ProxyError> {
        let gateway = gateways
            .find_gateway(name)
            .await
            .map_err(|e| ProxyError::Lookup { source: e })?
            .ok_or_else(|| ProxyError::NoGateway {
                name: name.to_owned(),
            })?;
        tracing::debug!(%name, gateway_id = %gateway.id, "forwarding to gateway");

        let spec = ProxySpec {
            name: name.to_owned(),
            invocation_path: endpoint.invocation_base_path(&gateway.id),
            network: network.map(str::to_owned),
        };
        self.launch(&spec).await
    }
}

fn escape_regex(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if r"\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("failed to look up gateway")]
    Lookup { source: GatewayError },

    #[error("no gateway named '{name}' found; run `lambdalocal apigw` first")]
    NoGateway { name: String },

    #[error("failed to start proxy container")]
    Launch { source: DockerError },

    #[error("docker did not report a container id")]
    MissingContainerId,
}
