use crate::error::RemoteError;
use crate::sdk::{SdkApiGateway, SdkConfig};

/// REST API gateway operations used by lambdalocal.
///
/// Listings are returned in the order the control plane reports them;
/// lookups on top of them take the first match.
#[allow(async_fn_in_trait)]
pub trait ApiGatewayApi: Send + Sync {
    async fn list_rest_apis(&self) -> Result<Vec<Gateway>, RemoteError>;

    async fn create_rest_api(&self, name: &str) -> Result<Gateway, RemoteError>;

    async fn list_resources(&self, gateway_id: &str) -> Result<Vec<PathResource>, RemoteError>;

    async fn create_resource(
        &self,
        gateway_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<PathResource, RemoteError>;

    async fn put_method(
        &self,
        gateway_id: &str,
        resource_id: &str,
        method: &MethodSpec,
    ) -> Result<(), RemoteError>;

    async fn put_integration(
        &self,
        gateway_id: &str,
        resource_id: &str,
        integration: &IntegrationSpec,
    ) -> Result<(), RemoteError>;

    async fn create_deployment(
        &self,
        gateway_id: &str,
        stage: &str,
    ) -> Result<Deployment, RemoteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateway {
    pub id: String,
    pub name: String,
}

/// A node in a gateway's path tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResource {
    pub id: String,
    pub parent_id: Option<String>,
    pub path: String,
    pub path_part: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub id: String,
}

/// Method declaration attached to a path resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub http_method: String,
    pub authorization_type: String,
    /// Fully qualified names, e.g. `method.request.path.proxy`. All are required.
    pub request_parameters: Vec<String>,
}

/// Backend binding of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationSpec {
    pub http_method: String,
    pub integration_type: String,
    pub integration_http_method: String,
    pub uri: String,
    pub passthrough_behavior: String,
}

impl IntegrationSpec {
    /// Proxy integration invoking a function through the Lambda API.
    pub fn lambda_proxy(http_method: &str, region: &str, lambda_arn: &str) -> Self {
        Self {
            http_method: http_method.to_owned(),
            integration_type: "AWS_PROXY".to_owned(),
            integration_http_method: "POST".to_owned(),
            uri: format!(
                "arn:aws:apigateway:{region}:lambda:path/2015-03-31/functions/{lambda_arn}/invocations"
            ),
            passthrough_behavior: "WHEN_NO_MATCH".to_owned(),
        }
    }
}

/// Method and path part wired directly under the gateway root.
///
/// ```
/// use lambdalocal_cloud::RouteBinding;
///
/// let binding = RouteBinding::greedy_proxy();
/// assert_eq!(binding.path(), "/{proxy+}");
/// assert_eq!(binding.request_parameters(), vec!["method.request.path.proxy"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBinding {
    pub http_method: String,
    pub path_part: String,
}

impl RouteBinding {
    pub fn new(http_method: impl Into<String>, path_part: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path_part: path_part.into(),
        }
    }

    /// `ANY /{proxy+}`: every method and every path reaches the function.
    pub fn greedy_proxy() -> Self {
        Self::new("ANY", "{proxy+}")
    }

    pub fn path(&self) -> String {
        format!("/{}", self.path_part)
    }

    /// Name of the path parameter captured by `{name}` or `{name+}`, if any.
    pub fn path_parameter(&self) -> Option<&str> {
        self.path_part
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .map(|name| name.trim_end_matches('+'))
            .filter(|name| !name.is_empty())
    }

    pub fn request_parameters(&self) -> Vec<String> {
        self.path_parameter()
            .map(|name| vec![format!("method.request.path.{name}")])
            .unwrap_or_default()
    }

    pub fn method_spec(&self) -> MethodSpec {
        MethodSpec {
            http_method: self.http_method.clone(),
            authorization_type: "NONE".to_owned(),
            request_parameters: self.request_parameters(),
        }
    }
}

impl Default for RouteBinding {
    fn default() -> Self {
        Self::greedy_proxy()
    }
}

/// Result of a full `provision` run.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub gateway: Gateway,
    pub created_gateway: bool,
    pub resource: PathResource,
    pub deployment: Deployment,
}

/// Gateway client, parameterized over the API for testability.
pub struct GatewayClient<A: ApiGatewayApi = SdkApiGateway> {
    api: A,
}

impl GatewayClient<SdkApiGateway> {
    pub fn connect(config: &SdkConfig) -> Self {
        Self {
            api: SdkApiGateway::new(config),
        }
    }
}

impl<A: ApiGatewayApi> GatewayClient<A> {
    pub fn with_api(api: A) -> Self {
        Self { api }
    }

    /// First gateway whose name matches exactly. With duplicate names the
    /// result depends on listing order.
    pub async fn find_gateway(&self, name: &str) -> Result<Option<Gateway>, GatewayError> {
        let gateways = self
            .api
            .list_rest_apis()
            .await
            .map_err(|e| GatewayError::ListGateways { source: e })?;

        Ok(gateways.into_iter().find(|g| g.name == name))
    }

    /// First resource under `gateway_id` whose path matches exactly.
    pub async fn find_resource_by_path(
        &self,
        gateway_id: &str,
        path: &str,
    ) -> Result<Option<PathResource>, GatewayError> {
        let resources = self
            .api
            .list_resources(gateway_id)
            .await
            .map_err(|e| GatewayError::ListResources { source: e })?;

        Ok(resources.into_iter().find(|r| r.path == path))
    }

    /// Return the resource at `path`, creating it under `parent_id` when absent.
    ///
    /// Not atomic: two concurrent callers can both create it.
    pub async fn ensure_resource(
        &self,
        gateway_id: &str,
        parent_id: &str,
        path: &str,
        path_part: &str,
    ) -> Result<PathResource, GatewayError> {
        if let Some(existing) = self.find_resource_by_path(gateway_id, path).await? {
            tracing::debug!(
                %gateway_id,
                %path,
                id = %existing.id,
                "resource already exists"
            );
            return Ok(existing);
        }

        tracing::info!(%gateway_id, %path, "creating resource");
        self.api
            .create_resource(gateway_id, parent_id, path_part)
            .await
            .map_err(|e| GatewayError::CreateResource {
                path: path.to_owned(),
                source: e,
            })
    }

    /// Attach the binding's method and a proxy integration to the function.
    pub async fn wire_integration(
        &self,
        gateway_id: &str,
        resource_id: &str,
        binding: &RouteBinding,
        lambda_arn: &str,
        region: &str,
    ) -> Result<(), GatewayError> {
        self.api
            .put_method(gateway_id, resource_id, &binding.method_spec())
            .await
            .map_err(|e| GatewayError::PutMethod { source: e })?;

        let integration = IntegrationSpec::lambda_proxy(&binding.http_method, region, lambda_arn);
        self.api
            .put_integration(gateway_id, resource_id, &integration)
            .await
            .map_err(|e| GatewayError::PutIntegration { source: e })
    }

    pub async fn publish(&self, gateway_id: &str, stage: &str) -> Result<Deployment, GatewayError> {
        self.api
            .create_deployment(gateway_id, stage)
            .await
            .map_err(|e| GatewayError::Publish {
                stage: stage.to_owned(),
                source: e,
            })
    }

    /// Find-or-create the gateway named `name` and route `binding` to the function.
    pub async fn provision(
        &self,
        name: &str,
        lambda_arn: &str,
        region: &str,
        binding: &RouteBinding,
        stage: &str,
    ) -> Result<Provisioned, GatewayError> {
        let (gateway, created_gateway) = match self.find_gateway(name).await? {
            Some(gateway) => (gateway, false),
            None => {
                tracing::info!(%name, "creating gateway");
                let gateway = self
                    .api
                    .create_rest_api(name)
                    .await
                    .map_err(|e| GatewayError::CreateGateway { source: e })?;
                (gateway, true)
            }
        };

        let root = self
            .find_resource_by_path(&gateway.id, "/")
            .await?
            .ok_or_else(|| GatewayError::MissingRoot {
                gateway_id: gateway.id.clone(),
            })?;

        let resource = self
            .ensure_resource(&gateway.id, &root.id, &binding.path(), &binding.path_part)
            .await?;

        self.wire_integration(&gateway.id, &resource.id, binding, lambda_arn, region)
            .await?;

        let deployment = self.publish(&gateway.id, stage).await?;

        Ok(Provisioned {
            gateway,
            created_gateway,
            resource,
            deployment,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to list gateways")]
    ListGateways { source: RemoteError },

    #[error("failed to create gateway")]
    CreateGateway { source: RemoteError },

    #[error("failed to list gateway resources")]
    ListResources { source: RemoteError },

    #[error("gateway '{gateway_id}' has no root resource")]
    MissingRoot { gateway_id: String },

    #[error("failed to create resource '{path}'")]
    CreateResource { path: String, source: RemoteError },

    #[error("failed to put method")]
    PutMethod { source: RemoteError },

    #[error("failed to put integration")]
    PutIntegration { source: RemoteError },

    #[error("failed to publish deployment to stage '{stage}'")]
    Publish { stage: String, source: RemoteError },
}
