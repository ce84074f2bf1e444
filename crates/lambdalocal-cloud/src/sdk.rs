//! AWS SDK implementations of [`LambdaApi`] and [`ApiGatewayApi`], pointed
//! at the local emulator.

use std::collections::HashMap;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_apigateway::error::DisplayErrorContext;
use aws_sdk_apigateway::types::IntegrationType;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{Environment, FunctionCode, PackageType, Runtime};
use lambdalocal_core::EndpointConfig;

use crate::apigateway::{
    ApiGatewayApi, Deployment, Gateway, IntegrationSpec, MethodSpec, PathResource,
};
use crate::error::RemoteError;
use crate::lambda::{CreateFunctionRequest, FunctionInfo, LambdaApi};

pub use aws_config::SdkConfig;

/// Largest page the gateway listing operations accept.
const PAGE_SIZE: i32 = 500;

/// Shared SDK configuration: emulator endpoint, placeholder credentials, caller's region.
pub async fn load_sdk_config(endpoint: &EndpointConfig, region: &str) -> SdkConfig {
    let credentials = Credentials::new(
        endpoint.access_key_id.clone(),
        endpoint.secret_access_key.clone(),
        None,
        None,
        "lambdalocal",
    );

    aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(endpoint.url.clone())
        .credentials_provider(credentials)
        .region(Region::new(region.to_owned()))
        .load()
        .await
}

fn service_error<E: std::error::Error>(operation: &'static str, err: E) -> RemoteError {
    RemoteError::Service {
        operation,
        message: DisplayErrorContext(&err).to_string(),
    }
}

// ── Lambda ──

pub struct SdkLambda {
    client: aws_sdk_lambda::Client,
}

impl SdkLambda {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_lambda::Client::new(config),
        }
    }
}

fn function_info(
    fallback_name: &str,
    name: Option<&str>,
    arn: Option<&str>,
    runtime: Option<&Runtime>,
    code_sha256: Option<&str>,
    last_modified: Option<&str>,
) -> FunctionInfo {
    FunctionInfo {
        name: name.unwrap_or(fallback_name).to_owned(),
        arn: arn.map(str::to_owned),
        runtime: runtime.map(|r| r.as_str().to_owned()),
        code_sha256: code_sha256.map(str::to_owned),
        last_modified: last_modified.map(str::to_owned),
    }
}

impl LambdaApi for SdkLambda {
    async fn get_function(&self, name: &str) -> Result<FunctionInfo, RemoteError> {
        tracing::debug!(%name, "GetFunction");
        let output = match self.client.get_function().function_name(name).send().await {
            Ok(output) => output,
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                return Err(RemoteError::NotFound {
                    operation: "GetFunction",
                    resource: format!("function '{name}'"),
                });
            }
            Err(err) => return Err(service_error("GetFunction", err)),
        };

        let config = output
            .configuration()
            .ok_or(RemoteError::MalformedResponse {
                operation: "GetFunction",
                field: "configuration",
            })?;

        Ok(function_info(
            name,
            config.function_name(),
            config.function_arn(),
            config.runtime(),
            config.code_sha256(),
            config.last_modified(),
        ))
    }

    async fn create_function(
        &self,
        request: &CreateFunctionRequest,
    ) -> Result<FunctionInfo, RemoteError> {
        tracing::debug!(name = %request.name, "CreateFunction");
        let variables: HashMap<String, String> = request
            .environment
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let output = self
            .client
            .create_function()
            .function_name(&request.name)
            .runtime(Runtime::from(request.runtime.as_str()))
            .handler(&request.handler)
            .role(&request.role)
            .package_type(PackageType::Zip)
            .code(
                FunctionCode::builder()
                    .zip_file(Blob::new(request.zip.clone()))
                    .build(),
            )
            .environment(Environment::builder().set_variables(Some(variables)).build())
            .send()
            .await
            .map_err(|e| service_error("CreateFunction", e))?;

        Ok(function_info(
            &request.name,
            output.function_name(),
            output.function_arn(),
            output.runtime(),
            output.code_sha256(),
            output.last_modified(),
        ))
    }

    async fn update_function_code(
        &self,
        name: &str,
        zip: &[u8],
    ) -> Result<FunctionInfo, RemoteError> {
        tracing::debug!(%name, bytes = zip.len(), "UpdateFunctionCode");
        let output = self
            .client
            .update_function_code()
            .function_name(name)
            .zip_file(Blob::new(zip))
            .send()
            .await
            .map_err(|e| service_error("UpdateFunctionCode", e))?;

        Ok(function_info(
            name,
            output.function_name(),
            output.function_arn(),
            output.runtime(),
            output.code_sha256(),
            output.last_modified(),
        ))
    }
}

// ── API Gateway ──

pub struct SdkApiGateway {
    client: aws_sdk_apigateway::Client,
}

impl SdkApiGateway {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_apigateway::Client::new(config),
        }
    }
}

fn path_resource(
    operation: &'static str,
    id: Option<&str>,
    parent_id: Option<&str>,
    path: Option<&str>,
    path_part: Option<&str>,
) -> Result<PathResource, RemoteError> {
    let id = id.ok_or(RemoteError::MalformedResponse {
        operation,
        field: "id",
    })?;

    Ok(PathResource {
        id: id.to_owned(),
        parent_id: parent_id.map(str::to_owned),
        path: path.unwrap_or_default().to_owned(),
        path_part: path_part.map(str::to_owned),
    })
}

/// Next page token, treating an empty token as the last page.
fn next_position(position: Option<&str>) -> Option<String> {
    position.filter(|p| !p.is_empty()).map(str::to_owned)
}

impl ApiGatewayApi for SdkApiGateway {
    async fn list_rest_apis(&self) -> Result<Vec<Gateway>, RemoteError> {
        let mut gateways = Vec::new();
        let mut position = None;

        loop {
            tracing::debug!(?position, "GetRestApis");
            let output = self
                .client
                .get_rest_apis()
                .limit(PAGE_SIZE)
                .set_position(position.take())
                .send()
                .await
                .map_err(|e| service_error("GetRestApis", e))?;

            gateways.extend(output.items().iter().filter_map(|api| {
                Some(Gateway {
                    id: api.id()?.to_owned(),
                    name: api.name().unwrap_or_default().to_owned(),
                })
            }));

            position = next_position(output.position());
            if position.is_none() {
                break;
            }
        }

        Ok(gateways)
    }

    async fn create_rest_api(&self, name: &str) -> Result<Gateway, RemoteError> {
        tracing::debug!(%name, "CreateRestApi");
        let output = self
            .client
            .create_rest_api()
            .name(name)
            .send()
            .await
            .map_err(|e| service_error("CreateRestApi", e))?;

        let id = output.id().ok_or(RemoteError::MalformedResponse {
            operation: "CreateRestApi",
            field: "id",
        })?;

        Ok(Gateway {
            id: id.to_owned(),
            name: output.name().unwrap_or(name).to_owned(),
        })
    }

    async fn list_resources(&self, gateway_id: &str) -> Result<Vec<PathResource>, RemoteError> {
        let mut resources = Vec::new();
        let mut position = None;

        loop {
            tracing::debug!(%gateway_id, ?position, "GetResources");
            let output = self
                .client
                .get_resources()
                .rest_api_id(gateway_id)
                .limit(PAGE_SIZE)
                .set_position(position.take())
                .send()
                .await
                .map_err(|e| service_error("GetResources", e))?;

            for item in output.items() {
                resources.push(path_resource(
                    "GetResources",
                    item.id(),
                    item.parent_id(),
                    item.path(),
                    item.path_part(),
                )?);
            }

            position = next_position(output.position());
            if position.is_none() {
                break;
            }
        }

        Ok(resources)
    }

    async fn create_resource(
        &self,
        gateway_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<PathResource, RemoteError> {
        tracing::debug!(%gateway_id, %parent_id, %path_part, "CreateResource");
        let output = self
            .client
            .create_resource()
            .rest_api_id(gateway_id)
            .parent_id(parent_id)
            .path_part(path_part)
            .send()
            .await
            .map_err(|e| service_error("CreateResource", e))?;

        path_resource(
            "CreateResource",
            output.id(),
            output.parent_id(),
            output.path(),
            output.path_part(),
        )
    }

    async fn put_method(
        &self,
        gateway_id: &str,
        resource_id: &str,
        method: &MethodSpec,
    ) -> Result<(), RemoteError> {
        tracing::debug!(
            %gateway_id,
            %resource_id,
            http_method = %method.http_method,
            "PutMethod"
        );
        let mut request = self
            .client
            .put_method()
            .rest_api_id(gateway_id)
            .resource_id(resource_id)
            .http_method(&method.http_method)
            .authorization_type(&method.authorization_type);

        for parameter in &method.request_parameters {
            request = request.request_parameters(parameter, true);
        }

        request
            .send()
            .await
            .map_err(|e| service_error("PutMethod", e))?;

        Ok(())
    }

    async fn put_integration(
        &self,
        gateway_id: &str,
        resource_id: &str,
        integration: &IntegrationSpec,
    ) -> Result<(), RemoteError> {
        tracing::debug!(%gateway_id, %resource_id, uri = %integration.uri, "PutIntegration");
        self.client
            .put_integration()
            .rest_api_id(gateway_id)
            .resource_id(resource_id)
            .http_method(&integration.http_method)
            .r#type(IntegrationType::from(integration.integration_type.as_str()))
            .integration_http_method(&integration.integration_http_method)
            .uri(&integration.uri)
            .passthrough_behavior(&integration.passthrough_behavior)
            .send()
            .await
            .map_err(|e| service_error("PutIntegration", e))?;

        Ok(())
    }

    async fn create_deployment(
        &self,
        gateway_id: &str,
        stage: &str,
    ) -> Result<Deployment, RemoteError> {
        tracing::debug!(%gateway_id, %stage, "CreateDeployment");
        let output = self
            .client
            .create_deployment()
            .rest_api_id(gateway_id)
            .stage_name(stage)
            .send()
            .await
            .map_err(|e| service_error("CreateDeployment", e))?;

        let id = output.id().ok_or(RemoteError::MalformedResponse {
            operation: "CreateDeployment",
            field: "id",
        })?;

        Ok(Deployment { id: id.to_owned() })
    }
}
