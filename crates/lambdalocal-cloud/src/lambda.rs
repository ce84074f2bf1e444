use std::collections::BTreeMap;

use lambdalocal_core::ResourceDescriptor;
use serde::Serialize;

use crate::error::RemoteError;
use crate::sdk::{SdkConfig, SdkLambda};

/// Function registry operations used by lambdalocal.
///
/// Production code uses [`SdkLambda`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait LambdaApi: Send + Sync {
    /// Fetch a function's configuration. A missing function is reported as
    /// [`RemoteError::NotFound`].
    async fn get_function(&self, name: &str) -> Result<FunctionInfo, RemoteError>;

    /// Create a function from a zip package.
    async fn create_function(
        &self,
        request: &CreateFunctionRequest,
    ) -> Result<FunctionInfo, RemoteError>;

    /// Replace the code of an existing function.
    async fn update_function_code(
        &self,
        name: &str,
        zip: &[u8],
    ) -> Result<FunctionInfo, RemoteError>;
}

/// Configuration of a deployed function as reported by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionInfo {
    pub name: String,
    pub arn: Option<String>,
    pub runtime: Option<String>,
    pub code_sha256: Option<String>,
    pub last_modified: Option<String>,
}

/// Everything needed to create a new function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFunctionRequest {
    pub name: String,
    pub runtime: String,
    pub handler: String,
    pub role: String,
    pub environment: BTreeMap<String, String>,
    pub zip: Vec<u8>,
}

impl CreateFunctionRequest {
    pub fn from_descriptor(descriptor: &ResourceDescriptor, zip: &[u8], role: &str) -> Self {
        Self {
            name: descriptor.name.clone(),
            runtime: descriptor.runtime.clone(),
            handler: descriptor.handler.clone(),
            role: role.to_owned(),
            environment: descriptor.environment.clone(),
            zip: zip.to_vec(),
        }
    }
}

/// What `deploy` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Created(FunctionInfo),
    Updated(FunctionInfo),
}

impl DeployOutcome {
    pub fn function(&self) -> &FunctionInfo {
        match self {
            Self::Created(info) | Self::Updated(info) => info,
        }
    }
}

/// Function registry client, parameterized over the API for testability.
pub struct FunctionRegistry<L: LambdaApi = SdkLambda> {
    api: L,
}

impl FunctionRegistry<SdkLambda> {
    pub fn connect(config: &SdkConfig) -> Self {
        Self {
            api: SdkLambda::new(config),
        }
    }
}

impl<L: LambdaApi> FunctionRegistry<L> {
    pub fn with_api(api: L) -> Self {
        Self { api }
    }

    /// `false` only when the registry reports the function as missing.
    pub async fn exists(&self, name: &str) -> Result<bool, RegistryError> {
        match self.api.get_function(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(RegistryError::Lookup { source: e }),
        }
    }

    pub async fn function_arn(&self, name: &str) -> Result<String, RegistryError> {
        let info = self
            .api
            .get_function(name)
            .await
            .map_err(|e| RegistryError::Lookup { source: e })?;

        info.arn.ok_or_else(|| RegistryError::MissingArn {
            name: name.to_owned(),
        })
    }

    /// Create the function if it does not exist yet, otherwise replace its code.
    ///
    /// An existing function keeps its runtime, handler and environment.
    pub async fn deploy(
        &self,
        descriptor: &ResourceDescriptor,
        zip: &[u8],
        default_role: &str,
    ) -> Result<DeployOutcome, RegistryError> {
        if !self.exists(&descriptor.name).await? {
            tracing::info!(
                name = %descriptor.name,
                runtime = %descriptor.runtime,
                "creating function"
            );
            let request = CreateFunctionRequest::from_descriptor(descriptor, zip, default_role);
            let info = self
                .api
                .create_function(&request)
                .await
                .map_err(|e| RegistryError::Create { source: e })?;
            return Ok(DeployOutcome::Created(info));
        }

        tracing::info!(
            name = %descriptor.name,
            bytes = zip.len(),
            "updating function code"
        );
        let info = self
            .api
            .update_function_code(&descriptor.name, zip)
            .await
            .map_err(|e| RegistryError::UpdateCode { source: e })?;
        Ok(DeployOutcome::Updated(info))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to look up function")]
    Lookup { source: RemoteError },

    #[error("failed to create function")]
    Create { source: RemoteError },

    #[error("failed to update function code")]
    UpdateCode { source: RemoteError },

    #[error("function '{name}' has no ARN")]
    MissingArn { name: String },
}
