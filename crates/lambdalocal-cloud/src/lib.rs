pub mod apigateway;
pub mod doctor;
pub mod error;
pub mod executor;
pub mod lambda;
pub mod proxy;
pub mod sdk;

pub use apigateway::{
    ApiGatewayApi, Deployment, Gateway, GatewayClient, GatewayError, IntegrationSpec, MethodSpec,
    PathResource, Provisioned, RouteBinding,
};
pub use doctor::{CheckResult, DoctorReport};
pub use error::RemoteError;
pub use executor::{ContainerExecutor, DockerCli, DockerError};
pub use lambda::{
    CreateFunctionRequest, DeployOutcome, FunctionInfo, FunctionRegistry, LambdaApi,
    RegistryError,
};
pub use proxy::{LaunchedProxy, ProxyError, ProxyLauncher, ProxySpec};
pub use sdk::{SdkApiGateway, SdkConfig, SdkLambda, load_sdk_config};
