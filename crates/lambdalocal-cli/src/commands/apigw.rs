use lambdalocal_cloud::{FunctionRegistry, GatewayClient, RouteBinding, load_sdk_config};
use lambdalocal_core::LambdaLocalConfig;
use std::path::Path;

/// Route overrides given on the command line.
pub struct RouteOverrides {
    pub method: Option<String>,
    pub path_part: Option<String>,
}

/// Provision (or refresh) the gateway named after the function and publish it.
pub async fn apigw(region: &str, template: &Path, overrides: RouteOverrides) -> anyhow::Result<()> {
    let config = LambdaLocalConfig::load(Path::new("."))?;
    let descriptor = super::load_template(template)?;

    let binding = RouteBinding::new(
        overrides
            .method
            .unwrap_or_else(|| config.gateway.http_method.clone()),
        overrides
            .path_part
            .unwrap_or_else(|| config.gateway.path_part.clone()),
    );

    let sdk = load_sdk_config(&config.endpoint, region).await;
    let registry = FunctionRegistry::connect(&sdk);
    let gateways = GatewayClient::connect(&sdk);

    let lambda_arn = registry.function_arn(&descriptor.name).await?;

    let provisioned = gateways
        .provision(
            &descriptor.name,
            &lambda_arn,
            region,
            &binding,
            &config.endpoint.stage,
        )
        .await?;

    if provisioned.created_gateway {
        println!("Created gateway '{}'", provisioned.gateway.name);
    }
    println!(
        "Routed {} {} to '{}' (deployment {})",
        binding.http_method,
        binding.path(),
        descriptor.name,
        provisioned.deployment.id
    );
    println!(
        "Url: {}",
        config.endpoint.invocation_url(&provisioned.gateway.id, "")
    );

    Ok(())
}
