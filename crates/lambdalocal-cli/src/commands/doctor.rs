use lambdalocal_cloud::{
    DockerCli, FunctionRegistry, GatewayClient, doctor as checks, load_sdk_config,
};
use lambdalocal_core::LambdaLocalConfig;
use std::path::Path;

pub async fn doctor(region: &str, template: Option<&Path>) -> anyhow::Result<()> {
    let config = LambdaLocalConfig::load(Path::new("."))?;

    let sdk = load_sdk_config(&config.endpoint, region).await;
    let registry = FunctionRegistry::connect(&sdk);
    let gateways = GatewayClient::connect(&sdk);

    println!("Endpoint: {} ({region})", config.endpoint.url);
    let report = checks::run(&registry, &gateways, &DockerCli, template).await;

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed; see above for details");
    }

    Ok(())
}
