use lambdalocal_cloud::{GatewayClient, ProxyLauncher, load_sdk_config};
use lambdalocal_core::LambdaLocalConfig;
use std::path::Path;

/// Start a mitmproxy container forwarding to the function's gateway.
pub async fn forward(region: &str, template: &Path, network: Option<&str>) -> anyhow::Result<()> {
    let config = LambdaLocalConfig::load(Path::new("."))?;
    let descriptor = super::load_template(template)?;

    let sdk = load_sdk_config(&config.endpoint, region).await;
    let gateways = GatewayClient::connect(&sdk);

    let launcher = ProxyLauncher::new(config.proxy);
    let launched = launcher
        .forward(&gateways, &descriptor.name, &config.endpoint, network)
        .await?;

    println!(
        "Started {} ({})",
        launched.container_name, launched.container_id
    );
    println!(
        "Forwarding {} -> {}",
        launched.listen_url, launched.invocation_path
    );
    println!("Web UI: {}", launched.web_ui_url);

    Ok(())
}
