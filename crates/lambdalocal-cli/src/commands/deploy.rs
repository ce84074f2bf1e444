use lambdalocal_cloud::{DeployOutcome, FunctionRegistry, load_sdk_config};
use lambdalocal_core::LambdaLocalConfig;
use std::path::Path;

use super::FunctionSource;

/// Create the function from `file`, or replace its code if it already exists.
pub async fn deploy(region: &str, source: &FunctionSource, file: &Path) -> anyhow::Result<()> {
    let config = LambdaLocalConfig::load(Path::new("."))?;

    // Everything local is resolved before the first remote call
    let descriptor = source.resolve()?;
    let code = std::fs::read(file)
        .map_err(|e| anyhow::anyhow!("failed to read package {}: {e}", file.display()))?;

    let sdk = load_sdk_config(&config.endpoint, region).await;
    let registry = FunctionRegistry::connect(&sdk);

    let outcome = registry
        .deploy(&descriptor, &code, &config.endpoint.default_role)
        .await?;

    let updated = matches!(outcome, DeployOutcome::Updated(_));
    let info = outcome.function();
    println!(
        "{} function '{}' ({})",
        if updated { "Updated" } else { "Created" },
        info.name,
        info.arn.as_deref().unwrap_or("no ARN reported")
    );
    if updated {
        println!("{}", serde_json::to_string_pretty(info)?);
    }

    Ok(())
}
