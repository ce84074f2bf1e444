mod commands;

use clap::{Parser, Subcommand};
use commands::{FunctionSource, RouteOverrides};
use lambdalocal_core::DEFAULT_RUNTIME;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lambdalocal", about = "Run AWS Lambda functions locally with LocalStack")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a Lambda function zip to LocalStack
    Deploy {
        /// The AWS region
        #[arg(long)]
        region: String,
        /// Function template (YAML or JSON)
        #[arg(long, required_unless_present = "name", conflicts_with = "name")]
        template: Option<PathBuf>,
        /// The name of the Lambda function (instead of --template)
        #[arg(long, requires = "handler")]
        name: Option<String>,
        /// The name of the Lambda function handler
        #[arg(long, requires = "name")]
        handler: Option<String>,
        /// The Lambda runtime [default: python3.9]
        #[arg(long, requires = "name")]
        runtime: Option<String>,
        /// Zip package to deploy
        file: PathBuf,
    },
    /// Route an API Gateway to a deployed function and publish it
    Apigw {
        /// The AWS region
        #[arg(long)]
        region: String,
        /// Function template (YAML or JSON)
        #[arg(long)]
        template: PathBuf,
        /// HTTP method to wire (default from lambdalocal.toml, else ANY)
        #[arg(long)]
        method: Option<String>,
        /// Path part under `/` (default from lambdalocal.toml, else {proxy+})
        #[arg(long)]
        path_part: Option<String>,
    },
    /// Expose the function's gateway through a mitmproxy container
    Forward {
        /// The AWS region
        #[arg(long)]
        region: String,
        /// Function template (YAML or JSON)
        #[arg(long)]
        template: PathBuf,
        /// Docker network to attach the proxy container to
        #[arg(long)]
        net: Option<String>,
    },
    /// Check Docker, LocalStack, and template readiness
    Doctor {
        /// The AWS region
        #[arg(long, default_value = "us-east-1")]
        region: String,
        /// Function template to validate
        #[arg(long)]
        template: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy {
            region,
            template,
            name,
            handler,
            runtime,
            file,
        } => {
            let source = match (template, name, handler) {
                (Some(path), _, _) => FunctionSource::Template(path),
                (None, Some(name), Some(handler)) => FunctionSource::Flags {
                    name,
                    handler,
                    runtime: runtime.unwrap_or_else(|| DEFAULT_RUNTIME.to_owned()),
                },
                _ => anyhow::bail!("either --template or --name with --handler is required"),
            };
            commands::deploy(&region, &source, &file).await?
        }
        Commands::Apigw {
            region,
            template,
            method,
            path_part,
        } => {
            let overrides = RouteOverrides { method, path_part };
            commands::apigw(&region, &template, overrides).await?
        }
        Commands::Forward {
            region,
            template,
            net,
        } => commands::forward(&region, &template, net.as_deref()).await?,
        Commands::Doctor { region, template } => {
            commands::doctor(&region, template.as_deref()).await?
        }
    }

    Ok(())
}
