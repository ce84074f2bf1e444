/// Abstraction over container CLI execution for testability.
///
/// Production code uses [`DockerCli`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ContainerExecutor: Send + Sync {
    /// Execute a container CLI command and capture stdout.
    async fn exec(&self, args: &[String]) -> Result<String, DockerError>;
}

/// Real `docker` CLI executor.
pub struct DockerCli;

impl ContainerExecutor for DockerCli {
    async fn exec(&self, args: &[String]) -> Result<String, DockerError> {
        use std::process::Stdio;

        tracing::debug!(?args, "docker");
        let output = tokio::process::Command::new("docker")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DockerError::NotFound { source: e })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| DockerError::InvalidUtf8 { source: e })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            Err(DockerError::CommandFailed {
                args: args.to_vec(),
                stderr,
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker CLI not found; install it from https://docs.docker.com/get-docker/")]
    NotFound { source: std::io::Error },

    #[error("docker command failed: {args:?}\n{stderr}")]
    CommandFailed { args: Vec<String>, stderr: String },

    #[error("docker output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },
}
