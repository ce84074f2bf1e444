use std::fmt;
use std::path::Path;

use lambdalocal_core::ResourceDescriptor;

use crate::apigateway::{ApiGatewayApi, GatewayClient};
use crate::executor::ContainerExecutor;
use crate::lambda::{FunctionRegistry, LambdaApi};

/// Function name probed to check that the Lambda endpoint answers.
const PROBE_FUNCTION: &str = "lambdalocal-doctor-probe";

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub docker: CheckResult,
    pub lambda: CheckResult,
    pub apigateway: CheckResult,
    pub template: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.docker.passed && self.lambda.passed && self.apigateway.passed && self.template.passed
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("Docker CLI", &self.docker),
            ("Lambda endpoint", &self.lambda),
            ("API Gateway endpoint", &self.apigateway),
            ("Template", &self.template),
        ];
        for (label, result) in rows {
            writeln!(f, "[{}] {label:<22} {}", result.icon(), result.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

/// Run all diagnostic checks without early return.
pub async fn run<L, A, E>(
    registry: &FunctionRegistry<L>,
    gateways: &GatewayClient<A>,
    docker: &E,
    template: Option<&Path>,
) -> DoctorReport
where
    L: LambdaApi,
    A: ApiGatewayApi,
    E: ContainerExecutor,
{
    let mut report = DoctorReport::default();

    // 1. docker CLI and daemon
    let version_args = ["version", "--format", "{{.Server.Version}}"].map(str::to_owned);
    report.docker = match docker.exec(&version_args).await {
        Ok(v) => CheckResult::ok(v.trim()),
        Err(e) => CheckResult::fail(&e.to_string()),
    };

    // 2. Lambda: a missing probe function still proves the endpoint answers
    report.lambda = match registry.exists(PROBE_FUNCTION).await {
        Ok(_) => CheckResult::ok("Reachable"),
        Err(e) => CheckResult::fail(&error_chain(&e)),
    };

    // 3. API Gateway
    report.apigateway = match gateways.find_gateway(PROBE_FUNCTION).await {
        Ok(_) => CheckResult::ok("Reachable"),
        Err(e) => CheckResult::fail(&error_chain(&e)),
    };

    // 4. Template
    report.template = match template {
        None => CheckResult::fail("no template given (--template)"),
        Some(path) => match ResourceDescriptor::load(path) {
            Ok(d) => CheckResult::ok(&format!("{} ({}, {})", d.name, d.handler, d.runtime)),
            Err(e) => CheckResult::fail(&error_chain(&e)),
        },
    };

    report
}

/// `outer: inner: ...` rendering of an error and its sources.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
