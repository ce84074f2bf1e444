use lambdalocal_cloud::apigateway::{
    ApiGatewayApi, Deployment, Gateway, GatewayClient, GatewayError, IntegrationSpec, MethodSpec,
    PathResource, RouteBinding,
};
use lambdalocal_cloud::error::RemoteError;
use mockall::{Sequence, mock};
use std::sync::Mutex;

mock! {
    ApiGateway {}

    impl ApiGatewayApi for ApiGateway {
        async fn list_rest_apis(&self) -> Result<Vec<Gateway>, RemoteError>;
        async fn create_rest_api(&self, name: &str) -> Result<Gateway, RemoteError>;
        async fn list_resources(&self, gateway_id: &str) -> Result<Vec<PathResource>, RemoteError>;
        async fn create_resource(
            &self,
            gateway_id: &str,
            parent_id: &str,
            path_part: &str,
        ) -> Result<PathResource, RemoteError>;
        async fn put_method(
            &self,
            gateway_id: &str,
            resource_id: &str,
            method: &MethodSpec,
        ) -> Result<(), RemoteError>;
        async fn put_integration(
            &self,
            gateway_id: &str,
            resource_id: &str,
            integration: &IntegrationSpec,
        ) -> Result<(), RemoteError>;
        async fn create_deployment(
            &self,
            gateway_id: &str,
            stage: &str,
        ) -> Result<Deployment, RemoteError>;
    }
}

const ARN: &str = "arn:aws:lambda:us-east-1:000000000000:function:hello";

fn gateway(id: &str, name: &str) -> Gateway {
    Gateway {
        id: id.to_owned(),
        name: name.to_owned(),
    }
}

fn resource(id: &str, parent: Option<&str>, path: &str) -> PathResource {
    PathResource {
        id: id.to_owned(),
        parent_id: parent.map(str::to_owned),
        path: path.to_owned(),
        path_part: path.rsplit('/').next().filter(|p| !p.is_empty()).map(str::to_owned),
    }
}

// ── Lookup Tests ──

#[tokio::test]
async fn find_gateway_returns_matching_item() {
    let mut mock = MockApiGateway::new();
    mock.expect_list_rest_apis()
        .returning(|| Ok(vec![gateway("id-a", "a"), gateway("id-b", "b")]));

    let client = GatewayClient::with_api(mock);

    assert_eq!(
        client.find_gateway("b").await.unwrap(),
        Some(gateway("id-b", "b"))
    );
    assert_eq!(client.find_gateway("c").await.unwrap(), None);
}

#[tokio::test]
async fn find_gateway_takes_first_of_duplicates() {
    let mut mock = MockApiGateway::new();
    mock.expect_list_rest_apis().returning(|| {
        Ok(vec![
            gateway("first", "dup"),
            gateway("second", "dup"),
        ])
    });

    let client = GatewayClient::with_api(mock);
    let found = client.find_gateway("dup").await.unwrap().unwrap();

    assert_eq!(found.id, "first");
}

#[tokio::test]
async fn find_gateway_requires_exact_name() {
    let mut mock = MockApiGateway::new();
    mock.expect_list_rest_apis()
        .returning(|| Ok(vec![gateway("id", "hello-world")]));

    let client = GatewayClient::with_api(mock);

    assert_eq!(client.find_gateway("hello").await.unwrap(), None);
}

#[tokio::test]
async fn find_resource_by_path_exact_match() {
    let mut mock = MockApiGateway::new();
    mock.expect_list_resources()
        .withf(|id| id == "gw")
        .returning(|_| {
            Ok(vec![
                resource("root", None, "/"),
                resource("r1", Some("root"), "/{proxy+}"),
            ])
        });

    let client = GatewayClient::with_api(mock);

    let found = client
        .find_resource_by_path("gw", "/{proxy+}")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, "r1");
    assert_eq!(
        client.find_resource_by_path("gw", "/missing").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn list_failure_is_reported() {
    let mut mock = MockApiGateway::new();
    mock.expect_list_rest_apis().returning(|| {
        Err(RemoteError::Service {
            operation: "GetRestApis",
            message: "connection refused".to_owned(),
        })
    });

    let client = GatewayClient::with_api(mock);
    let result = client.find_gateway("hello").await;

    assert!(matches!(result, Err(GatewayError::ListGateways { .. })));
}

// ── ensure_resource Tests ──

/// Backing store that never holds two resources with the same path.
struct InMemoryGateway {
    resources: Mutex<Vec<PathResource>>,
    creates: Mutex<usize>,
}

impl InMemoryGateway {
    fn with_root() -> Self {
        Self {
            resources: Mutex::new(vec![resource("root", None, "/")]),
            creates: Mutex::new(0),
        }
    }

    fn create_count(&self) -> usize {
        *self.creates.lock().unwrap()
    }
}

fn unsupported(operation: &'static str) -> RemoteError {
    RemoteError::Service {
        operation,
        message: "not supported by in-memory gateway".to_owned(),
    }
}

impl ApiGatewayApi for &InMemoryGateway {
    async fn list_rest_apis(&self) -> Result<Vec<Gateway>, RemoteError> {
        Err(unsupported("GetRestApis"))
    }

    async fn create_rest_api(&self, _name: &str) -> Result<Gateway, RemoteError> {
        Err(unsupported("CreateRestApi"))
    }

    async fn list_resources(&self, _gateway_id: &str) -> Result<Vec<PathResource>, RemoteError> {
        Ok(self.resources.lock().unwrap().clone())
    }

    async fn create_resource(
        &self,
        _gateway_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<PathResource, RemoteError> {
        let mut resources = self.resources.lock().unwrap();
        let path = format!("/{path_part}");
        if resources.iter().any(|r| r.path == path) {
            return Err(RemoteError::Service {
                operation: "CreateResource",
                message: "ConflictException".to_owned(),
            });
        }
        *self.creates.lock().unwrap() += 1;
        let created = PathResource {
            id: format!("res-{}", resources.len()),
            parent_id: Some(parent_id.to_owned()),
            path,
            path_part: Some(path_part.to_owned()),
        };
        resources.push(created.clone());
        Ok(created)
    }

    async fn put_method(&self, _: &str, _: &str, _: &MethodSpec) -> Result<(), RemoteError> {
        Err(unsupported("PutMethod"))
    }

    async fn put_integration(
        &self,
        _: &str,
        _: &str,
        _: &IntegrationSpec,
    ) -> Result<(), RemoteError> {
        Err(unsupported("PutIntegration"))
    }

    async fn create_deployment(&self, _: &str, _: &str) -> Result<Deployment, RemoteError> {
        Err(unsupported("CreateDeployment"))
    }
}

#[tokio::test]
async fn ensure_resource_is_idempotent() {
    let store = InMemoryGateway::with_root();
    let client = GatewayClient::with_api(&store);

    let first = client
        .ensure_resource("gw", "root", "/{proxy+}", "{proxy+}")
        .await
        .unwrap();
    let second = client
        .ensure_resource("gw", "root", "/{proxy+}", "{proxy+}")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.create_count(), 1);
    assert_eq!(store.resources.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn ensure_resource_returns_existing_without_create() {
    let mut mock = MockApiGateway::new();
    mock.expect_list_resources().returning(|_| {
        Ok(vec![
            resource("root", None, "/"),
            resource("r1", Some("root"), "/{proxy+}"),
        ])
    });
    mock.expect_create_resource().never();

    let client = GatewayClient::with_api(mock);
    let found = client
        .ensure_resource("gw", "root", "/{proxy+}", "{proxy+}")
        .await
        .unwrap();

    assert_eq!(found.id, "r1");
}

// ── Wiring Tests ──

#[tokio::test]
async fn wire_integration_greedy_proxy() {
    let mut mock = MockApiGateway::new();
    mock.expect_put_method()
        .times(1)
        .withf(|gw, res, method| {
            gw == "gw"
                && res == "r1"
                && method.http_method == "ANY"
                && method.authorization_type == "NONE"
                && method.request_parameters == vec!["method.request.path.proxy".to_owned()]
        })
        .returning(|_, _, _| Ok(()));
    mock.expect_put_integration()
        .times(1)
        .withf(|_, _, integration| {
            integration.http_method == "ANY"
                && integration.integration_type == "AWS_PROXY"
                && integration.integration_http_method == "POST"
                && integration.passthrough_behavior == "WHEN_NO_MATCH"
                && integration.uri
                    == format!(
                        "arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/{ARN}/invocations"
                    )
        })
        .returning(|_, _, _| Ok(()));

    let client = GatewayClient::with_api(mock);
    client
        .wire_integration("gw", "r1", &RouteBinding::greedy_proxy(), ARN, "us-east-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn wire_integration_named_parameter_binding() {
    let mut mock = MockApiGateway::new();
    mock.expect_put_method()
        .withf(|_, _, method| {
            method.http_method == "GET"
                && method.request_parameters
                    == vec!["method.request.path.somethingId".to_owned()]
        })
        .returning(|_, _, _| Ok(()));
    mock.expect_put_integration()
        .withf(|_, _, integration| integration.http_method == "GET")
        .returning(|_, _, _| Ok(()));

    let client = GatewayClient::with_api(mock);
    let binding = RouteBinding::new("GET", "{somethingId}");
    client
        .wire_integration("gw", "r1", &binding, ARN, "eu-west-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn wire_integration_stops_after_method_failure() {
    let mut mock = MockApiGateway::new();
    mock.expect_put_method().returning(|_, _, _| {
        Err(RemoteError::Service {
            operation: "PutMethod",
            message: "BadRequestException".to_owned(),
        })
    });
    mock.expect_put_integration().never();

    let client = GatewayClient::with_api(mock);
    let result = client
        .wire_integration("gw", "r1", &RouteBinding::greedy_proxy(), ARN, "us-east-1")
        .await;

    assert!(matches!(result, Err(GatewayError::PutMethod { .. })));
}

// ── RouteBinding Tests ──

#[test]
fn route_binding_parameters() {
    assert_eq!(RouteBinding::greedy_proxy().path_parameter(), Some("proxy"));
    assert_eq!(
        RouteBinding::new("GET", "{somethingId}").path_parameter(),
        Some("somethingId")
    );
    assert_eq!(RouteBinding::new("GET", "health").path_parameter(), None);
    assert!(RouteBinding::new("GET", "health").request_parameters().is_empty());
    assert_eq!(RouteBinding::new("GET", "{}").path_parameter(), None);
}

#[test]
fn route_binding_default_is_greedy_any() {
    let binding = RouteBinding::default();
    assert_eq!(binding.http_method, "ANY");
    assert_eq!(binding.path(), "/{proxy+}");
}

// ── Provision Tests ──

#[tokio::test]
async fn provision_new_gateway_runs_steps_in_order() {
    let mut mock = MockApiGateway::new();
    let mut seq = Sequence::new();

    mock.expect_list_rest_apis()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(vec![gateway("other", "someone-else")]));
    mock.expect_create_rest_api()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|name| name == "hello")
        .returning(|name| Ok(gateway("gw1", name)));
    // root lookup, then the ensure lookup
    mock.expect_list_resources()
        .times(2)
        .in_sequence(&mut seq)
        .withf(|id| id == "gw1")
        .returning(|_| Ok(vec![resource("root", None, "/")]));
    mock.expect_create_resource()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|gw, parent, part| gw == "gw1" && parent == "root" && part == "{proxy+}")
        .returning(|_, parent, _| Ok(resource("r1", Some(parent), "/{proxy+}")));
    mock.expect_put_method()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|gw, res, _| gw == "gw1" && res == "r1")
        .returning(|_, _, _| Ok(()));
    mock.expect_put_integration()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));
    mock.expect_create_deployment()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|gw, stage| gw == "gw1" && stage == "local")
        .returning(|_, _| {
            Ok(Deployment {
                id: "dep1".to_owned(),
            })
        });

    let client = GatewayClient::with_api(mock);
    let provisioned = client
        .provision(
            "hello",
            ARN,
            "us-east-1",
            &RouteBinding::greedy_proxy(),
            "local",
        )
        .await
        .unwrap();

    assert!(provisioned.created_gateway);
    assert_eq!(provisioned.gateway.id, "gw1");
    assert_eq!(provisioned.resource.id, "r1");
    assert_eq!(provisioned.deployment.id, "dep1");
}

#[tokio::test]
async fn provision_existing_gateway_reuses_resources() {
    let mut mock = MockApiGateway::new();

    mock.expect_list_rest_apis()
        .returning(|| Ok(vec![gateway("gw1", "hello")]));
    mock.expect_create_rest_api().never();
    mock.expect_list_resources().returning(|_| {
        Ok(vec![
            resource("root", None, "/"),
            resource("r1", Some("root"), "/{proxy+}"),
        ])
    });
    mock.expect_create_resource().never();
    mock.expect_put_method().times(1).returning(|_, _, _| Ok(()));
    mock.expect_put_integration()
        .times(1)
        .returning(|_, _, _| Ok(()));
    mock.expect_create_deployment().times(1).returning(|_, _| {
        Ok(Deployment {
            id: "dep2".to_owned(),
        })
    });

    let client = GatewayClient::with_api(mock);
    let provisioned = client
        .provision(
            "hello",
            ARN,
            "us-east-1",
            &RouteBinding::greedy_proxy(),
            "local",
        )
        .await
        .unwrap();

    assert!(!provisioned.created_gateway);
    assert_eq!(provisioned.resource.id, "r1");
}

#[tokio::test]
async fn provision_fails_without_root_resource() {
    let mut mock = MockApiGateway::new();

    mock.expect_list_rest_apis()
        .returning(|| Ok(vec![gateway("gw1", "hello")]));
    mock.expect_list_resources().returning(|_| Ok(vec![]));
    mock.expect_create_resource().never();
    mock.expect_create_deployment().never();

    let client = GatewayClient::with_api(mock);
    let result = client
        .provision(
            "hello",
            ARN,
            "us-east-1",
            &RouteBinding::greedy_proxy(),
            "local",
        )
        .await;

    assert!(matches!(
        result,
        Err(GatewayError::MissingRoot { ref gateway_id }) if gateway_id == "gw1"
    ));
}

#[tokio::test]
async fn provision_publish_failure_leaves_wiring_in_place() {
    let mut mock = MockApiGateway::new();

    mock.expect_list_rest_apis()
        .returning(|| Ok(vec![gateway("gw1", "hello")]));
    mock.expect_list_resources()
        .returning(|_| Ok(vec![resource("root", None, "/")]));
    mock.expect_create_resource()
        .times(1)
        .returning(|_, parent, _| Ok(resource("r1", Some(parent), "/{proxy+}")));
    mock.expect_put_method().times(1).returning(|_, _, _| Ok(()));
    mock.expect_put_integration()
        .times(1)
        .returning(|_, _, _| Ok(()));
    mock.expect_create_deployment().returning(|_, _| {
        Err(RemoteError::Service {
            operation: "CreateDeployment",
            message: "TooManyRequestsException".to_owned(),
        })
    });

    let client = GatewayClient::with_api(mock);
    let result = client
        .provision(
            "hello",
            ARN,
            "us-east-1",
            &RouteBinding::greedy_proxy(),
            "local",
        )
        .await;

    assert!(matches!(
        result,
        Err(GatewayError::Publish { ref stage, .. }) if stage == "local"
    ));
}
