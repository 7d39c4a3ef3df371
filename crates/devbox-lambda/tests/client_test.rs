//! Client tests against a local mock of the Lambda Cloud API
//!
//! Covers each failure category of the request pipeline plus the
//! launch-then-wait flow used by `devbox up`.

use devbox_lambda::*;
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

/// base64("test-key:")
const AUTH_HEADER: &str = "Basic dGVzdC1rZXk6";

fn client_for(server: &Server) -> LambdaClient {
    let config = ClientConfig::new("test-key")
        .with_base_url(server.url())
        .with_timeout(Duration::from_secs(5));
    LambdaClient::new(config).unwrap()
}

fn instance_json(id: &str, status: &str, ip: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "name": null,
        "ip": ip,
        "status": status,
        "ssh_key_names": ["laptop"],
        "file_system_names": [],
        "region": {"name": "us-east-1", "description": "Virginia, USA"},
        "instance_type": {
            "name": "gpu_1x_a10",
            "description": "1x A10 (24 GB PCIe)",
            "gpu_description": "A10 (24 GB PCIe)",
            "price_cents_per_hour": 75,
            "specs": {"vcpus": 30, "memory_gib": 200, "storage_gib": 1400, "gpus": 1}
        }
    })
}

#[tokio::test]
async fn test_list_instances_sends_auth_and_unwraps_envelope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/instances")
        .match_header("authorization", AUTH_HEADER)
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"data": [
                instance_json("i-1", "active", Some("198.51.100.10")),
                instance_json("i-2", "booting", None)
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let instances = client.list_instances().await.unwrap();

    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].status, InstanceStatus::Active);
    assert_eq!(instances[0].public_ip(), Some("198.51.100.10"));
    assert!(instances[1].ip.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_terminate_unknown_instance_is_structured_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/instance-operations/terminate")
        .match_body(Matcher::Json(json!({"instance_ids": ["does-not-exist"]})))
        .with_status(404)
        .with_body(
            json!({"error": {
                "code": "global/object-does-not-exist",
                "message": "Specified instance does not exist.",
                "suggestion": "Check the instance ID."
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let request = TerminateRequest {
        instance_ids: vec!["does-not-exist".to_string()],
    };
    let err = client.terminate_instances(&request).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Structured);
    match err {
        ApiError::Api(e @ InstanceError::InstanceNotFound(_)) => {
            assert_eq!(e.code(), "instance-not-found");
            assert_eq!(e.detail().suggestion.as_deref(), Some("Check the instance ID."));
        }
        other => panic!("expected InstanceNotFound, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unparseable_error_body_is_raw_status_error() {
    let mut server = Server::new_async().await;
    let body = format!("<html>{}</html>", "gateway timeout ".repeat(40));
    server
        .mock("GET", "/images")
        .with_status(504)
        .with_body(&body)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.list_images().await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Transport);
    match err {
        ApiError::Status {
            status, body: kept, ..
        } => {
            assert_eq!(status.as_u16(), 504);
            assert_eq!(kept.chars().count(), MAX_ERROR_BODY_CHARS);
            assert!(body.starts_with(&kept));
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_code_outside_endpoint_union_is_raw_status_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/ssh-keys")
        .with_status(400)
        .with_body(
            json!({"error": {
                "code": "instance-operations/launch/insufficient-capacity",
                "message": "Not enough capacity"
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.list_ssh_keys().await.unwrap_err();

    assert!(matches!(err, ApiError::Status { .. }));
}

#[tokio::test]
async fn test_success_with_wrong_shape_is_response_shape_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/instances")
        .with_status(200)
        .with_body(json!({"data": [{"id": "i-1", "status": "exploded"}]}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.list_instances().await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::ResponseShape);
    assert!(matches!(err, ApiError::ResponseShape { .. }));
}

#[tokio::test]
async fn test_success_with_empty_body_is_response_shape_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/file-systems")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.list_filesystems().await.unwrap_err();

    assert!(matches!(err, ApiError::ResponseShape { .. }));
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    let config = ClientConfig::new("test-key")
        .with_base_url("http://127.0.0.1:1")
        .with_timeout(Duration::from_secs(2));
    let client = LambdaClient::new(config).unwrap();

    let err = client.list_instances().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[tokio::test]
async fn test_launch_omits_unset_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/instance-operations/launch")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "region_name": "us-east-1",
            "instance_type_name": "gpu_1x_a10",
            "ssh_key_names": ["laptop"],
            "quantity": 2,
            "name": "trainer"
        })))
        .with_status(200)
        .with_body(json!({"data": {"instance_ids": ["i-1", "i-2"]}}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let request = LaunchRequest::new("us-east-1", "gpu_1x_a10", vec!["laptop".to_string()])
        .unwrap()
        .with_quantity(2)
        .unwrap()
        .with_name("trainer");

    let response = client.launch_instances(&request).await.unwrap();

    assert_eq!(response.instance_ids, vec!["i-1", "i-2"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_launch_insufficient_capacity() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/instance-operations/launch")
        .with_status(400)
        .with_body(
            json!({"error": {
                "code": "instance-operations/launch/insufficient-capacity",
                "message": "Not enough capacity to fulfill launch request.",
                "suggestion": "Choose an instance type with more availability, or try again later."
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let request =
        LaunchRequest::new("us-east-1", "gpu_8x_h100_sxm5", vec!["laptop".to_string()]).unwrap();
    let err = client.launch_instances(&request).await.unwrap_err();

    assert!(matches!(
        err.structured(),
        Some(LaunchError::InsufficientCapacity(_))
    ));
}

#[tokio::test]
async fn test_launch_sends_encoded_user_data() {
    let mut server = Server::new_async().await;
    let cloud_init = "#cloud-config\npackages:\n  - git\n";
    let mock = server
        .mock("POST", "/instance-operations/launch")
        .match_body(Matcher::PartialJson(json!({
            "user_data": "I2Nsb3VkLWNvbmZpZwpwYWNrYWdlczoKICAtIGdpdAo=",
            "file_system_names": ["devbox-home"],
            "image": {"id": "img-1"}
        })))
        .with_status(200)
        .with_body(json!({"data": {"instance_ids": ["i-1"]}}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let request = LaunchRequest::new("us-east-1", "gpu_1x_a10", vec!["laptop".to_string()])
        .unwrap()
        .with_file_systems(vec!["devbox-home".to_string()])
        .with_image(ImageSpec::Id {
            id: "img-1".to_string(),
        })
        .with_user_data(UserData::encode(cloud_init));

    client.launch_instances(&request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_modify_and_get_instance() {
    let mut server = Server::new_async().await;
    let modify = server
        .mock("PATCH", "/instances/i-1")
        .match_body(Matcher::Json(json!({"name": "renamed"})))
        .with_status(200)
        .with_body(
            json!({"data": {
                "id": "i-1",
                "name": "renamed",
                "ip": "198.51.100.10",
                "status": "active",
                "region": {"name": "us-east-1", "description": "Virginia, USA"},
                "instance_type": {
                    "name": "gpu_1x_a10",
                    "description": "1x A10 (24 GB PCIe)",
                    "gpu_description": "A10 (24 GB PCIe)",
                    "price_cents_per_hour": 75,
                    "specs": {"vcpus": 30, "memory_gib": 200, "storage_gib": 1400, "gpus": 1}
                }
            }})
            .to_string(),
        )
        .create_async()
        .await;
    let get = server
        .mock("GET", "/instances/i-2")
        .with_status(404)
        .with_body(
            json!({"error": {"code": "global/object-does-not-exist", "message": "gone"}})
                .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);

    let renamed = client
        .modify_instance(
            "i-1",
            &ModifyRequest {
                name: Some("renamed".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name.as_deref(), Some("renamed"));

    let err = client.get_instance("i-2").await.unwrap_err();
    assert!(matches!(
        err.structured(),
        Some(InstanceError::InstanceNotFound(_))
    ));

    modify.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn test_restart_returns_instances() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/instance-operations/restart")
        .match_body(Matcher::Json(json!({"instance_ids": ["i-1"]})))
        .with_status(200)
        .with_body(
            json!({"data": {"restarted_instances": [
                instance_json("i-1", "booting", Some("198.51.100.10"))
            ]}})
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .restart_instances(&RestartRequest {
            instance_ids: vec!["i-1".to_string()],
        })
        .await
        .unwrap();

    assert_eq!(response.restarted_instances.len(), 1);
    assert_eq!(response.restarted_instances[0].status, InstanceStatus::Booting);
}

#[tokio::test]
async fn test_firewall_ruleset_in_use() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/firewall-rulesets")
        .with_status(409)
        .with_body(
            json!({"error": {"code": "global/object-in-use", "message": "ruleset attached"}})
                .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.list_firewall_rulesets().await.unwrap_err();

    match err.structured() {
        Some(e @ FirewallError::RulesetInUse(_)) => assert_eq!(e.code(), "ruleset-in-use"),
        other => panic!("expected RulesetInUse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_instance_types_catalog() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/instance-types")
        .with_status(200)
        .with_body(
            json!({"data": {
                "gpu_1x_a10": {
                    "instance_type": {
                        "name": "gpu_1x_a10",
                        "description": "1x A10 (24 GB PCIe)",
                        "gpu_description": "A10 (24 GB PCIe)",
                        "price_cents_per_hour": 75,
                        "specs": {"vcpus": 30, "memory_gib": 200, "storage_gib": 1400, "gpus": 1}
                    },
                    "regions_with_capacity_available": [
                        {"name": "us-east-1", "description": "Virginia, USA"}
                    ]
                }
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let catalog = client.list_instance_types().await.unwrap();

    let a10 = catalog.get("gpu_1x_a10").unwrap();
    assert_eq!(a10.instance_type.price_cents_per_hour, 75);
    assert!(a10.has_capacity());
}

#[tokio::test]
async fn test_launch_two_then_wait_returns_both_in_order() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/instance-operations/launch")
        .with_status(200)
        .with_body(json!({"data": {"instance_ids": ["i-a", "i-b"]}}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/instances")
        .with_status(200)
        .with_body(
            json!({"data": [
                instance_json("i-b", "booting", Some("198.51.100.11")),
                instance_json("other", "active", Some("198.51.100.99")),
                instance_json("i-a", "active", Some("198.51.100.10"))
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let request = LaunchRequest::new("us-east-1", "gpu_1x_a10", vec!["laptop".to_string()])
        .unwrap()
        .with_quantity(2)
        .unwrap();
    let launched = client.launch_instances(&request).await.unwrap();

    let policy = WaitPolicy {
        timeout: Duration::from_secs(30),
        poll_interval: Duration::from_millis(10),
    };
    let ready = wait_for_instances(&client, &launched.instance_ids, &policy, &mut ())
        .await
        .unwrap();

    let ids: Vec<&str> = ready.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["i-a", "i-b"]);
    assert!(ready.iter().all(|i| i.is_ready()));
}
