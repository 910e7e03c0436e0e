//! Integration tests for the `DigitalOcean` client against a mock API.

use digitalocean::providers::digitalocean::DigitalOcean;
use digitalocean::{CreateDropletRequest, DoError, DropletApi, HttpMethod};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

async fn setup() -> (MockServer, DigitalOcean) {
    let server = MockServer::start().await;
    let client = DigitalOcean::with_base_url(TOKEN, server.uri()).unwrap();
    (server, client)
}

#[tokio::test]
async fn test_requests_carry_bearer_and_json_headers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/regions"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "regions": [{"slug": "nyc1"}, {"slug": "sfo3"}],
            "links": {},
            "meta": {"total": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let regions = client.list_regions().await.unwrap();
    assert_eq!(
        regions,
        vec![json!({"slug": "nyc1"}), json!({"slug": "sfo3"})]
    );
}

#[tokio::test]
async fn test_error_message_taken_from_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/snapshots/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "id": "not_found",
            "message": "The resource you were accessing could not be found."
        })))
        .mount(&server)
        .await;

    let err = client.get_snapshot("missing").await.unwrap_err();
    match err {
        DoError::Api { status, ref message } => {
            assert_eq!(status, 404);
            assert_eq!(
                message,
                "The resource you were accessing could not be found."
            );
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "API Error: The resource you were accessing could not be found."
    );
}

#[tokio::test]
async fn test_error_message_falls_back_to_raw_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream connect error"))
        .mount(&server)
        .await;

    let err = client.get_account().await.unwrap_err();
    assert!(matches!(
        err,
        DoError::Api { status: 502, ref message } if message == "upstream connect error"
    ));
}

#[tokio::test]
async fn test_unsupported_method_fails_before_network() {
    let (server, client) = setup().await;

    let err = client
        .request_str("PATCH", "/droplets", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DoError::UnsupportedMethod(ref m) if m == "PATCH"));

    let err = client
        .request(HttpMethod::Post, "/droplets", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DoError::InvalidRequest(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_gpu_sizes_filtered_client_side() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sizes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sizes": [
                {"slug": "s-1vcpu-1gb", "description": "Basic"},
                {"slug": "g-2vcpu-16gb", "description": "GPU Accelerated"},
                {"slug": "gpu-h100x1-80gb", "description": "gpu-optimized"}
            ]
        })))
        .mount(&server)
        .await;

    let all = client.list_sizes().await.unwrap();
    assert_eq!(all.len(), 3);

    let gpu = client.list_gpu_sizes().await.unwrap();
    let slugs: Vec<_> = gpu.iter().map(|s| s["slug"].as_str().unwrap()).collect();
    assert_eq!(slugs, vec!["g-2vcpu-16gb", "gpu-h100x1-80gb"]);
}

#[tokio::test]
async fn test_snapshots_derived_from_images() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [
                {"type": "distribution", "id": 1},
                {"type": "snapshot", "id": 5},
                {"type": "snapshot", "id": 9}
            ]
        })))
        .mount(&server)
        .await;

    let snapshots = client.list_snapshots().await.unwrap();
    let ids: Vec<_> = snapshots.iter().map(|s| s["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![5, 9]);
}

#[tokio::test]
async fn test_create_droplet_omits_unset_optionals() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/droplets"))
        .and(body_json(json!({
            "name": "gpu-droplet",
            "region": "nyc1",
            "size": "g-2vcpu-16gb",
            "image": "12345",
            "monitoring": false,
            "ipv6": false,
            "private_networking": true
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "droplet": {"id": 3164444, "name": "gpu-droplet", "status": "new"},
            "links": {"actions": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let req = CreateDropletRequest::new("gpu-droplet", "nyc1", "g-2vcpu-16gb", "12345");
    let droplet = client.create_droplet(&req).await.unwrap();

    assert_eq!(droplet["id"], 3_164_444);
    assert_eq!(droplet["status"], "new");
}

#[tokio::test]
async fn test_create_droplet_sends_supplied_optionals() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/droplets"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "droplet": {"id": 1, "status": "new"}
        })))
        .mount(&server)
        .await;

    let req = CreateDropletRequest::new("gpu-droplet", "nyc1", "g-2vcpu-16gb", "12345")
        .with_ssh_keys(vec!["289794".into()])
        .with_tags(vec!["gpu".into(), "ml".into()])
        .with_user_data(Some("#cloud-config".into()));
    client.create_droplet(&req).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["ssh_keys"], json!(["289794"]));
    assert_eq!(body["tags"], json!(["gpu", "ml"]));
    assert_eq!(body["user_data"], json!("#cloud-config"));
}

#[tokio::test]
async fn test_create_droplet_without_id_in_response() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/droplets"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "droplet": {"name": "gpu-droplet", "status": "new"}
        })))
        .mount(&server)
        .await;

    let req = CreateDropletRequest::new("gpu-droplet", "nyc1", "g-2vcpu-16gb", "12345");
    let droplet = client.create_droplet(&req).await.unwrap();

    assert!(droplet.get("id").is_none());
    assert_eq!(droplet["status"], "new");
}

#[tokio::test]
async fn test_get_droplet_unwraps_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/droplets/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "droplet": {"id": 42, "status": "active"}
        })))
        .mount(&server)
        .await;

    let droplet = client.get_droplet(42).await.unwrap();
    assert_eq!(droplet, json!({"id": 42, "status": "active"}));
}

#[tokio::test]
async fn test_delete_droplet_with_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/droplets/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.delete_droplet(42).await.unwrap();
    assert_eq!(result, json!({}));
}

#[tokio::test]
async fn test_ssh_keys_and_account_envelopes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/account/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ssh_keys": [{"id": 512189, "name": "laptop"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": {"email": "ops@example.com", "status": "active"}
        })))
        .mount(&server)
        .await;

    let keys = client.list_ssh_keys().await.unwrap();
    assert_eq!(keys[0]["name"], "laptop");

    let account = client.get_account().await.unwrap();
    assert_eq!(account["email"], "ops@example.com");
}
