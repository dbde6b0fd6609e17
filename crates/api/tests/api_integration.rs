//! Integration tests for the API server.

use std::io;
use std::sync::{Arc, Mutex, OnceLock};

use api::config::{AppEnv, Config};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use customer_store::InMemoryCustomerStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn test_config() -> Config {
    Config {
        upload_dir: std::env::temp_dir().join(format!("api-uploads-{}", uuid::Uuid::new_v4())),
        ..Config::default()
    }
}

fn setup() -> axum::Router {
    let config = test_config();
    let state = api::create_state(InMemoryCustomerStore::new(), &config);
    api::create_app(state, get_metrics_handle(), &config)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn customer(email: &str, mobile: &str) -> Value {
    json!({
        "fname": "Asha",
        "lname": "Rao",
        "email": email,
        "mobile": mobile,
        "gender": "Female",
        "status": "Active",
        "profile": "asha.png",
        "addresses": [{
            "addressLine1": "12 MG Road",
            "city": "Pune",
            "state": "MH",
            "pincode": "411001"
        }]
    })
}

async fn register(app: &axum::Router, email: &str, mobile: &str) -> Value {
    let (status, json) = send(app, json_request("POST", "/api/user/register", customer(email, mobile))).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    json["data"].clone()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
    assert_eq!(json["message"], "Server is running");
}

#[tokio::test]
async fn test_register_single_address_customer() {
    let app = setup();
    let data = register(&app, "a@x.com", "9876543210").await;

    assert_eq!(data["isSingleAddress"], true);
    assert_eq!(data["addresses"][0]["isDefault"], true);
    assert_eq!(data["addresses"][0]["country"], "India");
    assert_eq!(data["fullName"], "Asha Rao");
    assert_eq!(data["createdBy"], "system");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = setup();
    register(&app, "a@x.com", "9876543210").await;

    let (status, json) = send(
        &app,
        json_request("POST", "/api/user/register", customer("a@x.com", "9123456780")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "User with this email already exists");
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_register_validation_lists_errors() {
    let app = setup();
    let (status, json) = send(
        &app,
        json_request("POST", "/api/user/register", json!({ "fname": "Asha" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Validation failed");
    let errors = json["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e == "Gender is required"));
    assert!(errors.iter().any(|e| e == "Profile picture is required"));
}

#[tokio::test]
async fn test_register_multipart_with_picture() {
    let app = setup();
    let boundary = "X-BOUNDARY";
    let text = |name: &str, value: &str| {
        format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
    };
    let mut body = String::new();
    for (name, value) in [
        ("fname", "Ravi"),
        ("lname", "Kumar"),
        ("email", "Ravi@Example.com"),
        ("mobile", "9123456780"),
        ("gender", "Male"),
        ("status", "Active"),
        ("location", " Pune "),
        ("dateOfBirth", ""),
        (
            "addresses",
            r#"[{"addressLine1":"1 Main","city":"Pune","state":"MH","pincode":"411001","addressType":"work"}]"#,
        ),
    ] {
        body.push_str(&text(name, value));
    }
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"user_profile\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
    ));

    let request = Request::builder()
        .method("POST")
        .uri("/api/user/register")
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .header("x-user-id", "admin-7")
        .body(Body::from(body))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK, "{json}");
    let data = &json["data"];
    assert_eq!(data["email"], "ravi@example.com");
    assert_eq!(data["location"], "Pune");
    assert_eq!(data["createdBy"], "admin-7");
    assert_eq!(data["addresses"][0]["addressType"], "work");
    let picture = data["profilePictureRef"].as_str().unwrap();
    assert!(picture.starts_with("image-") && picture.ends_with(".png"));
}

#[tokio::test]
async fn test_invalid_address_string_is_rejected() {
    let app = setup();
    let mut body = customer("a@x.com", "9876543210");
    body["addresses"] = json!("[{not json");

    let (status, json) = send(&app, json_request("POST", "/api/user/register", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid address format");
}

#[tokio::test]
async fn test_get_customer_by_id() {
    let app = setup();
    let created = register(&app, "a@x.com", "9876543210").await;
    let id = created["id"].as_str().unwrap();

    let (status, json) = send(&app, get(&format!("/api/user/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["email"], "a@x.com");

    let (status, json) = send(&app, get("/api/user/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid user ID format");

    let unknown = uuid::Uuid::new_v4();
    let (status, json) = send(&app, get(&format!("/api/user/{unknown}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "User not found");
}

#[tokio::test]
async fn test_edit_conflict_and_update() {
    let app = setup();
    let first = register(&app, "a@x.com", "9876543210").await;
    register(&app, "b@x.com", "9123456780").await;
    let id = first["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        json_request("PUT", &format!("/api/user/edit/{id}"), json!({ "email": "b@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "Email already exists for another user");

    let (status, json) = send(
        &app,
        json_request("PUT", &format!("/api/user/edit/{id}"), json!({ "lname": "Iyer", "email": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["lastName"], "Iyer");
    assert_eq!(json["data"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_status_change() {
    let app = setup();
    let created = register(&app, "a@x.com", "9876543210").await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/user/status/{id}");

    let (status, json) = send(&app, json_request("PUT", &uri, json!({ "data": "InActive" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "User status updated to InActive");
    assert_eq!(json["data"]["status"], "InActive");

    let (status, json) = send(&app, json_request("PUT", &uri, json!({ "data": "Paused" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Valid status (Active/InActive) is required");
}

#[tokio::test]
async fn test_delete_customer() {
    let app = setup();
    let created = register(&app, "a@x.com", "9876543210").await;
    let id = created["id"].as_str().unwrap();

    let delete = |uri: String| Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap();

    let (status, json) = send(&app, delete(format!("/api/user/delete/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], id);

    let (status, _) = send(&app, delete(format!("/api/user/delete/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_address_lifecycle() {
    let app = setup();
    let created = register(&app, "a@x.com", "9876543210").await;
    let id = created["id"].as_str().unwrap();
    let first = created["addresses"][0]["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/user/{id}/address"),
            json!({ "addressLine1": "9 Park St", "city": "Mumbai", "state": "MH", "pincode": "400001" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Address added successfully");
    assert_eq!(json["data"]["isSingleAddress"], false);
    let second = json["data"]["addresses"][1]["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        json_request("PUT", &format!("/api/user/{id}/address/{second}/default"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["defaultAddress"]["id"], second.as_str());

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/user/{id}/address/{second}"))
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let addresses = json["data"]["addresses"].as_array().unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0]["id"], first.as_str());
    assert_eq!(addresses[0]["isDefault"], true);
    assert_eq!(json["data"]["isSingleAddress"], true);
}

#[tokio::test]
async fn test_address_validation_and_unknown_address() {
    let app = setup();
    let created = register(&app, "a@x.com", "9876543210").await;
    let id = created["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        json_request("POST", &format!("/api/user/{id}/address"), json!({ "city": "Pune" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Address validation failed");
    assert!(!json["errors"].as_array().unwrap().is_empty());

    let missing = uuid::Uuid::new_v4();
    let (status, json) = send(
        &app,
        json_request("PUT", &format!("/api/user/{id}/address/{missing}"), json!({ "city": "Goa" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Address not found");
}

#[tokio::test]
async fn test_details_filters_and_pagination() {
    let app = setup();
    register(&app, "a@x.com", "9876543210").await;
    register(&app, "b@x.com", "9123456780").await;

    let (status, json) = send(&app, get("/api/user/details?pincode=411001&limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["users"].as_array().unwrap().len(), 1);
    assert_eq!(data["pagination"]["totalItems"], 2);
    assert_eq!(data["pagination"]["totalPages"], 2);
    assert_eq!(data["pagination"]["hasNextPage"], true);
    assert_eq!(data["filters"]["pincode"], "411001");

    let (_, json) = send(&app, get("/api/user/details?isSingleAddress=false")).await;
    assert!(json["data"]["users"].as_array().unwrap().is_empty());

    let (_, json) = send(&app, get("/api/user/clear-filters?gender=Male")).await;
    assert_eq!(json["data"]["pagination"]["totalItems"], 2);
    assert!(json["data"].get("filters").is_none());
}

#[tokio::test]
async fn test_location_search_and_named_views() {
    let app = setup();
    register(&app, "a@x.com", "9876543210").await;

    let (status, json) = send(&app, get("/api/user/search/location")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "At least one location parameter (city, state, pincode) is required"
    );

    let (status, json) = send(&app, get("/api/user/search/location?city=pune")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (_, json) = send(&app, get("/api/user/single-addresses")).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (_, json) = send(&app, get("/api/user/multiple-addresses")).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    register(&app, "a@x.com", "9876543210").await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("customer_mutations_total"));
}

#[tokio::test]
async fn test_development_mode_uses_same_envelope() {
    let config = Config {
        app_env: AppEnv::Development,
        ..test_config()
    };
    let state = api::create_state(InMemoryCustomerStore::new(), &config);
    let app = api::create_app(state, get_metrics_handle(), &config);

    let (status, json) = send(&app, get("/api/user/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_none());
}

/// Collects formatted log output written by a scoped subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_failures_are_logged_with_their_operation() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = setup();
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/user/delete/{}", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/user/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let output = logs.contents();
    let rejections: Vec<&str> = output.lines().filter(|l| l.contains("request rejected")).collect();
    assert_eq!(rejections.len(), 2, "{output}");
    assert!(rejections[0].contains("operation=\"delete_customer\""), "{output}");
    assert!(rejections[0].contains("User not found"), "{output}");
    assert!(rejections[1].contains("operation=\"get_customer\""), "{output}");
    assert!(rejections[1].contains("Invalid user ID format"), "{output}");
}
