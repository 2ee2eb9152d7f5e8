use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use shiftlog::config::{Config, S3Config};
use shiftlog::storage::MemoryScreenshotStore;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// A running test server instance with a dedicated test database and
/// an in-memory screenshot store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub screenshots: Arc<MemoryScreenshotStore>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit a full multipart intake with three screenshots, return
    /// (body, status).
    pub async fn submit(&self, record: &Value) -> (Value, StatusCode) {
        let data = serde_json::to_string(record).unwrap();
        let form = reqwest::multipart::Form::new()
            .text("data", data)
            .part(
                "screenshot1",
                reqwest::multipart::Part::bytes(b"\x89PNG one".to_vec())
                    .file_name("cap1.png"),
            )
            .part(
                "screenshot2",
                reqwest::multipart::Part::bytes(b"\xff\xd8 two".to_vec())
                    .file_name("cap2.jpg"),
            )
            .part(
                "screenshot3",
                reqwest::multipart::Part::bytes(b"\xff\xd8 three".to_vec())
                    .file_name("cap3.jpg"),
            );

        let resp = self
            .client
            .post(self.url("/api/v1/submissions"))
            .multipart(form)
            .send()
            .await
            .expect("submit request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an admin GET request.
    pub async fn get_admin(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(ADMIN_TOKEN)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an admin DELETE request.
    pub async fn delete_admin(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(ADMIN_TOKEN)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST JSON to a public endpoint.
    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// A record that passes intake validation.
pub fn valid_record() -> Value {
    json!({
        "workerName": "Ana García",
        "employeeId": "E1234",
        "incidentDate": "2025-03-14",
        "travelTimeToOrigin": "15",
        "travelTimeOriginToDestination": "40",
        "travelTimeDestinationToBase": "35",
        "estimatedWorkTimeOrigin": "10",
        "estimatedWorkTimeDestination": "10",
        "totalEstimatedServiceTime": "110",
        "serviceType": { "hospitalDischarge": true, "nonUrgentTransfer": false,
                         "other": false, "otherText": "" },
        "excessMinutes": "50",
        "coordinatorName": "Luis"
    })
}

/// Spawn a test app with a fresh temporary database, or `None` when
/// `TEST_DATABASE_URL` is not configured in this environment.
pub async fn spawn_app() -> Option<TestApp> {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("TEST_DATABASE_URL").ok()?;

    // Create a unique test database
    let db_name = format!("shiftlog_test_{}", hex::encode(rand::random::<[u8; 8]>()));

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        admin_token: ADMIN_TOKEN.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        max_body_size: 16_777_216,
        log_level: "warn".to_string(),
        s3: S3Config {
            bucket: "screenshots".to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            force_path_style: false,
            public_base_url: "http://localhost:0/screenshots".to_string(),
        },
        smtp: None,
    };

    let screenshots = Arc::new(MemoryScreenshotStore::new(&config.s3.public_base_url));
    let app = shiftlog::build_app(pool.clone(), screenshots.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    Some(TestApp {
        addr,
        pool,
        client,
        db_name,
        screenshots,
    })
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
