mod common;

use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::json;

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let Some(app) = common::spawn_app().await else { return };

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    common::cleanup(app).await;
}

// ── Submission intake ───────────────────────────────────────────

#[tokio::test]
async fn submit_rejects_missing_required_field() {
    let Some(app) = common::spawn_app().await else { return };

    let mut record = common::valid_record();
    record.as_object_mut().unwrap().remove("incidentDate");
    let (body, status) = app.submit(&record).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("incidentDate"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn submit_rejects_missing_screenshot() {
    let Some(app) = common::spawn_app().await else { return };

    let form = reqwest::multipart::Form::new()
        .text("data", common::valid_record().to_string())
        .part(
            "screenshot1",
            reqwest::multipart::Part::bytes(b"\x89PNG".to_vec()).file_name("cap1.png"),
        );
    let resp = app
        .client
        .post(app.url("/api/v1/submissions"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn submit_stores_record_and_screenshots() {
    let Some(app) = common::spawn_app().await else { return };

    let (body, status) = app.submit(&common::valid_record()).await;
    assert_eq!(status, StatusCode::CREATED, "submit failed: {body}");
    assert_eq!(body["status"], "created");
    let id = body["id"].as_str().unwrap();
    assert!(id.starts_with("E1234-Ana_García-"));
    assert_eq!(app.screenshots.len(), 3);

    let (record, status) = app.get_admin(&format!("/api/v1/submissions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["workerName"], "Ana García");
    assert_eq!(record["serviceType"]["hospitalDischarge"], true);
    assert_eq!(record["serviceType"]["other"], false);
    assert!(record["screenshot1_url"]
        .as_str()
        .unwrap()
        .contains("/screenshots/"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn submit_never_persists_email() {
    let Some(app) = common::spawn_app().await else { return };

    let mut record = common::valid_record();
    record["email"] = json!("ana@example.com");
    let (body, status) = app.submit(&record).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap();

    let (stored, _) = app.get_admin(&format!("/api/v1/submissions/{id}")).await;
    assert!(stored.get("email").is_none());

    common::cleanup(app).await;
}

// ── Admin endpoints ─────────────────────────────────────────────

#[tokio::test]
async fn admin_endpoints_require_token() {
    let Some(app) = common::spawn_app().await else { return };

    let resp = app
        .client
        .get(app.url("/api/v1/submissions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .client
        .get(app.url("/api/v1/submissions"))
        .bearer_auth("wrong-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn list_paginates_and_searches() {
    let Some(app) = common::spawn_app().await else { return };

    let (_, status) = app.submit(&common::valid_record()).await;
    assert_eq!(status, StatusCode::CREATED);
    let mut other = common::valid_record();
    other["workerName"] = json!("Benito Pérez");
    other["employeeId"] = json!("E9999");
    let (_, status) = app.submit(&other).await;
    assert_eq!(status, StatusCode::CREATED);

    let (body, status) = app.get_admin("/api/v1/submissions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["submissions"].as_array().unwrap().len(), 2);

    let (body, _) = app
        .get_admin("/api/v1/submissions?search=Benito&per_page=10")
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["submissions"][0]["employeeId"], "E9999");

    common::cleanup(app).await;
}

#[tokio::test]
async fn delete_removes_submission() {
    let Some(app) = common::spawn_app().await else { return };

    let (body, _) = app.submit(&common::valid_record()).await;
    let id = body["id"].as_str().unwrap().to_string();

    let (body, status) = app.delete_admin(&format!("/api/v1/submissions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted");

    let (_, status) = app.delete_admin(&format!("/api/v1/submissions/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn export_returns_all_records() {
    let Some(app) = common::spawn_app().await else { return };

    app.submit(&common::valid_record()).await;
    let (body, status) = app.get_admin("/api/v1/submissions/export").await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["workerName"], "Ana García");

    common::cleanup(app).await;
}

#[tokio::test]
async fn stats_summarize_submissions() {
    let Some(app) = common::spawn_app().await else { return };

    app.submit(&common::valid_record()).await;
    let (body, status) = app.get_admin("/api/v1/submissions/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["this_week"], 1);
    assert_eq!(body["average_excess_minutes"], 50.0);
    assert_eq!(body["top_coordinators"][0]["name"], "Luis");

    common::cleanup(app).await;
}

// ── Screenshot access tokens ────────────────────────────────────

#[tokio::test]
async fn token_issue_validates_input() {
    let Some(app) = common::spawn_app().await else { return };

    let (body, status) = app
        .post_json(
            "/api/v1/screenshots/access",
            &json!({ "userEmail": "ana@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("screenshotUrl"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn token_grants_exactly_one_access() {
    let Some(app) = common::spawn_app().await else { return };

    app.screenshots
        .insert("abc/img1.png", "image/png", Bytes::from_static(b"\x89PNG data"));
    let url = "http://localhost:0/screenshots/abc/img1.png";

    let (body, status) = app
        .post_json(
            "/api/v1/screenshots/access",
            &json!({ "screenshotUrl": url, "userEmail": "ana@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let secure_url = body["secureUrl"].as_str().unwrap();
    assert!(body["expiresAt"].is_string());
    let token = secure_url.rsplit("token=").next().unwrap().to_string();

    let path = format!("/api/v1/screenshots/access?token={token}");
    let resp = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(resp.bytes().await.unwrap(), Bytes::from_static(b"\x89PNG data"));

    // Second use of the same token fails
    let resp = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn token_resolve_rejects_missing_and_unknown_tokens() {
    let Some(app) = common::spawn_app().await else { return };

    let resp = app
        .client
        .get(app.url("/api/v1/screenshots/access"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .client
        .get(app.url("/api/v1/screenshots/access?token=deadbeef"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn token_is_consumed_even_when_object_is_gone() {
    let Some(app) = common::spawn_app().await else { return };

    // Token for a URL whose object was never stored
    let url = "http://localhost:0/screenshots/gone/img1.png";
    let (body, _) = app
        .post_json(
            "/api/v1/screenshots/access",
            &json!({ "screenshotUrl": url, "userEmail": "ana@example.com" }),
        )
        .await;
    let secure_url = body["secureUrl"].as_str().unwrap();
    let token = secure_url.rsplit("token=").next().unwrap().to_string();
    let path = format!("/api/v1/screenshots/access?token={token}");

    let resp = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The failed fetch still spent the token
    let resp = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

// ── Notifications ───────────────────────────────────────────────

#[tokio::test]
async fn submission_copy_validates_input() {
    let Some(app) = common::spawn_app().await else { return };

    let (body, status) = app
        .post_json(
            "/api/v1/notifications/submission-copy",
            &json!({ "formData": { "workerName": "Ana" } }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("userEmail"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn submission_copy_fails_without_smtp() {
    let Some(app) = common::spawn_app().await else { return };

    let (body, status) = app
        .post_json(
            "/api/v1/notifications/submission-copy",
            &json!({
                "formData": { "workerName": "Ana" },
                "userEmail": "ana@example.com"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Service not configured");

    common::cleanup(app).await;
}
