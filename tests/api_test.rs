mod common;

use axum::http::{Method, StatusCode};
use chrono::{Datelike, Utc};
use common::{read_bytes, read_json, MultipartBody, Seed, TestApp};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;

fn year() -> i32 {
    Utc::now().year()
}

fn create_form_body(seed: &Seed, form_type: &str, amount: &str) -> MultipartBody {
    MultipartBody::new()
        .text("form_type", form_type)
        .text("total_amount", amount)
        .text("cost_center_id", seed.cost_center.id)
        .text("submitted_by_id", seed.employee.id)
}

async fn create_form(app: &TestApp, body: MultipartBody) -> Value {
    let response = app.multipart(Method::POST, "/forms", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn directory_endpoints_create_and_list() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/customers",
            Some(json!({"name": "Globex", "code": "GLX", "description": "Logistics"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let customer = read_json(response).await;
    let customer_id = customer["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::POST,
            "/cost-centers",
            Some(json!({"name": "Warehouse", "code": "GLX-WH", "customer_id": customer_id})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cost_center = read_json(response).await;
    assert_eq!(cost_center["customer"]["code"], "GLX");

    let response = app
        .request(
            Method::POST,
            "/users",
            Some(json!({
                "username": "amgr",
                "email": "amgr@example.com",
                "full_name": "Alex Manager",
                "role": "project_manager"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = read_json(response).await;
    assert_eq!(user["is_active"], true);
    assert_eq!(user["role"], "project_manager");

    let customers = read_json(app.request(Method::GET, "/customers", None).await).await;
    assert_eq!(customers["customers"].as_array().unwrap().len(), 1);

    let cost_centers = read_json(
        app.request(
            Method::GET,
            &format!("/cost-centers?customer_id={customer_id}"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(cost_centers["cost_centers"][0]["code"], "GLX-WH");

    let none = read_json(
        app.request(
            Method::GET,
            &format!("/cost-centers?customer_id={}", customer_id + 1),
            None,
        )
        .await,
    )
    .await;
    assert!(none["cost_centers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn users_filter_by_role() {
    let app = TestApp::new().await;
    let seed = app.seed().await;

    let managers = read_json(
        app.request(Method::GET, "/users?role=project_manager", None)
            .await,
    )
    .await;
    let managers = managers["users"].as_array().unwrap();
    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0]["id"].as_i64(), Some(i64::from(seed.manager.id)));

    let everyone = read_json(app.request(Method::GET, "/users", None).await).await;
    assert_eq!(everyone["users"].as_array().unwrap().len(), 2);

    let blank = read_json(app.request(Method::GET, "/users?role=", None).await).await;
    assert_eq!(blank["users"].as_array().unwrap().len(), 2);

    let response = app.request(Method::GET, "/users?role=wizard", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["message"].is_string());
}

#[tokio::test]
async fn duplicate_customer_code_is_a_conflict() {
    let app = TestApp::new().await;
    let body = json!({"name": "Acme", "code": "ACME"});

    let first = app.request(Method::POST, "/customers", Some(body.clone())).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.request(Method::POST, "/customers", Some(body)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let error = read_json(second).await;
    assert_eq!(error["error"], "Conflict");
    assert!(error["timestamp"].is_string());
}

#[tokio::test]
async fn invalid_user_email_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/users",
            Some(json!({"username": "bad", "email": "not-an-email", "full_name": "Bad"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_form_from_multipart_with_attachment() {
    let app = TestApp::new().await;
    let seed = app.seed().await;

    let body = create_form_body(&seed, "reimbursement", "150.00")
        .text("remarks", "Client dinner")
        .text("assigned_to_id", seed.manager.id)
        .file("attachment", "dinner.jpg", "image/jpeg", b"\xff\xd8\xff\xe0jpeg");
    let form = create_form(&app, body).await;

    let number = format!("REI-{}-0001", year());
    assert_eq!(form["form_number"], number.as_str());
    assert_eq!(form["status"], "pending");
    assert_eq!(form["form_type"], "reimbursement");
    assert_eq!(form["remarks"], "Client dinner");
    assert_eq!(
        Decimal::from_str(form["total_amount"].as_str().unwrap()).unwrap(),
        Decimal::new(150, 0)
    );
    assert_eq!(form["submitted_by"]["username"], "jdoe");
    assert_eq!(form["assigned_to"]["username"], "pmlead");
    assert_eq!(form["cost_center"]["customer"]["code"], "ACME");

    let public_path = format!("/uploads/{number}.jpg");
    assert_eq!(form["attachment_path"], public_path.as_str());
    assert!(app.uploads.path().join(format!("{number}.jpg")).exists());

    let download = app.request(Method::GET, &public_path, None).await;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(read_bytes(download).await, b"\xff\xd8\xff\xe0jpeg");
}

#[tokio::test]
async fn empty_file_part_means_no_attachment() {
    let app = TestApp::new().await;
    let seed = app.seed().await;

    let body = create_form_body(&seed, "cash_advance", "500").file(
        "attachment",
        "",
        "application/octet-stream",
        b"",
    );
    let form = create_form(&app, body).await;
    assert_eq!(form["form_number"], format!("CA-{}-0001", year()).as_str());
    assert!(form["attachment_path"].is_null());
}

#[tokio::test]
async fn create_form_rejects_bad_fields() {
    let app = TestApp::new().await;
    let seed = app.seed().await;

    let missing_amount = MultipartBody::new()
        .text("form_type", "reimbursement")
        .text("cost_center_id", seed.cost_center.id)
        .text("submitted_by_id", seed.employee.id);
    let response = app.multipart(Method::POST, "/forms", missing_amount).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = read_json(response).await;
    assert!(error["message"]
        .as_str()
        .unwrap()
        .contains("total_amount"));

    let unknown_type = create_form_body(&seed, "travel", "10");
    let response = app.multipart(Method::POST, "/forms", unknown_type).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let negative = create_form_body(&seed, "liquidation", "-5");
    let response = app.multipart(Method::POST, "/forms", negative).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stats = read_json(app.request(Method::GET, "/dashboard/stats", None).await).await;
    assert_eq!(stats["total_forms"], 0);
}

#[tokio::test]
async fn missing_form_returns_404_with_message() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/forms/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));
    let error = read_json(response).await;
    assert_eq!(error["error"], "Not Found");
    assert_eq!(error["message"], "Not found: Form not found");
    assert!(error["request_id"].is_string());

    let response = app
        .urlencoded(Method::PUT, "/forms/999/status", "status=approved")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .urlencoded(Method::PUT, "/forms/999/assign", "assigned_to_id=1")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_update_accepts_multipart_urlencoded_and_json() {
    let app = TestApp::new().await;
    let seed = app.seed().await;
    let form = create_form(&app, create_form_body(&seed, "reimbursement", "42.50")).await;
    let uri = format!("/forms/{}/status", form["id"]);

    let response = app
        .multipart(
            Method::PUT,
            &uri,
            MultipartBody::new().text("status", "approved"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Status updated successfully");
    assert_eq!(body["form"]["status"], "approved");

    let response = app.urlencoded(Method::PUT, &uri, "status=completed").await;
    assert_eq!(read_json(response).await["form"]["status"], "completed");

    let response = app
        .request(Method::PUT, &uri, Some(json!({"status": "rejected"})))
        .await;
    assert_eq!(read_json(response).await["form"]["status"], "rejected");

    let response = app.urlencoded(Method::PUT, &uri, "status=archived").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn enforced_transitions_answer_409() {
    let app = TestApp::with_config(|cfg| cfg.enforce_status_transitions = true).await;
    let seed = app.seed().await;
    let form = create_form(&app, create_form_body(&seed, "reimbursement", "42.50")).await;
    let uri = format!("/forms/{}/status", form["id"]);

    let response = app.urlencoded(Method::PUT, &uri, "status=completed").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.urlencoded(Method::PUT, &uri, "status=approved").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn assign_sets_reviewer() {
    let app = TestApp::new().await;
    let seed = app.seed().await;
    let form = create_form(&app, create_form_body(&seed, "liquidation", "75.25")).await;
    let uri = format!("/forms/{}/assign", form["id"]);

    let response = app
        .multipart(
            Method::PUT,
            &uri,
            MultipartBody::new().text("assigned_to_id", seed.manager.id),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Form assigned successfully");
    assert_eq!(
        body["form"]["assigned_to_id"].as_i64(),
        Some(i64::from(seed.manager.id))
    );

    let response = app
        .urlencoded(Method::PUT, &uri, "assigned_to_id=9999")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_and_dashboard_reflect_created_forms() {
    let app = TestApp::new().await;
    let seed = app.seed().await;

    let mut ids = Vec::new();
    for (form_type, status) in [
        ("reimbursement", None),
        ("cash_advance", None),
        ("reimbursement", Some("approved")),
        ("liquidation", Some("rejected")),
        ("reimbursement", None),
    ] {
        let form = create_form(&app, create_form_body(&seed, form_type, "42.50")).await;
        let id = form["id"].as_i64().unwrap();
        if let Some(status) = status {
            let response = app
                .urlencoded(
                    Method::PUT,
                    &format!("/forms/{id}/status"),
                    &format!("status={status}"),
                )
                .await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        ids.push(id);
    }

    let all = read_json(app.request(Method::GET, "/forms", None).await).await;
    assert_eq!(all["total"], 5);
    let listed: Vec<i64> = all["forms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, ids);

    let reimbursements =
        read_json(app.request(Method::GET, "/forms?form_type=reimbursement", None).await).await;
    assert_eq!(reimbursements["total"], 3);
    assert!(reimbursements["forms"]
        .as_array()
        .unwrap()
        .iter()
        .all(|f| f["form_type"] == "reimbursement"));

    let approved = read_json(
        app.request(
            Method::GET,
            &format!(
                "/forms?status=approved&submitted_by_id={}&customer_id={}",
                seed.employee.id, seed.customer.id
            ),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(approved["total"], 1);
    assert_eq!(approved["forms"][0]["id"].as_i64(), Some(ids[2]));

    let blank = read_json(
        app.request(
            Method::GET,
            "/forms?status=&form_type=&cost_center_id=&customer_id=",
            None,
        )
        .await,
    )
    .await;
    assert_eq!(blank["total"], 5);

    let response = app.request(Method::GET, "/forms?status=lost", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = read_json(response).await;
    assert_eq!(error["error"], "Bad Request");
    assert!(error["message"].as_str().unwrap().contains("lost"));

    let stats = read_json(app.request(Method::GET, "/dashboard/stats", None).await).await;
    assert_eq!(
        stats,
        json!({
            "total_forms": 5,
            "pending_forms": 3,
            "approved_forms": 1,
            "rejected_forms": 1
        })
    );
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = read_json(response).await;
    assert!(doc["paths"]["/forms/{id}/status"]["put"].is_object());
}
