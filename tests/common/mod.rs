#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::{TimeZone, Utc};
use reimbursement_api::{
    build_router,
    clock::FixedClock,
    config::AppConfig,
    db::{self, DbConfig, DbPool},
    entities::{customer, user::{self, UserRole}},
    services::{
        attachments::AttachmentStore,
        cost_centers::{CostCenterDetails, CostCenterService, CreateCostCenterInput},
        customers::{CreateCustomerInput, CustomerService},
        forms::FormService,
        users::{CreateUserInput, UserService},
    },
    AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Year every service-level test pins its clock to.
pub const TEST_YEAR: i32 = 2025;

/// Fresh in-memory database with the schema applied.
pub async fn test_db() -> Arc<DbPool> {
    let pool = db::establish_connection_with_config(&DbConfig::in_memory())
        .await
        .expect("failed to create test database");
    db::run_migrations(&pool)
        .await
        .expect("failed to run migrations in tests");
    Arc::new(pool)
}

/// File-backed SQLite database with a real multi-connection pool, for tests
/// where transactions must actually contend.
pub async fn file_db(dir: &TempDir, max_connections: u32) -> Arc<DbPool> {
    let config = DbConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("forms.db").display()),
        max_connections,
        min_connections: 1,
        ..Default::default()
    };
    let pool = db::establish_connection_with_config(&config)
        .await
        .expect("failed to open file database");
    db::run_migrations(&pool)
        .await
        .expect("failed to run migrations in tests");
    Arc::new(pool)
}

/// A form service over `db` writing attachments into `uploads`, with the clock
/// pinned to [`TEST_YEAR`].
pub fn form_service(db: Arc<DbPool>, uploads: &TempDir) -> FormService {
    let clock = FixedClock(Utc.with_ymd_and_hms(TEST_YEAR, 6, 15, 9, 30, 0).unwrap());
    FormService::new(
        db,
        Arc::new(AttachmentStore::new(uploads.path(), "/uploads")),
    )
    .with_clock(Arc::new(clock))
}

/// Directory rows most tests need.
pub struct Seed {
    pub customer: customer::Model,
    pub cost_center: CostCenterDetails,
    pub employee: user::Model,
    pub manager: user::Model,
}

pub async fn seed_directory(db: Arc<DbPool>) -> Seed {
    let customer = CustomerService::new(db.clone())
        .create(CreateCustomerInput {
            name: "Acme Corporation".into(),
            code: "ACME".into(),
            description: Some("Primary client".into()),
        })
        .await
        .expect("seed customer");

    let cost_center = CostCenterService::new(db.clone())
        .create(CreateCostCenterInput {
            name: "Field Operations".into(),
            code: "ACME-OPS".into(),
            description: None,
            customer_id: customer.id,
        })
        .await
        .expect("seed cost center");

    let users = UserService::new(db);
    let employee = users
        .create(CreateUserInput {
            username: "jdoe".into(),
            email: "jdoe@example.com".into(),
            full_name: "Jamie Doe".into(),
            role: None,
        })
        .await
        .expect("seed employee");
    let manager = users
        .create(CreateUserInput {
            username: "pmlead".into(),
            email: "pmlead@example.com".into(),
            full_name: "Pat Lead".into(),
            role: Some(UserRole::ProjectManager),
        })
        .await
        .expect("seed manager");

    Seed {
        customer,
        cost_center,
        employee,
        manager,
    }
}

/// Helper harness running the full router against an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app after letting the caller adjust the test configuration.
    pub async fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let uploads = tempfile::tempdir().expect("temp upload dir");

        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.cors_allow_any_origin = true;
        cfg.upload_dir = uploads.path().to_path_buf();
        customize(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg, None);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            uploads,
        }
    }

    pub async fn seed(&self) -> Seed {
        seed_directory(self.state.db.clone()).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };
        self.send(builder.body(body).expect("failed to build request"))
            .await
    }

    pub async fn multipart(&self, method: Method, uri: &str, body: MultipartBody) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", body.content_type())
            .body(Body::from(body.finish()))
            .expect("failed to build multipart request");
        self.send(request).await
    }

    pub async fn urlencoded(&self, method: Method, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("failed to build form request");
        self.send(request).await
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is json")
}

pub async fn read_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body")
        .to_vec()
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartBody {
    boundary: String,
    buffer: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("----test-boundary-{}", uuid::Uuid::new_v4().simple()),
            buffer: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: impl ToString) -> Self {
        self.buffer.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary,
                name,
                value.to_string()
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.buffer.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.buffer.extend_from_slice(bytes);
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buffer
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.buffer
    }
}
