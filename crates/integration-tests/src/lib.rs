//! End-to-end test harness for the Shodhsutra admin console.
//!
//! [`TestApp::spawn`] starts two servers on ephemeral ports:
//!
//! - a fake CMS backend ([`FakeBackend`]) that keeps its collections in
//!   memory and records every call it receives as `"METHOD /path"`
//! - the real admin router, configured to talk to the fake
//!
//! Tests drive the console with a cookie-keeping `reqwest` client, exactly as
//! a browser would, and assert on both the rendered pages and the backend
//! call log.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shodhsutra-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};
use shodhsutra_admin::config::{AdminConfig, BackendConfig};
use shodhsutra_admin::state::AppState;
use tokio::net::TcpListener;

/// Credentials the fake backend accepts.
pub const TEST_EMAIL: &str = "admin@shodhsutra.com";
pub const TEST_PASSWORD: &str = "correct-horse";

const TEST_TOKEN: &str = "test-token";

// =============================================================================
// Fake Backend
// =============================================================================

/// Everything the fake backend holds.
#[derive(Debug, Default)]
pub struct BackendData {
    /// Every call received, as `"METHOD /path"`.
    pub calls: Vec<String>,
    pub consultations: Vec<Value>,
    pub appointments: Vec<Value>,
    pub gallery: Vec<Value>,
    pub results: Vec<Value>,
    /// Bodies posted to `/blogs` and `/case-studies`, with the path.
    pub created: Vec<(String, Value)>,
    /// Bodies sent with `PUT /results/:id`.
    pub result_updates: Vec<Value>,
    /// Refuse `PUT /results/:id` with this message.
    pub reject_result_updates: Option<String>,
    /// Reply to uploads with the stored record instead of a bare message.
    pub upload_returns_record: bool,
    /// Refuse the issued token from now on.
    pub token_revoked: bool,
    uploads: usize,
}

/// In-memory stand-in for the CMS backend.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    data: Arc<Mutex<BackendData>>,
}

impl FakeBackend {
    /// A backend with 8 consultations, 3 appointments, 2 gallery images and
    /// one result.
    #[must_use]
    pub fn seeded() -> Self {
        let backend = Self::default();
        {
            let mut data = backend.data();
            data.consultations = (1..=8).map(consultation).collect();
            data.appointments = vec![
                appointment(1, "Meera Iyer", "Pune"),
                appointment(2, "Arjun Nair", "Kochi"),
                appointment(3, "Farah Khan", "Lucknow"),
            ];
            data.gallery = vec![
                json!({ "_id": "g1", "imageUrl": "/uploads/convocation.jpg" }),
                json!({ "_id": "g2", "imageUrl": "/uploads/library.jpg" }),
            ];
            data.results = vec![json!({
                "_id": "r1",
                "result": {
                    "name": "Asha Rao",
                    "rollNo": 1042,
                    "enrollmentNo": "EN-2021-77",
                    "course": "PhD Economics",
                    "status": "Pass",
                    "subjects": [
                        { "sno": 1, "name": "Research Methods", "full": 100, "pass": 40, "obtained": 71 },
                        { "sno": 2, "name": "Econometrics", "full": 100, "pass": 40, "obtained": 64 }
                    ],
                    "totalFull": 200,
                    "totalPass": 80,
                    "totalObt": 135
                }
            })];
        }
        backend
    }

    /// Lock the backend state.
    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.data().calls.clone()
    }

    /// Forget the calls received so far.
    pub fn clear_calls(&self) {
        self.data().calls.clear();
    }

    fn router(&self) -> Router {
        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/consultation", get(list_consultations))
            .route("/consultation/{id}", axum::routing::delete(delete_consultation))
            .route("/appointments/admin/all", get(list_appointments))
            .route("/gallery", get(list_gallery))
            .route("/gallery/upload", post(upload_image))
            .route("/gallery/{id}", put(replace_image).delete(delete_image))
            .route("/blogs", post(create_blog))
            .route("/case-studies", post(create_case_study))
            .route("/results", get(list_results))
            .route("/results/{id}", get(get_result).put(update_result));

        Router::new()
            .nest("/api", api)
            .layer(from_fn_with_state(self.clone(), record_and_authorize))
            .with_state(self.clone())
    }
}

fn consultation(n: u32) -> Value {
    json!({
        "_id": format!("c{n}"),
        "fullName": format!("Scholar {n}"),
        "email": format!("scholar{n}@example.com"),
        "phone": format!("98765432{n:02}"),
        "message": "Guidance on thesis structure",
        "createdAt": format!("2024-03-{n:02}T10:00:00Z"),
    })
}

fn appointment(n: u32, name: &str, location: &str) -> Value {
    json!({
        "_id": format!("a{n}"),
        "name": name,
        "phone": format!("91234567{n:02}"),
        "location": location,
        "date": format!("2024-04-{n:02}"),
    })
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

/// Log the call, then refuse it unless it carries the issued token.
async fn record_and_authorize(State(backend): State<FakeBackend>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let revoked = {
        let mut data = backend.data();
        data.calls.push(format!("{} {path}", request.method()));
        data.token_revoked
    };

    if path != "/api/auth/login" {
        let expected = format!("Bearer {TEST_TOKEN}");
        let presented = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if revoked || presented != Some(expected.as_str()) {
            return message(StatusCode::UNAUTHORIZED, "Invalid or expired token");
        }
    }
    next.run(request).await
}

async fn login(Json(body): Json<Value>) -> Response {
    let accepted = body["email"] == TEST_EMAIL && body["password"] == TEST_PASSWORD;
    if !accepted {
        return message(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let expires_at = Utc::now() + chrono::Duration::hours(1);
    Json(json!({ "token": TEST_TOKEN, "expiresAt": expires_at.to_rfc3339() })).into_response()
}

async fn list_consultations(State(backend): State<FakeBackend>) -> Json<Value> {
    Json(json!({ "data": backend.data().consultations.clone() }))
}

async fn delete_consultation(State(backend): State<FakeBackend>, Path(id): Path<String>) -> Response {
    let mut data = backend.data();
    let before = data.consultations.len();
    data.consultations.retain(|c| c["_id"] != id.as_str());
    if data.consultations.len() == before {
        return message(StatusCode::NOT_FOUND, "Consultation not found");
    }
    message(StatusCode::OK, "Consultation deleted")
}

async fn list_appointments(State(backend): State<FakeBackend>) -> Json<Value> {
    Json(json!({ "appointments": backend.data().appointments.clone() }))
}

async fn list_gallery(State(backend): State<FakeBackend>) -> Json<Value> {
    Json(Value::Array(backend.data().gallery.clone()))
}

/// File name of the `image` part, or `None` when the form has none.
async fn image_file_name(mut multipart: Multipart) -> Option<String> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            return Some(field.file_name().unwrap_or("upload").to_string());
        }
    }
    None
}

async fn upload_image(State(backend): State<FakeBackend>, multipart: Multipart) -> Response {
    let Some(file_name) = image_file_name(multipart).await else {
        return message(StatusCode::BAD_REQUEST, "No image provided");
    };

    let mut data = backend.data();
    data.uploads += 1;
    let record = json!({
        "_id": format!("up{}", data.uploads),
        "imageUrl": format!("/uploads/{file_name}"),
    });
    data.gallery.push(record.clone());

    if data.upload_returns_record {
        (StatusCode::CREATED, Json(json!({ "image": record }))).into_response()
    } else {
        message(StatusCode::CREATED, "Image uploaded")
    }
}

async fn replace_image(State(backend): State<FakeBackend>, Path(id): Path<String>, multipart: Multipart) -> Response {
    let Some(file_name) = image_file_name(multipart).await else {
        return message(StatusCode::BAD_REQUEST, "No image provided");
    };

    let mut data = backend.data();
    let Some(image) = data.gallery.iter_mut().find(|g| g["_id"] == id.as_str()) else {
        return message(StatusCode::NOT_FOUND, "Image not found");
    };
    image["imageUrl"] = json!(format!("/uploads/{file_name}"));
    let record = image.clone();

    if data.upload_returns_record {
        Json(record).into_response()
    } else {
        message(StatusCode::OK, "Image updated")
    }
}

async fn delete_image(State(backend): State<FakeBackend>, Path(id): Path<String>) -> Response {
    let mut data = backend.data();
    let before = data.gallery.len();
    data.gallery.retain(|g| g["_id"] != id.as_str());
    if data.gallery.len() == before {
        return message(StatusCode::NOT_FOUND, "Image not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_blog(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Json<Value> {
    let mut data = backend.data();
    let taken = data.created.iter().any(|(_, b)| b["slug"] == body["slug"]);
    if taken {
        return Json(json!({ "success": false, "message": "Slug already exists" }));
    }
    data.created.push(("/blogs".to_string(), body));
    Json(json!({ "success": true }))
}

async fn create_case_study(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> StatusCode {
    backend.data().created.push(("/case-studies".to_string(), body));
    StatusCode::CREATED
}

async fn list_results(State(backend): State<FakeBackend>) -> Json<Value> {
    Json(json!({ "data": backend.data().results.clone() }))
}

async fn get_result(State(backend): State<FakeBackend>, Path(id): Path<String>) -> Response {
    let data = backend.data();
    match data.results.iter().find(|r| r["_id"] == id.as_str()) {
        Some(record) => Json(json!({ "data": record })).into_response(),
        None => message(StatusCode::NOT_FOUND, "Result not found"),
    }
}

async fn update_result(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = backend.data();
    if let Some(reason) = data.reject_result_updates.clone() {
        return message(StatusCode::UNPROCESSABLE_ENTITY, &reason);
    }
    let Some(record) = data.results.iter_mut().find(|r| r["_id"] == id.as_str()) else {
        return message(StatusCode::NOT_FOUND, "Result not found");
    };
    record["result"] = body["result"].clone();
    data.result_updates.push(body);
    message(StatusCode::OK, "Result updated")
}

// =============================================================================
// Test App
// =============================================================================

/// The admin console wired to a fake backend.
pub struct TestApp {
    /// Cookie-keeping client that follows redirects.
    pub client: reqwest::Client,
    /// Root of the admin console, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    pub backend: FakeBackend,
}

impl TestApp {
    /// Start a console against a freshly seeded backend.
    pub async fn spawn() -> Self {
        Self::spawn_with(FakeBackend::seeded()).await
    }

    /// Start a console against `backend`.
    pub async fn spawn_with(backend: FakeBackend) -> Self {
        let backend_addr = serve(backend.router()).await;

        let config = AdminConfig {
            host: "127.0.0.1".parse().expect("valid address"),
            port: 0,
            base_url: "http://localhost:3001".to_string(),
            backend: BackendConfig {
                api_url: format!("http://{backend_addr}/api"),
                asset_url: format!("http://{backend_addr}"),
                timeout: Duration::from_secs(5),
            },
            collection_max_age: Duration::from_secs(300),
            upload_limit_bytes: 10 * 1024 * 1024,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config).expect("Failed to create application state");
        let admin_addr = serve(shodhsutra_admin::app(state)).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{admin_addr}"),
            backend,
        }
    }

    /// Absolute URL of a console path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a console page, following redirects.
    pub async fn get(&self, path: &str) -> Page {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        Page::read(response).await
    }

    /// POST a url-encoded form, following the redirect back to a page.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Page {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed");
        Page::read(response).await
    }

    /// POST a multipart form, following the redirect back to a page.
    pub async fn post_multipart(&self, path: &str, form: reqwest::multipart::Form) -> Page {
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("POST failed");
        Page::read(response).await
    }

    /// Sign in with the accepted credentials and forget the login call.
    pub async fn login(&self) -> Page {
        let page = self
            .post_form("/auth/login", &[("email", TEST_EMAIL), ("password", TEST_PASSWORD)])
            .await;
        assert_eq!(page.path, "/", "login should land on the dashboard");
        self.backend.clear_calls();
        page
    }
}

/// A rendered page after redirects.
#[derive(Debug)]
pub struct Page {
    pub status: StatusCode,
    /// Path (and query) the client ended up on.
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl Page {
    async fn read(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url();
        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        let body = response.text().await.expect("Failed to read body");
        Self {
            status,
            path,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.body.contains(text)
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server failed");
    });
    addr
}
