//! Sign-in, sign-out and token expiry.

use reqwest::StatusCode;
use shodhsutra_integration_tests::{TEST_EMAIL, TestApp};

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let app = TestApp::spawn().await;

    for path in ["/", "/consultations", "/gallery", "/blogs/new", "/results"] {
        let page = app.get(path).await;
        assert_eq!(page.path, "/auth/login", "{path} should require login");
    }
    assert!(app.backend.calls().is_empty());
}

#[tokio::test]
async fn test_health_needs_no_login() {
    let app = TestApp::spawn().await;
    let page = app.get("/health").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = TestApp::spawn().await;

    let page = app
        .post_form("/auth/login", &[("email", TEST_EMAIL), ("password", "wrong")])
        .await;
    assert_eq!(page.path, "/auth/login");
    assert!(page.contains("Invalid email or password"));
    assert_eq!(app.backend.calls(), vec!["POST /api/auth/login"]);

    // No session was created
    assert_eq!(app.get("/").await.path, "/auth/login");
}

#[tokio::test]
async fn test_malformed_email_never_reaches_backend() {
    let app = TestApp::spawn().await;

    let page = app
        .post_form("/auth/login", &[("email", "not-an-email"), ("password", "x")])
        .await;
    assert!(page.contains("Invalid email or password"));
    assert!(app.backend.calls().is_empty());
}

#[tokio::test]
async fn test_login_shows_dashboard_and_logout_ends_session() {
    let app = TestApp::spawn().await;

    let page = app.login().await;
    assert!(page.contains("Dashboard"));
    assert!(page.contains(TEST_EMAIL));

    let dashboard = app.get("/").await;
    assert!(dashboard.contains("Consultations"));
    assert!(dashboard.contains("Gallery Images"));

    let page = app.post_form("/auth/logout", &[]).await;
    assert_eq!(page.path, "/auth/login");
    assert_eq!(app.get("/consultations").await.path, "/auth/login");
}

#[tokio::test]
async fn test_revoked_token_sends_admin_back_to_login() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.backend.data().token_revoked = true;

    let page = app.get("/consultations?refresh=1").await;
    assert_eq!(page.path, "/auth/login");

    // The session is gone, so nothing further is sent with the old token
    app.backend.clear_calls();
    assert_eq!(app.get("/consultations").await.path, "/auth/login");
    assert!(app.backend.calls().is_empty());
}

#[tokio::test]
async fn test_pages_carry_security_headers() {
    let app = TestApp::spawn().await;
    let page = app.get("/auth/login").await;

    assert_eq!(page.headers["x-frame-options"], "DENY");
    assert_eq!(page.headers["x-content-type-options"], "nosniff");
    assert!(page.headers.contains_key("content-security-policy"));
    assert!(page.headers.contains_key("x-request-id"));
}
