//! Integration tests for the SalesPulse HTTP API
//!
//! Each test builds the router over a private in-memory database and drives
//! it with `oneshot`; tokens are issued directly unless the login flow itself
//! is under test.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot`

use salespulse_common::analysis::lead::LeadClassifier;
use salespulse_common::analysis::sentiment::{analyzer_for, SentimentMode};
use salespulse_common::auth::{hash_password, TokenSigner};
use salespulse_common::chat::ChatModel;
use salespulse_common::db::{activity, feedback, init_memory_database, users, Role, User};
use salespulse_common::report::UTF8_BOM;
use salespulse_server::{build_router, AppState};

const SECRET: &str = "test-secret";

struct FixedModel(f64);

impl LeadClassifier for FixedModel {
    fn predict_probability(&self, _text: &str) -> salespulse_common::Result<f64> {
        Ok(self.0)
    }
}

struct BrokenModel;

impl LeadClassifier for BrokenModel {
    fn predict_probability(&self, _text: &str) -> salespulse_common::Result<f64> {
        Err(salespulse_common::Error::Model("vectorizer mismatch".into()))
    }
}

/// Records prompts and answers with a canned reply
#[derive(Default)]
struct RecordingChat {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatModel for RecordingChat {
    async fn generate(&self, prompt: &str) -> salespulse_common::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("Send the proposal today.".to_string())
    }
}

struct TestApp {
    db: SqlitePool,
    signer: TokenSigner,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        Self::with(|state| state).await
    }

    async fn with(customize: impl FnOnce(AppState) -> AppState) -> Self {
        let db = init_memory_database().await.unwrap();
        let signer = TokenSigner::new(SECRET, 24);
        let state = AppState::new(
            db.clone(),
            signer.clone(),
            analyzer_for(SentimentMode::Polarity),
        );
        let router = build_router(customize(state));
        Self { db, signer, router }
    }

    /// Account with an unusable hash; authenticate via [`TestApp::token`]
    async fn user(&self, username: &str, role: Role) -> User {
        users::create_user(&self.db, username, "not-a-hash", role)
            .await
            .unwrap()
    }

    fn token(&self, user: &User) -> String {
        self.signer.issue(user.id, user.role).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec(), headers)
    }

    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, bytes, _) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

// =============================================================================
// Health and authentication
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "salespulse-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_reports_loaded_services() {
    let app = TestApp::new().await;
    let (_, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(body["lead_model"], false);
    assert_eq!(body["chat"], false);

    let app = TestApp::with(|state| state.with_lead_model(Arc::new(FixedModel(0.5)))).await;
    let (_, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(body["lead_model"], true);
    assert_eq!(body["chat"], false);
}

#[tokio::test]
async fn test_missing_and_invalid_tokens_are_401() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token is missing");

    let (status, body) = app.call("GET", "/api/products", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    let forged = TokenSigner::new("other-secret", 24).issue(1, Role::Dev).unwrap();
    let (status, _) = app.call("GET", "/api/products", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new().await;
    let dev = app.user("dev", Role::Dev).await;
    let stale = app
        .signer
        .issue_at(dev.id, dev.role, chrono::Utc::now() - chrono::Duration::hours(48))
        .unwrap();

    let (status, body) = app.call("GET", "/api/logs", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_login_flow() {
    let app = TestApp::new().await;
    let hash = hash_password("sales123").unwrap();
    users::create_user(&app.db, "sales", &hash, Role::Salesperson)
        .await
        .unwrap();

    let (status, body) = app
        .call(
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "sales", "password": "sales123", "role": "salesperson"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "sales");
    assert_eq!(body["user"]["role"], "salesperson");
    assert!(body["user"]["last_login"].is_string());
    assert!(body["user"].get("password_hash").is_none());

    let claims = app.signer.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.role, Role::Salesperson);

    let logs = activity::recent_logs(&app.db, 10).await.unwrap();
    assert_eq!(logs[0].action, "login");
    assert_eq!(logs[0].details.as_deref(), Some("User logged in as salesperson"));
}

#[tokio::test]
async fn test_login_rejections() {
    let app = TestApp::new().await;
    let hash = hash_password("manager123").unwrap();
    users::create_user(&app.db, "manager", &hash, Role::Manager)
        .await
        .unwrap();

    let (status, body) = app
        .call("POST", "/api/login", None, Some(json!({"username": "manager", "password": "manager123"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing credentials");

    let (status, body) = app
        .call(
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "manager", "password": "wrong", "role": "manager"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    // right password, wrong role
    let (status, _) = app
        .call(
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "manager", "password": "manager123", "role": "dev"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_restricts_roles() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            "POST",
            "/api/register",
            None,
            Some(json!({"username": "newbie", "password": "pw", "role": "salesperson"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful! Please login.");

    let (status, body) = app
        .call(
            "POST",
            "/api/register",
            None,
            Some(json!({"username": "root", "password": "pw", "role": "dev"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid role selected for public registration");
    assert!(users::find_by_username(&app.db, "root").await.unwrap().is_none());

    let (status, body) = app
        .call(
            "POST",
            "/api/register",
            None,
            Some(json!({"username": "newbie", "password": "pw2", "role": "manager"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, bytes, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_role_mismatch_is_403() {
    let app = TestApp::new().await;
    let sales = app.user("sales", Role::Salesperson).await;
    let token = app.token(&sales);

    for (method, uri) in [("GET", "/api/dashboard"), ("GET", "/api/users"), ("GET", "/api/logs")] {
        let (status, body) = app.call(method, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(body["error"], "Unauthorized access");
    }
}

#[tokio::test]
async fn test_role_checked_before_body() {
    let app = TestApp::new().await;
    let sales = app.user("sales", Role::Salesperson).await;
    let manager = app.user("manager", Role::Manager).await;
    let sales_token = app.token(&sales);

    let (status, body) = app
        .call("POST", "/api/products", Some(&sales_token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized access");

    let (status, _) = app
        .call("POST", "/api/users", Some(&sales_token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call("DELETE", "/api/products/abc", Some(&sales_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method("POST")
        .uri("/api/check-grammar")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(&manager)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert!(activity::recent_logs(&app.db, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unparsable_id_is_json_400() {
    let app = TestApp::new().await;
    let dev = app.user("dev", Role::Dev).await;
    let token = app.token(&dev);

    for uri in ["/api/products/abc", "/api/users/abc"] {
        let (status, body) = app.call("DELETE", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

// =============================================================================
// Leads and feedback
// =============================================================================

#[tokio::test]
async fn test_submit_lead_without_model_stores_unscored() {
    let app = TestApp::new().await;
    let sales = app.user("sales", Role::Salesperson).await;

    let (status, body) = app
        .call("POST", "/api/submit-lead", Some(&app.token(&sales)), Some(json!({"text": "Wants a demo"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Lead submitted");
    assert!(body["ml_result"]["score"].is_null());
    assert!(body["ml_result"]["label"].is_null());

    let rows = feedback::all_feedback(&app.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "lead");
    assert_eq!(activity::recent_logs(&app.db, 10).await.unwrap()[0].action, "lead_submit");
}

#[tokio::test]
async fn test_submit_lead_with_model_labels_score() {
    let app = TestApp::with(|state| state.with_lead_model(Arc::new(FixedModel(0.82)))).await;
    let sales = app.user("sales", Role::Salesperson).await;

    let (status, body) = app
        .call("POST", "/api/submit-lead", Some(&app.token(&sales)), Some(json!({"text": "Budget approved"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ml_result"]["score"], 0.82);
    assert_eq!(body["ml_result"]["label"], "High");
}

#[tokio::test]
async fn test_model_failure_yields_error_label() {
    let app = TestApp::with(|state| state.with_lead_model(Arc::new(BrokenModel))).await;
    let sales = app.user("sales", Role::Salesperson).await;
    let token = app.token(&sales);

    let (status, body) = app
        .call("POST", "/api/submit-lead", Some(&token), Some(json!({"text": "anything"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["ml_result"]["score"].is_null());
    assert_eq!(body["ml_result"]["label"], "Error");

    let (status, body) = app
        .call("POST", "/api/predict-lead", Some(&token), Some(json!({"text": "anything"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "Error");
}

#[tokio::test]
async fn test_submit_lead_validation_and_role() {
    let app = TestApp::new().await;
    let sales = app.user("sales", Role::Salesperson).await;
    let manager = app.user("boss", Role::Manager).await;

    let (status, body) = app
        .call("POST", "/api/submit-lead", Some(&app.token(&sales)), Some(json!({"text": ""})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Lead text is required");

    let (status, _) = app
        .call("POST", "/api/submit-lead", Some(&app.token(&manager)), Some(json!({"text": "x"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_analyze_feedback_and_alias() {
    let app = TestApp::new().await;
    let sales = app.user("sales", Role::Salesperson).await;
    let token = app.token(&sales);

    let (status, body) = app
        .call(
            "POST",
            "/api/analyze-feedback",
            Some(&token),
            Some(json!({"text": "The new update is fantastic, support was excellent"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Feedback submitted");
    assert_eq!(body["sentiment_result"]["label"], "Positive");

    let (status, body) = app
        .call(
            "POST",
            "/api/feedback",
            Some(&token),
            Some(json!({"text": "The app crashed and the docs are terrible"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sentiment_result"]["label"], "Negative");

    let (status, body) = app
        .call("POST", "/api/feedback", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Feedback text is required");

    let rows = feedback::all_feedback(&app.db).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.status == "feedback" && r.lead_score.is_none()));
}

#[tokio::test]
async fn test_predict_lead() {
    let app = TestApp::new().await;
    let manager = app.user("boss", Role::Manager).await;
    let token = app.token(&manager);

    let (status, body) = app
        .call("POST", "/api/predict-lead", Some(&token), Some(json!({"text": "hello"})))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "ML model not loaded");

    let app = TestApp::with(|state| state.with_lead_model(Arc::new(FixedModel(0.5)))).await;
    let manager = app.user("boss", Role::Manager).await;
    let token = app.token(&manager);

    let (status, body) = app
        .call("POST", "/api/predict-lead", Some(&token), Some(json!({"text": ""})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text provided");

    let (status, body) = app
        .call("POST", "/api/predict-lead", Some(&token), Some(json!({"text": "maybe"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "Medium");
    assert!(feedback::all_feedback(&app.db).await.unwrap().is_empty());
}

// =============================================================================
// Grammar and chat
// =============================================================================

#[tokio::test]
async fn test_check_grammar() {
    let app = TestApp::new().await;
    let sales = app.user("sales", Role::Salesperson).await;

    let (status, body) = app
        .call(
            "POST",
            "/api/check-grammar",
            Some(&app.token(&sales)),
            Some(json!({"text": "  i   dont think   thats right "})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["corrected_text"], "I don't think that's right");
}

#[tokio::test]
async fn test_chat_not_configured() {
    let app = TestApp::new().await;
    let sales = app.user("sales", Role::Salesperson).await;

    let (status, body) = app
        .call("POST", "/api/chat", Some(&app.token(&sales)), Some(json!({"message": "hi"})))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Chatbot not configured");
}

#[tokio::test]
async fn test_chat_builds_prompt_from_role_and_context() {
    let chat = Arc::new(RecordingChat::default());
    let handle = chat.clone();
    let app = TestApp::with(move |state| state.with_chat(handle)).await;
    let manager = app.user("boss", Role::Manager).await;
    let token = app.token(&manager);

    let (status, body) = app
        .call(
            "POST",
            "/api/chat",
            Some(&token),
            Some(json!({"message": "Next step?", "context": "ACME renewal"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Send the proposal today.");

    let prompts = chat.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("sales assistant for a manager"));
    assert!(prompts[0].contains("\"ACME renewal\""));
    assert!(prompts[0].contains("USER QUESTION: Next step?"));
    drop(prompts);

    let (status, body) = app
        .call("POST", "/api/chat", Some(&token), Some(json!({"message": ""})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No message");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_crud_and_roles() {
    let app = TestApp::new().await;
    let dev = app.user("dev", Role::Dev).await;
    let sales = app.user("sales", Role::Salesperson).await;
    let dev_token = app.token(&dev);
    let sales_token = app.token(&sales);

    let product = json!({"name": "Widget Pro", "description": "Premium widget", "details": "24/7 support"});

    let (status, _) = app
        .call("POST", "/api/products", Some(&sales_token), Some(product.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call("POST", "/api/products", Some(&dev_token), Some(product))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product added");
    assert_eq!(body["product"]["catalogue_info"], "");
    let id = body["product"]["id"].as_i64().unwrap();

    let (status, body) = app.call("GET", "/api/products", Some(&sales_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    let uri = format!("/api/products/{}", id);
    let (status, _) = app.call("DELETE", &uri, Some(&dev_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call("DELETE", &uri, Some(&dev_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let actions: Vec<String> = activity::recent_logs(&app.db, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.action)
        .collect();
    assert_eq!(actions, vec!["product_delete", "product_add"]);
}

// =============================================================================
// Dashboard and report
// =============================================================================

#[tokio::test]
async fn test_dashboard_aggregates_submissions() {
    let app = TestApp::with(|state| state.with_lead_model(Arc::new(FixedModel(0.9)))).await;
    let sales = app.user("sales", Role::Salesperson).await;
    let manager = app.user("boss", Role::Manager).await;
    let sales_token = app.token(&sales);

    for text in ["Enterprise budget approved", "Enterprise pilot agreed"] {
        app.call("POST", "/api/submit-lead", Some(&sales_token), Some(json!({"text": text})))
            .await;
    }
    app.call(
        "POST",
        "/api/analyze-feedback",
        Some(&sales_token),
        Some(json!({"text": "Great and helpful team"})),
    )
    .await;

    let (status, body) = app
        .call("GET", "/api/dashboard", Some(&app.token(&manager)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["stats"]["week"], 3);
    assert_eq!(body["stats"]["active_sales"], 1);
    assert_eq!(body["stats"]["leads"]["high"], 2);
    assert_eq!(body["sentiment"]["positive"], 1);
    assert_eq!(body["trends"]["labels"].as_array().unwrap().len(), 7);
    assert_eq!(body["trends"]["data"][6], 3);
    assert_eq!(body["wordcloud_data"][0], json!(["enterprise", 2]));
    assert_eq!(body["recent"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_download_report_csv() {
    let app = TestApp::new().await;
    let sales = app.user("sales", Role::Salesperson).await;
    let manager = app.user("boss", Role::Manager).await;
    let sales_token = app.token(&sales);

    for text in ["first lead", "second, with comma"] {
        app.call("POST", "/api/submit-lead", Some(&sales_token), Some(json!({"text": text})))
            .await;
    }

    let request = Request::builder()
        .uri("/api/download-report")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(&manager)))
        .body(Body::empty())
        .unwrap();
    let (status, bytes, headers) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"sales_report_"));
    assert!(disposition.ends_with(".csv\""));

    assert!(bytes.starts_with(UTF8_BOM));
    let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
    let header_row: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        header_row,
        vec!["ID", "Salesperson", "Feedback", "Time", "Status", "Lead Score", "Lead Label"]
    );
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| &r[2] == "second, with comma"));
    assert!(records.iter().all(|r| &r[5] == "N/A" && &r[6] == "N/A"));
}

// =============================================================================
// Users and logs
// =============================================================================

#[tokio::test]
async fn test_dev_can_create_any_role() {
    let app = TestApp::new().await;
    let dev = app.user("dev", Role::Dev).await;

    let (status, body) = app
        .call(
            "POST",
            "/api/users",
            Some(&app.token(&dev)),
            Some(json!({"username": "ops", "password": "pw", "role": "dev"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "dev");

    let (status, body) = app.call("GET", "/api/users", Some(&app.token(&dev)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let (status, body) = app.call("GET", "/api/logs", Some(&app.token(&dev)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"][0]["details"], "Added user: ops (dev)");
}

#[tokio::test]
async fn test_delete_user_rules_and_cascade() {
    let app = TestApp::new().await;
    let dev = app.user("dev", Role::Dev).await;
    let sales = app.user("sales", Role::Salesperson).await;
    let dev_token = app.token(&dev);
    let sales_token = app.token(&sales);

    app.call("POST", "/api/submit-lead", Some(&sales_token), Some(json!({"text": "lead"})))
        .await;
    assert_eq!(feedback::count_for_user(&app.db, sales.id).await.unwrap(), 1);

    let (status, body) = app
        .call("DELETE", &format!("/api/users/{}", dev.id), Some(&dev_token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot delete yourself");

    let (status, _) = app
        .call("DELETE", &format!("/api/users/{}", sales.id), Some(&dev_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback::count_for_user(&app.db, sales.id).await.unwrap(), 0);
    assert_eq!(activity::count_for_user(&app.db, sales.id).await.unwrap(), 0);

    let (status, _) = app
        .call("DELETE", &format!("/api/users/{}", sales.id), Some(&dev_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the deleted user's token no longer authenticates
    let (status, body) = app.call("GET", "/api/products", Some(&sales_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}
