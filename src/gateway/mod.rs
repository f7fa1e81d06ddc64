pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, put},
};
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

/// Build the HTTP router
///
/// All resources live under `/api/v1`; Swagger UI is served at `/docs`.
pub fn router(state: Arc<AppState>) -> Router {
    let account_routes = Router::new()
        .route(
            "/",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/{id}",
            get(handlers::get_account)
                .put(handlers::update_account)
                .delete(handlers::delete_account),
        )
        .route("/by-number/{number}", get(handlers::get_account_by_number));

    let transfer_routes = Router::new()
        .route(
            "/",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route(
            "/{id}",
            get(handlers::get_transfer).delete(handlers::delete_transfer),
        )
        .route("/{id}/cancel", put(handlers::cancel_transfer))
        .route("/history/{account_id}", get(handlers::transfer_history));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/accounts", account_routes)
        .nest("/api/v1/transfers", transfer_routes)
        .with_state(state)
        // stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state.clone());

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.with_context(|| {
        format!(
            "Failed to bind to {} (port {} may already be in use)",
            addr, port
        )
    })?;

    tracing::info!(
        ledger = state.ledger_name,
        lock = state.engine.lock_name(),
        ceiling = %state.engine.limits().ceiling,
        "Gateway listening on http://{}",
        addr
    );
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::store::MemoryLedger;
    use crate::transfer::{GlobalSettlementLock, TransferLimits};

    fn test_app() -> Router {
        let state = AppState::new(
            Arc::new(MemoryLedger::new()),
            Arc::new(GlobalSettlementLock::new()),
            TransferLimits::default(),
            None,
        );
        router(Arc::new(state))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn open_account(app: &Router, number: &str, balance: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/accounts",
            Some(json!({"name": "Test Holder", "account_number": number, "balance": balance})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["ledger"], "memory");
    }

    #[tokio::test]
    async fn test_transfer_round_trip() {
        let app = test_app();
        let a = open_account(&app, "ACC001", "1000.00").await;
        let b = open_account(&app, "ACC002", "500.00").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/transfers",
            Some(json!({"source_account_id": a, "destination_account_id": b, "amount": "300.00"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["data"]["status"], "SUCCESS");
        assert_eq!(body["data"]["amount"], "300.00");

        let (_, src) = send(&app, Method::GET, &format!("/api/v1/accounts/{a}"), None).await;
        let (_, dst) = send(&app, Method::GET, &format!("/api/v1/accounts/{b}"), None).await;
        assert_eq!(src["data"]["balance"], "700.00");
        assert_eq!(dst["data"]["balance"], "800.00");
    }

    #[tokio::test]
    async fn test_insufficient_balance_is_422_and_recorded() {
        let app = test_app();
        let a = open_account(&app, "ACC001", "100.00").await;
        let b = open_account(&app, "ACC002", "0.00").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/transfers",
            Some(json!({"source_account_id": a, "destination_account_id": b, "amount": "150.00"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], 422);
        assert_eq!(body["data"]["error"], "INSUFFICIENT_BALANCE");

        let (_, history) = send(
            &app,
            Method::GET,
            &format!("/api/v1/transfers/history/{a}"),
            None,
        )
        .await;
        let records = history["data"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["status"], "FAILURE");
    }

    #[tokio::test]
    async fn test_validation_errors_are_400() {
        let app = test_app();
        let past = (Utc::now() - Duration::days(1)).to_rfc3339();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/transfers",
            Some(json!({"amount": "10.00", "transfer_date": past})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["error"], "VALIDATION_FAILED");
        let fields: Vec<&str> = body["data"]["violations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"source_account_id"));
        assert!(fields.contains(&"destination_account_id"));
        assert!(fields.contains(&"transfer_date"));
    }

    #[tokio::test]
    async fn test_malformed_ids_are_400() {
        let app = test_app();
        let (status, _) = send(&app, Method::GET, "/api/v1/accounts/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::GET, "/api/v1/transfers/not-a-ulid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cancel_and_missing_transfer() {
        let app = test_app();
        let a = open_account(&app, "ACC001", "100.00").await;
        let b = open_account(&app, "ACC002", "0.00").await;
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/transfers",
            Some(json!({"source_account_id": a, "destination_account_id": b, "amount": "10.00"})),
        )
        .await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/transfers/{id}/cancel"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["cancelled"], true);

        let (_, body) = send(&app, Method::GET, &format!("/api/v1/transfers/{id}"), None).await;
        assert_eq!(body["data"]["status"], "CANCELLED");

        let missing = ulid::Ulid::new().to_string();
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/transfers/{missing}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_openapi_served() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "Transfer Ledger API");
    }
}
