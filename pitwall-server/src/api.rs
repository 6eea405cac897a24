// Copyright 2025 Pitwall Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! JSON HTTP surface
//!
//! - `GET /health`
//! - `GET /api/ask?question=...&use_llm=bool`
//! - `POST /api/ask` with `{"question": "...", "use_llm": bool}`

use crate::config::HttpServerConfig;
use axum::{
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pitwall_core::{Answer, Approach};
use pitwall_query::QueryEngine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

/// Deadline for the connectivity probe behind `/health`
const HEALTH_PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(engine: Arc<QueryEngine>, request_timeout: Duration) -> Self {
        Self {
            engine,
            request_timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskParams {
    #[serde(default)]
    pub question: String,

    /// Overrides the engine's fallback setting for this request
    pub use_llm: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub request_id: Uuid,

    #[serde(flatten)]
    pub answer: Answer,

    pub query_time_ms: u64,
    pub success: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = state.engine.executor().store().clone();
    let graph_reachable = matches!(
        tokio::time::timeout(HEALTH_PING_TIMEOUT, store.ping()).await,
        Ok(Ok(()))
    );

    Json(json!({
        "status": "healthy",
        "service": "pitwall-server",
        "version": env!("CARGO_PKG_VERSION"),
        "graph_reachable": graph_reachable,
        "fallback_enabled": state.engine.has_fallback() && state.engine.config().use_fallback,
    }))
}

/// GET /api/ask
pub async fn ask_get(
    State(state): State<AppState>,
    Query(params): Query<AskParams>,
) -> Result<Json<AskResponse>, ApiError> {
    ask(&state, params).await.map(Json)
}

/// POST /api/ask
pub async fn ask_post(
    State(state): State<AppState>,
    Json(params): Json<AskParams>,
) -> Result<Json<AskResponse>, ApiError> {
    ask(&state, params).await.map(Json)
}

async fn ask(state: &AppState, params: AskParams) -> Result<AskResponse, ApiError> {
    let question = params.question.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    let use_llm = params
        .use_llm
        .unwrap_or(state.engine.config().use_fallback);
    let started = Instant::now();

    let answer = match tokio::time::timeout(
        state.request_timeout,
        state.engine.answer_with(&question, use_llm),
    )
    .await
    {
        Ok(answer) => answer,
        Err(_) => {
            tracing::warn!(%request_id, "Question timed out after {:?}", state.request_timeout);
            Answer::failed(
                &question,
                None,
                format!("request timed out after {}s", state.request_timeout.as_secs()),
            )
        }
    };

    let query_time_ms = started.elapsed().as_millis() as u64;
    tracing::info!(
        %request_id,
        approach = %answer.approach,
        query_time_ms,
        "Answered /api/ask"
    );

    Ok(AskResponse {
        request_id,
        success: answer.approach != Approach::Error,
        answer,
        query_time_ms,
    })
}

/// Build the router with CORS and request tracing applied.
pub fn router(state: AppState, config: &HttpServerConfig) -> Router {
    let cors = if config.enable_cors {
        let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if config.cors_origins.is_empty() {
            tracing::warn!("CORS: Allowing all origins. Set cors_origins to restrict them");
            cors.allow_origin(Any)
        } else {
            let origins: Vec<HeaderValue> = config
                .cors_origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("CORS: Ignoring invalid origin {:?}", origin);
                        None
                    }
                })
                .collect();
            tracing::info!("CORS: Allowing origins: {:?}", config.cors_origins);
            cors.allow_origin(AllowOrigin::list(origins))
        }
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/ask", get(ask_get).post(ask_post))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use pitwall_core::{Row, NO_QUERY_ANSWER};
    use pitwall_graph::{Executor, ScriptedStore};
    use tower::ServiceExt;

    fn app_with(store: ScriptedStore, timeout: Duration) -> Router {
        let store = store.respond(
            "CONTAINS 'champion'",
            vec![Row::new()
                .with("answer", json!("Lewis Hamilton"))
                .with("year", json!(2017))],
        );
        let engine = QueryEngine::new(Executor::new(Arc::new(store)));
        router(
            AppState::new(Arc::new(engine), timeout),
            &HttpServerConfig::default(),
        )
    }

    fn app() -> Router {
        app_with(ScriptedStore::new(), Duration::from_secs(5))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["graph_reachable"], true);
        assert_eq!(body["fallback_enabled"], false);
    }

    #[tokio::test]
    async fn test_health_graph_unreachable() {
        let app = app_with(
            ScriptedStore::new().failing("connection refused"),
            Duration::from_secs(5),
        );
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["graph_reachable"], false);
    }

    #[tokio::test]
    async fn test_ask_get() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/ask?question=Who%20won%20the%20championship%20in%202017%3F")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["question"], "Who won the championship in 2017?");
        assert_eq!(body["answer"], "Lewis Hamilton (in 2017)");
        assert_eq!(body["approach"], "rule-based");
        assert_eq!(body["success"], true);
        assert!(body["query"].as_str().unwrap().contains("r.year = 2017"));
        assert!(body["request_id"].is_string());
        assert!(body["query_time_ms"].is_u64());
    }

    #[tokio::test]
    async fn test_ask_post_unrecognized() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/ask")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"question": "What is DRS?", "use_llm": true}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["approach"], "none");
        assert_eq!(body["answer"], NO_QUERY_ANSWER);
        assert!(body["query"].is_null());
        assert_eq!(body["parameters"], json!({}));
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_ask_empty_question() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/ask?question=%20%20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_ask_timeout() {
        let app = app_with(
            ScriptedStore::new().with_delay(Duration::from_secs(5)),
            Duration::from_millis(50),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/ask?question=Who%20won%20the%20championship%20in%202017%3F")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["approach"], "error");
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("timed out"));
    }
}
