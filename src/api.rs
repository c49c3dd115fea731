//! HTTP routes and error mapping.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::service::{NodeDetail, NodeDetailError, NodeDetailService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NodeDetailService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/custom_endpoint/node/:node", get(get_node_detail))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for NodeDetailError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            NodeDetailError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            NodeDetailError::Store(e) => {
                error!("Node detail lookup failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Get a published node with its card paragraphs.
async fn get_node_detail(
    State(state): State<AppState>,
    Path(node): Path<String>,
) -> Result<Json<NodeDetail>, NodeDetailError> {
    state.service.get_node_detail(&node).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;
    use crate::service::tests::{failing_service, file, node, paragraph, service};
    use crate::store::memory::InMemoryRepository;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn app(repo: &InMemoryRepository) -> Router {
        router(AppState {
            service: Arc::new(service(repo)),
        })
    }

    #[tokio::test]
    async fn test_get_node_detail_ok() {
        let repo = InMemoryRepository::new();
        repo.insert_node(node(42, true, Some(vec![EntityRef::paragraph(7)])));
        repo.insert_paragraph(paragraph(7, Some(vec![EntityRef::file(1)])));
        repo.insert_file(file(1, "public://a.jpg"));

        let (status, json) = get(app(&repo), "/custom_endpoint/node/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["node"]["id"][0]["value"], 42);
        assert_eq!(json["paragraphs"][0]["id"][0]["value"], 7);
        assert_eq!(json["paragraphs"][0]["image_url"], "https://site/files/a.jpg");
    }

    #[tokio::test]
    async fn test_missing_node_is_404_with_message() {
        let repo = InMemoryRepository::new();
        let (status, json) = get(app(&repo), "/custom_endpoint/node/17").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Node with ID 17 was not found.");
    }

    #[tokio::test]
    async fn test_unpublished_node_is_404() {
        let repo = InMemoryRepository::new();
        repo.insert_node(node(3, false, None));
        let (status, _) = get(app(&repo), "/custom_endpoint/node/3").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let app = router(AppState {
            service: Arc::new(failing_service()),
        });
        let (status, json) = get(app, "/custom_endpoint/node/42").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_health() {
        let repo = InMemoryRepository::new();
        let response = app(&repo)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
