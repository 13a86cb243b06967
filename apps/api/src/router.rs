use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use professional_cell::router::professional_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic admin API is running!" }))
        .nest("/professionals", professional_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use shared_config::{DEFAULT_MAX_DUPLICATE_CANDIDATES, DEFAULT_PORT, DEFAULT_SUPABASE_PAGE_SIZE};
    use tower::ServiceExt;

    fn test_state() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "anon".to_string(),
            supabase_service_role_key: String::new(),
            supabase_jwt_secret: "secret".to_string(),
            max_duplicate_candidates: DEFAULT_MAX_DUPLICATE_CANDIDATES,
            supabase_page_size: DEFAULT_SUPABASE_PAGE_SIZE,
            port: DEFAULT_PORT,
        })
    }

    #[tokio::test]
    async fn liveness_route_responds() {
        let response = create_router(test_state())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn detection_is_mounted_under_professionals() {
        let response = create_router(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/professionals/duplicates/detect")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
