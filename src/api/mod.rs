//! HTTP API over the stock ledger.
//!
//! Routes:
//! - `GET /stock-movements?itemId=&movementTypeId=&limit=`
//! - `POST /stock-movements` (actor from the `x-user-id` header)
//! - `DELETE /stock-movements?movementId=`
//! - `GET /movement-types`

pub mod actor;
pub mod error;
pub mod handlers;

use crate::core::ledger::LedgerService;
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// State shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The ledger every handler forwards to
    pub ledger: Arc<LedgerService>,
}

/// Builds the application router with tracing and CORS layers.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/stock-movements",
            get(handlers::list_movements)
                .post(handlers::record_movement)
                .delete(handlers::delete_movement),
        )
        .route("/movement-types", get(handlers::list_movement_types))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::ledger::LedgerSettings, entities::ItemModel, errors::Result, test_utils::*};
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn setup_app() -> Result<(Router, ItemModel, i64)> {
        let (db, item, user) = setup_with_item(10).await?;
        let state = AppState {
            ledger: Arc::new(LedgerService::new(db, LedgerSettings::default())),
        };
        Ok((router(state), item, user.id))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_movement(user_id: Option<i64>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/stock-movements")
            .header("content-type", "application/json");
        if let Some(user_id) = user_id {
            builder = builder.header("x-user-id", user_id.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_movement_lifecycle() -> Result<()> {
        let (app, item, user) = setup_app().await?;

        let (status, body) = send(&app, get("/movement-types")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let types = body["data"].as_array().unwrap();
        let inbound = types.iter().find(|t| t["typeCode"] == "IN").unwrap();

        let (status, body) = send(
            &app,
            post_movement(
                Some(user),
                &json!({
                    "itemId": item.id,
                    "movementTypeId": inbound["id"],
                    "quantity": 20,
                    "referenceNo": "PO-7",
                    "userId": 999
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["item"]["quantity"], 30);
        let movement_id = body["data"]["movementId"].as_i64().unwrap();

        let (status, body) = send(&app, get(&format!("/stock-movements?itemId={}", item.id))).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], movement_id);
        assert_eq!(rows[0]["userId"], user);
        assert_eq!(rows[0]["userName"], "Store Keeper");
        assert_eq!(rows[0]["movementTypeCode"], "IN");
        assert_eq!(rows[0]["previousQty"], 10);
        assert_eq!(rows[0]["newQty"], 30);

        let (status, body) = send(
            &app,
            delete(&format!("/stock-movements?movementId={movement_id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["quantity"], 30);

        let (status, body) = send(
            &app,
            delete(&format!("/stock-movements?movementId={movement_id}")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejections() -> Result<()> {
        let (app, item, user) = setup_app().await?;

        let (status, body) = send(
            &app,
            post_movement(
                None,
                &json!({ "itemId": item.id, "movementTypeId": 1, "quantity": 5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(
            &app,
            post_movement(
                Some(user),
                &json!({ "itemId": item.id, "movementTypeId": 1, "quantity": 0 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            post_movement(
                Some(user),
                &json!({ "itemId": 999, "movementTypeId": 1, "quantity": 5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, delete("/stock-movements")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation error: movementId is required");

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_input_uses_envelope() -> Result<()> {
        let (db, item, user) = setup_with_item(10).await?;
        let user = user.id;
        let ledger = Arc::new(LedgerService::new(db, LedgerSettings::default()));
        let app = router(AppState {
            ledger: Arc::clone(&ledger),
        });

        let (status, body) = send(
            &app,
            post_movement(
                Some(user),
                &json!({ "itemId": item.id, "movementTypeId": 1, "quantity": "abc" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid quantity"));

        let (status, body) = send(
            &app,
            post_movement(Some(user), &json!({ "itemId": item.id, "movementTypeId": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid quantity"));

        let (status, body) = send(
            &app,
            Request::builder()
                .method(Method::POST)
                .uri("/stock-movements")
                .header("content-type", "application/json")
                .header("x-user-id", user.to_string())
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, delete("/stock-movements?movementId=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, get("/stock-movements?limit=lots")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        assert_eq!(movement_count(ledger.db(), item.id).await?, 0);

        Ok(())
    }
}
