//! HTTP handlers for stock movements and movement types.
//!
//! Bodies and query strings are taken as `Result<_, Rejection>` so malformed input is
//! answered with the same `{ success: false, error }` envelope as every other failure.

use crate::{
    api::{
        AppState,
        actor::Actor,
        error::{ApiResponse, ApiResult},
    },
    core::ledger::{MovementFilter, MovementView, RecordMovement, RecordedMovement},
    entities::{ItemModel, MovementTypeModel},
    errors::Error,
};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;
use serde_json::Value;

/// Query string of `DELETE /stock-movements`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMovementQuery {
    /// Movement to delete
    pub movement_id: Option<i64>,
}

fn query_error(rejection: &QueryRejection) -> Error {
    Error::Validation {
        message: rejection.body_text(),
    }
}

/// Decodes a movement request.
///
/// `quantity` is checked on the raw JSON first so a missing or non-integer value is
/// reported as an invalid quantity rather than a generic body error.
fn parse_movement(body: Result<Json<Value>, JsonRejection>) -> Result<RecordMovement, Error> {
    let Json(body) = body.map_err(|rejection| Error::Validation {
        message: rejection.body_text(),
    })?;

    match body.get("quantity") {
        Some(quantity) if quantity.is_i64() => {}
        Some(quantity) => {
            return Err(Error::InvalidQuantity {
                quantity: quantity.to_string(),
            });
        }
        None => {
            return Err(Error::InvalidQuantity {
                quantity: "(missing)".to_string(),
            });
        }
    }

    serde_json::from_value(body).map_err(|e| Error::Validation {
        message: format!("Invalid movement request: {e}"),
    })
}

/// List movements, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    filter: Result<Query<MovementFilter>, QueryRejection>,
) -> ApiResult<Vec<MovementView>> {
    let Query(filter) = filter.map_err(|rejection| query_error(&rejection))?;
    let movements = state.ledger.list_movements(filter).await?;
    Ok(ApiResponse::ok(movements))
}

/// Record a movement and apply it to the item
pub async fn record_movement(
    State(state): State<AppState>,
    Actor(user_id): Actor,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RecordedMovement> {
    let request = RecordMovement {
        user_id,
        ..parse_movement(body)?
    };
    let recorded = state.ledger.record_movement(request).await?;
    Ok(ApiResponse::ok(recorded))
}

/// Delete a movement and recompute its item's quantity
pub async fn delete_movement(
    State(state): State<AppState>,
    query: Result<Query<DeleteMovementQuery>, QueryRejection>,
) -> ApiResult<ItemModel> {
    let Query(query) = query.map_err(|rejection| query_error(&rejection))?;
    let movement_id = query.movement_id.ok_or_else(|| Error::Validation {
        message: "movementId is required".to_string(),
    })?;
    let item = state.ledger.delete_movement(movement_id).await?;
    Ok(ApiResponse::ok(item))
}

/// List active movement types
pub async fn list_movement_types(
    State(state): State<AppState>,
) -> ApiResult<Vec<MovementTypeModel>> {
    let types = state.ledger.list_active_types().await?;
    Ok(ApiResponse::ok(types))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_movement() {
        let request = parse_movement(Ok(Json(json!({
            "itemId": 3,
            "movementTypeId": 1,
            "quantity": 12,
            "notes": "restock",
            "userId": 99
        }))))
        .unwrap();
        assert_eq!(request.item_id, 3);
        assert_eq!(request.quantity, 12);
        assert_eq!(request.notes.as_deref(), Some("restock"));
        assert_eq!(request.user_id, 0);

        for quantity in [json!("abc"), json!(1.5), json!(null)] {
            let result = parse_movement(Ok(Json(
                json!({ "itemId": 3, "movementTypeId": 1, "quantity": quantity }),
            )));
            assert!(matches!(result.unwrap_err(), Error::InvalidQuantity { .. }));
        }

        let result = parse_movement(Ok(Json(json!({ "itemId": 3, "movementTypeId": 1 }))));
        assert!(matches!(result.unwrap_err(), Error::InvalidQuantity { .. }));

        let result = parse_movement(Ok(Json(
            json!({ "itemId": "x", "movementTypeId": 1, "quantity": 2 }),
        )));
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
    }
}
