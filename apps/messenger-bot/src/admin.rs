//! Operator endpoints for the shipment table.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mcb_core::replies;
use mcb_core::{DeliveryStatus, OutboundMessage, ShipmentChange, ShipmentRecord, ShipmentUpdate};
use serde::Serialize;
use tracing::{info, warn};

use crate::http::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("not found")]
    NotFound(String),
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::NotFound(goods_id) => {
                warn!(goods_id = %goods_id, "shipment update for unknown id");
                StatusCode::NOT_FOUND
            }
        };
        (
            status,
            Json(ApiErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ShipmentRecord>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: ShipmentRecord,
}

pub async fn list_products(State(state): State<AppState>) -> Json<ProductsResponse> {
    Json(ProductsResponse {
        products: state.cargo.list().await,
    })
}

pub async fn update_product(
    State(state): State<AppState>,
    Json(mut update): Json<ShipmentUpdate>,
) -> Result<Json<ProductResponse>, AdminError> {
    update.goods_id = update.goods_id.trim().to_string();
    let change = state
        .cargo
        .apply(&update)
        .await
        .ok_or_else(|| AdminError::NotFound(update.goods_id.clone()))?;
    info!(
        goods_id = %change.after.goods_id,
        location = %change.after.location,
        status = %change.after.status,
        "shipment updated"
    );

    if change.notifies_subscribers() {
        notify_subscribers(&state, &change).await;
    }
    Ok(Json(ProductResponse {
        product: change.after,
    }))
}

/// Sends the change notice to every subscriber in subscription order.
/// Delivery failures are logged and never reach the operator.
async fn notify_subscribers(state: &AppState, change: &ShipmentChange) {
    let goods_id = change.after.goods_id.as_str();
    let notice = replies::change_notice(&change.after);
    let subscribers = state.subscriptions.subscribers(goods_id);
    for subscriber in &subscribers {
        let status = state
            .sender
            .send(OutboundMessage::update(subscriber.as_str(), notice.as_str()))
            .await;
        if let DeliveryStatus::Failed { reason } = status {
            warn!(goods_id, subscriber = %subscriber, reason = %reason, "update notice not delivered");
        }
    }
    info!(goods_id, notified = subscribers.len(), "subscribers notified");
}
