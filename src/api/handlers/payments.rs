/*
 * Responsibility
 * - POST /api/payments/webhook: acknowledge provider callbacks
 * - Public route; payload signature checks belong to the payment integration, not here
 */
use axum::{Json, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub data: Value,
}

pub async fn webhook(Json(event): Json<WebhookEvent>) -> (StatusCode, Json<Value>) {
    tracing::info!(kind = %event.kind, id = ?event.id, "payment webhook received");
    (StatusCode::OK, Json(json!({"received": true})))
}
