//! Route handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use runpay_core::{
    match_university, normalize_string, sanitize_log_data, Amount, CallbackPayload, GatewayConfig,
    OrderReference, OrderRequest, PaymentRecord, PaymentStatus, UpdateOutcome, ValidationError,
    KENYAN_UNIVERSITIES,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::{error::AppError, state::AppState, store::InsertOutcome};

/// Fields the checkout page forwards to the gateway
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Stored reference
    pub order_reference: String,
    /// Amount as signed
    pub amount: Amount,
    /// Currency as signed
    pub currency: String,
    /// Current status
    pub status: PaymentStatus,
    /// Base64 RSA signature, empty when unsigned
    pub signature: String,
    /// Callback URL included in the signature data
    pub callback_url: String,
    /// Merchant code included in the signature data
    pub merchant_code: String,
}

impl OrderResponse {
    fn new(record: &PaymentRecord, gateway: &GatewayConfig) -> Self {
        Self {
            order_reference: record.order_reference.to_string(),
            amount: record.amount.clone(),
            currency: record.currency.clone(),
            status: record.status,
            signature: record.signature.clone(),
            callback_url: gateway.callback_url(),
            merchant_code: gateway.merchant_code.clone(),
        }
    }
}

/// Payment status lookup result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Stored reference
    pub order_reference: String,
    /// Current status
    pub status: PaymentStatus,
    /// Order amount
    pub amount: Amount,
    /// Order currency
    pub currency: String,
    /// Gateway transaction id, once known
    pub transaction_id: Option<String>,
    /// Last change
    pub updated_at: DateTime<Utc>,
}

/// Acknowledgement sent back to the gateway
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    /// Always true on success
    pub received: bool,
    /// Order the notification was for
    pub order_reference: String,
    /// Status after the notification
    pub status: PaymentStatus,
    /// The notification had already been applied
    pub duplicate: bool,
}

/// `?q=` parameter of the university match route
#[derive(Debug, Deserialize)]
pub struct UniversityQuery {
    q: Option<String>,
}

fn order_log_fields(record: &PaymentRecord) -> Value {
    let mut fields = Map::new();
    fields.insert("orderReference".into(), json!(record.order_reference));
    fields.insert("amount".into(), json!(record.amount));
    fields.insert("currency".into(), json!(record.currency));
    fields.insert("customerEmail".into(), json!(record.customer.email));
    fields.insert("customerPhone".into(), json!(record.customer.phone));
    fields.insert("signed".into(), json!(!record.is_unsigned()));
    Value::Object(sanitize_log_data(&fields))
}

/// `POST /api/orders`
pub async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let Json(request) = payload?;
    let gateway = &state.config.gateway;
    let order = request.validate(&gateway.default_currency)?;

    if order.is_retry {
        if let Some(existing) = state.store.get(&order.order_reference).await? {
            info!(order = %order_log_fields(&existing), "order creation replayed");
            return Ok((StatusCode::OK, Json(OrderResponse::new(&existing, gateway))));
        }
    }

    let record = order.into_record(gateway, state.signer.as_ref())?;
    let outcome = state.store.insert_if_absent(record).await?;

    let status = match &outcome {
        InsertOutcome::Created(record) => {
            info!(order = %order_log_fields(record), "order created");
            StatusCode::CREATED
        }
        InsertOutcome::Existing(record) => {
            info!(order = %order_log_fields(record), "order creation replayed");
            StatusCode::OK
        }
    };

    Ok((status, Json(OrderResponse::new(outcome.record(), gateway))))
}

/// `GET /api/orders/{reference}`
pub async fn order_status_handler(
    State(state): State<Arc<AppState>>,
    Path(reference): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let reference =
        OrderReference::parse(&reference).map_err(|e| AppError::MalformedPayload(e.to_string()))?;

    let record = state
        .store
        .get(&reference)
        .await?
        .ok_or_else(|| AppError::NotFound(reference.to_string()))?;

    Ok(Json(StatusResponse {
        order_reference: record.order_reference.to_string(),
        status: record.status,
        amount: record.amount,
        currency: record.currency,
        transaction_id: record.transaction_id,
        updated_at: record.updated_at,
    }))
}

/// Gateway notification: validate, look up, verify, then apply once
pub async fn callback_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CallbackPayload>, JsonRejection>,
) -> Result<Json<CallbackResponse>, AppError> {
    let Json(payload) = payload?;
    let fields = Value::Object(payload.log_fields());
    info!(payload = %fields, "payment callback received");

    let callback = payload.validate().inspect_err(|e| {
        warn!(payload = %fields, error = %e, "payment callback rejected");
    })?;

    let record = state
        .store
        .get(&callback.order_reference)
        .await?
        .ok_or_else(|| {
            warn!(payload = %fields, "payment callback for unknown order");
            AppError::NotFound(callback.order_reference.to_string())
        })?;

    if !callback.verify(&record, &state.config.gateway) {
        warn!(payload = %fields, "payment callback signature mismatch");
        return Err(AppError::InvalidSignature);
    }

    let (outcome, record) = state
        .store
        .apply_update(
            &callback.order_reference,
            callback.idempotency_key.clone(),
            callback.status,
            callback.transaction_id.as_deref(),
        )
        .await
        .inspect_err(|e| warn!(payload = %fields, error = %e, "payment status update refused"))?;

    let duplicate = match outcome {
        UpdateOutcome::Applied { previous, current } => {
            info!(
                order_reference = %record.order_reference,
                %previous,
                %current,
                idempotency_key = %callback.idempotency_key,
                "payment status updated"
            );
            false
        }
        UpdateOutcome::Duplicate => {
            info!(
                order_reference = %record.order_reference,
                idempotency_key = %callback.idempotency_key,
                "duplicate payment callback ignored"
            );
            true
        }
    };

    Ok(Json(CallbackResponse {
        received: true,
        order_reference: record.order_reference.to_string(),
        status: record.status,
        duplicate,
    }))
}

/// `GET /api/universities/match?q=`
pub async fn university_match_handler(
    Query(query): Query<UniversityQuery>,
) -> Result<Json<Value>, AppError> {
    let mut v = ValidationError::new();
    v.require("q", query.q.as_deref());
    v.into_result()?;

    let input = query.q.unwrap_or_default();
    let matched = match_university(&input, KENYAN_UNIVERSITIES);

    Ok(Json(json!({
        "input": input,
        "normalized": normalize_string(&input),
        "match": matched,
    })))
}

/// `GET /health`
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "signing": state.is_signing(),
    }))
}
