use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    dto::invoice_dto::{InvoiceLinkResponse, InvoiceQuery},
    error::Result,
    utils::telegram_auth::verify_init_data,
    AppState,
};

pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

pub async fn create_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<InvoiceLinkResponse>> {
    let init_data = headers
        .get(INIT_DATA_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let identity = verify_init_data(init_data, &state.bot_token).map_err(|e| {
        tracing::warn!(reason = %e, "Rejected init data");
        e
    })?;
    tracing::debug!(auth_date = ?identity.auth_date(), "Init data verified");

    let query = InvoiceQuery::from_raw(raw_query.as_deref());
    let invoice_link = state
        .invoice_service
        .issue(&identity, query.amount_or_zero())
        .await?;

    Ok(Json(InvoiceLinkResponse { invoice_link }))
}

/// Preflight. CORS headers are added by the middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
