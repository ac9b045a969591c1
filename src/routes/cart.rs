use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use serde::Deserialize;
use serde_json::json;

use crate::cart::{CartItemPatch, CartSnapshot, Frequency, NewDonationItem};
use crate::error::AppError;
use crate::state::AppState;

/// Catch-all target for donations made without a specific campaign.
pub const GENERAL_FUND_ID: &str = "general";
pub const GENERAL_FUND_TITLE: &str = "General Relief Fund";

#[derive(Deserialize)]
pub struct AddItemRequest {
    /// Absent means a general donation, allocated to the most urgent needs.
    pub campaign_id: Option<String>,
    pub amount: f64,
    pub frequency: Frequency,
    #[serde(default)]
    pub anonymous: bool,
}

/// Resolves the request against the catalog and validates the amount
/// before it reaches the store.
pub fn resolve_item(state: &AppState, req: &AddItemRequest) -> Result<NewDonationItem, AppError> {
    if req.amount <= 0.0 || !req.amount.is_finite() {
        return Err(AppError::Validation("donation amount must be positive".to_string()));
    }

    let (campaign_id, campaign_title) = match &req.campaign_id {
        Some(id) => {
            let campaign = state.catalog.get(id).ok_or(AppError::NotFound("campaign"))?;
            (campaign.id.clone(), campaign.title.clone())
        }
        None => (GENERAL_FUND_ID.to_string(), GENERAL_FUND_TITLE.to_string()),
    };

    Ok(NewDonationItem {
        campaign_id,
        campaign_title,
        amount: req.amount,
        frequency: req.frequency,
        anonymous: req.anonymous,
    })
}

pub async fn get_cart(State(state): State<AppState>) -> AxumJson<CartSnapshot> {
    AxumJson(state.cart.snapshot().await)
}

pub async fn add_item(
    State(state): State<AppState>,
    Json(req): Json<AddItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = resolve_item(&state, &req)?;
    let item = state.cart.add_item(new).await?;
    Ok((StatusCode::CREATED, AxumJson(json!({ "item": item }))))
}

pub async fn update_item(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(patch): Json<CartItemPatch>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(amount) = patch.amount {
        if amount <= 0.0 || !amount.is_finite() {
            return Err(AppError::Validation("donation amount must be positive".to_string()));
        }
    }
    let updated = state.cart.update_item(&id, patch).await?;
    Ok(AxumJson(json!({ "updated": updated.is_some(), "item": updated })))
}

pub async fn remove_item(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.cart.remove_item(&id).await?;
    Ok(AxumJson(json!({ "removed": removed })))
}

pub async fn clear_cart(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.cart.clear().await?;
    Ok(AxumJson(json!({ "cleared": true })))
}
