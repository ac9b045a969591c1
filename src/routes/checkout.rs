use axum::{
    extract::{Json, State},
    response::Json as AxumJson,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cart::checkout::{CheckoutStep, PREDEFINED_AMOUNTS};
use crate::cart::CartSnapshot;
use crate::error::AppError;
use crate::payment::PaymentMethod;
use crate::state::AppState;

use super::cart::{resolve_item, AddItemRequest};

#[derive(Serialize)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub payment_method: PaymentMethod,
    pub final_amount: f64,
    pub last_error: Option<String>,
    pub predefined_amounts: [u32; 6],
    pub cart: CartSnapshot,
}

async fn current_view(state: &AppState) -> CheckoutView {
    let cart = state.cart.snapshot().await;
    let flow = state.checkout.lock().await;
    CheckoutView {
        step: flow.step(),
        payment_method: flow.method(),
        final_amount: flow.final_amount(),
        last_error: flow.last_error().map(str::to_string),
        predefined_amounts: PREDEFINED_AMOUNTS,
        cart,
    }
}

pub async fn status(State(state): State<AppState>) -> AxumJson<CheckoutView> {
    AxumJson(current_view(&state).await)
}

pub async fn open(State(state): State<AppState>) -> Result<AxumJson<CheckoutView>, AppError> {
    state.checkout.lock().await.open()?;
    Ok(AxumJson(current_view(&state).await))
}

/// Adds the selected donation and advances to cart review, mirroring the
/// amount-selection step's single action.
pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<AddItemRequest>,
) -> Result<AxumJson<CheckoutView>, AppError> {
    let new = resolve_item(&state, &req)?;
    {
        let mut flow = state.checkout.lock().await;
        if flow.step() != CheckoutStep::AmountSelection {
            return Err(AppError::CheckoutConflict("not at amount selection"));
        }
        state.cart.add_item(new).await?;
        flow.item_added()?;
    }
    Ok(AxumJson(current_view(&state).await))
}

pub async fn proceed(State(state): State<AppState>) -> Result<AxumJson<CheckoutView>, AppError> {
    state.checkout.lock().await.proceed()?;
    Ok(AxumJson(current_view(&state).await))
}

pub async fn add_more(State(state): State<AppState>) -> Result<AxumJson<CheckoutView>, AppError> {
    state.checkout.lock().await.add_more()?;
    Ok(AxumJson(current_view(&state).await))
}

#[derive(Deserialize, Default)]
pub struct SubmitPaymentRequest {
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

/// Submits the cart for settlement. The flow enters `Processing`, the
/// store guard blocks a concurrent submission, and the outcome either
/// lands on the success screen (with a timed auto-close) or returns to
/// payment selection with the failure surfaced.
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitPaymentRequest>,
) -> Result<AxumJson<serde_json::Value>, AppError> {
    let (session, method) = {
        let mut flow = state.checkout.lock().await;
        if let Some(method) = req.method {
            flow.select_method(method)?;
        }
        flow.begin_processing()?;
        (flow.session(), flow.method())
    };

    let result = state
        .cart
        .checkout(state.gateway.as_ref(), method, state.config.payment_timeout)
        .await;

    match result {
        Ok(outcome) => {
            state.ledger.record_checkout(&outcome.items, &outcome.receipt).await;

            let mut flow = state.checkout.lock().await;
            // A cancel while the settlement was in flight abandons the
            // flow; the captured funds are still recorded above.
            if flow.session() == session && flow.step() == CheckoutStep::Processing {
                flow.complete(outcome.total_amount);
                let checkout = state.checkout.clone();
                let delay = state.config.success_close;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    checkout.lock().await.close_after_success(session);
                });
            }

            Ok(AxumJson(json!({
                "receipt": outcome.receipt,
                "total_amount": outcome.total_amount,
            })))
        }
        Err(err) => {
            let mut flow = state.checkout.lock().await;
            if flow.session() == session && flow.step() == CheckoutStep::Processing {
                flow.fail(err.to_string());
            }
            Err(err)
        }
    }
}

pub async fn cancel(State(state): State<AppState>) -> AxumJson<CheckoutView> {
    state.checkout.lock().await.cancel();
    AxumJson(current_view(&state).await)
}
