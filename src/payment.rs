use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cart::DonationItem;

/// How the donor settles the cart. Selection only changes which detail
/// payload accompanies the submission, never the checkout state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Crypto,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    pub items: Vec<DonationItem>,
    pub total_amount: f64,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    /// Ledger transaction reference for the captured funds.
    pub reference: String,
    pub amount: f64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The collaborator rejected the payment. Not retryable without user
    /// action.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The collaborator did not answer within the configured boundary.
    #[error("payment processing timed out")]
    Timeout,

    /// The collaborator could not be reached at all.
    #[error("payment processor unavailable: {0}")]
    Unavailable(String),
}

/// Seam between the checkout flow and whatever actually captures funds.
/// The state machine never sleeps or fabricates receipts itself; swapping
/// this implementation is the integration point for a real processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit_payment(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Stand-in for the ledger collaborator: resolves after a fixed capture
/// delay and never fails. The transaction reference is a content hash of
/// the captured request salted with a nonce, so two identical carts still
/// get distinct references.
pub struct SimulatedLedgerGateway {
    capture_delay: Duration,
}

impl SimulatedLedgerGateway {
    pub fn new(capture_delay: Duration) -> Self {
        Self { capture_delay }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedLedgerGateway {
    async fn submit_payment(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        tokio::time::sleep(self.capture_delay).await;

        let nonce = Uuid::new_v4();
        let mut hasher = blake3::Hasher::new();
        hasher.update(nonce.as_bytes());
        if let Ok(payload) = serde_json::to_vec(&request) {
            hasher.update(&payload);
        }
        let digest = hasher.finalize().to_hex();

        let receipt = PaymentReceipt {
            reference: format!("txn-{}", &digest.as_str()[..16]),
            amount: request.total_amount,
            captured_at: Utc::now(),
        };
        tracing::info!(
            reference = %receipt.reference,
            amount = receipt.amount,
            "simulated ledger captured donation"
        );
        Ok(receipt)
    }
}
