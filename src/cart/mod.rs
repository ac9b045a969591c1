pub mod checkout;

use std::time::Duration;

use opendal::{ErrorKind, Operator};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::payment::{PaymentGateway, PaymentMethod, PaymentReceipt, PaymentRequest};

/// Storage slot holding the serialized cart. Read once at store
/// construction, rewritten on every mutation.
pub const CART_SLOT_KEY: &str = "donation_cart.json";

/// Recurrence cadence of a donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    OneTime,
    Monthly,
    Quarterly,
    Yearly,
}

/// One pending contribution pledge in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationItem {
    pub id: String,
    pub campaign_id: String,
    pub campaign_title: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub anonymous: bool,
}

/// Everything except the generated id.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDonationItem {
    pub campaign_id: String,
    pub campaign_title: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub anonymous: bool,
}

/// Partial update merged into an existing item; absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartItemPatch {
    pub campaign_id: Option<String>,
    pub campaign_title: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<Frequency>,
    pub anonymous: Option<bool>,
}

/// Point-in-time view of the cart handed to handlers.
#[derive(Debug, Clone, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<DonationItem>,
    pub total_amount: f64,
    pub is_processing: bool,
}

/// Result of a successful checkout: the receipt plus the line items it
/// settled, so callers can record them after the cart has been cleared.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub receipt: PaymentReceipt,
    pub items: Vec<DonationItem>,
    pub total_amount: f64,
}

#[derive(Debug, Default)]
struct CartState {
    items: Vec<DonationItem>,
    is_processing: bool,
}

/// Single source of truth for pending donations. Constructed once at app
/// start and injected through state; items survive restarts via the
/// storage slot.
pub struct CartStore {
    storage: Operator,
    slot_key: String,
    state: RwLock<CartState>,
}

impl CartStore {
    /// Opens the store, loading the persisted slot. An absent slot yields
    /// an empty cart; a corrupt slot is recovered by resetting it to empty
    /// (never a crash, never a user-facing error).
    pub async fn open(storage: Operator, slot_key: impl Into<String>) -> Result<Self, AppError> {
        let slot_key = slot_key.into();
        let items = match Self::load_slot(&storage, &slot_key).await {
            Ok(items) => items,
            Err(AppError::StorageCorruption(detail)) => {
                tracing::warn!(slot = %slot_key, %detail, "resetting corrupt cart slot");
                storage.write(&slot_key, b"[]".to_vec()).await?;
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            storage,
            slot_key,
            state: RwLock::new(CartState {
                items,
                is_processing: false,
            }),
        })
    }

    async fn load_slot(storage: &Operator, slot_key: &str) -> Result<Vec<DonationItem>, AppError> {
        let buffer = match storage.read(slot_key).await {
            Ok(buffer) => buffer,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&buffer.to_vec())
            .map_err(|err| AppError::StorageCorruption(err.to_string()))
    }

    async fn persist(&self, items: &[DonationItem]) -> Result<(), AppError> {
        let payload = serde_json::to_vec(items)
            .map_err(|err| AppError::Internal(anyhow::anyhow!("serialize cart: {err}")))?;
        self.storage.write(&self.slot_key, payload).await?;
        Ok(())
    }

    /// Appends a new item with a generated unique id. Amount is the
    /// caller's responsibility to validate.
    pub async fn add_item(&self, new: NewDonationItem) -> Result<DonationItem, AppError> {
        let item = DonationItem {
            id: Uuid::new_v4().to_string(),
            campaign_id: new.campaign_id,
            campaign_title: new.campaign_title,
            amount: new.amount,
            frequency: new.frequency,
            anonymous: new.anonymous,
        };
        let mut state = self.state.write().await;
        state.items.push(item.clone());
        self.persist(&state.items).await?;
        Ok(item)
    }

    /// Removes the matching item. Absent ids are a no-op, not an error.
    pub async fn remove_item(&self, id: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|item| item.id != id);
        let removed = state.items.len() != before;
        if removed {
            self.persist(&state.items).await?;
        }
        Ok(removed)
    }

    /// Merges the patch into the matching item. Absent ids are a no-op.
    pub async fn update_item(&self, id: &str, patch: CartItemPatch) -> Result<Option<DonationItem>, AppError> {
        let mut state = self.state.write().await;
        let Some(item) = state.items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        if let Some(campaign_id) = patch.campaign_id {
            item.campaign_id = campaign_id;
        }
        if let Some(campaign_title) = patch.campaign_title {
            item.campaign_title = campaign_title;
        }
        if let Some(amount) = patch.amount {
            item.amount = amount;
        }
        if let Some(frequency) = patch.frequency {
            item.frequency = frequency;
        }
        if let Some(anonymous) = patch.anonymous {
            item.anonymous = anonymous;
        }
        let updated = item.clone();
        self.persist(&state.items).await?;
        Ok(Some(updated))
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        state.items.clear();
        self.persist(&state.items).await?;
        Ok(())
    }

    pub async fn total_amount(&self) -> f64 {
        let state = self.state.read().await;
        state.items.iter().map(|item| item.amount).sum()
    }

    pub async fn is_processing(&self) -> bool {
        self.state.read().await.is_processing
    }

    pub async fn snapshot(&self) -> CartSnapshot {
        let state = self.state.read().await;
        CartSnapshot {
            items: state.items.clone(),
            total_amount: state.items.iter().map(|item| item.amount).sum(),
            is_processing: state.is_processing,
        }
    }

    /// Settles the cart through the payment collaborator. At most one
    /// checkout is in flight: a second invocation while `is_processing` is
    /// set is rejected without side effects. On success the cart is
    /// cleared; on gateway failure (including the timeout boundary) the
    /// cart is left intact so the user can resubmit.
    pub async fn checkout(
        &self,
        gateway: &dyn PaymentGateway,
        method: PaymentMethod,
        timeout: Duration,
    ) -> Result<CheckoutOutcome, AppError> {
        let (items, total_amount) = {
            let mut state = self.state.write().await;
            if state.is_processing {
                return Err(AppError::CheckoutConflict("a checkout is already being processed"));
            }
            if state.items.is_empty() {
                return Err(AppError::Validation("the donation cart is empty".to_string()));
            }
            state.is_processing = true;
            let total = state.items.iter().map(|item| item.amount).sum();
            (state.items.clone(), total)
        };

        let request = PaymentRequest {
            items: items.clone(),
            total_amount,
            method,
        };
        let outcome = match tokio::time::timeout(timeout, gateway.submit_payment(request)).await {
            Ok(result) => result,
            Err(_) => Err(crate::payment::PaymentError::Timeout),
        };

        match outcome {
            Ok(receipt) => {
                let mut state = self.state.write().await;
                state.items.clear();
                state.is_processing = false;
                if let Err(err) = self.persist(&state.items).await {
                    // Funds are captured; an unpersisted clear only means
                    // the stale slot is reloaded on the next restart.
                    tracing::error!("failed to persist cleared cart: {}", err);
                }
                Ok(CheckoutOutcome {
                    receipt,
                    items,
                    total_amount,
                })
            }
            Err(err) => {
                self.state.write().await.is_processing = false;
                Err(AppError::Payment(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::SimulatedLedgerGateway;
    use opendal::services::Memory;

    fn memory_operator() -> Operator {
        Operator::new(Memory::default()).expect("memory operator").finish()
    }

    async fn store() -> CartStore {
        CartStore::open(memory_operator(), CART_SLOT_KEY).await.expect("open store")
    }

    fn item(campaign_id: &str, amount: f64, frequency: Frequency, anonymous: bool) -> NewDonationItem {
        NewDonationItem {
            campaign_id: campaign_id.to_string(),
            campaign_title: format!("Campaign {campaign_id}"),
            amount,
            frequency,
            anonymous,
        }
    }

    #[tokio::test]
    async fn totals_track_mutations() {
        let store = store().await;
        let a = store.add_item(item("1", 100.0, Frequency::OneTime, false)).await.unwrap();
        store.add_item(item("2", 50.0, Frequency::Monthly, true)).await.unwrap();
        assert_eq!(store.total_amount().await, 150.0);

        store.update_item(&a.id, CartItemPatch { amount: Some(75.0), ..Default::default() }).await.unwrap();
        assert_eq!(store.total_amount().await, 125.0);

        store.remove_item(&a.id).await.unwrap();
        assert_eq!(store.total_amount().await, 50.0);

        store.clear().await.unwrap();
        assert_eq!(store.total_amount().await, 0.0);
    }

    #[tokio::test]
    async fn scenario_two_items_in_insertion_order() {
        let store = store().await;
        store.add_item(item("1", 100.0, Frequency::OneTime, false)).await.unwrap();
        store.add_item(item("2", 50.0, Frequency::Monthly, true)).await.unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.total_amount, 150.0);
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.items[0].campaign_id, "1");
        assert_eq!(snapshot.items[1].campaign_id, "2");
    }

    #[tokio::test]
    async fn generated_ids_are_unique() {
        let store = store().await;
        for _ in 0..200 {
            store.add_item(item("1", 10.0, Frequency::OneTime, false)).await.unwrap();
        }
        let snapshot = store.snapshot().await;
        let mut ids: Vec<_> = snapshot.items.iter().map(|item| item.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[tokio::test]
    async fn absent_ids_are_no_ops() {
        let store = store().await;
        store.add_item(item("1", 25.0, Frequency::Quarterly, false)).await.unwrap();
        assert!(!store.remove_item("missing").await.unwrap());
        assert!(store
            .update_item("missing", CartItemPatch { amount: Some(1.0), ..Default::default() })
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.total_amount().await, 25.0);
    }

    #[tokio::test]
    async fn slot_round_trips_across_reopen() {
        let storage = memory_operator();
        let first = CartStore::open(storage.clone(), CART_SLOT_KEY).await.unwrap();
        first.add_item(item("1", 100.0, Frequency::OneTime, false)).await.unwrap();
        first.add_item(item("2", 50.0, Frequency::Yearly, true)).await.unwrap();
        let before = first.snapshot().await;

        let reopened = CartStore::open(storage, CART_SLOT_KEY).await.unwrap();
        let after = reopened.snapshot().await;
        assert_eq!(before.items, after.items);
    }

    #[tokio::test]
    async fn corrupt_slot_resets_to_empty() {
        let storage = memory_operator();
        storage.write(CART_SLOT_KEY, b"{not json".to_vec()).await.unwrap();

        let store = CartStore::open(storage.clone(), CART_SLOT_KEY).await.expect("recovers");
        assert_eq!(store.total_amount().await, 0.0);

        // The slot itself was reset, so a reopen stays clean.
        let reopened = CartStore::open(storage, CART_SLOT_KEY).await.unwrap();
        assert!(reopened.snapshot().await.items.is_empty());
    }

    #[tokio::test]
    async fn checkout_clears_cart_and_reports_total() {
        let store = store().await;
        store.add_item(item("1", 100.0, Frequency::OneTime, false)).await.unwrap();
        store.add_item(item("2", 50.0, Frequency::Monthly, true)).await.unwrap();

        let gateway = SimulatedLedgerGateway::new(Duration::ZERO);
        let outcome = store
            .checkout(&gateway, PaymentMethod::Card, Duration::from_secs(1))
            .await
            .expect("checkout");

        assert_eq!(outcome.total_amount, 150.0);
        assert_eq!(outcome.items.len(), 2);
        assert_eq!(store.total_amount().await, 0.0);
        assert!(!store.is_processing().await);
    }

    #[tokio::test]
    async fn second_checkout_while_processing_is_rejected() {
        use std::sync::Arc;

        let store = Arc::new(store().await);
        store.add_item(item("1", 100.0, Frequency::OneTime, false)).await.unwrap();

        let slow = SimulatedLedgerGateway::new(Duration::from_millis(200));
        let first = {
            let store = store.clone();
            tokio::spawn(async move {
                store.checkout(&slow, PaymentMethod::Card, Duration::from_secs(5)).await
            })
        };

        // Give the first checkout time to enter processing.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.is_processing().await);

        let fast = SimulatedLedgerGateway::new(Duration::ZERO);
        let second = store.checkout(&fast, PaymentMethod::Card, Duration::from_secs(1)).await;
        assert!(matches!(second, Err(AppError::CheckoutConflict(_))));

        let first = first.await.expect("join").expect("first checkout succeeds");
        assert_eq!(first.total_amount, 100.0);
    }

    #[tokio::test]
    async fn gateway_timeout_preserves_cart() {
        let store = store().await;
        store.add_item(item("1", 40.0, Frequency::OneTime, false)).await.unwrap();

        let slow = SimulatedLedgerGateway::new(Duration::from_secs(30));
        let result = store.checkout(&slow, PaymentMethod::Crypto, Duration::from_millis(20)).await;

        assert!(matches!(
            result,
            Err(AppError::Payment(crate::payment::PaymentError::Timeout))
        ));
        assert!(!store.is_processing().await);
        assert_eq!(store.total_amount().await, 40.0);
    }
}
