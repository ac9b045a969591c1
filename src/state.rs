use std::env;
use std::sync::Arc;
use std::time::Duration;

use opendal::services::Fs;
use opendal::Operator;
use tokio::sync::Mutex;

use crate::aid::documents::DocumentStore;
use crate::aid::AidRequestRegistry;
use crate::auth::UserRegistry;
use crate::cart::checkout::CheckoutFlow;
use crate::cart::{CartStore, CART_SLOT_KEY};
use crate::catalog::CampaignCatalog;
use crate::ledger::DonationLedger;
use crate::payment::{PaymentGateway, SimulatedLedgerGateway};

/// Knobs resolved once at startup.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Hard boundary on a single payment-collaborator call.
    pub payment_timeout: Duration,
    /// How long the success screen stays up before the flow auto-closes.
    pub success_close: Duration,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self {
            payment_timeout: env_duration_ms("PAYMENT_TIMEOUT_MS", 30_000),
            success_close: env_duration_ms("CHECKOUT_SUCCESS_CLOSE_MS", 4_000),
        }
    }
}

fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(
        env::var(key)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(default_ms),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub cart: Arc<CartStore>,
    pub checkout: Arc<Mutex<CheckoutFlow>>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub catalog: Arc<CampaignCatalog>,
    pub aid: Arc<AidRequestRegistry>,
    pub ledger: Arc<DonationLedger>,
    pub users: Arc<UserRegistry>,
    pub config: RuntimeConfig,
}

impl AppState {
    /// Production wiring: filesystem-backed storage under `DATA_ROOT`, the
    /// simulated gateway, and env-seeded demo accounts.
    pub async fn from_env() -> anyhow::Result<Self> {
        let data_root = env::var("DATA_ROOT").unwrap_or_else(|_| "./data".to_string());
        let storage = Operator::new(Fs::default().root(&data_root))?.finish();

        let capture_delay = env_duration_ms("PAYMENT_CAPTURE_DELAY_MS", 3_000);
        let gateway: Arc<dyn PaymentGateway> = Arc::new(SimulatedLedgerGateway::new(capture_delay));

        let users = Arc::new(UserRegistry::with_demo_accounts().await);
        Self::assemble(storage, gateway, RuntimeConfig::from_env(), users).await
    }

    /// Wiring with explicit collaborators; integration tests swap in the
    /// memory operator and an instant gateway here.
    pub async fn assemble(
        storage: Operator,
        gateway: Arc<dyn PaymentGateway>,
        config: RuntimeConfig,
        users: Arc<UserRegistry>,
    ) -> anyhow::Result<Self> {
        let cart = CartStore::open(storage.clone(), CART_SLOT_KEY).await?;
        Ok(Self {
            cart: Arc::new(cart),
            checkout: Arc::new(Mutex::new(CheckoutFlow::new())),
            gateway,
            catalog: Arc::new(CampaignCatalog::seeded()),
            aid: Arc::new(AidRequestRegistry::new(DocumentStore::new(storage))),
            ledger: Arc::new(DonationLedger::new()),
            users,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendal::services::Memory;

    #[tokio::test]
    async fn state_assembles_with_memory_storage() {
        let storage = Operator::new(Memory::default()).expect("memory operator").finish();
        let gateway: Arc<dyn PaymentGateway> =
            Arc::new(SimulatedLedgerGateway::new(Duration::ZERO));
        let config = RuntimeConfig {
            payment_timeout: Duration::from_secs(1),
            success_close: Duration::ZERO,
        };
        let state = AppState::assemble(storage, gateway, config, Arc::new(UserRegistry::new()))
            .await
            .expect("assemble");
        assert_eq!(state.cart.total_amount().await, 0.0);
        assert!(!state.catalog.all().is_empty());
    }
}
