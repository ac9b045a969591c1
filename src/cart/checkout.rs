use serde::Serialize;

use crate::error::AppError;
use crate::payment::PaymentMethod;

/// Suggested donation amounts offered at the amount-selection step.
pub const PREDEFINED_AMOUNTS: [u32; 6] = [25, 50, 100, 250, 500, 1000];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckoutStep {
    Idle,
    AmountSelection,
    CartReview,
    PaymentSelection,
    Processing,
    Success,
}

/// The checkout flow: sequences amount selection, cart review, payment
/// selection, processing and the success screen. One flow exists per app;
/// the cart store's `is_processing` flag is the settlement-level guard,
/// this machine is the step-level one.
///
/// `session` increments whenever the flow is (re)opened or cancelled so a
/// delayed auto-close or a settlement finishing after a cancel cannot
/// touch a newer flow.
#[derive(Debug)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    method: PaymentMethod,
    final_amount: f64,
    last_error: Option<String>,
    session: u64,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self {
            step: CheckoutStep::Idle,
            method: PaymentMethod::Card,
            final_amount: 0.0,
            last_error: None,
            session: 0,
        }
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn final_amount(&self) -> f64 {
        self.final_amount
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Starts a fresh flow at amount selection. Re-opening discards any
    /// abandoned step state; an in-flight settlement cannot be interrupted.
    pub fn open(&mut self) -> Result<(), AppError> {
        if self.step == CheckoutStep::Processing {
            return Err(AppError::CheckoutConflict("checkout is currently processing"));
        }
        self.step = CheckoutStep::AmountSelection;
        self.method = PaymentMethod::Card;
        self.final_amount = 0.0;
        self.last_error = None;
        self.session += 1;
        Ok(())
    }

    /// AmountSelection -> CartReview, after the item has been added.
    pub fn item_added(&mut self) -> Result<(), AppError> {
        match self.step {
            CheckoutStep::AmountSelection => {
                self.step = CheckoutStep::CartReview;
                Ok(())
            }
            _ => Err(AppError::CheckoutConflict("not at amount selection")),
        }
    }

    /// CartReview -> PaymentSelection.
    pub fn proceed(&mut self) -> Result<(), AppError> {
        match self.step {
            CheckoutStep::CartReview => {
                self.step = CheckoutStep::PaymentSelection;
                Ok(())
            }
            _ => Err(AppError::CheckoutConflict("not at cart review")),
        }
    }

    /// CartReview -> AmountSelection, to add another donation.
    pub fn add_more(&mut self) -> Result<(), AppError> {
        match self.step {
            CheckoutStep::CartReview => {
                self.step = CheckoutStep::AmountSelection;
                Ok(())
            }
            _ => Err(AppError::CheckoutConflict("not at cart review")),
        }
    }

    /// Switches the rendered payment method. Permitted any time before the
    /// submission is in flight.
    pub fn select_method(&mut self, method: PaymentMethod) -> Result<(), AppError> {
        match self.step {
            CheckoutStep::Processing | CheckoutStep::Success => {
                Err(AppError::CheckoutConflict("payment method is locked"))
            }
            _ => {
                self.method = method;
                Ok(())
            }
        }
    }

    /// PaymentSelection -> Processing. Entered at most once per attempt;
    /// a repeat submission while processing is rejected here before it can
    /// reach the store.
    pub fn begin_processing(&mut self) -> Result<(), AppError> {
        match self.step {
            CheckoutStep::PaymentSelection => {
                self.step = CheckoutStep::Processing;
                self.last_error = None;
                Ok(())
            }
            CheckoutStep::Processing => {
                Err(AppError::CheckoutConflict("a checkout is already being processed"))
            }
            _ => Err(AppError::CheckoutConflict("not at payment selection")),
        }
    }

    /// Processing -> Success, automatic on settlement completion.
    pub fn complete(&mut self, amount: f64) {
        self.step = CheckoutStep::Success;
        self.final_amount = amount;
        self.last_error = None;
    }

    /// Processing -> PaymentSelection with the failure surfaced, so the
    /// user can resubmit. No automatic retry is attempted.
    pub fn fail(&mut self, message: String) {
        self.step = CheckoutStep::PaymentSelection;
        self.last_error = Some(message);
    }

    /// Any state -> Idle. Discards step state; the cart itself is left
    /// untouched unless checkout already completed.
    pub fn cancel(&mut self) {
        self.step = CheckoutStep::Idle;
        self.method = PaymentMethod::Card;
        self.final_amount = 0.0;
        self.last_error = None;
        self.session += 1;
    }

    /// Auto-close after the success screen's fixed display window. A stale
    /// session (flow reopened or cancelled meanwhile) is ignored.
    pub fn close_after_success(&mut self, session: u64) {
        if self.session == session && self.step == CheckoutStep::Success {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow_at_payment() -> CheckoutFlow {
        let mut flow = CheckoutFlow::new();
        flow.open().unwrap();
        flow.item_added().unwrap();
        flow.proceed().unwrap();
        flow
    }

    #[test]
    fn happy_path_walks_every_step() {
        let mut flow = CheckoutFlow::new();
        assert_eq!(flow.step(), CheckoutStep::Idle);

        flow.open().unwrap();
        assert_eq!(flow.step(), CheckoutStep::AmountSelection);
        flow.item_added().unwrap();
        assert_eq!(flow.step(), CheckoutStep::CartReview);
        flow.proceed().unwrap();
        assert_eq!(flow.step(), CheckoutStep::PaymentSelection);
        flow.begin_processing().unwrap();
        assert_eq!(flow.step(), CheckoutStep::Processing);
        flow.complete(150.0);
        assert_eq!(flow.step(), CheckoutStep::Success);
        assert_eq!(flow.final_amount(), 150.0);

        let session = flow.session();
        flow.close_after_success(session);
        assert_eq!(flow.step(), CheckoutStep::Idle);
    }

    #[test]
    fn add_more_returns_to_amount_selection() {
        let mut flow = CheckoutFlow::new();
        flow.open().unwrap();
        flow.item_added().unwrap();
        flow.add_more().unwrap();
        assert_eq!(flow.step(), CheckoutStep::AmountSelection);
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut flow = CheckoutFlow::new();
        assert!(flow.proceed().is_err());
        assert!(flow.begin_processing().is_err());

        flow.open().unwrap();
        assert!(flow.proceed().is_err());
        assert!(flow.begin_processing().is_err());
    }

    #[test]
    fn double_submission_is_rejected() {
        let mut flow = flow_at_payment();
        flow.begin_processing().unwrap();
        assert!(matches!(
            flow.begin_processing(),
            Err(AppError::CheckoutConflict(_))
        ));
    }

    #[test]
    fn failure_returns_to_payment_selection_with_error() {
        let mut flow = flow_at_payment();
        flow.begin_processing().unwrap();
        flow.fail("payment processing timed out".to_string());
        assert_eq!(flow.step(), CheckoutStep::PaymentSelection);
        assert_eq!(flow.last_error(), Some("payment processing timed out"));

        // The user can resubmit after a failure.
        assert!(flow.begin_processing().is_ok());
    }

    #[test]
    fn cancel_discards_step_state() {
        let mut flow = flow_at_payment();
        flow.select_method(PaymentMethod::Crypto).unwrap();
        flow.cancel();
        assert_eq!(flow.step(), CheckoutStep::Idle);
        assert_eq!(flow.method(), PaymentMethod::Card);
    }

    #[test]
    fn stale_auto_close_is_ignored() {
        let mut flow = flow_at_payment();
        flow.begin_processing().unwrap();
        flow.complete(80.0);
        let stale = flow.session();

        // The user reopened before the success window elapsed.
        flow.open().unwrap();
        flow.close_after_success(stale);
        assert_eq!(flow.step(), CheckoutStep::AmountSelection);
    }
}
