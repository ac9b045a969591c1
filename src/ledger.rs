//! In-memory record of completed donations. Written on checkout success,
//! read by the dashboard for donor aggregates. Like the rest of the mock
//! data this does not survive a restart; only the pending cart does.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cart::{DonationItem, Frequency};
use crate::payment::PaymentReceipt;

/// One completed contribution, captured at settlement.
#[derive(Debug, Clone, Serialize)]
pub struct DonationRecord {
    pub id: String,
    pub campaign_id: String,
    pub campaign_title: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub anonymous: bool,
    pub receipt_ref: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DonorSummary {
    pub total_donated: f64,
    pub campaigns_supported: usize,
    pub donation_count: usize,
    pub last_donation_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct DonationLedger {
    records: RwLock<Vec<DonationRecord>>,
}

impl DonationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every settled line item under the shared receipt reference.
    pub async fn record_checkout(&self, items: &[DonationItem], receipt: &PaymentReceipt) {
        let mut records = self.records.write().await;
        for item in items {
            records.push(DonationRecord {
                id: Uuid::new_v4().to_string(),
                campaign_id: item.campaign_id.clone(),
                campaign_title: item.campaign_title.clone(),
                amount: item.amount,
                frequency: item.frequency,
                anonymous: item.anonymous,
                receipt_ref: receipt.reference.clone(),
                completed_at: receipt.captured_at,
            });
        }
    }

    /// Most recent first.
    pub async fn recent(&self, limit: usize) -> Vec<DonationRecord> {
        let records = self.records.read().await;
        records.iter().rev().take(limit).cloned().collect()
    }

    pub async fn summary(&self) -> DonorSummary {
        let records = self.records.read().await;
        let campaigns: HashSet<&str> = records.iter().map(|r| r.campaign_id.as_str()).collect();
        DonorSummary {
            total_donated: records.iter().map(|r| r.amount).sum(),
            campaigns_supported: campaigns.len(),
            donation_count: records.len(),
            last_donation_at: records.last().map(|r| r.completed_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(reference: &str) -> PaymentReceipt {
        PaymentReceipt {
            reference: reference.to_string(),
            amount: 150.0,
            captured_at: Utc::now(),
        }
    }

    fn item(campaign_id: &str, amount: f64) -> DonationItem {
        DonationItem {
            id: Uuid::new_v4().to_string(),
            campaign_id: campaign_id.to_string(),
            campaign_title: format!("Campaign {campaign_id}"),
            amount,
            frequency: Frequency::OneTime,
            anonymous: false,
        }
    }

    #[tokio::test]
    async fn summary_counts_unique_campaigns() {
        let ledger = DonationLedger::new();
        ledger
            .record_checkout(&[item("1", 100.0), item("2", 50.0)], &receipt("txn-a"))
            .await;
        ledger.record_checkout(&[item("1", 25.0)], &receipt("txn-b")).await;

        let summary = ledger.summary().await;
        assert_eq!(summary.total_donated, 175.0);
        assert_eq!(summary.campaigns_supported, 2);
        assert_eq!(summary.donation_count, 3);
        assert!(summary.last_donation_at.is_some());
    }

    #[tokio::test]
    async fn recent_is_newest_first() {
        let ledger = DonationLedger::new();
        ledger.record_checkout(&[item("1", 10.0)], &receipt("txn-a")).await;
        ledger.record_checkout(&[item("2", 20.0)], &receipt("txn-b")).await;

        let recent = ledger.recent(5).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].receipt_ref, "txn-b");
        assert_eq!(recent[1].receipt_ref, "txn-a");
    }
}
