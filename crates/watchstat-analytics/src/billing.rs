//! Billing totals

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use watchstat_common::{round_to, BillingRecord};

const APPROVED: &str = "APPROVED";
const SETTLED: &str = "SETTLED";

/// Money actually paid over the export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingSummary {
    /// Sum of approved and settled charges, rounded to cents
    pub total: f64,
    /// Currency of the first billing row
    pub currency: Option<String>,
    /// Charges counted in `total`
    pub settled_payments: usize,
}

/// Sum gross sale amounts of charges that were both approved and settled
#[instrument(skip(records), fields(records = records.len()))]
pub fn summarize_billing(records: &[BillingRecord]) -> BillingSummary {
    let settled: Vec<&BillingRecord> = records
        .iter()
        .filter(|r| r.pmt_status == APPROVED && r.final_invoice_result == SETTLED)
        .collect();

    let total: f64 = settled.iter().map(|r| r.gross_sale_amt).sum();
    let summary = BillingSummary {
        total: round_to(total, 2),
        currency: records.first().map(|r| r.currency.clone()),
        settled_payments: settled.len(),
    };

    debug!(
        total = summary.total,
        settled = summary.settled_payments,
        "Summarized billing history"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge(status: &str, result: &str, amount: f64, currency: &str) -> BillingRecord {
        BillingRecord {
            pmt_status: status.to_string(),
            final_invoice_result: result.to_string(),
            gross_sale_amt: amount,
            currency: currency.to_string(),
        }
    }

    #[test]
    fn test_only_approved_and_settled_count() {
        let records = vec![
            charge("APPROVED", "SETTLED", 15.99, "USD"),
            charge("DECLINED", "FAILED", 15.99, "USD"),
            charge("APPROVED", "PENDING", 15.99, "USD"),
        ];
        let summary = summarize_billing(&records);
        assert_eq!(summary.total, 15.99);
        assert_eq!(summary.currency.as_deref(), Some("USD"));
        assert_eq!(summary.settled_payments, 1);
    }

    #[test]
    fn test_settled_but_declined_is_excluded() {
        let records = vec![
            charge("APPROVED", "SETTLED", 15.99, "USD"),
            charge("DECLINED", "SETTLED", 9.99, ""),
        ];
        let summary = summarize_billing(&records);
        assert_eq!(summary.total, 15.99);
        assert_eq!(summary.currency.as_deref(), Some("USD"));
        assert_eq!(summary.settled_payments, 1);
    }

    #[test]
    fn test_total_is_rounded_to_cents() {
        let records: Vec<BillingRecord> = (0..3)
            .map(|_| charge("APPROVED", "SETTLED", 0.1, "SEK"))
            .collect();
        assert_eq!(summarize_billing(&records).total, 0.3);
    }

    #[test]
    fn test_empty_history() {
        let summary = summarize_billing(&[]);
        assert_eq!(summary, BillingSummary::default());
    }
}
