//! Append-only usage ledger with O(1) running totals

use chrono::Utc;
use std::time::Instant;
use tracing::debug;

use shared::{LedgerCall, LedgerExport, LedgerSummary};
use crate::types::{Pricing, UsageRecord, UsageSummary};

/// Usage ledger for one session
///
/// Totals are kept alongside the records so that cost and summary never
/// re-walk the record list.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    pricing: Pricing,
    records: Vec<UsageRecord>,
    total_input_tokens: u64,
    total_output_tokens: u64,
    call_count: u64,
    started_at: Instant,
}

impl UsageLedger {
    pub fn new(pricing: Pricing) -> Self {
        Self {
            pricing,
            records: Vec::new(),
            total_input_tokens: 0,
            total_output_tokens: 0,
            call_count: 0,
            started_at: Instant::now(),
        }
    }

    pub fn pricing(&self) -> Pricing {
        self.pricing
    }

    /// Record a model call
    pub fn track(&mut self, input_tokens: u64, output_tokens: u64, label: &str) -> UsageRecord {
        let record = UsageRecord {
            timestamp: Utc::now(),
            label: label.to_string(),
            input_tokens,
            output_tokens,
            cost: self.pricing.cost(input_tokens, output_tokens),
        };

        self.total_input_tokens += input_tokens;
        self.total_output_tokens += output_tokens;
        self.call_count += 1;
        self.records.push(record.clone());

        debug!(
            "Tracked {} call: {} in / {} out tokens, ${:.4}",
            label, input_tokens, output_tokens, record.cost
        );
        record
    }

    pub fn total_cost(&self) -> f64 {
        self.pricing.cost(self.total_input_tokens, self.total_output_tokens)
    }

    pub fn summary(&self) -> UsageSummary {
        UsageSummary {
            duration: self.started_at.elapsed(),
            call_count: self.call_count,
            total_input_tokens: self.total_input_tokens,
            total_output_tokens: self.total_output_tokens,
            total_cost: self.total_cost(),
        }
    }

    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    /// Snapshot in the persisted export format
    pub fn to_export(&self) -> LedgerExport {
        let summary = self.summary();
        LedgerExport {
            summary: LedgerSummary {
                session_duration_seconds: summary.duration.as_secs_f64(),
                total_calls: summary.call_count,
                total_input_tokens: summary.total_input_tokens,
                total_output_tokens: summary.total_output_tokens,
                total_tokens: summary.total_tokens(),
                total_cost_usd: summary.total_cost,
            },
            calls: self
                .records
                .iter()
                .map(|record| LedgerCall {
                    timestamp: record.timestamp,
                    function: record.label.clone(),
                    input_tokens: record.input_tokens,
                    output_tokens: record.output_tokens,
                    total_tokens: record.total_tokens(),
                    cost_usd: record.cost,
                })
                .collect(),
        }
    }
}

impl Default for UsageLedger {
    fn default() -> Self {
        Self::new(Pricing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::round_cost;

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = UsageLedger::default();
        let summary = ledger.summary();
        assert_eq!(summary.call_count, 0);
        assert_eq!(summary.total_tokens(), 0);
        assert_eq!(ledger.total_cost(), 0.0);
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn test_track_appends_and_updates_totals() {
        let mut ledger = UsageLedger::new(Pricing::per_million(3.0, 15.0));

        let first = ledger.track(1000, 500, "generate_sequence");
        let second = ledger.track(2000, 1000, "generate_sequence");

        assert_eq!(first.cost, 0.0105);
        assert_eq!(second.cost, 0.021);
        assert_eq!(ledger.records().len(), 2);
        assert_eq!(ledger.records()[0], first);

        let summary = ledger.summary();
        assert_eq!(summary.call_count, 2);
        assert_eq!(summary.total_input_tokens, 3000);
        assert_eq!(summary.total_output_tokens, 1500);
        assert_eq!(summary.total_cost, 0.0315);
    }

    #[test]
    fn test_total_cost_matches_sum_of_call_costs() {
        let pricing = Pricing::per_million(3.0, 15.0);
        let mut ledger = UsageLedger::new(pricing);
        let calls = [(1200_u64, 340_u64), (800, 900), (4000, 1500), (10, 0)];

        let mut summed = 0.0;
        for (input, output) in calls {
            ledger.track(input, output, "generate_sequence");
            summed += pricing.raw_cost(input, output);
        }

        assert_eq!(ledger.total_cost(), round_cost(summed));
    }

    #[test]
    fn test_export_snapshot() {
        let mut ledger = UsageLedger::new(Pricing::per_million(3.0, 15.0));
        ledger.track(1000, 500, "generate_sequence");

        let export = ledger.to_export();
        assert_eq!(export.summary.total_calls, 1);
        assert_eq!(export.summary.total_tokens, 1500);
        assert_eq!(export.summary.total_cost_usd, 0.0105);
        assert_eq!(export.calls.len(), 1);
        assert_eq!(export.calls[0].function, "generate_sequence");
        assert_eq!(export.calls[0].total_tokens, 1500);
    }
}
