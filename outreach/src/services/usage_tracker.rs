//! Usage tracking implementation backed by a shared ledger

use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::core::ledger::UsageLedger;
use crate::error::OutreachResult;
use crate::traits::UsageTracker;
use crate::types::{Pricing, UsageRecord, UsageSummary};

/// Real usage tracker; clones share one session ledger
///
/// Writes go through the lock one at a time, so concurrent pipelines never
/// interleave appends or leave the totals out of step with the records.
#[derive(Clone)]
pub struct RealUsageTracker {
    ledger: Arc<RwLock<UsageLedger>>,
}

impl RealUsageTracker {
    pub fn new(pricing: Pricing) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(UsageLedger::new(pricing))),
        }
    }
}

impl Default for RealUsageTracker {
    fn default() -> Self {
        Self::new(Pricing::default())
    }
}

#[async_trait]
impl UsageTracker for RealUsageTracker {
    async fn track(&self, input_tokens: u64, output_tokens: u64, label: &str) -> UsageRecord {
        let mut ledger = self.ledger.write().await;
        ledger.track(input_tokens, output_tokens, label)
    }

    async fn total_cost(&self) -> f64 {
        self.ledger.read().await.total_cost()
    }

    async fn summary(&self) -> UsageSummary {
        self.ledger.read().await.summary()
    }

    async fn records(&self) -> Vec<UsageRecord> {
        self.ledger.read().await.records().to_vec()
    }

    async fn export(&self, path: &Path) -> OutreachResult<()> {
        let export = self.ledger.read().await.to_export();
        let json = serde_json::to_string_pretty(&export)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json).await?;

        info!(
            "Exported usage ledger to {} ({} calls, ${:.4})",
            path.display(),
            export.summary.total_calls,
            export.summary.total_cost_usd
        );
        Ok(())
    }
}
