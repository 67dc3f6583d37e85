//! Boundary records exchanged with the pipeline's collaborators
//!
//! - `crm`: spreadsheet/CRM rows in, generated sequence write-back out
//! - `ledger`: the persisted usage ledger export document

pub mod crm;
pub mod ledger;

pub use crm::{ProspectRow, SequenceWriteBack, columns};
pub use ledger::{LedgerCall, LedgerExport, LedgerSummary};
