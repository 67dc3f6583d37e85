//! Shared types for the outreach sequence pipeline
//!
//! Contains the normalized records exchanged with the pipeline's collaborators:
//! prospects coming from the spreadsheet/CRM side, scraped job postings and
//! enrichment context, and the message sequences flowing back out.

pub mod types;
pub mod errors;
pub mod logging;
pub mod messages;

pub use types::*;
pub use errors::*;

// Re-export boundary records
pub use messages::{
    // Spreadsheet/CRM side
    ProspectRow, SequenceWriteBack, columns,

    // Ledger export document
    LedgerExport, LedgerSummary, LedgerCall,
};
