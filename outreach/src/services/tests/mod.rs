//! Tests for outreach services
//!
//! The model client runs against a local mock HTTP server; the usage tracker
//! is exercised directly, including concurrent writers and ledger export.
