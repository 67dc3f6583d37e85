//! Outreach service implementations

pub mod model_client;
pub mod usage_tracker;

#[cfg(test)]
pub mod tests;

pub use model_client::*;
pub use usage_tracker::*;
