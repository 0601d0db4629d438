//! Scheduler layer for the runner
//!
//! Fans one pipeline out per architecture and collects every outcome into a
//! run summary.

pub mod fanout;

pub use fanout::{ArchScheduler, RunSummary};
