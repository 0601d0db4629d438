//! Repository layer
//!
//! Repositories own persistent state. The only state this runner keeps is
//! the per-architecture log record on disk.

mod logs;

pub use logs::{JobLog, LogRoot, LogStream};
