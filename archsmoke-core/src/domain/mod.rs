//! Core domain types
//!
//! This module contains the core domain structures shared by the client
//! (which produces raw collaborator output) and the runner (which turns that
//! output into job outcomes).

pub mod fields;
pub mod image;
pub mod job;
pub mod log;
pub mod report;
