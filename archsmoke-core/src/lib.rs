//! Archsmoke Core
//!
//! Core types and parsing for the archsmoke multi-architecture smoke-test orchestrator.
//!
//! This crate contains:
//! - Domain types: job descriptors, job outcomes, result fields, log entries
//! - Pure parsers for collaborator output (KEY=VALUE fields, image lookup, sentinel detection)
//!
//! Nothing here spawns processes or touches the filesystem; that lives in
//! `archsmoke-client` and `archsmoke-runner`.

pub mod domain;
