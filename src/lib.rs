//! Apexlog Studio
//!
//! Call-tree reconstruction and analysis for Salesforce Apex debug logs.
//!
//! This crate provides the core implementation for the `apexlog` CLI
//! tool: a single-pass line classifier, a noise-suppression filter, and
//! a stack-based engine that turns a flat sequence of unit start/finish
//! markers into a nested tree of execution frames.
//!
//! ## Getting Started
//!
//! Most users should install and use the CLI:
//!
//! ```bash
//! cargo install apexlog-studio
//! apexlog --help
//! ```
//!
//! Library users call [`parser::parse_log`] with the log's lines and an
//! ignore list, then walk the returned transactions.

pub mod analyzer;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
