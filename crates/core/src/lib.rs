// crates/core/src/lib.rs

//! Core of the tool-calling demo: chat client seam, tool catalogue and
//! dispatcher, judge-label parsing, span model and trace stores.

pub mod ai_client;
pub mod config;
pub mod dispatcher;
pub mod label;
pub mod openai_client;
pub mod tools;
pub mod trace_store;
pub mod types;
