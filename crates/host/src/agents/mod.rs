// crates/host/src/agents/mod.rs

//! Agents of the demo.
//!
//! Each agent is self-contained with its own:
//! - mod.rs (model call and result handling)
//! - prompts.rs (system prompts / templates)

pub mod assistant;
pub mod judge;

pub use assistant::Assistant;
pub use judge::Judge;
