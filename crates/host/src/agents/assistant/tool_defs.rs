// crates/host/src/agents/assistant/tool_defs.rs

//! Tool definitions sent with every assistant request.

use once_cell::sync::Lazy;
use serde_json::Value;

use toolcall_eval_core::tools;

static DEFINITIONS: Lazy<Vec<Value>> = Lazy::new(tools::tool_definitions);

/// Assistant tool definitions.
pub fn assistant_tool_definitions() -> Vec<Value> {
    DEFINITIONS.clone()
}
