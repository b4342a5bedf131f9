use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `optimize_index` MCP tool. Takes no arguments.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct OptimizeIndexParams {}
