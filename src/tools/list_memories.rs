//! MCP `list_memories` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `list_memories` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListMemoriesParams {
    #[schemars(description = "Page size (1-100). Defaults to 20.")]
    pub limit: Option<usize>,

    #[schemars(description = "Number of records to skip. Defaults to 0.")]
    pub offset: Option<usize>,
}
