//! MCP `update_memory` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `update_memory` MCP tool.
///
/// At least one of `content`, `summary`, `keywords` must be present.
/// `keywords: []` clears the keyword set; omitting the field keeps it.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateMemoryParams {
    #[schemars(description = "ID of the memory to update")]
    pub id: i64,

    #[schemars(description = "Replacement content. Overwrites the existing content file.")]
    pub content: Option<String>,

    #[schemars(description = "Replacement summary, 1-1000 characters")]
    pub summary: Option<String>,

    #[schemars(
        description = "Replacement keyword set (up to 10). An empty list clears all keywords; omit the field to keep the current set."
    )]
    pub keywords: Option<Vec<String>>,
}
