//! MCP `recall_memory` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `recall_memory` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecallMemoryParams {
    #[schemars(description = "Natural language query to search memories")]
    pub query: String,

    /// Bias ranking toward memories carrying these keywords; never filters.
    #[schemars(
        description = "Up to 10 keywords that boost matching memories in the ranking (they do not filter results)"
    )]
    pub keywords: Option<Vec<String>>,

    #[schemars(description = "Maximum number of results (1-100). Defaults to 10.")]
    pub limit: Option<usize>,

    #[schemars(description = "Relevance weight of the summary text. Defaults to 0.8.")]
    pub summary_weight: Option<f64>,

    #[schemars(description = "Relevance weight of the keyword text. Defaults to 2.0.")]
    pub keyword_weight: Option<f64>,

    #[schemars(
        description = "Score credit per matched boost keyword (>= 0). Defaults to 1.0."
    )]
    pub keyword_boost: Option<f64>,
}
