use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StoreMemoryParams {
    #[schemars(description = "The full text content of the memory")]
    pub content: String,

    #[schemars(description = "Short summary of the content, 1-1000 characters. Also names the content file.")]
    pub summary: String,

    #[schemars(description = "Up to 10 keywords for retrieval. Normalized to trimmed lowercase.")]
    pub keywords: Option<Vec<String>>,
}
