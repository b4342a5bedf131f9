use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadContentParams {
    #[schemars(
        description = "Absolute path of a content file. Must resolve under the configured content root."
    )]
    pub path: String,
}
