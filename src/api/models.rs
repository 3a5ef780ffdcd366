use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct UppercaseQuery {
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct UppercaseResponse {
    pub text: String,
}

/// One scraped page as the provider is asked to return it.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct ExtractionPage {
    pub title: String,
    pub fulltext_compressed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub pages: Vec<ExtractionPage>,
}

/// Single-object shape used by the one-page demo.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub title: String,
    pub fulltext_compressed: String,
}
