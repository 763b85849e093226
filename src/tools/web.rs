//! The `web_search` tool: gathers search context for a query.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::search::{SearchContextBuilder, SubQueryStyle};

use super::{Tool, ToolError};

pub struct WebSearch {
    builder: Arc<SearchContextBuilder>,
}

impl WebSearch {
    pub fn new(builder: Arc<SearchContextBuilder>) -> Self {
        Self { builder }
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Generates context for a query by breaking it down into sub-queries if needed, \
         performing web searches for each sub-query, and returning the combined context \
         without answering the query itself."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The query to gather context for"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let query = args["query"]
            .as_str()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".to_string()))?;

        let context = self.builder.build(query, SubQueryStyle::Tool).await?;
        Ok(context.text)
    }
}
