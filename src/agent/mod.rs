//! Agent module - the single-tool chat loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Seed the conversation with the user query
//! 2. Call the LLM with the `web_search` tool advertised
//! 3. If the LLM requests tool calls, execute them and feed the results back
//! 4. Repeat until the LLM answers without a tool call or max iterations is reached

mod agent_loop;

use std::sync::Arc;

use crate::config::Config;
use crate::llm::LlmClient;
use crate::search::{SearchContextBuilder, SearchProvider};
use crate::tools::{ToolRegistry, WebSearch};

pub use agent_loop::{ChatAgent, ChatRun, LogEntry, LogEntryType};

impl ChatAgent {
    /// Chat agent with the `web_search` tool, wired from configuration.
    pub fn from_config(
        config: &Config,
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        let builder = SearchContextBuilder::new(
            llm.clone(),
            search,
            config.models.chat.clone(),
            config.search.max_results,
        );
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(WebSearch::new(Arc::new(builder))));
        ChatAgent::new(llm, tools, config.models.chat.clone(), config.max_iterations)
    }
}
