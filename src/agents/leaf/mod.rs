//! Specialist agents. Each reads from the context store, calls the model,
//! writes one result back and returns control to the orchestrator.

mod editor;
mod web_search;
mod writer;

pub use editor::EditorAgent;
pub use web_search::WebSearchAgent;
pub use writer::WriterAgent;
