//! Versioned key-value store shared by the agents of one run.

use std::collections::BTreeMap;

use serde::Serialize;

use super::AgentKind;

/// Keys the agents exchange results under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
    /// Raw concatenated search hits
    SearchContext,
    /// Answer grounded on the search hits
    SearchResult,
    /// Writer draft
    WrittenContent,
    /// Editor revision
    EditedContent,
}

impl ContextKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKey::SearchContext => "search_context",
            ContextKey::SearchResult => "search_result",
            ContextKey::WrittenContent => "written_content",
            ContextKey::EditedContent => "edited_content",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextEntry {
    pub value: String,
    /// Store version at which this value was written.
    pub version: u64,
    pub written_by: AgentKind,
}

/// Every write bumps the store version, so a revisited agent's overwrite is
/// distinguishable from the first write.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextStore {
    version: u64,
    entries: BTreeMap<ContextKey, ContextEntry>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` under `key`; returns the new store version.
    pub fn put(&mut self, key: ContextKey, value: impl Into<String>, written_by: AgentKind) -> u64 {
        self.version += 1;
        let entry = ContextEntry {
            value: value.into(),
            version: self.version,
            written_by,
        };
        if let Some(previous) = self.entries.insert(key, entry) {
            tracing::debug!(
                key = key.as_str(),
                previous_version = previous.version,
                previous_writer = %previous.written_by,
                version = self.version,
                "Context entry overwritten"
            );
        }
        self.version
    }

    pub fn get(&self, key: ContextKey) -> Option<&ContextEntry> {
        self.entries.get(&key)
    }

    /// Value under `key`, `""` when unset.
    pub fn value(&self, key: ContextKey) -> &str {
        self.get(key).map(|e| e.value.as_str()).unwrap_or("")
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn search_context(&self) -> &str {
        self.value(ContextKey::SearchContext)
    }

    pub fn search_result(&self) -> &str {
        self.value(ContextKey::SearchResult)
    }

    pub fn written_content(&self) -> &str {
        self.value(ContextKey::WrittenContent)
    }

    pub fn edited_content(&self) -> &str {
        self.value(ContextKey::EditedContent)
    }

    /// `key: value` lines for prompts.
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return "(empty)".to_string();
        }
        self.entries
            .iter()
            .map(|(key, entry)| format!("{}: {}", key.as_str(), entry.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_keys_read_as_empty() {
        let store = ContextStore::new();
        assert_eq!(store.search_result(), "");
        assert_eq!(store.render(), "(empty)");
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn overwrite_bumps_version_and_keeps_writer() {
        let mut store = ContextStore::new();
        assert_eq!(store.put(ContextKey::SearchResult, "v1", AgentKind::WebSearch), 1);
        assert_eq!(store.put(ContextKey::WrittenContent, "draft", AgentKind::Writer), 2);
        assert_eq!(store.put(ContextKey::SearchResult, "v2", AgentKind::WebSearch), 3);

        let entry = store.get(ContextKey::SearchResult).unwrap();
        assert_eq!(entry.value, "v2");
        assert_eq!(entry.version, 3);
        assert_eq!(entry.written_by, AgentKind::WebSearch);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn renders_in_key_order_and_serializes_as_map() {
        let mut store = ContextStore::new();
        store.put(ContextKey::WrittenContent, "draft", AgentKind::Writer);
        store.put(ContextKey::SearchResult, "facts", AgentKind::WebSearch);
        assert_eq!(store.render(), "search_result: facts\nwritten_content: draft");

        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["entries"]["written_content"]["written_by"], "writer");
        assert_eq!(json["version"], 2);
    }
}
