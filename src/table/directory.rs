//! Agent Directory
//!
//! Side-loaded `id -> display name` lookup used to fill the synthetic
//! `AgentName` column. Ids compare case-insensitively.

use std::collections::HashMap;

use log::{debug, info};

use super::record::{AgentEntry, Page};
use crate::error::FetchError;
use crate::source::{AgentSource, PageRequest};

/// Default prefix for agents missing from the directory.
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "Agent-";

/// Default number of id characters kept in a placeholder.
pub const DEFAULT_PLACEHOLDER_LENGTH: usize = 8;

/// Upper bound on pages drained by [`AgentDirectory::load_all`].
const MAX_DIRECTORY_PAGES: usize = 1000;

/// Agent id to display name map.
#[derive(Debug, Clone)]
pub struct AgentDirectory {
    names: HashMap<String, String>,
    placeholder_prefix: String,
    placeholder_length: usize,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
            placeholder_length: DEFAULT_PLACEHOLDER_LENGTH,
        }
    }

    /// Builds a directory from entries. Later duplicates win.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = AgentEntry>,
    {
        let mut directory = Self::new();
        directory.extend(entries);
        directory
    }

    /// Changes how unknown agents are rendered.
    pub fn with_placeholder(mut self, prefix: impl Into<String>, length: usize) -> Self {
        self.placeholder_prefix = prefix.into();
        self.placeholder_length = length;
        self
    }

    pub fn insert(&mut self, id: &str, name: impl Into<String>) {
        self.names.insert(id.to_lowercase(), name.into());
    }

    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = AgentEntry>,
    {
        for entry in entries {
            self.insert(&entry.id, entry.name);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Looks up a name, ignoring id case.
    pub fn resolve(&self, agent_id: &str) -> Option<&str> {
        self.names.get(&agent_id.to_lowercase()).map(String::as_str)
    }

    /// Resolved name, or a placeholder built from the first characters of
    /// the id.
    pub fn display_name(&self, agent_id: &str) -> String {
        match self.resolve(agent_id) {
            Some(name) => name.to_string(),
            None => self.placeholder(agent_id),
        }
    }

    /// Placeholder for an agent missing from the directory.
    pub fn placeholder(&self, agent_id: &str) -> String {
        let short: String = agent_id.chars().take(self.placeholder_length).collect();
        format!("{}{}", self.placeholder_prefix, short)
    }

    /// Drains every page of an agent source into a directory.
    pub async fn load_all<S: AgentSource>(source: &S, page_size: usize) -> Result<Self, FetchError> {
        if page_size == 0 {
            return Err(FetchError::InvalidRequest("page size must be at least 1".to_string()));
        }

        let mut directory = Self::new();
        let mut request = PageRequest::new(1, page_size);

        loop {
            let page: Page<AgentEntry> = source.list_agents(&request).await?;
            let received = page.items.len();
            let more = page.has_next() && received > 0;
            debug!(
                "Agent page {}: {} entries (total {})",
                page.page_number, received, page.total_count
            );
            directory.extend(page.items);

            if !more || request.page_number >= MAX_DIRECTORY_PAGES {
                break;
            }
            let next = request.page_number + 1;
            request = request.with_page(next);
        }

        info!("Agent directory loaded: {} agents", directory.len());
        Ok(directory)
    }
}

impl Default for AgentDirectory {
    fn default() -> Self {
        Self::new()
    }
}
