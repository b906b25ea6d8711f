//! JSON File Source
//!
//! Serves agents and records from JSON files, re-read on every request.
//! A file holds either a bare array or a page object with an `items` array.

use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::memory::{filter_records, paginate};
use super::{AgentSource, PageRequest, RecordSource};
use crate::error::FetchError;
use crate::table::{AgentEntry, Page, RawRecord};

#[derive(Deserialize)]
#[serde(untagged)]
enum FileContents<T> {
    List(Vec<T>),
    Page { items: Vec<T> },
}

impl<T> FileContents<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Self::List(items) | Self::Page { items } => items,
        }
    }
}

/// File-backed agent and record source.
#[derive(Debug, Clone, Default)]
pub struct JsonFileSource {
    agents_path: Option<PathBuf>,
    records_path: Option<PathBuf>,
}

impl JsonFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(mut self, path: impl Into<PathBuf>) -> Self {
        self.agents_path = Some(path.into());
        self
    }

    pub fn with_records(mut self, path: impl Into<PathBuf>) -> Self {
        self.records_path = Some(path.into());
        self
    }
}

async fn read_items<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>, FetchError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let content = tokio::fs::read_to_string(path).await.map_err(|source| FetchError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let contents: FileContents<T> = serde_json::from_str(&content)?;
    let items = contents.into_items();
    debug!("Read {} items from {}", items.len(), path.display());
    Ok(items)
}

impl AgentSource for JsonFileSource {
    async fn list_agents(&self, request: &PageRequest) -> Result<Page<AgentEntry>, FetchError> {
        request.validate()?;
        let agents: Vec<AgentEntry> = read_items(self.agents_path.as_deref()).await?;
        Ok(paginate(agents, request))
    }
}

impl RecordSource for JsonFileSource {
    async fn list_records(&self, request: &PageRequest) -> Result<Page<RawRecord>, FetchError> {
        request.validate()?;
        let records: Vec<RawRecord> = read_items(self.records_path.as_deref()).await?;
        let matching = filter_records(&records, request)?;
        Ok(paginate(matching, request))
    }
}
