//! Data Sources
//!
//! Contracts for the paginated collaborators that feed the queue tables,
//! plus in-process implementations and the view that loads pages from them.
//!
//! # Structure
//!
//! - [`memory`]: In-memory source with filtering and pagination
//! - [`file`]: Source backed by JSON files
//! - [`queue`]: Queue view with stale-response protection

pub mod file;
pub mod memory;
pub mod queue;

use std::collections::BTreeMap;
use std::future::Future;

use crate::error::FetchError;
use crate::table::{AgentEntry, Page, RawRecord};

pub use file::JsonFileSource;
pub use memory::MemorySource;
pub use queue::{LoadOutcome, LoadState, QueueView, RequestToken};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Pagination and filter parameters for a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based
    pub page_number: usize,
    pub page_size: usize,
    pub filters: BTreeMap<String, String>,
}

impl PageRequest {
    pub fn new(page_number: usize, page_size: usize) -> Self {
        Self {
            page_number,
            page_size,
            filters: BTreeMap::new(),
        }
    }

    /// Same filters, different page.
    pub fn with_page(mut self, page_number: usize) -> Self {
        self.page_number = page_number;
        self
    }

    /// Adds a filter. A blank value removes the filter instead.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.filters.remove(&key);
        } else {
            self.filters.insert(key, value.trim().to_string());
        }
        self
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Zero-based index of the first item on the page.
    pub fn offset(&self) -> usize {
        self.page_number.saturating_sub(1) * self.page_size
    }

    /// Rejects page 0 and empty pages.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.page_number == 0 {
            return Err(FetchError::InvalidRequest("page numbers start at 1".to_string()));
        }
        if self.page_size == 0 {
            return Err(FetchError::InvalidRequest("page size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Query parameters: `pageNumber`, `pageSize`, then filters by key.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("pageNumber".to_string(), self.page_number.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Paginated list of `{id, name}` agent pairs.
pub trait AgentSource {
    fn list_agents(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Page<AgentEntry>, FetchError>> + Send;
}

/// Paginated list of queue records.
pub trait RecordSource {
    fn list_records(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Page<RawRecord>, FetchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_order() {
        let request = PageRequest::new(2, 25)
            .with_filter("status", "Pending")
            .with_filter("fromDate", "2024-01-01");

        let pairs = request.to_query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["pageNumber", "pageSize", "fromDate", "status"]);
        assert_eq!(pairs[0].1, "2");
        assert_eq!(pairs[1].1, "25");
    }

    #[test]
    fn test_blank_filter_removes() {
        let request = PageRequest::default()
            .with_filter("status", "Paid")
            .with_filter("status", "  ");
        assert!(request.filter("status").is_none());
    }

    #[test]
    fn test_filter_value_trimmed() {
        let request = PageRequest::default().with_filter("agentId", " a1 ");
        assert_eq!(request.filter("agentId"), Some("a1"));
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_validate() {
        assert!(PageRequest::new(1, 10).validate().is_ok());
        assert!(PageRequest::new(0, 10).validate().is_err());
        assert!(PageRequest::new(1, 0).validate().is_err());
    }

    #[test]
    fn test_default_request() {
        let request = PageRequest::default();
        assert_eq!(request.page_number, 1);
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
        assert!(request.filters.is_empty());
    }
}
