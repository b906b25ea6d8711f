//! In-Memory Source
//!
//! Serves agents and records from vectors, applying the same filters and
//! pagination a backend list endpoint would. Supports injected failures and
//! per-page delays for exercising loaders.
//!
//! Record filters:
//! - `status`, `agentId`: exact match, ignoring case
//! - `search`: substring of the record id or payload, ignoring case
//! - `fromDate`, `toDate`: inclusive `YYYY-MM-DD` bounds on `createdOn`

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use log::debug;

use super::{AgentSource, PageRequest, RecordSource};
use crate::error::FetchError;
use crate::table::{AgentEntry, Page, RawRecord};

const KNOWN_RECORD_FILTERS: &[&str] = &["status", "agentId", "search", "fromDate", "toDate"];

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    agents: Vec<AgentEntry>,
    records: Vec<RawRecord>,
    failure: Option<String>,
    delays: HashMap<usize, Duration>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(mut self, agents: Vec<AgentEntry>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_records(mut self, records: Vec<RawRecord>) -> Self {
        self.records = records;
        self
    }

    /// Makes every request fail with [`FetchError::Unavailable`].
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Delays responses for one page number.
    pub fn with_delay(mut self, page_number: usize, delay: Duration) -> Self {
        self.delays.insert(page_number, delay);
        self
    }

    async fn prepare(&self, request: &PageRequest) -> Result<(), FetchError> {
        request.validate()?;

        if let Some(delay) = self.delays.get(&request.page_number) {
            tokio::time::sleep(*delay).await;
        }

        match self.failure {
            Some(ref reason) => Err(FetchError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl AgentSource for MemorySource {
    async fn list_agents(&self, request: &PageRequest) -> Result<Page<AgentEntry>, FetchError> {
        self.prepare(request).await?;

        let matching: Vec<AgentEntry> = match request.filter("search") {
            Some(needle) => {
                let needle = needle.to_lowercase();
                self.agents
                    .iter()
                    .filter(|a| a.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
            None => self.agents.clone(),
        };

        Ok(paginate(matching, request))
    }
}

impl RecordSource for MemorySource {
    async fn list_records(&self, request: &PageRequest) -> Result<Page<RawRecord>, FetchError> {
        self.prepare(request).await?;
        let matching = filter_records(&self.records, request)?;
        Ok(paginate(matching, request))
    }
}

/// Cuts one page out of the full result set.
pub fn paginate<T>(items: Vec<T>, request: &PageRequest) -> Page<T> {
    let total_count = items.len();
    let page_items: Vec<T> = items
        .into_iter()
        .skip(request.offset())
        .take(request.page_size)
        .collect();

    Page::new(page_items, total_count, request.page_number, request.page_size)
}

fn parse_bound(request: &PageRequest, key: &str) -> Result<Option<NaiveDate>, FetchError> {
    request
        .filter(key)
        .map(|text| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
                FetchError::InvalidRequest(format!("{} must be YYYY-MM-DD, got '{}'", key, text))
            })
        })
        .transpose()
}

/// Applies record filters. Unknown filter keys are ignored.
pub fn filter_records(records: &[RawRecord], request: &PageRequest) -> Result<Vec<RawRecord>, FetchError> {
    for key in request.filters.keys() {
        if !KNOWN_RECORD_FILTERS.contains(&key.as_str()) {
            debug!("Ignoring unknown record filter '{}'", key);
        }
    }

    let status = request.filter("status").map(str::to_lowercase);
    let agent_id = request.filter("agentId").map(str::to_lowercase);
    let search = request.filter("search").map(str::to_lowercase);
    let from = parse_bound(request, "fromDate")?;
    let to = parse_bound(request, "toDate")?;

    let matching = records
        .iter()
        .filter(|r| status.as_ref().map_or(true, |s| r.status.to_lowercase() == *s))
        .filter(|r| agent_id.as_ref().map_or(true, |a| r.agent_id.to_lowercase() == *a))
        .filter(|r| {
            search.as_ref().map_or(true, |needle| {
                r.id.to_lowercase().contains(needle) || r.data_json.to_lowercase().contains(needle)
            })
        })
        .filter(|r| {
            if from.is_none() && to.is_none() {
                return true;
            }
            let Some(created) = r.created_on.map(|c| c.date_naive()) else {
                return false;
            };
            from.map_or(true, |f| created >= f) && to.map_or(true, |t| created <= t)
        })
        .cloned()
        .collect();

    Ok(matching)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn records() -> Vec<RawRecord> {
        vec![
            RawRecord::new("r1", "A1", r#"{"Beneficiary":"Sita"}"#)
                .with_status("Pending")
                .with_created_on(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
            RawRecord::new("r2", "a2", r#"{"Beneficiary":"Ram"}"#)
                .with_status("Paid")
                .with_created_on(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()),
            RawRecord::new("r3", "a1", r#"{"Beneficiary":"Gita"}"#).with_status("pending"),
        ]
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=23).collect();
        let page = paginate(items, &PageRequest::new(3, 10));
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.total_count, 23);
        assert_eq!(page.page_number, 3);
    }

    #[test]
    fn test_paginate_past_end() {
        let page = paginate(vec![1, 2], &PageRequest::new(5, 10));
        assert!(page.is_empty());
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn test_filter_status_case_insensitive() {
        let request = PageRequest::default().with_filter("status", "PENDING");
        let ids: Vec<String> = filter_records(&records(), &request)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["r1", "r3"]);
    }

    #[test]
    fn test_filter_agent_and_search() {
        let request = PageRequest::default()
            .with_filter("agentId", "a1")
            .with_filter("search", "gita");
        let matching = filter_records(&records(), &request).unwrap();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].id, "r3");
    }

    #[test]
    fn test_search_matches_record_id() {
        let request = PageRequest::default().with_filter("search", "R2");
        let matching = filter_records(&records(), &request).unwrap();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].id, "r2");
    }

    #[test]
    fn test_filter_date_bounds() {
        let request = PageRequest::default()
            .with_filter("fromDate", "2024-03-02")
            .with_filter("toDate", "2024-03-05");
        let matching = filter_records(&records(), &request).unwrap();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].id, "r2");
    }

    #[test]
    fn test_filter_bad_date() {
        let request = PageRequest::default().with_filter("fromDate", "March 2nd");
        assert!(matches!(
            filter_records(&records(), &request),
            Err(FetchError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_unknown_filter_ignored() {
        let request = PageRequest::default().with_filter("colour", "blue");
        assert_eq!(filter_records(&records(), &request).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_records_pages() {
        let source = MemorySource::new().with_records(records());
        let page = source.list_records(&PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, 3);
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn test_list_agents_search() {
        let source = MemorySource::new().with_agents(vec![
            AgentEntry::new("a1", "Acme Remit"),
            AgentEntry::new("a2", "Himal Transfer"),
        ]);
        let request = PageRequest::default().with_filter("search", "himal");
        let page = source.list_agents(&request).await.unwrap();
        assert_eq!(page.items, vec![AgentEntry::new("a2", "Himal Transfer")]);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = MemorySource::new().with_records(records()).failing("timeout");
        let result = source.list_records(&PageRequest::default()).await;
        assert!(matches!(result, Err(FetchError::Unavailable(reason)) if reason == "timeout"));
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let source = MemorySource::new();
        let result = source.list_records(&PageRequest::new(0, 10)).await;
        assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
    }
}
