//! Aggregate counts over the registry.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{DocumentRecord, Domain};
use crate::registry::Registry;

/// Number of documents in one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainCount {
    pub domain: Domain,
    pub count: u64,
}

/// Number of documents processed on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Unix timestamp of the start of the day.
    pub timestamp: i64,
    pub count: u64,
}

/// Counts per domain and per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub total: u64,
    /// Every domain in declaration order, including zero counts.
    pub by_domain: Vec<DomainCount>,
    /// Days with at least one document, ascending.
    pub timeline: Vec<TimelineBucket>,
}

impl Report {
    /// Report over the whole registry.
    pub fn from_registry(registry: &Registry) -> Self {
        Self::from_records(registry.list(None))
    }

    /// Report whose timeline only counts one domain.
    ///
    /// `by_domain` still covers everything so the view can show the filter
    /// alongside the full breakdown.
    pub fn for_domain(registry: &Registry, domain: Domain) -> Self {
        let records = registry.list(None);
        let by_domain = count_by_domain(&records);
        let filtered: Vec<_> = records.into_iter().filter(|r| r.domain == domain).collect();
        Self {
            total: filtered.len() as u64,
            by_domain,
            timeline: build_timeline(&filtered),
        }
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DocumentRecord>) -> Self {
        let records: Vec<&DocumentRecord> = records.into_iter().collect();
        Self {
            total: records.len() as u64,
            by_domain: count_by_domain(&records),
            timeline: build_timeline(&records),
        }
    }

    pub fn count_for(&self, domain: Domain) -> u64 {
        self.by_domain
            .iter()
            .find(|c| c.domain == domain)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Largest per-day count, for scaling bars.
    pub fn max_daily(&self) -> u64 {
        self.timeline.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

fn count_by_domain(records: &[&DocumentRecord]) -> Vec<DomainCount> {
    Domain::ALL
        .iter()
        .map(|&domain| DomainCount {
            domain,
            count: records.iter().filter(|r| r.domain == domain).count() as u64,
        })
        .collect()
}

fn build_timeline(records: &[&DocumentRecord]) -> Vec<TimelineBucket> {
    let mut day_counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        *day_counts.entry(record.created_at.date_naive()).or_default() += 1;
    }

    day_counts
        .into_iter()
        .map(|(day, count)| TimelineBucket {
            date: day.format("%Y-%m-%d").to_string(),
            timestamp: day
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp())
                .unwrap_or(0),
            count,
        })
        .collect()
}
