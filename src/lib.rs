pub mod browser;
pub mod config;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod resolve;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ServiceSpec;

/// Normalized status of a monitored service.
///
/// `Unknown` is returned whenever the fetch fails, parsing fails, or no
/// matching rule fires. It is never inferred as `Operational` or
/// `Disrupted` by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Operational,
    Disrupted,
    Unknown,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Operational => write!(f, "Operational"),
            ServiceStatus::Disrupted => write!(f, "Disrupted"),
            ServiceStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    LlmApi,
    CloudProvider,
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceCategory::LlmApi => write!(f, "LLM API"),
            ServiceCategory::CloudProvider => write!(f, "Cloud Provider"),
        }
    }
}

/// The unit of output per service, one per orchestration cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Unique service identifier (from the spec)
    pub service_name: String,

    pub category: ServiceCategory,

    pub status: ServiceStatus,

    /// Canonical status-page/feed URL used as evidence
    pub source_url: String,

    /// When the check ran (process clock, not the source's own timestamp)
    pub checked_at: DateTime<Utc>,

    /// Free text extracted from the source (latest incident title, or the
    /// failure class on Unknown)
    pub detail: Option<String>,

    /// Direct link to an incident report; only set for Disrupted results
    pub issue_url: Option<String>,
}

impl StatusRecord {
    /// Degraded record for a spec whose fetch or parse failed.
    pub fn unknown(spec: &ServiceSpec, detail: impl Into<String>) -> Self {
        Self {
            service_name: spec.name.clone(),
            category: spec.category,
            status: ServiceStatus::Unknown,
            source_url: spec.evidence_url().to_string(),
            checked_at: Utc::now(),
            detail: Some(detail.into()),
            issue_url: None,
        }
    }
}

/// One complete orchestration cycle's output.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub records: Vec<StatusRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<StatusRecord>) -> Self {
        Self {
            generated_at: Utc::now(),
            records,
        }
    }

    /// Look up a record by service name. Record order within a snapshot is
    /// unspecified, so consumers key by name.
    pub fn get(&self, service_name: &str) -> Option<&StatusRecord> {
        self.records
            .iter()
            .find(|r| r.service_name == service_name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn operational_count(&self, category: ServiceCategory) -> usize {
        self.records
            .iter()
            .filter(|r| r.category == category && r.status == ServiceStatus::Operational)
            .count()
    }

    pub fn category_count(&self, category: ServiceCategory) -> usize {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .count()
    }
}
