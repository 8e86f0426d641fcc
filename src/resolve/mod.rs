//! Status resolvers
//!
//! A resolver maps one `ServiceSpec` to one `StatusRecord`: fetch the
//! configured source through the required backend, interpret the fetched
//! content against the spec's rule shape, and normalize the result. The
//! failure policy is uniform: any fetch or parse error is folded into a
//! record with status `Unknown` here, in one place: resolvers never
//! propagate errors to the orchestrator.

pub mod feed;
pub mod markup;

use std::sync::Arc;

use chrono::Utc;
use tracing::{instrument, trace, warn};

use crate::browser::{BrowserManager, RenderRequest};
use crate::config::{FetchKind, Rule, ServiceSpec};
use crate::error::{FetchError, ParseError, ResolveError};
use crate::fetch::HttpFetcher;
use crate::{ServiceStatus, StatusRecord};

/// Longest `detail` text carried on a record
const DETAIL_MAX_CHARS: usize = 200;

/// What a rule concluded from fetched content, before it is stamped into
/// a `StatusRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: ServiceStatus,
    pub detail: Option<String>,
    pub issue_url: Option<String>,
}

/// Interpret a rule shape over fetched content.
///
/// This is the whole heuristic core: a closed set of parametrized shapes
/// applied uniformly, regardless of which service supplied the parameters.
pub fn apply_rule(rule: &Rule, content: &str) -> Result<Resolution, ParseError> {
    match rule {
        Rule::FeedLatestContains { phrase } => feed::latest_contains(content, phrase),
        Rule::FeedPresenceInverted => feed::presence_inverted(content),
        Rule::MarkupContains { selector, phrase } => markup::contains(content, selector, phrase),
        Rule::CompoundContains { phrase, forbidden } => {
            feed::compound_contains(content, phrase.as_deref(), forbidden)
        }
    }
}

/// Case-insensitive substring match; tolerates surrounding text.
pub(crate) fn contains_phrase(text_lower: &str, phrase: &str) -> bool {
    text_lower.contains(&phrase.to_lowercase())
}

/// Cap free text pulled from a source, the way the dashboard displays it.
pub(crate) fn truncate_detail(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= DETAIL_MAX_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(DETAIL_MAX_CHARS).collect();
        format!("{cut}...")
    }
}

/// Resolves service specs into status records
pub struct Resolver {
    http: HttpFetcher,
    browser: Arc<BrowserManager>,
}

impl Resolver {
    pub fn new(http: HttpFetcher, browser: Arc<BrowserManager>) -> Self {
        Self { http, browser }
    }

    /// Check one service. Infallible by construction: every error becomes
    /// an `Unknown` record whose detail names the failure class.
    #[instrument(skip_all, fields(service = %spec.name))]
    pub async fn resolve(&self, spec: &ServiceSpec) -> StatusRecord {
        match self.resolve_inner(spec).await {
            Ok(resolution) => {
                trace!("resolved to {}", resolution.status);
                StatusRecord {
                    service_name: spec.name.clone(),
                    category: spec.category,
                    status: resolution.status,
                    source_url: spec.evidence_url().to_string(),
                    checked_at: Utc::now(),
                    detail: resolution.detail,
                    issue_url: if resolution.status == ServiceStatus::Disrupted {
                        resolution.issue_url
                    } else {
                        None
                    },
                }
            }
            Err(err) => {
                warn!("check failed: {err}");
                StatusRecord::unknown(spec, err.to_string())
            }
        }
    }

    async fn resolve_inner(&self, spec: &ServiceSpec) -> Result<Resolution, ResolveError> {
        let content = self.fetch(spec).await?;
        let resolution = apply_rule(&spec.rule, &content)?;
        Ok(resolution)
    }

    async fn fetch(&self, spec: &ServiceSpec) -> Result<String, FetchError> {
        match spec.fetch {
            FetchKind::Http => self.http.fetch(&spec.url, spec.timeout()).await,
            FetchKind::Browser => {
                let page = spec.browser.as_ref().ok_or_else(|| {
                    FetchError::BrowserUnavailable(format!(
                        "service {} requires a browser but has no page settings",
                        spec.name
                    ))
                })?;

                self.browser
                    .render(RenderRequest {
                        url: spec.url.clone(),
                        wait_for: page.wait_for.clone(),
                        expand: page.expand.clone(),
                        timeout: spec.timeout(),
                    })
                    .await
            }
        }
    }
}
