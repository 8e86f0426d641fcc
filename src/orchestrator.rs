//! Concurrent orchestrator
//!
//! Fans out every resolver invocation as its own tokio task and collects
//! the results independently, so one slow or failing resolver cannot
//! delay or fail another. Each resolver bounds its own fetch with a
//! timeout, so a whole cycle completes within the slowest single
//! per-resolver timeout rather than the sum of all of them.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::browser::BrowserManager;
use crate::config::ServiceSpec;
use crate::fetch::HttpFetcher;
use crate::resolve::Resolver;
use crate::{Snapshot, StatusRecord};

pub struct Orchestrator {
    resolver: Arc<Resolver>,
    browser: Arc<BrowserManager>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::with_parts(HttpFetcher::new(), Arc::new(BrowserManager::new()))
    }

    /// Assemble from injected backends (tests swap in low-retry fetchers
    /// and fake browser factories).
    pub fn with_parts(http: HttpFetcher, browser: Arc<BrowserManager>) -> Self {
        Self {
            resolver: Arc::new(Resolver::new(http, Arc::clone(&browser))),
            browser,
        }
    }

    /// Check every spec concurrently.
    ///
    /// Returns exactly one record per spec, even on total failure: a
    /// panicked resolver task degrades to `Unknown` for its spec. Result
    /// ordering is not guaranteed to match input ordering; consumers key
    /// by service name.
    #[instrument(skip_all, fields(services = specs.len()))]
    pub async fn run_all(&self, specs: &[ServiceSpec]) -> Vec<StatusRecord> {
        debug!("starting check cycle");

        let tasks: Vec<(ServiceSpec, JoinHandle<StatusRecord>)> = specs
            .iter()
            .map(|spec| {
                let resolver = Arc::clone(&self.resolver);
                let spec = spec.clone();
                let task_spec = spec.clone();
                let handle = tokio::spawn(async move { resolver.resolve(&task_spec).await });
                (spec, handle)
            })
            .collect();

        let mut records = Vec::with_capacity(tasks.len());
        for (spec, handle) in tasks {
            match handle.await {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!("resolver task for {} failed: {e}", spec.name);
                    records.push(StatusRecord::unknown(&spec, "resolver task failed"));
                }
            }
        }

        debug!("check cycle complete");
        records
    }

    /// One full cycle wrapped with its generation timestamp.
    pub async fn run_snapshot(&self, specs: &[ServiceSpec]) -> Snapshot {
        Snapshot::new(self.run_all(specs).await)
    }

    /// Tear down shared resources. Idempotent; must run once at process
    /// end on both normal and error exit paths.
    pub async fn shutdown(&self) {
        self.browser.shutdown().await;
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
