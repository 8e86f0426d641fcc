//! Concurrency guarantees: resolvers run in parallel, cycle time is
//! bounded by the slowest single resolver, and browser-backed resolvers
//! share exactly one session.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use status_dashboard::ServiceStatus;
use status_dashboard::browser::BrowserManager;
use status_dashboard::config::Rule;
use status_dashboard::fetch::HttpFetcher;
use status_dashboard::orchestrator::Orchestrator;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::*;

#[tokio::test]
async fn slow_resolvers_time_out_independently_and_in_parallel() {
    let server = MockServer::start().await;

    // Each route hangs well past the per-service timeout
    for route in ["/a.rss", "/b.rss", "/c.rss"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(20)))
            .mount(&server)
            .await;
    }

    let mut specs = vec![];
    for (name, route) in [("A", "/a.rss"), ("B", "/b.rss"), ("C", "/c.rss")] {
        let mut spec = http_spec(
            name,
            format!("{}{route}", server.uri()),
            Rule::FeedPresenceInverted,
        );
        spec.timeout = 1;
        specs.push(spec);
    }

    let orchestrator = Orchestrator::with_parts(
        HttpFetcher::with_retries(0),
        Arc::new(BrowserManager::with_factory(failing_browser_factory())),
    );

    let start = Instant::now();
    let records = orchestrator.run_all(&specs).await;
    let elapsed = start.elapsed();

    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.status, ServiceStatus::Unknown);
    }

    // Bounded by the max single timeout (1s each), not the sum (3s)
    assert!(
        elapsed < Duration::from_secs(3),
        "cycle took {elapsed:?}, resolvers did not run concurrently"
    );
}

#[tokio::test]
async fn fast_resolver_is_not_delayed_by_slow_sibling() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow.rss"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(20)))
        .mount(&server)
        .await;
    mount_body(&server, "/fast.rss", rss_feed("")).await;

    let mut slow = http_spec(
        "Slow",
        format!("{}/slow.rss", server.uri()),
        Rule::FeedPresenceInverted,
    );
    slow.timeout = 1;
    let fast = http_spec(
        "Fast",
        format!("{}/fast.rss", server.uri()),
        Rule::FeedPresenceInverted,
    );

    let orchestrator = Orchestrator::with_parts(
        HttpFetcher::with_retries(0),
        Arc::new(BrowserManager::with_factory(failing_browser_factory())),
    );

    let records = orchestrator.run_all(&[slow, fast]).await;

    let fast = records.iter().find(|r| r.service_name == "Fast").unwrap();
    assert_eq!(fast.status, ServiceStatus::Operational);

    let slow = records.iter().find(|r| r.service_name == "Slow").unwrap();
    assert_eq!(slow.status, ServiceStatus::Unknown);
}

#[tokio::test]
async fn concurrent_browser_resolvers_share_one_session() {
    let launches = Arc::new(AtomicUsize::new(0));
    let manager = BrowserManager::with_factory(fake_browser_factory(
        r#"<html><body><div class="status">operational</div></body></html>"#,
        Arc::clone(&launches),
    ));

    let orchestrator = Orchestrator::with_parts(HttpFetcher::new(), Arc::new(manager));

    let rule = || Rule::MarkupContains {
        selector: "div.status".into(),
        phrase: "operational".into(),
    };
    let specs = vec![
        browser_spec("Browser One", rule()),
        browser_spec("Browser Two", rule()),
        browser_spec("Browser Three", rule()),
    ];

    let records = orchestrator.run_all(&specs).await;
    orchestrator.shutdown().await;

    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.status, ServiceStatus::Operational);
    }

    assert_eq!(
        launches.load(Ordering::SeqCst),
        1,
        "concurrent browser resolvers must not spawn duplicate sessions"
    );
}

#[tokio::test]
async fn orchestrator_shutdown_is_idempotent() {
    let orchestrator = Orchestrator::with_parts(
        HttpFetcher::new(),
        Arc::new(BrowserManager::with_factory(fake_browser_factory(
            "<html></html>",
            Arc::new(AtomicUsize::new(0)),
        ))),
    );

    // No browser session was ever created; both calls must be no-ops
    orchestrator.shutdown().await;
    orchestrator.shutdown().await;
}
