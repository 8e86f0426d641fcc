//! End-to-end cycles over mocked sources: one record per spec, statuses
//! resolved per rule shape, invariants on detail/issue_url.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use pretty_assertions::assert_eq;
use status_dashboard::browser::BrowserManager;
use status_dashboard::config::Rule;
use status_dashboard::fetch::HttpFetcher;
use status_dashboard::orchestrator::Orchestrator;
use status_dashboard::{ServiceCategory, ServiceStatus};
use wiremock::MockServer;

use super::helpers::*;

#[tokio::test]
async fn run_all_yields_exactly_one_record_per_spec() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        "/recovered.rss",
        rss_feed(&rss_item("Incident", "All impacted services have now fully recovered.")),
    )
    .await;
    mount_body(
        &server,
        "/ongoing.rss",
        rss_feed(&rss_item("Incident", "We are investigating elevated errors.")),
    )
    .await;
    mount_body(&server, "/quiet.rss", rss_feed("")).await;
    mount_body(
        &server,
        "/health.html",
        r#"<html><body><div class="event-state"><div class="no-events">No recent issues</div></div></body></html>"#.to_string(),
    )
    .await;

    let specs = vec![
        http_spec(
            "Recovered API",
            format!("{}/recovered.rss", server.uri()),
            Rule::FeedLatestContains {
                phrase: "all impacted services have now fully recovered".into(),
            },
        ),
        http_spec(
            "Ongoing API",
            format!("{}/ongoing.rss", server.uri()),
            Rule::FeedLatestContains {
                phrase: "all impacted services have now fully recovered".into(),
            },
        ),
        http_spec(
            "Quiet Cloud",
            format!("{}/quiet.rss", server.uri()),
            Rule::FeedPresenceInverted,
        ),
        http_spec(
            "Scraped Cloud",
            format!("{}/health.html", server.uri()),
            Rule::MarkupContains {
                selector: "div.event-state div.no-events".into(),
                phrase: "no recent".into(),
            },
        ),
    ];

    let orchestrator = Orchestrator::new();
    let records = orchestrator.run_all(&specs).await;
    orchestrator.shutdown().await;

    assert_eq!(records.len(), specs.len());
    let names: HashSet<_> = records.iter().map(|r| r.service_name.as_str()).collect();
    assert_eq!(names.len(), specs.len(), "no duplicates, no omissions");

    let by_name = |name: &str| records.iter().find(|r| r.service_name == name).unwrap();

    assert_eq!(by_name("Recovered API").status, ServiceStatus::Operational);
    assert_eq!(by_name("Ongoing API").status, ServiceStatus::Disrupted);
    assert_eq!(by_name("Quiet Cloud").status, ServiceStatus::Operational);
    assert_eq!(by_name("Scraped Cloud").status, ServiceStatus::Operational);
}

#[tokio::test]
async fn issue_url_only_on_disrupted_records() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        "/ok.rss",
        rss_feed(&rss_item("Incident", "Everything resolved.")),
    )
    .await;
    mount_body(
        &server,
        "/bad.rss",
        rss_feed(&rss_item("Ongoing incident", "Still investigating.")),
    )
    .await;

    let specs = vec![
        http_spec(
            "Healthy",
            format!("{}/ok.rss", server.uri()),
            Rule::FeedLatestContains {
                phrase: "resolved".into(),
            },
        ),
        http_spec(
            "Broken",
            format!("{}/bad.rss", server.uri()),
            Rule::FeedLatestContains {
                phrase: "resolved".into(),
            },
        ),
    ];

    let orchestrator = Orchestrator::new();
    let records = orchestrator.run_all(&specs).await;
    orchestrator.shutdown().await;

    let healthy = records.iter().find(|r| r.service_name == "Healthy").unwrap();
    assert_eq!(healthy.status, ServiceStatus::Operational);
    assert_eq!(healthy.issue_url, None);
    assert_eq!(healthy.detail.as_deref(), Some("Everything resolved."));

    let broken = records.iter().find(|r| r.service_name == "Broken").unwrap();
    assert_eq!(broken.status, ServiceStatus::Disrupted);
    assert_eq!(
        broken.issue_url.as_deref(),
        Some("https://status.example.com/incidents/1")
    );
}

#[tokio::test]
async fn compound_rule_negative_overrides_positive_end_to_end() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        "/history.rss",
        rss_feed(&rss_item(
            "API outage",
            "The API outage has been resolved for all customers.",
        )),
    )
    .await;

    let specs = vec![http_spec(
        "Perplexity-like",
        format!("{}/history.rss", server.uri()),
        Rule::CompoundContains {
            phrase: Some("resolved".into()),
            forbidden: vec!["api outage".into()],
        },
    )];

    let orchestrator = Orchestrator::new();
    let records = orchestrator.run_all(&specs).await;
    orchestrator.shutdown().await;

    assert_eq!(records[0].status, ServiceStatus::Disrupted);
}

#[tokio::test]
async fn browser_backed_spec_resolves_through_rendered_markup() {
    let launches = Arc::new(AtomicUsize::new(0));
    let manager = BrowserManager::with_factory(fake_browser_factory(
        r#"<html><body><div class="status">All models operational</div></body></html>"#,
        Arc::clone(&launches),
    ));

    let orchestrator = Orchestrator::with_parts(HttpFetcher::new(), Arc::new(manager));

    let specs = vec![browser_spec(
        "Rendered Status",
        Rule::MarkupContains {
            selector: "div.status".into(),
            phrase: "operational".into(),
        },
    )];

    let records = orchestrator.run_all(&specs).await;
    orchestrator.shutdown().await;

    assert_eq!(records[0].status, ServiceStatus::Operational);
    assert_eq!(records[0].category, ServiceCategory::CloudProvider);
}

#[tokio::test]
async fn snapshot_counts_per_category() {
    let server = MockServer::start().await;
    mount_body(&server, "/quiet.rss", rss_feed("")).await;

    let mut llm = http_spec(
        "Some API",
        format!("{}/quiet.rss", server.uri()),
        Rule::FeedPresenceInverted,
    );
    llm.category = ServiceCategory::LlmApi;

    let mut cloud = http_spec(
        "Some Cloud",
        format!("{}/quiet.rss", server.uri()),
        Rule::FeedPresenceInverted,
    );
    cloud.category = ServiceCategory::CloudProvider;

    let orchestrator = Orchestrator::new();
    let snapshot = orchestrator.run_snapshot(&[llm, cloud]).await;
    orchestrator.shutdown().await;

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.operational_count(ServiceCategory::LlmApi), 1);
    assert_eq!(snapshot.operational_count(ServiceCategory::CloudProvider), 1);
    assert!(snapshot.get("Some API").is_some());
    assert!(snapshot.get("Nonexistent").is_none());
}
