//! Service configuration
//!
//! A `ServiceSpec` fully describes one monitored service: which fetch
//! backend it needs, where its evidence lives, and which matching rule to
//! interpret over the fetched content. Resolvers are generic interpreters
//! of rule shape + parameters; adding a service is a configuration change,
//! not a code change.

use std::time::Duration;

use serde::Deserialize;
use tracing::trace;

use crate::ServiceCategory;

/// Which fetch backend a service requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchKind {
    /// Plain HTTP fetch of a feed or static page
    Http,

    /// Browser-rendered page (content populated by client-side script)
    Browser,
}

/// The closed set of matching rule shapes
///
/// All phrase matching is case-insensitive substring matching against
/// lower-cased text; surrounding text is tolerated.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum Rule {
    /// Parse as RSS/Atom; the newest entry's text must contain `phrase`
    /// for the service to count as operational.
    FeedLatestContains { phrase: String },

    /// Parse as RSS/Atom; absence of incident entries implies health, any
    /// entry at all implies disruption.
    FeedPresenceInverted,

    /// Parse as HTML; operational when any element matching `selector`
    /// has text containing `phrase`.
    MarkupContains { selector: String, phrase: String },

    /// Like `FeedLatestContains` but conjunctive: the positive phrase
    /// (when configured) must be present and none of the forbidden
    /// phrases may appear.
    CompoundContains {
        #[serde(default)]
        phrase: Option<String>,
        #[serde(default)]
        forbidden: Vec<String>,
    },
}

/// Browser rendering parameters for a `FetchKind::Browser` service
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserPage {
    /// Element that must appear before the page counts as rendered
    pub wait_for: String,

    /// Collapsible elements to click open before extracting markup
    #[serde(default)]
    pub expand: Vec<String>,
}

/// Static per-service configuration, immutable for the process's life
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSpec {
    /// Unique among configured services
    pub name: String,

    pub category: ServiceCategory,

    pub fetch: FetchKind,

    /// URL actually fetched (feed endpoint or page)
    pub url: String,

    /// Human-facing status page linked on the card, when it differs from
    /// the fetched URL
    pub status_page: Option<String>,

    pub rule: Rule,

    /// Hard per-check timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,

    /// Required when `fetch` is `browser`
    pub browser: Option<BrowserPage>,
}

impl ServiceSpec {
    /// The canonical URL reported as evidence on the status card.
    pub fn evidence_url(&self) -> &str {
        self.status_page.as_deref().unwrap_or(&self.url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub services: Vec<ServiceSpec>,
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config: &Config| trace!("loaded config: {config:?}"))
}

/// The built-in service set, used when no config file is given.
///
/// The phrases and selectors mirror what each provider's status page
/// actually publishes. They are best-effort keyword heuristics: a
/// presence-inverted or latest-entry rule can misreport a recently
/// resolved incident as ongoing.
pub fn builtin_specs() -> Vec<ServiceSpec> {
    vec![
        ServiceSpec {
            name: "OpenAI API".into(),
            category: ServiceCategory::LlmApi,
            fetch: FetchKind::Http,
            url: "https://status.openai.com/feed.rss".into(),
            status_page: Some("https://status.openai.com".into()),
            rule: Rule::FeedLatestContains {
                phrase: "all impacted services have now fully recovered".into(),
            },
            timeout: default_timeout_secs(),
            browser: None,
        },
        ServiceSpec {
            name: "DeepSeek API".into(),
            category: ServiceCategory::LlmApi,
            fetch: FetchKind::Http,
            url: "https://status.deepseek.com/history.atom".into(),
            status_page: Some("https://status.deepseek.com".into()),
            rule: Rule::FeedLatestContains {
                phrase: "[resolved]".into(),
            },
            timeout: default_timeout_secs(),
            browser: None,
        },
        ServiceSpec {
            name: "LangSmith US".into(),
            category: ServiceCategory::LlmApi,
            fetch: FetchKind::Http,
            url: "https://status.smith.langchain.com/feed.rss".into(),
            status_page: Some("https://status.smith.langchain.com".into()),
            rule: Rule::CompoundContains {
                phrase: None,
                forbidden: vec![
                    "elevated".into(),
                    "degrad".into(),
                    "latency".into(),
                    "outage".into(),
                    "failing".into(),
                ],
            },
            timeout: default_timeout_secs(),
            browser: None,
        },
        ServiceSpec {
            name: "Perplexity API".into(),
            category: ServiceCategory::LlmApi,
            fetch: FetchKind::Http,
            url: "https://status.perplexity.com/history.rss".into(),
            status_page: Some("https://status.perplexity.com".into()),
            rule: Rule::CompoundContains {
                phrase: Some("resolved".into()),
                forbidden: vec!["api outage".into()],
            },
            timeout: default_timeout_secs(),
            browser: None,
        },
        ServiceSpec {
            name: "Anthropic API".into(),
            category: ServiceCategory::LlmApi,
            fetch: FetchKind::Http,
            url: "https://status.anthropic.com/history.rss".into(),
            status_page: Some("https://status.anthropic.com".into()),
            rule: Rule::FeedLatestContains {
                phrase: "resolved".into(),
            },
            timeout: default_timeout_secs(),
            browser: None,
        },
        ServiceSpec {
            name: "Google AI Studio and Gemini API".into(),
            category: ServiceCategory::LlmApi,
            fetch: FetchKind::Browser,
            url: "https://aistudio.google.com/status".into(),
            status_page: None,
            rule: Rule::MarkupContains {
                selector: "ms-status-daily-log".into(),
                phrase: "unavailable".into(),
            },
            timeout: 20,
            browser: Some(BrowserPage {
                wait_for: "ms-status-daily-log".into(),
                expand: vec![],
            }),
        },
        ServiceSpec {
            name: "Google Cloud Platform".into(),
            category: ServiceCategory::CloudProvider,
            fetch: FetchKind::Http,
            url: "https://status.cloud.google.com/en/feed.atom".into(),
            status_page: Some("https://status.cloud.google.com".into()),
            rule: Rule::FeedLatestContains {
                phrase: "resolved:".into(),
            },
            timeout: default_timeout_secs(),
            browser: None,
        },
        ServiceSpec {
            name: "Microsoft Azure".into(),
            category: ServiceCategory::CloudProvider,
            fetch: FetchKind::Http,
            url: "https://rssfeed.azure.status.microsoft/en-us/status/feed/".into(),
            status_page: Some("https://status.azure.com".into()),
            rule: Rule::FeedPresenceInverted,
            timeout: default_timeout_secs(),
            browser: None,
        },
        ServiceSpec {
            name: "Amazon Web Services".into(),
            category: ServiceCategory::CloudProvider,
            fetch: FetchKind::Http,
            url: "https://health.aws.amazon.com/health/status".into(),
            status_page: None,
            rule: Rule::MarkupContains {
                selector: "div.event-state div.no-events".into(),
                phrase: "no recent".into(),
            },
            timeout: default_timeout_secs(),
            browser: None,
        },
    ]
}
