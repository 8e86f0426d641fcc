//! Feed-backed rule shapes
//!
//! Most providers publish incident history as an RSS or Atom feed with the
//! newest entry first. The text searched is the newest entry's title,
//! summary and content body combined, lower-cased.

use feed_rs::model::{Entry, Feed};
use feed_rs::parser;

use crate::error::ParseError;
use crate::{ServiceStatus, resolve::Resolution};

use super::{contains_phrase, truncate_detail};

fn parse(content: &str) -> Result<Feed, ParseError> {
    parser::parse(content.as_bytes()).map_err(|e| ParseError::Malformed(e.to_string()))
}

/// Searchable view of one feed entry
struct EntryText {
    /// Entry title
    title: Option<String>,

    /// Description: the summary or, failing that, the content body
    description: Option<String>,

    /// Title + summary + content body, lower-cased
    text: String,

    /// Link to the incident report, when the feed exposes one
    link: Option<String>,
}

impl EntryText {
    fn from(entry: &Entry) -> Self {
        let title = entry.title.as_ref().map(|t| t.content.clone());
        let summary = entry.summary.as_ref().map(|s| s.content.clone());
        let body = entry.content.as_ref().and_then(|c| c.body.clone());

        let mut text = String::new();
        if let Some(t) = &title {
            text.push_str(t);
            text.push('\n');
        }
        if let Some(s) = &summary {
            text.push_str(s);
            text.push('\n');
        }
        if let Some(b) = &body {
            text.push_str(b);
        }

        let link = entry.links.first().map(|l| l.href.clone());

        Self {
            title,
            description: summary.or(body),
            text: text.to_lowercase(),
            link,
        }
    }

    /// What the card shows: the incident description capped at display
    /// length, falling back to the title for description-less entries.
    fn detail(&self) -> Option<String> {
        self.description
            .as_deref()
            .or(self.title.as_deref())
            .map(truncate_detail)
    }
}

fn latest_entry(feed: &Feed) -> Result<EntryText, ParseError> {
    feed.entries
        .first()
        .map(EntryText::from)
        .ok_or(ParseError::EmptyFeed)
}

/// feed-latest-contains: the newest entry must contain the positive
/// phrase for the service to count as operational.
pub(crate) fn latest_contains(content: &str, phrase: &str) -> Result<Resolution, ParseError> {
    let entry = latest_entry(&parse(content)?)?;

    let status = if contains_phrase(&entry.text, phrase) {
        ServiceStatus::Operational
    } else {
        ServiceStatus::Disrupted
    };

    Ok(Resolution {
        status,
        detail: entry.detail(),
        issue_url: entry.link,
    })
}

/// feed-presence-inverted: absence of incident entries implies health.
///
/// Known limitation, preserved on purpose: this does not distinguish
/// resolved-historical entries from active incidents, so a recently
/// resolved incident still reports as disrupted while it stays in the
/// feed.
pub(crate) fn presence_inverted(content: &str) -> Result<Resolution, ParseError> {
    let feed = parse(content)?;

    match feed.entries.first() {
        None => Ok(Resolution {
            status: ServiceStatus::Operational,
            detail: None,
            issue_url: None,
        }),
        Some(entry) => {
            let entry = EntryText::from(entry);
            Ok(Resolution {
                status: ServiceStatus::Disrupted,
                detail: entry.detail(),
                issue_url: entry.link,
            })
        }
    }
}

/// compound-contains: operational only when the positive phrase (if any)
/// is present and no forbidden phrase appears. A forbidden hit overrides
/// the positive match.
pub(crate) fn compound_contains(
    content: &str,
    phrase: Option<&str>,
    forbidden: &[String],
) -> Result<Resolution, ParseError> {
    let entry = latest_entry(&parse(content)?)?;

    let positive_ok = phrase.is_none_or(|p| contains_phrase(&entry.text, p));
    let negative_hit = forbidden.iter().any(|p| contains_phrase(&entry.text, p));

    let status = if positive_ok && !negative_hit {
        ServiceStatus::Operational
    } else {
        ServiceStatus::Disrupted
    };

    Ok(Resolution {
        status,
        detail: entry.detail(),
        issue_url: entry.link,
    })
}
