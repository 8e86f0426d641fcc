//! Markup-backed rule shape
//!
//! Some providers expose no feed at all, only a status page (static HTML
//! or browser-rendered). The markup-contains shape searches elements
//! matching a structural CSS selector for a positive phrase.

use scraper::{Html, Selector};

use crate::error::ParseError;
use crate::{ServiceStatus, resolve::Resolution};

use super::{contains_phrase, truncate_detail};

/// markup-contains: operational when any element matching `selector` has
/// text containing `phrase`. A selector that matches nothing yields
/// `SelectorNotFound` (Unknown downstream), not a disruption.
pub(crate) fn contains(
    content: &str,
    selector: &str,
    phrase: &str,
) -> Result<Resolution, ParseError> {
    let parsed = Selector::parse(selector)
        .map_err(|e| ParseError::Malformed(format!("invalid selector `{selector}`: {e}")))?;

    let document = Html::parse_document(content);

    let mut first_text: Option<String> = None;
    let mut matched_any = false;

    for element in document.select(&parsed) {
        matched_any = true;

        let text = element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if first_text.is_none() && !text.is_empty() {
            first_text = Some(truncate_detail(&text));
        }

        if contains_phrase(&text.to_lowercase(), phrase) {
            return Ok(Resolution {
                status: ServiceStatus::Operational,
                detail: Some(truncate_detail(&text)),
                issue_url: None,
            });
        }
    }

    if !matched_any {
        return Err(ParseError::SelectorNotFound(selector.to_string()));
    }

    Ok(Resolution {
        status: ServiceStatus::Disrupted,
        detail: first_text,
        issue_url: None,
    })
}
