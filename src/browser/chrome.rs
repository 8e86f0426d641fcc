//! Headless Chrome session
//!
//! Production implementation of [`DynamicSession`] on top of
//! `headless_chrome` (Chrome DevTools Protocol). The whole API is
//! blocking; the manager dispatches it through `spawn_blocking`.

use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, trace};

use crate::error::{FetchError, FetchResult};

use super::DynamicSession;

/// Keep the idle browser alive between refresh cycles.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

pub struct ChromeSession {
    browser: Browser,
}

/// Launch a headless Chrome process and wrap it as a session.
pub fn launch() -> FetchResult<Box<dyn DynamicSession>> {
    debug!("launching headless chrome");

    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
        .build()
        .map_err(|e| FetchError::BrowserUnavailable(e.to_string()))?;

    let browser =
        Browser::new(options).map_err(|e| FetchError::BrowserUnavailable(e.to_string()))?;

    Ok(Box::new(ChromeSession { browser }))
}

impl DynamicSession for ChromeSession {
    fn render(
        &self,
        url: &str,
        wait_for: &str,
        expand: &[String],
        timeout: Duration,
    ) -> FetchResult<String> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| FetchError::BrowserUnavailable(format!("failed to open tab: {e}")))?;

        tab.set_default_timeout(timeout);

        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| FetchError::RenderTimeout(format!("navigation to {url} failed: {e}")))?;

        tab.wait_for_element(wait_for).map_err(|e| {
            FetchError::RenderTimeout(format!("element `{wait_for}` never appeared: {e}"))
        })?;

        // Reveal collapsed incident details before extracting markup. A
        // selector that matches nothing is fine; a failed click on one
        // element must not abort the whole render.
        for selector in expand {
            if let Ok(elements) = tab.find_elements(selector) {
                trace!("expanding {} elements for `{selector}`", elements.len());
                for element in elements {
                    let _ = element.click();
                }
            }
        }

        let html = tab
            .get_content()
            .map_err(|e| FetchError::RenderTimeout(format!("failed to extract markup: {e}")))?;

        let _ = tab.close(true);

        Ok(html)
    }

    fn is_healthy(&self) -> bool {
        // Handle-validity probe over the CDP connection
        self.browser.get_version().is_ok()
    }

    fn close(&mut self) {
        // The child process is reaped when the last Browser handle drops;
        // this session holds the only one.
        debug!("closing headless chrome");
    }
}
