//! Browser-automation manager
//!
//! Some status pages only populate their content from client-side script,
//! so a raw HTTP fetch returns an empty shell. Those services go through a
//! real browser instead. Spawning a browser process per concurrent request
//! would be resource-prohibitive, so the whole process shares at most one
//! live session:
//!
//! - created lazily on first need
//! - checkout serialized through an async mutex (scoped: the guard drops
//!   on every exit path)
//! - liveness-probed before each use, torn down and respawned when
//!   unhealthy
//! - torn down exactly once at process end via [`BrowserManager::shutdown`]
//!   so the OS-level browser process is not leaked
//!
//! The session API is blocking (CDP automation), so all session work is
//! dispatched through `spawn_blocking` and never stalls the async
//! scheduler driving the HTTP-backed resolvers.

pub mod chrome;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, instrument, warn};

use crate::error::{FetchError, FetchResult};

/// One live dynamic-content session.
///
/// Implemented by [`chrome::ChromeSession`] in production; tests inject
/// fakes through [`BrowserManager::with_factory`].
pub trait DynamicSession: Send {
    /// Load `url`, block until `wait_for` appears (bounded by `timeout`),
    /// click open every element matching each `expand` selector, and
    /// return the fully rendered markup.
    fn render(
        &self,
        url: &str,
        wait_for: &str,
        expand: &[String],
        timeout: Duration,
    ) -> FetchResult<String>;

    /// Lightweight liveness probe, run before each checkout.
    fn is_healthy(&self) -> bool;

    /// Release the underlying handle. Called once, from `shutdown` or
    /// before a respawn.
    fn close(&mut self);
}

/// Creates sessions on demand. Runs on a blocking thread.
pub type SessionFactory = Arc<dyn Fn() -> FetchResult<Box<dyn DynamicSession>> + Send + Sync>;

/// Parameters for one render request
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub url: String,
    pub wait_for: String,
    pub expand: Vec<String>,
    pub timeout: Duration,
}

struct ManagerState {
    session: Option<Box<dyn DynamicSession>>,
    shut_down: bool,
}

/// Lifecycle manager for the shared browser session
pub struct BrowserManager {
    state: Mutex<ManagerState>,
    factory: SessionFactory,
}

impl BrowserManager {
    /// Manager backed by headless Chrome.
    pub fn new() -> Self {
        Self::with_factory(Arc::new(chrome::launch))
    }

    /// Manager with an injected session factory (used by tests).
    pub fn with_factory(factory: SessionFactory) -> Self {
        Self {
            state: Mutex::new(ManagerState {
                session: None,
                shut_down: false,
            }),
            factory,
        }
    }

    /// Render a page through the shared session.
    ///
    /// Concurrent callers serialize on the manager's lock; this is an
    /// intentional bottleneck traded for resource economy. Lock
    /// acquisition doubles as the scoped checkout: the session is
    /// returned (or discarded) before the guard drops.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn render(&self, request: RenderRequest) -> FetchResult<String> {
        let mut state = self.state.lock().await;

        if state.shut_down {
            return Err(FetchError::BrowserUnavailable(
                "manager has been shut down".into(),
            ));
        }

        // Probe before use; an unhealthy session is torn down and
        // respawned instead of surfacing an error.
        let unhealthy = state.session.as_ref().is_some_and(|s| !s.is_healthy());
        if unhealthy {
            warn!("browser session unhealthy, respawning");
            if let Some(mut dead) = state.session.take() {
                let _ = task::spawn_blocking(move || dead.close()).await;
            }
        }

        if state.session.is_none() {
            debug!("spawning browser session");
            let factory = Arc::clone(&self.factory);
            let session = task::spawn_blocking(move || factory())
                .await
                .map_err(|e| FetchError::BrowserUnavailable(format!("spawn task failed: {e}")))??;
            state.session = Some(session);
        }

        // The session moves into the blocking task and back out, so a
        // panicked render drops it and the next call respawns.
        let session = state
            .session
            .take()
            .expect("session present after lazy spawn");
        let RenderRequest {
            url,
            wait_for,
            expand,
            timeout,
        } = request;

        let outcome = task::spawn_blocking(move || {
            let result = session.render(&url, &wait_for, &expand, timeout);
            (session, result)
        })
        .await;

        match outcome {
            Ok((session, result)) => {
                state.session = Some(session);
                result
            }
            Err(e) => Err(FetchError::BrowserUnavailable(format!(
                "render task failed: {e}"
            ))),
        }
    }

    /// Tear down the shared session. Idempotent; safe to call when no
    /// session was ever created. All renders after this fail with
    /// `BrowserUnavailable`.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        state.shut_down = true;

        if let Some(mut session) = state.session.take() {
            debug!("closing browser session");
            let _ = task::spawn_blocking(move || session.close()).await;
        }
    }
}

impl Default for BrowserManager {
    fn default() -> Self {
        Self::new()
    }
}
