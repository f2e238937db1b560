//! Session ownership that closes the browser on every exit path.

use tracing::{debug, warn};

use super::traits::BrowserSession;

/// Owns a browser session and makes sure it is closed.
///
/// Call [`SessionGuard::close`] on the normal path. If the guard is dropped
/// instead (a panic unwinding through the pipeline, or the future being
/// cancelled), the close is spawned onto the current runtime.
pub struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// The guarded session.
    pub fn session(&self) -> &dyn BrowserSession {
        match &self.session {
            Some(session) => session.as_ref(),
            None => unreachable!("session is only taken by close or drop"),
        }
    }

    /// Closes the session, logging rather than failing on error.
    pub async fn close(mut self) {
        if let Some(session) = self.session.take() {
            close_logged(session).await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Browser session dropped without close, closing in background");
                handle.spawn(close_logged(session));
            }
            Err(_) => warn!("Browser session dropped outside a runtime and left open"),
        }
    }
}

async fn close_logged(session: Box<dyn BrowserSession>) {
    if let Err(e) = session.close().await {
        warn!(error = %e, "Failed to close browser session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserDriver;
    use crate::testing::MockBrowser;

    async fn closed_eventually(browser: &MockBrowser) -> usize {
        for _ in 0..50 {
            if browser.sessions_closed().await > 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        browser.sessions_closed().await
    }

    #[tokio::test]
    async fn test_close_closes_once() {
        let browser = MockBrowser::new();
        let guard = SessionGuard::new(browser.open_session().await.unwrap());

        guard.session().navigate("https://example.com").await.unwrap();
        guard.close().await;

        assert_eq!(closed_eventually(&browser).await, 1);
        assert_eq!(browser.navigations().await, vec!["https://example.com"]);
    }

    #[tokio::test]
    async fn test_panic_still_closes_session() {
        let browser = MockBrowser::new();
        let guard = SessionGuard::new(browser.open_session().await.unwrap());

        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("page script failed");
        });
        assert!(handle.await.unwrap_err().is_panic());

        assert_eq!(closed_eventually(&browser).await, 1);
    }
}
