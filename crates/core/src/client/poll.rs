use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::{ClientError, TravelApiClient};
use crate::task::TaskState;

/// How a task is polled until it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between status checks.
    pub interval: Duration,
    /// Overall deadline. `None` polls until the task finishes.
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: None,
        }
    }
}

impl PollOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl TravelApiClient {
    /// Polls a task until it completes, fails, times out, or `cancel`
    /// resolves.
    ///
    /// Network errors end polling at once; they are not retried.
    pub async fn poll<C>(
        &self,
        task_id: &str,
        options: &PollOptions,
        cancel: C,
    ) -> Result<Value, ClientError>
    where
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let deadline = options.timeout.map(|t| Instant::now() + t);
        let expired = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);

        let timed_out = || ClientError::Timeout(options.timeout.unwrap_or_default());

        loop {
            let state = tokio::select! {
                biased;
                _ = &mut cancel => return Err(ClientError::Cancelled),
                _ = &mut expired => return Err(timed_out()),
                state = self.task_status(task_id) => state?,
            };

            match state {
                TaskState::Completed { data } => return Ok(data),
                TaskState::Failed { error } => return Err(ClientError::TaskFailed(error)),
                other => debug!(task_id, status = other.state_type(), "Task still running"),
            }

            tokio::select! {
                biased;
                _ = &mut cancel => return Err(ClientError::Cancelled),
                _ = &mut expired => return Err(timed_out()),
                _ = tokio::time::sleep(options.interval) => {}
            }
        }
    }
}
