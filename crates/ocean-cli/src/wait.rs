//! Polling until a deployment or droplet action finishes.

use std::future::Future;
use std::time::Duration;

use ocean_api::actions::{ACTION_COMPLETED, ACTION_ERRORED, ACTION_IN_PROGRESS};
use ocean_api::apps::{AppsService, Deployment};
use ocean_api::{Action, ActionsService, ApiError};
use tracing::{debug, warn};

use crate::error::CliError;

/// Fixed-interval poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    interval: Duration,
    max_attempts: u32,
    tolerated_failures: u32,
    progress: bool,
}

impl Poller {
    /// App deployments: every 10 seconds, up to 180 times.
    #[must_use]
    pub const fn deployments() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 180,
            tolerated_failures: 0,
            progress: true,
        }
    }

    /// Droplet actions: every 5 seconds, up to 360 times, riding out three
    /// failed fetches in a row.
    #[must_use]
    pub const fn actions() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 360,
            tolerated_failures: 3,
            progress: true,
        }
    }

    /// Override the interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the attempt limit.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Suppress progress dots.
    #[must_use]
    pub const fn quiet(mut self) -> Self {
        self.progress = false;
        self
    }

    /// Fetch until `done` returns true. `Ok(None)` means attempts ran out.
    ///
    /// # Errors
    ///
    /// Returns the first error from `done`, a decode error, or a fetch error
    /// once more than the tolerated number of consecutive fetches failed.
    pub async fn poll<T, F, Fut, D>(&self, mut fetch: F, mut done: D) -> Result<Option<T>, CliError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
        D: FnMut(&T) -> Result<bool, CliError>,
    {
        let mut failures = 0;
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                if self.progress {
                    eprint!(".");
                }
                tokio::time::sleep(self.interval).await;
            }
            let outcome = match fetch().await {
                Ok(state) => {
                    failures = 0;
                    match done(&state) {
                        Ok(true) => Some(Ok(Some(state))),
                        Ok(false) => None,
                        Err(err) => Some(Err(err)),
                    }
                }
                // A body that failed to decode is returned as is.
                Err(err) if failures < self.tolerated_failures && !matches!(err, ApiError::Decode { .. }) => {
                    failures += 1;
                    warn!(error = %err, failures, "poll fetch failed, retrying");
                    None
                }
                Err(err) => Some(Err(err.into())),
            };
            if let Some(result) = outcome {
                debug!(attempt, "poll finished");
                self.end_progress(attempt);
                return result;
            }
        }
        self.end_progress(self.max_attempts);
        Ok(None)
    }

    fn end_progress(&self, attempts: u32) {
        if self.progress && attempts > 0 {
            eprintln!();
        }
    }
}

/// Wait until a deployment has finished every step.
///
/// # Errors
///
/// Fails when a step errors, the fetch fails, or attempts run out.
pub async fn wait_for_deployment<A: AppsService>(
    apps: &A,
    poller: &Poller,
    app_id: &str,
    deployment_id: &str,
) -> Result<(), CliError> {
    let finished = poller
        .poll(
            || apps.get_deployment(app_id, deployment_id),
            |deployment| deployment_finished(deployment, app_id),
        )
        .await?;
    finished
        .map(|_| ())
        .ok_or_else(|| CliError::Timeout(format!("timeout waiting to app ({app_id}) deployment")))
}

fn deployment_finished(deployment: &Deployment, app_id: &str) -> Result<bool, CliError> {
    let Some(progress) = &deployment.progress else {
        return Ok(false);
    };
    if progress.error_steps > 0 {
        return Err(CliError::Failed(format!(
            "error deploying app ({app_id}) (deployment ID: {})",
            deployment.id
        )));
    }
    Ok(progress.success_steps == progress.total_steps)
}

/// Wait until the action behind `href` completes.
///
/// # Errors
///
/// Fails when the action errors or reports an unknown status, fetches keep
/// failing, or attempts run out.
pub async fn wait_for_action<A: ActionsService>(actions: &A, poller: &Poller, href: &str) -> Result<Action, CliError> {
    let finished = poller
        .poll(|| actions.get_action_by_uri(href), action_finished)
        .await?;
    finished.ok_or_else(|| CliError::Timeout(format!("timeout waiting for action ({href})")))
}

fn action_finished(action: &Action) -> Result<bool, CliError> {
    match action.status.as_str() {
        ACTION_IN_PROGRESS => Ok(false),
        ACTION_COMPLETED => Ok(true),
        ACTION_ERRORED => Err(CliError::Failed(format!("action {} errored", action.id))),
        other => Err(CliError::Failed(format!("unknown status: [{other}]"))),
    }
}
