//! Polling service that drives a task handle to a terminal snapshot.

use crate::task::{
    domain::{TaskHandle, TaskSnapshot, TaskState},
    ports::{TaskStatusSource, TransportError},
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Result type for poll operations.
pub type PollResult<T> = Result<T, PollError>;

/// Errors returned while polling a task to completion.
#[derive(Debug, Clone, Error)]
pub enum PollError {
    /// The transport failed too many times in a row.
    #[error(
        "gave up polling task {handle} after {attempts} consecutive transport failures: {source}"
    )]
    TransportExhausted {
        /// Handle of the polled task.
        handle: TaskHandle,
        /// Consecutive failed fetch attempts.
        attempts: u32,
        /// Last transport failure observed.
        source: TransportError,
    },

    /// The local wait deadline elapsed before a terminal state.
    ///
    /// The remote task keeps running; a local timeout cancels nothing.
    #[error("timed out after {waited:?} waiting for task {handle}; last observed state: {last_state}")]
    Timeout {
        /// Handle of the polled task.
        handle: TaskHandle,
        /// How long the wait ran.
        waited: Duration,
        /// Last state observed before the deadline.
        last_state: TaskState,
    },

    /// The local wait was cancelled by the caller.
    ///
    /// Cancelling the wait says nothing about the remote task, which keeps
    /// running independently; nothing has been rolled back.
    #[error("wait for task {handle} was cancelled locally; the remote task is unaffected")]
    Canceled {
        /// Handle of the polled task.
        handle: TaskHandle,
    },
}

/// Cadence and budget knobs for one polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    timeout: Duration,
    poll_interval: Duration,
    initial_delay: Duration,
    transport_retry_limit: u32,
}

impl PollSettings {
    /// Default overall wait budget.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    /// Default pause between status fetches.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

    /// Default number of consecutive transport failures tolerated.
    pub const DEFAULT_TRANSPORT_RETRY_LIMIT: u32 = 3;

    /// Creates settings with the default cadence and no initial delay.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            initial_delay: Duration::ZERO,
            transport_retry_limit: Self::DEFAULT_TRANSPORT_RETRY_LIMIT,
        }
    }

    /// Sets the overall wait budget.
    ///
    /// A zero timeout expires before the first fetch.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the pause between status fetches.
    ///
    /// A zero interval fetches back to back.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets a one-off pause before the first fetch.
    ///
    /// Remote schedulers routinely take a few seconds to make a fresh task
    /// visible; the delay avoids burning retry budget on that window.
    #[must_use]
    pub const fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Sets the number of consecutive transport failures tolerated.
    #[must_use]
    pub const fn with_transport_retry_limit(mut self, limit: u32) -> Self {
        self.transport_retry_limit = limit;
        self
    }

    /// Returns the overall wait budget.
    #[must_use]
    pub const fn timeout(self) -> Duration {
        self.timeout
    }

    /// Returns the pause between status fetches.
    #[must_use]
    pub const fn poll_interval(self) -> Duration {
        self.poll_interval
    }

    /// Returns the pause before the first fetch.
    #[must_use]
    pub const fn initial_delay(self) -> Duration {
        self.initial_delay
    }

    /// Returns the consecutive transport failures tolerated.
    #[must_use]
    pub const fn transport_retry_limit(self) -> u32 {
        self.transport_retry_limit
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Polls a task's status until it settles, times out, or is cancelled.
#[derive(Clone)]
pub struct TaskPoller<S>
where
    S: TaskStatusSource,
{
    source: Arc<S>,
}

impl<S> TaskPoller<S>
where
    S: TaskStatusSource,
{
    /// Creates a poller over the given status source.
    #[must_use]
    pub const fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Polls `handle` until its snapshot reaches a terminal state.
    ///
    /// Fetches at the cadence in `settings`, tolerating up to the
    /// configured number of consecutive transport failures; an accepted
    /// snapshot resets that count. A fetched snapshot that violates forward
    /// progress against the last accepted state is rejected as a transport
    /// failure rather than adopted. Cancelling `cancellation` unblocks the
    /// wait promptly, mid-sleep and mid-fetch alike, and explicit
    /// cancellation wins over a simultaneous deadline.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::TransportExhausted`] when the transport budget
    /// is spent, [`PollError::Timeout`] when the deadline passes before a
    /// terminal snapshot, and [`PollError::Canceled`] when the token fires.
    pub async fn poll(
        &self,
        handle: &TaskHandle,
        settings: &PollSettings,
        cancellation: &CancellationToken,
    ) -> PollResult<TaskSnapshot> {
        let started = Instant::now();
        let deadline = started + settings.timeout();
        let mut last_state = TaskState::Unknown;
        let mut failures: u32 = 0;

        if !settings.initial_delay().is_zero() {
            pause(
                settings.initial_delay(),
                handle,
                started,
                deadline,
                last_state,
                cancellation,
            )
            .await?;
        }

        loop {
            let fetched = tokio::select! {
                biased;
                () = cancellation.cancelled() => {
                    return Err(PollError::Canceled { handle: handle.clone() });
                }
                () = time::sleep_until(deadline) => {
                    return Err(PollError::Timeout {
                        handle: handle.clone(),
                        waited: started.elapsed(),
                        last_state,
                    });
                }
                outcome = self.source.fetch(handle) => outcome,
            };

            match fetched {
                Ok(snapshot) if last_state.can_transition_to(snapshot.state()) => {
                    if snapshot.state().is_terminal() {
                        debug!(handle = %handle, state = %snapshot.state(), "task settled");
                        return Ok(snapshot);
                    }
                    if snapshot.state() == TaskState::Unknown {
                        warn!(
                            handle = %handle,
                            "task reported an unrecognised status; continuing to poll"
                        );
                    } else {
                        debug!(
                            handle = %handle,
                            state = %snapshot.state(),
                            progress = ?snapshot.progress_percent(),
                            "task still in progress"
                        );
                    }
                    last_state = snapshot.state();
                    failures = 0;
                }
                Ok(snapshot) => {
                    let regression = TransportError::StateRegression {
                        handle: handle.clone(),
                        from: last_state,
                        to: snapshot.state(),
                    };
                    note_failure(&mut failures, settings, handle, regression)?;
                }
                Err(error) => {
                    note_failure(&mut failures, settings, handle, error)?;
                }
            }

            pause(
                settings.poll_interval(),
                handle,
                started,
                deadline,
                last_state,
                cancellation,
            )
            .await?;
        }
    }
}

/// Records one rejected fetch, failing once the retry budget is spent.
fn note_failure(
    failures: &mut u32,
    settings: &PollSettings,
    handle: &TaskHandle,
    error: TransportError,
) -> PollResult<()> {
    *failures += 1;
    warn!(
        handle = %handle,
        attempt = *failures,
        error = %error,
        "rejected task status fetch"
    );
    if *failures >= settings.transport_retry_limit() {
        return Err(PollError::TransportExhausted {
            handle: handle.clone(),
            attempts: *failures,
            source: error,
        });
    }
    Ok(())
}

/// Sleeps for `duration` unless the deadline passes or the wait is
/// cancelled first.
async fn pause(
    duration: Duration,
    handle: &TaskHandle,
    started: Instant,
    deadline: Instant,
    last_state: TaskState,
    cancellation: &CancellationToken,
) -> PollResult<()> {
    tokio::select! {
        biased;
        () = cancellation.cancelled() => Err(PollError::Canceled { handle: handle.clone() }),
        () = time::sleep_until(deadline) => Err(PollError::Timeout {
            handle: handle.clone(),
            waited: started.elapsed(),
            last_state,
        }),
        () = time::sleep(duration) => Ok(()),
    }
}
