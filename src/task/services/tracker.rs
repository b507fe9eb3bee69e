//! Façade that awaits a remote task and resolves what it produced.

use crate::task::{
    domain::{ExternalId, ResolutionStrategy, TaskError, TaskHandle, TaskSnapshot, TaskState},
    ports::{EntityLookup, TaskStatusSource},
    services::{
        poller::{PollError, PollSettings, TaskPoller},
        resolver::{EntityResolver, ResolutionError},
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Phase of one tracked await, recorded in logs on each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwaitPhase {
    /// The handle was accepted and the wait is about to start.
    Submitted,
    /// The poller is driving the handle towards a terminal snapshot.
    Polling,
    /// The task succeeded; the produced entity is being resolved.
    Resolving,
    /// The await finished with an outcome.
    Resolved,
    /// The await failed, remotely or while resolving.
    Failed,
    /// The local wait budget ran out first.
    TimedOut,
    /// The caller cancelled the local wait.
    Canceled,
}

impl AwaitPhase {
    /// Returns the canonical label for this phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Polling => "polling",
            Self::Resolving => "resolving",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for AwaitPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload for awaiting one remote task.
#[derive(Debug, Clone)]
pub struct AwaitRequest {
    handle: TaskHandle,
    strategy: ResolutionStrategy,
    settings: PollSettings,
    cancellation: CancellationToken,
}

impl AwaitRequest {
    /// Creates a request with default settings and a fresh, never-cancelled
    /// token.
    #[must_use]
    pub fn new(handle: TaskHandle, strategy: ResolutionStrategy) -> Self {
        Self {
            handle,
            strategy,
            settings: PollSettings::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Sets the polling cadence and budgets.
    #[must_use]
    pub const fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the token that cancels the local wait.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns the handle to await.
    #[must_use]
    pub const fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// Returns the strategy for resolving the produced entity.
    #[must_use]
    pub const fn strategy(&self) -> &ResolutionStrategy {
        &self.strategy
    }

    /// Returns the polling cadence and budgets.
    #[must_use]
    pub const fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Returns the token that cancels the local wait.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

/// Successful outcome of one awaited task.
#[derive(Debug, Clone, PartialEq)]
pub struct AwaitOutcome {
    resolved: Option<ExternalId>,
    final_snapshot: TaskSnapshot,
    completed_at: DateTime<Utc>,
}

impl AwaitOutcome {
    /// Returns the identifier of the produced entity, when one was
    /// requested and found.
    #[must_use]
    pub const fn resolved(&self) -> Option<&ExternalId> {
        self.resolved.as_ref()
    }

    /// Returns the terminal snapshot the task settled on.
    #[must_use]
    pub const fn final_snapshot(&self) -> &TaskSnapshot {
        &self.final_snapshot
    }

    /// Returns when the await completed locally.
    #[must_use]
    pub const fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

/// Errors returned by [`CompletionTracker::await_task`].
///
/// The three variants keep remote failure, resolution failure, and wait
/// failure distinguishable: a remote operation that succeeded but whose
/// result could not be determined must not read as a failed operation.
#[derive(Debug, Clone, Error)]
pub enum AwaitError {
    /// Polling ended without a terminal snapshot.
    #[error(transparent)]
    Poll(#[from] PollError),
    /// The remote operation reported failure or cancellation.
    #[error(transparent)]
    Task(#[from] TaskError),
    /// The remote operation succeeded but its result could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Result type for tracker operations.
pub type AwaitResult<T> = Result<T, AwaitError>;

/// Tracks a submitted remote task through to its outcome.
#[derive(Clone)]
pub struct CompletionTracker<S, L, C>
where
    S: TaskStatusSource,
    L: EntityLookup,
    C: Clock + Send + Sync,
{
    poller: TaskPoller<S>,
    resolver: EntityResolver<L>,
    clock: Arc<C>,
}

impl<S, L, C> CompletionTracker<S, L, C>
where
    S: TaskStatusSource,
    L: EntityLookup,
    C: Clock + Send + Sync,
{
    /// Creates a tracker over the given ports and clock.
    #[must_use]
    pub const fn new(source: Arc<S>, lookup: Arc<L>, clock: Arc<C>) -> Self {
        Self {
            poller: TaskPoller::new(source),
            resolver: EntityResolver::new(lookup),
            clock,
        }
    }

    /// Awaits the task named by `request` and resolves what it produced.
    ///
    /// Polls the handle to a terminal snapshot, then, on success, applies
    /// the request's resolution strategy. The wait is bounded by the
    /// request's settings and token; neither bound affects the remote
    /// task.
    ///
    /// # Errors
    ///
    /// Returns [`AwaitError::Poll`] when no terminal snapshot arrived
    /// (transport exhaustion, timeout, or local cancellation),
    /// [`AwaitError::Task`] when the task reported
    /// [`TaskState::Failed`] or [`TaskState::Canceled`], and
    /// [`AwaitError::Resolution`] when the task succeeded but the
    /// produced entity could not be identified.
    pub async fn await_task(&self, request: AwaitRequest) -> AwaitResult<AwaitOutcome> {
        let AwaitRequest {
            handle,
            strategy,
            settings,
            cancellation,
        } = request;

        debug!(handle = %handle, phase = %AwaitPhase::Submitted, "tracking remote task");
        debug!(handle = %handle, phase = %AwaitPhase::Polling, "awaiting a terminal snapshot");
        let snapshot = match self.poller.poll(&handle, &settings, &cancellation).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(
                    handle = %handle,
                    phase = %poll_failure_phase(&error),
                    error = %error,
                    "wait ended without a terminal snapshot"
                );
                return Err(AwaitError::Poll(error));
            }
        };

        if snapshot.state() == TaskState::Succeeded {
            debug!(handle = %handle, phase = %AwaitPhase::Resolving, "resolving the produced entity");
            match self.resolver.resolve(&snapshot, &strategy).await {
                Ok(resolved) => {
                    let completed_at = self.clock.utc();
                    info!(
                        handle = %handle,
                        phase = %AwaitPhase::Resolved,
                        resolved = ?resolved.as_ref().map(ExternalId::as_str),
                        "remote task completed"
                    );
                    Ok(AwaitOutcome {
                        resolved,
                        final_snapshot: snapshot,
                        completed_at,
                    })
                }
                Err(error) => {
                    warn!(
                        handle = %handle,
                        phase = %AwaitPhase::Failed,
                        error = %error,
                        "task succeeded but its result could not be resolved"
                    );
                    Err(AwaitError::Resolution(error))
                }
            }
        } else {
            let error = TaskError::from_snapshot(&snapshot);
            warn!(
                handle = %handle,
                phase = %AwaitPhase::Failed,
                state = %snapshot.state(),
                "remote task did not succeed"
            );
            Err(AwaitError::Task(error))
        }
    }
}

/// Maps a poll failure to the phase the await ended in.
const fn poll_failure_phase(error: &PollError) -> AwaitPhase {
    match error {
        PollError::TransportExhausted { .. } => AwaitPhase::Failed,
        PollError::Timeout { .. } => AwaitPhase::TimedOut,
        PollError::Canceled { .. } => AwaitPhase::Canceled,
    }
}
