//! Task state model and the raw status-code mapping.

use super::ParseTaskStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a remote asynchronous operation.
///
/// `Queued`, `Pending`, `Running`, and `Canceling` are non-terminal;
/// `Succeeded`, `Failed`, and `Canceled` are terminal. `Unknown` covers any
/// status code the mapping does not recognise and is treated as non-terminal:
/// it usually indicates a remote-system version mismatch, so the poller keeps
/// waiting and logs it rather than failing hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Accepted by the remote scheduler, not yet started.
    Queued,
    /// Visible to the remote system, waiting to be scheduled.
    Pending,
    /// Work is in progress.
    Running,
    /// A remote cancellation request is being honoured.
    Canceling,
    /// The operation completed successfully.
    Succeeded,
    /// The operation failed remotely.
    Failed,
    /// The operation was cancelled remotely.
    Canceled,
    /// The reported status code is not recognised.
    Unknown,
}

impl TaskState {
    /// Maps a raw numeric status code onto a task state.
    ///
    /// This is the single source of truth for the remote system's status
    /// codes:
    ///
    /// | raw | state       |
    /// |-----|-------------|
    /// | 1   | `Pending`   |
    /// | 2   | `Queued`    |
    /// | 3   | `Running`   |
    /// | 4   | `Canceling` |
    /// | 5   | `Succeeded` |
    /// | 6   | `Failed`    |
    /// | 7   | `Canceled`  |
    ///
    /// Any other code maps to [`Self::Unknown`]; the remote API has grown
    /// new codes across versions and an unrecognised one must never be
    /// guessed into a terminal state.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        match raw {
            1 => Self::Pending,
            2 => Self::Queued,
            3 => Self::Running,
            4 => Self::Canceling,
            5 => Self::Succeeded,
            6 => Self::Failed,
            7 => Self::Canceled,
            _ => Self::Unknown,
        }
    }

    /// Returns whether the task will not transition further.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Returns whether observing `target` after `self` respects forward
    /// progress.
    ///
    /// Queued and Pending are pre-start peers, Running and Canceling are
    /// in-progress peers (a refused cancellation resumes Running from
    /// Canceling), any state may repeat, and a terminal state may be
    /// followed only by itself. `Unknown` is exempt in both directions so a
    /// version mismatch never strands a wait.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Unknown, _)
                | (_, Self::Unknown)
                | (Self::Queued | Self::Pending, _)
                | (
                    Self::Running | Self::Canceling,
                    Self::Running
                        | Self::Canceling
                        | Self::Succeeded
                        | Self::Failed
                        | Self::Canceled
                )
                | (Self::Succeeded, Self::Succeeded)
                | (Self::Failed, Self::Failed)
                | (Self::Canceled, Self::Canceled)
        )
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Canceling => "canceling",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "queued" => Ok(Self::Queued),
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "canceling" => Ok(Self::Canceling),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "canceled" => Ok(Self::Canceled),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}
