//! Application services for awaiting remote task completion.

mod poller;
mod resolver;
mod tracker;

pub use poller::{PollError, PollResult, PollSettings, TaskPoller};
pub use resolver::{EntityResolver, ResolutionError, ResolveResult};
pub use tracker::{
    AwaitError, AwaitOutcome, AwaitPhase, AwaitRequest, AwaitResult, CompletionTracker,
};
