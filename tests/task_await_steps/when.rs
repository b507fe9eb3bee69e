//! When steps for task completion BDD scenarios.

use std::time::Duration;

use super::world::{TrackerWorld, run_async};
use argus::task::{
    domain::{EntityKind, EntityQuery, ResolutionStrategy, TaskHandle, TaskSnapshot, TaskState},
    services::{AwaitRequest, PollSettings},
};
use chrono::Utc;
use eyre::WrapErr;
use rstest_bdd_macros::when;

/// Pause between fetches, kept short so scenarios run on the wall clock.
const SCENARIO_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Turns the world's pending script into enqueued fetch outcomes.
fn script_task(world: &mut TrackerWorld) -> Result<TaskHandle, eyre::Report> {
    let handle = world
        .handle
        .clone()
        .ok_or_else(|| eyre::eyre!("no task handle in scenario world"))?;
    let mut states = world.pending_states.clone();
    let detailed_last = world.pending_detail.take().and_then(|detail| {
        states.pop().map(|state| (state, detail))
    });
    world.source.enqueue_states(&handle, states);
    if let Some((state, (key, value))) = detailed_last {
        world.source.enqueue_snapshot(
            TaskSnapshot::new(handle.clone(), state, Utc::now())
                .with_completion_detail(key, serde_json::Value::String(value)),
        );
    }
    if let Some((percent, message)) = world.pending_failure.take() {
        world.source.enqueue_snapshot(
            TaskSnapshot::new(handle.clone(), TaskState::Failed, Utc::now())
                .with_progress_percent(percent)
                .with_error_messages(vec![String::new(), message]),
        );
    }
    Ok(handle)
}

/// Scripts the task, awaits it with the given strategy, and records the
/// outcome.
fn await_with(
    world: &mut TrackerWorld,
    strategy: ResolutionStrategy,
    settings: PollSettings,
) -> Result<(), eyre::Report> {
    let handle = script_task(world)?;
    let request = AwaitRequest::new(handle, strategy).with_settings(settings);
    world.last_outcome = Some(run_async(world.tracker.await_task(request)));
    Ok(())
}

/// Settings generous enough for scripts that settle.
fn settling_settings() -> PollSettings {
    PollSettings::new()
        .with_poll_interval(SCENARIO_POLL_INTERVAL)
        .with_timeout(Duration::from_secs(2))
}

#[when(r#"the task is awaited with the completion detail strategy for "{key}""#)]
fn awaited_with_completion_detail(
    world: &mut TrackerWorld,
    key: String,
) -> Result<(), eyre::Report> {
    await_with(
        world,
        ResolutionStrategy::completion_detail(key),
        settling_settings(),
    )
}

#[when("the task is awaited for completion only")]
fn awaited_for_completion_only(world: &mut TrackerWorld) -> Result<(), eyre::Report> {
    await_with(world, ResolutionStrategy::CompletionOnly, settling_settings())
}

#[when("the task is awaited for at most two poll intervals")]
fn awaited_with_a_tight_deadline(world: &mut TrackerWorld) -> Result<(), eyre::Report> {
    await_with(
        world,
        ResolutionStrategy::CompletionOnly,
        PollSettings::new()
            .with_poll_interval(SCENARIO_POLL_INTERVAL)
            .with_timeout(SCENARIO_POLL_INTERVAL * 2),
    )
}

#[when(r#"the task is awaited with the entity kind strategy for "{kind}""#)]
fn awaited_with_entity_kind(world: &mut TrackerWorld, kind: String) -> Result<(), eyre::Report> {
    let kind = EntityKind::new(kind).wrap_err("parse scenario entity kind")?;
    await_with(
        world,
        ResolutionStrategy::affected_entity_of_kind(kind),
        settling_settings(),
    )
}

#[when(r#"the task is awaited with a lookup fallback for name "{name}""#)]
fn awaited_with_lookup_fallback(
    world: &mut TrackerWorld,
    name: String,
) -> Result<(), eyre::Report> {
    await_with(
        world,
        ResolutionStrategy::lookup_fallback(EntityQuery::by_name(name)),
        settling_settings(),
    )
}
