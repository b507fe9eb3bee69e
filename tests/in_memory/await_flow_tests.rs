//! Integration tests for successful waits and identifier resolution.

use std::sync::Arc;

use argus::task::{
    adapters::memory::{InMemoryEntityLookup, InMemoryTaskStatusSource},
    domain::{
        AffectedEntity, EntityKind, EntityQuery, ExternalId, ResolutionStrategy, TaskSnapshot,
        TaskState,
    },
    services::AwaitRequest,
};
use chrono::Utc;
use rstest::rstest;
use serde_json::json;

use super::helpers::{assert_resolved_to, fast_settings, fresh_handle, lookup, source, tracker};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_create_flow_resolves_the_new_entity_identifier(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) -> Result<(), eyre::Report> {
    let handle = fresh_handle();
    source.enqueue_states(&handle, [TaskState::Queued, TaskState::Running]);
    source.enqueue_snapshot(
        TaskSnapshot::new(handle.clone(), TaskState::Succeeded, Utc::now())
            .with_progress_percent(100)
            .with_affected_entities(vec![AffectedEntity::new(
                ExternalId::new("vm-123")?,
                EntityKind::new("vm")?,
            )])
            .with_completion_detail("entity_uuid", json!("vm-123")),
    );
    let tracker = tracker(&source, &lookup);
    let request = AwaitRequest::new(
        handle.clone(),
        ResolutionStrategy::completion_detail("entity_uuid"),
    )
    .with_settings(fast_settings());

    let outcome = tracker
        .await_task(request)
        .await
        .expect("the awaited task should resolve");

    assert_resolved_to(&outcome, "vm-123")?;
    assert_eq!(outcome.final_snapshot().state(), TaskState::Succeeded);
    assert_eq!(source.fetch_count(&handle), 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn raw_status_codes_walk_the_full_forward_path(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) {
    let handle = fresh_handle();
    source.enqueue_raw_codes(&handle, [2, 1, 3, 5]);
    let tracker = tracker(&source, &lookup);
    let request = AwaitRequest::new(handle.clone(), ResolutionStrategy::CompletionOnly)
        .with_settings(fast_settings());

    let outcome = tracker
        .await_task(request)
        .await
        .expect("the awaited task should resolve");

    assert_eq!(outcome.final_snapshot().state(), TaskState::Succeeded);
    assert_eq!(source.fetch_count(&handle), 4);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_update_wait_needs_no_identifier(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) {
    let handle = fresh_handle();
    source.enqueue_states(&handle, [TaskState::Running, TaskState::Succeeded]);
    let tracker = tracker(&source, &lookup);
    let request = AwaitRequest::new(handle, ResolutionStrategy::CompletionOnly)
        .with_settings(fast_settings());

    let outcome = tracker
        .await_task(request)
        .await
        .expect("the awaited task should resolve");

    assert_eq!(outcome.resolved(), None);
    assert_eq!(lookup.find_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_payload_without_identifiers_falls_back_to_the_directory(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) -> Result<(), eyre::Report> {
    let handle = fresh_handle();
    source.enqueue_states(&handle, [TaskState::Running, TaskState::Succeeded]);
    lookup.register(
        "db-volume",
        EntityKind::new("volume_group")?,
        ExternalId::new("vg-55")?,
    );
    let tracker = tracker(&source, &lookup);
    let query = EntityQuery::by_name("db-volume").with_kind(EntityKind::new("volume_group")?);
    let request = AwaitRequest::new(handle, ResolutionStrategy::lookup_fallback(query))
        .with_settings(fast_settings());

    let outcome = tracker
        .await_task(request)
        .await
        .expect("the fallback lookup should resolve");

    assert_resolved_to(&outcome, "vg-55")?;
    assert_eq!(lookup.find_count(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_awaits_share_no_state(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) -> Result<(), eyre::Report> {
    let first = fresh_handle();
    let second = fresh_handle();
    source.enqueue_snapshot(
        TaskSnapshot::new(first.clone(), TaskState::Succeeded, Utc::now())
            .with_completion_detail("entity_uuid", json!("vm-1")),
    );
    source.enqueue_states(&second, [TaskState::Queued, TaskState::Running]);
    source.enqueue_snapshot(
        TaskSnapshot::new(second.clone(), TaskState::Succeeded, Utc::now())
            .with_completion_detail("entity_uuid", json!("vm-2")),
    );
    let tracker = tracker(&source, &lookup);
    let strategy = ResolutionStrategy::completion_detail("entity_uuid");
    let first_request =
        AwaitRequest::new(first, strategy.clone()).with_settings(fast_settings());
    let second_request = AwaitRequest::new(second, strategy).with_settings(fast_settings());

    let (first_outcome, second_outcome) = tokio::join!(
        tracker.await_task(first_request),
        tracker.await_task(second_request)
    );

    assert_resolved_to(&first_outcome.expect("the first task should resolve"), "vm-1")?;
    assert_resolved_to(&second_outcome.expect("the second task should resolve"), "vm-2")?;
    Ok(())
}
