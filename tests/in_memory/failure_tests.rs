//! Integration tests for remote failure, exhaustion, timeout, and
//! cancellation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use argus::task::{
    adapters::memory::{InMemoryEntityLookup, InMemoryTaskStatusSource},
    domain::{ResolutionStrategy, TaskSnapshot, TaskState},
    ports::TransportError,
    services::{AwaitError, AwaitRequest, PollError, PollSettings},
};
use chrono::Utc;
use rstest::rstest;
use tokio_util::sync::CancellationToken;

use super::helpers::{fast_settings, fresh_handle, lookup, source, tracker};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_failed_task_surfaces_the_remote_message(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) {
    let handle = fresh_handle();
    source.enqueue_states(&handle, [TaskState::Queued, TaskState::Running]);
    source.enqueue_snapshot(
        TaskSnapshot::new(handle.clone(), TaskState::Failed, Utc::now())
            .with_progress_percent(37)
            .with_error_messages(vec![String::new(), "disk quota exceeded".to_owned()]),
    );
    let tracker = tracker(&source, &lookup);
    let request = AwaitRequest::new(handle, ResolutionStrategy::CompletionOnly)
        .with_settings(fast_settings());

    let error = tracker
        .await_task(request)
        .await
        .expect_err("a failed task should not resolve");

    let AwaitError::Task(task_error) = error else {
        panic!("expected a task error, got {error:?}");
    };
    assert_eq!(task_error.state(), TaskState::Failed);
    assert_eq!(task_error.message(), "disk quota exceeded");
    assert_eq!(task_error.progress_percent(), Some(37));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_dead_transport_exhausts_its_budget(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) {
    let handle = fresh_handle();
    source.enqueue_failure(&handle, TransportError::Unavailable("502".to_owned()));
    let tracker = tracker(&source, &lookup);
    let request = AwaitRequest::new(handle.clone(), ResolutionStrategy::CompletionOnly)
        .with_settings(fast_settings());

    let error = tracker
        .await_task(request)
        .await
        .expect_err("a dead transport should not resolve");

    let AwaitError::Poll(PollError::TransportExhausted { attempts, .. }) = error else {
        panic!("expected transport exhaustion, got {error:?}");
    };
    assert_eq!(attempts, 3);
    assert_eq!(source.fetch_count(&handle), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_task_that_never_settles_times_out(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) {
    let handle = fresh_handle();
    source.enqueue_states(&handle, [TaskState::Running]);
    let tracker = tracker(&source, &lookup);
    let request = AwaitRequest::new(handle, ResolutionStrategy::CompletionOnly).with_settings(
        PollSettings::new()
            .with_poll_interval(Duration::from_millis(25))
            .with_timeout(Duration::from_millis(60)),
    );

    let error = tracker
        .await_task(request)
        .await
        .expect_err("a task that never settles should time out");

    let AwaitError::Poll(PollError::Timeout { last_state, waited, .. }) = error else {
        panic!("expected a timeout, got {error:?}");
    };
    assert_eq!(last_state, TaskState::Running);
    assert!(waited >= Duration::from_millis(60));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelling_the_wait_leaves_the_remote_task_alone(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) {
    let handle = fresh_handle();
    source.enqueue_states(&handle, [TaskState::Running]);
    let tracker = tracker(&source, &lookup);
    let cancellation = CancellationToken::new();
    let trigger = cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });
    let request = AwaitRequest::new(handle.clone(), ResolutionStrategy::CompletionOnly)
        .with_settings(
            PollSettings::new()
                .with_poll_interval(Duration::from_millis(250))
                .with_timeout(Duration::from_secs(2)),
        )
        .with_cancellation(cancellation);
    let started = Instant::now();

    let error = tracker
        .await_task(request)
        .await
        .expect_err("a cancelled wait should not resolve");

    assert!(matches!(error, AwaitError::Poll(PollError::Canceled { .. })));
    assert!(
        started.elapsed() < Duration::from_millis(200),
        "cancellation should interrupt the inter-poll sleep"
    );
    assert_eq!(source.fetch_count(&handle), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_regressing_task_is_treated_as_transport_failure(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) {
    let handle = fresh_handle();
    source.enqueue_states(&handle, [TaskState::Running, TaskState::Queued]);
    let tracker = tracker(&source, &lookup);
    let request = AwaitRequest::new(handle, ResolutionStrategy::CompletionOnly)
        .with_settings(fast_settings().with_transport_retry_limit(2));

    let error = tracker
        .await_task(request)
        .await
        .expect_err("a regressing task should not resolve");

    let AwaitError::Poll(PollError::TransportExhausted { source: cause, .. }) = error else {
        panic!("expected transport exhaustion, got {error:?}");
    };
    assert!(matches!(
        cause,
        TransportError::StateRegression {
            from: TaskState::Running,
            to: TaskState::Queued,
            ..
        }
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_unrecognised_status_code_defers_judgement(
    source: Arc<InMemoryTaskStatusSource>,
    lookup: Arc<InMemoryEntityLookup>,
) {
    let handle = fresh_handle();
    source.enqueue_raw_codes(&handle, [42, 3, 5]);
    let tracker = tracker(&source, &lookup);
    let request = AwaitRequest::new(handle.clone(), ResolutionStrategy::CompletionOnly)
        .with_settings(fast_settings());

    let outcome = tracker
        .await_task(request)
        .await
        .expect("an unrecognised code should not end the wait");

    assert_eq!(outcome.final_snapshot().state(), TaskState::Succeeded);
    assert_eq!(source.fetch_count(&handle), 3);
}
