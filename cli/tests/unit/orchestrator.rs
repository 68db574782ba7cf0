//! Orchestrator scenarios on a paused clock.
//!
//! `start_paused` lets tokio jump straight to the next timer, so a full
//! two-minute poll cycle runs instantly and elapsed time is exact.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use imgrelay_cli::application::{ApiError, Orchestrator, process_file};
use imgrelay_cli::domain::{PollPolicy, TaskStatus, WorkflowError};
use imgrelay_common::RunState;
use tokio::time::Instant;

use crate::mocks::{MockGateway, MockUploader, READ_URL, RecordingReporter};

fn orchestrator(gateway: MockGateway) -> Orchestrator<MockGateway, MockUploader> {
    Orchestrator::new(gateway, MockUploader::accepting(), PollPolicy::default())
}

// ── Happy path ────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn processed_image_found_on_second_check() {
    let gateway = MockGateway::running().ready_on_check(2);
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    let reporter = RecordingReporter::default();

    let start = Instant::now();
    let url = process_file(&orch, &reporter, "cat.png", vec![0u8; 2048])
        .await
        .expect("processed");

    assert_eq!(url, READ_URL);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(calls.clear(), 1, "selection clears both namespaces once");
    assert_eq!(calls.upload_url(), 1);
    assert_eq!(calls.check(), 2, "no check after the output appears");
    assert_eq!(
        orch.status(),
        TaskStatus::Done {
            url: READ_URL.to_string()
        }
    );
    assert_eq!(orch.filename().as_deref(), Some("cat.png"));
    let messages = reporter.messages.lock().unwrap();
    assert!(messages.iter().any(|m| m == "success:Processed image ready"));
}

#[tokio::test(start_paused = true)]
async fn upload_sends_the_selected_payload() {
    let orch = Orchestrator::new(
        MockGateway::running().ready_on_check(1),
        MockUploader::accepting(),
        PollPolicy::default(),
    );
    orch.select_file("dog.png", vec![7u8; 300]).await;
    orch.refresh_status().await;
    orch.start_upload().await.expect("upload");
    assert_eq!(orch.status(), TaskStatus::Waiting);
    assert!(matches!(orch.wait_for_output().await, TaskStatus::Done { .. }));
}

// ── Refusals ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stopped_instance_refuses_upload_without_credential() {
    let gateway = MockGateway::with_state("stopped");
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    let reporter = RecordingReporter::default();

    let err = process_file(&orch, &reporter, "dog.png", vec![1, 2, 3])
        .await
        .unwrap_err();

    assert_eq!(err, WorkflowError::InstanceNotRunning(RunState::Stopped));
    assert_eq!(calls.upload_url(), 0);
    assert_eq!(calls.check(), 0);
    assert_eq!(calls.clear(), 1);
    assert_eq!(orch.status(), TaskStatus::Ready, "refusal leaves the task as is");
    let messages = reporter.messages.lock().unwrap();
    assert!(messages.iter().any(|m| m == "warn:Compute instance is stopped"));
}

#[tokio::test(start_paused = true)]
async fn unreachable_status_reads_as_unknown_and_refuses() {
    let gateway = MockGateway::running().status_unreachable();
    let calls = gateway.counters();
    let orch = orchestrator(gateway);

    orch.select_file("cat.png", vec![1]).await;
    assert_eq!(orch.refresh_status().await, RunState::Unknown);
    assert_eq!(orch.instance_state(), RunState::Unknown);
    assert_eq!(
        orch.start_upload().await.unwrap_err(),
        WorkflowError::InstanceNotRunning(RunState::Unknown)
    );
    assert_eq!(calls.status(), 1);
    assert_eq!(calls.upload_url(), 0);
}

#[tokio::test]
async fn upload_without_selection_is_refused() {
    let orch = orchestrator(MockGateway::running());
    orch.refresh_status().await;
    assert_eq!(
        orch.start_upload().await.unwrap_err(),
        WorkflowError::NoFileSelected
    );
    assert_eq!(orch.status(), TaskStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn second_upload_while_waiting_is_busy() {
    let gateway = MockGateway::running();
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    orch.select_file("cat.png", vec![1]).await;
    orch.refresh_status().await;
    orch.start_upload().await.expect("first upload");

    assert_eq!(orch.start_upload().await.unwrap_err(), WorkflowError::Busy);
    assert_eq!(calls.upload_url(), 1);
}

#[tokio::test(start_paused = true)]
async fn finished_run_refuses_another_upload() {
    let orch = orchestrator(MockGateway::running().ready_on_check(1));
    let reporter = RecordingReporter::default();
    process_file(&orch, &reporter, "cat.png", vec![1])
        .await
        .expect("processed");

    assert_eq!(
        orch.start_upload().await.unwrap_err(),
        WorkflowError::AlreadyFinished("done".to_string())
    );
}

// ── Timeout ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn gives_up_after_twenty_four_checks() {
    let gateway = MockGateway::running();
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    let reporter = RecordingReporter::default();

    let start = Instant::now();
    let err = process_file(&orch, &reporter, "cat.png", vec![1])
        .await
        .unwrap_err();

    assert_eq!(err, WorkflowError::TimedOut { waited_ms: 120_000 });
    assert_eq!(err.code(), "TIMED_OUT");
    assert_eq!(start.elapsed(), Duration::from_secs(120));
    assert_eq!(calls.check(), 24);
    assert_eq!(orch.status(), TaskStatus::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn output_on_the_last_tick_beats_the_timeout() {
    // Check 24 lands exactly at the 120 s budget and finds the output.
    let gateway = MockGateway::running().ready_on_check(24);
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    let reporter = RecordingReporter::default();

    let start = Instant::now();
    let url = process_file(&orch, &reporter, "cat.png", vec![1])
        .await
        .expect("found on the final check");

    assert_eq!(url, READ_URL);
    assert_eq!(start.elapsed(), Duration::from_secs(120));
    assert_eq!(calls.check(), 24);
    assert_eq!(
        orch.status(),
        TaskStatus::Done {
            url: READ_URL.to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_applies_when_every_check_errors() {
    let gateway = MockGateway::running().all_checks_fail();
    let calls = gateway.counters();
    let orch = Orchestrator::new(
        gateway,
        MockUploader::accepting(),
        PollPolicy::from_millis(12_000, 5_000).unwrap(),
    );
    orch.select_file("cat.png", vec![1]).await;
    orch.refresh_status().await;
    orch.start_upload().await.expect("upload");

    assert_eq!(orch.wait_for_output().await, TaskStatus::TimedOut);
    assert_eq!(calls.check(), 3);
}

#[tokio::test(start_paused = true)]
async fn failed_checks_are_retried_on_the_next_tick() {
    let gateway = MockGateway::running()
        .failing_checks(&[1, 2])
        .ready_on_check(3);
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    let reporter = RecordingReporter::default();

    let start = Instant::now();
    let url = process_file(&orch, &reporter, "cat.png", vec![1])
        .await
        .expect("processed");

    assert_eq!(url, READ_URL);
    assert_eq!(calls.check(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(15));
}

// ── Credential and upload failures ────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn broker_5xx_is_retried_once() {
    let gateway = MockGateway::running()
        .ready_on_check(1)
        .credential_errors(vec![ApiError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        }]);
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    let reporter = RecordingReporter::default();

    process_file(&orch, &reporter, "cat.png", vec![1])
        .await
        .expect("second attempt succeeds");
    assert_eq!(calls.upload_url(), 2);
}

#[tokio::test(start_paused = true)]
async fn broker_failing_twice_fails_the_task() {
    let gateway = MockGateway::running().credential_errors(vec![
        ApiError::Transport("connection refused".to_string()),
        ApiError::Transport("connection refused".to_string()),
    ]);
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    orch.select_file("cat.png", vec![1]).await;
    orch.refresh_status().await;

    let err = orch.start_upload().await.unwrap_err();
    assert!(matches!(err, WorkflowError::CredentialUnavailable(_)), "got {err:?}");
    assert_eq!(calls.upload_url(), 2);
    assert!(matches!(orch.status(), TaskStatus::Failed { .. }));
}

#[tokio::test(start_paused = true)]
async fn broker_4xx_is_not_retried() {
    let gateway = MockGateway::running().credential_errors(vec![ApiError::Status {
        status: 400,
        message: "Filename required".to_string(),
    }]);
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    orch.select_file("cat.png", vec![1]).await;
    orch.refresh_status().await;

    assert_eq!(
        orch.start_upload().await.unwrap_err(),
        WorkflowError::CredentialRejected("Filename required".to_string())
    );
    assert_eq!(calls.upload_url(), 1);
}

#[tokio::test(start_paused = true)]
async fn storage_rejection_surfaces_the_body() {
    let gateway = MockGateway::running();
    let calls = gateway.counters();
    let orch = Orchestrator::new(
        gateway,
        MockUploader::rejecting(400, "<Code>EntityTooLarge</Code>"),
        PollPolicy::default(),
    );
    let reporter = RecordingReporter::default();

    let err = process_file(&orch, &reporter, "huge.png", vec![0u8; 16])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        WorkflowError::UploadRejected {
            status: 400,
            body: "<Code>EntityTooLarge</Code>".to_string()
        }
    );
    match orch.status() {
        TaskStatus::Failed { message } => assert!(message.contains("EntityTooLarge")),
        other => panic!("expected Failed, got {other}"),
    }
    assert_eq!(calls.check(), 0, "no polling after a failed upload");
}

// ── Reset and cancellation ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn reset_mid_check_discards_the_late_result() {
    // The first check starts at 5 s and answers "found" at 8 s.
    let gateway = MockGateway::running()
        .ready_on_check(1)
        .check_delay(Duration::from_secs(3));
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    orch.select_file("cat.png", vec![1]).await;
    orch.refresh_status().await;
    orch.start_upload().await.expect("upload");

    let (ended, ()) = tokio::join!(orch.wait_for_output(), async {
        tokio::time::sleep(Duration::from_secs(6)).await;
        orch.reset().await;
    });

    assert_eq!(ended, TaskStatus::Idle);
    assert_eq!(orch.status(), TaskStatus::Idle);
    assert_eq!(orch.filename(), None);
    assert_eq!(calls.check(), 1);
    assert_eq!(calls.clear(), 2);
}

#[tokio::test(start_paused = true)]
async fn reset_between_checks_stops_the_ticker_and_leaves_idle() {
    let gateway = MockGateway::running();
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    orch.select_file("cat.png", vec![1]).await;
    orch.refresh_status().await;
    orch.start_upload().await.expect("upload");

    let start = Instant::now();
    let (ended, ()) = tokio::join!(orch.wait_for_output(), async {
        tokio::time::sleep(Duration::from_secs(7)).await;
        orch.reset().await;
    });

    assert_eq!(ended, TaskStatus::Idle, "never parked in Waiting");
    assert_eq!(orch.status(), TaskStatus::Idle);
    assert_eq!(start.elapsed(), Duration::from_secs(7));
    assert_eq!(calls.check(), 1);

    // Nothing keeps ticking once the cycle is gone.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(calls.check(), 1);
}

#[tokio::test(start_paused = true)]
async fn new_selection_starts_a_fresh_cycle_after_reset() {
    let gateway = MockGateway::running().ready_on_check(2);
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    orch.select_file("cat.png", vec![1]).await;
    orch.refresh_status().await;
    orch.start_upload().await.expect("upload");

    orch.select_file("dog.png", vec![2]).await;
    assert_eq!(orch.status(), TaskStatus::Ready);
    assert_eq!(orch.filename().as_deref(), Some("dog.png"));
    orch.start_upload().await.expect("second upload");
    assert!(matches!(orch.wait_for_output().await, TaskStatus::Done { .. }));
    assert_eq!(calls.upload_url(), 2);
}

#[tokio::test]
async fn failed_wipe_still_selects_the_file() {
    let gateway = MockGateway::running().clear_fails();
    let calls = gateway.counters();
    let orch = orchestrator(gateway);
    orch.select_file("cat.png", vec![1]).await;
    assert_eq!(orch.status(), TaskStatus::Ready);
    assert_eq!(calls.clear(), 1);
}
