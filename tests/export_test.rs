//! Integration tests for the export workflow

mod common;

use common::{project, FakeJobService};
use jobrelay::config::{JobRelayConfig, PollingConfig};
use jobrelay::core::ExportOrchestrator;
use jobrelay::domain::{
    ErrorClass, JobErrorDetail, JobRelayError, JobState, Stage, StorageUri, TableReference,
};
use std::sync::Arc;
use tokio::sync::watch;

fn config() -> JobRelayConfig {
    let mut config = JobRelayConfig::default();
    config.polling = PollingConfig {
        initial_interval_ms: 200,
        max_interval_ms: 1000,
        backoff_multiplier: 1.5,
        max_transient_errors: 2,
    };
    config
}

fn source() -> TableReference {
    "proj1:sales.orders".parse().unwrap()
}

fn destinations() -> Vec<StorageUri> {
    vec![StorageUri::parse("gs://exports/orders-*.json").unwrap()]
}

#[tokio::test(start_paused = true)]
async fn test_export_and_wait() {
    let service = FakeJobService::new().into_arc();
    let (_tx, rx) = watch::channel(false);
    let orchestrator = ExportOrchestrator::new(Arc::clone(&service), &config(), rx).unwrap();

    let handle = orchestrator
        .export_to_storage(&project(), &source(), &destinations(), true)
        .await
        .unwrap();

    assert_eq!(handle.state, JobState::Done);
    assert!(handle.job_id().as_str().starts_with("direct-export-"));
    assert_eq!(service.create_calls(), 1);
    assert_eq!(service.fetch_calls(), 2);
}

#[tokio::test]
async fn test_export_without_wait_returns_accepted_job() {
    let service = FakeJobService::new().into_arc();
    let (_tx, rx) = watch::channel(false);
    let orchestrator = ExportOrchestrator::new(Arc::clone(&service), &config(), rx).unwrap();

    let handle = orchestrator
        .export_to_storage(&project(), &source(), &destinations(), false)
        .await
        .unwrap();

    assert_eq!(handle.state, JobState::Pending);
    assert_eq!(service.create_calls(), 1);
    assert_eq!(service.fetch_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_job_surfaces_as_execution_failure() {
    let service = FakeJobService::new()
        .with_states(vec![JobState::Running, JobState::Error])
        .with_error_result(JobErrorDetail {
            reason: Some("invalid".to_string()),
            location: Some("gs://exports/orders-*.json".to_string()),
            message: "Access Denied: bucket exports".to_string(),
        })
        .into_arc();
    let (_tx, rx) = watch::channel(false);
    let orchestrator = ExportOrchestrator::new(Arc::clone(&service), &config(), rx).unwrap();

    let err = orchestrator
        .export_to_storage(&project(), &source(), &destinations(), true)
        .await
        .unwrap_err();

    let remote = err.as_remote().expect("remote error");
    assert_eq!(remote.class, ErrorClass::Fatal);
    assert_eq!(remote.stage, Stage::Execution);
    assert!(remote.cause.message.contains("Access Denied"));
    assert!(!err.is_job_never_started());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_wait_reports_job_id() {
    let service = FakeJobService::new().into_arc();
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    let orchestrator = ExportOrchestrator::new(Arc::clone(&service), &config(), rx).unwrap();

    let err = orchestrator
        .export_to_storage(&project(), &source(), &destinations(), true)
        .await
        .unwrap_err();

    match err {
        JobRelayError::Cancelled { job_id } => assert!(job_id.starts_with("direct-export-")),
        other => panic!("expected cancellation, got {other:?}"),
    }
    // Submission is not cancellable; only the wait is
    assert_eq!(service.create_calls(), 1);
    assert_eq!(service.fetch_calls(), 0);
}

#[tokio::test]
async fn test_empty_destinations_rejected_before_submission() {
    let service = FakeJobService::new().into_arc();
    let (_tx, rx) = watch::channel(false);
    let orchestrator = ExportOrchestrator::new(Arc::clone(&service), &config(), rx).unwrap();

    let err = orchestrator
        .export_to_storage(&project(), &source(), &[], true)
        .await
        .unwrap_err();

    assert!(matches!(err, JobRelayError::InvalidArgument(_)));
    assert_eq!(service.create_calls(), 0);
}

#[tokio::test]
async fn test_configured_prefix_and_location_are_used() {
    let service = FakeJobService::new().into_arc();
    let mut config = config();
    config.jobs.export_prefix = "nightly_orders".to_string();
    config.service.location = Some("EU".to_string());
    let (_tx, rx) = watch::channel(false);
    let orchestrator = ExportOrchestrator::new(Arc::clone(&service), &config, rx).unwrap();

    let handle = orchestrator
        .export_to_storage(&project(), &source(), &destinations(), false)
        .await
        .unwrap();

    assert!(handle.job_id().as_str().starts_with("nightly_orders-"));
    assert_eq!(handle.reference.location.as_deref(), Some("EU"));
}
