//! The in-memory backend behind the service traits

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use pretty_assertions::assert_eq;
use sensus_client::{FailureMode, MockBackend, SensusService};
use sensus_core::{IndicatorCode, Tier, evaluate, types::SensusFilter, validation};
use std::{sync::Arc, time::Duration};

#[tokio::test]
async fn test_service_trait_object_round_trip() {
    init_test_logging();
    let service: Arc<dyn SensusService> = Arc::new(MockBackend::new());

    let created = service.create_sensus(&valid_census()).await.unwrap();
    let fetched = service.get_sensus(created.id).await.unwrap();
    assert_eq!(created, fetched);

    let mut changed = valid_census();
    changed.jml_masuk = 13;
    let updated = service.update_sensus(created.id, &changed).await.unwrap();
    assert_eq!(updated.jml_pasien_akhir, 40);
    assert_eq!(updated.bor, 100.0);
    assert_eq!(evaluate(IndicatorCode::Bor, updated.bor).status, Tier::Critical);

    service.delete_sensus(created.id).await.unwrap();
    assert!(service.get_sensus(created.id).await.is_err());
    assert!(service.list_sensus(SensusFilter::default()).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_latency_is_simulated_on_tokio_time() {
    let backend = MockBackend::seeded(validation::today()).with_latency(Duration::from_millis(250));
    let started = tokio::time::Instant::now();

    backend.list_sensus(SensusFilter::default()).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn test_timeout_failure_reports_seconds() {
    let backend = MockBackend::new().with_failure(FailureMode::Timeout { seconds: 30 });

    let err = backend.dashboard_stats(None).await.unwrap_err();
    assert_eq!(err.user_message(), "Permintaan melebihi batas waktu (30 detik)");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_retrain_after_enough_days() {
    let backend = MockBackend::seeded(validation::today());

    let response = backend.retrain_model().await.unwrap();
    assert_eq!(response.status, "success");

    let forecast = backend.predict_bor(30).await.unwrap();
    assert_eq!(forecast.prediksi.len(), 30);
}
