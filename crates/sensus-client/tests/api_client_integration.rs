//! HTTP behaviour of the service layer against a mock backend

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use pretty_assertions::assert_eq;
use sensus_client::{BangsalService, ClientError, SensusService};
use sensus_core::{
    MedicalStandards,
    types::{BangsalQuery, ExportFormat, Period, SensusFilter},
    validation,
};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

#[tokio::test]
async fn test_list_sends_default_headers_and_limit() {
    init_test_logging();
    let server = MockServer::start().await;
    let today = validation::today();

    Mock::given(method("GET"))
        .and(path("/api/v1/sensus/"))
        .and(query_param("limit", "5"))
        .and(header("accept", "application/json"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(header("authorization", "Bearer rahasia"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record_json(7, today)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, |c| c.auth_token = Some("rahasia".to_string()));
    let records = client.list_sensus(SensusFilter { limit: 5 }).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 7);
    assert_eq!(records[0].jml_pasien_akhir, 32);
    assert_eq!(records[0].bor, 80.0);
}

#[tokio::test]
async fn test_create_posts_payload() {
    init_test_logging();
    let server = MockServer::start().await;
    let payload = valid_census();

    Mock::given(method("POST"))
        .and(path("/api/v1/sensus/"))
        .and(body_partial_json(json!({
            "jml_pasien_awal": 30,
            "jml_masuk": 5,
            "jml_keluar": 3,
            "tempat_tidur_tersedia": 40
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_json(11, payload.tanggal)))
        .expect(1)
        .mount(&server)
        .await;

    let record = client_for(&server).create_sensus(&payload).await.unwrap();
    assert_eq!(record.id, 11);
    assert_eq!(record.tanggal, payload.tanggal);
}

#[tokio::test]
async fn test_invalid_census_never_reaches_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut payload = valid_census();
    payload.tempat_tidur_tersedia = 10;

    let err = client_for(&server).create_sensus(&payload).await.unwrap_err();
    assert_eq!(
        err.field_errors().unwrap()["tempat_tidur_tersedia"],
        "Tempat tidur tidak boleh kurang dari pasien awal"
    );
}

#[tokio::test]
async fn test_unprocessable_entity_maps_to_field_errors() {
    init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sensus/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                {"loc": ["body", "jml_masuk"], "msg": "Nilai terlalu besar", "type": "value_error"}
            ]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).create_sensus(&valid_census()).await.unwrap_err();
    assert_eq!(err.field_errors().unwrap()["jml_masuk"], "Nilai terlalu besar");
    assert_eq!(err.user_message(), "Data tidak valid: jml_masuk - Nilai terlalu besar");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_duplicate_date_detail_is_shown_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/sensus/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"detail": "Data untuk tanggal ini sudah ada"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).create_sensus(&valid_census()).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));
    assert_eq!(err.user_message(), "Data untuk tanggal ini sudah ada");
}

#[tokio::test]
async fn test_server_error_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/stats"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Traceback (most recent call last)"))
        .mount(&server)
        .await;

    let err = client_for(&server).dashboard_stats(None).await.unwrap_err();
    assert_eq!(err.user_message(), "Terjadi kesalahan server, hubungi administrator");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sensus/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .mount(&server)
        .await;

    let err = client_for(&server).get_sensus(404).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
    assert_eq!(err.user_message(), "Data tidak ditemukan");
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sensus/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client_with(&server, |c| c.timeout_seconds = 1);
    let err = client.list_sensus(SensusFilter::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout { seconds: 1 }));
    assert_eq!(err.user_message(), "Permintaan melebihi batas waktu (1 detik)");
}

#[tokio::test]
async fn test_dashboard_stats_sends_period() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/stats"))
        .and(query_param("bulan", "3"))
        .and(query_param("tahun", "2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stats": {
                "tanggal_terakhir": "2025-03-31",
                "bor_terkini": 82.5,
                "rata_rata_bor_bulanan": 78.1,
                "los_bulanan": 6.4,
                "bto_bulanan": 3.2,
                "toi_bulanan": 1.8,
                "tt_total": 40,
                "jumlah_hari_data": 31
            },
            "peringatan": [],
            "periode": "03/2025",
            "trend_bor": "meningkat"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let period = Period::new(3, 2025).unwrap();
    let stats = client_for(&server).dashboard_stats(Some(period)).await.unwrap();
    assert_eq!(stats.periode, "03/2025");
    assert_eq!(stats.stats.jumlah_hari_data, 31);
    assert_eq!(stats.stats.total_pasien_masuk, 0);
    assert_eq!(stats.trend_bor, sensus_core::types::BorTrend::Meningkat);
}

#[tokio::test]
async fn test_forecast_embedded_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/prediksi/bor"))
        .and(query_param("hari", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Model belum dilatih. Jalankan training dulu melalui endpoint /retrain",
            "status": "error"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.predict_bor(7).await.unwrap_err();
    assert!(err.user_message().starts_with("Model belum dilatih"));

    let err = client.predict_bor(31).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains_key("hari"));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_export_uses_content_disposition_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/export/excel"))
        .and(query_param("bulan", "3"))
        .and(query_param("tahun", "2025"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "content-disposition",
                    "attachment; filename=sensus_rs_03_2025.xlsx",
                )
                .set_body_raw(b"PK\x03\x04".to_vec(), ExportFormat::Excel.content_type()),
        )
        .mount(&server)
        .await;

    let period = Period::new(3, 2025).unwrap();
    let file = client_for(&server).export(ExportFormat::Excel, period).await.unwrap();
    assert_eq!(file.filename, "sensus_rs_03_2025.xlsx");
    assert_eq!(file.bytes, b"PK\x03\x04");
}

#[tokio::test]
async fn test_export_falls_back_to_default_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/export/csv"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("tanggal,bor\n", "text/csv"))
        .mount(&server)
        .await;

    let period = Period::new(3, 2025).unwrap();
    let file = client_for(&server).export(ExportFormat::Csv, period).await.unwrap();
    assert_eq!(file.filename, ExportFormat::Csv.default_filename(period));
    assert_eq!(file.content_type, "text/csv");
}

#[tokio::test]
async fn test_empty_export_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/export/csv"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let period = Period::new(3, 2025).unwrap();
    let err = client_for(&server).export(ExportFormat::Csv, period).await.unwrap_err();
    assert_eq!(err.user_message(), "File export kosong");
}

#[tokio::test]
async fn test_standards_envelope_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/standards/medical"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": MedicalStandards::default(),
            "message": "Standar medis berhasil diambil"
        })))
        .mount(&server)
        .await;

    let standards = client_for(&server).medical_standards().await.unwrap();
    assert_eq!(standards, MedicalStandards::default());
}

#[tokio::test]
async fn test_ward_lookup_by_code_and_list_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/bangsal/kode/ICU"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bangsal_json(3, "ICU")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/bangsal/"))
        .and(query_param("page", "2"))
        .and(query_param("search", "icu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 21,
            "page": 2,
            "per_page": 20,
            "pages": 2,
            "bangsal": [bangsal_json(3, "ICU")]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ward = client.get_bangsal_by_kode(" ICU ").await.unwrap();
    assert_eq!(ward.info.kode_bangsal, "ICU");
    assert_eq!(ward.occupancy(), 75.0);

    let query = BangsalQuery {
        page: 2,
        search: Some("icu".to_string()),
        ..BangsalQuery::default()
    };
    let page = client.list_bangsal(&query).await.unwrap();
    assert_eq!(page.total, 21);
    assert_eq!(page.bangsal.len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sensus/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_sensus(1).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));
}

#[tokio::test]
async fn test_delete_accepts_message_reply_and_reports_missing() {
    init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/bangsal/3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Bangsal berhasil dihapus"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/sensus/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete_bangsal(3).await.unwrap();

    let err = client.delete_sensus(9).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
    assert_eq!(err.user_message(), "Data tidak ditemukan");
}
