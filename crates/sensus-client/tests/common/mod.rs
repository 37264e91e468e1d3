//! Shared fixtures for the service layer tests

#![allow(dead_code)]

use chrono::NaiveDate;
use sensus_client::ApiClient;
use sensus_core::{config::ApiConfig, types::SensusCreate, validation};
use serde_json::{Value, json};
use std::sync::Once;
use wiremock::MockServer;

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Client pointed at the mock server's `/api/v1` prefix
pub fn client_for(server: &MockServer) -> ApiClient {
    client_with(server, |_| {})
}

/// Client with a tweaked configuration
pub fn client_with(server: &MockServer, tweak: impl FnOnce(&mut ApiConfig)) -> ApiClient {
    let mut config = ApiConfig {
        base_url: format!("{}/api/v1/", server.uri()),
        timeout_seconds: 5,
        auth_token: None,
    };
    tweak(&mut config);
    ApiClient::new(&config).expect("client config is valid")
}

/// A census payload that passes every local rule
pub fn valid_census() -> SensusCreate {
    SensusCreate {
        tanggal: validation::today(),
        jml_pasien_awal: 30,
        jml_masuk: 5,
        jml_keluar: 3,
        tempat_tidur_tersedia: 40,
        hari_rawat: Some(21),
    }
}

/// Census record JSON as the backend returns it
pub fn record_json(id: i64, tanggal: NaiveDate) -> Value {
    json!({
        "id": id,
        "tanggal": tanggal.to_string(),
        "jml_pasien_awal": 30,
        "jml_masuk": 5,
        "jml_keluar": 3,
        "jml_pasien_akhir": 32,
        "tempat_tidur_tersedia": 40,
        "bor": 80.0,
        "los": 7.0,
        "bto": 0.1,
        "toi": 2.7
    })
}

/// Ward JSON as the backend returns it
pub fn bangsal_json(id: i64, kode: &str) -> Value {
    json!({
        "id": id,
        "nama_bangsal": "ICU Sentral",
        "kode_bangsal": kode,
        "kapasitas_total": 8,
        "jumlah_kamar": 2,
        "jenis_bangsal": "ICU",
        "is_active": true,
        "is_emergency_ready": true,
        "tempat_tidur_tersedia": 2,
        "tempat_tidur_terisi": 6,
        "created_at": "2025-03-01T08:00:00Z",
        "updated_at": "2025-03-10T08:00:00Z",
        "occupancy_rate": 75.0,
        "available_beds": 2
    })
}
