//! Service traits for the census backend
//!
//! Both traits are implemented by [`ApiClient`](crate::ApiClient) for the real
//! backend and by [`MockBackend`](crate::MockBackend) for tests and offline use.

mod bangsal;
mod sensus;

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use sensus_core::{
    MedicalStandards,
    types::{
        Bangsal, BangsalCreate, BangsalPage, BangsalQuery, BangsalUpdate, BorForecast,
        DashboardStats, ExportFile, ExportFormat, Kamar, KamarCreate, Period, RetrainResponse,
        SensusCreate, SensusFilter, SensusRecord,
    },
    validation,
};
use std::ops::RangeInclusive;

const NO_QUERY: &[(&str, &str)] = &[];

/// Forecast horizons the backend accepts
pub const FORECAST_DAYS: RangeInclusive<u32> = 1..=30;

/// Daily census, dashboard, forecast and report operations
#[async_trait]
pub trait SensusService: Send + Sync {
    /// Newest census records first
    async fn list_sensus(&self, filter: SensusFilter) -> ClientResult<Vec<SensusRecord>>;

    /// One census record
    async fn get_sensus(&self, id: i64) -> ClientResult<SensusRecord>;

    /// Create a census record; rejected locally when it fails validation
    async fn create_sensus(&self, payload: &SensusCreate) -> ClientResult<SensusRecord>;

    /// Replace a census record
    async fn update_sensus(&self, id: i64, payload: &SensusCreate) -> ClientResult<SensusRecord>;

    /// Delete a census record
    async fn delete_sensus(&self, id: i64) -> ClientResult<()>;

    /// Monthly statistics; the backend picks the latest month when `period` is `None`
    async fn dashboard_stats(&self, period: Option<Period>) -> ClientResult<DashboardStats>;

    /// BOR forecast for the next `hari` days
    async fn predict_bor(&self, hari: u32) -> ClientResult<BorForecast>;

    /// Retrain the forecast model
    async fn retrain_model(&self) -> ClientResult<RetrainResponse>;

    /// Download a report
    async fn export(&self, format: ExportFormat, period: Period) -> ClientResult<ExportFile>;

    /// Server-published indicator standards
    async fn medical_standards(&self) -> ClientResult<MedicalStandards>;
}

/// Ward and room operations
#[async_trait]
pub trait BangsalService: Send + Sync {
    /// One page of wards
    async fn list_bangsal(&self, query: &BangsalQuery) -> ClientResult<BangsalPage>;

    /// Ward by id
    async fn get_bangsal(&self, id: i64) -> ClientResult<Bangsal>;

    /// Ward by its unique code
    async fn get_bangsal_by_kode(&self, kode: &str) -> ClientResult<Bangsal>;

    /// Create a ward
    async fn create_bangsal(&self, payload: &BangsalCreate) -> ClientResult<Bangsal>;

    /// Apply a partial update
    async fn update_bangsal(&self, id: i64, payload: &BangsalUpdate) -> ClientResult<Bangsal>;

    /// Delete a ward
    async fn delete_bangsal(&self, id: i64) -> ClientResult<()>;

    /// Rooms of a ward
    async fn list_rooms(&self, bangsal_id: i64) -> ClientResult<Vec<Kamar>>;

    /// Add a room to the ward named in the payload
    async fn create_room(&self, payload: &KamarCreate) -> ClientResult<Kamar>;
}

/// Run the census entry rules before anything is sent
pub fn preflight_sensus(payload: &SensusCreate) -> ClientResult<()> {
    let errors = validation::validate_sensus(payload, validation::today());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ClientError::from(errors))
    }
}

/// Reject forecast horizons the backend would refuse
pub fn check_forecast_days(hari: u32) -> ClientResult<()> {
    if FORECAST_DAYS.contains(&hari) {
        Ok(())
    } else {
        Err(ClientError::field("hari", "Jumlah hari prediksi harus antara 1-30"))
    }
}

/// Surface an error the backend embedded in a successful forecast
pub fn check_forecast(forecast: BorForecast) -> ClientResult<BorForecast> {
    if let Some(message) = forecast.error.as_deref().filter(|m| !m.is_empty()) {
        return Err(ClientError::backend(message));
    }
    if forecast.status.as_deref() == Some("error") {
        return Err(ClientError::backend("Prediksi gagal diproses"));
    }
    Ok(forecast)
}

/// Surface an error the backend embedded in a successful retrain reply
pub fn check_retrain(response: RetrainResponse) -> ClientResult<RetrainResponse> {
    if response.status == "error" {
        let message = response
            .error
            .unwrap_or_else(|| "Gagal melatih ulang model".to_string());
        return Err(ClientError::backend(message));
    }
    Ok(response)
}
