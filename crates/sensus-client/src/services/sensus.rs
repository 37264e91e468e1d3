use super::{
    NO_QUERY, SensusService, check_forecast, check_forecast_days, check_retrain, preflight_sensus,
};
use crate::{
    ApiClient,
    error::{ClientError, ClientResult},
};
use async_trait::async_trait;
use reqwest::{
    Method,
    header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE},
};
use sensus_core::{
    MedicalStandards,
    types::{
        ApiEnvelope, BorForecast, DashboardStats, ExportFile, ExportFormat, Period,
        RetrainResponse, SensusCreate, SensusFilter, SensusRecord,
    },
    utils::filename_from_content_disposition,
};
use tracing::{info, instrument};

#[async_trait]
impl SensusService for ApiClient {
    async fn list_sensus(&self, filter: SensusFilter) -> ClientResult<Vec<SensusRecord>> {
        self.get_json("sensus/", &[("limit", filter.limit)]).await
    }

    async fn get_sensus(&self, id: i64) -> ClientResult<SensusRecord> {
        self.get_json(&format!("sensus/{id}"), NO_QUERY).await
    }

    #[instrument(skip_all, fields(tanggal = %payload.tanggal))]
    async fn create_sensus(&self, payload: &SensusCreate) -> ClientResult<SensusRecord> {
        preflight_sensus(payload)?;
        let record: SensusRecord = self.send_json(Method::POST, "sensus/", payload).await?;
        info!(id = record.id, bor = record.bor, "census record created");
        Ok(record)
    }

    #[instrument(skip(self, payload))]
    async fn update_sensus(&self, id: i64, payload: &SensusCreate) -> ClientResult<SensusRecord> {
        preflight_sensus(payload)?;
        self.send_json(Method::PUT, &format!("sensus/{id}"), payload).await
    }

    #[instrument(skip(self))]
    async fn delete_sensus(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("sensus/{id}")).await?;
        info!(id, "census record deleted");
        Ok(())
    }

    async fn dashboard_stats(&self, period: Option<Period>) -> ClientResult<DashboardStats> {
        match period {
            Some(period) => {
                self.get_json(
                    "dashboard/stats",
                    &[("bulan", i64::from(period.bulan)), ("tahun", i64::from(period.tahun))],
                )
                .await
            }
            None => self.get_json("dashboard/stats", NO_QUERY).await,
        }
    }

    async fn predict_bor(&self, hari: u32) -> ClientResult<BorForecast> {
        check_forecast_days(hari)?;
        let forecast = self.get_json("prediksi/bor", &[("hari", hari)]).await?;
        check_forecast(forecast)
    }

    #[instrument(skip(self))]
    async fn retrain_model(&self) -> ClientResult<RetrainResponse> {
        let response = self
            .send_json(Method::POST, "prediksi/retrain", &serde_json::json!({}))
            .await?;
        let response = check_retrain(response)?;
        info!(status = %response.status, "forecast model retrained");
        Ok(response)
    }

    #[instrument(skip_all, fields(format = %format, period = %period))]
    async fn export(&self, format: ExportFormat, period: Period) -> ClientResult<ExportFile> {
        let path = format!("export/{}", format.path());
        let request = self
            .request(Method::GET, &path)
            .header(ACCEPT, format.content_type())
            .query(&[("bulan", i64::from(period.bulan)), ("tahun", i64::from(period.tahun))]);
        let response = self.send(request, &path).await?;

        let headers = response.headers();
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| format.default_filename(period));
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| format.content_type().to_string(), ToString::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?
            .to_vec();
        if bytes.is_empty() {
            return Err(ClientError::backend("File export kosong"));
        }

        info!(%filename, size = bytes.len(), "report downloaded");
        Ok(ExportFile {
            filename,
            content_type,
            bytes,
        })
    }

    async fn medical_standards(&self) -> ClientResult<MedicalStandards> {
        let envelope: ApiEnvelope<MedicalStandards> =
            self.get_json("standards/medical", NO_QUERY).await?;
        if envelope.status != "success" {
            let message = envelope
                .message
                .unwrap_or_else(|| "Standar medis tidak tersedia".to_string());
            return Err(ClientError::backend(message));
        }
        Ok(envelope.data)
    }
}

