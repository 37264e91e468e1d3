use super::{BangsalService, NO_QUERY};
use crate::{ApiClient, error::ClientResult};
use async_trait::async_trait;
use reqwest::Method;
use sensus_core::types::{
    Bangsal, BangsalCreate, BangsalPage, BangsalQuery, BangsalUpdate, Kamar, KamarCreate,
};
use tracing::{info, instrument};
use validator::Validate;

#[async_trait]
impl BangsalService for ApiClient {
    async fn list_bangsal(&self, query: &BangsalQuery) -> ClientResult<BangsalPage> {
        query.validate()?;
        self.get_json("bangsal/", &query.to_pairs()).await
    }

    async fn get_bangsal(&self, id: i64) -> ClientResult<Bangsal> {
        self.get_json(&format!("bangsal/{id}"), NO_QUERY).await
    }

    async fn get_bangsal_by_kode(&self, kode: &str) -> ClientResult<Bangsal> {
        let path = format!("bangsal/kode/{}", urlencoding::encode(kode.trim()));
        self.get_json(&path, NO_QUERY).await
    }

    #[instrument(skip_all, fields(kode = %payload.kode_bangsal))]
    async fn create_bangsal(&self, payload: &BangsalCreate) -> ClientResult<Bangsal> {
        payload.validate()?;
        let bangsal: Bangsal = self.send_json(Method::POST, "bangsal/", payload).await?;
        info!(id = bangsal.id, "ward created");
        Ok(bangsal)
    }

    #[instrument(skip(self, payload))]
    async fn update_bangsal(&self, id: i64, payload: &BangsalUpdate) -> ClientResult<Bangsal> {
        self.send_json(Method::PUT, &format!("bangsal/{id}"), payload).await
    }

    #[instrument(skip(self))]
    async fn delete_bangsal(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("bangsal/{id}")).await?;
        info!(id, "ward deleted");
        Ok(())
    }

    async fn list_rooms(&self, bangsal_id: i64) -> ClientResult<Vec<Kamar>> {
        self.get_json(&format!("bangsal/{bangsal_id}/rooms"), NO_QUERY)
            .await
    }

    #[instrument(skip_all, fields(bangsal_id = payload.bangsal_id, nomor = %payload.nomor_kamar))]
    async fn create_room(&self, payload: &KamarCreate) -> ClientResult<Kamar> {
        payload.validate()?;
        let path = format!("bangsal/{}/rooms", payload.bangsal_id);
        let kamar: Kamar = self.send_json(Method::POST, &path, payload).await?;
        info!(id = kamar.id, "room created");
        Ok(kamar)
    }
}
