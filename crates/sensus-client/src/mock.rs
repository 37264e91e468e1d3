//! In-memory census backend for testing and offline use

use crate::{
    error::{ClientError, ClientResult},
    services::{
        BangsalService, SensusService, check_forecast_days, preflight_sensus,
    },
};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use sensus_core::{
    MedicalStandards, calculate,
    types::{
        Bangsal, BangsalCreate, BangsalPage, BangsalQuery, BangsalUpdate, BorForecast, BorTrend,
        DashboardStats, ExportFile, ExportFormat, ForecastPoint, Kamar, KamarCreate,
        MonthlyStats, Period, RetrainResponse, SensusCreate, SensusFilter, SensusRecord,
    },
};
use serde::Serialize;
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::time::sleep;
use validator::Validate;

/// Column order of the CSV report
const CSV_HEADER: [&str; 7] = [
    "tanggal",
    "jml_pasien_awal",
    "jml_masuk",
    "jml_keluar",
    "jml_pasien_akhir",
    "tempat_tidur_tersedia",
    "bor",
];

/// One census day in the CSV report
#[derive(Debug, Serialize)]
struct CsvRow {
    tanggal: NaiveDate,
    jml_pasien_awal: u32,
    jml_masuk: u32,
    jml_keluar: u32,
    jml_pasien_akhir: u32,
    tempat_tidur_tersedia: u32,
    bor: f64,
}

impl From<&SensusRecord> for CsvRow {
    fn from(record: &SensusRecord) -> Self {
        Self {
            tanggal: record.tanggal,
            jml_pasien_awal: record.jml_pasien_awal,
            jml_masuk: record.jml_masuk,
            jml_keluar: record.jml_keluar,
            jml_pasien_akhir: record.jml_pasien_akhir,
            tempat_tidur_tersedia: record.tempat_tidur_tersedia,
            bor: round1(record.bor),
        }
    }
}

/// Serialize census rows as CSV with a header line
fn census_csv<'a>(records: impl IntoIterator<Item = &'a SensusRecord>) -> ClientResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| ClientError::from(csv::Error::from(e.into_error())))
}

/// Census days needed before the forecast model can be trained
pub const MIN_TRAINING_DAYS: usize = 10;

/// Failure injected into every call of a [`MockBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureMode {
    /// Connection refused
    Network,
    /// Deadline exceeded
    Timeout {
        /// Reported timeout
        seconds: u64,
    },
    /// Non-success status with a FastAPI-style detail
    Status {
        /// HTTP status code
        status: u16,
        /// Detail message
        message: String,
    },
}

impl FailureMode {
    fn to_error(&self) -> ClientError {
        match self {
            Self::Network => ClientError::network("connection refused (simulated)"),
            Self::Timeout { seconds } => ClientError::timeout(*seconds),
            Self::Status { status, message } => ClientError::status(*status, message.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct MockStore {
    sensus: IndexMap<i64, SensusRecord>,
    next_sensus_id: i64,
    bangsal: IndexMap<i64, Bangsal>,
    next_bangsal_id: i64,
    kamar: Vec<Kamar>,
    next_kamar_id: i64,
    model_trained: bool,
}

/// In-memory census and ward store implementing both service traits
#[derive(Debug, Clone)]
pub struct MockBackend {
    store: Arc<Mutex<MockStore>>,
    failure: Arc<Mutex<Option<FailureMode>>>,
    calls: Arc<AtomicUsize>,
    latency: Duration,
    standards: MedicalStandards,
}

impl MockBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(MockStore::default())),
            failure: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
            latency: Duration::ZERO,
            standards: MedicalStandards::default(),
        }
    }

    /// A backend holding thirty days of census ending at `today`, three wards
    /// with rooms, and a trained forecast model
    pub fn seeded(today: NaiveDate) -> Self {
        let backend = Self::new();
        {
            let mut store = backend.store.lock();
            let tt = 40;
            let mut awal = 30;
            for i in 0..30_u32 {
                let tanggal = today - TimeDelta::days(i64::from(29 - i));
                let jml_keluar = (3 + (i * 3) % 5).min(awal);
                let jml_masuk = (4 + (i * 7) % 5).min(tt + jml_keluar - awal);
                let payload = SensusCreate {
                    tanggal,
                    jml_pasien_awal: awal,
                    jml_masuk,
                    jml_keluar,
                    tempat_tidur_tersedia: tt,
                    hari_rawat: Some(jml_keluar * 7 + i % 3),
                };
                awal = payload.jml_pasien_akhir();
                store.insert_sensus(&payload);
            }
            store.model_trained = true;

            for (nama, kode, jenis, kapasitas, kamar) in [
                ("Melati", "MLT", "Kelas I", 20, 5),
                ("Anggrek", "AGR", "VIP", 10, 10),
                ("ICU Sentral", "ICU", "ICU", 8, 2),
            ] {
                let mut ward = BangsalCreate::new(nama, kode, jenis, kapasitas, kamar);
                ward.is_emergency_ready = jenis == "ICU";
                let id = store.insert_bangsal(ward);
                for nomor in 1..=kamar.min(3) {
                    store.insert_kamar(&KamarCreate {
                        bangsal_id: id,
                        nomor_kamar: format!("{kode}-{nomor:02}"),
                        nama_kamar: None,
                        kapasitas_kamar: kapasitas / kamar,
                        jenis_kamar: Some(jenis.to_string()),
                        fasilitas_kamar: None,
                        is_active: true,
                        status_kebersihan: sensus_core::types::StatusKebersihan::Bersih,
                    });
                }
            }
        }
        backend
    }

    /// Delay every call by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every call
    #[must_use]
    pub fn with_failure(self, failure: FailureMode) -> Self {
        self.set_failure(Some(failure));
        self
    }

    /// Publish different medical standards
    #[must_use]
    pub const fn with_standards(mut self, standards: MedicalStandards) -> Self {
        self.standards = standards;
        self
    }

    /// Start or stop failing calls; clones share the setting
    pub fn set_failure(&self, failure: Option<FailureMode>) {
        *self.failure.lock() = failure;
    }

    /// Number of service calls made so far, failed ones included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of stored census records
    pub fn census_len(&self) -> usize {
        self.store.lock().sensus.len()
    }

    async fn enter(&self) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        match self.failure.lock().as_ref() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn build_record(id: i64, payload: &SensusCreate) -> SensusRecord {
    let akhir = payload.jml_pasien_akhir();
    let tt = payload.tempat_tidur_tersedia;
    let keluar = payload.jml_keluar;
    SensusRecord {
        id,
        tanggal: payload.tanggal,
        jml_pasien_awal: payload.jml_pasien_awal,
        jml_masuk: payload.jml_masuk,
        jml_keluar: keluar,
        jml_pasien_akhir: akhir,
        tempat_tidur_tersedia: tt,
        bor: round1(calculate::bor(akhir, tt)),
        los: payload
            .hari_rawat
            .filter(|_| keluar > 0)
            .map(|hari| round1(calculate::alos(hari, keluar))),
        bto: Some(round1(calculate::bto(keluar, tt, 1))),
        toi: (keluar > 0).then(|| round1(calculate::toi(tt, akhir.min(tt), keluar, 1))),
    }
}

impl MockStore {
    fn insert_sensus(&mut self, payload: &SensusCreate) -> SensusRecord {
        self.next_sensus_id += 1;
        let record = build_record(self.next_sensus_id, payload);
        self.sensus.insert(record.id, record.clone());
        record
    }

    fn date_taken(&self, tanggal: NaiveDate, except: Option<i64>) -> bool {
        self.sensus
            .values()
            .any(|r| r.tanggal == tanggal && Some(r.id) != except)
    }

    fn newest_first(&self) -> Vec<&SensusRecord> {
        let mut records: Vec<_> = self.sensus.values().collect();
        records.sort_by(|a, b| b.tanggal.cmp(&a.tanggal));
        records
    }

    fn insert_bangsal(&mut self, info: BangsalCreate) -> i64 {
        self.next_bangsal_id += 1;
        let now = Utc::now();
        let id = self.next_bangsal_id;
        self.bangsal.insert(
            id,
            Bangsal {
                id,
                tempat_tidur_tersedia: info.kapasitas_total,
                tempat_tidur_terisi: 0,
                info,
                created_at: now,
                updated_at: now,
                occupancy_rate: Some(0.0),
                available_beds: None,
            },
        );
        id
    }

    fn insert_kamar(&mut self, payload: &KamarCreate) -> Kamar {
        self.next_kamar_id += 1;
        let now = Utc::now();
        let kamar = Kamar {
            id: self.next_kamar_id,
            bangsal_id: payload.bangsal_id,
            nomor_kamar: payload.nomor_kamar.clone(),
            nama_kamar: payload.nama_kamar.clone(),
            kapasitas_kamar: payload.kapasitas_kamar,
            jenis_kamar: payload.jenis_kamar.clone(),
            fasilitas_kamar: payload.fasilitas_kamar.clone(),
            is_active: payload.is_active,
            status_kebersihan: payload.status_kebersihan,
            tempat_tidur_terisi: 0,
            is_maintenance: false,
            created_at: now,
            updated_at: now,
            is_available: payload.is_active,
            available_beds: payload.kapasitas_kamar,
        };
        self.kamar.push(kamar.clone());
        kamar
    }

    fn bangsal(&self, id: i64) -> ClientResult<&Bangsal> {
        self.bangsal
            .get(&id)
            .ok_or_else(|| ClientError::not_found(format!("bangsal/{id}")))
    }
}

fn monthly_stats(records: &[&SensusRecord], period: Period) -> DashboardStats {
    let Some(latest) = records.first() else {
        return DashboardStats {
            stats: MonthlyStats::default(),
            peringatan: vec!["Tidak ada data untuk periode ini".to_string()],
            periode: period.to_string(),
            trend_bor: BorTrend::TidakAdaData,
        };
    };

    let days = u32::try_from(records.len()).unwrap_or(u32::MAX);
    let tt_total = latest.tempat_tidur_tersedia;
    let total_masuk: u32 = records.iter().map(|r| r.jml_masuk).sum();
    let total_keluar: u32 = records.iter().map(|r| r.jml_keluar).sum();
    let patient_days: u32 = records.iter().map(|r| r.jml_pasien_akhir).sum();
    let avg_bor = records.iter().map(|r| r.bor).sum::<f64>() / f64::from(days);

    let los = round1(calculate::alos(patient_days, total_keluar));
    let bto = round1(calculate::bto(total_keluar, tt_total, days));
    let toi = if total_keluar == 0 {
        0.0
    } else {
        let idle = f64::from(days) * f64::from(tt_total) - f64::from(patient_days);
        round1((idle / f64::from(total_keluar)).max(0.0))
    };

    let mut peringatan = Vec::new();
    if latest.bor > 90.0 {
        peringatan.push("BOR > 90% - Kapasitas hampir penuh".to_string());
    }
    if latest.bor < 60.0 {
        peringatan.push("BOR < 60% - Utilisasi rendah".to_string());
    }
    if los > 9.0 {
        peringatan.push("LOS > 9 hari - Lama rawat tinggi".to_string());
    }
    if bto < 1.0 {
        peringatan.push("BTO rendah - Efisiensi tempat tidur kurang".to_string());
    }

    let trend_bor = if records.len() >= 6 {
        let recent = records[..3].iter().map(|r| r.bor).sum::<f64>() / 3.0;
        let older = records[3..6].iter().map(|r| r.bor).sum::<f64>() / 3.0;
        if recent > older + 2.0 {
            BorTrend::Meningkat
        } else if recent < older - 2.0 {
            BorTrend::Menurun
        } else {
            BorTrend::Stabil
        }
    } else {
        BorTrend::Stabil
    };

    DashboardStats {
        stats: MonthlyStats {
            tanggal_terakhir: Some(latest.tanggal),
            total_pasien_hari_ini: latest.jml_pasien_akhir,
            bor_terkini: latest.bor,
            rata_rata_bor_bulanan: round1(avg_bor),
            los_bulanan: los,
            bto_bulanan: bto,
            toi_bulanan: toi,
            tt_total,
            jumlah_hari_data: days,
            total_pasien_masuk: total_masuk,
            total_pasien_keluar: total_keluar,
            kapasitas_kosong: i64::from(tt_total) - i64::from(latest.jml_pasien_akhir),
        },
        peringatan,
        periode: period.to_string(),
        trend_bor,
    }
}

fn forecast_advice(points: &[ForecastPoint]) -> &'static str {
    let max = points.iter().map(|p| p.bor).fold(0.0, f64::max);
    let avg = points.iter().map(|p| p.bor).sum::<f64>() / points.len().max(1) as f64;
    if max > 95.0 {
        "KRITIS: BOR diprediksi >95%. Aktifkan protokol darurat!"
    } else if max > 85.0 {
        "TINGGI: BOR diprediksi >85%. Siapkan rencana kontinjensi."
    } else if avg > 75.0 {
        "NORMAL-TINGGI: BOR rata-rata >75%. Pantau terus."
    } else {
        "NORMAL: BOR diprediksi dalam batas aman."
    }
}

#[async_trait]
impl SensusService for MockBackend {
    async fn list_sensus(&self, filter: SensusFilter) -> ClientResult<Vec<SensusRecord>> {
        self.enter().await?;
        let store = self.store.lock();
        Ok(store
            .newest_first()
            .into_iter()
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_sensus(&self, id: i64) -> ClientResult<SensusRecord> {
        self.enter().await?;
        self.store
            .lock()
            .sensus
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("sensus/{id}")))
    }

    async fn create_sensus(&self, payload: &SensusCreate) -> ClientResult<SensusRecord> {
        preflight_sensus(payload)?;
        self.enter().await?;
        let mut store = self.store.lock();
        if store.date_taken(payload.tanggal, None) {
            return Err(ClientError::status(400, "Data untuk tanggal ini sudah ada"));
        }
        let record = store.insert_sensus(payload);
        store.model_trained = store.sensus.len() >= MIN_TRAINING_DAYS;
        Ok(record)
    }

    async fn update_sensus(&self, id: i64, payload: &SensusCreate) -> ClientResult<SensusRecord> {
        preflight_sensus(payload)?;
        self.enter().await?;
        let mut store = self.store.lock();
        if !store.sensus.contains_key(&id) {
            return Err(ClientError::not_found(format!("sensus/{id}")));
        }
        if store.date_taken(payload.tanggal, Some(id)) {
            return Err(ClientError::status(400, "Data untuk tanggal ini sudah ada"));
        }
        let record = build_record(id, payload);
        store.sensus.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_sensus(&self, id: i64) -> ClientResult<()> {
        self.enter().await?;
        self.store
            .lock()
            .sensus
            .shift_remove(&id)
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(format!("sensus/{id}")))
    }

    async fn dashboard_stats(&self, period: Option<Period>) -> ClientResult<DashboardStats> {
        self.enter().await?;
        let store = self.store.lock();
        let records = store.newest_first();
        let period = period.unwrap_or_else(|| {
            records.first().map_or_else(
                || Period::containing(sensus_core::validation::today()),
                |r| Period::containing(r.tanggal),
            )
        });
        let in_month: Vec<_> = records
            .into_iter()
            .filter(|r| period.contains(r.tanggal))
            .collect();
        Ok(monthly_stats(&in_month, period))
    }

    async fn predict_bor(&self, hari: u32) -> ClientResult<BorForecast> {
        check_forecast_days(hari)?;
        self.enter().await?;
        let store = self.store.lock();
        if !store.model_trained {
            return Err(ClientError::backend(
                "Model belum dilatih. Jalankan training dulu melalui endpoint /retrain",
            ));
        }

        let recent: Vec<_> = store.newest_first().into_iter().take(7).collect();
        let Some(last) = recent.first() else {
            return Err(ClientError::backend("Data sensus belum tersedia"));
        };
        let oldest = recent.last().map_or(last.bor, |r| r.bor);
        let slope = (last.bor - oldest) / recent.len().max(2).saturating_sub(1) as f64;

        let prediksi: Vec<_> = (1..=hari)
            .map(|step| ForecastPoint {
                tanggal: (last.tanggal + TimeDelta::days(i64::from(step)))
                    .format("%Y-%m-%d")
                    .to_string(),
                bor: round1((last.bor + slope * f64::from(step)).clamp(0.0, 100.0)),
            })
            .collect();

        Ok(BorForecast {
            rekomendasi: Some(forecast_advice(&prediksi).to_string()),
            prediksi,
            status: Some("success".to_string()),
            error: None,
        })
    }

    async fn retrain_model(&self) -> ClientResult<RetrainResponse> {
        self.enter().await?;
        let mut store = self.store.lock();
        if store.sensus.len() < MIN_TRAINING_DAYS {
            return Err(ClientError::backend(
                "Gagal melatih model. Pastikan data sensus cukup (minimal 10 hari)",
            ));
        }
        store.model_trained = true;
        Ok(RetrainResponse {
            message: Some("Model berhasil dilatih ulang dan siap digunakan".to_string()),
            status: "success".to_string(),
            error: None,
        })
    }

    async fn export(&self, format: ExportFormat, period: Period) -> ClientResult<ExportFile> {
        self.enter().await?;
        let store = self.store.lock();
        let mut rows: Vec<_> = store
            .sensus
            .values()
            .filter(|r| period.contains(r.tanggal))
            .collect();
        rows.sort_by_key(|r| r.tanggal);

        let bytes = census_csv(rows)?;

        Ok(ExportFile {
            filename: format.default_filename(period),
            content_type: format.content_type().to_string(),
            bytes,
        })
    }

    async fn medical_standards(&self) -> ClientResult<MedicalStandards> {
        self.enter().await?;
        Ok(self.standards)
    }
}

#[async_trait]
impl BangsalService for MockBackend {
    async fn list_bangsal(&self, query: &BangsalQuery) -> ClientResult<BangsalPage> {
        query.validate()?;
        self.enter().await?;
        let store = self.store.lock();
        let search = query.search.as_deref().map(str::to_lowercase);

        let matching: Vec<_> = store
            .bangsal
            .values()
            .filter(|b| query.include_inactive || b.info.is_active)
            .filter(|b| {
                search.as_deref().is_none_or(|s| {
                    b.info.nama_bangsal.to_lowercase().contains(s)
                        || b.info.kode_bangsal.to_lowercase().contains(s)
                })
            })
            .filter(|b| {
                query
                    .jenis_bangsal
                    .as_deref()
                    .is_none_or(|j| b.info.jenis_bangsal.eq_ignore_ascii_case(j))
            })
            .filter(|b| {
                query
                    .departemen
                    .as_deref()
                    .is_none_or(|d| b.info.departemen.as_deref() == Some(d))
            })
            .filter(|b| {
                query
                    .is_emergency_ready
                    .is_none_or(|ready| b.info.is_emergency_ready == ready)
            })
            .filter(|b| {
                query
                    .min_available_beds
                    .is_none_or(|min| b.tempat_tidur_tersedia >= min)
            })
            .collect();

        let total = matching.len() as u64;
        let per_page = query.per_page.max(1);
        let pages = u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX);
        let skip = (query.page.saturating_sub(1) as usize).saturating_mul(per_page as usize);

        Ok(BangsalPage {
            total,
            page: query.page,
            per_page,
            pages,
            bangsal: matching
                .into_iter()
                .skip(skip)
                .take(per_page as usize)
                .cloned()
                .collect(),
        })
    }

    async fn get_bangsal(&self, id: i64) -> ClientResult<Bangsal> {
        self.enter().await?;
        self.store.lock().bangsal(id).cloned()
    }

    async fn get_bangsal_by_kode(&self, kode: &str) -> ClientResult<Bangsal> {
        self.enter().await?;
        let kode = kode.trim();
        self.store
            .lock()
            .bangsal
            .values()
            .find(|b| b.info.kode_bangsal.eq_ignore_ascii_case(kode))
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("bangsal/kode/{kode}")))
    }

    async fn create_bangsal(&self, payload: &BangsalCreate) -> ClientResult<Bangsal> {
        payload.validate()?;
        self.enter().await?;
        let mut store = self.store.lock();
        if store
            .bangsal
            .values()
            .any(|b| b.info.kode_bangsal.eq_ignore_ascii_case(&payload.kode_bangsal))
        {
            return Err(ClientError::status(400, "Kode bangsal sudah digunakan"));
        }
        let id = store.insert_bangsal(payload.clone());
        store.bangsal(id).cloned()
    }

    async fn update_bangsal(&self, id: i64, payload: &BangsalUpdate) -> ClientResult<Bangsal> {
        self.enter().await?;
        let mut store = self.store.lock();
        let ward = store
            .bangsal
            .get_mut(&id)
            .ok_or_else(|| ClientError::not_found(format!("bangsal/{id}")))?;

        let info = &mut ward.info;
        if let Some(v) = &payload.nama_bangsal {
            info.nama_bangsal.clone_from(v);
        }
        if let Some(v) = &payload.kode_bangsal {
            info.kode_bangsal.clone_from(v);
        }
        if let Some(v) = payload.kapasitas_total {
            info.kapasitas_total = v;
        }
        if let Some(v) = payload.jumlah_kamar {
            info.jumlah_kamar = v;
        }
        if let Some(v) = &payload.departemen {
            info.departemen = Some(v.clone());
        }
        if let Some(v) = &payload.jenis_bangsal {
            info.jenis_bangsal.clone_from(v);
        }
        if let Some(v) = payload.is_active {
            info.is_active = v;
        }
        if let Some(v) = payload.is_emergency_ready {
            info.is_emergency_ready = v;
        }
        if let Some(v) = &payload.kepala_bangsal {
            info.kepala_bangsal = Some(v.clone());
        }
        if let Some(v) = payload.tarif_per_hari {
            info.tarif_per_hari = Some(v);
        }
        if let Some(v) = &payload.keterangan {
            info.keterangan = Some(v.clone());
        }
        if let Some(v) = payload.tempat_tidur_tersedia {
            ward.tempat_tidur_tersedia = v;
        }
        if let Some(v) = payload.tempat_tidur_terisi {
            ward.tempat_tidur_terisi = v;
        }
        ward.occupancy_rate = Some(round1(calculate::bor(
            ward.tempat_tidur_terisi,
            ward.info.kapasitas_total,
        )));
        ward.updated_at = Utc::now();
        Ok(ward.clone())
    }

    async fn delete_bangsal(&self, id: i64) -> ClientResult<()> {
        self.enter().await?;
        let mut store = self.store.lock();
        store
            .bangsal
            .shift_remove(&id)
            .ok_or_else(|| ClientError::not_found(format!("bangsal/{id}")))?;
        store.kamar.retain(|k| k.bangsal_id != id);
        Ok(())
    }

    async fn list_rooms(&self, bangsal_id: i64) -> ClientResult<Vec<Kamar>> {
        self.enter().await?;
        let store = self.store.lock();
        store.bangsal(bangsal_id)?;
        Ok(store
            .kamar
            .iter()
            .filter(|k| k.bangsal_id == bangsal_id)
            .cloned()
            .collect())
    }

    async fn create_room(&self, payload: &KamarCreate) -> ClientResult<Kamar> {
        payload.validate()?;
        self.enter().await?;
        let mut store = self.store.lock();
        store.bangsal(payload.bangsal_id)?;
        if store.kamar.iter().any(|k| {
            k.bangsal_id == payload.bangsal_id && k.nomor_kamar == payload.nomor_kamar
        }) {
            return Err(ClientError::status(400, "Nomor kamar sudah ada di bangsal ini"));
        }
        Ok(store.insert_kamar(payload))
    }
}
