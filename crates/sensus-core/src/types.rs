//! Wire types exchanged with the census backend

use crate::{
    indicator::{IndicatorCode, IndicatorReading},
    validation,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use validator::Validate;

/// Payload for creating or replacing a daily census record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validation::validate_census_totals"))]
pub struct SensusCreate {
    /// Census date
    #[validate(custom(function = "validation::validate_census_date"))]
    pub tanggal: NaiveDate,

    /// Patients at start of day
    #[validate(range(max = 1000, message = "Nilai terlalu besar, maksimal 1000"))]
    pub jml_pasien_awal: u32,

    /// Admissions
    #[validate(range(max = 500, message = "Nilai terlalu besar, maksimal 500"))]
    pub jml_masuk: u32,

    /// Discharges
    #[validate(range(max = 500, message = "Nilai terlalu besar, maksimal 500"))]
    pub jml_keluar: u32,

    /// Available beds
    #[validate(range(min = 1, max = 1000, message = "Jumlah tempat tidur harus 1 sampai 1000"))]
    pub tempat_tidur_tersedia: u32,

    /// Total inpatient days, used for LOS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 100_000, message = "Nilai terlalu besar, maksimal 100000"))]
    pub hari_rawat: Option<u32>,
}

impl SensusCreate {
    /// An empty census for the given date, the starting point of the entry form
    pub const fn blank(tanggal: NaiveDate) -> Self {
        Self {
            tanggal,
            jml_pasien_awal: 0,
            jml_masuk: 0,
            jml_keluar: 0,
            tempat_tidur_tersedia: 0,
            hari_rawat: None,
        }
    }

    /// Patients at end of day
    pub const fn jml_pasien_akhir(&self) -> u32 {
        crate::calculate::patients_end(self.jml_pasien_awal, self.jml_masuk, self.jml_keluar)
    }
}

/// A stored daily census record with backend-computed indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensusRecord {
    /// Record id
    pub id: i64,
    /// Census date
    pub tanggal: NaiveDate,
    /// Patients at start of day
    pub jml_pasien_awal: u32,
    /// Admissions
    pub jml_masuk: u32,
    /// Discharges
    pub jml_keluar: u32,
    /// Patients at end of day
    pub jml_pasien_akhir: u32,
    /// Available beds
    pub tempat_tidur_tersedia: u32,
    /// Bed Occupancy Rate
    pub bor: f64,
    /// Length of Stay
    #[serde(default)]
    pub los: Option<f64>,
    /// Bed Turn Over
    #[serde(default)]
    pub bto: Option<f64>,
    /// Turn Over Interval
    #[serde(default)]
    pub toi: Option<f64>,
}

impl SensusRecord {
    /// Indicator readings present on this record, in display order
    pub fn readings(&self) -> Vec<IndicatorReading> {
        [
            (IndicatorCode::Bor, Some(self.bor)),
            (IndicatorCode::Los, self.los),
            (IndicatorCode::Bto, self.bto),
            (IndicatorCode::Toi, self.toi),
        ]
        .into_iter()
        .filter_map(|(code, value)| value.map(|v| IndicatorReading::new(code, v, self.tanggal)))
        .collect()
    }

    /// The payload that would recreate this record
    pub const fn to_create(&self) -> SensusCreate {
        SensusCreate {
            tanggal: self.tanggal,
            jml_pasien_awal: self.jml_pasien_awal,
            jml_masuk: self.jml_masuk,
            jml_keluar: self.jml_keluar,
            tempat_tidur_tersedia: self.tempat_tidur_tersedia,
            hari_rawat: None,
        }
    }
}

/// Query for the census list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensusFilter {
    /// Maximum number of records, newest first
    pub limit: u32,
}

impl Default for SensusFilter {
    fn default() -> Self {
        Self { limit: 30 }
    }
}

/// A reporting month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Month, 1-12
    pub bulan: u32,
    /// Year
    pub tahun: i32,
}

impl Period {
    /// Create a period, rejecting months outside 1-12
    pub fn new(bulan: u32, tahun: i32) -> crate::Result<Self> {
        if !(1..=12).contains(&bulan) {
            return Err(crate::Error::validation("bulan", "Bulan harus 1 sampai 12"));
        }
        Ok(Self { bulan, tahun })
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            bulan: date.month(),
            tahun: date.year(),
        }
    }

    /// Whether `date` falls inside this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::containing(date) == *self
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.bulan, self.tahun)
    }
}

/// Aggregated statistics for one month
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyStats {
    /// Latest census date in the month
    pub tanggal_terakhir: Option<NaiveDate>,
    /// Patients at end of the latest day
    pub total_pasien_hari_ini: u32,
    /// BOR of the latest day
    pub bor_terkini: f64,
    /// Mean daily BOR over the month
    pub rata_rata_bor_bulanan: f64,
    /// Monthly LOS
    pub los_bulanan: f64,
    /// Monthly BTO
    pub bto_bulanan: f64,
    /// Monthly TOI
    pub toi_bulanan: f64,
    /// Beds available on the latest day
    pub tt_total: u32,
    /// Number of census days in the month
    pub jumlah_hari_data: u32,
    /// Admissions over the month
    pub total_pasien_masuk: u32,
    /// Discharges over the month
    pub total_pasien_keluar: u32,
    /// Empty beds on the latest day
    pub kapasitas_kosong: i64,
}

impl MonthlyStats {
    /// Monthly indicator readings, dated at the latest census day
    pub fn readings(&self) -> Vec<IndicatorReading> {
        let date = self.tanggal_terakhir.unwrap_or_default();
        [
            (IndicatorCode::Bor, self.rata_rata_bor_bulanan),
            (IndicatorCode::Los, self.los_bulanan),
            (IndicatorCode::Bto, self.bto_bulanan),
            (IndicatorCode::Toi, self.toi_bulanan),
        ]
        .into_iter()
        .map(|(code, value)| IndicatorReading::new(code, value, date))
        .collect()
    }
}

/// BOR direction reported by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorTrend {
    /// Rising
    Meningkat,
    /// Falling
    Menurun,
    /// Flat
    Stabil,
    /// Too little data
    TidakAdaData,
}

impl fmt::Display for BorTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Meningkat => "meningkat",
            Self::Menurun => "menurun",
            Self::Stabil => "stabil",
            Self::TidakAdaData => "tidak ada data",
        })
    }
}

/// Payload of `GET /dashboard/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Monthly figures
    pub stats: MonthlyStats,
    /// Warning lines
    #[serde(default)]
    pub peringatan: Vec<String>,
    /// Period as `MM/YYYY`
    pub periode: String,
    /// BOR direction
    pub trend_bor: BorTrend,
}

/// One forecast point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Forecast date, `YYYY-MM-DD`
    pub tanggal: String,
    /// Forecast BOR
    pub bor: f64,
}

/// Payload of `GET /prediksi/bor`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BorForecast {
    /// Forecast points
    #[serde(default)]
    pub prediksi: Vec<ForecastPoint>,
    /// Recommendation text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rekomendasi: Option<String>,
    /// Status string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Error reported by the model despite a successful response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload of `POST /prediksi/retrain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrainResponse {
    /// Human-readable result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Status string
    pub status: String,
    /// Error reported by the trainer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Generic `{status, data, message}` envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Status string
    pub status: String,
    /// Payload
    pub data: T,
    /// Message
    #[serde(default)]
    pub message: Option<String>,
}

/// Plain `{message}` response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message
    #[serde(default)]
    pub message: String,
}

/// Ward fields shared by create and response payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BangsalCreate {
    /// Ward name
    #[validate(length(min = 1, max = 100))]
    pub nama_bangsal: String,
    /// Unique ward code
    #[validate(length(min = 1, max = 20))]
    pub kode_bangsal: String,
    /// Total bed capacity
    pub kapasitas_total: u32,
    /// Number of rooms
    pub jumlah_kamar: u32,
    /// Department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departemen: Option<String>,
    /// Ward class, e.g. VIP, Kelas I, ICU
    #[validate(length(min = 1, max = 50))]
    pub jenis_bangsal: String,
    /// Category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kategori: Option<String>,
    /// Floor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lantai: Option<u32>,
    /// Building
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gedung: Option<String>,
    /// Location details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lokasi_detail: Option<String>,
    /// Active flag
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Emergency readiness
    #[serde(default)]
    pub is_emergency_ready: bool,
    /// Head nurse
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kepala_bangsal: Option<String>,
    /// Nurse on duty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perawat_jaga: Option<String>,
    /// Responsible physician
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dokter_penanggung_jawab: Option<String>,
    /// Daily rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub tarif_per_hari: Option<f64>,
    /// Facilities, JSON text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fasilitas: Option<String>,
    /// Notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keterangan: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl BangsalCreate {
    /// A minimal active ward
    pub fn new<N, K, J>(nama: N, kode: K, jenis: J, kapasitas_total: u32, jumlah_kamar: u32) -> Self
    where
        N: Into<String>,
        K: Into<String>,
        J: Into<String>,
    {
        Self {
            nama_bangsal: nama.into(),
            kode_bangsal: kode.into(),
            kapasitas_total,
            jumlah_kamar,
            departemen: None,
            jenis_bangsal: jenis.into(),
            kategori: None,
            lantai: None,
            gedung: None,
            lokasi_detail: None,
            is_active: true,
            is_emergency_ready: false,
            kepala_bangsal: None,
            perawat_jaga: None,
            dokter_penanggung_jawab: None,
            tarif_per_hari: None,
            fasilitas: None,
            keterangan: None,
        }
    }
}

/// Partial ward update; absent fields are left unchanged
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BangsalUpdate {
    /// Ward name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama_bangsal: Option<String>,
    /// Ward code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kode_bangsal: Option<String>,
    /// Total capacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kapasitas_total: Option<u32>,
    /// Number of rooms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jumlah_kamar: Option<u32>,
    /// Available beds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempat_tidur_tersedia: Option<u32>,
    /// Occupied beds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempat_tidur_terisi: Option<u32>,
    /// Department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departemen: Option<String>,
    /// Ward class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jenis_bangsal: Option<String>,
    /// Active flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Emergency readiness
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_emergency_ready: Option<bool>,
    /// Head nurse
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kepala_bangsal: Option<String>,
    /// Daily rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tarif_per_hari: Option<f64>,
    /// Notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keterangan: Option<String>,
}

/// A ward as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bangsal {
    /// Ward id
    pub id: i64,
    /// Descriptive fields
    #[serde(flatten)]
    pub info: BangsalCreate,
    /// Available beds
    pub tempat_tidur_tersedia: u32,
    /// Occupied beds
    pub tempat_tidur_terisi: u32,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Occupancy percentage
    #[serde(default)]
    pub occupancy_rate: Option<f64>,
    /// Free beds
    #[serde(default)]
    pub available_beds: Option<u32>,
}

impl Bangsal {
    /// Occupancy percentage, computed when the backend omitted it
    pub fn occupancy(&self) -> f64 {
        self.occupancy_rate.unwrap_or_else(|| {
            crate::calculate::bor(self.tempat_tidur_terisi, self.info.kapasitas_total)
        })
    }
}

/// Paged ward list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BangsalPage {
    /// Total matching wards
    pub total: u64,
    /// Current page, 1-based
    pub page: u32,
    /// Page size
    pub per_page: u32,
    /// Page count
    pub pages: u32,
    /// Wards on this page
    pub bangsal: Vec<Bangsal>,
}

/// Filters for the ward list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BangsalQuery {
    /// Page, 1-based
    #[validate(range(min = 1))]
    pub page: u32,
    /// Page size
    #[validate(range(min = 1, max = 100))]
    pub per_page: u32,
    /// Include inactive wards
    pub include_inactive: bool,
    /// Free-text search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Ward class filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jenis_bangsal: Option<String>,
    /// Department filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departemen: Option<String>,
    /// Emergency readiness filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_emergency_ready: Option<bool>,
    /// Minimum free beds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_available_beds: Option<u32>,
}

impl Default for BangsalQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            include_inactive: false,
            search: None,
            jenis_bangsal: None,
            departemen: None,
            is_emergency_ready: None,
            min_available_beds: None,
        }
    }
}

impl BangsalQuery {
    /// Query string pairs, skipping unset filters
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
            ("include_inactive", self.include_inactive.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(jenis) = &self.jenis_bangsal {
            pairs.push(("jenis_bangsal", jenis.clone()));
        }
        if let Some(departemen) = &self.departemen {
            pairs.push(("departemen", departemen.clone()));
        }
        if let Some(ready) = self.is_emergency_ready {
            pairs.push(("is_emergency_ready", ready.to_string()));
        }
        if let Some(min) = self.min_available_beds {
            pairs.push(("min_available_beds", min.to_string()));
        }
        pairs
    }
}

/// Room cleanliness status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusKebersihan {
    /// Clean
    #[default]
    Bersih,
    /// Dirty
    Kotor,
    /// Under maintenance
    Maintenance,
}

impl fmt::Display for StatusKebersihan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bersih => "Bersih",
            Self::Kotor => "Kotor",
            Self::Maintenance => "Maintenance",
        })
    }
}

impl FromStr for StatusKebersihan {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bersih" => Ok(Self::Bersih),
            "kotor" => Ok(Self::Kotor),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(crate::Error::validation(
                "status_kebersihan",
                "Status kebersihan harus salah satu dari: Bersih, Kotor, Maintenance",
            )),
        }
    }
}

/// Payload for adding a room to a ward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct KamarCreate {
    /// Owning ward
    pub bangsal_id: i64,
    /// Room number
    #[validate(length(min = 1, max = 20))]
    pub nomor_kamar: String,
    /// Room name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama_kamar: Option<String>,
    /// Bed count
    #[validate(range(min = 1))]
    pub kapasitas_kamar: u32,
    /// Room class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jenis_kamar: Option<String>,
    /// Facilities, JSON text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fasilitas_kamar: Option<String>,
    /// Active flag
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Cleanliness
    #[serde(default)]
    pub status_kebersihan: StatusKebersihan,
}

/// A room as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kamar {
    /// Room id
    pub id: i64,
    /// Owning ward
    pub bangsal_id: i64,
    /// Room number
    pub nomor_kamar: String,
    /// Room name
    #[serde(default)]
    pub nama_kamar: Option<String>,
    /// Bed count
    pub kapasitas_kamar: u32,
    /// Room class
    #[serde(default)]
    pub jenis_kamar: Option<String>,
    /// Facilities
    #[serde(default)]
    pub fasilitas_kamar: Option<String>,
    /// Active flag
    pub is_active: bool,
    /// Cleanliness
    pub status_kebersihan: StatusKebersihan,
    /// Occupied beds
    pub tempat_tidur_terisi: u32,
    /// Maintenance flag
    pub is_maintenance: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Whether the room can take a patient
    pub is_available: bool,
    /// Free beds
    pub available_beds: u32,
}

/// Export report kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Census workbook
    Excel,
    /// Workbook with forecast sheet
    ExcelPrediksi,
    /// Plain CSV
    Csv,
}

impl ExportFormat {
    /// Path segment under `/export/`
    pub const fn path(self) -> &'static str {
        match self {
            Self::Excel => "excel",
            Self::ExcelPrediksi => "excel-prediksi",
            Self::Csv => "csv",
        }
    }

    /// File extension for fallback names
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Excel | Self::ExcelPrediksi => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// Expected content type
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Excel | Self::ExcelPrediksi => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Csv => "text/csv",
        }
    }

    /// Fallback file name for a period
    pub fn default_filename(self, period: Period) -> String {
        format!(
            "sensus_{}_{}.{}",
            period.bulan,
            period.tahun,
            self.extension()
        )
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ExportFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "excel" | "xlsx" => Ok(Self::Excel),
            "excel-prediksi" | "excel_prediksi" => Ok(Self::ExcelPrediksi),
            "csv" => Ok(Self::Csv),
            other => Err(crate::Error::validation(
                "format",
                format!("Format export tidak dikenal: {other}"),
            )),
        }
    }
}

/// A downloaded report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Sanitized file name
    pub filename: String,
    /// Content type reported by the server
    pub content_type: String,
    /// File body
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn record_readings_skip_missing_indicators() {
        let record: SensusRecord = serde_json::from_value(json!({
            "id": 7,
            "tanggal": "2025-03-14",
            "jml_pasien_awal": 30,
            "jml_masuk": 5,
            "jml_keluar": 3,
            "jml_pasien_akhir": 32,
            "tempat_tidur_tersedia": 40,
            "bor": 80.0,
            "los": null,
            "toi": 2.5
        }))
        .unwrap();

        let readings = record.readings();
        let codes: Vec<_> = readings.iter().map(|r| r.code).collect();
        assert_eq!(codes, vec![IndicatorCode::Bor, IndicatorCode::Toi]);
        assert_eq!(readings[0].measured_at, date(2025, 3, 14));
    }

    #[test]
    fn dashboard_stats_decode_empty_month() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "stats": {
                "tanggal_terakhir": "2025-02-01",
                "total_pasien_hari_ini": 0,
                "bor_terkini": 0,
                "rata_rata_bor_bulanan": 0,
                "los_bulanan": 0,
                "bto_bulanan": 0,
                "toi_bulanan": 0,
                "tt_total": 0,
                "jumlah_hari_data": 0,
                "total_pasien_masuk": 0,
                "total_pasien_keluar": 0,
                "kapasitas_kosong": 0
            },
            "peringatan": ["Tidak ada data untuk periode ini"],
            "periode": "02/2025",
            "trend_bor": "tidak_ada_data"
        }))
        .unwrap();

        assert_eq!(stats.trend_bor, BorTrend::TidakAdaData);
        assert_eq!(stats.stats.readings().len(), 4);
    }

    #[test]
    fn period_display_and_validation() {
        assert_eq!(Period::new(3, 2025).unwrap().to_string(), "03/2025");
        assert!(Period::new(13, 2025).is_err());
        assert!(Period::new(3, 2025).unwrap().contains(date(2025, 3, 31)));
    }

    #[test]
    fn bangsal_flattens_descriptive_fields() {
        let bangsal: Bangsal = serde_json::from_value(json!({
            "id": 1,
            "nama_bangsal": "Melati",
            "kode_bangsal": "MLT",
            "kapasitas_total": 20,
            "jumlah_kamar": 5,
            "jenis_bangsal": "Kelas II",
            "is_active": true,
            "is_emergency_ready": false,
            "tempat_tidur_tersedia": 5,
            "tempat_tidur_terisi": 15,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(bangsal.info.kode_bangsal, "MLT");
        assert_eq!(bangsal.occupancy(), 75.0);
    }

    #[test]
    fn bangsal_query_pairs_skip_unset_filters() {
        let query = BangsalQuery {
            search: Some("icu".to_string()),
            min_available_beds: Some(2),
            ..BangsalQuery::default()
        };

        let pairs = query.to_pairs();
        assert!(pairs.contains(&("search", "icu".to_string())));
        assert!(pairs.contains(&("min_available_beds", "2".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "departemen"));
    }

    #[test]
    fn export_format_paths_and_fallback_names() {
        let period = Period::new(3, 2025).unwrap();
        assert_eq!(ExportFormat::ExcelPrediksi.path(), "excel-prediksi");
        assert_eq!(ExportFormat::Csv.default_filename(period), "sensus_3_2025.csv");
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn room_status_defaults_to_clean() {
        let room: KamarCreate = serde_json::from_value(json!({
            "bangsal_id": 1,
            "nomor_kamar": "101",
            "kapasitas_kamar": 2
        }))
        .unwrap();
        assert_eq!(room.status_kebersihan, StatusKebersihan::Bersih);
        assert!(room.is_active);
        assert!(room.validate().is_ok());
    }
}
