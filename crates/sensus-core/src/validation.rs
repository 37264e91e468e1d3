//! Census entry rules
//!
//! The checks here back both the interactive entry form (one field at a time,
//! raw input) and the typed [`SensusCreate`] payload. Messages are the
//! Indonesian texts shown next to the offending field.

use crate::types::SensusCreate;
use chrono::{Local, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::ValidationError;

/// Field names of the census payload
pub mod fields {
    /// Census date
    pub const TANGGAL: &str = "tanggal";
    /// Patients at start of day
    pub const JML_PASIEN_AWAL: &str = "jml_pasien_awal";
    /// Admissions
    pub const JML_MASUK: &str = "jml_masuk";
    /// Discharges
    pub const JML_KELUAR: &str = "jml_keluar";
    /// Available beds
    pub const TEMPAT_TIDUR_TERSEDIA: &str = "tempat_tidur_tersedia";
    /// Total inpatient days
    pub const HARI_RAWAT: &str = "hari_rawat";
}

/// How far ahead a census date may lie
pub const MAX_FUTURE_DAYS: i64 = 30;

/// How far back a census date may lie
pub const MAX_PAST_DAYS: i64 = 365;

/// Date format accepted for census dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A message attached to one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Message
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Check a raw date input
pub fn check_tanggal(raw: &str, today: NaiveDate) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some("Tanggal harus diisi".to_string());
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => check_date_window(date, today),
        Err(_) => Some("Format tanggal harus YYYY-MM-DD".to_string()),
    }
}

/// Check that a parsed date lies inside the accepted window around `today`
pub fn check_date_window(date: NaiveDate, today: NaiveDate) -> Option<String> {
    if date > today + TimeDelta::days(MAX_FUTURE_DAYS) {
        return Some("Tanggal tidak boleh lebih dari 30 hari ke depan".to_string());
    }
    if date < today - TimeDelta::days(MAX_PAST_DAYS) {
        return Some("Tanggal tidak boleh lebih dari 1 tahun yang lalu".to_string());
    }
    None
}

/// Inclusive bounds and requiredness of a numeric census field
fn count_limits(field: &str) -> Option<(u32, u32, bool)> {
    match field {
        fields::JML_PASIEN_AWAL => Some((0, 1000, true)),
        fields::JML_MASUK | fields::JML_KELUAR => Some((0, 500, true)),
        fields::TEMPAT_TIDUR_TERSEDIA => Some((1, 1000, true)),
        fields::HARI_RAWAT => Some((0, 100_000, false)),
        _ => None,
    }
}

fn label(field: &str) -> &'static str {
    match field {
        fields::JML_PASIEN_AWAL => "Jumlah pasien awal",
        fields::JML_MASUK => "Jumlah pasien masuk",
        fields::JML_KELUAR => "Jumlah pasien keluar",
        fields::TEMPAT_TIDUR_TERSEDIA => "Jumlah tempat tidur",
        fields::HARI_RAWAT => "Hari rawat",
        _ => "Nilai",
    }
}

/// Check a numeric census field; `None` means the input was left empty
pub fn check_count(field: &str, value: Option<f64>) -> Option<String> {
    let (min, max, required) = count_limits(field)?;

    let Some(value) = value else {
        return required.then(|| format!("{} harus diisi", label(field)));
    };

    if !value.is_finite() || value.fract() != 0.0 {
        return Some("Nilai harus berupa bilangan bulat".to_string());
    }
    if value < 0.0 {
        return Some("Nilai tidak boleh negatif".to_string());
    }
    if value < f64::from(min) {
        return Some(format!("{} minimal {min}", label(field)));
    }
    if value > f64::from(max) {
        return Some(format!("Nilai terlalu besar, maksimal {max}"));
    }
    None
}

/// Discharges cannot exceed patients present during the day
pub fn check_keluar(awal: u32, masuk: u32, keluar: u32) -> Option<String> {
    (u64::from(keluar) > u64::from(awal) + u64::from(masuk))
        .then(|| "Pasien keluar tidak boleh melebihi pasien awal + masuk".to_string())
}

/// Available beds cannot be fewer than patients at start of day
pub fn check_tempat_tidur(awal: u32, tempat_tidur: u32) -> Option<String> {
    (tempat_tidur < awal).then(|| "Tempat tidur tidak boleh kurang dari pasien awal".to_string())
}

/// Every rule applied to a typed payload, in field order
pub fn validate_sensus(payload: &SensusCreate, today: NaiveDate) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if let Some(message) = check_date_window(payload.tanggal, today) {
        errors.push(FieldError::new(fields::TANGGAL, message));
    }

    let counts = [
        (fields::JML_PASIEN_AWAL, Some(payload.jml_pasien_awal)),
        (fields::JML_MASUK, Some(payload.jml_masuk)),
        (fields::JML_KELUAR, Some(payload.jml_keluar)),
        (fields::TEMPAT_TIDUR_TERSEDIA, Some(payload.tempat_tidur_tersedia)),
        (fields::HARI_RAWAT, payload.hari_rawat),
    ];
    for (field, value) in counts {
        if let Some(message) = check_count(field, value.map(f64::from)) {
            errors.push(FieldError::new(field, message));
        }
    }

    if !errors.iter().any(|e| e.field == fields::JML_KELUAR)
        && let Some(message) =
            check_keluar(payload.jml_pasien_awal, payload.jml_masuk, payload.jml_keluar)
    {
        errors.push(FieldError::new(fields::JML_KELUAR, message));
    }
    if !errors.iter().any(|e| e.field == fields::TEMPAT_TIDUR_TERSEDIA)
        && let Some(message) =
            check_tempat_tidur(payload.jml_pasien_awal, payload.tempat_tidur_tersedia)
    {
        errors.push(FieldError::new(fields::TEMPAT_TIDUR_TERSEDIA, message));
    }

    errors
}

fn validation_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

/// `validator` hook for the census date window
pub fn validate_census_date(date: &NaiveDate) -> Result<(), ValidationError> {
    match check_date_window(*date, today()) {
        Some(message) => Err(validation_error("tanggal_window", message)),
        None => Ok(()),
    }
}

/// `validator` hook for the cross-field totals
pub fn validate_census_totals(payload: &SensusCreate) -> Result<(), ValidationError> {
    if let Some(message) =
        check_keluar(payload.jml_pasien_awal, payload.jml_masuk, payload.jml_keluar)
    {
        return Err(validation_error("keluar_exceeds_total", message));
    }
    if let Some(message) =
        check_tempat_tidur(payload.jml_pasien_awal, payload.tempat_tidur_tersedia)
    {
        return Err(validation_error("beds_below_patients", message));
    }
    Ok(())
}
