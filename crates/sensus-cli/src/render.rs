//! Plain-text and JSON output
//!
//! Every renderer returns the full text so commands can be tested without
//! capturing stdout.

use crate::error::CliResult;
use sensus_core::{
    EvaluationResult, IndicatorCode, MedicalStandards, Thresholds,
    standards::{Band, TierBands},
    types::{
        Bangsal, BangsalPage, BorForecast, DashboardStats, ExportFile, Kamar, RetrainResponse,
        SensusRecord,
    },
    utils::format_thousands,
};
use serde::Serialize;
use std::path::Path;

/// Pretty-printed JSON
pub fn json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(value).map_err(sensus_core::Error::Serialization)?)
}

fn code_label(result: &EvaluationResult) -> String {
    result
        .code
        .map_or_else(|| "?".to_string(), |code| code.as_str().to_string())
}

fn formatted_value(result: &EvaluationResult) -> String {
    result.code.map_or_else(
        || format!("{:.1}", result.value),
        |code| code.format_value(result.value),
    )
}

/// One indicator card: code, value, tier, message and recommendation
pub fn evaluation(result: &EvaluationResult) -> String {
    let mut lines = vec![format!(
        "{:<4} {:>10}  [{}]",
        code_label(result),
        formatted_value(result),
        result.status.label()
    )];
    if let Some(code) = result.code {
        lines.push(format!("     {}", code.name()));
    }
    lines.push(format!("     {}", result.message));
    lines.push(format!("     Rekomendasi: {}", result.recommendation));
    lines.join("\n")
}

/// Dashboard summary followed by the four indicator cards
pub fn dashboard(stats: &DashboardStats, cards: &[EvaluationResult]) -> String {
    let monthly = &stats.stats;
    let mut lines = vec![format!("Periode {}", stats.periode)];

    if monthly.jumlah_hari_data == 0 {
        lines.push("Belum ada data sensus untuk periode ini".to_string());
    } else {
        if let Some(date) = monthly.tanggal_terakhir {
            lines.push(format!("Data terakhir      : {date}"));
        }
        lines.push(format!("Hari data          : {}", monthly.jumlah_hari_data));
        lines.push(format!(
            "Pasien hari ini    : {}",
            format_thousands(i64::from(monthly.total_pasien_hari_ini))
        ));
        lines.push(format!(
            "Tempat tidur       : {} ({} kosong)",
            monthly.tt_total, monthly.kapasitas_kosong
        ));
        lines.push(format!(
            "Masuk / keluar     : {} / {}",
            format_thousands(i64::from(monthly.total_pasien_masuk)),
            format_thousands(i64::from(monthly.total_pasien_keluar))
        ));
        lines.push(format!("BOR terkini        : {:.1}%", monthly.bor_terkini));
    }
    lines.push(format!("Tren BOR           : {}", stats.trend_bor));
    lines.push(String::new());

    for card in cards {
        lines.push(evaluation(card));
        lines.push(String::new());
    }

    if !stats.peringatan.is_empty() {
        lines.push("Peringatan:".to_string());
        lines.extend(stats.peringatan.iter().map(|w| format!("  ! {w}")));
    }

    lines.join("\n").trim_end().to_string()
}

/// Census list, newest first
pub fn census_table(records: &[SensusRecord]) -> String {
    if records.is_empty() {
        return "Belum ada data sensus".to_string();
    }

    let mut lines = vec![format!(
        "{:>5}  {:<10}  {:>5}  {:>5}  {:>6}  {:>5}  {:>4}  {:>7}",
        "ID", "Tanggal", "Awal", "Masuk", "Keluar", "Akhir", "TT", "BOR"
    )];
    for record in records {
        lines.push(format!(
            "{:>5}  {:<10}  {:>5}  {:>5}  {:>6}  {:>5}  {:>4}  {:>7}",
            record.id,
            record.tanggal,
            record.jml_pasien_awal,
            record.jml_masuk,
            record.jml_keluar,
            record.jml_pasien_akhir,
            record.tempat_tidur_tersedia,
            IndicatorCode::Bor.format_value(record.bor)
        ));
    }
    lines.join("\n")
}

/// One census record with its evaluated indicators
pub fn census_detail(record: &SensusRecord, cards: &[EvaluationResult]) -> String {
    let mut lines = vec![
        format!("Sensus #{} ({})", record.id, record.tanggal),
        format!(
            "Pasien awal {} + masuk {} - keluar {} = akhir {}",
            record.jml_pasien_awal, record.jml_masuk, record.jml_keluar, record.jml_pasien_akhir
        ),
        format!("Tempat tidur tersedia {}", record.tempat_tidur_tersedia),
        String::new(),
    ];
    lines.extend(cards.iter().map(evaluation));
    lines.join("\n")
}

/// Forecast points and the recommendation
pub fn forecast(forecast: &BorForecast) -> String {
    let mut lines = vec!["Prediksi BOR".to_string()];
    for point in &forecast.prediksi {
        lines.push(format!(
            "  {:<10}  {:>7}",
            point.tanggal,
            IndicatorCode::Bor.format_value(point.bor)
        ));
    }
    if let Some(advice) = &forecast.rekomendasi {
        lines.push(String::new());
        lines.push(format!("Rekomendasi: {advice}"));
    }
    lines.join("\n")
}

/// Retrain outcome
pub fn retrain(response: &RetrainResponse) -> String {
    response
        .message
        .clone()
        .unwrap_or_else(|| format!("Status pelatihan: {}", response.status))
}

/// Path a report was written to
pub fn export_saved(file: &ExportFile, path: &Path) -> String {
    format!(
        "Laporan {} ({} byte) disimpan ke {}",
        file.filename,
        format_thousands(i64::try_from(file.bytes.len()).unwrap_or(i64::MAX)),
        path.display()
    )
}

/// Ward list page
pub fn ward_page(page: &BangsalPage) -> String {
    if page.bangsal.is_empty() {
        return "Tidak ada bangsal".to_string();
    }

    let mut lines = vec![format!(
        "{:>4}  {:<8}  {:<24}  {:<10}  {:>9}  {:>7}",
        "ID", "Kode", "Nama", "Jenis", "Terisi", "Hunian"
    )];
    for ward in &page.bangsal {
        lines.push(format!(
            "{:>4}  {:<8}  {:<24}  {:<10}  {:>4}/{:<4}  {:>6.1}%",
            ward.id,
            ward.info.kode_bangsal,
            ward.info.nama_bangsal,
            ward.info.jenis_bangsal,
            ward.tempat_tidur_terisi,
            ward.info.kapasitas_total,
            ward.occupancy()
        ));
    }
    lines.push(format!(
        "Halaman {} dari {} ({} bangsal)",
        page.page,
        page.pages.max(1),
        page.total
    ));
    lines.join("\n")
}

/// One ward
pub fn ward_detail(ward: &Bangsal) -> String {
    let info = &ward.info;
    let mut lines = vec![
        format!("{} ({})", info.nama_bangsal, info.kode_bangsal),
        format!("Jenis        : {}", info.jenis_bangsal),
        format!(
            "Kapasitas    : {} tempat tidur, {} kamar",
            info.kapasitas_total, info.jumlah_kamar
        ),
        format!(
            "Terisi       : {} ({:.1}%)",
            ward.tempat_tidur_terisi,
            ward.occupancy()
        ),
        format!("Tersedia     : {}", ward.tempat_tidur_tersedia),
        format!("Status       : {}", if info.is_active { "aktif" } else { "nonaktif" }),
    ];
    if info.is_emergency_ready {
        lines.push("Siap gawat darurat".to_string());
    }
    if let Some(head) = &info.kepala_bangsal {
        lines.push(format!("Kepala       : {head}"));
    }
    lines.join("\n")
}

/// Rooms of one ward
pub fn rooms(rooms: &[Kamar]) -> String {
    if rooms.is_empty() {
        return "Belum ada kamar".to_string();
    }

    let mut lines = vec![format!(
        "{:>4}  {:<8}  {:>9}  {:<12}  {}",
        "ID", "Nomor", "Terisi", "Kebersihan", "Status"
    )];
    for room in rooms {
        lines.push(format!(
            "{:>4}  {:<8}  {:>4}/{:<4}  {:<12}  {}",
            room.id,
            room.nomor_kamar,
            room.tempat_tidur_terisi,
            room.kapasitas_kamar,
            room.status_kebersihan.to_string(),
            if room.is_available { "tersedia" } else { "penuh" }
        ));
    }
    lines.join("\n")
}

fn band(band: Band) -> String {
    format!("{:.1}-{:.1}", band.min, band.max)
}

fn sides(bands: TierBands) -> String {
    let side = |b: Option<Band>| b.map_or_else(|| "-".to_string(), band);
    format!("{} | {}", side(bands.lower), side(bands.upper))
}

/// Band table used by the evaluator
pub fn thresholds(table: &Thresholds) -> String {
    let mut lines = Vec::new();
    for code in IndicatorCode::ALL {
        let bands = table.get(code);
        lines.push(format!("{} ({}, {})", code, code.name(), code.unit()));
        lines.push(format!("  Sangat Baik  {}", band(bands.excellent)));
        lines.push(format!("  Baik         {}", sides(bands.good)));
        lines.push(format!("  Perhatian    {}", sides(bands.warning)));
        lines.push(format!("  Buruk        {}", sides(bands.poor)));
    }
    lines.join("\n")
}

/// Server-published standards
pub fn medical_standards(standards: &MedicalStandards) -> String {
    let optional =
        |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
    let mut lines = vec![format!(
        "{:<4}  {:>11}  {:>8}  {:>8}  {:>8}  {:>8}",
        "Kode", "Optimal", "Krit. <", "Krit. >", "Wasp. <", "Wasp. >"
    )];
    for code in IndicatorCode::ALL {
        let t = standards.get(code);
        lines.push(format!(
            "{:<4}  {:>11}  {:>8}  {:>8}  {:>8}  {:>8}",
            code.as_str(),
            format!("{:.1}-{:.1}", t.optimal_min, t.optimal_max),
            optional(t.critical_low),
            optional(t.critical_high),
            optional(t.warning_low),
            optional(t.warning_high)
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sensus_core::{Tier, evaluate};

    #[test]
    fn test_card_shows_tier_and_recommendation() {
        let card = evaluation(&evaluate(IndicatorCode::Bor, 78.0));
        assert!(card.starts_with("BOR"));
        assert!(card.contains("78.0%"));
        assert!(card.contains(&format!("[{}]", Tier::Excellent.label())));
        assert!(card.contains("Rekomendasi: "));
    }

    #[test]
    fn test_unknown_code_card() {
        let card = evaluation(&sensus_core::evaluate_raw("XYZ", 3.0));
        assert!(card.starts_with("?"));
        assert!(card.contains("3.0"));
    }

    #[test]
    fn test_threshold_table_lists_every_indicator() {
        let text = thresholds(&Thresholds::default());
        for code in IndicatorCode::ALL {
            assert!(text.contains(code.as_str()));
        }
        assert!(text.contains("Sangat Baik  70.0-85.0"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(census_table(&[]), "Belum ada data sensus");
        assert_eq!(rooms(&[]), "Belum ada kamar");
    }
}
