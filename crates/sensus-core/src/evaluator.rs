//! Indicator evaluation
//!
//! [`evaluate_with`] is the pure core: a value is classified against an
//! explicit [`Thresholds`] table and paired with a fixed Indonesian message and
//! recommendation. Nothing here holds state, so identical inputs always give
//! identical results.

use crate::{
    indicator::{Deviation, EvaluationResult, IndicatorCode, IndicatorReading, Tier},
    standards::Thresholds,
};

const NEUTRAL_UNKNOWN_MESSAGE: &str = "Indikator tidak dikenal";
const NEUTRAL_MISSING_MESSAGE: &str = "Nilai indikator tidak tersedia";
const NEUTRAL_RECOMMENDATION: &str = "Periksa kembali data sensus";

/// Evaluate a value against the default threshold table
pub fn evaluate(code: IndicatorCode, value: f64) -> EvaluationResult {
    evaluate_with(&Thresholds::default(), code, value)
}

/// Evaluate a value against an explicit threshold table
///
/// Non-finite values yield a neutral `Good` result instead of a tier, so a
/// dashboard card can always render.
pub fn evaluate_with(thresholds: &Thresholds, code: IndicatorCode, value: f64) -> EvaluationResult {
    if !value.is_finite() {
        return neutral(Some(code), value, NEUTRAL_MISSING_MESSAGE);
    }

    let (status, deviation) = thresholds.get(code).classify(value);
    let (message, recommendation) = describe(code, value, status, deviation);

    EvaluationResult {
        code: Some(code),
        value,
        status,
        deviation,
        message,
        recommendation: recommendation.to_string(),
    }
}

/// Evaluate a reading against the default threshold table
pub fn evaluate_reading(reading: &IndicatorReading) -> EvaluationResult {
    evaluate(reading.code, reading.value)
}

/// Evaluate a code given as text, e.g. straight from a payload key
///
/// Unknown codes degrade to a neutral `Good` result rather than an error.
pub fn evaluate_raw(code: &str, value: f64) -> EvaluationResult {
    match code.parse::<IndicatorCode>() {
        Ok(code) => evaluate(code, value),
        Err(_) => neutral(None, value, NEUTRAL_UNKNOWN_MESSAGE),
    }
}

fn neutral(code: Option<IndicatorCode>, value: f64, message: &str) -> EvaluationResult {
    EvaluationResult {
        code,
        value,
        status: Tier::Good,
        deviation: Deviation::Within,
        message: message.to_string(),
        recommendation: NEUTRAL_RECOMMENDATION.to_string(),
    }
}

fn describe(
    code: IndicatorCode,
    value: f64,
    status: Tier,
    deviation: Deviation,
) -> (String, &'static str) {
    let shown = code.format_value(value);

    let direction = match deviation {
        Deviation::Within => {
            let (tail, recommendation) = optimal_phrase(code);
            return (format!("{code} {shown} {tail}"), recommendation);
        }
        Deviation::Below => "di bawah",
        Deviation::Above => "di atas",
    };

    let qualifier = match status {
        Tier::Excellent | Tier::Warning => "",
        Tier::Good => "sedikit ",
        Tier::Poor => "jauh ",
        Tier::Critical => "sangat jauh ",
    };
    let severe = matches!(status, Tier::Poor | Tier::Critical);
    let (consequence, recommendation) = deviation_phrase(code, deviation, severe);

    (
        format!("{code} {shown} {qualifier}{direction} optimal, {consequence}"),
        recommendation,
    )
}

const fn optimal_phrase(code: IndicatorCode) -> (&'static str, &'static str) {
    match code {
        IndicatorCode::Bor => (
            "dalam rentang optimal sesuai standar Kemenkes",
            "Pertahankan tingkat utilisasi ini",
        ),
        IndicatorCode::Los => (
            "sesuai standar Kemenkes",
            "Pertahankan kualitas perawatan",
        ),
        IndicatorCode::Bto => (
            "dalam rentang optimal",
            "Pertahankan efisiensi turnover",
        ),
        IndicatorCode::Toi => (
            "dalam rentang optimal",
            "Pertahankan efisiensi operasional",
        ),
    }
}

const fn deviation_phrase(
    code: IndicatorCode,
    deviation: Deviation,
    severe: bool,
) -> (&'static str, &'static str) {
    use Deviation::{Above, Below, Within};
    use IndicatorCode::{Bor, Bto, Los, Toi};

    match (code, deviation, severe) {
        (Bor, Above, false) => (
            "kapasitas mendekati batas",
            "Monitor kapasitas dan siapkan rencana darurat",
        ),
        (Bor, Above, true) => (
            "risiko overkapasitas",
            "Tambah kapasitas atau percepat discharge",
        ),
        (Bor, Below, false) => (
            "kapasitas belum termanfaatkan optimal",
            "Evaluasi strategi pemasaran/rujukan",
        ),
        (Bor, Below, true) => (
            "banyak tempat tidur tidak terpakai",
            "Tingkatkan promosi dan akses pelayanan",
        ),
        (Los, Above, false) => ("perawatan kurang efisien", "Evaluasi efisiensi perawatan"),
        (Los, Above, true) => (
            "menunjukkan inefisiensi",
            "Review protokol discharge dan case management",
        ),
        (Los, Below, false) => (
            "pasien pulang lebih cepat",
            "Monitor kualitas outcome pasien",
        ),
        (Los, Below, true) => (
            "perlu evaluasi kualitas",
            "Tinjau kembali standar pelayanan",
        ),
        (Bto, Above, false) => (
            "beban kerja meningkat",
            "Evaluasi kapasitas dan tenaga medis",
        ),
        (Bto, Above, true) => (
            "beban kerja tinggi",
            "Evaluasi kualitas perawatan dan patient satisfaction",
        ),
        (Bto, Below, false) => (
            "pemanfaatan kurang optimal",
            "Evaluasi strategi admission dan discharge",
        ),
        (Bto, Below, true) => (
            "tempat tidur jarang berputar",
            "Tingkatkan utilisasi tempat tidur",
        ),
        (Toi, Above, false) => (
            "ada idle capacity",
            "Optimalisasi penjadwalan dan kapasitas",
        ),
        (Toi, Above, true) => (
            "tempat tidur lama kosong",
            "Evaluasi alur rujukan dan penerimaan pasien",
        ),
        (Toi, Below, false) => (
            "waktu persiapan tempat tidur singkat",
            "Pastikan waktu pembersihan tempat tidur cukup",
        ),
        (Toi, Below, true) => (
            "risiko infeksi nosokomial",
            "Tambah kapasitas tempat tidur dan perketat pengendalian infeksi",
        ),
        // describe() returns early for values inside the optimal band
        (_, Within, _) => ("", NEUTRAL_RECOMMENDATION),
    }
}
