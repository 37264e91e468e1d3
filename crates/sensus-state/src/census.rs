//! Daily census entry form

use crate::form::{FieldValue, FormState, Values};
use chrono::NaiveDate;
use sensus_core::{
    types::SensusCreate,
    validation::{self, fields},
};

fn count(values: &Values, field: &str) -> Option<u32> {
    values.get(field).and_then(FieldValue::as_count)
}

fn check_number(
    field: &'static str,
) -> impl Fn(&FieldValue) -> Option<String> + Send + Sync + 'static {
    move |value| validation::check_count(field, value.as_f64())
}

/// Census entry form with the entry rules attached to each field
///
/// Date rules are evaluated against `today`.
pub fn census_form(
    initial: &SensusCreate,
    today: NaiveDate,
) -> sensus_core::Result<FormState<SensusCreate>> {
    Ok(FormState::new(initial)?
        .rule(fields::TANGGAL, move |value| {
            validation::check_tanggal(value.as_str().unwrap_or_default(), today)
        })
        .rule(fields::JML_PASIEN_AWAL, check_number(fields::JML_PASIEN_AWAL))
        .rule(fields::JML_MASUK, check_number(fields::JML_MASUK))
        .rule_with_values(fields::JML_KELUAR, |value, values| {
            validation::check_count(fields::JML_KELUAR, value.as_f64()).or_else(|| {
                let awal = count(values, fields::JML_PASIEN_AWAL)?;
                let masuk = count(values, fields::JML_MASUK)?;
                validation::check_keluar(awal, masuk, value.as_count()?)
            })
        })
        .rule_with_values(fields::TEMPAT_TIDUR_TERSEDIA, |value, values| {
            validation::check_count(fields::TEMPAT_TIDUR_TERSEDIA, value.as_f64()).or_else(|| {
                let awal = count(values, fields::JML_PASIEN_AWAL)?;
                validation::check_tempat_tidur(awal, value.as_count()?)
            })
        })
        .rule(fields::HARI_RAWAT, check_number(fields::HARI_RAWAT)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{ChangeEvent, InputKind, SubmitOutcome};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    #[test]
    fn test_blank_census_fails_bed_rule() {
        let mut form = census_form(&SensusCreate::blank(today()), today()).unwrap();
        assert!(!form.validate_form());
        assert_eq!(
            form.error(fields::TEMPAT_TIDUR_TERSEDIA),
            Some("Jumlah tempat tidur minimal 1")
        );
        assert_eq!(form.error(fields::JML_MASUK), None);
    }

    #[test]
    fn test_keluar_checked_against_awal_and_masuk() {
        let mut form = census_form(&SensusCreate::blank(today()), today()).unwrap();
        form.handle_change(fields::JML_PASIEN_AWAL, &ChangeEvent::number("10"));
        form.handle_change(fields::JML_MASUK, &ChangeEvent::number("2"));
        form.handle_change(fields::JML_KELUAR, &ChangeEvent::number("13"));

        assert_eq!(
            form.error(fields::JML_KELUAR),
            Some("Pasien keluar tidak boleh melebihi pasien awal + masuk")
        );

        form.handle_change(fields::JML_KELUAR, &ChangeEvent::number("12"));
        assert_eq!(form.error(fields::JML_KELUAR), None);
    }

    #[test]
    fn test_date_window() {
        let mut form = census_form(&SensusCreate::blank(today()), today()).unwrap();
        form.handle_change(fields::TANGGAL, &ChangeEvent::new(InputKind::Date, "2030-01-01"));
        assert_eq!(
            form.error(fields::TANGGAL),
            Some("Tanggal tidak boleh lebih dari 30 hari ke depan")
        );

        form.handle_change(fields::TANGGAL, &ChangeEvent::new(InputKind::Date, "15/03/2025"));
        assert_eq!(form.error(fields::TANGGAL), Some("Format tanggal harus YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn test_valid_census_submits_typed_payload() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut form = census_form(&SensusCreate::blank(today()), today())
            .unwrap()
            .on_submit(move |payload| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(payload);
                    Ok(())
                }
            });

        for (field, raw) in [
            (fields::JML_PASIEN_AWAL, "30"),
            (fields::JML_MASUK, "5"),
            (fields::JML_KELUAR, "3"),
            (fields::TEMPAT_TIDUR_TERSEDIA, "40"),
            (fields::HARI_RAWAT, "21"),
        ] {
            form.handle_change(field, &ChangeEvent::number(raw));
        }
        assert!(form.is_valid());
        assert_eq!(form.handle_submit().await, SubmitOutcome::Submitted);

        let payload = rx.recv().await.unwrap();
        assert_eq!(payload.jml_pasien_akhir(), 32);
        assert_eq!(payload.hari_rawat, Some(21));
        assert_eq!(payload.tanggal, today());
    }
}
