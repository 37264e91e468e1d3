//! Command handlers
//!
//! Reads go through a [`FetchHandle`] so they share the configured deadline
//! and error messages with every other consumer of the service layer. Writes
//! call the service directly, except census entry which runs through the
//! entry form.

use crate::{
    cli::{BangsalCommands, Commands, ExportKind, PeriodArgs, SensusCommands, SensusEntry},
    error::{CliError, CliResult},
    render,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use sensus_client::{BangsalService, ClientError, ClientResult, SensusService};
use sensus_core::{
    Config, EvaluationResult, IndicatorCode, IndicatorReading, Thresholds, evaluate_raw,
    evaluate_with,
    types::{
        BangsalCreate, BangsalQuery, ExportFormat, KamarCreate, Period, SensusCreate,
        SensusFilter, StatusKebersihan,
    },
    utils::sanitize_filename,
    validation::{DATE_FORMAT, fields},
};
use sensus_state::{
    ChangeEvent, FetchHandle, FetchOptions, FetchState, InputKind, PaginatedFetch, Pagination,
    SubmitOutcome, census_form,
};
use serde::Serialize;
use std::{
    future::Future,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tracing::{debug, info, warn};

/// Everything a command needs: configuration, a backend and output mode
#[derive(Debug, Clone)]
pub struct App<B> {
    config: Config,
    backend: B,
    json: bool,
    today: NaiveDate,
}

#[derive(Serialize)]
struct IndicatorReport<'a, T: Serialize> {
    #[serde(flatten)]
    source: &'a T,
    indikator: &'a [EvaluationResult],
}

#[derive(Serialize)]
struct SavedReport<'a> {
    filename: &'a str,
    content_type: &'a str,
    path: &'a std::path::Path,
    bytes: usize,
}

#[derive(Serialize)]
struct Deleted<'a> {
    resource: &'a str,
    id: i64,
}

impl<B> App<B>
where
    B: SensusService + BangsalService + Clone + 'static,
{
    /// Create an app; `today` anchors date defaults and census date rules
    pub const fn new(config: Config, backend: B, json: bool, today: NaiveDate) -> Self {
        Self {
            config,
            backend,
            json,
            today,
        }
    }

    /// Run one command and return its output
    pub async fn run(&self, command: Commands) -> CliResult<String> {
        match command {
            Commands::Evaluate { code, value } => self.evaluate(&code, value).await,
            Commands::Indicators { period } => self.indicators(period).await,
            Commands::Sensus { action } => self.sensus(action).await,
            Commands::Predict { hari, retrain } => self.predict(hari, retrain).await,
            Commands::Export {
                format,
                period,
                output,
            } => self.export(format, period, output).await,
            Commands::Bangsal { action } => self.bangsal(action).await,
            Commands::Standards { remote } => self.standards(remote).await,
            Commands::Config { show, validate } => self.config_command(show, validate),
        }
    }

    fn output<T: Serialize + ?Sized>(
        &self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> CliResult<String> {
        if self.json {
            render::json(value)
        } else {
            Ok(text())
        }
    }

    /// Fetch options from configuration, plus a flag recording whether the
    /// last failure can be retried
    fn fetch_options<T>(&self) -> (FetchOptions<T>, Arc<AtomicBool>) {
        let retryable = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&retryable);
        let options = FetchOptions::from_config(&self.config.fetch).on_error(move |err, _| {
            seen.store(err.is_retryable(), Ordering::SeqCst);
        });
        (options, retryable)
    }

    /// Run `producer` once through a fetch controller
    async fn fetch<T, F, Fut>(&self, producer: F) -> CliResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (options, retryable) = self.fetch_options();
        let handle = FetchHandle::new(producer, options);
        handle.execute().await;
        let state = handle.state();
        handle.unmount();
        settle(state, &retryable)
    }

    /// Threshold table in effect, with the server's optimal ranges when enabled
    async fn thresholds(&self) -> Thresholds {
        let local = self.config.thresholds();
        if !self.config.standards.sync_remote {
            return local;
        }

        let backend = self.backend.clone();
        match self
            .fetch(move || {
                let backend = backend.clone();
                async move { backend.medical_standards().await }
            })
            .await
        {
            Ok(remote) => {
                debug!("using server-published optimal ranges");
                local.with_remote_optimal(&remote)
            }
            Err(err) => {
                warn!(error = %err, "standards sync failed, using local thresholds");
                local
            }
        }
    }

    fn cards(thresholds: &Thresholds, readings: &[IndicatorReading]) -> Vec<EvaluationResult> {
        readings
            .iter()
            .map(|reading| evaluate_with(thresholds, reading.code, reading.value))
            .collect()
    }

    async fn evaluate(&self, code: &str, value: f64) -> CliResult<String> {
        let result = match code.parse::<IndicatorCode>() {
            Ok(code) => evaluate_with(&self.thresholds().await, code, value),
            Err(_) => {
                warn!(code, "unknown indicator code");
                evaluate_raw(code, value)
            }
        };
        self.output(&result, || render::evaluation(&result))
    }

    async fn indicators(&self, period: PeriodArgs) -> CliResult<String> {
        let period = resolve_period(period)?;
        let backend = self.backend.clone();
        let stats = self
            .fetch(move || {
                let backend = backend.clone();
                async move { backend.dashboard_stats(period).await }
            })
            .await?;

        let cards = if stats.stats.jumlah_hari_data == 0 {
            Vec::new()
        } else {
            Self::cards(&self.thresholds().await, &stats.stats.readings())
        };
        info!(periode = %stats.periode, days = stats.stats.jumlah_hari_data, "dashboard loaded");

        let report = IndicatorReport {
            source: &stats,
            indikator: &cards,
        };
        self.output(&report, || render::dashboard(&stats, &cards))
    }

    async fn sensus(&self, action: SensusCommands) -> CliResult<String> {
        match action {
            SensusCommands::List { limit } => {
                let backend = self.backend.clone();
                let records = self
                    .fetch(move || {
                        let backend = backend.clone();
                        async move { backend.list_sensus(SensusFilter { limit }).await }
                    })
                    .await?;
                self.output(&records, || render::census_table(&records))
            }
            SensusCommands::Show { id } => {
                let backend = self.backend.clone();
                let record = self
                    .fetch(move || {
                        let backend = backend.clone();
                        async move { backend.get_sensus(id).await }
                    })
                    .await?;
                let cards = Self::cards(&self.thresholds().await, &record.readings());
                let report = IndicatorReport {
                    source: &record,
                    indikator: &cards,
                };
                self.output(&report, || render::census_detail(&record, &cards))
            }
            SensusCommands::Add(entry) => self.add_census(&entry).await,
            SensusCommands::Delete { id } => {
                self.backend.delete_sensus(id).await?;
                info!(id, "census record deleted");
                self.output(
                    &Deleted {
                        resource: "sensus",
                        id,
                    },
                    || format!("Data sensus #{id} dihapus"),
                )
            }
        }
    }

    async fn add_census(&self, entry: &SensusEntry) -> CliResult<String> {
        let created = Arc::new(Mutex::new(None));
        let retryable = Arc::new(AtomicBool::new(false));
        let (slot, retry) = (Arc::clone(&created), Arc::clone(&retryable));
        let backend = self.backend.clone();

        let mut form = census_form(&SensusCreate::blank(self.today), self.today)?.on_submit(
            move |payload: SensusCreate| {
                let (backend, slot, retry) =
                    (backend.clone(), Arc::clone(&slot), Arc::clone(&retry));
                async move {
                    match backend.create_sensus(&payload).await {
                        Ok(record) => {
                            *slot.lock() = Some(record);
                            Ok(())
                        }
                        Err(err) => {
                            retry.store(err.is_retryable(), Ordering::SeqCst);
                            Err(err)
                        }
                    }
                }
            },
        );

        let tanggal = entry
            .tanggal
            .clone()
            .unwrap_or_else(|| self.today.format(DATE_FORMAT).to_string());
        form.handle_change(fields::TANGGAL, &ChangeEvent::new(InputKind::Date, tanggal));
        for (field, raw) in [
            (fields::JML_PASIEN_AWAL, &entry.awal),
            (fields::JML_MASUK, &entry.masuk),
            (fields::JML_KELUAR, &entry.keluar),
            (fields::TEMPAT_TIDUR_TERSEDIA, &entry.tempat_tidur),
        ] {
            form.handle_change(field, &ChangeEvent::number(raw.as_str()));
        }
        if let Some(hari_rawat) = &entry.hari_rawat {
            form.handle_change(fields::HARI_RAWAT, &ChangeEvent::number(hari_rawat.as_str()));
        }

        match form.handle_submit().await {
            SubmitOutcome::Submitted => {
                let record = created.lock().take().ok_or_else(|| {
                    CliError::usage("Data sensus tersimpan tetapi tidak dikembalikan server")
                })?;
                info!(id = record.id, tanggal = %record.tanggal, "census record created");
                let cards = Self::cards(&self.thresholds().await, &record.readings());
                let report = IndicatorReport {
                    source: &record,
                    indikator: &cards,
                };
                self.output(&report, || render::census_detail(&record, &cards))
            }
            SubmitOutcome::Failed(message) if form.errors().is_empty() => Err(CliError::Fetch {
                message,
                retryable: retryable.load(Ordering::SeqCst),
            }),
            SubmitOutcome::Invalid | SubmitOutcome::Failed(_) => Err(CliError::Form {
                errors: form
                    .errors()
                    .iter()
                    .map(|(field, message)| format!("{field}: {message}"))
                    .collect(),
            }),
            SubmitOutcome::NoHandler => {
                Err(CliError::usage("Formulir sensus tidak memiliki handler"))
            }
        }
    }

    async fn predict(&self, hari: u32, retrain: bool) -> CliResult<String> {
        let backend = self.backend.clone();
        if retrain {
            let response = backend.retrain_model().await?;
            info!(status = %response.status, "forecast model retrained");
            return self.output(&response, || render::retrain(&response));
        }

        let forecast = self
            .fetch(move || {
                let backend = backend.clone();
                async move { backend.predict_bor(hari).await }
            })
            .await?;
        self.output(&forecast, || render::forecast(&forecast))
    }

    async fn export(
        &self,
        kind: ExportKind,
        period: PeriodArgs,
        output: Option<PathBuf>,
    ) -> CliResult<String> {
        let format = ExportFormat::from(kind);
        let period = resolve_period(period)?.unwrap_or_else(|| Period::containing(self.today));
        let backend = self.backend.clone();
        let file = self
            .fetch(move || {
                let backend = backend.clone();
                async move { backend.export(format, period).await }
            })
            .await?;

        let dir = output.unwrap_or_else(|| self.config.export.output_dir.clone());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| CliError::io(&dir, e))?;

        let mut filename = sanitize_filename(&file.filename);
        if filename.is_empty() {
            filename = format.default_filename(period);
        }
        let path = dir.join(&filename);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| CliError::io(&path, e))?;
        info!(path = %path.display(), bytes = file.bytes.len(), %format, "report saved");

        let saved = SavedReport {
            filename: &filename,
            content_type: &file.content_type,
            path: &path,
            bytes: file.bytes.len(),
        };
        self.output(&saved, || render::export_saved(&file, &path))
    }

    async fn bangsal(&self, action: BangsalCommands) -> CliResult<String> {
        match action {
            BangsalCommands::List {
                page,
                per_page,
                search,
                jenis,
                include_inactive,
            } => {
                let backend = self.backend.clone();
                let (options, retryable) = self.fetch_options();
                let filters = BangsalQuery {
                    include_inactive,
                    search,
                    jenis_bangsal: jenis,
                    ..BangsalQuery::default()
                };
                let pages = PaginatedFetch::new(
                    move |position: Pagination| {
                        let backend = backend.clone();
                        let query = BangsalQuery {
                            page: position.page,
                            per_page: position.limit,
                            ..filters.clone()
                        };
                        async move { backend.list_bangsal(&query).await }
                    },
                    Pagination {
                        page,
                        limit: per_page,
                    },
                    options,
                );
                pages.fetch().execute().await;
                let state = pages.state();
                pages.fetch().unmount();

                let list = settle(state, &retryable)?;
                self.output(&list, || render::ward_page(&list))
            }
            BangsalCommands::Show { target, kode } => {
                let backend = self.backend.clone();
                let ward = if kode {
                    self.fetch(move || {
                        let (backend, target) = (backend.clone(), target.clone());
                        async move { backend.get_bangsal_by_kode(&target).await }
                    })
                    .await?
                } else {
                    let id: i64 = target.parse().map_err(|_| {
                        CliError::usage(format!(
                            "ID bangsal harus berupa angka: {target} (gunakan --kode untuk kode bangsal)"
                        ))
                    })?;
                    self.fetch(move || {
                        let backend = backend.clone();
                        async move { backend.get_bangsal(id).await }
                    })
                    .await?
                };
                self.output(&ward, || render::ward_detail(&ward))
            }
            BangsalCommands::Create {
                nama,
                kode,
                jenis,
                kapasitas,
                kamar,
                emergency,
            } => {
                let payload = BangsalCreate {
                    is_emergency_ready: emergency,
                    ..BangsalCreate::new(nama, kode, jenis, kapasitas, kamar)
                };
                let ward = self.backend.create_bangsal(&payload).await?;
                info!(id = ward.id, kode = %ward.info.kode_bangsal, "ward created");
                self.output(&ward, || render::ward_detail(&ward))
            }
            BangsalCommands::Delete { id } => {
                self.backend.delete_bangsal(id).await?;
                info!(id, "ward deleted");
                self.output(
                    &Deleted {
                        resource: "bangsal",
                        id,
                    },
                    || format!("Bangsal #{id} dihapus"),
                )
            }
            BangsalCommands::Rooms { id } => {
                let backend = self.backend.clone();
                let rooms = self
                    .fetch(move || {
                        let backend = backend.clone();
                        async move { backend.list_rooms(id).await }
                    })
                    .await?;
                self.output(&rooms, || render::rooms(&rooms))
            }
            BangsalCommands::AddRoom {
                id,
                nomor,
                kapasitas,
                jenis,
            } => {
                let payload = KamarCreate {
                    bangsal_id: id,
                    nomor_kamar: nomor,
                    nama_kamar: None,
                    kapasitas_kamar: kapasitas,
                    jenis_kamar: jenis,
                    fasilitas_kamar: None,
                    is_active: true,
                    status_kebersihan: StatusKebersihan::default(),
                };
                let room = self.backend.create_room(&payload).await?;
                info!(bangsal_id = id, nomor = %room.nomor_kamar, "room created");
                self.output(&room, || render::rooms(std::slice::from_ref(&room)))
            }
        }
    }

    async fn standards(&self, remote: bool) -> CliResult<String> {
        if remote {
            let backend = self.backend.clone();
            let standards = self
                .fetch(move || {
                    let backend = backend.clone();
                    async move { backend.medical_standards().await }
                })
                .await?;
            return self.output(&standards, || render::medical_standards(&standards));
        }

        let table = self.thresholds().await;
        self.output(&table, || render::thresholds(&table))
    }

    fn config_command(&self, show: bool, validate: bool) -> CliResult<String> {
        let mut lines = Vec::new();
        if validate || !show {
            self.config.validate()?;
            lines.push("Konfigurasi valid".to_string());
        }
        if show {
            let text = toml::to_string_pretty(&self.config).map_err(|e| {
                sensus_core::Error::configuration(format!("Failed to serialize configuration: {e}"))
            })?;
            lines.push(text);
        }
        Ok(lines.join("\n"))
    }
}

/// Data of a finished fetch, or its error
fn settle<T>(state: FetchState<T>, retryable: &AtomicBool) -> CliResult<T> {
    match (state.data, state.error) {
        (_, Some(message)) => Err(CliError::Fetch {
            message,
            retryable: retryable.load(Ordering::SeqCst),
        }),
        (Some(data), None) => Ok(data),
        (None, None) => Err(CliError::Fetch {
            message: ClientError::Cancelled.user_message(),
            retryable: true,
        }),
    }
}

fn resolve_period(period: PeriodArgs) -> CliResult<Option<Period>> {
    match (period.bulan, period.tahun) {
        (Some(bulan), Some(tahun)) => Ok(Some(Period::new(bulan, tahun)?)),
        (None, None) => Ok(None),
        _ => Err(CliError::usage("--bulan dan --tahun harus diisi bersama")),
    }
}
