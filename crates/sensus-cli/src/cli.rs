//! Command line definition

use clap::{Args, Parser, Subcommand, ValueEnum};
use sensus_core::types::ExportFormat;
use std::path::PathBuf;

/// Command line interface for the ward census dashboard
#[derive(Debug, Parser)]
#[command(
    name = "sensus",
    version = env!("CARGO_PKG_VERSION"),
    about = "Ward census dashboard: BOR/LOS/BTO/TOI indicators, census entry and reports",
    long_about = "Terminal front end for the hospital ward census backend. Shows the monthly indicator cards, records daily census data, requests BOR forecasts and downloads reports."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "SENSUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the configuration
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Log format (json, pretty); overrides the configuration
    #[arg(long)]
    pub log_format: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use the built-in demo data instead of the backend
    #[arg(long, global = true)]
    pub offline: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Evaluate one indicator value
    Evaluate {
        /// Indicator code (BOR, LOS, BTO, TOI)
        #[arg(value_name = "CODE")]
        code: String,

        /// Measured value
        #[arg(value_name = "VALUE", allow_negative_numbers = true)]
        value: f64,
    },

    /// Show the monthly indicator cards
    Indicators {
        /// Reporting period; the latest month with data when omitted
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Daily census records
    Sensus {
        /// Census subcommand
        #[command(subcommand)]
        action: SensusCommands,
    },

    /// BOR forecast
    Predict {
        /// Days to forecast (1-30)
        #[arg(long, default_value = "7")]
        hari: u32,

        /// Retrain the forecast model instead
        #[arg(long)]
        retrain: bool,
    },

    /// Download a report
    Export {
        /// Report kind
        #[arg(value_enum)]
        format: ExportKind,

        /// Reporting period; the current month when omitted
        #[command(flatten)]
        period: PeriodArgs,

        /// Output directory (overrides config)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Wards and rooms
    Bangsal {
        /// Ward subcommand
        #[command(subcommand)]
        action: BangsalCommands,
    },

    /// Show the indicator threshold table
    Standards {
        /// Show the server-published standards instead
        #[arg(long)]
        remote: bool,
    },

    /// Validate configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration
        #[arg(short, long)]
        validate: bool,
    },
}

/// Optional reporting month
#[derive(Debug, Clone, Copy, Args)]
pub struct PeriodArgs {
    /// Month (1-12)
    #[arg(long, requires = "tahun")]
    pub bulan: Option<u32>,

    /// Year
    #[arg(long, requires = "bulan")]
    pub tahun: Option<i32>,
}

/// Census commands
#[derive(Debug, Subcommand)]
pub enum SensusCommands {
    /// List recent records, newest first
    List {
        /// Maximum number of records
        #[arg(short = 'n', long, default_value = "30")]
        limit: u32,
    },

    /// Show one record with its evaluated indicators
    Show {
        /// Record id
        id: i64,
    },

    /// Record a day's census
    Add(SensusEntry),

    /// Delete a record
    Delete {
        /// Record id
        id: i64,
    },
}

/// Raw census entry; every field goes through the entry form rules
#[derive(Debug, Clone, Args)]
pub struct SensusEntry {
    /// Census date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    pub tanggal: Option<String>,

    /// Patients at start of day
    #[arg(long)]
    pub awal: String,

    /// Admissions
    #[arg(long)]
    pub masuk: String,

    /// Discharges
    #[arg(long)]
    pub keluar: String,

    /// Available beds
    #[arg(long = "tempat-tidur")]
    pub tempat_tidur: String,

    /// Total inpatient days, used for LOS
    #[arg(long = "hari-rawat")]
    pub hari_rawat: Option<String>,
}

/// Ward commands
#[derive(Debug, Subcommand)]
pub enum BangsalCommands {
    /// List wards
    List {
        /// Page
        #[arg(long, default_value = "1")]
        page: u32,

        /// Wards per page
        #[arg(long, default_value = "20")]
        per_page: u32,

        /// Search in name and code
        #[arg(short, long)]
        search: Option<String>,

        /// Ward class filter
        #[arg(long)]
        jenis: Option<String>,

        /// Include inactive wards
        #[arg(long)]
        include_inactive: bool,
    },

    /// Show one ward by id or code
    Show {
        /// Ward id, or code with --kode
        target: String,

        /// Treat the target as a ward code
        #[arg(long)]
        kode: bool,
    },

    /// Create a ward
    Create {
        /// Ward name
        #[arg(long)]
        nama: String,

        /// Unique ward code
        #[arg(long)]
        kode: String,

        /// Ward class
        #[arg(long)]
        jenis: String,

        /// Total beds
        #[arg(long)]
        kapasitas: u32,

        /// Number of rooms
        #[arg(long, default_value = "1")]
        kamar: u32,

        /// Ready for emergencies
        #[arg(long)]
        emergency: bool,
    },

    /// Delete a ward
    Delete {
        /// Ward id
        id: i64,
    },

    /// List the rooms of a ward
    Rooms {
        /// Ward id
        id: i64,
    },

    /// Add a room to a ward
    AddRoom {
        /// Ward id
        id: i64,

        /// Room number
        #[arg(long)]
        nomor: String,

        /// Beds in the room
        #[arg(long)]
        kapasitas: u32,

        /// Room class
        #[arg(long)]
        jenis: Option<String>,
    },
}

/// Report kinds accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    /// Census workbook
    Excel,
    /// Workbook with forecast sheet
    ExcelPrediksi,
    /// Comma-separated census
    Csv,
}

impl From<ExportKind> for ExportFormat {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::Excel => Self::Excel,
            ExportKind::ExcelPrediksi => Self::ExcelPrediksi,
            ExportKind::Csv => Self::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_census_entry() {
        let cli = Cli::try_parse_from([
            "sensus",
            "--offline",
            "sensus",
            "add",
            "--awal",
            "30",
            "--masuk",
            "5",
            "--keluar",
            "3",
            "--tempat-tidur",
            "40",
        ])
        .unwrap();

        assert!(cli.offline);
        let Commands::Sensus {
            action: SensusCommands::Add(entry),
        } = cli.command
        else {
            panic!("expected sensus add");
        };
        assert_eq!(entry.tempat_tidur, "40");
        assert!(entry.tanggal.is_none());
    }

    #[test]
    fn test_period_needs_both_parts() {
        assert!(Cli::try_parse_from(["sensus", "indicators", "--bulan", "3"]).is_err());
        assert!(
            Cli::try_parse_from(["sensus", "indicators", "--bulan", "3", "--tahun", "2025"]).is_ok()
        );
    }

    #[test]
    fn test_export_kind_names() {
        let cli = Cli::try_parse_from(["sensus", "export", "excel-prediksi"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export {
                format: ExportKind::ExcelPrediksi,
                ..
            }
        ));
    }
}
