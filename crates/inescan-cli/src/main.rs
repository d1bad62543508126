mod display;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use inescan_core::validate::format_phone;
use inescan_core::{AffiliationForm, FieldKind, RawExtraction, Reconciler, ReferenceTables};
use inescan_store::{FileStore, SnapshotCache};
use inescan_sync::{ImageUpload, OcrClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_BASE_URL: &str = "https://prd-afiliacion-production.up.railway.app";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Parser)]
#[command(name = "inescan")]
#[command(about = "Scan INE voter cards and pre-fill affiliation records")]
#[command(version)]
struct Cli {
    /// OCR backend base URL
    #[arg(long, env = "INESCAN_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Directory holding the cached extraction
    #[arg(long, env = "INESCAN_CACHE_DIR", default_value = ".inescan", global = true)]
    cache_dir: PathBuf,

    /// JSON file with state codes and municipality aliases (defaults to Zacatecas)
    #[arg(long, env = "INESCAN_TABLES", global = true)]
    tables: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload an ID photo, reconcile the result and cache it
    Scan {
        /// Image file (jpg, jpeg, png, bmp, tiff, webp)
        image: PathBuf,
    },
    /// Reconcile a raw extraction JSON (file or stdin) and print the record
    Reconcile {
        /// Raw extraction or full backend response; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Check a single form value; exits with status 1 when invalid
    Validate {
        #[arg(value_enum)]
        field: Field,
        value: String,
    },
    /// Probe the OCR backend
    Health,
    /// Print the cached extraction if it is still fresh
    Show,
    /// Forget the cached extraction
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum Field {
    Name,
    Curp,
    ClaveElector,
    Email,
    Phone,
    Place,
    Required,
}

impl From<Field> for FieldKind {
    fn from(field: Field) -> Self {
        match field {
            Field::Name => FieldKind::Name,
            Field::Curp => FieldKind::Curp,
            Field::ClaveElector => FieldKind::ClaveElector,
            Field::Email => FieldKind::Email,
            Field::Phone => FieldKind::Phone,
            Field::Place => FieldKind::Place,
            Field::Required => FieldKind::Required,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("inescan v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Scan { image } => scan(&cli, image).await,
        Command::Reconcile { file } => reconcile(&cli, file.as_deref()),
        Command::Validate { field, value } => Ok(validate(*field, value)),
        Command::Health => health(&cli).await,
        Command::Show => show(&cli),
        Command::Clear => {
            let mut cache = open_cache(&cli)?;
            cache.clear()?;
            println!("Caché eliminada ({}).", cache.store().dir().display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ── Commands ──

async fn scan(cli: &Cli, image: &Path) -> anyhow::Result<ExitCode> {
    let reconciler = Reconciler::new(load_tables(cli.tables.as_deref())?);
    let upload = match ImageUpload::from_path(image) {
        Ok(upload) => upload,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = OcrClient::with_timeouts(&cli.base_url, CONNECT_TIMEOUT, UPLOAD_TIMEOUT)?;
    let response = match client.extract(upload).await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "extraction failed");
            eprintln!("{}", e.user_message(client.base_url()));
            return Ok(ExitCode::FAILURE);
        }
    };

    let raw = response.datos_prd.clone().unwrap_or_default();
    let record = reconciler.reconcile(&raw);

    let mut cache = open_cache(cli)?;
    if let Err(e) = cache.save(&record, Utc::now()) {
        warn!(error = %e, "could not persist snapshot");
    }

    let mut form = AffiliationForm::default();
    let report = form.prefill(&record);

    display::print_record_card(&record);
    display::print_scan_summary(response.detected_count(), response.quality(), &report);
    Ok(ExitCode::SUCCESS)
}

fn reconcile(cli: &Cli, file: Option<&Path>) -> anyhow::Result<ExitCode> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let raw = parse_raw(&input)?;
    let reconciler = Reconciler::new(load_tables(cli.tables.as_deref())?);
    let record = reconciler.reconcile(&raw);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(ExitCode::SUCCESS)
}

fn validate(field: Field, value: &str) -> ExitCode {
    match FieldKind::from(field).validate(value) {
        Ok(()) => {
            match field {
                Field::Phone => println!("ok: {}", format_phone(value)),
                _ => println!("ok"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn health(cli: &Cli) -> anyhow::Result<ExitCode> {
    let client = OcrClient::new(&cli.base_url);
    match client.health().await {
        Ok(h) => {
            display::print_health(client.base_url(), &h);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e.user_message(client.base_url()));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn show(cli: &Cli) -> anyhow::Result<ExitCode> {
    let mut cache = open_cache(cli)?;
    let now = Utc::now();
    match cache.load(now) {
        Some(snap) => {
            display::print_record_card(&snap.record);
            println!(
                "Guardado hace {} min ({})",
                snap.age(now).num_minutes(),
                snap.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        None => println!("No hay datos de INE en caché."),
    }
    Ok(ExitCode::SUCCESS)
}

// ── Helpers ──

fn open_cache(cli: &Cli) -> anyhow::Result<SnapshotCache<FileStore>> {
    let store = FileStore::open(&cli.cache_dir)
        .with_context(|| format!("opening cache at {}", cli.cache_dir.display()))?;
    Ok(SnapshotCache::new(store))
}

fn load_tables(path: Option<&Path>) -> anyhow::Result<ReferenceTables> {
    let Some(path) = path else {
        return Ok(ReferenceTables::builtin());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading tables {}", path.display()))?;
    ReferenceTables::from_json(&json).with_context(|| format!("parsing tables {}", path.display()))
}

/// Accept either a bare extraction or a whole backend response.
fn parse_raw(input: &str) -> anyhow::Result<RawExtraction> {
    let mut value: serde_json::Value =
        serde_json::from_str(input).context("input is not valid JSON")?;
    if let Some(datos) = value.get_mut("datos_prd") {
        value = datos.take();
    }
    serde_json::from_value(value).context("input is not an extraction object")
}
