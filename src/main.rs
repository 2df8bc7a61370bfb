use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use careplan_intake::snapshot::{load_orders, load_patients, load_providers};
use careplan_intake::{
    DetectorConfig, DuplicateDetector, OrderCandidate, PatientCandidate, ProviderCandidate,
    RecordId, Screener, Screening, Verdict,
};

/// Screen a provider, patient or order submission against existing records
#[derive(Parser)]
#[command(name = "careplan-intake", version)]
struct Cli {
    /// Detector config JSON (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stored record being edited; never reported as its own duplicate
    #[arg(long, global = true)]
    exclude_id: Option<RecordId>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Provider {
        #[arg(long)]
        name: String,
        #[arg(long)]
        npi: String,
        /// CSV of existing providers (id,name,npi)
        #[arg(long)]
        providers: PathBuf,
    },
    Patient {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        mrn: String,
        /// YYYY-MM-DD
        #[arg(long)]
        dob: NaiveDate,
        /// Reference date for the age check (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// CSV of existing patients (id,first_name,last_name,mrn,dob)
        #[arg(long)]
        patients: PathBuf,
    },
    Order {
        #[arg(long)]
        patient_id: RecordId,
        #[arg(long)]
        provider_id: RecordId,
        #[arg(long)]
        diagnosis_code: String,
        #[arg(long)]
        medication: String,
        /// Order date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// CSV of existing orders (id,patient_id,provider_id,medication_name,created_date[,status])
        #[arg(long)]
        orders: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DetectorConfig::from_file(path)?,
        None => DetectorConfig::default(),
    };
    let screener = Screener::new(DuplicateDetector::with_config(config)?);
    let today = Local::now().date_naive();

    let screening = run(&screener, cli.command, cli.exclude_id, today)?;

    println!("{}", serde_json::to_string_pretty(&screening)?);

    let code = match screening.verdict {
        Verdict::Clear => 0,
        Verdict::Rejected | Verdict::Blocked => 1,
        Verdict::NeedsAcknowledgment => 2,
    };
    std::process::exit(code);
}

fn run(
    screener: &Screener,
    command: Command,
    exclude_id: Option<RecordId>,
    today: NaiveDate,
) -> Result<Screening> {
    let screening = match command {
        Command::Provider { name, npi, providers } => {
            let existing = load_providers(&providers)?;
            let candidate = ProviderCandidate { name, npi };
            screener.screen_provider(&candidate, &existing, exclude_id)
        }
        Command::Patient {
            first_name,
            last_name,
            mrn,
            dob,
            today: reference,
            patients,
        } => {
            let existing = load_patients(&patients)?;
            let candidate = PatientCandidate {
                first_name,
                last_name,
                mrn,
                dob,
            };
            screener.screen_patient(&candidate, &existing, reference.unwrap_or(today), exclude_id)
        }
        Command::Order {
            patient_id,
            provider_id,
            diagnosis_code,
            medication,
            date,
            orders,
        } => {
            let existing = load_orders(&orders)?;
            let candidate = OrderCandidate {
                patient_id,
                provider_id,
                diagnosis_code,
                medication_name: medication,
                created_date: date.unwrap_or(today),
            };
            screener.screen_order(&candidate, &existing, exclude_id)
        }
    };

    Ok(screening)
}
