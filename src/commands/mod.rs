mod account;
mod analysis;
mod insights;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::api::{ApiClient, TransactionRecord};
use crate::config::AppConfig;
use crate::report::{self, BatchSummary};
use crate::session::SessionManager;

#[derive(Parser)]
#[command(name = "fraudfinder", version, about = "Score card transactions with the Fraud Finder API")]
pub struct Cli {
    /// Override the API base URL for this run
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session token
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Re-fetch the profile from the server
        #[arg(long)]
        refresh: bool,
    },
    /// Change the locally stored display name
    Rename { name: String },
    /// Score a single merchant transaction
    Analyze {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        merchant: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        card: String,
        /// ISO-8601; defaults to now
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Score raw model features (Time, V1..V28, Amount)
    Predict {
        #[arg(long)]
        time: f64,
        #[arg(long)]
        amount: f64,
        /// 28 comma-separated values
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        v: Vec<f64>,
    },
    /// Score a JSON array of merchant transactions
    Batch {
        file: PathBuf,
        /// Write a CSV report of the results
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Upload a Time,V1..V28,Amount CSV for scoring
    Upload {
        file: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show model details
    ModelInfo,
    /// Show model evaluation metrics
    ModelEval,
    /// Show analysed transaction history
    History {
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Download the server-side history export
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show aggregate counters
    Stats,
    /// Check the service is up
    Health,
    /// Write an upload template CSV
    SampleCsv {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// The single session and the client bound to it.
pub(crate) struct AppContext {
    pub session: Arc<SessionManager>,
    pub api: ApiClient,
}

impl AppContext {
    fn build(api_url: Option<String>) -> Result<Self> {
        let config = AppConfig::load_default()?.with_api_url_override(api_url);
        config.validate()?;
        let store = config
            .open_session_store()
            .context("Failed to open session storage")?;
        let session = Arc::new(SessionManager::restore(store));
        let api = ApiClient::new(&config.api_base_url, Arc::clone(&session))?;
        info!("Using API at {}", api.base_url());
        Ok(Self { session, api })
    }
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    if let Command::SampleCsv { output } = &cli.command {
        return write_or_print(output.as_deref(), report::sample_feature_csv().as_bytes());
    }

    let ctx = AppContext::build(cli.api_url)?;
    match cli.command {
        Command::Login { email, password } => account::login(&ctx, &email, password).await,
        Command::Register {
            name,
            email,
            password,
        } => account::register(&ctx, &name, &email, password).await,
        Command::Logout => {
            ctx.session.logout();
            println!("Signed out");
            Ok(())
        }
        Command::Whoami { refresh } => account::whoami(&ctx, refresh).await,
        Command::Rename { name } => account::rename(&ctx, &name),
        Command::Analyze {
            amount,
            merchant,
            location,
            card,
            timestamp,
        } => analysis::analyze(&ctx, amount, merchant, location, card, timestamp).await,
        Command::Predict { time, amount, v } => analysis::predict(&ctx, time, amount, &v).await,
        Command::Batch { file, report } => analysis::batch(&ctx, &file, report.as_deref()).await,
        Command::Upload { file, report } => analysis::upload(&ctx, &file, report.as_deref()).await,
        Command::ModelInfo => print_json(&ctx.api.get_model_info().await?),
        Command::ModelEval => insights::model_evaluation(&ctx).await,
        Command::History { report } => insights::history(&ctx, report.as_deref()).await,
        Command::Export { output } => insights::export(&ctx, output.as_deref()).await,
        Command::Stats => print_json(&ctx.api.get_real_time_stats().await?),
        Command::Health => print_json(&ctx.api.health().await?),
        Command::SampleCsv { .. } => Ok(()),
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_records(records: &[TransactionRecord]) {
    for r in records {
        println!(
            "{:<24} {:>10.2}  risk {:>3}  p={:.3}  {:<9} {}",
            r.id,
            r.amount,
            r.risk_score,
            r.fraud_probability,
            if r.is_genuine { "genuine" } else { "FRAUD" },
            r.merchant
        );
        if !r.factors.is_empty() {
            println!("    factors: {}", r.factors.join("; "));
        }
    }
    let summary = BatchSummary::from_records(records);
    println!(
        "{} transactions: {} fraudulent, {} genuine, avg risk {}",
        summary.total,
        summary.fraudulent,
        summary.genuine,
        summary
            .average_risk_score
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "-".to_string())
    );
}

pub(crate) fn write_report(path: &Path, records: &[TransactionRecord]) -> Result<()> {
    std::fs::write(path, report::results_to_csv(records))
        .with_context(|| format!("Failed to write report to {:?}", path))?;
    println!("Report written to {}", path.display());
    Ok(())
}

pub(crate) fn write_or_print(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, bytes).with_context(|| format!("Failed to write {:?}", path))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", String::from_utf8_lossy(bytes)),
    }
    Ok(())
}

/// Use the flag if given, otherwise read one line from stdin.
pub(crate) fn password_or_stdin(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}
