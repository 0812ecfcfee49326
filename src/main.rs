use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use eyre::{bail, WrapErr};
use reloadly::logging::setup_logging;
use reloadly::{run_batch, Service, ServiceConfig, TopupJob, TopupOutcome};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "reloadly",
    about = "Send airtime top-ups through the Reloadly API",
    version
)]
struct Cli {
    /// Use the provider's sandbox hosts.
    #[arg(long, global = true)]
    sandbox: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a country's operators, or look one up by exact name.
    Operators {
        #[arg(long)]
        country: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Send a single top-up.
    Topup {
        #[arg(long)]
        number: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        country: String,
        /// Exact operator name; auto-detected from the number when omitted.
        #[arg(long)]
        operator: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        tolerance: f64,
        #[arg(long)]
        custom_identifier: Option<String>,
    },
    /// Run a CSV of top-up jobs and write the outcomes as CSV.
    Batch {
        input: PathBuf,
        output: PathBuf,
        /// Parallelism for submissions.
        #[arg(long, short, default_value_t = 12)]
        workers: usize,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    let mut config = ServiceConfig::from_env()?;
    if cli.sandbox {
        config = config.sandbox();
    }
    let service = Service::new(config);
    service.authenticate().await?;

    match cli.command {
        Command::Operators { country, name } => {
            let out = match name {
                Some(name) => {
                    let operator = service.search_operator(&country, &name).await?;
                    serde_json::to_string_pretty(&operator)?
                }
                None => {
                    let operators = service.operators_by_country(&country).await?;
                    serde_json::to_string_pretty(&operators)?
                }
            };
            println!("{}", out);
        }
        Command::Topup {
            number,
            amount,
            country,
            operator,
            tolerance,
            custom_identifier,
        } => {
            let mut topups = match operator {
                Some(name) => {
                    service
                        .topups()
                        .find_operator(&country, &name)
                        .await
                        .suggested_amount(tolerance)
                        .auto_fallback()
                }
                None => service
                    .topups()
                    .auto_detect(&country)
                    .suggested_amount(tolerance),
            };
            if let Some(identifier) = custom_identifier {
                topups = topups.custom_identifier(identifier);
            }

            let response = topups.topup(&number, amount).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Batch {
            input,
            output,
            workers,
        } => {
            let jobs = load_jobs(&input)?;
            let total = jobs.len();
            let outcomes = run_batch(&service, jobs, workers).await;
            write_outcomes(&output, &outcomes)?;
            info!(
                rows = total,
                written = outcomes.len(),
                output = %output.display(),
                "batch finished"
            );
        }
    }

    Ok(())
}

fn load_jobs(path: &Path) -> eyre::Result<Vec<TopupJob>> {
    let mut reader = csv::Reader::from_path(path)
        .wrap_err_with(|| format!("could not open {}", path.display()))?;
    let jobs: Vec<TopupJob> = reader
        .deserialize()
        .collect::<Result<_, _>>()
        .wrap_err("could not parse job rows")?;

    if jobs.is_empty() {
        bail!(
            "no jobs parsed from {}; the csv needs number, amount and country columns",
            path.display()
        );
    }
    Ok(jobs)
}

fn write_outcomes(path: &Path, outcomes: &[TopupOutcome]) -> eyre::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .wrap_err_with(|| format!("could not create {}", path.display()))?;

    writer.write_record([
        "transactionId",
        "customIdentifier",
        "recipientPhone",
        "countryCode",
        "operatorId",
        "operatorName",
        "requestedAmount",
        "deliveredAmount",
        "transactionDate",
        "errorCode",
        "errorMessage",
    ])?;

    for outcome in outcomes {
        let response = &outcome.response;
        writer.write_record([
            response
                .transaction_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            response.custom_identifier.clone().unwrap_or_default(),
            response.recipient_phone.clone(),
            response.country_code.clone(),
            response
                .operator_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            response.operator_name.clone(),
            response.requested_amount.to_string(),
            response
                .delivered_amount
                .map(|a| a.to_string())
                .unwrap_or_default(),
            response
                .transaction_date
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            outcome.error_code.clone().unwrap_or_default(),
            outcome.error_message.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
