//! checkop - Check Operadora command-line client
//!
//! Operational front end for the client core: upload a sheet of phone
//! numbers for portability validation, follow a job's processing status
//! over the notification channel, and fetch/parse result exports.

use anyhow::Result;
use checkop_client::api::CheckerClient;
use checkop_client::ingest::{ingest, prepare_upload, RawArtifact};
use checkop_client::notify::{JobOutcome, NotificationChannel};
use checkop_common::api::types::CheckType;
use checkop_common::config::ClientConfig;
use checkop_common::stats::display_count;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "checkop", version, about = "Check Operadora portability client")]
struct Cli {
    /// REST endpoint override
    #[arg(long)]
    api_url: Option<String>,

    /// Notification channel endpoint override
    #[arg(long)]
    ws_url: Option<String>,

    /// Session bearer token (from the authentication layer)
    #[arg(long, env = "CHECKOP_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List uploaded files and their processing status
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// Portability lookup for a single number
    Check { number: String },
    /// Normalize and upload a sheet, then follow its job
    Upload {
        path: std::path::PathBuf,
        /// Exit after the upload acknowledgment instead of watching
        #[arg(long)]
        no_watch: bool,
    },
    /// Delete an uploaded file and its results
    Delete { file_id: String },
    /// Follow status events for an existing job id
    Watch { file_id: String },
    /// Fetch a result export and print the parsed records
    Export { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = ClientConfig::resolve(cli.api_url.as_deref(), cli.ws_url.as_deref());
    info!(api = %config.api_base_url, "checkop {}", env!("CARGO_PKG_VERSION"));

    let mut client = CheckerClient::new(&config);
    if let Some(token) = &cli.token {
        client = client.with_bearer_token(token.clone());
    }

    match cli.command {
        Command::List { page, page_size } => {
            let listing = client
                .list_files(page, page_size, CheckType::Portabilidade)
                .await?;
            println!(
                "page {}/{} ({} files total)",
                listing.page, listing.total_pages, listing.total_items
            );
            for file in &listing.data {
                let total = file
                    .stats
                    .as_ref()
                    .filter(|s| s.is_usable())
                    .map(|s| display_count(s.total))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {:<12}  rows={}  {}",
                    file.id,
                    format!("{:?}", file.status).to_lowercase(),
                    total,
                    file.original_file_name
                );
            }
        }
        Command::Check { number } => {
            let lookup = client.check_number(&number).await?;
            match (lookup.data, lookup.error) {
                (Some(record), _) => {
                    println!("numero:    {}", record.numero);
                    println!("tipo:      {}", record.tipo);
                    println!("original:  {}", record.operadora_original);
                    println!("atual:     {}", record.operadora_atual.as_deref().unwrap_or("-"));
                    println!(
                        "portado em: {}",
                        record.data_portabilidade.as_deref().unwrap_or("-")
                    );
                }
                (None, Some(error)) => println!("lookup failed: {error}"),
                (None, None) => println!("no data for {number}"),
            }
        }
        Command::Upload { path, no_watch } => {
            let bytes = tokio::fs::read(&path).await?;
            let artifact = RawArtifact {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.csv".to_string()),
                content_type: None,
                bytes,
            };
            let prepared = prepare_upload(&artifact)?;
            info!(rows = prepared.row_count, "Prepared {}", prepared.file_name);

            let ack = client.upload(prepared, CheckType::Portabilidade).await?;
            let job_id = ack.job_id().to_string();
            println!("accepted: job {job_id}");
            if let Some(message) = ack.message {
                println!("backend: {message}");
            }
            if !no_watch {
                watch_job(&config, &job_id).await;
            }
        }
        Command::Delete { file_id } => {
            let ack = client.delete_file(&file_id).await?;
            println!("deleted {file_id}: {ack}");
        }
        Command::Watch { file_id } => {
            watch_job(&config, &file_id).await;
        }
        Command::Export { url } => {
            let artifact = client.fetch_export(&url).await?;
            let outcome = ingest(&artifact);
            if let Some(warning) = &outcome.diagnostic.warning {
                println!("warning: {warning}");
            }
            println!(
                "{} records ({} rows scanned)",
                outcome.diagnostic.row_count, outcome.diagnostic.rows_scanned
            );
            for row in outcome.rows() {
                println!(
                    "{}  ddd={} anatel={} tipo={} {} -> {} portado={} em {}  {}/{}",
                    row.number,
                    row.ddd,
                    row.anatel,
                    row.line_type,
                    row.origin_carrier,
                    row.current_carrier,
                    row.ported,
                    row.port_date,
                    row.municipality,
                    row.uf
                );
            }
        }
    }

    Ok(())
}

/// Follow one job on the notification channel until it reaches a terminal
/// state, printing progress along the way.
async fn watch_job(config: &ClientConfig, file_id: &str) {
    let channel = NotificationChannel::start(config.ws_url.clone());
    let (outcome_tx, mut outcome_rx) = tokio::sync::mpsc::unbounded_channel();
    let monitor = channel.monitor_job(file_id, move |outcome| {
        let _ = outcome_tx.send(outcome);
    });
    let mut progress = monitor.progress_watch();

    println!("watching job {file_id}...");
    loop {
        tokio::select! {
            changed = progress.changed() => {
                if changed.is_ok() {
                    println!("progress: {}%", *progress.borrow());
                }
            }
            outcome = outcome_rx.recv() => {
                match outcome {
                    Some(JobOutcome::Completed) => println!("job {file_id} completed"),
                    Some(JobOutcome::Failed(reason)) => println!(
                        "job {file_id} failed: {}",
                        reason.as_deref().unwrap_or("no reason given")
                    ),
                    None => {}
                }
                break;
            }
        }
    }
    channel.disconnect();
}
