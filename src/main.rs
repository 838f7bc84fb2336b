use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use talker_probe::denylist::DenyList;
use talker_probe::probe::ProbeConfig;
use talker_probe::types::ProbeBatchResult;
use talker_probe::{dataset, server, snapshot};

/// talker-probe — TCP liveness checks for a public directory of talker chat servers.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "talker-probe",
    version,
    about = "Probes the talker directory's endpoints and records which accept a TCP connection.",
    long_about = None
)]
struct Cli {
    /// Path to the talker dataset JSON.
    #[arg(long, default_value = "talkers.json")]
    dataset: PathBuf,

    /// Path to a deny-list file of defunct-domain patterns. Uses the built-in
    /// list when omitted.
    #[arg(long = "deny-list")]
    deny_list: Option<PathBuf>,

    /// Per-probe connect timeout in milliseconds for the batch run.
    #[arg(long = "timeout-ms", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Per-probe connect timeout in milliseconds for the query API, kept low
    /// so a full request fits under the platform's request-time ceiling.
    #[arg(long = "serve-timeout-ms", default_value_t = 3_000)]
    serve_timeout_ms: u64,

    /// Max concurrent TCP connect attempts.
    #[arg(long, default_value_t = 500)]
    concurrency: usize,

    /// Destination of the persisted status artifact (batch mode).
    #[arg(long, default_value = "status.json")]
    output: PathBuf,

    /// Probe only talkers whose sorted name starts with this letter (batch mode).
    #[arg(long)]
    letter: Option<char>,

    /// Run the on-demand query API instead of a batch run.
    #[arg(long, default_value_t = false)]
    serve: bool,

    /// Bind address for the query API.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    println!("talker-probe configuration:");
    println!("  dataset      : {}", cli.dataset.display());
    println!(
        "  deny_list    : {}",
        cli.deny_list
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<built-in>".to_string())
    );
    println!("  concurrency  : {}", cli.concurrency);
    if cli.serve {
        println!("  timeout_ms   : {}", cli.serve_timeout_ms);
        println!("  bind         : {}", cli.bind);
    } else {
        println!("  timeout_ms   : {}", cli.timeout_ms);
        println!("  output       : {}", cli.output.display());
        println!(
            "  letter       : {}",
            cli.letter.map(String::from).unwrap_or_else(|| "<all>".to_string())
        );
    }

    let ds = dataset::load_dataset_from_path(&cli.dataset)?;
    let deny = match cli.deny_list.as_deref() {
        Some(path) => DenyList::load_from_path(path)?,
        None => DenyList::builtin(),
    };

    if cli.serve {
        let config = ProbeConfig {
            timeout: Duration::from_millis(cli.serve_timeout_ms),
            concurrency: cli.concurrency,
        };
        server::spawn_server(&cli.bind, ds, deny, config, cli.output.clone()).await?;
        return Ok(());
    }

    let config = ProbeConfig {
        timeout: Duration::from_millis(cli.timeout_ms),
        concurrency: cli.concurrency,
    };

    let batch = snapshot::run_batch(&ds, &deny, &config, &cli.output, cli.letter).await?;

    print_batch_table(&batch);
    println!("Wrote snapshot to {}", cli.output.display());
    Ok(())
}

fn print_batch_table(batch: &ProbeBatchResult) {
    let mut name_w = "name".len();
    let mut host_w = "hostname".len();
    for t in &batch.talkers {
        name_w = name_w.max(t.name.len().min(40));
        host_w = host_w.max(t.hostname.len().min(50));
    }
    let port_w = "port".len().max(5);

    println!(
        "\nConnectable talkers: {} (checked {})",
        batch.talkers.len(),
        batch.date_checked
    );
    println!(
        "{:<name_w$}  {:<host_w$}  {:>port_w$}",
        "name",
        "hostname",
        "port",
        name_w = name_w,
        host_w = host_w,
        port_w = port_w
    );
    println!(
        "{:-<name_w$}  {:-<host_w$}  {:-<port_w$}",
        "",
        "",
        "",
        name_w = name_w,
        host_w = host_w,
        port_w = port_w
    );
    for t in &batch.talkers {
        let mut name = t.name.clone();
        if name.len() > 40 {
            name.truncate(40);
        }
        let mut host = t.hostname.clone();
        if host.len() > 50 {
            host.truncate(50);
        }
        println!(
            "{:<name_w$}  {:<host_w$}  {:>port_w$}",
            name,
            host,
            t.port,
            name_w = name_w,
            host_w = host_w,
            port_w = port_w
        );
    }
}
