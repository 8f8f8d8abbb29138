//! txsync CLI
//! Send-then-poll versus eth_sendRawTransactionSync, network time only

use anyhow::Context;
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use tracing::info;
use txsync_bench::keystore::{self, FileKeyStore};
use txsync_bench::report::{self, Comparison};
use txsync_bench::{BenchError, BenchmarkRunner, Config, MethodIdentity, RpcSubmitter};

#[derive(Debug, Parser)]
#[command(name = "txsync", version, about = "Compare transaction confirmation latency")]
struct Cli {
    /// JSON config file
    #[arg(long, env = "TXSYNC_CONFIG", global = true)]
    config: Option<String>,

    /// Override the configured RPC endpoint
    #[arg(long, env = "TXSYNC_RPC_URL", global = true)]
    rpc_url: Option<String>,

    /// Override the configured key file
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show (generating if needed) the demo wallet
    Wallet {
        /// Print the private key instead
        #[arg(long)]
        export: bool,
    },
    /// Send one transaction with the given method
    Send {
        /// traditional | sync
        method: MethodIdentity,
    },
    /// One traditional send followed by one sync send
    Compare,
    /// Repeated sends per method with avg/min/max
    Benchmark {
        #[arg(long, short = 'n')]
        iterations: Option<usize>,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    if let Some(url) = cli.rpc_url {
        config.network.rpc_url = url;
    }
    if let Some(path) = cli.key_file {
        config.wallet.key_path = path;
    }
    config.validate()?;

    txsync_bench::logging::init(&config.logging)?;

    if let Some(metrics) = &config.metrics {
        PrometheusBuilder::new()
            .with_http_listener(metrics.listen_addr)
            .install()
            .context("failed to install prometheus exporter")?;
        info!(addr = %metrics.listen_addr, "Metrics exporter listening");
    }

    let store = FileKeyStore::new(&config.wallet.key_path);
    let wallet = keystore::load_or_generate(&store)
        .with_context(|| format!("loading key from {}", store.path().display()))?;

    if let Command::Wallet { export: true } = cli.command {
        println!("{}", keystore::export_private_key(&wallet));
        return Ok(());
    }

    let symbol = config.network.native_symbol.clone();
    let result = run(cli.command, &config, wallet).await;
    result.map_err(|e| anyhow::anyhow!(report::describe_error(&e, &symbol)))
}

async fn run(
    command: Command,
    config: &Config,
    wallet: ethers::signers::LocalWallet,
) -> Result<(), BenchError> {
    let submitter = RpcSubmitter::connect(&config.network, config.submission.clone(), wallet).await?;

    let runner = BenchmarkRunner::new();
    let cancel = runner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, letting the current attempt settle");
            cancel.cancel();
        }
    });

    let explorer = config.network.explorer_url.as_str();

    match command {
        Command::Wallet { .. } => {
            let balance = submitter.balance().await?;
            println!("address: {:?}", submitter.address());
            println!("balance: {}", report::format_balance(balance, &config.network.native_symbol));
            if report::is_low_balance(balance) {
                println!(
                    "Send ~0.1 {} to run the demo. This is a temporary testing wallet, do not send more than you need.",
                    config.network.native_symbol
                );
            }
        }
        Command::Send { method } => {
            real_funds_notice(config);
            let outcome = runner.run_single(method, &submitter).await?;
            print!("{}", report::render_outcome(&outcome, explorer));
        }
        Command::Compare => {
            real_funds_notice(config);
            let (traditional, sync) = runner.run_comparison(&submitter, &submitter).await?;
            print!("{}", report::render_outcome(&traditional, explorer));
            print!("{}", report::render_outcome(&sync, explorer));
            if let Some(comparison) = Comparison::of_outcomes(&traditional, &sync) {
                print!("{}", report::render_comparison(&comparison, "comparison"));
            }
        }
        Command::Benchmark { iterations } => {
            real_funds_notice(config);
            let iterations = iterations.unwrap_or(config.benchmark.iterations);

            println!("benchmark ({} iterations each)", iterations);
            let (traditional, sync) = runner
                .run_benchmark(
                    iterations,
                    &submitter,
                    |p| eprintln!("{}", p),
                    |series| print!("{}", report::render_series(series)),
                )
                .await?;

            if let Some(comparison) = Comparison::of_series(&traditional, &sync) {
                print!("{}", report::render_comparison(&comparison, "average"));
            }
        }
    }

    Ok(())
}

fn real_funds_notice(config: &Config) {
    eprintln!(
        "timing excludes tx preparation/signing. This runs on {} (chain {}). Transactions use real {}.",
        config.network.name, config.network.chain_id, config.network.native_symbol
    );
}
