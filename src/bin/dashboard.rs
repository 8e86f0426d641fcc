use std::time::Duration;

use clap::Parser;
use status_dashboard::{
    ServiceCategory, ServiceStatus, Snapshot,
    config::{builtin_specs, read_config_file},
    orchestrator::Orchestrator,
};
use tracing::{debug, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (JSON); built-in service set when omitted
    #[arg(short)]
    file: Option<String>,

    /// Refresh interval in seconds
    #[arg(short, long, default_value_t = 60)]
    interval: u64,

    /// Run a single check cycle and exit
    #[arg(long)]
    once: bool,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("status_dashboard", LevelFilter::DEBUG),
        ("dashboard", LevelFilter::DEBUG),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let specs = match &args.file {
        Some(path) => read_config_file(path)?.services,
        None => builtin_specs(),
    };
    debug!("monitoring {} services", specs.len());

    let orchestrator = Orchestrator::new();

    loop {
        let snapshot = orchestrator.run_snapshot(&specs).await;
        render(&snapshot);

        if args.once {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(args.interval)) => {}
            _ = tokio::signal::ctrl_c() => {
                debug!("received ctrl-c, shutting down");
                break;
            }
        }
    }

    // Guarantees the browser subprocess is reaped
    orchestrator.shutdown().await;

    Ok(())
}

fn render(snapshot: &Snapshot) {
    println!(
        "\n=== LLM & Cloud API Status - {} ===\n",
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for category in [ServiceCategory::LlmApi, ServiceCategory::CloudProvider] {
        println!("{category}:");
        for record in snapshot.records.iter().filter(|r| r.category == category) {
            let icon = match record.status {
                ServiceStatus::Operational => "+",
                ServiceStatus::Disrupted => "!",
                ServiceStatus::Unknown => "?",
            };
            println!("  [{icon}] {:<35} {}", record.service_name, record.status);
            if let Some(detail) = &record.detail {
                println!("      {detail}");
            }
            if let Some(issue) = &record.issue_url {
                println!("      incident: {issue}");
            }
            println!("      source: {}", record.source_url);
        }
        println!(
            "  {}/{} operational\n",
            snapshot.operational_count(category),
            snapshot.category_count(category)
        );
    }
}
