mod config;
mod decoder;
mod envelope;
mod error;
mod poller;
mod report;
mod transport;

use clap::Parser;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use config::CliArgs;
use error::PollError;
use poller::Poller;
use report::{FieldValue, Report, Section};
use transport::HttpTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linktester=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    info!("Starting linktester v{}", env!("CARGO_PKG_VERSION"));
    info!("Endpoint: {}", args.endpoint);
    info!(
        "Attempts: {}, interval: {}s",
        args.attempts, args.interval_secs
    );

    let endpoint = Url::parse(&args.endpoint)?;
    let transport = HttpTransport::new(endpoint, Duration::from_secs(args.http_timeout_secs))?;

    let mut poller = Poller::new(transport)
        .max_attempts(args.attempts)
        .interval(Duration::from_secs(args.interval_secs));
    if let Some(deadline_secs) = args.deadline_secs {
        poller = poller.deadline(Duration::from_secs(deadline_secs));
    }

    match poller.poll().await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e @ PollError::Timeout { .. }) => {
            error!("{}", e);
            std::process::exit(1);
        }
        Err(PollError::Schema(e)) => {
            error!("Tester firmware/protocol mismatch: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &Report) {
    let dev = &report.device;
    println!("Tester {} ({})", dev.model, dev.serial);
    println!(
        "  fw {} build {}  mac {}  ip {}",
        dev.firmware, dev.build, dev.mac, dev.ip_address
    );
    println!();

    for section in Section::ALL {
        let result = report.section(section);
        println!(
            "{:<18} {:?} ({:?})",
            section.label(),
            result.state,
            result.outcome
        );
        for (name, value) in &result.fields {
            match value {
                FieldValue::Text(s) if !s.is_empty() => println!("    {:<18} {}", name, s),
                FieldValue::Text(_) => {}
                // Alias lists display only the most-specific (last) entry;
                // probe and DNS lists display in full.
                FieldValue::List(_) if *name == "port" => {
                    if let Some(alias) = value.last() {
                        println!("    {:<18} {}", name, alias);
                    }
                }
                FieldValue::List(items) => {
                    println!("    {:<18} {}", name, items.join(", "));
                }
            }
        }
    }
}
