use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use cfctl::cli::{Cli, Commands};
use cfctl::{initialize_config, Account, Config, InitOptions, LoggingConfig};

/// Install the tracing subscriber. CLI flags win over the `[logging]` section,
/// and `RUST_LOG` wins over both.
fn init_logging(cli: &Cli, logging: &LoggingConfig) {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
        return;
    }

    let level = if cli.verbose {
        "debug"
    } else {
        cli.log_level.as_deref().unwrap_or(logging.level.as_str())
    };
    let format = cli.log_format.as_deref().unwrap_or(logging.format.as_str());

    let subscriber = fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle init command early as it doesn't need config loading
    if let Commands::Init { no_prompt, force } = cli.command {
        let logging = Config::from_env()
            .map(|config| config.logging)
            .unwrap_or_default();
        init_logging(&cli, &logging);
        return initialize_config(InitOptions {
            config_path: cli.config,
            no_prompt,
            force,
        })
        .await;
    }

    let config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&cli, &config.logging);
    debug!(
        "Using {} with {} calls per {}s",
        config.api.base_url,
        config.limits.max_calls(),
        config.limits.period_seconds
    );
    let account = Account::from_config(&config)?;

    let result = run(&account, cli.command).await;
    if let Err(ref e) = result {
        eprintln!("Error: {e:#}");
    }
    result
}

async fn run(account: &Account, command: Commands) -> Result<()> {
    match command {
        Commands::Zones { name } => {
            let zones = match name {
                Some(name) => account.search_zone(&name).await?,
                None => account.list_zones(&[]).await?,
            };
            info!("Found {} zones", zones.len());
            for zone in zones {
                println!("{}\t{}", zone.id, zone.name);
            }
        }
        Commands::Records { zone } => {
            let records = account.zone(zone).list_records().await?;
            for record in records {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    record.id,
                    record.record_type,
                    record.name,
                    record.content,
                    if record.proxied { "proxied" } else { "dns-only" }
                );
            }
        }
        Commands::Proxy { zone, record, off } => {
            let zone = account.zone(zone);
            let handle = zone.record(record);
            let current = handle.details().await?;
            let updated = if off {
                handle.unproxy(&current).await?
            } else {
                handle.proxy(&current).await?
            };
            match updated {
                Some(record) => println!("{}\tproxied={}", record.name, record.proxied),
                None => println!("{}\tunchanged", current.name),
            }
        }
        Commands::Init { .. } => unreachable!(), // Already handled above
    }
    Ok(())
}
