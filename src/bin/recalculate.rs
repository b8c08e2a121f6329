// src/bin/recalculate.rs
use anyhow::{Context, Result};
use bet_tracker::{
    engine, metrics::render_report, setup_logging, Config, RecordStore, RedisStore,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::*;
use std::path::PathBuf;

// CLI Arguments using clap
#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recalculate the stats snapshot for one month
    Run {
        /// Month to recalculate (YYYY-MM); defaults to the current month
        #[clap(short, long)]
        month: Option<String>,

        /// Compute and print the snapshot without writing it
        #[clap(long)]
        dry_run: bool,

        /// Path to configuration file
        #[clap(short, long, default_value = "config/tracker.toml")]
        config: PathBuf,
    },

    /// Print the stored snapshot for a month as a report
    Show {
        /// Month to show (YYYY-MM); defaults to the current month
        #[clap(short, long)]
        month: Option<String>,

        /// Path to configuration file
        #[clap(short, long, default_value = "config/tracker.toml")]
        config: PathBuf,
    },

    /// List months that have daily records in the store
    Months {
        /// Path to configuration file
        #[clap(short, long, default_value = "config/tracker.toml")]
        config: PathBuf,
    },
}

fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

async fn connect(config_path: &PathBuf) -> Result<(Config, RedisStore)> {
    let config = Config::load(config_path)?;

    let store = RedisStore::connect(&config.store)
        .await
        .context("Could not reach the record store")?;
    if !store.health_check().await? {
        anyhow::bail!("Record store did not answer PING");
    }

    Ok((config, store))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging();

    match args.command {
        Commands::Run {
            month,
            dry_run,
            config,
        } => {
            let month = month.unwrap_or_else(current_month);
            let (config, store) = connect(&config).await?;

            if dry_run {
                info!("Dry run: computing stats for {} without writing", month);
                let records = store.fetch_month_records(&month).await?;
                let stats = engine::compute_monthly_stats(&month, &records);
                println!("{}", render_report(&stats));
            } else {
                let stats =
                    engine::recalculate_month(&store, &month, config.notifications.enabled)
                        .await
                        .context("Monthly recalculation failed")?;
                println!("{}", render_report(&stats));
            }
        }

        Commands::Show { month, config } => {
            let month = month.unwrap_or_else(current_month);
            let (_, store) = connect(&config).await?;

            match store.read_monthly_stats(&month).await? {
                Some(stats) => println!("{}", render_report(&stats)),
                None => println!("No stats snapshot stored for {}", month),
            }
        }

        Commands::Months { config } => {
            let (_, store) = connect(&config).await?;

            let months = store.list_record_months().await?;
            if months.is_empty() {
                println!("No record months found");
            } else {
                for month in months {
                    println!("{}", month);
                }
            }
        }
    }

    Ok(())
}
