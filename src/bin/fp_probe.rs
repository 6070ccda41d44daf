//! Kilo Bloom false positive probe.
//!
//! Builds a filter from configuration over an in-memory bit array, inserts
//! the expected number of distinct keys from several threads, then reports
//! how many inserted keys went missing (must be none) and how often keys
//! that were never inserted are reported present.

use std::path::PathBuf;
use std::process;
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kilo_bloom::bloom::{BloomFilter, IndexScheme};
use kilo_bloom::config::{ConfigLoader, FilterConfig, LogConfig, Validate, ENV_PREFIX};
use kilo_bloom::storage::AtomicBitSet;

/// Command line arguments for the probe.
#[derive(Parser, Debug)]
#[clap(name = "fp_probe", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Expected number of items, overrides the configuration
    #[clap(short = 'n', long)]
    items: Option<u64>,

    /// Target false positive rate, overrides the configuration
    #[clap(short = 'p', long)]
    rate: Option<f64>,

    /// Index scheme: double-hashing, chained-fnv1a or chained-fnv1
    #[clap(short, long)]
    scheme: Option<IndexScheme>,

    /// Number of inserting threads
    #[clap(short, long, default_value_t = num_cpus::get())]
    threads: usize,

    /// Print the report as JSON
    #[clap(long)]
    json: bool,

    /// Print the effective configuration as TOML and exit
    #[clap(long)]
    print_config: bool,
}

/// Outcome of one probe run.
#[derive(Debug, Serialize)]
struct ProbeReport {
    scheme: IndexScheme,
    expected_items: u64,
    target_rate: f64,
    bits: u64,
    hashes: u32,
    threads: usize,
    fill_ratio: f64,
    false_negatives: u64,
    false_positives: u64,
    observed_rate: f64,
    expected_rate: f64,
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    let installed = if log.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry
            .with(fmt::layer().with_line_number(true).with_file(true))
            .try_init()
    };

    installed.context("Failed to set global tracing subscriber")
}

fn inserted_key(i: u64) -> String {
    format!("inserted:{i}")
}

fn probe_key(i: u64) -> String {
    format!("probe:{i}")
}

/// Fill a fresh filter from `threads` workers and measure it.
fn probe(config: &FilterConfig, threads: usize) -> Result<ProbeReport> {
    let params = config.parameters()?;
    let bits = AtomicBitSet::new(params.bits);
    let filter = BloomFilter::from_config(config, &bits)?;

    let items = config.expected_items;
    let threads = threads.max(1);
    info!(
        bits = params.bits,
        hashes = params.hashes,
        scheme = %filter.scheme(),
        threads,
        "Inserting {items} keys"
    );

    thread::scope(|scope| -> Result<()> {
        let filter = &filter;
        let workers: Vec<_> = (0..threads as u64)
            .map(|start| {
                scope.spawn(move || -> Result<()> {
                    for i in (start..items).step_by(threads) {
                        filter.add(inserted_key(i))?;
                    }
                    Ok(())
                })
            })
            .collect();

        for worker in workers {
            worker
                .join()
                .map_err(|_| anyhow!("insert worker panicked"))??;
        }
        Ok(())
    })?;

    let mut false_negatives = 0;
    for i in 0..items {
        if !filter.exists(inserted_key(i))? {
            false_negatives += 1;
        }
    }

    let mut false_positives = 0;
    for i in 0..items {
        if filter.exists(probe_key(i))? {
            false_positives += 1;
        }
    }

    Ok(ProbeReport {
        scheme: filter.scheme(),
        expected_items: items,
        target_rate: config.false_positive_rate,
        bits: params.bits,
        hashes: params.hashes,
        threads,
        fill_ratio: bits.fill_ratio(),
        false_negatives,
        false_positives,
        observed_rate: false_positives as f64 / items as f64,
        expected_rate: filter.expected_false_positive_rate(items),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::new(args.config.as_deref(), ENV_PREFIX).load()?;
    if let Some(items) = args.items {
        config.filter.expected_items = items;
    }
    if let Some(rate) = args.rate {
        config.filter.false_positive_rate = rate;
    }
    if let Some(scheme) = args.scheme {
        config.filter.index_scheme = scheme;
    }
    config.validate()?;

    if args.print_config {
        let toml = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        print!("{toml}");
        return Ok(());
    }

    init_logging(&config.log)?;

    let report = probe(&config.filter, args.threads)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("scheme           {}", report.scheme);
        println!("m / k            {} bits / {} hashes", report.bits, report.hashes);
        println!("items            {} ({} threads)", report.expected_items, report.threads);
        println!("fill ratio       {:.4}", report.fill_ratio);
        println!("false negatives  {}", report.false_negatives);
        println!(
            "false positives  {} ({:.5} observed, {:.5} expected, {} target)",
            report.false_positives, report.observed_rate, report.expected_rate, report.target_rate
        );
    }

    if report.false_negatives > 0 {
        error!(
            false_negatives = report.false_negatives,
            "Inserted keys reported absent"
        );
        process::exit(1);
    }

    Ok(())
}
