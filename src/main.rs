// src/main.rs
// =============================================================================
// This is the entry point of the `crawl` binary.
//
// What happens here:
// 1. Parse command-line arguments using clap (bad input -> exit code 1)
// 2. Set up logging (stderr, so stdout only carries the report)
// 3. Build the HTTP fetcher and run the crawl, with Ctrl-C wired to cancel
// 4. Print the report as a table or JSON
// 5. Exit: 0 = crawl finished, 1 = usage error (including a seed the crawl
//    cannot start from), 2 = internal error or all workers lost,
//    130 = interrupted
//
// Individual pages that fail to load do not change the exit code; they are
// listed in the report.
// =============================================================================

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use link_crawler::{CrawlError, CrawlReport, Crawler, DocumentExtractor, FailureKind, HttpFetcher};
use tracing::{debug, warn};

const EXIT_USAGE: i32 = 1;
const EXIT_INTERNAL: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    // clap exits with 2 on bad input by default; usage errors are 1 here
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(&cli);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_INTERNAL
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    debug!(?cli, "CLI arguments parsed");

    let fetcher = HttpFetcher::new(&cli.fetch_settings()).context("failed to build HTTP client")?;
    let crawler = Crawler::new(
        cli.crawl_config(),
        Arc::new(fetcher),
        Arc::new(DocumentExtractor),
    );

    let cancel = crawler.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping crawl");
            cancel.cancel();
        }
    });

    let report = match crawler.run(&cli.start_url).await {
        Ok(report) => report,
        // A seed the crawl cannot start from is bad input, not a crash
        Err(e @ CrawlError::InvalidSeed { .. }) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_USAGE);
        }
        Err(e) => return Err(e.into()),
    };

    print_report(&report, cli.json)?;

    if report.aborted {
        Ok(EXIT_INTERNAL)
    } else if report.cancelled {
        Ok(EXIT_INTERRUPTED)
    } else {
        Ok(0)
    }
}

// Prints the report either as a table or JSON
fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints the report as a human-readable table in the terminal
fn print_table(report: &CrawlReport) {
    println!("🔍 Crawled {} from depth 0 to {}", report.seed, report.max_depth);
    println!();

    if !report.failures.is_empty() {
        println!("{:<60} {:<7} {:<12} {:<30}", "URL", "DEPTH", "KIND", "REASON");
        println!("{}", "=".repeat(112));

        for failure in &report.failures {
            // Truncate URL if too long for display
            let url_display = if failure.url.chars().count() > 57 {
                format!("{}...", failure.url.chars().take(57).collect::<String>())
            } else {
                failure.url.clone()
            };
            println!(
                "{:<60} {:<7} {:<12} {:<30}",
                url_display,
                failure.depth,
                format_kind(failure.kind),
                failure.reason
            );
        }
        println!();
    }

    println!("📊 Summary:");
    println!("   📄 Visited: {}", report.visited.len());
    println!("   ✅ Fetched: {}", report.fetched);
    println!("   ❌ Failed: {}", report.failures.len());
    println!("   🔁 Duplicates skipped: {}", report.duplicates);
    if report.out_of_scope > 0 {
        println!("   🚧 Out of scope: {}", report.out_of_scope);
    }
    if report.cancelled {
        println!("   ⏹️  Cancelled, {} link(s) discarded", report.discarded);
    }
    if report.degraded {
        println!("   ⚠️  Repeated allocation failures");
    }
    if report.panicked_workers > 0 {
        println!("   💥 Workers lost: {}", report.panicked_workers);
    }
    if report.aborted {
        println!("   🛑 Stopped early: no workers left to finish the crawl");
    }
    println!("   ⏱️  {} ms with {} worker(s)", report.elapsed_ms, report.workers);
}

fn format_kind(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Fetch => "FETCH",
        FailureKind::Parse => "PARSE",
        FailureKind::Allocation => "ALLOCATION",
    }
}
