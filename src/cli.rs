// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
//   crawl <start-url> <max-depth> [worker-count] [options]
//
// The positional arguments are the crawl itself; the flags tune the HTTP
// client and the output. Cli::crawl_config() and Cli::fetch_settings() turn
// the parsed arguments into the library's configuration types.
// =============================================================================

use std::num::NonZeroUsize;
use std::time::Duration;

use clap::{ArgAction, Parser};
use link_crawler::fetch::{DEFAULT_MAX_BODY_BYTES, DEFAULT_TIMEOUT_SECS};
use link_crawler::{CrawlConfig, CrawlScope, FetchSettings, DEFAULT_ALLOCATION_ALARM};

#[derive(Parser, Debug)]
#[command(
    name = "crawl",
    version,
    about = "Crawl a website breadth-first up to a maximum depth",
    long_about = "crawl visits every page reachable from a start URL within a given number of \
                  link hops, fetching each URL exactly once with a fixed pool of workers."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com)
    #[arg(value_parser = parse_start_url)]
    pub start_url: String,

    /// Maximum number of link hops from the start URL (0 = only the start page)
    pub max_depth: u32,

    /// Number of concurrent workers
    #[arg(default_value = "4")]
    pub worker_count: NonZeroUsize,

    /// Only follow links on the start URL's host
    #[arg(long)]
    pub same_host: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Maximum number of redirects to follow per request
    #[arg(long, default_value_t = 5)]
    pub max_redirects: usize,

    /// Largest response body to download, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// User-Agent header to send
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Output the crawl report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn crawl_config(&self) -> CrawlConfig {
        let scope = if self.same_host {
            CrawlScope::SameHost
        } else {
            CrawlScope::Any
        };
        CrawlConfig {
            max_depth: self.max_depth,
            workers: self.worker_count,
            scope,
            allocation_alarm: DEFAULT_ALLOCATION_ALARM,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        let mut settings = FetchSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            max_redirects: self.max_redirects,
            max_body_bytes: self.max_body_bytes,
            ..FetchSettings::default()
        };
        if let Some(agent) = &self.user_agent {
            settings.user_agent = agent.clone();
        }
        settings
    }

    // RUST_LOG wins over these when set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

fn parse_start_url(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err("start URL must not be empty".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}
