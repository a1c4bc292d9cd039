//! Conference-corpus command-line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use conference_corpus::config::{load_config, validate_config, Config};
use conference_corpus::fetch::Fetcher;
use conference_corpus::glossary::scrape_collection;
use conference_corpus::output::write_corpus;
use conference_corpus::talks::{crawl_talks, LinkDiscovery};
use conference_corpus::topics::scrape_topics;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scrape the conference talk archive and study-aid collections into JSON
#[derive(Parser, Debug)]
#[command(name = "conference-corpus")]
#[command(version = "1.0.0")]
#[command(about = "Structured corpus extractor for the gospel study site", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory the JSON corpora are written into
    #[arg(long, value_name = "DIR", default_value = "data")]
    out_dir: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the full conference talk archive
    Talks,
    /// Scrape the topic-to-talk mappings
    Topics,
    /// Scrape the Topical Guide and Bible Dictionary collections
    Glossary {
        /// Only scrape the first N entries per collection
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Run every pipeline
    All {
        /// Only scrape the first N glossary entries per collection
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => {
            let config = Config::default();
            validate_config(&config)?;
            config
        }
    };

    let fetcher = Fetcher::new(&config)?;

    match cli.command {
        Command::Talks => run_talks(&config, &fetcher, &cli.out_dir).await?,
        Command::Topics => run_topics(&config, &fetcher, &cli.out_dir).await?,
        Command::Glossary { limit } => run_glossary(&config, &fetcher, &cli.out_dir, limit).await?,
        Command::All { limit } => {
            run_talks(&config, &fetcher, &cli.out_dir).await?;
            run_topics(&config, &fetcher, &cli.out_dir).await?;
            run_glossary(&config, &fetcher, &cli.out_dir, limit).await?;
        }
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("conference_corpus=info,warn"),
            1 => EnvFilter::new("conference_corpus=debug,info"),
            2 => EnvFilter::new("conference_corpus=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Discovers every leaf talk URL, crawls them in parallel, writes the corpus
async fn run_talks(config: &Config, fetcher: &Fetcher, out_dir: &std::path::Path) -> Result<()> {
    let base = &config.source.base_url;
    let index_url = format!("{}/study/general-conference?lang={}", base, config.source.lang);

    let discovery = LinkDiscovery::new(fetcher, base);
    let period_pages = discovery.discover_period_pages(&index_url).await;

    let mut talk_urls = Vec::new();
    let mut seen = HashSet::new();
    for period_url in &period_pages {
        fetcher.pause().await;
        for url in discovery.discover_talk_urls(period_url).await {
            if seen.insert(url.clone()) {
                talk_urls.push(url);
            }
        }
    }
    tracing::info!("Total talks found: {}", talk_urls.len());

    let talks = crawl_talks(
        fetcher.clone(),
        talk_urls,
        config.crawler.max_concurrent_fetches,
    )
    .await;
    write_corpus(&out_dir.join("conference_talks.json"), &talks)?;
    Ok(())
}

/// Scrapes the topic mapping corpus
async fn run_topics(config: &Config, fetcher: &Fetcher, out_dir: &std::path::Path) -> Result<()> {
    let topics = scrape_topics(fetcher, &config.source.base_url).await?;
    write_corpus(&out_dir.join("topic_talk_mappings.json"), &topics)?;
    Ok(())
}

/// Scrapes both glossary collections
async fn run_glossary(
    config: &Config,
    fetcher: &Fetcher,
    out_dir: &std::path::Path,
    limit: Option<usize>,
) -> Result<()> {
    let base = &config.source.base_url;
    let lang = &config.source.lang;

    let tg = scrape_collection(
        fetcher,
        "TG",
        base,
        &format!("{}/study/scriptures/tg?lang={}", base, lang),
        "/study/scriptures/tg/",
        limit,
    )
    .await?;
    write_corpus(&out_dir.join("topical_guide_entries.json"), &tg)?;

    let bd = scrape_collection(
        fetcher,
        "BD",
        base,
        &format!("{}/study/scriptures/bd?lang={}", base, lang),
        "/study/scriptures/bd/",
        limit,
    )
    .await?;
    write_corpus(&out_dir.join("bible_dictionary_entries.json"), &bd)?;

    Ok(())
}
