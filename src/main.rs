use job_monitor_lib::{input_loader, logger, login, search_query};
use job_monitor_lib::config::{Cli, Command, Settings};
use job_monitor_lib::{ChromiumLauncher, CsvSink, Monitor, SearchQuery, SessionStore};

use std::error::Error;
use std::time::Duration;
use clap::Parser;
use log::{info, error};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    let cli = Cli::parse();

    match cli.command.clone().unwrap_or(Command::Watch) {
        Command::Login { url } => run_login(&cli.settings, &url).await,
        Command::Watch => run_watch(&cli.settings).await,
    }
}

async fn run_login(settings: &Settings, url: &str) -> Result<(), Box<dyn Error>> {
    let launcher = ChromiumLauncher::new(settings.browser_options());
    let store = SessionStore::new(settings.session.clone());
    let wait_for_enter = async {
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok::<(), std::io::Error>(())
    };
    login::capture_session(&launcher, &store, url, Duration::from_secs(3), wait_for_enter).await?;
    Ok(())
}

async fn run_watch(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let config = settings.build_config()?;
    let queries = resolve_queries(settings)?;
    if queries.is_empty() {
        error!("No search queries to monitor. Pass --query or --queries-file with a 'url' or 'keywords' column.");
        return Ok(());
    }

    info!("Starting job monitor for {} searches, writing to {:?}", queries.len(), config.output_path);
    let launcher = ChromiumLauncher::new(settings.browser_options());
    let sink = CsvSink::new(config.output_path.clone());
    let mut monitor = Monitor::new(launcher, sink, &config);
    monitor.run(&queries).await;
    Ok(())
}

fn resolve_queries(settings: &Settings) -> Result<Vec<SearchQuery>, Box<dyn Error>> {
    let mut queries: Vec<SearchQuery> = settings
        .queries
        .iter()
        .filter(|q| !q.trim().is_empty())
        .map(|q| SearchQuery::from_url(q.trim()))
        .collect();
    if let Some(path) = &settings.queries_file {
        queries.extend(input_loader::load_queries(path)?);
    }
    if queries.is_empty() && settings.queries_file.is_none() {
        info!("No queries given; using the default internship searches.");
        queries = search_query::default_queries();
    }
    Ok(queries)
}
