use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use olx_scan_client::client::HttpScanApi;
use olx_scan_client::controller::Controller;
use olx_scan_client::endpoints::{Endpoints, DEFAULT_BASE_URL};
use olx_scan_client::terminal::{Downloader, TerminalUi};
use olx_scan_client::types::ExportKind;
use olx_scan_client::ui::{Input, Trigger, UiPort};

type App = Controller<TerminalUi, HttpScanApi>;

/// olx-scan-client: search the OLX price scanner, show price stats and listings, fetch exports.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "olx-scan-client",
    version,
    about = "Search the OLX price scanner, show price stats and listings, fetch CSV/XLSX exports.",
    long_about = None
)]
struct Cli {
    /// Base address of the scanner backend.
    #[arg(long = "base-url", env = "OLX_SCAN_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Run a single search for this query and exit. Without it, start the interactive prompt.
    #[arg(long)]
    query: Option<String>,

    /// Number of result pages the backend should scrape (sent as typed).
    #[arg(long, default_value = "1")]
    pages: String,

    /// After a one-shot search, request this export (csv or xls).
    #[arg(long)]
    export: Option<ExportKind>,

    /// Save export attachments here. Without it, export URLs are only printed.
    #[arg(long = "download-dir")]
    download_dir: Option<PathBuf>,

    /// HTTP timeout in seconds for the terminal client (0 disables it).
    #[arg(long = "timeout-secs", default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    println!("olx-scan-client configuration:");
    println!("  base_url     : {}", cli.base_url);
    println!(
        "  query        : {}",
        cli.query.as_deref().unwrap_or("<interactive>")
    );
    println!("  pages        : {}", cli.pages);
    println!(
        "  download_dir : {}",
        cli.download_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );
    println!("  timeout_secs : {}", cli.timeout_secs);

    let timeout = (cli.timeout_secs > 0).then(|| Duration::from_secs(cli.timeout_secs));
    let endpoints = Endpoints::new(cli.base_url.clone());
    let api = HttpScanApi::new(endpoints.clone(), timeout).context("failed to build HTTP client")?;

    if let Some(dir) = cli.download_dir.as_deref() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let downloader = cli
        .download_dir
        .clone()
        .map(|dir| Downloader::new(api.http().clone(), dir));

    let ui = Arc::new(TerminalUi::new(downloader));
    ui.set_input(Input::Pages, cli.pages.clone());
    let app = Arc::new(Controller::new(ui.clone(), api, endpoints));

    match cli.query.as_deref() {
        Some(query) => one_shot(&app, query, cli.export).await?,
        None => interactive(app.clone()).await?,
    }

    ui.settle_downloads().await;
    Ok(())
}

async fn one_shot(app: &App, query: &str, export: Option<ExportKind>) -> Result<()> {
    app.ui().set_input(Input::Query, query);
    app.initiate_search().await.into_rows()?;
    if let Some(kind) = export {
        activate_export(app, kind);
    }
    Ok(())
}

async fn interactive(app: Arc<App>) -> Result<()> {
    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        let line = line.trim();
        let (cmd, arg) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let arg = arg.trim();

        match cmd {
            "" => {}
            "query" | "q" => app.ui().set_input(Input::Query, arg),
            "pages" | "p" => app.ui().set_input(Input::Pages, arg),
            "scan" | "s" => {
                if !app.ui().is_enabled(Trigger::Scan) {
                    println!("A search is already running.");
                    continue;
                }
                if app.ui().read_input(Input::Query).trim().is_empty() {
                    println!("Set a query first: query <text>");
                    continue;
                }
                let app = app.clone();
                tokio::spawn(async move {
                    let outcome = app.initiate_search().await;
                    debug!(?outcome, "search finished");
                });
            }
            "csv" => activate_export(&app, ExportKind::Csv),
            "xls" | "xlsx" => activate_export(&app, ExportKind::Xls),
            "status" => println!("{}", app.ui().summary()),
            "help" | "?" => print_help(),
            "quit" | "exit" => break,
            other => println!("Unknown command: {other} (try help)"),
        }
    }
    Ok(())
}

/// Exports behave like buttons: disabled until a search returned listings.
fn activate_export(app: &App, kind: ExportKind) {
    let trigger = match kind {
        ExportKind::Csv => Trigger::ExportCsv,
        ExportKind::Xls => Trigger::ExportXls,
    };
    if !app.ui().is_enabled(trigger) {
        println!("Export is disabled: run a search that returns listings first.");
        return;
    }
    app.navigate_to_export(kind);
}

fn print_help() {
    println!("Commands:");
    println!("  query <text>   set the search query");
    println!("  pages <n>      set how many result pages to scan");
    println!("  scan           run the search");
    println!("  csv | xls      export the current query");
    println!("  status         show inputs and the last stats");
    println!("  help           this list");
    println!("  quit           leave");
}
