use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scholar_lens::config::{
    default_config_path, find_config_file, load_config, load_from_env, Config, LoggingConfig,
};
use scholar_lens::controller::{EnvPage, PageContext, Popup, StaticPage};
use scholar_lens::fetch::{Endpoints, FetchKind};
use scholar_lens::models::{CitationData, SearchResult};
use scholar_lens::parse::{parse_citation_html, parse_search_results_with_base};
use scholar_lens::render::{
    draw_dialog, draw_pane, CitationDialog, DialogEvent, Osc52Clipboard, ResultView, ResultsPane,
    Theme, COPIED_TEXT, EMPTY_TEXT,
};
use scholar_lens::ui::{self, status_line, truncate_with_ellipsis, Spinner, Status};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scholar Lens - look up the page you are reading on Google Scholar
#[derive(Parser, Debug)]
#[command(name = "scholar-lens")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search Google Scholar and copy citations from the terminal", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive session: search, browse results, copy citations (default)
    #[command(alias = "p")]
    Popup {
        /// Title of the page being read; seeds the first search
        #[arg(long)]
        page_title: Option<String>,
    },

    /// Search Scholar once and print the results
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,
    },

    /// Fetch the citation formats for a result's cite id
    Cite {
        /// Cite id (the result's `data-cid`)
        cid: String,
    },

    /// Parse a saved Scholar page offline
    Parse {
        #[command(subcommand)]
        page: ParseCommand,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ParseCommand {
    /// A search results page
    Results {
        /// HTML file to read
        file: PathBuf,
    },
    /// A citation popup page
    Citation {
        /// HTML file to read
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a configuration file with the default settings
    Init {
        /// Where to write it (defaults to the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

/// One line typed into the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionInput {
    Query(String),
    Cite(usize),
    Copy(usize),
    Close,
    Outside,
    Help,
    Quit,
    Unknown(String),
}

impl SessionInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return SessionInput::Query(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let number = parts.next().and_then(|n| n.parse::<usize>().ok()).filter(|n| *n > 0);

        match (name, number) {
            ("cite" | "c", Some(n)) => SessionInput::Cite(n),
            ("copy" | "y", Some(n)) => SessionInput::Copy(n),
            ("close" | "x", _) => SessionInput::Close,
            ("outside", _) => SessionInput::Outside,
            ("help" | "h" | "?", _) => SessionInput::Help,
            ("quit" | "q" | "exit", _) => SessionInput::Quit,
            _ => SessionInput::Unknown(line.to_string()),
        }
    }
}

const SESSION_HELP: &str = "\
Type a query and press Enter to search.
  :cite N    show citation formats for result N
  :copy N    copy citation row N of the open dialog
  :close     close the citation dialog
  :outside   click outside the dialog (closes it)
  :help      show this help
  :quit      leave";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_path) = load_settings(cli.config.as_deref())?;
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }

    init_tracing(cli.verbose, cli.quiet, &config.logging);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let theme = config
        .ui
        .color
        .map(|color| Theme { color })
        .unwrap_or_default();

    match cli.command {
        None => run_popup(&config, &EnvPage, theme, cli.quiet).await,

        Some(Commands::Popup { page_title }) => match page_title {
            Some(title) => run_popup(&config, &StaticPage::new(title), theme, cli.quiet).await,
            None => run_popup(&config, &EnvPage, theme, cli.quiet).await,
        },

        Some(Commands::Search { query }) => {
            let mut popup = Popup::new(config.fetcher()?);
            {
                let _spinner = spinner(cli.quiet, &format!("Searching Scholar for {:?}", query));
                if !popup.submit(&query).await {
                    bail!("Search query is empty");
                }
            }

            if let ResultsPane::Failed { .. } = popup.pane() {
                draw_pane(&mut std::io::stderr(), popup.pane(), &theme, ui::terminal_width())?;
                std::process::exit(1);
            }

            output_results(popup.results(), popup.fetcher().endpoints(), cli.output, theme)
        }

        Some(Commands::Cite { cid }) => {
            let fetcher = config.fetcher()?;
            let url = fetcher.endpoints().citation_url(&cid);
            let html = {
                let _spinner = spinner(cli.quiet, "Fetching citation formats");
                fetcher.fetch(FetchKind::Citation, &url).await?
            };

            let data = parse_citation_html(&html);
            output_citation(&data, fetcher.endpoints(), cli.output, theme)
        }

        Some(Commands::Parse { page }) => {
            let endpoints = config.endpoints();
            match page {
                ParseCommand::Results { file } => {
                    let html = read_html(&file)?;
                    let results = parse_search_results_with_base(&html, &endpoints.base_url);
                    output_results(&results, &endpoints, cli.output, theme)
                }
                ParseCommand::Citation { file } => {
                    let html = read_html(&file)?;
                    output_citation(&parse_citation_html(&html), &endpoints, cli.output, theme)
                }
            }
        }

        Some(Commands::Config { action }) => match action {
            ConfigCommand::Init { path, force } => {
                let path = match path {
                    Some(path) => path,
                    None => default_config_path().context("Could not determine config directory")?,
                };
                if path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }

                Config::default().save(&path)?;
                if !cli.quiet {
                    eprintln!(
                        "{}",
                        status_line(
                            Status::Success,
                            &format!("Wrote {}", path.display()),
                            theme.color
                        )
                    );
                }
                Ok(())
            }
            ConfigCommand::Show => {
                if let Some(path) = &config_path {
                    eprintln!("# {}", path.display());
                }
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
        },
    }
}

/// Explicit path, else the first config file found, else defaults and environment
fn load_settings(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let path = explicit.map(Path::to_path_buf).or_else(find_config_file);
    match path {
        Some(path) => {
            let config = load_config(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            Ok((config, Some(path)))
        }
        None => Ok((load_from_env()?, None)),
    }
}

fn init_tracing(verbose: u8, quiet: bool, logging: &LoggingConfig) {
    let log_level = match verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let level = if quiet { "error" } else { log_level };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scholar_lens={}", level)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn spinner(quiet: bool, msg: &str) -> Spinner {
    if quiet || !std::io::stderr().is_terminal() {
        Spinner::hidden()
    } else {
        Spinner::new(msg)
    }
}

fn read_html(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

async fn run_popup(
    config: &Config,
    page: &dyn PageContext,
    theme: Theme,
    quiet: bool,
) -> Result<()> {
    let mut popup = Popup::new(config.fetcher()?).with_copy_feedback(config.copy_feedback());
    let clipboard = Osc52Clipboard;

    if !quiet {
        println!("{}", status_line(Status::Info, "Scholar Lens (:help for commands)", theme.color));
    }

    {
        let _spinner = spinner(quiet, "Searching...");
        popup.activate(page).await;
    }
    if !popup.input().is_empty() {
        println!("{}", status_line(Status::Search, popup.input(), theme.color));
    }
    draw_results(&popup, theme)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("scholar> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match SessionInput::parse(&line) {
            SessionInput::Quit => break,
            SessionInput::Help => println!("{}", SESSION_HELP),
            SessionInput::Query(query) => {
                let searched = {
                    let _spinner = spinner(quiet, "Searching...");
                    popup.submit(&query).await
                };
                if searched {
                    draw_results(&popup, theme)?;
                }
            }
            SessionInput::Cite(n) => {
                let opened = {
                    let _spinner = spinner(quiet, "Fetching citation formats");
                    popup.cite(n - 1).await
                };
                if opened {
                    draw_open_dialog(&popup, theme)?;
                } else {
                    eprintln!(
                        "{}",
                        status_line(
                            Status::Warning,
                            &format!("No citation formats for result {}", n),
                            theme.color
                        )
                    );
                }
            }
            SessionInput::Copy(n) => match popup.copy_citation(n - 1, &clipboard, Instant::now()) {
                Ok(()) => {
                    if let Some(dialog) = popup.dialog().current() {
                        println!(
                            "{}",
                            status_line(Status::Success, &copied_status(dialog, n - 1), theme.color)
                        );
                    }
                }
                Err(e) => eprintln!("{}", status_line(Status::Error, &e.to_string(), theme.color)),
            },
            SessionInput::Close => {
                if popup.close_dialog(DialogEvent::CloseButton) {
                    draw_results(&popup, theme)?;
                }
            }
            SessionInput::Outside => {
                if popup.close_dialog(DialogEvent::ClickOutside) {
                    draw_results(&popup, theme)?;
                }
            }
            SessionInput::Unknown(input) => eprintln!(
                "{}",
                status_line(
                    Status::Warning,
                    &format!("Unknown command {:?} (:help for commands)", input),
                    theme.color
                )
            ),
        }
    }

    Ok(())
}

/// One-off confirmation for a copied row.
///
/// Printed as its own line so scrollback keeps the citation text in the
/// dialog rather than the transient "Copied!" feedback.
fn copied_status(dialog: &CitationDialog, row: usize) -> String {
    match dialog.rows.get(row) {
        Some(r) => format!("{} ({} citation)", COPIED_TEXT, r.style),
        None => COPIED_TEXT.to_string(),
    }
}

fn draw_results(popup: &Popup, theme: Theme) -> Result<()> {
    let mut out = std::io::stdout().lock();
    draw_pane(&mut out, popup.pane(), &theme, ui::terminal_width())?;
    Ok(())
}

fn draw_open_dialog(popup: &Popup, theme: Theme) -> Result<()> {
    if let Some(dialog) = popup.dialog().current() {
        let mut out = std::io::stdout().lock();
        draw_dialog(&mut out, dialog, &theme, ui::terminal_width(), Instant::now())?;
    }
    Ok(())
}

fn output_results(
    results: &[SearchResult],
    endpoints: &Endpoints,
    format: OutputFormat,
    theme: Theme,
) -> Result<()> {
    let views: Vec<ResultView> = results
        .iter()
        .map(|r| ResultView::from_result(r, endpoints))
        .collect();

    match format.resolve() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Plain => {
            let pane = if views.is_empty() {
                ResultsPane::Empty
            } else {
                ResultsPane::Results(views)
            };
            draw_pane(
                &mut std::io::stdout().lock(),
                &pane,
                &Theme::plain(),
                ui::terminal_width(),
            )?;
        }
        OutputFormat::Table => {
            if views.is_empty() {
                println!("{}", EMPTY_TEXT);
                return Ok(());
            }

            use comfy_table::{Attribute, Cell, ContentArrangement, Table};
            let mut table = Table::new();
            table
                .load_preset(comfy_table::presets::UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            if !theme.color {
                table.force_no_tty();
            }
            table.set_header(vec!["#", "Title", "Authors", "Links"]);

            for (i, view) in views.iter().enumerate() {
                let title = view.title.as_deref().unwrap_or("(untitled)");
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(truncate_with_ellipsis(title, 60)).add_attribute(Attribute::Bold),
                    Cell::new(truncate_with_ellipsis(
                        view.authors.as_deref().unwrap_or_default(),
                        40,
                    )),
                    Cell::new(view.link_row().unwrap_or_default()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Auto => unreachable!(),
    }
    Ok(())
}

fn output_citation(
    data: &CitationData,
    endpoints: &Endpoints,
    format: OutputFormat,
    theme: Theme,
) -> Result<()> {
    let dialog = CitationDialog::from_data(data, endpoints);

    match format.resolve() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Plain => {
            for row in &dialog.rows {
                println!("{}: {}", row.style, row.text);
            }
            for export in &dialog.exports {
                println!("{}: {}", export.format, export.url);
            }
        }
        OutputFormat::Table => {
            draw_dialog(
                &mut std::io::stdout().lock(),
                &dialog,
                &theme,
                ui::terminal_width(),
                Instant::now(),
            )?;
        }
        OutputFormat::Auto => unreachable!(),
    }
    Ok(())
}
