//! Titanic chat terminal client
//!
//! Run with: cargo run -p titanic-chat

use std::path::PathBuf;

use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Input};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use titanic_chat::{attached_chart, backend, ui, ApiClient, DatasetSummary, PlotSaver, Transcript};
use titanic_config::{load_dotenv, Config};

#[derive(Debug, Parser)]
#[command(name = "titanic-chat", about = "Ask questions about the Titanic passengers")]
struct Cli {
    /// API base URL (overrides client.api_url)
    #[arg(long)]
    api_url: Option<String>,

    /// Directory for saved charts (overrides client.plot_dir)
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Never start the API server from the client
    #[arg(long)]
    no_autostart: bool,

    /// Ask one question, print the answer and exit
    #[arg(short, long)]
    question: Option<String>,
}

enum Command {
    Quit,
    History,
    Summary,
    Ask(String),
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "/quit" | "/exit" => Command::Quit,
        "/history" => Command::History,
        "/summary" => Command::Summary,
        other if other.starts_with('/') => Command::Unknown(other.to_string()),
        other => Command::Ask(other.to_string()),
    }
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        ui::print_error(&format!("titanic-chat error: {error:#}"));
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.client.api_url = url;
    }
    if let Some(dir) = cli.plot_dir {
        config.client.plot_dir = dir;
    }
    if cli.no_autostart {
        config.client.autostart_backend = false;
    }

    // Keep the handle alive: a backend started here stops when the client exits.
    let _backend = backend::ensure_backend(&config.client).await?;
    let client = ApiClient::new(&config.client.api_url, config.client.timeout_secs)?;
    let mut plots = PlotSaver::new(&config.client.plot_dir);
    let mut transcript = Transcript::new();

    if let Some(question) = cli.question {
        ask_and_print(&client, &mut plots, &mut transcript, &question).await;
        return Ok(());
    }

    ui::banner(client.base_url());
    show_summary(&config).await;

    loop {
        let line = match tokio::task::spawn_blocking(read_question).await? {
            Ok(line) => line,
            Err(e) => {
                debug!(error = %e, "Input closed");
                break;
            }
        };
        match parse_command(&line) {
            Command::Quit => break,
            Command::History => ui::print_history(&transcript),
            Command::Summary => show_summary(&config).await,
            Command::Unknown(cmd) => ui::print_warning(&format!("Unknown command {cmd}. Try /history, /summary or /quit.")),
            Command::Ask(question) => ask_and_print(&client, &mut plots, &mut transcript, &question).await,
        }
    }
    Ok(())
}

fn read_question() -> dialoguer::Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Ask a question about the Titanic dataset")
        .interact_text()
}

async fn show_summary(config: &Config) {
    match DatasetSummary::load(&config.dataset.path).await {
        Ok(summary) => ui::print_summary(&summary),
        Err(e) => ui::print_error(&format!("Error loading dataset: {e}")),
    }
}

async fn ask_and_print(client: &ApiClient, plots: &mut PlotSaver, transcript: &mut Transcript, question: &str) {
    transcript.push_user(question);

    let spinner = ui::spinner("Thinking...");
    let result = client.ask(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(resp) => {
            ui::print_answer(&resp.text_answer);
            let plot = attached_chart(&resp).and_then(|b64| match plots.save_base64(b64) {
                Ok(path) => {
                    ui::print_plot_saved(&path);
                    Some(path)
                }
                Err(e) => {
                    warn!(error = %e, "Chart could not be saved");
                    ui::print_warning(&format!("Chart could not be saved: {e:#}"));
                    None
                }
            });
            transcript.push_assistant(resp.text_answer, plot);
        }
        Err(e) if e.is_unreachable() => {
            let message = format!("Cannot reach the backend. Is the API server running at {}?", client.base_url());
            ui::print_error(&message);
            transcript.push_assistant(message, None);
        }
        Err(e) => {
            let message = format!("Error: {e}");
            ui::print_error(&message);
            transcript.push_assistant(message, None);
        }
    }
}
