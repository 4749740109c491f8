//! Terminal rendering: styled lines and the request spinner.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::summary::DatasetSummary;
use crate::transcript::{Role, Transcript};

pub fn banner(api_url: &str) {
    println!("{}", style("Titanic Dataset Chat").bold().cyan());
    println!(
        "{}",
        style(format!("Ask about the passengers. Backend: {api_url}. Commands: /history /summary /quit")).dim()
    );
    println!();
}

pub fn print_summary(summary: &DatasetSummary) {
    println!("{}", style("Dataset Summary").bold());
    println!("  Rows:    {}", summary.rows);
    println!("  Columns: {}", summary.columns.len());
    println!("  Names:   {}", summary.columns.join(", "));
    println!();
    println!("{}", style("First rows").bold());
    for line in summary.preview_table().lines() {
        println!("  {line}");
    }
    println!();
}

pub fn print_answer(text: &str) {
    println!("{} {}", style("Assistant:").green().bold(), text);
}

pub fn print_plot_saved(path: &std::path::Path) {
    println!("{} {}", style("Chart saved to").dim(), style(path.display()).underlined());
}

pub fn print_error(message: &str) {
    eprintln!("{}", style(message).red());
}

pub fn print_warning(message: &str) {
    eprintln!("{}", style(message).yellow());
}

pub fn print_history(transcript: &Transcript) {
    if transcript.is_empty() {
        println!("{}", style("No messages yet.").dim());
        return;
    }
    for turn in transcript.turns() {
        let label = match turn.role {
            Role::User      => style(turn.role.label()).cyan().bold(),
            Role::Assistant => style(turn.role.label()).green().bold(),
        };
        println!("{label}: {}", turn.text);
        if let Some(path) = &turn.plot {
            println!("    {}", style(format!("[chart: {}]", path.display())).dim());
        }
    }
}

/// Steady-ticking spinner; call `finish_and_clear` when the request returns.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar
}
