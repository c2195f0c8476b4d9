use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::Parser;
use form_core::{FormAggregator, FormSeed, RowsPerPage, SaveOutcome, SaveSink};
use storage::{JsonFileSink, LogSink};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{interval, MissedTickBehavior},
};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod view;

use commands::EditorCommand;
use config::{load_settings, Settings, SinkKind};

#[derive(Parser, Debug)]
#[command(about = "Edit a theory-of-change form from the terminal")]
struct Cli {
    /// TOML settings file (defaults to ./editor.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum)]
    sink: Option<SinkKind>,
    #[arg(long, value_parser = parse_rows_per_page)]
    rows_per_page: Option<RowsPerPage>,
    #[arg(long)]
    log_filter: Option<String>,
    /// Start from the built-in form instead of the saved file.
    #[arg(long)]
    no_resume: bool,
}

fn parse_rows_per_page(raw: &str) -> Result<RowsPerPage, String> {
    raw.parse()
        .ok()
        .and_then(RowsPerPage::from_count)
        .ok_or_else(|| format!("'{raw}' is not one of 5, 10, 20"))
}

impl Cli {
    fn apply(self, settings: &mut Settings) {
        if let Some(output) = self.output {
            settings.output_path = output;
        }
        if let Some(sink) = self.sink {
            settings.sink = sink;
        }
        if let Some(rows) = self.rows_per_page {
            settings.rows_per_page = rows;
        }
        if let Some(filter) = self.log_filter {
            settings.log_filter = filter;
        }
        if self.no_resume {
            settings.resume = false;
        }
    }
}

fn build_form(settings: &Settings) -> Result<FormAggregator> {
    let (sink, seed): (Box<dyn SaveSink>, FormSeed) = match settings.sink {
        SinkKind::File => {
            let sink = JsonFileSink::new(&settings.output_path);
            let seed = if settings.resume {
                sink.load()?.map(FormSeed::from_snapshot)
            } else {
                None
            };
            if seed.is_some() {
                tracing::info!(path = %settings.output_path.display(), "resuming saved form");
            }
            (Box::new(sink), seed.unwrap_or_default())
        }
        SinkKind::Log => (Box::new(LogSink), FormSeed::default()),
    };
    Ok(FormAggregator::new(seed, settings.form_options(), sink))
}

fn save(form: &mut FormAggregator) {
    match form.save() {
        Ok(SaveOutcome::Saved) => {
            let now = Instant::now();
            println!("{}", form.confirmation_message(now).unwrap_or("Saved!"));
        }
        Ok(SaveOutcome::Skipped) => println!("Nothing to save."),
        Err(err) => println!("Save failed: {}", err.failure().message),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    cli.apply(&mut settings);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut form = build_form(&settings)?;
    tracing::info!(sink = ?settings.sink, path = %settings.output_path.display(), "editor ready");
    print!("{}", view::render(&form, Instant::now()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(Duration::from_millis(100));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match commands::parse(&line) {
                    Ok(EditorCommand::Form(command)) => {
                        // View-only commands (paging, typing, toggles) change nothing saved.
                        if !form.apply(command) {
                            tracing::debug!("command left the saved content unchanged");
                        }
                        print!("{}", view::render(&form, Instant::now()));
                    }
                    Ok(EditorCommand::Save) => save(&mut form),
                    Ok(EditorCommand::Show) => {
                        print!("{}", view::render(&form, Instant::now()));
                    }
                    Ok(EditorCommand::Json) => println!("{}", form.snapshot().to_pretty_json()?),
                    Ok(EditorCommand::Help) => println!("{}", commands::HELP),
                    Ok(EditorCommand::Quit) => break,
                    Err(err) => println!("{err}"),
                }
            }
            _ = ticker.tick() => {
                if form.tick(Instant::now()) {
                    println!("{}", view::status_line(&form, Instant::now()));
                }
            }
        }
    }

    if form.is_dirty() {
        tracing::warn!("exiting with unsaved changes");
    }
    Ok(())
}
