use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use clap::ValueEnum;
use form_core::{FormOptions, RowsPerPage};

pub const DEFAULT_CONFIG_FILE: &str = "editor.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    File,
    Log,
}

impl SinkKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "file" => Some(SinkKind::File),
            "log" => Some(SinkKind::Log),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output_path: PathBuf,
    pub sink: SinkKind,
    pub rows_per_page: RowsPerPage,
    pub confirmation_ttl_ms: u64,
    pub log_filter: String,
    pub resume: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("./data/theory_of_change.json"),
            sink: SinkKind::File,
            rows_per_page: RowsPerPage::default(),
            confirmation_ttl_ms: 2000,
            log_filter: "info".into(),
            resume: true,
        }
    }
}

impl Settings {
    pub fn form_options(&self) -> FormOptions {
        FormOptions {
            rows_per_page: self.rows_per_page,
            confirmation_ttl: Duration::from_millis(self.confirmation_ttl_ms),
            ..FormOptions::default()
        }
    }
}

/// A missing default `editor.toml` is fine; an explicitly requested file must load.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if config_path.is_some() => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = toml::from_str(raw)?;
    for (key, value) in &table {
        let value = match value {
            toml::Value::String(text) => text.clone(),
            toml::Value::Integer(number) => number.to_string(),
            toml::Value::Boolean(flag) => flag.to_string(),
            _ => continue,
        };
        apply_value(settings, key, &value);
    }
    Ok(())
}

pub(crate) fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in [
        "output_path",
        "sink",
        "rows_per_page",
        "confirmation_ttl_ms",
        "log_filter",
        "resume",
    ] {
        let upper = key.to_ascii_uppercase();
        for var in [format!("TOC_{upper}"), format!("APP__{upper}")] {
            if let Some(value) = lookup(&var) {
                apply_value(settings, key, &value);
            }
        }
    }
}

/// Unknown keys and unparsable values keep the current setting.
fn apply_value(settings: &mut Settings, key: &str, value: &str) {
    match key {
        "output_path" => settings.output_path = PathBuf::from(value),
        "sink" => {
            if let Some(sink) = SinkKind::parse(value) {
                settings.sink = sink;
            }
        }
        "rows_per_page" => {
            if let Some(rows) = value.trim().parse().ok().and_then(RowsPerPage::from_count) {
                settings.rows_per_page = rows;
            }
        }
        "confirmation_ttl_ms" => {
            if let Ok(parsed) = value.trim().parse::<u64>() {
                settings.confirmation_ttl_ms = parsed;
            }
        }
        "log_filter" => settings.log_filter = value.to_string(),
        "resume" => {
            if let Ok(parsed) = value.trim().parse::<bool>() {
                settings.resume = parsed;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
