use anyhow::{Context, Result};
use form_core::SaveSink;
use shared::protocol::FormSnapshot;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<FormSnapshot>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read '{}'", self.path.display()))
            }
        };

        let snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse saved form '{}'", self.path.display()))?;
        Ok(Some(snapshot))
    }

    fn write(&self, snapshot: &FormSnapshot) -> Result<()> {
        ensure_parent_dir_exists(&self.path)?;

        let json = snapshot
            .to_pretty_json()
            .context("failed to serialize form snapshot")?;
        let staging = staging_path(&self.path);
        fs::write(&staging, json)
            .with_context(|| format!("failed to write '{}'", staging.display()))?;
        fs::rename(&staging, &self.path).with_context(|| {
            format!(
                "failed to move '{}' into place at '{}'",
                staging.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

impl SaveSink for JsonFileSink {
    fn persist(&mut self, snapshot: &FormSnapshot) -> Result<()> {
        self.write(snapshot)?;
        tracing::debug!(path = %self.path.display(), "wrote form snapshot");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SaveSink for LogSink {
    fn persist(&mut self, snapshot: &FormSnapshot) -> Result<()> {
        let json = snapshot
            .to_pretty_json()
            .context("failed to serialize form snapshot")?;
        tracing::info!(payload = %json, "theory of change save");
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent_dir_exists(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for '{}'",
            parent.display(),
            path.display()
        )
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
