//! Extraction through an external `exiftool` process.

use crate::{MetadataProvider, ProviderError, TagSet};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::runtime::{Builder, Handle};
use tokio::time::timeout;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ExiftoolConfig {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl Default for ExiftoolConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("exiftool"),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExiftoolProvider {
    config: ExiftoolConfig,
}

impl ExiftoolProvider {
    pub fn new(config: ExiftoolConfig) -> Self {
        Self { config }
    }

    async fn run(&self, path: &Path) -> Result<String, ProviderError> {
        let mut child = Command::new(&self.config.program)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProviderError::Backend("exiftool stdout unavailable".into()))?;

        let result = timeout(self.config.timeout, async {
            let mut output = String::new();
            stdout.read_to_string(&mut output).await?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, output))
        })
        .await;

        match result {
            Ok(Ok((status, output))) => {
                if !status.success() {
                    return Err(ProviderError::Backend(format!("exiftool exited with {status}")));
                }
                Ok(output)
            }
            Ok(Err(e)) => {
                // kill() also reaps the child.
                let _ = child.kill().await;
                Err(ProviderError::Io(e))
            }
            Err(_) => {
                warn!(path = %path.display(), "exiftool timed out, killing it");
                let _ = child.kill().await;
                Err(ProviderError::Timeout(self.config.timeout))
            }
        }
    }
}

impl MetadataProvider for ExiftoolProvider {
    fn name(&self) -> &str {
        "exiftool"
    }

    /// Blocks on the child process; callers run on blocking workers, outside any async context.
    fn extract(&self, path: &Path) -> Result<TagSet, ProviderError> {
        let output = match Handle::try_current() {
            Ok(handle) => handle.block_on(self.run(path))?,
            Err(_) => Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(self.run(path))?,
        };

        let tags = parse_output(&output);
        if tags.is_empty() {
            return Err(ProviderError::NoMetadata);
        }
        Ok(tags)
    }
}

/// Parses exiftool's default `Tag Name    : value` listing.
pub fn parse_output(output: &str) -> TagSet {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
