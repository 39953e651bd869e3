//! A subprocess-backed [`EmbeddingProvider`] (§4.G).
//!
//! The worker script is extracted once to `<cache_dir>/python/embed.py`
//! from an `include_str!`-embedded template, gated by a manifest file
//! recording the embedded script's version so repeated runs skip
//! re-extraction (§6, persisted state layout). Invocation uses
//! `tokio::process::Command` with piped stdio, awaited under a
//! `tokio::time::timeout`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::warn;

use ghss_domain::constants::PASSTHROUGH_TEXT_LEN;
use ghss_domain::error::{Error, Result};
use ghss_domain::ports::EmbeddingProvider;
use ghss_domain::value_objects::Embedding;

const EMBED_SCRIPT: &str = include_str!("scripts/embed.py");
const EMBED_SCRIPT_VERSION: &str = "1";

#[derive(Debug, Serialize)]
struct SubprocessRequest<'a> {
    op: &'a str,
    text: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubprocessResponse {
    embedding: Option<Vec<f32>>,
    summary: Option<String>,
    error: Option<String>,
}

/// Launches a Python worker process for embedding and summarization.
pub struct SubprocessEmbeddingProvider {
    runner: String,
    script_path: PathBuf,
    model: String,
    summary_model: String,
    dimensions: usize,
    timeout: Duration,
    first_use_timeout: Duration,
}

impl SubprocessEmbeddingProvider {
    /// `runner` is the package-manager-supplied process to invoke (`uvx`
    /// or `python3`); the worker script is extracted under `cache_dir`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cache_dir: &Path,
        runner: String,
        model: String,
        summary_model: String,
        dimensions: usize,
        timeout_secs: u64,
        first_use_timeout_secs: u64,
    ) -> Result<Self> {
        let cache_dir = PathBuf::from(shellexpand::tilde(&cache_dir.to_string_lossy()).to_string());
        let script_path = ensure_script_extracted(&cache_dir)?;
        Ok(Self {
            runner,
            script_path,
            model,
            summary_model,
            dimensions,
            timeout: Duration::from_secs(timeout_secs),
            first_use_timeout: Duration::from_secs(first_use_timeout_secs),
        })
    }

    fn ready_marker(&self) -> PathBuf {
        self.script_path
            .parent()
            .map(|dir| dir.join(".model-ready"))
            .unwrap_or_else(|| PathBuf::from(".model-ready"))
    }

    fn call_timeout(&self) -> Duration {
        if self.ready_marker().exists() {
            self.timeout
        } else {
            self.first_use_timeout
        }
    }

    fn mark_ready(&self) {
        if let Err(err) = std::fs::write(self.ready_marker(), b"ready") {
            warn!(%err, "failed to persist embedding model ready marker");
        }
    }

    async fn invoke(&self, op: &str, text: &str, model: &str) -> Result<SubprocessResponse> {
        let request = SubprocessRequest { op, text, model };
        let payload = serde_json::to_vec(&request)?;

        let mut child = Command::new(&self.runner)
            .arg(&self.script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| Error::subprocess(format!("failed to launch {}: {err}", self.runner)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::subprocess("embedding subprocess has no stdin"))?;
        stdin
            .write_all(&payload)
            .await
            .map_err(|err| Error::subprocess(format!("failed to write subprocess stdin: {err}")))?;
        drop(stdin);

        let timeout = self.call_timeout();
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::subprocess(format!("embedding subprocess timed out after {timeout:?}")))?
            .map_err(|err| Error::subprocess(format!("failed to wait for subprocess: {err}")))?;

        if !output.status.success() {
            return Err(Error::subprocess(format!(
                "embedding subprocess exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let response: SubprocessResponse = serde_json::from_slice(&output.stdout)
            .map_err(|err| Error::subprocess(format!("malformed subprocess response: {err}")))?;
        if let Some(message) = &response.error {
            return Err(Error::subprocess(message.clone()));
        }
        self.mark_ready();
        Ok(response)
    }
}

#[async_trait]
impl EmbeddingProvider for SubprocessEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let response = self.invoke("embed", text, &self.model).await?;
        let vector = response
            .embedding
            .ok_or_else(|| Error::subprocess("subprocess response missing embedding"))?;
        Embedding::from_raw(vector)
            .ok_or_else(|| Error::subprocess("subprocess returned an empty or zero vector"))
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().len() < PASSTHROUGH_TEXT_LEN {
            return Ok(text.to_string());
        }
        let response = self.invoke("summarize", text, &self.summary_model).await?;
        response
            .summary
            .ok_or_else(|| Error::subprocess("subprocess response missing summary"))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn ensure_script_extracted(cache_dir: &Path) -> Result<PathBuf> {
    let python_dir = cache_dir.join("python");
    std::fs::create_dir_all(&python_dir).map_err(Error::Io)?;
    let script_path = python_dir.join("embed.py");
    let manifest_path = python_dir.join(".embed_py.manifest");

    let up_to_date = std::fs::read_to_string(&manifest_path)
        .map(|existing| existing.trim() == EMBED_SCRIPT_VERSION)
        .unwrap_or(false);
    if !up_to_date {
        std::fs::write(&script_path, EMBED_SCRIPT).map_err(Error::Io)?;
        std::fs::write(&manifest_path, EMBED_SCRIPT_VERSION).map_err(Error::Io)?;
    }
    Ok(script_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_is_gated_by_manifest_version() {
        let dir = tempfile::tempdir().unwrap();
        let first = ensure_script_extracted(dir.path()).unwrap();
        let contents_after_first = std::fs::read_to_string(&first).unwrap();

        // Tamper with the extracted script, then re-run extraction; since
        // the manifest still matches the current version, it must not be
        // rewritten.
        std::fs::write(&first, "tampered").unwrap();
        ensure_script_extracted(dir.path()).unwrap();
        let contents_after_second = std::fs::read_to_string(&first).unwrap();
        assert_eq!(contents_after_second, "tampered");
        assert_ne!(contents_after_first, "tampered");
    }

    #[tokio::test]
    async fn summarize_passes_through_short_text_without_a_subprocess() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SubprocessEmbeddingProvider::new(
            dir.path(),
            "this-binary-does-not-exist".to_string(),
            "all-MiniLM-L6-v2".to_string(),
            "summary-model".to_string(),
            384,
            30,
            120,
        )
        .unwrap();
        let summary = provider.summarize("short text").await.unwrap();
        assert_eq!(summary, "short text");
    }
}
