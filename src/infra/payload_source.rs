use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use crate::app::ports::PayloadSourcePort;

/// Reads a JSON payload from disk.
pub struct FilePayloadSource {
    path: PathBuf,
}

impl FilePayloadSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PayloadSourcePort for FilePayloadSource {
    async fn fetch(&self) -> anyhow::Result<Value> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let payload = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing {} as JSON", self.path.display()))?;
        Ok(payload)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Reads the whole of stdin as one JSON document.
pub struct StdinPayloadSource;

#[async_trait]
impl PayloadSourcePort for StdinPayloadSource {
    async fn fetch(&self) -> anyhow::Result<Value> {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("reading stdin")?;
        Ok(serde_json::from_str(&text).context("parsing stdin as JSON")?)
    }

    fn describe(&self) -> String {
        "stdin".to_string()
    }
}

/// A payload held in memory, e.g. embedded fixtures.
pub struct InlinePayloadSource {
    text: String,
}

impl InlinePayloadSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl PayloadSourcePort for InlinePayloadSource {
    async fn fetch(&self) -> anyhow::Result<Value> {
        Ok(serde_json::from_str(&self.text).context("parsing inline payload as JSON")?)
    }

    fn describe(&self) -> String {
        format!("inline({} bytes)", self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_file_source_reads_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"episodes": [{{"rank": 1, "title": "Blink"}}]}}"#).unwrap();

        let source = FilePayloadSource::new(file.path());
        let payload = source.fetch().await.unwrap();
        assert_eq!(payload["episodes"][0]["title"], "Blink");
        assert!(source.describe().starts_with("file:"));
    }

    #[tokio::test]
    async fn test_file_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FilePayloadSource::new(dir.path().join("nope.json"));
        assert!(missing.fetch().await.is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2").unwrap();
        let err = FilePayloadSource::new(file.path()).fetch().await.err().unwrap();
        assert!(format!("{:#}", err).contains("as JSON"));
    }

    #[tokio::test]
    async fn test_inline_source() {
        let payload = InlinePayloadSource::new("[{\"rank\": 3}]").fetch().await.unwrap();
        assert_eq!(payload[0]["rank"], 3);
        assert!(InlinePayloadSource::new("{").fetch().await.is_err());
    }
}
