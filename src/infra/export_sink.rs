use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::app::ports::ExportSinkPort;

/// Writes CSV to a file, creating parent directories as needed.
pub struct FileExportSink {
    path: PathBuf,
}

impl FileExportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ExportSinkPort for FileExportSink {
    async fn write_csv(&self, csv: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        tokio::fs::write(&self.path, csv)
            .await
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

pub struct StdoutExportSink;

#[async_trait]
impl ExportSinkPort for StdoutExportSink {
    async fn write_csv(&self, csv: &str) -> anyhow::Result<()> {
        let mut out = tokio::io::stdout();
        out.write_all(csv.as_bytes()).await.context("writing stdout")?;
        out.flush().await.context("flushing stdout")?;
        Ok(())
    }

    fn describe(&self) -> String {
        "stdout".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sink_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/view.csv");
        FileExportSink::new(&path).write_csv("\"Rank\"\n\"1\"\n").await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "\"Rank\"\n\"1\"\n");
    }
}
