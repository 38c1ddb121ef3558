use async_trait::async_trait;
use serde_json::Value;

/// Where a raw payload comes from (a file, stdin, an inline string).
#[async_trait]
pub trait PayloadSourcePort: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<Value>;

    /// Short human-readable origin, used in logs.
    fn describe(&self) -> String;
}

/// Where an exported CSV document goes.
#[async_trait]
pub trait ExportSinkPort: Send + Sync {
    async fn write_csv(&self, csv: &str) -> anyhow::Result<()>;

    fn describe(&self) -> String;
}
