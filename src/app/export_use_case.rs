use anyhow::Result;
use tracing::info;

use crate::app::ports::ExportSinkPort;
use crate::observability::metrics;
use crate::pipeline::session::Session;

/// Use case for writing the session's current view to a sink
pub struct ExportViewUseCase {
    sink: Box<dyn ExportSinkPort>,
}

impl ExportViewUseCase {
    pub fn new(sink: Box<dyn ExportSinkPort>) -> Self {
        Self { sink }
    }

    /// Returns the number of data rows written (header excluded)
    pub async fn execute(&self, session: &Session) -> Result<usize> {
        let (rows, csv) = session.export();
        self.sink.write_csv(&csv).await?;
        metrics::export::file_written();
        info!("exported {} rows to {}", rows, self.sink.describe());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::DefaultNormalizer;
    use crate::pipeline::processing::validate::Validator;
    use crate::schema::Schema;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct MockSink {
        written: Arc<tokio::sync::Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ExportSinkPort for MockSink {
        async fn write_csv(&self, csv: &str) -> Result<()> {
            self.written.lock().await.push(csv.to_string());
            Ok(())
        }

        fn describe(&self) -> String {
            "mock".to_string()
        }
    }

    #[tokio::test]
    async fn test_export_view_use_case() {
        let mut session = Session::load(
            DefaultNormalizer::new(Schema::episodes()),
            Validator::with_current_year(2024),
            &json!([
                {"rank": 1, "title": "Blink"},
                {"rank": 2, "title": "Midnight"},
                {"rank": 3, "title": "Blink\nagain, twice"}
            ]),
        )
        .unwrap();
        session.set_query("blink");

        let written = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let use_case = ExportViewUseCase::new(Box::new(MockSink { written: written.clone() }));
        let rows = use_case.execute(&session).await.unwrap();

        assert_eq!(rows, 2);
        let docs = written.lock().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0], session.export_csv());
        assert_eq!(crate::pipeline::export::csv::parse_rows(&docs[0]).len(), rows + 1);
    }
}
