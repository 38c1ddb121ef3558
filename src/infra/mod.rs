pub mod export_sink;
pub mod payload_source;

pub use export_sink::{FileExportSink, StdoutExportSink};
pub use payload_source::{FilePayloadSource, InlinePayloadSource, StdinPayloadSource};
