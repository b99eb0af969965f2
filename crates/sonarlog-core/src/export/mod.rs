//! Renderers for decoded packets: packet CSV, Mono Profile CSV and the
//! plain-text message log. All of them keep the packet order they are given.

mod message_log;
mod table;

use thiserror::Error;

pub use message_log::write_message_log;
pub use table::{PACKET_COLUMNS, write_packets_csv, write_profiles_csv};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
