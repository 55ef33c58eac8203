use crate::header::{ContainerKind, Operation};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation tag carried by every log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogTag {
    #[serde(rename = "COMPRESS")]
    Compress,
    #[serde(rename = "ENCRYPT")]
    Encrypt,
    #[serde(rename = "COMPRESS+ENCRYPT")]
    CompressEncrypt,
    #[serde(rename = "DECOMPRESS")]
    Decompress,
    #[serde(rename = "DECRYPT")]
    Decrypt,
    #[serde(rename = "DECRYPT+DECOMPRESS")]
    DecryptDecompress,
    #[serde(rename = "SKIP")]
    Skip,
    #[serde(rename = "ERROR_PROCESS")]
    ErrorProcess,
    #[serde(rename = "ERROR_RECOVER")]
    ErrorRecover,
}

impl LogTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compress => "COMPRESS",
            Self::Encrypt => "ENCRYPT",
            Self::CompressEncrypt => "COMPRESS+ENCRYPT",
            Self::Decompress => "DECOMPRESS",
            Self::Decrypt => "DECRYPT",
            Self::DecryptDecompress => "DECRYPT+DECOMPRESS",
            Self::Skip => "SKIP",
            Self::ErrorProcess => "ERROR_PROCESS",
            Self::ErrorRecover => "ERROR_RECOVER",
        }
    }

    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::Compress => Self::Compress,
            Operation::Encrypt => Self::Encrypt,
            Operation::Both => Self::CompressEncrypt,
        }
    }

    /// Tag for recovering a container of `kind`
    pub fn for_recovery(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Compressed => Self::Decompress,
            ContainerKind::Encrypted => Self::Decrypt,
            ContainerKind::CompressedEncrypted => Self::DecryptDecompress,
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Self::ErrorProcess | Self::ErrorRecover)
    }
}

impl fmt::Display for LogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One structured log record, emitted once per file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub operation: LogTag,
    pub source_name: String,
    pub destination_name: String,
    pub duration_seconds: f64,
    /// Percentage with two decimals, or "-" when not applicable
    pub compression_rate: String,
    pub success: bool,
}

impl LogEntry {
    pub fn new(
        operation: LogTag,
        source_name: impl Into<String>,
        destination_name: impl Into<String>,
        duration_seconds: f64,
        compression_rate: impl Into<String>,
        success: bool,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            operation,
            source_name: source_name.into(),
            destination_name: destination_name.into(),
            duration_seconds,
            compression_rate: compression_rate.into(),
            success,
        }
    }

    /// Entry for a file that produced no output
    pub fn unsuccessful(operation: LogTag, source_name: impl Into<String>) -> Self {
        Self::new(operation, source_name, "", 0.0, NOT_APPLICABLE, false)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:<18}  {} -> {}  {:.3}s  rate {}  {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            self.source_name,
            if self.destination_name.is_empty() {
                "-"
            } else {
                self.destination_name.as_str()
            },
            self.duration_seconds,
            self.compression_rate,
            if self.success { "OK" } else { "FAILED" }
        )
    }
}

/// Placeholder for a rate that does not apply
pub const NOT_APPLICABLE: &str = "-";

/// `100 * (1 - packed / unpacked)` with two decimals
/// "-" when the unpacked size is zero.
pub fn compression_rate(unpacked: u64, packed: u64) -> String {
    if unpacked == 0 {
        return NOT_APPLICABLE.to_string();
    }
    format!("{:.2}", 100.0 * (1.0 - packed as f64 / unpacked as f64))
}
