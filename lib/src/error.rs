use thiserror::Error;

/// Every failure mode a public `mc3e` call can produce.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum McError {
    #[error("Invalid device specification: {0}")]
    ParseError(String),

    #[error("Device '{kind}' is not supported on {series} series PLC")]
    DeviceCodeError { series: String, kind: String },

    #[error("PLC connection error: {0}")]
    ConnectError(String),

    #[error("MC protocol error: {0}")]
    ProtocolError(String),

    #[error("Communication type must be \"binary\" or \"ascii\"")]
    CommTypeError,

    #[error("PLC type must be \"Q\", \"L\", \"QnA\", \"iQ-L\", or \"iQ-R\"")]
    PLCTypeError,
}

/// Textual mapping for the end-codes a PLC commonly returns; see §4.4.
fn status_meaning(status: u16) -> Option<&'static str> {
    match status {
        0xC050 => Some("internal PLC error"),
        0xC051 => Some("not in RUN mode"),
        0xC052 => Some("device-count out of range"),
        0xC053 => Some("device out of range"),
        0xC054 => Some("device write-disabled"),
        0xC055 => Some("program executing"),
        0xC056 => Some("command malformed"),
        0xC058 => Some("parameter error"),
        0xC059 => Some("command unsupported by module"),
        0xC05C => Some("request-data error"),
        0xC05F => Some("request-content error"),
        0xC060 => Some("request-length error"),
        0xC061 => Some("monitor-registration overflow"),
        0xC0B5 => Some("CPU error"),
        _ => None,
    }
}

impl McError {
    /// Builds a `ProtocolError` from a non-zero response end-code,
    /// attaching the known textual meaning when recognized.
    pub fn from_status(status: u16) -> McError {
        match status_meaning(status) {
            Some(meaning) => McError::ProtocolError(format!("0x{status:04X} ({meaning})")),
            None => McError::ProtocolError(format!("0x{status:04X}")),
        }
    }

    /// True for protocol status codes the word-group batch dispatcher
    /// should retry as individual `batchread_word` calls.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, McError::ProtocolError(_))
    }
}
