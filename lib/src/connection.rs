//! `ConnectionConfig`: a plain value type with defaults resolved from
//! environment variables at construction, overridden by explicit field
//! assignment — no long-lived PLC session, no keyword-arg API.

use std::time::Duration;

use crate::device_code::PlcSeries;
use crate::error::McError;
use crate::frame::FrameHeader;
use crate::transport::Transport;
use crate::value_codec::CommMode;

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub transport: Transport,
    pub comm_mode: CommMode,
    pub series: PlcSeries,
    pub header: FrameHeader,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 5511,
            timeout: Duration::from_secs_f64(3.0),
            transport: Transport::Tcp,
            comm_mode: CommMode::Binary,
            series: PlcSeries::IqR,
            header: FrameHeader::default(),
        }
    }
}

impl ConnectionConfig {
    /// Resolves `PLC_IP`, `PLC_PORT`, `PLC_TIMEOUT_SEC`, `PLC_TRANSPORT`
    /// (§6), falling back to the built-in default and logging a warning on
    /// a malformed value rather than failing construction.
    pub fn from_env() -> Self {
        let mut config = ConnectionConfig::default();

        if let Ok(ip) = std::env::var("PLC_IP") {
            config.host = ip;
        }
        if let Ok(raw) = std::env::var("PLC_PORT") {
            match raw.parse() {
                Ok(port) => config.port = port,
                Err(_) => log::warn!("invalid PLC_PORT '{raw}', keeping default {}", config.port),
            }
        }
        if let Ok(raw) = std::env::var("PLC_TIMEOUT_SEC") {
            match raw.parse::<f64>() {
                Ok(secs) => config.timeout = Duration::from_secs_f64(secs),
                Err(_) => log::warn!("invalid PLC_TIMEOUT_SEC '{raw}', keeping default"),
            }
        }
        if let Ok(raw) = std::env::var("PLC_TRANSPORT") {
            match Transport::parse(&raw) {
                Ok(transport) => config.transport = transport,
                Err(_) => log::warn!("invalid PLC_TRANSPORT '{raw}', keeping default"),
            }
        }

        config
    }

    /// Sets the communication mode, validating at construction time only
    /// (§7 — `CommTypeError` is never observed at runtime once built).
    pub fn set_comm_mode(&mut self, commtype: &str) -> Result<(), McError> {
        self.comm_mode = match commtype {
            "binary" => CommMode::Binary,
            "ascii" => CommMode::Ascii,
            _ => return Err(McError::CommTypeError),
        };
        Ok(())
    }

    /// Sets the PLC series, validating at construction time only.
    pub fn set_series(&mut self, plctype: &str) -> Result<(), McError> {
        self.series = PlcSeries::parse(plctype)?;
        Ok(())
    }

    /// Sets the monitoring timer from a whole-second value, converting to
    /// the wire's 250ms units (§3, GLOSSARY).
    pub fn set_timer_sec(&mut self, timer_sec: u16) {
        self.header.timer = timer_sec.saturating_mul(4);
    }
}
