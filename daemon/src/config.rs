use log::warn;

use mc3e::ConnectionConfig;

/// The gateway's own HTTP listener settings, independent of the PLC's own
/// host/port/timeout/transport (those live in `mc3e::ConnectionConfig`,
/// resolved separately via `ConnectionConfig::from_env`).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig { listen_port: 8000 }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let mut config = GatewayConfig::default();
        if let Ok(raw) = std::env::var("GATEWAY_PORT") {
            match raw.parse() {
                Ok(port) => config.listen_port = port,
                Err(_) => warn!("invalid GATEWAY_PORT '{raw}', keeping default {}", config.listen_port),
            }
        }
        config
    }
}

/// Resolves the PLC connection defaults the gateway dials by default; a
/// per-request `plc_host`/`port` override (§11) takes precedence over this.
pub fn default_plc_config() -> ConnectionConfig {
    ConnectionConfig::from_env()
}
