use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use log::{error, info};
use tokio::net::TcpListener;

use mc3e_gateway::config::GatewayConfig;
use mc3e_gateway::server::{
    ServerState, batch_read, batch_read_status, openapi, read_device, read_device_path,
};

type AppRouter = Router<Arc<ServerState>>;

fn get_router() -> AppRouter {
    Router::new()
        .route("/api/read", post(read_device))
        .route("/api/read/{device}/{addr}/{length}", get(read_device_path))
        .route("/api/batch_read", post(batch_read))
        .route("/api/batch_read_status", get(batch_read_status))
        .route("/api/openapi/{*format}", get(openapi))
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let gateway_config = GatewayConfig::from_env();
    let state = Arc::new(ServerState {
        default_plc_config: mc3e_gateway::config::default_plc_config(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], gateway_config.listen_port));
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!("mc3e-gateway listening on {addr}");
    let app = get_router().with_state(state);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    match result {
        Ok(()) => ExitCode::from(130),
        Err(err) => {
            error!("server error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c, shutting down"),
        Err(err) => error!("unable to listen for shutdown signal: {err}"),
    }
}
