//! Swift Signals Gateway - HTTP API Gateway
//!
//! This is the main entry point for the gateway service. It reads its
//! configuration from the environment, dials the four backend services and
//! serves the JSON API until SIGINT or SIGTERM.
//!
//! # Dev Mode
//!
//! Build with `--features dev-mode` to use a mock JWT validator that accepts
//! tokens of the form `test-token:<user-id>[:<role>]`.

use std::process::ExitCode;
use std::sync::Arc;

#[cfg(not(feature = "dev-mode"))]
use swift_signals_auth::HmacJwtValidator;
#[cfg(feature = "dev-mode")]
use swift_signals_auth::MockJwtValidator;
use swift_signals_auth::JwtValidator;
use swift_signals_gateway::{
    create_router, serve_until_shutdown, telemetry, Backends, GatewayConfig, GatewayState,
};
use swift_signals_rpc::{
    ConnectError, GrpcIntersectionClient, GrpcOptimisationClient, GrpcSimulationClient,
    GrpcUserClient, RpcChannel,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init(swift_signals_gateway::LogFormat::default());
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    telemetry::init(config.log_format);
    tracing::info!("Starting Swift Signals Gateway");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        port = config.port,
        user_service = %config.user_service_addr,
        intersection_service = %config.intersection_service_addr,
        simulation_service = %config.simulation_service_addr,
        optimisation_service = %config.optimisation_service_addr,
        rpc_timeout_secs = config.rpc_timeout_seconds,
        optimisation_timeout_secs = config.optimisation_timeout_seconds,
        idle_timeout_secs = config.http_idle_timeout_seconds,
        "Gateway configuration loaded"
    );

    // Fail fast if any backend is unreachable
    let backends = connect_backends(&config).await?;
    tracing::info!("Connected to all backend services");

    let jwt_validator = jwt_validator(&config);

    let listen_addr = config.listen_addr();
    let idle_timeout = config.idle_timeout();
    let grace = config.shutdown_grace();
    let state = GatewayState::new(backends, jwt_validator, config);
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    serve_until_shutdown(listener, app, idle_timeout, grace).await;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn connect_backends(config: &GatewayConfig) -> Result<Backends, ConnectError> {
    let connect = config.connect_timeout();
    let rpc_timeout = config.rpc_timeout();

    let users = RpcChannel::connect(&config.user_service_addr, connect).await?;
    let intersections = RpcChannel::connect(&config.intersection_service_addr, connect).await?;
    let optimiser = RpcChannel::connect(&config.optimisation_service_addr, connect).await?;
    let simulator = RpcChannel::connect(&config.simulation_service_addr, connect).await?;

    Ok(Backends {
        users: Arc::new(GrpcUserClient::new(users).with_timeout(rpc_timeout)),
        intersections: Arc::new(
            GrpcIntersectionClient::new(intersections).with_timeout(rpc_timeout),
        ),
        optimiser: Arc::new(
            GrpcOptimisationClient::new(optimiser).with_timeout(config.optimisation_timeout()),
        ),
        simulator: Arc::new(GrpcSimulationClient::new(simulator).with_timeout(rpc_timeout)),
    })
}

#[cfg(feature = "dev-mode")]
fn jwt_validator(_config: &GatewayConfig) -> Arc<dyn JwtValidator> {
    tracing::warn!("DEV MODE ENABLED - using mock JWT validator");
    tracing::warn!("Use tokens in format: test-token:<user-id>[:<role>]");
    Arc::new(MockJwtValidator)
}

#[cfg(not(feature = "dev-mode"))]
fn jwt_validator(config: &GatewayConfig) -> Arc<dyn JwtValidator> {
    tracing::info!("JWT validator initialized");
    Arc::new(HmacJwtValidator::new(config.jwt_secret.as_bytes()))
}
