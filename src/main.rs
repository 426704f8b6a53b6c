// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jwt_auth_api::{
    api::router,
    auth::Authenticator,
    config::{LogFormat, ServerConfig, TlsFiles},
    state::AppState,
};

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_on_ctrl_c(handle: Handle<SocketAddr>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not set up yet.
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr()?;
    let authenticator = Authenticator::from_settings(&config.auth)?;
    tracing::info!(
        auth = ?config.auth,
        trust_anchors = authenticator.anchors().len(),
        "Authentication configured"
    );

    let app = router(AppState::new(authenticator));
    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    serve(app, addr, config.tls.as_ref(), handle).await?;
    tracing::info!("Server stopped");
    Ok(())
}

/// Serve until `handle` shuts the server down, over HTTPS when `tls` is set.
async fn serve(
    app: Router,
    addr: SocketAddr,
    tls: Option<&TlsFiles>,
    handle: Handle<SocketAddr>,
) -> Result<(), Box<dyn std::error::Error>> {
    match tls {
        Some(tls) => {
            // rustls needs a process-wide provider before any TLS config is built.
            let _ = rustls::crypto::ring::default_provider().install_default();
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
            tracing::info!(%addr, "Listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "Listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jwt_auth_api::config::AuthSettings;

    fn app() -> Router {
        let settings = AuthSettings {
            symmetric_key: Some("c2VjcmV0".into()),
            ..AuthSettings::default()
        };
        router(AppState::new(Authenticator::from_settings(&settings).unwrap()))
    }

    #[tokio::test]
    async fn plain_server_binds_and_stops_on_graceful_shutdown() {
        let handle: Handle<SocketAddr> = Handle::new();
        let stop = async {
            let bound = handle.listening().await;
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
            bound
        };

        let (served, bound) = tokio::join!(
            serve(app(), "127.0.0.1:0".parse().unwrap(), None, handle.clone()),
            stop
        );

        assert!(served.is_ok());
        assert_ne!(bound.unwrap().port(), 0);
    }

    #[tokio::test]
    async fn missing_tls_files_fail_startup() {
        let tls = TlsFiles {
            cert_path: "/nonexistent/cert.pem".into(),
            key_path: "/nonexistent/key.pem".into(),
        };
        let result = serve(
            app(),
            "127.0.0.1:0".parse().unwrap(),
            Some(&tls),
            Handle::new(),
        )
        .await;
        assert!(result.is_err());
    }
}
