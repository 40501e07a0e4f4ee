use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sample_api::api;
use sample_api::config::Config;
use sample_api::database::Database;
use sample_api::server::Server;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present so local runs pick up DB_* without exporting them.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let database = match Database::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "could not connect to the database");
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::bind(&config.server.addr).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "could not start server");
            database.close().await;
            return ExitCode::FAILURE;
        }
    };

    let router = Arc::new(api::router());
    info!(routes = router.len(), address = %server.local_addr(), "serving");

    let result = server
        .run_until(
            move |req| {
                let router = Arc::clone(&router);
                async move { router.route(req).await }
            },
            shutdown_signal(),
        )
        .await;

    database.close().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, serving until killed");
        std::future::pending::<()>().await;
    }
}
