use crate::catalog::CatalogService;
use crate::config::Config;
use crate::db::{import_properties_file, init_db, Database};
use crate::responses::error_response;
use crate::router::handle;
use astra::Server;
use std::net::SocketAddr;
use std::process::ExitCode;

mod catalog;
mod config;
mod db;
mod domain;
mod errors;
mod logging;
mod responses;
mod router;

#[cfg(test)]
mod tests;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init_logging(&config.log_filter) {
        eprintln!("Logging setup failed: {e}");
        return ExitCode::FAILURE;
    }

    let db = Database::new(config.db_path.clone());
    if let Err(e) = init_db(&db) {
        tracing::error!(error = %e, "database initialization failed");
        return ExitCode::FAILURE;
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => serve(config, db),
        [cmd, file] if cmd == "import" => match import_properties_file(&db, file) {
            Ok(n) => {
                tracing::info!(rows = n, file = %file, "import finished");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, file = %file, "import failed");
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("usage: catalog_portal [import <file.json>]");
            ExitCode::FAILURE
        }
    }
}

fn serve(config: Config, db: Database) -> ExitCode {
    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, bind_addr = %config.bind_addr, "invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let catalog = CatalogService::new(db, config.catalog);
    tracing::info!(%addr, workers = config.max_workers, "starting server");

    let server = Server::bind(&addr).max_workers(config.max_workers);
    let result = server.serve(move |req, _info| match handle(req, &catalog) {
        Ok(resp) => resp,
        Err(err) => error_response(err),
    });

    match result {
        Ok(()) => {
            tracing::info!("server shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "server ended with error");
            ExitCode::FAILURE
        }
    }
}
