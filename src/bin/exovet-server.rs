use clap::{Arg, Command};
use exovet::{server, ServiceConfig, VettingService};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exovet HTTP Server
///
/// Serves transit-candidate predictions over HTTP: CSV batch uploads,
/// single-record classification, and result downloads.

#[tokio::main]
async fn main() {
    let matches = Command::new("exovet-server")
        .about("Exoplanet transit-candidate vetting service")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .help("Path to a JSON configuration file")
                .short('c')
                .long("config")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("listen")
                .help("Listen address override (host:port)")
                .long("listen")
                .value_name("ADDR"),
        )
        .arg(
            Arg::new("log-level")
                .help("Log level")
                .long("log-level")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .default_value("info"),
        )
        .get_matches();

    let level = matches.get_one::<String>("log-level").unwrap();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("exovet={},warn", level)))
        .init();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => match ServiceConfig::from_file(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => ServiceConfig::default(),
    };
    if let Some(listen) = matches.get_one::<String>("listen") {
        config.listen_addr = listen.clone();
    }

    let addr = match config.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid listen address: {}", e);
            std::process::exit(1);
        }
    };

    let service = match VettingService::open(&config) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            eprintln!("Failed to open service: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::serve(service, addr).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
