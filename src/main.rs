use anyhow::Result;
use std::path::PathBuf;

use atelier::config::Config;
use atelier::db::Database;
use atelier::logging::{self, LogTarget};
use atelier::server;

#[derive(Default)]
struct Args {
    config_path: Option<PathBuf>,
    port: Option<u16>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("atelier {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--port" | "-p" => match args.get(i + 1).map(|p| p.parse::<u16>()) {
                Some(Ok(port)) => {
                    parsed.port = Some(port);
                    i += 1;
                }
                _ => {
                    eprintln!("Error: --port requires a port number");
                    std::process::exit(1);
                }
            },
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"atelier - interior design gallery server

USAGE:
    atelier [OPTIONS]

OPTIONS:
    --config, -c PATH   Path to config file
    --port, -p PORT     Port to listen on (overrides config)
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    ATELIER_CONFIG      Path to config file (overrides default location)
    ATELIER_PORT        Port to listen on
    DATABASE_URL        PostgreSQL connection URL
    ATELIER_LOG         Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/atelier/config.toml

See also: atelier-browse --help"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    logging::init(LogTarget::Stderr)?;

    let mut config = match args.config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let db_config = config.database.clone();
    let db = tokio::task::spawn_blocking(move || -> Result<Database> {
        let db = Database::open(&db_config)?;
        db.initialize()?;
        Ok(db)
    })
    .await??;

    server::serve(&config.server, db).await
}
