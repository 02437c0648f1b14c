use std::path::{Path, PathBuf};

use clap::Parser;
use market_reports::{
    AppState, build_app,
    config::AppConfig,
    observability,
    reports::ReportData,
    services::{ReportKind, ReportRequest},
};

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "market-reports.toml";

/// CLI arguments for the marketplace report service
#[derive(Parser, Debug)]
#[command(version, about = "Marketplace report service", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./market-reports.toml if it exists,
    /// otherwise built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Render one report from the configured dataset and print it
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
        /// daily, weekly, monthly or yearly; anything else is a single total bucket
        #[arg(long)]
        time_frame: Option<String>,
        /// YYYY-MM-DD or RFC 3339 timestamp
        #[arg(long)]
        start_date: Option<String>,
        /// YYYY-MM-DD or RFC 3339 timestamp
        #[arg(long)]
        end_date: Option<String>,
        /// Print the report table as CSV instead of JSON
        #[arg(long)]
        csv: bool,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the OpenAPI specification (JSON format)
    Openapi {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate the configuration and dataset, then exit
    Check,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config_path = args.config.as_deref();

    match args.command {
        None | Some(Command::Serve) => run_server(config_path).await,
        Some(Command::Report {
            kind,
            time_frame,
            start_date,
            end_date,
            csv,
            output,
        }) => {
            let request = ReportRequest {
                time_frame,
                start_date,
                end_date,
            };
            run_report(config_path, kind, request, csv, output).await
        }
        Some(Command::Openapi { output }) => run_openapi_export(output),
        Some(Command::Check) => run_check(config_path).await,
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn load_config(explicit: Option<&Path>) -> AppConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => PathBuf::from(DEFAULT_CONFIG_FILE),
        None => return AppConfig::default(),
    };

    AppConfig::from_file(&path).unwrap_or_else(|e| {
        fail(format!(
            "Failed to load config from {}: {e}",
            path.display()
        ))
    })
}

fn write_output(output: Option<&Path>, content: &[u8]) {
    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, content) {
                fail(format!("Failed to write to {}: {e}", path.display()));
            }
            eprintln!("Written to {}", path.display());
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(content).and_then(|_| stdout.flush()) {
                fail(format!("Failed to write to stdout: {e}"));
            }
        }
    }
}

async fn run_server(config_path: Option<&Path>) {
    let config = load_config(config_path);

    if let Err(e) = observability::init_tracing(&config.observability.logging) {
        fail(e);
    }

    let state = match AppState::from_config(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize");
            std::process::exit(1);
        }
    };

    let app = build_app(&config, state);
    let addr = std::net::SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(
        address = %addr,
        utc_offset = %config.reports.utc_offset,
        max_buckets = config.reports.max_buckets,
        "Starting report server"
    );

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

async fn run_report(
    config_path: Option<&Path>,
    kind: ReportKind,
    request: ReportRequest,
    csv: bool,
    output: Option<PathBuf>,
) {
    let config = load_config(config_path);
    let state = AppState::from_config(config)
        .await
        .unwrap_or_else(|e| fail(e));

    let data = state
        .services
        .reports
        .report(kind, &request)
        .await
        .unwrap_or_else(|e| fail(e));

    let content = if csv {
        render_csv(&data)
    } else {
        let mut json = serde_json::to_vec_pretty(&data).unwrap_or_else(|e| fail(e));
        json.push(b'\n');
        json
    };

    write_output(output.as_deref(), &content);
}

#[cfg(feature = "csv-export")]
fn render_csv(data: &ReportData) -> Vec<u8> {
    market_reports::routes::csv_export::report_to_csv(data).unwrap_or_else(|e| fail(e))
}

#[cfg(not(feature = "csv-export"))]
fn render_csv(_data: &ReportData) -> Vec<u8> {
    fail("CSV output requires the 'csv-export' feature")
}

#[cfg(feature = "utoipa")]
fn run_openapi_export(output: Option<PathBuf>) {
    use utoipa::OpenApi;

    let spec = market_reports::openapi::ApiDoc::openapi();
    let content = spec.to_pretty_json().unwrap_or_else(|e| fail(e));
    write_output(output.as_deref(), format!("{content}\n").as_bytes());
}

#[cfg(not(feature = "utoipa"))]
fn run_openapi_export(_output: Option<PathBuf>) {
    fail("OpenAPI export requires the 'utoipa' feature")
}

async fn run_check(config_path: Option<&Path>) {
    let config = load_config(config_path);
    let dataset = config.storage.dataset.clone();

    if let Err(e) = AppState::from_config(config).await {
        fail(e);
    }

    match dataset {
        Some(path) => println!("Configuration OK (dataset: {})", path.display()),
        None => println!("Configuration OK (no dataset configured)"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
