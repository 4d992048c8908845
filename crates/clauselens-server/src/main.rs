//! ClauseLens: contract clause analysis server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clauselens_analyze::AnalyzeOptions;
use clauselens_core::AppConfig;
use clauselens_server::logging::{self, Console};
use clauselens_server::{build_router, AppState};
use tracing::info;

fn resolve_data_dir() -> PathBuf {
    std::env::var("CLAUSELENS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_usage() {
    println!("ClauseLens: contract clause analysis server");
    println!();
    println!("Usage: clauselens [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Start the server");
    println!("  analyze <file> [contract type]  Analyse one contract and print JSON");
    println!("  help                            Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None => serve().await,
        Some("analyze") => {
            let Some(file) = args.get(2) else {
                eprintln!("Usage: clauselens analyze <file> [contract type]");
                std::process::exit(1);
            };
            let contract_type = (args.len() > 3).then(|| args[3..].join(" "));
            analyze_file(Path::new(file), contract_type.as_deref()).await
        }
        Some("--help" | "-h" | "help") => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'clauselens help' for usage.", other);
            std::process::exit(1);
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let data_dir = resolve_data_dir();
    let config = AppConfig::from_env(&data_dir)?;
    logging::init(Some(&config.data_paths.app_log), Console::Stdout);
    info!("Data directory: {}", data_dir.display());

    let port = config.port;
    let state = Arc::new(AppState::load(config)?);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ClauseLens server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn analyze_file(path: &Path, contract_type: Option<&str>) -> anyhow::Result<()> {
    let data_dir = resolve_data_dir();
    let config = AppConfig::from_env(&data_dir)?;
    logging::init(Some(&config.data_paths.app_log), Console::Stderr);

    if !clauselens_ingest::is_allowed(&path.to_string_lossy()) {
        anyhow::bail!("File type not allowed: {}", path.display());
    }
    let file_size = std::fs::metadata(path)?.len();

    let state = AppState::load(config)?;
    let text = clauselens_ingest::extract_text(path);
    let mut result = state
        .analyzer
        .analyze(&text, &AnalyzeOptions::from_form(contract_type, None))
        .await?;
    result.file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    result.file_size = Some(file_size);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
