// src/main.rs
mod aggregate;
mod catalog;
mod config;
mod model;
mod render;
mod service;
mod snapshot;
mod submit;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use aggregate::select_best;
use config::AppConfig;
use model::{ClientError, ContainerType, OptimizeResponse, OptimizeResult};
use render::{format_summary, format_unplaced_items, render_layout_svg};
use service::{HttpOptimizeService, SubmitOptions};
use submit::SubmissionController;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Upload an item list to the floor-plan optimization service and render
/// the packing result as SVG.
#[derive(Debug, Parser)]
#[command(name = "floorplan_client", version)]
struct Cli {
    /// CSV or spreadsheet file with item dimensions
    /// (columns: sku, qty, length_mm, width_mm, optional rotatable).
    file: PathBuf,

    /// Container code to pack into; defaults to the catalog's standard type.
    #[arg(long)]
    container: Option<String>,

    /// Safety margin around every item, in millimeters.
    #[arg(long, default_value_t = 0)]
    margin_mm: u32,

    /// Evaluate every known container type and pick the best.
    #[arg(long, default_value_t = false)]
    compare_all: bool,

    /// Directory the layout SVGs are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("⚠️ Could not load .env: {}", err);
        }
    }

    let cli = Cli::parse();
    let app_config = AppConfig::from_env();

    match run(cli, app_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, app_config: AppConfig) -> Result<(), BoxedError> {
    println!(
        "🚀 Floorplan client starting (service: {})",
        app_config.service.base_url()
    );
    let service = HttpOptimizeService::new(app_config.service.clone())?;

    let catalog = catalog::load_catalog(&service).await?;
    println!("📦 Catalog loaded: {} container types", catalog.len());

    let container_code = match cli
        .container
        .clone()
        .or_else(|| catalog::default_container_code(&catalog).map(str::to_string))
    {
        Some(code) => code,
        None => {
            return Err(ClientError::Validation(
                "the service catalog is empty; nothing to pack into".to_string(),
            )
            .into());
        }
    };
    if !cli.compare_all && !catalog.contains_key(&container_code) {
        let known = catalog.keys().cloned().collect::<Vec<_>>().join(", ");
        return Err(ClientError::Validation(format!(
            "unknown container code '{}'; known codes: {}",
            container_code, known
        ))
        .into());
    }

    let controller = tokio::sync::Mutex::new(SubmissionController::new());
    match snapshot::capture_snapshot(&cli.file).await {
        Ok(snap) => {
            println!(
                "📄 Snapshot captured: {} ({} KB, {})",
                snap.name(),
                snap.size().div_ceil(1024),
                snap.media_type()
            );
            controller.lock().await.install_snapshot(snap);
        }
        Err(err) => {
            controller.lock().await.report_capture_failure(err.clone());
            return Err(err.into());
        }
    }

    let options = SubmitOptions {
        container_code: container_code.clone(),
        compare_all: cli.compare_all,
        margin_mm: cli.margin_mm,
    };
    if cli.compare_all {
        println!("📤 Submitting for comparison across all container types...");
    } else {
        println!("📤 Submitting for container {}...", container_code);
    }

    submit::run_submission(&controller, &service, options).await;
    let controller = controller.into_inner();

    if let Some(err) = controller.current_error() {
        return Err(err.clone().into());
    }
    if let Some(response) = controller.current_result() {
        tokio::fs::create_dir_all(&cli.out_dir).await?;
        match response {
            OptimizeResponse::Single {
                container_code,
                meta,
                result,
            } => {
                present_result(container_code, meta, result, &cli.out_dir).await?;
            }
            OptimizeResponse::CompareAll {
                best_container,
                results,
            } => {
                match select_best(results) {
                    Some(best) => {
                        println!(
                            "🏆 Best container: {} (max placed items, then max area utilization)",
                            best
                        );
                        if best != best_container.as_str() {
                            println!(
                                "ℹ️ The service ranked {} best; the client ranking prefers {}.",
                                best_container, best
                            );
                        }
                    }
                    None => println!("⚠️ Comparison returned no results."),
                }
                for (code, entry) in results {
                    present_result(code, &entry.meta, &entry.result, &cli.out_dir).await?;
                }
            }
        }
    }

    Ok(())
}

/// Prints the summary of one result and writes its SVG layout.
async fn present_result(
    code: &str,
    meta: &ContainerType,
    result: &OptimizeResult,
    out_dir: &Path,
) -> Result<(), BoxedError> {
    println!(
        "📦 {} — {} ({}×{} mm, strategy: {})",
        code, meta.name, result.container.length_mm, result.container.width_mm, result.strategy
    );
    println!("   {}", format_summary(&result.summary, result.margin_mm));

    if let Some(listing) = format_unplaced_items(&result.unplaced_items) {
        println!("   Unplaced items ({}):", result.unplaced_items.len());
        println!("{}", listing);
    }

    let path = out_dir.join(format!("layout_{}.svg", code));
    tokio::fs::write(&path, render_layout_svg(result)).await?;
    println!("🖼️ Layout written to {}", path.display());
    Ok(())
}
