//! Models command - check and download OCR models and the face cascade.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use idscan_core::models::config::HAAR_FRONTALFACE_FILE;
use idscan_core::{HaarCascade, IdScanConfig};

use super::load_config;

/// Upstream location of the frontal face cascade.
const HAAR_FRONTALFACE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_default.xml";

/// Approximate size of the cascade, used until the server reports one.
const HAAR_FRONTALFACE_SIZE: u64 = 930_000;

/// Base URL of the PaddleOCR mobile models converted to ONNX.
const OCR_MODELS_URL: &str = "https://github.com/jakubmatias/incr/raw/main/models/mobile";

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Check which model files are present
    Status,

    /// Download the OCR models and the face detection cascade
    Download(DownloadArgs),
}

#[derive(Args)]
struct DownloadArgs {
    /// Directory for the OCR models (default: ocr.model_dir from config)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Output path for the cascade (default: face.cascade_path from config)
    #[arg(long)]
    cascade: Option<PathBuf>,

    /// Only download the OCR models
    #[arg(long, conflicts_with = "cascade_only")]
    ocr_only: bool,

    /// Only download the face cascade
    #[arg(long)]
    cascade_only: bool,

    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,
}

/// A downloadable model file.
#[derive(Debug, Clone)]
struct ModelFile {
    filename: String,
    size_bytes: u64,
    description: &'static str,
    url: String,
}

/// OCR model files for the configured recognizer family.
fn ocr_model_files(config: &IdScanConfig) -> anyhow::Result<Vec<ModelFile>> {
    let family = config.ocr.model_family();
    if family != "latin" {
        anyhow::bail!(
            "no download available for '{}' recognition models; place them in {}",
            family,
            config.ocr.model_dir.display()
        );
    }

    Ok(vec![
        ModelFile {
            filename: config.ocr.detection_model.clone(),
            size_bytes: 4_500_000,
            description: "PP-OCRv3 mobile detection",
            url: format!("{}/det.onnx", OCR_MODELS_URL),
        },
        ModelFile {
            filename: config.ocr.recognition_model(),
            size_bytes: 7_500_000,
            description: "Latin recognition",
            url: format!("{}/latin_rec.onnx", OCR_MODELS_URL),
        },
        ModelFile {
            filename: config.ocr.dictionary(),
            size_bytes: 2_000,
            description: "Latin character dictionary",
            url: format!("{}/latin_dict.txt", OCR_MODELS_URL),
        },
    ])
}

pub async fn run(args: ModelsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    match args.command {
        ModelsCommand::Status => check_status(&config),
        ModelsCommand::Download(download_args) => download_models(download_args, &config).await,
    }
}

fn check_status(config: &IdScanConfig) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!(
        "OCR engine: {} ({})",
        style(config.ocr.engine.to_string()).cyan().bold(),
        config.ocr.language
    );
    println!();

    println!(
        "{} {}",
        style("▸ OCR models").bold(),
        config.ocr.model_dir.display()
    );
    let ocr_files = [
        config.ocr.detection_model.clone(),
        config.ocr.recognition_model(),
        config.ocr.dictionary(),
    ];
    let mut ocr_ready = true;
    for name in &ocr_files {
        ocr_ready &= print_file_status(name, &config.model_path(name))?;
    }
    if !ocr_ready {
        println!(
            "    {} Run 'idscan models download --ocr-only' to fetch them",
            style("⚠").yellow()
        );
    }
    println!();

    println!("{}", style("▸ Face cascade").bold());
    let cascade_path = &config.face.cascade_path;
    let file_name = cascade_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| HAAR_FRONTALFACE_FILE.to_string());
    if print_file_status(&file_name, cascade_path)? {
        match HaarCascade::from_file(cascade_path) {
            Ok(cascade) => {
                let (w, h) = cascade.window_size();
                println!(
                    "    {} Ready ({} stages, {}x{} window)",
                    style("✓").green(),
                    cascade.stage_count(),
                    w,
                    h
                );
            }
            Err(e) => println!("    {} {}", style("✗").red(), e),
        }
    } else {
        println!(
            "    {} Run 'idscan models download --cascade-only' to fetch it",
            style("⚠").yellow()
        );
    }

    Ok(())
}

/// Print one file line. Returns whether the file exists.
fn print_file_status(name: &str, path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        let size = fs::metadata(path)?.len();
        println!("    {} {:<40} {:>10}", style("✓").green(), name, format_size(size));
        Ok(true)
    } else {
        println!("    {} {:<40} {:>10}", style("✗").red(), name, "missing");
        Ok(false)
    }
}

async fn download_models(args: DownloadArgs, config: &IdScanConfig) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("idscan-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;
    let multi_progress = MultiProgress::new();
    let mut error_count = 0;

    if !args.cascade_only {
        let model_dir = args
            .model_dir
            .clone()
            .unwrap_or_else(|| config.ocr.model_dir.clone());
        fs::create_dir_all(&model_dir)?;

        println!(
            "{} Downloading OCR models to {}",
            style("ℹ").blue(),
            model_dir.display()
        );
        for model in ocr_model_files(config)? {
            let path = model_dir.join(&model.filename);
            if !fetch(&client, &multi_progress, &model, &path, args.force).await {
                error_count += 1;
            }
        }
        println!();
    }

    if !args.ocr_only {
        let path = args
            .cascade
            .clone()
            .unwrap_or_else(|| config.face.cascade_path.clone());
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        println!(
            "{} Downloading face cascade to {}",
            style("ℹ").blue(),
            path.display()
        );
        let cascade = ModelFile {
            filename: HAAR_FRONTALFACE_FILE.to_string(),
            size_bytes: HAAR_FRONTALFACE_SIZE,
            description: "OpenCV frontal face cascade",
            url: HAAR_FRONTALFACE_URL.to_string(),
        };
        if fetch(&client, &multi_progress, &cascade, &path, args.force).await {
            // Reject truncated downloads and HTML error pages
            let parsed = HaarCascade::from_file(&path)?;
            println!(
                "  {} {} ({} stages)",
                style("✓").green(),
                cascade.description,
                parsed.stage_count()
            );
        } else {
            error_count += 1;
        }
        println!();
    }

    if error_count > 0 {
        anyhow::bail!("{} file(s) failed to download", error_count);
    }

    println!("{} Models ready", style("✓").green().bold());
    Ok(())
}

/// Download one file unless a plausible copy exists. Returns whether the
/// file is in place afterwards.
async fn fetch(
    client: &reqwest::Client,
    multi_progress: &MultiProgress,
    model: &ModelFile,
    path: &Path,
    force: bool,
) -> bool {
    if !force {
        if let Ok(metadata) = fs::metadata(path) {
            if metadata.len() > model.size_bytes / 2 {
                println!(
                    "  {} {} (already exists, {})",
                    style("✓").green(),
                    model.filename,
                    format_size(metadata.len())
                );
                return true;
            }
        }
    }

    let pb = multi_progress.add(ProgressBar::new(model.size_bytes));
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("  {spinner:.green} {msg:<40} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")
    {
        pb.set_style(bar_style.progress_chars("=>-"));
    }
    pb.set_message(model.filename.clone());

    match download_file(client, &model.url, path, &pb).await {
        Ok(()) => {
            pb.finish_with_message(format!("{} {}", style("✓").green(), model.filename));
            true
        }
        Err(e) => {
            pb.finish_with_message(format!("{} {} - {}", style("✗").red(), model.filename, e));
            false
        }
    }
}

async fn download_file(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    if let Some(content_length) = response.content_length() {
        pb.set_length(content_length);
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}
