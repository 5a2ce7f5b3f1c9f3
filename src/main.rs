use clap::{Parser, Subcommand};
use imginfo::config::{self, InspectConfig, ReportFormat};
use imginfo::{browse, imaging, metadata, output, scan};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "imginfo")]
#[command(about = "Inspect raster image metadata")]
#[command(long_about = "\
Inspect raster image metadata

Reports, for each PNG, JPEG, BMP, TIFF or GIF file:

  Basic     format, pixel layout, dimensions, channels
  Advanced  color space, bits per pixel, alpha, animation,
            resolution, compression, embedded color profile
  File      name, size, timestamps
  EXIF      embedded tag dictionary

Settings are read from ./imginfo.toml when present, or from --config.
Run 'imginfo gen-config' to generate a documented config file.

Log verbosity follows RUST_LOG (default: warn); logs go to stderr.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./imginfo.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text reports
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a metadata report for each file
    Inspect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the supported images in a folder
    List { dir: PathBuf },
    /// Step through the images in a folder, printing each report
    Browse {
        dir: PathBuf,
        /// Index (0-based) to start from
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Number of images to show (default: the whole folder)
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Show the preview size a file would be reduced to
    Thumbnail {
        file: PathBuf,
        #[arg(long)]
        max_width: Option<u32>,
        #[arg(long)]
        max_height: Option<u32>,
    },
    /// Print a stock imginfo.toml with all options documented
    GenConfig,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    let settings = || load_settings(cli.config.as_deref(), cli.json);

    match cli.command {
        Command::Inspect { ref files } => {
            let settings = settings()?;
            let mut failed = 0usize;
            for path in files {
                if !report(path, &settings)? {
                    failed += 1;
                }
            }
            if failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::List { ref dir } => {
            let settings = settings()?;
            let files = scan::list_images_with(dir, settings.listing.order())?;
            match settings.report.format {
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
                ReportFormat::Text => output::print_file_set(dir, &files),
            }
        }
        Command::Browse {
            ref dir,
            start,
            steps,
        } => {
            let settings = settings()?;
            let mut session = browse::Session::open_folder_with(dir, settings.listing.order())?;
            if session.is_empty() {
                output::print_file_set(dir, session.files());
                return Ok(ExitCode::SUCCESS);
            }
            if session.select(start).is_none() {
                return Err(format!(
                    "start index {start} out of range (folder has {} images)",
                    session.len()
                )
                .into());
            }
            let steps = steps.unwrap_or(session.len());
            for step in 0..steps {
                if step > 0 {
                    session.next();
                }
                let Some(path) = session.current().map(Path::to_path_buf) else {
                    break;
                };
                if settings.report.format == ReportFormat::Text {
                    println!(
                        "{}",
                        output::format_browse_header(session.index(), session.len(), &path)
                    );
                }
                report(&path, &settings)?;
            }
        }
        Command::Thumbnail {
            ref file,
            max_width,
            max_height,
        } => {
            let settings = settings()?;
            let mut bounds = settings.thumbnail.bounds();
            bounds.width = max_width.unwrap_or(bounds.width);
            bounds.height = max_height.unwrap_or(bounds.height);

            let image = imaging::load(file)?;
            let thumb = imaging::thumbnail(&image, bounds);
            match settings.report.format {
                ReportFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "path": file,
                        "source": image.dimensions(),
                        "thumbnail": [thumb.width(), thumb.height()],
                        "degraded": thumb.is_degraded(),
                    }))?
                ),
                ReportFormat::Text => {
                    output::print_thumbnail(file, image.dimensions(), &thumb)
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Config file values with the `--json` flag applied on top.
fn load_settings(
    explicit: Option<&Path>,
    json: bool,
) -> Result<InspectConfig, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let mut settings = config::load_config(explicit, &cwd)?;
    if json {
        settings.report.format = ReportFormat::Json;
    }
    Ok(settings)
}

/// Inspect one file and print its report or its error state.
///
/// Returns whether the file was inspected successfully.
fn report(path: &Path, settings: &InspectConfig) -> Result<bool, serde_json::Error> {
    let format = settings.report.format;
    match metadata::inspect(path) {
        Ok(inspection) => {
            match format {
                ReportFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&inspection.record)?)
                }
                ReportFormat::Text => {
                    output::print_report(&inspection.record, settings.report.show_path)
                }
            }
            Ok(true)
        }
        Err(e) => {
            match format {
                ReportFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "path": path,
                        "error": e.to_string(),
                    }))?
                ),
                ReportFormat::Text => output::print_error(path, &e.to_string()),
            }
            Ok(false)
        }
    }
}
