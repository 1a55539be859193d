//! nutexb-bridge command line
//!
//! Plays the host role for the conversion pipeline: PNG work goes through
//! the `image` crate, everything else through the same procedures an image
//! editor would call.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use nutexb_bridge::converter::{ColorSpace, TextureFormat};
use nutexb_bridge::registry::{
    ProcedureCall, LOAD_PROCEDURE, SAVE_PROCEDURE, THUMBNAIL_PROCEDURE,
};
use nutexb_bridge::{
    paths, BridgeConfig, ConversionPipeline, ConversionResult, ImageCrateHost, ProcedureRegistry,
    SaveOptions,
};

#[derive(Parser)]
#[command(name = "nutexb-bridge")]
#[command(version)]
#[command(about = "Load, save and thumbnail nutexb textures through ultimate_tex_cli")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use RUST_LOG=debug for more detail)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to ultimate_tex_cli (default: dependencies/ next to this executable, then PATH)
    #[arg(long, global = true, env = "NUTEXB_CONVERTER")]
    converter: Option<PathBuf>,

    /// Keep the intermediate PNG next to the texture
    #[arg(long, global = true)]
    keep_intermediate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a nutexb texture to an image file
    Load {
        /// Path to the .nutexb file
        texture: PathBuf,

        /// Output image path (format from extension)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export an image file as a nutexb texture
    Save {
        /// Source image
        image: PathBuf,

        /// Destination .nutexb path
        texture: PathBuf,

        /// Export as linear data (BC7Unorm) instead of sRGB color
        #[arg(long, conflicts_with = "format")]
        linear: bool,

        /// Explicit converter format tag (e.g. BC7Srgb, BC5Unorm)
        #[arg(long, value_parser = parse_format)]
        format: Option<TextureFormat>,
    },

    /// Write a downscaled preview of a nutexb texture
    Thumbnail {
        /// Path to the .nutexb file
        texture: PathBuf,

        /// Longest edge of the thumbnail in pixels
        #[arg(short, long, default_value = "128")]
        size: u32,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the declared host procedures
    Procedures {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_format(s: &str) -> Result<TextureFormat, String> {
    TextureFormat::parse(s).ok_or_else(|| {
        let known: Vec<_> = TextureFormat::ALL.iter().map(|f| f.name()).collect();
        format!("unknown format '{}' (expected one of: {})", s, known.join(", "))
    })
}

fn resolve_config(cli: &Cli) -> Result<BridgeConfig> {
    let config = match &cli.converter {
        Some(path) => BridgeConfig::new(path),
        None => BridgeConfig::discover()?,
    };
    config.validate()?;
    Ok(config.with_keep_intermediates(cli.keep_intermediate))
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.blue} {wide_msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Turn a failing procedure result into an error carrying the converter output
fn into_image(result: ConversionResult<DynamicImage>, procedure: &str) -> Result<Option<DynamicImage>> {
    if !result.raw_output.trim().is_empty() {
        tracing::debug!("{} converter output: {}", procedure, result.raw_output.trim());
    }
    let status = result.status;
    result
        .into_result()
        .with_context(|| format!("{} failed ({:?})", procedure, status))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only initialize logging if verbose or RUST_LOG is set
    if cli.verbose || std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(if cli.verbose {
                    "nutexb_bridge=debug".parse()?
                } else {
                    "nutexb_bridge=warn".parse()?
                }),
            )
            .init();
    }

    let registry = ProcedureRegistry::new();

    match &cli.command {
        Commands::Procedures { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(registry.procedures())?);
            } else {
                for info in registry.procedures() {
                    println!("{:<24} {}", info.name, info.blurb);
                    if let Some(ext) = info.extensions {
                        println!("{:<24}   extensions: {}", "", ext);
                    }
                    if let Some(mime) = info.mime_types {
                        println!("{:<24}   mime type:  {}", "", mime);
                    }
                    if let Some(thumb) = info.thumbnail_loader {
                        println!("{:<24}   thumbnail:  {}", "", thumb);
                    }
                }
            }
        }

        Commands::Load { texture, output } => {
            let pipeline = ConversionPipeline::new(&resolve_config(&cli)?, ImageCrateHost);

            let pb = spinner("Loading nutexb image")?;
            let result = registry.dispatch(
                &pipeline,
                LOAD_PROCEDURE,
                ProcedureCall::Load {
                    file: texture.clone(),
                },
            );
            pb.finish_and_clear();

            let image = into_image(result, LOAD_PROCEDURE)?
                .context("Load returned no image")?;
            image
                .save(output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Loaded {} ({}x{}) -> {}",
                texture.display(),
                image.width(),
                image.height(),
                output.display()
            );
        }

        Commands::Save {
            image: image_path,
            texture,
            linear,
            format,
        } => {
            let config = resolve_config(&cli)?;
            guard_source_image(image_path, texture)?;

            let source = image::open(image_path)
                .with_context(|| format!("Failed to open {}", image_path.display()))?;
            let options = match format {
                Some(format) => SaveOptions { format: *format },
                None if *linear => SaveOptions::for_color_space(ColorSpace::Linear),
                None => SaveOptions::default(),
            };

            let pipeline = ConversionPipeline::new(&config, ImageCrateHost);
            let pb = spinner("Exporting nutexb image")?;
            let result = registry.dispatch(
                &pipeline,
                SAVE_PROCEDURE,
                ProcedureCall::Save {
                    image: &source,
                    file: texture.clone(),
                    options,
                },
            );
            pb.finish_and_clear();

            into_image(result, SAVE_PROCEDURE)?;
            println!(
                "Saved {} as {} ({})",
                image_path.display(),
                paths::texture_path(texture).display(),
                options.format
            );
        }

        Commands::Thumbnail {
            texture,
            size,
            output,
        } => {
            let pipeline = ConversionPipeline::new(&resolve_config(&cli)?, ImageCrateHost);

            let result = registry.dispatch(
                &pipeline,
                THUMBNAIL_PROCEDURE,
                ProcedureCall::Thumbnail {
                    file: texture.clone(),
                    size: *size,
                },
            );
            let image = into_image(result, THUMBNAIL_PROCEDURE)?
                .context("Thumbnail returned no image")?;

            // The pipeline hands back the full image; scaling is ours
            let thumb = image.thumbnail(*size, *size);
            thumb
                .save(output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Thumbnail {}x{} -> {}",
                thumb.width(),
                thumb.height(),
                output.display()
            );
        }
    }

    Ok(())
}

/// Refuse exports whose intermediate PNG would overwrite and then delete the source image
fn guard_source_image(image: &Path, texture: &Path) -> Result<()> {
    let intermediate = paths::intermediate_path(texture);
    let same = match (image.canonicalize(), intermediate.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if same {
        bail!(
            "{} is the intermediate file for {}; copy it elsewhere or pick another texture name",
            image.display(),
            paths::texture_path(texture).display()
        );
    }
    Ok(())
}
