use clap::{Parser, Subcommand};
use photo_enhancer::codec::MimeType;
use photo_enhancer::config;
use photo_enhancer::crop::{AspectPreset, CropRegion, DisplaySelection};
use photo_enhancer::imaging::RustBackend;
use photo_enhancer::output;
use photo_enhancer::remote::GeminiClient;
use photo_enhancer::studio::{Mode, ModeSession, Phase, Studio};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Input image plus an optional crop applied before the transform.
#[derive(clap::Args, Clone)]
struct ImageArgs {
    /// Image to transform (PNG, JPEG or WebP)
    input: PathBuf,

    /// Crop to x,y,width,height before transforming
    #[arg(long, value_parser = parse_crop)]
    crop: Option<CropRegion>,

    /// Size WxH the crop was measured against (default: natural size)
    #[arg(long, value_parser = parse_size, requires = "crop")]
    displayed: Option<(f64, f64)>,
}

#[derive(Parser)]
#[command(name = "photo-enhancer")]
#[command(about = "Colorize, clean up, compress and convert photos")]
#[command(long_about = "\
Colorize, clean up, compress and convert photos

Remote modes (colorize, remove-background, remove-watermark) send the image
to a generative image-editing service. The API key is read from the
environment variable named by [remote].api_key_env (default API_KEY).

Local modes (compress, convert) run entirely on this machine. Compress always
writes JPEG; convert writes PNG, JPEG or WebP.

Results are written to <output>/enhanced-image.<ext>.

Run 'photo-enhancer gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Directory the result is written to
    #[arg(long, default_value = ".", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Colorize a black and white photograph
    Colorize(ImageArgs),
    /// Cut the subject out onto a transparent background
    RemoveBackground(ImageArgs),
    /// Remove watermarks, logos and overlaid text
    RemoveWatermark(ImageArgs),
    /// Resize and re-encode as JPEG
    Compress {
        #[command(flatten)]
        image: ImageArgs,
        /// JPEG quality, 1-100
        #[arg(long)]
        quality: Option<u32>,
        /// Target width (height follows unless --no-aspect-lock)
        #[arg(long)]
        width: Option<u32>,
        /// Target height (width follows unless --no-aspect-lock)
        #[arg(long)]
        height: Option<u32>,
        /// Edit width and height independently
        #[arg(long)]
        no_aspect_lock: bool,
    },
    /// Re-encode under another format
    Convert {
        #[command(flatten)]
        image: ImageArgs,
        /// Target format: png, jpeg or webp
        #[arg(long, value_parser = parse_format)]
        to: Option<MimeType>,
        /// Encoding quality, 1-100 (JPEG only)
        #[arg(long)]
        quality: Option<u32>,
    },
    /// List the available modes
    Modes,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

/// Option edits applied to the session before running.
enum Edits {
    None,
    Compress {
        quality: Option<u32>,
        width: Option<u32>,
        height: Option<u32>,
        no_aspect_lock: bool,
    },
    Convert {
        to: Option<MimeType>,
        quality: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (mode, image, edits) = match cli.command {
        Command::Colorize(image) => (Mode::Colorize, image, Edits::None),
        Command::RemoveBackground(image) => (Mode::RemoveBackground, image, Edits::None),
        Command::RemoveWatermark(image) => (Mode::RemoveWatermark, image, Edits::None),
        Command::Compress {
            image,
            quality,
            width,
            height,
            no_aspect_lock,
        } => (
            Mode::Compress,
            image,
            Edits::Compress {
                quality,
                width,
                height,
                no_aspect_lock,
            },
        ),
        Command::Convert { image, to, quality } => {
            (Mode::Convert, image, Edits::Convert { to, quality })
        }
        Command::Modes => {
            output::print_modes();
            return Ok(());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
    };

    let config = config::load_config(&cli.config_dir)?;
    let backend = Arc::new(RustBackend::with_max_dimension(
        config.limits.max_surface_dimension,
    ));
    let remote = if mode.is_remote() {
        GeminiClient::from_env(&config.remote)?
    } else {
        GeminiClient::new(&config.remote, String::new())?
    };
    let mut studio = Studio::new(backend, Arc::new(remote), mode, config.session_defaults());

    println!("==> Loading {}", image.input.display());
    let file = tokio::fs::File::open(&image.input).await?;
    let declared = image
        .input
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(MimeType::from_extension);
    if studio.upload(file, declared).await != Phase::Uploaded {
        return fail(&studio);
    }

    if let Some(region) = image.crop {
        let Some((natural_w, natural_h)) = studio.session().uploaded().map(|a| a.dimensions())
        else {
            return fail(&studio);
        };
        let displayed = image
            .displayed
            .unwrap_or((natural_w as f64, natural_h as f64));
        println!(
            "==> Cropping {}x{}+{}+{} (measured at {}x{})",
            region.width, region.height, region.x, region.y, displayed.0, displayed.1
        );
        let selection = DisplaySelection {
            x: region.x as f64,
            y: region.y as f64,
            width: region.width as f64,
            height: region.height as f64,
            displayed_width: displayed.0,
            displayed_height: displayed.1,
        };
        if !selection.meets_minimum() {
            tracing::warn!(?selection, "crop is smaller than the interactive selector allows");
        }
        studio.begin_crop(displayed, AspectPreset::Free);
        studio.adjust_crop(selection);
        studio.confirm_crop().await;
        if studio.session().last_error().is_some() || studio.session().phase() != Phase::Uploaded
        {
            return fail(&studio);
        }
    }

    apply_edits(studio.session_mut(), edits);

    println!("==> {}", mode.progress_message(0));
    let phase = studio.run().await;
    output::print_session_report(studio.session());
    if phase != Phase::Resulted {
        return Err(failure_message(studio.session()).into());
    }

    let download = studio.download().ok_or("transform produced no result")?;
    tokio::fs::create_dir_all(&cli.output).await?;
    let path = cli.output.join(&download.filename);
    tokio::fs::write(&path, &download.bytes).await?;
    println!("==> {}", output::format_saved(&download, &path));

    Ok(())
}

fn apply_edits(session: &mut ModeSession, edits: Edits) {
    match edits {
        Edits::None => {}
        Edits::Compress {
            quality,
            width,
            height,
            no_aspect_lock,
        } => {
            let settings = session.compression_mut();
            if no_aspect_lock {
                settings.set_aspect_lock(false);
            }
            if let Some(quality) = quality {
                settings.set_quality(quality);
            }
            if let Some(width) = width {
                settings.set_width(width);
            }
            if let Some(height) = height {
                settings.set_height(height);
            }
        }
        Edits::Convert { to, quality } => {
            if let Some(format) = to {
                session.set_target_format(format);
            }
            if let Some(quality) = quality {
                session.set_conversion_quality(quality);
            }
        }
    }
}

/// Report the session and exit with its recorded error.
fn fail<B, R>(studio: &Studio<B, R>) -> Result<(), Box<dyn std::error::Error>>
where
    B: photo_enhancer::imaging::ImageBackend + 'static,
    R: photo_enhancer::remote::RemoteTransform + ?Sized,
{
    output::print_session_report(studio.session());
    Err(failure_message(studio.session()).into())
}

fn failure_message(session: &ModeSession) -> String {
    session
        .last_error()
        .map(|err| err.message.clone())
        .unwrap_or_else(|| "nothing to process".to_string())
}

fn parse_crop(s: &str) -> Result<CropRegion, String> {
    let parts: Vec<u32> = s
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("expected x,y,width,height: {e}"))?;
    match parts.as_slice() {
        [x, y, width, height] if *width > 0 && *height > 0 => {
            Ok(CropRegion::new(*x, *y, *width, *height))
        }
        [_, _, _, _] => Err("crop width and height must be positive".to_string()),
        _ => Err("expected x,y,width,height".to_string()),
    }
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| *n > 0.0)
            .ok_or_else(|| format!("invalid size component: {v}"))
    };
    Ok((parse(w)?, parse(h)?))
}

fn parse_format(s: &str) -> Result<MimeType, String> {
    s.parse::<MimeType>().map_err(|e| e.to_string())
}
