//! tinct: apply noise, smoothing and sharpening filters to an image.
//!
//! Opens a filter session over the input image, lets the user stack
//! filters on a downscaled preview, and on apply replays the same filters
//! on the full-resolution image and writes the result.
//!
//! # Usage
//!
//! ```text
//! tinct photo.png --output out.png --category sharp
//! tinct photo.png --output out.png --filters menu.json --non-cumulative
//! tinct photo.png --output out.png --intent select:Sobel --intent apply
//! ```
//!
//! Exits with status 2 when the session is cancelled; nothing is written.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod presenter;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tinct_filters::Category;
use tinct_session::{
    DisplaySize, DownsampleFilter, FilterDescriptor, FilterSession, Intent, ScriptedPresenter,
    SessionOptions,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::presenter::{PreviewWriter, TerminalPresenter, parse_intent};

/// Exit status for a cancelled session.
const EXIT_CANCELLED: u8 = 2;

/// Interactive image filtering with cheap previews and exact
/// full-resolution results.
#[derive(Parser)]
#[command(name = "tinct", version)]
struct Args {
    /// Input image path (PNG, JPEG, BMP, WebP).
    input: PathBuf,

    /// Where to write the filtered image on apply.
    #[arg(short, long)]
    output: PathBuf,

    /// Stock filter menu.
    #[arg(long, value_enum, default_value_t = Menu::Smooth)]
    category: Menu,

    /// JSON filter menu; replaces the stock menu.
    #[arg(long, value_name = "FILE", conflicts_with = "category")]
    filters: Option<PathBuf>,

    /// Preview bounding box as "WIDTHxHEIGHT" (e.g. "800x600").
    #[arg(long, value_name = "WxH", value_parser = parse_display)]
    display: Option<DisplaySize>,

    /// Each selection replaces the previous one instead of stacking.
    #[arg(long)]
    non_cumulative: bool,

    /// Dialog title.
    #[arg(long)]
    title: Option<String>,

    /// Resampling filter for the preview copy.
    #[arg(long, value_enum, default_value_t = Resample::Triangle)]
    downsample_filter: Resample,

    /// Full session options as a JSON string.
    ///
    /// When provided, --display, --non-cumulative, --title and
    /// --downsample-filter are ignored. The JSON must be a valid
    /// `SessionOptions` serialization; omitted fields take their defaults.
    #[arg(long)]
    options_json: Option<String>,

    /// Run non-interactively with these intents, in order:
    /// select:<number|name>, reset, apply, cancel. Running out of intents
    /// cancels.
    #[arg(long, value_name = "INTENT")]
    intent: Vec<String>,

    /// Write the current preview to this path after every change.
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,
}

/// Stock menu selection.
#[derive(Clone, Copy, ValueEnum)]
enum Menu {
    /// Gaussian, mean, median, min and max.
    Smooth,
    /// Laplacian, Sobel and Prewitt.
    Sharp,
    /// Salt, pepper, and salt and pepper.
    Noise,
}

impl Menu {
    const fn category(self) -> Category {
        match self {
            Self::Smooth => Category::Smooth,
            Self::Sharp => Category::Sharp,
            Self::Noise => Category::Noise,
        }
    }
}

/// Preview resampling filter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Resample {
    /// Nearest-neighbor (fastest, blocky).
    Nearest,
    /// Bilinear interpolation (fast, decent quality).
    Triangle,
    /// Bicubic Catmull-Rom (moderate, good quality).
    CatmullRom,
    /// Gaussian (moderate, smooth).
    Gaussian,
    /// Lanczos with 3 lobes (slowest, sharpest).
    Lanczos3,
}

impl Resample {
    const fn downsample_filter(self) -> DownsampleFilter {
        match self {
            Self::Nearest => DownsampleFilter::Nearest,
            Self::Triangle => DownsampleFilter::Triangle,
            Self::CatmullRom => DownsampleFilter::CatmullRom,
            Self::Gaussian => DownsampleFilter::Gaussian,
            Self::Lanczos3 => DownsampleFilter::Lanczos3,
        }
    }
}

/// Parse `--display "WxH"`.
fn parse_display(s: &str) -> Result<DisplaySize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("display must be 'WIDTHxHEIGHT', got: '{s}'"))?;
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|e| format!("invalid display width '{w}': {e}"))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|e| format!("invalid display height '{h}': {e}"))?;
    Ok(DisplaySize::new(width, height))
}

/// Build [`SessionOptions`] from CLI arguments.
///
/// If `--options-json` is provided it is parsed directly and the
/// individual option flags are ignored. Otherwise the menu's defaults are
/// overridden by whichever flags were given.
fn options_from_args(args: &Args) -> Result<SessionOptions, String> {
    if let Some(ref json) = args.options_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --options-json: {e}"));
    }

    let base = if args.filters.is_some() {
        SessionOptions::default()
    } else {
        args.category.category().options()
    };
    Ok(SessionOptions {
        display_max_size: args.display.unwrap_or(base.display_max_size),
        cumulative: !args.non_cumulative,
        title: args.title.clone().unwrap_or(base.title),
        downsample_filter: args.downsample_filter.downsample_filter(),
    })
}

/// Load the filter menu: a JSON file if given, else the stock category.
fn descriptors_from_args(args: &Args) -> Result<Vec<FilterDescriptor>, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.filters {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        return Ok(tinct_filters::load_descriptors(&json)
            .map_err(|e| format!("Error in filter menu {}: {e}", path.display()))?);
    }
    Ok(args.category.category().descriptors()?)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let options = options_from_args(&args)?;
    let descriptors = descriptors_from_args(&args)?;

    info!(input = %args.input.display(), "reading image");
    // Decoded to 8-bit RGB; alpha is dropped.
    let original = image::open(&args.input)
        .map_err(|e| format!("Error reading {}: {e}", args.input.display()))?
        .to_rgb8();

    let session = FilterSession::new(original, descriptors, options)?;

    let result = if args.intent.is_empty() {
        let terminal = TerminalPresenter::new(io::stdin().lock(), io::stderr());
        run(session, terminal, args.preview.clone())
    } else {
        let intents = args
            .intent
            .iter()
            .map(|spec| parse_intent(spec, &session))
            .collect::<Result<Vec<Intent>, String>>()?;
        run(session, ScriptedPresenter::new(intents), args.preview.clone())
    };

    let Some(image) = result else {
        info!("cancelled, nothing written");
        return Ok(ExitCode::from(EXIT_CANCELLED));
    };

    image
        .save(&args.output)
        .map_err(|e| format!("Error writing {}: {e}", args.output.display()))?;
    info!(
        output = %args.output.display(),
        width = image.width(),
        height = image.height(),
        "result written"
    );
    Ok(ExitCode::SUCCESS)
}

/// Drive `session` with `presenter`, saving previews if requested.
fn run<P: tinct_session::Presenter>(
    session: FilterSession,
    presenter: P,
    preview: Option<PathBuf>,
) -> Option<tinct_session::CanonicalImage> {
    match preview {
        Some(path) => session.run(&mut PreviewWriter::new(presenter, path)),
        None => {
            let mut presenter = presenter;
            session.run(&mut presenter)
        }
    }
}
