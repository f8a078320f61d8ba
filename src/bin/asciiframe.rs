use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use asciiframe::{
    Approach, CharWidth, ConvertOptions, ImageSource, Session, ToolConfig, workdir,
};

#[derive(Parser, Debug)]
#[command(name = "asciiframe", version)]
struct Cli {
    /// Log more (repeat for debug output).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an image (local file or http(s) URL) to ASCII art.
    Convert(ConvertArgs),
    /// List the approach catalog.
    Approaches,
    /// Delete expired run directories.
    Gc(GcArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image: a local file path or an http(s) URL.
    #[arg(long = "in")]
    input: String,

    /// ASCII characters per line, clamped to [10, 300].
    #[arg(long, default_value_t = asciiframe::DEFAULT_CHAR_WIDTH)]
    width: u32,

    /// Pixel width of the exported PNG (defaults from --width).
    #[arg(long)]
    png_width: Option<u32>,

    /// Approach to run; repeatable. Omit to run the full catalog.
    #[arg(long = "approach", value_enum)]
    approaches: Vec<Approach>,

    /// Run every approach in the catalog (default when no --approach given).
    #[arg(long)]
    all: bool,

    /// Root directory for per-run working directories.
    #[arg(long, default_value = "uploads")]
    out_dir: PathBuf,

    /// Skip the PNG export step.
    #[arg(long)]
    no_raster: bool,

    /// JSON config overriding external tool names and chrome offsets.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct GcArgs {
    /// Root directory holding per-run working directories.
    #[arg(long, default_value = "uploads")]
    out_dir: PathBuf,

    /// Delete runs older than this many days.
    #[arg(long, default_value_t = 7)]
    max_age_days: i64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Approaches => cmd_approaches(),
        Command::Gc(args) => cmd_gc(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ToolConfig> {
    match path {
        Some(p) => Ok(ToolConfig::load(p)?),
        None => Ok(ToolConfig::default()),
    }
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;

    let source = if args.input.starts_with("http://") || args.input.starts_with("https://") {
        ImageSource::from_url(&args.input)
    } else {
        ImageSource::from_path(Path::new(&args.input))?
    };

    let active: Vec<Approach> = if args.all || args.approaches.is_empty() {
        Approach::CATALOG.to_vec()
    } else {
        args.approaches
    };

    let options = ConvertOptions {
        char_width: CharWidth::clamp(args.width),
        png_width: args.png_width,
        raster: !args.no_raster,
    };

    let session = Session::new(cfg, &args.out_dir)?;
    let image = session.resolve(&source)?;
    eprintln!(
        "converting {} ({}x{}) in {}",
        image.base_name,
        image.width,
        image.height,
        session.workdir().path().display()
    );

    let outcomes = session.convert(&image, &active, &options)?;

    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(conv) => {
                let png = conv
                    .png_path
                    .as_ref()
                    .map(|p| format!(", png: {}", p.display()))
                    .unwrap_or_default();
                println!(
                    "ok   {:24} text: {}, svg: {}{}",
                    outcome.approach.display_name(),
                    conv.text_path.display(),
                    conv.svg_path.display(),
                    png
                );
            }
            Err(err) => {
                failed += 1;
                println!("fail {:24} {err}", outcome.approach.display_name());
            }
        }
    }

    if !outcomes.is_empty() && failed == outcomes.len() {
        anyhow::bail!("all {} selected approaches failed", outcomes.len());
    }
    Ok(())
}

fn cmd_approaches() -> anyhow::Result<()> {
    for approach in Approach::CATALOG {
        println!(
            "{:24} {:20} color: {:5}  {}",
            approach.slug(),
            approach.display_name(),
            approach.uses_color(),
            approach.description()
        );
    }
    Ok(())
}

fn cmd_gc(args: GcArgs) -> anyhow::Result<()> {
    let removed = workdir::gc(&args.out_dir, chrono::Duration::days(args.max_age_days))
        .with_context(|| format!("gc of '{}' failed", args.out_dir.display()))?;
    eprintln!("removed {removed} run directories");
    Ok(())
}
