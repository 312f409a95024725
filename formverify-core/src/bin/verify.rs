use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use clap::builder::styling::AnsiColor;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use formverify_core::analysis::bbox::BoxMode;
use formverify_core::consts::DEFAULT_FONT_SIZE;
use formverify_core::{AnnotateConfig, verify};

#[derive(Parser, Debug)]
#[command(name = "verify")]
#[command(about = "Draw form recognizer key/value boxes onto the scanned form")]
struct Args {
    #[arg(help = "Scanned form image (PNG, GIF, JPEG, ...)")]
    image: Option<PathBuf>,

    #[arg(help = "Form recognizer result JSON")]
    json: Option<PathBuf>,

    #[arg(short, long, default_value = "0", help = "Page of the result to draw (0-based)")]
    page: usize,

    #[arg(
        long,
        value_enum,
        default_value_t = BoxMode::Corners,
        help = "How the 4 corners become a rectangle"
    )]
    box_mode: BoxMode,

    #[arg(short, long, default_value = ".", help = "Output directory")]
    output_dir: PathBuf,

    #[arg(long, help = "TrueType font for the labels")]
    font: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_FONT_SIZE, help = "Label size in pixels")]
    font_size: f32,

    #[arg(long, help = "Write a JSON report of the drawn boxes")]
    report: Option<PathBuf>,

    #[arg(long, help = "Exit without waiting for enter")]
    no_pause: bool,

    #[arg(short, long, help = "Log progress to stderr")]
    verbose: bool,
}

impl Args {
    fn inputs(&self) -> Option<(PathBuf, PathBuf)> {
        Some((self.image.clone()?, self.json.clone()?))
    }

    fn config(&self) -> AnnotateConfig {
        AnnotateConfig {
            page: self.page,
            box_mode: self.box_mode,
            output_dir: self.output_dir.clone(),
            font: self.font.clone(),
            font_size: self.font_size,
            report: self.report.clone(),
        }
    }
}

fn print_usage() {
    let style = AnsiColor::Yellow.on_default();
    println!("{}Syntax:", style.render());
    println!("    verify scannedFormImage.jpg formRecognizerOutput.json");
    println!(
        "    - Scanned form images can be any supported image format (PNG, GIF, JPEG), but not PDF{}",
        style.render_reset()
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let Some((image, json)) = args.inputs() else {
        print_usage();
        return Ok(());
    };

    info!("verifying {} against {}", image.display(), json.display());

    let mut stdout = io::stdout().lock();
    let outcome = verify(&image, &json, &args.config(), &mut stdout).inspect_err(|err| {
        error!("verify failed: {}", err);
    })?;

    finish(&mut stdout, &mut io::stdin().lock(), &outcome.output, !args.no_pause)?;
    Ok(())
}

/// Prints the status line and, with `pause`, waits for a line on `input`.
fn finish<W: Write, R: BufRead>(
    out: &mut W,
    input: &mut R,
    output: &Path,
    pause: bool,
) -> io::Result<()> {
    if !pause {
        return writeln!(out, "\nWrote out to {} .", output.display());
    }

    write!(
        out,
        "\nWrote out to {} . \nPress enter to exit...",
        output.display()
    )?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}
