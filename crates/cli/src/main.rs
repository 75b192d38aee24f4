//! CLI tool for rendering JSON slide decks to PowerPoint files.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::registry::DEFAULT_DOWNLOAD_NAME;
use deck_core::{HttpImageFetcher, PresentationRequest};
use deck_pptx::{inspect, DeckSummary, PresentationBuilder, RenderOptions};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Render JSON slide requests into .pptx presentations.
#[derive(Parser, Debug)]
#[command(name = "deck-render")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input JSON request file(s); `-` reads from stdin
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Timeout for each image download, in seconds
    #[arg(short, long, default_value = "5")]
    timeout: u64,

    /// Print a summary of each generated presentation
    #[arg(short, long)]
    inspect: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let options = RenderOptions {
        fetch_timeout: Duration::from_secs(args.timeout),
        ..RenderOptions::default()
    };
    let builder =
        PresentationBuilder::with_options(&options).context("Failed to set up image fetching")?;

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &builder) {
            Ok(output_path) => {
                if args.verbose {
                    eprintln!("Written to: {}", output_path.display());
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

/// Render a single request file and write the presentation.
fn process_file(
    input_path: &Path,
    args: &Args,
    builder: &PresentationBuilder<HttpImageFetcher>,
) -> Result<PathBuf> {
    let input = read_input(input_path)?;

    let request = PresentationRequest::from_json(&input)?;
    log::debug!(
        "Rendering {} slides from {}",
        request.slides.slide_count(),
        input_path.display()
    );
    let output = builder.render(&request)?;

    for diagnostic in &output.diagnostics {
        eprintln!("  {}", diagnostic);
    }

    if args.verbose {
        eprintln!("  Rendered {} slides", output.slide_count);
    }

    let output_path = get_output_path(input_path, args.output.as_ref())?;
    write_output(&output_path, &output.bytes)?;
    log::debug!("Wrote {} bytes to {}", output.bytes.len(), output_path.display());

    if args.inspect {
        let summary = inspect(&output.bytes)
            .with_context(|| format!("Failed to read back {}", output_path.display()))?;
        print!("{}", format_summary(&output_path, &summary));
    }

    Ok(output_path)
}

/// Read a request from a file, or from stdin for `-`.
fn read_input(input_path: &Path) -> Result<String> {
    let mut input = String::new();

    if is_stdin(input_path) {
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read request from stdin")?;
    } else {
        File::open(input_path)
            .with_context(|| format!("Failed to open {}", input_path.display()))?
            .read_to_string(&mut input)
            .with_context(|| format!("Failed to read {}", input_path.display()))?;
    }

    Ok(input)
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let output_filename = if is_stdin(input_path) {
        DEFAULT_DOWNLOAD_NAME.to_string()
    } else {
        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        format!("{}.pptx", stem)
    };

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => match input_path.parent() {
            Some(parent) if !is_stdin(input_path) => parent.join(output_filename),
            _ => PathBuf::from(output_filename),
        },
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

/// Human-readable summary of a generated presentation.
fn format_summary(path: &Path, summary: &DeckSummary) -> String {
    let mut out = format!("{}: {} slides\n", path.display(), summary.slides.len());

    for slide in &summary.slides {
        let layout = slide.layout.map_or("unknown layout", |l| l.name());
        out.push_str(&format!("  [{}] {}", slide.number, layout));

        let mut shapes = Vec::new();
        if slide.pictures > 0 {
            shapes.push(format!("{} pictures", slide.pictures));
        }
        for table in &slide.tables {
            shapes.push(format!("table {}x{}", table.rows.len(), table.columns));
        }
        if slide.charts > 0 {
            shapes.push(format!("{} charts", slide.charts));
        }
        if !shapes.is_empty() {
            out.push_str(&format!(" ({})", shapes.join(", ")));
        }
        out.push('\n');

        for text in &slide.texts {
            for line in text.lines() {
                out.push_str(&format!("      {}\n", line));
            }
        }
    }

    out
}
