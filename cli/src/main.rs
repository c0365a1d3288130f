//! pagelayout CLI - reading-order reconstruction from layout model output

mod raster;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagelayout::provider::Category;
use pagelayout::{
    assembler_for, render, DirMediaStore, FixedDpiGeometry, FixedSizeGeometry, JsonFormat,
    ModelOutput, PageGeometryProvider, PageRange, PageSize, PipelineOptions,
};

use raster::ImageDirRasterizer;

#[derive(Parser)]
#[command(name = "pagelayout")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rebuild page reading order from layout model output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process model output into a layout document (JSON)
    Process {
        /// Layout model output (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page range, 0-based (e.g., "0-9", "3", "5-")
        #[arg(long)]
        pages: Option<String>,

        /// DPI the model's page images were rendered at
        #[arg(long, default_value = "200", conflicts_with = "page_size")]
        dpi: f64,

        /// Fixed page size in points (e.g., "612x792")
        #[arg(long, value_name = "WxH")]
        page_size: Option<String>,

        /// Directory of page renders (page-<idx>.png) for cropping media
        #[arg(long, value_name = "DIR", requires = "media_dir")]
        page_images: Option<PathBuf>,

        /// Directory to store cropped images and tables
        #[arg(long, value_name = "DIR", requires = "page_images")]
        media_dir: Option<PathBuf>,

        /// Pipeline options (JSON)
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// Book identifier used to name media crops
        #[arg(long, env = "PAGELAYOUT_BOOK_ID")]
        book_id: Option<String>,

        /// Output compact JSON
        #[arg(long, conflicts_with = "lines")]
        compact: bool,

        /// Output one page per line (JSON Lines)
        #[arg(long)]
        lines: bool,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Show model output information
    Info {
        /// Layout model output (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            input,
            output,
            pages,
            dpi,
            page_size,
            page_images,
            media_dir,
            options,
            book_id,
            compact,
            lines,
            sequential,
        } => cmd_process(ProcessArgs {
            input,
            output,
            pages,
            dpi,
            page_size,
            page_images,
            media_dir,
            options,
            book_id,
            compact,
            lines,
            sequential,
        }),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

struct ProcessArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    pages: Option<String>,
    dpi: f64,
    page_size: Option<String>,
    page_images: Option<PathBuf>,
    media_dir: Option<PathBuf>,
    options: Option<PathBuf>,
    book_id: Option<String>,
    compact: bool,
    lines: bool,
    sequential: bool,
}

fn cmd_process(args: ProcessArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = match &args.options {
        Some(path) => PipelineOptions::from_path(path)?,
        None => PipelineOptions::default(),
    };
    if let Some(p) = &args.pages {
        options = options.with_pages(PageRange::parse(p)?);
    }
    if let Some(id) = &args.book_id {
        options = options.with_book_id(id.as_str());
    } else if options.book_id == PipelineOptions::default().book_id {
        options = options.with_book_id(file_stem(&args.input));
    }
    if args.sequential {
        options = options.sequential();
    }

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Loading model output...");
    let output = Arc::new(ModelOutput::from_path(&args.input)?);
    let geometry: Arc<dyn PageGeometryProvider> = match &args.page_size {
        Some(size) => Arc::new(FixedSizeGeometry::new(
            output.page_count(),
            parse_page_size(size)?,
        )),
        None => Arc::new(FixedDpiGeometry::from_model(&output, args.dpi)?),
    };
    pb.inc(1);

    let mut assembler = assembler_for(output.clone(), geometry.clone()).with_options(options);
    if let (Some(images), Some(media)) = (&args.page_images, &args.media_dir) {
        assembler = assembler.with_media(
            Arc::new(ImageDirRasterizer::new(images, geometry.clone())),
            Arc::new(DirMediaStore::new(media)),
        );
    }

    pb.set_message(format!("Processing {} pages...", output.page_count()));
    let doc = assembler.process()?;
    pb.inc(1);

    pb.set_message("Writing JSON...");
    let format = if args.lines {
        JsonFormat::Lines
    } else if args.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = render::to_json(&doc, format)?;
    pb.inc(1);
    pb.finish_and_clear();

    if let Some(path) = &args.output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());

        let blocks: usize = doc.iter().map(|p| p.blocks.len()).sum();
        let dropped: usize = doc.iter().map(|p| p.dropped.len()).sum();
        println!("  {} {} pages", "├─".dimmed(), doc.page_count());
        println!("  {} {} blocks", "├─".dimmed(), blocks);
        println!("  {} {} spans dropped", "└─".dimmed(), dropped);
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let output = ModelOutput::from_path(input)?;

    println!("{}", "Model Output Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), output.page_count());
    if let Some(first) = output.pages.first() {
        println!(
            "{}: {}x{}",
            "Image size".bold(),
            first.page_info.width,
            first.page_info.height
        );
    }

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    let mut unknown = 0usize;
    for page in &output.pages {
        for det in page.layout_dets.iter().chain(&page.subfield_dets) {
            match det.category() {
                Some(category) => *counts.entry(category.id()).or_default() += 1,
                None => unknown += 1,
            }
        }
    }

    println!();
    println!("{}", "Detections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (id, count) in &counts {
        if let Some(category) = Category::from_id(*id) {
            println!("{}: {}", format!("{:?} ({})", category, id).bold(), count);
        }
    }
    if unknown > 0 {
        println!("{}: {}", "Unknown".yellow().bold(), unknown);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pagelayout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Reading-order reconstruction from layout model output");
    println!();
    println!("License: MIT");
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Parse `"<width>x<height>"` in points.
fn parse_page_size(s: &str) -> Result<PageSize, String> {
    let invalid = || format!("Invalid page size: {}", s);
    let (w, h) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width: f64 = w.trim().parse().map_err(|_| invalid())?;
    let height: f64 = h.trim().parse().map_err(|_| invalid())?;
    if !(width > 0.0 && height > 0.0) {
        return Err(invalid());
    }
    Ok(PageSize::new(width, height))
}
