//! epub-manga - Fixed-layout EPUB builder for comics and manga

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use epub_manga::{BuildOverrides, BuildRequest, EpubBuilder, ReadingDirection};

#[derive(Parser)]
#[command(name = "epub-manga")]
#[command(
    version,
    about = "Package a directory of page images as a fixed-layout EPUB",
    long_about = None
)]
#[command(after_help = "EXAMPLES:
    epub-manga pages/ book.epub \"My Manga\"           Right-to-left manga
    epub-manga pages/ book.epub Comic --direction ltr   Left-to-right comic
    epub-manga pages/ book.epub --options opts.json     Options from a JSON file")]
struct Cli {
    /// Directory of page images, read in file-name order
    #[arg(value_name = "SOURCE_DIR")]
    source: PathBuf,

    /// EPUB file to write
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Book title, also drawn on the cover
    #[arg(value_name = "TITLE", default_value = "")]
    title: String,

    /// Page canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Page canvas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Reading direction (ltr or rtl)
    #[arg(long)]
    direction: Option<ReadingDirection>,

    /// Author / contributor name
    #[arg(long)]
    author: Option<String>,

    /// Book language tag
    #[arg(long)]
    language: Option<String>,

    /// Disable region magnification panels
    #[arg(long)]
    no_magnification: bool,

    /// Directory for the temporary build workspace
    #[arg(long, value_name = "DIR")]
    workspace_root: Option<PathBuf>,

    /// TrueType/OpenType font for the cover title
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// JSON file with build options; flags take precedence
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every build step
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> BuildOverrides {
        BuildOverrides {
            page_width: self.width,
            page_height: self.height,
            reading_direction: self.direction,
            author: self.author.clone(),
            language: self.language.clone(),
            region_magnification: self.no_magnification.then_some(false),
            workspace_root: self.workspace_root.clone(),
            font_path: self.font.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match convert(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn convert(cli: &Cli) -> Result<(), String> {
    let file_overrides = match &cli.options {
        Some(path) => load_overrides(path)?,
        None => BuildOverrides::default(),
    };
    let overrides = file_overrides.or(cli.overrides());

    let request =
        BuildRequest::new(&cli.source, &cli.output, cli.title.as_str()).with_overrides(overrides);
    let report = EpubBuilder::new().build(&request).map_err(|e| e.to_string())?;

    if !cli.quiet {
        println!(
            "Built {} ({} pages, {})",
            report.output_file.display(),
            report.page_count,
            request.options.reading_direction
        );
    }
    Ok(())
}

fn load_overrides(path: &Path) -> Result<BuildOverrides, String> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid options file {}: {e}", path.display()))
}
