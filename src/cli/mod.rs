//! Command-line interface definitions.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueHint};

const CLI_EXAMPLES: &str = "Examples:\n  shimeji-extract analyze ./pack.zip\n  shimeji-extract extract ./pack.zip -C ./out\n  shimeji-extract list ./pack.zip\n";

/// Top-level CLI parser.
#[derive(Debug, Parser)]
#[command(
    name = "shimeji-extract",
    version,
    about = "Finds and extracts shimeji desktop-mascot packages from archives",
    long_about = "Scans a ZIP/TAR/7z/RAR archive for shimeji mascot definitions and extracts their images, sounds, and behavior configs into a plain output tree.",
    after_help = CLI_EXAMPLES,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run discovery only and report what was found.
    Analyze(AnalyzeArgs),
    /// Run discovery and extract every discovered mascot.
    Extract(ExtractArgs),
    /// List raw entries surviving the asset filter, without running discovery.
    #[command(alias = "ls")]
    List(ListArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Archive to scan.
    #[arg(value_name = "ARCHIVE", value_hint = ValueHint::FilePath)]
    pub archive: Utf8PathBuf,
    /// Mascot name used when no folder name can be derived.
    #[arg(long = "name")]
    pub fallback_name: Option<String>,
    /// Emit a machine-readable JSON report instead of plain text.
    #[arg(long = "json")]
    pub json: bool,
}

/// Arguments for the `extract` subcommand.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Archive to extract.
    #[arg(value_name = "ARCHIVE", value_hint = ValueHint::FilePath)]
    pub archive: Utf8PathBuf,
    /// Destination directory (default: current directory).
    #[arg(short = 'C', long = "directory", value_hint = ValueHint::DirPath)]
    pub directory: Option<Utf8PathBuf>,
    /// Mascot name used when no folder name can be derived.
    #[arg(long = "name")]
    pub fallback_name: Option<String>,
    /// Only extract one representative image per mascot.
    #[arg(long = "thumbnails")]
    pub thumbnails: bool,
    /// Write a JSON report to this path after extracting.
    #[arg(long = "report", value_hint = ValueHint::FilePath)]
    pub report: Option<Utf8PathBuf>,
    /// Emit verbose progress.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Arguments for the `list` subcommand.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Archive to inspect.
    #[arg(value_name = "ARCHIVE", value_hint = ValueHint::FilePath)]
    pub archive: Utf8PathBuf,
    /// Emit machine-readable JSON.
    #[arg(long = "json")]
    pub json: bool,
}
