//! Command-line entry point for the shimeji-extract binary.

use clap::Parser;

use shimeji_extract::error::{AnalyzeError, UserInputError};
use shimeji_extract::policy::PolicyError;

fn main() {
    let cli = shimeji_extract::cli::Cli::parse();

    if let Err(err) = shimeji_extract::run(cli) {
        let mut exit_code = 1;
        for cause in err.chain() {
            if cause.is::<PolicyError>() {
                exit_code = 3;
                break;
            }
            if let Some(AnalyzeError::OpenFailed(_)) = cause.downcast_ref::<AnalyzeError>() {
                exit_code = 3;
                break;
            }
            if cause.is::<UserInputError>() {
                exit_code = 2;
                break;
            }
            if cause.is::<std::io::Error>() {
                exit_code = 1;
            }
        }
        eprintln!("shimeji-extract: {err:#}");
        std::process::exit(exit_code);
    }
}
