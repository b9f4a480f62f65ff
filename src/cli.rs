use addon_lib::{dispatch::DEFAULT_WORKERS, DispatchOptions};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::{env, io, path::PathBuf};

use crate::summary::SummaryFormat;

/// Folder created next to the executable when no destination is given.
pub const DEFAULT_DESTINATION: &str = "AddOns";

/// Clone every GitHub repository mentioned in a block of pasted text.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Read the text from a file instead of prompting for it
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Directory repositories are cloned into [default: AddOns next to the executable]
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Delete the destination directory before downloading
    #[arg(long)]
    pub clean: bool,

    /// Replace repository folders that already exist and are not empty
    #[arg(long)]
    pub force: bool,

    /// Maximum number of clones running at once
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, value_parser = parse_workers)]
    pub workers: usize,

    /// How the final summary is printed
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    pub format: SummaryFormat,

    /// Verbose output (repeat for more verbosity)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            workers: self.workers,
            force: self.force,
        }
    }

    pub fn destination(&self) -> io::Result<PathBuf> {
        if let Some(dest) = &self.dest {
            return Ok(dest.clone());
        }
        let exe = env::current_exe()?;
        let dir = exe
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(dir.join(DEFAULT_DESTINATION))
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn parse_workers(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("at least one worker is required".to_string()),
        Ok(workers) => Ok(workers),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["addon-downloader"]).expect("no args should parse");

        assert_eq!(
            args.dispatch_options(),
            DispatchOptions {
                workers: DEFAULT_WORKERS,
                force: false
            }
        );
        assert_eq!(args.format, SummaryFormat::Text);
        assert_eq!(args.log_level(), LevelFilter::Warn);
        assert!(args
            .destination()
            .expect("current exe should resolve")
            .ends_with(DEFAULT_DESTINATION));
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "addon-downloader",
            "--file",
            "links.txt",
            "--dest",
            "out",
            "--force",
            "--workers",
            "3",
            "--format",
            "json",
            "-vv",
        ])
        .expect("flags should parse");

        assert_eq!(args.file, Some(PathBuf::from("links.txt")));
        assert_eq!(args.destination().expect("explicit dest"), PathBuf::from("out"));
        assert_eq!(
            args.dispatch_options(),
            DispatchOptions {
                workers: 3,
                force: true
            }
        );
        assert_eq!(args.format, SummaryFormat::Json);
        assert_eq!(args.log_level(), LevelFilter::Debug);
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("many")]
    fn test_invalid_workers(#[case] workers: &str) {
        assert!(Args::try_parse_from(["addon-downloader", "--workers", workers]).is_err());
    }
}
