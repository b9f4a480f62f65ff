use std::{env, process::ExitCode};

use addon_downloader::{cli::Args, exit_status, run};
use anyhow::Result;
use clap::Parser;
use env_logger::Builder;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = initialize_logging(&args) {
        eprintln!("Error: unable to initialize logging: {e}");
    }

    let result = run(&args);
    if let Err(e) = &result {
        eprintln!("Error: {e}");

        for cause in e.chain().skip(1) {
            eprintln!("\tCaused By: {cause}");
        }
    }

    ExitCode::from(exit_status(&result))
}

fn initialize_logging(args: &Args) -> Result<()> {
    let mut builder = Builder::new();

    let level = args.log_level();
    builder.filter_module("addon_downloader", level);
    builder.filter_module("addon_lib", level);

    if let Ok(filter) = env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    }

    builder.format_timestamp_secs().try_init()?;

    Ok(())
}
