pub mod cli;
pub mod input;
pub mod summary;

use addon_lib::{parse_text, Dispatcher, GitCloner};
use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use crate::{
    cli::Args,
    summary::{write_found, write_summary, SummaryFormat, Tally},
};

/// Reads the text, clones what it mentions and prints the summary.
/// Returns whether every repository was cloned.
pub fn run(args: &Args) -> Result<bool> {
    let text = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?,
        None => prompt_for_text().context("unable to read the pasted text")?,
    };

    let mut stdout = io::stdout().lock();

    if text.trim().is_empty() {
        writeln!(stdout, "No text entered. Aborting.")?;
        return Ok(true);
    }

    let requests = parse_text(&text);
    if requests.is_empty() {
        writeln!(stdout, "No GitHub URLs found in the text.")?;
        return Ok(true);
    }
    if args.format == SummaryFormat::Text {
        write_found(&mut stdout, &requests)?;
        writeln!(stdout)?;
    }

    let destination = args
        .destination()
        .context("unable to work out the default destination")?;
    prepare_root(&destination, args.clean)?;

    let outcomes = Dispatcher::new(GitCloner, args.dispatch_options())
        .dispatch(requests, &destination)
        .context("git is required to download repositories, install it and make sure it is on PATH")?;

    write_summary(&mut stdout, &outcomes, args.format)?;
    if args.format == SummaryFormat::Text {
        writeln!(stdout, "Repositories downloaded to: {}", destination.display())?;
    }

    Ok(Tally::of(&outcomes).failed == 0)
}

/// Process exit status for the result of [`run`]: 0 when everything was
/// cloned, 1 when some repository failed, 2 on a fatal error.
pub fn exit_status(result: &Result<bool>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

fn prompt_for_text() -> io::Result<String> {
    let mut stderr = io::stderr();
    writeln!(stderr, "Paste the text with GitHub URLs (finish with an empty line):")?;
    input::read_text_block(io::stdin().lock())
}

/// Creates the destination directory, wiping it first when `clean` is set.
fn prepare_root(destination: &Path, clean: bool) -> Result<()> {
    if clean && destination.exists() {
        log::info!("deleting {}", destination.display());
        fs::remove_dir_all(destination).with_context(|| {
            format!(
                "could not delete {}, close any program using files inside it",
                destination.display()
            )
        })?;
    }
    fs::create_dir_all(destination)
        .with_context(|| format!("could not create {}", destination.display()))
}

#[cfg(test)]
mod tests {
    use assert_fs::{prelude::*, TempDir};
    use clap::Parser;
    use predicates::prelude::*;
    use rstest::rstest;
    use std::ffi::OsString;

    use super::*;

    #[rstest]
    #[case(Ok(true), 0)]
    #[case(Ok(false), 1)]
    #[case(Err(anyhow::anyhow!("git is required to download repositories")), 2)]
    fn test_exit_status(#[case] result: Result<bool>, #[case] expected: u8) {
        assert_eq!(exit_status(&result), expected);
    }

    #[test]
    fn test_prepare_root_creates_missing() {
        let tmp_dir = TempDir::new().expect("temp dir should be created");
        let root = tmp_dir.child("AddOns");

        prepare_root(root.path(), false).expect("should create");

        root.assert(predicate::path::is_dir());
    }

    #[test]
    fn test_prepare_root_keeps_existing() {
        let tmp_dir = TempDir::new().expect("temp dir should be created");
        let kept = tmp_dir.child("AddOns/repo1/README.md");
        kept.write_str("hello").expect("should write file");

        prepare_root(&tmp_dir.path().join("AddOns"), false).expect("should keep");

        kept.assert(predicate::path::exists());
    }

    #[test]
    fn test_prepare_root_clean() {
        let tmp_dir = TempDir::new().expect("temp dir should be created");
        let stale = tmp_dir.child("AddOns/repo1/README.md");
        stale.write_str("hello").expect("should write file");

        prepare_root(&tmp_dir.path().join("AddOns"), true).expect("should clean");

        stale.assert(predicate::path::missing());
        tmp_dir.child("AddOns").assert(predicate::path::is_dir());
    }

    #[test]
    fn test_run_without_urls_touches_nothing() {
        let tmp_dir = TempDir::new().expect("temp dir should be created");
        let input = tmp_dir.child("links.txt");
        input
            .write_str("no links in here\nnor here\n")
            .expect("should write file");
        let dest = tmp_dir.child("AddOns");
        let args = Args::try_parse_from([
            OsString::from("addon-downloader"),
            OsString::from("--file"),
            input.path().as_os_str().to_owned(),
            OsString::from("--dest"),
            dest.path().as_os_str().to_owned(),
        ])
        .expect("args should parse");

        let all_cloned = run(&args).expect("run should succeed");

        assert!(all_cloned);
        dest.assert(predicate::path::missing());
    }
}
