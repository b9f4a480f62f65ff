use addon_lib::{DownloadOutcome, DownloadRequest};
use clap::ValueEnum;
use serde::Serialize;
use std::{
    io::{self, Write},
    path::Path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub successful: usize,
    pub failed: usize,
}

impl Tally {
    pub fn of(outcomes: &[DownloadOutcome]) -> Self {
        let successful = outcomes.iter().filter(|o| o.is_success()).count();
        Tally {
            successful,
            failed: outcomes.len() - successful,
        }
    }
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    #[serde(flatten)]
    request: &'a DownloadRequest,
    destination: &'a Path,
    success: bool,
    error: Option<String>,
}

/// Lists what was found before anything is cloned.
pub fn write_found<W: Write>(out: &mut W, requests: &[DownloadRequest]) -> io::Result<()> {
    writeln!(out, "Found {} repository(ies):", requests.len())?;
    for request in requests {
        write!(out, "   * {}", request.repository_url)?;
        if let Some(reference) = &request.branch_or_ref {
            write!(out, " @ {reference}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(
    out: &mut W,
    outcomes: &[DownloadOutcome],
    format: SummaryFormat,
) -> io::Result<()> {
    match format {
        SummaryFormat::Text => write_text(out, outcomes),
        SummaryFormat::Json => write_json(out, outcomes),
    }
}

fn write_text<W: Write>(out: &mut W, outcomes: &[DownloadOutcome]) -> io::Result<()> {
    for outcome in outcomes {
        match &outcome.error {
            None => writeln!(
                out,
                "[ok]   {} -> {}",
                outcome.request.repository_url,
                outcome.destination.display()
            )?,
            Some(e) => writeln!(out, "[fail] {}: {e}", outcome.request.repository_url)?,
        }
    }

    let tally = Tally::of(outcomes);
    writeln!(out)?;
    writeln!(out, "Successful: {}", tally.successful)?;
    writeln!(out, "Failed:     {}", tally.failed)?;
    Ok(())
}

fn write_json<W: Write>(out: &mut W, outcomes: &[DownloadOutcome]) -> io::Result<()> {
    let records: Vec<OutcomeRecord> = outcomes
        .iter()
        .map(|outcome| OutcomeRecord {
            request: &outcome.request,
            destination: &outcome.destination,
            success: outcome.is_success(),
            error: outcome.error.as_ref().map(ToString::to_string),
        })
        .collect();

    serde_json::to_writer_pretty(&mut *out, &records)?;
    writeln!(out)
}
