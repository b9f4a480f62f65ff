use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{
    destination::{self, DestinationError},
    git::{Git, GitCmdError},
    git_uri::{GitHubUri, GitUriError},
    request::{parse_text, DownloadRequest},
};

/// Concurrent clones when nothing else is asked for.
pub const DEFAULT_WORKERS: usize = 12;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("version control client is unavailable: {0}")]
    ToolUnavailable(#[source] GitCmdError),

    #[error("failed to start clone workers: {0}")]
    Workers(#[from] rayon::ThreadPoolBuildError),
}

/// Why a single request did not produce a clone.
#[derive(Error, Debug)]
pub enum CloneFailure {
    #[error(transparent)]
    InvalidUrl(#[from] GitUriError),

    #[error(transparent)]
    Destination(#[from] DestinationError),

    #[error(transparent)]
    Git(GitCmdError),
}

impl CloneFailure {
    pub fn is_destination_conflict(&self) -> bool {
        matches!(
            self,
            CloneFailure::Destination(DestinationError::Conflict(_))
        )
    }
}

/// The external version control client.
pub trait Cloner: Sync {
    fn check_available(&self) -> Result<(), GitCmdError>;

    fn clone_repo(&self, url: &str, dest: &Path, reference: Option<&str>)
        -> Result<(), GitCmdError>;
}

/// [`Cloner`] backed by the `git` executable on PATH.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCloner;

impl Cloner for GitCloner {
    fn check_available(&self) -> Result<(), GitCmdError> {
        let version = Git::version()?;
        log::debug!("using {version}");
        Ok(())
    }

    fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        reference: Option<&str>,
    ) -> Result<(), GitCmdError> {
        Git::clone(url, dest, reference).map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Upper bound on clones running at once, at least one.
    pub workers: usize,
    /// Replace non-empty destinations instead of failing.
    pub force: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        DispatchOptions {
            workers: DEFAULT_WORKERS,
            force: false,
        }
    }
}

#[derive(Debug)]
pub struct DownloadOutcome {
    pub request: DownloadRequest,
    pub destination: PathBuf,
    pub error: Option<CloneFailure>,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Dispatcher<C> {
    cloner: C,
    options: DispatchOptions,
}

impl<C: Cloner> Dispatcher<C> {
    pub fn new(cloner: C, options: DispatchOptions) -> Self {
        Dispatcher { cloner, options }
    }

    /// Parses `text` and clones every matched line once, in input order.
    pub fn run(
        &self,
        text: &str,
        default_destination: &Path,
    ) -> Result<Vec<DownloadOutcome>, DispatchError> {
        self.dispatch(parse_text(text), default_destination)
    }

    /// Clones every request once. Individual failures end up in the
    /// outcomes; only a missing client stops the batch.
    pub fn dispatch(
        &self,
        requests: Vec<DownloadRequest>,
        default_destination: &Path,
    ) -> Result<Vec<DownloadOutcome>, DispatchError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        self.cloner
            .check_available()
            .map_err(DispatchError::ToolUnavailable)?;

        let workers = self.options.workers.clamp(1, requests.len());
        log::info!(
            "cloning {} repositories with {workers} worker(s)",
            requests.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("clone-{i}"))
            .build()?;

        // Collecting into a Result keeps input order and stops handing out
        // requests once one of them reports the client missing.
        pool.install(|| {
            requests
                .par_iter()
                .map(|request| self.attempt(request, default_destination))
                .collect::<Result<Vec<_>, _>>()
        })
        .map_err(DispatchError::ToolUnavailable)
    }

    /// `Err` only when the client itself has gone missing.
    fn attempt(
        &self,
        request: &DownloadRequest,
        default_destination: &Path,
    ) -> Result<DownloadOutcome, GitCmdError> {
        let uri = match request.repository() {
            Ok(uri) => uri,
            Err(e) => {
                log::warn!("skipping {}: {e}", request.repository_url);
                return Ok(DownloadOutcome {
                    request: request.clone(),
                    destination: destination::parent(request, default_destination).to_path_buf(),
                    error: Some(e.into()),
                });
            }
        };

        let dest = destination::resolve(request, &uri, default_destination);
        log::info!("cloning {} into {}", uri.full_name(), dest.display());

        let error = match self.clone_one(request, &uri, &dest) {
            Ok(()) => {
                log::info!("cloned {}", uri.full_name());
                None
            }
            Err(CloneFailure::Git(e)) if e.is_not_found() => return Err(e),
            Err(e) => {
                log::warn!("failed to clone {}: {e}", uri.full_name());
                Some(e)
            }
        };

        Ok(DownloadOutcome {
            request: request.clone(),
            destination: dest,
            error,
        })
    }

    fn clone_one(
        &self,
        request: &DownloadRequest,
        uri: &GitHubUri,
        dest: &Path,
    ) -> Result<(), CloneFailure> {
        destination::prepare(dest, self.options.force)?;
        self.cloner
            .clone_repo(&uri.clone_url(), dest, request.branch_or_ref.as_deref())
            .map_err(CloneFailure::Git)
    }
}
