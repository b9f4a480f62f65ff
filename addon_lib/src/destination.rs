use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{git_uri::GitHubUri, request::DownloadRequest};

#[derive(Error, Debug)]
pub enum DestinationError {
    #[error("destination {0} already exists and is not empty")]
    Conflict(PathBuf),

    #[error("failed to clear destination {path}: {source}")]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to inspect destination {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directory the repository folder of `request` is created in.
pub fn parent<'a>(request: &'a DownloadRequest, default_destination: &'a Path) -> &'a Path {
    request
        .destination_path
        .as_deref()
        .unwrap_or(default_destination)
}

/// Directory `request` is cloned into: [`parent`] joined with the display
/// name, or the repository name when there is none.
pub fn resolve(
    request: &DownloadRequest,
    uri: &GitHubUri,
    default_destination: &Path,
) -> PathBuf {
    let folder = request.display_name.as_deref().unwrap_or(&uri.name);
    parent(request, default_destination).join(folder)
}

/// Makes sure `path` can be cloned into. An existing non-empty directory is
/// a conflict unless `force` is set, in which case it is removed.
pub fn prepare(path: &Path, force: bool) -> Result<(), DestinationError> {
    if !is_occupied(path)? {
        return Ok(());
    }

    if !force {
        return Err(DestinationError::Conflict(path.to_path_buf()));
    }

    log::info!("replacing existing {}", path.display());
    let removed = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|source| DestinationError::Clear {
        path: path.to_path_buf(),
        source,
    })
}

fn is_occupied(path: &Path) -> Result<bool, DestinationError> {
    let inspect = |source| DestinationError::Inspect {
        path: path.to_path_buf(),
        source,
    };

    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(fs::read_dir(path).map_err(inspect)?.next().is_some()),
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(inspect(e)),
    }
}

#[cfg(test)]
mod tests {
    use assert_fs::{prelude::*, TempDir};
    use predicates::prelude::*;
    use similar_asserts::assert_eq;

    use super::*;

    fn resolve_for(request: &DownloadRequest) -> PathBuf {
        let uri = request.repository().expect("should parse");
        resolve(request, &uri, Path::new("AddOns"))
    }

    #[test]
    fn test_resolve_uses_repository_name() {
        let request = DownloadRequest::new("https://github.com/refaim/TrainerSkills.git");

        assert_eq!(resolve_for(&request), PathBuf::from("AddOns/TrainerSkills"));
    }

    #[test]
    fn test_resolve_prefers_display_name() {
        let request =
            DownloadRequest::new("https://github.com/user1/repo1").with_display_name("Pretty");

        assert_eq!(resolve_for(&request), PathBuf::from("AddOns/Pretty"));
    }

    #[test]
    fn test_resolve_prefers_destination_path() {
        let request = DownloadRequest::new("https://github.com/refaim/TrainerSkills.git")
            .with_destination_path("C:/Games/TurtleWoW/Interface/AddOns")
            .with_display_name("TrainerSkills");

        assert_eq!(
            resolve_for(&request),
            PathBuf::from("C:/Games/TurtleWoW/Interface/AddOns").join("TrainerSkills")
        );
        assert_eq!(
            parent(&request, Path::new("AddOns")),
            Path::new("C:/Games/TurtleWoW/Interface/AddOns")
        );
    }

    #[test]
    fn test_prepare_missing_and_empty_dirs() {
        let tmp_dir = TempDir::new().expect("temp dir should be created");
        let empty = tmp_dir.child("empty");
        empty.create_dir_all().expect("should create dir");

        assert!(prepare(&tmp_dir.path().join("missing"), false).is_ok());
        assert!(prepare(empty.path(), false).is_ok());
        empty.assert(predicate::path::is_dir());
    }

    #[test]
    fn test_prepare_conflict() {
        let tmp_dir = TempDir::new().expect("temp dir should be created");
        let occupied = tmp_dir.child("repo1");
        occupied
            .child("README.md")
            .write_str("hello")
            .expect("should write file");

        let err = prepare(occupied.path(), false).expect_err("should conflict");

        assert!(matches!(err, DestinationError::Conflict(ref p) if p == occupied.path()));
        occupied.child("README.md").assert(predicate::path::exists());
    }

    #[test]
    fn test_prepare_force_clears() {
        let tmp_dir = TempDir::new().expect("temp dir should be created");
        let occupied = tmp_dir.child("repo1");
        occupied
            .child("nested/file.txt")
            .write_str("hello")
            .expect("should write file");

        prepare(occupied.path(), true).expect("should clear");

        occupied.assert(predicate::path::missing());
    }
}
