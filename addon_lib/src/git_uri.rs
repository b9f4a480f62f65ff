use git_url_parse::GitUrl;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

const GITHUB_HOST: &str = "github.com";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GitUriError {
    #[error("failed to parse repository url {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("repository url {url} does not point at github.com")]
    NotGitHub { url: String },

    #[error("repository url {url} uses unsupported scheme {scheme}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("repository url {0} has no owner")]
    MissingOwner(String),
}

/// Owner and repository of a `github.com` remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUri {
    pub owner: String,
    /// Repository name without the `.git` suffix.
    pub name: String,
    pub scheme: Scheme,
    pub git_suffix: bool,
}

/// Schemes a pasted GitHub link can carry.
#[derive(Debug, PartialEq, Eq, Clone, Display, Copy, Serialize, Deserialize)]
#[strum(serialize_all = "kebab_case")]
pub enum Scheme {
    /// Represents `http://` url scheme
    Http,
    /// Represents `https://` url scheme
    Https,
    /// Bare `github.com/owner/repo`
    Unspecified,
}

impl GitHubUri {
    pub fn parse(url: &str) -> Result<GitHubUri, GitUriError> {
        let scheme = scheme_of(url);
        // git-url-parse reads scheme-less input as a local path, give it one.
        let normalized = match scheme {
            Scheme::Unspecified => format!("https://{url}"),
            _ => url.to_string(),
        };

        let parsed = GitUrl::parse(&normalized).map_err(|e| GitUriError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        log::trace!("parsed {url} into {parsed:?}");

        match parsed.scheme {
            git_url_parse::Scheme::Http | git_url_parse::Scheme::Https => {}
            other => {
                return Err(GitUriError::UnsupportedScheme {
                    url: url.to_string(),
                    scheme: format!("{other:?}").to_lowercase(),
                })
            }
        }

        let on_github = parsed
            .host
            .as_deref()
            .is_some_and(|host| host.eq_ignore_ascii_case(GITHUB_HOST));
        if !on_github {
            return Err(GitUriError::NotGitHub {
                url: url.to_string(),
            });
        }

        let owner = parsed
            .owner
            .ok_or_else(|| GitUriError::MissingOwner(url.to_string()))?;

        Ok(GitHubUri {
            owner,
            name: parsed.name,
            scheme,
            git_suffix: parsed.git_suffix,
        })
    }

    /// `owner/name`, the way GitHub shows it.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// URL handed to `git clone`. A bare `github.com/...` link is cloned
    /// over https, since git would read it as a local path.
    pub fn clone_url(&self) -> String {
        let scheme = match self.scheme {
            Scheme::Unspecified => Scheme::Https,
            scheme => scheme,
        };
        let suffix = if self.git_suffix { ".git" } else { "" };
        format!("{scheme}://{GITHUB_HOST}/{}/{}{suffix}", self.owner, self.name)
    }
}

fn scheme_of(url: &str) -> Scheme {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("https://") {
        Scheme::Https
    } else if lower.starts_with("http://") {
        Scheme::Http
    } else {
        Scheme::Unspecified
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use similar_asserts::assert_eq;

    use super::*;

    #[rstest]
    #[case("https://github.com/user1/repo1", "user1", "repo1", Scheme::Https, false)]
    #[case(
        "https://github.com/refaim/TrainerSkills.git",
        "refaim",
        "TrainerSkills",
        Scheme::Https,
        true
    )]
    #[case("http://github.com/user2/repo2", "user2", "repo2", Scheme::Http, false)]
    #[case("github.com/user3/addon3", "user3", "addon3", Scheme::Unspecified, false)]
    fn test_parse_github_uri(
        #[case] url: &str,
        #[case] owner: &str,
        #[case] name: &str,
        #[case] scheme: Scheme,
        #[case] git_suffix: bool,
    ) {
        let uri = GitHubUri::parse(url).expect("should parse");

        assert_eq!(
            uri,
            GitHubUri {
                owner: owner.to_string(),
                name: name.to_string(),
                scheme,
                git_suffix,
            }
        );
    }

    #[test]
    fn test_parse_rejects_other_hosts() {
        let err = GitHubUri::parse("https://gitlab.com/user1/repo1").expect_err("not github");

        assert_eq!(
            err,
            GitUriError::NotGitHub {
                url: "https://gitlab.com/user1/repo1".to_string()
            }
        );
    }

    #[test]
    fn test_full_name() {
        let uri = GitHubUri::parse("https://github.com/refaim/TrainerSkills.git")
            .expect("should parse");

        assert_eq!(uri.full_name().as_str(), "refaim/TrainerSkills");
    }

    #[rstest]
    #[case("https://github.com/user1/repo1", "https://github.com/user1/repo1")]
    #[case(
        "https://github.com/refaim/TrainerSkills.git",
        "https://github.com/refaim/TrainerSkills.git"
    )]
    #[case("http://github.com/user2/repo2", "http://github.com/user2/repo2")]
    #[case("github.com/user3/addon3", "https://github.com/user3/addon3")]
    fn test_clone_url(#[case] url: &str, #[case] expected: &str) {
        let uri = GitHubUri::parse(url).expect("should parse");

        assert_eq!(uri.clone_url().as_str(), expected);
    }
}
