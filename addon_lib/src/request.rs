//! Turning free-form lines of text into download requests.
//!
//! A line is interesting if it contains a GitHub repository URL. The
//! structured form recognised around the URL is
//!
//! ```text
//! [prose...] [destination path] [folder name] [*]<url> [ref]
//! ```
//!
//! Every part except the URL is optional and picked up only when the
//! neighbouring token clearly fits; anything ambiguous is left empty.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::git_uri::{GitHubUri, GitUriError};

/// The repository segment never ends in `.`, so a sentence's full stop
/// stays outside the URL.
static GITHUB_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?P<url>(?:https?://)?github\.com/(?P<owner>[A-Za-z0-9_.-]+)/(?P<repo>[A-Za-z0-9_.-]*[A-Za-z0-9_-]))\.*(?:[\s)"']|$)"#,
    )
    .expect("github url pattern should compile")
});

/// Words that commonly sit right before a link in prose and never name a folder.
const PROSE_KEYWORDS: &[&str] = &[
    "a", "addon", "addons", "an", "and", "at", "by", "check", "clone", "code", "download", "for",
    "from", "get", "git", "github", "here", "in", "is", "link", "of", "on", "or", "out", "repo",
    "repository", "see", "source", "the", "this", "to", "url", "via", "with",
];

const FOLDER_NAME_FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', ',', ';'];
const REF_FORBIDDEN: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];
/// Characters that glue a URL to the word before it.
const WORD_GLUE: &[char] = &['.', '-', '_', '/', '@', '\\', '%', '~'];

/// One repository to clone, as found on one input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Directory the repository folder is created in.
    pub destination_path: Option<PathBuf>,
    /// Folder name to use instead of the repository name.
    pub display_name: Option<String>,
    /// The URL exactly as matched, `.git` suffix included.
    pub repository_url: String,
    pub branch_or_ref: Option<String>,
}

impl DownloadRequest {
    pub fn new(repository_url: impl Into<String>) -> Self {
        DownloadRequest {
            destination_path: None,
            display_name: None,
            repository_url: repository_url.into(),
            branch_or_ref: None,
        }
    }

    pub fn with_destination_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination_path = Some(path.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_branch_or_ref(mut self, reference: impl Into<String>) -> Self {
        self.branch_or_ref = Some(reference.into());
        self
    }

    pub fn repository(&self) -> Result<GitHubUri, GitUriError> {
        GitHubUri::parse(&self.repository_url)
    }
}

/// Parses every line of `text`, keeping matches in input order.
pub fn parse_text(text: &str) -> Vec<DownloadRequest> {
    text.lines().filter_map(parse_line).collect()
}

/// Extracts a [`DownloadRequest`] from the first GitHub URL on `line`.
pub fn parse_line(line: &str) -> Option<DownloadRequest> {
    let (caps, glued) = GITHUB_URL.captures_iter(line).find_map(|caps| {
        let glued = url_prefix(line, &caps)?;
        is_valid_repo_segment(&caps["repo"]).then_some((caps, glued))
    })?;
    let url = caps.name("url")?;

    let mut request = DownloadRequest::new(url.as_str());
    log::debug!("found {} in {line:?}", url.as_str());

    // Glued onto a word or followed by more words: the URL sits in a sentence.
    if glued {
        return Some(request);
    }

    let rest = &line[url.end()..];
    let after: Vec<&str> = rest.split_whitespace().collect();
    if after.len() > 1 {
        return Some(request);
    }

    let token_start = line[..url.start()]
        .rfind(char::is_whitespace)
        .map(|i| i + 1)
        .unwrap_or(0);
    let mut before = line[..token_start].split_whitespace().rev();
    match before.next() {
        Some(token) if looks_like_path(token) => {
            request.destination_path = Some(PathBuf::from(token));
        }
        Some(token) if is_folder_name(token) => {
            request.display_name = Some(token.to_string());
            if let Some(path) = before.next().filter(|t| looks_like_path(t)) {
                request.destination_path = Some(PathBuf::from(path));
            }
        }
        _ => {}
    }

    let closed = !rest.is_empty() && !rest.starts_with(char::is_whitespace);
    if let [reference] = after.as_slice() {
        if !closed && is_ref_name(reference) {
            request.branch_or_ref = Some(reference.to_string());
        }
    }

    Some(request)
}

/// Checks the text between the URL and the whitespace before it.
/// `None` rejects the match, otherwise reports whether a word is glued on.
fn url_prefix(line: &str, caps: &Captures) -> Option<bool> {
    let start = caps.name("url")?.start();
    let prefix = &line[..start];
    if let Some(c) = prefix.chars().next_back() {
        if c.is_alphanumeric() || WORD_GLUE.contains(&c) {
            return None;
        }
    }
    let token = prefix
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default();
    Some(token.chars().any(char::is_alphanumeric))
}

fn is_valid_repo_segment(repo: &str) -> bool {
    let name = strip_git_suffix(repo);
    !name.is_empty() && !name.chars().all(|c| c == '.')
}

fn strip_git_suffix(name: &str) -> &str {
    let len = name.len();
    if len >= 4 && name[len - 4..].eq_ignore_ascii_case(".git") {
        &name[..len - 4]
    } else {
        name
    }
}

fn looks_like_url(token: &str) -> bool {
    token.contains("://") || token.to_ascii_lowercase().contains("github.com")
}

fn looks_like_path(token: &str) -> bool {
    if looks_like_url(token) {
        return false;
    }
    let bytes = token.as_bytes();
    let drive = bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'/' || bytes[2] == b'\\');
    drive || token.starts_with('~') || token.contains('/') || token.contains('\\')
}

fn is_folder_name(token: &str) -> bool {
    token.chars().any(char::is_alphanumeric)
        && !looks_like_url(token)
        && !token.contains(FOLDER_NAME_FORBIDDEN)
        && !token.chars().any(char::is_control)
        && !token.ends_with('.')
        && !is_prose_keyword(token)
}

fn is_prose_keyword(token: &str) -> bool {
    PROSE_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(token))
}

/// A subset of `git check-ref-format` that is enough to tell refs from prose.
fn is_ref_name(token: &str) -> bool {
    !token.is_empty()
        && token != "@"
        && !looks_like_url(token)
        && !is_prose_keyword(token)
        && !token.starts_with(['-', '/', '.'])
        && !token.ends_with(['/', '.'])
        && !token.ends_with(".lock")
        && !token.contains("..")
        && !token.contains("@{")
        && !token.contains("//")
        && !token.contains(REF_FORBIDDEN)
        && !token.chars().any(char::is_control)
}
