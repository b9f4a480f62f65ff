pub mod destination;
pub mod dispatch;
pub mod git;
pub mod git_uri;
pub mod request;

pub use dispatch::{
    CloneFailure, Cloner, DispatchError, DispatchOptions, Dispatcher, DownloadOutcome, GitCloner,
};
pub use request::{parse_line, parse_text, DownloadRequest};
