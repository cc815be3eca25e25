use serde::{Deserialize, Serialize};

mod languages;
mod stats;

#[cfg(feature = "github")]
pub mod github;

pub use languages::*;
pub use stats::*;

pub type GithubHandle = String;

/// Longest login GitHub hands out.
pub const MAX_LOGIN_LENGTH: usize = 39;

/// Whether `handle` can be a GitHub login: ASCII letters, digits and hyphens, not starting with a hyphen.
pub fn is_github_login(handle: &str) -> bool {
    !handle.is_empty()
        && handle.len() <= MAX_LOGIN_LENGTH
        && !handle.starts_with('-')
        && handle
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
}
