use super::*;

/// Aggregated public numbers of a single GitHub user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub username: GithubHandle,
    pub display_name: String,
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_repos: u64,
    pub followers: u64,
    pub following: u64,
}

impl Stats {
    /// Returns the handle when the profile has no display name set.
    pub fn display_name_or_login(name: Option<String>, login: &str) -> String {
        name.filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| login.to_string())
    }
}
