use std::collections::HashMap;

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::instrument;

use super::*;

/// Repositories fetched per user. Anything past the first page is ignored.
pub const REPOS_PER_PAGE: u8 = 100;

/// Bytes of code per language, as reported for a single repository.
pub type LanguageBytes = HashMap<String, u64>;

// GitHub sends `null` for some counters on freshly created accounts
fn zero_if_null<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub login: GithubHandle,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub public_repos: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub followers: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub following: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub stargazers_count: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub forks_count: u64,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub languages_url: Option<String>,
}

impl Repository {
    pub fn languages_route(&self) -> String {
        self.languages_url
            .clone()
            .unwrap_or_else(|| format!("/repos/{}/languages", self.full_name))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    #[error("GitHub responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("GitHub request failed: {0}")]
    Transport(String),
}

impl UpstreamError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<octocrab::Error> for UpstreamError {
    fn from(error: octocrab::Error) -> Self {
        match error {
            octocrab::Error::GitHub { source, .. } => Self::Status {
                status: source.status_code.as_u16(),
                message: source.message.clone(),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Read-only view of the GitHub REST API used to build the cards.
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn user(&self, username: &str) -> Result<UserProfile, UpstreamError>;

    /// First page (up to [`REPOS_PER_PAGE`]) of the user's public repositories.
    async fn repos(&self, username: &str) -> Result<Vec<Repository>, UpstreamError>;

    async fn languages(&self, repo: &Repository) -> Result<LanguageBytes, UpstreamError>;
}

/// Route of a user resource. Handles that are not GitHub logins never leave the process.
fn user_route(username: &str, resource: &str) -> Result<String, UpstreamError> {
    if !crate::is_github_login(username) {
        return Err(UpstreamError::Status {
            status: 404,
            message: format!("{username:?} is not a GitHub login"),
        });
    }
    Ok(format!("/users/{username}{resource}"))
}

#[derive(Serialize)]
struct RepoListParams {
    per_page: u8,
}

#[derive(Clone, Debug)]
pub struct GithubClient {
    octocrab: Octocrab,
}

impl GithubClient {
    /// Without a token the client talks to GitHub anonymously and is subject to the lower rate limit.
    pub fn new(github_token: Option<String>) -> anyhow::Result<Self> {
        let builder = Octocrab::builder();
        let octocrab = match github_token.filter(|token| !token.is_empty()) {
            Some(token) => builder.personal_token(token).build()?,
            None => builder.build()?,
        };
        Ok(Self { octocrab })
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    #[instrument(skip(self))]
    async fn user(&self, username: &str) -> Result<UserProfile, UpstreamError> {
        Ok(self
            .octocrab
            .get(user_route(username, "")?, None::<&()>)
            .await?)
    }

    #[instrument(skip(self))]
    async fn repos(&self, username: &str) -> Result<Vec<Repository>, UpstreamError> {
        Ok(self
            .octocrab
            .get(
                user_route(username, "/repos")?,
                Some(&RepoListParams {
                    per_page: REPOS_PER_PAGE,
                }),
            )
            .await?)
    }

    #[instrument(skip(self, repo), fields(repo = %repo.full_name))]
    async fn languages(&self, repo: &Repository) -> Result<LanguageBytes, UpstreamError> {
        Ok(self
            .octocrab
            .get(repo.languages_route(), None::<&()>)
            .await?)
    }
}
