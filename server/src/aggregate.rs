use std::{collections::HashMap, future::Future};

use futures::{stream, StreamExt, TryStreamExt};
use shared::{
    github::{GithubApi, UpstreamError},
    LanguageBreakdown, Stats,
};
use tracing::{instrument, warn};

use crate::error::CardError;

/// Default number of language requests in flight for a single user.
pub const DEFAULT_LANGUAGE_CONCURRENCY: usize = 8;

/// Runs `call` once more if it failed on the transport level. Status responses are returned as is.
async fn with_retry<T, F, Fut>(what: &str, mut call: F) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    match call().await {
        Err(e) if e.is_transport() => {
            warn!("Retrying {what} after transport failure: {e}");
            call().await
        }
        result => result,
    }
}

/// Any non-success status while resolving the user means there is no such user for us.
fn user_not_found(username: &str, error: UpstreamError) -> CardError {
    match error {
        UpstreamError::Status { .. } => CardError::UserNotFound(username.to_string()),
        transport => CardError::Upstream(transport),
    }
}

#[instrument(skip(github))]
pub async fn user_stats(github: &dyn GithubApi, username: &str) -> Result<Stats, CardError> {
    let user = with_retry("user profile", move || github.user(username))
        .await
        .map_err(|e| user_not_found(username, e))?;

    // Single page only, forks are counted as well
    let repos = with_retry("repository list", move || github.repos(username)).await?;
    let (total_stars, total_forks) = repos.iter().fold((0, 0), |(stars, forks), repo| {
        (stars + repo.stargazers_count, forks + repo.forks_count)
    });

    Ok(Stats {
        display_name: Stats::display_name_or_login(user.name, &user.login),
        username: user.login,
        total_stars,
        total_forks,
        total_repos: user.public_repos,
        followers: user.followers,
        following: user.following,
    })
}

#[instrument(skip(github))]
pub async fn user_languages(
    github: &dyn GithubApi,
    username: &str,
    concurrency: usize,
) -> Result<LanguageBreakdown, CardError> {
    let repos = with_retry("repository list", move || github.repos(username))
        .await
        .map_err(|e| user_not_found(username, e))?;

    let fetches: Vec<_> = repos
        .iter()
        .filter(|repo| !repo.fork)
        .map(|repo| with_retry("repository languages", move || github.languages(repo)))
        .collect();

    let bytes = stream::iter(fetches)
        .buffer_unordered(concurrency.max(1))
        .try_fold(HashMap::<String, u64>::new(), |mut total, languages| async move {
            for (language, bytes) in languages {
                *total.entry(language).or_default() += bytes;
            }
            Ok(total)
        })
        .await?;

    Ok(LanguageBreakdown::from_bytes(bytes))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use shared::{
        github::{GithubApi, LanguageBytes, Repository, UpstreamError, UserProfile},
        LanguageEntry, Stats,
    };

    use super::*;

    /// In-memory GitHub. Users missing from `users` answer with 404.
    #[derive(Default)]
    pub(crate) struct FakeGithub {
        pub users: HashMap<String, (UserProfile, Vec<Repository>)>,
        pub languages: HashMap<String, LanguageBytes>,
        /// Number of upcoming calls that fail with a transport error
        pub transport_failures: AtomicUsize,
        pub delay: Option<Duration>,
        pub calls: AtomicUsize,
        pub language_calls: Mutex<Vec<String>>,
        pub in_flight: AtomicUsize,
        /// Highest number of language requests observed at the same time
        pub peak_in_flight: AtomicUsize,
    }

    impl FakeGithub {
        pub fn with_user(
            mut self,
            profile: UserProfile,
            repos: Vec<(Repository, LanguageBytes)>,
        ) -> Self {
            let mut list = Vec::new();
            for (repo, languages) in repos {
                self.languages.insert(repo.full_name.clone(), languages);
                list.push(repo);
            }
            self.users.insert(profile.login.clone(), (profile, list));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn enter(&self) -> Result<(), UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                rocket::tokio::time::sleep(delay).await;
            }
            let failures = self.transport_failures.load(Ordering::SeqCst);
            if failures > 0 {
                self.transport_failures.store(failures - 1, Ordering::SeqCst);
                return Err(UpstreamError::Transport("connection reset".to_string()));
            }
            Ok(())
        }

        fn missing() -> UpstreamError {
            UpstreamError::Status {
                status: 404,
                message: "Not Found".to_string(),
            }
        }
    }

    #[async_trait]
    impl GithubApi for FakeGithub {
        async fn user(&self, username: &str) -> Result<UserProfile, UpstreamError> {
            self.enter().await?;
            self.users
                .get(username)
                .map(|(profile, _)| profile.clone())
                .ok_or_else(Self::missing)
        }

        async fn repos(&self, username: &str) -> Result<Vec<Repository>, UpstreamError> {
            self.enter().await?;
            self.users
                .get(username)
                .map(|(_, repos)| repos.clone())
                .ok_or_else(Self::missing)
        }

        async fn languages(&self, repo: &Repository) -> Result<LanguageBytes, UpstreamError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            let entered = self.enter().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            entered?;

            self.language_calls
                .lock()
                .unwrap()
                .push(repo.full_name.clone());
            self.languages
                .get(&repo.full_name)
                .cloned()
                .ok_or_else(Self::missing)
        }
    }

    pub(crate) fn profile(login: &str, name: Option<&str>) -> UserProfile {
        UserProfile {
            login: login.to_string(),
            name: name.map(ToString::to_string),
            public_repos: 2,
            followers: 3,
            following: 1,
        }
    }

    pub(crate) fn repo(full_name: &str, stars: u64, forks: u64, fork: bool) -> Repository {
        Repository {
            name: full_name.split('/').last().unwrap_or_default().to_string(),
            full_name: full_name.to_string(),
            stargazers_count: stars,
            forks_count: forks,
            fork,
            languages_url: None,
        }
    }

    pub(crate) fn languages(input: &[(&str, u64)]) -> LanguageBytes {
        input
            .iter()
            .map(|(name, bytes)| (name.to_string(), *bytes))
            .collect()
    }

    fn percentages(breakdown: &shared::LanguageBreakdown) -> Vec<(&str, &str)> {
        breakdown
            .entries()
            .iter()
            .map(|LanguageEntry { name, percentage }| (name.as_str(), percentage.as_str()))
            .collect()
    }

    #[rocket::async_test]
    async fn stats_sum_forks_as_well() {
        let github = FakeGithub::default().with_user(
            profile("x", None),
            vec![
                (repo("x/a", 10, 2, false), languages(&[])),
                (repo("x/b", 5, 0, true), languages(&[])),
            ],
        );

        let stats = user_stats(&github, "x").await.unwrap();
        assert_eq!(
            stats,
            Stats {
                username: "x".to_string(),
                display_name: "x".to_string(),
                total_stars: 15,
                total_forks: 2,
                total_repos: 2,
                followers: 3,
                following: 1,
            }
        );
        assert_eq!(github.calls(), 2);
    }

    #[rocket::async_test]
    async fn stats_use_display_name() {
        let github =
            FakeGithub::default().with_user(profile("octocat", Some("The Octocat")), vec![]);

        let stats = user_stats(&github, "octocat").await.unwrap();
        assert_eq!(stats.display_name, "The Octocat");
        assert_eq!(stats.total_stars, 0);
        assert_eq!(stats.total_forks, 0);
    }

    #[rocket::async_test]
    async fn unknown_user() {
        let github = FakeGithub::default();

        let error = user_stats(&github, "doesnotexist123").await.unwrap_err();
        assert_eq!(error.to_string(), "User not found: doesnotexist123");
        // a status response is never retried
        assert_eq!(github.calls(), 1);

        let error = user_languages(&github, "doesnotexist123", 4)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "User not found: doesnotexist123");
    }

    #[rocket::async_test]
    async fn transport_failure_is_retried_once() {
        let github = FakeGithub::default().with_user(profile("x", None), vec![]);
        github.transport_failures.store(1, Ordering::SeqCst);

        assert!(user_stats(&github, "x").await.is_ok());
        assert_eq!(github.calls(), 3);

        github.transport_failures.store(2, Ordering::SeqCst);
        let error = user_stats(&github, "x").await.unwrap_err();
        assert!(matches!(
            error,
            CardError::Upstream(UpstreamError::Transport(_))
        ));
    }

    #[rocket::async_test]
    async fn languages_skip_forks() {
        let github = FakeGithub::default().with_user(
            profile("x", None),
            vec![
                (repo("x/a", 0, 0, false), languages(&[("Go", 800), ("Rust", 200)])),
                (repo("x/b", 0, 0, true), languages(&[("Python", 100_000)])),
            ],
        );

        let breakdown = user_languages(&github, "x", 4).await.unwrap();
        assert_eq!(percentages(&breakdown), [("Go", "80.0"), ("Rust", "20.0")]);
        assert_eq!(*github.language_calls.lock().unwrap(), ["x/a"]);
    }

    #[rocket::async_test]
    async fn languages_are_summed_across_repos() {
        let repos = (0..12)
            .map(|i| {
                (
                    repo(&format!("x/r{i}"), 0, 0, false),
                    languages(&[("Rust", 100), ("Shell", 10 * i), (format!("L{i}").as_str(), 1)]),
                )
            })
            .collect();
        let github = FakeGithub::default().with_user(profile("x", None), repos);

        let sequential = user_languages(&github, "x", 1).await.unwrap();
        let concurrent = user_languages(&github, "x", 5).await.unwrap();
        assert_eq!(sequential, concurrent);

        // Rust: 1200, Shell: 660, then three single-byte languages ordered by name
        assert_eq!(sequential.len(), 5);
        let names: Vec<_> = sequential.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Rust", "Shell", "L0", "L1", "L10"]);

        let sum: f64 = sequential
            .entries()
            .iter()
            .map(|e| e.percentage.parse::<f64>().unwrap())
            .sum();
        assert!((sum - 100.0).abs() <= 0.5);
    }

    #[rocket::async_test]
    async fn language_requests_are_bounded() {
        let repos = (0..12)
            .map(|i| (repo(&format!("x/r{i}"), 0, 0, false), languages(&[("Rust", 1)])))
            .collect();
        let github = FakeGithub {
            delay: Some(Duration::from_millis(20)),
            ..FakeGithub::default().with_user(profile("x", None), repos)
        };

        let breakdown = user_languages(&github, "x", 3).await.unwrap();
        assert_eq!(percentages(&breakdown), [("Rust", "100.0")]);
        assert_eq!(github.language_calls.lock().unwrap().len(), 12);

        let peak = github.peak_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak was {peak}");
        assert!(peak > 1, "peak was {peak}");
    }

    #[rocket::async_test]
    async fn no_repositories() {
        let github = FakeGithub::default().with_user(profile("x", None), vec![]);
        assert!(user_languages(&github, "x", 4).await.unwrap().is_empty());

        let github = FakeGithub::default().with_user(
            profile("y", None),
            vec![(repo("y/fork", 3, 1, true), languages(&[("C", 10)]))],
        );
        assert!(user_languages(&github, "y", 4).await.unwrap().is_empty());
        assert_eq!(github.calls(), 1);
    }
}
