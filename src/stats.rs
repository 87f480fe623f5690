use crate::config::Limits;
use crate::display::StatKey;
use crate::error::GithubError;
use crate::gather::gather_reduce;
use crate::github::RepoSummary;
use crate::source::StatsSource;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsResult {
    pub public_repos: u32,
    pub total_commits: u32,
    pub languages: u32,
    pub followers: Option<u32>,
    pub following: Option<u32>,
}

impl StatsResult {
    /// Static numbers shown when the profile or repository list can't be fetched.
    pub const FALLBACK: StatsResult = StatsResult {
        public_repos: 3,
        total_commits: 30,
        languages: 10,
        followers: None,
        following: None,
    };

    pub fn value(&self, key: StatKey) -> u32 {
        match key {
            StatKey::PublicRepos => self.public_repos,
            StatKey::TotalCommits => self.total_commits,
            StatKey::Languages => self.languages,
        }
    }
}

pub struct Aggregator<S> {
    source: S,
    limits: Limits,
}

impl<S: StatsSource> Aggregator<S> {
    pub fn new(source: S, limits: Limits) -> Self {
        Self { source, limits }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// One cycle: compute, or fall back to [`StatsResult::FALLBACK`] if either
    /// top-level request fails. Never returns partial data.
    pub async fn run_cycle(&self, identity: &str) -> StatsResult {
        match self.compute_stats(identity).await {
            Ok(stats) => {
                info!(
                    "Stats for {identity}: {} repos, {} commits, {} languages",
                    stats.public_repos, stats.total_commits, stats.languages
                );
                stats
            }
            Err(e) => {
                error!("Error fetching GitHub stats for {identity}: {e}");
                StatsResult::FALLBACK
            }
        }
    }

    pub async fn compute_stats(&self, identity: &str) -> Result<StatsResult, GithubError> {
        self.compute_stats_at(identity, Utc::now()).await
    }

    /// Same as [`compute_stats`](Self::compute_stats) with the commit window
    /// anchored at `now`.
    pub async fn compute_stats_at(
        &self,
        identity: &str,
        now: DateTime<Utc>,
    ) -> Result<StatsResult, GithubError> {
        let (profile, repos) = tokio::try_join!(
            self.source.user(identity),
            self.source.repos(identity, self.limits.repo_page_size),
        )?;
        debug!("{identity} has {} repositories on the first page", repos.len());

        let since = self.window_start(now);
        let (total_commits, languages) = tokio::join!(
            self.total_commits(identity, &repos, since),
            self.distinct_languages(identity, &repos),
        );

        Ok(StatsResult {
            public_repos: profile.public_repos,
            total_commits,
            languages,
            followers: Some(profile.followers),
            following: Some(profile.following),
        })
    }

    /// Start of the commit window ending at `now`. A window reaching past the
    /// earliest representable date starts there instead.
    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = self.limits.commit_window_days;
        Duration::try_days(i64::from(days))
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or_else(|| {
                warn!("Commit window of {days} days is out of range, counting from the earliest date");
                DateTime::<Utc>::MIN_UTC
            })
    }

    /// Sum of commit counts over the first `commit_repos` repositories, each
    /// capped at `commit_page_size`. A failed repository adds 0.
    async fn total_commits(
        &self,
        identity: &str,
        repos: &[RepoSummary],
        since: DateTime<Utc>,
    ) -> u32 {
        let per_page = self.limits.commit_page_size;
        gather_reduce(
            repos.iter().take(self.limits.commit_repos),
            |repo| {
                self.source
                    .commit_count(identity, &repo.name, since, per_page)
            },
            0u32,
            |total, outcome| match outcome {
                Ok(count) => total.saturating_add(count.min(per_page)),
                Err(e) => {
                    warn!("Skipping commit count: {e}");
                    total
                }
            },
        )
        .await
    }

    /// Number of distinct language names across the first `language_repos`
    /// repositories. A failed repository adds nothing.
    async fn distinct_languages(&self, identity: &str, repos: &[RepoSummary]) -> u32 {
        let seen = gather_reduce(
            repos.iter().take(self.limits.language_repos),
            |repo| self.source.languages(identity, &repo.name),
            BTreeSet::new(),
            |mut seen, outcome| {
                match outcome {
                    Ok(langs) => seen.extend(langs.into_keys()),
                    Err(e) => warn!("Skipping languages: {e}"),
                }
                seen
            },
        )
        .await;

        seen.len() as u32
    }
}
