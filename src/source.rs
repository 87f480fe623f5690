use crate::error::GithubError;
use crate::github::{GithubClient, RepoSummary, UserProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Where the aggregator gets its raw numbers from. Every query is scoped to
/// the identity's own account.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn user(&self, identity: &str) -> Result<UserProfile, GithubError>;

    async fn repos(
        &self,
        identity: &str,
        per_page: u32,
    ) -> Result<Vec<RepoSummary>, GithubError>;

    async fn commit_count(
        &self,
        identity: &str,
        repo: &str,
        since: DateTime<Utc>,
        per_page: u32,
    ) -> Result<u32, GithubError>;

    async fn languages(
        &self,
        identity: &str,
        repo: &str,
    ) -> Result<BTreeMap<String, u64>, GithubError>;
}

#[async_trait]
impl StatsSource for GithubClient {
    async fn user(&self, identity: &str) -> Result<UserProfile, GithubError> {
        GithubClient::user(self, identity).await
    }

    async fn repos(
        &self,
        identity: &str,
        per_page: u32,
    ) -> Result<Vec<RepoSummary>, GithubError> {
        GithubClient::repos(self, identity, per_page).await
    }

    async fn commit_count(
        &self,
        identity: &str,
        repo: &str,
        since: DateTime<Utc>,
        per_page: u32,
    ) -> Result<u32, GithubError> {
        GithubClient::commit_count(self, identity, repo, identity, since, per_page).await
    }

    async fn languages(
        &self,
        identity: &str,
        repo: &str,
    ) -> Result<BTreeMap<String, u64>, GithubError> {
        GithubClient::languages(self, identity, repo).await
    }
}
