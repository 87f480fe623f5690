use crate::error::GithubError;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "folio-stats";

/// The fields of `GET /users/{user}` we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub login: String,
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Clone)]
pub struct GithubClient {
    base_url: Arc<String>,
    token: Option<Arc<String>>,
    http: Arc<Client>,
}

impl GithubClient {
    /// Create a REST client rooted at `base_url`. Requests are sent
    /// unauthenticated unless a token is given.
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GithubError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|source| GithubError::Transport {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            base_url: Arc::new(base_url),
            token: token.map(Arc::new),
            http: Arc::new(http),
        })
    }

    /// Low-level GET. Any non-2xx status is an error; there is no retry.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GithubError> {
        let url = format!("{}{path}", self.base_url);

        let mut req = self
            .http
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .query(query);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token.as_str());
        }

        debug!("GET {url}");
        let resp = req.send().await.map_err(|source| GithubError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GithubError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|source| GithubError::Transport {
            url: url.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| GithubError::Decode { url, source })
    }

    pub async fn user(&self, username: &str) -> Result<UserProfile, GithubError> {
        self.get_json(&format!("/users/{username}"), &[]).await
    }

    /// First page of repositories owned by `username`, in API order.
    pub async fn repos(
        &self,
        username: &str,
        per_page: u32,
    ) -> Result<Vec<RepoSummary>, GithubError> {
        self.get_json(
            &format!("/users/{username}/repos"),
            &[("per_page", per_page.to_string())],
        )
        .await
    }

    /// Number of commits by `author` in `owner/repo` since `since`, read from a
    /// single page of at most `per_page` entries. A body that is not a list
    /// counts as zero.
    pub async fn commit_count(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        since: DateTime<Utc>,
        per_page: u32,
    ) -> Result<u32, GithubError> {
        let body: Value = self
            .get_json(
                &format!("/repos/{owner}/{repo}/commits"),
                &[
                    ("author", author.to_string()),
                    ("since", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
                    ("per_page", per_page.to_string()),
                ],
            )
            .await?;

        Ok(body.as_array().map(|a| a.len() as u32).unwrap_or(0))
    }

    /// Language name to byte count for `owner/repo`.
    pub async fn languages(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<BTreeMap<String, u64>, GithubError> {
        self.get_json(&format!("/repos/{owner}/{repo}/languages"), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> GithubClient {
        GithubClient::new(server.base_url(), None, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn user_reads_profile_counts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/users/alice");
            then.status(200).json_body(json!({
                "login": "alice",
                "public_repos": 7,
                "followers": 12,
                "following": 3,
                "bio": null
            }));
        });

        let profile = client(&server).user("alice").await.unwrap();
        mock.assert();
        assert_eq!(profile.login, "alice");
        assert_eq!(profile.public_repos, 7);
        assert_eq!(profile.followers, 12);
        assert_eq!(profile.following, 3);
    }

    #[tokio::test]
    async fn user_not_found_is_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/ghost");
            then.status(404).json_body(json!({ "message": "Not Found" }));
        });

        let err = client(&server).user("ghost").await.unwrap_err();
        assert!(matches!(err, GithubError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn repos_sends_page_size() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users/alice/repos")
                .query_param("per_page", "100");
            then.status(200).json_body(json!([
                { "name": "a", "language": "Rust" },
                { "name": "b", "language": null }
            ]));
        });

        let repos = client(&server).repos("alice", 100).await.unwrap();
        mock.assert();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "a");
        assert_eq!(repos[0].language.as_deref(), Some("Rust"));
        assert_eq!(repos[1].language, None);
    }

    #[tokio::test]
    async fn commit_count_filters_by_author_and_since() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/alice/a/commits")
                .query_param("author", "alice")
                .query_param("since", "2025-10-16T00:00:00.000Z")
                .query_param("per_page", "100");
            then.status(200)
                .json_body(json!([{ "sha": "1" }, { "sha": "2" }, { "sha": "3" }]));
        });

        let since = Utc.with_ymd_and_hms(2025, 10, 16, 0, 0, 0).unwrap();
        let count = client(&server)
            .commit_count("alice", "a", "alice", since, 100)
            .await
            .unwrap();
        mock.assert();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn commit_count_of_non_list_body_is_zero() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/alice/a/commits");
            then.status(200).json_body(json!({ "message": "Git Repository is empty." }));
        });

        let count = client(&server)
            .commit_count("alice", "a", "alice", Utc::now(), 100)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn languages_decode_as_map() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/alice/a/languages");
            then.status(200).json_body(json!({ "Rust": 1200, "Shell": 40 }));
        });

        let langs = client(&server).languages("alice", "a").await.unwrap();
        assert_eq!(langs.keys().collect::<Vec<_>>(), vec!["Rust", "Shell"]);
    }

    #[tokio::test]
    async fn garbage_body_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/alice");
            then.status(200).body("<html>rate limited</html>");
        });

        let err = client(&server).user("alice").await.unwrap_err();
        assert!(matches!(err, GithubError::Decode { .. }));
    }

    #[tokio::test]
    async fn token_is_sent_as_bearer() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users/alice")
                .header("authorization", "Bearer s3cret");
            then.status(200).json_body(json!({ "public_repos": 1 }));
        });

        let client = GithubClient::new(
            server.base_url(),
            Some("s3cret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        client.user("alice").await.unwrap();
        mock.assert();
    }
}
